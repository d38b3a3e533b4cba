#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]

//! Labelled email corpora: extraction from Enron-style archives and train/test splits.
//!
//! An Enron-style corpus stores one email per file, with legitimate mail under a
//! `ham/` directory and spam under a `spam/` directory (for example
//! `enron1/ham/0001.1999-12-10.farmer.ham.txt`).

use crate::config::SplitConfig;
use crate::error::{BayesError, Result};
use flate2::read::GzDecoder;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Component, Path, PathBuf};

pub const HAM_LABEL: &str = "ham";
pub const SPAM_LABEL: &str = "spam";

/// Raw email bodies with their labels, index-aligned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabeledEmails {
    pub emails: Vec<String>,
    pub labels: Vec<String>,
}

impl LabeledEmails {
    #[must_use]
    pub fn len(&self) -> usize {
        self.emails.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }

    /// Number of emails carrying `label`.
    #[must_use]
    pub fn count(&self, label: &str) -> usize {
        self.labels.iter().filter(|l| *l == label).count()
    }

    fn push(&mut self, email: String, label: &str) {
        self.emails.push(email);
        self.labels.push(label.to_string());
    }
}

/// Label implied by a member path: the nearest `ham` or `spam` directory.
fn label_for(member: &Path) -> Option<&'static str> {
    let parent = member.parent()?;
    parent.components().rev().find_map(|c| match c {
        Component::Normal(name) if name == HAM_LABEL => Some(HAM_LABEL),
        Component::Normal(name) if name == SPAM_LABEL => Some(SPAM_LABEL),
        _ => None,
    })
}

fn corpus_err(path: &Path, reason: impl ToString) -> BayesError {
    BayesError::corpus(path.display().to_string(), reason)
}

/// Reads every ham/spam email out of a gzip-compressed tar archive.
///
/// Members outside a `ham/` or `spam/` directory are skipped. Bytes that are not
/// valid UTF-8 are replaced, and disappear once the text is tokenized.
///
/// # Errors
/// Returns [`BayesError::Corpus`] if the archive cannot be opened or decoded.
pub fn extract_dataset(archive: impl AsRef<Path>) -> Result<LabeledEmails> {
    let archive = archive.as_ref();
    let file = File::open(archive).map_err(|e| corpus_err(archive, e))?;
    let mut tar = tar::Archive::new(GzDecoder::new(file));
    let mut corpus = LabeledEmails::default();

    for entry in tar.entries().map_err(|e| corpus_err(archive, e))? {
        let mut entry = entry.map_err(|e| corpus_err(archive, e))?;
        if !entry.header().entry_type().is_file() {
            continue;
        }
        let member = entry.path().map_err(|e| corpus_err(archive, e))?.into_owned();
        let Some(label) = label_for(&member) else {
            continue;
        };
        let mut bytes = Vec::new();
        entry
            .read_to_end(&mut bytes)
            .map_err(|e| corpus_err(&member, e))?;
        corpus.push(String::from_utf8_lossy(&bytes).into_owned(), label);
    }

    tracing::info!(
        archive = %archive.display(),
        ham = corpus.count(HAM_LABEL),
        spam = corpus.count(SPAM_LABEL),
        "extracted corpus"
    );
    Ok(corpus)
}

/// Reads every ham/spam email below an already-extracted corpus directory.
///
/// Files are visited in sorted path order so the result is reproducible.
/// Symbolic links are skipped, so a link cycle cannot make the walk loop.
///
/// # Errors
/// Returns [`BayesError::Corpus`] if a directory or file cannot be read.
pub fn read_dataset_dir(root: impl AsRef<Path>) -> Result<LabeledEmails> {
    let root = root.as_ref();
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(&dir).map_err(|e| corpus_err(&dir, e))? {
            let entry = entry.map_err(|e| corpus_err(&dir, e))?;
            let path = entry.path();
            // DirEntry::file_type does not follow symlinks
            let kind = entry.file_type().map_err(|e| corpus_err(&path, e))?;
            if kind.is_dir() {
                pending.push(path);
            } else if kind.is_file() {
                files.push(path);
            }
        }
    }
    files.sort();

    let mut corpus = LabeledEmails::default();
    for path in files {
        let relative: PathBuf = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
        let Some(label) = label_for(&relative) else {
            continue;
        };
        let bytes = fs::read(&path).map_err(|e| corpus_err(&path, e))?;
        corpus.push(String::from_utf8_lossy(&bytes).into_owned(), label);
    }

    tracing::info!(
        root = %root.display(),
        ham = corpus.count(HAM_LABEL),
        spam = corpus.count(SPAM_LABEL),
        "read corpus"
    );
    Ok(corpus)
}

/// Shuffled train/test partition of an index-aligned dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainTestSplit<T, L> {
    pub train: Vec<T>,
    pub train_labels: Vec<L>,
    pub test: Vec<T>,
    pub test_labels: Vec<L>,
}

/// Shuffles `items`/`labels` together with a seeded generator and cuts the first
/// `floor(train_ratio * n)` pairs off as the training set.
///
/// # Errors
/// - [`BayesError::LabelCountMismatch`] if the slices differ in length
/// - [`BayesError::InvalidRatio`] if `train_ratio` is outside [0, 1]
///
/// # Example
/// ```rust
/// use bayesnet_rs::config::SplitConfig;
/// use bayesnet_rs::corpus::split_data;
///
/// let items: Vec<u32> = (0..10).collect();
/// let labels: Vec<bool> = items.iter().map(|i| i % 2 == 0).collect();
/// let split = split_data(&items, &labels, &SplitConfig::default()).unwrap();
///
/// assert_eq!(split.train.len(), 8);
/// assert_eq!(split.test.len(), 2);
/// ```
pub fn split_data<T: Clone, L: Clone>(
    items: &[T],
    labels: &[L],
    config: &SplitConfig,
) -> Result<TrainTestSplit<T, L>> {
    if items.len() != labels.len() {
        return Err(BayesError::LabelCountMismatch {
            documents: items.len(),
            labels: labels.len(),
        });
    }
    if !(0.0..=1.0).contains(&config.train_ratio) {
        return Err(BayesError::invalid_ratio("train_ratio", config.train_ratio));
    }

    let n = items.len();
    let mut order: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(config.seed);
    order.shuffle(&mut rng);

    let cut = ((config.train_ratio * n as f64).floor() as usize).min(n);
    let (train_idx, test_idx) = order.split_at(cut);
    let pick = |idx: &[usize]| -> (Vec<T>, Vec<L>) {
        idx.iter()
            .map(|&i| (items[i].clone(), labels[i].clone()))
            .unzip()
    };
    let (train, train_labels) = pick(train_idx);
    let (test, test_labels) = pick(test_idx);

    Ok(TrainTestSplit {
        train,
        train_labels,
        test,
        test_labels,
    })
}
