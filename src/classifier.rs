#![allow(clippy::cast_precision_loss)]

//! Bag-of-words Naive Bayes text classification.
//!
//! Documents are sets of tokens (see [`crate::text`]). The model estimates, per
//! label, the prior P(label) and for every vocabulary word the fraction of that
//! label's documents containing it. A document's score under a label is the log
//! prior plus the log probabilities of its known words; unknown words are ignored.

use crate::config::NaiveBayesConfig;
use crate::error::{BayesError, Result};
use crate::text::Document;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// A classifier trained on labelled documents.
pub trait Classifier<L> {
    /// Fits the model to `documents`, replacing any previous fit.
    ///
    /// # Errors
    /// Implementations reject empty or misaligned inputs.
    fn train(&mut self, documents: &[Document], labels: &[L]) -> Result<()>;

    /// Predicts one label per document.
    ///
    /// # Errors
    /// Implementations fail if called before [`Classifier::train`].
    fn predict(&self, documents: &[Document]) -> Result<Vec<L>>;
}

#[derive(Debug, Clone, Default)]
struct ClassStats {
    documents: usize,
    word_counts: HashMap<String, usize>,
}

#[derive(Debug, Clone)]
struct Model<L> {
    classes: BTreeMap<L, ClassStats>,
    vocabulary: BTreeSet<String>,
    total_documents: usize,
}

/// Naive Bayes over token sets, generic in the label type.
///
/// When two labels score equally, the one that sorts first wins; with the
/// default `"ham"`/`"spam"` labels an undecidable email is treated as ham.
///
/// # Example
/// ```rust
/// use bayesnet_rs::classifier::{Classifier, NaiveBayesClassifier};
/// use bayesnet_rs::text::clean_str;
///
/// let docs = vec![
///     clean_str("cheap pills buy now"),
///     clean_str("buy cheap watches now"),
///     clean_str("meeting notes attached"),
///     clean_str("lunch meeting tomorrow"),
/// ];
/// let labels = vec!["spam", "spam", "ham", "ham"];
///
/// let mut nb = NaiveBayesClassifier::new();
/// nb.train(&docs, &labels).unwrap();
///
/// let predicted = nb.predict(&[clean_str("buy now"), clean_str("meeting tomorrow")]).unwrap();
/// assert_eq!(predicted, ["spam", "ham"]);
/// ```
#[derive(Debug, Clone)]
pub struct NaiveBayesClassifier<L = String> {
    config: NaiveBayesConfig,
    model: Option<Model<L>>,
}

impl<L> Default for NaiveBayesClassifier<L> {
    fn default() -> Self {
        Self {
            config: NaiveBayesConfig::default(),
            model: None,
        }
    }
}

impl<L: Ord + Clone> NaiveBayesClassifier<L> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: NaiveBayesConfig) -> Self {
        Self {
            config,
            model: None,
        }
    }

    #[must_use]
    pub fn is_trained(&self) -> bool {
        self.model.is_some()
    }

    fn model(&self) -> Result<&Model<L>> {
        self.model.as_ref().ok_or(BayesError::UntrainedClassifier)
    }

    /// Labels seen during training, in sort order.
    ///
    /// # Errors
    /// Returns [`BayesError::UntrainedClassifier`] before training.
    pub fn labels(&self) -> Result<Vec<L>> {
        Ok(self.model()?.classes.keys().cloned().collect())
    }

    /// Number of distinct words seen during training.
    ///
    /// # Errors
    /// Returns [`BayesError::UntrainedClassifier`] before training.
    pub fn vocabulary_len(&self) -> Result<usize> {
        Ok(self.model()?.vocabulary.len())
    }

    /// Fraction of training documents carrying `label`; zero for unseen labels.
    ///
    /// # Errors
    /// Returns [`BayesError::UntrainedClassifier`] before training.
    pub fn prior(&self, label: &L) -> Result<f64> {
        let model = self.model()?;
        Ok(model.classes.get(label).map_or(0.0, |c| {
            c.documents as f64 / model.total_documents as f64
        }))
    }

    /// Estimated P(word present | label), including any configured smoothing.
    ///
    /// # Errors
    /// Returns [`BayesError::UntrainedClassifier`] before training.
    pub fn word_probability(&self, word: &str, label: &L) -> Result<f64> {
        let model = self.model()?;
        Ok(model
            .classes
            .get(label)
            .map_or(0.0, |stats| self.estimate(stats, word)))
    }

    fn estimate(&self, stats: &ClassStats, word: &str) -> f64 {
        let count = stats.word_counts.get(word).copied().unwrap_or(0) as f64;
        let alpha = self.config.smoothing;
        (count + alpha) / (stats.documents as f64 + 2.0 * alpha)
    }

    /// Log-space score of `document` under every label, in label order.
    ///
    /// Scores are unnormalized log posteriors; `-inf` means a label is ruled out.
    ///
    /// # Errors
    /// Returns [`BayesError::UntrainedClassifier`] before training.
    pub fn log_scores(&self, document: &Document) -> Result<Vec<(L, f64)>> {
        let model = self.model()?;
        Ok(model
            .classes
            .iter()
            .map(|(label, stats)| {
                let prior = stats.documents as f64 / model.total_documents as f64;
                let evidence: f64 = document
                    .iter()
                    .filter(|word| model.vocabulary.contains(*word))
                    .map(|word| self.estimate(stats, word).ln())
                    .sum();
                (label.clone(), prior.ln() + evidence)
            })
            .collect())
    }

    fn classify(&self, document: &Document) -> Result<L> {
        let mut best: Option<(L, f64)> = None;
        for (label, score) in self.log_scores(document)? {
            match &best {
                Some((_, top)) if score <= *top => {}
                _ => best = Some((label, score)),
            }
        }
        // training guarantees at least one label
        best.map(|(label, _)| label)
            .ok_or(BayesError::UntrainedClassifier)
    }

    /// [`Classifier::predict`] spread over the rayon thread pool.
    ///
    /// # Errors
    /// Returns [`BayesError::UntrainedClassifier`] before training.
    #[cfg(feature = "parallel")]
    pub fn predict_par(&self, documents: &[Document]) -> Result<Vec<L>>
    where
        L: Send + Sync,
    {
        use rayon::prelude::*;
        self.model()?;
        documents.par_iter().map(|doc| self.classify(doc)).collect()
    }
}

impl<L: Ord + Clone> Classifier<L> for NaiveBayesClassifier<L> {
    /// # Errors
    /// - [`BayesError::InvalidSmoothing`] if the configured smoothing is negative
    ///   or not finite
    /// - [`BayesError::EmptyTrainingSet`] if `documents` is empty
    /// - [`BayesError::LabelCountMismatch`] if the slices differ in length
    fn train(&mut self, documents: &[Document], labels: &[L]) -> Result<()> {
        let smoothing = self.config.smoothing;
        if !smoothing.is_finite() || smoothing < 0.0 {
            return Err(BayesError::InvalidSmoothing { value: smoothing });
        }
        if documents.len() != labels.len() {
            return Err(BayesError::LabelCountMismatch {
                documents: documents.len(),
                labels: labels.len(),
            });
        }
        if documents.is_empty() {
            return Err(BayesError::EmptyTrainingSet);
        }

        let mut classes: BTreeMap<L, ClassStats> = BTreeMap::new();
        let mut vocabulary = BTreeSet::new();
        for (document, label) in documents.iter().zip(labels) {
            let stats = classes.entry(label.clone()).or_default();
            stats.documents += 1;
            for word in document {
                *stats.word_counts.entry(word.clone()).or_insert(0) += 1;
                vocabulary.insert(word.clone());
            }
        }

        tracing::debug!(
            documents = documents.len(),
            labels = classes.len(),
            vocabulary = vocabulary.len(),
            "trained naive bayes"
        );
        self.model = Some(Model {
            classes,
            vocabulary,
            total_documents: documents.len(),
        });
        Ok(())
    }

    /// # Errors
    /// Returns [`BayesError::UntrainedClassifier`] before training.
    fn predict(&self, documents: &[Document]) -> Result<Vec<L>> {
        documents.iter().map(|doc| self.classify(doc)).collect()
    }
}

/// Binary classification quality with respect to one positive label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub true_positives: usize,
    pub false_positives: usize,
    pub true_negatives: usize,
    pub false_negatives: usize,
}

impl Evaluation {
    /// Tallies `predicted` against `actual`, treating `positive` as the positive class.
    ///
    /// # Errors
    /// Returns [`BayesError::LabelCountMismatch`] if the slices differ in length.
    pub fn from_predictions<L: PartialEq>(
        predicted: &[L],
        actual: &[L],
        positive: &L,
    ) -> Result<Self> {
        if predicted.len() != actual.len() {
            return Err(BayesError::LabelCountMismatch {
                documents: predicted.len(),
                labels: actual.len(),
            });
        }
        let mut eval = Self {
            true_positives: 0,
            false_positives: 0,
            true_negatives: 0,
            false_negatives: 0,
        };
        for (p, a) in predicted.iter().zip(actual) {
            match (p == positive, a == positive) {
                (true, true) => eval.true_positives += 1,
                (true, false) => eval.false_positives += 1,
                (false, false) => eval.true_negatives += 1,
                (false, true) => eval.false_negatives += 1,
            }
        }
        Ok(eval)
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.true_positives + self.false_positives + self.true_negatives + self.false_negatives
    }

    #[must_use]
    pub fn accuracy(&self) -> f64 {
        ratio(self.true_positives + self.true_negatives, self.total())
    }

    #[must_use]
    pub fn precision(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_positives)
    }

    #[must_use]
    pub fn recall(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_negatives)
    }

    #[must_use]
    pub fn f1(&self) -> f64 {
        let (p, r) = (self.precision(), self.recall());
        if p + r == 0.0 { 0.0 } else { 2.0 * p * r / (p + r) }
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}
