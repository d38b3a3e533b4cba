use bayesnet_rs::classifier::{Classifier, Evaluation, NaiveBayesClassifier};
use bayesnet_rs::config::{NaiveBayesConfig, SplitConfig};
use bayesnet_rs::corpus::{self, HAM_LABEL, SPAM_LABEL};
use bayesnet_rs::text::clean_documents;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::Level;

/// Spam Filtering with Naive Bayes
///
/// Usage: `spam_filter <enron1.tar.gz | extracted-dir> [--verbose] [--smoothing]`
///
/// Reads an Enron-style corpus, tokenizes every email, trains on a seeded 80%
/// split and reports how well the held-out 20% is classified.
fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let verbose = args.iter().any(|a| a == "--verbose");
    let smoothing = if args.iter().any(|a| a == "--smoothing") { 1.0 } else { 0.0 };
    tracing_subscriber::fmt()
        .with_max_level(if verbose { Level::DEBUG } else { Level::INFO })
        .init();

    let Some(path) = args.iter().find(|a| !a.starts_with("--")).map(PathBuf::from) else {
        eprintln!("usage: spam_filter <enron1.tar.gz | extracted-dir> [--verbose] [--smoothing]");
        return ExitCode::FAILURE;
    };

    match run(&path, smoothing) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "spam filter failed");
            ExitCode::FAILURE
        }
    }
}

fn run(path: &Path, smoothing: f64) -> bayesnet_rs::Result<()> {
    let emails = if path.is_dir() {
        corpus::read_dataset_dir(path)?
    } else {
        corpus::extract_dataset(path)?
    };

    println!("📬 Spam Filter");
    println!("==============\n");
    println!("📊 Corpus:");
    println!("   Ham:  {}", emails.count(HAM_LABEL));
    println!("   Spam: {}", emails.count(SPAM_LABEL));

    let documents = clean_documents(&emails.emails);
    let split = corpus::split_data(&documents, &emails.labels, &SplitConfig::default())?;
    println!("   Train/Test: {}/{}\n", split.train.len(), split.test.len());

    let mut nb = NaiveBayesClassifier::with_config(NaiveBayesConfig { smoothing });
    nb.train(&split.train, &split.train_labels)?;
    let predicted = nb.predict(&split.test)?;

    let spam = SPAM_LABEL.to_string();
    let eval = Evaluation::from_predictions(&predicted, &split.test_labels, &spam)?;
    println!("✅ Held-out Results (positive = spam):");
    println!("   Accuracy:  {:.2}%", eval.accuracy() * 100.0);
    println!("   Precision: {:.2}%", eval.precision() * 100.0);
    println!("   Recall:    {:.2}%", eval.recall() * 100.0);
    println!("   F1:        {:.3}", eval.f1());
    println!(
        "   Confusion: tp={} fp={} tn={} fn={}",
        eval.true_positives, eval.false_positives, eval.true_negatives, eval.false_negatives
    );

    Ok(())
}
