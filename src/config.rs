//! Configuration for inference and the text-classification pipeline.

use std::time::Duration;

/// How the enumeration tree is walked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Direct recursion, one native stack frame per variable
    #[default]
    Recursive,
    /// Heap-allocated frame stack; native stack use is constant in network size
    ExplicitStack,
}

/// Settings for [`crate::inference::Enumerator`].
///
/// # Example
/// ```rust
/// use bayesnet_rs::config::{InferenceConfig, Strategy};
/// use std::time::Duration;
///
/// let config = InferenceConfig {
///     strategy: Strategy::ExplicitStack,
///     time_budget: Some(Duration::from_secs(1)),
///     ..InferenceConfig::default()
/// };
/// assert_eq!(config.max_depth, 512);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceConfig {
    pub strategy: Strategy,
    /// Longest variable list the recursive strategy will walk. The default fits a
    /// 2 MiB thread stack in a debug build.
    pub max_depth: usize,
    /// Abort the call once this much wall-clock time has passed
    pub time_budget: Option<Duration>,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::Recursive,
            max_depth: 512,
            time_budget: None,
        }
    }
}

/// Settings for [`crate::corpus::split_data`].
#[derive(Debug, Clone, PartialEq)]
pub struct SplitConfig {
    /// Fraction of the shuffled data that goes to the training set
    pub train_ratio: f64,
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            train_ratio: 0.8,
            seed: 13,
        }
    }
}

/// Settings for [`crate::classifier::NaiveBayesClassifier`].
#[derive(Debug, Clone, PartialEq)]
pub struct NaiveBayesConfig {
    /// Additive smoothing applied to per-label word frequencies.
    ///
    /// `0.0` uses raw relative frequencies, so a word never seen under a label
    /// rules that label out. Must be finite and non-negative.
    pub smoothing: f64,
}

impl Default for NaiveBayesConfig {
    fn default() -> Self {
        Self { smoothing: 0.0 }
    }
}
