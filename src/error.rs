//! Error types for the bayesnet-rs library.
//!
//! This module defines all error types that can occur while building a network,
//! running inference over it, or training and applying the text classifier.

use std::time::Duration;
use thiserror::Error;

/// The main error type for the bayesnet-rs library.
///
/// Construction problems are reported as soon as a node is added; inference problems
/// abort the whole call. No variant carries a partial result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BayesError {
    /// A conditional probability lies outside [0, 1] or is NaN.
    #[error("Invalid probability for '{variable}': {value} (must be in range [0, 1])")]
    InvalidProbability {
        /// The variable whose table holds the value
        variable: String,
        /// The offending probability
        value: f64,
    },

    /// A table key does not have one value per parent.
    #[error("Arity mismatch for '{variable}': expected {expected} parent values, got {actual}")]
    ArityMismatch {
        /// The variable whose table holds the key
        variable: String,
        /// Number of declared parents
        expected: usize,
        /// Length of the offending key
        actual: usize,
    },

    /// A convenience table form was used with the wrong number of parents.
    #[error("Table shape mismatch for '{variable}': {shape} form needs {needed}, got {parents} parents")]
    ShapeMismatch {
        /// The variable being constructed
        variable: String,
        /// Name of the convenience form
        shape: &'static str,
        /// Parent count the form supports
        needed: &'static str,
        /// Number of declared parents
        parents: usize,
    },

    /// A table does not cover every parent-value combination.
    #[error("Incomplete table for '{variable}': expected {expected} entries, got {actual}")]
    IncompleteTable {
        /// The variable being constructed
        variable: String,
        /// 2^|parents|
        expected: usize,
        /// Distinct entries supplied
        actual: usize,
    },

    /// A variable was added to a network twice.
    #[error("Duplicate variable: '{variable}' is already in the network")]
    DuplicateVariable {
        /// The repeated name
        variable: String,
    },

    /// A node names a parent that has not been added yet.
    #[error("Unknown parent: '{parent}' of '{variable}' is not in the network")]
    UnknownParent {
        /// The node being added
        variable: String,
        /// The missing parent
        parent: String,
    },

    /// A variable name is not part of the network.
    #[error("Unknown variable: '{variable}'")]
    UnknownVariable {
        /// The name that was looked up
        variable: String,
    },

    /// An assignment does not give a value to one of a node's parents.
    #[error("Missing value for parent '{parent}' of '{variable}'")]
    MissingParentValue {
        /// The node being evaluated
        variable: String,
        /// The unassigned parent
        parent: String,
    },

    /// A fully-populated table lacks the requested row.
    #[error("Missing table entry for '{variable}' at {key:?}")]
    MissingTableEntry {
        /// The node being evaluated
        variable: String,
        /// The parent-value tuple that was not found
        key: Vec<bool>,
    },

    /// A variable list for enumeration names the same variable twice.
    #[error("Repeated variable: '{variable}' appears more than once in the variable list")]
    RepeatedVariable {
        /// The repeated name
        variable: String,
    },

    /// A variable list for enumeration leaves out network variables.
    #[error("Incomplete variable list: expected all {expected} network variables, got {actual}")]
    IncompleteVariableOrder {
        /// Number of variables in the network
        expected: usize,
        /// Length of the supplied list
        actual: usize,
    },

    /// The query variable also appears in the evidence.
    #[error("Invalid query: '{variable}' must be distinct from evidence")]
    InvalidQuery {
        /// The query variable
        variable: String,
    },

    /// Every outcome has zero mass, so the distribution cannot be normalized.
    #[error("Degenerate distribution over '{variable}': total mass is zero")]
    DegenerateDistribution {
        /// The variable the distribution is over
        variable: String,
    },

    /// A recursive walk would exceed the configured depth.
    #[error("Depth limit exceeded: {depth} variables (limit {limit})")]
    DepthLimitExceeded {
        /// Recursion depth the walk would need
        depth: usize,
        /// Configured maximum
        limit: usize,
    },

    /// Inference ran past its time budget.
    #[error("Inference timeout after {elapsed:?} (budget {budget:?})")]
    InferenceTimeout {
        /// Time spent before the walk was abandoned
        elapsed: Duration,
        /// Configured budget
        budget: Duration,
    },

    /// A classifier was trained on no documents.
    #[error("Empty training set: at least one document is required")]
    EmptyTrainingSet,

    /// Documents and labels have different lengths.
    #[error("Label count mismatch: {documents} documents, {labels} labels")]
    LabelCountMismatch {
        /// Number of documents
        documents: usize,
        /// Number of labels
        labels: usize,
    },

    /// `predict` was called before `train`.
    #[error("Classifier has not been trained")]
    UntrainedClassifier,

    /// A ratio parameter is outside its allowed range.
    #[error("Invalid ratio '{parameter}': {value} (must be in range [0, 1])")]
    InvalidRatio {
        /// The parameter name
        parameter: &'static str,
        /// The offending value
        value: f64,
    },

    /// Additive smoothing is negative, infinite or NaN.
    #[error("Invalid smoothing: {value} (must be finite and non-negative)")]
    InvalidSmoothing {
        /// The offending value
        value: f64,
    },

    /// Reading a corpus archive or directory failed.
    #[error("Corpus error at '{path}': {reason}")]
    Corpus {
        /// The path being read
        path: String,
        /// The underlying failure
        reason: String,
    },
}

/// A specialized `Result` type for network and classifier operations.
///
/// This is a convenience type alias for `Result<T, BayesError>`.
pub type Result<T> = std::result::Result<T, BayesError>;

/// Coarse classification of a [`BayesError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed network, raised while building it
    Validation,
    /// Unknown name or incomplete assignment
    Lookup,
    /// Query variable present in the evidence, or a malformed variable list
    InvalidQuery,
    /// Zero-mass distribution
    Degenerate,
    /// Depth or time budget exhausted
    ResourceLimit,
    /// Text pipeline input problem
    Data,
}

impl BayesError {
    /// Returns the category this error belongs to.
    ///
    /// # Example
    /// ```
    /// use bayesnet_rs::error::{BayesError, ErrorKind};
    ///
    /// let error = BayesError::unknown_variable("Rain");
    /// assert_eq!(error.kind(), ErrorKind::Lookup);
    /// ```
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidProbability { .. }
            | Self::ArityMismatch { .. }
            | Self::ShapeMismatch { .. }
            | Self::IncompleteTable { .. }
            | Self::DuplicateVariable { .. }
            | Self::UnknownParent { .. } => ErrorKind::Validation,
            Self::UnknownVariable { .. }
            | Self::MissingParentValue { .. }
            | Self::MissingTableEntry { .. } => ErrorKind::Lookup,
            Self::InvalidQuery { .. }
            | Self::RepeatedVariable { .. }
            | Self::IncompleteVariableOrder { .. } => ErrorKind::InvalidQuery,
            Self::DegenerateDistribution { .. } => ErrorKind::Degenerate,
            Self::DepthLimitExceeded { .. } | Self::InferenceTimeout { .. } => {
                ErrorKind::ResourceLimit
            }
            Self::EmptyTrainingSet
            | Self::LabelCountMismatch { .. }
            | Self::UntrainedClassifier
            | Self::InvalidRatio { .. }
            | Self::InvalidSmoothing { .. }
            | Self::Corpus { .. } => ErrorKind::Data,
        }
    }

    /// Create an error for a probability outside [0, 1].
    ///
    /// # Example
    /// ```
    /// use bayesnet_rs::error::BayesError;
    ///
    /// let error = BayesError::invalid_probability("Rain", 1.5);
    /// assert!(error.to_string().contains("1.5"));
    /// ```
    pub fn invalid_probability(variable: impl Into<String>, value: f64) -> Self {
        Self::InvalidProbability {
            variable: variable.into(),
            value,
        }
    }

    /// Create an error for a table key of the wrong length.
    pub fn arity_mismatch(variable: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::ArityMismatch {
            variable: variable.into(),
            expected,
            actual,
        }
    }

    /// Create an error for a table missing parent-value combinations.
    pub fn incomplete_table(variable: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::IncompleteTable {
            variable: variable.into(),
            expected,
            actual,
        }
    }

    /// Create an error for a repeated variable name.
    ///
    /// # Example
    /// ```
    /// use bayesnet_rs::error::BayesError;
    ///
    /// let error = BayesError::duplicate_variable("Rain");
    /// assert!(error.to_string().contains("already in the network"));
    /// ```
    pub fn duplicate_variable(variable: impl Into<String>) -> Self {
        Self::DuplicateVariable {
            variable: variable.into(),
        }
    }

    /// Create an error for a parent that is not yet in the network.
    pub fn unknown_parent(variable: impl Into<String>, parent: impl Into<String>) -> Self {
        Self::UnknownParent {
            variable: variable.into(),
            parent: parent.into(),
        }
    }

    /// Create an error for a name that is not in the network.
    ///
    /// # Example
    /// ```
    /// use bayesnet_rs::error::BayesError;
    ///
    /// let error = BayesError::unknown_variable("Sprinkler");
    /// assert_eq!(error.to_string(), "Unknown variable: 'Sprinkler'");
    /// ```
    pub fn unknown_variable(variable: impl Into<String>) -> Self {
        Self::UnknownVariable {
            variable: variable.into(),
        }
    }

    /// Create an error for an assignment that skips a parent.
    pub fn missing_parent_value(variable: impl Into<String>, parent: impl Into<String>) -> Self {
        Self::MissingParentValue {
            variable: variable.into(),
            parent: parent.into(),
        }
    }

    /// Create an error for a query variable that is also evidence.
    pub fn invalid_query(variable: impl Into<String>) -> Self {
        Self::InvalidQuery {
            variable: variable.into(),
        }
    }

    /// Create an error for a distribution whose masses sum to zero.
    pub fn degenerate(variable: impl Into<String>) -> Self {
        Self::DegenerateDistribution {
            variable: variable.into(),
        }
    }

    /// Create an error for a ratio outside [0, 1].
    pub fn invalid_ratio(parameter: &'static str, value: f64) -> Self {
        Self::InvalidRatio { parameter, value }
    }

    /// Create an error for a failed corpus read.
    ///
    /// # Example
    /// ```
    /// use bayesnet_rs::error::BayesError;
    ///
    /// let error = BayesError::corpus("enron1.tar.gz", "not found");
    /// assert!(error.to_string().contains("enron1.tar.gz"));
    /// ```
    pub fn corpus(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::Corpus {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
