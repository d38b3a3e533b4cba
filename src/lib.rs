//! # bayesnet-rs
//!
//! Exact inference over Bayesian networks of boolean variables, plus a small
//! bag-of-words Naive Bayes classifier for labelled text.
//!
//! ## Core Concept: Inference by Enumeration
//!
//! A network is a set of nodes, each holding a conditional probability table
//! (CPT) for its variable given its parents. The posterior of a query variable
//! is obtained by summing the joint distribution over every hidden variable:
//!
//! ```rust
//! use bayesnet_rs::{BayesNet, CptSpec, Evidence, NodeSpec, enumeration_ask};
//!
//! let bn = BayesNet::from_specs([
//!     NodeSpec::new("Burglary", Vec::<String>::new(), 0.001),
//!     NodeSpec::new("Earthquake", Vec::<String>::new(), 0.002),
//!     NodeSpec::new(
//!         "Alarm",
//!         ["Burglary", "Earthquake"],
//!         CptSpec::table([
//!             ([true, true], 0.95),
//!             ([true, false], 0.94),
//!             ([false, true], 0.29),
//!             ([false, false], 0.001),
//!         ]),
//!     ),
//!     NodeSpec::new("JohnCalls", ["Alarm"], CptSpec::single([(true, 0.90), (false, 0.05)])),
//!     NodeSpec::new("MaryCalls", ["Alarm"], CptSpec::single([(true, 0.70), (false, 0.01)])),
//! ])
//! .unwrap();
//!
//! let evidence = Evidence::from([("JohnCalls", true), ("MaryCalls", true)]);
//! let posterior = enumeration_ask("Burglary", &evidence, &bn).unwrap();
//! assert_eq!(posterior.show_approx(3), "false: 0.716, true: 0.284");
//! ```
//!
//! ## Features
//!
//! - **Validated CPTs**: every table is checked for shape, range and completeness
//!   when a node is built
//! - **Two walk strategies**: plain recursion or an explicit heap stack, with
//!   optional depth and time limits ([`config::InferenceConfig`])
//! - **Batch queries**: [`Enumerator::ask_many`], run on rayon with the
//!   `parallel` feature
//! - **Spam filtering pipeline**: corpus extraction, tokenization, seeded
//!   train/test splits and a [`classifier::NaiveBayesClassifier`]

pub mod classifier;
pub mod config;
pub mod corpus;
pub mod error;
pub mod evidence;
pub mod inference;
pub mod network;
pub mod node;
pub mod prob_dist;
pub mod text;

pub use error::{BayesError, Result};
pub use evidence::Evidence;
pub use inference::{Enumerator, enumerate_all, enumeration_ask, infer};
pub use network::BayesNet;
pub use node::{BayesNode, CptSpec, NodeSpec};
pub use prob_dist::ProbDist;
