//! Exact inference by enumeration over the joint distribution.
//!
//! The posterior of a query variable is obtained by summing the full joint
//! distribution over every assignment of the hidden variables that is consistent
//! with the evidence, then normalizing. Cost is exponential in the number of
//! hidden variables, so this is meant for small networks.

use crate::config::{InferenceConfig, Strategy};
use crate::error::{BayesError, Result};
use crate::{BayesNet, Evidence, ProbDist};
use std::collections::HashSet;
use std::time::{Duration, Instant};

/// Number of visited frames between two time-budget checks.
const BUDGET_CHECK_INTERVAL: u64 = 256;

/// Sums the entries of the joint distribution consistent with `evidence`.
///
/// `variables` must list *all* of the network's variables exactly once, in a
/// topological order (parents before children). Variables already in `evidence`
/// contribute their conditional probability; the rest are summed out over both values.
///
/// # Errors
/// - [`BayesError::UnknownVariable`] if a listed variable is not in `bn`
/// - [`BayesError::RepeatedVariable`] if a variable is listed twice
/// - [`BayesError::IncompleteVariableOrder`] if a network variable is left out
/// - [`BayesError::MissingParentValue`] if `variables` is not a topological order
/// - [`BayesError::DepthLimitExceeded`] if `variables` is longer than the default
///   recursion limit
///
/// # Example
/// ```rust
/// use bayesnet_rs::{BayesNet, CptSpec, Evidence, NodeSpec, enumerate_all};
///
/// let bn = BayesNet::from_specs([
///     NodeSpec::new("Rain", Vec::<String>::new(), 0.3),
///     NodeSpec::new("WetGrass", ["Rain"], CptSpec::single([(true, 0.9), (false, 0.1)])),
/// ])
/// .unwrap();
///
/// let p = enumerate_all(bn.variables(), &Evidence::from([("WetGrass", true)]), &bn).unwrap();
/// assert!((p - 0.34).abs() < 1e-12);
/// ```
pub fn enumerate_all<S: AsRef<str>>(
    variables: &[S],
    evidence: &Evidence,
    bn: &BayesNet,
) -> Result<f64> {
    Enumerator::new(bn).enumerate_all(variables, evidence)
}

/// Posterior distribution of `query` given `evidence`, using the default config.
///
/// # Errors
/// See [`Enumerator::ask`].
///
/// # Example
/// ```rust
/// use bayesnet_rs::{BayesNet, CptSpec, Evidence, NodeSpec, enumeration_ask};
///
/// let bn = BayesNet::from_specs([
///     NodeSpec::new("Rain", Vec::<String>::new(), 0.3),
///     NodeSpec::new("WetGrass", ["Rain"], CptSpec::single([(true, 0.9), (false, 0.1)])),
/// ])
/// .unwrap();
///
/// let posterior = enumeration_ask("Rain", &Evidence::from([("WetGrass", true)]), &bn).unwrap();
/// assert_eq!(posterior.show_approx(4), "false: 0.2059, true: 0.7941");
/// ```
pub fn enumeration_ask(query: &str, evidence: &Evidence, bn: &BayesNet) -> Result<ProbDist> {
    Enumerator::new(bn).ask(query, evidence)
}

/// Entry point for callers that only need a posterior: same as [`enumeration_ask`].
///
/// # Errors
/// See [`Enumerator::ask`].
pub fn infer(query: &str, evidence: &Evidence, bn: &BayesNet) -> Result<ProbDist> {
    enumeration_ask(query, evidence, bn)
}

/// Configurable enumeration engine borrowing a network.
///
/// An `Enumerator` holds no per-call state, so one instance can serve many
/// queries, including concurrently from several threads.
#[derive(Debug, Clone)]
pub struct Enumerator<'a> {
    bn: &'a BayesNet,
    config: InferenceConfig,
}

impl<'a> Enumerator<'a> {
    #[must_use]
    pub fn new(bn: &'a BayesNet) -> Self {
        Self::with_config(bn, InferenceConfig::default())
    }

    #[must_use]
    pub fn with_config(bn: &'a BayesNet, config: InferenceConfig) -> Self {
        Self { bn, config }
    }

    #[must_use]
    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    /// Posterior distribution of `query` given `evidence`.
    ///
    /// # Errors
    /// - [`BayesError::InvalidQuery`] if `query` is assigned in `evidence`
    /// - [`BayesError::UnknownVariable`] if `query` or an evidence variable is not
    ///   in the network
    /// - [`BayesError::DegenerateDistribution`] if the evidence has zero probability
    /// - [`BayesError::DepthLimitExceeded`] / [`BayesError::InferenceTimeout`] when
    ///   the configured resource limits are hit
    pub fn ask(&self, query: &str, evidence: &Evidence) -> Result<ProbDist> {
        if evidence.contains(query) {
            return Err(BayesError::invalid_query(query));
        }
        self.bn.node_for(query)?;
        if let Some(unknown) = evidence.variables().find(|v| !self.bn.contains(v)) {
            return Err(BayesError::unknown_variable(unknown));
        }

        let mut walk = self.start(self.bn.len())?;
        let mut dist = ProbDist::new(query);
        for value in self.bn.domain(query) {
            let extended = evidence.extended(query, value);
            let mass = walk.run(self.bn.variables(), &extended)?;
            dist.set(value, mass);
        }
        dist.normalize()?;

        tracing::debug!(
            query,
            evidence = %evidence,
            frames = walk.visited,
            p_true = dist.get(true),
            "enumeration finished"
        );
        Ok(dist)
    }

    /// [`enumerate_all`] under this enumerator's configuration.
    ///
    /// The recursion limit applies to the length of `variables`, which is the depth
    /// the walk will reach.
    ///
    /// # Errors
    /// See [`enumerate_all`], plus the configured resource limits.
    pub fn enumerate_all<S: AsRef<str>>(&self, variables: &[S], evidence: &Evidence) -> Result<f64> {
        let mut walk = self.start(variables.len())?;
        self.check_order(variables)?;
        let mass = walk.run(variables, evidence)?;
        tracing::trace!(frames = walk.visited, mass, "enumerate_all");
        Ok(mass)
    }

    /// Answers a batch of independent `(query, evidence)` pairs.
    ///
    /// Results are returned in input order; one failing query does not affect the
    /// others. With the `parallel` feature the queries run on the rayon pool.
    #[must_use]
    pub fn ask_many(&self, queries: &[(String, Evidence)]) -> Vec<Result<ProbDist>> {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            queries
                .par_iter()
                .map(|(query, evidence)| self.ask(query, evidence))
                .collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            queries
                .iter()
                .map(|(query, evidence)| self.ask(query, evidence))
                .collect()
        }
    }

    /// Every network variable must appear exactly once.
    fn check_order<S: AsRef<str>>(&self, variables: &[S]) -> Result<()> {
        let mut seen = HashSet::with_capacity(variables.len());
        for variable in variables {
            let variable = variable.as_ref();
            self.bn.node_for(variable)?;
            if !seen.insert(variable) {
                return Err(BayesError::RepeatedVariable {
                    variable: variable.to_string(),
                });
            }
        }
        if variables.len() != self.bn.len() {
            return Err(BayesError::IncompleteVariableOrder {
                expected: self.bn.len(),
                actual: variables.len(),
            });
        }
        Ok(())
    }

    fn start(&self, depth: usize) -> Result<Walk<'a>> {
        if self.config.strategy == Strategy::Recursive && depth > self.config.max_depth {
            return Err(BayesError::DepthLimitExceeded {
                depth,
                limit: self.config.max_depth,
            });
        }
        Ok(Walk {
            bn: self.bn,
            strategy: self.config.strategy,
            budget: self.config.time_budget.map(|b| (Instant::now(), b)),
            visited: 0,
        })
    }
}

/// State of one inference call: the frame counter and the deadline.
struct Walk<'a> {
    bn: &'a BayesNet,
    strategy: Strategy,
    budget: Option<(Instant, Duration)>,
    visited: u64,
}

impl Walk<'_> {
    fn run<S: AsRef<str>>(&mut self, variables: &[S], evidence: &Evidence) -> Result<f64> {
        match self.strategy {
            Strategy::Recursive => self.recurse(variables, evidence),
            Strategy::ExplicitStack => self.iterate(variables, evidence),
        }
    }

    fn tick(&mut self) -> Result<()> {
        let due = self.visited % BUDGET_CHECK_INTERVAL == 0;
        self.visited += 1;
        if let (true, Some((started, budget))) = (due, self.budget) {
            let elapsed = started.elapsed();
            if elapsed >= budget {
                return Err(BayesError::InferenceTimeout { elapsed, budget });
            }
        }
        Ok(())
    }

    fn recurse<S: AsRef<str>>(&mut self, variables: &[S], evidence: &Evidence) -> Result<f64> {
        self.tick()?;
        let Some((first, rest)) = variables.split_first() else {
            return Ok(1.0);
        };
        let y = first.as_ref();
        let node = self.bn.node_for(y)?;

        if let Some(value) = evidence.get(y) {
            return Ok(node.p(value, evidence)? * self.recurse(rest, evidence)?);
        }

        let mut total = 0.0;
        for value in self.bn.domain(y) {
            let p = node.p(value, evidence)?;
            total += p * self.recurse(rest, &evidence.extended(y, value))?;
        }
        Ok(total)
    }

    /// Same walk as [`Walk::recurse`] with frames of
    /// `(position, evidence snapshot, product of factors so far)` on the heap.
    fn iterate<S: AsRef<str>>(&mut self, variables: &[S], evidence: &Evidence) -> Result<f64> {
        let mut total = 0.0;
        let mut stack = vec![(0usize, evidence.clone(), 1.0f64)];

        while let Some((pos, event, weight)) = stack.pop() {
            self.tick()?;
            let Some(y) = variables.get(pos).map(AsRef::as_ref) else {
                total += weight;
                continue;
            };
            let node = self.bn.node_for(y)?;

            if let Some(value) = event.get(y) {
                let p = node.p(value, &event)?;
                stack.push((pos + 1, event, weight * p));
                continue;
            }
            // false is pushed first so the true branch is expanded first
            for value in [false, true] {
                let p = node.p(value, &event)?;
                stack.push((pos + 1, event.extended(y, value), weight * p));
            }
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CptSpec, NodeSpec};
    use approx::assert_relative_eq;
    use tracing_test::traced_test;

    fn rain() -> BayesNet {
        BayesNet::from_specs([
            NodeSpec::new("Rain", Vec::<String>::new(), 0.3),
            NodeSpec::new("WetGrass", ["Rain"], CptSpec::single([(true, 0.9), (false, 0.1)])),
        ])
        .unwrap()
    }

    fn burglary() -> BayesNet {
        BayesNet::from_specs([
            NodeSpec::new("Burglary", Vec::<String>::new(), 0.001),
            NodeSpec::new("Earthquake", Vec::<String>::new(), 0.002),
            NodeSpec::new(
                "Alarm",
                ["Burglary", "Earthquake"],
                CptSpec::table([
                    ([true, true], 0.95),
                    ([true, false], 0.94),
                    ([false, true], 0.29),
                    ([false, false], 0.001),
                ]),
            ),
            NodeSpec::new("JohnCalls", ["Alarm"], CptSpec::single([(true, 0.90), (false, 0.05)])),
            NodeSpec::new("MaryCalls", ["Alarm"], CptSpec::single([(true, 0.70), (false, 0.01)])),
        ])
        .unwrap()
    }

    /// `len` nodes where node `i` depends on node `i - 1`.
    fn chain(len: usize) -> BayesNet {
        let mut bn = BayesNet::new();
        bn.add(NodeSpec::new("N0", Vec::<String>::new(), 0.4)).unwrap();
        for i in 1..len {
            bn.add(NodeSpec::new(
                format!("N{i}"),
                [format!("N{}", i - 1)],
                CptSpec::single([(true, 1.0), (false, 0.3)]),
            ))
            .unwrap();
        }
        bn
    }

    /// Every chain variable except `N0` observed as true.
    fn chain_evidence(bn: &BayesNet) -> Evidence {
        bn.variables().iter().skip(1).map(|v| (v.clone(), true)).collect()
    }

    #[test]
    fn test_empty_variable_list_is_one() {
        let bn = BayesNet::new();
        let vars: [&str; 0] = [];
        assert_eq!(enumerate_all(&vars, &Evidence::new(), &bn).unwrap(), 1.0);
    }

    #[test]
    fn test_repeated_variable_rejected() {
        let bn = chain(2);
        let err = enumerate_all(&["N0"; 50], &Evidence::new(), &bn).unwrap_err();
        assert_eq!(
            err,
            BayesError::RepeatedVariable {
                variable: "N0".to_string()
            }
        );
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidQuery);
    }

    #[test]
    fn test_partial_variable_list_rejected() {
        let bn = rain();
        let err = enumerate_all(&["Rain"], &Evidence::new(), &bn).unwrap_err();
        assert_eq!(
            err,
            BayesError::IncompleteVariableOrder {
                expected: 2,
                actual: 1
            }
        );

        let err = enumerate_all(&["Rain", "Snow"], &Evidence::new(), &bn).unwrap_err();
        assert_eq!(err, BayesError::unknown_variable("Snow"));
    }

    #[test]
    fn test_depth_limit_uses_variable_list_length() {
        let bn = chain(5);
        let shallow = Enumerator::with_config(
            &bn,
            InferenceConfig {
                max_depth: 3,
                ..InferenceConfig::default()
            },
        );
        let err = shallow.enumerate_all(bn.variables(), &Evidence::new()).unwrap_err();
        assert_eq!(err, BayesError::DepthLimitExceeded { depth: 5, limit: 3 });

        let err = shallow.enumerate_all(&["N0"; 50], &Evidence::new()).unwrap_err();
        assert_eq!(err, BayesError::DepthLimitExceeded { depth: 50, limit: 3 });
    }

    #[test]
    fn test_deep_chain_on_small_stack() {
        let handle = std::thread::Builder::new()
            .stack_size(2 << 20)
            .spawn(|| {
                let limit = InferenceConfig::default().max_depth;

                let bn = chain(limit);
                let at_limit = Enumerator::new(&bn).ask("N0", &chain_evidence(&bn));
                assert!(at_limit.is_ok());

                let bn = chain(4000);
                let evidence = chain_evidence(&bn);
                let err = Enumerator::new(&bn).ask("N0", &evidence).unwrap_err();
                assert_eq!(
                    err,
                    BayesError::DepthLimitExceeded { depth: 4000, limit }
                );

                let stacked = Enumerator::with_config(
                    &bn,
                    InferenceConfig {
                        strategy: Strategy::ExplicitStack,
                        ..InferenceConfig::default()
                    },
                );
                let posterior = stacked.ask("N0", &evidence).unwrap();
                assert_relative_eq!(posterior[true], 0.4 / 0.58, epsilon = 1e-12);
            })
            .unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn test_enumerate_all_without_evidence_sums_to_one() {
        let bn = burglary();
        let total = enumerate_all(bn.variables(), &Evidence::new(), &bn).unwrap();
        assert_relative_eq!(total, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rain_wet_grass_posterior() {
        let bn = rain();
        let posterior = enumeration_ask("Rain", &Evidence::from([("WetGrass", true)]), &bn).unwrap();

        assert_relative_eq!(posterior[true], 0.27 / 0.34, epsilon = 1e-12);
        assert_relative_eq!(posterior[false], 0.07 / 0.34, epsilon = 1e-12);
        assert_eq!(posterior.show_approx(4), "false: 0.2059, true: 0.7941");
    }

    #[test]
    #[traced_test]
    fn test_burglary_posterior() {
        let bn = burglary();
        let evidence = Evidence::from([("JohnCalls", true), ("MaryCalls", true)]);
        let posterior = enumeration_ask("Burglary", &evidence, &bn).unwrap();

        assert_eq!(posterior.show_approx(3), "false: 0.716, true: 0.284");
        assert!(logs_contain("enumeration finished"));
    }

    #[test]
    fn test_root_prior_without_evidence() {
        let bn = burglary();
        let posterior = enumeration_ask("Earthquake", &Evidence::new(), &bn).unwrap();
        assert_relative_eq!(posterior[true], 0.002, epsilon = 1e-12);
    }

    #[test]
    fn test_query_in_evidence_rejected() {
        let bn = rain();
        let err = infer("Rain", &Evidence::from([("Rain", true)]), &bn).unwrap_err();
        assert_eq!(err, BayesError::invalid_query("Rain"));
    }

    #[test]
    fn test_unknown_names_rejected() {
        let bn = rain();
        assert_eq!(
            infer("Snow", &Evidence::new(), &bn).unwrap_err(),
            BayesError::unknown_variable("Snow")
        );
        assert_eq!(
            infer("Rain", &Evidence::from([("Snow", true)]), &bn).unwrap_err(),
            BayesError::unknown_variable("Snow")
        );
    }

    #[test]
    fn test_zero_probability_evidence_is_degenerate() {
        let bn = BayesNet::from_specs([
            NodeSpec::new("A", Vec::<String>::new(), 0.5),
            NodeSpec::new("B", ["A"], CptSpec::single([(true, 1.0), (false, 0.0)])),
            NodeSpec::new("C", Vec::<String>::new(), 0.0),
        ])
        .unwrap();
        let err = infer("A", &Evidence::from([("C", true)]), &bn).unwrap_err();
        assert_eq!(err, BayesError::degenerate("A"));
    }

    #[test]
    fn test_non_topological_order_fails_lookup() {
        let bn = rain();
        let err = enumerate_all(&["WetGrass", "Rain"], &Evidence::new(), &bn).unwrap_err();
        assert_eq!(err, BayesError::missing_parent_value("WetGrass", "Rain"));
    }

    #[test]
    fn test_caller_evidence_is_not_mutated() {
        let bn = burglary();
        let evidence = Evidence::from([("JohnCalls", true)]);
        let snapshot = evidence.clone();
        enumeration_ask("Alarm", &evidence, &bn).unwrap();
        assert_eq!(evidence, snapshot);
    }

    #[test]
    fn test_explicit_stack_matches_recursion() {
        let bn = burglary();
        let stacked = Enumerator::with_config(
            &bn,
            InferenceConfig {
                strategy: Strategy::ExplicitStack,
                ..InferenceConfig::default()
            },
        );
        let recursive = Enumerator::new(&bn);

        for (query, evidence) in [
            ("Burglary", Evidence::from([("JohnCalls", true), ("MaryCalls", true)])),
            ("Alarm", Evidence::from([("Earthquake", true)])),
            ("MaryCalls", Evidence::new()),
        ] {
            let a = recursive.ask(query, &evidence).unwrap();
            let b = stacked.ask(query, &evidence).unwrap();
            assert_relative_eq!(a[true], b[true], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_depth_limit() {
        let bn = burglary();
        let shallow = Enumerator::with_config(
            &bn,
            InferenceConfig {
                max_depth: 3,
                ..InferenceConfig::default()
            },
        );
        let err = shallow.ask("Alarm", &Evidence::new()).unwrap_err();
        assert_eq!(err, BayesError::DepthLimitExceeded { depth: 5, limit: 3 });

        // the explicit stack is not bound by max_depth
        let stacked = Enumerator::with_config(
            &bn,
            InferenceConfig {
                strategy: Strategy::ExplicitStack,
                max_depth: 3,
                time_budget: None,
            },
        );
        assert!(stacked.ask("Alarm", &Evidence::new()).is_ok());
    }

    #[test]
    fn test_zero_time_budget_times_out() {
        let bn = burglary();
        for strategy in [Strategy::Recursive, Strategy::ExplicitStack] {
            let engine = Enumerator::with_config(
                &bn,
                InferenceConfig {
                    strategy,
                    time_budget: Some(Duration::ZERO),
                    ..InferenceConfig::default()
                },
            );
            let err = engine.ask("Burglary", &Evidence::new()).unwrap_err();
            assert!(matches!(err, BayesError::InferenceTimeout { .. }));
        }
    }

    #[test]
    fn test_ask_many_keeps_order_and_isolates_failures() {
        let bn = rain();
        let engine = Enumerator::new(&bn);
        let results = engine.ask_many(&[
            ("Rain".to_string(), Evidence::from([("WetGrass", true)])),
            ("Rain".to_string(), Evidence::from([("Rain", true)])),
            ("WetGrass".to_string(), Evidence::new()),
        ]);

        assert_eq!(results.len(), 3);
        assert_relative_eq!(results[0].as_ref().unwrap()[true], 0.27 / 0.34, epsilon = 1e-12);
        assert_eq!(results[1], Err(BayesError::invalid_query("Rain")));
        assert_relative_eq!(results[2].as_ref().unwrap()[true], 0.34, epsilon = 1e-12);
    }
}
