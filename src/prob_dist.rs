use crate::error::{BayesError, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Index;

/// A discrete probability distribution over the outcomes of one boolean variable.
///
/// Masses may be unnormalized while a distribution is being accumulated; call
/// [`ProbDist::normalize`] to turn them into probabilities.
///
/// # Example
/// ```rust
/// use bayesnet_rs::ProbDist;
///
/// let mut dist = ProbDist::new("Coin");
/// dist.set(true, 3.0);
/// dist.set(false, 1.0);
/// dist.normalize().unwrap();
///
/// assert_eq!(dist.get(true), 0.75);
/// assert_eq!(dist.show_approx(2), "false: 0.25, true: 0.75");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ProbDist {
    variable: String,
    masses: BTreeMap<bool, f64>,
}

impl ProbDist {
    /// Creates an empty distribution over `variable`.
    #[must_use]
    pub fn new(variable: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
            masses: BTreeMap::new(),
        }
    }

    /// Name of the variable this distribution is over.
    #[must_use]
    pub fn variable(&self) -> &str {
        &self.variable
    }

    /// Stores `mass` for `outcome`, replacing any previous value.
    pub fn set(&mut self, outcome: bool, mass: f64) {
        self.masses.insert(outcome, mass);
    }

    /// Mass stored for `outcome`; outcomes never set read as zero.
    #[must_use]
    pub fn get(&self, outcome: bool) -> f64 {
        self.masses.get(&outcome).copied().unwrap_or(0.0)
    }

    /// Sum of all stored masses.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.masses.values().sum()
    }

    /// Iterates over `(outcome, mass)` pairs, `false` first.
    pub fn iter(&self) -> impl Iterator<Item = (bool, f64)> + '_ {
        self.masses.iter().map(|(k, v)| (*k, *v))
    }

    /// Divides every mass by the total so that they sum to one.
    ///
    /// # Errors
    /// Returns [`BayesError::DegenerateDistribution`] if the total mass is zero,
    /// leaving the stored masses untouched.
    pub fn normalize(&mut self) -> Result<&mut Self> {
        let total = self.total();
        if total == 0.0 || !total.is_finite() {
            return Err(BayesError::degenerate(&self.variable));
        }
        for mass in self.masses.values_mut() {
            *mass /= total;
        }
        Ok(self)
    }

    /// Renders the outcomes as `"false: m, true: m"` rounded to `decimals` places.
    #[must_use]
    pub fn show_approx(&self, decimals: usize) -> String {
        self.masses
            .iter()
            .map(|(outcome, mass)| format!("{outcome}: {mass:.decimals$}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Index<bool> for ProbDist {
    type Output = f64;

    fn index(&self, outcome: bool) -> &f64 {
        self.masses.get(&outcome).unwrap_or(&0.0)
    }
}

impl fmt::Display for ProbDist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P({}): {}", self.variable, self.show_approx(3))
    }
}
