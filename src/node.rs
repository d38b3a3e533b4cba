use crate::Evidence;
use crate::error::{BayesError, Result};
use rand::Rng;
use std::collections::BTreeMap;
use std::fmt;

/// The conditional probability table as supplied by a caller.
///
/// Only the construction boundary sees this union; a [`BayesNode`] always stores
/// the canonical tuple-keyed form.
#[derive(Debug, Clone, PartialEq)]
pub enum CptSpec {
    /// Unconditional P(X = true), for a node without parents.
    Prior(f64),
    /// P(X = true | parent = v) for a node with exactly one parent.
    Single(BTreeMap<bool, f64>),
    /// P(X = true | parents = (v1, v2, ..)) keyed by parent values in declaration order.
    Table(BTreeMap<Vec<bool>, f64>),
}

impl CptSpec {
    /// Single-parent table from `(parent value, probability)` pairs.
    ///
    /// # Example
    /// ```rust
    /// use bayesnet_rs::CptSpec;
    ///
    /// let cpt = CptSpec::single([(true, 0.9), (false, 0.1)]);
    /// ```
    pub fn single(rows: impl IntoIterator<Item = (bool, f64)>) -> Self {
        Self::Single(rows.into_iter().collect())
    }

    /// General table from `(parent values, probability)` pairs.
    ///
    /// # Example
    /// ```rust
    /// use bayesnet_rs::CptSpec;
    ///
    /// let cpt = CptSpec::table([
    ///     ([true, true], 0.95),
    ///     ([true, false], 0.94),
    ///     ([false, true], 0.29),
    ///     ([false, false], 0.001),
    /// ]);
    /// ```
    pub fn table<K>(rows: impl IntoIterator<Item = (K, f64)>) -> Self
    where
        K: AsRef<[bool]>,
    {
        Self::Table(
            rows.into_iter()
                .map(|(key, p)| (key.as_ref().to_vec(), p))
                .collect(),
        )
    }
}

impl From<f64> for CptSpec {
    fn from(p: f64) -> Self {
        Self::Prior(p)
    }
}

/// Caller-facing description of one node: name, ordered parents and table.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSpec {
    pub variable: String,
    pub parents: Vec<String>,
    pub cpt: CptSpec,
}

impl NodeSpec {
    pub fn new<P, S>(variable: impl Into<String>, parents: P, cpt: impl Into<CptSpec>) -> Self
    where
        P: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            variable: variable.into(),
            parents: parents.into_iter().map(Into::into).collect(),
            cpt: cpt.into(),
        }
    }
}

/// A conditional probability distribution P(X | parents) for a boolean variable.
///
/// The table maps each tuple of parent values, in parent-declaration order, to the
/// probability that the variable is true; the false case is `1 - p`.
#[derive(Debug, Clone, PartialEq)]
pub struct BayesNode {
    variable: String,
    parents: Vec<String>,
    cpt: BTreeMap<Vec<bool>, f64>,
}

impl BayesNode {
    /// Builds a node, normalizing `cpt` to the tuple-keyed form.
    ///
    /// # Errors
    /// - [`BayesError::ShapeMismatch`] if a `Prior` is given with parents or a
    ///   `Single` table without exactly one parent
    /// - [`BayesError::ArityMismatch`] if a key's length differs from the parent count
    /// - [`BayesError::InvalidProbability`] if a value is outside [0, 1] or NaN
    /// - [`BayesError::IncompleteTable`] if any parent-value combination is missing
    ///
    /// # Example
    /// ```rust
    /// use bayesnet_rs::{BayesNode, CptSpec, Evidence};
    ///
    /// let node = BayesNode::new("X", ["Burglary"], CptSpec::single([(true, 0.2), (false, 0.625)])).unwrap();
    /// let event = Evidence::from([("Burglary", false), ("Earthquake", true)]);
    /// assert_eq!(node.p(false, &event).unwrap(), 0.375);
    /// ```
    pub fn new<P, S>(variable: impl Into<String>, parents: P, cpt: impl Into<CptSpec>) -> Result<Self>
    where
        P: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let variable = variable.into();
        let parents: Vec<String> = parents.into_iter().map(Into::into).collect();
        let cpt = Self::canonical_table(&variable, parents.len(), cpt.into())?;

        Ok(Self {
            variable,
            parents,
            cpt,
        })
    }

    /// Builds a node from a [`NodeSpec`].
    ///
    /// # Errors
    /// Same as [`BayesNode::new`].
    pub fn from_spec(spec: NodeSpec) -> Result<Self> {
        Self::new(spec.variable, spec.parents, spec.cpt)
    }

    fn canonical_table(
        variable: &str,
        arity: usize,
        spec: CptSpec,
    ) -> Result<BTreeMap<Vec<bool>, f64>> {
        let table: BTreeMap<Vec<bool>, f64> = match spec {
            CptSpec::Prior(p) => {
                if arity != 0 {
                    return Err(BayesError::ShapeMismatch {
                        variable: variable.to_string(),
                        shape: "prior",
                        needed: "no parents",
                        parents: arity,
                    });
                }
                BTreeMap::from([(Vec::new(), p)])
            }
            CptSpec::Single(rows) => {
                if arity != 1 {
                    return Err(BayesError::ShapeMismatch {
                        variable: variable.to_string(),
                        shape: "single-parent",
                        needed: "exactly one parent",
                        parents: arity,
                    });
                }
                rows.into_iter().map(|(v, p)| (vec![v], p)).collect()
            }
            CptSpec::Table(rows) => rows,
        };

        for (key, &p) in &table {
            if key.len() != arity {
                return Err(BayesError::arity_mismatch(variable, arity, key.len()));
            }
            if !(0.0..=1.0).contains(&p) {
                return Err(BayesError::invalid_probability(variable, p));
            }
        }

        // keys are distinct and of the right arity, so the count is enough
        let expected = 1usize
            .checked_shl(u32::try_from(arity).unwrap_or(u32::MAX))
            .unwrap_or(usize::MAX);
        if table.len() != expected {
            return Err(BayesError::incomplete_table(variable, expected, table.len()));
        }

        Ok(table)
    }

    #[must_use]
    pub fn variable(&self) -> &str {
        &self.variable
    }

    /// Parent names in declaration order.
    #[must_use]
    pub fn parents(&self) -> &[String] {
        &self.parents
    }

    /// The canonical table, keyed by parent values in declaration order.
    #[must_use]
    pub fn cpt(&self) -> &BTreeMap<Vec<bool>, f64> {
        &self.cpt
    }

    /// Returns P(X = `value` | parents), reading parent values from `event`.
    ///
    /// `event` may assign any number of other variables; only the parents are read.
    ///
    /// # Errors
    /// - [`BayesError::MissingParentValue`] if `event` lacks a parent
    /// - [`BayesError::MissingTableEntry`] if the parent tuple is not in the table
    pub fn p(&self, value: bool, event: &Evidence) -> Result<f64> {
        let key = self.parent_values(event)?;
        let p_true = self
            .cpt
            .get(&key)
            .copied()
            .ok_or_else(|| BayesError::MissingTableEntry {
                variable: self.variable.clone(),
                key,
            })?;
        Ok(if value { p_true } else { 1.0 - p_true })
    }

    fn parent_values(&self, event: &Evidence) -> Result<Vec<bool>> {
        self.parents
            .iter()
            .map(|parent| {
                event
                    .get(parent)
                    .ok_or_else(|| BayesError::missing_parent_value(&self.variable, parent))
            })
            .collect()
    }

    /// Draws a value for this variable given its parents' values in `event`.
    ///
    /// Consumes exactly one `f64` from `rng` and returns `true` when P(X = true)
    /// exceeds it.
    ///
    /// # Errors
    /// Same as [`BayesNode::p`].
    ///
    /// # Example
    /// ```rust
    /// use bayesnet_rs::{BayesNode, Evidence};
    /// use rand::SeedableRng;
    /// use rand::rngs::StdRng;
    ///
    /// let node = BayesNode::new("Coin", Vec::<String>::new(), 1.0).unwrap();
    /// let mut rng = StdRng::seed_from_u64(7);
    /// assert!(node.sample(&Evidence::new(), &mut rng).unwrap());
    /// ```
    pub fn sample<R: Rng + ?Sized>(&self, event: &Evidence, rng: &mut R) -> Result<bool> {
        let p_true = self.p(true, event)?;
        Ok(p_true > rng.random::<f64>())
    }
}

impl fmt::Display for BayesNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.parents.is_empty() {
            write!(f, "{}", self.variable)
        } else {
            write!(f, "{} | {}", self.variable, self.parents.join(" "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn no_parents() -> Vec<String> {
        Vec::new()
    }

    #[test]
    fn test_prior_is_stored_as_empty_tuple() {
        let node = BayesNode::new("X", no_parents(), 0.2).unwrap();
        assert_eq!(node.cpt().get(&Vec::<bool>::new()), Some(&0.2));
        assert_relative_eq!(node.p(false, &Evidence::new()).unwrap(), 0.8);
    }

    #[test]
    fn test_single_parent_is_stored_as_one_tuple() {
        let node = BayesNode::new("Y", ["P"], CptSpec::single([(true, 0.2), (false, 0.7)])).unwrap();
        assert_eq!(node.cpt().get(&vec![true]), Some(&0.2));
        assert_eq!(node.cpt().get(&vec![false]), Some(&0.7));
    }

    #[test]
    fn test_lookup_follows_parent_order() {
        let node = BayesNode::new(
            "Z",
            ["P", "Q"],
            CptSpec::table([
                ([true, true], 0.2),
                ([true, false], 0.3),
                ([false, true], 0.5),
                ([false, false], 0.7),
            ]),
        )
        .unwrap();

        let event = Evidence::from([("P", true), ("Q", false)]);
        assert_relative_eq!(node.p(true, &event).unwrap(), 0.3);

        let event = Evidence::from([("P", false), ("Q", true)]);
        assert_relative_eq!(node.p(true, &event).unwrap(), 0.5);
    }

    #[test]
    fn test_true_and_false_sum_to_one() {
        let node = BayesNode::new("Y", ["P"], CptSpec::single([(true, 0.13), (false, 0.71)])).unwrap();
        for parent in [true, false] {
            let event = Evidence::from([("P", parent)]);
            let sum = node.p(true, &event).unwrap() + node.p(false, &event).unwrap();
            assert_relative_eq!(sum, 1.0, epsilon = 1e-15);
        }
    }

    #[test]
    fn test_out_of_range_probability_rejected() {
        let err = BayesNode::new("X", no_parents(), 1.2).unwrap_err();
        assert_eq!(err, BayesError::invalid_probability("X", 1.2));

        let err = BayesNode::new("X", no_parents(), f64::NAN).unwrap_err();
        assert!(matches!(err, BayesError::InvalidProbability { .. }));
    }

    #[test]
    fn test_wrong_arity_rejected() {
        let err = BayesNode::new("Z", ["P", "Q"], CptSpec::table([([true], 0.2), ([false], 0.3)]))
            .unwrap_err();
        assert_eq!(err, BayesError::arity_mismatch("Z", 2, 1));
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let err = BayesNode::new("X", ["P"], 0.5).unwrap_err();
        assert!(matches!(err, BayesError::ShapeMismatch { parents: 1, .. }));

        let err = BayesNode::new("X", ["P", "Q"], CptSpec::single([(true, 0.5), (false, 0.5)]))
            .unwrap_err();
        assert!(matches!(err, BayesError::ShapeMismatch { parents: 2, .. }));
    }

    #[test]
    fn test_missing_combination_rejected() {
        let err = BayesNode::new(
            "Z",
            ["P", "Q"],
            CptSpec::table([([true, true], 0.2), ([true, false], 0.3), ([false, true], 0.5)]),
        )
        .unwrap_err();
        assert_eq!(err, BayesError::incomplete_table("Z", 4, 3));
    }

    #[test]
    fn test_missing_parent_in_event() {
        let node = BayesNode::new("Y", ["P"], CptSpec::single([(true, 0.2), (false, 0.7)])).unwrap();
        let err = node.p(true, &Evidence::from([("Other", true)])).unwrap_err();
        assert_eq!(err, BayesError::missing_parent_value("Y", "P"));
    }

    #[test]
    fn test_sample_is_reproducible_with_seed() {
        let node = BayesNode::new("Y", ["P"], CptSpec::single([(true, 0.5), (false, 0.5)])).unwrap();
        let event = Evidence::from([("P", true)]);

        let draw = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..32)
                .map(|_| node.sample(&event, &mut rng).unwrap())
                .collect::<Vec<_>>()
        };
        assert_eq!(draw(42), draw(42));
    }

    #[test]
    fn test_sample_consumes_one_draw() {
        use rand::Rng;

        let node = BayesNode::new("Y", ["P"], CptSpec::single([(true, 0.3), (false, 1.0)])).unwrap();
        for parent in [true, false] {
            let event = Evidence::from([("P", parent)]);
            let mut sampled = StdRng::seed_from_u64(31);
            let mut reference = StdRng::seed_from_u64(31);

            node.sample(&event, &mut sampled).unwrap();
            let _: f64 = reference.random();
            assert_eq!(sampled.random::<u64>(), reference.random::<u64>());
        }
    }

    #[test]
    fn test_sample_extremes() {
        let mut rng = StdRng::seed_from_u64(1);
        let never = BayesNode::new("N", no_parents(), 0.0).unwrap();
        let always = BayesNode::new("A", no_parents(), 1.0).unwrap();
        for _ in 0..100 {
            assert!(!never.sample(&Evidence::new(), &mut rng).unwrap());
            assert!(always.sample(&Evidence::new(), &mut rng).unwrap());
        }
    }

    #[test]
    fn test_sample_frequency_tracks_probability() {
        let node = BayesNode::new("X", no_parents(), 0.3).unwrap();
        let mut rng = StdRng::seed_from_u64(2024);
        let hits = (0..20_000)
            .filter(|_| node.sample(&Evidence::new(), &mut rng).unwrap())
            .count();
        #[allow(clippy::cast_precision_loss)]
        let freq = hits as f64 / 20_000.0;
        assert!((freq - 0.3).abs() < 0.02, "frequency {freq} too far from 0.3");
    }

    #[test]
    fn test_display() {
        let root = BayesNode::new("X", no_parents(), 0.2).unwrap();
        let child = BayesNode::new("Y", ["X"], CptSpec::single([(true, 0.2), (false, 0.7)])).unwrap();
        assert_eq!(root.to_string(), "X");
        assert_eq!(child.to_string(), "Y | X");
    }
}
