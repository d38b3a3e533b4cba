use std::collections::BTreeMap;
use std::fmt;

/// A partial assignment of boolean values to network variables.
///
/// Evidence is never mutated in place by the inference engine: every extension
/// goes through [`Evidence::extended`], which returns a fresh copy, so sibling
/// branches of a summation never observe each other's assignments.
///
/// # Example
/// ```rust
/// use bayesnet_rs::Evidence;
///
/// let e = Evidence::new().with("Rain", true);
/// let e2 = e.extended("WetGrass", false);
///
/// assert_eq!(e.len(), 1);
/// assert_eq!(e2.get("WetGrass"), Some(false));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Evidence {
    values: BTreeMap<String, bool>,
}

impl Evidence {
    /// Creates an empty assignment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion, consuming `self`.
    #[must_use]
    pub fn with(mut self, variable: impl Into<String>, value: bool) -> Self {
        self.values.insert(variable.into(), value);
        self
    }

    /// Returns a copy of this assignment with `variable` set to `value`.
    #[must_use]
    pub fn extended(&self, variable: &str, value: bool) -> Self {
        let mut values = self.values.clone();
        values.insert(variable.to_string(), value);
        Self { values }
    }

    #[must_use]
    pub fn get(&self, variable: &str) -> Option<bool> {
        self.values.get(variable).copied()
    }

    #[must_use]
    pub fn contains(&self, variable: &str) -> bool {
        self.values.contains_key(variable)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over `(variable, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> + '_ {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Iterates over the assigned variable names in name order.
    pub fn variables(&self) -> impl Iterator<Item = &str> + '_ {
        self.values.keys().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<(S, bool)> for Evidence {
    fn from_iter<I: IntoIterator<Item = (S, bool)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl<S: Into<String>, const N: usize> From<[(S, bool); N]> for Evidence {
    fn from(pairs: [(S, bool); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl fmt::Display for Evidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (variable, value)) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{variable}={value}")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extended_leaves_original_untouched() {
        let base = Evidence::from([("A", true)]);
        let left = base.extended("B", true);
        let right = base.extended("B", false);

        assert!(!base.contains("B"));
        assert_eq!(left.get("B"), Some(true));
        assert_eq!(right.get("B"), Some(false));
        assert_eq!(left.get("A"), Some(true));
    }

    #[test]
    fn test_extended_overwrites_existing() {
        let e = Evidence::new().with("A", true);
        assert_eq!(e.extended("A", false).get("A"), Some(false));
        assert_eq!(e.get("A"), Some(true));
    }

    #[test]
    fn test_display_is_sorted() {
        let e: Evidence = vec![("Zeta", false), ("Alpha", true)].into_iter().collect();
        assert_eq!(e.to_string(), "{Alpha=true, Zeta=false}");
        assert_eq!(Evidence::new().to_string(), "{}");
    }
}
