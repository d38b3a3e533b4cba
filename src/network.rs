use crate::error::{BayesError, Result};
use crate::node::{BayesNode, NodeSpec};
use crate::Evidence;
use rand::Rng;
use std::collections::HashMap;
use std::fmt;

/// Domain shared by every variable in a network.
pub const BOOLEAN_DOMAIN: [bool; 2] = [true, false];

/// A Bayesian network of boolean variables.
///
/// Nodes are kept in insertion order, which is also a topological order: a node can
/// only be added once all of its parents are present. Child links are stored as an
/// index adjacency list alongside the node arena. Once built, the network is never
/// mutated by inference and can be shared across threads.
///
/// # Example
/// ```rust
/// use bayesnet_rs::{BayesNet, CptSpec, NodeSpec};
///
/// let bn = BayesNet::from_specs([
///     NodeSpec::new("Rain", Vec::<String>::new(), 0.3),
///     NodeSpec::new("WetGrass", ["Rain"], CptSpec::single([(true, 0.9), (false, 0.1)])),
/// ])
/// .unwrap();
///
/// assert_eq!(bn.variables(), ["Rain", "WetGrass"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BayesNet {
    nodes: Vec<BayesNode>,
    variables: Vec<String>,
    index: HashMap<String, usize>,
    children: Vec<Vec<usize>>,
}

impl BayesNet {
    /// Creates an empty network.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a network from specifications ordered parents-before-children.
    ///
    /// # Errors
    /// Returns the first construction error encountered; see [`BayesNet::add`].
    pub fn from_specs(specs: impl IntoIterator<Item = NodeSpec>) -> Result<Self> {
        let mut bn = Self::new();
        for spec in specs {
            bn.add(spec)?;
        }
        Ok(bn)
    }

    /// Builds a node from `spec` and appends it.
    ///
    /// # Errors
    /// - any [`BayesNode::new`] validation error
    /// - [`BayesError::DuplicateVariable`] if the name is already present
    /// - [`BayesError::UnknownParent`] if a parent has not been added yet
    ///
    /// The network is unchanged when an error is returned.
    pub fn add(&mut self, spec: NodeSpec) -> Result<()> {
        let node = BayesNode::from_spec(spec)?;
        self.add_node(node)
    }

    /// Appends an already-built node.
    ///
    /// # Errors
    /// Same structural checks as [`BayesNet::add`].
    pub fn add_node(&mut self, node: BayesNode) -> Result<()> {
        if self.index.contains_key(node.variable()) {
            return Err(BayesError::duplicate_variable(node.variable()));
        }
        let parent_ids = node
            .parents()
            .iter()
            .map(|parent| {
                self.index
                    .get(parent)
                    .copied()
                    .ok_or_else(|| BayesError::unknown_parent(node.variable(), parent))
            })
            .collect::<Result<Vec<_>>>()?;

        let id = self.nodes.len();
        for parent_id in parent_ids {
            self.children[parent_id].push(id);
        }
        tracing::debug!(
            variable = node.variable(),
            parents = node.parents().len(),
            "added node"
        );
        self.index.insert(node.variable().to_string(), id);
        self.variables.push(node.variable().to_string());
        self.children.push(Vec::new());
        self.nodes.push(node);
        Ok(())
    }

    /// Returns the node for `variable`.
    ///
    /// # Errors
    /// Returns [`BayesError::UnknownVariable`] if no such node exists.
    pub fn node_for(&self, variable: &str) -> Result<&BayesNode> {
        self.index
            .get(variable)
            .map(|&id| &self.nodes[id])
            .ok_or_else(|| BayesError::unknown_variable(variable))
    }

    /// Values `variable` can take. Always `[true, false]`.
    #[must_use]
    pub fn domain(&self, _variable: &str) -> [bool; 2] {
        BOOLEAN_DOMAIN
    }

    #[must_use]
    pub fn contains(&self, variable: &str) -> bool {
        self.index.contains_key(variable)
    }

    /// Variable names in topological order.
    #[must_use]
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Nodes in topological order.
    #[must_use]
    pub fn nodes(&self) -> &[BayesNode] {
        &self.nodes
    }

    /// Nodes that list `variable` among their parents, in insertion order.
    ///
    /// # Errors
    /// Returns [`BayesError::UnknownVariable`] if no such node exists.
    pub fn children_of(&self, variable: &str) -> Result<Vec<&BayesNode>> {
        let id = self
            .index
            .get(variable)
            .ok_or_else(|| BayesError::unknown_variable(variable))?;
        Ok(self.children[*id].iter().map(|&c| &self.nodes[c]).collect())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Draws one complete assignment from the joint distribution.
    ///
    /// Each node is sampled in topological order given the values already drawn
    /// for its parents, consuming one draw per node from `rng`.
    ///
    /// # Errors
    /// Propagates [`BayesNode::sample`] errors, which cannot occur for a network
    /// built through [`BayesNet::add`].
    pub fn prior_sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Evidence> {
        let mut event = Evidence::new();
        for node in &self.nodes {
            let value = node.sample(&event, rng)?;
            event = event.with(node.variable(), value);
        }
        Ok(event)
    }
}

impl fmt::Display for BayesNet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BayesNet[")?;
        for (i, node) in self.nodes.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{node}")?;
        }
        write!(f, "]")
    }
}
