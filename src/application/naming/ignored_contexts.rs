use crate::application::ResolutionOracle;
use crate::domain::{BindingId, NodeId};

/// Declarations whose own signature is being named. A type variable
/// introduced by one of them is named without its declaring context.
///
/// Entries are either syntax nodes or binding handles; membership checks
/// accept both spellings of the same declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoredContexts {
    nodes: Vec<NodeId>,
    bindings: Vec<BindingId>,
}

impl IgnoredContexts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node(&self, node: NodeId) -> Self {
        let mut extended = self.clone();
        extended.nodes.push(node);
        extended
    }

    pub fn with_binding(&self, binding: BindingId) -> Self {
        let mut extended = self.clone();
        extended.bindings.push(binding);
        extended
    }

    pub fn contains_node(&self, node: NodeId, oracle: &dyn ResolutionOracle) -> bool {
        self.nodes.contains(&node)
            || self
                .bindings
                .iter()
                .any(|binding| oracle.declaring_node(*binding) == Some(node))
    }

    pub fn contains_binding(&self, binding: BindingId, oracle: &dyn ResolutionOracle) -> bool {
        self.bindings.contains(&binding)
            || oracle
                .declaring_node(binding)
                .map_or(false, |node| self.nodes.contains(&node))
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.bindings.is_empty()
    }
}
