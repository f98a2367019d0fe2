use std::fmt;

use serde::{Deserialize, Serialize};

use crate::application::traversal::overrides;
use crate::domain::{Binding, BindingId, NodeId};

/// Why the resolver could not bind a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedReason {
    UnsolvedSymbol,
    AmbiguousOverload,
    /// The resolver gave up, typically on runaway generic inference.
    ResourceExhausted,
}

impl UnresolvedReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnresolvedReason::UnsolvedSymbol => "unsolved symbol",
            UnresolvedReason::AmbiguousOverload => "ambiguous overload",
            UnresolvedReason::ResourceExhausted => "resource exhausted",
        }
    }
}

impl fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(BindingId),
    Unresolved(UnresolvedReason),
}

impl Resolution {
    pub fn binding(&self) -> Option<BindingId> {
        match self {
            Resolution::Resolved(id) => Some(*id),
            Resolution::Unresolved(_) => None,
        }
    }
}

/// Binding resolution for one parsed file.
///
/// Declaration nodes resolve to their own binding, reference nodes to the
/// binding they refer to.
pub trait ResolutionOracle {
    fn resolve(&self, node: NodeId) -> Resolution;

    fn binding(&self, id: BindingId) -> Option<&Binding>;

    /// Direct supertypes of a type. Parameterized types answer for their
    /// generic declaration.
    fn ancestors_of(&self, ty: BindingId) -> Vec<BindingId> {
        match self.binding(ty) {
            Some(Binding::Parameterized { declaration, .. }) => self.ancestors_of(*declaration),
            Some(binding) => binding.supertypes().to_vec(),
            None => Vec::new(),
        }
    }

    fn declared_methods(&self, ty: BindingId) -> Vec<BindingId> {
        match self.binding(ty) {
            Some(Binding::Parameterized { declaration, .. }) => {
                self.declared_methods(*declaration)
            }
            Some(binding) => binding.methods().to_vec(),
            None => Vec::new(),
        }
    }

    /// Declaration node of a binding declared in the file being indexed.
    fn declaring_node(&self, id: BindingId) -> Option<NodeId> {
        self.binding(id).and_then(Binding::declaring_node)
    }

    /// The ancestor method `method` overrides, if any. The default search
    /// compares erased signatures against every ancestor.
    fn override_target_of(&self, method: BindingId) -> Option<BindingId> {
        overrides::find_overridden_method(self, method)
    }
}
