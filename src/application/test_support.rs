//! Hand-built units for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::application::{FactSink, Resolution, ResolutionOracle, UnresolvedReason};
use crate::domain::{
    Binding, BindingId, DomainError, Fact, NameHierarchy, Node, NodeId, NodeKind, Range,
    ReferenceKind, SyntaxTree,
};

/// Sink keeping every fact in memory.
#[derive(Default)]
pub struct FactLog(Mutex<Vec<Fact>>);

impl FactLog {
    pub fn facts(&self) -> Vec<Fact> {
        self.0.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<Fact> {
        self.facts().into_iter().filter(Fact::is_error).collect()
    }

    /// References of `kind` as `(referenced, context)` display pairs.
    pub fn references(&self, kind: ReferenceKind) -> Vec<(String, String)> {
        self.facts()
            .into_iter()
            .filter_map(|fact| match fact {
                Fact::Reference {
                    kind: found,
                    referenced_name,
                    context_name,
                    ..
                } if found == kind => Some((display(&referenced_name), display(&context_name))),
                _ => None,
            })
            .collect()
    }

    /// Display names of located symbol facts.
    pub fn declared(&self) -> Vec<String> {
        self.facts()
            .into_iter()
            .filter_map(|fact| match fact {
                Fact::SymbolWithLocation { name, .. }
                | Fact::SymbolWithLocationAndScope { name, .. } => Some(display(&name)),
                _ => None,
            })
            .collect()
    }
}

impl FactSink for FactLog {
    fn record(&self, fact: Fact) -> Result<(), DomainError> {
        self.0.lock().unwrap().push(fact);
        Ok(())
    }
}

/// Human-readable form of a serialized name.
pub fn display(serialized: &str) -> String {
    NameHierarchy::deserialize(serialized).unwrap().to_string()
}

pub struct FixtureOracle {
    bindings: Vec<Binding>,
    resolutions: HashMap<NodeId, Resolution>,
}

impl ResolutionOracle for FixtureOracle {
    fn resolve(&self, node: NodeId) -> Resolution {
        self.resolutions
            .get(&node)
            .cloned()
            .unwrap_or(Resolution::Unresolved(UnresolvedReason::UnsolvedSymbol))
    }

    fn binding(&self, id: BindingId) -> Option<&Binding> {
        self.bindings.get(id.0 as usize)
    }
}

#[derive(Default)]
pub struct UnitFixture {
    nodes: Vec<Node>,
    comments: Vec<NodeId>,
    bindings: Vec<Binding>,
    resolutions: HashMap<NodeId, Resolution>,
}

impl UnitFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&mut self, kind: NodeKind, range: Range) -> NodeId {
        self.nodes.push(Node::new(kind, range));
        NodeId(self.nodes.len() as u32 - 1)
    }

    pub fn name(&mut self, identifier: &str, line: u32, column: u32) -> NodeId {
        let end = column + identifier.chars().count() as u32 - 1;
        self.node(
            NodeKind::SimpleName {
                identifier: identifier.into(),
            },
            Range::new(line, column, line, end),
        )
    }

    pub fn comment(&mut self, id: NodeId) {
        self.comments.push(id);
    }

    pub fn binding(&mut self, binding: Binding) -> BindingId {
        self.bindings.push(binding);
        BindingId(self.bindings.len() as u32 - 1)
    }

    pub fn binding_mut(&mut self, id: BindingId) -> &mut Binding {
        &mut self.bindings[id.0 as usize]
    }

    pub fn resolve(&mut self, node: NodeId, binding: BindingId) {
        self.resolutions.insert(node, Resolution::Resolved(binding));
    }

    pub fn fail(&mut self, node: NodeId, reason: UnresolvedReason) {
        self.resolutions.insert(node, Resolution::Unresolved(reason));
    }

    /// Points a binding at the node declaring it.
    pub fn declare(&mut self, binding: BindingId, node: NodeId) {
        match &mut self.bindings[binding.0 as usize] {
            Binding::Type { declaring_node, .. }
            | Binding::Anonymous { declaring_node, .. }
            | Binding::TypeVariable { declaring_node, .. }
            | Binding::Method { declaring_node, .. }
            | Binding::Variable { declaring_node, .. } => *declaring_node = Some(node),
            other => panic!("{} bindings have no declaring node", other.label()),
        }
        self.resolve(node, binding);
    }

    pub fn finish(self, root: NodeId) -> (SyntaxTree, FixtureOracle) {
        let tree = SyntaxTree::new(self.nodes, root, self.comments).unwrap();
        (
            tree,
            FixtureOracle {
                bindings: self.bindings,
                resolutions: self.resolutions,
            },
        )
    }
}

pub fn class_binding(name: &str, type_parameters: &[&str], parent: BindingId) -> Binding {
    Binding::Type {
        name: name.into(),
        type_parameters: type_parameters.iter().map(|t| t.to_string()).collect(),
        parent: Some(parent),
        supertypes: vec![],
        methods: vec![],
        declaring_node: None,
    }
}

pub fn method_binding(
    name: &str,
    type_parameters: &[&str],
    return_type: Option<BindingId>,
    parameters: Vec<BindingId>,
    parent: BindingId,
) -> Binding {
    Binding::Method {
        name: name.into(),
        type_parameters: type_parameters.iter().map(|t| t.to_string()).collect(),
        return_type,
        parameters,
        parent: Some(parent),
        is_static: false,
        is_constructor: false,
        is_annotation_member: false,
        declaration: None,
        declaring_node: None,
    }
}
