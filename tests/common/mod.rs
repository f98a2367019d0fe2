//! Hand-built resolved units and helpers for inspecting recorded facts.

#![allow(dead_code)]

use std::path::Path;

use javaxref::domain::{Modifiers, Position, TypeFlavor, VariableFlavor};
use javaxref::{
    AstTraversal, Binding, BindingId, DomainError, Fact, FileId, MemorySink, NameHierarchy, Node,
    NodeId, NodeKind, Range, Recorder, ReferenceKind, ResolvedNode, SnapshotUnit, SourceText,
    SyntaxTree,
};

/// Collects nodes, bindings and resolutions into a [`SnapshotUnit`].
#[derive(Default)]
pub struct UnitBuilder {
    nodes: Vec<Node>,
    bindings: Vec<Binding>,
    resolutions: Vec<ResolvedNode>,
}

impl UnitBuilder {
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

    pub fn primitive(&mut self, keyword: &str, line: u32, column: u32) -> NodeId {
        let end = column + keyword.len() as u32 - 1;
        self.node(
            NodeKind::PrimitiveType {
                keyword: keyword.into(),
            },
            Range::new(line, column, line, end),
        )
    }

    /// A single-identifier type resolving to `binding`.
    pub fn simple_type(&mut self, identifier: &str, line: u32, column: u32, binding: BindingId) -> NodeId {
        let name = self.name(identifier, line, column);
        let range = Range::new(line, column, line, column + identifier.len() as u32 - 1);
        let ty = self.node(NodeKind::SimpleType { name }, range);
        self.resolve(ty, binding);
        ty
    }

    pub fn parameter(&mut self, ty: NodeId, name: NodeId) -> NodeId {
        let begin = self.nodes[ty.index()].range.begin();
        let end = self.nodes[name.index()].range.end();
        self.node(
            NodeKind::Parameter {
                name,
                annotations: vec![],
                ty: Some(ty),
                varargs: false,
            },
            Range::between(begin, end),
        )
    }

    pub fn block(&mut self, statements: Vec<NodeId>, range: Range) -> NodeId {
        self.node(NodeKind::Block { statements }, range)
    }

    pub fn invocation(&mut self, expression: Option<NodeId>, name: NodeId, arguments: Vec<NodeId>, range: Range) -> NodeId {
        self.node(
            NodeKind::MethodInvocation {
                expression,
                type_arguments: vec![],
                name,
                arguments,
            },
            range,
        )
    }

    pub fn method(&mut self, method: MethodNode, range: Range) -> NodeId {
        self.node(
            NodeKind::MethodDeclaration {
                name: method.name,
                modifiers: Modifiers::default(),
                javadoc: None,
                annotations: vec![],
                is_constructor: false,
                type_parameters: method.type_parameters,
                return_type: Some(method.return_type),
                parameters: method.parameters,
                thrown: vec![],
                body: Some(method.body),
            },
            range,
        )
    }

    pub fn class(&mut self, name: NodeId, members: Vec<NodeId>, range: Range) -> NodeId {
        self.node(
            NodeKind::TypeDeclaration {
                flavor: TypeFlavor::Class,
                name,
                modifiers: Modifiers::default(),
                javadoc: None,
                annotations: vec![],
                type_parameters: vec![],
                superclass: None,
                interfaces: vec![],
                enum_constants: vec![],
                members,
            },
            range,
        )
    }

    /// `package <name>;` on line 1.
    pub fn package(&mut self, name: &str) -> NodeId {
        let name_node = self.name(name, 1, 9);
        self.node(
            NodeKind::PackageDeclaration {
                name: name_node,
                annotations: vec![],
            },
            Range::new(1, 1, 1, 9 + name.len() as u32),
        )
    }

    pub fn compilation_unit(&mut self, package: Option<NodeId>, types: Vec<NodeId>, range: Range) -> NodeId {
        self.node(
            NodeKind::CompilationUnit {
                package,
                imports: vec![],
                types,
            },
            range,
        )
    }

    pub fn binding(&mut self, binding: Binding) -> BindingId {
        self.bindings.push(binding);
        BindingId(self.bindings.len() as u32 - 1)
    }

    pub fn binding_mut(&mut self, id: BindingId) -> &mut Binding {
        &mut self.bindings[id.0 as usize]
    }

    pub fn resolve(&mut self, node: NodeId, binding: BindingId) {
        self.resolutions.push(ResolvedNode {
            node,
            binding: Some(binding),
            unresolved: None,
        });
    }

    /// Marks `node` as the declaration of `binding`.
    pub fn declare(&mut self, binding: BindingId, node: NodeId) {
        match self.binding_mut(binding) {
            Binding::Type { declaring_node, .. }
            | Binding::Anonymous { declaring_node, .. }
            | Binding::TypeVariable { declaring_node, .. }
            | Binding::Method { declaring_node, .. }
            | Binding::Variable { declaring_node, .. } => *declaring_node = Some(node),
            other => panic!("{} bindings are not declared by nodes", other.label()),
        }
    }

    pub fn add_methods(&mut self, ty: BindingId, methods: &[BindingId]) {
        if let Binding::Type { methods: known, .. } = self.binding_mut(ty) {
            known.extend_from_slice(methods);
        }
    }

    pub fn snapshot(self, root: NodeId) -> SnapshotUnit {
        SnapshotUnit {
            tree: Some(SyntaxTree::new(self.nodes, root, vec![]).unwrap()),
            bindings: self.bindings,
            resolutions: self.resolutions,
            problems: vec![],
            overrides: vec![],
            parse_error: None,
        }
    }
}

pub struct MethodNode {
    pub name: NodeId,
    pub type_parameters: Vec<NodeId>,
    pub return_type: NodeId,
    pub parameters: Vec<NodeId>,
    pub body: NodeId,
}

pub fn package_binding(name: &str) -> Binding {
    Binding::Package { name: name.into() }
}

pub fn primitive_binding(name: &str) -> Binding {
    Binding::Primitive { name: name.into() }
}

pub fn class_binding(name: &str, parent: Option<BindingId>) -> Binding {
    Binding::Type {
        name: name.into(),
        type_parameters: vec![],
        parent,
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

pub fn field_binding(name: &str, ty: BindingId, parent: BindingId) -> Binding {
    Binding::Variable {
        name: name.into(),
        flavor: VariableFlavor::Field,
        ty: Some(ty),
        parent: Some(parent),
        is_static: false,
        declared_at: None,
        declaring_node: None,
    }
}

pub fn parameter_binding(name: &str, ty: BindingId, method: BindingId, line: u32, column: u32) -> Binding {
    Binding::Variable {
        name: name.into(),
        flavor: VariableFlavor::Parameter,
        ty: Some(ty),
        parent: Some(method),
        is_static: false,
        declared_at: Some(Position::new(line, column)),
        declaring_node: None,
    }
}

/// Walks a snapshot as file 1 at `path` and returns what was recorded.
pub fn index(unit: SnapshotUnit, path: &str, source: &str) -> (Vec<Fact>, Result<(), DomainError>) {
    let parsed = unit.into_parsed_unit().unwrap();
    let text = SourceText::new(source);
    let sink = MemorySink::new();
    let result = {
        let recorder = Recorder::new(&sink, FileId(1));
        let mut traversal =
            AstTraversal::new(parsed.tree(), parsed.oracle(), &text, Path::new(path), recorder);
        traversal.run()
    };
    (sink.facts(), result)
}

pub fn display(serialized: &str) -> String {
    NameHierarchy::deserialize(serialized).unwrap().to_string()
}

/// Display names of symbols recorded with a location, in order.
pub fn declared(facts: &[Fact]) -> Vec<String> {
    facts
        .iter()
        .filter_map(|fact| match fact {
            Fact::SymbolWithLocation { name, .. } | Fact::SymbolWithLocationAndScope { name, .. } => {
                Some(display(name))
            }
            _ => None,
        })
        .collect()
}

/// Serialized name of the located symbol displayed as `shown`.
pub fn declared_name(facts: &[Fact], shown: &str) -> String {
    facts
        .iter()
        .find_map(|fact| match fact {
            Fact::SymbolWithLocation { name, .. } | Fact::SymbolWithLocationAndScope { name, .. }
                if display(name) == shown =>
            {
                Some(name.clone())
            }
            _ => None,
        })
        .unwrap_or_else(|| panic!("no symbol displayed as {}", shown))
}

/// `(referenced, context)` display pairs of every reference of `kind`.
pub fn references(facts: &[Fact], kind: ReferenceKind) -> Vec<(String, String)> {
    facts
        .iter()
        .filter_map(|fact| match fact {
            Fact::Reference {
                kind: found,
                referenced_name,
                context_name,
                ..
            } if *found == kind => Some((display(referenced_name), display(context_name))),
            _ => None,
        })
        .collect()
}

/// Ranges of local symbol facts named `name`.
pub fn local_ranges(facts: &[Fact], name: &str) -> Vec<Range> {
    facts
        .iter()
        .filter_map(|fact| match fact {
            Fact::LocalSymbol {
                name: found, range, ..
            } if found == name => Some(*range),
            _ => None,
        })
        .collect()
}

pub fn errors(facts: &[Fact]) -> Vec<Fact> {
    facts.iter().filter(|fact| fact.is_error()).cloned().collect()
}
