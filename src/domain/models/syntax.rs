//! Resolved Java syntax tree as handed over by the frontend.
//!
//! Nodes live in an arena and refer to their children by [`NodeId`]. Parent
//! links are derived when the tree is built, which is also where structural
//! guarantees are checked: every child id is in bounds and every node has at
//! most one parent.

use serde::{Deserialize, Serialize};

use super::Range;
use crate::domain::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    Protected,
    Private,
    #[default]
    Package,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Modifiers {
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub is_static: bool,
}

impl Modifiers {
    pub fn new(visibility: Visibility) -> Self {
        Self {
            visibility,
            is_static: false,
        }
    }

    pub fn with_static(mut self) -> Self {
        self.is_static = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeFlavor {
    Class,
    Interface,
    Enum,
    Annotation,
    Record,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentStyle {
    Line,
    Block,
    Javadoc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodReferenceFlavor {
    /// `expr::name`
    Expression,
    /// `super::name`, `T.super::name`
    Super,
    /// `Type::name`
    Type,
    /// `Type::new`
    Creation,
}

/// Closed set of node kinds the traversal understands. Statements and
/// expressions with no indexing semantics of their own are `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeKind {
    CompilationUnit {
        #[serde(default)]
        package: Option<NodeId>,
        #[serde(default)]
        imports: Vec<NodeId>,
        #[serde(default)]
        types: Vec<NodeId>,
    },
    PackageDeclaration {
        name: NodeId,
        #[serde(default)]
        annotations: Vec<NodeId>,
    },
    ImportDeclaration {
        name: NodeId,
        #[serde(default)]
        is_static: bool,
        #[serde(default)]
        on_demand: bool,
    },
    TypeDeclaration {
        flavor: TypeFlavor,
        name: NodeId,
        #[serde(default)]
        modifiers: Modifiers,
        #[serde(default)]
        javadoc: Option<NodeId>,
        #[serde(default)]
        annotations: Vec<NodeId>,
        #[serde(default)]
        type_parameters: Vec<NodeId>,
        #[serde(default)]
        superclass: Option<NodeId>,
        #[serde(default)]
        interfaces: Vec<NodeId>,
        #[serde(default)]
        enum_constants: Vec<NodeId>,
        #[serde(default)]
        members: Vec<NodeId>,
    },
    /// Body of an anonymous class; its range starts at the opening brace.
    AnonymousClassBody {
        #[serde(default)]
        members: Vec<NodeId>,
    },
    TypeParameter {
        name: NodeId,
        #[serde(default)]
        bounds: Vec<NodeId>,
    },
    FieldDeclaration {
        #[serde(default)]
        modifiers: Modifiers,
        #[serde(default)]
        javadoc: Option<NodeId>,
        #[serde(default)]
        annotations: Vec<NodeId>,
        ty: NodeId,
        fragments: Vec<NodeId>,
    },
    VariableFragment {
        name: NodeId,
        #[serde(default)]
        initializer: Option<NodeId>,
    },
    MethodDeclaration {
        name: NodeId,
        #[serde(default)]
        modifiers: Modifiers,
        #[serde(default)]
        javadoc: Option<NodeId>,
        #[serde(default)]
        annotations: Vec<NodeId>,
        #[serde(default)]
        is_constructor: bool,
        #[serde(default)]
        type_parameters: Vec<NodeId>,
        #[serde(default)]
        return_type: Option<NodeId>,
        #[serde(default)]
        parameters: Vec<NodeId>,
        #[serde(default)]
        thrown: Vec<NodeId>,
        #[serde(default)]
        body: Option<NodeId>,
    },
    AnnotationMember {
        name: NodeId,
        #[serde(default)]
        modifiers: Modifiers,
        #[serde(default)]
        javadoc: Option<NodeId>,
        #[serde(default)]
        annotations: Vec<NodeId>,
        ty: NodeId,
        #[serde(default)]
        default: Option<NodeId>,
    },
    EnumConstant {
        name: NodeId,
        #[serde(default)]
        javadoc: Option<NodeId>,
        #[serde(default)]
        annotations: Vec<NodeId>,
        #[serde(default)]
        arguments: Vec<NodeId>,
        #[serde(default)]
        body: Option<NodeId>,
    },
    Initializer {
        #[serde(default)]
        is_static: bool,
        #[serde(default)]
        javadoc: Option<NodeId>,
        body: NodeId,
    },
    /// Method, constructor, lambda and catch parameters.
    Parameter {
        name: NodeId,
        #[serde(default)]
        annotations: Vec<NodeId>,
        #[serde(default)]
        ty: Option<NodeId>,
        #[serde(default)]
        varargs: bool,
    },
    /// Local variable statements and expressions, including try resources.
    LocalVariableDeclaration {
        #[serde(default)]
        annotations: Vec<NodeId>,
        ty: NodeId,
        fragments: Vec<NodeId>,
    },
    Lambda {
        #[serde(default)]
        parameters: Vec<NodeId>,
        body: NodeId,
    },
    Block {
        #[serde(default)]
        statements: Vec<NodeId>,
    },
    SwitchStatement {
        selector: NodeId,
        #[serde(default)]
        body: Vec<NodeId>,
    },
    ArrayInitializer {
        #[serde(default)]
        elements: Vec<NodeId>,
    },
    CatchClause {
        parameter: NodeId,
        body: NodeId,
    },
    TryStatement {
        #[serde(default)]
        resources: Vec<NodeId>,
        body: NodeId,
        #[serde(default)]
        catches: Vec<NodeId>,
        #[serde(default)]
        finally: Option<NodeId>,
    },
    SimpleName {
        identifier: String,
    },
    QualifiedName {
        qualifier: NodeId,
        name: NodeId,
    },
    FieldAccess {
        expression: NodeId,
        name: NodeId,
    },
    SuperFieldAccess {
        #[serde(default)]
        qualifier: Option<NodeId>,
        name: NodeId,
    },
    ThisExpression {
        #[serde(default)]
        qualifier: Option<NodeId>,
    },
    MethodInvocation {
        #[serde(default)]
        expression: Option<NodeId>,
        #[serde(default)]
        type_arguments: Vec<NodeId>,
        name: NodeId,
        #[serde(default)]
        arguments: Vec<NodeId>,
    },
    SuperMethodInvocation {
        #[serde(default)]
        qualifier: Option<NodeId>,
        #[serde(default)]
        type_arguments: Vec<NodeId>,
        name: NodeId,
        #[serde(default)]
        arguments: Vec<NodeId>,
    },
    /// `this(...)` inside a constructor.
    ConstructorInvocation {
        #[serde(default)]
        type_arguments: Vec<NodeId>,
        #[serde(default)]
        arguments: Vec<NodeId>,
    },
    /// `super(...)` inside a constructor.
    SuperConstructorInvocation {
        #[serde(default)]
        expression: Option<NodeId>,
        #[serde(default)]
        type_arguments: Vec<NodeId>,
        #[serde(default)]
        arguments: Vec<NodeId>,
    },
    ClassInstanceCreation {
        #[serde(default)]
        expression: Option<NodeId>,
        #[serde(default)]
        type_arguments: Vec<NodeId>,
        ty: NodeId,
        #[serde(default)]
        arguments: Vec<NodeId>,
        #[serde(default)]
        body: Option<NodeId>,
    },
    MethodReference {
        flavor: MethodReferenceFlavor,
        #[serde(default)]
        qualifier: Option<NodeId>,
        #[serde(default)]
        type_arguments: Vec<NodeId>,
        #[serde(default)]
        name: Option<NodeId>,
    },
    SimpleType {
        name: NodeId,
    },
    QualifiedType {
        qualifier: NodeId,
        name: NodeId,
    },
    ParameterizedType {
        ty: NodeId,
        #[serde(default)]
        arguments: Vec<NodeId>,
    },
    PrimitiveType {
        keyword: String,
    },
    ArrayType {
        element: NodeId,
        #[serde(default = "one")]
        dimensions: u32,
    },
    WildcardType {
        #[serde(default)]
        bound: Option<NodeId>,
        #[serde(default = "yes")]
        upper: bool,
    },
    UnionType {
        alternatives: Vec<NodeId>,
    },
    IntersectionType {
        types: Vec<NodeId>,
    },
    Annotation {
        type_name: NodeId,
        #[serde(default)]
        values: Vec<NodeId>,
    },
    MemberValuePair {
        name: NodeId,
        value: NodeId,
    },
    Comment {
        style: CommentStyle,
    },
    Other {
        #[serde(default)]
        label: String,
        #[serde(default)]
        children: Vec<NodeId>,
    },
}

fn one() -> u32 {
    1
}

fn yes() -> bool {
    true
}

impl NodeKind {
    pub fn label(&self) -> &str {
        match self {
            NodeKind::CompilationUnit { .. } => "CompilationUnit",
            NodeKind::PackageDeclaration { .. } => "PackageDeclaration",
            NodeKind::ImportDeclaration { .. } => "ImportDeclaration",
            NodeKind::TypeDeclaration { .. } => "TypeDeclaration",
            NodeKind::AnonymousClassBody { .. } => "AnonymousClassBody",
            NodeKind::TypeParameter { .. } => "TypeParameter",
            NodeKind::FieldDeclaration { .. } => "FieldDeclaration",
            NodeKind::VariableFragment { .. } => "VariableFragment",
            NodeKind::MethodDeclaration { .. } => "MethodDeclaration",
            NodeKind::AnnotationMember { .. } => "AnnotationMember",
            NodeKind::EnumConstant { .. } => "EnumConstant",
            NodeKind::Initializer { .. } => "Initializer",
            NodeKind::Parameter { .. } => "Parameter",
            NodeKind::LocalVariableDeclaration { .. } => "LocalVariableDeclaration",
            NodeKind::Lambda { .. } => "Lambda",
            NodeKind::Block { .. } => "Block",
            NodeKind::SwitchStatement { .. } => "SwitchStatement",
            NodeKind::ArrayInitializer { .. } => "ArrayInitializer",
            NodeKind::CatchClause { .. } => "CatchClause",
            NodeKind::TryStatement { .. } => "TryStatement",
            NodeKind::SimpleName { .. } => "SimpleName",
            NodeKind::QualifiedName { .. } => "QualifiedName",
            NodeKind::FieldAccess { .. } => "FieldAccess",
            NodeKind::SuperFieldAccess { .. } => "SuperFieldAccess",
            NodeKind::ThisExpression { .. } => "ThisExpression",
            NodeKind::MethodInvocation { .. } => "MethodInvocation",
            NodeKind::SuperMethodInvocation { .. } => "SuperMethodInvocation",
            NodeKind::ConstructorInvocation { .. } => "ConstructorInvocation",
            NodeKind::SuperConstructorInvocation { .. } => "SuperConstructorInvocation",
            NodeKind::ClassInstanceCreation { .. } => "ClassInstanceCreation",
            NodeKind::MethodReference { .. } => "MethodReference",
            NodeKind::SimpleType { .. } => "SimpleType",
            NodeKind::QualifiedType { .. } => "QualifiedType",
            NodeKind::ParameterizedType { .. } => "ParameterizedType",
            NodeKind::PrimitiveType { .. } => "PrimitiveType",
            NodeKind::ArrayType { .. } => "ArrayType",
            NodeKind::WildcardType { .. } => "WildcardType",
            NodeKind::UnionType { .. } => "UnionType",
            NodeKind::IntersectionType { .. } => "IntersectionType",
            NodeKind::Annotation { .. } => "Annotation",
            NodeKind::MemberValuePair { .. } => "MemberValuePair",
            NodeKind::Comment { .. } => "Comment",
            NodeKind::Other { label, .. } if !label.is_empty() => label,
            NodeKind::Other { .. } => "Other",
        }
    }

    /// Direct children in source order.
    pub fn children(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        match self {
            NodeKind::CompilationUnit {
                package,
                imports,
                types,
            } => {
                out.extend(package);
                out.extend(imports);
                out.extend(types);
            }
            NodeKind::PackageDeclaration { name, annotations } => {
                out.extend(annotations);
                out.push(*name);
            }
            NodeKind::ImportDeclaration { name, .. } => out.push(*name),
            NodeKind::TypeDeclaration {
                name,
                javadoc,
                annotations,
                type_parameters,
                superclass,
                interfaces,
                enum_constants,
                members,
                ..
            } => {
                out.extend(javadoc);
                out.extend(annotations);
                out.push(*name);
                out.extend(type_parameters);
                out.extend(superclass);
                out.extend(interfaces);
                out.extend(enum_constants);
                out.extend(members);
            }
            NodeKind::AnonymousClassBody { members } => out.extend(members),
            NodeKind::TypeParameter { name, bounds } => {
                out.push(*name);
                out.extend(bounds);
            }
            NodeKind::FieldDeclaration {
                javadoc,
                annotations,
                ty,
                fragments,
                ..
            } => {
                out.extend(javadoc);
                out.extend(annotations);
                out.push(*ty);
                out.extend(fragments);
            }
            NodeKind::VariableFragment { name, initializer } => {
                out.push(*name);
                out.extend(initializer);
            }
            NodeKind::MethodDeclaration {
                name,
                javadoc,
                annotations,
                type_parameters,
                return_type,
                parameters,
                thrown,
                body,
                ..
            } => {
                out.extend(javadoc);
                out.extend(annotations);
                out.extend(type_parameters);
                out.extend(return_type);
                out.push(*name);
                out.extend(parameters);
                out.extend(thrown);
                out.extend(body);
            }
            NodeKind::AnnotationMember {
                name,
                javadoc,
                annotations,
                ty,
                default,
                ..
            } => {
                out.extend(javadoc);
                out.extend(annotations);
                out.push(*ty);
                out.push(*name);
                out.extend(default);
            }
            NodeKind::EnumConstant {
                name,
                javadoc,
                annotations,
                arguments,
                body,
            } => {
                out.extend(javadoc);
                out.extend(annotations);
                out.push(*name);
                out.extend(arguments);
                out.extend(body);
            }
            NodeKind::Initializer { javadoc, body, .. } => {
                out.extend(javadoc);
                out.push(*body);
            }
            NodeKind::Parameter {
                name,
                annotations,
                ty,
                ..
            } => {
                out.extend(annotations);
                out.extend(ty);
                out.push(*name);
            }
            NodeKind::LocalVariableDeclaration {
                annotations,
                ty,
                fragments,
            } => {
                out.extend(annotations);
                out.push(*ty);
                out.extend(fragments);
            }
            NodeKind::Lambda { parameters, body } => {
                out.extend(parameters);
                out.push(*body);
            }
            NodeKind::Block { statements } => out.extend(statements),
            NodeKind::SwitchStatement { selector, body } => {
                out.push(*selector);
                out.extend(body);
            }
            NodeKind::ArrayInitializer { elements } => out.extend(elements),
            NodeKind::CatchClause { parameter, body } => {
                out.push(*parameter);
                out.push(*body);
            }
            NodeKind::TryStatement {
                resources,
                body,
                catches,
                finally,
            } => {
                out.extend(resources);
                out.push(*body);
                out.extend(catches);
                out.extend(finally);
            }
            NodeKind::SimpleName { .. }
            | NodeKind::PrimitiveType { .. }
            | NodeKind::Comment { .. } => {}
            NodeKind::QualifiedName { qualifier, name }
            | NodeKind::QualifiedType { qualifier, name } => {
                out.push(*qualifier);
                out.push(*name);
            }
            NodeKind::FieldAccess { expression, name } => {
                out.push(*expression);
                out.push(*name);
            }
            NodeKind::SuperFieldAccess { qualifier, name } => {
                out.extend(qualifier);
                out.push(*name);
            }
            NodeKind::ThisExpression { qualifier } => out.extend(qualifier),
            NodeKind::MethodInvocation {
                expression,
                type_arguments,
                name,
                arguments,
            } => {
                out.extend(expression);
                out.extend(type_arguments);
                out.push(*name);
                out.extend(arguments);
            }
            NodeKind::SuperMethodInvocation {
                qualifier,
                type_arguments,
                name,
                arguments,
            } => {
                out.extend(qualifier);
                out.extend(type_arguments);
                out.push(*name);
                out.extend(arguments);
            }
            NodeKind::ConstructorInvocation {
                type_arguments,
                arguments,
            } => {
                out.extend(type_arguments);
                out.extend(arguments);
            }
            NodeKind::SuperConstructorInvocation {
                expression,
                type_arguments,
                arguments,
            } => {
                out.extend(expression);
                out.extend(type_arguments);
                out.extend(arguments);
            }
            NodeKind::ClassInstanceCreation {
                expression,
                type_arguments,
                ty,
                arguments,
                body,
            } => {
                out.extend(expression);
                out.extend(type_arguments);
                out.push(*ty);
                out.extend(arguments);
                out.extend(body);
            }
            NodeKind::MethodReference {
                qualifier,
                type_arguments,
                name,
                ..
            } => {
                out.extend(qualifier);
                out.extend(type_arguments);
                out.extend(name);
            }
            NodeKind::SimpleType { name } => out.push(*name),
            NodeKind::ParameterizedType { ty, arguments } => {
                out.push(*ty);
                out.extend(arguments);
            }
            NodeKind::ArrayType { element, .. } => out.push(*element),
            NodeKind::WildcardType { bound, .. } => out.extend(bound),
            NodeKind::UnionType { alternatives } => out.extend(alternatives),
            NodeKind::IntersectionType { types } => out.extend(types),
            NodeKind::Annotation { type_name, values } => {
                out.push(*type_name);
                out.extend(values);
            }
            NodeKind::MemberValuePair { name, value } => {
                out.push(*name);
                out.push(*value);
            }
            NodeKind::Other { children, .. } => out.extend(children),
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    #[serde(flatten)]
    pub kind: NodeKind,
    pub range: Range,
}

impl Node {
    pub fn new(kind: NodeKind, range: Range) -> Self {
        Self { kind, range }
    }
}

/// Serialized layout of a tree; parent links are not stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSyntaxTree {
    pub nodes: Vec<Node>,
    pub root: NodeId,
    #[serde(default)]
    pub comments: Vec<NodeId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawSyntaxTree", into = "RawSyntaxTree")]
pub struct SyntaxTree {
    nodes: Vec<Node>,
    parents: Vec<Option<NodeId>>,
    root: NodeId,
    comments: Vec<NodeId>,
}

impl SyntaxTree {
    /// Builds a tree, linking parents and checking structure.
    ///
    /// `comments` is the free comment list of the unit; entries may also
    /// appear as a declaration's `javadoc`.
    pub fn new(nodes: Vec<Node>, root: NodeId, comments: Vec<NodeId>) -> Result<Self, DomainError> {
        let in_bounds = |id: NodeId| id.index() < nodes.len();
        if !in_bounds(root) {
            return Err(DomainError::invariant(format!("root {} out of bounds", root)));
        }

        let mut parents: Vec<Option<NodeId>> = vec![None; nodes.len()];
        for (index, node) in nodes.iter().enumerate() {
            let parent = NodeId(index as u32);
            for child in node.kind.children() {
                if !in_bounds(child) {
                    return Err(DomainError::invariant(format!(
                        "{} {} refers to missing child {}",
                        node.kind.label(),
                        parent,
                        child
                    )));
                }
                if child == root || parents[child.index()].is_some() {
                    return Err(DomainError::invariant(format!(
                        "node {} has more than one parent",
                        child
                    )));
                }
                parents[child.index()] = Some(parent);
            }
        }

        for comment in &comments {
            match nodes.get(comment.index()).map(|n| &n.kind) {
                Some(NodeKind::Comment { .. }) => {}
                _ => {
                    return Err(DomainError::invariant(format!(
                        "comment list entry {} is not a comment",
                        comment
                    )))
                }
            }
        }

        Ok(Self {
            nodes,
            parents,
            root,
            comments,
        })
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn comments(&self) -> &[NodeId] {
        &self.comments
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Result<&Node, DomainError> {
        self.nodes
            .get(id.index())
            .ok_or_else(|| DomainError::invariant(format!("node {} out of bounds", id)))
    }

    pub fn kind(&self, id: NodeId) -> Result<&NodeKind, DomainError> {
        self.node(id).map(|n| &n.kind)
    }

    pub fn range(&self, id: NodeId) -> Result<Range, DomainError> {
        self.node(id).map(|n| n.range)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parents.get(id.index()).copied().flatten()
    }

    /// Ancestors from the direct parent up to the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |current| self.parent(*current))
    }

    /// Identifier of a `SimpleName` node.
    pub fn identifier(&self, id: NodeId) -> Result<&str, DomainError> {
        match self.kind(id)? {
            NodeKind::SimpleName { identifier } => Ok(identifier),
            other => Err(DomainError::invariant(format!(
                "expected SimpleName at {}, found {}",
                id,
                other.label()
            ))),
        }
    }

    /// Dotted text of a `SimpleName` / `QualifiedName` chain.
    pub fn dotted_name(&self, id: NodeId) -> Result<String, DomainError> {
        match self.kind(id)? {
            NodeKind::SimpleName { identifier } => Ok(identifier.clone()),
            NodeKind::QualifiedName { qualifier, name } => Ok(format!(
                "{}.{}",
                self.dotted_name(*qualifier)?,
                self.identifier(*name)?
            )),
            other => Err(DomainError::invariant(format!(
                "expected a name at {}, found {}",
                id,
                other.label()
            ))),
        }
    }

    /// Range of the last simple name of a name chain, e.g. `List` in
    /// `java.util.List`.
    pub fn last_name_range(&self, id: NodeId) -> Result<Range, DomainError> {
        match self.kind(id)? {
            NodeKind::QualifiedName { name, .. } | NodeKind::QualifiedType { name, .. } => {
                self.range(*name)
            }
            NodeKind::SimpleType { name } => self.last_name_range(*name),
            _ => self.range(id),
        }
    }
}

impl TryFrom<RawSyntaxTree> for SyntaxTree {
    type Error = DomainError;

    fn try_from(raw: RawSyntaxTree) -> Result<Self, Self::Error> {
        SyntaxTree::new(raw.nodes, raw.root, raw.comments)
    }
}

impl From<SyntaxTree> for RawSyntaxTree {
    fn from(tree: SyntaxTree) -> Self {
        RawSyntaxTree {
            nodes: tree.nodes,
            root: tree.root,
            comments: tree.comments,
        }
    }
}
