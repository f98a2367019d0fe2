use serde::{Deserialize, Serialize};

use super::{NodeId, Position};

/// Opaque handle of a declaration known to the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BindingId(pub u32);

impl std::fmt::Display for BindingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "@{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableFlavor {
    Field,
    EnumConstant,
    Local,
    Parameter,
}

impl VariableFlavor {
    pub fn is_local(&self) -> bool {
        matches!(self, VariableFlavor::Local | VariableFlavor::Parameter)
    }
}

/// What the resolver knows about a declaration.
///
/// `parent` always points at the binding a name is qualified with: the
/// package of a top-level type, the enclosing type of a member, the method
/// (or, for initializers of fields, the type) declaring a local or anonymous
/// class, and the generic type or method introducing a type variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Binding {
    Package {
        name: String,
    },
    /// Class, interface, enum, annotation type or record.
    Type {
        name: String,
        #[serde(default)]
        type_parameters: Vec<String>,
        #[serde(default)]
        parent: Option<BindingId>,
        #[serde(default)]
        supertypes: Vec<BindingId>,
        #[serde(default)]
        methods: Vec<BindingId>,
        #[serde(default)]
        declaring_node: Option<NodeId>,
    },
    /// Anonymous class; `declared_at` is the opening brace of its body.
    Anonymous {
        declared_at: Position,
        #[serde(default)]
        parent: Option<BindingId>,
        #[serde(default)]
        supertypes: Vec<BindingId>,
        #[serde(default)]
        methods: Vec<BindingId>,
        #[serde(default)]
        declaring_node: Option<NodeId>,
    },
    Parameterized {
        declaration: BindingId,
        #[serde(default)]
        arguments: Vec<BindingId>,
    },
    TypeVariable {
        name: String,
        #[serde(default)]
        parent: Option<BindingId>,
        /// First upper bound; unbounded variables erase to `java.lang.Object`.
        #[serde(default)]
        bound: Option<BindingId>,
        #[serde(default)]
        declaring_node: Option<NodeId>,
    },
    /// Primitive types, `void` and the null type.
    Primitive {
        name: String,
    },
    Array {
        element: BindingId,
    },
    /// Wildcard, union and intersection types, named by text.
    Wildcard {
        text: String,
    },
    Method {
        name: String,
        #[serde(default)]
        type_parameters: Vec<String>,
        #[serde(default)]
        return_type: Option<BindingId>,
        #[serde(default)]
        parameters: Vec<BindingId>,
        #[serde(default)]
        parent: Option<BindingId>,
        #[serde(default)]
        is_static: bool,
        #[serde(default)]
        is_constructor: bool,
        #[serde(default)]
        is_annotation_member: bool,
        /// Generic declaration this binding instantiates, if any.
        #[serde(default)]
        declaration: Option<BindingId>,
        #[serde(default)]
        declaring_node: Option<NodeId>,
    },
    Variable {
        name: String,
        flavor: VariableFlavor,
        #[serde(default)]
        ty: Option<BindingId>,
        #[serde(default)]
        parent: Option<BindingId>,
        #[serde(default)]
        is_static: bool,
        /// Start of the declaring name, required for locals.
        #[serde(default)]
        declared_at: Option<Position>,
        #[serde(default)]
        declaring_node: Option<NodeId>,
    },
}

impl Binding {
    pub fn parent(&self) -> Option<BindingId> {
        match self {
            Binding::Type { parent, .. }
            | Binding::Anonymous { parent, .. }
            | Binding::TypeVariable { parent, .. }
            | Binding::Method { parent, .. }
            | Binding::Variable { parent, .. } => *parent,
            _ => None,
        }
    }

    pub fn declaring_node(&self) -> Option<NodeId> {
        match self {
            Binding::Type { declaring_node, .. }
            | Binding::Anonymous { declaring_node, .. }
            | Binding::TypeVariable { declaring_node, .. }
            | Binding::Method { declaring_node, .. }
            | Binding::Variable { declaring_node, .. } => *declaring_node,
            _ => None,
        }
    }

    /// Direct supertypes of a class-like binding.
    pub fn supertypes(&self) -> &[BindingId] {
        match self {
            Binding::Type { supertypes, .. } | Binding::Anonymous { supertypes, .. } => {
                supertypes.as_slice()
            }
            _ => &[],
        }
    }

    /// Methods declared directly in a class-like binding.
    pub fn methods(&self) -> &[BindingId] {
        match self {
            Binding::Type { methods, .. } | Binding::Anonymous { methods, .. } => methods.as_slice(),
            _ => &[],
        }
    }

    pub fn is_type(&self) -> bool {
        matches!(
            self,
            Binding::Type { .. }
                | Binding::Anonymous { .. }
                | Binding::Parameterized { .. }
                | Binding::TypeVariable { .. }
                | Binding::Primitive { .. }
                | Binding::Array { .. }
                | Binding::Wildcard { .. }
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            Binding::Package { .. } => "package",
            Binding::Type { .. } => "type",
            Binding::Anonymous { .. } => "anonymous",
            Binding::Parameterized { .. } => "parameterized",
            Binding::TypeVariable { .. } => "type_variable",
            Binding::Primitive { .. } => "primitive",
            Binding::Array { .. } => "array",
            Binding::Wildcard { .. } => "wildcard",
            Binding::Method { .. } => "method",
            Binding::Variable { .. } => "variable",
        }
    }
}
