use std::fmt;
use std::path::Path;

use super::{NameDelimiter, NameElement, NameHierarchy, Position, TypeName};

pub const UNSOLVED_SYMBOL: &str = "unsolved-symbol";

/// The signature carried by a declaration segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Signature {
    None,
    /// Methods and constructors. Constructors have no return type.
    Function {
        return_type: Option<Box<TypeName>>,
        parameters: Vec<TypeName>,
    },
    /// Fields and annotation members.
    Variable { ty: Box<TypeName> },
}

/// Qualified name of a declaration, stored leaf first with a link to the
/// enclosing declaration (or package segment).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeclName {
    name: String,
    type_parameters: Vec<String>,
    signature: Signature,
    is_static: bool,
    parent: Option<Box<DeclName>>,
}

impl DeclName {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_parameters: Vec::new(),
            signature: Signature::None,
            is_static: false,
            parent: None,
        }
    }

    pub fn unsolved() -> Self {
        Self::new(UNSOLVED_SYMBOL)
    }

    /// Name of an anonymous class whose body starts at `position` in `path`.
    pub fn anonymous_class(path: &Path, position: Position) -> Self {
        Self::new(format!("anonymous class ({})", positional_name(path, position)))
    }

    /// Builds a package chain from a dotted name. Returns `None` for the
    /// unnamed package.
    pub fn from_dotted(dotted: &str) -> Option<Self> {
        dotted
            .split('.')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .fold(None, |parent, segment| {
                Some(DeclName::new(segment).with_parent(parent))
            })
    }

    pub fn with_type_parameters(mut self, type_parameters: Vec<String>) -> Self {
        self.type_parameters = type_parameters;
        self
    }

    pub fn with_function_signature(
        mut self,
        return_type: Option<TypeName>,
        parameters: Vec<TypeName>,
    ) -> Self {
        self.signature = Signature::Function {
            return_type: return_type.map(Box::new),
            parameters,
        };
        self
    }

    pub fn with_variable_type(mut self, ty: TypeName) -> Self {
        self.signature = Signature::Variable { ty: Box::new(ty) };
        self
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn with_parent(mut self, parent: Option<DeclName>) -> Self {
        self.parent = parent.map(Box::new);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_parameters(&self) -> &[String] {
        &self.type_parameters
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn parent(&self) -> Option<&DeclName> {
        self.parent.as_deref()
    }

    pub fn is_unsolved(&self) -> bool {
        self.name == UNSOLVED_SYMBOL
    }

    /// Segments from the root down to this declaration.
    pub fn chain(&self) -> Vec<&DeclName> {
        let mut chain = Vec::new();
        let mut current = Some(self);
        while let Some(segment) = current {
            chain.push(segment);
            current = segment.parent();
        }
        chain.reverse();
        chain
    }

    /// Name plus type parameter list, e.g. `Map<K, V>`.
    pub fn display_name(&self) -> String {
        if self.type_parameters.is_empty() {
            self.name.clone()
        } else {
            format!("{}<{}>", self.name, self.type_parameters.join(", "))
        }
    }

    fn to_name_element(&self) -> NameElement {
        let static_marker = if self.is_static { "static " } else { "" };
        match &self.signature {
            Signature::None => NameElement::new(self.display_name()),
            Signature::Function {
                return_type,
                parameters,
            } => {
                let prefix = match return_type {
                    Some(ty) => format!("{}{}", static_marker, ty),
                    None => static_marker.trim_end().to_string(),
                };
                let postfix = format!(
                    "({})",
                    parameters
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(", ")
                );
                NameElement::new(self.display_name()).with_signature(prefix, postfix)
            }
            Signature::Variable { ty } => NameElement::new(self.display_name())
                .with_signature(format!("{}{}", static_marker, ty), ""),
        }
    }

    pub fn to_name_hierarchy(&self) -> NameHierarchy {
        self.chain()
            .into_iter()
            .fold(NameHierarchy::new(NameDelimiter::Java), |hierarchy, segment| {
                hierarchy.with_element(segment.to_name_element())
            })
    }

    pub fn serialize(&self) -> String {
        self.to_name_hierarchy().serialize()
    }
}

impl fmt::Display for DeclName {
    /// Dotted chain of display names without signatures.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(parent) = self.parent() {
            write!(f, "{}.", parent)?;
        }
        f.write_str(&self.display_name())
    }
}

/// Positional name used for locals and scopes: `<path><line:column>`.
pub fn positional_name(path: &Path, position: Position) -> String {
    format!("{}<{}:{}>", path.display(), position.line, position.column)
}

/// Name of the file-level context.
pub fn file_name_hierarchy(path: &Path) -> NameHierarchy {
    NameHierarchy::new(NameDelimiter::File)
        .with_element(NameElement::new(path.display().to_string()))
}
