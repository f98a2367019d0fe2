use std::fmt;

use super::DeclName;

pub const UNSOLVED_TYPE: &str = "unsolved-type";

/// Qualified name of a type occurrence.
///
/// Array types are represented by their element type; the dimensions are
/// not part of the identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeName {
    name: String,
    type_parameters: Vec<String>,
    type_arguments: Vec<TypeName>,
    parent: Option<Box<DeclName>>,
}

impl TypeName {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_parameters: Vec::new(),
            type_arguments: Vec::new(),
            parent: None,
        }
    }

    pub fn unsolved() -> Self {
        Self::new(UNSOLVED_TYPE)
    }

    /// Best-effort name for constructs without a declaration, such as
    /// wildcards and union or intersection types.
    pub fn from_text(text: &str) -> Self {
        let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            Self::unsolved()
        } else {
            Self::new(collapsed)
        }
    }

    /// Lifts a declaration name into a type name without type arguments.
    pub fn from_decl_name(decl: DeclName) -> Self {
        Self {
            name: decl.name().to_string(),
            type_parameters: decl.type_parameters().to_vec(),
            type_arguments: Vec::new(),
            parent: decl.parent().cloned().map(Box::new),
        }
    }

    pub fn with_type_parameters(mut self, type_parameters: Vec<String>) -> Self {
        self.type_parameters = type_parameters;
        self
    }

    pub fn with_type_arguments(mut self, type_arguments: Vec<TypeName>) -> Self {
        self.type_arguments = type_arguments;
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

    pub fn type_arguments(&self) -> &[TypeName] {
        &self.type_arguments
    }

    pub fn parent(&self) -> Option<&DeclName> {
        self.parent.as_deref()
    }

    pub fn is_unsolved(&self) -> bool {
        self.name == UNSOLVED_TYPE
    }

    /// Name of the declaration this type refers to, type arguments dropped.
    pub fn to_decl_name(&self) -> DeclName {
        DeclName::new(self.name.clone())
            .with_type_parameters(self.type_parameters.clone())
            .with_parent(self.parent().cloned())
    }

    pub fn serialize(&self) -> String {
        self.to_decl_name().serialize()
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(parent) = self.parent() {
            write!(f, "{}.", parent)?;
        }
        f.write_str(&self.name)?;
        if !self.type_arguments.is_empty() {
            let arguments = self
                .type_arguments
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            write!(f, "<{}>", arguments)?;
        }
        Ok(())
    }
}
