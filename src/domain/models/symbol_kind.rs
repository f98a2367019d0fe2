use serde::{Deserialize, Serialize};

use super::Visibility;

/// Kind of a recorded symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Package,
    Annotation,
    Class,
    Interface,
    Enum,
    Record,
    EnumConstant,
    Field,
    Method,
    TypeParameter,
    BuiltinType,
}

impl SymbolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Package => "package",
            SymbolKind::Annotation => "annotation",
            SymbolKind::Class => "class",
            SymbolKind::Interface => "interface",
            SymbolKind::Enum => "enum",
            SymbolKind::Record => "record",
            SymbolKind::EnumConstant => "enum_constant",
            SymbolKind::Field => "field",
            SymbolKind::Method => "method",
            SymbolKind::TypeParameter => "type_parameter",
            SymbolKind::BuiltinType => "builtin_type",
        }
    }
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Accessibility attached to symbol facts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessKind {
    None,
    Public,
    Protected,
    Private,
    Default,
    TypeParameter,
}

impl AccessKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessKind::None => "none",
            AccessKind::Public => "public",
            AccessKind::Protected => "protected",
            AccessKind::Private => "private",
            AccessKind::Default => "default",
            AccessKind::TypeParameter => "type_parameter",
        }
    }
}

impl From<Visibility> for AccessKind {
    fn from(visibility: Visibility) -> Self {
        match visibility {
            Visibility::Public => AccessKind::Public,
            Visibility::Protected => AccessKind::Protected,
            Visibility::Private => AccessKind::Private,
            Visibility::Package => AccessKind::Default,
        }
    }
}

impl std::fmt::Display for AccessKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether a symbol was declared in the indexed source or only referenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefinitionKind {
    None,
    Implicit,
    Explicit,
}

impl DefinitionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DefinitionKind::None => "none",
            DefinitionKind::Implicit => "implicit",
            DefinitionKind::Explicit => "explicit",
        }
    }
}

impl std::fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of a reference edge between a context and a referenced symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    /// A type mentioned in a declaration or expression: `List x`
    TypeUsage,
    /// Field or annotation member access: `this.count`
    Usage,
    /// Method or constructor invocation: `foo()`, `new Foo()`
    Call,
    /// `extends` / `implements` clauses and anonymous class bases
    Inheritance,
    /// A method overriding one declared in an ancestor type
    Override,
    /// Generic argument: `List<Foo>`, `this.<Foo>bar()`
    TypeArgument,
    /// Import declaration: `import java.util.List`
    Import,
    /// Annotation: `@Override`
    AnnotationUsage,
}

impl ReferenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceKind::TypeUsage => "type_usage",
            ReferenceKind::Usage => "usage",
            ReferenceKind::Call => "call",
            ReferenceKind::Inheritance => "inheritance",
            ReferenceKind::Override => "override",
            ReferenceKind::TypeArgument => "type_argument",
            ReferenceKind::Import => "import",
            ReferenceKind::AnnotationUsage => "annotation_usage",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "type_usage" => Some(ReferenceKind::TypeUsage),
            "usage" => Some(ReferenceKind::Usage),
            "call" => Some(ReferenceKind::Call),
            "inheritance" => Some(ReferenceKind::Inheritance),
            "override" => Some(ReferenceKind::Override),
            "type_argument" => Some(ReferenceKind::TypeArgument),
            "import" => Some(ReferenceKind::Import),
            "annotation_usage" => Some(ReferenceKind::AnnotationUsage),
            _ => None,
        }
    }
}

impl std::fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
