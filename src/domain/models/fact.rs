use std::fmt;

use serde::{Deserialize, Serialize};

use super::{AccessKind, DefinitionKind, Range, ReferenceKind, SymbolKind};

/// Host-assigned identifier of an indexed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(pub u32);

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One recorded output unit. Names are serialized name hierarchies, except
/// for local symbols which carry a positional name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "fact", rename_all = "snake_case")]
pub enum Fact {
    Symbol {
        file_id: FileId,
        name: String,
        kind: SymbolKind,
        access: AccessKind,
        definition: DefinitionKind,
    },
    SymbolWithLocation {
        file_id: FileId,
        name: String,
        kind: SymbolKind,
        access: AccessKind,
        definition: DefinitionKind,
        range: Range,
    },
    SymbolWithLocationAndScope {
        file_id: FileId,
        name: String,
        kind: SymbolKind,
        access: AccessKind,
        definition: DefinitionKind,
        range: Range,
        scope_range: Range,
    },
    Reference {
        file_id: FileId,
        kind: ReferenceKind,
        referenced_name: String,
        context_name: String,
        range: Range,
    },
    LocalSymbol {
        file_id: FileId,
        name: String,
        range: Range,
    },
    Comment {
        file_id: FileId,
        range: Range,
    },
    Error {
        file_id: FileId,
        message: String,
        fatal: bool,
        indexed: bool,
        range: Range,
    },
}

impl Fact {
    pub fn file_id(&self) -> FileId {
        match self {
            Fact::Symbol { file_id, .. }
            | Fact::SymbolWithLocation { file_id, .. }
            | Fact::SymbolWithLocationAndScope { file_id, .. }
            | Fact::Reference { file_id, .. }
            | Fact::LocalSymbol { file_id, .. }
            | Fact::Comment { file_id, .. }
            | Fact::Error { file_id, .. } => *file_id,
        }
    }

    pub fn range(&self) -> Option<Range> {
        match self {
            Fact::Symbol { .. } => None,
            Fact::SymbolWithLocation { range, .. }
            | Fact::SymbolWithLocationAndScope { range, .. }
            | Fact::Reference { range, .. }
            | Fact::LocalSymbol { range, .. }
            | Fact::Comment { range, .. }
            | Fact::Error { range, .. } => Some(*range),
        }
    }

    /// Name of the declared or local symbol, if this is a symbol fact.
    pub fn symbol_name(&self) -> Option<&str> {
        match self {
            Fact::Symbol { name, .. }
            | Fact::SymbolWithLocation { name, .. }
            | Fact::SymbolWithLocationAndScope { name, .. }
            | Fact::LocalSymbol { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn symbol_kind(&self) -> Option<SymbolKind> {
        match self {
            Fact::Symbol { kind, .. }
            | Fact::SymbolWithLocation { kind, .. }
            | Fact::SymbolWithLocationAndScope { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Fact::Error { .. })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Fact::Symbol { .. } => "symbol",
            Fact::SymbolWithLocation { .. } => "symbol_with_location",
            Fact::SymbolWithLocationAndScope { .. } => "symbol_with_location_and_scope",
            Fact::Reference { .. } => "reference",
            Fact::LocalSymbol { .. } => "local_symbol",
            Fact::Comment { .. } => "comment",
            Fact::Error { .. } => "error",
        }
    }
}
