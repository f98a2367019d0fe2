use std::path::Path;

use serde::Serialize;
use tracing::warn;

use crate::application::FactSink;
use crate::domain::{
    positional_name, AccessKind, DefinitionKind, Fact, FileId, Range, ReferenceKind, SymbolKind,
};

/// Number of facts handed to the sink, per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FactCounts {
    pub symbols: usize,
    pub references: usize,
    pub local_symbols: usize,
    pub comments: usize,
    pub errors: usize,
}

impl FactCounts {
    pub fn total(&self) -> usize {
        self.symbols + self.references + self.local_symbols + self.comments + self.errors
    }

    pub fn add(&mut self, other: &FactCounts) {
        self.symbols += other.symbols;
        self.references += other.references;
        self.local_symbols += other.local_symbols;
        self.comments += other.comments;
        self.errors += other.errors;
    }
}

/// Append-only facade over a [`FactSink`] for one file.
pub struct Recorder<'s> {
    sink: &'s dyn FactSink,
    file_id: FileId,
    counts: FactCounts,
}

impl<'s> Recorder<'s> {
    pub fn new(sink: &'s dyn FactSink, file_id: FileId) -> Self {
        Self {
            sink,
            file_id,
            counts: FactCounts::default(),
        }
    }

    pub fn file_id(&self) -> FileId {
        self.file_id
    }

    pub fn counts(&self) -> FactCounts {
        self.counts
    }

    pub fn record_symbol(
        &mut self,
        name: String,
        kind: SymbolKind,
        access: AccessKind,
        definition: DefinitionKind,
    ) {
        self.counts.symbols += 1;
        self.emit(Fact::Symbol {
            file_id: self.file_id,
            name,
            kind,
            access,
            definition,
        });
    }

    pub fn record_symbol_with_location(
        &mut self,
        name: String,
        kind: SymbolKind,
        range: Range,
        access: AccessKind,
        definition: DefinitionKind,
    ) {
        self.counts.symbols += 1;
        self.emit(Fact::SymbolWithLocation {
            file_id: self.file_id,
            name,
            kind,
            access,
            definition,
            range,
        });
    }

    pub fn record_symbol_with_location_and_scope(
        &mut self,
        name: String,
        kind: SymbolKind,
        range: Range,
        scope_range: Range,
        access: AccessKind,
        definition: DefinitionKind,
    ) {
        self.counts.symbols += 1;
        self.emit(Fact::SymbolWithLocationAndScope {
            file_id: self.file_id,
            name,
            kind,
            access,
            definition,
            range,
            scope_range,
        });
    }

    pub fn record_reference(
        &mut self,
        kind: ReferenceKind,
        referenced_name: String,
        context_name: String,
        range: Range,
    ) {
        self.counts.references += 1;
        self.emit(Fact::Reference {
            file_id: self.file_id,
            kind,
            referenced_name,
            context_name,
            range,
        });
    }

    pub fn record_local_symbol(&mut self, name: String, range: Range) {
        self.counts.local_symbols += 1;
        self.emit(Fact::LocalSymbol {
            file_id: self.file_id,
            name,
            range,
        });
    }

    /// A scope is a pair of local symbols named after its start, one on
    /// each delimiter.
    pub fn record_scope(&mut self, path: &Path, range: Range) {
        let name = positional_name(path, range.begin());
        self.record_local_symbol(name.clone(), Range::at(range.begin()));
        self.record_local_symbol(name, Range::at(range.end()));
    }

    pub fn record_comment(&mut self, range: Range) {
        self.counts.comments += 1;
        self.emit(Fact::Comment {
            file_id: self.file_id,
            range,
        });
    }

    pub fn record_error(&mut self, message: String, fatal: bool, indexed: bool, range: Range) {
        self.counts.errors += 1;
        self.emit(Fact::Error {
            file_id: self.file_id,
            message,
            fatal,
            indexed,
            range,
        });
    }

    fn emit(&self, fact: Fact) {
        if let Err(e) = self.sink.record(fact) {
            warn!("Failed to record fact for file {}: {}", self.file_id, e);
        }
    }
}
