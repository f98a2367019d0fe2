pub mod application;
pub mod connector;
pub mod domain;

pub use application::{
    AstTraversal, FactCounts, FactSink, FileOutcome, FileSummary, IndexFileUseCase, IndexOptions,
    IndexProjectUseCase, Interrupt, JavaFrontend, ParseProblem, ParsedUnit, ProjectSummary,
    Recorder, Resolution, ResolutionOracle, UnresolvedReason,
};

pub use connector::{
    JsonLinesSink, MemorySink, ResolvedNode, SnapshotFrontend, SnapshotOracle, SnapshotUnit,
};

pub use domain::{
    AccessKind, Binding, BindingId, Classpath, DeclName, DefinitionKind, DomainError, Fact,
    FileId, NameDelimiter, NameElement, NameHierarchy, Node, NodeId, NodeKind, Position, Range,
    ReferenceKind, SourceText, SymbolKind, SyntaxTree, TypeName,
};
