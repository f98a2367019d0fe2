//! Canonical names for declarations and type occurrences.
//!
//! Both namers work from either representation of a declaration: the syntax
//! node in the file being indexed, or the binding handle the resolver
//! returns for a reference. The two paths are kept in lockstep so that both
//! produce the same serialized name.

mod decl_namer;
mod ignored_contexts;
mod type_namer;

use std::cell::Cell;
use std::path::Path;

use thiserror::Error;

use crate::application::{ResolutionOracle, UnresolvedReason};
use crate::domain::{DomainError, SourceText, SyntaxTree};

pub use ignored_contexts::*;

/// Deepest nesting of naming calls before a node is given up on.
pub const MAX_NAMING_DEPTH: usize = 64;

/// Failure while handling a single node.
#[derive(Debug, Error)]
pub enum NamingFailure {
    #[error("{reason}: {text}")]
    Unresolved {
        reason: UnresolvedReason,
        text: String,
    },

    #[error("resource exhausted: naming nested deeper than {0} levels")]
    RecursionLimit(usize),

    #[error("undeclared local: {0}")]
    UndeclaredLocal(String),

    /// The tree itself is broken; not recoverable for this file.
    #[error(transparent)]
    Invariant(#[from] DomainError),
}

impl NamingFailure {
    pub fn unresolved(reason: UnresolvedReason, text: impl Into<String>) -> Self {
        Self::Unresolved {
            reason,
            text: text.into(),
        }
    }

    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Invariant(_))
    }
}

/// Names declarations and types of one file.
pub struct Namer<'a> {
    tree: &'a SyntaxTree,
    oracle: &'a dyn ResolutionOracle,
    source: &'a SourceText,
    path: &'a Path,
    depth: Cell<usize>,
}

impl<'a> Namer<'a> {
    pub fn new(
        tree: &'a SyntaxTree,
        oracle: &'a dyn ResolutionOracle,
        source: &'a SourceText,
        path: &'a Path,
    ) -> Self {
        Self {
            tree,
            oracle,
            source,
            path,
            depth: Cell::new(0),
        }
    }

    pub fn path(&self) -> &Path {
        self.path
    }

    fn descend(&self) -> Result<DepthGuard<'_>, NamingFailure> {
        let depth = self.depth.get() + 1;
        if depth > MAX_NAMING_DEPTH {
            return Err(NamingFailure::RecursionLimit(MAX_NAMING_DEPTH));
        }
        self.depth.set(depth);
        Ok(DepthGuard { depth: &self.depth })
    }
}

struct DepthGuard<'n> {
    depth: &'n Cell<usize>,
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}
