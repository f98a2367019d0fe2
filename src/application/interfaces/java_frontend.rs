use std::path::Path;

use serde::{Deserialize, Serialize};

use super::ResolutionOracle;
use crate::domain::{Classpath, DomainError, Range, SyntaxTree};

/// A recoverable problem the parser reported while still producing a tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseProblem {
    pub message: String,
    pub range: Range,
}

/// Output of a successful parse: the tree plus the resolver bound to it.
pub struct ParsedUnit {
    tree: SyntaxTree,
    oracle: Box<dyn ResolutionOracle + Send>,
    problems: Vec<ParseProblem>,
}

impl ParsedUnit {
    pub fn new(tree: SyntaxTree, oracle: Box<dyn ResolutionOracle + Send>) -> Self {
        Self {
            tree,
            oracle,
            problems: Vec::new(),
        }
    }

    pub fn with_problems(mut self, problems: Vec<ParseProblem>) -> Self {
        self.problems = problems;
        self
    }

    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    pub fn oracle(&self) -> &dyn ResolutionOracle {
        self.oracle.as_ref()
    }

    pub fn problems(&self) -> &[ParseProblem] {
        &self.problems
    }
}

/// Parses and resolves Java source files.
pub trait JavaFrontend: Send + Sync {
    /// Fails with a parse error when no tree can be built.
    fn parse(
        &self,
        path: &Path,
        source: &str,
        classpath: &Classpath,
    ) -> Result<ParsedUnit, DomainError>;
}
