use std::fmt;

use serde::{Deserialize, Serialize};

/// A 1-based line/column position in a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// An inclusive source range, 1-based on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Range {
    pub begin_line: u32,
    pub begin_column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl Range {
    pub fn new(begin_line: u32, begin_column: u32, end_line: u32, end_column: u32) -> Self {
        Self {
            begin_line,
            begin_column,
            end_line,
            end_column,
        }
    }

    pub fn between(begin: Position, end: Position) -> Self {
        Self::new(begin.line, begin.column, end.line, end.column)
    }

    /// A zero-width range sitting on `position`.
    pub fn at(position: Position) -> Self {
        Self::between(position, position)
    }

    pub fn begin(&self) -> Position {
        Position::new(self.begin_line, self.begin_column)
    }

    pub fn end(&self) -> Position {
        Position::new(self.end_line, self.end_column)
    }

    pub fn contains(&self, position: Position) -> bool {
        self.begin() <= position && position <= self.end()
    }

    pub fn is_valid(&self) -> bool {
        self.begin_line >= 1 && self.begin_column >= 1 && self.begin() <= self.end()
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}:{}-{}:{}]",
            self.begin_line, self.begin_column, self.end_line, self.end_column
        )
    }
}
