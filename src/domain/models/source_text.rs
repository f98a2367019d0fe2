use super::{Position, Range};

/// Source file content addressed by 1-based line/column positions.
/// Columns count characters, not bytes.
#[derive(Debug, Clone, Default)]
pub struct SourceText {
    lines: Vec<Vec<char>>,
}

impl SourceText {
    pub fn new(text: &str) -> Self {
        Self {
            lines: text
                .split('\n')
                .map(|line| line.trim_end_matches('\r').chars().collect())
                .collect(),
        }
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Position of the last character of the file.
    pub fn end(&self) -> Position {
        let line = self.lines.len().max(1);
        let column = self.lines.last().map_or(0, Vec::len).max(1);
        Position::new(line as u32, column as u32)
    }

    /// Text covered by an inclusive range.
    pub fn slice(&self, range: Range) -> String {
        let mut out = String::new();
        if !range.is_valid() {
            return out;
        }
        for line_number in range.begin_line..=range.end_line {
            let Some(line) = self.lines.get(line_number as usize - 1) else {
                break;
            };
            let from = if line_number == range.begin_line {
                range.begin_column as usize - 1
            } else {
                0
            };
            let to = if line_number == range.end_line {
                (range.end_column as usize).min(line.len())
            } else {
                line.len()
            };
            if from < to {
                out.extend(&line[from..to]);
            }
            if line_number != range.end_line {
                out.push('\n');
            }
        }
        out
    }

    /// First occurrence of `needle` at or after `from`.
    pub fn find(&self, needle: &str, from: Position) -> Option<Position> {
        let needle: Vec<char> = needle.chars().collect();
        if needle.is_empty() || from.line == 0 || from.column == 0 {
            return None;
        }
        for (index, line) in self.lines.iter().enumerate().skip(from.line as usize - 1) {
            let line_number = index as u32 + 1;
            let start = if line_number == from.line {
                from.column as usize - 1
            } else {
                0
            };
            if start + needle.len() > line.len() {
                continue;
            }
            if let Some(offset) = line[start..]
                .windows(needle.len())
                .position(|window| window == needle.as_slice())
            {
                return Some(Position::new(line_number, (start + offset) as u32 + 1));
            }
        }
        None
    }

    /// Range of the first occurrence of `needle` at or after `from`.
    pub fn find_range(&self, needle: &str, from: Position) -> Option<Range> {
        let begin = self.find(needle, from)?;
        let width = needle.chars().count() as u32;
        Some(Range::new(
            begin.line,
            begin.column,
            begin.line,
            begin.column + width - 1,
        ))
    }
}
