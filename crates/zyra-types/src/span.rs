use serde::{Deserialize, Serialize};
use std::fmt;

/// Source location of an AST node, as recorded by the front end.
///
/// Lines and columns are 1-based. Trees assembled by a host without a parser
/// carry [`Span::SYNTHETIC`], which renders as `<synthetic>`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub line: u32,
    pub column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl Span {
    /// Span for nodes that were never read from source text.
    pub const SYNTHETIC: Span = Span {
        line: 0,
        column: 0,
        end_line: 0,
        end_column: 0,
    };

    pub fn new(line: u32, column: u32, end_line: u32, end_column: u32) -> Self {
        Self {
            line,
            column,
            end_line,
            end_column,
        }
    }

    /// Zero-width span at a single position.
    pub fn point(line: u32, column: u32) -> Self {
        Self::new(line, column, line, column)
    }

    pub fn is_synthetic(&self) -> bool {
        self.line == 0
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_synthetic() {
            write!(f, "<synthetic>")
        } else {
            write!(f, "{}:{}", self.line, self.column)
        }
    }
}
