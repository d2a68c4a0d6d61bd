//! Source spans

use serde::{Deserialize, Serialize};

/// Half-open character range `[start, end)` in a source string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    /// Create a new span
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Span covering both `self` and `other`
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// True when `other` starts exactly where `self` ends (no whitespace between)
    pub fn touches(self, other: Span) -> bool {
        self.end == other.start
    }
}
