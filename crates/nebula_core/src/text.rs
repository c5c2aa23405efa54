//! Source locations.
//!
//! Every syntax node, bound node, emitted instruction and diagnostic carries
//! a [`TextSpan`]. The [`LineMap`] turns span starts back into the line and
//! column pairs shown in reports and stored in debug documents.

use std::fmt;
use std::ops::Range;

/// Byte offset into a source file.
pub type TextPos = u32;

/// A half-open byte range `start..start + length` in one source file.
#[derive(Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct TextSpan {
    pub start: TextPos,
    pub length: TextPos,
}

impl TextSpan {
    #[inline]
    pub fn new(start: TextPos, length: TextPos) -> Self {
        Self { start, length }
    }

    /// The span between two offsets. An `end` before `start` yields an
    /// empty span at `start`.
    #[inline]
    pub fn from_bounds(start: TextPos, end: TextPos) -> Self {
        Self::new(start, end.saturating_sub(start))
    }

    #[inline]
    pub fn empty(at: TextPos) -> Self {
        Self::new(at, 0)
    }

    #[inline]
    pub fn end(self) -> TextPos {
        self.start.saturating_add(self.length)
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.length == 0
    }

    #[inline]
    pub fn to_range(self) -> Range<usize> {
        self.start as usize..self.end() as usize
    }

    /// The smallest span covering `self` and `other`.
    pub fn cover(self, other: TextSpan) -> TextSpan {
        TextSpan::from_bounds(self.start.min(other.start), self.end().max(other.end()))
    }
}

impl fmt::Debug for TextSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end())
    }
}

/// A 0-based line and byte column.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd)]
pub struct LineAndColumn {
    pub line: u32,
    pub character: u32,
}

impl LineAndColumn {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// Renders 1-based, the way reports show positions.
impl fmt::Display for LineAndColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.line + 1, self.character + 1)
    }
}

/// Start offsets of every line in a text.
#[derive(Debug, Clone)]
pub struct LineMap {
    line_starts: Vec<TextPos>,
}

impl LineMap {
    pub fn new(text: &str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| (i + 1) as TextPos))
            .collect();
        Self { line_starts }
    }

    /// The line containing `pos`. Offsets past the end land on the last line.
    pub fn line_of(&self, pos: TextPos) -> u32 {
        (self.line_starts.partition_point(|&start| start <= pos) - 1) as u32
    }

    pub fn line_and_column_of(&self, pos: TextPos) -> LineAndColumn {
        let line = self.line_of(pos);
        LineAndColumn::new(line, pos - self.line_starts[line as usize])
    }

    pub fn line_starts(&self) -> &[TextPos] {
        &self.line_starts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_bounds() {
        let span = TextSpan::from_bounds(4, 9);
        assert_eq!(span, TextSpan::new(4, 5));
        assert_eq!(span.to_range(), 4..9);
        assert!(TextSpan::from_bounds(9, 4).is_empty());
    }

    #[test]
    fn test_span_cover() {
        let joined = TextSpan::new(10, 4).cover(TextSpan::new(2, 3));
        assert_eq!(joined, TextSpan::new(2, 12));
    }

    #[test]
    fn test_line_map_positions() {
        let map = LineMap::new("func\nint x;\n}");
        assert_eq!(map.line_starts(), &[0, 5, 12]);
        assert_eq!(map.line_of(4), 0);
        assert_eq!(map.line_of(5), 1);
        assert_eq!(map.line_of(40), 2);
        assert_eq!(map.line_and_column_of(9), LineAndColumn::new(1, 4));
        assert_eq!(map.line_and_column_of(9).to_string(), "2,5");
    }
}
