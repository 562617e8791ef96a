use std::fmt;
use std::ops::Range;

/// A reference to a position in the source text.
///
/// Positions in the source are held as byte slices, together with the
/// one-based line number and line position of the slice start. Line
/// positions count characters, not bytes, so they line up with what an
/// editor shows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PositionMarker {
    pub source_slice: Range<usize>,
    pub line_no: usize,
    pub line_pos: usize,
}

impl PositionMarker {
    pub fn new(source_slice: Range<usize>, line_no: usize, line_pos: usize) -> Self {
        Self {
            source_slice,
            line_no,
            line_pos,
        }
    }

    /// A zero width marker at a single point.
    pub fn point(offset: usize, line_no: usize, line_pos: usize) -> Self {
        Self::new(offset..offset, line_no, line_pos)
    }

    pub fn source_position(&self) -> (usize, usize) {
        (self.line_no, self.line_pos)
    }

    #[track_caller]
    pub fn source_str<'a>(&self, source: &'a str) -> &'a str {
        &source[self.source_slice.clone()]
    }

    pub fn is_point(&self) -> bool {
        self.source_slice.is_empty()
    }
}

impl fmt::Display for PositionMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, position {}", self.line_no, self.line_pos)
    }
}

/// Tracks the line and character position while walking forward through
/// source text.
#[derive(Debug, Clone)]
pub(crate) struct LineTracker {
    offset: usize,
    line_no: usize,
    line_pos: usize,
}

impl Default for LineTracker {
    fn default() -> Self {
        Self {
            offset: 0,
            line_no: 1,
            line_pos: 1,
        }
    }
}

impl LineTracker {
    pub(crate) fn offset(&self) -> usize {
        self.offset
    }

    pub(crate) fn point(&self) -> PositionMarker {
        PositionMarker::point(self.offset, self.line_no, self.line_pos)
    }

    /// Returns the marker covering `text` and moves past it.
    pub(crate) fn consume(&mut self, text: &str) -> PositionMarker {
        let start = self.offset;
        let (line_no, line_pos) = (self.line_no, self.line_pos);

        for ch in text.chars() {
            if ch == '\n' {
                self.line_no += 1;
                self.line_pos = 1;
            } else {
                self.line_pos += 1;
            }
        }
        self.offset += text.len();

        PositionMarker::new(start..self.offset, line_no, line_pos)
    }
}

#[cfg(test)]
mod tests {
    use super::{LineTracker, PositionMarker};

    #[test]
    fn test_markers_tracker_counts_lines() {
        let mut tracker = LineTracker::default();

        let first = tracker.consume("SELECT\n  ");
        assert_eq!(first.source_position(), (1, 1));
        assert_eq!(first.source_slice, 0..9);

        let second = tracker.consume("a");
        assert_eq!(second.source_position(), (2, 3));
        assert_eq!(second.source_str("SELECT\n  a"), "a");
    }

    #[test]
    fn test_markers_line_pos_counts_chars() {
        let mut tracker = LineTracker::default();
        tracker.consume("'é'");

        assert_eq!(tracker.point().source_position(), (1, 4));
        assert_eq!(tracker.offset(), 4);
    }

    #[test]
    fn test_markers_display() {
        let marker = PositionMarker::point(3, 2, 7);
        assert!(marker.is_point());
        assert_eq!(marker.to_string(), "line 2, position 7");
    }
}
