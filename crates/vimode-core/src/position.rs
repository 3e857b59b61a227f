//! Positions, ranges, and operator regions.
//!
//! All coordinates are **0-indexed** and columns count chars. Three shapes
//! live here:
//!
//! - [`Position`]: a (line, col) point.
//! - [`Range`]: a half-open `[start, end)` char span, the unit the host
//!   deletes and selects.
//! - [`Region`]: what a motion or selection hands to an operator: two
//!   positions plus a [`RangeKind`] saying how to read them. A region is
//!   resolved against a buffer into the `Range` it actually covers.

use std::fmt;
use std::ops::RangeInclusive;

use crate::host::{self, TextBuffer};

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A position in a text buffer: (line, column), both 0-indexed.
///
/// Ordered by line, then column.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

impl Position {
    /// Line 0, column 0.
    pub const ZERO: Self = Self { line: 0, col: 0 };

    #[inline]
    #[must_use]
    pub const fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }

    /// Same line, different column.
    #[inline]
    #[must_use]
    pub const fn with_col(self, col: usize) -> Self {
        Self {
            line: self.line,
            col,
        }
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pos({}:{})", self.line, self.col)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 1-indexed, like a status line.
        write!(f, "{}:{}", self.line + 1, self.col + 1)
    }
}

// ---------------------------------------------------------------------------
// Range
// ---------------------------------------------------------------------------

/// A half-open range: `[start, end)`, always `start <= end`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    /// Create a range. Debug-asserts `start <= end`.
    #[inline]
    #[must_use]
    pub fn new(start: Position, end: Position) -> Self {
        debug_assert!(start <= end, "Range::new requires start <= end");
        Self { start, end }
    }

    /// Create a range from two positions in either order.
    #[inline]
    #[must_use]
    pub fn ordered(a: Position, b: Position) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// A zero-width range at `pos`.
    #[inline]
    #[must_use]
    pub const fn point(pos: Position) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// True when `pos` falls within `[start, end)`.
    #[inline]
    #[must_use]
    pub fn contains(self, pos: Position) -> bool {
        pos >= self.start && pos < self.end
    }
}

impl fmt::Debug for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Range({}:{} .. {}:{})",
            self.start.line, self.start.col, self.end.line, self.end.col
        )
    }
}

// ---------------------------------------------------------------------------
// Region
// ---------------------------------------------------------------------------

/// How an operator reads the two ends of a [`Region`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeKind {
    /// `[start, end)`: the end char is not included (`w`, `b`, `h`).
    Exclusive,
    /// `[start, end]`: the end char is included (`e`, `$`, `f`, visual).
    Inclusive,
    /// Whole lines from `start.line` to `end.line`, columns ignored.
    Linewise,
}

/// The operand of an operator: two ordered positions and a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub start: Position,
    pub end: Position,
    pub kind: RangeKind,
}

impl Region {
    /// Build a region from two positions in either order.
    #[must_use]
    pub fn new(a: Position, b: Position, kind: RangeKind) -> Self {
        let (start, end) = if a <= b { (a, b) } else { (b, a) };
        Self { start, end, kind }
    }

    /// A one-char region at `pos`.
    #[must_use]
    pub const fn char_at(pos: Position) -> Self {
        Self {
            start: pos,
            end: pos,
            kind: RangeKind::Inclusive,
        }
    }

    /// Whole lines `first..=last`.
    #[must_use]
    pub const fn lines(first: usize, last: usize) -> Self {
        Self {
            start: Position::new(first, 0),
            end: Position::new(last, 0),
            kind: RangeKind::Linewise,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_linewise(self) -> bool {
        matches!(self.kind, RangeKind::Linewise)
    }

    /// The lines this region touches.
    #[must_use]
    pub const fn line_span(self) -> RangeInclusive<usize> {
        self.start.line..=self.end.line
    }

    /// The half-open char range the region covers in `buf`.
    ///
    /// An inclusive end on an end-of-line column takes the newline with it.
    /// A linewise region takes the trailing newline of its last line, or,
    /// when it ends on the buffer's last line, the newline before its first
    /// line, so deleting it leaves no empty line behind.
    #[must_use]
    pub fn resolve<B: TextBuffer + ?Sized>(self, buf: &B) -> Range {
        let last = host::last_line(buf);
        match self.kind {
            RangeKind::Exclusive => Range::new(
                host::clamp(buf, self.start, true),
                host::clamp(buf, self.end, true),
            ),
            RangeKind::Inclusive => {
                let start = host::clamp(buf, self.start, true);
                let end = host::clamp(buf, self.end, true);
                let len = host::line_len(buf, end.line);
                let after = if end.col < len {
                    end.with_col(end.col + 1)
                } else if end.line < last {
                    Position::new(end.line + 1, 0)
                } else {
                    end.with_col(len)
                };
                Range::new(start, after)
            }
            RangeKind::Linewise => {
                let first = self.start.line.min(last);
                let final_line = self.end.line.min(last);
                if final_line < last {
                    Range::new(Position::new(first, 0), Position::new(final_line + 1, 0))
                } else if first > 0 {
                    let prev = first - 1;
                    Range::new(
                        Position::new(prev, host::line_len(buf, prev)),
                        Position::new(final_line, host::line_len(buf, final_line)),
                    )
                } else {
                    Range::new(
                        Position::ZERO,
                        Position::new(final_line, host::line_len(buf, final_line)),
                    )
                }
            }
        }
    }

    /// The text an operator stores in a register for this region. Linewise
    /// text always ends with `\n`.
    #[must_use]
    pub fn text<B: TextBuffer + ?Sized>(self, buf: &B) -> String {
        if self.is_linewise() {
            host::lines_text(buf, self.start.line, self.end.line)
        } else {
            host::text_in(buf, self.resolve(buf))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::Workspace;

    fn p(line: usize, col: usize) -> Position {
        Position::new(line, col)
    }

    fn r(sl: usize, sc: usize, el: usize, ec: usize) -> Range {
        Range::new(p(sl, sc), p(el, ec))
    }

    // -- Position -----------------------------------------------------------

    #[test]
    fn position_ordering() {
        assert!(p(0, 9) < p(1, 0));
        assert!(p(2, 1) < p(2, 3));
        assert_eq!(p(1, 1).cmp(&p(1, 1)), std::cmp::Ordering::Equal);
    }

    #[test]
    fn position_formats() {
        assert_eq!(format!("{:?}", p(3, 7)), "Pos(3:7)");
        assert_eq!(p(0, 0).to_string(), "1:1");
    }

    // -- Range --------------------------------------------------------------

    #[test]
    fn range_ordered_swaps() {
        assert_eq!(Range::ordered(p(2, 0), p(1, 5)), r(1, 5, 2, 0));
    }

    #[test]
    fn range_contains_is_half_open() {
        let range = r(0, 2, 1, 1);
        assert!(range.contains(p(0, 2)));
        assert!(range.contains(p(0, 50)));
        assert!(!range.contains(p(1, 1)));
        assert!(Range::point(p(0, 0)).is_empty());
    }

    // -- Region::resolve ----------------------------------------------------

    #[test]
    fn exclusive_region_is_unchanged() {
        let ws = Workspace::from_text("hello world");
        let region = Region::new(p(0, 6), p(0, 0), RangeKind::Exclusive);
        assert_eq!(region.resolve(&ws), r(0, 0, 0, 6));
    }

    #[test]
    fn inclusive_region_takes_end_char() {
        let ws = Workspace::from_text("hello world");
        let region = Region::new(p(0, 0), p(0, 4), RangeKind::Inclusive);
        assert_eq!(region.resolve(&ws), r(0, 0, 0, 5));
        assert_eq!(region.text(&ws), "hello");
    }

    #[test]
    fn inclusive_region_at_eol_takes_newline() {
        let ws = Workspace::from_text("ab\ncd");
        let region = Region::new(p(0, 1), p(0, 2), RangeKind::Inclusive);
        assert_eq!(region.resolve(&ws), r(0, 1, 1, 0));
        assert_eq!(region.text(&ws), "b\n");
    }

    #[test]
    fn inclusive_region_at_buffer_end_stops() {
        let ws = Workspace::from_text("ab");
        let region = Region::new(p(0, 0), p(0, 2), RangeKind::Inclusive);
        assert_eq!(region.resolve(&ws), r(0, 0, 0, 2));
    }

    #[test]
    fn linewise_region_in_middle() {
        let ws = Workspace::from_text("a\nb\nc\nd");
        let region = Region::lines(1, 2);
        assert_eq!(region.resolve(&ws), r(1, 0, 3, 0));
        assert_eq!(region.text(&ws), "b\nc\n");
    }

    #[test]
    fn linewise_region_at_end_takes_previous_newline() {
        let ws = Workspace::from_text("a\nb\nc");
        let region = Region::lines(1, 2);
        assert_eq!(region.resolve(&ws), r(0, 1, 2, 1));
        assert_eq!(region.text(&ws), "b\nc\n");
    }

    #[test]
    fn linewise_region_whole_buffer() {
        let ws = Workspace::from_text("a\nb");
        assert_eq!(Region::lines(0, 1).resolve(&ws), r(0, 0, 1, 1));
    }

    #[test]
    fn line_span_covers_both_ends() {
        let region = Region::new(p(4, 2), p(1, 0), RangeKind::Linewise);
        assert_eq!(region.line_span(), 1..=4);
    }
}
