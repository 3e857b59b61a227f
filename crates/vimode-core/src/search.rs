//! Search: `/` and `?` patterns, `n` and `N` repeats.
//!
//! A pattern is tried as a regular expression first and falls back to a
//! literal substring when it does not compile (`foo(` searches for the text
//! `foo(`). Matches never span lines.
//!
//! # Search flow
//!
//! 1. `/` or `?` opens the command line; each keystroke previews the next
//!    match as the host selection.
//! 2. Enter stores pattern and direction in [`SearchState`]; the cursor
//!    stays where it was.
//! 3. `n` repeats in the stored direction, `N` in the opposite one. Both
//!    look strictly after (before) the cursor and wrap around the buffer
//!    when `wrapscan` is on.
//! 4. Escape cancels and restores the cursor.

use regex::{Regex, RegexBuilder};
use tracing::trace;

use crate::host::TextBuffer;
use crate::position::Position;

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// Search direction.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SearchDirection {
    Forward,
    Backward,
}

impl SearchDirection {
    /// The opposite direction.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }

    /// The command-line prefix (`/` or `?`).
    #[must_use]
    pub const fn prefix(self) -> char {
        match self {
            Self::Forward => '/',
            Self::Backward => '?',
        }
    }
}

// ---------------------------------------------------------------------------
// Pattern
// ---------------------------------------------------------------------------

/// A compiled search pattern.
#[derive(Clone, Debug)]
pub enum Pattern {
    Regex(Regex),
    /// Literal text, stored lowercased when matching ignores case.
    Literal { text: String, ignore_case: bool },
}

impl Pattern {
    /// Compile `source`. With `ignorecase` the match ignores case, unless
    /// `smartcase` is also set and `source` holds an uppercase letter.
    #[must_use]
    pub fn new(source: &str, ignorecase: bool, smartcase: bool) -> Self {
        let ignore_case = ignorecase && !(smartcase && source.chars().any(char::is_uppercase));
        match RegexBuilder::new(source).case_insensitive(ignore_case).build() {
            Ok(re) => Self::Regex(re),
            Err(e) => {
                trace!(pattern = source, error = %e, "not a regex, matching literally");
                Self::Literal {
                    text: if ignore_case { source.to_lowercase() } else { source.to_string() },
                    ignore_case,
                }
            }
        }
    }

    /// Start columns (in chars) of every non-empty match in `line`.
    fn match_cols(&self, line: &str) -> Vec<usize> {
        let bytes: Vec<usize> = match self {
            Self::Regex(re) => re
                .find_iter(line)
                .filter(|m| !m.is_empty())
                .map(|m| m.start())
                .collect(),
            Self::Literal { text, ignore_case } => {
                if text.is_empty() {
                    return Vec::new();
                }
                if *ignore_case {
                    // Compare char by char so byte offsets stay those of `line`.
                    return literal_cols_ignore_case(line, text);
                }
                line.match_indices(text.as_str()).map(|(idx, _)| idx).collect()
            }
        };
        bytes.into_iter().map(|b| line[..b].chars().count()).collect()
    }

    /// Length in chars of the match starting at char `col` of `line`.
    fn match_len_at(&self, line: &str, col: usize) -> usize {
        match self {
            Self::Regex(re) => {
                let byte = line.char_indices().nth(col).map_or(line.len(), |(b, _)| b);
                re.find_at(line, byte)
                    .filter(|m| m.start() == byte)
                    .map_or(0, |m| line[m.range()].chars().count())
            }
            Self::Literal { text, .. } => text.chars().count(),
        }
    }
}

fn literal_cols_ignore_case(line: &str, needle: &str) -> Vec<usize> {
    let hay: Vec<char> = line.chars().flat_map(char::to_lowercase).collect();
    let pat: Vec<char> = needle.chars().collect();
    if hay.len() != line.chars().count() {
        // Lowercasing changed the length, so columns no longer line up.
        return RegexBuilder::new(&regex::escape(needle))
            .case_insensitive(true)
            .build()
            .map(|re| {
                re.find_iter(line)
                    .map(|m| line[..m.start()].chars().count())
                    .collect()
            })
            .unwrap_or_default();
    }
    let mut cols = Vec::new();
    let mut col = 0;
    while col + pat.len() <= hay.len() {
        if hay[col..col + pat.len()] == pat[..] {
            cols.push(col);
            col += pat.len();
        } else {
            col += 1;
        }
    }
    cols
}

// ---------------------------------------------------------------------------
// Search functions
// ---------------------------------------------------------------------------

/// The first match strictly after `from`, wrapping past the end of the
/// buffer when `wrap` is set.
#[must_use]
pub fn find_forward<B: TextBuffer + ?Sized>(
    buf: &B,
    pattern: &Pattern,
    from: Position,
    wrap: bool,
) -> Option<Position> {
    let count = buf.line_count();
    for offset in 0..=count {
        let line = from.line + offset;
        if line >= count && !wrap {
            return None;
        }
        let line = line % count;
        let cols = pattern.match_cols(&buf.line_text(line));
        let hit = match offset {
            0 => cols.into_iter().find(|&c| c > from.col),
            o if o == count => cols.into_iter().find(|&c| c <= from.col),
            _ => cols.into_iter().next(),
        };
        if let Some(col) = hit {
            return Some(Position::new(line, col));
        }
    }
    None
}

/// The last match strictly before `from`, wrapping past the start of the
/// buffer when `wrap` is set.
#[must_use]
pub fn find_backward<B: TextBuffer + ?Sized>(
    buf: &B,
    pattern: &Pattern,
    from: Position,
    wrap: bool,
) -> Option<Position> {
    let count = buf.line_count();
    for offset in 0..=count {
        if offset > from.line && !wrap {
            return None;
        }
        let line = (from.line + count - offset % count) % count;
        let cols = pattern.match_cols(&buf.line_text(line));
        let hit = match offset {
            0 => cols.into_iter().rev().find(|&c| c < from.col),
            o if o == count => cols.into_iter().rev().find(|&c| c >= from.col),
            _ => cols.into_iter().next_back(),
        };
        if let Some(col) = hit {
            return Some(Position::new(line, col));
        }
    }
    None
}

/// End (exclusive) of the match found at `start`, at least one char past
/// it.
#[must_use]
pub fn match_end<B: TextBuffer + ?Sized>(buf: &B, pattern: &Pattern, start: Position) -> Position {
    let len = pattern.match_len_at(&buf.line_text(start.line), start.col);
    start.with_col(start.col + len.max(1))
}

/// Dispatch on direction.
#[must_use]
pub fn find<B: TextBuffer + ?Sized>(
    buf: &B,
    pattern: &Pattern,
    from: Position,
    direction: SearchDirection,
    wrap: bool,
) -> Option<Position> {
    match direction {
        SearchDirection::Forward => find_forward(buf, pattern, from, wrap),
        SearchDirection::Backward => find_backward(buf, pattern, from, wrap),
    }
}

// ---------------------------------------------------------------------------
// SearchState
// ---------------------------------------------------------------------------

/// The last submitted search, kept for `n` and `N`.
#[derive(Debug, Default)]
pub struct SearchState {
    last: Option<(String, SearchDirection)>,
}

impl SearchState {
    #[must_use]
    pub const fn new() -> Self {
        Self { last: None }
    }

    /// Store a submitted search. An empty pattern keeps the previous one
    /// and only changes direction. Returns `false` if there is nothing to
    /// search for.
    pub fn submit(&mut self, source: &str, direction: SearchDirection) -> bool {
        if source.is_empty() {
            return match &mut self.last {
                Some((_, dir)) => {
                    *dir = direction;
                    true
                }
                None => false,
            };
        }
        self.last = Some((source.to_string(), direction));
        true
    }

    /// The last pattern text and direction.
    #[must_use]
    pub fn last(&self) -> Option<(&str, SearchDirection)> {
        self.last.as_ref().map(|(s, d)| (s.as_str(), *d))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::Workspace;

    const TEXT: &str = "   123\nline 1\nline 2\nline 3\nline 4";

    fn p(line: usize, col: usize) -> Position {
        Position::new(line, col)
    }

    fn pat(source: &str) -> Pattern {
        Pattern::new(source, false, false)
    }

    // -- Pattern ------------------------------------------------------------

    #[test]
    fn invalid_regex_is_literal() {
        let ws = Workspace::from_text("call foo( here");
        let found = find_forward(&ws, &pat("foo("), p(0, 0), true);
        assert_eq!(found, Some(p(0, 5)));
        assert!(matches!(pat("foo("), Pattern::Literal { .. }));
    }

    #[test]
    fn regex_match_cols_are_chars() {
        let ws = Workspace::from_text("日本 line 9");
        assert_eq!(find_forward(&ws, &pat(r"ne \d"), p(0, 0), true), Some(p(0, 5)));
    }

    #[test]
    fn smartcase_respects_uppercase() {
        let ws = Workspace::from_text("Line line");
        let insensitive = Pattern::new("line", true, true);
        assert_eq!(find_forward(&ws, &insensitive, p(0, 5), true), Some(p(0, 0)));
        let sensitive = Pattern::new("Line", true, true);
        assert_eq!(find_forward(&ws, &sensitive, p(0, 0), true), Some(p(0, 0)));
        assert_eq!(find_forward(&ws, &sensitive, p(0, 0), false), None);
    }

    #[test]
    fn literal_ignore_case() {
        let ws = Workspace::from_text("a( A(");
        let p1 = Pattern::new("a(", true, false);
        assert_eq!(find_forward(&ws, &p1, p(0, 0), true), Some(p(0, 3)));
    }

    #[test]
    fn literal_ignore_case_when_lowercase_grows() {
        // 'İ' lowercases to two chars.
        assert_eq!(literal_cols_ignore_case("İ A( a(", "a("), vec![2, 5]);
        let ws = Workspace::from_text("x\nİ A(");
        let p1 = Pattern::new("a(", true, false);
        assert_eq!(find_forward(&ws, &p1, p(0, 0), true), Some(p(1, 2)));
    }

    // -- find_forward / find_backward ---------------------------------------

    #[test]
    fn forward_is_strictly_after() {
        let ws = Workspace::from_text("aa aa");
        assert_eq!(find_forward(&ws, &pat("aa"), p(0, 0), true), Some(p(0, 3)));
    }

    #[test]
    fn backward_is_strictly_before() {
        let ws = Workspace::from_text("aa aa");
        assert_eq!(find_backward(&ws, &pat("aa"), p(0, 3), true), Some(p(0, 0)));
    }

    #[test]
    fn forward_wraps_to_same_line() {
        let ws = Workspace::from_text("x target\nnothing");
        assert_eq!(find_forward(&ws, &pat("target"), p(0, 2), true), Some(p(0, 2)));
        assert_eq!(find_forward(&ws, &pat("target"), p(0, 2), false), None);
    }

    #[test]
    fn backward_wraps_to_bottom() {
        let ws = Workspace::from_text(TEXT);
        assert_eq!(find_backward(&ws, &pat("line"), p(0, 0), true), Some(p(4, 0)));
        assert_eq!(find_backward(&ws, &pat("line"), p(0, 0), false), None);
    }

    #[test]
    fn no_match_anywhere() {
        let ws = Workspace::from_text(TEXT);
        assert_eq!(find_forward(&ws, &pat("zzz"), p(2, 0), true), None);
        assert_eq!(find_backward(&ws, &pat("zzz"), p(2, 0), true), None);
    }

    /// `n` five times, then `N` five times, recording the line after each.
    fn repeat_sequence(source: &str, direction: SearchDirection) -> Vec<usize> {
        let ws = Workspace::from_text(TEXT);
        let pattern = pat(source);
        let mut pos = p(0, 0);
        let mut lines = Vec::new();
        for dir in [direction; 5].into_iter().chain([direction.opposite(); 5]) {
            pos = find(&ws, &pattern, pos, dir, true).unwrap_or(pos);
            lines.push(pos.line);
        }
        lines
    }

    #[test]
    fn forward_repeat_sequence() {
        let want = vec![1, 2, 3, 4, 1, 4, 3, 2, 1, 4];
        assert_eq!(repeat_sequence("line", SearchDirection::Forward), want);
        assert_eq!(repeat_sequence(r"ne \d", SearchDirection::Forward), want);
    }

    #[test]
    fn backward_repeat_sequence() {
        let want = vec![4, 3, 2, 1, 4, 1, 2, 3, 4, 1];
        assert_eq!(repeat_sequence("line", SearchDirection::Backward), want);
        assert_eq!(repeat_sequence("l.*e", SearchDirection::Backward), want);
    }

    #[test]
    fn match_end_covers_the_match() {
        let ws = Workspace::from_text(TEXT);
        assert_eq!(match_end(&ws, &pat(r"ne \d"), p(2, 2)), p(2, 6));
        assert_eq!(match_end(&ws, &pat("foo("), p(1, 0)), p(1, 4));
    }

    // -- SearchState --------------------------------------------------------

    #[test]
    fn empty_submit_reuses_pattern() {
        let mut state = SearchState::new();
        assert!(!state.submit("", SearchDirection::Forward));
        assert!(state.submit("abc", SearchDirection::Forward));
        assert!(state.submit("", SearchDirection::Backward));
        assert_eq!(state.last(), Some(("abc", SearchDirection::Backward)));
    }
}
