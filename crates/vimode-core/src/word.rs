//! Word motions.
//!
//! | Function            | Key | Lands on                              |
//! |---------------------|-----|---------------------------------------|
//! | [`word_forward`]    | `w` | start of the next word                |
//! | [`word_backward`]   | `b` | start of the previous word            |
//! | [`word_end_forward`]| `e` | end of the current or next word       |
//!
//! A **word** is a run of word characters (letters, digits, underscore) or a
//! run of other non-blank characters (punctuation). `hello.world` holds three
//! words. An empty line also counts as a word, so `w` and `b` stop on it.
//!
//! All three walk the buffer through the [`TextBuffer`] char vocabulary in
//! [`host`](crate::host), newlines included.

use crate::host::{self, TextBuffer};
use crate::position::Position;

// ---------------------------------------------------------------------------
// Character classification
// ---------------------------------------------------------------------------

/// Character class for word boundary detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CharClass {
    /// Letters, digits, underscore.
    Word,
    /// Non-blank, non-word characters.
    Punctuation,
    /// Space and tab.
    Blank,
    /// End of a line.
    Newline,
}

impl CharClass {
    const fn is_word_like(self) -> bool {
        matches!(self, Self::Word | Self::Punctuation)
    }
}

pub(crate) fn classify(ch: char) -> CharClass {
    if ch == '\n' {
        CharClass::Newline
    } else if ch.is_whitespace() {
        CharClass::Blank
    } else if ch.is_alphanumeric() || ch == '_' {
        CharClass::Word
    } else {
        CharClass::Punctuation
    }
}

fn class_at<B: TextBuffer + ?Sized>(buf: &B, pos: Position) -> Option<CharClass> {
    host::char_at(buf, pos).map(classify)
}

/// The position just past the last char of the buffer.
fn buffer_end<B: TextBuffer + ?Sized>(buf: &B) -> Position {
    let last = host::last_line(buf);
    Position::new(last, host::line_len(buf, last))
}

// ---------------------------------------------------------------------------
// Motions
// ---------------------------------------------------------------------------

/// `w`: forward to the start of the next word.
///
/// 1. Skip the rest of the current word.
/// 2. Skip blanks and newlines, stopping on an empty line.
///
/// With no next word the result is the end of the buffer, which an
/// operator uses as its exclusive end and a cursor clamps onto the last
/// char.
#[must_use]
pub fn word_forward<B: TextBuffer + ?Sized>(buf: &B, pos: Position) -> Position {
    let end = buffer_end(buf);
    let Some(start_class) = class_at(buf, pos) else {
        return end;
    };
    let mut cur = pos;

    // Phase 1: skip the current word.
    if start_class.is_word_like() {
        loop {
            let Some(next) = host::next_pos(buf, cur) else {
                return end;
            };
            cur = next;
            if class_at(buf, cur) != Some(start_class) {
                break;
            }
        }
    }

    // Phase 2: skip blanks and newlines.
    loop {
        match class_at(buf, cur) {
            Some(CharClass::Word | CharClass::Punctuation) => return cur,
            Some(CharClass::Newline) => {
                let below = cur.line + 1;
                if below < buf.line_count() && host::line_len(buf, below) == 0 {
                    return Position::new(below, 0);
                }
            }
            Some(CharClass::Blank) => {}
            None => return end,
        }
        match host::next_pos(buf, cur) {
            Some(next) => cur = next,
            None => return end,
        }
    }
}

/// `b`: backward to the start of the previous word.
///
/// 1. Step back over blanks and newlines, stopping on an empty line.
/// 2. Step back to the first char of the word found.
#[must_use]
pub fn word_backward<B: TextBuffer + ?Sized>(buf: &B, pos: Position) -> Position {
    let Some(mut cur) = host::prev_pos(buf, pos) else {
        return pos;
    };

    // Phase 1: skip blanks and newlines.
    let class = loop {
        match class_at(buf, cur) {
            Some(class) if class.is_word_like() => break class,
            Some(CharClass::Newline) if host::line_len(buf, cur.line) == 0 => {
                return Position::new(cur.line, 0);
            }
            _ => {}
        }
        match host::prev_pos(buf, cur) {
            Some(prev) => cur = prev,
            None => return Position::ZERO,
        }
    };

    // Phase 2: walk to the start of the word.
    while let Some(prev) = host::prev_pos(buf, cur) {
        if class_at(buf, prev) != Some(class) {
            break;
        }
        cur = prev;
    }
    cur
}

/// `e`: forward to the end of the current or next word. Empty lines are
/// not stops. With no further word the position is unchanged.
#[must_use]
pub fn word_end_forward<B: TextBuffer + ?Sized>(buf: &B, pos: Position) -> Position {
    let Some(mut cur) = host::next_pos(buf, pos) else {
        return pos;
    };

    // Phase 1: skip blanks and newlines.
    let class = loop {
        match class_at(buf, cur) {
            Some(class) if class.is_word_like() => break class,
            _ => {}
        }
        match host::next_pos(buf, cur) {
            Some(next) => cur = next,
            None => return pos,
        }
    };

    // Phase 2: walk to the last char of the word.
    while let Some(next) = host::next_pos(buf, cur) {
        if class_at(buf, next) != Some(class) {
            break;
        }
        cur = next;
    }
    cur
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::Workspace;

    fn p(line: usize, col: usize) -> Position {
        Position::new(line, col)
    }

    // -- Classification -----------------------------------------------------

    #[test]
    fn classify_chars() {
        assert_eq!(classify('a'), CharClass::Word);
        assert_eq!(classify('_'), CharClass::Word);
        assert_eq!(classify('9'), CharClass::Word);
        assert_eq!(classify('é'), CharClass::Word);
        assert_eq!(classify('.'), CharClass::Punctuation);
        assert_eq!(classify('('), CharClass::Punctuation);
        assert_eq!(classify('\t'), CharClass::Blank);
        assert_eq!(classify('\n'), CharClass::Newline);
    }

    // -- word_forward (w) ---------------------------------------------------

    #[test]
    fn w_simple_and_punctuation() {
        let ws = Workspace::from_text("hello.world  x");
        assert_eq!(word_forward(&ws, p(0, 0)), p(0, 5));
        assert_eq!(word_forward(&ws, p(0, 5)), p(0, 6));
        assert_eq!(word_forward(&ws, p(0, 7)), p(0, 13));
    }

    #[test]
    fn w_across_lines() {
        let ws = Workspace::from_text("line 1\nline 2");
        assert_eq!(word_forward(&ws, p(0, 0)), p(0, 5));
        assert_eq!(word_forward(&ws, p(0, 5)), p(1, 0));
    }

    #[test]
    fn w_stops_on_empty_line() {
        let ws = Workspace::from_text("hello\n\n\nworld");
        assert_eq!(word_forward(&ws, p(0, 0)), p(1, 0));
        assert_eq!(word_forward(&ws, p(1, 0)), p(2, 0));
        assert_eq!(word_forward(&ws, p(2, 0)), p(3, 0));
    }

    #[test]
    fn w_skips_whitespace_only_line() {
        let ws = Workspace::from_text("hello\n   \nworld");
        assert_eq!(word_forward(&ws, p(0, 0)), p(2, 0));
    }

    #[test]
    fn w_past_last_word_is_buffer_end() {
        let ws = Workspace::from_text("hello world");
        assert_eq!(word_forward(&ws, p(0, 6)), p(0, 11));
        let ws = Workspace::from_text("");
        assert_eq!(word_forward(&ws, p(0, 0)), p(0, 0));
    }

    // -- word_backward (b) --------------------------------------------------

    #[test]
    fn b_simple_and_punctuation() {
        let ws = Workspace::from_text("x=y  hello");
        assert_eq!(word_backward(&ws, p(0, 7)), p(0, 5));
        assert_eq!(word_backward(&ws, p(0, 5)), p(0, 2));
        assert_eq!(word_backward(&ws, p(0, 2)), p(0, 1));
    }

    #[test]
    fn b_across_lines() {
        let ws = Workspace::from_text("line 1\nline 2");
        assert_eq!(word_backward(&ws, p(1, 0)), p(0, 5));
        assert_eq!(word_backward(&ws, p(0, 5)), p(0, 0));
        assert_eq!(word_backward(&ws, p(0, 0)), p(0, 0));
    }

    #[test]
    fn b_stops_on_empty_line() {
        let ws = Workspace::from_text("hello\n\nworld");
        assert_eq!(word_backward(&ws, p(2, 0)), p(1, 0));
        assert_eq!(word_backward(&ws, p(1, 0)), p(0, 0));
    }

    #[test]
    fn b_leading_blanks_reach_start() {
        let ws = Workspace::from_text("   x");
        assert_eq!(word_backward(&ws, p(0, 3)), p(0, 0));
    }

    // -- word_end_forward (e) -----------------------------------------------

    #[test]
    fn e_to_end_of_word() {
        let ws = Workspace::from_text("hello world");
        assert_eq!(word_end_forward(&ws, p(0, 0)), p(0, 4));
        assert_eq!(word_end_forward(&ws, p(0, 4)), p(0, 10));
        assert_eq!(word_end_forward(&ws, p(0, 10)), p(0, 10));
    }

    #[test]
    fn e_skips_lines() {
        let ws = Workspace::from_text("line 2\n\nline 3");
        assert_eq!(word_end_forward(&ws, p(0, 3)), p(0, 5));
        assert_eq!(word_end_forward(&ws, p(0, 5)), p(2, 3));
    }

    #[test]
    fn w_then_b_round_trip() {
        let ws = Workspace::from_text("abc1 abc2  abc3");
        let there = word_forward(&ws, p(0, 0));
        assert_eq!(there, p(0, 5));
        assert_eq!(word_backward(&ws, there), p(0, 0));
    }
}
