//! Direct edits: `~`, `r`, `J`, `p` and `P`.
//!
//! These commands change text without going through an operator. Each
//! takes the host buffer plus whatever it needs and returns the cursor to
//! land on; the session owns undo grouping and mode changes.

use std::iter;

use tracing::debug;

use crate::host::{self, TextBuffer};
use crate::operator::sync_clipboard;
use crate::position::{Position, Range, Region};
use crate::register::{Register, RegisterFile, RegisterKind};

// ---------------------------------------------------------------------------
// ~ and r
// ---------------------------------------------------------------------------

fn toggle(ch: char) -> char {
    if ch.is_uppercase() {
        ch.to_lowercase().next().unwrap_or(ch)
    } else if ch.is_lowercase() {
        ch.to_uppercase().next().unwrap_or(ch)
    } else {
        ch
    }
}

/// Swap `range` for `text` if they differ.
fn rewrite<B: TextBuffer + ?Sized>(buf: &mut B, range: Range, text: &str) {
    let old = host::text_in(buf, range);
    if old != text {
        buf.delete_range(range);
        buf.insert_text(range.start, text);
    }
}

/// `~`: toggle the case of `count` chars from `pos`, stopping at the end of
/// the line. Returns the new cursor.
pub fn toggle_case<B: TextBuffer + ?Sized>(buf: &mut B, pos: Position, count: usize) -> Position {
    let len = host::line_len(buf, pos.line);
    if pos.col >= len {
        return pos;
    }
    let end = pos.col.saturating_add(count.max(1)).min(len);
    let range = Range::new(pos, pos.with_col(end));
    let toggled: String = host::text_in(buf, range).chars().map(toggle).collect();
    rewrite(buf, range, &toggled);
    pos.with_col(end.min(len - 1))
}

/// Visual `~`: toggle every char the region covers.
pub fn toggle_case_region<B: TextBuffer + ?Sized>(buf: &mut B, region: Region) -> Position {
    let range = region.resolve(buf);
    let toggled: String = host::text_in(buf, range).chars().map(toggle).collect();
    rewrite(buf, range, &toggled);
    region_start(region)
}

/// `r`: replace `count` chars from `pos` with `ch`. Returns `None`, leaving
/// the text alone, when fewer than `count` chars remain on the line.
pub fn replace_chars<B: TextBuffer + ?Sized>(
    buf: &mut B,
    pos: Position,
    ch: char,
    count: usize,
) -> Option<Position> {
    let count = count.max(1);
    let len = host::line_len(buf, pos.line);
    if pos.col.saturating_add(count) > len {
        return None;
    }
    let range = Range::new(pos, pos.with_col(pos.col + count));
    let text: String = iter::repeat_n(ch, count).collect();
    rewrite(buf, range, &text);
    Some(pos.with_col(pos.col + count - 1))
}

/// Visual `r`: replace every char of the region except line breaks.
pub fn replace_region<B: TextBuffer + ?Sized>(buf: &mut B, region: Region, ch: char) -> Position {
    let range = region.resolve(buf);
    let text: String = host::text_in(buf, range)
        .chars()
        .map(|c| if c == '\n' { c } else { ch })
        .collect();
    rewrite(buf, range, &text);
    region_start(region)
}

const fn region_start(region: Region) -> Position {
    if region.is_linewise() {
        Position::new(region.start.line, 0)
    } else {
        region.start
    }
}

// ---------------------------------------------------------------------------
// J
// ---------------------------------------------------------------------------

/// `J`: join lines `first..=last` into `first`.
///
/// Leading blanks of each joined line are dropped and one space separates
/// the pieces, unless the line so far is empty or ends in a blank, or the
/// joined line is blank. Returns `None` when there is no line to join.
/// Otherwise the cursor sits on the last space inserted, or on the final
/// join point when none was.
pub fn join_lines<B: TextBuffer + ?Sized>(buf: &mut B, first: usize, last: usize) -> Option<Position> {
    let last = last.min(host::last_line(buf));
    if first >= last {
        return None;
    }

    let mut space_at = None;
    let mut join_at = 0;
    for _ in first..last {
        let text = buf.line_text(first);
        let len = text.chars().count();
        let ends_blank = text.ends_with([' ', '\t']);
        let lead = host::leading_blanks(buf, first + 1);
        let next_blank = lead == host::line_len(buf, first + 1);

        buf.delete_range(Range::new(
            Position::new(first, len),
            Position::new(first + 1, lead),
        ));
        if len > 0 && !ends_blank && !next_blank {
            buf.insert_text(Position::new(first, len), " ");
            space_at = Some(len);
        }
        join_at = len;
    }
    debug!(first, last, "joined lines");
    Some(Position::new(first, space_at.unwrap_or(join_at)))
}

// ---------------------------------------------------------------------------
// p / P
// ---------------------------------------------------------------------------

/// Which side of the cursor a paste goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// `p`
    After,
    /// `P`
    Before,
}

/// Read a register for pasting.
///
/// The unnamed register follows the host clipboard: when the clipboard was
/// changed from outside, its text replaces the unnamed register first, and
/// counts as line-wise if it ends with a newline.
pub fn fetch_register<B: TextBuffer + ?Sized>(
    buf: &B,
    registers: &mut RegisterFile,
    name: Option<char>,
) -> Register {
    if !name.is_some_and(RegisterFile::is_valid_name) {
        let clip = buf.clipboard();
        if clip != registers.get(None).content() {
            let kind = if clip.ends_with('\n') {
                RegisterKind::Line
            } else {
                RegisterKind::Char
            };
            debug!(len = clip.len(), ?kind, "clipboard changed outside");
            registers.set_unnamed(&clip, kind);
        }
    }
    registers.get(name).clone()
}

/// Where the cursor lands after inserting char-wise `text` at `at`: on the
/// last char for a single line, at the start otherwise.
fn after_char_paste(at: Position, text: &str) -> Position {
    if text.contains('\n') {
        at
    } else {
        at.with_col(at.col + text.chars().count().saturating_sub(1))
    }
}

fn first_non_blank_of<B: TextBuffer + ?Sized>(buf: &B, line: usize) -> Position {
    Position::new(line, host::first_non_blank(buf, line))
}

/// `p` / `P`: paste `reg` `count` times next to `pos`.
///
/// Char-wise text goes after (or at) the cursor column. Line-wise text goes
/// on new lines below (or above) the cursor line, and the cursor moves to
/// the first of them.
pub fn paste<B: TextBuffer + ?Sized>(
    buf: &mut B,
    reg: &Register,
    pos: Position,
    side: Side,
    count: usize,
) -> Position {
    if reg.is_empty() {
        return pos;
    }
    let text = reg.content().repeat(count.max(1));

    match (reg.kind(), side) {
        (RegisterKind::Char, side) => {
            let len = host::line_len(buf, pos.line);
            let at = if side == Side::After && len > 0 {
                pos.with_col((pos.col + 1).min(len))
            } else {
                pos.with_col(pos.col.min(len))
            };
            buf.insert_text(at, &text);
            after_char_paste(at, &text)
        }
        (RegisterKind::Line, Side::After) if pos.line < host::last_line(buf) => {
            buf.insert_text(Position::new(pos.line + 1, 0), &text);
            first_non_blank_of(buf, pos.line + 1)
        }
        (RegisterKind::Line, Side::After) => {
            let len = host::line_len(buf, pos.line);
            let body = text.strip_suffix('\n').unwrap_or(&text);
            buf.insert_text(Position::new(pos.line, len), &format!("\n{body}"));
            first_non_blank_of(buf, pos.line + 1)
        }
        (RegisterKind::Line, Side::Before) => {
            buf.insert_text(Position::new(pos.line, 0), &text);
            first_non_blank_of(buf, pos.line)
        }
    }
}

/// Visual `p` / `P`: replace the selection with `reg`.
///
/// The replaced text is stored as a delete into the unnamed register, so
/// the caller must fetch `reg` before calling. A char-wise register over a
/// line-wise selection becomes the content of those lines. A line-wise
/// register over a char-wise selection splits the line around the pasted
/// lines.
pub fn paste_over<B: TextBuffer + ?Sized>(
    buf: &mut B,
    registers: &mut RegisterFile,
    reg: &Register,
    region: Region,
    count: usize,
) -> Position {
    let text = reg.content().repeat(count.max(1));
    let replaced = region.text(buf);
    let replaced_kind = if region.is_linewise() {
        RegisterKind::Line
    } else {
        RegisterKind::Char
    };

    let cursor = if region.is_linewise() {
        let first = region.start.line;
        let last = region.end.line.min(host::last_line(buf));
        let body = match reg.kind() {
            RegisterKind::Line => text.strip_suffix('\n').unwrap_or(&text),
            RegisterKind::Char => &text,
        };
        buf.delete_range(Range::new(
            Position::new(first, 0),
            Position::new(last, host::line_len(buf, last)),
        ));
        buf.insert_text(Position::new(first, 0), body);
        match reg.kind() {
            RegisterKind::Line => first_non_blank_of(buf, first),
            RegisterKind::Char => after_char_paste(Position::new(first, 0), body),
        }
    } else {
        let range = region.resolve(buf);
        buf.delete_range(range);
        match reg.kind() {
            RegisterKind::Char => {
                buf.insert_text(range.start, &text);
                after_char_paste(range.start, &text)
            }
            RegisterKind::Line => {
                buf.insert_text(range.start, &format!("\n{text}"));
                first_non_blank_of(buf, range.start.line + 1)
            }
        }
    };

    registers.delete(None, &replaced, replaced_kind);
    sync_clipboard(buf, registers);
    cursor
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::position::RangeKind;
    use crate::workspace::Workspace;

    const TEXT: &str = "   123\nline 1\nline 2\nline 3\nline 4";

    fn p(line: usize, col: usize) -> Position {
        Position::new(line, col)
    }

    // -- ~ ------------------------------------------------------------------

    #[test]
    fn toggle_case_counts() {
        for (count, text, col) in [(1, "Abcde", 1), (2, "ABcde", 2), (20, "ABCDE", 4)] {
            let mut ws = Workspace::from_text("abcde");
            let cursor = toggle_case(&mut ws, p(0, 0), count);
            assert_eq!(ws.contents(), text);
            assert_eq!(cursor, p(0, col));
        }
    }

    #[test]
    fn toggle_case_on_empty_line_is_noop() {
        let mut ws = Workspace::from_text("\nabc");
        assert_eq!(toggle_case(&mut ws, p(0, 0), 3), p(0, 0));
        assert_eq!(ws.contents(), "\nabc");
    }

    #[test]
    fn toggle_region_across_lines() {
        let mut ws = Workspace::from_text("a b\n22\nc \nde\n");
        let cursor = toggle_case_region(&mut ws, Region::lines(1, 3));
        assert_eq!(ws.contents(), "a b\n22\nC \nDE\n");
        assert_eq!(cursor, p(1, 0));
    }

    // -- r ------------------------------------------------------------------

    #[test]
    fn replace_lands_on_last_char() {
        let mut ws = Workspace::from_text("abcd");
        assert_eq!(replace_chars(&mut ws, p(0, 0), '1', 1), Some(p(0, 0)));
        assert_eq!(replace_chars(&mut ws, p(0, 0), '1', 2), Some(p(0, 1)));
        assert_eq!(ws.contents(), "11cd");
    }

    #[test]
    fn replace_needs_enough_chars() {
        let mut ws = Workspace::from_text("abcd");
        assert_eq!(replace_chars(&mut ws, p(0, 1), '1', 5), None);
        assert_eq!(ws.contents(), "abcd");
    }

    #[test]
    fn replace_region_keeps_newlines() {
        let mut ws = Workspace::from_text("abc\ndef\ng\n");
        let region = Region::new(p(0, 0), p(1, 1), RangeKind::Inclusive);
        assert_eq!(replace_region(&mut ws, region, '1'), p(0, 0));
        assert_eq!(ws.contents(), "111\n11f\ng\n");
    }

    // -- J ------------------------------------------------------------------

    #[test]
    fn join_two_lines() {
        let mut ws = Workspace::from_text("abc\ndef\nghi\n");
        assert_eq!(join_lines(&mut ws, 0, 1), Some(p(0, 3)));
        assert_eq!(ws.contents(), "abc def\nghi\n");
    }

    #[test]
    fn join_skips_blank_lines() {
        let mut ws = Workspace::from_text("a\nb\n\nc\n");
        assert_eq!(join_lines(&mut ws, 0, 2), Some(p(0, 1)));
        assert_eq!(ws.contents(), "a b\nc\n");

        let mut ws = Workspace::from_text("a\nb\n\n\n  \nc\n");
        assert_eq!(join_lines(&mut ws, 1, 5), Some(p(1, 1)));
        assert_eq!(ws.contents(), "a\nb c\n");
    }

    #[test]
    fn join_three() {
        let mut ws = Workspace::from_text("a\nb\nc\n");
        assert_eq!(join_lines(&mut ws, 0, 2), Some(p(0, 3)));
        assert_eq!(ws.contents(), "a b c\n");
    }

    #[test]
    fn join_strips_indent() {
        let mut ws = Workspace::from_text("fn x() {\n    body\n}");
        assert_eq!(join_lines(&mut ws, 0, 1), Some(p(0, 8)));
        assert_eq!(ws.contents(), "fn x() { body\n}");
    }

    #[test]
    fn join_on_last_line_does_nothing() {
        let mut ws = Workspace::from_text("a\nb");
        assert_eq!(join_lines(&mut ws, 1, 2), None);
        assert_eq!(ws.contents(), "a\nb");
    }

    // -- p / P --------------------------------------------------------------

    #[test]
    fn paste_char_after_and_before() {
        let mut ws = Workspace::from_text("abc");
        let reg = Register::with_text("xy", RegisterKind::Char);
        assert_eq!(paste(&mut ws, &reg, p(0, 0), Side::After, 1), p(0, 2));
        assert_eq!(ws.contents(), "axybc");
        assert_eq!(paste(&mut ws, &reg, p(0, 0), Side::Before, 2), p(0, 3));
        assert_eq!(ws.contents(), "xyxyaxybc");
    }

    #[test]
    fn paste_char_into_empty_line() {
        let mut ws = Workspace::from_text("");
        let reg = Register::with_text("ab", RegisterKind::Char);
        assert_eq!(paste(&mut ws, &reg, p(0, 0), Side::After, 1), p(0, 1));
        assert_eq!(ws.contents(), "ab");
    }

    #[test]
    fn paste_lines_below_and_above() {
        let mut ws = Workspace::from_text(TEXT);
        let reg = Register::with_text("   123\n", RegisterKind::Line);
        assert_eq!(paste(&mut ws, &reg, p(1, 2), Side::After, 1), p(2, 3));
        assert_eq!(ws.line_text(2), "   123");
        assert_eq!(paste(&mut ws, &reg, p(0, 0), Side::Before, 1), p(0, 3));
        assert_eq!(ws.line_count(), 7);
    }

    #[test]
    fn paste_lines_after_last_line() {
        let mut ws = Workspace::from_text(TEXT);
        let reg = Register::with_text("x\n", RegisterKind::Line);
        assert_eq!(paste(&mut ws, &reg, p(4, 0), Side::After, 2), p(5, 0));
        assert_eq!(ws.contents(), "   123\nline 1\nline 2\nline 3\nline 4\nx\nx");
    }

    #[test]
    fn external_clipboard_wins() {
        let mut ws = Workspace::from_text("");
        let mut regs = RegisterFile::new();
        regs.yank(None, "mine", RegisterKind::Char);
        ws.set_clipboard("theirs\n");
        let reg = fetch_register(&ws, &mut regs, None);
        assert_eq!(reg.content(), "theirs\n");
        assert_eq!(reg.kind(), RegisterKind::Line);
        assert_eq!(fetch_register(&ws, &mut regs, Some('0')).content(), "mine");
    }

    // -- Visual paste -------------------------------------------------------

    fn over(text: &str, reg: Register, region: Region) -> (Workspace, RegisterFile, Position) {
        let mut ws = Workspace::from_text(text);
        let mut regs = RegisterFile::new();
        let cursor = paste_over(&mut ws, &mut regs, &reg, region, 1);
        (ws, regs, cursor)
    }

    #[test]
    fn char_over_char() {
        let reg = Register::with_text("ne ", RegisterKind::Char);
        let (ws, regs, _) = over(TEXT, reg, Region::new(p(3, 0), p(3, 2), RangeKind::Inclusive));
        assert_eq!(ws.line_text(3), "ne e 3");
        assert_eq!(regs.get(None).content(), "lin");
    }

    #[test]
    fn char_over_lines() {
        let reg = Register::with_text("ne ", RegisterKind::Char);
        let (ws, regs, _) = over(TEXT, reg, Region::lines(3, 3));
        assert_eq!(ws.line_text(3), "ne ");
        assert_eq!(ws.line_count(), 5);
        assert_eq!(regs.get(Some('1')).content(), "line 3\n");
    }

    #[test]
    fn lines_over_char() {
        let reg = Register::with_text("line 2\n", RegisterKind::Line);
        let (ws, _, cursor) = over(TEXT, reg, Region::new(p(3, 2), p(3, 4), RangeKind::Inclusive));
        assert_eq!(ws.contents(), "   123\nline 1\nline 2\nli\nline 2\n3\nline 4");
        assert_eq!(cursor, p(4, 0));
    }

    #[test]
    fn lines_over_lines() {
        let reg = Register::with_text("line 2\n", RegisterKind::Line);
        let (ws, _, _) = over(TEXT, reg, Region::lines(3, 3));
        assert_eq!(ws.contents(), "   123\nline 1\nline 2\nline 2\nline 4");
    }
}
