//! Operators: `d`, `c`, `y`, `>`, `<` applied to a [`Region`].
//!
//! The region comes from a motion, a text object, a doubled operator
//! (`dd`) or a visual selection; the operator does not care which. One
//! adjustment is made before applying: an exclusive region whose end sits
//! at column 0 of a later line ends at the end of the line before instead,
//! so `d<Space>` at the end of a line does not eat the line break.
//!
//! Every write to a register is mirrored to the host clipboard.

use std::iter;

use tracing::debug;

use crate::host::{self, TextBuffer};
use crate::position::{Position, Range, RangeKind, Region};
use crate::register::{RegisterFile, RegisterKind};

/// An operator key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Delete,
    Change,
    Yank,
    Indent,
    Outdent,
}

impl Operator {
    #[must_use]
    pub const fn from_char(ch: char) -> Option<Self> {
        match ch {
            'd' => Some(Self::Delete),
            'c' => Some(Self::Change),
            'y' => Some(Self::Yank),
            '>' => Some(Self::Indent),
            '<' => Some(Self::Outdent),
            _ => None,
        }
    }

    #[must_use]
    pub const fn key(self) -> char {
        match self {
            Self::Delete => 'd',
            Self::Change => 'c',
            Self::Yank => 'y',
            Self::Indent => '>',
            Self::Outdent => '<',
        }
    }
}

/// Session state an operator reads and writes.
#[derive(Debug)]
pub struct OperatorContext<'a> {
    pub registers: &'a mut RegisterFile,
    /// The `"x` prefix, if one was typed.
    pub register: Option<char>,
    /// Where the cursor was when the command started.
    pub cursor: Position,
    /// Indent unit for `>` and `<`.
    pub shiftwidth: usize,
    /// Indent levels per line for `>` and `<`.
    pub times: usize,
}

/// What the session does after an operator ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub cursor: Position,
    /// Enter Insert mode (`c`).
    pub insert: bool,
    pub message: Option<String>,
}

impl Outcome {
    const fn at(cursor: Position) -> Self {
        Self {
            cursor,
            insert: false,
            message: None,
        }
    }
}

impl Operator {
    /// Apply to `region`.
    pub fn apply<B: TextBuffer + ?Sized>(
        self,
        buf: &mut B,
        region: Region,
        ctx: &mut OperatorContext<'_>,
    ) -> Outcome {
        let region = adjust_exclusive(buf, region);
        debug!(operator = %self.key(), ?region, "apply operator");
        match self {
            Self::Delete => delete(buf, region, ctx),
            Self::Change => change(buf, region, ctx),
            Self::Yank => yank(buf, region, ctx),
            Self::Indent | Self::Outdent => {
                let (first, last) = (region.start.line, region.end.line.min(host::last_line(buf)));
                let width = ctx.shiftwidth.max(1).saturating_mul(ctx.times.max(1));
                if self == Self::Indent {
                    indent_lines(buf, first, last, width)
                } else {
                    outdent_lines(buf, first, last, width, ctx.shiftwidth.max(1))
                }
            }
        }
    }
}

/// Mirror the unnamed register to the host clipboard.
pub(crate) fn sync_clipboard<B: TextBuffer + ?Sized>(buf: &mut B, registers: &RegisterFile) {
    buf.set_clipboard(registers.get(None).content());
}

const fn register_kind(region: Region) -> RegisterKind {
    match region.kind {
        RangeKind::Linewise => RegisterKind::Line,
        _ => RegisterKind::Char,
    }
}

fn adjust_exclusive<B: TextBuffer + ?Sized>(buf: &B, region: Region) -> Region {
    if region.kind == RangeKind::Exclusive && region.end.col == 0 && region.end.line > region.start.line {
        let line = region.end.line - 1;
        return Region {
            end: Position::new(line, host::line_len(buf, line)),
            ..region
        };
    }
    region
}

// ---------------------------------------------------------------------------
// d / c / y
// ---------------------------------------------------------------------------

fn delete<B: TextBuffer + ?Sized>(buf: &mut B, region: Region, ctx: &mut OperatorContext<'_>) -> Outcome {
    let range = region.resolve(buf);
    if range.is_empty() && !region.is_linewise() {
        return Outcome::at(region.start);
    }
    let text = region.text(buf);
    buf.delete_range(range);
    ctx.registers.delete(ctx.register, &text, register_kind(region));
    sync_clipboard(buf, ctx.registers);

    let cursor = if region.is_linewise() {
        let line = region.start.line.min(host::last_line(buf));
        Position::new(line, host::first_non_blank(buf, line))
    } else {
        region.start
    };
    Outcome::at(cursor)
}

/// Like delete, but a line-wise change keeps one empty line to type into.
fn change<B: TextBuffer + ?Sized>(buf: &mut B, region: Region, ctx: &mut OperatorContext<'_>) -> Outcome {
    let outcome = if region.is_linewise() {
        let last = region.end.line.min(host::last_line(buf));
        let text = host::lines_text(buf, region.start.line, last);
        let start = Position::new(region.start.line, 0);
        buf.delete_range(Range::new(
            start,
            Position::new(last, host::line_len(buf, last)),
        ));
        ctx.registers.delete(ctx.register, &text, RegisterKind::Line);
        sync_clipboard(buf, ctx.registers);
        Outcome::at(start)
    } else {
        let mut outcome = delete(buf, region, ctx);
        outcome.cursor = region.start;
        outcome
    };
    Outcome {
        insert: true,
        ..outcome
    }
}

fn yank<B: TextBuffer + ?Sized>(buf: &mut B, region: Region, ctx: &mut OperatorContext<'_>) -> Outcome {
    let text = region.text(buf);
    ctx.registers.yank(ctx.register, &text, register_kind(region));
    sync_clipboard(buf, ctx.registers);

    let cursor = if !region.is_linewise() {
        region.start
    } else if region.start.line == ctx.cursor.line {
        ctx.cursor
    } else {
        Position::new(region.start.line, ctx.cursor.col)
    };
    Outcome::at(cursor)
}

// ---------------------------------------------------------------------------
// > / <
// ---------------------------------------------------------------------------

/// Cursor after a shift: first non-blank of `line`, or column 0 when the
/// line is blank.
fn shifted_cursor<B: TextBuffer + ?Sized>(buf: &B, line: usize) -> Position {
    let lead = host::leading_blanks(buf, line);
    let col = if lead >= host::line_len(buf, line) { 0 } else { lead };
    Position::new(line, col)
}

fn shift_message(first: usize, last: usize, verb: &str) -> Option<String> {
    let count = last - first + 1;
    (count > 1).then(|| format!("{count} lines {verb}"))
}

/// Prepend `width` spaces to every non-empty line.
fn indent_lines<B: TextBuffer + ?Sized>(buf: &mut B, first: usize, last: usize, width: usize) -> Outcome {
    let indent: String = iter::repeat_n(' ', width).collect();
    for line in first..=last {
        if host::line_len(buf, line) > 0 {
            buf.insert_text(Position::new(line, 0), &indent);
        }
    }
    Outcome {
        message: shift_message(first, last, "indented"),
        ..Outcome::at(shifted_cursor(buf, first))
    }
}

/// Remove up to `width` columns of leading blanks from every line. A tab
/// counts as `tab_width` columns.
fn outdent_lines<B: TextBuffer + ?Sized>(
    buf: &mut B,
    first: usize,
    last: usize,
    width: usize,
    tab_width: usize,
) -> Outcome {
    for line in first..=last {
        let mut removed = 0;
        let mut chars = 0;
        for ch in buf.line_text(line).chars() {
            let w = match ch {
                ' ' => 1,
                '\t' => tab_width,
                _ => break,
            };
            if removed >= width {
                break;
            }
            removed += w;
            chars += 1;
        }
        if chars > 0 {
            buf.delete_range(Range::new(
                Position::new(line, 0),
                Position::new(line, chars),
            ));
        }
    }
    Outcome {
        message: shift_message(first, last, "outdented"),
        ..Outcome::at(shifted_cursor(buf, first))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::workspace::Workspace;

    const TEXT: &str = "   123\nline 1\nline 2\nline 3\nline 4";

    fn p(line: usize, col: usize) -> Position {
        Position::new(line, col)
    }

    fn run(ws: &mut Workspace, regs: &mut RegisterFile, op: Operator, region: Region) -> Outcome {
        let mut ctx = OperatorContext {
            registers: regs,
            register: None,
            cursor: region.start,
            shiftwidth: 4,
            times: 1,
        };
        op.apply(ws, region, &mut ctx)
    }

    // -- Delete -------------------------------------------------------------

    #[test]
    fn delete_charwise_fills_small_register() {
        let mut ws = Workspace::from_text(TEXT);
        let mut regs = RegisterFile::new();
        let out = run(&mut ws, &mut regs, Operator::Delete, Region::new(p(2, 0), p(2, 2), RangeKind::Inclusive));
        assert_eq!(ws.line_text(2), "e 2");
        assert_eq!(regs.get(Some('-')).content(), "lin");
        assert_eq!(regs.get(None).content(), "lin");
        assert_eq!(ws.clipboard(), "lin");
        assert_eq!(out.cursor, p(2, 0));
    }

    #[test]
    fn delete_lines_shift_numbered_history() {
        let mut ws = Workspace::from_text(TEXT);
        let mut regs = RegisterFile::new();
        for _ in 0..3 {
            run(&mut ws, &mut regs, Operator::Delete, Region::lines(0, 0));
        }
        assert_eq!(ws.contents(), "line 3\nline 4");
        assert_eq!(regs.get(Some('1')).content(), "line 2\n");
        assert_eq!(regs.get(Some('2')).content(), "line 1\n");
        assert_eq!(regs.get(Some('3')).content(), "   123\n");
        assert_eq!(regs.get(None).kind(), RegisterKind::Line);
    }

    #[test]
    fn delete_last_line_moves_cursor_up() {
        let mut ws = Workspace::from_text(TEXT);
        let mut regs = RegisterFile::new();
        let out = run(&mut ws, &mut regs, Operator::Delete, Region::lines(3, 4));
        assert_eq!(ws.contents(), "   123\nline 1\nline 2");
        assert_eq!(out.cursor, p(2, 0));
        assert_eq!(regs.get(None).content(), "line 3\nline 4\n");
    }

    #[test]
    fn exclusive_end_at_column_zero_stops_at_line_end() {
        let mut ws = Workspace::from_text("ab\ncd");
        let mut regs = RegisterFile::new();
        run(&mut ws, &mut regs, Operator::Delete, Region::new(p(0, 1), p(1, 0), RangeKind::Exclusive));
        assert_eq!(ws.contents(), "a\ncd");
    }

    #[test]
    fn empty_region_writes_nothing() {
        let mut ws = Workspace::from_text("abc");
        let mut regs = RegisterFile::new();
        run(&mut ws, &mut regs, Operator::Delete, Region::new(p(0, 1), p(0, 1), RangeKind::Exclusive));
        assert_eq!(ws.contents(), "abc");
        assert!(regs.get(None).is_empty());
    }

    // -- Change -------------------------------------------------------------

    #[test]
    fn change_lines_leaves_empty_line() {
        let mut ws = Workspace::from_text(TEXT);
        let mut regs = RegisterFile::new();
        let out = run(&mut ws, &mut regs, Operator::Change, Region::lines(1, 3));
        assert_eq!(ws.contents(), "   123\n\nline 4");
        assert!(out.insert);
        assert_eq!(out.cursor, p(1, 0));
        assert_eq!(regs.get(None).content(), "line 1\nline 2\nline 3\n");
    }

    #[test]
    fn change_charwise_enters_insert_at_start() {
        let mut ws = Workspace::from_text("abc5 abc6");
        let mut regs = RegisterFile::new();
        let out = run(&mut ws, &mut regs, Operator::Change, Region::new(p(0, 0), p(0, 3), RangeKind::Inclusive));
        assert_eq!(ws.contents(), " abc6");
        assert_eq!(out, Outcome { cursor: p(0, 0), insert: true, message: None });
    }

    // -- Yank ---------------------------------------------------------------

    #[test]
    fn yank_leaves_text_and_fills_register_zero() {
        let mut ws = Workspace::from_text(TEXT);
        let mut regs = RegisterFile::new();
        let out = run(&mut ws, &mut regs, Operator::Yank, Region::new(p(2, 2), p(2, 5), RangeKind::Inclusive));
        assert_eq!(ws.contents(), TEXT);
        assert_eq!(regs.get(Some('0')).content(), "ne 2");
        assert_eq!(ws.clipboard(), "ne 2");
        assert_eq!(out.cursor, p(2, 2));
    }

    #[test]
    fn yank_lines_keeps_cursor_on_its_line() {
        let mut ws = Workspace::from_text(TEXT);
        let mut regs = RegisterFile::new();
        let mut ctx = OperatorContext {
            registers: &mut regs,
            register: Some('a'),
            cursor: p(2, 3),
            shiftwidth: 4,
            times: 1,
        };
        let out = Operator::Yank.apply(&mut ws, Region::lines(2, 3), &mut ctx);
        assert_eq!(out.cursor, p(2, 3));
        assert_eq!(regs.get(Some('a')).content(), "line 2\nline 3\n");
        assert_eq!(regs.get(None).content(), "line 2\nline 3\n");
    }

    // -- Indent / outdent ---------------------------------------------------

    #[test]
    fn indent_skips_empty_lines() {
        let mut ws = Workspace::from_text("ab\n\ncdef\n \n");
        let mut regs = RegisterFile::new();
        let out = run(&mut ws, &mut regs, Operator::Indent, Region::lines(0, 3));
        assert_eq!(ws.contents(), "    ab\n\n    cdef\n     \n");
        assert_eq!(out.cursor, p(0, 4));
        assert_eq!(out.message.as_deref(), Some("4 lines indented"));
    }

    #[test]
    fn outdent_removes_at_most_one_unit() {
        let mut ws = Workspace::from_text(" ab\n  \n    cdef\n     \n");
        let mut regs = RegisterFile::new();
        let out = run(&mut ws, &mut regs, Operator::Outdent, Region::lines(1, 3));
        assert_eq!(ws.contents(), " ab\n\ncdef\n \n");
        assert_eq!(out.cursor, p(1, 0));
        assert_eq!(out.message.as_deref(), Some("3 lines outdented"));
    }

    #[test]
    fn outdent_counts_tab_as_shiftwidth() {
        let mut ws = Workspace::from_text("\t\tx");
        let mut regs = RegisterFile::new();
        let out = run(&mut ws, &mut regs, Operator::Outdent, Region::lines(0, 0));
        assert_eq!(ws.contents(), "\tx");
        assert_eq!(out.cursor, p(0, 1));
        assert_eq!(out.message, None);
    }

    #[test]
    fn shift_by_several_levels() {
        let mut ws = Workspace::from_text("x");
        let mut regs = RegisterFile::new();
        let mut ctx = OperatorContext {
            registers: &mut regs,
            register: None,
            cursor: p(0, 0),
            shiftwidth: 2,
            times: 3,
        };
        Operator::Indent.apply(&mut ws, Region::lines(0, 0), &mut ctx);
        assert_eq!(ws.contents(), "      x");
    }

    #[test]
    fn operator_keys_round_trip() {
        for ch in ['d', 'c', 'y', '>', '<'] {
            assert_eq!(Operator::from_char(ch).map(Operator::key), Some(ch));
        }
        assert_eq!(Operator::from_char('x'), None);
    }
}
