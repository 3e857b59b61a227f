//! Host adapter: the text surface the interpreter drives.
//!
//! The interpreter owns no text. Everything it reads or changes goes through
//! [`TextBuffer`], which an embedding editor implements over its own widget.
//! [`Workspace`](crate::workspace::Workspace) is the implementation this crate
//! ships for tests and the headless driver.
//!
//! # Line model
//!
//! Lines are split on `\n` and reported **without** their line ending. A
//! buffer ending in `\n` therefore has a final empty line, and an empty buffer
//! has exactly one (empty) line. Positions may use `col == line_len` to mean
//! "end of line"; when that line is not the last one, the position addresses
//! the newline itself.
//!
//! The free functions below are the character-level vocabulary the motion,
//! text-object and operator modules share. They work on any `TextBuffer` and
//! never panic on out-of-range input.

use crate::error::Result;
use crate::position::{Position, Range};

/// Everything the interpreter needs from a host editor.
///
/// Undo grouping is optional: hosts that can merge a sequence of edits into
/// one undo step do so between [`begin_edit`](Self::begin_edit) and
/// [`end_edit`](Self::end_edit). The interpreter brackets every command (and
/// every Insert-mode session) with these calls.
pub trait TextBuffer {
    // -- Cursor & text ------------------------------------------------------

    /// Current cursor position.
    fn cursor(&self) -> Position;

    /// Move the cursor. Hosts clamp out-of-range positions.
    fn set_cursor(&mut self, pos: Position);

    /// Text of `line` without its line ending. Empty when out of range.
    fn line_text(&self, line: usize) -> String;

    /// Number of lines; always at least 1.
    fn line_count(&self) -> usize;

    // -- Selection ----------------------------------------------------------

    /// The host's current selection, if any.
    fn selection(&self) -> Option<Range>;

    /// Show `range` as the selection.
    fn set_selection(&mut self, range: Range);

    /// Remove any selection.
    fn clear_selection(&mut self);

    // -- Editing ------------------------------------------------------------

    /// Insert `text` at `pos`.
    fn insert_text(&mut self, pos: Position, text: &str);

    /// Remove `range` and return the removed text.
    fn delete_range(&mut self, range: Range) -> String;

    /// Start grouping edits into one undo step.
    fn begin_edit(&mut self) {}

    /// Close the group opened by [`begin_edit`](Self::begin_edit).
    fn end_edit(&mut self) {}

    /// Undo the last edit group.
    fn undo(&mut self);

    /// Redo the last undone edit group.
    fn redo(&mut self) {}

    // -- Clipboard ----------------------------------------------------------

    /// System clipboard contents.
    fn clipboard(&self) -> String;

    /// Replace the system clipboard contents.
    fn set_clipboard(&mut self, text: &str);

    // -- File lifecycle -----------------------------------------------------

    /// Write the current buffer to its file.
    ///
    /// # Errors
    ///
    /// Host-specific; the reference host reports I/O failures and a missing
    /// file name.
    fn save(&mut self) -> Result<()>;

    /// Close the current buffer.
    fn close(&mut self);

    /// Open `path`, or run the host's interactive "open" action for `None`.
    ///
    /// # Errors
    ///
    /// Host-specific; the reference host reports unreadable paths.
    fn open(&mut self, path: Option<&str>) -> Result<()>;

    /// Re-read the current buffer from disk, discarding unsaved edits.
    ///
    /// # Errors
    ///
    /// Host-specific; the reference host reports I/O failures.
    fn reload(&mut self) -> Result<()>;

    // -- Buffer switching ---------------------------------------------------

    /// Switch to the next buffer, wrapping around.
    fn next_buffer(&mut self);

    /// Switch to the previous buffer, wrapping around.
    fn previous_buffer(&mut self);

    /// Index of the current buffer.
    fn current_buffer_index(&self) -> usize;

    // -- Viewport -----------------------------------------------------------

    /// First line shown on screen.
    fn first_visible_line(&self) -> usize;

    /// Last line shown on screen.
    fn last_visible_line(&self) -> usize;

    /// Scroll so the cursor line sits in the middle of the screen.
    fn center_current_line(&mut self);
}

// ---------------------------------------------------------------------------
// Line queries
// ---------------------------------------------------------------------------

/// Length of `line` in chars (excluding the line ending).
#[must_use]
pub fn line_len<B: TextBuffer + ?Sized>(buf: &B, line: usize) -> usize {
    buf.line_text(line).chars().count()
}

/// Index of the last line.
#[must_use]
pub fn last_line<B: TextBuffer + ?Sized>(buf: &B) -> usize {
    buf.line_count().saturating_sub(1)
}

/// Largest cursor column on `line`.
///
/// With `past_end` the cursor may sit after the last char (Insert mode,
/// operator targets); without it the cursor sits on a char, or at 0 on an
/// empty line.
#[must_use]
pub fn max_col<B: TextBuffer + ?Sized>(buf: &B, line: usize, past_end: bool) -> usize {
    let len = line_len(buf, line);
    if past_end { len } else { len.saturating_sub(1) }
}

/// Clamp `pos` into the buffer.
#[must_use]
pub fn clamp<B: TextBuffer + ?Sized>(buf: &B, pos: Position, past_end: bool) -> Position {
    let line = pos.line.min(last_line(buf));
    Position::new(line, pos.col.min(max_col(buf, line, past_end)))
}

/// Number of leading blanks on `line`. Equals the line length for a blank
/// line, so callers decide how to clamp.
#[must_use]
pub fn leading_blanks<B: TextBuffer + ?Sized>(buf: &B, line: usize) -> usize {
    buf.line_text(line)
        .chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .count()
}

/// Cursor column of the first non-blank char on `line`, clamped onto the
/// line (`^`).
#[must_use]
pub fn first_non_blank<B: TextBuffer + ?Sized>(buf: &B, line: usize) -> usize {
    leading_blanks(buf, line).min(max_col(buf, line, false))
}

// ---------------------------------------------------------------------------
// Character walking
// ---------------------------------------------------------------------------

/// The char at `pos`. The end-of-line column of any line but the last
/// yields `'\n'`.
#[must_use]
pub fn char_at<B: TextBuffer + ?Sized>(buf: &B, pos: Position) -> Option<char> {
    if pos.line >= buf.line_count() {
        return None;
    }
    let text = buf.line_text(pos.line);
    match text.chars().nth(pos.col) {
        Some(ch) => Some(ch),
        None if pos.col == text.chars().count() && pos.line < last_line(buf) => Some('\n'),
        None => None,
    }
}

/// The next position holding a char (newlines included), or `None` at the
/// end of the buffer.
#[must_use]
pub fn next_pos<B: TextBuffer + ?Sized>(buf: &B, pos: Position) -> Option<Position> {
    let len = line_len(buf, pos.line);
    let candidate = if pos.col < len {
        Position::new(pos.line, pos.col + 1)
    } else {
        Position::new(pos.line + 1, 0)
    };
    char_at(buf, candidate).map(|_| candidate)
}

/// The previous position holding a char, or `None` at the start.
#[must_use]
pub fn prev_pos<B: TextBuffer + ?Sized>(buf: &B, pos: Position) -> Option<Position> {
    if pos.col > 0 {
        let col = pos.col.min(line_len(buf, pos.line));
        if col > 0 {
            return Some(Position::new(pos.line, col - 1));
        }
    }
    if pos.line == 0 {
        return None;
    }
    let line = pos.line - 1;
    Some(Position::new(line, line_len(buf, line)))
}

/// Text covered by the half-open `range`, joining lines with `\n`.
#[must_use]
pub fn text_in<B: TextBuffer + ?Sized>(buf: &B, range: Range) -> String {
    let mut out = String::new();
    for line in range.start.line..=range.end.line.min(last_line(buf)) {
        let text = buf.line_text(line);
        let len = text.chars().count();
        let from = if line == range.start.line { range.start.col.min(len) } else { 0 };
        if line == range.end.line {
            let to = range.end.col.min(len);
            out.extend(text.chars().skip(from).take(to.saturating_sub(from)));
        } else {
            out.extend(text.chars().skip(from));
            out.push('\n');
        }
    }
    out
}

/// Lines `first..=last`, each followed by `\n`. This is how whole-line text
/// is held in registers.
#[must_use]
pub fn lines_text<B: TextBuffer + ?Sized>(buf: &B, first: usize, last: usize) -> String {
    let mut out = String::new();
    for line in first..=last.min(last_line(buf)) {
        out.push_str(&buf.line_text(line));
        out.push('\n');
    }
    out
}

/// Position just after `text` when it is inserted at `at`.
#[must_use]
pub fn end_after_insert(at: Position, text: &str) -> Position {
    match text.rfind('\n') {
        Some(idx) => Position::new(
            at.line + text.matches('\n').count(),
            text[idx + 1..].chars().count(),
        ),
        None => Position::new(at.line, at.col + text.chars().count()),
    }
}
