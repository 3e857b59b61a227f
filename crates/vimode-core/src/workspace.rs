//! Workspace: the reference [`TextBuffer`] host.
//!
//! A workspace is a list of open documents, each a rope [`Buffer`] with its
//! own undo [`History`], cursor and [`Viewport`], plus the state a host
//! editor shares across documents: the selection highlight and a clipboard.
//!
//! It is what the headless driver and the test-suite drive the interpreter
//! against, and it also handles the keys the interpreter passes through in
//! Insert mode ([`type_key`](Workspace::type_key)).
//!
//! Every mutation is recorded in the current document's history. Edits made
//! between [`begin_edit`](TextBuffer::begin_edit) and
//! [`end_edit`](TextBuffer::end_edit) undo as one step; edits outside a
//! group undo individually.

use std::path::Path;

use tracing::debug;
use vimode_keys::{KeyCode, KeyEvent};

use crate::buffer::Buffer;
use crate::error::Result;
use crate::history::History;
use crate::host::{self, TextBuffer};
use crate::position::{Position, Range};
use crate::view::{DEFAULT_HEIGHT, Viewport};

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// One open file (or scratch buffer).
#[derive(Debug)]
pub struct Document {
    pub buffer: Buffer,
    pub history: History,
    pub cursor: Position,
    pub viewport: Viewport,
}

impl Document {
    fn new(buffer: Buffer, height: usize) -> Self {
        Self {
            buffer,
            history: History::new(),
            cursor: Position::ZERO,
            viewport: Viewport::new(height),
        }
    }

    /// A display name for status messages.
    #[must_use]
    pub fn name(&self) -> String {
        self.buffer
            .path()
            .map_or_else(|| "[No Name]".to_string(), |p| p.display().to_string())
    }
}

// ---------------------------------------------------------------------------
// Workspace
// ---------------------------------------------------------------------------

/// The set of open documents. Always holds at least one.
#[derive(Debug)]
pub struct Workspace {
    docs: Vec<Document>,
    current: usize,
    selection: Option<Range>,
    clipboard: String,
    height: usize,
    finished: bool,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::from_text("")
    }
}

impl Workspace {
    // -- Construction -------------------------------------------------------

    /// One scratch document holding `text`.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self {
            docs: vec![Document::new(Buffer::from_text(text), DEFAULT_HEIGHT)],
            current: 0,
            selection: None,
            clipboard: String::new(),
            height: DEFAULT_HEIGHT,
            finished: false,
        }
    }

    /// One document per path, the first one current. No paths gives a
    /// single scratch document.
    ///
    /// # Errors
    ///
    /// The first path that cannot be loaded.
    pub fn from_files<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let mut ws = Self::from_text("");
        if paths.is_empty() {
            return Ok(ws);
        }
        ws.docs.clear();
        for path in paths {
            let buffer = Buffer::from_file(path.as_ref())?;
            ws.docs.push(Document::new(buffer, ws.height));
        }
        Ok(ws)
    }

    /// Set the number of visible lines for every document.
    #[must_use]
    pub fn with_height(mut self, height: usize) -> Self {
        self.height = height.max(1);
        for doc in &mut self.docs {
            doc.viewport.set_height(self.height);
            doc.viewport.scroll_to(doc.cursor.line);
        }
        self
    }

    // -- Accessors ----------------------------------------------------------

    #[must_use]
    pub fn document(&self) -> &Document {
        &self.docs[self.current]
    }

    fn document_mut(&mut self) -> &mut Document {
        &mut self.docs[self.current]
    }

    #[must_use]
    pub fn documents(&self) -> &[Document] {
        &self.docs
    }

    #[must_use]
    pub fn buffer(&self) -> &Buffer {
        &self.document().buffer
    }

    /// Text of the current document.
    #[must_use]
    pub fn contents(&self) -> String {
        self.buffer().contents()
    }

    /// True once the last document has been closed.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Save every modified document that has a file name.
    ///
    /// # Errors
    ///
    /// The first failed write.
    pub fn save_all(&mut self) -> Result<()> {
        for doc in &mut self.docs {
            if doc.buffer.is_modified() && doc.buffer.path().is_some() {
                doc.buffer.save()?;
            }
        }
        Ok(())
    }

    fn follow_cursor(&mut self) {
        let doc = self.document_mut();
        doc.cursor = host_clamp(&doc.buffer, doc.cursor);
        doc.viewport.scroll_to(doc.cursor.line);
    }

    // -- Insert-mode typing -------------------------------------------------

    /// Apply a key the interpreter passed through in Insert mode. Returns
    /// `false` for keys with no typing meaning here.
    pub fn type_key(&mut self, key: KeyEvent) -> bool {
        let cursor = self.cursor();
        if let Some(ch) = key.printable() {
            let mut text = [0; 4];
            self.insert_text(cursor, ch.encode_utf8(&mut text));
            self.set_cursor(cursor.with_col(cursor.col + 1));
            return true;
        }
        match key.code {
            KeyCode::Enter => {
                self.insert_text(cursor, "\n");
                self.set_cursor(Position::new(cursor.line + 1, 0));
            }
            KeyCode::Tab => {
                self.insert_text(cursor, "\t");
                self.set_cursor(cursor.with_col(cursor.col + 1));
            }
            KeyCode::Backspace => {
                if let Some(prev) = host::prev_pos(self, cursor) {
                    self.delete_range(Range::new(prev, cursor));
                    self.set_cursor(prev);
                }
            }
            KeyCode::Delete => {
                if let Some(next) = host::next_pos(self, cursor) {
                    self.delete_range(Range::new(cursor, next));
                } else if cursor.col < host::line_len(self, cursor.line) {
                    self.delete_range(Range::new(cursor, cursor.with_col(cursor.col + 1)));
                }
            }
            KeyCode::Left => self.set_cursor(cursor.with_col(cursor.col.saturating_sub(1))),
            KeyCode::Right => self.set_cursor(cursor.with_col(cursor.col + 1)),
            KeyCode::Up => self.set_cursor(Position::new(cursor.line.saturating_sub(1), cursor.col)),
            KeyCode::Down => self.set_cursor(Position::new(cursor.line + 1, cursor.col)),
            KeyCode::Home => self.set_cursor(cursor.with_col(0)),
            KeyCode::End => self.set_cursor(cursor.with_col(usize::MAX)),
            _ => return false,
        }
        true
    }
}

/// Clamp `pos` onto `buf`, allowing the end-of-line column.
fn host_clamp(buf: &Buffer, pos: Position) -> Position {
    let line = pos.line.min(buf.line_count().saturating_sub(1));
    Position::new(line, pos.col.min(buf.line_len(line)))
}

// ---------------------------------------------------------------------------
// TextBuffer
// ---------------------------------------------------------------------------

impl TextBuffer for Workspace {
    fn cursor(&self) -> Position {
        self.document().cursor
    }

    fn set_cursor(&mut self, pos: Position) {
        self.document_mut().cursor = pos;
        self.follow_cursor();
    }

    fn line_text(&self, line: usize) -> String {
        self.buffer().line_text(line)
    }

    fn line_count(&self) -> usize {
        self.buffer().line_count()
    }

    fn selection(&self) -> Option<Range> {
        self.selection
    }

    fn set_selection(&mut self, range: Range) {
        self.selection = Some(range);
    }

    fn clear_selection(&mut self) {
        self.selection = None;
    }

    fn insert_text(&mut self, pos: Position, text: &str) {
        let doc = self.document_mut();
        let at = doc.buffer.insert(pos, text);
        doc.history.record_insert(at, text);
        self.follow_cursor();
    }

    fn delete_range(&mut self, range: Range) -> String {
        let doc = self.document_mut();
        let start = host_clamp(&doc.buffer, range.start);
        let removed = doc.buffer.delete(range);
        doc.history.record_delete(start, &removed);
        self.follow_cursor();
        removed
    }

    fn begin_edit(&mut self) {
        let doc = self.document_mut();
        doc.history.begin(doc.cursor);
    }

    fn end_edit(&mut self) {
        let doc = self.document_mut();
        doc.history.commit(doc.cursor);
    }

    fn undo(&mut self) {
        let doc = self.document_mut();
        if let Some(cursor) = doc.history.undo(&mut doc.buffer) {
            doc.cursor = cursor;
        }
        self.follow_cursor();
    }

    fn redo(&mut self) {
        let doc = self.document_mut();
        if let Some(cursor) = doc.history.redo(&mut doc.buffer) {
            doc.cursor = cursor;
        }
        self.follow_cursor();
    }

    fn clipboard(&self) -> String {
        self.clipboard.clone()
    }

    fn set_clipboard(&mut self, text: &str) {
        text.clone_into(&mut self.clipboard);
    }

    fn save(&mut self) -> Result<()> {
        let doc = self.document_mut();
        doc.buffer.save()?;
        debug!(file = %doc.name(), "saved");
        Ok(())
    }

    fn close(&mut self) {
        if self.docs.len() > 1 {
            let doc = self.docs.remove(self.current);
            debug!(file = %doc.name(), "closed");
            self.current = self.current.min(self.docs.len() - 1);
        } else {
            debug!("closed last document");
            self.finished = true;
        }
        self.selection = None;
    }

    fn open(&mut self, path: Option<&str>) -> Result<()> {
        let buffer = match path {
            Some(path) => Buffer::from_file(Path::new(path))?,
            None => Buffer::new(),
        };
        self.docs.push(Document::new(buffer, self.height));
        self.current = self.docs.len() - 1;
        self.selection = None;
        debug!(file = %self.document().name(), index = self.current, "opened");
        Ok(())
    }

    fn reload(&mut self) -> Result<()> {
        let doc = self.document_mut();
        doc.buffer.reload()?;
        doc.history = History::new();
        self.follow_cursor();
        Ok(())
    }

    fn next_buffer(&mut self) {
        self.current = (self.current + 1) % self.docs.len();
        self.selection = None;
    }

    fn previous_buffer(&mut self) {
        self.current = (self.current + self.docs.len() - 1) % self.docs.len();
        self.selection = None;
    }

    fn current_buffer_index(&self) -> usize {
        self.current
    }

    fn first_visible_line(&self) -> usize {
        self.document().viewport.top_line()
    }

    fn last_visible_line(&self) -> usize {
        let doc = self.document();
        doc.viewport
            .bottom_line(doc.buffer.line_count().saturating_sub(1))
    }

    fn center_current_line(&mut self) {
        let doc = self.document_mut();
        doc.viewport.center(doc.cursor.line);
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;

    use super::*;

    fn p(line: usize, col: usize) -> Position {
        Position::new(line, col)
    }

    fn type_str(ws: &mut Workspace, text: &str) {
        for ch in text.chars() {
            assert!(ws.type_key(KeyEvent::from_char(ch)));
        }
    }

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("vimode-ws-{}-{name}", std::process::id()))
    }

    // -- Editing & undo -----------------------------------------------------

    #[test]
    fn typing_inserts_and_moves() {
        let mut ws = Workspace::from_text("");
        type_str(&mut ws, "ab\ncd");
        assert_eq!(ws.contents(), "ab\ncd");
        assert_eq!(ws.cursor(), p(1, 2));
    }

    #[test]
    fn backspace_joins_lines() {
        let mut ws = Workspace::from_text("ab\ncd");
        ws.set_cursor(p(1, 0));
        ws.type_key(KeyCode::Backspace.into());
        assert_eq!(ws.contents(), "abcd");
        assert_eq!(ws.cursor(), p(0, 2));
    }

    #[test]
    fn delete_key_removes_under_cursor() {
        let mut ws = Workspace::from_text("ab\ncd");
        ws.set_cursor(p(0, 2));
        ws.type_key(KeyCode::Delete.into());
        assert_eq!(ws.contents(), "abcd");
    }

    #[test]
    fn grouped_edits_undo_together() {
        let mut ws = Workspace::from_text("x");
        ws.begin_edit();
        type_str(&mut ws, "abc");
        ws.end_edit();
        assert_eq!(ws.contents(), "abcx");
        ws.undo();
        assert_eq!(ws.contents(), "x");
        assert_eq!(ws.cursor(), p(0, 0));
        ws.redo();
        assert_eq!(ws.contents(), "abcx");
    }

    #[test]
    fn set_cursor_clamps_to_line_end() {
        let mut ws = Workspace::from_text("abc\nd");
        ws.set_cursor(p(7, 7));
        assert_eq!(ws.cursor(), p(1, 1));
    }

    // -- Documents ----------------------------------------------------------

    #[test]
    fn open_and_cycle_documents() {
        let mut ws = Workspace::from_text("one");
        ws.open(None).expect("scratch open");
        assert_eq!(ws.current_buffer_index(), 1);
        ws.next_buffer();
        assert_eq!(ws.current_buffer_index(), 0);
        ws.previous_buffer();
        assert_eq!(ws.current_buffer_index(), 1);
    }

    #[test]
    fn closing_last_document_finishes() {
        let mut ws = Workspace::from_text("one");
        ws.open(None).expect("scratch open");
        ws.close();
        assert!(!ws.is_finished());
        assert_eq!(ws.contents(), "one");
        ws.close();
        assert!(ws.is_finished());
    }

    #[test]
    fn save_and_reload_round_trip() {
        let path = temp_path("reload.txt");
        fs::write(&path, "saved\n").expect("write fixture");

        let mut ws = Workspace::from_files(&[&path]).expect("load");
        ws.insert_text(p(0, 0), "edit ");
        ws.reload().expect("reload");
        assert_eq!(ws.contents(), "saved\n");

        ws.insert_text(p(0, 0), "new ");
        ws.save().expect("save");
        assert_eq!(fs::read_to_string(&path).expect("read back"), "new saved\n");
        fs::remove_file(&path).ok();
    }

    #[test]
    fn save_scratch_fails() {
        let mut ws = Workspace::from_text("x");
        assert!(ws.save().is_err());
    }

    // -- Viewport -----------------------------------------------------------

    #[test]
    fn viewport_follows_cursor() {
        let text = (0..50).map(|n| n.to_string()).collect::<Vec<_>>().join("\n");
        let mut ws = Workspace::from_text(&text).with_height(10);
        assert_eq!(ws.last_visible_line(), 9);
        ws.set_cursor(p(30, 0));
        assert_eq!(ws.first_visible_line(), 21);
        assert_eq!(ws.last_visible_line(), 30);
        ws.center_current_line();
        assert_eq!(ws.first_visible_line(), 26);
    }
}
