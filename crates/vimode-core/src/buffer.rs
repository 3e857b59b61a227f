//! Text buffer: rope-backed storage for one document.
//!
//! A `Buffer` wraps a [`ropey::Rope`] with the line-addressed API the
//! reference host needs, plus file metadata (path, modified flag, line
//! ending).
//!
//! - **Lines split on `\n` only.** Line endings are detected on load and
//!   normalized to `\n` in memory; saving writes the detected style back.
//!   ropey is built without its CR/Unicode line-break features, so rope
//!   lines and [`line_text`](Buffer::line_text) always agree.
//! - **Columns are char offsets.** Byte offsets never leak out.
//! - **Edits clamp instead of panicking.** Out-of-range positions are pulled
//!   to the nearest valid one; the interpreter already clamps, this is the
//!   last line of defence against a host caller that doesn't.
//! - **No undo here.** [`History`](crate::history::History) wraps edits.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use ropey::Rope;

use crate::error::{Error, Result};
use crate::position::{Position, Range};

// ---------------------------------------------------------------------------
// Line ending detection
// ---------------------------------------------------------------------------

/// Line ending style of a file, detected from its first line break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LineEnding {
    /// `\n`
    #[default]
    Lf,
    /// `\r\n`
    CrLf,
    /// `\r`
    Cr,
}

impl LineEnding {
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
            Self::Cr => "\r",
        }
    }

    /// The style of the first line break in `text`, `Lf` if there is none.
    #[must_use]
    pub fn detect(text: &str) -> Self {
        let bytes = text.as_bytes();
        match bytes.iter().position(|b| *b == b'\n' || *b == b'\r') {
            Some(i) if bytes[i] == b'\n' => Self::Lf,
            Some(i) if bytes.get(i + 1) == Some(&b'\n') => Self::CrLf,
            Some(_) => Self::Cr,
            None => Self::Lf,
        }
    }
}

impl fmt::Display for LineEnding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Lf => "LF",
            Self::CrLf => "CRLF",
            Self::Cr => "CR",
        })
    }
}

/// Convert every `\r\n` and lone `\r` to `\n`.
fn normalize(text: &str) -> String {
    if !text.contains('\r') {
        return text.to_string();
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}

// ---------------------------------------------------------------------------
// Buffer
// ---------------------------------------------------------------------------

/// A document's text and file metadata.
pub struct Buffer {
    rope: Rope,
    path: Option<PathBuf>,
    modified: bool,
    line_ending: LineEnding,
}

impl Buffer {
    // -- Construction -------------------------------------------------------

    /// An empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::from_text("")
    }

    /// A scratch buffer holding `text`.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self {
            line_ending: LineEnding::detect(text),
            rope: Rope::from_str(&normalize(text)),
            path: None,
            modified: false,
        }
    }

    /// Load `path`. A path that does not exist yet gives an empty buffer
    /// bound to it, so `:w` creates the file.
    ///
    /// # Errors
    ///
    /// [`Error::IsDirectory`] for a directory, [`Error::Io`] when the file
    /// exists but cannot be read.
    pub fn from_file(path: &Path) -> Result<Self> {
        if path.is_dir() {
            return Err(Error::IsDirectory(path.to_path_buf()));
        }
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(Error::io(path, e)),
        };
        let mut buf = Self::from_text(&text);
        buf.path = Some(path.to_path_buf());
        Ok(buf)
    }

    // -- Text access --------------------------------------------------------

    /// Number of lines. An empty buffer has one; a trailing `\n` adds an
    /// empty last line.
    #[inline]
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Text of `line` without its `\n`; empty when out of range.
    #[must_use]
    pub fn line_text(&self, line: usize) -> String {
        if line >= self.rope.len_lines() {
            return String::new();
        }
        let mut text = self.rope.line(line).to_string();
        if text.ends_with('\n') {
            text.pop();
        }
        text
    }

    /// Char count of `line` without its `\n`.
    #[must_use]
    pub fn line_len(&self, line: usize) -> usize {
        if line >= self.rope.len_lines() {
            return 0;
        }
        let slice = self.rope.line(line);
        let len = slice.len_chars();
        if len > 0 && slice.char(len - 1) == '\n' {
            len - 1
        } else {
            len
        }
    }

    /// Total char count.
    #[inline]
    #[must_use]
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// The whole text, `\n`-separated.
    #[must_use]
    pub fn contents(&self) -> String {
        self.rope.to_string()
    }

    // -- Coordinate conversion ----------------------------------------------

    /// Rope char index of `pos`, clamped into the buffer. A column past the
    /// end of a line lands on that line's end, never on the next line.
    #[must_use]
    pub fn char_idx(&self, pos: Position) -> usize {
        let last = self.rope.len_lines().saturating_sub(1);
        let line = pos.line.min(last);
        self.rope.line_to_char(line) + pos.col.min(self.line_len(line))
    }

    /// Position of a rope char index, clamped to the end of the text.
    #[must_use]
    pub fn char_idx_to_pos(&self, idx: usize) -> Position {
        let idx = idx.min(self.rope.len_chars());
        let line = self.rope.char_to_line(idx);
        Position::new(line, idx - self.rope.line_to_char(line))
    }

    // -- Editing ------------------------------------------------------------

    /// Insert `text` at `pos` (clamped). Returns the position actually used.
    pub fn insert(&mut self, pos: Position, text: &str) -> Position {
        let idx = self.char_idx(pos);
        let at = self.char_idx_to_pos(idx);
        if !text.is_empty() {
            self.rope.insert(idx, &normalize(text));
            self.modified = true;
        }
        at
    }

    /// Remove `range` (clamped) and return the removed text.
    pub fn delete(&mut self, range: Range) -> String {
        let start = self.char_idx(range.start);
        let end = self.char_idx(range.end).max(start);
        if start == end {
            return String::new();
        }
        let removed = self.rope.slice(start..end).to_string();
        self.rope.remove(start..end);
        self.modified = true;
        removed
    }

    // -- Metadata -----------------------------------------------------------

    #[inline]
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    #[inline]
    pub fn set_path(&mut self, path: PathBuf) {
        self.path = Some(path);
    }

    /// True if the text changed since load or the last save.
    #[inline]
    #[must_use]
    pub const fn is_modified(&self) -> bool {
        self.modified
    }

    #[inline]
    #[must_use]
    pub const fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    // -- File I/O -----------------------------------------------------------

    /// Write to the associated path in the detected line-ending style.
    ///
    /// # Errors
    ///
    /// [`Error::NoFileName`] for a scratch buffer, [`Error::Io`] when the
    /// write fails.
    pub fn save(&mut self) -> Result<()> {
        let path = self.path.clone().ok_or(Error::NoFileName)?;
        self.save_as(&path)
    }

    /// Write to `path` and bind the buffer to it.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] when the write fails.
    pub fn save_as(&mut self, path: &Path) -> Result<()> {
        let mut text = self.rope.to_string();
        if self.line_ending != LineEnding::Lf {
            text = text.replace('\n', self.line_ending.as_str());
        }
        fs::write(path, text).map_err(|e| Error::io(path, e))?;
        self.path = Some(path.to_path_buf());
        self.modified = false;
        Ok(())
    }

    /// Re-read the associated file, discarding in-memory edits.
    ///
    /// # Errors
    ///
    /// [`Error::NoFileName`] for a scratch buffer, [`Error::Io`] when the
    /// read fails.
    pub fn reload(&mut self) -> Result<()> {
        let path = self.path.clone().ok_or(Error::NoFileName)?;
        *self = Self::from_file(&path)?;
        Ok(())
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("lines", &self.line_count())
            .field("chars", &self.len_chars())
            .field("modified", &self.modified)
            .field("line_ending", &self.line_ending)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}
