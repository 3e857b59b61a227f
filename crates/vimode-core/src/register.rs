//! Registers: storage for yanked and deleted text.
//!
//! Every yank and delete copies text into a register; paste reads it back.
//! A register remembers whether its text was captured char-wise or
//! line-wise, because paste behaves differently for each:
//!
//! - **Char-wise**: `p` inserts after the cursor, `P` before it.
//! - **Line-wise**: `p` inserts whole lines below, `P` above. Line-wise
//!   text always ends with `\n`.
//!
//! ## Register names
//!
//! | Name         | Written by                                           |
//! |--------------|------------------------------------------------------|
//! | unnamed `""` | every yank and delete                                |
//! | `"a`–`"z`    | `"x` prefix; overwrites                              |
//! | `"A`–`"Z`    | `"X` prefix; appends to the lowercase slot           |
//! | `"0`         | unprefixed yanks                                     |
//! | `"1`–`"9`    | unprefixed line-wise or multi-line deletes, shifting |
//! | `"-`         | unprefixed deletes within one line                   |
//!
//! Reads of any other name fall back to the unnamed register.

use tracing::debug;

/// How the register content was captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterKind {
    /// Inline text. Paste goes at the cursor.
    Char,
    /// Whole lines. Paste goes above or below the cursor line.
    Line,
}

/// A single register slot.
#[derive(Debug, Clone)]
pub struct Register {
    content: String,
    kind: RegisterKind,
}

impl Register {
    /// An empty register.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            content: String::new(),
            kind: RegisterKind::Char,
        }
    }

    /// A register holding `text`. Line-wise text gains a final `\n` if it
    /// lacks one.
    #[must_use]
    pub fn with_text(text: impl Into<String>, kind: RegisterKind) -> Self {
        let mut reg = Self {
            content: text.into(),
            kind,
        };
        reg.terminate();
        reg
    }

    /// Replace the content.
    pub fn set(&mut self, text: impl Into<String>, kind: RegisterKind) {
        *self = Self::with_text(text, kind);
    }

    /// Append text, as for an uppercase register name.
    ///
    /// If either side is line-wise the result is line-wise, and the two
    /// parts are separated by a newline.
    pub fn append(&mut self, text: &str, kind: RegisterKind) {
        if kind == RegisterKind::Line || self.kind == RegisterKind::Line {
            if !self.content.is_empty() && !self.content.ends_with('\n') {
                self.content.push('\n');
            }
            self.content.push_str(text);
            self.kind = RegisterKind::Line;
            self.terminate();
        } else {
            self.content.push_str(text);
        }
    }

    fn terminate(&mut self) {
        if self.kind == RegisterKind::Line && !self.content.ends_with('\n') {
            self.content.push('\n');
        }
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub const fn kind(&self) -> RegisterKind {
        self.kind
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

impl Default for Register {
    fn default() -> Self {
        Self::new()
    }
}

// ── Register file ────────────────────────────────────────────────────────

/// Depth of the numbered delete history (`"1`–`"9`).
const NUMBERED: usize = 9;

/// The complete set of registers.
#[derive(Debug)]
pub struct RegisterFile {
    unnamed: Register,

    /// `"a`–`"z`, indexed by `ch as u8 - b'a'`.
    named: [Register; 26],

    /// `"0` is the last yank; `"1`–`"9` the delete history, newest first.
    numbered: [Register; NUMBERED + 1],

    /// `"-`, the last small delete.
    small: Register,
}

/// A register name after validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Unnamed,
    Named(usize),
    Append(usize),
    Numbered(usize),
    Small,
}

impl Slot {
    /// Classify a register name. Unknown names and `"` mean unnamed.
    const fn of(name: Option<char>) -> Self {
        match name {
            Some(ch @ 'a'..='z') => Self::Named((ch as u8 - b'a') as usize),
            Some(ch @ 'A'..='Z') => Self::Append((ch as u8 - b'A') as usize),
            Some(ch @ '0'..='9') => Self::Numbered((ch as u8 - b'0') as usize),
            Some('-') => Self::Small,
            _ => Self::Unnamed,
        }
    }
}

impl RegisterFile {
    #[must_use]
    pub fn new() -> Self {
        Self {
            unnamed: Register::new(),
            named: std::array::from_fn(|_| Register::new()),
            numbered: std::array::from_fn(|_| Register::new()),
            small: Register::new(),
        }
    }

    /// True if `name` selects a register other than the unnamed one.
    #[must_use]
    pub const fn is_valid_name(name: char) -> bool {
        !matches!(Slot::of(Some(name)), Slot::Unnamed)
    }

    /// Store yanked text.
    ///
    /// - no name → `"0` and unnamed
    /// - `'a'..='z'` → overwrite the named register, copy to unnamed
    /// - `'A'..='Z'` → append to the named register, copy the result to
    ///   unnamed
    /// - a digit or `'-'` → that register and unnamed
    pub fn yank(&mut self, name: Option<char>, text: &str, kind: RegisterKind) {
        debug!(register = ?name, kind = ?kind, len = text.len(), "yank");
        match Slot::of(name) {
            Slot::Unnamed => self.numbered[0].set(text, kind),
            slot => self.write_explicit(slot, text, kind),
        }
        self.sync_unnamed(name, text, kind);
    }

    /// Store deleted text.
    ///
    /// Without a name, line-wise or multi-line text shifts the numbered
    /// history (`"1` → `"2` … the oldest falls off) and lands in `"1`;
    /// anything smaller goes to `"-`. With a name, only that register (and
    /// unnamed) is written.
    pub fn delete(&mut self, name: Option<char>, text: &str, kind: RegisterKind) {
        debug!(register = ?name, kind = ?kind, len = text.len(), "delete");
        match Slot::of(name) {
            Slot::Unnamed => {
                if kind == RegisterKind::Line || text.contains('\n') {
                    self.numbered[1..].rotate_right(1);
                    self.numbered[1].set(text, kind);
                } else {
                    self.small.set(text, kind);
                }
            }
            slot => self.write_explicit(slot, text, kind),
        }
        self.sync_unnamed(name, text, kind);
    }

    fn write_explicit(&mut self, slot: Slot, text: &str, kind: RegisterKind) {
        match slot {
            Slot::Named(idx) => self.named[idx].set(text, kind),
            Slot::Append(idx) => self.named[idx].append(text, kind),
            Slot::Numbered(idx) => self.numbered[idx].set(text, kind),
            Slot::Small => self.small.set(text, kind),
            Slot::Unnamed => self.unnamed.set(text, kind),
        }
    }

    fn sync_unnamed(&mut self, name: Option<char>, text: &str, kind: RegisterKind) {
        if let Slot::Append(idx) = Slot::of(name) {
            self.unnamed = self.named[idx].clone();
        } else {
            self.unnamed.set(text, kind);
        }
    }

    /// Overwrite only the unnamed register, as when the host clipboard
    /// changed behind the interpreter's back.
    pub fn set_unnamed(&mut self, text: &str, kind: RegisterKind) {
        self.unnamed.set(text, kind);
    }

    /// The register to read from. Uppercase names read the lowercase slot.
    #[must_use]
    pub const fn get(&self, name: Option<char>) -> &Register {
        match Slot::of(name) {
            Slot::Named(idx) | Slot::Append(idx) => &self.named[idx],
            Slot::Numbered(idx) => &self.numbered[idx],
            Slot::Small => &self.small,
            Slot::Unnamed => &self.unnamed,
        }
    }
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ──────────────────────────────────────────────────────────────
