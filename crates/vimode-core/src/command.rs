//! Command-line mode: the prompt opened by `:`, `/` and `?`.
//!
//! The same line editor serves ex commands and search patterns; the
//! [`Prompt`] says which. Enter hands the text to the session, Escape (or
//! Backspace on an empty line) cancels.
//!
//! # Ex commands
//!
//! | Command      | Action                                  |
//! |--------------|-----------------------------------------|
//! | `:w`         | Save the current buffer                 |
//! | `:q`, `:q!`  | Close the current buffer                |
//! | `:wq`, `:x`  | Save, then close                        |
//! | `:e`         | Reload from disk                        |
//! | `:e <arg>`   | Ask the host to open `<arg>`            |
//! | `:N`         | Go to line N (1-indexed)                |
//! | `:set ...`   | Change options (see [`crate::options`]) |

use crate::search::SearchDirection;

// ---------------------------------------------------------------------------
// Prompt
// ---------------------------------------------------------------------------

/// What the command line is collecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    /// `:`, an ex command.
    Ex,
    /// `/` or `?`: a search pattern.
    Search(SearchDirection),
}

impl Prompt {
    /// The char shown before the input.
    #[must_use]
    pub const fn prefix(self) -> char {
        match self {
            Self::Ex => ':',
            Self::Search(dir) => dir.prefix(),
        }
    }
}

// ---------------------------------------------------------------------------
// ExCommand
// ---------------------------------------------------------------------------

/// A parsed ex command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExCommand {
    Write,
    Quit,
    /// `:wq` or `:x`.
    WriteQuit,
    /// `:e` with no argument reloads; with one it opens.
    Edit(Option<String>),
    /// `:N`, 1-indexed as typed.
    GotoLine(usize),
    /// `:set` and its argument string.
    Set(String),
    /// Anything else, kept for the error message.
    Unknown(String),
}

/// Parse a command string (without the leading `:`).
#[must_use]
pub fn parse_ex(input: &str) -> ExCommand {
    let trimmed = input.trim();

    if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return trimmed
            .parse()
            .map_or_else(|_| ExCommand::Unknown(trimmed.to_string()), ExCommand::GotoLine);
    }

    let (cmd, arg) = trimmed
        .find(char::is_whitespace)
        .map_or((trimmed, ""), |pos| (&trimmed[..pos], trimmed[pos..].trim_start()));

    match (cmd, arg.is_empty()) {
        ("w" | "write", true) => ExCommand::Write,
        ("q" | "q!" | "quit", true) => ExCommand::Quit,
        ("wq" | "x" | "xit", true) => ExCommand::WriteQuit,
        ("e" | "edit", true) => ExCommand::Edit(None),
        ("e" | "edit", false) => ExCommand::Edit(Some(arg.to_string())),
        ("se" | "set", _) => ExCommand::Set(arg.to_string()),
        _ => ExCommand::Unknown(trimmed.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CommandLine
// ---------------------------------------------------------------------------

/// The command-line input buffer: text plus a char cursor. The prefix
/// char is not stored.
#[derive(Debug, Clone)]
pub struct CommandLine {
    prompt: Prompt,
    input: String,
    cursor: usize,
}

impl CommandLine {
    /// An empty line collecting `prompt`.
    #[must_use]
    pub const fn new(prompt: Prompt) -> Self {
        Self {
            prompt,
            input: String::new(),
            cursor: 0,
        }
    }

    #[inline]
    #[must_use]
    pub const fn prompt(&self) -> Prompt {
        self.prompt
    }

    #[inline]
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Cursor position within the input (char offset).
    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.input.is_empty()
    }

    /// The line as displayed, prefix included.
    #[must_use]
    pub fn display(&self) -> String {
        format!("{}{}", self.prompt.prefix(), self.input)
    }

    // -- Editing ------------------------------------------------------------

    pub fn insert_char(&mut self, ch: char) {
        let byte_idx = self.char_to_byte(self.cursor);
        self.input.insert(byte_idx, ch);
        self.cursor += 1;
    }

    /// Delete the char before the cursor. Returns `false` at the start.
    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        let byte_idx = self.char_to_byte(self.cursor);
        self.input.remove(byte_idx);
        true
    }

    /// Delete the char under the cursor. Returns `false` at the end.
    pub fn delete(&mut self) -> bool {
        if self.cursor >= self.input.chars().count() {
            return false;
        }
        let byte_idx = self.char_to_byte(self.cursor);
        self.input.remove(byte_idx);
        true
    }

    pub const fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.input.chars().count() {
            self.cursor += 1;
        }
    }

    pub const fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.input.chars().count();
    }

    fn char_to_byte(&self, char_idx: usize) -> usize {
        self.input
            .char_indices()
            .nth(char_idx)
            .map_or(self.input.len(), |(byte_idx, _)| byte_idx)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn typed(text: &str) -> CommandLine {
        let mut line = CommandLine::new(Prompt::Ex);
        for ch in text.chars() {
            line.insert_char(ch);
        }
        line
    }

    // -- Line editing -------------------------------------------------------

    #[test]
    fn insert_in_middle() {
        let mut line = typed("wq");
        line.move_left();
        line.insert_char('x');
        assert_eq!(line.input(), "wxq");
        assert_eq!(line.cursor(), 2);
    }

    #[test]
    fn backspace_and_delete() {
        let mut line = typed("abc");
        assert!(line.backspace());
        assert_eq!(line.input(), "ab");
        assert!(!line.delete());
        line.move_home();
        assert!(!line.backspace());
        assert!(line.delete());
        assert_eq!(line.input(), "b");
    }

    #[test]
    fn unicode_cursor() {
        let mut line = typed("日本");
        line.move_left();
        line.insert_char('x');
        assert_eq!(line.input(), "日x本");
        line.move_end();
        assert_eq!(line.cursor(), 3);
        line.move_right();
        assert_eq!(line.cursor(), 3);
    }

    #[test]
    fn display_has_prefix() {
        let mut line = CommandLine::new(Prompt::Search(SearchDirection::Backward));
        line.insert_char('x');
        assert_eq!(line.display(), "?x");
        assert_eq!(typed("w").display(), ":w");
    }

    // -- parse_ex -----------------------------------------------------------

    #[test]
    fn parse_file_commands() {
        assert_eq!(parse_ex("w"), ExCommand::Write);
        assert_eq!(parse_ex(" q "), ExCommand::Quit);
        assert_eq!(parse_ex("q!"), ExCommand::Quit);
        assert_eq!(parse_ex("wq"), ExCommand::WriteQuit);
        assert_eq!(parse_ex("x"), ExCommand::WriteQuit);
        assert_eq!(parse_ex("e"), ExCommand::Edit(None));
        assert_eq!(parse_ex("e notes.txt"), ExCommand::Edit(Some("notes.txt".into())));
    }

    #[test]
    fn parse_line_number() {
        assert_eq!(parse_ex("1"), ExCommand::GotoLine(1));
        assert_eq!(parse_ex("100"), ExCommand::GotoLine(100));
        assert_eq!(parse_ex("0"), ExCommand::GotoLine(0));
    }

    #[test]
    fn parse_set() {
        assert_eq!(parse_ex("set sw=2 ic"), ExCommand::Set("sw=2 ic".into()));
        assert_eq!(parse_ex("set"), ExCommand::Set(String::new()));
    }

    #[test]
    fn parse_unknown() {
        assert_eq!(parse_ex("frobnicate"), ExCommand::Unknown("frobnicate".into()));
        assert_eq!(parse_ex("w other.txt"), ExCommand::Unknown("w other.txt".into()));
        assert_eq!(parse_ex(""), ExCommand::Unknown(String::new()));
    }
}
