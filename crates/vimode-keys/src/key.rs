// SPDX-License-Identifier: MIT
//
// Key events.
//
// The interpreter never sees raw terminal bytes or widget events. Every
// front end (the headless driver, a test, an embedding editor) hands it
// the same small structure: a key identity plus modifier flags.
//
// Control characters that arrive as plain chars (0x01..0x1A) are folded
// into `Char(letter)` + `CTRL` by `KeyEvent::from_char`, so `<C-r>` and a
// raw 0x12 byte are the same event.

use std::fmt;

use bitflags::bitflags;

// ─── Event Types ────────────────────────────────────────────────────────────

/// A keyboard event: which key, and which modifiers were held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    /// Which key was pressed.
    pub code: KeyCode,
    /// Active modifier keys.
    pub modifiers: Modifiers,
}

/// Identity of a key.
///
/// Named keys have dedicated variants; printable characters (including
/// space) use [`Char`](KeyCode::Char).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A Unicode character.
    Char(char),
    // ── Named keys ──────────────────────────────────────────────
    Enter,
    Tab,
    Backspace,
    Escape,
    Delete,
    // ── Navigation ──────────────────────────────────────────────
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
}

bitflags! {
    /// Keyboard modifier flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0000_0001;
        const ALT   = 0b0000_0010;
        const CTRL  = 0b0000_0100;
    }
}

impl KeyEvent {
    /// A key with explicit modifiers.
    #[must_use]
    pub const fn new(code: KeyCode, modifiers: Modifiers) -> Self {
        Self { code, modifiers }
    }

    /// A key with no modifiers.
    #[must_use]
    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, Modifiers::empty())
    }

    /// A printable character with no modifiers.
    #[must_use]
    pub const fn char(ch: char) -> Self {
        Self::plain(KeyCode::Char(ch))
    }

    /// `Ctrl` + a character.
    #[must_use]
    pub const fn ctrl(ch: char) -> Self {
        Self::new(KeyCode::Char(ch), Modifiers::CTRL)
    }

    /// Build an event from a raw character, decoding the ASCII control
    /// range into `Ctrl` chords and the usual whitespace controls into
    /// named keys.
    #[must_use]
    pub const fn from_char(ch: char) -> Self {
        match ch {
            '\r' | '\n' => Self::plain(KeyCode::Enter),
            '\t' => Self::plain(KeyCode::Tab),
            '\x1b' => Self::plain(KeyCode::Escape),
            '\x7f' | '\x08' => Self::plain(KeyCode::Backspace),
            '\x01'..='\x1a' => {
                // 0x01 → 'a' ... 0x1A → 'z'
                let letter = (ch as u8 - 1 + b'a') as char;
                Self::ctrl(letter)
            }
            _ => Self::char(ch),
        }
    }

    /// The character this key types, if it is a plain (or shifted)
    /// character with no `Ctrl`/`Alt` chord.
    #[must_use]
    pub fn printable(&self) -> Option<char> {
        match self.code {
            KeyCode::Char(ch) if !self.modifiers.intersects(Modifiers::CTRL | Modifiers::ALT) => {
                Some(ch)
            }
            _ => None,
        }
    }

    /// True if this is `Ctrl` + `ch` (case-insensitive on the letter).
    #[must_use]
    pub fn is_ctrl(&self, ch: char) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
            && matches!(self.code, KeyCode::Char(c) if c.eq_ignore_ascii_case(&ch))
    }
}

impl From<KeyCode> for KeyEvent {
    fn from(code: KeyCode) -> Self {
        Self::plain(code)
    }
}

impl From<char> for KeyEvent {
    fn from(ch: char) -> Self {
        Self::from_char(ch)
    }
}

// ─── Display ────────────────────────────────────────────────────────────────

/// Name used inside `<...>` for a named key, or `None` for a bare char.
const fn key_name(code: KeyCode) -> Option<&'static str> {
    match code {
        KeyCode::Char(' ') => Some("Space"),
        KeyCode::Char('<') => Some("lt"),
        KeyCode::Char(_) => None,
        KeyCode::Enter => Some("CR"),
        KeyCode::Tab => Some("Tab"),
        KeyCode::Backspace => Some("BS"),
        KeyCode::Escape => Some("Esc"),
        KeyCode::Delete => Some("Del"),
        KeyCode::Up => Some("Up"),
        KeyCode::Down => Some("Down"),
        KeyCode::Left => Some("Left"),
        KeyCode::Right => Some("Right"),
        KeyCode::Home => Some("Home"),
        KeyCode::End => Some("End"),
    }
}

/// Formats the event in the same `<C-x>` notation that
/// [`parse_keys`](crate::parse_keys) reads, so the two round-trip.
impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let chord = self.modifiers.intersects(Modifiers::CTRL | Modifiers::ALT);
        let name = key_name(self.code);

        if let (false, None, KeyCode::Char(ch)) = (chord, name, self.code) {
            return write!(f, "{ch}");
        }

        f.write_str("<")?;
        if self.modifiers.contains(Modifiers::CTRL) {
            f.write_str("C-")?;
        }
        if self.modifiers.contains(Modifiers::ALT) {
            f.write_str("A-")?;
        }
        if self.modifiers.contains(Modifiers::SHIFT) && name.is_some() {
            f.write_str("S-")?;
        }
        match (name, self.code) {
            (Some(name), _) => f.write_str(name)?,
            (None, KeyCode::Char(ch)) => write!(f, "{ch}")?,
            (None, _) => {}
        }
        f.write_str(">")
    }
}
