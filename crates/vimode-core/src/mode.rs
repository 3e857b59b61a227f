//! Editing modes.
//!
//! The interpreter is always in exactly one [`Mode`]:
//!
//! | Mode        | Keys are...                        | Cursor limit       |
//! |-------------|------------------------------------|--------------------|
//! | Normal      | commands                           | `0..line_len-1`    |
//! | Insert      | passed through to the host         | `0..line_len`      |
//! | Visual      | commands; motions move the far end | `0..line_len`      |
//! | Command     | typed into the `:`/`/`/`?` line    | (on command line)  |

use std::fmt;

use crate::position::RangeKind;

// ---------------------------------------------------------------------------
// VisualKind
// ---------------------------------------------------------------------------

/// The sub-mode of visual selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisualKind {
    /// `v`: character-wise selection.
    Char,
    /// `V`: whole lines.
    Line,
}

impl VisualKind {
    /// How an operator reads a selection of this kind.
    #[must_use]
    pub const fn range_kind(self) -> RangeKind {
        match self {
            Self::Char => RangeKind::Inclusive,
            Self::Line => RangeKind::Linewise,
        }
    }
}

// ---------------------------------------------------------------------------
// Mode
// ---------------------------------------------------------------------------

/// The current editing mode. Pure data; transitions live in the session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    #[default]
    Normal,
    Insert,
    Visual(VisualKind),
    /// Typing a `:` command or a `/` `?` search.
    Command,
}

impl Mode {
    /// Label for the status line.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Insert => "INSERT",
            Self::Visual(VisualKind::Char) => "VISUAL",
            Self::Visual(VisualKind::Line) => "VISUAL LINE",
            Self::Command => "COMMAND",
        }
    }

    /// True if the cursor may sit one past the last char.
    #[inline]
    #[must_use]
    pub const fn cursor_past_end(self) -> bool {
        matches!(self, Self::Insert | Self::Visual(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_visual(self) -> bool {
        matches!(self, Self::Visual(_))
    }

    /// The visual sub-mode, if any.
    #[must_use]
    pub const fn visual_kind(self) -> Option<VisualKind> {
        match self {
            Self::Visual(kind) => Some(kind),
            _ => None,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_normal() {
        assert_eq!(Mode::default(), Mode::Normal);
    }

    #[test]
    fn display_names() {
        assert_eq!(Mode::Normal.to_string(), "NORMAL");
        assert_eq!(Mode::Visual(VisualKind::Line).to_string(), "VISUAL LINE");
        assert_eq!(Mode::Command.display_name(), "COMMAND");
    }

    #[test]
    fn cursor_limits() {
        assert!(!Mode::Normal.cursor_past_end());
        assert!(Mode::Insert.cursor_past_end());
        assert!(Mode::Visual(VisualKind::Char).cursor_past_end());
    }

    #[test]
    fn visual_queries() {
        assert_eq!(Mode::Visual(VisualKind::Char).visual_kind(), Some(VisualKind::Char));
        assert_eq!(Mode::Insert.visual_kind(), None);
        assert!(!Mode::Command.is_visual());
        assert_eq!(VisualKind::Line.range_kind(), RangeKind::Linewise);
    }
}
