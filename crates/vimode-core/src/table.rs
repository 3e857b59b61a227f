//! The Normal-mode command table.
//!
//! Every command token (one char, or one of the fixed two-char pairs) maps
//! to a [`Descriptor`]: the token text and a tagged [`Binding`] saying what
//! the token does. The grammar reads [`Descriptor::category`] and
//! [`Descriptor::arity`] to decide whether a token completes a command,
//! waits for a motion, or waits for one more char.
//!
//! Named keys are folded into tokens by [`key_token`] before lookup: the
//! arrows become `h` `j` `k` `l`, and Backspace, Enter and `Ctrl-R` become
//! the control chars [`BACKSPACE`], [`ENTER`] and [`REDO`].

use vimode_keys::{KeyCode, KeyEvent};

use crate::motion::Motion;
use crate::operator::Operator;

/// Token for the Backspace key.
pub const BACKSPACE: char = '\x08';
/// Token for the Enter key.
pub const ENTER: char = '\r';
/// Token for `Ctrl-R`.
pub const REDO: char = '\x12';

// ---------------------------------------------------------------------------
// Bindings
// ---------------------------------------------------------------------------

/// Commands that act immediately and are neither motions nor operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direct {
    /// `x`
    DeleteChar,
    /// `D`
    DeleteToEnd,
    /// `C`
    ChangeToEnd,
    /// `J`
    Join,
    /// `~`
    ToggleCase,
    /// `r<ch>`
    Replace(char),
    /// `p`
    PasteAfter,
    /// `P`
    PasteBefore,
    /// `u`
    Undo,
    /// `Ctrl-R`
    Redo,
    /// `gt`
    NextBuffer,
    /// `gT`
    PreviousBuffer,
    /// `ZZ`
    SaveAndClose,
    /// `zz`
    CenterLine,
}

/// Commands that change mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeSwitch {
    /// `i`
    Insert,
    /// `a`
    Append,
    /// `A`
    AppendEnd,
    /// `I`
    InsertStart,
    /// `o`
    OpenBelow,
    /// `O`
    OpenAbove,
    /// `v`
    VisualChar,
    /// `V`
    VisualLine,
    /// `:`
    CommandLine,
    /// `/`
    SearchForward,
    /// `?`
    SearchBackward,
}

/// What a token does.
#[derive(Debug, Clone, Copy)]
pub enum Binding {
    Motion(Motion),
    /// A motion that takes a char argument (`f`, `F`).
    MotionWithChar(fn(char) -> Motion),
    Operator(Operator),
    /// A doubled operator (`dd`, `>>`): the operator over `count` lines.
    Linewise(Operator),
    Direct(Direct),
    /// A direct command that takes a char argument (`r`).
    DirectWithChar(fn(char) -> Direct),
    Mode(ModeSwitch),
    /// `"`, followed by a register name.
    Register,
}

/// Broad class of a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Motion,
    Operator,
    Direct,
    ModeSwitch,
    Prefix,
}

/// How many argument chars follow the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    None,
    Char,
}

impl Binding {
    #[must_use]
    pub const fn category(self) -> Category {
        match self {
            Self::Motion(_) | Self::MotionWithChar(_) => Category::Motion,
            Self::Operator(_) | Self::Linewise(_) => Category::Operator,
            Self::Direct(_) | Self::DirectWithChar(_) => Category::Direct,
            Self::Mode(_) => Category::ModeSwitch,
            Self::Register => Category::Prefix,
        }
    }

    #[must_use]
    pub const fn arity(self) -> Arity {
        match self {
            Self::MotionWithChar(_) | Self::DirectWithChar(_) | Self::Register => Arity::Char,
            _ => Arity::None,
        }
    }
}

/// One row of the table.
#[derive(Debug, Clone, Copy)]
pub struct Descriptor {
    pub token: &'static str,
    pub binding: Binding,
}

impl Descriptor {
    #[must_use]
    pub const fn category(&self) -> Category {
        self.binding.category()
    }

    #[must_use]
    pub const fn arity(&self) -> Arity {
        self.binding.arity()
    }
}

const fn row(token: &'static str, binding: Binding) -> Descriptor {
    Descriptor { token, binding }
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

static NORMAL: &[Descriptor] = &[
    // Motions
    row("h", Binding::Motion(Motion::Left)),
    row("l", Binding::Motion(Motion::Right)),
    row("j", Binding::Motion(Motion::Down)),
    row("k", Binding::Motion(Motion::Up)),
    row("\x08", Binding::Motion(Motion::CharBackward)),
    row(" ", Binding::Motion(Motion::CharForward)),
    row("\r", Binding::Motion(Motion::Down)),
    row("0", Binding::Motion(Motion::LineStart)),
    row("^", Binding::Motion(Motion::FirstNonBlank)),
    row("$", Binding::Motion(Motion::LineEnd)),
    row("w", Binding::Motion(Motion::WordForward)),
    row("b", Binding::Motion(Motion::WordBackward)),
    row("e", Binding::Motion(Motion::WordEnd)),
    row("f", Binding::MotionWithChar(Motion::FindForward)),
    row("F", Binding::MotionWithChar(Motion::FindBackward)),
    row("gg", Binding::Motion(Motion::FirstLine)),
    row("G", Binding::Motion(Motion::LastLine)),
    row("H", Binding::Motion(Motion::ScreenTop)),
    row("M", Binding::Motion(Motion::ScreenMiddle)),
    row("L", Binding::Motion(Motion::ScreenBottom)),
    row("%", Binding::Motion(Motion::MatchBracket)),
    row("n", Binding::Motion(Motion::SearchNext)),
    row("N", Binding::Motion(Motion::SearchPrev)),
    // Operators
    row("d", Binding::Operator(Operator::Delete)),
    row("c", Binding::Operator(Operator::Change)),
    row("y", Binding::Operator(Operator::Yank)),
    row(">", Binding::Operator(Operator::Indent)),
    row("<", Binding::Operator(Operator::Outdent)),
    row("dd", Binding::Linewise(Operator::Delete)),
    row("cc", Binding::Linewise(Operator::Change)),
    row("yy", Binding::Linewise(Operator::Yank)),
    row(">>", Binding::Linewise(Operator::Indent)),
    row("<<", Binding::Linewise(Operator::Outdent)),
    // Direct
    row("x", Binding::Direct(Direct::DeleteChar)),
    row("D", Binding::Direct(Direct::DeleteToEnd)),
    row("C", Binding::Direct(Direct::ChangeToEnd)),
    row("J", Binding::Direct(Direct::Join)),
    row("~", Binding::Direct(Direct::ToggleCase)),
    row("r", Binding::DirectWithChar(Direct::Replace)),
    row("p", Binding::Direct(Direct::PasteAfter)),
    row("P", Binding::Direct(Direct::PasteBefore)),
    row("u", Binding::Direct(Direct::Undo)),
    row("\x12", Binding::Direct(Direct::Redo)),
    row("gt", Binding::Direct(Direct::NextBuffer)),
    row("gT", Binding::Direct(Direct::PreviousBuffer)),
    row("ZZ", Binding::Direct(Direct::SaveAndClose)),
    row("zz", Binding::Direct(Direct::CenterLine)),
    // Mode switches
    row("i", Binding::Mode(ModeSwitch::Insert)),
    row("a", Binding::Mode(ModeSwitch::Append)),
    row("A", Binding::Mode(ModeSwitch::AppendEnd)),
    row("I", Binding::Mode(ModeSwitch::InsertStart)),
    row("o", Binding::Mode(ModeSwitch::OpenBelow)),
    row("O", Binding::Mode(ModeSwitch::OpenAbove)),
    row("v", Binding::Mode(ModeSwitch::VisualChar)),
    row("V", Binding::Mode(ModeSwitch::VisualLine)),
    row(":", Binding::Mode(ModeSwitch::CommandLine)),
    row("/", Binding::Mode(ModeSwitch::SearchForward)),
    row("?", Binding::Mode(ModeSwitch::SearchBackward)),
    // Prefixes
    row("\"", Binding::Register),
];

/// The descriptor for `token`.
#[must_use]
pub fn lookup(token: &str) -> Option<&'static Descriptor> {
    NORMAL.iter().find(|d| d.token == token)
}

/// True for a char that only starts two-char tokens (`g`, `Z`, `z`).
#[must_use]
pub fn is_pair_prefix(ch: char) -> bool {
    let mut buf = [0; 4];
    let single: &str = ch.encode_utf8(&mut buf);
    lookup(single).is_none()
        && NORMAL
            .iter()
            .any(|d| d.token.len() > single.len() && d.token.starts_with(single))
}

/// The token char a key stands for, or `None` for keys with no Normal-mode
/// meaning.
#[must_use]
pub fn key_token(key: &KeyEvent) -> Option<char> {
    if key.is_ctrl('r') {
        return Some(REDO);
    }
    match key.code {
        KeyCode::Left => Some('h'),
        KeyCode::Right => Some('l'),
        KeyCode::Up => Some('k'),
        KeyCode::Down => Some('j'),
        KeyCode::Backspace => Some(BACKSPACE),
        KeyCode::Enter => Some(ENTER),
        _ => key.printable(),
    }
}
