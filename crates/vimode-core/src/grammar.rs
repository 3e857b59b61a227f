//! Key grammar: turns keystrokes into complete [`Command`]s.
//!
//! A Normal-mode command is
//!
//! ```text
//! [count] ["x] token [arg]
//! [count] ["x] operator ["x] [count] (motion [arg] | i/a delimiter | operator)
//! ```
//!
//! The [`Parser`] is a plain value. [`Parser::feed`] consumes it together
//! with one key and hands back the next parser plus a [`Parse`] verdict, so
//! the session only stores the parser between keys and never mutates it in
//! place.
//!
//! Both counts default to 1 and multiply: `2d3w` deletes six words. A
//! command with no count at all reports `count: None`, which some commands
//! (`G`, `gg`, `J`) treat differently from an explicit 1.

use tracing::trace;
use vimode_keys::{KeyCode, KeyEvent};

use crate::motion::Motion;
use crate::operator::Operator;
use crate::table::{self, Arity, Binding, Category, Direct, ModeSwitch};
use crate::text_object::TextObject;

/// Which mode the keys are typed in. Visual mode applies operators to the
/// selection at once and accepts text objects without an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Context {
    Normal,
    Visual,
}

/// What an operator acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Motion(Motion),
    Object(TextObject),
}

/// A parsed command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Move(Motion),
    Operate(Operator, Target),
    /// `dd`, `>>` and friends: the operator over `count` whole lines.
    OperateLines(Operator),
    /// An operator typed in Visual mode.
    OperateSelection(Operator),
    /// `i(`, `a"`, … typed in Visual mode.
    SelectObject(TextObject),
    Direct(Direct),
    Switch(ModeSwitch),
}

/// A complete command with its prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    /// Product of both counts, or `None` when no count was typed.
    pub count: Option<usize>,
    pub register: Option<char>,
    pub action: Action,
}

impl Command {
    /// The count, defaulting to 1.
    #[must_use]
    pub fn times(&self) -> usize {
        self.count.unwrap_or(1).max(1)
    }
}

/// Result of feeding one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parse {
    /// More keys are needed.
    Pending,
    Complete(Command),
    /// The keys so far do not form a command; they are dropped.
    Invalid,
}

/// What the next key is read as.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Phase {
    /// Counts, a register, an operator or a command token.
    #[default]
    Idle,
    /// The register name after `"`.
    Register,
    /// The second char of a two-char token.
    Pair(char),
    /// The argument char of `f`, `F` or `r`.
    Char(char),
    /// The delimiter after `i` or `a`.
    Object(char),
}

/// Partial command state between keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parser {
    count: Option<usize>,
    register: Option<char>,
    operator: Option<Operator>,
    motion_count: Option<usize>,
    phase: Phase,
    typed: String,
}

/// Largest count a command takes; longer digit runs are clipped.
pub const MAX_COUNT: usize = 99_999;

fn push_digit(count: Option<usize>, digit: u32) -> Option<usize> {
    Some(
        count
            .unwrap_or(0)
            .saturating_mul(10)
            .saturating_add(digit as usize)
            .min(MAX_COUNT),
    )
}

const fn merge_counts(a: Option<usize>, b: Option<usize>) -> Option<usize> {
    match (a, b) {
        (None, None) => None,
        (Some(x), None) => Some(x),
        (None, Some(y)) => Some(y),
        (Some(x), Some(y)) => {
            let n = x.saturating_mul(y);
            Some(if n > MAX_COUNT { MAX_COUNT } else { n })
        }
    }
}

impl Parser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The keys typed so far for the pending command, for display.
    #[must_use]
    pub fn pending_keys(&self) -> &str {
        &self.typed
    }

    /// True when no key of a command has been read yet.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        *self == Self::default()
    }

    /// Read one key.
    #[must_use]
    pub fn feed(mut self, key: &KeyEvent, ctx: Context) -> (Self, Parse) {
        trace!(key = %key, phase = ?self.phase, "parse key");
        if key.code == KeyCode::Escape {
            return (Self::default(), Parse::Invalid);
        }
        let Some(ch) = table::key_token(key) else {
            return (Self::default(), Parse::Invalid);
        };
        self.typed.push_str(&key.to_string());

        match self.phase {
            Phase::Idle => self.idle(ch, ctx),
            Phase::Register => match key.printable() {
                Some(name) => {
                    self.register = Some(name);
                    self.phase = Phase::Idle;
                    (self, Parse::Pending)
                }
                None => (Self::default(), Parse::Invalid),
            },
            Phase::Pair(first) => self.pair(first, key, ctx),
            Phase::Char(cmd) => match key.printable() {
                Some(arg) => self.with_char(cmd, arg),
                None => (Self::default(), Parse::Invalid),
            },
            Phase::Object(scope) => {
                let object = key.printable().and_then(|d| TextObject::from_keys(scope, d));
                match (object, self.operator) {
                    (Some(obj), Some(op)) => self.complete(Action::Operate(op, Target::Object(obj))),
                    (Some(obj), None) => self.complete(Action::SelectObject(obj)),
                    (None, _) => (Self::default(), Parse::Invalid),
                }
            }
        }
    }

    fn idle(mut self, ch: char, ctx: Context) -> (Self, Parse) {
        let counting = if self.operator.is_some() {
            &mut self.motion_count
        } else {
            &mut self.count
        };
        if let Some(digit) = ch.to_digit(10) {
            if digit != 0 || counting.is_some() {
                *counting = push_digit(*counting, digit);
                return (self, Parse::Pending);
            }
        }

        if ch == '"' {
            self.phase = Phase::Register;
            return (self, Parse::Pending);
        }

        if let Some(op) = self.operator {
            return self.after_operator(op, ch);
        }

        if ctx == Context::Visual && matches!(ch, 'i' | 'a') {
            self.phase = Phase::Object(ch);
            return (self, Parse::Pending);
        }
        if table::is_pair_prefix(ch) {
            self.phase = Phase::Pair(ch);
            return (self, Parse::Pending);
        }

        let mut token = [0; 4];
        let Some(desc) = table::lookup(ch.encode_utf8(&mut token)) else {
            return (Self::default(), Parse::Invalid);
        };
        match (desc.category(), desc.arity()) {
            (Category::Prefix, _) => {
                self.phase = Phase::Register;
                (self, Parse::Pending)
            }
            (_, Arity::Char) => {
                self.phase = Phase::Char(ch);
                (self, Parse::Pending)
            }
            (Category::Operator, _) => match desc.binding {
                Binding::Operator(op) if ctx == Context::Visual => {
                    self.complete(Action::OperateSelection(op))
                }
                Binding::Operator(op) => {
                    self.operator = Some(op);
                    (self, Parse::Pending)
                }
                binding => self.complete_binding(binding),
            },
            _ => self.complete_binding(desc.binding),
        }
    }

    fn after_operator(mut self, op: Operator, ch: char) -> (Self, Parse) {
        if ch == op.key() {
            return self.complete(Action::OperateLines(op));
        }
        if matches!(ch, 'i' | 'a') {
            self.phase = Phase::Object(ch);
            return (self, Parse::Pending);
        }
        if table::is_pair_prefix(ch) {
            self.phase = Phase::Pair(ch);
            return (self, Parse::Pending);
        }
        let mut token = [0; 4];
        let Some(desc) = table::lookup(ch.encode_utf8(&mut token)) else {
            return (Self::default(), Parse::Invalid);
        };
        match (desc.category(), desc.arity()) {
            (Category::Motion, Arity::Char) => {
                self.phase = Phase::Char(ch);
                (self, Parse::Pending)
            }
            (Category::Motion, Arity::None) => self.complete_binding(desc.binding),
            _ => (Self::default(), Parse::Invalid),
        }
    }

    fn pair(self, first: char, key: &KeyEvent, ctx: Context) -> (Self, Parse) {
        let token: String = key
            .printable()
            .map(|second| [first, second].iter().collect())
            .unwrap_or_default();
        match table::lookup(&token) {
            Some(desc) => self.complete_binding(desc.binding),
            None if self.operator.is_some() => (Self::default(), Parse::Invalid),
            None => Self::default().feed(key, ctx),
        }
    }

    fn with_char(self, cmd: char, arg: char) -> (Self, Parse) {
        let mut token = [0; 4];
        match table::lookup(cmd.encode_utf8(&mut token)).map(|d| d.binding) {
            Some(Binding::MotionWithChar(make)) => self.complete_binding(Binding::Motion(make(arg))),
            Some(Binding::DirectWithChar(make)) => self.complete_binding(Binding::Direct(make(arg))),
            _ => (Self::default(), Parse::Invalid),
        }
    }

    /// Finish with a table binding, folding in a pending operator.
    fn complete_binding(self, binding: Binding) -> (Self, Parse) {
        let action = match (self.operator, binding) {
            (Some(op), Binding::Motion(motion)) => Action::Operate(op, Target::Motion(motion)),
            (Some(op), Binding::Linewise(other)) if op == other => Action::OperateLines(op),
            (Some(_), _) => return (Self::default(), Parse::Invalid),
            (None, Binding::Motion(motion)) => Action::Move(motion),
            (None, Binding::Linewise(op)) => Action::OperateLines(op),
            (None, Binding::Direct(direct)) => Action::Direct(direct),
            (None, Binding::Mode(switch)) => Action::Switch(switch),
            (None, _) => return (Self::default(), Parse::Invalid),
        };
        self.complete(action)
    }

    fn complete(self, action: Action) -> (Self, Parse) {
        let command = Command {
            count: merge_counts(self.count, self.motion_count),
            register: self.register,
            action,
        };
        (Self::default(), Parse::Complete(command))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
