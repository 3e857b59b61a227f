//! Motions: where a key moves the cursor, and how an operator reads it.
//!
//! A [`Motion`] resolves against a buffer into a [`Jump`]: the target
//! position plus the [`RangeKind`] an operator applies between the cursor
//! and that target. The same resolution serves plain cursor movement,
//! extending a visual selection, and operator targets.
//!
//! Resolution never fails on out-of-range input; positions clamp. It
//! returns `None` only when the motion cannot apply at all (`fx` with no
//! `x` on the line, `n` without a pattern, `H` under an operator, `j` on the
//! last line), in which case nothing moves and a pending operator is
//! dropped.

use crate::host::{self, TextBuffer};
use crate::position::{Position, RangeKind};
use crate::search::{self, Pattern, SearchDirection};
use crate::text_object;
use crate::word;

/// A cursor motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    /// `h`, Left. Stops at column 0.
    Left,
    /// `l`, Right. Stops at the end of the line.
    Right,
    /// Backspace. Walks back through the buffer, across lines.
    CharBackward,
    /// Space. Walks forward through the buffer, across lines.
    CharForward,
    /// `j`, Down, Enter.
    Down,
    /// `k`, Up.
    Up,
    /// `0`.
    LineStart,
    /// `^`.
    FirstNonBlank,
    /// `$`.
    LineEnd,
    /// `w`.
    WordForward,
    /// `b`.
    WordBackward,
    /// `e`.
    WordEnd,
    /// `f<ch>`.
    FindForward(char),
    /// `F<ch>`.
    FindBackward(char),
    /// `gg`.
    FirstLine,
    /// `G`.
    LastLine,
    /// `H`.
    ScreenTop,
    /// `M`.
    ScreenMiddle,
    /// `L`.
    ScreenBottom,
    /// `%`.
    MatchBracket,
    /// `n`.
    SearchNext,
    /// `N`.
    SearchPrev,
}

/// A resolved motion target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Jump {
    pub pos: Position,
    pub kind: RangeKind,
}

impl Jump {
    const fn exclusive(pos: Position) -> Self {
        Self {
            pos,
            kind: RangeKind::Exclusive,
        }
    }

    const fn inclusive(pos: Position) -> Self {
        Self {
            pos,
            kind: RangeKind::Inclusive,
        }
    }

    const fn linewise(pos: Position) -> Self {
        Self {
            pos,
            kind: RangeKind::Linewise,
        }
    }
}

/// What a motion needs to know besides the buffer and the start position.
#[derive(Debug, Clone, Copy)]
pub struct MotionEnv<'a> {
    /// The typed count, if any.
    pub count: Option<usize>,
    /// True when the motion is an operator target.
    pub operator: bool,
    /// True when the cursor may rest on the end-of-line column (Visual
    /// mode and operator targets).
    pub past_end: bool,
    /// Column remembered across vertical moves. `usize::MAX` after `$`
    /// means "end of whatever line we land on".
    pub sticky_col: Option<usize>,
    /// The armed search, for `n` and `N`.
    pub search: Option<(&'a Pattern, SearchDirection)>,
    pub wrapscan: bool,
}

impl MotionEnv<'_> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            count: None,
            operator: false,
            past_end: false,
            sticky_col: None,
            search: None,
            wrapscan: true,
        }
    }

    fn times(&self) -> usize {
        self.count.unwrap_or(1).max(1)
    }
}

impl Default for MotionEnv<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl Motion {
    /// True for `j`/`k`, which keep the sticky column alive.
    #[must_use]
    pub const fn is_vertical(self) -> bool {
        matches!(self, Self::Down | Self::Up)
    }

    /// Resolve against `buf` starting at `from`.
    #[must_use]
    pub fn resolve<B: TextBuffer + ?Sized>(
        self,
        buf: &B,
        from: Position,
        env: &MotionEnv<'_>,
    ) -> Option<Jump> {
        let n = env.times();
        let len = host::line_len(buf, from.line);

        match self {
            Self::Left => Some(Jump::exclusive(from.with_col(from.col.saturating_sub(n)))),
            Self::Right => {
                let limit = if env.operator { len } else { len.saturating_sub(1) };
                let col = from.col.saturating_add(n).min(limit).max(from.col);
                Some(Jump::exclusive(from.with_col(col)))
            }
            Self::CharBackward => Some(Jump::exclusive(step_chars(buf, from, n, false, env.past_end))),
            Self::CharForward => Some(Jump::exclusive(step_chars(buf, from, n, true, env.past_end))),
            Self::Down | Self::Up => vertical(buf, from, n, self == Self::Down, env),
            Self::LineStart => Some(Jump::exclusive(from.with_col(0))),
            Self::FirstNonBlank => {
                Some(Jump::exclusive(from.with_col(host::first_non_blank(buf, from.line))))
            }
            Self::LineEnd => Some(line_end(buf, from, n, env)),
            Self::WordForward => Some(Jump::exclusive(word_forward_n(buf, from, n, env.operator))),
            Self::WordBackward => {
                let pos = (0..n).fold(from, |cur, _| word::word_backward(buf, cur));
                Some(Jump::exclusive(pos))
            }
            Self::WordEnd => {
                let pos = (0..n).fold(from, |cur, _| word::word_end_forward(buf, cur));
                Some(Jump::inclusive(pos))
            }
            Self::FindForward(ch) => buf
                .line_text(from.line)
                .chars()
                .enumerate()
                .skip(from.col + 1)
                .filter(|&(_, c)| c == ch)
                .nth(n - 1)
                .map(|(col, _)| Jump::inclusive(from.with_col(col))),
            Self::FindBackward(ch) => {
                let text: Vec<char> = buf.line_text(from.line).chars().collect();
                text.iter()
                    .enumerate()
                    .take(from.col.min(text.len()))
                    .rev()
                    .filter(|&(_, &c)| c == ch)
                    .nth(n - 1)
                    .map(|(col, _)| Jump::exclusive(from.with_col(col)))
            }
            Self::FirstLine | Self::LastLine => {
                let last = host::last_line(buf);
                let line = match (env.count, self) {
                    (Some(count), _) => count.saturating_sub(1).min(last),
                    (None, Self::FirstLine) => 0,
                    (None, _) => last,
                };
                Some(Jump::linewise(Position::new(line, host::first_non_blank(buf, line))))
            }
            Self::ScreenTop | Self::ScreenMiddle | Self::ScreenBottom => {
                if env.operator {
                    return None;
                }
                Some(Jump::exclusive(screen_line(buf, self, n)))
            }
            Self::MatchBracket => text_object::match_bracket(buf, from).map(Jump::inclusive),
            Self::SearchNext | Self::SearchPrev => {
                let (pattern, stored) = env.search?;
                let direction = if self == Self::SearchNext { stored } else { stored.opposite() };
                let mut cur = from;
                for _ in 0..n {
                    cur = search::find(buf, pattern, cur, direction, env.wrapscan)?;
                }
                Some(Jump::exclusive(cur))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Space / Backspace: step `n` chars through the buffer. End-of-line
/// columns are skipped unless the cursor may rest there; empty lines are
/// always stops.
fn step_chars<B: TextBuffer + ?Sized>(
    buf: &B,
    from: Position,
    n: usize,
    forward: bool,
    past_end: bool,
) -> Position {
    let step = |pos| {
        if forward {
            host::next_pos(buf, pos)
        } else {
            host::prev_pos(buf, pos)
        }
    };
    let mut cur = from;
    for _ in 0..n {
        let mut next = step(cur);
        while let Some(pos) = next {
            let len = host::line_len(buf, pos.line);
            if past_end || len == 0 || pos.col < len {
                break;
            }
            next = step(pos);
        }
        match next {
            Some(pos) => cur = pos,
            None => break,
        }
    }
    cur
}

fn vertical<B: TextBuffer + ?Sized>(
    buf: &B,
    from: Position,
    n: usize,
    down: bool,
    env: &MotionEnv<'_>,
) -> Option<Jump> {
    let line = if down {
        from.line.saturating_add(n).min(host::last_line(buf))
    } else {
        from.line.saturating_sub(n)
    };
    if line == from.line {
        return None;
    }

    let want = env.sticky_col.unwrap_or(from.col);
    let col = if want == usize::MAX {
        host::max_col(buf, line, env.past_end)
    } else {
        want.min(host::max_col(buf, line, false))
    };
    let pos = Position::new(line, col);
    Some(if env.operator { Jump::linewise(pos) } else { Jump::exclusive(pos) })
}

fn line_end<B: TextBuffer + ?Sized>(buf: &B, from: Position, n: usize, env: &MotionEnv<'_>) -> Jump {
    let line = (from.line + n - 1).min(host::last_line(buf));
    let len = host::line_len(buf, line);
    if env.operator {
        return if len == 0 {
            Jump::exclusive(Position::new(line, 0))
        } else {
            Jump::inclusive(Position::new(line, len - 1))
        };
    }
    let col = if env.past_end { len } else { len.saturating_sub(1) };
    Jump::inclusive(Position::new(line, col))
}

/// `w` repeated. As an operator target the last word of a line does not
/// swallow the line break: the target stops at the end of the line.
fn word_forward_n<B: TextBuffer + ?Sized>(buf: &B, from: Position, n: usize, operator: bool) -> Position {
    let mut cur = from;
    for i in 0..n {
        let next = word::word_forward(buf, cur);
        if operator && i + 1 == n && next.line > cur.line {
            let len = host::line_len(buf, cur.line);
            if len > 0 {
                return Position::new(cur.line, len);
            }
        }
        cur = next;
    }
    cur
}

fn screen_line<B: TextBuffer + ?Sized>(buf: &B, motion: Motion, n: usize) -> Position {
    let first = buf.first_visible_line().min(host::last_line(buf));
    let last = buf.last_visible_line().min(host::last_line(buf)).max(first);
    let line = match motion {
        Motion::ScreenTop => (first + n - 1).min(last),
        Motion::ScreenBottom => last.saturating_sub(n - 1).max(first),
        _ => first + (last - first) / 2,
    };
    Position::new(line, 0)
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

    fn go(ws: &Workspace, motion: Motion, from: Position, count: Option<usize>) -> Option<Position> {
        let env = MotionEnv {
            count,
            ..MotionEnv::new()
        };
        motion.resolve(ws, from, &env).map(|jump| jump.pos)
    }

    fn target(ws: &Workspace, motion: Motion, from: Position, count: Option<usize>) -> Option<Jump> {
        let env = MotionEnv {
            count,
            operator: true,
            past_end: true,
            ..MotionEnv::new()
        };
        motion.resolve(ws, from, &env)
    }

    // -- Horizontal ---------------------------------------------------------

    #[test]
    fn h_and_l_clamp() {
        let ws = Workspace::from_text(TEXT);
        assert_eq!(go(&ws, Motion::Left, p(1, 2), None), Some(p(1, 1)));
        assert_eq!(go(&ws, Motion::Left, p(1, 2), Some(9)), Some(p(1, 0)));
        assert_eq!(go(&ws, Motion::Right, p(1, 0), Some(10)), Some(p(1, 5)));
        assert_eq!(go(&ws, Motion::Right, p(1, 5), None), Some(p(1, 5)));
    }

    #[test]
    fn l_under_operator_reaches_line_end() {
        let ws = Workspace::from_text("abc");
        let jump = target(&ws, Motion::Right, p(0, 1), Some(5));
        assert_eq!(jump, Some(Jump::exclusive(p(0, 3))));
    }

    #[test]
    fn space_and_backspace_cross_lines() {
        let ws = Workspace::from_text(TEXT);
        assert_eq!(go(&ws, Motion::CharForward, p(2, 5), None), Some(p(3, 0)));
        assert_eq!(go(&ws, Motion::CharBackward, p(3, 0), None), Some(p(2, 5)));
        assert_eq!(go(&ws, Motion::CharForward, p(4, 5), None), Some(p(4, 5)));
    }

    #[test]
    fn backspace_in_visual_lands_on_newline() {
        let ws = Workspace::from_text(TEXT);
        let env = MotionEnv {
            past_end: true,
            ..MotionEnv::new()
        };
        let jump = Motion::CharBackward.resolve(&ws, p(3, 0), &env);
        assert_eq!(jump.map(|j| j.pos), Some(p(2, 6)));
    }

    #[test]
    fn find_char_forward_and_back() {
        let ws = Workspace::from_text("line 2 line");
        assert_eq!(go(&ws, Motion::FindForward('e'), p(0, 0), None), Some(p(0, 3)));
        assert_eq!(go(&ws, Motion::FindForward('e'), p(0, 0), Some(2)), Some(p(0, 10)));
        assert_eq!(go(&ws, Motion::FindForward('z'), p(0, 0), None), None);
        assert_eq!(go(&ws, Motion::FindBackward('i'), p(0, 5), None), Some(p(0, 1)));
        let jump = target(&ws, Motion::FindBackward('i'), p(0, 5), None);
        assert_eq!(jump.map(|j| j.kind), Some(RangeKind::Exclusive));
    }

    #[test]
    fn line_start_and_first_non_blank() {
        let ws = Workspace::from_text(TEXT);
        assert_eq!(go(&ws, Motion::LineStart, p(0, 5), None), Some(p(0, 0)));
        assert_eq!(go(&ws, Motion::FirstNonBlank, p(0, 5), None), Some(p(0, 3)));
    }

    // -- $ ------------------------------------------------------------------

    #[test]
    fn dollar_by_context() {
        let ws = Workspace::from_text("line 2\n\nx");
        assert_eq!(go(&ws, Motion::LineEnd, p(0, 0), None), Some(p(0, 5)));
        assert_eq!(go(&ws, Motion::LineEnd, p(0, 0), Some(3)), Some(p(2, 0)));

        let visual = MotionEnv {
            past_end: true,
            ..MotionEnv::new()
        };
        let jump = Motion::LineEnd.resolve(&ws, p(0, 2), &visual);
        assert_eq!(jump, Some(Jump::inclusive(p(0, 6))));

        assert_eq!(target(&ws, Motion::LineEnd, p(0, 2), None), Some(Jump::inclusive(p(0, 5))));
        assert_eq!(target(&ws, Motion::LineEnd, p(1, 0), None), Some(Jump::exclusive(p(1, 0))));
    }

    // -- Vertical -----------------------------------------------------------

    #[test]
    fn j_and_k_clamp_column() {
        let ws = Workspace::from_text("long line\nab\nlong line");
        assert_eq!(go(&ws, Motion::Down, p(0, 6), None), Some(p(1, 1)));
        assert_eq!(go(&ws, Motion::Up, p(2, 6), Some(2)), Some(p(0, 6)));
        assert_eq!(go(&ws, Motion::Down, p(2, 0), None), None);
        assert_eq!(go(&ws, Motion::Down, p(0, 0), Some(10)), Some(p(2, 0)));
    }

    #[test]
    fn sticky_column_survives_short_line() {
        let ws = Workspace::from_text("long line\nab\nlong line");
        let env = MotionEnv {
            sticky_col: Some(6),
            ..MotionEnv::new()
        };
        let jump = Motion::Down.resolve(&ws, p(1, 1), &env);
        assert_eq!(jump.map(|j| j.pos), Some(p(2, 6)));
    }

    #[test]
    fn sticky_end_of_line_follows_length() {
        let ws = Workspace::from_text("ab\nlong line");
        let env = MotionEnv {
            sticky_col: Some(usize::MAX),
            ..MotionEnv::new()
        };
        let jump = Motion::Down.resolve(&ws, p(0, 1), &env);
        assert_eq!(jump.map(|j| j.pos), Some(p(1, 8)));
    }

    #[test]
    fn j_is_linewise_under_operator() {
        let ws = Workspace::from_text(TEXT);
        let jump = target(&ws, Motion::Down, p(1, 2), None);
        assert_eq!(jump.map(|j| j.kind), Some(RangeKind::Linewise));
    }

    // -- Words --------------------------------------------------------------

    #[test]
    fn counted_words() {
        let ws = Workspace::from_text(TEXT);
        assert_eq!(go(&ws, Motion::WordForward, p(1, 0), Some(2)), Some(p(2, 0)));
        assert_eq!(go(&ws, Motion::WordBackward, p(2, 0), Some(2)), Some(p(1, 0)));
        assert_eq!(go(&ws, Motion::WordEnd, p(2, 0), Some(3)), Some(p(3, 3)));
    }

    #[test]
    fn dw_on_last_word_stops_at_line_end() {
        let ws = Workspace::from_text("abc def\nghi");
        let jump = target(&ws, Motion::WordForward, p(0, 4), None);
        assert_eq!(jump, Some(Jump::exclusive(p(0, 7))));
        let jump = target(&ws, Motion::WordForward, p(0, 0), Some(3));
        assert_eq!(jump, Some(Jump::exclusive(p(1, 3))));
    }

    // -- Line jumps ---------------------------------------------------------

    #[test]
    fn gg_and_g_land_on_first_non_blank() {
        let ws = Workspace::from_text(TEXT);
        assert_eq!(go(&ws, Motion::FirstLine, p(3, 2), None), Some(p(0, 3)));
        assert_eq!(go(&ws, Motion::LastLine, p(0, 5), None), Some(p(4, 0)));
        assert_eq!(go(&ws, Motion::LastLine, p(4, 0), Some(2)), Some(p(1, 0)));
        assert_eq!(go(&ws, Motion::FirstLine, p(0, 0), Some(99)), Some(p(4, 0)));
        let jump = target(&ws, Motion::FirstLine, p(3, 0), None);
        assert_eq!(jump.map(|j| j.kind), Some(RangeKind::Linewise));
    }

    #[test]
    fn screen_lines() {
        let text: String = (0..40).map(|i| format!("line {i}\n")).collect();
        let ws = Workspace::from_text(&text).with_height(10);
        assert_eq!(go(&ws, Motion::ScreenTop, p(3, 2), None), Some(p(0, 0)));
        assert_eq!(go(&ws, Motion::ScreenTop, p(3, 2), Some(3)), Some(p(2, 0)));
        assert_eq!(go(&ws, Motion::ScreenMiddle, p(3, 2), None), Some(p(4, 0)));
        assert_eq!(go(&ws, Motion::ScreenBottom, p(3, 2), None), Some(p(9, 0)));
        assert_eq!(go(&ws, Motion::ScreenBottom, p(3, 2), Some(2)), Some(p(8, 0)));
        assert_eq!(target(&ws, Motion::ScreenTop, p(3, 2), None), None);
    }

    // -- % and search -------------------------------------------------------

    #[test]
    fn percent_is_inclusive() {
        let ws = Workspace::from_text("a(aa{bbb[test]bbb}aa)");
        assert_eq!(go(&ws, Motion::MatchBracket, p(0, 0), None), Some(p(0, 20)));
        let jump = target(&ws, Motion::MatchBracket, p(0, 4), None);
        assert_eq!(jump, Some(Jump::inclusive(p(0, 17))));
    }

    #[test]
    fn search_repeat_needs_pattern() {
        let ws = Workspace::from_text(TEXT);
        assert_eq!(go(&ws, Motion::SearchNext, p(0, 0), None), None);

        let pattern = Pattern::new("line", false, false);
        let env = MotionEnv {
            count: Some(2),
            search: Some((&pattern, SearchDirection::Forward)),
            ..MotionEnv::new()
        };
        let next = Motion::SearchNext.resolve(&ws, p(0, 0), &env);
        assert_eq!(next.map(|j| j.pos), Some(p(2, 0)));
        let prev = Motion::SearchPrev.resolve(&ws, p(0, 0), &env);
        assert_eq!(prev.map(|j| j.pos), Some(p(3, 0)));
    }
}
