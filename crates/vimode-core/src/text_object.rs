//! Text objects: selection by enclosing delimiters.
//!
//! Combined with an operator or Visual mode they pick text by structure
//! rather than by cursor motion:
//!
//! ```text
//! operator + text-object = action
//! d        + i(          = delete inside parentheses
//! c        + i"          = change inside quotes
//! y        + a[          = yank square brackets and contents
//! ```
//!
//! | Inner            | Around           | Delimiters      |
//! |------------------|------------------|-----------------|
//! | `i(` `i)` `ib`   | `a(` `a)` `ab`   | `(` `)`         |
//! | `i[` `i]`        | `a[` `a]`        | `[` `]`         |
//! | `i{` `i}` `iB`   | `a{` `a}` `aB`   | `{` `}`         |
//! | `i<` `i>`        | `a<` `a>`        | `<` `>`         |
//! | `i"`             | `a"`             | `"` `"`         |
//! | `i'`             | `a'`             | `'` `'`         |
//!
//! Brackets nest and may span lines; the scan counts depth across the whole
//! buffer. Quotes pair left to right on the cursor line. When nothing
//! encloses the cursor the object is the single char under it.
//!
//! The `%` motion shares the bracket scan ([`match_bracket`]).

use crate::host::{self, TextBuffer};
use crate::position::{Position, RangeKind, Region};

// ---------------------------------------------------------------------------
// TextObject
// ---------------------------------------------------------------------------

/// `i` or `a`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Inner,
    Around,
}

/// What delimits the object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Bracket { open: char, close: char },
    Quote(char),
}

impl Delimiter {
    /// The delimiter a key names, if any.
    #[must_use]
    pub const fn from_char(ch: char) -> Option<Self> {
        let (open, close) = match ch {
            '(' | ')' | 'b' => ('(', ')'),
            '[' | ']' => ('[', ']'),
            '{' | '}' | 'B' => ('{', '}'),
            '<' | '>' => ('<', '>'),
            '"' | '\'' => return Some(Self::Quote(ch)),
            _ => return None,
        };
        Some(Self::Bracket { open, close })
    }
}

/// A parsed text object such as `i(` or `a"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextObject {
    pub scope: Scope,
    pub delimiter: Delimiter,
}

impl TextObject {
    /// Build from the two keys that name it.
    #[must_use]
    pub const fn from_keys(scope: char, delimiter: char) -> Option<Self> {
        let scope = match scope {
            'i' => Scope::Inner,
            'a' => Scope::Around,
            _ => return None,
        };
        match Delimiter::from_char(delimiter) {
            Some(delimiter) => Some(Self { scope, delimiter }),
            None => None,
        }
    }

    /// The region the object covers around `pos`.
    ///
    /// `a` objects are inclusive of both delimiters. `i` objects run up to
    /// the closing delimiter, exclusive, so `()` gives an empty region.
    /// Without an enclosing pair the result is the char at `pos`, or an
    /// empty region when `pos` is at the end of a line.
    #[must_use]
    pub fn resolve<B: TextBuffer + ?Sized>(self, buf: &B, pos: Position) -> Region {
        let pair = match self.delimiter {
            Delimiter::Bracket { open, close } => bracket_pair(buf, pos, open, close),
            Delimiter::Quote(quote) => quote_pair(buf, pos, quote),
        };
        let Some((open, close)) = pair else {
            return match host::char_at(buf, pos) {
                Some(ch) if ch != '\n' => Region::char_at(pos),
                _ => Region::new(pos, pos, RangeKind::Exclusive),
            };
        };
        match self.scope {
            Scope::Around => Region::new(open, close, RangeKind::Inclusive),
            Scope::Inner => {
                let start = host::next_pos(buf, open).unwrap_or(close);
                Region::new(start, close, RangeKind::Exclusive)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Bracket scanning
// ---------------------------------------------------------------------------

/// The closest `open`/`close` pair enclosing `pos` (or delimited by the
/// char at `pos`).
fn bracket_pair<B: TextBuffer + ?Sized>(
    buf: &B,
    pos: Position,
    open: char,
    close: char,
) -> Option<(Position, Position)> {
    match host::char_at(buf, pos) {
        Some(ch) if ch == open => Some((pos, scan_forward(buf, pos, open, close)?)),
        Some(ch) if ch == close => Some((scan_backward(buf, pos, open, close)?, pos)),
        _ => {
            let start = scan_backward(buf, pos, open, close)?;
            Some((start, scan_forward(buf, start, open, close)?))
        }
    }
}

/// The unmatched `close` after `from`.
fn scan_forward<B: TextBuffer + ?Sized>(
    buf: &B,
    from: Position,
    open: char,
    close: char,
) -> Option<Position> {
    let mut depth = 0usize;
    for line in from.line..buf.line_count() {
        let skip = if line == from.line { from.col + 1 } else { 0 };
        for (col, ch) in buf.line_text(line).chars().enumerate().skip(skip) {
            if ch == open {
                depth += 1;
            } else if ch == close {
                if depth == 0 {
                    return Some(Position::new(line, col));
                }
                depth -= 1;
            }
        }
    }
    None
}

/// The unmatched `open` before `from`.
fn scan_backward<B: TextBuffer + ?Sized>(
    buf: &B,
    from: Position,
    open: char,
    close: char,
) -> Option<Position> {
    let mut depth = 0usize;
    for line in (0..=from.line).rev() {
        let chars: Vec<char> = buf.line_text(line).chars().collect();
        let end = if line == from.line { from.col.min(chars.len()) } else { chars.len() };
        for col in (0..end).rev() {
            let ch = chars[col];
            if ch == close {
                depth += 1;
            } else if ch == open {
                if depth == 0 {
                    return Some(Position::new(line, col));
                }
                depth -= 1;
            }
        }
    }
    None
}

/// `%`: the partner of the first bracket at or after `pos` on its line.
/// `None` when the line has no bracket there or the bracket is unmatched.
#[must_use]
pub fn match_bracket<B: TextBuffer + ?Sized>(buf: &B, pos: Position) -> Option<Position> {
    const PAIRS: [(char, char); 3] = [('(', ')'), ('[', ']'), ('{', '}')];

    let (col, ch) = buf
        .line_text(pos.line)
        .chars()
        .enumerate()
        .skip(pos.col)
        .find(|(_, ch)| PAIRS.iter().any(|&(o, c)| *ch == o || *ch == c))?;
    let at = pos.with_col(col);
    PAIRS.iter().find_map(|&(open, close)| {
        if ch == open {
            scan_forward(buf, at, open, close)
        } else if ch == close {
            scan_backward(buf, at, open, close)
        } else {
            None
        }
    })
}

// ---------------------------------------------------------------------------
// Quote pairing
// ---------------------------------------------------------------------------

/// The quote pair on the cursor line holding the cursor, else the next
/// pair after it. Quotes pair left to right: 1st with 2nd, 3rd with 4th.
fn quote_pair<B: TextBuffer + ?Sized>(
    buf: &B,
    pos: Position,
    quote: char,
) -> Option<(Position, Position)> {
    let quotes: Vec<usize> = buf
        .line_text(pos.line)
        .chars()
        .enumerate()
        .filter(|(_, ch)| *ch == quote)
        .map(|(col, _)| col)
        .collect();

    let pairs = quotes.chunks_exact(2).map(|pair| (pair[0], pair[1]));
    let (open, close) = pairs
        .clone()
        .find(|&(open, close)| (open..=close).contains(&pos.col))
        .or_else(|| pairs.clone().find(|&(open, _)| open > pos.col))?;
    Some((pos.with_col(open), pos.with_col(close)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
