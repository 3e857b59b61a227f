// SPDX-License-Identifier: MIT
//
// Key-notation parser.
//
// Turns a script such as `"3dd<Esc>:w<CR>"` into a list of key events.
// The grammar is the familiar `<...>` notation:
//
// - Plain characters stand for themselves (`d`, `3`, `~`, `"`).
// - `<Name>` is a named key: `Esc`, `CR`/`Enter`/`Return`, `BS`, `Tab`,
//   `Del`, `Space`, `lt`, `Bar`, arrows, `Home`, `End`. Case-insensitive.
// - `<C-x>`, `<A-x>`/`<M-x>`, `<S-Name>` add modifiers; they stack
//   (`<C-S-Left>`).
// - A `<` that does not open a well-formed `<...>` token is a literal
//   `<`, so `<<` and `V<` work without escaping.
// - Raw control characters map through `KeyEvent::from_char`.

use thiserror::Error;

use crate::key::{KeyCode, KeyEvent, Modifiers};

/// Errors produced while reading key notation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotationError {
    /// `<Name>` looked like a key token but `Name` is not a known key.
    #[error("unknown key name <{0}>")]
    UnknownKey(String),

    /// A modifier prefix other than `C-`, `A-`, `M-`, `S-`.
    #[error("unknown modifier '{modifier}' in <{token}>")]
    UnknownModifier {
        /// The offending modifier letter.
        modifier: String,
        /// The whole token between the angle brackets.
        token: String,
    },
}

/// Parse a key script into events.
///
/// # Errors
///
/// Returns [`NotationError`] when a `<...>` token has a well-formed shape
/// but names an unknown key or modifier.
pub fn parse_keys(input: &str) -> Result<Vec<KeyEvent>, NotationError> {
    let mut events = Vec::with_capacity(input.len());
    let mut rest = input;

    while let Some(ch) = rest.chars().next() {
        if ch == '<' {
            if let Some((token, after)) = angle_token(rest) {
                events.push(parse_token(token)?);
                rest = after;
                continue;
            }
        }
        events.push(KeyEvent::from_char(ch));
        rest = &rest[ch.len_utf8()..];
    }

    Ok(events)
}

/// If `text` starts with `<token>` where `token` is non-empty and made of
/// ASCII alphanumerics and `-`, return the token and the remaining text.
///
/// A single-character token is accepted only when it carries a modifier
/// (`<C-r>`), otherwise `<x>` would shadow the literal `<` operator.
fn angle_token(text: &str) -> Option<(&str, &str)> {
    let inner = &text[1..];
    let close = inner.find('>')?;
    let token = &inner[..close];

    let shaped = !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-');
    if !shaped || token.len() < 2 {
        return None;
    }

    Some((token, &inner[close + 1..]))
}

/// Decode the inside of `<...>`.
fn parse_token(token: &str) -> Result<KeyEvent, NotationError> {
    let mut modifiers = Modifiers::empty();
    let mut name = token;

    // Peel `X-` prefixes, but leave a trailing `-` as the key itself (`<C-->`).
    while name.len() > 2 && name.as_bytes()[1] == b'-' {
        let flag = match name.as_bytes()[0].to_ascii_uppercase() {
            b'C' => Modifiers::CTRL,
            b'A' | b'M' => Modifiers::ALT,
            b'S' => Modifiers::SHIFT,
            _ => {
                return Err(NotationError::UnknownModifier {
                    modifier: name[..1].to_string(),
                    token: token.to_string(),
                });
            }
        };
        modifiers |= flag;
        name = &name[2..];
    }

    let code = named_key(name).ok_or_else(|| NotationError::UnknownKey(token.to_string()))?;

    // `<C-R>` and `<C-r>` are the same chord.
    let code = match code {
        KeyCode::Char(c) if modifiers.contains(Modifiers::CTRL) => {
            KeyCode::Char(c.to_ascii_lowercase())
        }
        other => other,
    };

    Ok(KeyEvent::new(code, modifiers))
}

/// Map a key name (case-insensitive) to a key code. A single character is
/// itself.
fn named_key(name: &str) -> Option<KeyCode> {
    let mut chars = name.chars();
    if let (Some(ch), None) = (chars.next(), chars.next()) {
        return Some(KeyCode::Char(ch));
    }

    let code = match name.to_ascii_lowercase().as_str() {
        "esc" | "escape" => KeyCode::Escape,
        "cr" | "enter" | "return" => KeyCode::Enter,
        "bs" | "backspace" => KeyCode::Backspace,
        "tab" => KeyCode::Tab,
        "del" | "delete" => KeyCode::Delete,
        "space" => KeyCode::Char(' '),
        "lt" => KeyCode::Char('<'),
        "gt" => KeyCode::Char('>'),
        "bar" => KeyCode::Char('|'),
        "bslash" => KeyCode::Char('\\'),
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        _ => return None,
    };
    Some(code)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn keys(input: &str) -> Vec<KeyEvent> {
        parse_keys(input).unwrap()
    }

    fn chars(text: &str) -> Vec<KeyEvent> {
        text.chars().map(KeyEvent::char).collect()
    }

    // ── Plain characters ────────────────────────────────────────────────

    #[test]
    fn plain_script() {
        assert_eq!(keys("3dd"), chars("3dd"));
    }

    #[test]
    fn empty_script() {
        assert_eq!(keys(""), Vec::new());
    }

    #[test]
    fn register_prefix_is_plain() {
        assert_eq!(keys("\"ayy"), chars("\"ayy"));
    }

    // ── Named keys ──────────────────────────────────────────────────────

    #[test]
    fn escape_and_return() {
        assert_eq!(
            keys("i<Esc>:w<CR>"),
            vec![
                KeyEvent::char('i'),
                KeyEvent::plain(KeyCode::Escape),
                KeyEvent::char(':'),
                KeyEvent::char('w'),
                KeyEvent::plain(KeyCode::Enter),
            ]
        );
    }

    #[test]
    fn names_are_case_insensitive() {
        assert_eq!(keys("<esc>"), vec![KeyEvent::plain(KeyCode::Escape)]);
        assert_eq!(keys("<RETURN>"), vec![KeyEvent::plain(KeyCode::Enter)]);
    }

    #[test]
    fn space_and_lt() {
        assert_eq!(keys("<Space><lt>"), chars(" <"));
    }

    #[test]
    fn arrows() {
        assert_eq!(
            keys("<Left><Up>"),
            vec![KeyEvent::plain(KeyCode::Left), KeyEvent::plain(KeyCode::Up)]
        );
    }

    // ── Modifiers ───────────────────────────────────────────────────────

    #[test]
    fn ctrl_chord() {
        assert_eq!(keys("<C-r>"), vec![KeyEvent::ctrl('r')]);
        assert_eq!(keys("<C-R>"), vec![KeyEvent::ctrl('r')]);
    }

    #[test]
    fn stacked_modifiers() {
        assert_eq!(
            keys("<C-S-Left>"),
            vec![KeyEvent::new(
                KeyCode::Left,
                Modifiers::CTRL | Modifiers::SHIFT
            )]
        );
    }

    #[test]
    fn unknown_modifier_is_error() {
        assert_eq!(
            parse_keys("<X-a>"),
            Err(NotationError::UnknownModifier {
                modifier: "X".to_string(),
                token: "X-a".to_string(),
            })
        );
    }

    #[test]
    fn unknown_name_is_error() {
        assert_eq!(
            parse_keys("<Nope>"),
            Err(NotationError::UnknownKey("Nope".to_string()))
        );
    }

    // ── Literal angle brackets ──────────────────────────────────────────

    #[test]
    fn double_lt_is_literal() {
        assert_eq!(keys("<<"), chars("<<"));
    }

    #[test]
    fn lt_then_motion_is_literal() {
        assert_eq!(keys("V<"), chars("V<"));
        assert_eq!(keys("<j"), chars("<j"));
    }

    #[test]
    fn lt_with_single_char_is_literal() {
        assert_eq!(keys("<j>"), chars("<j>"));
    }

    #[test]
    fn indent_then_outdent() {
        assert_eq!(keys(">><<"), chars(">><<"));
    }

    // ── Round trip ──────────────────────────────────────────────────────

    #[test]
    fn display_round_trips() {
        let script = "d<C-r><Esc><Space><lt>x<CR>";
        let rendered: String = keys(script).iter().map(ToString::to_string).collect();
        assert_eq!(rendered, script);
    }
}
