//! One-row status text for hosts that draw a status line.
//!
//! Layout: ` MODE | message` on the left, pending keys and ` line:col ` on
//! the right. While the command line is open its text takes the left side.
//! The left part is cut to fit, measured in terminal cells.

use unicode_width::UnicodeWidthChar;

use crate::host::TextBuffer;
use crate::mode::Mode;
use crate::session::Session;

/// Render the status row at `width` cells.
#[must_use]
pub fn status_line<B: TextBuffer + ?Sized>(session: &Session, buf: &B, width: usize) -> String {
    let left = match session.command_line() {
        Some(line) if session.mode() == Mode::Command => line.display(),
        _ => match session.message() {
            Some(msg) => format!(" {} | {msg}", session.mode().display_name()),
            None => format!(" {}", session.mode().display_name()),
        },
    };
    let cursor = buf.cursor();
    let right = format!("{} {}:{} ", session.pending_keys(), cursor.line + 1, cursor.col + 1);

    let right_width = cells(&right);
    if right_width >= width {
        return truncate(&right, width);
    }
    let room = width - right_width;
    let left = truncate(&left, room);
    let pad = room - cells(&left);
    format!("{left}{:pad$}{right}", "")
}

fn cells(text: &str) -> usize {
    text.chars().map(|c| c.width().unwrap_or(0)).sum()
}

/// The longest prefix of `text` that fits in `width` cells.
fn truncate(text: &str, width: usize) -> String {
    let mut used = 0;
    text.chars()
        .take_while(|c| {
            used += c.width().unwrap_or(0);
            used <= width
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use vimode_keys::parse_keys;

    use super::*;
    use crate::session::KeyOutcome;
    use crate::workspace::Workspace;

    fn after(text: &str, keys: &str) -> (Session, Workspace) {
        let mut ws = Workspace::from_text(text);
        let mut session = Session::new();
        for key in parse_keys(keys).unwrap() {
            if session.handle_key(&mut ws, key) == KeyOutcome::PassThrough {
                ws.type_key(key);
            }
        }
        (session, ws)
    }

    #[test]
    fn normal_mode_layout() {
        let (session, ws) = after("abc\ndef", "jl");
        assert_eq!(status_line(&session, &ws, 20), " NORMAL         2:2 ");
    }

    #[test]
    fn pending_keys_shown() {
        let (session, ws) = after("abc", "2d");
        assert_eq!(status_line(&session, &ws, 20), " NORMAL      2d 1:1 ");
    }

    #[test]
    fn command_line_replaces_mode() {
        let (session, ws) = after("abc", ":wq");
        assert_eq!(status_line(&session, &ws, 12), ":wq     1:1 ");
    }

    #[test]
    fn message_follows_mode() {
        let (session, ws) = after("abc", ":nope<CR>");
        assert_eq!(
            status_line(&session, &ws, 30),
            " NORMAL | E492: Not an ed 1:1 "
        );
    }

    #[test]
    fn wide_chars_count_twice() {
        assert_eq!(cells("日本"), 4);
        assert_eq!(truncate("日本語", 5), "日本");
    }

    #[test]
    fn narrow_width_keeps_position() {
        let (session, ws) = after("abc", "");
        assert_eq!(status_line(&session, &ws, 3), " 1:");
    }
}
