//! Viewport: which lines of a document are on screen.
//!
//! The headless host has no terminal, but `H`/`M`/`L` and `zz` are defined
//! in terms of visible lines, so each document carries a `Viewport` with a
//! top line and a height. The workspace keeps it following the cursor after
//! every cursor move:
//!
//! ```text
//!   line 0
//!   line 1
//! ┌─────────┐ ← top_line = 2
//! │ line 2  │
//! │ line 3  │   height = 3
//! │ line 4  │
//! └─────────┘
//!   line 5
//! ```

/// Default number of visible lines.
pub const DEFAULT_HEIGHT: usize = 24;

/// Vertical scroll state for one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// First visible line (0-indexed).
    top_line: usize,

    /// Number of visible lines, at least 1.
    height: usize,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(DEFAULT_HEIGHT)
    }
}

impl Viewport {
    #[must_use]
    pub fn new(height: usize) -> Self {
        Self {
            top_line: 0,
            height: height.max(1),
        }
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn top_line(&self) -> usize {
        self.top_line
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Last visible line, never past `last_line`.
    #[must_use]
    pub fn bottom_line(&self, last_line: usize) -> usize {
        (self.top_line + self.height - 1).min(last_line)
    }

    /// Set the number of visible lines (minimum 1).
    pub fn set_height(&mut self, height: usize) {
        self.height = height.max(1);
    }

    pub const fn set_top_line(&mut self, line: usize) {
        self.top_line = line;
    }

    // -- Scrolling ----------------------------------------------------------

    /// Scroll the minimum amount that brings `line` on screen.
    pub const fn scroll_to(&mut self, line: usize) {
        if line < self.top_line {
            self.top_line = line;
        }
        if line >= self.top_line + self.height {
            self.top_line = line + 1 - self.height;
        }
    }

    /// Scroll so `line` sits in the middle row, the row `M` lands on.
    /// Near the top the view stops at line 0.
    pub const fn center(&mut self, line: usize) {
        self.top_line = line.saturating_sub((self.height - 1) / 2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_clamps_height() {
        let v = Viewport::new(0);
        assert_eq!(v.height(), 1);
        assert_eq!(v.top_line(), 0);
        assert_eq!(Viewport::default().height(), DEFAULT_HEIGHT);
    }

    // -- scroll_to ----------------------------------------------------------

    #[test]
    fn visible_line_does_not_scroll() {
        let mut v = Viewport::new(5);
        v.scroll_to(4);
        assert_eq!(v.top_line(), 0);
    }

    #[test]
    fn scroll_down_when_line_below() {
        let mut v = Viewport::new(3);
        v.scroll_to(4);
        assert_eq!(v.top_line(), 2);
        assert_eq!(v.bottom_line(100), 4);
    }

    #[test]
    fn scroll_up_when_line_above() {
        let mut v = Viewport::new(3);
        v.set_top_line(6);
        v.scroll_to(1);
        assert_eq!(v.top_line(), 1);
    }

    // -- center / bottom_line -----------------------------------------------

    #[test]
    fn center_puts_line_mid_screen() {
        let mut v = Viewport::new(10);
        v.center(20);
        assert_eq!(v.top_line(), 16);
        v.center(2);
        assert_eq!(v.top_line(), 0);
    }

    #[test]
    fn bottom_line_stops_at_buffer_end() {
        let v = Viewport::new(10);
        assert_eq!(v.bottom_line(3), 3);
        assert_eq!(v.bottom_line(50), 9);
    }
}
