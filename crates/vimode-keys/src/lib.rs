// SPDX-License-Identifier: MIT
//
// vimode-keys: key events and key notation for vimode.
//
// The interpreter in `vimode-core` consumes `KeyEvent`s one at a time.
// This crate defines that event type and reads the `<Esc>`/`<C-r>`
// notation used by key scripts, tests, and the command-line driver.

pub mod key;
pub mod notation;

pub use key::{KeyCode, KeyEvent, Modifiers};
pub use notation::{NotationError, parse_keys};
