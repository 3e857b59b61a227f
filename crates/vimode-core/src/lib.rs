//! # vimode-core: Vim-style modal command interpreter
//!
//! The interpreter turns key events into edits on a host buffer. It never
//! owns the text: everything goes through the [`TextBuffer`] trait.
//!
//! - **[`session`]**: `Session`, the mode state machine and the entry point
//! - **[`grammar`]**: incremental `[count]["x][op][count]motion` parser
//! - **[`table`]**: the Normal-mode command table
//! - **[`motion`]** / **[`text_object`]**: cursor targets
//! - **[`operator`]** / **[`edit`]**: `d c y > <` and the direct edits
//! - **[`register`]**: unnamed, named, numbered and small-delete registers
//! - **[`search`]** / **[`command`]**: `/ ?` patterns and the `:` line
//! - **[`workspace`]**: a rope-backed reference host with files and undo

pub mod buffer;
pub mod command;
pub mod edit;
pub mod error;
pub mod grammar;
pub mod history;
pub mod host;
pub mod mode;
pub mod motion;
pub mod operator;
pub mod options;
pub mod position;
pub mod register;
pub mod search;
pub mod session;
pub mod status;
pub mod table;
pub mod text_object;
pub mod view;
pub mod word;
pub mod workspace;

pub use error::{Error, Result};
pub use host::TextBuffer;
pub use mode::{Mode, VisualKind};
pub use options::Options;
pub use position::{Position, Range};
pub use session::{KeyOutcome, Session};
pub use status::status_line;
pub use workspace::Workspace;
