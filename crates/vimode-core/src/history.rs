//! Undo groups for the reference host.
//!
//! Every buffer mutation is recorded as a reversible [`Edit`]. Edits are
//! grouped into transactions, the unit of undo:
//!
//! ```text
//! history.begin(cursor);            // depth 1
//!   history.begin(cursor);          // depth 2, same transaction
//!   history.record_insert(pos, "x");
//!   history.commit(cursor);         // depth 1, still open
//! history.commit(cursor);           // depth 0, pushed to the undo stack
//! ```
//!
//! `begin`/`commit` nest, so a command that is itself made of grouped steps
//! still undoes as one. An edit recorded with no transaction open becomes a
//! transaction of its own. Empty transactions are dropped.

use crate::buffer::Buffer;
use crate::host::end_after_insert;
use crate::position::{Position, Range};

/// A single reversible buffer edit.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Edit {
    Insert { pos: Position, text: String },
    Delete { pos: Position, text: String },
}

impl Edit {
    fn apply(&self, buf: &mut Buffer) {
        match self {
            Self::Insert { pos, text } => {
                buf.insert(*pos, text);
            }
            Self::Delete { pos, text } => {
                buf.delete(Range::new(*pos, end_after_insert(*pos, text)));
            }
        }
    }

    fn revert(&self, buf: &mut Buffer) {
        match self {
            Self::Insert { pos, text } => {
                buf.delete(Range::new(*pos, end_after_insert(*pos, text)));
            }
            Self::Delete { pos, text } => {
                buf.insert(*pos, text);
            }
        }
    }
}

#[derive(Debug, Clone)]
struct Transaction {
    edits: Vec<Edit>,
    cursor_before: Position,
    cursor_after: Position,
}

/// Undo/redo stacks for one buffer. Linear: a new edit after an undo
/// discards the redo stack.
#[derive(Debug, Default)]
pub struct History {
    undo_stack: Vec<Transaction>,
    redo_stack: Vec<Transaction>,
    pending: Option<Transaction>,
    depth: usize,
}

impl History {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            pending: None,
            depth: 0,
        }
    }

    /// Open (or nest into) a transaction. `cursor` is restored on undo.
    pub fn begin(&mut self, cursor: Position) {
        self.depth += 1;
        if self.pending.is_none() {
            self.pending = Some(Transaction {
                edits: Vec::new(),
                cursor_before: cursor,
                cursor_after: cursor,
            });
        }
    }

    /// Close one level. The outermost `commit` pushes the transaction;
    /// `cursor` is restored on redo.
    pub fn commit(&mut self, cursor: Position) {
        self.depth = self.depth.saturating_sub(1);
        if self.depth > 0 {
            return;
        }
        if let Some(mut txn) = self.pending.take() {
            txn.cursor_after = cursor;
            self.push(txn);
        }
    }

    /// True while a transaction is open.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.depth > 0
    }

    /// Record that `text` was inserted at `pos`.
    pub fn record_insert(&mut self, pos: Position, text: &str) {
        if text.is_empty() {
            return;
        }
        self.record(
            Edit::Insert {
                pos,
                text: text.to_string(),
            },
            pos,
        );
    }

    /// Record that `text` was deleted starting at `pos`.
    pub fn record_delete(&mut self, pos: Position, text: &str) {
        if text.is_empty() {
            return;
        }
        self.record(
            Edit::Delete {
                pos,
                text: text.to_string(),
            },
            pos,
        );
    }

    fn record(&mut self, edit: Edit, pos: Position) {
        match &mut self.pending {
            Some(txn) => txn.edits.push(edit),
            None => self.push(Transaction {
                edits: vec![edit],
                cursor_before: pos,
                cursor_after: pos,
            }),
        }
    }

    fn push(&mut self, txn: Transaction) {
        if txn.edits.is_empty() {
            return;
        }
        self.redo_stack.clear();
        self.undo_stack.push(txn);
    }

    /// Undo the last transaction, closing any open one first. Returns the
    /// cursor to restore.
    pub fn undo(&mut self, buf: &mut Buffer) -> Option<Position> {
        if let Some(txn) = self.pending.take() {
            self.depth = 0;
            self.push(txn);
        }
        let txn = self.undo_stack.pop()?;
        for edit in txn.edits.iter().rev() {
            edit.revert(buf);
        }
        let cursor = txn.cursor_before;
        self.redo_stack.push(txn);
        Some(cursor)
    }

    /// Redo the last undone transaction. Returns the cursor to restore.
    pub fn redo(&mut self, buf: &mut Buffer) -> Option<Position> {
        let txn = self.redo_stack.pop()?;
        for edit in &txn.edits {
            edit.apply(buf);
        }
        let cursor = txn.cursor_after;
        self.undo_stack.push(txn);
        Some(cursor)
    }

    #[must_use]
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    #[must_use]
    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }
}
