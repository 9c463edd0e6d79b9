//! Bounded undo/redo snapshot history
//!
//! Every committed mutation pushes a deep copy of the block sequence; undo
//! and redo move a cursor over the stack and hand back the snapshot at the
//! new position wholesale. Undo/redo never push, so undoing cannot clobber
//! the redo branch.

use std::collections::VecDeque;

use thiserror::Error;

use crate::models::Block;

/// Default bound on retained snapshots.
pub const MAX_HISTORY: usize = 50;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum HistoryError {
    #[error("no undo history available")]
    NothingToUndo,
    #[error("no redo history available")]
    NothingToRedo,
}

/// Snapshot stack plus cursor. The cursor points at the snapshot matching
/// the live document; `None` until the first commit.
#[derive(Clone, Debug, Default)]
pub struct History {
    snapshots: VecDeque<Vec<Block>>,
    cursor: Option<usize>,
    max_size: usize,
}

impl History {
    pub fn new() -> Self {
        Self::with_max_size(MAX_HISTORY)
    }

    pub fn with_max_size(max_size: usize) -> Self {
        Self {
            snapshots: VecDeque::new(),
            cursor: None,
            max_size,
        }
    }

    /// Record the state after a committed mutation. Truncates any redo
    /// branch, then pushes; the oldest snapshot is evicted past the bound.
    pub fn commit(&mut self, blocks: &[Block]) {
        if let Some(cursor) = self.cursor {
            self.snapshots.truncate(cursor + 1);
        } else {
            self.snapshots.clear();
        }
        self.snapshots.push_back(blocks.to_vec());
        if self.snapshots.len() > self.max_size {
            self.snapshots.pop_front();
        }
        self.cursor = Some(self.snapshots.len() - 1);
    }

    /// Step the cursor back and return the snapshot there.
    pub fn undo(&mut self) -> Result<Vec<Block>, HistoryError> {
        match self.cursor {
            Some(cursor) if cursor > 0 => {
                self.cursor = Some(cursor - 1);
                Ok(self.snapshots[cursor - 1].clone())
            }
            _ => Err(HistoryError::NothingToUndo),
        }
    }

    /// Step the cursor forward and return the snapshot there.
    pub fn redo(&mut self) -> Result<Vec<Block>, HistoryError> {
        match self.cursor {
            Some(cursor) if cursor + 1 < self.snapshots.len() => {
                self.cursor = Some(cursor + 1);
                Ok(self.snapshots[cursor + 1].clone())
            }
            _ => Err(HistoryError::NothingToRedo),
        }
    }

    pub fn can_undo(&self) -> bool {
        matches!(self.cursor, Some(cursor) if cursor > 0)
    }

    pub fn can_redo(&self) -> bool {
        matches!(self.cursor, Some(cursor) if cursor + 1 < self.snapshots.len())
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Drop all history, e.g. after recovering from an auto-save snapshot.
    pub fn clear(&mut self) {
        self.snapshots.clear();
        self.cursor = None;
    }
}
