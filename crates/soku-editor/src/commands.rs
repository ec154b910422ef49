//! Undo/Redo command stack.
//!
//! Every block mutation is wrapped in a reversible `Command`. Commands are
//! pushed to a stack; undo pops and applies the inverse.
//!
//! Multi-step gestures use **snapshot batching**: the block list is encoded
//! (MessagePack) at the start and end of the gesture, so undo/redo swaps the
//! whole list in a single step.

use crate::board::{BlockMutation, Board};

/// Default maximum undo depth.
pub const DEFAULT_UNDO_DEPTH: usize = 200;

/// A recorded, reversible change.
#[derive(Debug, Clone)]
pub enum Command {
    /// Single mutation with its inverse.
    Single {
        forward: Box<BlockMutation>,
        inverse: Box<BlockMutation>,
        description: String,
    },
    /// Snapshot-based batch: encoded block lists before and after a gesture.
    Snapshot {
        before: Vec<u8>,
        after: Vec<u8>,
        description: String,
    },
}

/// Manages undo/redo stacks with batch grouping.
#[derive(Debug)]
pub struct CommandStack {
    undo_stack: Vec<Command>,
    redo_stack: Vec<Command>,
    max_depth: usize,
    /// Batch nesting depth (0 = not batching).
    batch_depth: usize,
    batch_snapshot: Option<Vec<u8>>,
    batch_description: String,
    batch_dirty: bool,
}

impl Default for CommandStack {
    fn default() -> Self {
        Self::new(DEFAULT_UNDO_DEPTH)
    }
}

impl CommandStack {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_depth,
            batch_depth: 0,
            batch_snapshot: None,
            batch_description: String::new(),
            batch_dirty: false,
        }
    }

    /// Start a batch group. All mutations until the matching `end_batch()`
    /// are applied live but recorded as one undo step.
    pub fn begin_batch(&mut self, board: &Board, description: &str) {
        if self.batch_depth == 0 {
            self.batch_snapshot = board
                .snapshot()
                .inspect_err(|err| log::warn!("batch snapshot skipped: {err}"))
                .ok();
            self.batch_description = description.to_string();
            self.batch_dirty = false;
        }
        self.batch_depth += 1;
    }

    /// End a batch group. When the outermost batch closes and something
    /// changed, one snapshot command is pushed.
    pub fn end_batch(&mut self, board: &Board) {
        if self.batch_depth == 0 {
            return;
        }
        self.batch_depth -= 1;
        if self.batch_depth > 0 {
            return;
        }
        let before = self.batch_snapshot.take();
        if self.batch_dirty
            && let Some(before) = before
        {
            match board.snapshot() {
                Ok(after) if after != before => {
                    let description = std::mem::take(&mut self.batch_description);
                    self.push(Command::Snapshot {
                        before,
                        after,
                        description,
                    });
                }
                Ok(_) => {}
                Err(err) => log::warn!("batch snapshot skipped: {err}"),
            }
        }
        self.batch_dirty = false;
    }

    pub fn is_batching(&self) -> bool {
        self.batch_depth > 0
    }

    /// Apply a mutation and record it. Returns `true` if the board changed;
    /// no-op mutations leave the stacks alone.
    pub fn execute(&mut self, board: &mut Board, mutation: BlockMutation, description: &str) -> bool {
        if self.batch_depth > 0 {
            let changed = board.apply_mutation(mutation);
            self.batch_dirty |= changed;
            return changed;
        }

        let Some(inverse) = board.inverse_of(&mutation) else {
            log::debug!("{description}: target {} not found", mutation.target());
            return false;
        };
        if !board.apply_mutation(mutation.clone()) {
            return false;
        }

        self.push(Command::Single {
            forward: Box::new(mutation),
            inverse: Box::new(inverse),
            description: description.to_string(),
        });
        true
    }

    fn push(&mut self, cmd: Command) {
        self.undo_stack.push(cmd);
        if self.undo_stack.len() > self.max_depth {
            self.undo_stack.remove(0);
        }
        // Clear redo stack on new action
        self.redo_stack.clear();
    }

    /// Undo the last command. Returns its description.
    pub fn undo(&mut self, board: &mut Board) -> Option<String> {
        let cmd = self.undo_stack.pop()?;
        let desc = match &cmd {
            Command::Single {
                inverse,
                description,
                ..
            } => {
                board.apply_mutation(*inverse.clone());
                description.clone()
            }
            Command::Snapshot {
                before,
                description,
                ..
            } => {
                if let Err(err) = board.restore(before) {
                    log::warn!("undo of '{description}' failed: {err}");
                }
                description.clone()
            }
        };
        self.redo_stack.push(cmd);
        Some(desc)
    }

    /// Redo the last undone command. Returns its description.
    pub fn redo(&mut self, board: &mut Board) -> Option<String> {
        let cmd = self.redo_stack.pop()?;
        let desc = match &cmd {
            Command::Single {
                forward,
                description,
                ..
            } => {
                board.apply_mutation(*forward.clone());
                description.clone()
            }
            Command::Snapshot {
                after, description, ..
            } => {
                if let Err(err) = board.restore(after) {
                    log::warn!("redo of '{description}' failed: {err}");
                }
                description.clone()
            }
        };
        self.undo_stack.push(cmd);
        Some(desc)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Drop all history (e.g. after loading a new layout).
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
