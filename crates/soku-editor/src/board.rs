//! The canvas document: an ordered list of placed blocks.
//!
//! All edits arrive as [`BlockMutation`]s so the command stack can record an
//! inverse for each one. Mutations that address a missing block or an
//! unresolvable slot path are silent no-ops and report `false`.

use soku_core::export::{SnapshotError, decode_snapshot, encode_snapshot};
use soku_core::id::BlockId;
use soku_core::model::{Block, Position, Slot};
use soku_core::path::SlotPath;

/// A reversible edit to the block list.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockMutation {
    /// Insert a block. `index: None` appends on top.
    AddBlock {
        block: Box<Block>,
        index: Option<usize>,
    },
    RemoveBlock {
        id: BlockId,
    },
    MoveBlock {
        id: BlockId,
        position: Position,
    },
    /// Replace the markup, normalizing slots to the new markers.
    SetContent {
        id: BlockId,
        content: String,
    },
    /// Persistent write of one slot.
    SetSlot {
        id: BlockId,
        path: SlotPath,
        value: Slot,
    },
    /// Swap the whole slot tree.
    SetSlots {
        id: BlockId,
        slots: Option<Vec<Slot>>,
    },
    /// Put back a full block value in place, keyed by its id.
    ReplaceBlock {
        block: Box<Block>,
    },
}

impl BlockMutation {
    /// The block this mutation touches.
    pub fn target(&self) -> BlockId {
        match self {
            Self::AddBlock { block, .. } | Self::ReplaceBlock { block } => block.id,
            Self::RemoveBlock { id }
            | Self::MoveBlock { id, .. }
            | Self::SetContent { id, .. }
            | Self::SetSlot { id, .. }
            | Self::SetSlots { id, .. } => *id,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Board {
    blocks: Vec<Block>,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn index_of(&self, id: BlockId) -> Option<usize> {
        self.blocks.iter().position(|b| b.id == id)
    }

    pub fn get(&self, id: BlockId) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    fn get_mut(&mut self, id: BlockId) -> Option<&mut Block> {
        self.blocks.iter_mut().find(|b| b.id == id)
    }

    /// Apply a mutation. Returns `true` if the block list changed.
    pub fn apply_mutation(&mut self, mutation: BlockMutation) -> bool {
        match mutation {
            BlockMutation::AddBlock { block, index } => {
                if self.index_of(block.id).is_some() {
                    log::debug!("block {} already placed", block.id);
                    return false;
                }
                let at = index.unwrap_or(self.blocks.len()).min(self.blocks.len());
                self.blocks.insert(at, *block);
                true
            }
            BlockMutation::RemoveBlock { id } => match self.index_of(id) {
                Some(i) => {
                    self.blocks.remove(i);
                    true
                }
                None => {
                    log::debug!("remove: no block {id}");
                    false
                }
            },
            BlockMutation::MoveBlock { id, position } => {
                let Some(block) = self.get_mut(id) else {
                    log::debug!("move: no block {id}");
                    return false;
                };
                let changed = block.position != position;
                block.position = position;
                changed
            }
            BlockMutation::SetContent { id, content } => {
                let Some(block) = self.get_mut(id) else {
                    log::debug!("set content: no block {id}");
                    return false;
                };
                let before = (block.content.clone(), block.slots.as_ref().map(Vec::len));
                block.set_content(content);
                before != (block.content.clone(), block.slots.as_ref().map(Vec::len))
            }
            BlockMutation::SetSlot { id, path, value } => match self.get_mut(id) {
                Some(block) => block.set_slot(&path, value),
                None => {
                    log::debug!("set slot: no block {id}");
                    false
                }
            },
            BlockMutation::SetSlots { id, slots } => {
                let Some(block) = self.get_mut(id) else {
                    log::debug!("set slots: no block {id}");
                    return false;
                };
                let changed = block.slots != slots;
                block.slots = slots;
                changed
            }
            BlockMutation::ReplaceBlock { block } => {
                let Some(slot) = self.get_mut(block.id) else {
                    log::debug!("replace: no block {}", block.id);
                    return false;
                };
                let changed = *slot != *block;
                *slot = *block;
                changed
            }
        }
    }

    /// The mutation that undoes `mutation` against the current state.
    /// `None` when the mutation would be a no-op here.
    pub fn inverse_of(&self, mutation: &BlockMutation) -> Option<BlockMutation> {
        let inverse = match mutation {
            BlockMutation::AddBlock { block, .. } => BlockMutation::RemoveBlock { id: block.id },
            BlockMutation::RemoveBlock { id } => {
                let index = self.index_of(*id)?;
                BlockMutation::AddBlock {
                    block: Box::new(self.blocks[index].clone()),
                    index: Some(index),
                }
            }
            BlockMutation::MoveBlock { id, .. } => BlockMutation::MoveBlock {
                id: *id,
                position: self.get(*id)?.position,
            },
            // Normalization may add slots, so restore the whole block.
            BlockMutation::SetContent { id, .. } => BlockMutation::ReplaceBlock {
                block: Box::new(self.get(*id)?.clone()),
            },
            BlockMutation::SetSlot { id, .. } | BlockMutation::SetSlots { id, .. } => {
                BlockMutation::SetSlots {
                    id: *id,
                    slots: self.get(*id)?.slots.clone(),
                }
            }
            BlockMutation::ReplaceBlock { block } => BlockMutation::ReplaceBlock {
                block: Box::new(self.get(block.id)?.clone()),
            },
        };
        Some(inverse)
    }

    // ─── Snapshots ───────────────────────────────────────────────────────

    pub fn snapshot(&self) -> Result<Vec<u8>, SnapshotError> {
        encode_snapshot(&self.blocks)
    }

    /// Replace the whole block list from a snapshot. On error the board is
    /// left unchanged.
    pub fn restore(&mut self, bytes: &[u8]) -> Result<(), SnapshotError> {
        self.blocks = decode_snapshot(bytes)?;
        Ok(())
    }
}
