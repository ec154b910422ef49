//! Per-canvas interaction state: selection and the two in-place editors.
//!
//! Only one editor is open at a time. While a block or slot editor is
//! active, attempts to select, drag, or open another editor are rejected
//! (logged at debug level and reported as `false`).
//!
//! Commits do not touch the board directly; they yield the
//! [`BlockMutation`] the session runs through the command stack.

use crate::board::BlockMutation;
use crate::input::Modifiers;
use soku_core::id::BlockId;
use soku_core::model::{Block, BlockKind, Slot};
use soku_core::path::SlotPath;

/// How the whole-block editor is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    /// Single line, contents pre-selected. Enter commits.
    Quick,
    /// Multi-line markup. Enter commits, Shift+Enter inserts a newline.
    Full,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Interaction {
    #[default]
    Idle,
    Selected(BlockId),
    /// Editing a block's markup.
    Editing {
        id: BlockId,
        mode: EditMode,
        draft: String,
        original: String,
    },
    /// Editing one leaf of a templated block.
    SlotEditing {
        id: BlockId,
        path: SlotPath,
        draft: String,
    },
}

/// What a key press inside an open editor asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKey {
    Commit,
    Cancel,
}

impl Interaction {
    /// The block that is selected or being edited.
    pub fn selected(&self) -> Option<BlockId> {
        match self {
            Interaction::Idle => None,
            Interaction::Selected(id)
            | Interaction::Editing { id, .. }
            | Interaction::SlotEditing { id, .. } => Some(*id),
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(
            self,
            Interaction::Editing { .. } | Interaction::SlotEditing { .. }
        )
    }

    fn reject(&self, action: &str) -> bool {
        log::debug!("{action} ignored while editing {:?}", self.selected());
        false
    }

    /// Select a block. Returns `true` if the selection changed.
    pub fn select(&mut self, id: BlockId) -> bool {
        if self.is_editing() {
            return self.reject("select");
        }
        let changed = self.selected() != Some(id);
        *self = Interaction::Selected(id);
        changed
    }

    /// Clear the selection (click on empty canvas, Escape).
    pub fn deselect(&mut self) -> bool {
        match self {
            Interaction::Idle => false,
            Interaction::Selected(_) => {
                *self = Interaction::Idle;
                true
            }
            _ => self.reject("deselect"),
        }
    }

    /// Forget a block that no longer exists.
    pub fn forget(&mut self, id: BlockId) {
        if self.selected() == Some(id) {
            *self = Interaction::Idle;
        }
    }

    /// Open the whole-block editor. `mode: None` picks the double-click
    /// default: quick for plain value boxes, full otherwise.
    pub fn begin_edit(&mut self, block: &Block, mode: Option<EditMode>) -> bool {
        if self.is_editing() {
            return self.reject("edit");
        }
        let mode = mode.unwrap_or(if block.kind == BlockKind::Input && !block.is_templated() {
            EditMode::Quick
        } else {
            EditMode::Full
        });
        *self = Interaction::Editing {
            id: block.id,
            mode,
            draft: block.content.clone(),
            original: block.content.clone(),
        };
        true
    }

    /// Open the slot editor on the leaf at `path`, drafting its current
    /// text. Nested templates are not editable as text.
    pub fn begin_slot_edit(&mut self, block: &Block, path: SlotPath) -> bool {
        if self.is_editing() {
            return self.reject("slot edit");
        }
        let Some(slot) = block.slot(&path) else {
            log::debug!("slot {path} not found in block {}", block.id);
            return false;
        };
        let Some(text) = slot.as_leaf() else {
            log::debug!("slot {path} of block {} is a nested template", block.id);
            return false;
        };
        *self = Interaction::SlotEditing {
            id: block.id,
            draft: text.to_string(),
            path,
        };
        true
    }

    /// Replace the open editor's text.
    pub fn set_draft(&mut self, text: &str) -> bool {
        match self {
            Interaction::Editing { draft, .. } | Interaction::SlotEditing { draft, .. } => {
                text.clone_into(draft);
                true
            }
            _ => false,
        }
    }

    pub fn draft(&self) -> Option<&str> {
        match self {
            Interaction::Editing { draft, .. } | Interaction::SlotEditing { draft, .. } => {
                Some(draft)
            }
            _ => None,
        }
    }

    /// Close the open editor, keeping its draft. Returns the mutation to
    /// apply, or `None` if nothing changed or no editor was open.
    pub fn commit(&mut self) -> Option<BlockMutation> {
        let (id, mutation) = match std::mem::take(self) {
            Interaction::Editing {
                id, draft, original, ..
            } => {
                let mutation = (draft != original).then(|| BlockMutation::SetContent {
                    id,
                    content: draft,
                });
                (id, mutation)
            }
            Interaction::SlotEditing { id, path, draft } => {
                let value = Slot::leaf(draft.trim());
                (id, Some(BlockMutation::SetSlot { id, path, value }))
            }
            other => {
                *self = other;
                return None;
            }
        };
        *self = Interaction::Selected(id);
        mutation
    }

    /// Close the open editor and discard its draft.
    pub fn cancel(&mut self) -> bool {
        match self {
            Interaction::Editing { id, .. } | Interaction::SlotEditing { id, .. } => {
                *self = Interaction::Selected(*id);
                true
            }
            _ => false,
        }
    }

    /// Interpret a key press inside the open editor.
    pub fn edit_key(&self, key: &str, modifiers: Modifiers) -> Option<EditKey> {
        match (self, key) {
            (Interaction::Editing { .. } | Interaction::SlotEditing { .. }, "Escape") => {
                Some(EditKey::Cancel)
            }
            (Interaction::Editing { mode: EditMode::Full, .. }, "Enter") if modifiers.shift => None,
            (Interaction::Editing { .. } | Interaction::SlotEditing { .. }, "Enter") => {
                Some(EditKey::Commit)
            }
            _ => None,
        }
    }
}
