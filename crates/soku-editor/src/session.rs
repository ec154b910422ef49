//! Canvas session: the single owner of editor state.
//!
//! Holds the board, the command stack, the viewport, the interaction state
//! and any drag in progress. All input from the host goes through this
//! struct, synchronously, one event at a time.
//!
//! Every operation returns `true` when something the view shows changed
//! (blocks, selection, an editor, or the viewport) and never panics.
//! Requests that do not apply are silent no-ops.

use crate::board::{BlockMutation, Board};
use crate::commands::{CommandStack, DEFAULT_UNDO_DEPTH};
use crate::drag::{self, DragPayload, DragState, GrabOffset};
use crate::input::{Hit, InputEvent, Modifiers, PointerButton};
use crate::interaction::{EditKey, EditMode, Interaction};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use serde::{Deserialize, Serialize};
use soku_core::expand::ExpandConfig;
use soku_core::export::{self, SnapshotError};
use soku_core::grid::GridConfig;
use soku_core::id::BlockId;
use soku_core::model::{Block, PaletteItem, Position, Slot, TemplateNode};
use soku_core::path::SlotPath;
use soku_core::render::{self, Rendered, TypesetOptions, Typesetter};
use soku_core::viewport::{Viewport, ZoomLimits};

/// Session-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub grid: GridConfig,
    pub expand: ExpandConfig,
    pub zoom: ZoomLimits,
    pub typeset: TypesetOptions,
    pub undo_depth: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            expand: ExpandConfig::default(),
            zoom: ZoomLimits::default(),
            typeset: TypesetOptions::default(),
            undo_depth: DEFAULT_UNDO_DEPTH,
        }
    }
}

/// What a key press was resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Editor(EditKey),
    Shortcut(ShortcutAction),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyResult {
    pub action: Option<KeyAction>,
    pub changed: bool,
}

impl KeyResult {
    const IGNORED: Self = Self {
        action: None,
        changed: false,
    };
}

pub struct Session {
    board: Board,
    commands: CommandStack,
    pub viewport: Viewport,
    config: SessionConfig,
    state: Interaction,
    drag: Option<DragState>,
    /// Last pointer position of a middle-button pan.
    pan_last: Option<(f32, f32)>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            board: Board::new(),
            commands: CommandStack::new(config.undo_depth),
            viewport: Viewport::new(config.zoom),
            config,
            state: Interaction::Idle,
            drag: None,
            pan_last: None,
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn blocks(&self) -> &[Block] {
        self.board.blocks()
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.board.get(id)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn interaction(&self) -> &Interaction {
        &self.state
    }

    pub fn selected(&self) -> Option<BlockId> {
        self.state.selected()
    }

    pub fn drag(&self) -> Option<&DragState> {
        self.drag.as_ref()
    }

    pub fn can_undo(&self) -> bool {
        self.commands.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.commands.can_redo()
    }

    fn execute(&mut self, mutation: BlockMutation, description: &str) -> bool {
        self.commands.execute(&mut self.board, mutation, description)
    }

    /// Drop a stale selection after the block list changed underneath it.
    fn reconcile_selection(&mut self) {
        if let Some(id) = self.state.selected()
            && self.board.get(id).is_none()
        {
            self.state.forget(id);
        }
    }

    // ─── Placement ───────────────────────────────────────────────────────

    /// Place a new block for `item` at visual point `(x, y)` and select it.
    pub fn drop_palette_item(&mut self, item: &PaletteItem, x: f32, y: f32) -> bool {
        if self.state.is_editing() {
            log::debug!("palette drop ignored while editing");
            return false;
        }
        let position = self.snap(x, y, GrabOffset::default());
        let block = Block::from_palette(item, position);
        let id = block.id;
        let added = self.execute(
            BlockMutation::AddBlock {
                block: Box::new(block),
                index: None,
            },
            "Add block",
        );
        if added {
            self.state.select(id);
        }
        added
    }

    /// Move a block so that its grab point lands at visual `(x, y)`.
    pub fn move_block(&mut self, id: BlockId, x: f32, y: f32, offset: GrabOffset) -> bool {
        if self.state.is_editing() {
            log::debug!("move ignored while editing");
            return false;
        }
        let position = self.snap(x, y, offset);
        self.execute(BlockMutation::MoveBlock { id, position }, "Move block")
    }

    fn snap(&self, x: f32, y: f32, offset: GrabOffset) -> Position {
        drag::drop_position(&self.viewport, &self.config.grid, x, y, offset)
    }

    pub fn delete_block(&mut self, id: BlockId) -> bool {
        let removed = self.execute(BlockMutation::RemoveBlock { id }, "Delete block");
        if removed {
            self.state.forget(id);
        }
        removed
    }

    /// Delete the selected block. Ignored while an editor is open.
    pub fn delete_selected(&mut self) -> bool {
        match self.state {
            Interaction::Selected(id) => self.delete_block(id),
            _ => false,
        }
    }

    // ─── Selection ───────────────────────────────────────────────────────

    pub fn select(&mut self, id: BlockId) -> bool {
        if self.board.get(id).is_none() {
            return false;
        }
        self.state.select(id)
    }

    /// Click on empty canvas.
    pub fn click_canvas(&mut self) -> bool {
        self.state.deselect()
    }

    // ─── Block editor ────────────────────────────────────────────────────

    /// Open the markup editor. `mode: None` is the double-click default.
    pub fn begin_edit(&mut self, id: BlockId, mode: Option<EditMode>) -> bool {
        match self.board.get(id) {
            Some(block) => self.state.begin_edit(block, mode),
            None => false,
        }
    }

    /// Replace the text of whichever editor is open.
    pub fn set_draft(&mut self, text: &str) -> bool {
        self.state.set_draft(text)
    }

    pub fn commit_edit(&mut self) -> bool {
        if !matches!(self.state, Interaction::Editing { .. }) {
            return false;
        }
        self.commit_active()
    }

    pub fn cancel_edit(&mut self) -> bool {
        matches!(self.state, Interaction::Editing { .. }) && self.state.cancel()
    }

    // ─── Slot editor ─────────────────────────────────────────────────────

    pub fn begin_slot_edit(&mut self, id: BlockId, path: SlotPath) -> bool {
        match self.board.get(id) {
            Some(block) => self.state.begin_slot_edit(block, path),
            None => false,
        }
    }

    pub fn commit_slot_edit(&mut self) -> bool {
        if !matches!(self.state, Interaction::SlotEditing { .. }) {
            return false;
        }
        self.commit_active()
    }

    pub fn cancel_slot_edit(&mut self) -> bool {
        matches!(self.state, Interaction::SlotEditing { .. }) && self.state.cancel()
    }

    /// Commit whichever editor is open (blur, Enter).
    fn commit_active(&mut self) -> bool {
        let was_editing = self.state.is_editing();
        let changed = match self.state.commit() {
            Some(mutation) => self.execute(mutation, "Edit"),
            None => false,
        };
        changed || was_editing
    }

    /// Replace the slot at `path` with a nested instance of `item`.
    pub fn drop_into_slot(&mut self, id: BlockId, path: SlotPath, item: &PaletteItem) -> bool {
        if self.state.is_editing() {
            log::debug!("slot drop ignored while editing");
            return false;
        }
        let value = Slot::nested(TemplateNode::from_palette(item));
        self.execute(BlockMutation::SetSlot { id, path, value }, "Insert template")
    }

    // ─── Drag and drop ───────────────────────────────────────────────────

    /// Start a drag gesture. Dragging a block also selects it.
    pub fn begin_drag(&mut self, payload: DragPayload) -> bool {
        if self.state.is_editing() {
            log::debug!("drag ignored while editing");
            return false;
        }
        if let DragPayload::Block(drag) = &payload {
            if self.board.get(drag.id).is_none() {
                return false;
            }
            self.state.select(drag.id);
        }
        self.drag = Some(DragState::new(payload));
        true
    }

    /// Live drag feedback: the snapped position a drop here would use.
    pub fn drag_over(&mut self, x: f32, y: f32) -> Option<Position> {
        let offset = self.drag.as_ref()?.payload.offset();
        let position = self.snap(x, y, offset);
        if let Some(drag) = &mut self.drag {
            drag.preview = Some(position);
        }
        Some(position)
    }

    /// Finish the active drag over `hit` at visual `(x, y)`.
    pub fn drop(&mut self, x: f32, y: f32, hit: &Hit) -> bool {
        let Some(DragState { payload, .. }) = self.drag.take() else {
            return false;
        };
        match (payload, hit) {
            (DragPayload::Palette(item), Hit::Slot { block, path }) => {
                self.drop_into_slot(*block, path.clone(), &item)
            }
            (DragPayload::Palette(item), _) => self.drop_palette_item(&item, x, y),
            (DragPayload::Block(drag), _) => self.move_block(drag.id, x, y, drag.offset),
        }
    }

    pub fn cancel_drag(&mut self) -> bool {
        self.drag.take().is_some()
    }

    // ─── Undo / redo ─────────────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        if self.state.is_editing() {
            return false;
        }
        let done = self.commands.undo(&mut self.board).is_some();
        self.reconcile_selection();
        done
    }

    pub fn redo(&mut self) -> bool {
        if self.state.is_editing() {
            return false;
        }
        let done = self.commands.redo(&mut self.board).is_some();
        self.reconcile_selection();
        done
    }

    // ─── Rendering & persistence ─────────────────────────────────────────

    pub fn render_block<T: Typesetter + ?Sized>(&self, engine: &T, id: BlockId) -> Option<Rendered> {
        let block = self.board.get(id)?;
        Some(render::render_block(
            engine,
            block,
            &self.config.expand,
            &self.config.typeset,
        ))
    }

    pub fn export_json(&self) -> Result<String, SnapshotError> {
        export::export_json(self.board.blocks())
    }

    /// Replace the canvas with a saved layout as one undoable step.
    /// Refused while an editor is open.
    pub fn load_json(&mut self, json: &str) -> Result<bool, SnapshotError> {
        if self.state.is_editing() {
            log::debug!("layout load ignored while editing");
            return Ok(false);
        }
        let blocks = export::import_json(json)?;
        self.drag = None;

        self.commands.begin_batch(&self.board, "Load layout");
        let existing: Vec<BlockId> = self.board.blocks().iter().map(|b| b.id).collect();
        let mut changed = false;
        for id in existing {
            changed |= self.execute(BlockMutation::RemoveBlock { id }, "Load layout");
        }
        for block in blocks {
            let add = BlockMutation::AddBlock {
                block: Box::new(block),
                index: None,
            };
            changed |= self.execute(add, "Load layout");
        }
        self.commands.end_batch(&self.board);
        self.reconcile_selection();
        Ok(changed)
    }

    // ─── Raw input ───────────────────────────────────────────────────────

    /// Route a normalized input event. `hit` is what lies under the pointer.
    pub fn handle_event(&mut self, event: &InputEvent, hit: &Hit) -> bool {
        match event {
            InputEvent::PointerDown {
                x, y, button: PointerButton::Middle, ..
            } => {
                self.pan_last = Some((*x, *y));
                false
            }
            InputEvent::PointerDown {
                button: PointerButton::Primary,
                ..
            } => self.click(hit),
            InputEvent::PointerDown { .. } => false,
            InputEvent::PointerMove { x, y } => {
                let Some((lx, ly)) = self.pan_last else {
                    return false;
                };
                self.pan_last = Some((*x, *y));
                let before = (self.viewport.scroll_x, self.viewport.scroll_y);
                self.viewport.pan_by(x - lx, y - ly);
                before != (self.viewport.scroll_x, self.viewport.scroll_y)
            }
            InputEvent::PointerUp { .. } => {
                self.pan_last = None;
                false
            }
            InputEvent::DoubleClick { .. } => match hit.block() {
                Some(id) if !matches!(hit, Hit::Slot { .. }) => self.begin_edit(id, None),
                _ => false,
            },
            InputEvent::Wheel { dy, modifiers, .. } if modifiers.ctrl => {
                self.viewport.zoom_by_wheel(*dy)
            }
            InputEvent::Wheel { .. } => false,
            InputEvent::Key { key, modifiers } => self.handle_key(key, *modifiers).changed,
            InputEvent::Blur => self.commit_active(),
        }
    }

    fn click(&mut self, hit: &Hit) -> bool {
        match hit {
            Hit::Canvas => self.click_canvas(),
            Hit::Block(id) => self.select(*id),
            Hit::Slot { block, path } => {
                let selected = self.select(*block);
                self.begin_slot_edit(*block, path.clone()) || selected
            }
        }
    }

    /// Keys go to the open editor first, then to the shortcut map.
    pub fn handle_key(&mut self, key: &str, modifiers: Modifiers) -> KeyResult {
        if self.state.is_editing() {
            let Some(edit) = self.state.edit_key(key, modifiers) else {
                return KeyResult::IGNORED;
            };
            let changed = match edit {
                EditKey::Commit => self.commit_active(),
                EditKey::Cancel => self.state.cancel(),
            };
            return KeyResult {
                action: Some(KeyAction::Editor(edit)),
                changed,
            };
        }

        let Some(action) = ShortcutMap::resolve(key, modifiers) else {
            return KeyResult::IGNORED;
        };
        let changed = match action {
            ShortcutAction::Undo => self.undo(),
            ShortcutAction::Redo => self.redo(),
            ShortcutAction::Delete => self.delete_selected(),
            ShortcutAction::Deselect => self.cancel_drag() | self.click_canvas(),
            // The host performs the download.
            ShortcutAction::Export => false,
        };
        KeyResult {
            action: Some(KeyAction::Shortcut(action)),
            changed,
        }
    }
}
