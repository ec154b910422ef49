//! WASM bridge for SokuRepo: exposes the editing session to the page.
//!
//! Compiled via `wasm-pack build --target web`. The page owns the DOM and
//! KaTeX; this side owns every block, the selection and the history.

mod katex;

pub use katex::KatexTypesetter;

use serde_json::json;
use soku_core::export::EXPORT_FILE_NAME;
use soku_core::id::BlockId;
use soku_core::lint;
use soku_core::model::PaletteItem;
use soku_core::palette::PaletteMode;
use soku_core::path::SlotPath;
use soku_editor::drag::{BLOCK_MIME, BlockDrag, DragPayload, GrabOffset};
use soku_editor::input::{Hit, InputEvent, Modifiers, PointerButton};
use soku_editor::interaction::{EditKey, EditMode, Interaction};
use soku_editor::session::{KeyAction, Session, SessionConfig};
use soku_editor::shortcuts::ShortcutAction;
use wasm_bindgen::prelude::*;

/// The page-facing canvas controller.
///
/// Wraps one [`Session`]. Mutating methods return `true` when the page
/// should re-render.
#[wasm_bindgen]
pub struct SokuCanvas {
    session: Session,
    palette_mode: PaletteMode,
}

#[wasm_bindgen]
impl SokuCanvas {
    /// Create a controller. `config_json` may override any subset of the
    /// session settings; malformed config falls back to the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Self {
        console_error_panic_hook_setup();
        Self {
            session: Session::new(parse_config(config_json.as_deref())),
            palette_mode: PaletteMode::default(),
        }
    }

    // ─── Pointer & keyboard ──────────────────────────────────────────────

    /// `block_id` is the block element under the pointer, `element_id` the
    /// innermost element id (a slot wrapper when the pointer is on a slot).
    #[allow(clippy::too_many_arguments)]
    pub fn handle_pointer_down(
        &mut self,
        x: f32,
        y: f32,
        button: i16,
        block_id: Option<String>,
        element_id: Option<String>,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
    ) -> bool {
        let event = InputEvent::PointerDown {
            x,
            y,
            button: PointerButton::from(button),
            modifiers: Modifiers {
                ctrl,
                shift,
                alt,
                meta,
            },
        };
        self.session
            .handle_event(&event, &resolve_hit(&block_id, &element_id))
    }

    pub fn handle_pointer_move(&mut self, x: f32, y: f32) -> bool {
        self.session
            .handle_event(&InputEvent::PointerMove { x, y }, &Hit::Canvas)
    }

    pub fn handle_pointer_up(&mut self, x: f32, y: f32) -> bool {
        self.session
            .handle_event(&InputEvent::PointerUp { x, y }, &Hit::Canvas)
    }

    pub fn handle_double_click(
        &mut self,
        x: f32,
        y: f32,
        block_id: Option<String>,
        element_id: Option<String>,
    ) -> bool {
        self.session.handle_event(
            &InputEvent::DoubleClick { x, y },
            &resolve_hit(&block_id, &element_id),
        )
    }

    /// Returns `true` when the zoom changed; the page should then call
    /// `preventDefault` on the wheel event.
    pub fn handle_wheel(&mut self, dx: f32, dy: f32, ctrl: bool, meta: bool) -> bool {
        let event = InputEvent::Wheel {
            dx,
            dy,
            modifiers: Modifiers {
                ctrl,
                meta,
                ..Modifiers::NONE
            },
        };
        self.session.handle_event(&event, &Hit::Canvas)
    }

    /// Handle a keyboard event. Returns a JSON string:
    /// `{"changed":bool,"action":"<action_name>"}`
    pub fn handle_key(&mut self, key: &str, ctrl: bool, shift: bool, alt: bool, meta: bool) -> String {
        let result = self.session.handle_key(
            key,
            Modifiers {
                ctrl,
                shift,
                alt,
                meta,
            },
        );
        let action = result.action.map_or("none", action_to_name);
        let changed = if result.changed { "true" } else { "false" };
        format!(r#"{{"changed":{changed},"action":"{action}"}}"#)
    }

    /// The editor input lost focus: commit whatever is open.
    pub fn handle_blur(&mut self) -> bool {
        self.session.handle_event(&InputEvent::Blur, &Hit::Canvas)
    }

    // ─── Selection & editing ─────────────────────────────────────────────

    /// Select a block by id; an empty id deselects.
    pub fn select_by_id(&mut self, block_id: &str) -> bool {
        if block_id.is_empty() {
            return self.session.click_canvas();
        }
        match BlockId::lookup(block_id) {
            Some(id) => self.session.select(id),
            None => false,
        }
    }

    /// Selected (or edited) block id, or empty string if none.
    pub fn get_selected_id(&self) -> String {
        self.session
            .selected()
            .map(|id| id.as_str().to_string())
            .unwrap_or_default()
    }

    /// Open the markup editor. `mode` is `"quick"`, `"full"`, or empty for
    /// the double-click default.
    pub fn begin_edit(&mut self, block_id: &str, mode: &str) -> bool {
        let Some(id) = BlockId::lookup(block_id) else {
            return false;
        };
        let mode = match mode {
            "quick" => Some(EditMode::Quick),
            "full" => Some(EditMode::Full),
            _ => None,
        };
        self.session.begin_edit(id, mode)
    }

    /// Open the slot editor for the slot rendered with element id
    /// `slot_element_id` (e.g. `slot-1-0`).
    pub fn begin_slot_edit(&mut self, block_id: &str, slot_element_id: &str) -> bool {
        let Some((id, path)) = block_and_path(block_id, slot_element_id) else {
            return false;
        };
        self.session.begin_slot_edit(id, path)
    }

    pub fn set_draft(&mut self, text: &str) -> bool {
        self.session.set_draft(text)
    }

    /// Commit whichever editor is open.
    pub fn commit(&mut self) -> bool {
        self.session.commit_edit() || self.session.commit_slot_edit()
    }

    /// Close whichever editor is open without applying it.
    pub fn cancel(&mut self) -> bool {
        self.session.cancel_edit() || self.session.cancel_slot_edit()
    }

    pub fn delete_block(&mut self, block_id: &str) -> bool {
        BlockId::lookup(block_id).is_some_and(|id| self.session.delete_block(id))
    }

    pub fn delete_selected(&mut self) -> bool {
        self.session.delete_selected()
    }

    pub fn undo(&mut self) -> bool {
        self.session.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.session.redo()
    }

    // ─── Drag and drop ───────────────────────────────────────────────────

    /// Start dragging a palette item. Returns the `DataTransfer` payload as
    /// JSON `{"mime":...,"effect":...,"data":...}`, or empty string when the
    /// drag was refused.
    pub fn begin_palette_drag(&mut self, item_json: &str) -> String {
        let Ok(item) = serde_json::from_str::<PaletteItem>(item_json) else {
            return String::new();
        };
        self.begin_drag(DragPayload::Palette(item))
    }

    /// Start moving a block grabbed at `(offset_x, offset_y)` from its
    /// top-left corner.
    pub fn begin_block_drag(&mut self, block_id: &str, offset_x: f32, offset_y: f32) -> String {
        let Some(id) = BlockId::lookup(block_id) else {
            return String::new();
        };
        let offset = GrabOffset {
            x: offset_x,
            y: offset_y,
        };
        self.begin_drag(DragPayload::Block(BlockDrag { id, offset }))
    }

    fn begin_drag(&mut self, payload: DragPayload) -> String {
        let Ok(data) = payload.to_json() else {
            return String::new();
        };
        let (mime, effect) = (payload.mime(), payload.effect());
        if !self.session.begin_drag(payload) {
            return String::new();
        }
        json!({ "mime": mime, "effect": effect, "data": data }).to_string()
    }

    /// Snapped drop position as JSON `{"x":..,"y":..}`, or `null` when no
    /// drag is active.
    pub fn drag_over(&mut self, x: f32, y: f32) -> String {
        match self.session.drag_over(x, y) {
            Some(position) => json!({ "x": position.x, "y": position.y }).to_string(),
            None => "null".to_string(),
        }
    }

    /// Finish a drag. When the gesture started outside this controller
    /// (another tab, a reload), the payload is decoded from `mime`/`data`.
    pub fn drop(
        &mut self,
        x: f32,
        y: f32,
        mime: &str,
        data: &str,
        block_id: Option<String>,
        element_id: Option<String>,
    ) -> bool {
        if self.session.drag().is_none() {
            let Some(payload) = DragPayload::from_json(mime, data) else {
                return false;
            };
            if !self.session.begin_drag(payload) {
                return false;
            }
        }
        self.session
            .drop(x, y, &resolve_hit(&block_id, &element_id))
    }

    pub fn cancel_drag(&mut self) -> bool {
        self.session.cancel_drag()
    }

    /// MIME type the page should accept for block moves.
    pub fn block_mime(&self) -> String {
        BLOCK_MIME.to_string()
    }

    // ─── Rendering ───────────────────────────────────────────────────────

    /// KaTeX HTML for one block, or an inline indicator. Empty string for
    /// an unknown id.
    pub fn render_block_html(&self, block_id: &str) -> String {
        BlockId::lookup(block_id)
            .and_then(|id| self.session.render_block(&KatexTypesetter, id))
            .map(|rendered| rendered.to_html().to_string())
            .unwrap_or_default()
    }

    /// All blocks in draw order, in the export format.
    pub fn get_blocks_json(&self) -> String {
        serde_json::to_string(self.session.blocks()).unwrap_or_else(|_| "[]".to_string())
    }

    /// Interaction and viewport state for the page chrome.
    pub fn get_state_json(&self) -> String {
        let viewport = &self.session.viewport;
        let (mode, draft, slot) = match self.session.interaction() {
            Interaction::Idle => ("idle", None, None),
            Interaction::Selected(_) => ("selected", None, None),
            Interaction::Editing {
                mode: EditMode::Quick,
                draft,
                ..
            } => ("quickEdit", Some(draft.as_str()), None),
            Interaction::Editing { draft, .. } => ("fullEdit", Some(draft.as_str()), None),
            Interaction::SlotEditing { path, draft, .. } => {
                ("slotEdit", Some(draft.as_str()), Some(path.to_string()))
            }
        };
        json!({
            "mode": mode,
            "selected": self.session.selected().map(|id| id.as_str().to_string()),
            "draft": draft,
            "slot": slot,
            "dragging": self.session.drag().is_some(),
            "canUndo": self.session.can_undo(),
            "canRedo": self.session.can_redo(),
            "scale": viewport.scale,
            "scrollX": viewport.scroll_x,
            "scrollY": viewport.scroll_y,
            "palette": self.palette_mode,
        })
        .to_string()
    }

    // ─── Palette ─────────────────────────────────────────────────────────

    /// Items of the current catalogue as JSON.
    pub fn get_palette_json(&self) -> String {
        palette_json(self.palette_mode)
    }

    /// Switch between the sample and advanced catalogues. Returns the new
    /// mode name.
    pub fn toggle_palette(&mut self) -> String {
        self.palette_mode = self.palette_mode.toggled();
        mode_name(self.palette_mode).to_string()
    }

    // ─── Persistence ─────────────────────────────────────────────────────

    /// Pretty JSON for the download, or empty string on failure.
    pub fn export_json(&self) -> String {
        self.session
            .export_json()
            .inspect_err(|err| log::warn!("export failed: {err}"))
            .unwrap_or_default()
    }

    pub fn export_file_name(&self) -> String {
        EXPORT_FILE_NAME.to_string()
    }

    /// Replace the canvas with a saved layout. Returns JSON:
    /// `{"ok":true,"changed":bool}` or `{"ok":false,"error":"..."}`.
    pub fn load_json(&mut self, json: &str) -> String {
        match self.session.load_json(json) {
            Ok(changed) => format!(r#"{{"ok":true,"changed":{changed}}}"#),
            Err(e) => error_json(&e.to_string()),
        }
    }

    /// Lint findings for every block, as a JSON array.
    pub fn lint_json(&self) -> String {
        serde_json::to_string(&lint::lint_blocks(self.session.blocks()))
            .unwrap_or_else(|_| "[]".to_string())
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────

fn parse_config(json: Option<&str>) -> SessionConfig {
    let Some(json) = json.filter(|s| !s.trim().is_empty()) else {
        return SessionConfig::default();
    };
    serde_json::from_str(json)
        .inspect_err(|err| log::warn!("ignoring session config: {err}"))
        .unwrap_or_default()
}

fn resolve_hit(block_id: &Option<String>, element_id: &Option<String>) -> Hit {
    Hit::resolve(block_id.as_deref(), element_id.as_deref())
}

fn block_and_path(block_id: &str, slot_element_id: &str) -> Option<(BlockId, SlotPath)> {
    match Hit::resolve(Some(block_id), Some(slot_element_id)) {
        Hit::Slot { block, path } => Some((block, path)),
        _ => None,
    }
}

fn action_to_name(action: KeyAction) -> &'static str {
    match action {
        KeyAction::Editor(EditKey::Commit) => "commit",
        KeyAction::Editor(EditKey::Cancel) => "cancel",
        KeyAction::Shortcut(ShortcutAction::Undo) => "undo",
        KeyAction::Shortcut(ShortcutAction::Redo) => "redo",
        KeyAction::Shortcut(ShortcutAction::Delete) => "delete",
        KeyAction::Shortcut(ShortcutAction::Export) => "export",
        KeyAction::Shortcut(ShortcutAction::Deselect) => "deselect",
    }
}

fn mode_name(mode: PaletteMode) -> &'static str {
    match mode {
        PaletteMode::Sample => "sample",
        PaletteMode::Advanced => "advanced",
    }
}

fn palette_json(mode: PaletteMode) -> String {
    serde_json::to_string(&mode.items()).unwrap_or_else(|_| "[]".to_string())
}

fn error_json(message: &str) -> String {
    let escaped = message.replace('\\', "\\\\").replace('"', "\\\"");
    format!(r#"{{"ok":false,"error":"{escaped}"}}"#)
}

// ─── Panic hook for WASM debugging ───────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("SokuRepo WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

// ─── Standalone functions (no canvas needed) ─────────────────────────────

/// Palette catalogue by name (`"sample"` or `"advanced"`) as JSON.
#[wasm_bindgen]
pub fn palette_items(mode: &str) -> String {
    let mode = if mode == "advanced" {
        PaletteMode::Advanced
    } else {
        PaletteMode::Sample
    };
    palette_json(mode)
}

/// Markup for a palette thumbnail: markers shown as empty boxes.
#[wasm_bindgen]
pub fn preview_markup(latex: &str) -> String {
    soku_core::expand::preview(latex)
}

/// Validate a saved layout. Returns JSON:
/// `{"ok":true,"blocks":n,"diagnostics":[...]}` or `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn validate(layout_json: &str) -> String {
    match soku_core::export::import_json(layout_json) {
        Ok(blocks) => {
            let diagnostics = lint::lint_blocks(&blocks);
            match serde_json::to_string(&diagnostics) {
                Ok(list) => format!(
                    r#"{{"ok":true,"blocks":{},"diagnostics":{list}}}"#,
                    blocks.len()
                ),
                Err(e) => error_json(&format!("Serialization error: {e}")),
            }
        }
        Err(e) => error_json(&e.to_string()),
    }
}
