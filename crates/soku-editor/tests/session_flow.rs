//! Integration tests: full editing flows through `Session` (soku-editor).
//!
//! Drives the session the way the canvas host does (drops, clicks, keys)
//! and checks the resulting blocks, selection, and rendering.

use pretty_assertions::assert_eq;
use soku_core::expand::expand;
use soku_core::model::*;
use soku_core::palette::{advanced_palette, sample_palette};
use soku_core::path::SlotPath;
use soku_core::render::{RenderError, Rendered, TypesetOptions, Typesetter};
use soku_editor::drag::{BlockDrag, DragPayload, GrabOffset};
use soku_editor::input::{Hit, InputEvent, Modifiers, PointerButton};
use soku_editor::interaction::{EditMode, Interaction};
use soku_editor::session::{KeyAction, Session};
use soku_editor::shortcuts::ShortcutAction;
use std::cell::RefCell;

// ─── Helpers ─────────────────────────────────────────────────────────────

fn palette(id: &str) -> PaletteItem {
    sample_palette()
        .into_iter()
        .chain(advanced_palette())
        .find(|item| item.id == id)
        .unwrap_or_else(|| panic!("no palette item {id}"))
}

/// Records every markup string it is asked to typeset.
#[derive(Default)]
struct Recorder {
    seen: RefCell<Vec<String>>,
}

impl Typesetter for Recorder {
    fn typeset(&self, markup: &str, _: &TypesetOptions) -> Result<String, RenderError> {
        self.seen.borrow_mut().push(markup.to_string());
        if markup.contains(r"\bad") {
            return Err(RenderError::Engine(r"Undefined control sequence: \bad".into()));
        }
        Ok(format!("<span class=\"katex\">{markup}</span>"))
    }
}

fn click(x: f32, y: f32) -> InputEvent {
    InputEvent::PointerDown {
        x,
        y,
        button: PointerButton::Primary,
        modifiers: Modifiers::NONE,
    }
}

fn key(session: &mut Session, key: &str) -> bool {
    session.handle_key(key, Modifiers::NONE).changed
}

fn expanded(block: &Block) -> String {
    let slots = block.slots.as_deref().unwrap_or_default();
    expand(&block.content, slots, &Default::default())
}

// ─── Scenarios ───────────────────────────────────────────────────────────

#[test]
fn slot_fill_and_nested_drop() {
    let mut session = Session::default();
    session.drop_palette_item(&palette("adv-frac"), 40.0, 40.0);
    let id = session.blocks()[0].id;

    // Click the numerator slot, type, press Enter.
    let hit = Hit::Slot {
        block: id,
        path: SlotPath::new(&[0]),
    };
    assert!(session.handle_event(&click(50.0, 50.0), &hit));
    assert!(matches!(session.interaction(), Interaction::SlotEditing { .. }));
    session.set_draft("a");
    assert!(key(&mut session, "Enter"));
    assert_eq!(session.interaction(), &Interaction::Selected(id));

    // Drop a root template onto the denominator.
    let target = Hit::Slot {
        block: id,
        path: SlotPath::new(&[1]),
    };
    assert!(session.begin_drag(DragPayload::Palette(palette("adv-sqrt"))));
    assert!(session.drop(60.0, 70.0, &target));
    assert_eq!(session.blocks().len(), 1);

    let block = session.block(id).unwrap();
    assert_eq!(block.slot(&[0]), Some(&Slot::leaf("a")));
    let paths: Vec<String> = block.leaf_paths().iter().map(ToString::to_string).collect();
    assert_eq!(paths, vec!["0", "1-0"]);
    assert!(expanded(block).contains(r"{\sqrt{\htmlId{slot-1-0}{\htmlClass{math-slot math-slot-empty}"));
}

#[test]
fn nested_template_is_not_editable_as_text() {
    let mut session = Session::default();
    session.drop_palette_item(&palette("adv-frac"), 0.0, 0.0);
    let id = session.blocks()[0].id;
    session.drop_into_slot(id, SlotPath::new(&[1]), &palette("adv-sqrt"));
    session.drop_into_slot(id, SlotPath::new(&[1, 0]), &palette("adv-vec"));
    let before = session.block(id).unwrap().clone();

    assert!(!session.begin_slot_edit(id, SlotPath::new(&[1])));
    let hit = Hit::Slot {
        block: id,
        path: SlotPath::new(&[1, 0]),
    };
    session.handle_event(&click(10.0, 10.0), &hit);
    assert_eq!(session.interaction(), &Interaction::Selected(id));

    session.handle_event(&InputEvent::Blur, &Hit::Canvas);
    assert_eq!(session.block(id).unwrap(), &before);
    assert!(session.begin_slot_edit(id, SlotPath::new(&[1, 0, 0])));
}

#[test]
fn clearing_markup_renders_unfilled_without_engine() {
    let mut session = Session::default();
    session.drop_palette_item(&palette("pythagorean"), 0.0, 0.0);
    let id = session.blocks()[0].id;

    let engine = Recorder::default();
    assert!(matches!(session.render_block(&engine, id), Some(Rendered::Markup(_))));
    assert_eq!(engine.seen.borrow().len(), 1);

    assert!(session.begin_edit(id, Some(EditMode::Full)));
    session.set_draft("");
    assert!(session.commit_edit());

    let block = session.block(id).unwrap();
    assert_eq!(block.content, "");
    assert!(!block.is_templated());
    assert_eq!(session.render_block(&engine, id), Some(Rendered::Unfilled));
    assert_eq!(engine.seen.borrow().len(), 1);
}

#[test]
fn moving_a_block_subtracts_the_grab_offset() {
    let mut session = Session::default();
    session.drop_palette_item(&palette("integral"), 100.0, 40.0);
    let id = session.blocks()[0].id;
    assert_eq!(session.blocks()[0].position, Position::new(100, 40));

    // The pointer goes down at (103, 57), 3 right of and 17 below the
    // block's top-left corner, and is released at (111, 69). The corner
    // lands at (108, 52), which rounds to the nearest line at (100, 60).
    let offset = GrabOffset { x: 3.0, y: 17.0 };
    assert!(session.begin_drag(DragPayload::Block(BlockDrag { id, offset })));
    assert_eq!(session.drag_over(111.0, 69.0), Some(Position::new(100, 60)));
    assert!(session.drop(111.0, 69.0, &Hit::Canvas));

    assert_eq!(session.block(id).unwrap().position, Position::new(100, 60));
    assert!(session.drag().is_none());
}

#[test]
fn block_stored_off_grid_snaps_on_move() {
    // A hand-edited layout may hold a corner that is off the grid.
    let mut session = Session::default();
    let json = r#"[{"id": "off-grid", "content": "x", "position": {"x": 103, "y": 57}}]"#;
    session.load_json(json).unwrap();
    let id = session.blocks()[0].id;

    // Grabbed 3 right and 17 below the corner, released at (111, 69).
    let offset = GrabOffset { x: 3.0, y: 17.0 };
    assert!(session.begin_drag(DragPayload::Block(BlockDrag { id, offset })));
    assert!(session.drop(111.0, 69.0, &Hit::Canvas));
    assert_eq!(session.block(id).unwrap().position, Position::new(100, 60));

    // Without an offset the release point itself is the corner.
    assert!(session.move_block(id, 111.0, 69.0, GrabOffset::default()));
    assert_eq!(session.block(id).unwrap().position, Position::new(120, 60));
}

#[test]
fn engine_failure_shows_indicator_and_keeps_data() {
    let mut session = Session::default();
    session.drop_palette_item(&palette("limit"), 0.0, 0.0);
    let id = session.blocks()[0].id;
    session.begin_edit(id, None);
    session.set_draft(r"\bad{x}");
    session.commit_edit();

    let engine = Recorder::default();
    let rendered = session.render_block(&engine, id).unwrap();
    assert!(rendered.is_error());
    assert!(rendered.to_html().contains("Invalid LaTeX"));
    assert_eq!(session.block(id).unwrap().content, r"\bad{x}");
}

#[test]
fn committing_markers_promotes_a_plain_block() {
    let mut session = Session::default();
    session.drop_palette_item(&palette("pythagorean"), 0.0, 0.0);
    let id = session.blocks()[0].id;

    session.begin_edit(id, None);
    session.set_draft(r"\frac{<<0>>}{<<2>>}");
    assert!(key(&mut session, "Enter"));

    let block = session.block(id).unwrap();
    assert_eq!(block.slots, Some(vec![Slot::empty(), Slot::empty(), Slot::empty()]));
    assert!(session.begin_slot_edit(id, SlotPath::new(&[2])));
}

#[test]
fn full_editor_keeps_shift_enter_as_newline() {
    let mut session = Session::default();
    session.drop_palette_item(&palette("maxwell"), 0.0, 0.0);
    let id = session.blocks()[0].id;
    let before = session.block(id).unwrap().content.clone();

    let shift = Modifiers {
        shift: true,
        ..Modifiers::NONE
    };
    session.begin_edit(id, None);
    session.set_draft("E = mc^2");
    let result = session.handle_key("Enter", shift);
    assert_eq!(result.action, None);
    assert!(session.interaction().is_editing());

    let result = session.handle_key("Escape", Modifiers::NONE);
    assert!(matches!(result.action, Some(KeyAction::Editor(_))));
    assert_eq!(session.block(id).unwrap().content, before);
}

#[test]
fn blur_commits_the_slot_editor() {
    let mut session = Session::default();
    session.drop_palette_item(&palette("adv-basic"), 0.0, 0.0);
    let id = session.blocks()[0].id;
    session.begin_slot_edit(id, SlotPath::new(&[0]));
    session.set_draft(" 7 ");
    assert!(session.handle_event(&InputEvent::Blur, &Hit::Canvas));
    assert_eq!(session.block(id).unwrap().slot(&[0]), Some(&Slot::leaf("7")));
}

#[test]
fn editing_blocks_selection_drag_and_other_editors() {
    let mut session = Session::default();
    session.drop_palette_item(&palette("adv-frac"), 0.0, 0.0);
    session.drop_palette_item(&palette("pythagorean"), 200.0, 0.0);
    let first = session.blocks()[0].id;
    let second = session.blocks()[1].id;

    assert!(session.begin_slot_edit(first, SlotPath::new(&[0])));
    assert!(!session.select(second));
    assert!(!session.begin_edit(second, None));
    assert!(!session.begin_drag(DragPayload::Block(BlockDrag {
        id: second,
        offset: GrabOffset::default(),
    })));
    assert!(!session.drop_palette_item(&palette("adv-sqrt"), 0.0, 0.0));
    assert!(!session.handle_event(&click(0.0, 0.0), &Hit::Canvas));
    assert_eq!(session.selected(), Some(first));

    assert!(session.cancel_slot_edit());
    assert!(session.select(second));
}

#[test]
fn escape_deselects_and_double_click_opens_quick_editor() {
    let mut session = Session::default();
    session.drop_palette_item(&palette("adv-basic"), 0.0, 0.0);
    let id = session.blocks()[0].id;

    let result = session.handle_key("Escape", Modifiers::NONE);
    assert_eq!(result.action, Some(KeyAction::Shortcut(ShortcutAction::Deselect)));
    assert_eq!(session.selected(), None);

    // Templated value boxes open the full editor on double click.
    let dbl = InputEvent::DoubleClick { x: 5.0, y: 5.0 };
    assert!(session.handle_event(&dbl, &Hit::Block(id)));
    assert!(matches!(
        session.interaction(),
        Interaction::Editing {
            mode: EditMode::Full,
            ..
        }
    ));
    session.cancel_edit();

    let value = PaletteItem {
        latex: "3".into(),
        ..palette("adv-basic")
    };
    session.drop_palette_item(&value, 0.0, 100.0);
    let plain = session.blocks()[1].id;
    session.handle_event(&dbl, &Hit::Block(plain));
    assert!(matches!(
        session.interaction(),
        Interaction::Editing {
            mode: EditMode::Quick,
            ..
        }
    ));
}

#[test]
fn export_lists_blocks_in_drop_order() {
    let mut session = Session::default();
    session.drop_palette_item(&palette("matrix"), 0.0, 0.0);
    session.drop_palette_item(&palette("adv-frac"), 0.0, 200.0);

    let json = session.export_json().unwrap();
    let back = soku_core::export::import_json(&json).unwrap();
    assert_eq!(back, session.blocks());
    assert!(json.contains(r#""type": "input""#));

    let result = session.handle_key("s", Modifiers { ctrl: true, ..Modifiers::NONE });
    assert_eq!(result.action, Some(KeyAction::Shortcut(ShortcutAction::Export)));
    assert!(!result.changed);
}
