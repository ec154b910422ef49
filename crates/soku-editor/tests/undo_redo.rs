//! Integration tests: undo/redo through the session (soku-editor).
//!
//! Every block-list change made by a session operation must be reversible,
//! and undo must never leave a dangling selection.

use pretty_assertions::assert_eq;
use soku_core::model::*;
use soku_core::palette::advanced_palette;
use soku_core::path::SlotPath;
use soku_editor::drag::GrabOffset;
use soku_editor::input::{Hit, InputEvent, Modifiers};
use soku_editor::session::{Session, SessionConfig};

fn palette(id: &str) -> PaletteItem {
    advanced_palette()
        .into_iter()
        .find(|item| item.id == id)
        .unwrap_or_else(|| panic!("no palette item {id}"))
}

fn cmd(key: &str, shift: bool) -> (String, Modifiers) {
    let modifiers = Modifiers {
        meta: true,
        shift,
        ..Modifiers::NONE
    };
    (key.to_string(), modifiers)
}

// ─── Basic undo/redo ────────────────────────────────────────────────────

#[test]
fn undo_add_clears_selection() {
    let mut session = Session::default();
    session.drop_palette_item(&palette("adv-frac"), 0.0, 0.0);
    assert!(session.selected().is_some());

    assert!(session.undo());
    assert!(session.blocks().is_empty());
    assert_eq!(session.selected(), None);

    assert!(session.redo());
    assert_eq!(session.blocks().len(), 1);
}

#[test]
fn slot_edits_undo_one_at_a_time() {
    let mut session = Session::default();
    session.drop_palette_item(&palette("adv-frac"), 0.0, 0.0);
    let id = session.blocks()[0].id;

    for (index, text) in [(0, "1"), (1, "2")] {
        session.begin_slot_edit(id, SlotPath::new(&[index]));
        session.set_draft(text);
        session.commit_slot_edit();
    }
    let filled = session.block(id).unwrap().slots.clone();

    session.undo();
    assert_eq!(session.block(id).unwrap().slot(&[1]), Some(&Slot::empty()));
    assert_eq!(session.block(id).unwrap().slot(&[0]), Some(&Slot::leaf("1")));

    session.redo();
    assert_eq!(session.block(id).unwrap().slots, filled);
}

#[test]
fn undo_content_edit_removes_promoted_slots() {
    let mut session = Session::default();
    let plain = PaletteItem {
        latex: "x".into(),
        ..palette("adv-basic")
    };
    session.drop_palette_item(&plain, 0.0, 0.0);
    let id = session.blocks()[0].id;

    session.begin_edit(id, None);
    session.set_draft(r"\sqrt{<<0>>}");
    session.commit_edit();
    assert!(session.block(id).unwrap().is_templated());

    session.undo();
    let block = session.block(id).unwrap();
    assert_eq!(block.content, "x");
    assert!(!block.is_templated());
}

#[test]
fn keyboard_shortcuts_drive_history() {
    let mut session = Session::default();
    session.drop_palette_item(&palette("adv-sqrt"), 0.0, 0.0);
    let id = session.blocks()[0].id;
    session.move_block(id, 200.0, 100.0, GrabOffset::default());

    let (key, mods) = cmd("z", false);
    assert!(session.handle_key(&key, mods).changed);
    assert_eq!(session.block(id).unwrap().position, Position::new(0, 0));

    let (key, mods) = cmd("z", true);
    assert!(session.handle_key(&key, mods).changed);
    assert_eq!(session.block(id).unwrap().position, Position::new(200, 100));

    let (key, mods) = cmd("y", false);
    assert!(!session.handle_key(&key, mods).changed);
}

#[test]
fn history_is_frozen_while_editing() {
    let mut session = Session::default();
    session.drop_palette_item(&palette("adv-sqrt"), 0.0, 0.0);
    let id = session.blocks()[0].id;
    session.begin_slot_edit(id, SlotPath::new(&[0]));
    session.set_draft("typed but unsaved");

    assert!(!session.undo());
    assert!(!session.load_json("[]").unwrap());
    assert_eq!(session.blocks().len(), 1);
    assert!(session.interaction().is_editing());
    assert_eq!(session.interaction().draft(), Some("typed but unsaved"));
}

#[test]
fn unchanged_slot_commit_adds_no_history() {
    let mut session = Session::default();
    session.drop_palette_item(&palette("adv-basic"), 0.0, 0.0);
    let id = session.blocks()[0].id;

    session.begin_slot_edit(id, SlotPath::new(&[0]));
    assert!(session.handle_event(&InputEvent::Blur, &Hit::Canvas));
    assert!(!session.can_redo());

    // The only step on the stack is the drop itself.
    assert!(session.undo());
    assert!(session.blocks().is_empty());
    assert!(!session.can_undo());
}

#[test]
fn deep_layout_exports_and_loads_back() {
    let mut session = Session::default();
    session.drop_palette_item(&palette("adv-sqrt"), 0.0, 0.0);
    let id = session.blocks()[0].id;
    let mut path = SlotPath::new(&[0]);
    for _ in 0..70 {
        assert!(session.drop_into_slot(id, path.clone(), &palette("adv-sqrt")));
        path.push(0);
    }
    let saved = session.blocks().to_vec();

    let json = session.export_json().unwrap();
    let mut other = Session::default();
    assert!(other.load_json(&json).unwrap());
    assert_eq!(other.blocks(), saved.as_slice());
}

#[test]
fn undo_depth_is_configurable() {
    let mut session = Session::new(SessionConfig {
        undo_depth: 2,
        ..SessionConfig::default()
    });
    session.drop_palette_item(&palette("adv-sqrt"), 0.0, 0.0);
    let id = session.blocks()[0].id;
    for x in [20.0, 40.0, 60.0] {
        session.move_block(id, x, 0.0, GrabOffset::default());
    }
    assert!(session.undo());
    assert!(session.undo());
    assert!(!session.undo());
    assert_eq!(session.block(id).unwrap().position, Position::new(20, 0));
}

// ─── Layout loading ─────────────────────────────────────────────────────

#[test]
fn loading_a_layout_is_one_step() {
    let mut session = Session::default();
    session.drop_palette_item(&palette("adv-frac"), 0.0, 0.0);
    let original = session.blocks().to_vec();

    let json = r#"[
        {"id": "loaded-a", "type": "math", "content": "a", "position": {"x": 0, "y": 0}},
        {"id": "loaded-b", "type": "input", "content": "<<0>>", "slots": ["4"], "position": {"x": 20, "y": 0}}
    ]"#;
    assert!(session.load_json(json).unwrap());
    assert_eq!(session.blocks().len(), 2);
    assert_eq!(session.selected(), None);

    assert!(session.undo());
    assert_eq!(session.blocks(), original.as_slice());
    assert!(session.redo());
    assert_eq!(session.blocks().len(), 2);
}

#[test]
fn malformed_layout_leaves_canvas_alone() {
    let mut session = Session::default();
    session.drop_palette_item(&palette("adv-frac"), 0.0, 0.0);
    assert!(session.load_json("[{").is_err());
    assert_eq!(session.blocks().len(), 1);
    assert!(session.can_undo());
}
