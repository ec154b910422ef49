//! Core data model for SokuRepo documents.
//!
//! A document is a flat list of [`Block`]s placed on a grid. A *templated*
//! block carries a slot tree: its markup contains `<<k>>` markers, and slot
//! `k` holds either a leaf string or a nested [`TemplateNode`] with its own
//! markup and slots. Trees are immutable values; edits go through
//! [`crate::path`] and produce new trees that share untouched subtrees.

use crate::id::BlockId;
use crate::marker;
use crate::path::{self, SlotPath};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ─── Slots & templates ───────────────────────────────────────────────────

/// The value stored in a slot: a leaf string or a nested template.
///
/// Serialized untagged: a leaf is a JSON string, a nested node is an object
/// with `content` and `slots`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Slot {
    /// Plain text. Empty means "unfilled".
    Leaf(Arc<str>),
    /// A sub-expression with its own markers and slots.
    Nested(Arc<TemplateNode>),
}

impl Slot {
    pub fn leaf(value: impl AsRef<str>) -> Self {
        Slot::Leaf(Arc::from(value.as_ref()))
    }

    /// An unfilled leaf.
    pub fn empty() -> Self {
        Slot::Leaf(Arc::from(""))
    }

    pub fn nested(node: TemplateNode) -> Self {
        Slot::Nested(Arc::new(node))
    }

    /// True only for an existing leaf with no text. Nested slots are never empty.
    pub fn is_empty(&self) -> bool {
        matches!(self, Slot::Leaf(v) if v.is_empty())
    }

    pub fn as_leaf(&self) -> Option<&str> {
        match self {
            Slot::Leaf(v) => Some(v),
            Slot::Nested(_) => None,
        }
    }

    pub fn as_nested(&self) -> Option<&TemplateNode> {
        match self {
            Slot::Leaf(_) => None,
            Slot::Nested(node) => Some(node),
        }
    }
}

impl From<&str> for Slot {
    fn from(value: &str) -> Self {
        Slot::leaf(value)
    }
}

impl From<TemplateNode> for Slot {
    fn from(node: TemplateNode) -> Self {
        Slot::nested(node)
    }
}

/// A template: markup with `<<k>>` markers plus the ordered slots they refer to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateNode {
    pub content: String,
    #[serde(default)]
    pub slots: Vec<Slot>,
}

impl TemplateNode {
    pub fn new(content: impl Into<String>, slots: Vec<Slot>) -> Self {
        let content = content.into();
        let mut slots = slots;
        pad_slots(&content, &mut slots);
        Self { content, slots }
    }

    /// Instantiate a palette item as a nested sub-template.
    pub fn from_palette(item: &PaletteItem) -> Self {
        Self::new(item.latex.clone(), item.defaults.clone())
    }
}

/// Append empty leaves until every marker in `content` has a slot.
pub fn pad_slots(content: &str, slots: &mut Vec<Slot>) {
    if let Some(max) = marker::max_index(content) {
        while slots.len() <= max {
            slots.push(Slot::empty());
        }
    }
}

// ─── Blocks ──────────────────────────────────────────────────────────────

/// Palette item kind; decides how a block is edited in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    /// Free-form formula, edited as multi-line markup.
    #[default]
    Math,
    /// Value box, edited as a single auto-selected line.
    Input,
}

/// Whether a block carries a slot tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockShape {
    Plain,
    Templated,
}

/// Grid-aligned canvas position in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A placed, top-level expression on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    #[serde(rename = "type", default)]
    pub kind: BlockKind,
    /// Plain markup, or the root template's markup when templated.
    pub content: String,
    /// Present if and only if the block is templated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slots: Option<Vec<Slot>>,
    pub position: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
}

impl Block {
    /// A non-templated block with the given markup.
    ///
    /// Markup containing markers is promoted to a templated block so that a
    /// plain block never carries markers.
    pub fn plain(kind: BlockKind, content: impl Into<String>, position: Position) -> Self {
        let mut block = Self {
            id: BlockId::generate(),
            kind,
            content: String::new(),
            slots: None,
            position,
            width: None,
        };
        block.set_content(content.into());
        block
    }

    /// Instantiate a palette item as a new block.
    ///
    /// The block is templated when the item's markup has markers or the item
    /// ships default slot values.
    pub fn from_palette(item: &PaletteItem, position: Position) -> Self {
        let templated = marker::has_markers(&item.latex) || !item.defaults.is_empty();
        let slots = templated.then(|| {
            let mut slots = item.defaults.clone();
            pad_slots(&item.latex, &mut slots);
            slots
        });
        Self {
            id: BlockId::generate(),
            kind: item.kind,
            content: item.latex.clone(),
            slots,
            position,
            width: None,
        }
    }

    pub fn shape(&self) -> BlockShape {
        if self.slots.is_some() {
            BlockShape::Templated
        } else {
            BlockShape::Plain
        }
    }

    pub fn is_templated(&self) -> bool {
        self.slots.is_some()
    }

    /// Replace the block's markup, keeping the slot invariant.
    ///
    /// Existing slots are kept; empty leaves are appended for newly
    /// referenced indices. Markers on a plain block promote it to templated.
    pub fn set_content(&mut self, content: String) {
        if self.slots.is_none() && marker::has_markers(&content) {
            self.slots = Some(Vec::new());
        }
        if let Some(slots) = &mut self.slots {
            pad_slots(&content, slots);
        }
        self.content = content;
    }

    /// Read the slot at `path`, if it resolves.
    pub fn slot(&self, path: &[usize]) -> Option<&Slot> {
        self.slots.as_deref().and_then(|slots| path::get_slot(slots, path))
    }

    /// Write `value` at `path` through the persistent mutation engine.
    /// Returns `false` (and leaves the block untouched) when the path does
    /// not resolve, the block is plain, or the slot already holds `value`.
    pub fn set_slot(&mut self, path: &[usize], value: Slot) -> bool {
        let Some(slots) = &self.slots else {
            log::debug!("set_slot on plain block {}", self.id);
            return false;
        };
        if path::get_slot(slots, path) == Some(&value) {
            log::debug!("slot {path:?} of block {} unchanged", self.id);
            return false;
        }
        match path::try_set_slot(slots, path, value) {
            Some(next) => {
                self.slots = Some(next);
                true
            }
            None => false,
        }
    }

    /// Every leaf position in the block's slot tree, depth first.
    pub fn leaf_paths(&self) -> Vec<SlotPath> {
        self.slots.as_deref().map(path::leaf_paths).unwrap_or_default()
    }
}

// ─── Palette ─────────────────────────────────────────────────────────────

/// An immutable template prototype offered in the sidebar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaletteItem {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: BlockKind,
    pub label: String,
    pub latex: String,
    pub description: String,
    /// Initial slot values used when the item is instantiated.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub defaults: Vec<Slot>,
}
