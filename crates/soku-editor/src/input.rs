//! Input abstraction layer.
//!
//! Normalizes DOM pointer, wheel, and keyboard events into a unified
//! `InputEvent` enum consumed by the session, and resolves what was under
//! the pointer into a [`Hit`].

use soku_core::expand::parse_slot_id;
use soku_core::id::BlockId;
use soku_core::path::SlotPath;

/// Keyboard modifier state at the time of an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        shift: false,
        alt: false,
        meta: false,
    };

    /// The platform command key: Ctrl, or Cmd on macOS.
    pub fn cmd(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Mouse button, numbered as in `MouseEvent.button`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Middle,
    Secondary,
    Other(i16),
}

impl From<i16> for PointerButton {
    fn from(button: i16) -> Self {
        match button {
            0 => Self::Primary,
            1 => Self::Middle,
            2 => Self::Secondary,
            n => Self::Other(n),
        }
    }
}

/// A normalized input event. Coordinates are relative to the visible
/// canvas area, before scroll and zoom.
#[derive(Debug, Clone)]
pub enum InputEvent {
    PointerDown {
        x: f32,
        y: f32,
        button: PointerButton,
        modifiers: Modifiers,
    },
    PointerMove {
        x: f32,
        y: f32,
    },
    PointerUp {
        x: f32,
        y: f32,
    },
    DoubleClick {
        x: f32,
        y: f32,
    },
    Wheel {
        dx: f32,
        dy: f32,
        modifiers: Modifiers,
    },
    Key {
        key: String,
        modifiers: Modifiers,
    },
    /// The active editor lost focus.
    Blur,
}

impl InputEvent {
    /// Extract position if this is a pointer event.
    pub fn position(&self) -> Option<(f32, f32)> {
        match self {
            Self::PointerDown { x, y, .. }
            | Self::PointerMove { x, y }
            | Self::PointerUp { x, y }
            | Self::DoubleClick { x, y } => Some((*x, *y)),
            _ => None,
        }
    }
}

/// What the pointer landed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hit {
    /// Empty canvas.
    Canvas,
    /// A block body.
    Block(BlockId),
    /// A rendered slot inside a templated block.
    Slot { block: BlockId, path: SlotPath },
}

impl Hit {
    /// Resolve a hit from the DOM: the id of the block element under the
    /// pointer (if any) and the id of the innermost element with an id.
    ///
    /// Unknown block ids resolve to the canvas.
    pub fn resolve(block_id: Option<&str>, element_id: Option<&str>) -> Self {
        let Some(block) = block_id.and_then(BlockId::lookup) else {
            return Hit::Canvas;
        };
        match element_id.and_then(parse_slot_id) {
            Some(path) => Hit::Slot { block, path },
            None => Hit::Block(block),
        }
    }

    pub fn block(&self) -> Option<BlockId> {
        match self {
            Hit::Canvas => None,
            Hit::Block(id) | Hit::Slot { block: id, .. } => Some(*id),
        }
    }
}
