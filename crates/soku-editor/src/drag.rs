//! Drag-and-drop payloads and drop placement.
//!
//! Two gestures share the canvas drop target: dragging a palette item (copy)
//! and dragging an existing block (move). The payload travels through the
//! browser's `DataTransfer` as JSON under its own MIME type.

use serde::{Deserialize, Serialize};
use soku_core::grid::GridConfig;
use soku_core::id::BlockId;
use soku_core::model::{PaletteItem, Position};
use soku_core::viewport::Viewport;

/// MIME type for a palette item payload.
pub const PALETTE_MIME: &str = "application/json";
/// MIME type for a block move payload.
pub const BLOCK_MIME: &str = "application/x-sokurepo-block+json";

/// Where inside the block the pointer grabbed it, in visual pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GrabOffset {
    pub x: f32,
    pub y: f32,
}

/// A block being moved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockDrag {
    pub id: BlockId,
    #[serde(default)]
    pub offset: GrabOffset,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DragPayload {
    Palette(PaletteItem),
    Block(BlockDrag),
}

impl DragPayload {
    pub fn mime(&self) -> &'static str {
        match self {
            DragPayload::Palette(_) => PALETTE_MIME,
            DragPayload::Block(_) => BLOCK_MIME,
        }
    }

    /// `effectAllowed` / `dropEffect` for the gesture.
    pub fn effect(&self) -> &'static str {
        match self {
            DragPayload::Palette(_) => "copy",
            DragPayload::Block(_) => "move",
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        match self {
            DragPayload::Palette(item) => serde_json::to_string(item),
            DragPayload::Block(drag) => serde_json::to_string(drag),
        }
    }

    /// Decode a transferred payload. Unknown MIME types and malformed data
    /// yield `None`.
    pub fn from_json(mime: &str, data: &str) -> Option<Self> {
        let parsed = match mime {
            PALETTE_MIME => serde_json::from_str(data).map(DragPayload::Palette),
            BLOCK_MIME => serde_json::from_str(data).map(DragPayload::Block),
            _ => {
                log::debug!("ignoring drag payload of type {mime}");
                return None;
            }
        };
        parsed
            .inspect_err(|err| log::debug!("malformed {mime} payload: {err}"))
            .ok()
    }

    /// The grab offset subtracted from the drop point (zero for palette
    /// drops, which place the block's corner at the pointer).
    pub fn offset(&self) -> GrabOffset {
        match self {
            DragPayload::Palette(_) => GrabOffset::default(),
            DragPayload::Block(drag) => drag.offset,
        }
    }
}

/// An active drag gesture, cleared on drop or cancel.
#[derive(Debug, Clone, PartialEq)]
pub struct DragState {
    pub payload: DragPayload,
    /// Last snapped position reported by `drag_over`.
    pub preview: Option<Position>,
}

impl DragState {
    pub fn new(payload: DragPayload) -> Self {
        Self {
            payload,
            preview: None,
        }
    }
}

/// Snapped logical position for a drop at visual point `(x, y)`.
pub fn drop_position(
    viewport: &Viewport,
    grid: &GridConfig,
    x: f32,
    y: f32,
    offset: GrabOffset,
) -> Position {
    let (lx, ly) = viewport.to_logical(x - offset.x, y - offset.y);
    let position = grid.snap(lx, ly);
    log::trace!("drop at ({x}, {y}) -> logical ({lx}, {ly}) -> {position:?}");
    position
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use soku_core::palette::sample_palette;

    #[test]
    fn block_payload_wire_format() {
        let payload = DragPayload::Block(BlockDrag {
            id: BlockId::intern("drag-wire"),
            offset: GrabOffset { x: 3.0, y: 17.0 },
        });
        let json = payload.to_json().unwrap();
        assert_eq!(json, r#"{"id":"drag-wire","offset":{"x":3.0,"y":17.0}}"#);
        assert_eq!(DragPayload::from_json(BLOCK_MIME, &json), Some(payload));
    }

    #[test]
    fn palette_payload_is_the_item() {
        let item = sample_palette().remove(0);
        let payload = DragPayload::Palette(item.clone());
        let json = payload.to_json().unwrap();
        assert_eq!(json, serde_json::to_string(&item).unwrap());
        assert_eq!(DragPayload::from_json(PALETTE_MIME, &json), Some(payload));
        assert_eq!(DragPayload::Palette(item).offset(), GrabOffset::default());
    }

    #[test]
    fn bad_payloads_are_ignored() {
        assert_eq!(DragPayload::from_json("text/uri-list", "x"), None);
        assert_eq!(DragPayload::from_json(BLOCK_MIME, "{"), None);
        assert_eq!(DragPayload::from_json(PALETTE_MIME, r#"{"id":"x"}"#), None);
    }

    #[test]
    fn drop_subtracts_offset_then_zooms_then_snaps() {
        let viewport = Viewport {
            scale: 2.0,
            ..Viewport::default()
        };
        let grid = GridConfig::default();
        let at = drop_position(&viewport, &grid, 250.0, 130.0, GrabOffset { x: 10.0, y: 10.0 });
        // (240 / 2, 120 / 2) = (120, 60)
        assert_eq!(at, Position::new(120, 60));
    }

    #[test]
    fn drop_near_origin_clamps() {
        let at = drop_position(
            &Viewport::default(),
            &GridConfig::default(),
            4.0,
            4.0,
            GrabOffset { x: 30.0, y: 30.0 },
        );
        assert_eq!(at, Position::new(0, 0));
    }
}
