//! Template expansion: slot tree → one flat markup string for the typesetter.
//!
//! Every leaf is wrapped in `\htmlId{slot-<path>}{\htmlClass{...}{...}}` so
//! the rendered output can be mapped back to a [`SlotPath`] on click or drop.
//! Nested templates are spliced in without a wrapper of their own.

use crate::marker::replace_markers;
use crate::model::Slot;
use crate::path::SlotPath;
use serde::{Deserialize, Serialize};

/// Invisible filler that keeps an unfilled slot at a clickable size.
pub const EMPTY_FILLER: &str = r"\color{transparent}{00}";

/// Prefix of the rendered element id carrying a slot path.
pub const SLOT_ID_PREFIX: &str = "slot-";

/// Base class on every slot wrapper.
pub const SLOT_CLASS: &str = "math-slot";
pub const SLOT_CLASS_EMPTY: &str = "math-slot-empty";
pub const SLOT_CLASS_FILLED: &str = "math-slot-filled";
/// Marks a nested template cut off by the depth cap.
pub const SLOT_CLASS_OVERFLOW: &str = "math-slot-overflow";
/// Class used by palette previews.
pub const SLOT_CLASS_PREVIEW: &str = "math-slot-preview";

/// Expansion settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpandConfig {
    /// Markup substituted for an empty leaf.
    pub empty_filler: String,
    /// Deepest nesting level that is expanded; deeper templates render as
    /// an overflow filler instead of recursing.
    pub max_depth: usize,
}

impl Default for ExpandConfig {
    fn default() -> Self {
        Self {
            empty_filler: EMPTY_FILLER.to_string(),
            max_depth: 64,
        }
    }
}

/// Element id for the slot at `path` (e.g. `slot-1-0`).
pub fn slot_id(path: &SlotPath) -> String {
    format!("{SLOT_ID_PREFIX}{path}")
}

/// Recover a slot path from a rendered element id.
pub fn parse_slot_id(id: &str) -> Option<SlotPath> {
    id.strip_prefix(SLOT_ID_PREFIX).and_then(SlotPath::parse)
}

/// Expand `content` against `slots` into a single markup string.
///
/// - A leaf becomes its text (or the empty filler) in a path-tagged wrapper.
/// - A nested template is expanded recursively and spliced in place.
/// - A marker with no matching slot stays in the output verbatim.
#[must_use]
pub fn expand(content: &str, slots: &[Slot], config: &ExpandConfig) -> String {
    let mut path = SlotPath::root();
    let out = expand_level(content, slots, &mut path, 0, config);
    log::trace!("expanded {} slot(s) into {} bytes", slots.len(), out.len());
    out
}

fn expand_level(
    content: &str,
    slots: &[Slot],
    path: &mut SlotPath,
    depth: usize,
    config: &ExpandConfig,
) -> String {
    replace_markers(content, |index| {
        let slot = slots.get(index)?;
        path.push(index);
        let text = match slot {
            Slot::Leaf(value) => wrap_leaf(path, value, config),
            Slot::Nested(_) if depth >= config.max_depth => {
                log::debug!("nested template at {path} exceeds depth {}", config.max_depth);
                // No slot id: the cut-off subtree is not an editable leaf.
                format!(
                    r"\htmlClass{{{SLOT_CLASS} {SLOT_CLASS_OVERFLOW}}}{{{}}}",
                    config.empty_filler
                )
            }
            Slot::Nested(node) => expand_level(&node.content, &node.slots, path, depth + 1, config),
        };
        path.pop();
        Some(text)
    })
}

fn wrap_leaf(path: &SlotPath, value: &str, config: &ExpandConfig) -> String {
    if value.is_empty() {
        wrap(path, SLOT_CLASS_EMPTY, &config.empty_filler)
    } else {
        wrap(path, SLOT_CLASS_FILLED, value)
    }
}

fn wrap(path: &SlotPath, state: &str, body: &str) -> String {
    format!(
        r"\htmlId{{{id}}}{{\htmlClass{{{SLOT_CLASS} {state}}}{{{body}}}}}",
        id = slot_id(path)
    )
}

/// Palette card preview: every marker becomes a transparent placeholder.
#[must_use]
pub fn preview(content: &str) -> String {
    let filler = format!(r"\htmlClass{{{SLOT_CLASS_PREVIEW}}}{{{EMPTY_FILLER}}}");
    replace_markers(content, |_| Some(filler.clone()))
}
