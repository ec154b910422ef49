//! Lint diagnostics for slot templates.
//!
//! Reports structural issues without modifying anything. Neither finding is
//! an error at render time: a dangling marker renders literally and an
//! unused slot is inert.

use crate::id::BlockId;
use crate::marker;
use crate::model::{Block, Slot};
use crate::path::SlotPath;
use serde::Serialize;

// ─── Diagnostic types ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LintSeverity {
    /// Likely a mistake.
    Warning,
    Info,
}

/// A single finding inside one template level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LintDiagnostic {
    /// The template level the finding refers to (root is the empty path).
    pub path: SlotPath,
    pub message: String,
    pub severity: LintSeverity,
    /// Short rule identifier (e.g. "dangling-marker").
    pub rule: &'static str,
}

/// A finding attributed to a block on the canvas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockDiagnostic {
    pub block: BlockId,
    #[serde(flatten)]
    pub diagnostic: LintDiagnostic,
}

// ─── Public API ───────────────────────────────────────────────────────────

/// Check a template and all templates nested inside it.
#[must_use]
pub fn lint_template(content: &str, slots: &[Slot]) -> Vec<LintDiagnostic> {
    let mut diags = Vec::new();
    let mut stack = vec![(content, slots, SlotPath::root())];
    while let Some((content, slots, path)) = stack.pop() {
        lint_level(content, slots, &path, &mut diags);
        for (index, slot) in slots.iter().enumerate().rev() {
            if let Slot::Nested(node) = slot {
                stack.push((node.content.as_str(), node.slots.as_slice(), path.child(index)));
            }
        }
    }
    diags
}

/// Check every block on the canvas.
#[must_use]
pub fn lint_blocks(blocks: &[Block]) -> Vec<BlockDiagnostic> {
    let mut out = Vec::new();
    for block in blocks {
        let diags = match &block.slots {
            Some(slots) => lint_template(&block.content, slots),
            None => lint_plain(&block.content),
        };
        out.extend(diags.into_iter().map(|diagnostic| BlockDiagnostic {
            block: block.id,
            diagnostic,
        }));
    }
    out
}

// ─── Rules ────────────────────────────────────────────────────────────────

fn lint_level(content: &str, slots: &[Slot], path: &SlotPath, diags: &mut Vec<LintDiagnostic>) {
    let referenced = marker::referenced_indices(content);

    for &index in referenced.range(slots.len()..) {
        diags.push(LintDiagnostic {
            path: path.clone(),
            message: format!(
                "Marker `<<{index}>>` has no slot ({} slot(s) defined); it will render literally.",
                slots.len()
            ),
            severity: LintSeverity::Warning,
            rule: "dangling-marker",
        });
    }

    for index in (0..slots.len()).filter(|i| !referenced.contains(i)) {
        diags.push(LintDiagnostic {
            path: path.clone(),
            message: format!("Slot {index} is never referenced by a marker."),
            severity: LintSeverity::Info,
            rule: "unused-slot",
        });
    }
}

/// Plain blocks are normalized on edit, so markers here mean the block came
/// from an external layout file.
fn lint_plain(content: &str) -> Vec<LintDiagnostic> {
    if !marker::has_markers(content) {
        return Vec::new();
    }
    vec![LintDiagnostic {
        path: SlotPath::root(),
        message: "Markers in a block without slots will render literally.".into(),
        severity: LintSeverity::Warning,
        rule: "marker-in-plain",
    }]
}
