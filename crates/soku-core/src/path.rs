//! Path addressing and copy-on-write slot updates.
//!
//! A [`SlotPath`] lists slot indices from the root's slots outward:
//! `[2, 0]` is slot 0 of the template nested at root slot 2. Updates never
//! touch their input. Each ancestor on the path is rebuilt; every other slot
//! is carried over as an `Arc` clone, so untouched subtrees stay
//! pointer-identical to the previous tree.

use crate::model::{Slot, TemplateNode};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Separator used when a path is rendered as an identifier string.
pub const PATH_SEPARATOR: char = '-';

/// An address of a slot at arbitrary nesting depth.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotPath(SmallVec<[usize; 4]>);

impl SlotPath {
    /// The empty path (the root slot list itself; addresses no slot).
    pub fn root() -> Self {
        Self(SmallVec::new())
    }

    pub fn new(segments: &[usize]) -> Self {
        Self(SmallVec::from_slice(segments))
    }

    /// This path extended by one more index.
    #[must_use]
    pub fn child(&self, index: usize) -> Self {
        let mut next = self.clone();
        next.0.push(index);
        next
    }

    pub fn push(&mut self, index: usize) {
        self.0.push(index);
    }

    pub fn pop(&mut self) -> Option<usize> {
        self.0.pop()
    }

    pub fn segments(&self) -> &[usize] {
        &self.0
    }

    /// Parse the `-`-joined form produced by `Display`.
    pub fn parse(s: &str) -> Option<Self> {
        if s.is_empty() {
            return None;
        }
        s.split(PATH_SEPARATOR)
            .map(|seg| seg.parse::<usize>().ok())
            .collect::<Option<SmallVec<[usize; 4]>>>()
            .map(Self)
    }
}

impl Deref for SlotPath {
    type Target = [usize];

    fn deref(&self) -> &[usize] {
        &self.0
    }
}

impl From<&[usize]> for SlotPath {
    fn from(segments: &[usize]) -> Self {
        Self::new(segments)
    }
}

impl From<Vec<usize>> for SlotPath {
    fn from(segments: Vec<usize>) -> Self {
        Self(SmallVec::from_vec(segments))
    }
}

impl fmt::Display for SlotPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "{PATH_SEPARATOR}")?;
            }
            write!(f, "{seg}")?;
        }
        Ok(())
    }
}

// ─── Reads ───────────────────────────────────────────────────────────────

/// Resolve `path` against `slots`.
///
/// Returns `None` for an empty path, an out-of-range index, or a leaf
/// standing where a nested template is required.
pub fn get_slot<'a>(slots: &'a [Slot], path: &[usize]) -> Option<&'a Slot> {
    let (&last, spine) = path.split_last()?;
    let mut level = slots;
    for &index in spine {
        match level.get(index)? {
            Slot::Nested(node) => level = &node.slots,
            Slot::Leaf(_) => return None,
        }
    }
    level.get(last)
}

/// Every leaf path in depth-first, index order.
pub fn leaf_paths(slots: &[Slot]) -> Vec<SlotPath> {
    let mut out = Vec::new();
    // Explicit stack: trees have no depth limit.
    let mut stack: Vec<(&[Slot], SlotPath)> = vec![(slots, SlotPath::root())];
    while let Some((level, prefix)) = stack.pop() {
        for (index, slot) in level.iter().enumerate() {
            let path = prefix.child(index);
            match slot {
                Slot::Leaf(_) => out.push(path),
                Slot::Nested(node) => stack.push((node.slots.as_slice(), path)),
            }
        }
    }
    out.sort_by(|a, b| a.segments().cmp(b.segments()));
    out
}

// ─── Writes ──────────────────────────────────────────────────────────────

/// Persistent update: a new slot list with `value` stored at `path`.
///
/// Returns `None` when the path does not resolve (empty path, index out of
/// range at any level, or a leaf where a nested template is needed).
pub fn try_set_slot(slots: &[Slot], path: &[usize], value: Slot) -> Option<Vec<Slot>> {
    let (&head, rest) = path.split_first()?;
    let current = slots.get(head)?;

    let replacement = if rest.is_empty() {
        value
    } else {
        let Slot::Nested(node) = current else {
            log::debug!("slot path {path:?} descends into a leaf at index {head}");
            return None;
        };
        let inner = try_set_slot(&node.slots, rest, value)?;
        Slot::Nested(Arc::new(TemplateNode {
            content: node.content.clone(),
            slots: inner,
        }))
    };

    let mut next = slots.to_vec();
    next[head] = replacement;
    Some(next)
}

/// Persistent update with the silent no-op policy.
///
/// When the path does not resolve, the result is a shallow copy of the
/// input: deep-equal, with every entry shared.
pub fn set_slot(slots: &[Slot], path: &[usize], value: Slot) -> Vec<Slot> {
    try_set_slot(slots, path, value).unwrap_or_else(|| {
        log::debug!("ignoring slot update at unresolved path {path:?}");
        slots.to_vec()
    })
}
