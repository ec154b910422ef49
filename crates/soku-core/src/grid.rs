//! Placement grid: snaps free-form logical coordinates to a fixed pitch.

use crate::model::Position;
use serde::{Deserialize, Serialize};

/// Default grid pitch in logical pixels.
pub const GRID_SIZE: u32 = 20;

/// Grid settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Distance between grid lines. Zero is treated as one.
    pub pitch: u32,
    /// Lower bound for snapped coordinates on both axes, if any.
    pub min: Option<f32>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            pitch: GRID_SIZE,
            min: Some(0.0),
        }
    }
}

impl GridConfig {
    /// A grid without a lower bound.
    pub fn unbounded() -> Self {
        Self {
            min: None,
            ..Self::default()
        }
    }

    fn pitch_f32(&self) -> f32 {
        self.pitch.max(1) as f32
    }

    /// Round `v` to the nearest multiple of the pitch (halves round up),
    /// then clamp to the first grid line at or above the lower bound.
    pub fn quantize(&self, v: f32) -> f32 {
        let pitch = self.pitch_f32();
        let snapped = (v / pitch + 0.5).floor() * pitch;
        match self.min {
            Some(lo) => snapped.max((lo / pitch).ceil() * pitch),
            None => snapped,
        }
    }

    /// Snap a logical point to a grid-aligned position.
    pub fn snap(&self, x: f32, y: f32) -> Position {
        Position::new(self.quantize(x) as i32, self.quantize(y) as i32)
    }
}
