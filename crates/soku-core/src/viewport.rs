//! Canvas viewport: scroll offset and zoom.
//!
//! Pointer coordinates arrive relative to the visible scroll area. They are
//! shifted by the scroll offset and divided by the zoom scale to obtain the
//! logical canvas coordinates that blocks are stored in.

use serde::{Deserialize, Serialize};

/// Zoom bounds and wheel sensitivity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomLimits {
    pub min: f32,
    pub max: f32,
    /// Scale change per wheel delta unit.
    pub wheel_factor: f32,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            min: 0.1,
            max: 5.0,
            wheel_factor: 0.001,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub scroll_x: f32,
    pub scroll_y: f32,
    pub scale: f32,
    pub limits: ZoomLimits,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(ZoomLimits::default())
    }
}

impl Viewport {
    pub fn new(limits: ZoomLimits) -> Self {
        Self {
            scroll_x: 0.0,
            scroll_y: 0.0,
            scale: 1.0,
            limits,
        }
    }

    /// Convert a pointer position in the visible area to logical canvas space.
    pub fn to_logical(&self, x: f32, y: f32) -> (f32, f32) {
        ((x + self.scroll_x) / self.scale, (y + self.scroll_y) / self.scale)
    }

    /// Convert a logical canvas position to the visible area.
    pub fn to_visual(&self, x: f32, y: f32) -> (f32, f32) {
        (x * self.scale - self.scroll_x, y * self.scale - self.scroll_y)
    }

    /// Ctrl+wheel zoom. Scrolling up (negative delta) zooms in.
    /// Returns `true` if the scale changed.
    pub fn zoom_by_wheel(&mut self, delta_y: f32) -> bool {
        let next = (self.scale - delta_y * self.limits.wheel_factor)
            .clamp(self.limits.min, self.limits.max);
        let changed = next != self.scale;
        self.scale = next;
        changed
    }

    /// Set the scale directly, clamped to the limits.
    pub fn set_scale(&mut self, scale: f32) {
        self.scale = scale.clamp(self.limits.min, self.limits.max);
    }

    /// Drag-to-pan: the content follows the pointer, so the scroll offset
    /// moves opposite to it. The offset never goes negative.
    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        self.scroll_x = (self.scroll_x - dx).max(0.0);
        self.scroll_y = (self.scroll_y - dy).max(0.0);
    }
}
