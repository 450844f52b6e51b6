//! Pan/zoom coordinate transform.
//!
//! ```text
//! world  = (screen - pan) / scale
//! screen = world * scale + pan
//! ```
//!
//! Zooming is anchored at the cursor: the world point under the cursor
//! stays under the same screen pixel across a zoom step.

use serde::{Deserialize, Serialize};

/// Zoom scale bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomLimits {
    pub min: f32,
    pub max: f32,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self { min: 0.1, max: 5.0 }
    }
}

impl ZoomLimits {
    pub fn clamp(&self, scale: f32) -> f32 {
        scale.clamp(self.min, self.max)
    }
}

/// Pan offset (screen pixels) plus zoom scale. One per open document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub pan_x: f32,
    pub pan_y: f32,
    pub scale: f32,
    pub limits: ZoomLimits,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            pan_x: 0.0,
            pan_y: 0.0,
            scale: 1.0,
            limits: ZoomLimits::default(),
        }
    }
}

/// Below this a clamped zoom step is treated as no change.
const SCALE_EPSILON: f32 = 0.001;

impl Viewport {
    pub fn new(limits: ZoomLimits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    pub fn screen_to_world(&self, sx: f32, sy: f32) -> (f32, f32) {
        ((sx - self.pan_x) / self.scale, (sy - self.pan_y) / self.scale)
    }

    pub fn world_to_screen(&self, wx: f32, wy: f32) -> (f32, f32) {
        (wx * self.scale + self.pan_x, wy * self.scale + self.pan_y)
    }

    pub fn set_pan(&mut self, x: f32, y: f32) {
        self.pan_x = x;
        self.pan_y = y;
    }

    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        self.pan_x += dx;
        self.pan_y += dy;
    }

    /// Set the scale directly (clamped), keeping the pan untouched.
    pub fn set_scale(&mut self, scale: f32) {
        self.scale = self.limits.clamp(scale);
    }

    /// Change the scale to `new_scale` (clamped) while keeping the world
    /// point under `(cx, cy)` fixed on screen.
    ///
    /// Returns `false` when the clamped scale is effectively unchanged.
    pub fn zoom_at(&mut self, cx: f32, cy: f32, new_scale: f32) -> bool {
        let s0 = self.scale;
        let s1 = self.limits.clamp(new_scale);
        if (s1 - s0).abs() < SCALE_EPSILON {
            return false;
        }
        let factor = (s1 - s0) / s0;
        self.pan_x -= (cx - self.pan_x) * factor;
        self.pan_y -= (cy - self.pan_y) * factor;
        self.scale = s1;
        true
    }

    /// One wheel notch of zoom. `delta_y > 0` (scrolling down) zooms out.
    pub fn zoom_step(&mut self, cx: f32, cy: f32, delta_y: f32, step: f32) -> bool {
        let direction = if delta_y > 0.0 { -1.0 } else { 1.0 };
        self.zoom_at(cx, cy, self.scale * (1.0 + step * direction))
    }

    /// Two-axis wheel pan. With `swap_axes` the vertical wheel drives the
    /// horizontal pan (shift+wheel on mice without a horizontal wheel).
    pub fn wheel_pan(&mut self, delta_x: f32, delta_y: f32, swap_axes: bool, sensitivity: f32) {
        let dx = (delta_x + if swap_axes { delta_y } else { 0.0 }) * sensitivity;
        let dy = if swap_axes { 0.0 } else { delta_y } * sensitivity;
        self.pan_x -= dx;
        self.pan_y -= dy;
    }
}
