//! Manual rotation handle.
//!
//! Press-drag on the handle sets an absolute angle from the cumulative
//! horizontal pointer delta. Moves are coalesced to one parameter write
//! per frame; release writes the final angle exactly once.

use sc_core::frame::{FrameCoalescer, FrameToken};

/// Rotation slider granularity, degrees.
pub const ROTATION_STEP_DEGREES: f32 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Grab {
    start_x: f32,
    start_angle: f32,
}

#[derive(Debug)]
pub struct RotationDrag {
    sensitivity: f32,
    grab: Option<Grab>,
    writes: FrameCoalescer<f32>,
}

impl RotationDrag {
    /// `sensitivity` is radians per pixel of horizontal travel.
    pub fn new(sensitivity: f32) -> Self {
        Self {
            sensitivity,
            grab: None,
            writes: FrameCoalescer::new(),
        }
    }

    pub fn begin(&mut self, x: f32, current_angle: f32) {
        self.writes.cancel();
        self.grab = Some(Grab {
            start_x: x,
            start_angle: current_angle,
        });
    }

    /// Schedule the angle for pointer `x`. The returned token replaces any
    /// earlier one; pass it to [`RotationDrag::on_frame`].
    pub fn update(&mut self, x: f32) -> Option<FrameToken> {
        let g = self.grab?;
        let angle = g.start_angle + (x - g.start_x) * self.sensitivity;
        Some(self.writes.schedule(angle))
    }

    /// Frame callback. Yields the angle to write if `token` is current.
    pub fn on_frame(&mut self, token: FrameToken) -> Option<f32> {
        self.writes.take_for_frame(token)
    }

    /// Release. Always yields the final angle and drops any pending frame
    /// write, so the host writes it exactly once whatever frames ran.
    pub fn end(&mut self, x: f32) -> Option<f32> {
        let g = self.grab.take()?;
        self.writes.cancel();
        let angle = g.start_angle + (x - g.start_x) * self.sensitivity;
        Some(angle)
    }

    pub fn is_active(&self) -> bool {
        self.grab.is_some()
    }
}

/// Slider value in degrees → radians, snapped to the slider step and
/// clamped to one turn.
pub fn rotation_from_degrees(degrees: f32) -> f32 {
    let snapped = (degrees / ROTATION_STEP_DEGREES).round() * ROTATION_STEP_DEGREES;
    snapped.clamp(0.0, 360.0).to_radians()
}
