//! Editor tunables.
//!
//! Everything the interaction layer treats as a constant lives here so a
//! host can override it from JSON. Missing fields take their defaults.

use crate::model::NodeKind;
use serde::{Deserialize, Serialize};

/// Interaction and viewport configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Lower zoom bound.
    pub min_zoom: f32,
    /// Upper zoom bound.
    pub max_zoom: f32,
    /// Multiplicative zoom change per wheel notch (0.05 = 5%).
    pub zoom_step: f32,
    /// Wheel-delta to pan-pixel factor.
    pub pan_sensitivity: f32,
    /// Resize handle edge length in screen pixels.
    pub handle_size: f32,
    /// Distance from a node edge, in screen pixels, that still grabs it.
    pub edge_threshold: f32,
    /// Smallest width/height a resize can produce, in world units.
    pub min_node_size: f32,
    /// Manual-rotation handle: radians per horizontal pixel.
    pub rotation_sensitivity: f32,
    pub frame_size: (f32, f32),
    pub solid_size: (f32, f32),
    pub image_size: (f32, f32),
    pub comment_size: (f32, f32),
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            min_zoom: 0.1,
            max_zoom: 5.0,
            zoom_step: 0.05,
            pan_sensitivity: 1.0,
            handle_size: 8.0,
            edge_threshold: 8.0,
            min_node_size: 20.0,
            rotation_sensitivity: 0.01,
            frame_size: (300.0, 300.0),
            solid_size: (200.0, 200.0),
            image_size: (200.0, 200.0),
            comment_size: (100.0, 100.0),
        }
    }
}

impl EditorConfig {
    /// Parse a (possibly partial) JSON override.
    ///
    /// # Errors
    /// Returns the serde error if `json` is not a valid config object.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut config: Self = serde_json::from_str(json)?;
        if config.min_zoom > config.max_zoom {
            log::warn!(
                "min_zoom {} exceeds max_zoom {}; swapping",
                config.min_zoom,
                config.max_zoom
            );
            std::mem::swap(&mut config.min_zoom, &mut config.max_zoom);
        }
        Ok(config)
    }

    /// Default creation size for `kind`.
    pub fn default_size(&self, kind: NodeKind) -> (f32, f32) {
        match kind {
            NodeKind::Frame => self.frame_size,
            NodeKind::Solid => self.solid_size,
            NodeKind::Image => self.image_size,
            NodeKind::Comment => self.comment_size,
        }
    }
}
