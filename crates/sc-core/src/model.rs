//! Canvas node model.
//!
//! A document is a flat, ordered list of nodes: list order is paint order,
//! so the last node is drawn on top and wins hit tests. Nodes carry only
//! placement data; solid nodes keep their 3D parameters in a separate
//! [`ParamStore`](crate::params::ParamStore) keyed by node id.

use crate::id::NodeId;
use serde::{Deserialize, Serialize};

// ─── Colors ──────────────────────────────────────────────────────────────

/// RGBA color, 4 × f32 in [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0)
    }

    /// Parse `#RGB`, `#RRGGBB` or `#RRGGBBAA`; the leading `#` is optional.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();
        let pair = |i: usize| -> Option<u8> { Some(hex_val(bytes[i])? << 4 | hex_val(bytes[i + 1])?) };

        match bytes.len() {
            3 => {
                let r = hex_val(bytes[0])? * 17;
                let g = hex_val(bytes[1])? * 17;
                let b = hex_val(bytes[2])? * 17;
                Some(Self::from_rgb8(r, g, b))
            }
            6 => Some(Self::from_rgb8(pair(0)?, pair(2)?, pair(4)?)),
            8 => {
                let mut c = Self::from_rgb8(pair(0)?, pair(2)?, pair(4)?);
                c.a = pair(6)? as f32 / 255.0;
                Some(c)
            }
            _ => None,
        }
    }

    /// Quantize to 8-bit channels. Material signatures key on this so that
    /// colors that round to the same bytes share one material.
    pub fn to_rgba8(&self) -> [u8; 4] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    /// `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
    pub fn to_hex(&self) -> String {
        let [r, g, b, a] = self.to_rgba8();
        if a == 255 {
            format!("#{r:02x}{g:02x}{b:02x}")
        } else {
            format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
        }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
}

// ─── Nodes ───────────────────────────────────────────────────────────────

/// What a node is. Only `Solid` nodes own 3D parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Frame,
    Solid,
    Image,
    Comment,
}

impl NodeKind {
    /// Prefix used when minting ids for this kind.
    pub fn id_prefix(self) -> &'static str {
        match self {
            NodeKind::Frame => "frame",
            NodeKind::Solid => "solid",
            NodeKind::Image => "image",
            NodeKind::Comment => "comment",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            NodeKind::Frame => "Frame",
            NodeKind::Solid => "3D",
            NodeKind::Image => "Image",
            NodeKind::Comment => "Comment",
        }
    }
}

/// A placed canvas element. Coordinates are world units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Degrees.
    pub rotation: f32,
    /// 0.0 ..= 1.0
    pub opacity: f32,
}

impl Node {
    pub fn new(id: NodeId, kind: NodeKind, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            id,
            kind,
            x,
            y,
            width,
            height,
            rotation: 0.0,
            opacity: 1.0,
        }
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn geometry(&self) -> NodeGeometry {
        NodeGeometry {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        }
    }
}

/// Position and size of a node, the part drag and resize sessions touch.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeGeometry {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Partial node update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodePatch {
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub rotation: Option<f32>,
    pub opacity: Option<f32>,
}

impl NodePatch {
    pub fn position(x: f32, y: f32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    pub fn geometry(g: NodeGeometry) -> Self {
        Self {
            x: Some(g.x),
            y: Some(g.y),
            width: Some(g.width),
            height: Some(g.height),
            ..Self::default()
        }
    }
}

/// A node kind armed for creation. It follows the pointer as a preview and
/// is consumed by the next canvas click.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendingNode {
    pub kind: NodeKind,
    pub width: f32,
    pub height: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_roundtrip_opaque() {
        let c = Color::from_hex("#3498db").unwrap();
        assert_eq!(c.to_hex(), "#3498db");
        assert_eq!(c.to_rgba8(), [0x34, 0x98, 0xdb, 255]);
    }

    #[test]
    fn hex_short_form_expands() {
        let c = Color::from_hex("fff").unwrap();
        assert_eq!(c.to_rgba8(), [255, 255, 255, 255]);
    }

    #[test]
    fn hex_with_alpha() {
        let c = Color::from_hex("#00000080").unwrap();
        assert_eq!(c.to_rgba8()[3], 128);
        assert_eq!(c.to_hex(), "#00000080");
    }

    #[test]
    fn hex_rejects_garbage() {
        assert!(Color::from_hex("#12").is_none());
        assert!(Color::from_hex("#zzzzzz").is_none());
    }

    #[test]
    fn node_edges() {
        let n = Node::new(NodeId::intern("n"), NodeKind::Frame, 10.0, 20.0, 30.0, 40.0);
        assert_eq!(n.right(), 40.0);
        assert_eq!(n.bottom(), 60.0);
        assert_eq!(n.center(), (25.0, 40.0));
    }
}
