//! Display list → Vello scene.

use crate::paint::{DisplayList, DrawOp};
use kurbo::{Affine, Circle, Point, Rect, Stroke};
use peniko::{Color as PenikoColor, Fill};
use sc_core::model::Color;
use vello::Scene;

/// Encode `list` into `scene`. The caller resets the scene beforehand and
/// presents it afterwards; `surface` is the target size in pixels.
///
/// [`DrawOp::Label`] ops (frame and image captions, the comment glyph)
/// are not drawn: there is no font context here. Hosts draw them on top
/// from [`label_overlays`].
pub fn encode_scene(scene: &mut Scene, list: &DisplayList, surface: (f64, f64)) {
    let xf = list.transform;
    for op in &list.ops {
        match op {
            DrawOp::Clear { color } => {
                // A transparent clear is the reset the caller already did.
                if color.a > 0.0 {
                    let full = Rect::new(0.0, 0.0, surface.0, surface.1);
                    scene.fill(Fill::NonZero, Affine::IDENTITY, to_peniko(color), None, &full);
                }
            }
            DrawOp::FillRect { rect, color } => {
                scene.fill(Fill::NonZero, xf, to_peniko(color), None, rect);
            }
            DrawOp::StrokeRect {
                rect,
                color,
                width,
                dash,
            } => {
                scene.stroke(&stroke_style(*width, *dash), xf, to_peniko(color), None, rect);
            }
            DrawOp::FillCircle {
                center,
                radius,
                color,
            } => {
                let circle = Circle::new(*center, *radius);
                scene.fill(Fill::NonZero, xf, to_peniko(color), None, &circle);
            }
            DrawOp::StrokeCircle {
                center,
                radius,
                color,
                width,
                dash,
            } => {
                let circle = Circle::new(*center, *radius);
                scene.stroke(&stroke_style(*width, *dash), xf, to_peniko(color), None, &circle);
            }
            DrawOp::Label { text, center, .. } => {
                log::trace!("LABEL {text:?} at ({}, {})", center.x, center.y);
                // Glyph output requires a font context; labels are skipped.
            }
        }
    }
}

/// A label left for the host to draw, in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelOverlay {
    pub text: &'static str,
    pub center: Point,
    /// Font size in pixels.
    pub size: f64,
    pub color: Color,
}

/// The labels [`encode_scene`] skips, in paint order.
pub fn label_overlays(list: &DisplayList) -> Vec<LabelOverlay> {
    list.ops
        .iter()
        .filter_map(|op| match op {
            DrawOp::Label {
                text,
                center,
                size,
                color,
            } => Some(LabelOverlay {
                text: *text,
                center: list.transform * *center,
                size: *size,
                color: *color,
            }),
            _ => None,
        })
        .collect()
}

fn stroke_style(width: f64, dash: Option<[f64; 2]>) -> Stroke {
    let stroke = Stroke::new(width);
    match dash {
        Some(pattern) => stroke.with_dashes(0.0, pattern),
        None => stroke,
    }
}

fn to_peniko(c: &Color) -> PenikoColor {
    let [r, g, b, a] = c.to_rgba8();
    PenikoColor::from_rgba8(r, g, b, a)
}
