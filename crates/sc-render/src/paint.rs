//! Document → display list.
//!
//! The immediate renderer rebuilds a flat [`DisplayList`] on every state
//! change: clear, then per node (bottom to top) its kind glyph followed by
//! its selection/hover decorations, then the pending-creation preview.
//! Geometry is in world units; `DisplayList::transform` maps to screen.
//! Decoration widths are divided by the zoom scale so they stay a fixed
//! number of screen pixels.

use kurbo::{Affine, Point, Rect};
use sc_core::id::NodeId;
use sc_core::model::{Color, Node, NodeKind, PendingNode};
use sc_core::viewport::Viewport;

// ─── Palette ─────────────────────────────────────────────────────────────

const FRAME_STROKE: Color = rgb(0x6a, 0x6a, 0x6a);
const IMAGE_FILL: Color = rgb(0x4a, 0x4a, 0x4a);
const LABEL: Color = rgb(0x88, 0x88, 0x88);
const COMMENT_FILL: Color = rgb(0x5a, 0x5a, 0x2a);
const COMMENT_STROKE: Color = rgb(0x8a, 0x8a, 0x4a);
const COMMENT_GLYPH: Color = rgb(0xcc, 0xcc, 0x88);
const PENDING_STROKE: Color = rgb(0x7a, 0x7a, 0xff);
const SELECTION: Color = rgb(0x4a, 0x9e, 0xff);

const PENDING_ALPHA: f32 = 0.5;
const HOVER_ALPHA: f32 = 0.6;
const PENDING_DASH: [f64; 2] = [5.0, 5.0];

const fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color::rgba(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0)
}

// ─── Display list ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Clear the whole surface (screen space).
    Clear { color: Color },
    FillRect { rect: Rect, color: Color },
    StrokeRect {
        rect: Rect,
        color: Color,
        width: f64,
        dash: Option<[f64; 2]>,
    },
    FillCircle { center: Point, radius: f64, color: Color },
    StrokeCircle {
        center: Point,
        radius: f64,
        color: Color,
        width: f64,
        dash: Option<[f64; 2]>,
    },
    /// Centred text. Needs a font context to paint.
    Label {
        text: &'static str,
        center: Point,
        size: f64,
        color: Color,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisplayList {
    /// World → screen.
    pub transform: Affine,
    pub ops: Vec<DrawOp>,
}

impl DisplayList {
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Everything one redraw needs.
#[derive(Debug, Clone, Copy)]
pub struct PaintInput<'a> {
    pub nodes: &'a [Node],
    pub selection: &'a [NodeId],
    pub hovered: Option<NodeId>,
    /// Armed creation kind and the world point the pointer is at.
    pub pending: Option<(PendingNode, (f32, f32))>,
    pub viewport: &'a Viewport,
    /// Handle edge length in screen pixels.
    pub handle_size: f32,
}

/// Which corner a resize handle sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    NorthWest,
    NorthEast,
    SouthEast,
    SouthWest,
}

/// The four corner-handle squares of `node`, in world units. Their screen
/// size is `handle_size` pixels at any zoom.
pub fn corner_handle_rects(node: &Node, scale: f32, handle_size: f32) -> [(Corner, Rect); 4] {
    let size = (handle_size / scale) as f64;
    let half = size / 2.0;
    let (x0, y0) = (node.x as f64, node.y as f64);
    let (x1, y1) = (node.right() as f64, node.bottom() as f64);
    let square = |cx: f64, cy: f64| Rect::new(cx - half, cy - half, cx + half, cy + half);
    [
        (Corner::NorthWest, square(x0, y0)),
        (Corner::NorthEast, square(x1, y0)),
        (Corner::SouthEast, square(x1, y1)),
        (Corner::SouthWest, square(x0, y1)),
    ]
}

pub fn build_display_list(input: &PaintInput<'_>) -> DisplayList {
    let vp = input.viewport;
    let scale = vp.scale.max(f32::EPSILON);
    let transform = Affine::translate((vp.pan_x as f64, vp.pan_y as f64)) * Affine::scale(scale as f64);

    let mut ops = vec![DrawOp::Clear {
        color: Color::rgba(0.0, 0.0, 0.0, 0.0),
    }];
    let single = input.selection.len() == 1;

    for node in input.nodes {
        paint_node(&mut ops, node, false);

        let selected = input.selection.contains(&node.id);
        if selected {
            paint_outline(&mut ops, node, scale, 1.0);
            if single {
                paint_handles(&mut ops, node, scale, input.handle_size);
            }
        } else if input.hovered == Some(node.id) {
            paint_outline(&mut ops, node, scale, HOVER_ALPHA);
        }
    }

    if let Some((pending, (wx, wy))) = input.pending {
        let preview = Node::new(
            NodeId::intern("__pending"),
            pending.kind,
            wx - pending.width / 2.0,
            wy - pending.height / 2.0,
            pending.width,
            pending.height,
        );
        paint_node(&mut ops, &preview, true);
    }

    DisplayList { transform, ops }
}

// ─── Node glyphs ─────────────────────────────────────────────────────────

fn node_rect(node: &Node) -> Rect {
    Rect::new(
        node.x as f64,
        node.y as f64,
        node.right() as f64,
        node.bottom() as f64,
    )
}

fn paint_node(ops: &mut Vec<DrawOp>, node: &Node, pending: bool) {
    let alpha = if pending { PENDING_ALPHA } else { node.opacity.clamp(0.0, 1.0) };
    let tint = |c: Color| c.with_alpha(c.a * alpha);
    let (stroke, width, dash) = if pending {
        (PENDING_STROKE, 2.0, Some(PENDING_DASH))
    } else {
        (FRAME_STROKE, 1.0, None)
    };
    let rect = node_rect(node);
    let center = Point::new(node.center().0 as f64, node.center().1 as f64);

    match node.kind {
        // Solids are drawn by the 3D scene; only the preview gets an outline.
        NodeKind::Solid => {
            if pending {
                ops.push(DrawOp::StrokeRect {
                    rect,
                    color: tint(stroke),
                    width,
                    dash,
                });
            }
        }
        NodeKind::Frame => {
            ops.push(DrawOp::StrokeRect {
                rect,
                color: tint(stroke),
                width,
                dash,
            });
            ops.push(DrawOp::Label {
                text: "Frame",
                center,
                size: 12.0,
                color: tint(LABEL),
            });
        }
        NodeKind::Image => {
            ops.push(DrawOp::FillRect {
                rect,
                color: tint(IMAGE_FILL),
            });
            ops.push(DrawOp::StrokeRect {
                rect,
                color: tint(stroke),
                width,
                dash,
            });
            ops.push(DrawOp::Label {
                text: "Image",
                center,
                size: 14.0,
                color: tint(LABEL),
            });
        }
        NodeKind::Comment => {
            let radius = node.width as f64 / 2.0;
            let stroke = if pending { stroke } else { COMMENT_STROKE };
            ops.push(DrawOp::FillCircle {
                center,
                radius,
                color: tint(COMMENT_FILL),
            });
            ops.push(DrawOp::StrokeCircle {
                center,
                radius,
                color: tint(stroke),
                width,
                dash,
            });
            ops.push(DrawOp::Label {
                text: "\u{1F4AC}",
                center,
                size: 12.0,
                color: tint(COMMENT_GLYPH),
            });
        }
    }
}

// ─── Decorations ─────────────────────────────────────────────────────────

fn paint_outline(ops: &mut Vec<DrawOp>, node: &Node, scale: f32, alpha: f32) {
    let color = SELECTION.with_alpha(alpha);
    let width = 1.0 / scale as f64;
    if node.kind == NodeKind::Comment {
        let (cx, cy) = node.center();
        ops.push(DrawOp::StrokeCircle {
            center: Point::new(cx as f64, cy as f64),
            radius: node.width as f64 / 2.0,
            color,
            width,
            dash: None,
        });
    } else {
        ops.push(DrawOp::StrokeRect {
            rect: node_rect(node),
            color,
            width,
            dash: None,
        });
    }
}

fn paint_handles(ops: &mut Vec<DrawOp>, node: &Node, scale: f32, handle_size: f32) {
    let width = 1.5 / scale as f64;
    for (_, rect) in corner_handle_rects(node, scale, handle_size) {
        ops.push(DrawOp::FillRect {
            rect,
            color: Color::WHITE,
        });
        ops.push(DrawOp::StrokeRect {
            rect,
            color: SELECTION,
            width,
            dash: None,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(name: &str) -> Node {
        Node::new(NodeId::intern(name), NodeKind::Frame, 0.0, 0.0, 100.0, 50.0)
    }

    fn input<'a>(nodes: &'a [Node], selection: &'a [NodeId], vp: &'a Viewport) -> PaintInput<'a> {
        PaintInput {
            nodes,
            selection,
            hovered: None,
            pending: None,
            viewport: vp,
            handle_size: 8.0,
        }
    }

    fn count_fill_rects(list: &DisplayList) -> usize {
        list.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::FillRect { .. }))
            .count()
    }

    #[test]
    fn solid_nodes_have_no_raster_paint() {
        let vp = Viewport::default();
        let nodes = [Node::new(NodeId::intern("paint_solid"), NodeKind::Solid, 0.0, 0.0, 10.0, 10.0)];
        let list = build_display_list(&input(&nodes, &[], &vp));
        assert_eq!(list.ops.len(), 1, "only the clear op: {:?}", list.ops);
    }

    #[test]
    fn handles_only_for_single_selection() {
        let vp = Viewport::default();
        let nodes = [frame("paint_a"), frame("paint_b")];
        let one = [nodes[0].id];
        let both = [nodes[0].id, nodes[1].id];

        assert_eq!(count_fill_rects(&build_display_list(&input(&nodes, &one, &vp))), 4);
        assert_eq!(count_fill_rects(&build_display_list(&input(&nodes, &both, &vp))), 0);
    }

    #[test]
    fn decorations_are_scale_compensated() {
        let vp = Viewport {
            scale: 2.0,
            ..Viewport::default()
        };
        let nodes = [frame("paint_scaled")];
        let sel = [nodes[0].id];
        let list = build_display_list(&input(&nodes, &sel, &vp));

        let outline_width = list.ops.iter().find_map(|op| match op {
            DrawOp::StrokeRect { color, width, .. } if *color == SELECTION => Some(*width),
            _ => None,
        });
        assert_eq!(outline_width, Some(0.5));

        let handle = corner_handle_rects(&nodes[0], 2.0, 8.0)[0].1;
        assert_eq!(handle.width(), 4.0);
        assert_eq!(handle.center(), Point::new(0.0, 0.0));
    }

    #[test]
    fn hover_outline_is_lighter_and_skips_selected() {
        let vp = Viewport::default();
        let nodes = [frame("paint_hover")];
        let mut inp = input(&nodes, &[], &vp);
        inp.hovered = Some(nodes[0].id);
        let list = build_display_list(&inp);
        let hover = list.ops.iter().find_map(|op| match op {
            DrawOp::StrokeRect { color, .. } if color.r == SELECTION.r => Some(color.a),
            _ => None,
        });
        assert_eq!(hover, Some(HOVER_ALPHA));
    }

    #[test]
    fn pending_preview_is_dashed_and_centred() {
        let vp = Viewport::default();
        let mut inp = input(&[], &[], &vp);
        inp.pending = Some((
            PendingNode {
                kind: NodeKind::Solid,
                width: 200.0,
                height: 100.0,
            },
            (300.0, 300.0),
        ));
        let list = build_display_list(&inp);
        match &list.ops[1] {
            DrawOp::StrokeRect { rect, dash, color, .. } => {
                assert_eq!(*rect, Rect::new(200.0, 250.0, 400.0, 350.0));
                assert_eq!(*dash, Some(PENDING_DASH));
                assert_eq!(color.a, PENDING_ALPHA);
            }
            other => panic!("expected dashed preview, got {other:?}"),
        }
    }
}
