//! Hit testing: point → node lookup.
//!
//! Scans the document's node list from the top of the z-order down, so a
//! click always lands on the node that is painted on top.

use sc_core::id::NodeId;
use sc_core::model::{Node, NodeKind};

/// Whether world point `(px, py)` lies on `node`.
///
/// Comment markers are round: the test is against the circle inscribed in
/// the node's width. Every other kind uses its box, edges inclusive.
pub fn is_point_in_node(node: &Node, px: f32, py: f32) -> bool {
    match node.kind {
        NodeKind::Comment => {
            let (cx, cy) = node.center();
            let r = node.width / 2.0;
            let (dx, dy) = (px - cx, py - cy);
            dx * dx + dy * dy <= r * r
        }
        _ => px >= node.x && px <= node.right() && py >= node.y && py <= node.bottom(),
    }
}

/// Topmost node at world point `(px, py)`, or `None` on empty canvas.
pub fn find_topmost_at(nodes: &[Node], px: f32, py: f32) -> Option<NodeId> {
    nodes
        .iter()
        .rev()
        .find(|n| is_point_in_node(n, px, py))
        .map(|n| n.id)
}
