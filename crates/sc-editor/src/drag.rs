//! Drag Controller: move one node by the pointer.
//!
//! `Idle → Dragging` on pointer-down over a node, back to `Idle` on
//! pointer-up. The grab offset is kept so the node does not jump to the
//! pointer: `position = pointer - (anchor - original)`. Positions are not
//! clamped.

use sc_core::id::NodeId;
use sc_core::model::Node;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub node: NodeId,
    pub anchor: (f32, f32),
    pub origin: (f32, f32),
}

#[derive(Debug, Default)]
pub struct DragController {
    session: Option<DragSession>,
}

impl DragController {
    pub fn start(&mut self, node: &Node, wx: f32, wy: f32) {
        self.session = Some(DragSession {
            node: node.id,
            anchor: (wx, wy),
            origin: (node.x, node.y),
        });
    }

    /// Proposed top-left for the dragged node at world pointer `(wx, wy)`.
    pub fn update(&self, wx: f32, wy: f32) -> Option<(NodeId, f32, f32)> {
        let s = self.session?;
        let (ox, oy) = (s.anchor.0 - s.origin.0, s.anchor.1 - s.origin.1);
        Some((s.node, wx - ox, wy - oy))
    }

    pub fn end(&mut self) -> Option<DragSession> {
        self.session.take()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn node(&self) -> Option<NodeId> {
        self.session.map(|s| s.node)
    }
}
