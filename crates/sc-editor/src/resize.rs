//! Resize Controller: corner and edge resizing of the selected node.
//!
//! Four corner handles are painted; [`detect_zone`] additionally grabs the
//! four edges within a proximity band. Both the band and the handles are
//! sized in screen pixels, so they are divided by the zoom scale.
//!
//! Deltas apply per axis. East/south grow width/height from a fixed
//! origin. West/north move the origin too, so the opposite edge stays put.
//! Each axis floors at the minimum size independently.

use crate::input::Cursor;
use sc_core::id::NodeId;
use sc_core::model::{Node, NodeGeometry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeHandle {
    NorthWest,
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
}

impl ResizeHandle {
    pub fn cursor(self) -> Cursor {
        match self {
            ResizeHandle::NorthWest | ResizeHandle::SouthEast => Cursor::NwseResize,
            ResizeHandle::NorthEast | ResizeHandle::SouthWest => Cursor::NeswResize,
            ResizeHandle::North | ResizeHandle::South => Cursor::NsResize,
            ResizeHandle::East | ResizeHandle::West => Cursor::EwResize,
        }
    }

    pub fn id(self) -> &'static str {
        match self {
            ResizeHandle::NorthWest => "nw",
            ResizeHandle::North => "n",
            ResizeHandle::NorthEast => "ne",
            ResizeHandle::East => "e",
            ResizeHandle::SouthEast => "se",
            ResizeHandle::South => "s",
            ResizeHandle::SouthWest => "sw",
            ResizeHandle::West => "w",
        }
    }

    fn moves_east(self) -> bool {
        matches!(self, ResizeHandle::NorthEast | ResizeHandle::East | ResizeHandle::SouthEast)
    }

    fn moves_west(self) -> bool {
        matches!(self, ResizeHandle::NorthWest | ResizeHandle::West | ResizeHandle::SouthWest)
    }

    fn moves_south(self) -> bool {
        matches!(self, ResizeHandle::SouthWest | ResizeHandle::South | ResizeHandle::SouthEast)
    }

    fn moves_north(self) -> bool {
        matches!(self, ResizeHandle::NorthWest | ResizeHandle::North | ResizeHandle::NorthEast)
    }
}

/// Which handle, if any, world point `(x, y)` grabs on `node`.
///
/// `band` is the proximity threshold in world units. Corners win over
/// edges; edges only count within the node's span on the other axis.
pub fn detect_zone(node: &Node, x: f32, y: f32, band: f32) -> Option<ResizeHandle> {
    let near = |p: f32, edge: f32| p >= edge - band && p <= edge + band;
    let left = near(x, node.x);
    let right = near(x, node.right());
    let top = near(y, node.y);
    let bottom = near(y, node.bottom());
    let in_x = x >= node.x && x <= node.right();
    let in_y = y >= node.y && y <= node.bottom();

    // Corners first.
    if top && left {
        Some(ResizeHandle::NorthWest)
    } else if top && right {
        Some(ResizeHandle::NorthEast)
    } else if bottom && right {
        Some(ResizeHandle::SouthEast)
    } else if bottom && left {
        Some(ResizeHandle::SouthWest)
    } else if top && in_x {
        Some(ResizeHandle::North)
    } else if bottom && in_x {
        Some(ResizeHandle::South)
    } else if left && in_y {
        Some(ResizeHandle::West)
    } else if right && in_y {
        Some(ResizeHandle::East)
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeSession {
    pub node: NodeId,
    pub handle: ResizeHandle,
    pub anchor: (f32, f32),
    pub start: NodeGeometry,
}

#[derive(Debug)]
pub struct ResizeController {
    session: Option<ResizeSession>,
    min_size: f32,
}

impl Default for ResizeController {
    fn default() -> Self {
        Self::new(20.0)
    }
}

impl ResizeController {
    pub fn new(min_size: f32) -> Self {
        Self {
            session: None,
            min_size,
        }
    }

    pub fn start(&mut self, node: &Node, handle: ResizeHandle, wx: f32, wy: f32) {
        self.session = Some(ResizeSession {
            node: node.id,
            handle,
            anchor: (wx, wy),
            start: node.geometry(),
        });
    }

    /// Proposed geometry for the pointer at world `(wx, wy)`.
    pub fn update(&self, wx: f32, wy: f32) -> Option<(NodeId, NodeGeometry)> {
        let s = self.session?;
        let (dx, dy) = (wx - s.anchor.0, wy - s.anchor.1);
        let min = self.min_size;
        let mut g = s.start;

        if s.handle.moves_east() {
            g.width = (s.start.width + dx).max(min);
        } else if s.handle.moves_west() {
            g.width = (s.start.width - dx).max(min);
            g.x = s.start.x + s.start.width - g.width;
        }

        if s.handle.moves_south() {
            g.height = (s.start.height + dy).max(min);
        } else if s.handle.moves_north() {
            g.height = (s.start.height - dy).max(min);
            g.y = s.start.y + s.start.height - g.height;
        }

        Some((s.node, g))
    }

    pub fn end(&mut self) -> Option<ResizeSession> {
        self.session.take()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn handle(&self) -> Option<ResizeHandle> {
        self.session.map(|s| s.handle)
    }
}
