//! Canvas tools.
//!
//! | Tool | Pointer-down | Cursor |
//! |------|--------------|--------|
//! | Move | select / drag / resize | `default`, `move`, resize glyphs |
//! | Hand | pan the viewport | `grab` / `grabbing` |
//! | Frame, Solid, Image, Comment | place the pending node | `crosshair` |
//!
//! Arming a creation tool fills the document's pending slot; placing the
//! node consumes it and returns to Move.

use sc_core::config::EditorConfig;
use sc_core::model::{NodeKind, PendingNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CanvasTool {
    #[default]
    Move,
    Hand,
    Frame,
    Solid,
    Image,
    Comment,
}

impl CanvasTool {
    /// Node kind this tool creates, if it is a creation tool.
    pub fn creates(self) -> Option<NodeKind> {
        match self {
            CanvasTool::Move | CanvasTool::Hand => None,
            CanvasTool::Frame => Some(NodeKind::Frame),
            CanvasTool::Solid => Some(NodeKind::Solid),
            CanvasTool::Image => Some(NodeKind::Image),
            CanvasTool::Comment => Some(NodeKind::Comment),
        }
    }

    /// Pending slot to arm when this tool is selected.
    pub fn pending(self, config: &EditorConfig) -> Option<PendingNode> {
        let kind = self.creates()?;
        let (width, height) = config.default_size(kind);
        Some(PendingNode {
            kind,
            width,
            height,
        })
    }
}
