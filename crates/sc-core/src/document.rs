//! The node-list owner.
//!
//! `Document` is the single source of truth for placed nodes, the current
//! selection, the hovered node, and the pending-creation slot. Every
//! mutation publishes a [`DocEvent`] to subscribers so the renderer and
//! the 3D scene registry can re-derive without polling.

use crate::id::NodeId;
use crate::model::{Node, NodeKind, NodePatch, PendingNode};
use smallvec::SmallVec;

/// Offset applied to duplicated nodes, in world units.
pub const DUPLICATE_OFFSET: f32 = 20.0;

/// Change notifications emitted by [`Document`].
#[derive(Debug, Clone, PartialEq)]
pub enum DocEvent {
    NodeAdded { id: NodeId, kind: NodeKind },
    NodeUpdated { id: NodeId },
    NodeRemoved { id: NodeId, kind: NodeKind },
    SelectionChanged,
    HoverChanged { hovered: Option<NodeId> },
    PendingChanged,
}

/// Handle returned by [`Document::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u32);

type Listener = Box<dyn FnMut(&DocEvent)>;

pub struct Document {
    nodes: Vec<Node>,
    selection: SmallVec<[NodeId; 4]>,
    hovered: Option<NodeId>,
    pending: Option<PendingNode>,
    min_size: f32,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u32,
}

impl Default for Document {
    fn default() -> Self {
        Self::new(20.0)
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.nodes)
            .field("selection", &self.selection)
            .field("hovered", &self.hovered)
            .field("pending", &self.pending)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Document {
    /// Empty document enforcing `min_size` on node width/height.
    pub fn new(min_size: f32) -> Self {
        Self {
            nodes: Vec::new(),
            selection: SmallVec::new(),
            hovered: None,
            pending: None,
            min_size,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    // ─── Subscriptions ───────────────────────────────────────────────────

    pub fn subscribe(&mut self, listener: impl FnMut(&DocEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.listeners.retain(|(sid, _)| *sid != id);
    }

    fn emit(&mut self, event: DocEvent) {
        log::trace!("doc event: {event:?}");
        for (_, listener) in &mut self.listeners {
            listener(&event);
        }
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    /// Nodes in z-order, bottom first.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn selection(&self) -> &[NodeId] {
        &self.selection
    }

    pub fn is_selected(&self, id: NodeId) -> bool {
        self.selection.contains(&id)
    }

    /// The selected node when exactly one is selected.
    pub fn single_selected(&self) -> Option<&Node> {
        match self.selection.as_slice() {
            [only] => self.get(*only),
            _ => None,
        }
    }

    pub fn hovered(&self) -> Option<NodeId> {
        self.hovered
    }

    pub fn pending(&self) -> Option<PendingNode> {
        self.pending
    }

    pub fn min_size(&self) -> f32 {
        self.min_size
    }

    // ─── Node mutations ──────────────────────────────────────────────────

    /// Append `node` on top. A node whose id already exists is rejected.
    pub fn add(&mut self, mut node: Node) -> bool {
        if self.get(node.id).is_some() {
            log::warn!("duplicate node id {}; ignoring add", node.id);
            return false;
        }
        node.width = node.width.max(self.min_size);
        node.height = node.height.max(self.min_size);
        let (id, kind) = (node.id, node.kind);
        self.nodes.push(node);
        self.emit(DocEvent::NodeAdded { id, kind });
        true
    }

    /// Consume the pending slot: create a node of the pending kind and size
    /// centred on `(wx, wy)` and make it the sole selection.
    pub fn add_node_at(&mut self, wx: f32, wy: f32) -> Option<NodeId> {
        let pending = self.pending.take()?;
        let id = NodeId::generate(pending.kind.id_prefix());
        let node = Node::new(
            id,
            pending.kind,
            wx - pending.width / 2.0,
            wy - pending.height / 2.0,
            pending.width,
            pending.height,
        );
        self.emit(DocEvent::PendingChanged);
        if !self.add(node) {
            return None;
        }
        self.set_selection(&[id]);
        Some(id)
    }

    /// Apply a partial update. Width/height are floored at the minimum size
    /// and opacity is clamped to [0, 1].
    pub fn update(&mut self, id: NodeId, patch: &NodePatch) -> bool {
        let min = self.min_size;
        let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) else {
            return false;
        };
        if let Some(x) = patch.x {
            node.x = x;
        }
        if let Some(y) = patch.y {
            node.y = y;
        }
        if let Some(w) = patch.width {
            node.width = w.max(min);
        }
        if let Some(h) = patch.height {
            node.height = h.max(min);
        }
        if let Some(r) = patch.rotation {
            node.rotation = r;
        }
        if let Some(o) = patch.opacity {
            node.opacity = o.clamp(0.0, 1.0);
        }
        self.emit(DocEvent::NodeUpdated { id });
        true
    }

    pub fn remove(&mut self, id: NodeId) -> Option<Node> {
        let idx = self.nodes.iter().position(|n| n.id == id)?;
        let node = self.nodes.remove(idx);
        let was_selected = self.selection.contains(&id);
        self.selection.retain(|s| *s != id);
        if self.hovered == Some(id) {
            self.hovered = None;
            self.emit(DocEvent::HoverChanged { hovered: None });
        }
        self.emit(DocEvent::NodeRemoved { id, kind: node.kind });
        if was_selected {
            self.emit(DocEvent::SelectionChanged);
        }
        Some(node)
    }

    pub fn remove_selected(&mut self) -> usize {
        let ids: SmallVec<[NodeId; 4]> = self.selection.clone();
        ids.into_iter().filter(|id| self.remove(*id).is_some()).count()
    }

    /// Copy every selected node, offset by [`DUPLICATE_OFFSET`], on top of
    /// the stack. The copies become the selection.
    pub fn duplicate_selected(&mut self) -> Vec<NodeId> {
        let originals: Vec<Node> = self
            .selection
            .iter()
            .filter_map(|id| self.get(*id).cloned())
            .collect();
        let mut copies = Vec::with_capacity(originals.len());
        for original in originals {
            let id = NodeId::generate(original.kind.id_prefix());
            let copy = Node {
                id,
                x: original.x + DUPLICATE_OFFSET,
                y: original.y + DUPLICATE_OFFSET,
                ..original
            };
            if self.add(copy) {
                copies.push(id);
            }
        }
        if !copies.is_empty() {
            self.set_selection(&copies);
        }
        copies
    }

    /// Remove every node and reset selection, hover, and pending state.
    pub fn clear(&mut self) {
        let removed: Vec<(NodeId, NodeKind)> =
            self.nodes.drain(..).map(|n| (n.id, n.kind)).collect();
        for (id, kind) in removed {
            self.emit(DocEvent::NodeRemoved { id, kind });
        }
        self.selection.clear();
        self.emit(DocEvent::SelectionChanged);
        if self.hovered.take().is_some() {
            self.emit(DocEvent::HoverChanged { hovered: None });
        }
        self.set_pending(None);
    }

    // ─── Selection ───────────────────────────────────────────────────────

    /// Click selection. Without `multi` the node becomes the sole selection;
    /// with `multi` its membership is toggled.
    pub fn select(&mut self, id: NodeId, multi: bool) {
        if multi {
            if let Some(pos) = self.selection.iter().position(|s| *s == id) {
                self.selection.remove(pos);
            } else {
                self.selection.push(id);
            }
        } else {
            self.selection.clear();
            self.selection.push(id);
        }
        self.emit(DocEvent::SelectionChanged);
    }

    pub fn set_selection(&mut self, ids: &[NodeId]) {
        self.selection = ids.iter().copied().filter(|id| self.get(*id).is_some()).collect();
        self.emit(DocEvent::SelectionChanged);
    }

    pub fn select_all(&mut self) {
        self.selection = self.nodes.iter().map(|n| n.id).collect();
        self.emit(DocEvent::SelectionChanged);
    }

    pub fn clear_selection(&mut self) {
        if self.selection.is_empty() {
            return;
        }
        self.selection.clear();
        self.emit(DocEvent::SelectionChanged);
    }

    // ─── Hover / pending ─────────────────────────────────────────────────

    /// Returns `true` if the hovered node changed.
    pub fn set_hovered(&mut self, hovered: Option<NodeId>) -> bool {
        if self.hovered == hovered {
            return false;
        }
        self.hovered = hovered;
        self.emit(DocEvent::HoverChanged { hovered });
        true
    }

    pub fn set_pending(&mut self, pending: Option<PendingNode>) {
        if self.pending == pending {
            return;
        }
        self.pending = pending;
        self.emit(DocEvent::PendingChanged);
    }
}
