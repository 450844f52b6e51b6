//! Canvas controller: pointer, wheel, and keyboard dispatch.
//!
//! Owns the viewport and the interaction sessions; borrows the document
//! for each event. Every handler returns an [`EventOutcome`] telling the
//! host whether to redraw, which cursor to show, and whether a frame
//! callback is needed to apply a coalesced geometry write.
//!
//! Pointer-down precedence:
//!
//! 1. A pending node is placed centred on the pointer; tool returns to Move.
//! 2. Hand tool (or Space held) starts a viewport pan.
//! 3. Move tool, single selection: an edge/corner starts a resize, the
//!    node's interior starts a drag.
//! 4. Move tool: the topmost node under the pointer is selected (⌘/Ctrl
//!    toggles membership) and dragged unless multi-selecting.
//! 5. Move tool, empty canvas: selection cleared unless ⌘/Ctrl is held.
//!
//! Drag and resize are mutually exclusive: both start only from step 3/4.

use crate::drag::DragController;
use crate::input::{Cursor, InputEvent, Modifiers};
use crate::resize::{ResizeController, detect_zone};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::tools::CanvasTool;
use sc_core::config::EditorConfig;
use sc_core::document::Document;
use sc_core::frame::{FrameCoalescer, FrameToken};
use sc_core::id::NodeId;
use sc_core::model::NodePatch;
use sc_core::viewport::{Viewport, ZoomLimits};
use sc_render::hit::{find_topmost_at, is_point_in_node};
use sc_render::paint::{DisplayList, PaintInput, build_display_list};

/// Result of handling one input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventOutcome {
    /// Something visible changed; repaint.
    pub changed: bool,
    pub cursor: Cursor,
    /// Register this token with the frame scheduler and call
    /// [`CanvasController::on_frame`] with it.
    pub frame: Option<FrameToken>,
}

pub struct CanvasController {
    pub config: EditorConfig,
    pub viewport: Viewport,
    tool: CanvasTool,
    space_held: bool,
    /// Last screen position while panning.
    pan_anchor: Option<(f32, f32)>,
    drag: DragController,
    resize: ResizeController,
    writes: FrameCoalescer<(NodeId, NodePatch)>,
    /// Last pointer position in world space (drives the pending preview).
    pointer: (f32, f32),
    cursor: Cursor,
}

impl Default for CanvasController {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl CanvasController {
    pub fn new(config: EditorConfig) -> Self {
        let viewport = Viewport::new(ZoomLimits {
            min: config.min_zoom,
            max: config.max_zoom,
        });
        let resize = ResizeController::new(config.min_node_size);
        Self {
            config,
            viewport,
            tool: CanvasTool::Move,
            space_held: false,
            pan_anchor: None,
            drag: DragController::default(),
            resize,
            writes: FrameCoalescer::new(),
            pointer: (0.0, 0.0),
            cursor: Cursor::Default,
        }
    }

    pub fn tool(&self) -> CanvasTool {
        self.tool
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_active()
    }

    pub fn is_resizing(&self) -> bool {
        self.resize.is_active()
    }

    pub fn is_panning(&self) -> bool {
        self.pan_anchor.is_some()
    }

    fn hand_active(&self) -> bool {
        self.tool == CanvasTool::Hand || self.space_held
    }

    /// Switch tools, arming or disarming the pending slot.
    pub fn set_tool(&mut self, doc: &mut Document, tool: CanvasTool) {
        self.tool = tool;
        doc.set_pending(tool.pending(&self.config));
    }

    // ─── Dispatch ────────────────────────────────────────────────────────

    pub fn handle_event(&mut self, doc: &mut Document, event: &InputEvent) -> EventOutcome {
        let outcome = match event {
            InputEvent::PointerDown { x, y, modifiers } => self.pointer_down(doc, *x, *y, *modifiers),
            InputEvent::PointerMove { x, y, .. } => self.pointer_move(doc, *x, *y),
            InputEvent::PointerUp { .. } => self.pointer_up(doc),
            InputEvent::Wheel {
                x,
                y,
                delta_x,
                delta_y,
                modifiers,
            } => self.wheel(*x, *y, *delta_x, *delta_y, *modifiers),
            InputEvent::KeyDown { key, modifiers } => self.key_down(doc, key, *modifiers),
            InputEvent::KeyUp { key, .. } => self.key_up(key),
        };
        self.cursor = outcome.cursor;
        outcome
    }

    /// Frame callback: apply the coalesced geometry write if `token` is
    /// still the latest one.
    pub fn on_frame(&mut self, doc: &mut Document, token: FrameToken) -> bool {
        match self.writes.take_for_frame(token) {
            Some((id, patch)) => doc.update(id, &patch),
            None => false,
        }
    }

    fn outcome(&self, changed: bool, cursor: Cursor) -> EventOutcome {
        EventOutcome {
            changed,
            cursor,
            frame: None,
        }
    }

    // ─── Pointer ─────────────────────────────────────────────────────────

    fn pointer_down(&mut self, doc: &mut Document, sx: f32, sy: f32, modifiers: Modifiers) -> EventOutcome {
        let (wx, wy) = self.viewport.screen_to_world(sx, sy);
        self.pointer = (wx, wy);

        if doc.pending().is_some() {
            let placed = doc.add_node_at(wx, wy);
            if let Some(id) = placed {
                log::debug!("placed {id} at ({wx}, {wy})");
            }
            self.tool = CanvasTool::Move;
            return self.outcome(placed.is_some(), Cursor::Default);
        }

        if self.hand_active() {
            self.pan_anchor = Some((sx, sy));
            return self.outcome(false, Cursor::Grabbing);
        }

        if self.tool != CanvasTool::Move {
            return self.outcome(false, self.cursor);
        }

        if let Some(node) = doc.single_selected().cloned() {
            let band = self.config.edge_threshold / self.viewport.scale;
            if let Some(handle) = detect_zone(&node, wx, wy, band) {
                self.resize.start(&node, handle, wx, wy);
                doc.set_hovered(None);
                return self.outcome(false, handle.cursor());
            }
            if is_point_in_node(&node, wx, wy) {
                self.drag.start(&node, wx, wy);
                doc.set_hovered(None);
                return self.outcome(false, Cursor::Move);
            }
        }

        let multi = modifiers.cmd();
        if let Some(hit) = find_topmost_at(doc.nodes(), wx, wy) {
            doc.select(hit, multi);
            if !multi && let Some(node) = doc.get(hit).cloned() {
                self.drag.start(&node, wx, wy);
                doc.set_hovered(None);
                return self.outcome(true, Cursor::Move);
            }
            return self.outcome(true, Cursor::Default);
        }

        if !multi && !doc.selection().is_empty() {
            doc.clear_selection();
            return self.outcome(true, Cursor::Default);
        }
        self.outcome(false, Cursor::Default)
    }

    fn pointer_move(&mut self, doc: &mut Document, sx: f32, sy: f32) -> EventOutcome {
        let (wx, wy) = self.viewport.screen_to_world(sx, sy);
        self.pointer = (wx, wy);

        if let Some((ax, ay)) = self.pan_anchor {
            self.viewport.pan_by(sx - ax, sy - ay);
            self.pan_anchor = Some((sx, sy));
            return self.outcome(true, Cursor::Grabbing);
        }

        if let Some((id, x, y)) = self.drag.update(wx, wy) {
            let token = self.writes.schedule((id, NodePatch::position(x, y)));
            return EventOutcome {
                changed: false,
                cursor: Cursor::Move,
                frame: Some(token),
            };
        }

        if let Some((id, geometry)) = self.resize.update(wx, wy) {
            let token = self.writes.schedule((id, NodePatch::geometry(geometry)));
            let cursor = self.resize.handle().map_or(Cursor::Default, |h| h.cursor());
            return EventOutcome {
                changed: false,
                cursor,
                frame: Some(token),
            };
        }

        let hover = if self.tool == CanvasTool::Move && !self.hand_active() {
            find_topmost_at(doc.nodes(), wx, wy)
        } else {
            None
        };
        let hover_changed = doc.set_hovered(hover);

        let cursor = if self.hand_active() {
            Cursor::Grab
        } else if doc.pending().is_some() {
            Cursor::Crosshair
        } else if self.tool == CanvasTool::Move {
            self.hover_cursor(doc, wx, wy)
        } else {
            Cursor::Default
        };
        // The pending preview follows the pointer.
        self.outcome(hover_changed || doc.pending().is_some(), cursor)
    }

    fn hover_cursor(&self, doc: &Document, wx: f32, wy: f32) -> Cursor {
        let Some(node) = doc.single_selected() else {
            return Cursor::Default;
        };
        let band = self.config.edge_threshold / self.viewport.scale;
        if let Some(handle) = detect_zone(node, wx, wy, band) {
            handle.cursor()
        } else if is_point_in_node(node, wx, wy) {
            Cursor::Move
        } else {
            Cursor::Default
        }
    }

    fn pointer_up(&mut self, doc: &mut Document) -> EventOutcome {
        let mut changed = false;
        if self.pan_anchor.take().is_some() {
            return self.outcome(false, Cursor::Grab);
        }
        // Exactly one final write lands on release.
        if let Some((id, patch)) = self.writes.flush() {
            changed = doc.update(id, &patch);
        }
        if let Some(session) = self.drag.end() {
            log::trace!("drag of {} ended", session.node);
        }
        if let Some(session) = self.resize.end() {
            log::trace!("resize of {} via {} ended", session.node, session.handle.id());
        }
        let cursor = if self.hand_active() { Cursor::Grab } else { Cursor::Default };
        self.outcome(changed, cursor)
    }

    // ─── Wheel ───────────────────────────────────────────────────────────

    fn wheel(&mut self, sx: f32, sy: f32, dx: f32, dy: f32, modifiers: Modifiers) -> EventOutcome {
        let changed = if modifiers.cmd() {
            self.viewport.zoom_step(sx, sy, dy, self.config.zoom_step)
        } else {
            self.viewport
                .wheel_pan(dx, dy, modifiers.shift, self.config.pan_sensitivity);
            dx != 0.0 || dy != 0.0
        };
        self.outcome(changed, self.cursor)
    }

    // ─── Keyboard ────────────────────────────────────────────────────────

    fn key_down(&mut self, doc: &mut Document, key: &str, modifiers: Modifiers) -> EventOutcome {
        if key == " " {
            self.space_held = true;
            let cursor = if self.is_panning() { Cursor::Grabbing } else { Cursor::Grab };
            return self.outcome(false, cursor);
        }

        let Some(action) = ShortcutMap::resolve(key, modifiers) else {
            return self.outcome(false, self.cursor);
        };
        // Ignored mid-gesture.
        if self.drag.is_active() || self.resize.is_active() {
            return self.outcome(false, self.cursor);
        }

        let switch = match action {
            ShortcutAction::ToolMove => Some(CanvasTool::Move),
            ShortcutAction::ToolHand => Some(CanvasTool::Hand),
            ShortcutAction::ToolFrame => Some(CanvasTool::Frame),
            ShortcutAction::ToolSolid => Some(CanvasTool::Solid),
            ShortcutAction::ToolImage => Some(CanvasTool::Image),
            ShortcutAction::ToolComment => Some(CanvasTool::Comment),
            ShortcutAction::Delete => {
                doc.remove_selected();
                None
            }
            ShortcutAction::SelectAll => {
                doc.select_all();
                None
            }
            ShortcutAction::Duplicate => {
                doc.duplicate_selected();
                None
            }
            ShortcutAction::ClearAll => {
                doc.clear();
                None
            }
            ShortcutAction::Deselect => {
                doc.set_pending(None);
                doc.clear_selection();
                Some(CanvasTool::Move)
            }
        };
        if let Some(t) = switch {
            self.set_tool(doc, t);
        }
        let cursor = match self.tool {
            CanvasTool::Hand => Cursor::Grab,
            t if t.creates().is_some() => Cursor::Crosshair,
            _ => Cursor::Default,
        };
        self.outcome(true, cursor)
    }

    fn key_up(&mut self, key: &str) -> EventOutcome {
        if key == " " {
            self.space_held = false;
            self.pan_anchor = None;
            return self.outcome(false, Cursor::Default);
        }
        self.outcome(false, self.cursor)
    }

    // ─── Painting ────────────────────────────────────────────────────────

    /// Display list for the current document state.
    pub fn display_list(&self, doc: &Document) -> DisplayList {
        build_display_list(&PaintInput {
            nodes: doc.nodes(),
            selection: doc.selection(),
            hovered: doc.hovered(),
            pending: doc.pending().map(|p| (p, self.pointer)),
            viewport: &self.viewport,
            handle_size: self.config.handle_size,
        })
    }
}
