//! Integration tests: pointer sessions driven through the canvas
//! controller (sc-editor ↔ sc-core ↔ sc-render).

use pretty_assertions::assert_eq;
use sc_core::document::Document;
use sc_core::id::NodeId;
use sc_core::model::{Node, NodeGeometry, NodeKind};
use sc_editor::{CanvasController, CanvasTool, Cursor, InputEvent, Modifiers};

fn down(x: f32, y: f32) -> InputEvent {
    InputEvent::PointerDown {
        x,
        y,
        modifiers: Modifiers::NONE,
    }
}

fn down_with(x: f32, y: f32, modifiers: Modifiers) -> InputEvent {
    InputEvent::PointerDown { x, y, modifiers }
}

fn moved(x: f32, y: f32) -> InputEvent {
    InputEvent::PointerMove {
        x,
        y,
        modifiers: Modifiers::NONE,
    }
}

fn up(x: f32, y: f32) -> InputEvent {
    InputEvent::PointerUp {
        x,
        y,
        modifiers: Modifiers::NONE,
    }
}

const CMD: Modifiers = Modifiers {
    meta: true,
    ..Modifiers::NONE
};

fn two_nodes(a: &str, b: &str) -> (Document, NodeId, NodeId) {
    let mut doc = Document::default();
    let ia = NodeId::intern(a);
    let ib = NodeId::intern(b);
    doc.add(Node::new(ia, NodeKind::Frame, 10.0, 10.0, 100.0, 100.0));
    doc.add(Node::new(ib, NodeKind::Image, 300.0, 300.0, 80.0, 80.0));
    (doc, ia, ib)
}

// ─── Drag ────────────────────────────────────────────────────────────────

#[test]
fn drag_moves_only_the_grabbed_node_by_pointer_delta() {
    let (mut doc, a, b) = two_nodes("it_drag_a", "it_drag_b");
    let before_b = doc.get(b).unwrap().clone();
    let mut canvas = CanvasController::default();

    let out = canvas.handle_event(&mut doc, &down(30.0, 30.0));
    assert_eq!(out.cursor, Cursor::Move);
    assert!(canvas.is_dragging());
    assert_eq!(doc.selection(), &[a]);

    let out = canvas.handle_event(&mut doc, &moved(70.0, 90.0));
    assert!(out.frame.is_some(), "drag writes are frame-scheduled");
    canvas.handle_event(&mut doc, &up(70.0, 90.0));

    let node = doc.get(a).unwrap();
    assert_eq!((node.x, node.y), (50.0, 70.0));
    assert_eq!((node.width, node.height), (100.0, 100.0));
    assert_eq!(doc.get(b).unwrap(), &before_b);
    assert!(!canvas.is_dragging());
}

#[test]
fn stale_frame_token_is_ignored() {
    let (mut doc, a, _) = two_nodes("it_stale_a", "it_stale_b");
    let mut canvas = CanvasController::default();
    canvas.handle_event(&mut doc, &down(30.0, 30.0));

    let first = canvas.handle_event(&mut doc, &moved(40.0, 30.0)).frame.unwrap();
    let second = canvas.handle_event(&mut doc, &moved(50.0, 30.0)).frame.unwrap();

    assert!(!canvas.on_frame(&mut doc, first));
    assert_eq!(doc.get(a).unwrap().x, 10.0);
    assert!(canvas.on_frame(&mut doc, second));
    assert_eq!(doc.get(a).unwrap().x, 30.0);
}

#[test]
fn drag_under_zoom_uses_world_units() {
    let (mut doc, a, _) = two_nodes("it_zoom_a", "it_zoom_b");
    let mut canvas = CanvasController::default();
    canvas.viewport.scale = 2.0;
    canvas.viewport.pan_x = 100.0;

    // World (30, 30) is screen (160, 60).
    canvas.handle_event(&mut doc, &down(160.0, 60.0));
    canvas.handle_event(&mut doc, &moved(200.0, 100.0));
    canvas.handle_event(&mut doc, &up(200.0, 100.0));
    let node = doc.get(a).unwrap();
    assert_eq!((node.x, node.y), (30.0, 30.0));
}

// ─── Selection ───────────────────────────────────────────────────────────

#[test]
fn multi_select_click_toggles_without_dragging() {
    let (mut doc, a, b) = two_nodes("it_multi_a", "it_multi_b");
    let mut canvas = CanvasController::default();

    canvas.handle_event(&mut doc, &down(30.0, 30.0));
    canvas.handle_event(&mut doc, &up(30.0, 30.0));
    canvas.handle_event(&mut doc, &down_with(310.0, 310.0, CMD));
    assert!(!canvas.is_dragging());
    assert_eq!(doc.selection(), &[a, b]);
    canvas.handle_event(&mut doc, &up(310.0, 310.0));

    // Empty space with the modifier keeps the selection.
    canvas.handle_event(&mut doc, &down_with(900.0, 900.0, CMD));
    assert_eq!(doc.selection().len(), 2);
    canvas.handle_event(&mut doc, &down(900.0, 900.0));
    assert!(doc.selection().is_empty());
}

#[test]
fn comment_corner_click_misses() {
    let mut doc = Document::default();
    let id = NodeId::intern("it_comment");
    doc.add(Node::new(id, NodeKind::Comment, 0.0, 0.0, 100.0, 100.0));
    let mut canvas = CanvasController::default();

    canvas.handle_event(&mut doc, &down(3.0, 3.0));
    assert!(doc.selection().is_empty());
    canvas.handle_event(&mut doc, &up(3.0, 3.0));
    canvas.handle_event(&mut doc, &down(50.0, 50.0));
    assert_eq!(doc.selection(), &[id]);
}

// ─── Resize ──────────────────────────────────────────────────────────────

#[test]
fn se_corner_resize_changes_only_size() {
    let (mut doc, a, _) = two_nodes("it_se_a", "it_se_b");
    let mut canvas = CanvasController::default();
    doc.select(a, false);

    let out = canvas.handle_event(&mut doc, &down(110.0, 110.0));
    assert_eq!(out.cursor, Cursor::NwseResize);
    assert!(canvas.is_resizing());
    canvas.handle_event(&mut doc, &moved(150.0, 130.0));
    canvas.handle_event(&mut doc, &up(150.0, 130.0));

    assert_eq!(
        doc.get(a).unwrap().geometry(),
        NodeGeometry {
            x: 10.0,
            y: 10.0,
            width: 140.0,
            height: 120.0
        }
    );
}

#[test]
fn nw_corner_resize_pins_se_corner() {
    let (mut doc, a, _) = two_nodes("it_nw_a", "it_nw_b");
    let mut canvas = CanvasController::default();
    doc.select(a, false);

    canvas.handle_event(&mut doc, &down(10.0, 10.0));
    canvas.handle_event(&mut doc, &moved(-20.0, 40.0));
    canvas.handle_event(&mut doc, &up(-20.0, 40.0));

    let n = doc.get(a).unwrap();
    assert_eq!((n.x, n.y, n.width, n.height), (-20.0, 40.0, 130.0, 70.0));
    assert_eq!((n.right(), n.bottom()), (110.0, 110.0));
}

#[test]
fn east_edge_resize_floors_width() {
    let (mut doc, a, _) = two_nodes("it_e_a", "it_e_b");
    let mut canvas = CanvasController::default();
    doc.select(a, false);

    let out = canvas.handle_event(&mut doc, &down(112.0, 60.0));
    assert_eq!(out.cursor, Cursor::EwResize);
    canvas.handle_event(&mut doc, &moved(-500.0, 60.0));
    canvas.handle_event(&mut doc, &up(-500.0, 60.0));

    let n = doc.get(a).unwrap();
    assert_eq!((n.x, n.width, n.height), (10.0, 20.0, 100.0));
}

// ─── Creation ────────────────────────────────────────────────────────────

#[test]
fn armed_tool_places_node_on_click_and_returns_to_move() {
    let mut doc = Document::default();
    let mut canvas = CanvasController::default();
    canvas.set_tool(&mut doc, CanvasTool::Solid);

    let out = canvas.handle_event(&mut doc, &moved(400.0, 400.0));
    assert_eq!(out.cursor, Cursor::Crosshair);
    assert!(out.changed, "pending preview follows the pointer");

    canvas.handle_event(&mut doc, &down(400.0, 400.0));
    assert_eq!(canvas.tool(), CanvasTool::Move);
    assert_eq!(doc.len(), 1);
    let node = &doc.nodes()[0];
    assert_eq!(node.kind, NodeKind::Solid);
    assert_eq!((node.x, node.y, node.width), (300.0, 300.0, 200.0));
    assert_eq!(doc.selection(), &[node.id]);
}
