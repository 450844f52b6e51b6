//! Integration tests: document operations the canvas shortcuts drive.

use pretty_assertions::assert_eq;
use sc_core::document::{DUPLICATE_OFFSET, Document};
use sc_core::id::NodeId;
use sc_core::model::{Node, NodeKind, PendingNode};

fn doc_with(names: &[&str]) -> (Document, Vec<NodeId>) {
    let mut doc = Document::default();
    let mut ids = Vec::new();
    for (i, name) in names.iter().enumerate() {
        let id = NodeId::intern(name);
        doc.add(Node::new(id, NodeKind::Frame, i as f32 * 50.0, 0.0, 100.0, 80.0));
        ids.push(id);
    }
    (doc, ids)
}

#[test]
fn pending_node_is_centred_on_click_and_selected() {
    let mut doc = Document::default();
    doc.set_pending(Some(PendingNode {
        kind: NodeKind::Solid,
        width: 200.0,
        height: 200.0,
    }));

    let id = doc.add_node_at(300.0, 400.0).expect("node created");
    let node = doc.get(id).unwrap();
    assert_eq!((node.x, node.y), (200.0, 300.0));
    assert_eq!(node.kind, NodeKind::Solid);
    assert!(id.as_str().starts_with("solid-"));
    assert_eq!(doc.selection(), &[id]);
    assert_eq!(doc.pending(), None);
}

#[test]
fn add_node_at_without_pending_does_nothing() {
    let mut doc = Document::default();
    assert_eq!(doc.add_node_at(0.0, 0.0), None);
    assert!(doc.is_empty());
}

#[test]
fn duplicate_offsets_copies_and_selects_them() {
    let (mut doc, ids) = doc_with(&["dup_ops_a", "dup_ops_b"]);
    doc.select_all();
    let copies = doc.duplicate_selected();

    assert_eq!(copies.len(), 2);
    assert_eq!(doc.len(), 4);
    assert_eq!(doc.selection(), copies.as_slice());
    for (orig, copy) in ids.iter().zip(&copies) {
        let o = doc.get(*orig).unwrap();
        let c = doc.get(*copy).unwrap();
        assert_eq!(c.x, o.x + DUPLICATE_OFFSET);
        assert_eq!(c.y, o.y + DUPLICATE_OFFSET);
        assert_eq!((c.width, c.height), (o.width, o.height));
    }
    // Copies are painted above everything that existed before.
    assert_eq!(doc.nodes()[2].id, copies[0]);
}

#[test]
fn remove_selected_keeps_unselected() {
    let (mut doc, ids) = doc_with(&["rm_ops_a", "rm_ops_b", "rm_ops_c"]);
    doc.select(ids[0], false);
    doc.select(ids[2], true);
    assert_eq!(doc.remove_selected(), 2);
    assert_eq!(doc.nodes().len(), 1);
    assert_eq!(doc.nodes()[0].id, ids[1]);
}
