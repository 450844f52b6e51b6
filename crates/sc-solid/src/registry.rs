//! One scene per solid node, kept in step with the document and the
//! parameter store.
//!
//! The registry subscribes to [`Document`] events and queues them; the
//! host calls [`SolidRegistry::sync`] once per frame to create, update,
//! and dispose scenes.

use crate::error::{ExportError, SolidError};
use crate::export::{self, DownloadSink, ExportRequest};
use crate::scene::{Presentation, SceneComposer};
use sc_core::document::{DocEvent, Document, SubscriptionId};
use sc_core::id::NodeId;
use sc_core::model::NodeKind;
use sc_core::params::ParamStore;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

pub struct SolidRegistry {
    presentation: Presentation,
    scenes: HashMap<NodeId, SceneComposer>,
    queue: Rc<RefCell<Vec<DocEvent>>>,
    subscription: SubscriptionId,
}

impl SolidRegistry {
    /// Subscribe to `doc` and adopt any solid nodes it already holds.
    pub fn attach(doc: &mut Document, presentation: Presentation) -> Self {
        let queue: Rc<RefCell<Vec<DocEvent>>> = Rc::default();
        let sink = queue.clone();
        let subscription = doc.subscribe(move |event| match event {
            DocEvent::NodeAdded { .. } | DocEvent::NodeRemoved { .. } => sink.borrow_mut().push(event.clone()),
            _ => {}
        });
        queue.borrow_mut().extend(
            doc.nodes()
                .iter()
                .filter(|n| n.kind == NodeKind::Solid)
                .map(|n| DocEvent::NodeAdded { id: n.id, kind: n.kind }),
        );
        Self {
            presentation,
            scenes: HashMap::new(),
            queue,
            subscription,
        }
    }

    /// Unsubscribe and dispose every scene.
    pub fn detach(mut self, doc: &mut Document) {
        doc.unsubscribe(self.subscription);
        for scene in self.scenes.values_mut() {
            scene.dispose();
        }
    }

    /// Apply queued document events and changed parameters, dropping the
    /// parameters of nodes that are gone. Returns the
    /// scenes whose solid could not be regenerated; they keep their
    /// previous solid.
    pub fn sync(&mut self, store: &mut ParamStore) -> Vec<(NodeId, SolidError)> {
        let events = std::mem::take(&mut *self.queue.borrow_mut());
        let presentation = self.presentation;
        let mut dirty: Vec<NodeId> = Vec::new();
        for event in events {
            match event {
                DocEvent::NodeAdded {
                    id,
                    kind: NodeKind::Solid,
                } => {
                    store.get_or_default(id);
                    self.scenes.entry(id).or_insert_with(|| SceneComposer::new(presentation));
                    dirty.push(id);
                }
                DocEvent::NodeRemoved {
                    id,
                    kind: NodeKind::Solid,
                } => {
                    if let Some(mut scene) = self.scenes.remove(&id) {
                        scene.dispose();
                    }
                    store.remove(id);
                    dirty.retain(|d| *d != id);
                }
                _ => {}
            }
        }
        // A late intake write can recreate the entry of a removed node.
        let orphans: Vec<NodeId> = store.ids().filter(|id| !self.scenes.contains_key(id)).collect();
        for id in orphans {
            log::debug!("dropping parameters of removed node {id}");
            store.remove(id);
        }
        for id in store.take_changed() {
            if !dirty.contains(&id) {
                dirty.push(id);
            }
        }

        let mut errors = Vec::new();
        for id in dirty {
            let (Some(scene), Some(params)) = (self.scenes.get_mut(&id), store.get(id)) else {
                continue;
            };
            if let Err(e) = scene.apply(params) {
                log::warn!("solid {id}: {e}");
                errors.push((id, e));
            }
        }
        errors
    }

    /// Advance auto-spin on every scene. Returns whether any moved.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.scenes.values_mut().fold(false, |moved, s| s.tick(dt) | moved)
    }

    pub fn scene(&self, id: NodeId) -> Option<&SceneComposer> {
        self.scenes.get(&id)
    }

    pub fn scene_mut(&mut self, id: NodeId) -> Option<&mut SceneComposer> {
        self.scenes.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Export the solid of node `id`.
    pub fn export(&self, id: NodeId, req: &ExportRequest<'_>, sink: &mut dyn DownloadSink) -> Result<String, ExportError> {
        let scene = self.scenes.get(&id).ok_or(ExportError::NoSolid)?;
        export::export(scene, req, sink)
    }
}
