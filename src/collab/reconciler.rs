//! Merges peers' change batches into the local canvas.
//!
//! This is the only place that looks at the origin of a batch. A batch whose
//! emitter is this client is its own echo and is dropped without touching the
//! canvas. Everything else is applied through the canvas' remote entry
//! points: last write wins, no history, no rebroadcast.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::{
    CanvasError, Result, ShareLock,
    canvas::Canvas,
    collab::CollabClient,
    events::{ClientId, EdgeUpdatePayload, Envelope, NodeUpdatePayload},
};

#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    /// use the glob pattern to match the workspace id of inbound batches
    /// eg. main-*
    pub workspace: String,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            workspace: "*".to_string(),
        }
    }
}

impl ReconcileOptions {
    pub fn with_workspace(workspace: impl Into<String>) -> Self {
        Self {
            workspace: workspace.into(),
        }
    }
}

pub struct Reconciler {
    local_id: ClientId,
    canvas: ShareLock<Canvas>,
    workspace: globset::GlobMatcher,
}

impl Reconciler {
    pub fn new(
        local_id: impl Into<ClientId>,
        canvas: ShareLock<Canvas>,
        options: ReconcileOptions,
    ) -> Result<Self> {
        let workspace = globset::Glob::new(&options.workspace)
            .map_err(|e| CanvasError::Config(format!("invalid workspace pattern '{}': {}", options.workspace, e)))?
            .compile_matcher();

        Ok(Self {
            local_id: local_id.into(),
            canvas,
            workspace,
        })
    }

    /// Create a reconciler for `client` and route its inbound batches into
    /// `canvas`.
    pub fn attach(
        client: &CollabClient,
        canvas: ShareLock<Canvas>,
        options: ReconcileOptions,
    ) -> Result<Arc<Self>> {
        let reconciler = Arc::new(Self::new(client.id(), canvas, options)?);

        let r = reconciler.clone();
        client.on_node_updated(move |envelope| {
            r.accept_node_update(envelope);
        });
        let r = reconciler.clone();
        client.on_edge_updated(move |envelope| {
            r.accept_edge_update(envelope);
        });

        Ok(reconciler)
    }

    pub fn local_id(&self) -> &str {
        &self.local_id
    }

    /// Apply a peer's node batch. Returns whether it was applied.
    pub fn accept_node_update(
        &self,
        envelope: &Envelope<NodeUpdatePayload>,
    ) -> bool {
        if !self.admit(envelope, &envelope.workspace_id) {
            return false;
        }
        debug!("reconcile: {} node changes from {}", envelope.changes.len(), envelope.emitter_client_id);
        self.canvas.write().unwrap().apply_remote_node_changes(&envelope.changes);
        true
    }

    /// Apply a peer's edge batch. Returns whether it was applied.
    pub fn accept_edge_update(
        &self,
        envelope: &Envelope<EdgeUpdatePayload>,
    ) -> bool {
        if !self.admit(envelope, &envelope.workspace_id) {
            return false;
        }
        debug!("reconcile: {} edge changes from {}", envelope.changes.len(), envelope.emitter_client_id);
        self.canvas.write().unwrap().apply_remote_edge_changes(&envelope.changes);
        true
    }

    fn admit<T>(
        &self,
        envelope: &Envelope<T>,
        workspace_id: &str,
    ) -> bool {
        if envelope.is_from(&self.local_id) {
            trace!("reconcile: drop self echo");
            return false;
        }
        if !self.workspace.is_match(workspace_id) {
            trace!("reconcile: drop batch for workspace {}", workspace_id);
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{Arc, RwLock},
        time::Duration,
    };

    use tokio::runtime::Handle;

    use super::*;
    use crate::{
        collab::CollabHub,
        events::CollabEvent,
        model::{Edge, EdgeChange, GraphSnapshot, Node, NodeChange, NodeData, NodePayload, NotePayload, XYPosition},
    };

    fn note(id: &str) -> Node {
        Node::new(id, XYPosition::default(), NodeData::new(id, NodePayload::Note(NotePayload::default())))
    }

    fn shared(canvas: Canvas) -> ShareLock<Canvas> {
        Arc::new(RwLock::new(canvas))
    }

    fn node_batch(
        from: &str,
        changes: Vec<NodeChange>,
    ) -> Envelope<NodeUpdatePayload> {
        Envelope::new(from, NodeUpdatePayload {
            workspace_id: "main-workspace".to_string(),
            changes,
        })
    }

    #[test]
    fn test_reconcile_drops_self_echo() {
        let mut canvas = Canvas::from_snapshot(GraphSnapshot::new(vec![note("1")], vec![]));
        canvas.add_node(note("2"));
        let canvas = shared(canvas);
        let before = canvas.read().unwrap().snapshot();

        let reconciler = Reconciler::new("client_me", canvas.clone(), ReconcileOptions::default()).unwrap();
        let applied = reconciler.accept_node_update(&node_batch("client_me", vec![NodeChange::remove("1"), NodeChange::add(note("3"))]));
        assert!(!applied);

        let applied = reconciler.accept_edge_update(&Envelope::new("client_me", EdgeUpdatePayload {
            workspace_id: "main-workspace".to_string(),
            changes: vec![EdgeChange::add(Edge::new("e", "1", "2"))],
        }));
        assert!(!applied);

        let canvas = canvas.read().unwrap();
        assert_eq!(canvas.snapshot(), before);
        assert_eq!(canvas.history().past_len(), 1);
    }

    #[test]
    fn test_reconcile_applies_peer_without_history() {
        let canvas = shared(Canvas::from_snapshot(GraphSnapshot::new(vec![note("1")], vec![])));
        let reconciler = Reconciler::new("client_me", canvas.clone(), ReconcileOptions::default()).unwrap();

        assert!(reconciler.accept_node_update(&node_batch("client_peer", vec![NodeChange::add(note("2"))])));
        assert!(reconciler.accept_edge_update(&Envelope::new("client_peer", EdgeUpdatePayload {
            workspace_id: "main-workspace".to_string(),
            changes: vec![EdgeChange::add(Edge::new("e1-2", "1", "2"))],
        })));

        let canvas = canvas.read().unwrap();
        assert_eq!(canvas.nodes().len(), 2);
        assert_eq!(canvas.edges().len(), 1);
        assert!(!canvas.can_undo());
        assert!(!canvas.can_redo());
    }

    #[test]
    fn test_reconcile_workspace_filter() {
        let canvas = shared(Canvas::new());
        let reconciler = Reconciler::new("me", canvas.clone(), ReconcileOptions::with_workspace("ws-*")).unwrap();

        assert!(!reconciler.accept_node_update(&node_batch("peer", vec![NodeChange::add(note("x"))])));
        let mut batch = node_batch("peer", vec![NodeChange::add(note("x"))]);
        batch.payload.workspace_id = "ws-3".to_string();
        assert!(reconciler.accept_node_update(&batch));
        assert_eq!(canvas.read().unwrap().nodes().len(), 1);
    }

    #[test]
    fn test_reconcile_bad_pattern() {
        let res = Reconciler::new("me", shared(Canvas::new()), ReconcileOptions::with_workspace("ws-[")).err();
        assert!(matches!(res, Some(CanvasError::Config(_))));
    }

    #[tokio::test]
    async fn test_reconcile_attached_to_client() {
        let hub = CollabHub::new(16, Handle::current());
        let client = hub.client();
        let canvas = shared(Canvas::new());
        Reconciler::attach(&client, canvas.clone(), ReconcileOptions::default()).unwrap();

        let own = CollabEvent::NodeUpdated(node_batch(client.id(), vec![NodeChange::add(note("mine"))])).encode().unwrap();
        client.receive(&own);
        assert!(canvas.read().unwrap().nodes().is_empty());

        let peer = CollabEvent::NodeUpdated(node_batch("client_peer", vec![NodeChange::add(note("theirs"))])).encode().unwrap();
        client.connect();
        hub.publish(peer).unwrap();

        let mut applied = false;
        for _ in 0..100 {
            if canvas.read().unwrap().node("theirs").is_some() {
                applied = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(applied);
    }
}
