//! UI-facing editing surface.
//!
//! The editor pairs the shared [`Canvas`] with an optional collaboration
//! client. Every local command is applied to the canvas first and then
//! broadcast to peers; inbound peer batches are merged by the
//! [`Reconciler`] without being broadcast again.

use std::sync::{Arc, RwLock};

use tracing::trace;

use crate::{
    Result, ShareLock,
    canvas::{Canvas, Connection, Viewport, palette},
    collab::{CollabClient, ReconcileOptions, Reconciler},
    config::DEFAULT_WORKSPACE_ID,
    events::{ConnectionStatus, EdgeUpdatePayload, NodeUpdatePayload},
    model::{DataPatch, Edge, EdgeChange, GraphSnapshot, Node, NodeChange, XYPosition},
    shortcuts::{Focus, KeyChord, Shortcut},
};

#[derive(Clone)]
pub struct Editor {
    canvas: ShareLock<Canvas>,
    collab: Option<Arc<CollabClient>>,
    workspace_id: ShareLock<String>,
}

impl Editor {
    /// Editor without collaboration.
    pub fn new(canvas: Canvas) -> Self {
        Self {
            canvas: Arc::new(RwLock::new(canvas)),
            collab: None,
            workspace_id: Arc::new(RwLock::new(DEFAULT_WORKSPACE_ID.to_string())),
        }
    }

    /// Editor that broadcasts local edits through `client` and merges the
    /// batches it receives.
    pub fn with_collab(
        canvas: Canvas,
        client: Arc<CollabClient>,
        options: ReconcileOptions,
    ) -> Result<Self> {
        let mut editor = Self::new(canvas);
        Reconciler::attach(&client, editor.canvas.clone(), options)?;
        editor.collab = Some(client);
        Ok(editor)
    }

    /// Shared handle to the canvas for read access by other components.
    pub fn canvas(&self) -> ShareLock<Canvas> {
        self.canvas.clone()
    }

    pub fn read<R>(
        &self,
        f: impl FnOnce(&Canvas) -> R,
    ) -> R {
        f(&self.canvas.read().unwrap())
    }

    pub fn snapshot(&self) -> GraphSnapshot {
        self.read(|c| c.snapshot())
    }

    pub fn collab(&self) -> Option<Arc<CollabClient>> {
        self.collab.clone()
    }

    pub fn collab_status(&self) -> ConnectionStatus {
        self.collab.as_ref().map(|c| c.status()).unwrap_or_default()
    }

    pub fn workspace_id(&self) -> String {
        self.workspace_id.read().unwrap().clone()
    }

    pub fn set_workspace_id(
        &self,
        id: impl Into<String>,
    ) {
        *self.workspace_id.write().unwrap() = id.into();
    }

    /// Node batch from the canvas widget.
    pub fn on_nodes_change(
        &self,
        changes: Vec<NodeChange>,
    ) {
        if changes.is_empty() {
            return;
        }
        self.canvas.write().unwrap().apply_local_node_changes(&changes);
        self.broadcast_nodes(changes);
    }

    /// Edge batch from the canvas widget.
    pub fn on_edges_change(
        &self,
        changes: Vec<EdgeChange>,
    ) {
        if changes.is_empty() {
            return;
        }
        self.canvas.write().unwrap().apply_local_edge_changes(&changes);
        self.broadcast_edges(changes);
    }

    /// Connect gesture. Returns the created edge.
    pub fn on_connect(
        &self,
        connection: Connection,
    ) -> Option<Edge> {
        let change = self.canvas.write().unwrap().connect(connection)?;
        let edge = match &change {
            EdgeChange::Add {
                item,
            } => Some(item.clone()),
            _ => None,
        };
        self.broadcast_edges(vec![change]);
        edge
    }

    pub fn add_node(
        &self,
        node: Node,
    ) -> bool {
        let change = self.canvas.write().unwrap().add_node(node);
        match change {
            Some(change) => {
                self.broadcast_nodes(vec![change]);
                true
            }
            None => false,
        }
    }

    pub fn update_node_data(
        &self,
        id: &str,
        patch: &DataPatch,
    ) -> bool {
        let change = self.canvas.write().unwrap().update_node_data(id, patch);
        match change {
            Some(change) => {
                self.broadcast_nodes(vec![change]);
                true
            }
            None => false,
        }
    }

    /// Create a node from a palette item dropped at a screen-space point.
    /// Unknown discriminators are ignored.
    pub fn drop_node(
        &self,
        discriminator: &str,
        screen: XYPosition,
        viewport: &Viewport,
    ) -> Option<Node> {
        let node_type = palette::parse_discriminator(discriminator)?;
        let position = viewport.screen_to_canvas(screen);
        let (node, change) = self.canvas.write().unwrap().create_node(position, palette::default_node_data(node_type))?;
        self.broadcast_nodes(vec![change]);
        Some(node)
    }

    pub fn undo(&self) -> bool {
        self.canvas.write().unwrap().undo()
    }

    pub fn redo(&self) -> bool {
        self.canvas.write().unwrap().redo()
    }

    /// Route a key press to undo/redo. Returns whether it was handled.
    pub fn handle_key(
        &self,
        chord: &KeyChord,
        focus: Focus,
    ) -> bool {
        match Shortcut::resolve(chord, focus) {
            Some(Shortcut::Undo) => self.undo(),
            Some(Shortcut::Redo) => self.redo(),
            None => false,
        }
    }

    /// Replace the graph with a loaded snapshot. Not broadcast, not undoable.
    pub fn load(
        &self,
        snapshot: GraphSnapshot,
    ) {
        self.canvas.write().unwrap().set_workspace(snapshot);
    }

    pub fn clear(&self) {
        self.canvas.write().unwrap().clear_workspace();
    }

    fn broadcast_nodes(
        &self,
        changes: Vec<NodeChange>,
    ) {
        if let Some(client) = &self.collab {
            trace!("editor::broadcast_nodes({})", changes.len());
            client.emit_node_update(NodeUpdatePayload {
                workspace_id: self.workspace_id(),
                changes,
            });
        }
    }

    fn broadcast_edges(
        &self,
        changes: Vec<EdgeChange>,
    ) {
        if let Some(client) = &self.collab {
            trace!("editor::broadcast_edges({})", changes.len());
            client.emit_edge_update(EdgeUpdatePayload {
                workspace_id: self.workspace_id(),
                changes,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::runtime::Handle;

    use super::*;
    use crate::{
        collab::CollabHub,
        model::{NodeData, NodePayload, NodeType, NotePayload},
    };

    fn note(id: &str) -> Node {
        Node::new(id, XYPosition::default(), NodeData::new(id, NodePayload::Note(NotePayload::default())))
    }

    async fn eventually(f: impl Fn() -> bool) -> bool {
        for _ in 0..100 {
            if f() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }

    #[test]
    fn test_editor_drop_node() {
        let editor = Editor::new(Canvas::new());
        let viewport = Viewport {
            x: 10.0,
            y: 10.0,
            zoom: 2.0,
        };
        let node = editor.drop_node("noteNode", XYPosition::new(110.0, 30.0), &viewport).unwrap();
        assert_eq!(node.id, "node-1");
        assert_eq!(node.node_type(), NodeType::Note);
        assert_eq!(node.position, XYPosition::new(50.0, 10.0));
        assert_eq!(node.title(), "New Note");
        assert!(editor.read(|c| c.can_undo()));

        assert!(editor.drop_node("", XYPosition::default(), &viewport).is_none());
        assert!(editor.drop_node("pieNode", XYPosition::default(), &viewport).is_none());
        assert_eq!(editor.read(|c| c.nodes().len()), 1);
    }

    #[test]
    fn test_editor_shortcuts() {
        let editor = Editor::new(Canvas::new());
        assert!(!editor.handle_key(&KeyChord::new("z").ctrl(), Focus::Canvas));

        editor.add_node(note("a"));
        assert!(!editor.handle_key(&KeyChord::new("z").ctrl(), Focus::TextInput));
        assert!(editor.handle_key(&KeyChord::new("z").ctrl(), Focus::Canvas));
        assert!(editor.read(|c| c.nodes().is_empty()));
        assert!(editor.handle_key(&KeyChord::new("y").ctrl(), Focus::Canvas));
        assert_eq!(editor.read(|c| c.nodes().len()), 1);
        assert!(!editor.handle_key(&KeyChord::new("z").ctrl().shift(), Focus::Canvas));
    }

    #[tokio::test]
    async fn test_editor_peers_converge_without_echo() {
        let hub = CollabHub::new(64, Handle::current());
        let a_client = Arc::new(hub.client());
        let b_client = Arc::new(hub.client());
        let a = Editor::with_collab(Canvas::new(), a_client.clone(), ReconcileOptions::default()).unwrap();
        let b = Editor::with_collab(Canvas::new(), b_client.clone(), ReconcileOptions::default()).unwrap();
        a_client.connect();
        b_client.connect();
        assert_eq!(a.collab_status(), ConnectionStatus::Connected);

        a.add_node(note("1"));
        a.add_node(note("2"));
        let edge = a.on_connect(Connection::new("1", "2")).unwrap();
        for x in 1..=3 {
            a.on_nodes_change(vec![NodeChange::position("1", XYPosition::new(x as f64, 0.0), true)]);
        }
        a.on_nodes_change(vec![NodeChange::position("1", XYPosition::new(4.0, 0.0), false)]);

        assert!(
            eventually(|| {
                b.read(|c| c.nodes().len() == 2 && c.edge(&edge.id).is_some() && c.node("1").map(|n| n.position.x) == Some(4.0))
            })
            .await
        );

        // a's own frames came back to it and were dropped: history is local only
        assert_eq!(a.read(|c| c.history().past_len()), 4);
        assert_eq!(a.read(|c| c.nodes().len()), 2);
        assert!(!b.read(|c| c.can_undo()));

        // undo is local and not broadcast
        a.undo();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(a.read(|c| c.node("1").unwrap().position.x), 0.0);
        assert_eq!(b.read(|c| c.node("1").unwrap().position.x), 4.0);
    }

    #[tokio::test]
    async fn test_editor_offline_edits_not_sent() {
        let hub = CollabHub::new(16, Handle::current());
        let a_client = Arc::new(hub.client());
        let b_client = Arc::new(hub.client());
        let a = Editor::with_collab(Canvas::new(), a_client.clone(), ReconcileOptions::default()).unwrap();
        let b = Editor::with_collab(Canvas::new(), b_client.clone(), ReconcileOptions::default()).unwrap();
        b_client.connect();

        a.add_node(note("offline"));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(a.read(|c| c.nodes().len()), 1);
        assert!(b.read(|c| c.nodes().is_empty()));
    }
}
