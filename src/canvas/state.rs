use tracing::{debug, trace};

use crate::{
    canvas::{
        History, NodeIdCounter,
        apply::{apply_edge_changes, apply_node_changes},
    },
    model::{CUSTOM_EDGE_TYPE, DataPatch, Edge, EdgeChange, GraphSnapshot, Importance, Node, NodeChange, NodeData, NodeId, ThreadData, XYPosition, is_in_progress},
    utils,
};

/// A connect gesture between two node handles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Connection {
    pub source: NodeId,
    pub target: NodeId,
    pub source_handle: Option<String>,
    pub target_handle: Option<String>,
}

impl Connection {
    pub fn new(
        source: impl Into<NodeId>,
        target: impl Into<NodeId>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            ..Default::default()
        }
    }
}

/// Live graph of one workspace together with its undo history and node-id
/// counter.
///
/// Every mutation of nodes and edges goes through this type. Local entry
/// points record history; remote entry points never do. Nothing here
/// broadcasts; see [`crate::Editor`] for the collaboration side effects.
#[derive(Debug, Clone, Default)]
pub struct Canvas {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    history: History,
    ids: NodeIdCounter,
    /// snapshot taken when the current drag gesture started
    drag_origin: Option<GraphSnapshot>,
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history_limit(limit: Option<usize>) -> Self {
        Self {
            history: History::with_limit(limit),
            ..Self::default()
        }
    }

    /// Canvas starting from `snapshot` with empty history.
    pub fn from_snapshot(snapshot: GraphSnapshot) -> Self {
        let mut canvas = Self::new();
        canvas.set_workspace(snapshot);
        canvas
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(
        &self,
        id: &str,
    ) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(
        &self,
        id: &str,
    ) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot::new(self.nodes.clone(), self.edges.clone())
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Edges pointing at a node that does not exist. They are kept as-is.
    pub fn dangling_edges(&self) -> Vec<&Edge> {
        self.edges.iter().filter(|e| self.node(&e.source).is_none() || self.node(&e.target).is_none()).collect()
    }

    /// Mint the next `node-<n>` id.
    pub fn next_node_id(&mut self) -> NodeId {
        self.ids.mint()
    }

    /// Apply a batch coming from this client's own canvas widget.
    ///
    /// A batch with an in-progress drag is applied without touching history;
    /// the pre-drag snapshot is held back and recorded once when the gesture
    /// completes, so a whole drag is a single undo step. Returns whether a
    /// history entry was recorded.
    pub fn apply_local_node_changes(
        &mut self,
        changes: &[NodeChange],
    ) -> bool {
        if changes.is_empty() {
            return false;
        }
        trace!("canvas::apply_local_node_changes({})", changes.len());

        if is_in_progress(changes) {
            if self.drag_origin.is_none() {
                self.drag_origin = Some(self.snapshot());
            }
            self.nodes = apply_node_changes(changes, &self.nodes);
            return false;
        }

        let releases_drag = changes.iter().any(|c| matches!(c, NodeChange::Position { .. }));
        let before = match self.drag_origin.take() {
            Some(origin) if releases_drag => origin,
            origin => {
                self.flush_drag(origin);
                self.snapshot()
            }
        };
        self.nodes = apply_node_changes(changes, &self.nodes);
        self.history.record(before);
        true
    }

    /// Apply a batch of edge changes from this client. Returns whether a
    /// history entry was recorded.
    pub fn apply_local_edge_changes(
        &mut self,
        changes: &[EdgeChange],
    ) -> bool {
        if changes.is_empty() {
            return false;
        }
        trace!("canvas::apply_local_edge_changes({})", changes.len());

        let origin = self.drag_origin.take();
        self.flush_drag(origin);
        let before = self.snapshot();
        self.edges = apply_edge_changes(changes, &self.edges);
        self.history.record(before);
        true
    }

    /// Apply a batch received from a peer. Remote state is not undoable.
    pub fn apply_remote_node_changes(
        &mut self,
        changes: &[NodeChange],
    ) {
        trace!("canvas::apply_remote_node_changes({})", changes.len());
        self.nodes = apply_node_changes(changes, &self.nodes);
    }

    pub fn apply_remote_edge_changes(
        &mut self,
        changes: &[EdgeChange],
    ) {
        trace!("canvas::apply_remote_edge_changes({})", changes.len());
        self.edges = apply_edge_changes(changes, &self.edges);
    }

    /// Append `node` as one undo step. Returns the change to broadcast, or
    /// `None` when a node with that id already exists.
    pub fn add_node(
        &mut self,
        node: Node,
    ) -> Option<NodeChange> {
        if self.node(&node.id).is_some() {
            debug!("canvas::add_node({}) ignored, id already present", node.id);
            return None;
        }
        let change = NodeChange::add(node);
        self.apply_local_node_changes(std::slice::from_ref(&change));
        Some(change)
    }

    /// Mint an id and add a node of the given data at `position`.
    pub fn create_node(
        &mut self,
        position: XYPosition,
        data: NodeData,
    ) -> Option<(Node, NodeChange)> {
        let id = self.next_node_id();
        let node = Node::new(id, position, data);
        self.add_node(node.clone()).map(|change| (node, change))
    }

    /// Merge `patch` into a node's data as one undo step. Returns a `reset`
    /// change carrying the updated node, or `None` when the node is missing
    /// or the patch does not fit its type.
    pub fn update_node_data(
        &mut self,
        id: &str,
        patch: &DataPatch,
    ) -> Option<NodeChange> {
        let updated = match self.node(id)?.patched(patch) {
            Ok(node) => node,
            Err(e) => {
                debug!("canvas::update_node_data({}) rejected: {}", id, e);
                return None;
            }
        };
        let change = NodeChange::reset(updated);
        self.apply_local_node_changes(std::slice::from_ref(&change));
        Some(change)
    }

    /// Create an edge for a connect gesture as one undo step. Returns the
    /// change to broadcast, or `None` when the same connection already exists.
    pub fn connect(
        &mut self,
        connection: Connection,
    ) -> Option<EdgeChange> {
        let exists = self.edges.iter().any(|e| {
            e.source == connection.source
                && e.target == connection.target
                && e.source_handle == connection.source_handle
                && e.target_handle == connection.target_handle
        });
        if exists {
            debug!("canvas::connect({} -> {}) ignored, already connected", connection.source, connection.target);
            return None;
        }

        let mut id = format!("e-{}-{}-{}", connection.source, connection.target, utils::time::time_millis());
        if self.edge(&id).is_some() {
            id = format!("{}-{}", id, utils::shortid());
        }
        let edge = Edge {
            id,
            source: connection.source,
            target: connection.target,
            source_handle: connection.source_handle,
            target_handle: connection.target_handle,
            edge_type: CUSTOM_EDGE_TYPE.to_string(),
            data: ThreadData {
                importance: Some(Importance::Normal),
                ..Default::default()
            },
        };
        let change = EdgeChange::add(edge);
        self.apply_local_edge_changes(std::slice::from_ref(&change));
        Some(change)
    }

    /// Restore the snapshot before the last undoable step. Returns false when
    /// there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        self.drag_origin = None;
        match self.history.undo(self.snapshot()) {
            Some(previous) => {
                self.replace(previous);
                true
            }
            None => false,
        }
    }

    /// Re-apply the most recently undone step. Returns false when there is
    /// nothing to redo.
    pub fn redo(&mut self) -> bool {
        self.drag_origin = None;
        match self.history.redo(self.snapshot()) {
            Some(next) => {
                self.replace(next);
                true
            }
            None => false,
        }
    }

    /// Replace the live graph with a loaded snapshot. Not undoable: history
    /// is cleared and the id counter reseeded from the loaded nodes.
    pub fn set_workspace(
        &mut self,
        snapshot: GraphSnapshot,
    ) {
        debug!("canvas::set_workspace(nodes: {}, edges: {})", snapshot.nodes.len(), snapshot.edges.len());
        self.ids.reseed(&snapshot.nodes);
        self.replace(snapshot);
        self.history.clear();
        self.drag_origin = None;
    }

    /// Empty the graph and forget history.
    pub fn clear_workspace(&mut self) {
        self.replace(GraphSnapshot::default());
        self.history.clear();
        self.drag_origin = None;
    }

    /// An unreleased drag interrupted by another edit becomes its own step.
    fn flush_drag(
        &mut self,
        origin: Option<GraphSnapshot>,
    ) {
        if let Some(origin) = origin {
            debug!("canvas: drag interrupted, recording it as its own step");
            self.history.record(origin);
        }
    }

    fn replace(
        &mut self,
        snapshot: GraphSnapshot,
    ) {
        self.nodes = snapshot.nodes;
        self.edges = snapshot.edges;
    }
}
