use serde::{Deserialize, Serialize};

use crate::{
    CanvasError, Result,
    model::{Edge, Node},
};

/// Full `{nodes, edges}` state of a workspace.
///
/// Ordering is insertion order and only matters for z-ordering; ids are the
/// only stable reference. This is also the persisted document format.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct GraphSnapshot {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl GraphSnapshot {
    pub fn new(
        nodes: Vec<Node>,
        edges: Vec<Edge>,
    ) -> Self {
        Self {
            nodes,
            edges,
        }
    }

    pub fn from_json(s: &str) -> Result<Self> {
        serde_json::from_str::<GraphSnapshot>(s).map_err(|e| CanvasError::Convert(format!("invalid workspace snapshot: {}", e)))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
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

    /// Edges whose source or target is not a node of this snapshot.
    pub fn dangling_edges(&self) -> Vec<&Edge> {
        self.edges.iter().filter(|e| self.node(&e.source).is_none() || self.node(&e.target).is_none()).collect()
    }
}
