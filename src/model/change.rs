//! Incremental change descriptors for nodes and edges.
//!
//! These are what the canvas widget emits for user gestures and what peers
//! exchange over the collaboration channel.

use serde::{Deserialize, Serialize};

use crate::model::{DataPatch, Edge, EdgeId, Node, NodeId, XYPosition};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NodeChange {
    /// Append a node.
    Add { item: Node },
    /// Remove a node by id.
    Remove { id: NodeId },
    /// Shallow-merge a patch into a node's data.
    Update { id: NodeId, patch: DataPatch },
    /// Replace a node wholesale.
    Reset { id: NodeId, item: Node },
    /// Move a node. `dragging` is set while a pointer drag is in progress.
    Position {
        id: NodeId,
        position: XYPosition,
        #[serde(default)]
        dragging: bool,
    },
}

impl NodeChange {
    pub fn add(item: Node) -> Self {
        NodeChange::Add {
            item,
        }
    }

    pub fn remove(id: impl Into<NodeId>) -> Self {
        NodeChange::Remove {
            id: id.into(),
        }
    }

    pub fn update(
        id: impl Into<NodeId>,
        patch: DataPatch,
    ) -> Self {
        NodeChange::Update {
            id: id.into(),
            patch,
        }
    }

    pub fn reset(item: Node) -> Self {
        NodeChange::Reset {
            id: item.id.clone(),
            item,
        }
    }

    pub fn position(
        id: impl Into<NodeId>,
        position: XYPosition,
        dragging: bool,
    ) -> Self {
        NodeChange::Position {
            id: id.into(),
            position,
            dragging,
        }
    }

    /// Id of the node this change targets.
    pub fn id(&self) -> &str {
        match self {
            NodeChange::Add {
                item,
            } => &item.id,
            NodeChange::Remove {
                id,
            }
            | NodeChange::Update {
                id,
                ..
            }
            | NodeChange::Reset {
                id,
                ..
            }
            | NodeChange::Position {
                id,
                ..
            } => id,
        }
    }

    /// Whether this change belongs to a gesture that has not finished yet.
    pub fn is_intermediate(&self) -> bool {
        matches!(
            self,
            NodeChange::Position {
                dragging: true,
                ..
            }
        )
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EdgeChange {
    /// Append an edge.
    Add { item: Edge },
    /// Remove an edge by id.
    Remove { id: EdgeId },
    /// Shallow-merge a patch into an edge's data.
    Update { id: EdgeId, patch: DataPatch },
    /// Replace an edge wholesale.
    Reset { id: EdgeId, item: Edge },
}

impl EdgeChange {
    pub fn add(item: Edge) -> Self {
        EdgeChange::Add {
            item,
        }
    }

    pub fn remove(id: impl Into<EdgeId>) -> Self {
        EdgeChange::Remove {
            id: id.into(),
        }
    }

    pub fn update(
        id: impl Into<EdgeId>,
        patch: DataPatch,
    ) -> Self {
        EdgeChange::Update {
            id: id.into(),
            patch,
        }
    }

    pub fn reset(item: Edge) -> Self {
        EdgeChange::Reset {
            id: item.id.clone(),
            item,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            EdgeChange::Add {
                item,
            } => &item.id,
            EdgeChange::Remove {
                id,
            }
            | EdgeChange::Update {
                id,
                ..
            }
            | EdgeChange::Reset {
                id,
                ..
            } => id,
        }
    }
}

/// A batch is in progress when any of its changes is intermediate.
pub fn is_in_progress(changes: &[NodeChange]) -> bool {
    changes.iter().any(NodeChange::is_intermediate)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_change_wire_format() {
        let change: NodeChange = serde_json::from_value(json!({
            "type": "position",
            "id": "node-1",
            "position": { "x": 10.0, "y": 20.0 },
            "dragging": true
        }))
        .unwrap();
        assert_eq!(change, NodeChange::position("node-1", XYPosition::new(10.0, 20.0), true));
        assert!(change.is_intermediate());

        let change: NodeChange = serde_json::from_value(json!({ "type": "position", "id": "n", "position": { "x": 0.0, "y": 0.0 } })).unwrap();
        assert!(!change.is_intermediate());

        let value = serde_json::to_value(EdgeChange::remove("e1")).unwrap();
        assert_eq!(value, json!({ "type": "remove", "id": "e1" }));
    }

    #[test]
    fn test_change_in_progress() {
        let release = NodeChange::position("a", XYPosition::default(), false);
        let drag = NodeChange::position("b", XYPosition::default(), true);
        assert!(!is_in_progress(&[]));
        assert!(!is_in_progress(&[release.clone(), NodeChange::remove("c")]));
        assert!(is_in_progress(&[release, drag]));
    }
}
