//! Pure application of change batches to node and edge sequences.
//!
//! Changes are applied in batch order. Untouched items keep their relative
//! order and added items are appended. Changes that target a missing id are
//! ignored, and so is an `add` whose id is already present.

use tracing::{trace, warn};

use crate::model::{Edge, EdgeChange, Node, NodeChange};

/// Apply `changes` to `nodes`, producing the new sequence.
pub fn apply_node_changes(
    changes: &[NodeChange],
    nodes: &[Node],
) -> Vec<Node> {
    let mut next = nodes.to_vec();
    for change in changes {
        trace!("apply_node_change({:?})", change);
        match change {
            NodeChange::Add {
                item,
            } => {
                if position_of(&next, &item.id, |n| &n.id).is_none() {
                    next.push(item.clone());
                }
            }
            NodeChange::Remove {
                id,
            } => {
                next.retain(|n| &n.id != id);
            }
            NodeChange::Update {
                id,
                patch,
            } => {
                if let Some(idx) = position_of(&next, id, |n| &n.id) {
                    match next[idx].patched(patch) {
                        Ok(node) => next[idx] = node,
                        Err(e) => warn!("ignore update of node {}: {}", id, e),
                    }
                }
            }
            NodeChange::Reset {
                id,
                item,
            } => {
                if let Some(idx) = position_of(&next, id, |n| &n.id) {
                    next[idx] = item.clone();
                }
            }
            NodeChange::Position {
                id,
                position,
                ..
            } => {
                if let Some(idx) = position_of(&next, id, |n| &n.id) {
                    next[idx].position = *position;
                }
            }
        }
    }
    next
}

/// Apply `changes` to `edges`, producing the new sequence.
pub fn apply_edge_changes(
    changes: &[EdgeChange],
    edges: &[Edge],
) -> Vec<Edge> {
    let mut next = edges.to_vec();
    for change in changes {
        trace!("apply_edge_change({:?})", change);
        match change {
            EdgeChange::Add {
                item,
            } => {
                if position_of(&next, &item.id, |e| &e.id).is_none() {
                    next.push(item.clone());
                }
            }
            EdgeChange::Remove {
                id,
            } => {
                next.retain(|e| &e.id != id);
            }
            EdgeChange::Update {
                id,
                patch,
            } => {
                if let Some(idx) = position_of(&next, id, |e| &e.id) {
                    match next[idx].patched(patch) {
                        Ok(edge) => next[idx] = edge,
                        Err(e) => warn!("ignore update of edge {}: {}", id, e),
                    }
                }
            }
            EdgeChange::Reset {
                id,
                item,
            } => {
                if let Some(idx) = position_of(&next, id, |e| &e.id) {
                    next[idx] = item.clone();
                }
            }
        }
    }
    next
}

fn position_of<T>(
    items: &[T],
    id: &str,
    key: impl Fn(&T) -> &String,
) -> Option<usize> {
    items.iter().position(|item| key(item) == id)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;
    use crate::model::{DataPatch, Importance, NodeData, NodePayload, NotePayload, XYPosition};

    fn note(id: &str) -> Node {
        Node::new(id, XYPosition::default(), NodeData::new(id, NodePayload::Note(NotePayload::default())))
    }

    fn ids(nodes: &[Node]) -> Vec<&str> {
        nodes.iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn test_apply_empty_batch() {
        let nodes = vec![note("1"), note("2")];
        assert_eq!(apply_node_changes(&[], &nodes), nodes);

        let edges = vec![Edge::new("e", "1", "2")];
        assert_eq!(apply_edge_changes(&[], &edges), edges);
    }

    #[test]
    fn test_apply_add_appends() {
        let nodes = vec![note("1"), note("2")];
        let next = apply_node_changes(&[NodeChange::add(note("3"))], &nodes);
        assert_eq!(ids(&next), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_apply_add_duplicate_ignored() {
        let nodes = vec![note("1")];
        let mut dup = note("1");
        dup.position = XYPosition::new(5.0, 5.0);
        let next = apply_node_changes(&[NodeChange::add(dup)], &nodes);
        assert_eq!(next, nodes);
    }

    #[test]
    fn test_apply_remove_preserves_order() {
        let nodes = vec![note("1"), note("2"), note("3")];
        let next = apply_node_changes(&[NodeChange::remove("2")], &nodes);
        assert_eq!(ids(&next), vec!["1", "3"]);
    }

    #[test]
    fn test_apply_missing_ids_are_noops() {
        let nodes = vec![note("1")];
        let changes = vec![
            NodeChange::remove("9"),
            NodeChange::update("9", DataPatch::new().set("title", "x")),
            NodeChange::reset(note("9")),
            NodeChange::position("9", XYPosition::new(1.0, 1.0), false),
        ];
        assert_eq!(apply_node_changes(&changes, &nodes), nodes);
    }

    #[test]
    fn test_apply_update_reset_position() {
        let nodes = vec![note("1"), note("2")];
        let mut replacement = note("2");
        replacement.data.common.title = "replaced".to_string();

        let changes = vec![
            NodeChange::update("1", DataPatch::new().set("text", "hello")),
            NodeChange::reset(replacement.clone()),
            NodeChange::position("1", XYPosition::new(3.0, 4.0), true),
        ];
        let next = apply_node_changes(&changes, &nodes);

        assert_eq!(ids(&next), vec!["1", "2"]);
        assert_eq!(next[0].position, XYPosition::new(3.0, 4.0));
        assert_eq!(
            next[0].data.payload,
            NodePayload::Note(NotePayload {
                text: Some("hello".to_string())
            })
        );
        assert_eq!(next[1], replacement);
    }

    #[test]
    fn test_apply_invalid_update_is_noop() {
        let nodes = vec![note("1")];
        let next = apply_node_changes(&[NodeChange::update("1", DataPatch::new().set("title", json!(42)))], &nodes);
        assert_eq!(next, nodes);
    }

    #[test]
    fn test_apply_batch_order_matters() {
        let next = apply_node_changes(&[NodeChange::add(note("a")), NodeChange::position("a", XYPosition::new(9.0, 9.0), false)], &[]);
        assert_eq!(next[0].position, XYPosition::new(9.0, 9.0));

        let next = apply_node_changes(&[NodeChange::remove("a"), NodeChange::add(note("a"))], &[note("b"), note("a")]);
        assert_eq!(ids(&next), vec!["b", "a"]);
    }

    #[test]
    fn test_apply_edge_changes() {
        let edges = vec![Edge::new("e1", "1", "2"), Edge::new("e2", "2", "3")];
        let changes = vec![
            EdgeChange::update("e1", DataPatch::new().set("importance", "critical")),
            EdgeChange::remove("e2"),
            EdgeChange::add(Edge::new("e3", "1", "missing")),
        ];
        let next = apply_edge_changes(&changes, &edges);

        assert_eq!(next.len(), 2);
        assert_eq!(next[0].data.importance(), Importance::Critical);
        assert_eq!(next[1].target, "missing");
    }

    proptest! {
        #[test]
        fn prop_empty_batch_is_identity(count in 0usize..12) {
            let nodes: Vec<Node> = (0..count).map(|i| note(&format!("node-{}", i))).collect();
            let edges: Vec<Edge> = (1..count).map(|i| Edge::new(format!("e{}", i), format!("node-{}", i - 1), format!("node-{}", i))).collect();
            prop_assert_eq!(apply_node_changes(&[], &nodes), nodes);
            prop_assert_eq!(apply_edge_changes(&[], &edges), edges);
        }

        #[test]
        fn prop_remove_missing_is_identity(count in 0usize..12, missing in "[a-z]{3,8}") {
            let nodes: Vec<Node> = (0..count).map(|i| note(&format!("node-{}", i))).collect();
            prop_assert_eq!(apply_node_changes(&[NodeChange::remove(missing)], &nodes), nodes);
        }
    }
}
