use crate::model::{Node, NodeId};

const NODE_ID_PREFIX: &str = "node-";

/// Mints node ids of the form `node-<n>`.
///
/// The counter only ever grows. Reseeding from a loaded snapshot takes the
/// larger of the current value, the node count and the highest `node-<n>`
/// suffix present, so minted ids never collide with loaded ones.
#[derive(Debug, Clone, Default)]
pub struct NodeIdCounter {
    last: u64,
}

impl NodeIdCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(last: u64) -> Self {
        Self {
            last,
        }
    }

    /// Value of the most recently minted id.
    pub fn last(&self) -> u64 {
        self.last
    }

    pub fn mint(&mut self) -> NodeId {
        self.last += 1;
        format!("{}{}", NODE_ID_PREFIX, self.last)
    }

    pub fn reseed(
        &mut self,
        nodes: &[Node],
    ) {
        let max_suffix = nodes.iter().filter_map(|n| parse_suffix(&n.id)).max().unwrap_or(0);
        self.last = self.last.max(nodes.len() as u64).max(max_suffix);
    }
}

fn parse_suffix(id: &str) -> Option<u64> {
    id.strip_prefix(NODE_ID_PREFIX)?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NodeData, NodePayload, NotePayload, XYPosition};

    fn note(id: &str) -> Node {
        Node::new(id, XYPosition::default(), NodeData::new(id, NodePayload::Note(NotePayload::default())))
    }

    #[test]
    fn test_ids_mint_sequence() {
        let mut ids = NodeIdCounter::new();
        assert_eq!(ids.mint(), "node-1");
        assert_eq!(ids.mint(), "node-2");
        assert_eq!(ids.last(), 2);
    }

    #[test]
    fn test_ids_reseed_from_suffix() {
        let mut ids = NodeIdCounter::new();
        ids.reseed(&[note("node-7"), note("node-2")]);
        assert_eq!(ids.mint(), "node-8");
    }

    #[test]
    fn test_ids_reseed_from_count() {
        let mut ids = NodeIdCounter::new();
        ids.reseed(&[note("1"), note("2"), note("3")]);
        assert_eq!(ids.mint(), "node-4");
    }

    #[test]
    fn test_ids_never_decrease() {
        let mut ids = NodeIdCounter::starting_at(10);
        ids.reseed(&[note("node-3")]);
        assert_eq!(ids.mint(), "node-11");
        ids.reseed(&[]);
        assert_eq!(ids.mint(), "node-12");
    }

    #[test]
    fn test_ids_ignore_foreign_shapes() {
        assert_eq!(parse_suffix("node-12"), Some(12));
        assert_eq!(parse_suffix("node-x"), None);
        assert_eq!(parse_suffix("w2-1"), None);
    }
}
