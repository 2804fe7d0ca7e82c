//! Linear undo/redo history of full graph snapshots.
//!
//! `past` holds the snapshot captured before each history-eligible mutation,
//! newest last. `future` holds the snapshots undone since the last forward
//! edit, the next redo target first. Recording a new step discards `future`.

use std::collections::VecDeque;

use tracing::trace;

use crate::model::GraphSnapshot;

#[derive(Debug, Clone, Default)]
pub struct History {
    past: Vec<GraphSnapshot>,
    future: VecDeque<GraphSnapshot>,
    limit: Option<usize>,
}

impl History {
    /// Unbounded history.
    pub fn new() -> Self {
        Self::default()
    }

    /// History keeping at most `limit` undo steps; the oldest are dropped first.
    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    /// Push the pre-mutation snapshot and invalidate the redo branch.
    pub fn record(
        &mut self,
        before: GraphSnapshot,
    ) {
        self.past.push(before);
        self.future.clear();
        if let Some(limit) = self.limit {
            if self.past.len() > limit {
                let excess = self.past.len() - limit;
                self.past.drain(0..excess);
            }
        }
        trace!("history::record(past: {}, future: 0)", self.past.len());
    }

    /// Step back. `current` is the live snapshot, which becomes the next redo
    /// target. Returns the snapshot to make live, or `None` when there is
    /// nothing to undo.
    pub fn undo(
        &mut self,
        current: GraphSnapshot,
    ) -> Option<GraphSnapshot> {
        let previous = self.past.pop()?;
        self.future.push_front(current);
        trace!("history::undo(past: {}, future: {})", self.past.len(), self.future.len());
        Some(previous)
    }

    /// Step forward. `current` is the live snapshot, which is pushed back onto
    /// `past`. Returns the snapshot to make live, or `None` when there is
    /// nothing to redo.
    pub fn redo(
        &mut self,
        current: GraphSnapshot,
    ) -> Option<GraphSnapshot> {
        let next = self.future.pop_front()?;
        self.past.push(current);
        trace!("history::redo(past: {}, future: {})", self.past.len(), self.future.len());
        Some(next)
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    pub fn future_len(&self) -> usize {
        self.future.len()
    }

    pub fn past(&self) -> &[GraphSnapshot] {
        &self.past
    }

    pub fn future(&self) -> impl Iterator<Item = &GraphSnapshot> {
        self.future.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Edge, GraphSnapshot};

    fn snap(n: usize) -> GraphSnapshot {
        GraphSnapshot::new(vec![], (0..n).map(|i| Edge::new(format!("e{}", i), "a", "b")).collect())
    }

    #[test]
    fn test_history_empty_is_noop() {
        let mut history = History::new();
        assert!(history.undo(snap(0)).is_none());
        assert!(history.redo(snap(0)).is_none());
        assert_eq!(history.past_len(), 0);
        assert_eq!(history.future_len(), 0);
    }

    #[test]
    fn test_history_undo_redo() {
        let mut history = History::new();
        history.record(snap(0));
        history.record(snap(1));

        assert_eq!(history.undo(snap(2)), Some(snap(1)));
        assert_eq!(history.undo(snap(1)), Some(snap(0)));
        assert!(!history.can_undo());
        assert_eq!(history.future().cloned().collect::<Vec<_>>(), vec![snap(1), snap(2)]);

        assert_eq!(history.redo(snap(0)), Some(snap(1)));
        assert_eq!(history.redo(snap(1)), Some(snap(2)));
        assert!(!history.can_redo());
        assert_eq!(history.past(), &[snap(0), snap(1)]);
    }

    #[test]
    fn test_history_record_clears_future() {
        let mut history = History::new();
        history.record(snap(0));
        history.undo(snap(1));
        assert!(history.can_redo());

        history.record(snap(0));
        assert!(!history.can_redo());
        assert!(history.redo(snap(5)).is_none());
    }

    #[test]
    fn test_history_limit() {
        let mut history = History::with_limit(Some(2));
        history.record(snap(0));
        history.record(snap(1));
        history.record(snap(2));
        assert_eq!(history.past(), &[snap(1), snap(2)]);
    }

    #[test]
    fn test_history_clear() {
        let mut history = History::new();
        history.record(snap(0));
        history.undo(snap(1));
        history.record(snap(3));
        history.clear();
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }
}
