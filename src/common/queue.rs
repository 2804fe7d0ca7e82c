//! Broadcast queue for one-to-many message distribution.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::{CanvasError, Result};

/// Broadcast queue where every subscriber receives every message.
///
/// Backed by tokio's broadcast channel. Slow subscribers lose the oldest
/// messages once `cap` is exceeded.
#[derive(Clone)]
pub struct BroadcastQueue<T> {
    sender: Arc<broadcast::Sender<T>>,
}

impl<T: Clone> BroadcastQueue<T> {
    /// create a new broadcast queue
    pub fn new(cap: usize) -> Arc<Self> {
        let (tx, _) = broadcast::channel(cap.max(1));

        Arc::new(Self {
            sender: Arc::new(tx),
        })
    }

    /// send a message to the queue, returns the number of subscribers reached
    pub fn send(
        &self,
        msg: T,
    ) -> Result<usize> {
        self.sender.send(msg).map_err(|e| CanvasError::Queue(e.to_string()))
    }

    /// subscribe to the queue
    pub fn subscribe(&self) -> broadcast::Receiver<T> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
