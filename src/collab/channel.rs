//! Best-effort broadcast channel between collaborators.
//!
//! [`CollabHub`] stands in for the relay server: every frame published to it
//! reaches every connected client, including the one that sent it. There is
//! no acknowledgement, retry or gap detection; a client that lags behind the
//! queue simply loses the oldest frames.

use std::sync::{Arc, RwLock};

use tokio::{runtime::Handle, sync::broadcast::error::RecvError};
use tracing::{debug, info, trace, warn};

use crate::{
    Result, ShareLock,
    common::{BroadcastQueue, Shutdown},
    events::{ClientId, CollabEvent, ConnectionStatus, EdgeUpdatePayload, Envelope, NodeUpdatePayload},
    utils,
};

macro_rules! dispatch_event {
    ($handles:expr, $(&$item:ident), +) => {
        let handlers = $handles.read().unwrap();
        for handle in handlers.iter() {
            (handle)($(&$item),+);
        }
    };
}

pub type StatusHandle = Arc<dyn Fn(&ConnectionStatus) + Send + Sync>;
pub type NodeUpdateHandle = Arc<dyn Fn(&Envelope<NodeUpdatePayload>) + Send + Sync>;
pub type EdgeUpdateHandle = Arc<dyn Fn(&Envelope<EdgeUpdatePayload>) + Send + Sync>;

/// Relay that fans every published frame out to all connected clients.
pub struct CollabHub {
    queue: Arc<BroadcastQueue<String>>,
    runtime: Handle,
}

impl CollabHub {
    pub fn new(
        queue_size: usize,
        runtime: Handle,
    ) -> Arc<Self> {
        Arc::new(Self {
            queue: BroadcastQueue::new(queue_size),
            runtime,
        })
    }

    /// Create a new client with a fresh identity, initially disconnected.
    pub fn client(self: &Arc<Self>) -> CollabClient {
        CollabClient::new(format!("client_{}", utils::shortid()), self.clone())
    }

    /// Publish a raw frame to every connected client.
    pub fn publish(
        &self,
        frame: String,
    ) -> Result<usize> {
        self.queue.send(frame)
    }

    pub fn connected_clients(&self) -> usize {
        self.queue.subscriber_count()
    }
}

#[derive(Clone, Default)]
struct Handlers {
    statuses: ShareLock<Vec<StatusHandle>>,
    node_updates: ShareLock<Vec<NodeUpdateHandle>>,
    edge_updates: ShareLock<Vec<EdgeUpdateHandle>>,
}

impl Handlers {
    fn dispatch_status(
        &self,
        status: ConnectionStatus,
    ) {
        dispatch_event!(self.statuses, &status);
    }

    fn dispatch_frame(
        &self,
        frame: &str,
    ) {
        let event = match CollabEvent::decode(frame) {
            Ok(event) => event,
            Err(e) => {
                warn!("collab: drop frame: {}", e);
                return;
            }
        };
        trace!("collab: received {}", event.name());
        match event {
            CollabEvent::NodeUpdated(envelope) => {
                dispatch_event!(self.node_updates, &envelope);
            }
            CollabEvent::EdgeUpdated(envelope) => {
                dispatch_event!(self.edge_updates, &envelope);
            }
            // connection status is local to each client
            CollabEvent::Status(_) => {}
        }
    }
}

/// One participant of the collaboration channel.
pub struct CollabClient {
    id: ClientId,
    hub: Arc<CollabHub>,
    status: ShareLock<ConnectionStatus>,
    handlers: Handlers,
    shutdown: ShareLock<Option<Arc<Shutdown>>>,
}

impl CollabClient {
    fn new(
        id: ClientId,
        hub: Arc<CollabHub>,
    ) -> Self {
        Self {
            id,
            hub,
            status: Arc::new(RwLock::new(ConnectionStatus::Disconnected)),
            handlers: Handlers::default(),
            shutdown: Arc::new(RwLock::new(None)),
        }
    }

    /// This client's own identity, stamped on every outbound batch.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn status(&self) -> ConnectionStatus {
        *self.status.read().unwrap()
    }

    pub fn is_connected(&self) -> bool {
        self.status() == ConnectionStatus::Connected
    }

    /// Subscribe to the hub and start dispatching inbound frames.
    pub fn connect(&self) {
        let mut shutdown_slot = self.shutdown.write().unwrap();
        if shutdown_slot.is_some() {
            return;
        }

        let mut receiver = self.hub.queue.subscribe();
        let shutdown = Arc::new(Shutdown::new());
        *shutdown_slot = Some(shutdown.clone());
        drop(shutdown_slot);

        let handlers = self.handlers.clone();
        let id = self.id.clone();
        self.hub.runtime.spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown.wait() => break,
                    res = receiver.recv() => match res {
                        Ok(frame) => handlers.dispatch_frame(&frame),
                        Err(RecvError::Lagged(n)) => warn!("collab: {} lagged, {} frames lost", id, n),
                        Err(RecvError::Closed) => break,
                    }
                }
            }
            trace!("collab: {} listener stopped", id);
        });

        *self.status.write().unwrap() = ConnectionStatus::Connected;
        info!("collab: {} connected", self.id);
        self.handlers.dispatch_status(ConnectionStatus::Connected);
    }

    /// Stop receiving. No reconnection is attempted.
    pub fn disconnect(&self) {
        let Some(shutdown) = self.shutdown.write().unwrap().take() else {
            return;
        };
        shutdown.shutdown();

        *self.status.write().unwrap() = ConnectionStatus::Disconnected;
        info!("collab: {} disconnected", self.id);
        self.handlers.dispatch_status(ConnectionStatus::Disconnected);
    }

    /// Feed a raw frame to this client's handlers as if it had arrived from
    /// the hub.
    pub fn receive(
        &self,
        frame: &str,
    ) {
        self.handlers.dispatch_frame(frame);
    }

    /// Broadcast a node batch. Returns false when the batch was not sent.
    pub fn emit_node_update(
        &self,
        payload: NodeUpdatePayload,
    ) -> bool {
        self.emit(CollabEvent::NodeUpdated(Envelope::new(self.id.clone(), payload)))
    }

    /// Broadcast an edge batch. Returns false when the batch was not sent.
    pub fn emit_edge_update(
        &self,
        payload: EdgeUpdatePayload,
    ) -> bool {
        self.emit(CollabEvent::EdgeUpdated(Envelope::new(self.id.clone(), payload)))
    }

    fn emit(
        &self,
        event: CollabEvent,
    ) -> bool {
        if !self.is_connected() {
            debug!("collab: {} not connected, drop outbound {}", self.id, event.name());
            return false;
        }
        let frame = match event.encode() {
            Ok(frame) => frame,
            Err(e) => {
                warn!("collab: failed to encode {}: {}", event.name(), e);
                return false;
            }
        };
        match self.hub.publish(frame) {
            Ok(n) => {
                debug!("collab: {} emitted {} to {} clients", self.id, event.name(), n);
                true
            }
            Err(e) => {
                debug!("collab: {} failed to emit {}: {}", self.id, event.name(), e);
                false
            }
        }
    }

    pub fn on_status(
        &self,
        f: impl Fn(&ConnectionStatus) + Send + Sync + 'static,
    ) {
        self.handlers.statuses.write().unwrap().push(Arc::new(f));
    }

    pub fn on_node_updated(
        &self,
        f: impl Fn(&Envelope<NodeUpdatePayload>) + Send + Sync + 'static,
    ) {
        self.handlers.node_updates.write().unwrap().push(Arc::new(f));
    }

    pub fn on_edge_updated(
        &self,
        f: impl Fn(&Envelope<EdgeUpdatePayload>) + Send + Sync + 'static,
    ) {
        self.handlers.edge_updates.write().unwrap().push(Arc::new(f));
    }
}

impl Drop for CollabClient {
    fn drop(&mut self) {
        if let Ok(mut slot) = self.shutdown.write() {
            if let Some(shutdown) = slot.take() {
                shutdown.shutdown();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    };

    use super::*;
    use crate::model::{EdgeChange, NodeChange};

    fn node_payload() -> NodeUpdatePayload {
        NodeUpdatePayload {
            workspace_id: "main-workspace".to_string(),
            changes: vec![NodeChange::remove("node-1")],
        }
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

    #[tokio::test]
    async fn test_channel_status_lifecycle() {
        let hub = CollabHub::new(16, Handle::current());
        let client = hub.client();
        assert!(client.id().starts_with("client_"));
        assert_eq!(client.status(), ConnectionStatus::Disconnected);

        let seen = Arc::new(RwLock::new(Vec::new()));
        let s = seen.clone();
        client.on_status(move |status| s.write().unwrap().push(*status));

        client.connect();
        client.connect();
        assert!(client.is_connected());
        assert_eq!(hub.connected_clients(), 1);

        client.disconnect();
        client.disconnect();
        assert_eq!(client.status(), ConnectionStatus::Disconnected);
        assert_eq!(*seen.read().unwrap(), vec![ConnectionStatus::Connected, ConnectionStatus::Disconnected]);
    }

    #[tokio::test]
    async fn test_channel_fan_out_includes_sender() {
        let hub = CollabHub::new(16, Handle::current());
        let a = hub.client();
        let b = hub.client();

        let seen_a = Arc::new(AtomicUsize::new(0));
        let seen_b = Arc::new(AtomicUsize::new(0));
        let (sa, sb) = (seen_a.clone(), seen_b.clone());
        a.on_node_updated(move |_| {
            sa.fetch_add(1, Ordering::SeqCst);
        });
        b.on_node_updated(move |envelope| {
            assert_eq!(envelope.changes.len(), 1);
            sb.fetch_add(1, Ordering::SeqCst);
        });

        a.connect();
        b.connect();
        assert!(a.emit_node_update(node_payload()));

        assert!(eventually(|| seen_a.load(Ordering::SeqCst) == 1 && seen_b.load(Ordering::SeqCst) == 1).await);
    }

    #[tokio::test]
    async fn test_channel_emit_while_disconnected() {
        let hub = CollabHub::new(16, Handle::current());
        let client = hub.client();
        assert!(!client.emit_node_update(node_payload()));
        assert!(!client.emit_edge_update(EdgeUpdatePayload {
            workspace_id: "w".to_string(),
            changes: vec![EdgeChange::remove("e")],
        }));
    }

    #[tokio::test]
    async fn test_channel_malformed_frames_dropped() {
        let hub = CollabHub::new(16, Handle::current());
        let client = hub.client();
        let seen = Arc::new(AtomicUsize::new(0));
        let s = seen.clone();
        client.on_node_updated(move |_| {
            s.fetch_add(1, Ordering::SeqCst);
        });

        client.receive("{");
        client.receive(r#"{"event":"node-updated","data":{"emitterClientId":"x"}}"#);
        client.receive(r#"{"event":"status","data":"connected"}"#);
        assert_eq!(seen.load(Ordering::SeqCst), 0);
        assert_eq!(client.status(), ConnectionStatus::Disconnected);

        let frame = CollabEvent::NodeUpdated(Envelope::new("peer", node_payload())).encode().unwrap();
        client.receive(&frame);
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }
}
