//! Collaboration channel events.
//!
//! Change batches travel between peers wrapped in an [`Envelope`] that names
//! the client which emitted them. On the wire an event is JSON of the form
//! `{"event": "node-updated", "data": {"emitterClientId": ..., "payload": {...}}}`.

use serde::{Deserialize, Serialize};

use crate::{
    CanvasError, Result,
    model::{EdgeChange, NodeChange},
};

/// Opaque identity of one collaboration client.
pub type ClientId = String;

/// Connection state surfaced to the UI.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, strum::AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ConnectionStatus {
    Connected,
    #[default]
    Disconnected,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NodeUpdatePayload {
    pub workspace_id: String,
    pub changes: Vec<NodeChange>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EdgeUpdatePayload {
    pub workspace_id: String,
    pub changes: Vec<EdgeChange>,
}

/// A payload tagged with the client that emitted it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub emitter_client_id: ClientId,
    pub payload: T,
}

impl<T> std::ops::Deref for Envelope<T> {
    type Target = T;
    fn deref(&self) -> &Self::Target {
        &self.payload
    }
}

impl<T> Envelope<T> {
    pub fn new(
        emitter_client_id: impl Into<ClientId>,
        payload: T,
    ) -> Self {
        Self {
            emitter_client_id: emitter_client_id.into(),
            payload,
        }
    }

    /// Whether this envelope was emitted by `client_id`.
    pub fn is_from(
        &self,
        client_id: &str,
    ) -> bool {
        self.emitter_client_id == client_id
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum CollabEvent {
    Status(ConnectionStatus),
    NodeUpdated(Envelope<NodeUpdatePayload>),
    EdgeUpdated(Envelope<EdgeUpdatePayload>),
}

impl CollabEvent {
    pub fn name(&self) -> &'static str {
        match self {
            CollabEvent::Status(_) => "status",
            CollabEvent::NodeUpdated(_) => "node-updated",
            CollabEvent::EdgeUpdated(_) => "edge-updated",
        }
    }

    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(frame: &str) -> Result<Self> {
        serde_json::from_str(frame).map_err(|e| CanvasError::Channel(format!("malformed frame: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::XYPosition;

    #[test]
    fn test_event_wire_format() {
        let event = CollabEvent::NodeUpdated(Envelope::new("client_abc", NodeUpdatePayload {
            workspace_id: "main-workspace".to_string(),
            changes: vec![NodeChange::position("node-1", XYPosition::new(1.0, 2.0), true)],
        }));
        let value: serde_json::Value = serde_json::from_str(&event.encode().unwrap()).unwrap();

        assert_eq!(
            value,
            json!({
                "event": "node-updated",
                "data": {
                    "emitterClientId": "client_abc",
                    "payload": {
                        "workspaceId": "main-workspace",
                        "changes": [{ "type": "position", "id": "node-1", "position": { "x": 1.0, "y": 2.0 }, "dragging": true }]
                    }
                }
            })
        );
        assert_eq!(CollabEvent::decode(&value.to_string()).unwrap(), event);
    }

    #[test]
    fn test_event_status() {
        let event = CollabEvent::decode(r#"{"event":"status","data":"connected"}"#).unwrap();
        assert_eq!(event, CollabEvent::Status(ConnectionStatus::Connected));
        assert_eq!(event.name(), "status");
    }

    #[test]
    fn test_event_malformed() {
        assert!(matches!(CollabEvent::decode("not json"), Err(CanvasError::Channel(_))));
        assert!(CollabEvent::decode(r#"{"event":"node-updated","data":{"payload":{}}}"#).is_err());
    }

    #[test]
    fn test_envelope_origin() {
        let envelope = Envelope::new("me", 1);
        assert!(envelope.is_from("me"));
        assert!(!envelope.is_from("you"));
        assert_eq!(*envelope, 1);
    }
}
