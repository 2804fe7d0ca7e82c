use serde::{Deserialize, Serialize};
use strum::AsRefStr;

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StatusKind {
    Success,
    Error,
}

/// Observable state of the workspace session, mirrored by the UI.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub is_loading: bool,
    pub message: Option<String>,
    pub kind: Option<StatusKind>,
}

impl SessionStatus {
    /// An operation is in flight.
    pub fn loading(message: impl Into<String>) -> Self {
        Self {
            is_loading: true,
            message: Some(message.into()),
            kind: None,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            is_loading: false,
            message: Some(message.into()),
            kind: Some(StatusKind::Success),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            is_loading: false,
            message: Some(message.into()),
            kind: Some(StatusKind::Error),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == Some(StatusKind::Error)
    }
}
