//! Error types for Canvasflow.
//!
//! All fallible operations in Canvasflow return `CanvasError`. The graph,
//! change pipeline and history are total and never produce one; errors come
//! from configuration, persistence collaborators and the collaboration transport.

use std::{io::ErrorKind, string::FromUtf8Error};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for all Canvasflow operations.
#[derive(Deserialize, Serialize, Error, Debug, Clone, PartialEq)]
pub enum CanvasError {
    /// Configuration parsing or validation errors.
    #[error("{0}")]
    Config(String),

    /// Data conversion errors (JSON, TOML, etc.).
    #[error("{0}")]
    Convert(String),

    /// A required field is missing or malformed.
    #[error("{0}")]
    Validation(String),

    /// Missing or invalid credential.
    #[error("{0}")]
    Auth(String),

    /// A collaborator is not configured for use.
    #[error("{0}")]
    NotConfigured(String),

    /// A referenced record, blob or workspace does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Blob store failures.
    #[error("{0}")]
    Store(String),

    /// Workspace registry failures.
    #[error("{0}")]
    Registry(String),

    /// Workspace or template catalog failures.
    #[error("{0}")]
    Catalog(String),

    /// Collaboration channel errors.
    #[error("{0}")]
    Channel(String),

    /// Message queue errors.
    #[error("{0}")]
    Queue(String),

    /// A collaborator call did not finish in time.
    #[error("{0}")]
    Timeout(String),

    /// I/O operation errors.
    #[error("{0}")]
    IoError(String),
}

impl From<CanvasError> for String {
    fn from(val: CanvasError) -> Self {
        val.to_string()
    }
}

impl From<std::io::Error> for CanvasError {
    fn from(error: std::io::Error) -> Self {
        CanvasError::IoError(error.to_string())
    }
}

impl From<CanvasError> for std::io::Error {
    fn from(val: CanvasError) -> Self {
        #[allow(clippy::io_other_error)]
        std::io::Error::new(ErrorKind::Other, val.to_string())
    }
}

impl From<FromUtf8Error> for CanvasError {
    fn from(_: FromUtf8Error) -> Self {
        CanvasError::Convert("Error with utf-8 string convert".to_string())
    }
}

impl From<serde_json::Error> for CanvasError {
    fn from(error: serde_json::Error) -> Self {
        CanvasError::Convert(error.to_string())
    }
}

impl From<toml::de::Error> for CanvasError {
    fn from(error: toml::de::Error) -> Self {
        CanvasError::Config(error.to_string())
    }
}
