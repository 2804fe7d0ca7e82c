//! # Canvasflow
//!
//! Canvasflow is the state core of a collaborative node-based canvas. It owns
//! the workspace graph, applies change batches to it, keeps an undo/redo
//! history and exchanges edits with peers over a best-effort broadcast
//! channel.
//!
//! ## Core Features
//!
//! - **Typed graph model**: nodes carry a strongly typed payload per node type
//! - **Change pipeline**: `add`/`remove`/`update`/`reset`/`position` batches, with drag gestures coalesced into one undo step
//! - **Snapshot history**: undo/redo over whole-graph snapshots
//! - **Collaboration**: every outbound batch is stamped with its emitter, and a client's own echo is dropped
//! - **Workspace session**: save, load and templates over pluggable collaborators
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use canvasflow::{SessionBuilder, Viewport, XYPosition};
//!
//! let session = SessionBuilder::new().build()?;
//! let editor = session.editor();
//! editor.drop_node("noteNode", XYPosition::new(120.0, 80.0), &Viewport::default());
//! editor.undo();
//! ```

pub mod canvas;
pub mod collab;
mod common;
mod config;
mod editor;
mod error;
pub mod events;
mod model;
pub mod session;
pub mod shortcuts;
pub mod store;
mod utils;

use std::sync::{Arc, RwLock};

pub use canvas::{Canvas, Connection, Viewport};
pub use collab::{CollabClient, CollabHub, ReconcileOptions, Reconciler};
pub use config::{CollabConfig, Config, DEFAULT_WORKSPACE_ID, HistoryConfig, SessionConfig, StoreConfig, StoreType};
pub use editor::Editor;
pub use error::CanvasError;
pub use events::{ConnectionStatus, Envelope};
pub use model::*;
pub use session::{SessionBuilder, SessionStatus, StatusKind, WorkspaceSession};
pub use shortcuts::{Focus, KeyChord, Shortcut};

/// Result type alias for Canvasflow operations.
pub type Result<T> = std::result::Result<T, CanvasError>;

/// Thread-safe shared lock wrapper using Arc<RwLock<T>>.
pub(crate) type ShareLock<T> = Arc<RwLock<T>>;
