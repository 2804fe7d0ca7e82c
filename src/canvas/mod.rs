//! In-memory canvas state: change application, undo/redo history and node
//! id minting.
//!
//! All operations in this module are synchronous and total. They never fail
//! and never talk to the network.

pub mod apply;
mod history;
mod ids;
pub mod palette;
mod state;

pub use apply::{apply_edge_changes, apply_node_changes};
pub use history::History;
pub use ids::NodeIdCounter;
pub use palette::Viewport;
pub use state::{Canvas, Connection};
