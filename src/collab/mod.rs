//! Real-time collaboration: the broadcast channel and the reconciler that
//! merges peers' edits into the local canvas.

mod channel;
mod reconciler;

pub use channel::{CollabClient, CollabHub, EdgeUpdateHandle, NodeUpdateHandle, StatusHandle};
pub use reconciler::{ReconcileOptions, Reconciler};
