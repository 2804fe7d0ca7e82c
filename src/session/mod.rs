//! Workspace session: save, load and template orchestration around an
//! [`Editor`](crate::Editor).

mod builder;
mod status;
mod workspace;


pub use builder::SessionBuilder;
pub use status::{SessionStatus, StatusKind};
pub use workspace::WorkspaceSession;
