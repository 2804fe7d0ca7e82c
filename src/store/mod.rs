//! Persistence collaborators for the workspace session.
//!
//! Each collaborator is a trait so the session can run against real
//! services or against the in-memory implementations in [`MemStore`]:
//! - `BlobStore`: content-addressed storage of serialized snapshots
//! - `Registry`: durable mapping from workspace id to current content hash
//! - `Catalog`: workspace metadata, listing and sharing
//! - `TemplateCatalog`: reusable workspace structures
//! - `AuthProvider`: the signed-in identity with its bearer token and signer

pub mod data;
mod mem;

use std::sync::Arc;

use async_trait::async_trait;
use strum::{AsRefStr, EnumIter};

use crate::Result;

pub use data::*;
pub use mem::{Collect, LocalSigner, MemBlobStore, MemCatalog, MemRegistry, MemStore, MemTemplates, StaticAuth};

/// Identifiers for the in-memory collections.
#[derive(Debug, Clone, Copy, AsRefStr, PartialEq, Hash, Eq, EnumIter)]
pub enum StoreIden {
    #[strum(serialize = "workspaces")]
    Workspaces,
    #[strum(serialize = "templates")]
    Templates,
    #[strum(serialize = "registry")]
    Registry,
}

/// Content-addressed storage for serialized workspace snapshots.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Whether the store can be used at all. Upload and download fail with
    /// `NotConfigured` otherwise.
    fn is_configured(&self) -> bool;

    /// Store `content` and return its content hash. Uploading the same bytes
    /// twice returns the same hash.
    async fn upload(
        &self,
        content: &str,
    ) -> Result<ContentHash>;

    /// Fetch the content stored under `hash`.
    async fn download(
        &self,
        hash: &str,
    ) -> Result<String>;
}

/// Durable mapping from an opaque workspace id to its current content hash.
#[async_trait]
pub trait Registry: Send + Sync {
    async fn register(
        &self,
        owner: &str,
        hash: &str,
    ) -> Result<String>;

    async fn resolve(
        &self,
        workspace_id: &str,
    ) -> Result<ContentHash>;
}

/// Workspace metadata. Every call requires a bearer token.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn list_workspaces(
        &self,
        token: &str,
    ) -> Result<Vec<WorkspaceRecord>>;

    async fn create_workspace(
        &self,
        token: &str,
        workspace: NewWorkspace,
    ) -> Result<WorkspaceRecord>;

    async fn share_workspace(
        &self,
        token: &str,
        workspace_id: &str,
        share: ShareRequest,
    ) -> Result<()>;
}

/// Reusable workspace structures. Every call requires a bearer token.
#[async_trait]
pub trait TemplateCatalog: Send + Sync {
    async fn list_templates(
        &self,
        token: &str,
    ) -> Result<Vec<Template>>;

    /// Fetch a template for use. Counts as a download.
    async fn get_template(
        &self,
        token: &str,
        template_id: &str,
    ) -> Result<Template>;

    async fn create_template(
        &self,
        token: &str,
        template: NewTemplate,
    ) -> Result<Template>;
}

/// Produces a signature over a message on behalf of the signed-in account.
#[async_trait]
pub trait Signer: Send + Sync {
    async fn sign_message(
        &self,
        message: &str,
    ) -> Result<String>;
}

/// Source of the current identity. `None` means nobody is signed in.
pub trait AuthProvider: Send + Sync {
    fn identity(&self) -> Option<Identity>;
}

/// A signed-in account.
#[derive(Clone)]
pub struct Identity {
    pub account: String,
    pub token: String,
    pub signer: Arc<dyn Signer>,
}

impl std::fmt::Debug for Identity {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("Identity").field("account", &self.account).finish_non_exhaustive()
    }
}
