use std::{future::Future, sync::Arc, time::Duration};

use tokio::sync::watch;
use tracing::{info, trace, warn};

use crate::{
    CanvasError, Editor, Result,
    common::MemCache,
    model::GraphSnapshot,
    session::SessionStatus,
    store::{
        AuthProvider, BlobStore, Catalog, ContentHash, Identity, NewTemplate, NewWorkspace, Permission, Registry, ShareRequest, Template, TemplateCatalog,
        WorkspaceRecord,
    },
    utils,
};

/// Number of downloaded workspace documents kept in memory.
const DOWNLOAD_CACHE_SIZE: usize = 64;
const TEMPLATE_CATEGORY: &str = "Custom";

/// Collaborators the session talks to.
pub(crate) struct Collaborators {
    pub auth: Arc<dyn AuthProvider>,
    pub blobs: Arc<dyn BlobStore>,
    pub registry: Arc<dyn Registry>,
    pub catalog: Arc<dyn Catalog>,
    pub templates: Arc<dyn TemplateCatalog>,
}

/// Saves, loads and creates workspaces for one editor.
///
/// Every operation sequences calls to the external collaborators and reports
/// progress through an observable [`SessionStatus`]. A failed operation sets
/// an `error` status and leaves the live graph untouched; the graph is only
/// replaced once every collaborator call has succeeded.
pub struct WorkspaceSession {
    editor: Editor,
    collaborators: Collaborators,
    downloads: MemCache<ContentHash, String>,
    status: watch::Sender<SessionStatus>,
    timeout: Duration,
    default_workspace_id: String,
}

impl WorkspaceSession {
    pub(crate) fn new(
        editor: Editor,
        collaborators: Collaborators,
        timeout: Duration,
        default_workspace_id: String,
    ) -> Self {
        let (status, _) = watch::channel(SessionStatus::default());
        Self {
            editor,
            collaborators,
            downloads: MemCache::new(DOWNLOAD_CACHE_SIZE),
            status,
            timeout,
            default_workspace_id,
        }
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn status(&self) -> SessionStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status.subscribe()
    }

    /// Persist the live graph: upload the snapshot, register it and record
    /// its metadata in the catalog. The saved workspace becomes current.
    pub async fn save(&self) -> Result<WorkspaceRecord> {
        trace!("session::save()");
        let identity = self.require_identity("You must be logged in to save.")?;
        self.set_status(SessionStatus::loading("Saving workspace..."));
        match self.save_snapshot(&identity).await {
            Ok(record) => {
                info!("session: saved workspace {} ({})", record.registry_id, record.content_hash);
                self.editor.set_workspace_id(record.registry_id.clone());
                self.set_status(SessionStatus::success("Workspace saved successfully!"));
                Ok(record)
            }
            Err(e) => Err(self.fail("save", e)),
        }
    }

    async fn save_snapshot(
        &self,
        identity: &Identity,
    ) -> Result<WorkspaceRecord> {
        let content = self.editor.snapshot().to_json()?;
        if !self.collaborators.blobs.is_configured() {
            return Err(CanvasError::NotConfigured("Blob store is not configured. Cannot save workspace.".to_string()));
        }

        let hash = self.call("upload", self.collaborators.blobs.upload(&content)).await?;
        self.set_status(SessionStatus::loading("Data uploaded to blob store..."));
        self.downloads.set(hash.clone(), content);

        let signature = self.call("sign", identity.signer.sign_message(&format!("canvasflow:save:{}", hash))).await?;
        let registry_id = self.call("register", self.collaborators.registry.register(&identity.account, &hash)).await?;
        self.set_status(SessionStatus::loading("Registering workspace..."));

        let workspace = NewWorkspace {
            name: format!("My Workspace {}", utils::time::time_of_day()),
            description: "A saved workspace.".to_string(),
            registry_id,
            content_hash: hash,
            owner_address: identity.account.clone(),
            signature: Some(signature),
        };
        self.call("create workspace", self.collaborators.catalog.create_workspace(&identity.token, workspace)).await
    }

    /// Store the live graph as a reusable template.
    pub async fn save_as_template(
        &self,
        name: &str,
        description: &str,
    ) -> Result<Template> {
        trace!("session::save_as_template({})", name);
        let identity = self.require_identity("You must be logged in to save a template.")?;
        if name.trim().is_empty() {
            return Err(self.fail("save template", CanvasError::Validation("Template name is required.".to_string())));
        }
        self.set_status(SessionStatus::loading("Saving as template..."));

        let template = NewTemplate {
            name: name.trim().to_string(),
            description: description.to_string(),
            category: TEMPLATE_CATEGORY.to_string(),
            structure: self.editor.snapshot(),
        };
        match self.call("create template", self.collaborators.templates.create_template(&identity.token, template)).await {
            Ok(template) => {
                info!("session: saved template {}", template.id);
                self.set_status(SessionStatus::success("Template saved successfully!"));
                Ok(template)
            }
            Err(e) => Err(self.fail("save template", e)),
        }
    }

    /// Replace the live graph with the workspace registered under
    /// `reference`. History is cleared and the node-id counter reseeded.
    pub async fn load(
        &self,
        reference: &str,
    ) -> Result<GraphSnapshot> {
        trace!("session::load({})", reference);
        self.require_identity("You must be logged in to load.")?;
        self.set_status(SessionStatus::loading("Loading workspace..."));
        match self.fetch_snapshot(reference).await {
            Ok(snapshot) => {
                info!("session: loaded workspace {} (nodes: {}, edges: {})", reference, snapshot.nodes.len(), snapshot.edges.len());
                self.editor.load(snapshot.clone());
                self.editor.set_workspace_id(reference);
                self.set_status(SessionStatus::success("Workspace loaded."));
                Ok(snapshot)
            }
            Err(e) => Err(self.fail("load", e)),
        }
    }

    async fn fetch_snapshot(
        &self,
        reference: &str,
    ) -> Result<GraphSnapshot> {
        let hash = self.call("resolve", self.collaborators.registry.resolve(reference)).await?;
        let content = match self.downloads.get(&hash) {
            Some(content) => content,
            None => {
                self.set_status(SessionStatus::loading("Fetching data from blob store..."));
                let content = self.call("download", self.collaborators.blobs.download(&hash)).await?;
                self.downloads.set(hash.clone(), content.clone());
                content
            }
        };
        GraphSnapshot::from_json(&content).inspect_err(|_| self.downloads.remove(&hash))
    }

    /// Start a new unsaved workspace from a template's structure.
    pub async fn load_template(
        &self,
        template_id: &str,
    ) -> Result<Template> {
        trace!("session::load_template({})", template_id);
        let identity = self.require_identity("You must be logged in to load.")?;
        self.set_status(SessionStatus::loading("Loading template..."));
        match self.call("get template", self.collaborators.templates.get_template(&identity.token, template_id)).await {
            Ok(template) => {
                info!("session: loaded template {}", template.id);
                self.editor.load(template.structure.clone());
                self.editor.set_workspace_id(self.default_workspace_id.clone());
                self.set_status(SessionStatus::success("Template loaded."));
                Ok(template)
            }
            Err(e) => Err(self.fail("load template", e)),
        }
    }

    /// Empty the canvas and start an unsaved workspace.
    pub fn create_new(&self) {
        trace!("session::create_new()");
        self.editor.clear();
        self.editor.set_workspace_id(self.default_workspace_id.clone());
        self.set_status(SessionStatus::default());
    }

    pub async fn list_workspaces(&self) -> Result<Vec<WorkspaceRecord>> {
        let identity = self.require_identity("You must be logged in to list workspaces.")?;
        self.call("list workspaces", self.collaborators.catalog.list_workspaces(&identity.token)).await
    }

    pub async fn list_templates(&self) -> Result<Vec<Template>> {
        let identity = self.require_identity("You must be logged in to list templates.")?;
        self.call("list templates", self.collaborators.templates.list_templates(&identity.token)).await
    }

    pub async fn share_workspace(
        &self,
        workspace_id: &str,
        address: &str,
        permission: Permission,
    ) -> Result<()> {
        trace!("session::share_workspace({}, {})", workspace_id, address);
        let identity = self.require_identity("You must be logged in to share.")?;
        let share = ShareRequest {
            address: address.to_string(),
            permission,
        };
        match self.call("share", self.collaborators.catalog.share_workspace(&identity.token, workspace_id, share)).await {
            Ok(()) => {
                self.set_status(SessionStatus::success("Workspace shared."));
                Ok(())
            }
            Err(e) => Err(self.fail("share", e)),
        }
    }

    fn require_identity(
        &self,
        message: &str,
    ) -> Result<Identity> {
        match self.collaborators.auth.identity() {
            Some(identity) if !identity.account.is_empty() && !identity.token.is_empty() => Ok(identity),
            _ => {
                let err = CanvasError::Auth(message.to_string());
                self.set_status(SessionStatus::error(message));
                Err(err)
            }
        }
    }

    async fn call<T>(
        &self,
        what: &str,
        fut: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(res) => res,
            Err(_) => Err(CanvasError::Timeout(format!("{} timed out after {}ms", what, self.timeout.as_millis()))),
        }
    }

    fn fail(
        &self,
        op: &str,
        err: CanvasError,
    ) -> CanvasError {
        warn!("session: {} failed: {}", op, err);
        self.set_status(SessionStatus::error(err.to_string()));
        err
    }

    fn set_status(
        &self,
        status: SessionStatus,
    ) {
        self.status.send_replace(status);
    }
}
