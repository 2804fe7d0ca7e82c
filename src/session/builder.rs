use std::sync::Arc;

use tracing::debug;

use crate::{
    Config, Editor, Result, StoreType,
    canvas::Canvas,
    collab::{CollabHub, ReconcileOptions},
    session::{WorkspaceSession, workspace::Collaborators},
    store::{AuthProvider, BlobStore, Catalog, MemStore, Registry, StaticAuth, TemplateCatalog},
};

/// Assembles a [`WorkspaceSession`] from configuration and collaborators.
/// Collaborators that are not given explicitly come from the configured
/// store type.
#[derive(Default)]
pub struct SessionBuilder {
    config: Config,
    auth: Option<Arc<dyn AuthProvider>>,
    blobs: Option<Arc<dyn BlobStore>>,
    registry: Option<Arc<dyn Registry>>,
    catalog: Option<Arc<dyn Catalog>>,
    templates: Option<Arc<dyn TemplateCatalog>>,
    hub: Option<Arc<CollabHub>>,
}

impl SessionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(
        mut self,
        config: Config,
    ) -> Self {
        self.config = config;
        self
    }

    pub fn auth(
        mut self,
        auth: Arc<dyn AuthProvider>,
    ) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn blobs(
        mut self,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        self.blobs = Some(blobs);
        self
    }

    pub fn registry(
        mut self,
        registry: Arc<dyn Registry>,
    ) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn catalog(
        mut self,
        catalog: Arc<dyn Catalog>,
    ) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn templates(
        mut self,
        templates: Arc<dyn TemplateCatalog>,
    ) -> Self {
        self.templates = Some(templates);
        self
    }

    /// Use every collaborator of `store`, so several sessions can share one
    /// backend.
    pub fn store(
        self,
        store: &MemStore,
    ) -> Self {
        self.blobs(store.blobs()).registry(store.registry()).catalog(store.catalog()).templates(store.templates())
    }

    /// Join the collaboration channel relayed by `hub`.
    pub fn collab(
        mut self,
        hub: Arc<CollabHub>,
    ) -> Self {
        self.hub = Some(hub);
        self
    }

    pub fn build(self) -> Result<WorkspaceSession> {
        let store = match self.config.store.store_type {
            StoreType::Mem => MemStore::new(),
        };

        let canvas = Canvas::with_history_limit(self.config.history.limit);
        let editor = match self.hub {
            Some(hub) if self.config.collab.enabled => {
                let client = Arc::new(hub.client());
                let editor = Editor::with_collab(canvas, client.clone(), ReconcileOptions::with_workspace(self.config.collab.workspace.clone()))?;
                client.connect();
                editor
            }
            _ => Editor::new(canvas),
        };
        editor.set_workspace_id(self.config.session.default_workspace_id.clone());
        debug!("session: built for workspace {}", self.config.session.default_workspace_id);

        let collaborators = Collaborators {
            auth: self.auth.unwrap_or_else(|| Arc::new(StaticAuth::new())),
            blobs: self.blobs.unwrap_or_else(|| store.blobs()),
            registry: self.registry.unwrap_or_else(|| store.registry()),
            catalog: self.catalog.unwrap_or_else(|| store.catalog()),
            templates: self.templates.unwrap_or_else(|| store.templates()),
        };

        Ok(WorkspaceSession::new(editor, collaborators, self.config.session.request_timeout(), self.config.session.default_workspace_id))
    }
}
