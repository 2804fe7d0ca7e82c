mod auth;
mod blob;
mod catalog;
mod collect;
mod registry;
mod templates;

use std::sync::Arc;

use crate::store::{BlobStore, Catalog, Registry, TemplateCatalog};

pub use auth::{LocalSigner, StaticAuth};
pub use blob::MemBlobStore;
pub use catalog::MemCatalog;
pub use collect::Collect;
pub use registry::MemRegistry;
pub use templates::MemTemplates;

/// All persistence collaborators backed by memory.
#[derive(Debug, Clone)]
pub struct MemStore {
    blobs: Arc<MemBlobStore>,
    registry: Arc<MemRegistry>,
    catalog: Arc<MemCatalog>,
    templates: Arc<MemTemplates>,
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemStore {
    pub fn new() -> Self {
        Self {
            blobs: Arc::new(MemBlobStore::new()),
            registry: Arc::new(MemRegistry::new()),
            catalog: Arc::new(MemCatalog::new()),
            templates: Arc::new(MemTemplates::new()),
        }
    }

    pub fn with_blobs(
        mut self,
        blobs: MemBlobStore,
    ) -> Self {
        self.blobs = Arc::new(blobs);
        self
    }

    pub fn blobs(&self) -> Arc<dyn BlobStore> {
        self.blobs.clone()
    }

    pub fn registry(&self) -> Arc<dyn Registry> {
        self.registry.clone()
    }

    pub fn catalog(&self) -> Arc<dyn Catalog> {
        self.catalog.clone()
    }

    pub fn templates(&self) -> Arc<dyn TemplateCatalog> {
        self.templates.clone()
    }
}
