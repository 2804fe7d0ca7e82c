use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tracing::trace;

use crate::{
    CanvasError, Result, ShareLock,
    store::{BlobStore, ContentHash},
};

/// Content-addressed blob store kept in memory.
#[derive(Debug, Clone)]
pub struct MemBlobStore {
    configured: bool,
    blobs: ShareLock<HashMap<ContentHash, String>>,
}

impl Default for MemBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemBlobStore {
    pub fn new() -> Self {
        Self {
            configured: true,
            blobs: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// A store that rejects every call, like a gateway with no credentials.
    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::new()
        }
    }

    pub fn hash(content: &str) -> ContentHash {
        hex::encode(Sha256::digest(content.as_bytes()))
    }

    pub fn len(&self) -> usize {
        self.blobs.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn ensure_configured(&self) -> Result<()> {
        if !self.configured {
            return Err(CanvasError::NotConfigured("Blob store is not configured. Cannot save workspace.".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl BlobStore for MemBlobStore {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn upload(
        &self,
        content: &str,
    ) -> Result<ContentHash> {
        self.ensure_configured()?;
        let hash = Self::hash(content);
        trace!("blob::upload({})", hash);
        self.blobs.write().unwrap().insert(hash.clone(), content.to_string());
        Ok(hash)
    }

    async fn download(
        &self,
        hash: &str,
    ) -> Result<String> {
        self.ensure_configured()?;
        trace!("blob::download({})", hash);
        self.blobs.read().unwrap().get(hash).cloned().ok_or_else(|| CanvasError::NotFound(format!("blob not found: {}", hash)))
    }
}
