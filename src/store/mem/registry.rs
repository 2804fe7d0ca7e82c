use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use async_trait::async_trait;
use tracing::{debug, trace};

use crate::{
    CanvasError, Result,
    store::{Collect, ContentHash, Registration, Registry, StoreIden},
    utils,
};

/// Registry that mints `ws-<n>` ids in memory.
#[derive(Debug, Clone)]
pub struct MemRegistry {
    counter: Arc<AtomicU64>,
    entries: Collect<Registration>,
}

impl Default for MemRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MemRegistry {
    pub fn new() -> Self {
        Self {
            counter: Arc::new(AtomicU64::new(0)),
            entries: Collect::new(StoreIden::Registry),
        }
    }

    pub fn registrations(&self) -> Vec<Registration> {
        self.entries.list()
    }
}

#[async_trait]
impl Registry for MemRegistry {
    async fn register(
        &self,
        owner: &str,
        hash: &str,
    ) -> Result<String> {
        trace!("registry::register({}, {})", owner, hash);
        let id = format!("ws-{}", self.counter.fetch_add(1, Ordering::SeqCst) + 1);
        let entry = Registration {
            id: id.clone(),
            owner: owner.to_string(),
            content_hash: hash.to_string(),
            registered_at: utils::time::time_millis(),
        };
        if !self.entries.create(&entry) {
            return Err(CanvasError::Registry(format!("workspace id already registered: {}", id)));
        }
        debug!("registry: registered {} for {}", id, owner);
        Ok(id)
    }

    async fn resolve(
        &self,
        workspace_id: &str,
    ) -> Result<ContentHash> {
        trace!("registry::resolve({})", workspace_id);
        self.entries
            .find(workspace_id)
            .map(|entry| entry.content_hash)
            .map_err(|_| CanvasError::NotFound(format!("Workspace not found in registry: {}", workspace_id)))
    }
}
