use async_trait::async_trait;
use tracing::{debug, trace};

use crate::{
    CanvasError, Result,
    store::{Catalog, Collect, NewWorkspace, ShareRequest, StoreIden, WorkspaceRecord},
    utils,
};

pub(super) fn authenticate(token: &str) -> Result<()> {
    if token.is_empty() {
        return Err(CanvasError::Auth("Authentication required.".to_string()));
    }
    Ok(())
}

/// Workspace metadata kept in memory.
#[derive(Debug, Clone)]
pub struct MemCatalog {
    workspaces: Collect<WorkspaceRecord>,
}

impl Default for MemCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl MemCatalog {
    pub fn new() -> Self {
        Self {
            workspaces: Collect::new(StoreIden::Workspaces),
        }
    }
}

#[async_trait]
impl Catalog for MemCatalog {
    async fn list_workspaces(
        &self,
        token: &str,
    ) -> Result<Vec<WorkspaceRecord>> {
        trace!("catalog::list_workspaces()");
        authenticate(token)?;
        Ok(self.workspaces.list())
    }

    async fn create_workspace(
        &self,
        token: &str,
        workspace: NewWorkspace,
    ) -> Result<WorkspaceRecord> {
        trace!("catalog::create_workspace({})", workspace.registry_id);
        authenticate(token)?;
        let now = utils::time::time_rfc3339();
        let record = WorkspaceRecord {
            id: format!("rec-{}", utils::longid()),
            name: workspace.name,
            description: workspace.description,
            registry_id: workspace.registry_id,
            content_hash: workspace.content_hash,
            owner_address: workspace.owner_address,
            signature: workspace.signature,
            shared_with: Vec::new(),
            created_at: now.clone(),
            updated_at: now,
        };
        if !self.workspaces.create(&record) {
            return Err(CanvasError::Catalog(format!("workspace record already exists: {}", record.id)));
        }
        Ok(record)
    }

    async fn share_workspace(
        &self,
        token: &str,
        workspace_id: &str,
        share: ShareRequest,
    ) -> Result<()> {
        trace!("catalog::share_workspace({}, {})", workspace_id, share.address);
        authenticate(token)?;
        let address = share.address.clone();
        let permission = share.permission;
        self.workspaces.update(workspace_id, move |w| {
            w.shared_with.retain(|s| s.address != share.address);
            w.shared_with.push(share);
            w.updated_at = utils::time::time_rfc3339();
        })?;
        debug!("catalog: shared {} with {} ({})", workspace_id, address, permission.as_ref());
        Ok(())
    }
}
