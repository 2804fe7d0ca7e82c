use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

use crate::model::GraphSnapshot;

/// Hex encoded content hash of a stored blob.
pub type ContentHash = String;

/// Records that can be kept in a [`Collect`](super::Collect).
pub trait Record: Clone + Send + Sync {
    fn id(&self) -> &str;
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Permission {
    #[default]
    View,
    Edit,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ShareRequest {
    pub address: String,
    pub permission: Permission,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct WorkspaceRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    pub registry_id: String,
    pub content_hash: ContentHash,
    pub owner_address: String,
    /// owner's signature over the content hash
    #[serde(default)]
    pub signature: Option<String>,
    #[serde(default)]
    pub shared_with: Vec<ShareRequest>,
    pub created_at: String,
    pub updated_at: String,
}

impl Record for WorkspaceRecord {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct NewWorkspace {
    pub name: String,
    pub description: String,
    pub registry_id: String,
    pub content_hash: ContentHash,
    pub owner_address: String,
    #[serde(default)]
    pub signature: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Template {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub downloads: u64,
    pub rating: f64,
    pub is_featured: bool,
    pub node_count: usize,
    pub edge_count: usize,
    pub structure: GraphSnapshot,
    pub created_at: String,
}

impl Record for Template {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct NewTemplate {
    pub name: String,
    pub description: String,
    pub category: String,
    pub structure: GraphSnapshot,
}

/// Registry entry.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Registration {
    pub id: String,
    pub owner: String,
    pub content_hash: ContentHash,
    pub registered_at: i64,
}

impl Record for Registration {
    fn id(&self) -> &str {
        &self.id
    }
}
