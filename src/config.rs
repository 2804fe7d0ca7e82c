use std::{fs, path::Path, time::Duration};

use serde::Deserialize;

use crate::Result;

/// Workspace id used when no workspace has been loaded or saved yet.
pub const DEFAULT_WORKSPACE_ID: &str = "main-workspace";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// workspace session config
    pub session: SessionConfig,
    /// undo/redo history config
    pub history: HistoryConfig,
    /// collaboration channel config
    pub collab: CollabConfig,
    /// store config
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// timeout for every collaborator call in milliseconds, defaults to 30000
    pub request_timeout_ms: u64,
    /// workspace id used before anything is loaded
    pub default_workspace_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// maximum number of undo steps kept, unbounded when unset
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CollabConfig {
    /// whether local edits are broadcast at all
    pub enabled: bool,
    /// capacity of the broadcast queue
    pub queue_size: usize,
    /// glob pattern matched against the workspace id of inbound batches
    /// eg. main-*
    pub workspace: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// store type
    pub store_type: StoreType,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StoreType {
    #[default]
    Mem,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 30_000,
            default_workspace_id: DEFAULT_WORKSPACE_ID.to_string(),
        }
    }
}

impl SessionConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for CollabConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            queue_size: 1024,
            workspace: "*".to_string(),
        }
    }
}

impl Config {
    pub fn create<T: AsRef<Path>>(path: T) -> Result<Self> {
        let data = fs::read_to_string(path.as_ref())?;

        Self::load_from_str(data.as_str())
    }

    pub fn load_from_str(toml_str: &str) -> Result<Self> {
        let config = toml::from_str::<Config>(toml_str)?;
        Ok(config)
    }
}
