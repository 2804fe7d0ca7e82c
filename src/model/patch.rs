use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{CanvasError, Result};

/// Partial update for an item's `data`, applied as a shallow merge.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct DataPatch(pub Map<String, Value>);

impl DataPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(CanvasError::Validation(format!("patch must be an object, got {}", other))),
        }
    }

    pub fn set(
        mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Overwrite top-level keys of `target` with the patch entries.
    /// A non-object target is replaced by an object.
    pub fn merge_into(
        &self,
        target: &mut Value,
    ) {
        if !target.is_object() {
            *target = Value::Object(Map::new());
        }
        if let Value::Object(map) = target {
            for (k, v) in self.0.iter() {
                map.insert(k.clone(), v.clone());
            }
        }
    }
}
