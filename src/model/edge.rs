//! Edges ("threads") connecting two nodes.
//!
//! Endpoints are plain node ids. An edge whose source or target does not exist
//! is still a valid edge; it simply renders without that endpoint.

use serde::{Deserialize, Serialize};

use crate::{
    Result,
    model::{DataPatch, NodeId},
};

/// Unique identifier for an edge within a workspace.
pub type EdgeId = String;

/// Rendering type used for edges created by a connect gesture.
pub const CUSTOM_EDGE_TYPE: &str = "custom";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, strum::AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Importance {
    #[default]
    Normal,
    High,
    Critical,
    Low,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, strum::AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LineType {
    #[default]
    Solid,
    Dotted,
    Dashed,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ThreadKind {
    DataFlow,
    Reference,
    Dependency,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ThreadLogic {
    /// conditional expression
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    /// transformation function
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform: Option<String>,
}

/// Presentation metadata carried by an edge.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ThreadData {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ThreadKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logic: Option<ThreadLogic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub importance: Option<Importance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animated: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_type: Option<LineType>,
}

impl ThreadData {
    pub fn importance(&self) -> Importance {
        self.importance.unwrap_or_default()
    }

    pub fn line_type(&self) -> LineType {
        self.line_type.unwrap_or_default()
    }
}

fn default_edge_type() -> String {
    CUSTOM_EDGE_TYPE.to_string()
}

/// Directed connection between two node ids.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    /// Unique edge identifier.
    pub id: EdgeId,
    /// ID of the source node.
    pub source: NodeId,
    /// ID of the target node.
    pub target: NodeId,
    /// Which output handle of the source this edge leaves from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    /// Which input handle of the target this edge arrives at.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
    /// Rendering type discriminator.
    #[serde(rename = "type", default = "default_edge_type")]
    pub edge_type: String,
    #[serde(default)]
    pub data: ThreadData,
}

impl Edge {
    pub fn new(
        id: impl Into<EdgeId>,
        source: impl Into<NodeId>,
        target: impl Into<NodeId>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            source_handle: None,
            target_handle: None,
            edge_type: default_edge_type(),
            data: ThreadData::default(),
        }
    }

    pub fn with_data(
        mut self,
        data: ThreadData,
    ) -> Self {
        self.data = data;
        self
    }

    /// Shallow-merge `patch` into the edge's data.
    pub fn patched(
        &self,
        patch: &DataPatch,
    ) -> Result<Edge> {
        let mut value = serde_json::to_value(&self.data)?;
        patch.merge_into(&mut value);
        let data: ThreadData = serde_json::from_value(value)?;

        Ok(Edge {
            data,
            ..self.clone()
        })
    }
}
