//! Canvas nodes and their typed payloads.
//!
//! On the wire a node is `{id, type, position, data}` where `data` is a single
//! flat object. Internally `data` is split into the fields every node shares
//! ([`NodeCommon`]) and a per-type [`NodePayload`] selected by `type`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{CanvasError, Result, model::DataPatch};

/// node id
pub type NodeId = String;

/// Closed set of node kinds. The serialized form is the palette discriminator.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, strum::AsRefStr, strum::EnumString, strum::EnumIter)]
pub enum NodeType {
    #[serde(rename = "databaseNode")]
    #[strum(serialize = "databaseNode")]
    Database,
    #[serde(rename = "liveFeedNode")]
    #[strum(serialize = "liveFeedNode")]
    LiveFeed,
    #[serde(rename = "chartNode")]
    #[strum(serialize = "chartNode")]
    Chart,
    #[serde(rename = "noteNode")]
    #[strum(serialize = "noteNode")]
    Note,
    #[serde(rename = "aiAnalysisNode")]
    #[strum(serialize = "aiAnalysisNode")]
    AiAnalysis,
    #[serde(rename = "apiNode")]
    #[strum(serialize = "apiNode")]
    Api,
}

impl NodeType {
    /// Short display name, eg. `LiveFeed` for `liveFeedNode`.
    pub fn label(&self) -> &'static str {
        match self {
            NodeType::Database => "Database",
            NodeType::LiveFeed => "LiveFeed",
            NodeType::Chart => "Chart",
            NodeType::Note => "Note",
            NodeType::AiAnalysis => "AIAnalysis",
            NodeType::Api => "Api",
        }
    }
}

/// Canvas-space coordinate.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct XYPosition {
    pub x: f64,
    pub y: f64,
}

impl XYPosition {
    pub fn new(
        x: f64,
        y: f64,
    ) -> Self {
        Self {
            x,
            y,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ColorTheme {
    Pink,
    Sky,
    Green,
    Amber,
    Violet,
}

/// Result of the last query or fetch a node performed.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Visual overrides for a node box.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct NodeStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr, strum::EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum AccessControl {
    OwnerOnly,
    Shared,
    Public,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NodeSecurity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encryption: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_control: Option<AccessControl>,
}

/// Fields shared by every node type.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NodeCommon {
    #[serde(default)]
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_theme: Option<ColorTheme>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_loading: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_result: Option<QueryResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_live: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<NodeStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<NodeSecurity>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct DatabasePayload {}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct LiveFeedPayload {}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub name: String,
    pub value: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChartPayload {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chart_data: Vec<ChartPoint>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct NotePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct AiAnalysisPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insight: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ApiPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Type-specific part of a node's data.
#[derive(Debug, Clone, PartialEq)]
pub enum NodePayload {
    Database(DatabasePayload),
    LiveFeed(LiveFeedPayload),
    Chart(ChartPayload),
    Note(NotePayload),
    AiAnalysis(AiAnalysisPayload),
    Api(ApiPayload),
}

impl NodePayload {
    /// Empty payload for the given type.
    pub fn empty(node_type: NodeType) -> Self {
        match node_type {
            NodeType::Database => NodePayload::Database(DatabasePayload::default()),
            NodeType::LiveFeed => NodePayload::LiveFeed(LiveFeedPayload::default()),
            NodeType::Chart => NodePayload::Chart(ChartPayload::default()),
            NodeType::Note => NodePayload::Note(NotePayload::default()),
            NodeType::AiAnalysis => NodePayload::AiAnalysis(AiAnalysisPayload::default()),
            NodeType::Api => NodePayload::Api(ApiPayload::default()),
        }
    }

    pub fn node_type(&self) -> NodeType {
        match self {
            NodePayload::Database(_) => NodeType::Database,
            NodePayload::LiveFeed(_) => NodeType::LiveFeed,
            NodePayload::Chart(_) => NodeType::Chart,
            NodePayload::Note(_) => NodeType::Note,
            NodePayload::AiAnalysis(_) => NodeType::AiAnalysis,
            NodePayload::Api(_) => NodeType::Api,
        }
    }

    fn from_value(
        node_type: NodeType,
        value: Value,
    ) -> Result<Self> {
        let payload = match node_type {
            NodeType::Database => NodePayload::Database(serde_json::from_value(value)?),
            NodeType::LiveFeed => NodePayload::LiveFeed(serde_json::from_value(value)?),
            NodeType::Chart => NodePayload::Chart(serde_json::from_value(value)?),
            NodeType::Note => NodePayload::Note(serde_json::from_value(value)?),
            NodeType::AiAnalysis => NodePayload::AiAnalysis(serde_json::from_value(value)?),
            NodeType::Api => NodePayload::Api(serde_json::from_value(value)?),
        };
        Ok(payload)
    }

    fn to_value(&self) -> Result<Value> {
        let value = match self {
            NodePayload::Database(p) => serde_json::to_value(p)?,
            NodePayload::LiveFeed(p) => serde_json::to_value(p)?,
            NodePayload::Chart(p) => serde_json::to_value(p)?,
            NodePayload::Note(p) => serde_json::to_value(p)?,
            NodePayload::AiAnalysis(p) => serde_json::to_value(p)?,
            NodePayload::Api(p) => serde_json::to_value(p)?,
        };
        Ok(value)
    }
}

/// Complete node data: shared fields plus the typed payload.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeData {
    pub common: NodeCommon,
    pub payload: NodePayload,
}

impl NodeData {
    pub fn new(
        title: impl Into<String>,
        payload: NodePayload,
    ) -> Self {
        Self {
            common: NodeCommon {
                title: title.into(),
                ..Default::default()
            },
            payload,
        }
    }

    /// Parse a flat `data` object for a node of the given type.
    pub fn from_value(
        node_type: NodeType,
        value: Value,
    ) -> Result<Self> {
        let value = match value {
            Value::Null => Value::Object(Map::new()),
            Value::Object(_) => value,
            other => return Err(CanvasError::Validation(format!("node data must be an object, got {}", other))),
        };
        let common: NodeCommon = serde_json::from_value(value.clone())?;
        let payload = NodePayload::from_value(node_type, value)?;

        Ok(Self {
            common,
            payload,
        })
    }

    /// Flatten shared and type-specific fields into one object.
    pub fn to_value(&self) -> Result<Value> {
        let mut map = match serde_json::to_value(&self.common)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        if let Value::Object(extra) = self.payload.to_value()? {
            map.extend(extra);
        }
        Ok(Value::Object(map))
    }
}

#[derive(Serialize, Deserialize, Clone)]
struct NodeMetadata {
    id: NodeId,
    #[serde(rename = "type")]
    node_type: NodeType,
    #[serde(default)]
    position: XYPosition,
    #[serde(default)]
    data: Value,
}

/// A typed, positioned vertex of the workspace graph.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(try_from = "NodeMetadata", into = "NodeMetadata")]
pub struct Node {
    /// node id, unique within a workspace
    pub id: NodeId,
    /// canvas position
    pub position: XYPosition,
    /// node data
    pub data: NodeData,
}

impl TryFrom<NodeMetadata> for Node {
    type Error = CanvasError;

    fn try_from(meta: NodeMetadata) -> Result<Self> {
        let data = NodeData::from_value(meta.node_type, meta.data).map_err(|e| CanvasError::Validation(format!("invalid node {} data: {}", meta.id, e)))?;

        Ok(Self {
            id: meta.id,
            position: meta.position,
            data,
        })
    }
}

impl From<Node> for NodeMetadata {
    fn from(node: Node) -> Self {
        let node_type = node.node_type();
        let data = node.data.to_value().unwrap_or(Value::Null);

        Self {
            id: node.id,
            node_type,
            position: node.position,
            data,
        }
    }
}

impl Node {
    pub fn new(
        id: impl Into<NodeId>,
        position: XYPosition,
        data: NodeData,
    ) -> Self {
        Self {
            id: id.into(),
            position,
            data,
        }
    }

    pub fn node_type(&self) -> NodeType {
        self.data.payload.node_type()
    }

    pub fn title(&self) -> &str {
        &self.data.common.title
    }

    /// Shallow-merge `patch` into the node's data and re-validate it against
    /// the node's type.
    pub fn patched(
        &self,
        patch: &DataPatch,
    ) -> Result<Node> {
        let mut value = self.data.to_value()?;
        patch.merge_into(&mut value);
        let data = NodeData::from_value(self.node_type(), value)?;

        Ok(Node {
            id: self.id.clone(),
            position: self.position,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use serde_json::json;

    use super::*;

    #[test]
    fn test_node_deserialize_note() {
        let node: Node = serde_json::from_value(json!({
            "id": "2",
            "type": "noteNode",
            "position": { "x": 450.0, "y": 50.0 },
            "data": { "title": "Initial Hypothesis", "text": "Offshore accounts.", "colorTheme": "amber" }
        }))
        .unwrap();

        assert_eq!(node.node_type(), NodeType::Note);
        assert_eq!(node.title(), "Initial Hypothesis");
        assert_eq!(node.data.common.color_theme, Some(ColorTheme::Amber));
        assert_eq!(
            node.data.payload,
            NodePayload::Note(NotePayload {
                text: Some("Offshore accounts.".to_string())
            })
        );
    }

    #[test]
    fn test_node_serialize_flat_data() {
        let mut data = NodeData::new("AI Analysis", NodePayload::AiAnalysis(AiAnalysisPayload {
            insight: Some("none yet".to_string()),
        }));
        data.common.is_loading = Some(false);
        let node = Node::new("node-4", XYPosition::new(1.0, 2.0), data);

        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "node-4",
                "type": "aiAnalysisNode",
                "position": { "x": 1.0, "y": 2.0 },
                "data": { "title": "AI Analysis", "isLoading": false, "insight": "none yet" }
            })
        );
    }

    #[test]
    fn test_node_style_and_security_survive() {
        let value = json!({
            "id": "1",
            "type": "databaseNode",
            "position": { "x": 0.0, "y": 0.0 },
            "data": {
                "title": "t",
                "style": { "color": "#ff0000", "width": 240.0, "height": 120.0, "opacity": 0.5 },
                "security": { "encryption": true, "accessControl": "owner-only" }
            }
        });
        let node: Node = serde_json::from_value(value.clone()).unwrap();
        let style = node.data.common.style.as_ref().unwrap();
        assert_eq!(style.width, Some(240.0));
        let security = node.data.common.security.as_ref().unwrap();
        assert_eq!(security.access_control, Some(AccessControl::OwnerOnly));
        assert_eq!(serde_json::to_value(&node).unwrap(), value);

        let res = serde_json::from_value::<Node>(json!({
            "id": "2",
            "type": "noteNode",
            "data": { "security": { "accessControl": "everyone" } }
        }));
        assert!(res.is_err());
    }

    #[test]
    fn test_node_missing_data_defaults() {
        let node: Node = serde_json::from_value(json!({ "id": "w2-1", "type": "liveFeedNode" })).unwrap();
        assert_eq!(node.position, XYPosition::default());
        assert_eq!(node.title(), "");
    }

    #[test]
    fn test_node_unknown_type_rejected() {
        let res = serde_json::from_value::<Node>(json!({ "id": "x", "type": "videoNode", "data": {} }));
        assert!(res.is_err());
    }

    #[test]
    fn test_node_bad_payload_rejected() {
        let res = serde_json::from_value::<Node>(json!({
            "id": "c",
            "type": "chartNode",
            "data": { "title": "Chart", "chartData": "not a list" }
        }));
        assert!(res.is_err());
    }

    #[test]
    fn test_node_patch_merges() {
        let node = Node::new("n", XYPosition::default(), NodeData::new("Old", NodePayload::Note(NotePayload::default())));
        let patch = DataPatch::from_value(json!({ "title": "New", "text": "body" })).unwrap();

        let patched = node.patched(&patch).unwrap();
        assert_eq!(patched.title(), "New");
        assert_eq!(
            patched.data.payload,
            NodePayload::Note(NotePayload {
                text: Some("body".to_string())
            })
        );
    }

    #[test]
    fn test_node_patch_invalid_is_error() {
        let node = Node::new("n", XYPosition::default(), NodeData::new("Old", NodePayload::Chart(ChartPayload::default())));
        let patch = DataPatch::from_value(json!({ "chartData": 3 })).unwrap();
        assert!(node.patched(&patch).is_err());
    }

    #[test]
    fn test_node_type_discriminator() {
        assert_eq!(NodeType::from_str("aiAnalysisNode").unwrap(), NodeType::AiAnalysis);
        assert_eq!(NodeType::Api.as_ref(), "apiNode");
        assert!(NodeType::from_str("AIAnalysis").is_err());
    }
}
