//! Drag-and-drop node creation from the palette.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::model::{
    AiAnalysisPayload, ApiPayload, ChartPayload, ChartPoint, DatabasePayload, LiveFeedPayload, NodeData, NodePayload, NodeType, NotePayload,
    XYPosition,
};

/// Pan/zoom transform of the canvas widget. `x`/`y` is the screen-space
/// offset of the canvas origin.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

impl Viewport {
    /// Project a screen-space point into canvas space.
    pub fn screen_to_canvas(
        &self,
        screen: XYPosition,
    ) -> XYPosition {
        let zoom = if self.zoom > 0.0 { self.zoom } else { 1.0 };
        XYPosition::new((screen.x - self.x) / zoom, (screen.y - self.y) / zoom)
    }
}

/// Resolve the type discriminator carried by a palette item.
pub fn parse_discriminator(s: &str) -> Option<NodeType> {
    NodeType::from_str(s.trim()).ok()
}

/// Starting data for a node freshly dropped on the canvas.
pub fn default_node_data(node_type: NodeType) -> NodeData {
    match node_type {
        NodeType::Note => NodeData::new("New Note", NodePayload::Note(NotePayload {
            text: Some("Start writing here...".to_string()),
        })),
        NodeType::Database => {
            let mut data = NodeData::new("Database Connection", NodePayload::Database(DatabasePayload::default()));
            data.common.config = Some(config(json!({
                "type": "postgresql",
                "host": "db.example.com",
                "port": "5432",
                "database": "cbi_cases",
                "query": "SELECT * FROM witnesses\nWHERE case_id = 734\nLIMIT 10;"
            })));
            data
        }
        NodeType::Chart => NodeData::new("New Chart", NodePayload::Chart(ChartPayload {
            chart_data: [("Jan", 400.0), ("Feb", 300.0), ("Mar", 600.0), ("Apr", 800.0)]
                .into_iter()
                .map(|(name, value)| ChartPoint {
                    name: name.to_string(),
                    value,
                })
                .collect(),
        })),
        NodeType::AiAnalysis => {
            let mut data = NodeData::new("AI Analysis", NodePayload::AiAnalysis(AiAnalysisPayload {
                insight: Some("Connect nodes and click Generate.".to_string()),
            }));
            data.common.is_loading = Some(false);
            data
        }
        NodeType::Api => {
            let mut data = NodeData::new("API Connector", NodePayload::Api(ApiPayload {
                text: Some("Configure and fetch data.".to_string()),
            }));
            data.common.config = Some(config(json!({
                "url": "https://jsonplaceholder.typicode.com/todos/1",
                "method": "GET",
                "headers": "{}",
                "body": "{}"
            })));
            data
        }
        NodeType::LiveFeed => NodeData::new(format!("New {}", node_type.label()), NodePayload::LiveFeed(LiveFeedPayload::default())),
    }
}

fn config(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
