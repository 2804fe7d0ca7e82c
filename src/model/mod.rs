mod change;
mod edge;
mod node;
mod patch;
mod snapshot;

pub use change::{EdgeChange, NodeChange, is_in_progress};
pub use edge::{CUSTOM_EDGE_TYPE, Edge, EdgeId, Importance, LineType, ThreadData, ThreadKind, ThreadLogic};
pub use node::{
    AccessControl, AiAnalysisPayload, ApiPayload, ChartPayload, ChartPoint, ColorTheme, DatabasePayload, LiveFeedPayload, Node, NodeCommon, NodeData,
    NodeId, NodePayload, NodeSecurity, NodeStyle, NodeType, NotePayload, QueryResult, XYPosition,
};
pub use patch::DataPatch;
pub use snapshot::GraphSnapshot;
