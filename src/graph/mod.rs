//! Entity graph model and extraction from raw inventory payloads.

mod extract;
mod types;

pub use extract::{
	Direction, Extractor, ExtractorConfig, INVERSE_PREFIX, RelationshipField, RelationshipSchema,
	extract,
};
pub use types::{GraphData, GraphEdge, GraphNode, edge_id};
