//! Graph data structures passed from extraction to the network plot.

use serde::{Deserialize, Serialize};

/// A node in the graph: one inventory entity.
///
/// Every field is optional because extraction never rejects malformed
/// entities; a missing `uid` or `name` in the payload shows up here as `None`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
	/// Identifier used by links to reference this node. Equal to `uid`.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,
	/// Entity uid, used for click-through navigation.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub uid: Option<String>,
	/// Display name.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	/// First non-generic type tag (e.g. "Source", "Organization").
	#[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
	pub kind: Option<String>,
	/// Channel unique name for sources (e.g. "website", "print", "twitter").
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub channel: Option<String>,
}

impl GraphNode {
	/// Whether the node's type equals `kind`.
	pub fn is_kind(&self, kind: &str) -> bool {
		self.kind.as_deref() == Some(kind)
	}
}

/// A directed, labelled edge between two nodes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
	/// `"{source}_{target}"`, unique per extraction.
	pub id: String,
	/// Source node ID.
	pub source: String,
	/// Target node ID.
	pub target: String,
	/// Relationship field that produced the edge, inverse prefix stripped.
	pub relationship: String,
}

impl GraphEdge {
	/// Builds an edge and its canonical id from resolved endpoints.
	pub fn new(source: &str, target: &str, relationship: &str) -> Self {
		Self {
			id: edge_id(source, target),
			source: source.to_string(),
			target: target.to_string(),
			relationship: relationship.to_string(),
		}
	}
}

/// Canonical edge identity for a resolved `(source, target)` pair.
pub fn edge_id(source: &str, target: &str) -> String {
	format!("{source}_{target}")
}

/// Complete graph data: nodes and links.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphData {
	/// Nodes sorted by type.
	pub nodes: Vec<GraphNode>,
	/// Links sorted by relationship.
	pub links: Vec<GraphEdge>,
}

impl GraphData {
	/// True when there is nothing to draw.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}
}
