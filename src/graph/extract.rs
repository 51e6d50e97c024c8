//! Flattens nested inventory entities into a deduplicated node/edge list.
//!
//! The server returns a flat list of entities, each of which may embed
//! references to related entities in its relationship fields:
//!
//! ```json
//! [
//!   {"uid": "0x1", "name": "Foo", "dgraph.type": ["Entry", "Source"],
//!    "publishes_org": [{"uid": "0x2"}]},
//!   {"uid": "0x2", "name": "Bar", "dgraph.type": ["Entry", "Organization"],
//!    "~publishes_org": [{"uid": "0x1"}]}
//! ]
//! ```
//!
//! Only top-level entities become nodes. Relationship fields are either
//! declared up front ([`RelationshipSchema::Declared`]) or discovered from the
//! payload ([`RelationshipSchema::Discover`]). A key starting with the inverse
//! prefix (`~`) describes the relationship from the target's side, so the
//! edge direction is flipped and the prefix is dropped from its label. Both
//! sides of a back-reference therefore resolve to the same edge id and only
//! one edge survives.

use std::collections::HashSet;

use log::{debug, info, warn};
use serde_json::{Map, Value};

use super::types::{GraphData, GraphEdge, GraphNode};

/// Prefix marking an inverse relationship key.
pub const INVERSE_PREFIX: char = '~';

/// Which way an edge produced by a relationship field points.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
	/// Entity → referenced entity.
	Forward,
	/// Referenced entity → entity.
	Inverse,
}

/// A relationship field the extractor reads edges from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelationshipField {
	/// Key in the entity JSON object.
	pub key: String,
	/// Label written to [`GraphEdge::relationship`].
	pub label: String,
	/// Which side of the edge the entity is on.
	pub direction: Direction,
}

impl RelationshipField {
	/// A forward field; the key doubles as the label.
	pub fn forward(name: &str) -> Self {
		Self {
			key: name.to_string(),
			label: name.to_string(),
			direction: Direction::Forward,
		}
	}

	/// The inverse of `name`, read from the prefixed key (`~name`).
	pub fn inverse(name: &str) -> Self {
		Self {
			key: format!("{INVERSE_PREFIX}{name}"),
			label: name.to_string(),
			direction: Direction::Inverse,
		}
	}

	/// Classifies a raw key by its prefix.
	pub fn parse(key: &str, inverse_prefix: char) -> Self {
		match key.strip_prefix(inverse_prefix) {
			Some(name) => Self {
				key: key.to_string(),
				label: name.to_string(),
				direction: Direction::Inverse,
			},
			None => Self::forward(key),
		}
	}
}

/// Where relationship fields come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RelationshipSchema {
	/// Only the listed keys are read, in the listed order.
	Declared(Vec<RelationshipField>),
	/// Every list-valued key is a candidate, visited in payload order; keys
	/// starting with `inverse_prefix` are inverse.
	Discover { inverse_prefix: char },
}

impl Default for RelationshipSchema {
	fn default() -> Self {
		Self::Discover {
			inverse_prefix: INVERSE_PREFIX,
		}
	}
}

impl RelationshipSchema {
	/// Declares fields from raw keys, classifying `~`-prefixed keys as inverse.
	pub fn declared<I, S>(keys: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		Self::Declared(
			keys.into_iter()
				.map(|k| RelationshipField::parse(k.as_ref(), INVERSE_PREFIX))
				.collect(),
		)
	}

	/// Relationship fields present on `entity`, in schema (or key) order.
	fn fields(&self, entity: &Map<String, Value>) -> Vec<RelationshipField> {
		match self {
			Self::Declared(fields) => fields
				.iter()
				.filter(|f| entity.contains_key(&f.key))
				.cloned()
				.collect(),
			Self::Discover { inverse_prefix } => entity
				.iter()
				.filter(|(_, value)| value.is_array())
				.map(|(key, _)| RelationshipField::parse(key, *inverse_prefix))
				.collect(),
		}
	}
}

/// Field names of the raw entity payload.
#[derive(Clone, Debug)]
pub struct ExtractorConfig {
	/// Key of the type-tag list.
	pub type_field: String,
	/// Tag every entry carries; skipped when picking the node type.
	pub generic_type: String,
	/// Key of the nested channel object.
	pub channel_field: String,
	/// Key inside the channel object naming the channel.
	pub channel_name_field: String,
	/// Which keys hold relationships.
	pub relationships: RelationshipSchema,
}

impl Default for ExtractorConfig {
	fn default() -> Self {
		Self {
			type_field: "dgraph.type".to_string(),
			generic_type: "Entry".to_string(),
			channel_field: "channel".to_string(),
			channel_name_field: "unique_name".to_string(),
			relationships: RelationshipSchema::default(),
		}
	}
}

/// Converts raw entities into [`GraphData`].
#[derive(Clone, Debug, Default)]
pub struct Extractor {
	config: ExtractorConfig,
}

impl Extractor {
	/// Extractor for a custom payload layout.
	pub fn new(config: ExtractorConfig) -> Self {
		Self { config }
	}

	/// Shorthand for the default payload layout with a custom schema.
	pub fn with_relationships(relationships: RelationshipSchema) -> Self {
		Self::new(ExtractorConfig {
			relationships,
			..ExtractorConfig::default()
		})
	}

	/// The payload layout in use.
	pub fn config(&self) -> &ExtractorConfig {
		&self.config
	}

	/// Extracts nodes and links from `entities`.
	///
	/// Nodes come out stable-sorted by type and links stable-sorted by
	/// relationship label. Never fails: non-object entries are skipped and
	/// missing fields stay `None` on the resulting nodes.
	pub fn extract(&self, entities: &[Value]) -> GraphData {
		let mut pass = Extraction::new(&self.config);
		for entity in entities {
			match entity.as_object() {
				Some(object) => pass.visit(object),
				None => debug!("inventory-graph: skipping non-object entity {entity}"),
			}
		}
		let data = pass.finish();
		info!(
			"inventory-graph: extracted {} nodes, {} links from {} entities",
			data.nodes.len(),
			data.links.len(),
			entities.len()
		);
		data
	}
}

/// Extracts with the default configuration.
pub fn extract(entities: &[Value]) -> GraphData {
	Extractor::default().extract(entities)
}

/// State of a single extraction call.
struct Extraction<'a> {
	config: &'a ExtractorConfig,
	seen_nodes: HashSet<Option<String>>,
	/// Resolved `(source, target)` pairs, not joined ids: `a_b→c` and `a→b_c`
	/// share an id.
	seen_edges: HashSet<(String, String)>,
	nodes: Vec<GraphNode>,
	edges: Vec<GraphEdge>,
}

impl<'a> Extraction<'a> {
	fn new(config: &'a ExtractorConfig) -> Self {
		Self {
			config,
			seen_nodes: HashSet::new(),
			seen_edges: HashSet::new(),
			nodes: Vec::new(),
			edges: Vec::new(),
		}
	}

	fn visit(&mut self, entity: &Map<String, Value>) {
		let uid = uid_of(entity);

		if self.seen_nodes.insert(uid.clone()) {
			self.nodes.push(GraphNode {
				id: uid.clone(),
				uid: uid.clone(),
				name: entity.get("name").and_then(Value::as_str).map(str::to_string),
				kind: self.node_type(entity),
				channel: self.channel(entity),
			});
		}

		let Some(uid) = uid else {
			warn!("inventory-graph: entity without uid, skipping its relationships");
			return;
		};

		for field in self.config.relationships.fields(entity) {
			let Some(children) = entity.get(&field.key).and_then(Value::as_array) else {
				debug!(
					"inventory-graph: relationship `{}` on {uid} is not a list, ignored",
					field.key
				);
				continue;
			};
			for child in children {
				let Some(child_uid) = child.as_object().and_then(uid_of) else {
					continue;
				};
				let (source, target) = match field.direction {
					Direction::Forward => (uid.as_str(), child_uid.as_str()),
					Direction::Inverse => (child_uid.as_str(), uid.as_str()),
				};
				if self.seen_edges.insert((source.to_string(), target.to_string())) {
					self.edges.push(GraphEdge::new(source, target, &field.label));
				}
			}
		}
	}

	fn node_type(&self, entity: &Map<String, Value>) -> Option<String> {
		let generic = self.config.generic_type.as_str();
		match entity.get(&self.config.type_field)? {
			Value::Array(tags) => tags
				.iter()
				.filter_map(Value::as_str)
				.find(|tag| *tag != generic)
				.map(str::to_string),
			Value::String(tag) if tag != generic => Some(tag.clone()),
			_ => None,
		}
	}

	fn channel(&self, entity: &Map<String, Value>) -> Option<String> {
		entity
			.get(&self.config.channel_field)?
			.get(&self.config.channel_name_field)?
			.as_str()
			.map(str::to_string)
	}

	fn finish(self) -> GraphData {
		let Self {
			mut nodes,
			mut edges,
			..
		} = self;
		// `sort_by` is stable, ties keep encounter order.
		nodes.sort_by(|a, b| a.kind.cmp(&b.kind));
		edges.sort_by(|a, b| a.relationship.cmp(&b.relationship));
		GraphData {
			nodes,
			links: edges,
		}
	}
}

/// Reads `uid` as a string; numeric uids are stringified.
fn uid_of(entity: &Map<String, Value>) -> Option<String> {
	match entity.get("uid")? {
		Value::String(uid) => Some(uid.clone()),
		Value::Number(uid) => Some(uid.to_string()),
		_ => None,
	}
}
