//! Host page configuration.

use serde::Deserialize;

use crate::components::network_plot::RenderOptions;
use crate::graph::{Extractor, RelationshipSchema};

/// Configuration read from the `graph-config` script element.
///
/// Render options sit at the top level next to the data source keys:
///
/// ```json
/// { "endpoint": "/api/graph", "uid": "0x2a", "csrfToken": "…", "width": 500 }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlotConfig {
	/// URL the entities are POSTed from; inline data is used when unset.
	pub endpoint: Option<String>,
	/// Uid of the entity the page shows.
	pub uid: Option<String>,
	/// Sent as `X-CSRFToken`.
	pub csrf_token: Option<String>,
	/// Relationship keys to follow; discovered from the payload when unset.
	pub relationships: Option<Vec<String>>,
	/// Render options, at the top level of the JSON.
	#[serde(flatten)]
	pub render: RenderOptions,
}

impl PlotConfig {
	/// Parses the config JSON.
	pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(json)
	}

	/// Extractor for the configured relationship keys.
	pub fn extractor(&self) -> Extractor {
		match &self.relationships {
			Some(keys) => Extractor::with_relationships(RelationshipSchema::declared(keys)),
			None => Extractor::default(),
		}
	}

	/// Render options, highlighting the page entity unless set explicitly.
	pub fn render_options(&self) -> RenderOptions {
		let mut options = self.render.clone();
		if options.current.is_none() {
			options.current = self.uid.clone();
		}
		options
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;
	use serde_json::json;

	#[test]
	fn reads_source_keys_and_flattened_render_options() {
		let config = PlotConfig::from_json(
			r#"{
				"endpoint": "/inventory/graph",
				"uid": "0x2a",
				"csrfToken": "abc",
				"width": 500,
				"detailUrl": "/inventory/view?uid="
			}"#,
		)
		.unwrap();

		assert_eq!(config.endpoint.as_deref(), Some("/inventory/graph"));
		assert_eq!(config.csrf_token.as_deref(), Some("abc"));
		assert_eq!(config.render.width, 500.0);
		assert_eq!(config.render.height, 600.0);

		let options = config.render_options();
		assert_eq!(options.current.as_deref(), Some("0x2a"));
		assert_eq!(options.detail_url, "/inventory/view?uid=");
	}

	#[test]
	fn explicit_current_wins_over_uid() {
		let config = PlotConfig::from_json(r#"{"uid": "0x1", "current": "0x2"}"#).unwrap();

		assert_eq!(config.render_options().current.as_deref(), Some("0x2"));
	}

	#[test]
	fn declared_relationships_restrict_extraction() {
		let config = PlotConfig::from_json(r#"{"relationships": ["owns"]}"#).unwrap();
		let entities = vec![
			json!({
				"uid": "a",
				"name": "A",
				"dgraph.type": ["Entry", "Organization"],
				"owns": [{"uid": "b"}],
				"employs": [{"uid": "c"}]
			}),
			json!({"uid": "b", "name": "B", "dgraph.type": ["Source"]}),
			json!({"uid": "c", "name": "C", "dgraph.type": ["Person"]}),
		];

		let graph = config.extractor().extract(&entities);
		assert_eq!(graph.nodes.len(), 3);
		assert_eq!(graph.links.len(), 1);
		assert_eq!(graph.links[0].relationship, "owns");
	}

	#[test]
	fn empty_config_is_default() {
		assert_eq!(PlotConfig::from_json("{}").unwrap(), PlotConfig::default());
	}
}
