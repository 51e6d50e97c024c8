//! inventory-graph: entity relationship graphs for the media inventory.
//!
//! Raw inventory entities are flattened into a deduplicated node/link list
//! ([`graph`]) and drawn as an interactive force-directed SVG network plot
//! ([`NetworkPlot`]). The [`App`] shell reads its configuration and data
//! from the host page.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, error, info, warn};
use serde_json::Value;
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;
pub mod config;
pub mod error;
pub mod graph;
pub mod source;

pub use components::network_plot::{
	NetworkPlot, RenderOptions, SceneHandle, prepare, render, render_static,
};
pub use config::PlotConfig;
pub use error::{RenderError, SourceError};
pub use graph::{Extractor, GraphData, GraphEdge, GraphNode, extract};

/// Classes the host stylesheet is expected to color; these are fallbacks.
const DEFAULT_STYLE: &str = "\
.network-plot .nodeLabel { font-size: 10px; }
.network-plot circle { fill: #6c757d; }
.network-plot circle.Organization { fill: #0d6efd; }
.network-plot circle.Source { fill: #198754; }
.network-plot circle.currentNode { stroke: #212529; }
";

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("inventory-graph: logging initialized");
}

/// Text of the script element with the given id.
fn script_text(id: &str) -> Option<String> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id(id)?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	script.text().ok()
}

/// Load the plot configuration from a script element with id="graph-config".
fn load_config() -> PlotConfig {
	let Some(json) = script_text("graph-config") else {
		return PlotConfig::default();
	};
	PlotConfig::from_json(&json).unwrap_or_else(|e| {
		warn!("inventory-graph: invalid graph config, using defaults: {e}");
		PlotConfig::default()
	})
}

/// Load raw entities from a script element with id="graph-data".
fn load_inline_entities() -> Option<Vec<Value>> {
	let json = script_text("graph-data")?;
	match source::parse_entities(&json) {
		Ok(entities) => Some(entities),
		Err(e) => {
			warn!("inventory-graph: failed to parse inline graph data: {e}");
			None
		}
	}
}

/// Main application component.
/// Loads entities inline or from the configured endpoint and draws them.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let config = load_config();
	let extractor = config.extractor();
	let graph = RwSignal::new(GraphData::default());

	match config.endpoint.clone() {
		Some(endpoint) => {
			let (uid, csrf_token) = (config.uid.clone(), config.csrf_token.clone());
			wasm_bindgen_futures::spawn_local(async move {
				match source::fetch_entities(&endpoint, uid.as_deref(), csrf_token.as_deref()).await {
					Ok(entities) => graph.set(extractor.extract(&entities)),
					Err(e) => error!("inventory-graph: cannot load graph from {endpoint}: {e}"),
				}
			});
		}
		None => {
			if let Some(entities) = load_inline_entities() {
				graph.set(extractor.extract(&entities));
			}
		}
	}

	view! {
		<Style>{DEFAULT_STYLE}</Style>
		<NetworkPlot data=graph options=config.render_options() />
	}
}
