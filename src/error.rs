//! Error types for rendering and for loading graph data from the host page.

use thiserror::Error;
use wasm_bindgen::JsValue;

/// Errors raised while preparing or mounting a network plot.
#[derive(Debug, Error)]
pub enum RenderError {
	/// A link references a node id that is not in the node set.
	#[error("link `{edge}` references unknown node `{endpoint}`")]
	DanglingReference { edge: String, endpoint: String },

	/// A DOM call failed while building the scene.
	#[error("DOM operation failed: {0}")]
	Dom(String),
}

impl From<JsValue> for RenderError {
	fn from(value: JsValue) -> Self {
		Self::Dom(js_message(&value))
	}
}

/// Errors raised while fetching raw entities for the plot.
#[derive(Debug, Error)]
pub enum SourceError {
	/// No `window` global, e.g. outside a browser.
	#[error("no browser window available")]
	NoWindow,

	/// The request could not be built or sent.
	#[error("request failed: {0}")]
	Request(String),

	/// Non-2xx response.
	#[error("server responded with status {0}")]
	Status(u16),

	/// The body is not JSON.
	#[error("invalid JSON payload: {0}")]
	Decode(#[from] serde_json::Error),

	/// The body is JSON but not a list.
	#[error("expected a JSON list of entities")]
	NotAList,
}

impl From<JsValue> for SourceError {
	fn from(value: JsValue) -> Self {
		Self::Request(js_message(&value))
	}
}

/// Best-effort text for a thrown JS value.
pub(crate) fn js_message(value: &JsValue) -> String {
	value.as_string().unwrap_or_else(|| format!("{value:?}"))
}
