//! Raw entity payloads: parsing and fetching from the inventory endpoint.

use log::debug;
use serde_json::Value;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, Response};

use crate::error::SourceError;

/// Parses a JSON list of raw entities.
pub fn parse_entities(json: &str) -> Result<Vec<Value>, SourceError> {
	match serde_json::from_str(json)? {
		Value::Array(entities) => Ok(entities),
		_ => Err(SourceError::NotAList),
	}
}

/// POSTs `uid` to `endpoint` and returns the entity list it answers with.
///
/// The body is the JSON-encoded uid (`null` when unset); `csrf_token` goes
/// into the `X-CSRFToken` header.
pub async fn fetch_entities(
	endpoint: &str,
	uid: Option<&str>,
	csrf_token: Option<&str>,
) -> Result<Vec<Value>, SourceError> {
	let window = web_sys::window().ok_or(SourceError::NoWindow)?;

	let headers = Headers::new()?;
	headers.set("Content-Type", "application/json")?;
	if let Some(token) = csrf_token {
		headers.set("X-CSRFToken", token)?;
	}
	let uid = uid.map_or(JsValue::NULL, JsValue::from_str);
	let body = js_sys::JSON::stringify(&uid)?;

	let init = RequestInit::new();
	init.set_method("POST");
	init.set_headers(&headers);
	init.set_body(&body);
	let request = Request::new_with_str_and_init(endpoint, &init)?;

	let response: Response = JsFuture::from(window.fetch_with_request(&request))
		.await?
		.dyn_into()?;
	if !response.ok() {
		return Err(SourceError::Status(response.status()));
	}
	let text = JsFuture::from(response.text()?)
		.await?
		.as_string()
		.ok_or_else(|| SourceError::Request("response body is not text".into()))?;
	debug!("inventory-graph: fetched {} bytes from {endpoint}", text.len());
	parse_entities(&text)
}
