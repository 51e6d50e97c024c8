//! Render options for the network plot.

use serde::Deserialize;

/// Timing of the viewport auto-fit after mounting, in milliseconds.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FitOptions {
	/// Delay before the fit timer starts sampling.
	pub delay: f64,
	/// Elapsed time (after `delay`) the layout gets to settle.
	pub settle: f64,
	/// Duration of the viewBox transition.
	pub transition: f64,
}

impl Default for FitOptions {
	fn default() -> Self {
		Self {
			delay: 150.0,
			settle: 500.0,
			transition: 400.0,
		}
	}
}

/// Options for [`prepare`](super::prepare) and [`render_static`](super::render_static).
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderOptions {
	/// Width of the `<svg>` in pixels.
	pub width: f64,
	/// Height of the `<svg>` in pixels.
	pub height: f64,
	/// Base node radius; organizations are drawn 1.2× larger.
	pub node_radius: f64,
	/// Many-body strength; negative values repel.
	pub force_strength: f64,
	/// Rest length of link springs.
	pub link_distance: f64,
	/// Stroke and arrow color for links.
	pub color: String,
	/// Uid of the entity the page is about; its circle gets `currentNode`.
	pub current: Option<String>,
	/// Prefix of node links; the node uid is appended.
	pub detail_url: String,
	/// Auto-fit timing.
	pub fit: FitOptions,
}

impl Default for RenderOptions {
	fn default() -> Self {
		Self {
			width: 400.0,
			height: 600.0,
			node_radius: 15.0,
			force_strength: -500.0,
			link_distance: 30.0,
			color: "#495057".to_string(),
			current: None,
			detail_url: "/view?uid=".to_string(),
			fit: FitOptions::default(),
		}
	}
}
