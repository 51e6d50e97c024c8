//! Leptos component mounting the network plot.

use leptos::prelude::*;
use log::{debug, error};

use crate::graph::GraphData;

use super::dom::SceneHandle;
use super::options::RenderOptions;
use super::plot::render;

/// Renders `data` as an interactive network plot.
///
/// Without an explicit `width` the plot takes the width of its parent and is
/// drawn square. Every change of `data` cancels the previous scene and mounts
/// a fresh one; an empty graph leaves the container empty.
#[component]
pub fn NetworkPlot(
	#[prop(into)] data: Signal<GraphData>,
	#[prop(optional)] options: RenderOptions,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let container_ref = NodeRef::<leptos::html::Div>::new();
	// Disposed with the component; dropping the handle cancels the scene.
	let mounted = StoredValue::new_local(None::<SceneHandle>);

	Effect::new(move |_| {
		let graph = data.get();
		let Some(container) = container_ref.get() else {
			return;
		};
		mounted.set_value(None);
		if graph.is_empty() {
			debug!("inventory-graph: empty graph, nothing to draw");
			return;
		}

		let parent_width = container
			.parent_element()
			.map(|p| p.client_width() as f64)
			.filter(|w| *w > 0.0);
		let mut options = options.clone();
		options.width = width.or(parent_width).unwrap_or(options.width);
		options.height = height
			.or(parent_width.map(|_| options.width))
			.unwrap_or(options.height);

		match render(&graph, &options, &container) {
			Ok(handle) => mounted.set_value(Some(handle)),
			Err(e) => error!("inventory-graph: cannot draw network plot: {e}"),
		}
	});

	view! { <div class="network-plot" node_ref=container_ref></div> }
}
