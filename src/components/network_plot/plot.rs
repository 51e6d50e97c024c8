use std::rc::Rc;

use log::debug;
use web_sys::Element;

use crate::error::RenderError;
use crate::graph::GraphData;

use super::dom::{self, SceneHandle};
use super::options::{FitOptions, RenderOptions};
use super::scene::Scene;
use super::scheduler::{AnimationFrames, FrameScheduler};
use super::simulation::{Simulation, SimulationParameters};
use super::state::ViewBox;
use super::svg::SvgSnapshot;

/// Tick cap for headless layouts; the default decay settles in about 300.
const STATIC_MAX_TICKS: usize = 1000;

/// A scene and its simulation, ready to be mounted.
pub struct PreparedPlot {
	pub(super) scene: Scene,
	pub(super) simulation: Simulation,
	pub(super) fit: FitOptions,
}

impl PreparedPlot {
	/// The position-independent drawing.
	pub fn scene(&self) -> &Scene {
		&self.scene
	}

	/// The layout, not yet ticked.
	pub fn simulation(&self) -> &Simulation {
		&self.simulation
	}

	/// Appends the plot's `<svg>` to `container` and starts ticking.
	pub fn mount(
		self,
		container: &Element,
		scheduler: Rc<dyn FrameScheduler>,
	) -> Result<SceneHandle, RenderError> {
		dom::mount(self, container, scheduler)
	}
}

/// Simulation parameters derived from render options.
pub fn simulation_parameters(options: &RenderOptions) -> SimulationParameters {
	SimulationParameters {
		link_distance: options.link_distance,
		charge_strength: options.force_strength,
		..SimulationParameters::default()
	}
}

/// Builds the scene and simulation for `data` without touching the DOM.
pub fn prepare(data: &GraphData, options: &RenderOptions) -> Result<PreparedPlot, RenderError> {
	let scene = Scene::build(data, options)?;
	let simulation = Simulation::from_graph(data, simulation_parameters(options));
	Ok(PreparedPlot {
		scene,
		simulation,
		fit: options.fit.clone(),
	})
}

/// Prepares `data` and mounts it into `container`, ticking on animation
/// frames. Returns as soon as the scene is in the DOM.
pub fn render(
	data: &GraphData,
	options: &RenderOptions,
	container: &Element,
) -> Result<SceneHandle, RenderError> {
	prepare(data, options)?.mount(container, Rc::new(AnimationFrames))
}

/// Lays `data` out headless and returns a standalone SVG document.
///
/// The viewBox is fitted to the estimated bounds of the settled layout.
pub fn render_static(data: &GraphData, options: &RenderOptions) -> Result<String, RenderError> {
	let PreparedPlot {
		scene,
		mut simulation,
		..
	} = prepare(data, options)?;
	let ticks = simulation.run(STATIC_MAX_TICKS);
	debug!("inventory-graph: static layout took {ticks} ticks");

	let positions: Vec<_> = simulation.bodies().iter().map(|b| (b.x, b.y)).collect();
	let view_box = scene
		.estimate_bounds(&positions)
		.map_or(scene.view_box, |bounds| ViewBox::fit(bounds, scene.node_radius));

	Ok(SvgSnapshot {
		scene: &scene,
		positions: &positions,
		view_box,
	}
	.to_string())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::{GraphEdge, GraphNode};
	use pretty_assertions::assert_eq;

	fn node(uid: &str, kind: &str) -> GraphNode {
		GraphNode {
			id: Some(uid.into()),
			uid: Some(uid.into()),
			name: Some(uid.to_uppercase()),
			kind: Some(kind.into()),
			channel: None,
		}
	}

	fn triangle() -> GraphData {
		GraphData {
			nodes: vec![node("a", "Person"), node("b", "Organization"), node("c", "Source")],
			links: vec![
				GraphEdge::new("a", "b", "employs"),
				GraphEdge::new("c", "b", "publishes_org"),
			],
		}
	}

	#[test]
	fn prepare_maps_options_onto_the_simulation() {
		let options = RenderOptions {
			force_strength: -200.0,
			link_distance: 60.0,
			..RenderOptions::default()
		};
		let plot = prepare(&triangle(), &options).unwrap();

		assert_eq!(plot.scene().nodes.len(), 3);
		assert_eq!(plot.simulation().bodies().len(), 3);
		assert_eq!(plot.simulation().links().collect::<Vec<_>>(), vec![(0, 1), (2, 1)]);
		let params = simulation_parameters(&options);
		assert_eq!(params.charge_strength, -200.0);
		assert_eq!(params.link_distance, 60.0);
	}

	#[test]
	fn prepare_rejects_dangling_links() {
		let mut data = triangle();
		data.links.push(GraphEdge::new("a", "zz", "employs"));

		assert!(matches!(
			prepare(&data, &RenderOptions::default()),
			Err(RenderError::DanglingReference { .. })
		));
	}

	#[test]
	fn static_render_is_deterministic_and_fitted() {
		let options = RenderOptions::default();
		let first = render_static(&triangle(), &options).unwrap();
		let second = render_static(&triangle(), &options).unwrap();

		assert_eq!(first, second);
		assert_eq!(first.matches("<a href=").count(), 3);
		assert_eq!(first.matches("<marker ").count(), 2);
		assert!(!first.contains(r#"viewBox="-230,-300,370,600""#));
	}

	#[test]
	fn static_render_of_empty_graph_keeps_initial_view_box() {
		let svg = render_static(&GraphData::default(), &RenderOptions::default()).unwrap();

		assert!(svg.contains(r#"viewBox="-230,-300,370,600""#));
		assert!(!svg.contains("<a "));
	}
}
