//! Materializes a [`Scene`] as live SVG and wires up interaction.
//!
//! Elements are created once at mount time; every simulation tick only
//! rewrites link paths and node transforms. Pointer drags pin nodes, pointer
//! drags on the background pan, the wheel zooms, and hovering a node raises
//! it above its siblings. A fit timer reframes the viewBox once the layout
//! had time to settle.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::debug;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
	AddEventListenerOptions, Document, Element, Event, EventTarget, PointerEvent,
	SvgGraphicsElement, WheelEvent,
};

use crate::error::RenderError;

use super::driver::SimulationHandle;
use super::fit::AutoFit;
use super::plot::PreparedPlot;
use super::scene::Scene;
use super::scheduler::FrameScheduler;
use super::state::{DragEffect, DragTracker, PanState, Rect, ViewBox, ViewTransform};
use super::svg::SVG_STYLE;

const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Elements updated after mount.
struct Elements {
	svg: Element,
	/// Link and node groups; both receive the zoom transform.
	groups: [Element; 2],
	links: Vec<Element>,
	nodes: Vec<Element>,
}

impl Elements {
	fn apply_transform(&self, transform: &ViewTransform) {
		let value = transform.to_string();
		for group in &self.groups {
			let _ = group.set_attribute("transform", &value);
		}
	}

	fn apply_view_box(&self, view_box: &ViewBox) {
		let _ = self.svg.set_attribute("viewBox", &view_box.to_string());
	}

	/// Maps client coordinates to viewBox units.
	fn to_user(&self, view_box: &ViewBox, client_x: i32, client_y: i32) -> (f64, f64) {
		let rect = self.svg.get_bounding_client_rect();
		let client = Rect {
			x: rect.left(),
			y: rect.top(),
			width: rect.width(),
			height: rect.height(),
		};
		view_box.client_to_user(client, client_x as f64, client_y as f64)
	}

	/// Bounding box of the rendered content as laid out by the browser.
	fn measure(&self) -> Option<Rect> {
		let bbox = self.svg.unchecked_ref::<SvgGraphicsElement>().get_b_box().ok()?;
		let rect = Rect {
			x: bbox.x() as f64,
			y: bbox.y() as f64,
			width: bbox.width() as f64,
			height: bbox.height() as f64,
		};
		(rect.width > 0.0 && rect.height > 0.0).then_some(rect)
	}
}

/// View and gesture state shared by the event handlers.
struct Interaction {
	transform: ViewTransform,
	view_box: ViewBox,
	pan: PanState,
	drags: DragTracker,
}

/// A DOM event listener, removed again on drop.
struct Listener {
	target: EventTarget,
	event: &'static str,
	closure: Closure<dyn FnMut(Event)>,
}

impl Listener {
	fn new(
		target: &EventTarget,
		event: &'static str,
		handler: impl FnMut(Event) + 'static,
	) -> Result<Self, RenderError> {
		let closure = Closure::<dyn FnMut(Event)>::new(handler);
		target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
		Ok(Self {
			target: target.clone(),
			event,
			closure,
		})
	}

	/// Like [`Listener::new`], but allowed to call `preventDefault`.
	fn active(
		target: &EventTarget,
		event: &'static str,
		handler: impl FnMut(Event) + 'static,
	) -> Result<Self, RenderError> {
		let closure = Closure::<dyn FnMut(Event)>::new(handler);
		let options = AddEventListenerOptions::new();
		options.set_passive(false);
		target.add_event_listener_with_callback_and_add_event_listener_options(
			event,
			closure.as_ref().unchecked_ref(),
			&options,
		)?;
		Ok(Self {
			target: target.clone(),
			event,
			closure,
		})
	}
}

impl Drop for Listener {
	fn drop(&mut self) {
		let _ = self
			.target
			.remove_event_listener_with_callback(self.event, self.closure.as_ref().unchecked_ref());
	}
}

/// A mounted network plot.
///
/// Dropping the handle cancels it: the simulation stops ticking, timers stop,
/// listeners are removed and the SVG is detached.
pub struct SceneHandle {
	elements: Rc<Elements>,
	simulation: SimulationHandle,
	fit: AutoFit,
	listeners: RefCell<Vec<Listener>>,
	cancelled: Cell<bool>,
}

impl SceneHandle {
	/// The simulation ticking this scene.
	pub fn simulation(&self) -> &SimulationHandle {
		&self.simulation
	}

	/// The root `<svg>` element.
	pub fn element(&self) -> &Element {
		&self.elements.svg
	}

	/// Stops all background work and detaches the scene.
	pub fn cancel(&self) {
		if self.cancelled.replace(true) {
			return;
		}
		self.simulation.cancel();
		self.fit.stop();
		self.listeners.borrow_mut().clear();
		self.elements.svg.remove();
		debug!("inventory-graph: scene cancelled after {} ticks", self.simulation.ticks());
	}
}

impl Drop for SceneHandle {
	fn drop(&mut self) {
		self.cancel();
	}
}

pub(super) fn mount(
	plot: PreparedPlot,
	container: &Element,
	scheduler: Rc<dyn FrameScheduler>,
) -> Result<SceneHandle, RenderError> {
	let document = container
		.owner_document()
		.ok_or_else(|| RenderError::Dom("container is not attached to a document".into()))?;
	let PreparedPlot {
		scene,
		simulation,
		fit,
	} = plot;

	let elements = Rc::new(build(&document, &scene)?);

	let simulation = SimulationHandle::new(simulation, scheduler.clone());
	let scene = Rc::new(scene);
	{
		let (elements, scene) = (elements.clone(), scene.clone());
		simulation.on_tick(move |sim| {
			let positions: Vec<_> = sim.bodies().iter().map(|b| (b.x, b.y)).collect();
			for (link, el) in scene.links.iter().zip(&elements.links) {
				let _ = el.set_attribute("d", &scene.link_path(link, &positions));
			}
			for (&(x, y), el) in positions.iter().zip(&elements.nodes) {
				let _ = el.set_attribute("transform", &format!("translate({x},{y})"));
			}
		});
	}

	let interaction = Rc::new(RefCell::new(Interaction {
		transform: ViewTransform::default(),
		view_box: scene.view_box,
		pan: PanState::default(),
		drags: DragTracker::default(),
	}));
	let listeners = listen(&elements, &interaction, &simulation)?;

	let fit = {
		let (measured, scene, simulation) = (elements.clone(), scene.clone(), simulation.clone());
		let current = interaction.clone();
		let (applied, interaction) = (elements.clone(), interaction);
		AutoFit::new(
			scheduler,
			&fit,
			scene.node_radius,
			move || {
				measured.measure().or_else(|| {
					let sim = simulation.simulation();
					let positions: Vec<_> = sim.bodies().iter().map(|b| (b.x, b.y)).collect();
					scene.estimate_bounds(&positions)
				})
			},
			move || current.borrow().view_box,
			move |view_box| {
				applied.apply_view_box(&view_box);
				interaction.borrow_mut().view_box = view_box;
			},
		)
	};

	// Attach last; dropping the listeners above is all the cleanup an error needs.
	container.append_child(&elements.svg)?;
	simulation.restart();
	fit.start();

	debug!(
		"inventory-graph: mounted {} nodes, {} links",
		scene.nodes.len(),
		scene.links.len()
	);
	Ok(SceneHandle {
		elements,
		simulation,
		fit,
		listeners: RefCell::new(listeners),
		cancelled: Cell::new(false),
	})
}

fn build(document: &Document, scene: &Scene) -> Result<Elements, RenderError> {
	let svg = create(document, "svg")?;
	set(&svg, "version", "1.1")?;
	set(&svg, "width", &scene.width.to_string())?;
	set(&svg, "height", &scene.height.to_string())?;
	set(&svg, "viewBox", &scene.view_box.to_string())?;
	set(&svg, "style", SVG_STYLE)?;

	let arrow = &scene.theme.arrow;
	let defs = create(document, "defs")?;
	for marker in &scene.markers {
		let el = create(document, "marker")?;
		set(&el, "id", &marker.id)?;
		set(&el, "viewBox", arrow.view_box)?;
		set(&el, "refX", &marker.ref_x.to_string())?;
		set(&el, "refY", "0")?;
		set(&el, "markerWidth", &arrow.marker_width.to_string())?;
		set(&el, "markerHeight", &arrow.marker_height.to_string())?;
		set(&el, "orient", "auto")?;
		let path = create(document, "path")?;
		set(&path, "fill", &scene.color)?;
		set(&path, "d", arrow.path)?;
		el.append_child(&path)?;
		defs.append_child(&el)?;
	}
	svg.append_child(&defs)?;

	let link_group = create(document, "g")?;
	set(&link_group, "fill", "none")?;
	set(&link_group, "stroke-width", &scene.theme.stroke.link_width.to_string())?;
	let mut links = Vec::with_capacity(scene.links.len());
	for link in &scene.links {
		let el = create(document, "path")?;
		set(&el, "stroke", &scene.color)?;
		set(
			&el,
			"marker-end",
			&format!("url(#{})", scene.markers[link.marker].id),
		)?;
		let title = create(document, "title")?;
		title.set_text_content(Some(&link.relationship));
		el.append_child(&title)?;
		link_group.append_child(&el)?;
		links.push(el);
	}
	svg.append_child(&link_group)?;

	let node_group = create(document, "g")?;
	set(&node_group, "fill", "currentColor")?;
	set(&node_group, "stroke-linecap", "round")?;
	set(&node_group, "stroke-linejoin", "round")?;
	let mut nodes = Vec::with_capacity(scene.nodes.len());
	for node in &scene.nodes {
		let a = create(document, "a")?;
		set(&a, "href", &node.href)?;
		set(&a, "class", &node.classes.join(" "))?;

		let stroke = &scene.theme.stroke;
		let circle = create(document, "circle")?;
		set(&circle, "stroke", &stroke.node_stroke.to_css())?;
		set(&circle, "stroke-width", &stroke.node_stroke_width.to_string())?;
		set(&circle, "r", &node.radius.to_string())?;
		set(&circle, "class", &node.circle_classes.join(" "))?;
		a.append_child(&circle)?;

		let title = create(document, "title")?;
		title.set_text_content(Some(&node.title));
		a.append_child(&title)?;

		if let Some(glyph) = node.glyph {
			let fill = scene.theme.glyph_color.to_css();
			let text = create(document, "text")?;
			set(&text, "text-anchor", "middle")?;
			set(&text, "dominant-baseline", "central")?;
			set(
				&text,
				"style",
				&format!("font-family: {}; color: {fill}; fill: {fill}", glyph.font_family),
			)?;
			text.set_text_content(Some(&glyph.glyph.to_string()));
			a.append_child(&text)?;
		}

		let label_y = (scene.node_radius * 2.0).to_string();
		let label = &scene.theme.label;
		for halo in [true, false] {
			let text = create(document, "text")?;
			set(&text, "x", "0")?;
			set(&text, "y", &label_y)?;
			set(&text, "text-anchor", "middle")?;
			set(&text, "class", "nodeLabel")?;
			if halo {
				set(&text, "fill", "none")?;
				set(&text, "stroke", &label.halo.to_css())?;
				set(&text, "stroke-width", &label.halo_width.to_string())?;
			}
			text.set_text_content(Some(&node.label));
			a.append_child(&text)?;
		}

		node_group.append_child(&a)?;
		nodes.push(a);
	}
	svg.append_child(&node_group)?;

	Ok(Elements {
		svg,
		groups: [link_group, node_group],
		links,
		nodes,
	})
}

fn create(document: &Document, tag: &str) -> Result<Element, RenderError> {
	Ok(document.create_element_ns(Some(SVG_NS), tag)?)
}

fn set(element: &Element, name: &str, value: &str) -> Result<(), RenderError> {
	Ok(element.set_attribute(name, value)?)
}

fn listen(
	elements: &Rc<Elements>,
	interaction: &Rc<RefCell<Interaction>>,
	simulation: &SimulationHandle,
) -> Result<Vec<Listener>, RenderError> {
	let svg: &EventTarget = elements.svg.as_ref();
	let mut listeners = Vec::new();

	{
		let (elements, interaction) = (elements.clone(), interaction.clone());
		listeners.push(Listener::new(svg, "pointerdown", move |ev| {
			let Some(ev) = ev.dyn_ref::<PointerEvent>() else {
				return;
			};
			if ev.button() != 0 {
				return;
			}
			let mut state = interaction.borrow_mut();
			let (x, y) = elements.to_user(&state.view_box, ev.client_x(), ev.client_y());
			let transform = state.transform;
			state.pan.begin(ev.pointer_id(), x, y, &transform);
		})?);
	}

	{
		let (elements, interaction, simulation) =
			(elements.clone(), interaction.clone(), simulation.clone());
		listeners.push(Listener::new(svg, "pointermove", move |ev| {
			let Some(ev) = ev.dyn_ref::<PointerEvent>() else {
				return;
			};
			let mut state = interaction.borrow_mut();
			let (x, y) = elements.to_user(&state.view_box, ev.client_x(), ev.client_y());
			let (gx, gy) = state.transform.invert(x, y);
			if state.drags.drag(ev.pointer_id(), gx, gy, &mut simulation.simulation_mut()) {
				return;
			}
			let Interaction { pan, transform, .. } = &mut *state;
			if pan.update(ev.pointer_id(), x, y, transform) {
				elements.apply_transform(transform);
			}
		})?);
	}

	for event in ["pointerup", "pointercancel", "pointerleave"] {
		let (interaction, simulation) = (interaction.clone(), simulation.clone());
		listeners.push(Listener::new(svg, event, move |ev| {
			let Some(ev) = ev.dyn_ref::<PointerEvent>() else {
				return;
			};
			let mut state = interaction.borrow_mut();
			state.drags.end(ev.pointer_id(), &mut simulation.simulation_mut());
			state.pan.end(ev.pointer_id());
		})?);
	}

	// Links are draggable by default, which would swallow node drags.
	listeners.push(Listener::active(svg, "dragstart", |ev| ev.prevent_default())?);

	{
		let (elements, interaction) = (elements.clone(), interaction.clone());
		listeners.push(Listener::active(svg, "wheel", move |ev| {
			let Some(ev) = ev.dyn_ref::<WheelEvent>() else {
				return;
			};
			ev.prevent_default();
			let mut state = interaction.borrow_mut();
			let (x, y) = elements.to_user(&state.view_box, ev.client_x(), ev.client_y());
			state.transform.zoom_at(x, y, ViewTransform::wheel_factor(ev.delta_y()));
			elements.apply_transform(&state.transform);
		})?);
	}

	for (idx, node) in elements.nodes.iter().enumerate() {
		let target: &EventTarget = node.as_ref();

		let (drag_state, simulation) = (interaction.clone(), simulation.clone());
		listeners.push(Listener::new(target, "pointerdown", move |ev| {
			let Some(ev) = ev.dyn_ref::<PointerEvent>() else {
				return;
			};
			ev.stop_propagation();
			if ev.button() != 0 {
				return;
			}
			let effect = drag_state.borrow_mut().drags.start(
				ev.pointer_id(),
				idx,
				&mut simulation.simulation_mut(),
			);
			if effect == DragEffect::Restart {
				simulation.restart();
			}
		})?);

		let click_state = interaction.clone();
		listeners.push(Listener::new(target, "click", move |ev| {
			if click_state.borrow_mut().drags.take_moved() {
				ev.prevent_default();
			}
		})?);

		let node = node.clone();
		listeners.push(Listener::new(target, "mouseenter", move |_| {
			if let Some(parent) = node.parent_node() {
				let _ = parent.append_child(&node);
			}
		})?);
	}

	Ok(listeners)
}
