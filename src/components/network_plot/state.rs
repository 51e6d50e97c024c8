//! Viewport and interaction tracking.
//!
//! Holds the pan/zoom transform applied to the rendered groups, the SVG
//! viewBox with its auto-fit arithmetic, and the bookkeeping for node drags
//! and background pans.

use std::collections::HashMap;
use std::fmt;

use super::simulation::Simulation;

/// Alpha target while at least one node is being dragged.
pub const DRAG_ALPHA_TARGET: f64 = 0.3;

/// Pan and zoom transform applied to every rendered group.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	/// Translation.
	pub x: f64,
	/// See `x`.
	pub y: f64,
	/// Zoom factor (1.0 = 100%, clamped to 0.1..10.0).
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

impl ViewTransform {
	/// Smallest zoom factor.
	pub const MIN_SCALE: f64 = 0.1;
	/// Largest zoom factor.
	pub const MAX_SCALE: f64 = 10.0;

	/// Maps a point in viewBox units to layout coordinates.
	pub fn invert(&self, x: f64, y: f64) -> (f64, f64) {
		((x - self.x) / self.k, (y - self.y) / self.k)
	}

	/// Zooms by `factor`, keeping the viewBox point `(x, y)` fixed.
	pub fn zoom_at(&mut self, x: f64, y: f64, factor: f64) {
		let new_k = (self.k * factor).clamp(Self::MIN_SCALE, Self::MAX_SCALE);
		let ratio = new_k / self.k;
		self.x = x - (x - self.x) * ratio;
		self.y = y - (y - self.y) * ratio;
		self.k = new_k;
	}

	/// Zoom factor for one wheel notch.
	pub fn wheel_factor(delta_y: f64) -> f64 {
		if delta_y > 0.0 { 0.9 } else { 1.1 }
	}
}

impl fmt::Display for ViewTransform {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "translate({},{}) scale({})", self.x, self.y, self.k)
	}
}

/// An axis-aligned rectangle in SVG user units.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
	/// Left edge.
	pub x: f64,
	/// Top edge.
	pub y: f64,
	/// Size.
	pub width: f64,
	/// Size.
	pub height: f64,
}

impl Rect {
	/// Smallest rectangle covering both.
	pub fn union(self, other: Rect) -> Rect {
		let x0 = self.x.min(other.x);
		let y0 = self.y.min(other.y);
		let x1 = (self.x + self.width).max(other.x + other.width);
		let y1 = (self.y + self.height).max(other.y + other.height);
		Rect {
			x: x0,
			y: y0,
			width: x1 - x0,
			height: y1 - y0,
		}
	}
}

/// The `viewBox` of the scene.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ViewBox(pub Rect);

impl ViewBox {
	/// Initial viewBox: centered on the origin, shifted left by one node
	/// diameter so labels on the left edge stay visible.
	pub fn initial(width: f64, height: f64, node_radius: f64) -> Self {
		Self(Rect {
			x: -width / 2.0 - node_radius * 2.0,
			y: -height / 2.0,
			width: width - node_radius * 2.0,
			height,
		})
	}

	/// ViewBox framing the content bounding box with room for labels below.
	pub fn fit(bounds: Rect, node_radius: f64) -> Self {
		Self(Rect {
			x: bounds.x,
			y: bounds.y - node_radius * 2.0,
			width: bounds.width + node_radius * 2.0,
			height: bounds.height + node_radius * 2.0,
		})
	}

	/// Component-wise interpolation, `t` in `0..=1`.
	pub fn lerp(self, other: ViewBox, t: f64) -> Self {
		let mix = |a: f64, b: f64| a + (b - a) * t;
		Self(Rect {
			x: mix(self.0.x, other.0.x),
			y: mix(self.0.y, other.0.y),
			width: mix(self.0.width, other.0.width),
			height: mix(self.0.height, other.0.height),
		})
	}

	/// Maps a client point to user units for an element laid out at
	/// `client` (default `xMidYMid meet` aspect handling).
	pub fn client_to_user(&self, client: Rect, cx: f64, cy: f64) -> (f64, f64) {
		let vb = self.0;
		if vb.width <= 0.0 || vb.height <= 0.0 || client.width <= 0.0 || client.height <= 0.0 {
			return (vb.x, vb.y);
		}
		let scale = (client.width / vb.width).min(client.height / vb.height);
		let left = client.x + (client.width - vb.width * scale) / 2.0;
		let top = client.y + (client.height - vb.height * scale) / 2.0;
		(vb.x + (cx - left) / scale, vb.y + (cy - top) / scale)
	}
}

impl fmt::Display for ViewBox {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let r = self.0;
		write!(f, "{},{},{},{}", r.x, r.y, r.width, r.height)
	}
}

/// Cubic in-out easing.
pub fn ease_cubic_in_out(t: f64) -> f64 {
	let t = t.clamp(0.0, 1.0) * 2.0;
	if t <= 1.0 {
		t * t * t / 2.0
	} else {
		let t = t - 2.0;
		(t * t * t + 2.0) / 2.0
	}
}

/// Tracks an in-progress background pan.
#[derive(Clone, Debug, Default)]
pub struct PanState {
	/// Pointer driving the pan, if any.
	pub pointer: Option<i32>,
	/// Pointer position at the start, in viewBox units.
	pub start_x: f64,
	/// See `start_x`.
	pub start_y: f64,
	/// Translation at the start.
	pub transform_start_x: f64,
	/// See `transform_start_x`.
	pub transform_start_y: f64,
}

impl PanState {
	/// Starts panning with `pointer` at `(x, y)`.
	pub fn begin(&mut self, pointer: i32, x: f64, y: f64, transform: &ViewTransform) {
		*self = Self {
			pointer: Some(pointer),
			start_x: x,
			start_y: y,
			transform_start_x: transform.x,
			transform_start_y: transform.y,
		};
	}

	/// Moves `transform` along with the pointer; false if `pointer` is not panning.
	pub fn update(&self, pointer: i32, x: f64, y: f64, transform: &mut ViewTransform) -> bool {
		if self.pointer != Some(pointer) {
			return false;
		}
		transform.x = self.transform_start_x + (x - self.start_x);
		transform.y = self.transform_start_y + (y - self.start_y);
		true
	}

	/// Ends the pan if `pointer` drives it.
	pub fn end(&mut self, pointer: i32) {
		if self.pointer == Some(pointer) {
			self.pointer = None;
		}
	}
}

/// What the caller has to do with the simulation after a drag event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragEffect {
	/// Nothing to do.
	None,
	/// The first concurrent drag started: restart ticking.
	Restart,
}

/// Tracks node drags per pointer.
///
/// Only the first of several concurrent drags raises the alpha target and
/// only the last one to end lowers it again.
#[derive(Clone, Debug, Default)]
pub struct DragTracker {
	active: HashMap<i32, usize>,
	moved: bool,
}

impl DragTracker {
	/// Whether any node is being dragged.
	pub fn is_dragging(&self) -> bool {
		!self.active.is_empty()
	}

	/// Starts dragging node `idx`; pins it at its current position.
	pub fn start(&mut self, pointer: i32, idx: usize, sim: &mut Simulation) -> DragEffect {
		let first = self.active.is_empty();
		self.active.insert(pointer, idx);
		self.moved = false;
		if let Some((x, y)) = sim.position(idx) {
			sim.fix(idx, x, y);
		}
		if first {
			sim.set_alpha_target(DRAG_ALPHA_TARGET);
			DragEffect::Restart
		} else {
			DragEffect::None
		}
	}

	/// Moves the node dragged by `pointer` to layout point `(x, y)`.
	pub fn drag(&mut self, pointer: i32, x: f64, y: f64, sim: &mut Simulation) -> bool {
		let Some(&idx) = self.active.get(&pointer) else {
			return false;
		};
		sim.fix(idx, x, y);
		self.moved = true;
		true
	}

	/// Ends the drag of `pointer` and releases its node.
	pub fn end(&mut self, pointer: i32, sim: &mut Simulation) {
		let Some(idx) = self.active.remove(&pointer) else {
			return;
		};
		if self.active.is_empty() {
			sim.set_alpha_target(0.0);
		}
		sim.release(idx);
	}

	/// Whether the last drag moved its node; reading clears the flag.
	pub fn take_moved(&mut self) -> bool {
		std::mem::take(&mut self.moved)
	}
}
