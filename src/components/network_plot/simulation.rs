//! Force simulation for the network layout.
//!
//! A velocity-Verlet style integrator with the force model of d3-force:
//! - link springs with a rest length, per-link strength `1 / min(degree)`
//!   and a degree bias so lightly connected nodes move more
//! - many-body charge between all node pairs (negative strength repels)
//! - weak X/Y forces pulling the layout towards the origin
//!
//! Forces are scaled by `alpha`, which decays towards `alpha_target` every
//! tick. The simulation counts as settled once alpha drops below
//! `alpha_min`; dragging raises `alpha_target` to keep it warm.

use std::f64::consts::PI;

use crate::graph::GraphData;

use super::scene::node_index;

/// Tunable simulation parameters.
#[derive(Clone, Debug)]
pub struct SimulationParameters {
	/// Rest length of link springs.
	pub link_distance: f64,
	/// Many-body strength; negative repels.
	pub charge_strength: f64,
	/// Strength of the X and Y centering forces.
	pub center_strength: f64,
	/// Alpha below which the layout counts as settled.
	pub alpha_min: f64,
	/// Fraction of the distance to `alpha_target` covered per tick.
	pub alpha_decay: f64,
	/// Fraction of velocity lost per tick.
	pub velocity_decay: f64,
	/// Squared distance below which charge uses a softened distance.
	pub distance_min2: f64,
}

impl Default for SimulationParameters {
	fn default() -> Self {
		let alpha_min: f64 = 0.001;
		Self {
			link_distance: 30.0,
			charge_strength: -30.0,
			center_strength: 0.1,
			alpha_min,
			alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
			velocity_decay: 0.4,
			distance_min2: 1.0,
		}
	}
}

/// Position, velocity and optional pin of one node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Body {
	/// Horizontal position.
	pub x: f64,
	/// Vertical position.
	pub y: f64,
	/// Horizontal velocity.
	pub vx: f64,
	/// Vertical velocity.
	pub vy: f64,
	/// Pinned position; set while the node is dragged.
	pub fx: Option<f64>,
	/// Pinned position, see `fx`.
	pub fy: Option<f64>,
}

#[derive(Clone, Debug)]
struct Spring {
	source: usize,
	target: usize,
	strength: f64,
	/// Share of the correction applied to the target.
	bias: f64,
}

/// Layout state for one graph.
#[derive(Clone, Debug)]
pub struct Simulation {
	params: SimulationParameters,
	bodies: Vec<Body>,
	springs: Vec<Spring>,
	alpha: f64,
	alpha_target: f64,
	random: Lcg,
}

impl Simulation {
	/// Places `node_count` nodes on a phyllotaxis spiral around the origin.
	pub fn new(node_count: usize, links: &[(usize, usize)], params: SimulationParameters) -> Self {
		let initial_angle = PI * (3.0 - 5f64.sqrt());
		let bodies = (0..node_count)
			.map(|i| {
				let radius = 10.0 * (0.5 + i as f64).sqrt();
				let angle = i as f64 * initial_angle;
				Body {
					x: radius * angle.cos(),
					y: radius * angle.sin(),
					..Body::default()
				}
			})
			.collect();

		let mut degree = vec![0usize; node_count];
		for &(s, t) in links {
			degree[s] += 1;
			degree[t] += 1;
		}
		let springs = links
			.iter()
			.map(|&(source, target)| Spring {
				source,
				target,
				strength: 1.0 / degree[source].min(degree[target]) as f64,
				bias: degree[source] as f64 / (degree[source] + degree[target]) as f64,
			})
			.collect();

		Self {
			params,
			bodies,
			springs,
			alpha: 1.0,
			alpha_target: 0.0,
			random: Lcg::default(),
		}
	}

	/// Builds a simulation from graph data, resolving link endpoints by node id.
	///
	/// Links whose endpoints are unknown are skipped; callers that need to
	/// reject them validate beforehand.
	pub fn from_graph(data: &GraphData, params: SimulationParameters) -> Self {
		let index = node_index(data);
		let links: Vec<_> = data
			.links
			.iter()
			.filter_map(|l| Some((*index.get(l.source.as_str())?, *index.get(l.target.as_str())?)))
			.collect();
		Self::new(data.nodes.len(), &links, params)
	}

	/// Bodies in node order.
	pub fn bodies(&self) -> &[Body] {
		&self.bodies
	}

	/// Position of node `idx`.
	pub fn position(&self, idx: usize) -> Option<(f64, f64)> {
		self.bodies.get(idx).map(|b| (b.x, b.y))
	}

	/// Resolved `(source, target)` index pairs, in link order.
	pub fn links(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
		self.springs.iter().map(|s| (s.source, s.target))
	}

	/// Current energy.
	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	/// Sets the current energy.
	pub fn set_alpha(&mut self, alpha: f64) {
		self.alpha = alpha;
	}

	/// Energy alpha decays towards.
	pub fn alpha_target(&self) -> f64 {
		self.alpha_target
	}

	/// Sets the energy alpha decays towards.
	pub fn set_alpha_target(&mut self, target: f64) {
		self.alpha_target = target;
	}

	/// Below `alpha_min` further ticks barely move anything.
	pub fn is_settled(&self) -> bool {
		self.alpha < self.params.alpha_min
	}

	/// Pins node `idx` at `(x, y)`.
	pub fn fix(&mut self, idx: usize, x: f64, y: f64) {
		if let Some(body) = self.bodies.get_mut(idx) {
			body.fx = Some(x);
			body.fy = Some(y);
		}
	}

	/// Releases a pinned node back to the forces.
	pub fn release(&mut self, idx: usize) {
		if let Some(body) = self.bodies.get_mut(idx) {
			body.fx = None;
			body.fy = None;
		}
	}

	/// Advances the layout by one step.
	pub fn tick(&mut self) {
		self.alpha += (self.alpha_target - self.alpha) * self.params.alpha_decay;

		self.apply_links();
		self.apply_charge();
		self.apply_center();

		let keep = 1.0 - self.params.velocity_decay;
		for body in &mut self.bodies {
			match body.fx {
				Some(fx) => {
					body.x = fx;
					body.vx = 0.0;
				}
				None => {
					body.vx *= keep;
					body.x += body.vx;
				}
			}
			match body.fy {
				Some(fy) => {
					body.y = fy;
					body.vy = 0.0;
				}
				None => {
					body.vy *= keep;
					body.y += body.vy;
				}
			}
		}
	}

	/// Ticks until settled or `max_ticks` is reached; returns ticks run.
	pub fn run(&mut self, max_ticks: usize) -> usize {
		let mut ticks = 0;
		while ticks < max_ticks && !self.is_settled() {
			self.tick();
			ticks += 1;
		}
		ticks
	}

	fn apply_links(&mut self) {
		for spring in &self.springs {
			let (s, t) = (&self.bodies[spring.source], &self.bodies[spring.target]);
			let mut dx = t.x + t.vx - s.x - s.vx;
			let mut dy = t.y + t.vy - s.y - s.vy;
			if dx == 0.0 {
				dx = self.random.jiggle();
			}
			if dy == 0.0 {
				dy = self.random.jiggle();
			}
			let len = (dx * dx + dy * dy).sqrt();
			let k = (len - self.params.link_distance) / len * self.alpha * spring.strength;
			let (dx, dy) = (dx * k, dy * k);

			let target = &mut self.bodies[spring.target];
			target.vx -= dx * spring.bias;
			target.vy -= dy * spring.bias;
			let source = &mut self.bodies[spring.source];
			source.vx += dx * (1.0 - spring.bias);
			source.vy += dy * (1.0 - spring.bias);
		}
	}

	fn apply_charge(&mut self) {
		let strength = self.params.charge_strength * self.alpha;
		let n = self.bodies.len();
		let mut dv = vec![(0.0, 0.0); n];
		for i in 0..n {
			for j in 0..n {
				if i == j {
					continue;
				}
				let mut dx = self.bodies[j].x - self.bodies[i].x;
				let mut dy = self.bodies[j].y - self.bodies[i].y;
				let mut dist2 = dx * dx + dy * dy;
				if dx == 0.0 {
					dx = self.random.jiggle();
					dist2 += dx * dx;
				}
				if dy == 0.0 {
					dy = self.random.jiggle();
					dist2 += dy * dy;
				}
				if dist2 < self.params.distance_min2 {
					dist2 = (self.params.distance_min2 * dist2).sqrt();
				}
				dv[i].0 += dx * strength / dist2;
				dv[i].1 += dy * strength / dist2;
			}
		}
		for (body, (dvx, dvy)) in self.bodies.iter_mut().zip(dv) {
			body.vx += dvx;
			body.vy += dvy;
		}
	}

	fn apply_center(&mut self) {
		let k = self.params.center_strength * self.alpha;
		for body in &mut self.bodies {
			body.vx -= body.x * k;
			body.vy -= body.y * k;
		}
	}
}

/// Deterministic linear congruential generator for jiggling coincident nodes.
#[derive(Clone, Debug)]
struct Lcg(u64);

impl Default for Lcg {
	fn default() -> Self {
		Self(1)
	}
}

impl Lcg {
	const A: u64 = 1_664_525;
	const C: u64 = 1_013_904_223;
	const M: u64 = 1 << 32;

	fn next(&mut self) -> f64 {
		self.0 = (Self::A * self.0 + Self::C) % Self::M;
		self.0 as f64 / Self::M as f64
	}

	fn jiggle(&mut self) -> f64 {
		(self.next() - 0.5) * 1e-6
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::{GraphEdge, GraphNode};

	fn node(id: &str) -> GraphNode {
		GraphNode {
			id: Some(id.into()),
			uid: Some(id.into()),
			..GraphNode::default()
		}
	}

	fn distance(sim: &Simulation, a: usize, b: usize) -> f64 {
		let (ax, ay) = sim.position(a).unwrap();
		let (bx, by) = sim.position(b).unwrap();
		((ax - bx).powi(2) + (ay - by).powi(2)).sqrt()
	}

	#[test]
	fn alpha_decays_until_settled() {
		let mut sim = Simulation::new(3, &[(0, 1), (1, 2)], SimulationParameters::default());
		let ticks = sim.run(1_000);

		assert!(sim.is_settled());
		// 1 - 0.001^(1/300) brings alpha from 1 to 0.001 in ~300 ticks
		assert!((295..=305).contains(&ticks), "settled after {ticks} ticks");
	}

	#[test]
	fn alpha_target_keeps_simulation_warm() {
		let mut sim = Simulation::new(2, &[(0, 1)], SimulationParameters::default());
		sim.set_alpha_target(0.3);
		sim.run(2_000);

		assert!(!sim.is_settled());
		assert!((sim.alpha() - 0.3).abs() < 0.01);
	}

	#[test]
	fn connected_pair_settles_near_rest_length() {
		let params = SimulationParameters {
			charge_strength: 0.0,
			center_strength: 0.0,
			..SimulationParameters::default()
		};
		let mut sim = Simulation::new(2, &[(0, 1)], params);
		for _ in 0..300 {
			sim.tick();
		}

		assert!((distance(&sim, 0, 1) - 30.0).abs() < 1.0);
	}

	#[test]
	fn negative_charge_pushes_nodes_apart() {
		let params = SimulationParameters {
			charge_strength: -500.0,
			..SimulationParameters::default()
		};
		let mut sim = Simulation::new(2, &[], params);
		let before = distance(&sim, 0, 1);
		for _ in 0..50 {
			sim.tick();
		}

		assert!(distance(&sim, 0, 1) > before);
	}

	#[test]
	fn pinned_node_stays_put() {
		let mut sim = Simulation::new(3, &[(0, 1), (1, 2)], SimulationParameters::default());
		sim.fix(1, 50.0, -20.0);
		for _ in 0..20 {
			sim.tick();
		}

		assert_eq!(sim.position(1), Some((50.0, -20.0)));
		sim.release(1);
		sim.tick();
		assert_ne!(sim.position(1), Some((50.0, -20.0)));
	}

	#[test]
	fn coincident_nodes_separate() {
		let mut sim = Simulation::new(2, &[], SimulationParameters::default());
		sim.fix(0, 0.0, 0.0);
		sim.fix(1, 0.0, 0.0);
		sim.tick();
		sim.release(0);
		sim.release(1);
		for _ in 0..10 {
			sim.tick();
		}

		assert!(distance(&sim, 0, 1) > 0.0);
		assert!(sim.bodies().iter().all(|b| b.x.is_finite() && b.y.is_finite()));
	}

	#[test]
	fn from_graph_resolves_links_by_id() {
		let data = GraphData {
			nodes: vec![node("a"), node("b"), node("c")],
			links: vec![GraphEdge::new("c", "a", "owns"), GraphEdge::new("a", "x", "owns")],
		};
		let sim = Simulation::from_graph(&data, SimulationParameters::default());

		assert_eq!(sim.links().collect::<Vec<_>>(), vec![(2, 0)]);
		assert_eq!(sim.bodies().len(), 3);
	}
}
