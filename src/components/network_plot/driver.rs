//! Runs a [`Simulation`] on a frame timer.

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::ops::ControlFlow;
use std::rc::Rc;

use log::debug;

use super::scheduler::{FrameScheduler, Timer};
use super::simulation::Simulation;

type TickListener = Box<dyn FnMut(&Simulation)>;

struct Shared {
	simulation: RefCell<Simulation>,
	listeners: RefCell<Vec<TickListener>>,
	ticks: Cell<u64>,
	cancelled: Cell<bool>,
	timer: Timer,
}

impl Shared {
	fn step(&self) -> ControlFlow<()> {
		if self.cancelled.get() {
			return ControlFlow::Break(());
		}
		self.simulation.borrow_mut().tick();
		self.ticks.set(self.ticks.get() + 1);

		let simulation = self.simulation.borrow();
		for listener in self.listeners.borrow_mut().iter_mut() {
			listener(&simulation);
		}
		if simulation.is_settled() {
			debug!("inventory-graph: layout settled after {} ticks", self.ticks.get());
			ControlFlow::Break(())
		} else {
			ControlFlow::Continue(())
		}
	}
}

/// Handle to a simulation ticking in the background.
///
/// Ticks run one per frame and never overlap. After [`cancel`](Self::cancel)
/// no further tick runs and no listener fires; positions from the last tick
/// are kept.
#[derive(Clone)]
pub struct SimulationHandle {
	shared: Rc<Shared>,
}

impl SimulationHandle {
	/// Wraps `simulation`; ticking starts with [`restart`](Self::restart).
	pub fn new(simulation: Simulation, scheduler: Rc<dyn FrameScheduler>) -> Self {
		let shared = Rc::new_cyclic(|weak: &std::rc::Weak<Shared>| {
			let weak = weak.clone();
			Shared {
				simulation: RefCell::new(simulation),
				listeners: RefCell::new(Vec::new()),
				ticks: Cell::new(0),
				cancelled: Cell::new(false),
				timer: Timer::new(scheduler, move |_| match weak.upgrade() {
					Some(shared) => shared.step(),
					None => ControlFlow::Break(()),
				}),
			}
		});
		Self { shared }
	}

	/// Registers a callback run after every tick.
	pub fn on_tick(&self, listener: impl FnMut(&Simulation) + 'static) {
		self.shared.listeners.borrow_mut().push(Box::new(listener));
	}

	/// Resumes ticking if idle. No-op after cancellation.
	pub fn restart(&self) {
		if !self.shared.cancelled.get() {
			self.shared.timer.ensure_running();
		}
	}

	/// Pauses ticking; [`restart`](Self::restart) resumes.
	pub fn stop(&self) {
		self.shared.timer.stop();
	}

	/// Stops ticking for good.
	pub fn cancel(&self) {
		self.shared.cancelled.set(true);
		self.shared.timer.stop();
	}

	/// Whether [`cancel`](Self::cancel) was called.
	pub fn is_cancelled(&self) -> bool {
		self.shared.cancelled.get()
	}

	/// Whether a tick is scheduled.
	pub fn is_running(&self) -> bool {
		self.shared.timer.is_running()
	}

	/// Ticks run so far.
	pub fn ticks(&self) -> u64 {
		self.shared.ticks.get()
	}

	/// Read access between ticks.
	pub fn simulation(&self) -> Ref<'_, Simulation> {
		self.shared.simulation.borrow()
	}

	/// Mutable access between ticks, e.g. from drag handlers.
	pub fn simulation_mut(&self) -> RefMut<'_, Simulation> {
		self.shared.simulation.borrow_mut()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::network_plot::scheduler::ManualFrames;
	use crate::components::network_plot::simulation::SimulationParameters;

	fn handle(frames: &Rc<ManualFrames>) -> SimulationHandle {
		let sim = Simulation::new(4, &[(0, 1), (1, 2), (2, 3)], SimulationParameters::default());
		let scheduler: Rc<dyn FrameScheduler> = frames.clone();
		SimulationHandle::new(sim, scheduler)
	}

	#[test]
	fn ticks_once_per_frame_and_notifies() {
		let frames = Rc::new(ManualFrames::default());
		let handle = handle(&frames);
		let seen = Rc::new(Cell::new(0));
		let counter = seen.clone();
		handle.on_tick(move |_| counter.set(counter.get() + 1));

		handle.restart();
		for _ in 0..10 {
			frames.advance(16.0);
		}

		assert_eq!(handle.ticks(), 10);
		assert_eq!(seen.get(), 10);
	}

	#[test]
	fn cancel_after_n_ticks_prevents_the_next() {
		let frames = Rc::new(ManualFrames::default());
		let handle = handle(&frames);
		let seen = Rc::new(Cell::new(0));
		let counter = seen.clone();
		handle.on_tick(move |_| counter.set(counter.get() + 1));
		handle.restart();
		for _ in 0..5 {
			frames.advance(16.0);
		}

		handle.cancel();
		let positions = handle.simulation().bodies().to_vec();
		handle.restart();
		for _ in 0..5 {
			frames.advance(16.0);
		}

		assert_eq!(handle.ticks(), 5);
		assert_eq!(seen.get(), 5);
		assert_eq!(handle.simulation().bodies(), positions.as_slice());
		assert!(!handle.is_running());
	}

	#[test]
	fn stops_once_settled_and_restarts_on_demand() {
		let frames = Rc::new(ManualFrames::default());
		let handle = handle(&frames);
		handle.restart();
		for _ in 0..400 {
			frames.advance(16.0);
		}

		assert!(!handle.is_running());
		let settled_at = handle.ticks();
		assert!(settled_at < 400);

		handle.simulation_mut().set_alpha(0.5);
		handle.restart();
		frames.advance(16.0);
		assert_eq!(handle.ticks(), settled_at + 1);
	}

	#[test]
	fn stop_pauses_without_cancelling() {
		let frames = Rc::new(ManualFrames::default());
		let handle = handle(&frames);
		handle.restart();
		frames.advance(16.0);
		handle.stop();
		frames.advance(16.0);
		assert_eq!(handle.ticks(), 1);

		handle.restart();
		frames.advance(16.0);
		assert_eq!(handle.ticks(), 2);
		assert!(!handle.is_cancelled());
	}
}
