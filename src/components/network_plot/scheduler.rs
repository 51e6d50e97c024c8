//! Frame scheduling and timers.
//!
//! Everything that runs after mount (simulation ticks, the auto-fit delay,
//! the viewBox transition) is a [`Timer`] driven by a [`FrameScheduler`].
//! In the browser frames come from `requestAnimationFrame`; tests drive
//! frames by hand.

use std::cell::{Cell, RefCell};
use std::ops::ControlFlow;
use std::rc::{Rc, Weak};

use log::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

/// Runs callbacks once on a future frame, passing the frame time in ms.
pub trait FrameScheduler {
	fn request_frame(&self, callback: Box<dyn FnOnce(f64)>);
}

/// Browser scheduler backed by `requestAnimationFrame`.
#[derive(Clone, Copy, Debug, Default)]
pub struct AnimationFrames;

impl FrameScheduler for AnimationFrames {
	fn request_frame(&self, callback: Box<dyn FnOnce(f64)>) {
		let Some(window) = web_sys::window() else {
			warn!("inventory-graph: no window, frame dropped");
			return;
		};
		let cb = Closure::once_into_js(move |now: f64| callback(now));
		if let Err(e) = window.request_animation_frame(cb.unchecked_ref()) {
			warn!("inventory-graph: requestAnimationFrame failed: {e:?}");
		}
	}
}

type TimerCallback = Box<dyn FnMut(f64) -> ControlFlow<()>>;

struct TimerInner {
	scheduler: Rc<dyn FrameScheduler>,
	callback: RefCell<TimerCallback>,
	running: Cell<bool>,
	/// Bumped on every start/stop so frames of an older run are ignored.
	generation: Cell<u64>,
}

/// A repeating frame timer.
///
/// Once started, the callback runs on every frame with the milliseconds
/// elapsed since the timer became due, until it returns
/// [`ControlFlow::Break`] or the timer is stopped. Frames only hold a weak
/// reference, so dropping the timer ends the loop.
pub struct Timer {
	inner: Rc<TimerInner>,
}

impl Timer {
	/// Creates a stopped timer.
	pub fn new(
		scheduler: Rc<dyn FrameScheduler>,
		callback: impl FnMut(f64) -> ControlFlow<()> + 'static,
	) -> Self {
		Self {
			inner: Rc::new(TimerInner {
				scheduler,
				callback: RefCell::new(Box::new(callback)),
				running: Cell::new(false),
				generation: Cell::new(0),
			}),
		}
	}

	/// (Re)starts the timer; the callback first runs once `delay` ms have
	/// passed. A running timer is restarted from scratch.
	pub fn start(&self, delay: f64) {
		let generation = self.inner.generation.get() + 1;
		self.inner.generation.set(generation);
		self.inner.running.set(true);
		schedule(&self.inner, generation, None, delay);
	}

	/// Starts the timer unless it is already running.
	pub fn ensure_running(&self) {
		if !self.is_running() {
			self.start(0.0);
		}
	}

	/// Stops the timer; pending frames are ignored.
	pub fn stop(&self) {
		self.inner.running.set(false);
		self.inner.generation.set(self.inner.generation.get() + 1);
	}

	/// Whether the timer is started and has not broken off.
	pub fn is_running(&self) -> bool {
		self.inner.running.get()
	}
}

impl Drop for Timer {
	fn drop(&mut self) {
		self.stop();
	}
}

fn schedule(inner: &Rc<TimerInner>, generation: u64, due: Option<f64>, delay: f64) {
	let weak: Weak<TimerInner> = Rc::downgrade(inner);
	inner.scheduler.request_frame(Box::new(move |now| {
		let Some(inner) = weak.upgrade() else {
			return;
		};
		if !inner.running.get() || inner.generation.get() != generation {
			return;
		}
		let due = due.unwrap_or(now + delay);
		if now >= due {
			let flow = (inner.callback.borrow_mut())(now - due);
			if flow.is_break() && inner.generation.get() == generation {
				inner.running.set(false);
				return;
			}
		}
		if inner.running.get() && inner.generation.get() == generation {
			schedule(&inner, generation, Some(due), delay);
		}
	}));
}

/// Scheduler whose frames are run by hand.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct ManualFrames {
	now: Cell<f64>,
	queue: RefCell<Vec<Box<dyn FnOnce(f64)>>>,
}

#[cfg(test)]
impl ManualFrames {
	/// Advances the clock by `ms` and runs the frames queued so far.
	pub(crate) fn advance(&self, ms: f64) {
		self.now.set(self.now.get() + ms);
		let frames = std::mem::take(&mut *self.queue.borrow_mut());
		for frame in frames {
			frame(self.now.get());
		}
	}

	pub(crate) fn pending(&self) -> usize {
		self.queue.borrow().len()
	}
}

#[cfg(test)]
impl FrameScheduler for ManualFrames {
	fn request_frame(&self, callback: Box<dyn FnOnce(f64)>) {
		self.queue.borrow_mut().push(callback);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn counting_timer(frames: &Rc<ManualFrames>, limit: usize) -> (Timer, Rc<RefCell<Vec<f64>>>) {
		let calls = Rc::new(RefCell::new(Vec::new()));
		let seen = calls.clone();
		let scheduler: Rc<dyn FrameScheduler> = frames.clone();
		let timer = Timer::new(scheduler, move |elapsed| {
			seen.borrow_mut().push(elapsed);
			if seen.borrow().len() >= limit {
				ControlFlow::Break(())
			} else {
				ControlFlow::Continue(())
			}
		});
		(timer, calls)
	}

	#[test]
	fn runs_every_frame_until_break() {
		let frames = Rc::new(ManualFrames::default());
		let (timer, calls) = counting_timer(&frames, 3);
		timer.start(0.0);

		for _ in 0..5 {
			frames.advance(16.0);
		}

		assert_eq!(*calls.borrow(), vec![0.0, 16.0, 32.0]);
		assert!(!timer.is_running());
		assert_eq!(frames.pending(), 0);
	}

	#[test]
	fn delay_postpones_first_call() {
		let frames = Rc::new(ManualFrames::default());
		let (timer, calls) = counting_timer(&frames, 100);
		timer.start(150.0);

		frames.advance(16.0);
		for _ in 0..9 {
			frames.advance(16.0);
		}
		assert!(calls.borrow().is_empty());

		frames.advance(16.0);
		assert_eq!(*calls.borrow(), vec![10.0]);
	}

	#[test]
	fn stop_and_restart_never_doubles_the_loop() {
		let frames = Rc::new(ManualFrames::default());
		let (timer, calls) = counting_timer(&frames, 100);
		timer.start(0.0);
		frames.advance(16.0);

		timer.stop();
		timer.start(0.0);
		timer.ensure_running();
		frames.advance(16.0);
		frames.advance(16.0);

		assert_eq!(calls.borrow().len(), 3);
		assert_eq!(frames.pending(), 1);
	}

	#[test]
	fn dropping_the_timer_ends_the_loop() {
		let frames = Rc::new(ManualFrames::default());
		let (timer, calls) = counting_timer(&frames, 100);
		timer.start(0.0);
		frames.advance(16.0);
		drop(timer);
		frames.advance(16.0);
		frames.advance(16.0);

		assert_eq!(calls.borrow().len(), 1);
		assert_eq!(frames.pending(), 0);
	}
}
