//! Viewport auto-fit after mount.
//!
//! A timer waits `delay` ms, then samples every frame until `settle` ms have
//! elapsed. It then asks for the content bounds once and eases the viewBox
//! towards them over `transition` ms.

use std::cell::RefCell;
use std::ops::ControlFlow;
use std::rc::Rc;

use log::{debug, warn};

use super::options::FitOptions;
use super::scheduler::{FrameScheduler, Timer};
use super::state::{Rect, ViewBox, ease_cubic_in_out};

/// Settle timer plus the viewBox transition it spawns.
pub struct AutoFit {
	timer: Timer,
	transition: Rc<RefCell<Option<Timer>>>,
	delay: f64,
}

impl AutoFit {
	/// `bounds` is asked once the layout had time to settle; `current` and
	/// `apply` read and write the viewBox being animated.
	pub fn new(
		scheduler: Rc<dyn FrameScheduler>,
		options: &FitOptions,
		node_radius: f64,
		mut bounds: impl FnMut() -> Option<Rect> + 'static,
		current: impl Fn() -> ViewBox + 'static,
		apply: impl Fn(ViewBox) + 'static,
	) -> Self {
		let transition = Rc::new(RefCell::new(None));
		let slot = transition.clone();
		let apply = Rc::new(apply);
		let (settle, duration) = (options.settle, options.transition);
		let transition_scheduler = scheduler.clone();

		let timer = Timer::new(scheduler, move |elapsed| {
			if elapsed <= settle {
				return ControlFlow::Continue(());
			}
			let Some(bounds) = bounds() else {
				warn!("inventory-graph: nothing to fit");
				return ControlFlow::Break(());
			};
			let (from, to) = (current(), ViewBox::fit(bounds, node_radius));
			debug!("inventory-graph: fitting viewBox {from} -> {to}");

			let apply = apply.clone();
			let timer = Timer::new(transition_scheduler.clone(), move |elapsed| {
				let t = if duration > 0.0 { elapsed / duration } else { 1.0 };
				(*apply)(from.lerp(to, ease_cubic_in_out(t)));
				if t >= 1.0 {
					ControlFlow::Break(())
				} else {
					ControlFlow::Continue(())
				}
			});
			timer.start(0.0);
			*slot.borrow_mut() = Some(timer);
			ControlFlow::Break(())
		});

		Self {
			timer,
			transition,
			delay: options.delay,
		}
	}

	/// Starts the settle timer after the configured delay.
	pub fn start(&self) {
		self.timer.start(self.delay);
	}

	/// Stops the settle timer and any running transition.
	pub fn stop(&self) {
		self.timer.stop();
		if let Some(transition) = self.transition.borrow_mut().take() {
			transition.stop();
		}
	}

	/// Whether the settle timer or a transition is still running.
	pub fn is_running(&self) -> bool {
		self.timer.is_running()
			|| self
				.transition
				.borrow()
				.as_ref()
				.is_some_and(Timer::is_running)
	}
}

#[cfg(test)]
mod tests {
	use std::cell::Cell;

	use super::*;
	use crate::components::network_plot::scheduler::ManualFrames;
	use pretty_assertions::assert_eq;

	const CONTENT: Rect = Rect {
		x: -50.0,
		y: -40.0,
		width: 100.0,
		height: 80.0,
	};

	struct Fitting {
		measured: Rc<Cell<usize>>,
		applied: Rc<RefCell<Vec<ViewBox>>>,
		fit: AutoFit,
	}

	fn auto_fit(frames: &Rc<ManualFrames>, content: Option<Rect>) -> Fitting {
		let measured = Rc::new(Cell::new(0));
		let applied = Rc::new(RefCell::new(Vec::new()));
		let start = ViewBox::initial(400.0, 600.0, 15.0);
		let scheduler: Rc<dyn FrameScheduler> = frames.clone();

		let (count, last, sink) = (measured.clone(), applied.clone(), applied.clone());
		let fit = AutoFit::new(
			scheduler,
			&FitOptions::default(),
			15.0,
			move || {
				count.set(count.get() + 1);
				content
			},
			move || last.borrow().last().copied().unwrap_or(start),
			move |view_box| sink.borrow_mut().push(view_box),
		);
		Fitting {
			measured,
			applied,
			fit,
		}
	}

	#[test]
	fn measures_once_after_delay_and_settle() {
		let frames = Rc::new(ManualFrames::default());
		let fitting = auto_fit(&frames, Some(CONTENT));
		fitting.fit.start();

		// First frame at 16 ms: due at 166 ms, settled once elapsed > 500 ms.
		for _ in 0..41 {
			frames.advance(16.0);
		}
		assert_eq!(fitting.measured.get(), 0);
		assert!(fitting.applied.borrow().is_empty());

		frames.advance(16.0);
		assert_eq!(fitting.measured.get(), 1);
		assert!(fitting.fit.is_running());
	}

	#[test]
	fn transition_eases_onto_the_fitted_view_box() {
		let frames = Rc::new(ManualFrames::default());
		let fitting = auto_fit(&frames, Some(CONTENT));
		fitting.fit.start();
		for _ in 0..120 {
			frames.advance(16.0);
		}

		let applied = fitting.applied.borrow();
		let target = ViewBox::fit(CONTENT, 15.0);
		assert_eq!(applied.first(), Some(&ViewBox::initial(400.0, 600.0, 15.0)));
		assert_eq!(applied.last(), Some(&target));
		// 400 ms at 16 ms per frame, both ends included.
		assert_eq!(applied.len(), 26);
		assert_eq!(fitting.measured.get(), 1);
		assert!(!fitting.fit.is_running());
		assert_eq!(frames.pending(), 0);
	}

	#[test]
	fn nothing_to_fit_leaves_the_view_box() {
		let frames = Rc::new(ManualFrames::default());
		let fitting = auto_fit(&frames, None);
		fitting.fit.start();
		for _ in 0..120 {
			frames.advance(16.0);
		}

		assert_eq!(fitting.measured.get(), 1);
		assert!(fitting.applied.borrow().is_empty());
		assert!(!fitting.fit.is_running());
	}

	#[test]
	fn stop_cancels_a_running_transition() {
		let frames = Rc::new(ManualFrames::default());
		let fitting = auto_fit(&frames, Some(CONTENT));
		fitting.fit.start();
		for _ in 0..45 {
			frames.advance(16.0);
		}
		let seen = fitting.applied.borrow().len();
		assert!(seen > 0);

		fitting.fit.stop();
		for _ in 0..40 {
			frames.advance(16.0);
		}
		assert_eq!(fitting.applied.borrow().len(), seen);
		assert!(!fitting.fit.is_running());
	}
}
