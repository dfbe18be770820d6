//! Per-display-frame scheduling.
//!
//! [`FrameLoop::run`] drives a step function once per `requestAnimationFrame`
//! callback until it returns [`LoopControl::Stop`] or the returned
//! [`FrameHandle`] is cancelled. The step function never sees the browser
//! scheduling API, only a [`FrameTime`].

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::error::{Result, SurfaceError};

/// Refresh rate the per-frame constants were tuned for.
pub const REFERENCE_HZ: f64 = 60.0;

/// Longest step the simulation will take, in reference frames. Keeps a
/// backgrounded tab from producing one enormous step when it returns.
const MAX_FRAMES: f64 = 4.0;

/// Timing for one step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTime {
	/// Seconds since the previous step.
	pub dt: f64,
	/// `dt` expressed in 60 Hz frames.
	pub frames: f64,
	/// Seconds since the loop started.
	pub elapsed: f64,
}

impl FrameTime {
	pub fn from_dt(dt: f64, elapsed: f64) -> Self {
		let dt = if dt.is_finite() {
			dt.clamp(0.0, MAX_FRAMES / REFERENCE_HZ)
		} else {
			0.0
		};
		Self {
			dt,
			frames: dt * REFERENCE_HZ,
			elapsed,
		}
	}

	/// Exactly one reference frame.
	pub fn reference(elapsed: f64) -> Self {
		Self::from_dt(1.0 / REFERENCE_HZ, elapsed)
	}
}

/// Turns animation-frame timestamps into [`FrameTime`]s.
#[derive(Clone, Debug, Default)]
pub struct FrameClock {
	last_ms: Option<f64>,
	elapsed: f64,
}

impl FrameClock {
	pub fn tick(&mut self, timestamp_ms: f64) -> FrameTime {
		let dt = match self.last_ms {
			Some(last) => (timestamp_ms - last) / 1000.0,
			None => 1.0 / REFERENCE_HZ,
		};
		self.last_ms = Some(timestamp_ms);
		let time = FrameTime::from_dt(dt, self.elapsed);
		self.elapsed += time.dt;
		FrameTime {
			elapsed: self.elapsed,
			..time
		}
	}
}

/// Returned by a step function to keep or end the loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopControl {
	Continue,
	Stop,
}

type Step = Box<dyn FnMut(FrameTime) -> LoopControl>;

/// Cancellation token for a running [`FrameLoop`].
///
/// The handle owns the step function and the animation-frame callback; both
/// are dropped as soon as the loop ends, whichever way it ends.
#[derive(Clone, Default)]
pub struct FrameHandle {
	cancelled: Rc<Cell<bool>>,
	request: Rc<Cell<Option<i32>>>,
	step: Rc<RefCell<Option<Step>>>,
	callback: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>,
}

impl FrameHandle {
	/// Stop the loop. The pending frame callback, if any, is withdrawn.
	pub fn cancel(&self) {
		if let Some(id) = self.request.take() {
			if let Some(window) = web_sys::window() {
				let _ = window.cancel_animation_frame(id);
			}
		}
		self.release();
	}

	pub fn is_running(&self) -> bool {
		!self.cancelled.get()
	}

	/// Run one step. Returns false once the loop is over.
	fn advance(&self, time: FrameTime) -> bool {
		let control = match (self.is_running(), self.step.try_borrow_mut()) {
			(true, Ok(mut step)) => step.as_mut().map_or(LoopControl::Stop, |step| step(time)),
			_ => LoopControl::Stop,
		};
		if control == LoopControl::Stop || !self.is_running() {
			self.release();
			return false;
		}
		true
	}

	/// Break the callback's reference to itself. Called from inside the
	/// callback, wasm-bindgen defers the free until the call returns.
	fn release(&self) {
		self.cancelled.set(true);
		let step = self.step.try_borrow_mut().ok().and_then(|mut step| step.take());
		drop(step);
		let callback = self.callback.try_borrow_mut().ok().and_then(|mut cb| cb.take());
		drop(callback);
	}

	fn schedule(&self, window: &web_sys::Window) -> Result<()> {
		if let Some(cb) = &*self.callback.borrow() {
			let id = window.request_animation_frame(cb.as_ref().unchecked_ref())?;
			self.request.set(Some(id));
		}
		Ok(())
	}
}

/// Host-driven frame scheduler.
pub struct FrameLoop;

impl FrameLoop {
	/// Start calling `step` once per display frame.
	pub fn run(step: impl FnMut(FrameTime) -> LoopControl + 'static) -> Result<FrameHandle> {
		let window = web_sys::window().ok_or(SurfaceError::NoWindow)?;
		let handle = FrameHandle::default();
		*handle.step.borrow_mut() = Some(Box::new(step));
		let handle_inner = handle.clone();
		let mut clock = FrameClock::default();

		*handle.callback.borrow_mut() = Some(Closure::new(move |timestamp: f64| {
			handle_inner.request.set(None);
			if !handle_inner.advance(clock.tick(timestamp)) {
				return;
			}
			if let Some(window) = web_sys::window() {
				let _ = handle_inner.schedule(&window);
			}
		}));

		handle.schedule(&window)?;
		Ok(handle)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn first_tick_is_one_reference_frame() {
		let mut clock = FrameClock::default();
		let time = clock.tick(1000.0);
		assert!((time.frames - 1.0).abs() < 1e-9);
	}

	#[test]
	fn long_pauses_are_clamped() {
		let mut clock = FrameClock::default();
		clock.tick(0.0);
		let time = clock.tick(5000.0);
		assert!((time.frames - MAX_FRAMES).abs() < 1e-9);
	}

	#[test]
	fn elapsed_accumulates() {
		let mut clock = FrameClock::default();
		clock.tick(0.0);
		clock.tick(16.0);
		let time = clock.tick(32.0);
		assert!((time.elapsed - (1.0 / REFERENCE_HZ + 0.032)).abs() < 1e-9);
	}

	fn counting_handle(owned: &Rc<Cell<u32>>, stop_after: u32) -> FrameHandle {
		let handle = FrameHandle::default();
		let calls = owned.clone();
		*handle.step.borrow_mut() = Some(Box::new(move |_| {
			calls.set(calls.get() + 1);
			if calls.get() >= stop_after {
				LoopControl::Stop
			} else {
				LoopControl::Continue
			}
		}));
		handle
	}

	#[test]
	fn stopping_drops_the_step() {
		let calls = Rc::new(Cell::new(0));
		let handle = counting_handle(&calls, 2);
		assert!(handle.advance(FrameTime::reference(0.0)));
		assert_eq!(Rc::strong_count(&calls), 2);
		assert!(!handle.advance(FrameTime::reference(0.0)));
		assert!(!handle.is_running());
		assert_eq!(Rc::strong_count(&calls), 1);
		assert!(!handle.advance(FrameTime::reference(0.0)));
		assert_eq!(calls.get(), 2);
	}

	#[test]
	fn cancelling_drops_the_step() {
		let calls = Rc::new(Cell::new(0));
		let handle = counting_handle(&calls, u32::MAX);
		handle.cancel();
		assert_eq!(Rc::strong_count(&calls), 1);
		assert!(!handle.advance(FrameTime::reference(0.0)));
		assert_eq!(calls.get(), 0);
	}

	#[test]
	fn backwards_timestamps_do_not_rewind() {
		let time = FrameTime::from_dt(-0.5, 0.0);
		assert_eq!(time.frames, 0.0);
	}
}
