//! Pointer and window plumbing shared by the mounted effects.
//!
//! Event listeners are the single writer of pointer/scroll state and the
//! frame loop is the single reader; each step works from a copied snapshot.

use glam::DVec2;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Event, EventTarget, HtmlCanvasElement, MouseEvent, TouchEvent, Window};

use crate::error::{Result, SurfaceError};

/// Last known pointer position in canvas pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerState {
	position: Option<DVec2>,
}

impl PointerState {
	pub fn set(&mut self, position: DVec2) {
		self.position = Some(position);
	}

	pub fn clear(&mut self) {
		self.position = None;
	}

	pub fn snapshot(&self) -> Option<DVec2> {
		self.position
	}
}

/// An event listener that unregisters itself when dropped.
pub struct WindowListener {
	target: EventTarget,
	event: &'static str,
	callback: Closure<dyn FnMut(Event)>,
}

impl WindowListener {
	/// Listen on the global window.
	pub fn on_window(event: &'static str, handler: impl FnMut(Event) + 'static) -> Result<Self> {
		let window = web_sys::window().ok_or(SurfaceError::NoWindow)?;
		Self::on(window.into(), event, handler)
	}

	pub fn on(
		target: EventTarget,
		event: &'static str,
		handler: impl FnMut(Event) + 'static,
	) -> Result<Self> {
		let callback = Closure::<dyn FnMut(Event)>::new(handler);
		target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
		Ok(Self {
			target,
			event,
			callback,
		})
	}
}

impl Drop for WindowListener {
	fn drop(&mut self) {
		let callback: &js_sys::Function = self.callback.as_ref().unchecked_ref();
		let _ = self.target.remove_event_listener_with_callback(self.event, callback);
	}
}

/// Viewport coordinates of a mouse or first touch point.
pub fn client_position(event: &Event) -> Option<DVec2> {
	if let Some(mouse) = event.dyn_ref::<MouseEvent>() {
		return Some(DVec2::new(mouse.client_x() as f64, mouse.client_y() as f64));
	}
	let touch = event.dyn_ref::<TouchEvent>()?.touches().get(0)?;
	Some(DVec2::new(touch.client_x() as f64, touch.client_y() as f64))
}

/// True for `mouseout`/`touchend` events that leave the page, not just an
/// element inside it.
pub fn left_window(event: &Event) -> bool {
	event
		.dyn_ref::<MouseEvent>()
		.is_none_or(|m| m.related_target().is_none())
}

/// Convert viewport coordinates to canvas bitmap pixels.
pub fn canvas_position(canvas: &HtmlCanvasElement, client: DVec2) -> DVec2 {
	let rect = canvas.get_bounding_client_rect();
	to_bitmap(
		client - DVec2::new(rect.left(), rect.top()),
		DVec2::new(rect.width(), rect.height()),
		DVec2::new(canvas.width() as f64, canvas.height() as f64),
	)
}

/// Scale an offset within an element drawn at `css` size onto a bitmap of
/// `bitmap` size.
pub fn to_bitmap(offset: DVec2, css: DVec2, bitmap: DVec2) -> DVec2 {
	let axis = |offset: f64, css: f64, bitmap: f64| {
		if css > 0.0 && bitmap > 0.0 {
			offset * bitmap / css
		} else {
			offset
		}
	};
	DVec2::new(axis(offset.x, css.x, bitmap.x), axis(offset.y, css.y, bitmap.y))
}

pub fn window_size(window: &Window) -> (f64, f64) {
	let width = window
		.inner_width()
		.ok()
		.and_then(|v| v.as_f64())
		.unwrap_or(800.0);
	let height = window
		.inner_height()
		.ok()
		.and_then(|v| v.as_f64())
		.unwrap_or(600.0);
	(width, height)
}

/// Current vertical scroll offset and the largest reachable offset.
pub fn scroll_metrics(window: &Window) -> (f64, f64) {
	let offset = window.scroll_y().unwrap_or(0.0);
	let (_, viewport) = window_size(window);
	let content = window
		.document()
		.and_then(|d| d.document_element())
		.map(|e| e.scroll_height() as f64)
		.unwrap_or(viewport);
	(offset, (content - viewport).max(0.0))
}
