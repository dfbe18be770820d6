//! Canvas acquisition for the mounted effects.

use log::debug;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement};

use crate::error::{Result, SurfaceError};
use crate::input::{WindowListener, window_size};

/// How a canvas picks its pixel size. Every mode is re-resolved on window
/// resize.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CanvasSizing {
	/// Fill the viewport.
	pub fullscreen: bool,
	/// Fixed width; otherwise the parent's width.
	pub width: Option<f64>,
	/// Fixed height; otherwise the parent's height.
	pub height: Option<f64>,
}

impl CanvasSizing {
	/// Resolve the pixel size for `canvas` right now.
	pub fn resolve(&self, canvas: &HtmlCanvasElement) -> Result<(f64, f64)> {
		if self.fullscreen {
			let window = web_sys::window().ok_or(SurfaceError::NoWindow)?;
			return Ok(window_size(&window));
		}
		let parent = canvas
			.parent_element()
			.map(|p| (p.client_width() as f64, p.client_height() as f64));
		Ok(self.within(parent))
	}

	/// Size of an inline canvas whose parent measures `parent`.
	pub fn within(&self, parent: Option<(f64, f64)>) -> (f64, f64) {
		let (parent_width, parent_height) = parent.unwrap_or((0.0, 0.0));
		let measured = |fixed: Option<f64>, parent: f64, fallback: f64| {
			fixed.unwrap_or(if parent > 0.0 { parent } else { fallback })
		};
		(
			measured(self.width, parent_width, 800.0),
			measured(self.height, parent_height, 600.0),
		)
	}
}

/// Re-size `canvas` whenever the window resizes and hand the new size to
/// `apply`. Unchanged sizes are skipped.
pub fn on_resize(
	canvas: &HtmlCanvasElement,
	sizing: CanvasSizing,
	mut apply: impl FnMut(f64, f64) + 'static,
) -> Result<WindowListener> {
	let canvas = canvas.clone();
	WindowListener::on_window("resize", move |_| {
		let Ok((width, height)) = sizing.resolve(&canvas) else {
			return;
		};
		if (width as u32, height as u32) == (canvas.width(), canvas.height()) {
			return;
		}
		canvas.set_width(width as u32);
		canvas.set_height(height as u32);
		debug!("folio-fx: canvas resized to {}x{}", width, height);
		apply(width, height);
	})
}

pub fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d> {
	canvas
		.get_context("2d")?
		.ok_or(SurfaceError::NoContext)?
		.dyn_into::<CanvasRenderingContext2d>()
		.map_err(|_| SurfaceError::NoContext)
}

/// Size the canvas and hand back its 2d context.
pub fn prepare(
	canvas: &HtmlCanvasElement,
	sizing: &CanvasSizing,
) -> Result<(CanvasRenderingContext2d, f64, f64)> {
	let (width, height) = sizing.resolve(canvas)?;
	canvas.set_width(width as u32);
	canvas.set_height(height as u32);
	Ok((context_2d(canvas)?, width, height))
}

pub fn document() -> Result<Document> {
	web_sys::window()
		.ok_or(SurfaceError::NoWindow)?
		.document()
		.ok_or(SurfaceError::NoDocument)
}

/// A detached canvas for offscreen rasterization.
pub fn offscreen_canvas(width: u32, height: u32) -> Result<HtmlCanvasElement> {
	let canvas = document()?
		.create_element("canvas")?
		.dyn_into::<HtmlCanvasElement>()
		.map_err(|_| SurfaceError::Raster("created element is not a canvas".into()))?;
	canvas.set_width(width);
	canvas.set_height(height);
	Ok(canvas)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn inline_width_follows_parent() {
		let sizing = CanvasSizing {
			height: Some(240.0),
			..Default::default()
		};
		assert_eq!(sizing.within(Some((1200.0, 900.0))), (1200.0, 240.0));
		assert_eq!(sizing.within(Some((800.0, 900.0))), (800.0, 240.0));
	}

	#[test]
	fn unmeasured_parent_falls_back() {
		let sizing = CanvasSizing::default();
		assert_eq!(sizing.within(None), (800.0, 600.0));
		assert_eq!(sizing.within(Some((0.0, 300.0))), (800.0, 300.0));
	}
}
