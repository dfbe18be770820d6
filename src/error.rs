//! Failures acquiring a rendering surface.
//!
//! These are precondition failures: the effect that hits one does not render
//! and is not retried. Everything else in the crate degrades visually instead
//! of erroring.

use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error)]
pub enum SurfaceError {
	#[error("no browser window")]
	NoWindow,
	#[error("no document attached to the window")]
	NoDocument,
	#[error("canvas element has not been mounted")]
	NoCanvas,
	#[error("canvas does not provide a 2d context")]
	NoContext,
	#[error("offscreen raster unavailable: {0}")]
	Raster(String),
	#[error("browser call failed: {0}")]
	Js(String),
}

impl From<JsValue> for SurfaceError {
	fn from(value: JsValue) -> Self {
		SurfaceError::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
	}
}

pub type Result<T, E = SurfaceError> = std::result::Result<T, E>;
