//! Text-to-Particle Sampler.
//!
//! Rasterizes a string offscreen and keeps grid cells whose alpha passes a
//! threshold as particle seeds. Geometry is fully deterministic for a given
//! text, font, canvas size and grid step.

use glam::DVec2;
use log::warn;

use crate::error::{Result, SurfaceError};
use crate::surface::{context_2d, offscreen_canvas};

/// Default sampling stride in pixels.
pub const DEFAULT_GRID_STEP: u32 = 8;

/// Alpha (0..=255) a pixel must exceed to seed a particle, about 50%.
pub const ALPHA_THRESHOLD: u8 = 128;

/// Used when the requested font yields no opaque pixels.
pub const FALLBACK_FONT: &str = "bold 96px sans-serif";

/// Everything that determines the sampled geometry.
#[derive(Clone, Debug, PartialEq)]
pub struct TextRaster {
	pub text: String,
	/// CSS font shorthand, e.g. `"bold 120px Syne"`.
	pub font: String,
	pub width: u32,
	pub height: u32,
	pub grid_step: u32,
}

/// Scan an RGBA buffer on a `step` grid and return the cells whose alpha
/// exceeds `threshold`.
pub fn sample_mask(rgba: &[u8], width: u32, height: u32, step: u32, threshold: u8) -> Vec<DVec2> {
	let step = step.max(1) as usize;
	let (width, height) = (width as usize, height as usize);
	let mut points = Vec::new();
	for y in (0..height).step_by(step) {
		for x in (0..width).step_by(step) {
			let alpha = rgba.get((y * width + x) * 4 + 3).copied().unwrap_or(0);
			if alpha > threshold {
				points.push(DVec2::new(x as f64, y as f64));
			}
		}
	}
	points
}

/// Draw `raster.text` centred on a detached canvas and return its RGBA pixels.
pub fn rasterize(raster: &TextRaster) -> Result<Vec<u8>> {
	if raster.width == 0 || raster.height == 0 {
		return Err(SurfaceError::Raster("zero-sized text raster".into()));
	}
	let canvas = offscreen_canvas(raster.width, raster.height)?;
	let ctx = context_2d(&canvas)?;
	ctx.set_font(&raster.font);
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	ctx.set_fill_style_str("#ffffff");
	ctx.fill_text(
		&raster.text,
		raster.width as f64 / 2.0,
		raster.height as f64 / 2.0,
	)?;
	let image = ctx.get_image_data(0.0, 0.0, raster.width as f64, raster.height as f64)?;
	Ok(image.data().0)
}

/// Sample seed positions for `raster`, retrying once with
/// [`FALLBACK_FONT`] when the requested font draws nothing.
pub fn sample(raster: &TextRaster) -> Result<Vec<DVec2>> {
	let pixels = rasterize(raster)?;
	let points = sample_mask(
		&pixels,
		raster.width,
		raster.height,
		raster.grid_step,
		ALPHA_THRESHOLD,
	);
	if !points.is_empty() || raster.text.trim().is_empty() || raster.font == FALLBACK_FONT {
		return Ok(points);
	}

	warn!(
		"folio-fx: font '{}' produced no pixels for '{}', using fallback",
		raster.font, raster.text
	);
	sample(&TextRaster {
		font: FALLBACK_FONT.to_string(),
		..raster.clone()
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	/// An RGBA buffer with one opaque rectangle.
	fn rect_mask(width: u32, height: u32, x0: u32, y0: u32, x1: u32, y1: u32) -> Vec<u8> {
		let mut rgba = vec![0u8; (width * height * 4) as usize];
		for y in y0..y1 {
			for x in x0..x1 {
				let i = ((y * width + x) * 4) as usize;
				rgba[i..i + 4].copy_from_slice(&[255, 255, 255, 255]);
			}
		}
		rgba
	}

	#[test]
	fn keeps_only_opaque_grid_cells() {
		let rgba = rect_mask(40, 20, 8, 0, 24, 20);
		let points = sample_mask(&rgba, 40, 20, 8, ALPHA_THRESHOLD);
		assert_eq!(
			points,
			vec![
				DVec2::new(8.0, 0.0),
				DVec2::new(16.0, 0.0),
				DVec2::new(8.0, 8.0),
				DVec2::new(16.0, 8.0),
				DVec2::new(8.0, 16.0),
				DVec2::new(16.0, 16.0),
			]
		);
	}

	#[test]
	fn threshold_is_exclusive() {
		let mut rgba = vec![0u8; 4 * 4];
		rgba[3] = ALPHA_THRESHOLD;
		rgba[7] = ALPHA_THRESHOLD + 1;
		let points = sample_mask(&rgba, 4, 1, 1, ALPHA_THRESHOLD);
		assert_eq!(points, vec![DVec2::new(1.0, 0.0)]);
	}

	#[test]
	fn sampling_is_deterministic() {
		let rgba = rect_mask(64, 64, 5, 9, 50, 41);
		let first = sample_mask(&rgba, 64, 64, 6, ALPHA_THRESHOLD);
		let second = sample_mask(&rgba, 64, 64, 6, ALPHA_THRESHOLD);
		assert!(!first.is_empty());
		assert_eq!(first, second);
	}

	#[test]
	fn short_buffers_are_treated_as_transparent() {
		let points = sample_mask(&[255; 8], 10, 10, 1, ALPHA_THRESHOLD);
		assert_eq!(points, vec![DVec2::new(0.0, 0.0), DVec2::new(1.0, 0.0)]);
	}

	#[test]
	fn zero_step_is_treated_as_one() {
		let rgba = rect_mask(3, 1, 0, 0, 3, 1);
		assert_eq!(sample_mask(&rgba, 3, 1, 0, ALPHA_THRESHOLD).len(), 3);
	}
}
