//! Liquid distortion lines.
//!
//! Horizontal wave lines that ripple gently at rest and swell, spread apart
//! and gain a second harmonic as scroll intensity rises.

use std::f64::consts::TAU;

use glam::DVec2;
use serde::Deserialize;

use super::theme::{Color, Gradient};

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LiquidConfig {
	pub lines: usize,
	/// Polyline segments per line.
	pub segments: usize,
	/// Wave amplitude at rest, in pixels.
	pub amplitude: f64,
	pub wavelength: f64,
	/// Phase speed in radians per second.
	pub speed: f64,
	/// Amplitude multiplier added per unit of scroll intensity.
	pub intensity_gain: f64,
	/// Vertical spread added per unit of scroll intensity.
	pub spread_gain: f64,
	pub line_width: f64,
	pub opacity: f64,
	pub gradient: Gradient,
}

impl Default for LiquidConfig {
	fn default() -> Self {
		Self {
			lines: 14,
			segments: 64,
			amplitude: 5.0,
			wavelength: 320.0,
			speed: 0.8,
			intensity_gain: 2.2,
			spread_gain: 0.12,
			line_width: 1.0,
			opacity: 0.35,
			gradient: Gradient::default(),
		}
	}
}

pub struct LiquidLines {
	config: LiquidConfig,
	buffer: Vec<DVec2>,
}

impl LiquidLines {
	pub fn new(config: LiquidConfig) -> Self {
		let capacity = config.segments + 1;
		Self {
			config,
			buffer: Vec::with_capacity(capacity),
		}
	}

	pub fn config(&self) -> &LiquidConfig {
		&self.config
	}

	/// Resting y coordinate of line `index`, before spread and waves.
	fn base_y(&self, index: usize, height: f64) -> f64 {
		(index as f64 + 0.5) / self.config.lines.max(1) as f64 * height
	}

	/// Points of line `index` for this frame. The returned slice is reused
	/// by the next call.
	pub fn line(
		&mut self,
		index: usize,
		width: f64,
		height: f64,
		time: f64,
		intensity: f64,
	) -> &[DVec2] {
		let cfg = &self.config;
		let segments = cfg.segments.max(1);
		let center = height * 0.5;
		let spread = 1.0 + intensity * cfg.spread_gain;
		let base = center + (self.base_y(index, height) - center) * spread;
		let amplitude = cfg.amplitude * (1.0 + intensity * cfg.intensity_gain);
		let wavelength = cfg.wavelength.max(1.0);

		self.buffer.clear();
		for s in 0..=segments {
			let x = s as f64 / segments as f64 * width;
			let phase = x / wavelength * TAU + time * cfg.speed + index as f64 * 0.7;
			let ripple = phase.sin() * amplitude;
			let swell = (phase * 0.5 + time).sin() * amplitude * 0.3 * intensity;
			self.buffer.push(DVec2::new(x, base + ripple + swell));
		}
		&self.buffer
	}

	/// Stroke color for line `index`.
	pub fn color(&self, index: usize, opacity: f64) -> Color {
		let t = index as f64 / self.config.lines.saturating_sub(1).max(1) as f64;
		self.config
			.gradient
			.sample(t)
			.with_alpha(self.config.opacity * opacity)
	}
}
