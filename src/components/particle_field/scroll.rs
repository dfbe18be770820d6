//! Scroll-Velocity Coupler.
//!
//! Turns raw scroll offsets into a smoothed intensity that other effects
//! read: particles stretch and fade while the page moves fast, then settle
//! once scrolling stops. The raw delta decays every frame on its own, so the
//! signal returns to rest even when no further scroll events arrive.

use serde::Deserialize;

use crate::physics::approach;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
	/// Per-frame blend of the smoothed velocity towards the raw delta.
	pub blend: f64,
	/// Per-frame decay of the raw delta.
	pub decay: f64,
	/// Pixels of scroll per frame that map to one unit of intensity.
	pub pixels_per_unit: f64,
	pub max_intensity: f64,
	/// Vertical stretch added per unit of intensity.
	pub stretch_gain: f64,
	/// Opacity removed per unit of intensity.
	pub fade_gain: f64,
	pub min_opacity: f64,
}

impl Default for ScrollConfig {
	fn default() -> Self {
		Self {
			blend: 0.1,
			decay: 0.92,
			pixels_per_unit: 25.0,
			max_intensity: 2.5,
			stretch_gain: 0.6,
			fade_gain: 0.35,
			min_opacity: 0.15,
		}
	}
}

#[derive(Clone, Debug, Default)]
pub struct ScrollCoupler {
	config: ScrollConfig,
	previous: Option<f64>,
	raw: f64,
	smoothed: f64,
	progress: f64,
}

impl ScrollCoupler {
	pub fn new(config: ScrollConfig) -> Self {
		Self {
			config,
			..Self::default()
		}
	}

	/// Record a scroll notification. The first call only establishes the
	/// baseline offset.
	pub fn on_scroll(&mut self, offset: f64, max_offset: f64) {
		if let Some(previous) = self.previous {
			self.raw = offset - previous;
		}
		self.previous = Some(offset);
		self.progress = if max_offset > 0.0 {
			(offset / max_offset).clamp(0.0, 1.0)
		} else {
			0.0
		};
	}

	/// Advance smoothing and decay by `frames` reference frames.
	pub fn tick(&mut self, frames: f64) {
		self.smoothed = approach(self.smoothed, self.raw, self.config.blend, frames);
		self.raw *= self.config.decay.clamp(0.0, 1.0).powf(frames);
		if self.raw.abs() < 1e-4 {
			self.raw = 0.0;
		}
		if self.smoothed.abs() < 1e-4 && self.raw == 0.0 {
			self.smoothed = 0.0;
		}
	}

	/// Signed smoothed scroll velocity in pixels per frame.
	pub fn velocity(&self) -> f64 {
		self.smoothed
	}

	/// Unsigned intensity in `[0, max_intensity]`.
	pub fn intensity(&self) -> f64 {
		let unit = self.config.pixels_per_unit.max(f64::EPSILON);
		(self.smoothed.abs() / unit).min(self.config.max_intensity)
	}

	pub fn progress(&self) -> f64 {
		self.progress
	}

	/// Vertical stretch factor for particles and lines, 1.0 at rest.
	pub fn stretch(&self) -> f64 {
		1.0 + self.intensity() * self.config.stretch_gain
	}

	/// Opacity multiplier for background layers, 1.0 at rest.
	pub fn background_opacity(&self) -> f64 {
		(1.0 - self.intensity() * self.config.fade_gain).clamp(self.config.min_opacity, 1.0)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn first_notification_sets_baseline_only() {
		let mut scroll = ScrollCoupler::new(ScrollConfig::default());
		scroll.on_scroll(800.0, 2000.0);
		scroll.tick(1.0);
		assert_eq!(scroll.velocity(), 0.0);
		assert!((scroll.progress() - 0.4).abs() < 1e-12);
	}

	#[test]
	fn smoothed_velocity_follows_raw_delta() {
		let mut scroll = ScrollCoupler::new(ScrollConfig::default());
		scroll.on_scroll(0.0, 1000.0);
		scroll.on_scroll(50.0, 1000.0);
		scroll.tick(1.0);
		assert!((scroll.velocity() - 5.0).abs() < 1e-9);
		assert!(scroll.intensity() > 0.0);
		assert!(scroll.stretch() > 1.0);
		assert!(scroll.background_opacity() < 1.0);
	}

	#[test]
	fn signal_returns_to_rest_without_more_events() {
		let mut scroll = ScrollCoupler::new(ScrollConfig::default());
		scroll.on_scroll(0.0, 5000.0);
		scroll.on_scroll(400.0, 5000.0);
		let mut peak: f64 = 0.0;
		for _ in 0..600 {
			scroll.tick(1.0);
			peak = peak.max(scroll.intensity());
		}
		assert!(peak > 1.0);
		assert_eq!(scroll.intensity(), 0.0);
		assert_eq!(scroll.background_opacity(), 1.0);
		assert_eq!(scroll.stretch(), 1.0);
	}

	#[test]
	fn intensity_is_capped() {
		let mut scroll = ScrollCoupler::new(ScrollConfig::default());
		scroll.on_scroll(0.0, 1.0e6);
		for i in 1..60 {
			scroll.on_scroll(i as f64 * 5000.0, 1.0e6);
			scroll.tick(1.0);
		}
		assert!((scroll.intensity() - 2.5).abs() < 1e-9);
		assert!(scroll.background_opacity() >= 0.15);
	}
}
