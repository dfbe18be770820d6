//! Particle burst played when a bubble is selected.
//!
//! The burst owns one progress scalar and a fixed table of particle
//! directions allocated once. Particle positions are an analytic function of
//! progress, so opening and closing are just easing progress up or down.

use glam::{DQuat, DVec3};
use serde::Deserialize;

use crate::components::particle_field::theme::{Color, GREEN, PURPLE};
use crate::physics::{FieldRng, approach};

const WHITE: Color = Color::rgb(255, 255, 255);

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ExplosionConfig {
	/// Per-frame blend towards 1 while open.
	pub open_blend: f64,
	/// Per-frame blend towards 0 while closing.
	pub close_blend: f64,
	/// World-space radius reached at full progress.
	pub max_radius: f64,
	pub particle_count: usize,
	/// Swirl rotation about the view axis in radians per second.
	pub swirl_speed: f64,
	/// Particle size in pixels at zero progress.
	pub size: f64,
	/// Progress below which a closing burst is hidden.
	pub hide_threshold: f64,
	pub seed: u32,
}

impl Default for ExplosionConfig {
	fn default() -> Self {
		Self {
			open_blend: 0.05,
			close_blend: 0.15,
			max_radius: 28.0,
			particle_count: 400,
			swirl_speed: 0.6,
			size: 4.0,
			hide_threshold: 0.01,
			seed: 0xb0_0b1e,
		}
	}
}

#[derive(Clone, Copy, Debug)]
struct Spark {
	direction: DVec3,
	/// Fraction of `max_radius` this spark travels.
	reach: f64,
	phase: f64,
}

/// One rendered burst particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BurstParticle {
	pub position: DVec3,
	pub color: Color,
	pub size: f64,
}

#[derive(Clone, Debug)]
pub struct Explosion {
	config: ExplosionConfig,
	sparks: Vec<Spark>,
	progress: f64,
	anchor: DVec3,
	visible: bool,
	closing: bool,
}

impl Explosion {
	pub fn new(config: ExplosionConfig) -> Self {
		let mut rng = FieldRng::new(config.seed);
		let sparks = (0..config.particle_count)
			.map(|_| Spark {
				direction: rng.unit_direction(),
				reach: rng.range(0.55, 1.0),
				phase: rng.angle(),
			})
			.collect();
		Self {
			config,
			sparks,
			progress: 0.0,
			anchor: DVec3::ZERO,
			visible: false,
			closing: false,
		}
	}

	/// Start a burst at `anchor`. A burst that is already open is left alone.
	pub fn trigger(&mut self, anchor: DVec3) -> bool {
		if self.visible && !self.closing {
			return false;
		}
		self.anchor = anchor;
		self.progress = 0.0;
		self.visible = true;
		self.closing = false;
		true
	}

	pub fn close(&mut self) {
		if self.visible {
			self.closing = true;
		}
	}

	pub fn tick(&mut self, frames: f64) {
		if !self.visible {
			return;
		}
		let (target, k) = if self.closing {
			(0.0, self.config.close_blend)
		} else {
			(1.0, self.config.open_blend)
		};
		self.progress = approach(self.progress, target, k, frames).clamp(0.0, 1.0);
		if self.closing && self.progress < self.config.hide_threshold {
			self.visible = false;
			self.closing = false;
		}
	}

	pub fn progress(&self) -> f64 {
		self.progress
	}

	pub fn is_visible(&self) -> bool {
		self.visible
	}

	pub fn is_closing(&self) -> bool {
		self.closing
	}

	pub fn anchor(&self) -> DVec3 {
		self.anchor
	}

	pub fn len(&self) -> usize {
		self.sparks.len()
	}

	pub fn is_empty(&self) -> bool {
		self.sparks.is_empty()
	}

	/// Particle `index` at `time` seconds, `None` past the end.
	pub fn burst_particle(&self, index: usize, time: f64) -> Option<BurstParticle> {
		let spark = self.sparks.get(index)?;
		let p = self.progress;
		let swirl = DQuat::from_rotation_z(time * self.config.swirl_speed + spark.phase * p * 0.25);
		let offset = swirl * (spark.direction * (p * self.config.max_radius * spark.reach));
		Some(BurstParticle {
			position: self.anchor + offset,
			color: burst_color(p),
			size: self.config.size * (1.0 - 0.8 * p),
		})
	}
}

/// White at the start, through green, settling on purple.
pub fn burst_color(progress: f64) -> Color {
	if progress < 0.3 {
		WHITE.lerp(GREEN, progress / 0.3)
	} else if progress < 0.7 {
		GREEN.lerp(PURPLE, (progress - 0.3) / 0.4)
	} else {
		PURPLE
	}
}
