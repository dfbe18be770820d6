//! Deterministic noise and a small seeded generator.

use std::f64::consts::TAU;

use glam::DVec3;

/// Hash-style noise in `[0, 1)`. Same seed, same value.
pub fn pseudo_random(seed: f64) -> f64 {
	let x = (seed * 12.9898 + seed * 78.233).sin() * 43758.5453;
	x - x.floor()
}

/// Xorshift32 generator for seeding and color variation.
#[derive(Clone, Debug)]
pub struct FieldRng {
	state: u32,
}

impl FieldRng {
	pub fn new(seed: u32) -> Self {
		Self {
			state: if seed == 0 { 0x9e37_79b9 } else { seed },
		}
	}

	fn next_u32(&mut self) -> u32 {
		let mut x = self.state;
		x ^= x << 13;
		x ^= x >> 17;
		x ^= x << 5;
		self.state = x;
		x
	}

	/// Returns a float in [0, 1)
	pub fn next_f64(&mut self) -> f64 {
		self.next_u32() as f64 / (u32::MAX as f64 + 1.0)
	}

	/// Returns a float in [min, max)
	pub fn range(&mut self, min: f64, max: f64) -> f64 {
		min + self.next_f64() * (max - min)
	}

	pub fn angle(&mut self) -> f64 {
		self.next_f64() * TAU
	}

	/// Uniform direction on the unit sphere (Marsaglia).
	pub fn unit_direction(&mut self) -> DVec3 {
		loop {
			let x = self.range(-1.0, 1.0);
			let y = self.range(-1.0, 1.0);
			let s = x * x + y * y;
			if s < 1.0 {
				let factor = 2.0 * (1.0 - s).sqrt();
				return DVec3::new(x * factor, y * factor, 1.0 - 2.0 * s);
			}
		}
	}
}
