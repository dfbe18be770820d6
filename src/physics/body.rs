//! Point-mass bodies shared by the 2D particle fields and the 3D bubble world.
//!
//! Integration is semi-implicit Euler:
//!
//! ```text
//! velocity += force
//! velocity *= friction
//! position += velocity
//! ```
//!
//! Every quantity is expressed per 60 Hz frame. Callers pass `frames`
//! (elapsed time in 60 Hz frames) so a 120 Hz display advances half as far
//! per callback instead of running the simulation twice as fast.

use std::ops::{Add, AddAssign, Mul, MulAssign, Sub};

use glam::{DVec2, DVec3};

/// Distances below this are treated as coincident points.
pub const EPSILON: f64 = 1e-6;

/// Minimal vector algebra needed by [`PointMass`].
pub trait Vector:
	Copy
	+ Default
	+ Add<Output = Self>
	+ Sub<Output = Self>
	+ Mul<f64, Output = Self>
	+ AddAssign
	+ MulAssign<f64>
{
	/// Euclidean length.
	fn length(self) -> f64;
	/// True when every component is finite.
	fn is_finite(self) -> bool;
}

impl Vector for DVec2 {
	fn length(self) -> f64 {
		DVec2::length(self)
	}

	fn is_finite(self) -> bool {
		DVec2::is_finite(self)
	}
}

impl Vector for DVec3 {
	fn length(self) -> f64 {
		DVec3::length(self)
	}

	fn is_finite(self) -> bool {
		DVec3::is_finite(self)
	}
}

/// A simulated body with a rest position it may be pulled back towards.
#[derive(Clone, Debug, Default)]
pub struct PointMass<V> {
	pub position: V,
	/// Rest position. Restoring forces ease the body back here.
	pub origin: V,
	pub velocity: V,
}

impl<V: Vector> PointMass<V> {
	/// A body at rest on its origin.
	pub fn at(position: V) -> Self {
		Self {
			position,
			origin: position,
			velocity: V::default(),
		}
	}

	/// A body at `position` with an initial velocity.
	pub fn moving(position: V, velocity: V) -> Self {
		Self {
			position,
			origin: position,
			velocity,
		}
	}

	/// Advance one step with the summed force contributions for this frame.
	///
	/// A non-finite result puts the body back on its origin at rest.
	pub fn integrate(&mut self, force: V, friction: f64, frames: f64) {
		self.velocity += force * frames;
		self.velocity *= friction.powf(frames);
		self.position += self.velocity * frames;

		if !self.position.is_finite() || !self.velocity.is_finite() {
			self.position = self.origin;
			self.velocity = V::default();
		}
	}

	/// Spring force towards the origin.
	pub fn restoring_force(&self, stiffness: f64) -> V {
		(self.origin - self.position) * stiffness
	}

	pub fn speed(&self) -> f64 {
		self.velocity.length()
	}

	/// Scale velocity down to `max_speed` if it exceeds it.
	pub fn clamp_speed(&mut self, max_speed: f64) {
		let speed = self.speed();
		if speed > max_speed && speed > EPSILON {
			self.velocity *= max_speed / speed;
		}
	}
}

/// Force on a body at `body` from a source at `source` with linear falloff.
///
/// Magnitude is `strength * (radius - d) / radius` inside `radius`, pointing
/// away from the source for positive strength. Returns zero outside the
/// radius and when the two points coincide.
pub fn falloff_force<V: Vector>(body: V, source: V, radius: f64, strength: f64) -> V {
	let delta = body - source;
	let distance = delta.length();
	if distance < EPSILON || distance >= radius {
		return V::default();
	}
	let falloff = (radius - distance) / radius;
	delta * (strength * falloff / distance)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn integrate_applies_force_then_friction() {
		let mut body = PointMass::at(DVec2::ZERO);
		body.integrate(DVec2::new(1.0, 0.0), 0.5, 1.0);
		assert_eq!(body.velocity, DVec2::new(0.5, 0.0));
		assert_eq!(body.position, DVec2::new(0.5, 0.0));
	}

	#[test]
	fn restoring_force_converges_to_origin() {
		let mut body = PointMass::at(DVec3::new(1.0, -2.0, 3.0));
		body.position = DVec3::new(40.0, 25.0, -30.0);
		body.velocity = DVec3::new(3.0, -1.0, 2.0);
		for _ in 0..600 {
			let force = body.restoring_force(0.05);
			body.integrate(force, 0.9, 1.0);
		}
		assert!(body.position.distance(body.origin) < 1e-3);
	}

	#[test]
	fn non_finite_state_resets_to_origin() {
		let mut body = PointMass::at(DVec2::new(3.0, 4.0));
		body.integrate(DVec2::new(f64::NAN, 0.0), 0.9, 1.0);
		assert_eq!(body.position, DVec2::new(3.0, 4.0));
		assert_eq!(body.velocity, DVec2::ZERO);
	}

	#[test]
	fn falloff_is_zero_for_coincident_points() {
		let force = falloff_force(DVec2::new(5.0, 5.0), DVec2::new(5.0, 5.0), 10.0, 1.0);
		assert_eq!(force, DVec2::ZERO);
	}

	#[test]
	fn falloff_is_linear_inside_radius() {
		let near = falloff_force(DVec2::new(2.0, 0.0), DVec2::ZERO, 10.0, 1.0);
		let far = falloff_force(DVec2::new(8.0, 0.0), DVec2::ZERO, 10.0, 1.0);
		assert!((near.x - 0.8).abs() < 1e-9);
		assert!((far.x - 0.2).abs() < 1e-9);
		assert_eq!(falloff_force(DVec2::new(10.0, 0.0), DVec2::ZERO, 10.0, 1.0), DVec2::ZERO);
	}

	#[test]
	fn clamp_speed_preserves_direction() {
		let mut body = PointMass::moving(DVec2::ZERO, DVec2::new(3.0, 4.0));
		body.clamp_speed(1.0);
		assert!((body.speed() - 1.0).abs() < 1e-9);
		assert!((body.velocity.x - 0.6).abs() < 1e-9);
	}
}
