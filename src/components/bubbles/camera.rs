//! Perspective camera and ray casting for the bubble scene.
//!
//! The camera sits on the +z axis looking at the origin; the simulation plane
//! is z = 0. Screen coordinates are canvas pixels with y pointing down.

use glam::{DMat4, DVec2, DVec3, DVec4};

use crate::physics::EPSILON;

/// A half-line in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
	pub origin: DVec3,
	/// Unit length.
	pub direction: DVec3,
}

impl Ray {
	pub fn at(&self, t: f64) -> DVec3 {
		self.origin + self.direction * t
	}

	/// Intersection with the plane z = `z`, if in front of the origin.
	pub fn intersect_plane_z(&self, z: f64) -> Option<DVec3> {
		if self.direction.z.abs() < EPSILON {
			return None;
		}
		let t = (z - self.origin.z) / self.direction.z;
		(t >= 0.0).then(|| self.at(t))
	}

	/// Distance along the ray to the nearest sphere hit in front of the origin.
	pub fn intersect_sphere(&self, center: DVec3, radius: f64) -> Option<f64> {
		let offset = self.origin - center;
		let b = offset.dot(self.direction);
		let c = offset.length_squared() - radius * radius;
		let discriminant = b * b - c;
		if discriminant < 0.0 {
			return None;
		}
		let root = discriminant.sqrt();
		let near = -b - root;
		let far = -b + root;
		if near >= 0.0 {
			Some(near)
		} else if far >= 0.0 {
			Some(far)
		} else {
			None
		}
	}
}

/// Where a world point lands on screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projected {
	pub screen: DVec2,
	/// Distance from the eye along the view axis.
	pub depth: f64,
	/// Screen pixels per world unit at this depth.
	pub scale: f64,
}

#[derive(Clone, Debug)]
pub struct Camera {
	eye: DVec3,
	fov_y: f64,
	width: f64,
	height: f64,
	view: DMat4,
	view_projection: DMat4,
	inverse: DMat4,
}

impl Camera {
	/// Camera at `(0, 0, distance)` looking at the origin.
	pub fn new(distance: f64, fov_y: f64, width: f64, height: f64) -> Self {
		let mut camera = Self {
			eye: DVec3::new(0.0, 0.0, distance),
			fov_y,
			width: 1.0,
			height: 1.0,
			view: DMat4::IDENTITY,
			view_projection: DMat4::IDENTITY,
			inverse: DMat4::IDENTITY,
		};
		camera.resize(width, height);
		camera
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width.max(1.0);
		self.height = height.max(1.0);
		self.view = DMat4::look_at_rh(self.eye, DVec3::ZERO, DVec3::Y);
		let projection = DMat4::perspective_rh(self.fov_y, self.width / self.height, 0.1, 1000.0);
		self.view_projection = projection * self.view;
		self.inverse = self.view_projection.inverse();
	}

	pub fn eye(&self) -> DVec3 {
		self.eye
	}

	/// Canvas pixels to normalized device coordinates in [-1, 1].
	pub fn ndc_from_screen(&self, screen: DVec2) -> DVec2 {
		DVec2::new(
			screen.x / self.width * 2.0 - 1.0,
			1.0 - screen.y / self.height * 2.0,
		)
	}

	pub fn ray_from_ndc(&self, ndc: DVec2) -> Ray {
		let near = self.inverse.project_point3(DVec3::new(ndc.x, ndc.y, 0.0));
		let far = self.inverse.project_point3(DVec3::new(ndc.x, ndc.y, 1.0));
		Ray {
			origin: near,
			direction: (far - near).normalize_or(DVec3::NEG_Z),
		}
	}

	pub fn ray_from_screen(&self, screen: DVec2) -> Ray {
		self.ray_from_ndc(self.ndc_from_screen(screen))
	}

	/// `None` for points behind the eye.
	pub fn project(&self, world: DVec3) -> Option<Projected> {
		let clip = self.view_projection * DVec4::new(world.x, world.y, world.z, 1.0);
		if clip.w <= EPSILON {
			return None;
		}
		let ndc = clip.truncate() / clip.w;
		let depth = -self.view.transform_point3(world).z;
		let focal = self.height * 0.5 / (self.fov_y * 0.5).tan();
		Some(Projected {
			screen: DVec2::new(
				(ndc.x + 1.0) * 0.5 * self.width,
				(1.0 - ndc.y) * 0.5 * self.height,
			),
			depth,
			scale: focal / depth.max(EPSILON),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn camera() -> Camera {
		Camera::new(60.0, 45f64.to_radians(), 800.0, 600.0)
	}

	#[test]
	fn center_ray_hits_origin() {
		let camera = camera();
		let ray = camera.ray_from_screen(DVec2::new(400.0, 300.0));
		let hit = ray.intersect_plane_z(0.0).unwrap();
		assert!(hit.length() < 1e-6);
	}

	#[test]
	fn projection_inverts_unprojection() {
		let camera = camera();
		let screen = DVec2::new(620.0, 130.0);
		let hit = camera
			.ray_from_screen(screen)
			.intersect_plane_z(0.0)
			.unwrap();
		let projected = camera.project(hit).unwrap();
		assert!(projected.screen.distance(screen) < 1e-6);
		assert!((projected.depth - 60.0).abs() < 1e-6);
	}

	#[test]
	fn screen_y_points_down() {
		let camera = camera();
		let above = camera.project(DVec3::new(0.0, 5.0, 0.0)).unwrap();
		assert!(above.screen.y < 300.0);
	}

	#[test]
	fn sphere_hit_distance() {
		let ray = Ray {
			origin: DVec3::new(0.0, 0.0, 10.0),
			direction: DVec3::NEG_Z,
		};
		assert!((ray.intersect_sphere(DVec3::ZERO, 2.0).unwrap() - 8.0).abs() < 1e-9);
		assert!(ray.intersect_sphere(DVec3::new(5.0, 0.0, 0.0), 2.0).is_none());
	}

	#[test]
	fn parallel_ray_misses_plane() {
		let ray = Ray {
			origin: DVec3::new(0.0, 0.0, 10.0),
			direction: DVec3::X,
		};
		assert!(ray.intersect_plane_z(0.0).is_none());
	}
}
