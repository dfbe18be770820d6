//! Sphere geometry and per-bubble surface deformation.
//!
//! Every bubble shares one immutable unit [`SphereMesh`] and owns a
//! [`SurfaceBuffer`] holding its deformed copy. Targets are always computed
//! from the original vertices, so repeated deformation never accumulates
//! error in the reference shape.

use glam::DVec3;

use crate::physics::EPSILON;

/// Unit UV sphere.
#[derive(Clone, Debug)]
pub struct SphereMesh {
	vertices: Vec<DVec3>,
	triangles: Vec<[usize; 3]>,
}

impl SphereMesh {
	/// `segments` around the equator, `rings` from pole to pole.
	pub fn uv(segments: usize, rings: usize) -> Self {
		let (segments, rings) = (segments.max(3), rings.max(2));
		let mut vertices = Vec::with_capacity((segments + 1) * (rings + 1));
		for ring in 0..=rings {
			let theta = ring as f64 / rings as f64 * std::f64::consts::PI;
			let (sin_theta, cos_theta) = theta.sin_cos();
			for segment in 0..=segments {
				let phi = segment as f64 / segments as f64 * std::f64::consts::TAU;
				let (sin_phi, cos_phi) = phi.sin_cos();
				vertices.push(DVec3::new(sin_theta * cos_phi, cos_theta, sin_theta * sin_phi));
			}
		}

		let stride = segments + 1;
		let mut triangles = Vec::with_capacity(segments * rings * 2);
		for ring in 0..rings {
			for segment in 0..segments {
				let a = ring * stride + segment;
				let b = a + stride;
				if ring != 0 {
					triangles.push([a, a + 1, b]);
				}
				if ring != rings - 1 {
					triangles.push([a + 1, b + 1, b]);
				}
			}
		}
		Self {
			vertices,
			triangles,
		}
	}

	pub fn vertices(&self) -> &[DVec3] {
		&self.vertices
	}

	pub fn triangles(&self) -> &[[usize; 3]] {
		&self.triangles
	}
}

/// Working copy of a mesh: deformed positions and their normals.
#[derive(Clone, Debug)]
pub struct SurfaceBuffer {
	pub working: Vec<DVec3>,
	pub normals: Vec<DVec3>,
}

impl SurfaceBuffer {
	pub fn new(mesh: &SphereMesh) -> Self {
		Self {
			working: mesh.vertices().to_vec(),
			normals: mesh.vertices().to_vec(),
		}
	}
}

/// Ease each working vertex towards `target(original)` by `blend`.
pub fn deform(
	original: &[DVec3],
	working: &mut [DVec3],
	target: impl Fn(DVec3) -> DVec3,
	blend: f64,
) {
	for (rest, current) in original.iter().zip(working.iter_mut()) {
		*current = current.lerp(target(*rest), blend);
	}
}

/// Inputs to the wobble/stretch target for one bubble.
#[derive(Clone, Copy, Debug)]
pub struct Wobble {
	pub time: f64,
	/// Per-bubble phase offset.
	pub phase: f64,
	pub amplitude: f64,
	/// Stretch direction times magnitude; zero when not hovered.
	pub stretch: DVec3,
}

impl Wobble {
	pub fn target(&self, vertex: DVec3) -> DVec3 {
		let t = self.time + self.phase;
		let wobble = (vertex.x * 2.0 + t * 2.0).sin() * (vertex.y * 2.0 + t * 1.5).sin();
		let mut target = vertex * (1.0 + wobble * self.amplitude);
		let magnitude = self.stretch.length();
		if magnitude > EPSILON {
			let direction = self.stretch / magnitude;
			target += direction * (vertex.dot(direction) * magnitude);
		}
		target
	}
}

/// Area-weighted vertex normals from the current triangle positions.
pub fn compute_normals(triangles: &[[usize; 3]], positions: &[DVec3], normals: &mut [DVec3]) {
	normals.iter_mut().for_each(|n| *n = DVec3::ZERO);
	for &[a, b, c] in triangles {
		let face = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
		normals[a] += face;
		normals[b] += face;
		normals[c] += face;
	}
	for (normal, position) in normals.iter_mut().zip(positions) {
		*normal = normal.try_normalize().unwrap_or_else(|| position.normalize_or(DVec3::Y));
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn uv_sphere_vertices_lie_on_unit_sphere() {
		let mesh = SphereMesh::uv(12, 8);
		assert_eq!(mesh.vertices().len(), 13 * 9);
		assert!(mesh.vertices().iter().all(|v| (v.length() - 1.0).abs() < 1e-9));
		assert_eq!(mesh.triangles().len(), 12 * 2 * (8 - 1));
	}

	#[test]
	fn deform_keeps_original_and_converges() {
		let mesh = SphereMesh::uv(8, 6);
		let mut surface = SurfaceBuffer::new(&mesh);
		for _ in 0..200 {
			deform(mesh.vertices(), &mut surface.working, |v| v * 1.5, 0.1);
		}
		assert!(mesh.vertices().iter().all(|v| (v.length() - 1.0).abs() < 1e-9));
		assert!(surface.working.iter().all(|v| (v.length() - 1.5).abs() < 1e-6));
	}

	#[test]
	fn zero_amplitude_wobble_is_identity() {
		let wobble = Wobble {
			time: 3.0,
			phase: 1.0,
			amplitude: 0.0,
			stretch: DVec3::ZERO,
		};
		let v = DVec3::new(0.6, 0.8, 0.0);
		assert_eq!(wobble.target(v), v);
	}

	#[test]
	fn stretch_elongates_along_direction() {
		let wobble = Wobble {
			time: 0.0,
			phase: 0.0,
			amplitude: 0.0,
			stretch: DVec3::new(0.3, 0.0, 0.0),
		};
		assert!((wobble.target(DVec3::X).x - 1.3).abs() < 1e-9);
		assert!((wobble.target(DVec3::NEG_X).x + 1.3).abs() < 1e-9);
		assert_eq!(wobble.target(DVec3::Y), DVec3::Y);
	}

	#[test]
	fn sphere_normals_point_outwards() {
		let mesh = SphereMesh::uv(16, 12);
		let mut surface = SurfaceBuffer::new(&mesh);
		compute_normals(mesh.triangles(), &surface.working, &mut surface.normals);
		for (normal, vertex) in surface.normals.iter().zip(mesh.vertices()) {
			assert!(normal.dot(*vertex) > 0.9);
		}
	}
}
