//! Particle Field Engine.
//!
//! Owns a fixed set of [`Particle`]s seeded from a [`SeedStrategy`] and
//! advances them once per frame under pointer influence, ambient drift,
//! optional restoring springs, scroll dissipation and edge wrapping.
//!
//! Fields are meant for hundreds to a few thousand particles; every step is
//! linear in the particle count.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::frame::FrameTime;
use crate::physics::{FieldRng, PointMass, falloff_force, pseudo_random};

/// Direction of the pointer force.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerMode {
	/// Push particles away from the pointer.
	#[default]
	Repel,
	/// Pull particles towards the pointer.
	Attract,
}

/// What happens at the canvas edges.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeMode {
	/// Positions are reduced modulo the canvas size.
	#[default]
	Wrap,
	/// Particles may leave the canvas (restoring springs bring them back).
	Free,
}

/// Tuning for one particle field. All forces are per 60 Hz frame.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct FieldConfig {
	/// Particle count for uniform seeding.
	pub count: usize,
	/// Cell size for grid seeding.
	pub grid_spacing: f64,
	pub pointer_mode: PointerMode,
	/// Influence radius around the pointer in pixels.
	pub pointer_radius: f64,
	/// Force at zero distance; falls off linearly to the radius.
	pub pointer_strength: f64,
	/// Velocity retained per frame, in (0, 1).
	pub friction: f64,
	/// Restoring spring stiffness towards each particle's origin, 0 disables.
	pub spring: f64,
	pub drift_amplitude: f64,
	/// Drift angular speed in radians per second.
	pub drift_speed: f64,
	/// Initial speed for freshly seeded particles.
	pub initial_speed: f64,
	pub edge: EdgeMode,
	/// Speed limit at the top of the page, `None` for unlimited.
	pub max_speed: Option<f64>,
	/// Extra speed allowance per unit of scroll progress.
	pub max_speed_scroll_gain: f64,
	/// Scroll intensity above which particles start to dissipate.
	pub dissipation_threshold: f64,
	pub dissipation_strength: f64,
	pub size_min: f64,
	pub size_max: f64,
	pub opacity: f64,
	pub seed: u32,
}

impl FieldConfig {
	/// Slow drifting background dust.
	pub fn ambient() -> Self {
		Self {
			count: 140,
			grid_spacing: 40.0,
			pointer_mode: PointerMode::Repel,
			pointer_radius: 120.0,
			pointer_strength: 0.35,
			friction: 0.985,
			spring: 0.0,
			drift_amplitude: 0.012,
			drift_speed: 0.6,
			initial_speed: 0.35,
			edge: EdgeMode::Wrap,
			max_speed: Some(1.2),
			max_speed_scroll_gain: 2.0,
			dissipation_threshold: 0.8,
			dissipation_strength: 0.06,
			size_min: 0.6,
			size_max: 2.2,
			opacity: 0.7,
			seed: 0x5eed_0001,
		}
	}

	/// Particles that settle onto sampled text and scatter from the pointer.
	pub fn text() -> Self {
		Self {
			count: 0,
			grid_spacing: 8.0,
			pointer_mode: PointerMode::Repel,
			pointer_radius: 90.0,
			pointer_strength: 2.4,
			friction: 0.88,
			spring: 0.045,
			drift_amplitude: 0.0,
			drift_speed: 0.0,
			initial_speed: 0.0,
			edge: EdgeMode::Free,
			max_speed: None,
			max_speed_scroll_gain: 0.0,
			dissipation_threshold: 1.2,
			dissipation_strength: 0.5,
			size_min: 1.2,
			size_max: 2.4,
			opacity: 0.95,
			seed: 0x5eed_0002,
		}
	}

	/// A grid that leans towards the cursor.
	pub fn cursor() -> Self {
		Self {
			count: 0,
			grid_spacing: 28.0,
			pointer_mode: PointerMode::Attract,
			pointer_radius: 160.0,
			pointer_strength: 0.9,
			friction: 0.86,
			spring: 0.06,
			drift_amplitude: 0.0,
			drift_speed: 0.0,
			initial_speed: 0.0,
			edge: EdgeMode::Free,
			max_speed: None,
			max_speed_scroll_gain: 0.0,
			dissipation_threshold: 2.0,
			dissipation_strength: 0.0,
			size_min: 1.0,
			size_max: 1.6,
			opacity: 0.5,
			seed: 0x5eed_0003,
		}
	}
}

impl Default for FieldConfig {
	fn default() -> Self {
		Self::ambient()
	}
}

/// How initial particle positions are chosen.
#[derive(Clone, Debug, PartialEq)]
pub enum SeedStrategy {
	/// `count` positions uniformly over the canvas.
	Uniform { count: usize },
	/// One particle per grid cell centre.
	Grid { spacing: f64 },
	/// Explicit positions, typically from the text sampler.
	Mask(Vec<DVec2>),
}

/// A single particle.
#[derive(Clone, Debug)]
pub struct Particle {
	pub body: PointMass<DVec2>,
	pub size: f64,
	pub alpha: f64,
	/// Idle motion and twinkle phase.
	pub phase: f64,
	/// Offset into the color gradient.
	pub tint: f64,
}

/// Per-frame inputs, copied from the listeners before each step.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FieldInput {
	pub pointer: Option<DVec2>,
	pub scroll_intensity: f64,
	/// Scroll position as a fraction of the page, in [0, 1].
	pub scroll_progress: f64,
}

/// A fixed-size particle field on a `width` x `height` canvas.
pub struct ParticleField {
	config: FieldConfig,
	particles: Vec<Particle>,
	width: f64,
	height: f64,
	time: f64,
}

impl ParticleField {
	pub fn new(config: FieldConfig) -> Self {
		Self {
			config,
			particles: Vec::new(),
			width: 0.0,
			height: 0.0,
			time: 0.0,
		}
	}

	/// Replace every particle with a fresh set seeded from `seed`.
	pub fn initialize(&mut self, seed: &SeedStrategy, width: f64, height: f64) {
		let cfg = &self.config;
		let mut rng = FieldRng::new(cfg.seed);
		let positions: Vec<DVec2> = match seed {
			SeedStrategy::Uniform { count } => (0..*count)
				.map(|_| DVec2::new(rng.range(0.0, width), rng.range(0.0, height)))
				.collect(),
			SeedStrategy::Grid { spacing } => grid_points(width, height, *spacing),
			SeedStrategy::Mask(points) => points.clone(),
		};

		self.particles.clear();
		self.particles.reserve(positions.len());
		for position in positions {
			let velocity = if cfg.initial_speed > 0.0 {
				let angle = rng.angle();
				let speed = cfg.initial_speed * rng.range(0.5, 1.0);
				DVec2::new(angle.cos(), angle.sin()) * speed
			} else {
				DVec2::ZERO
			};
			self.particles.push(Particle {
				body: PointMass::moving(position, velocity),
				size: rng.range(cfg.size_min, cfg.size_max.max(cfg.size_min)),
				alpha: cfg.opacity * rng.range(0.3, 1.0),
				phase: rng.angle(),
				tint: rng.range(-0.08, 0.08),
			});
		}

		self.width = width;
		self.height = height;
		self.time = 0.0;
	}

	/// Advance every particle by one frame.
	pub fn step(&mut self, input: &FieldInput, time: FrameTime) {
		let cfg = &self.config;
		self.time += time.dt;

		let pointer_sign = match cfg.pointer_mode {
			PointerMode::Repel => 1.0,
			PointerMode::Attract => -1.0,
		};
		let radius_sq = cfg.pointer_radius * cfg.pointer_radius;
		let dissipation = (input.scroll_intensity - cfg.dissipation_threshold).max(0.0)
			* cfg.dissipation_strength;
		let speed_gain = 1.0 + input.scroll_progress.clamp(0.0, 1.0) * cfg.max_speed_scroll_gain;
		let max_speed = cfg.max_speed.map(|max| max * speed_gain);
		let scatter_epoch = (self.time * 4.0).floor();

		for (i, p) in self.particles.iter_mut().enumerate() {
			let mut force = p.body.restoring_force(cfg.spring);

			if let Some(pointer) = input.pointer {
				if p.body.position.distance_squared(pointer) < radius_sq {
					force += falloff_force(
						p.body.position,
						pointer,
						cfg.pointer_radius,
						cfg.pointer_strength * pointer_sign,
					);
				}
			}

			if cfg.drift_amplitude > 0.0 {
				let t = self.time * cfg.drift_speed + p.phase;
				force += DVec2::new(t.sin(), (t * 0.8 + p.phase).cos()) * cfg.drift_amplitude;
			}

			if dissipation > 0.0 {
				let scatter = pseudo_random(i as f64 * 3.17 + scatter_epoch) - 0.5;
				force += DVec2::new(scatter, 1.0) * dissipation;
			}

			p.body.integrate(force, cfg.friction, time.frames);

			if let Some(max) = max_speed {
				p.body.clamp_speed(max);
			}

			if cfg.edge == EdgeMode::Wrap {
				p.body.position = wrap(p.body.position, self.width, self.height);
			}
		}
	}

	pub fn particles(&self) -> &[Particle] {
		&self.particles
	}

	pub fn config(&self) -> &FieldConfig {
		&self.config
	}

	pub fn width(&self) -> f64 {
		self.width
	}

	pub fn height(&self) -> f64 {
		self.height
	}

	/// Twinkle-modulated alpha for a particle.
	pub fn twinkle_alpha(&self, particle: &Particle, speed: f64) -> f64 {
		let twinkle = ((self.time * speed + particle.phase).sin() * 0.5 + 0.5) * 0.4 + 0.6;
		particle.alpha * twinkle
	}
}

/// Grid cells never shrink below this many pixels.
const MIN_GRID_SPACING: f64 = 1.0;
/// Grid seeding stops after this many cells.
pub const MAX_GRID_POINTS: usize = 4000;

fn grid_points(width: f64, height: f64, spacing: f64) -> Vec<DVec2> {
	if spacing.is_nan() || spacing <= 0.0 || width <= 0.0 || height <= 0.0 {
		return Vec::new();
	}
	let spacing = spacing.max(MIN_GRID_SPACING);
	let (cols, rows) = ((width / spacing).floor(), (height / spacing).floor());
	let (cols, rows) = (cols as usize, rows as usize);
	let mut points = Vec::with_capacity(cols.saturating_mul(rows).min(MAX_GRID_POINTS));
	'rows: for row in 0..rows {
		for col in 0..cols {
			if points.len() == MAX_GRID_POINTS {
				break 'rows;
			}
			points.push(DVec2::new(
				(col as f64 + 0.5) * spacing,
				(row as f64 + 0.5) * spacing,
			));
		}
	}
	points
}

fn wrap(position: DVec2, width: f64, height: f64) -> DVec2 {
	let axis = |v: f64, bound: f64| {
		if bound <= 0.0 {
			return v;
		}
		let wrapped = v.rem_euclid(bound);
		// rem_euclid can round up to `bound` for tiny negative inputs
		if wrapped >= bound { 0.0 } else { wrapped }
	};
	DVec2::new(axis(position.x, width), axis(position.y, height))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn still_config() -> FieldConfig {
		FieldConfig {
			drift_amplitude: 0.0,
			pointer_radius: 15.0,
			pointer_strength: 1.0,
			..FieldConfig::text()
		}
	}

	fn line_of_three(config: FieldConfig) -> ParticleField {
		let mut field = ParticleField::new(config);
		let seeds = vec![DVec2::new(0.0, 0.0), DVec2::new(10.0, 0.0), DVec2::new(20.0, 0.0)];
		field.initialize(&SeedStrategy::Mask(seeds), 100.0, 100.0);
		field
	}

	fn pointer_at(x: f64, y: f64) -> FieldInput {
		FieldInput {
			pointer: Some(DVec2::new(x, y)),
			..FieldInput::default()
		}
	}

	#[test]
	fn repulsion_pushes_neighbours_away_and_guards_coincident_body() {
		let mut field = line_of_three(still_config());
		field.step(&pointer_at(10.0, 0.0), FrameTime::reference(0.0));
		let p = field.particles();
		assert!(p[0].body.position.x < 0.0);
		assert!(p[2].body.position.x > 20.0);
		assert!((p[1].body.position.x - 10.0).abs() < 1e-9);
		assert!(p[1].body.position.is_finite());
	}

	#[test]
	fn attraction_pulls_neighbours_in() {
		let config = FieldConfig {
			pointer_mode: PointerMode::Attract,
			..still_config()
		};
		let mut field = line_of_three(config);
		field.step(&pointer_at(10.0, 0.0), FrameTime::reference(0.0));
		let p = field.particles();
		assert!(p[0].body.position.x > 0.0);
		assert!(p[2].body.position.x < 20.0);
		assert!((p[1].body.position.x - 10.0).abs() < 1e-9);
	}

	#[test]
	fn bodies_settle_back_on_their_origins() {
		let mut field = line_of_three(still_config());
		for _ in 0..20 {
			field.step(&pointer_at(12.0, 3.0), FrameTime::reference(0.0));
		}
		for _ in 0..900 {
			field.step(&FieldInput::default(), FrameTime::reference(0.0));
		}
		for p in field.particles() {
			assert!(p.body.position.distance(p.body.origin) < 1e-3);
		}
	}

	#[test]
	fn far_pointer_has_no_effect() {
		let mut field = line_of_three(still_config());
		field.step(&pointer_at(500.0, 500.0), FrameTime::reference(0.0));
		for p in field.particles() {
			assert_eq!(p.body.position, p.body.origin);
		}
	}

	#[test]
	fn ambient_field_wraps_without_touching_velocity() {
		let config = FieldConfig {
			drift_amplitude: 0.0,
			max_speed: None,
			friction: 1.0,
			..FieldConfig::ambient()
		};
		let mut field = ParticleField::new(config);
		field.initialize(&SeedStrategy::Uniform { count: 1 }, 100.0, 50.0);
		field.particles[0].body.position = DVec2::new(99.5, 49.8);
		field.particles[0].body.velocity = DVec2::new(2.0, 1.0);

		field.step(&FieldInput::default(), FrameTime::reference(0.0));

		let p = &field.particles()[0];
		assert!((p.body.position.x - 1.5).abs() < 1e-9);
		assert!((p.body.position.y - 0.8).abs() < 1e-9);
		assert_eq!(p.body.velocity, DVec2::new(2.0, 1.0));
	}

	#[test]
	fn wrapped_positions_stay_inside_bounds() {
		let mut field = ParticleField::new(FieldConfig::ambient());
		field.initialize(&SeedStrategy::Uniform { count: 200 }, 320.0, 180.0);
		let input = FieldInput {
			pointer: Some(DVec2::new(160.0, 90.0)),
			scroll_intensity: 2.5,
			scroll_progress: 1.0,
		};
		for frame in 0..300 {
			field.step(&input, FrameTime::reference(frame as f64 / 60.0));
			for p in field.particles() {
				assert!((0.0..320.0).contains(&p.body.position.x));
				assert!((0.0..180.0).contains(&p.body.position.y));
			}
		}
	}

	#[test]
	fn speed_limit_grows_with_scroll_progress() {
		let config = FieldConfig {
			max_speed: Some(1.0),
			max_speed_scroll_gain: 2.0,
			drift_amplitude: 0.0,
			friction: 1.0,
			..FieldConfig::ambient()
		};
		let mut field = ParticleField::new(config);
		field.initialize(&SeedStrategy::Uniform { count: 1 }, 100.0, 100.0);
		field.particles[0].body.velocity = DVec2::new(10.0, 0.0);

		field.step(&FieldInput::default(), FrameTime::reference(0.0));
		assert!((field.particles()[0].body.speed() - 1.0).abs() < 1e-9);

		field.particles[0].body.velocity = DVec2::new(10.0, 0.0);
		let scrolled = FieldInput {
			scroll_progress: 1.0,
			..FieldInput::default()
		};
		field.step(&scrolled, FrameTime::reference(0.0));
		assert!((field.particles()[0].body.speed() - 3.0).abs() < 1e-9);
	}

	#[test]
	fn fast_scroll_biases_particles_downward() {
		let config = FieldConfig {
			edge: EdgeMode::Free,
			..still_config()
		};
		let mut field = line_of_three(config);
		let input = FieldInput {
			scroll_intensity: 2.5,
			..FieldInput::default()
		};
		field.step(&input, FrameTime::reference(0.0));
		for p in field.particles() {
			assert!(p.body.position.y > 0.0);
		}
	}

	#[test]
	fn zero_particles_is_a_no_op() {
		let mut field = ParticleField::new(FieldConfig::ambient());
		field.initialize(&SeedStrategy::Uniform { count: 0 }, 100.0, 100.0);
		field.step(&pointer_at(1.0, 1.0), FrameTime::reference(0.0));
		assert!(field.particles().is_empty());
	}

	#[test]
	fn reinitialize_discards_previous_velocities() {
		let mut field = ParticleField::new(FieldConfig::text());
		let seeds = SeedStrategy::Mask(vec![DVec2::new(5.0, 5.0)]);
		field.initialize(&seeds, 50.0, 50.0);
		field.step(&pointer_at(6.0, 6.0), FrameTime::reference(0.0));
		assert_ne!(field.particles()[0].body.velocity, DVec2::ZERO);
		field.initialize(&seeds, 80.0, 80.0);
		assert_eq!(field.particles()[0].body.velocity, DVec2::ZERO);
		assert_eq!(field.width(), 80.0);
	}

	#[test]
	fn grid_seeding_fills_cells() {
		let mut field = ParticleField::new(FieldConfig::cursor());
		field.initialize(&SeedStrategy::Grid { spacing: 10.0 }, 100.0, 50.0);
		assert_eq!(field.particles().len(), 50);
		assert_eq!(field.particles()[0].body.position, DVec2::new(5.0, 5.0));
	}

	#[test]
	fn tiny_grid_spacing_is_bounded() {
		let mut field = ParticleField::new(FieldConfig::cursor());
		field.initialize(&SeedStrategy::Grid { spacing: 0.01 }, 1920.0, 1080.0);
		assert_eq!(field.particles().len(), MAX_GRID_POINTS);
		assert_eq!(field.particles()[1].body.position, DVec2::new(1.5, 0.5));
	}
}
