//! Bubble Physics World.
//!
//! One bubble per hobby item floats around the origin on the z = 0 plane.
//! The pointer ray adsorbs nearby bubbles, overlapping bubbles push each
//! other apart, and clicking one bursts it open into the detail view.
//!
//! The world is the single source of truth for view mode and selection. The
//! UI issues commands ([`BubbleWorld::set_mode`], [`BubbleWorld::click`],
//! [`BubbleWorld::open_from_list`], [`BubbleWorld::close`]) and reads back
//! [`WorldEvent`]s with [`BubbleWorld::drain_events`].
//!
//! Collision is an all-pairs pass, fine for the few dozen bubbles a page
//! shows; it is not meant for hundreds.

use glam::DVec3;
use serde::Deserialize;

use super::camera::Ray;
use super::explosion::{Explosion, ExplosionConfig};
use super::mesh::{SphereMesh, SurfaceBuffer, Wobble, compute_normals, deform};
use crate::content::ItemId;
use crate::frame::FrameTime;
use crate::physics::{EPSILON, PointMass, approach, blend};

/// Which presentation of the hobby items is active.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
	#[default]
	Bubbles,
	List,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BubbleState {
	Floating,
	/// Held by the pointer.
	Captured,
	/// Selected; the burst is playing.
	Exploding,
	/// Burst finished, waiting for the detail view to close.
	Hidden,
}

/// Where a selection came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionSource {
	Bubble,
	List,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Selection {
	pub id: ItemId,
	pub source: SelectionSource,
}

/// Notifications produced by commands and steps.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WorldEvent {
	/// The bubble nearest the pointer changed.
	Hovered(Option<ItemId>),
	Selected(Selection),
	Closed(ItemId),
	ModeChanged(ViewMode),
	/// Two bubbles met; `intensity` is in [0, 1].
	Collision { id: ItemId, intensity: f64 },
	/// A bubble slipped out of the pointer's hold.
	Released(ItemId),
}

/// Tuning for the bubble world. Forces are per 60 Hz frame, distances in
/// world units.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct BubbleConfig {
	pub radius: f64,
	/// Collision spacing as a multiple of the summed radii.
	pub packing: f64,
	pub friction: f64,
	pub adsorption_radius: f64,
	pub adsorption_strength: f64,
	/// Extra per-frame damping at the pointer, scaled by proximity.
	pub adsorption_damping: f64,
	/// Pull towards the origin while floating.
	pub center_strength: f64,
	pub jitter_amplitude: f64,
	pub repulsion: f64,
	/// Velocity retained per frame while overlapping another bubble.
	pub collision_damping: f64,
	/// Seconds between collision cues for one bubble.
	pub collision_interval: f64,
	/// Closing speed that maps to full collision intensity.
	pub collision_speed: f64,
	/// Collisions weaker than this are silent.
	pub collision_threshold: f64,
	pub scale_blend: f64,
	pub wobble_amplitude: f64,
	/// Stretch per unit of speed while hovered.
	pub stretch_gain: f64,
	pub max_stretch: f64,
	pub deform_blend: f64,
	pub mesh_segments: usize,
	pub mesh_rings: usize,
	/// Camera distance from the origin along +z.
	pub camera_distance: f64,
	/// Vertical field of view in degrees.
	pub field_of_view: f64,
}

impl Default for BubbleConfig {
	fn default() -> Self {
		Self {
			radius: 3.8,
			packing: 2.1,
			friction: 0.94,
			adsorption_radius: 9.0,
			adsorption_strength: 0.06,
			adsorption_damping: 0.08,
			center_strength: 0.0006,
			jitter_amplitude: 0.0008,
			repulsion: 0.002,
			collision_damping: 0.97,
			collision_interval: 0.15,
			collision_speed: 0.4,
			collision_threshold: 0.05,
			scale_blend: 0.1,
			wobble_amplitude: 0.04,
			stretch_gain: 0.6,
			max_stretch: 0.35,
			deform_blend: 0.15,
			mesh_segments: 18,
			mesh_rings: 12,
			camera_distance: 70.0,
			field_of_view: 45.0,
		}
	}
}

#[derive(Clone, Debug)]
pub struct Bubble {
	pub id: ItemId,
	pub body: PointMass<DVec3>,
	/// In [0, 1].
	pub scale: f64,
	pub state: BubbleState,
	pub hovered: bool,
	/// World time of the last collision cue, in seconds.
	pub last_collision: f64,
	pub surface: SurfaceBuffer,
	index: usize,
}

impl Bubble {
	/// Takes part in forces, hover and picking.
	fn is_active(&self) -> bool {
		matches!(self.state, BubbleState::Floating | BubbleState::Captured)
	}

	fn selected(&self) -> bool {
		matches!(self.state, BubbleState::Exploding | BubbleState::Hidden)
	}
}

/// Per-frame inputs, copied from the listeners before each step.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WorldInput {
	/// Ray under the pointer, `None` when the pointer is away.
	pub pointer_ray: Option<Ray>,
}

pub struct BubbleWorld {
	config: BubbleConfig,
	mesh: SphereMesh,
	bubbles: Vec<Bubble>,
	explosion: Explosion,
	mode: ViewMode,
	selection: Option<Selection>,
	hovered: Option<ItemId>,
	events: Vec<WorldEvent>,
	time: f64,
}

/// Spiral layout around the origin, roughly `spacing` apart.
fn initial_position(index: usize, spacing: f64) -> DVec3 {
	const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;
	if index == 0 {
		return DVec3::ZERO;
	}
	let angle = index as f64 * GOLDEN_ANGLE;
	let distance = spacing * 0.5 * (index as f64).sqrt();
	DVec3::new(angle.cos() * distance, angle.sin() * distance, 0.0)
}

impl BubbleWorld {
	pub fn new(
		ids: impl IntoIterator<Item = ItemId>,
		config: BubbleConfig,
		explosion: ExplosionConfig,
	) -> Self {
		let mesh = SphereMesh::uv(config.mesh_segments, config.mesh_rings);
		let spacing = config.radius * 2.0 * config.packing;
		let bubbles = ids
			.into_iter()
			.enumerate()
			.map(|(index, id)| Bubble {
				id,
				body: PointMass::at(initial_position(index, spacing)),
				scale: 0.0,
				state: BubbleState::Floating,
				hovered: false,
				last_collision: f64::NEG_INFINITY,
				surface: SurfaceBuffer::new(&mesh),
				index,
			})
			.collect();
		Self {
			config,
			mesh,
			bubbles,
			explosion: Explosion::new(explosion),
			mode: ViewMode::Bubbles,
			selection: None,
			hovered: None,
			events: Vec::new(),
			time: 0.0,
		}
	}

	pub fn bubbles(&self) -> &[Bubble] {
		&self.bubbles
	}

	pub fn mesh(&self) -> &SphereMesh {
		&self.mesh
	}

	pub fn explosion(&self) -> &Explosion {
		&self.explosion
	}

	pub fn config(&self) -> &BubbleConfig {
		&self.config
	}

	pub fn mode(&self) -> ViewMode {
		self.mode
	}

	pub fn selection(&self) -> Option<Selection> {
		self.selection
	}

	pub fn hovered(&self) -> Option<ItemId> {
		self.hovered
	}

	/// World time in seconds.
	pub fn time(&self) -> f64 {
		self.time
	}

	/// Rendered radius of a bubble.
	pub fn visual_radius(&self, bubble: &Bubble) -> f64 {
		self.config.radius * bubble.scale
	}

	pub fn drain_events(&mut self) -> Vec<WorldEvent> {
		std::mem::take(&mut self.events)
	}

	pub fn set_mode(&mut self, mode: ViewMode) {
		if mode == self.mode {
			return;
		}
		self.mode = mode;
		if mode == ViewMode::List {
			for bubble in &mut self.bubbles {
				bubble.hovered = false;
				if bubble.state == BubbleState::Captured {
					bubble.state = BubbleState::Floating;
				}
			}
			self.set_hovered(None);
		}
		self.events.push(WorldEvent::ModeChanged(mode));
	}

	/// Select the bubble under `ray` and burst it open at the hit point.
	///
	/// Does nothing in list mode or while another item is open.
	pub fn click(&mut self, ray: &Ray) -> Option<ItemId> {
		if self.mode != ViewMode::Bubbles || self.selection.is_some() {
			return None;
		}
		let radius = self.config.radius;
		let (index, distance) = self
			.bubbles
			.iter()
			.enumerate()
			.filter(|(_, b)| b.is_active() && b.scale > 0.05)
			.filter_map(|(i, b)| {
				ray.intersect_sphere(b.body.position, radius * b.scale)
					.map(|t| (i, t))
			})
			.min_by(|a, b| a.1.total_cmp(&b.1))?;

		let bubble = &mut self.bubbles[index];
		bubble.state = BubbleState::Exploding;
		bubble.hovered = false;
		let id = bubble.id;
		self.explosion.trigger(ray.at(distance));
		self.select(Selection {
			id,
			source: SelectionSource::Bubble,
		});
		if self.hovered == Some(id) {
			self.set_hovered(None);
		}
		Some(id)
	}

	/// Open an item directly, without a burst.
	pub fn open_from_list(&mut self, id: ItemId) -> bool {
		if self.selection.is_some() {
			return false;
		}
		self.select(Selection {
			id,
			source: SelectionSource::List,
		});
		true
	}

	/// Close the open item, if any, and let its bubble return.
	pub fn close(&mut self) -> Option<ItemId> {
		let selection = self.selection.take()?;
		for bubble in &mut self.bubbles {
			if bubble.id == selection.id && bubble.selected() {
				bubble.state = BubbleState::Floating;
			}
		}
		self.explosion.close();
		self.events.push(WorldEvent::Closed(selection.id));
		Some(selection.id)
	}

	fn select(&mut self, selection: Selection) {
		self.selection = Some(selection);
		self.events.push(WorldEvent::Selected(selection));
	}

	fn set_hovered(&mut self, id: Option<ItemId>) {
		if self.hovered != id {
			self.hovered = id;
			self.events.push(WorldEvent::Hovered(id));
		}
	}

	pub fn step(&mut self, input: &WorldInput, time: FrameTime) {
		self.time += time.dt;
		let frames = time.frames;

		self.ease_scales(frames);
		if self.mode == ViewMode::Bubbles {
			let target = input.pointer_ray.and_then(|ray| ray.intersect_plane_z(0.0));
			self.integrate(target, frames);
		}
		self.deform_surfaces(frames);

		self.explosion.tick(frames);
		if self.explosion.progress() > 0.95 {
			for bubble in &mut self.bubbles {
				if bubble.state == BubbleState::Exploding {
					bubble.state = BubbleState::Hidden;
				}
			}
		}
	}

	fn ease_scales(&mut self, frames: f64) {
		let list = self.mode == ViewMode::List;
		for bubble in &mut self.bubbles {
			let target = if list || bubble.selected() { 0.0 } else { 1.0 };
			let scale = approach(bubble.scale, target, self.config.scale_blend, frames);
			bubble.scale = scale.clamp(0.0, 1.0);
		}
	}

	fn integrate(&mut self, pointer: Option<DVec3>, frames: f64) {
		let config = &self.config;
		let count = self.bubbles.len();
		let positions: Vec<DVec3> = self.bubbles.iter().map(|b| b.body.position).collect();
		let velocities: Vec<DVec3> = self.bubbles.iter().map(|b| b.body.velocity).collect();
		let mut forces = vec![DVec3::ZERO; count];
		let mut damping = vec![1.0; count];
		let mut captured = vec![false; count];
		let mut nearest: Option<(usize, f64)> = None;

		for (i, bubble) in self.bubbles.iter().enumerate() {
			if !bubble.is_active() {
				continue;
			}
			let position = positions[i];
			let hold = pointer.and_then(|target| {
				let delta = target - position;
				let distance = delta.length();
				(distance < config.adsorption_radius).then_some((delta, distance))
			});
			match hold {
				Some((delta, distance)) => {
					let proximity = 1.0 - distance / config.adsorption_radius;
					if distance > EPSILON {
						let pull = config.adsorption_strength * proximity * proximity;
						forces[i] += delta / distance * pull;
					}
					damping[i] *= 1.0 - config.adsorption_damping * proximity;
					captured[i] = true;
					if nearest.is_none_or(|(_, d)| distance < d) {
						nearest = Some((i, distance));
					}
				}
				None => {
					let t = self.time;
					let k = bubble.index as f64;
					let jitter = DVec3::new(
						(t * 0.7 + k * 1.3).sin() + 0.5 * (t * 1.9 + k * 0.7).sin(),
						(t * 0.9 + k * 2.1).cos() + 0.5 * (t * 1.3 + k * 1.1).sin(),
						0.3 * (t * 0.5 + k).sin(),
					);
					forces[i] +=
						jitter * config.jitter_amplitude - position * config.center_strength;
				}
			}
		}

		for i in 0..count {
			if !self.bubbles[i].is_active() {
				continue;
			}
			for j in (i + 1)..count {
				if !self.bubbles[j].is_active() {
					continue;
				}
				let scales = self.bubbles[i].scale + self.bubbles[j].scale;
				let threshold = config.radius * scales * config.packing;
				let delta = positions[j] - positions[i];
				let distance = delta.length();
				if distance >= threshold {
					continue;
				}
				let direction = if distance > EPSILON {
					delta / distance
				} else {
					DVec3::X
				};
				let push = direction * ((threshold - distance).powf(1.2) * config.repulsion);
				forces[i] -= push;
				forces[j] += push;
				damping[i] *= config.collision_damping;
				damping[j] *= config.collision_damping;

				let closing = (velocities[i] - velocities[j]).dot(direction);
				let intensity = (closing / config.collision_speed).clamp(0.0, 1.0);
				let ready = |b: &Bubble| self.time - b.last_collision >= config.collision_interval;
				if intensity > config.collision_threshold
					&& ready(&self.bubbles[i])
					&& ready(&self.bubbles[j])
				{
					self.events.push(WorldEvent::Collision {
						id: self.bubbles[i].id,
						intensity,
					});
					self.bubbles[i].last_collision = self.time;
					self.bubbles[j].last_collision = self.time;
				}
			}
		}

		let mut released = Vec::new();
		for (i, bubble) in self.bubbles.iter_mut().enumerate() {
			if !bubble.is_active() {
				continue;
			}
			let was_captured = bubble.state == BubbleState::Captured;
			bubble.state = if captured[i] {
				BubbleState::Captured
			} else {
				BubbleState::Floating
			};
			bubble.hovered = captured[i];
			if was_captured && !captured[i] {
				released.push(bubble.id);
			}
			bubble.body.velocity *= damping[i].powf(frames);
			bubble.body.integrate(forces[i], config.friction, frames);
		}
		self.events.extend(released.into_iter().map(WorldEvent::Released));
		let hovered = nearest.map(|(i, _)| self.bubbles[i].id);
		self.set_hovered(hovered);
	}

	/// Wobble and stretch bubbles that are visible enough to notice.
	fn deform_surfaces(&mut self, frames: f64) {
		let config = &self.config;
		let k = blend(config.deform_blend, frames);
		for bubble in &mut self.bubbles {
			if !bubble.hovered && bubble.scale <= 0.95 {
				continue;
			}
			let stretch = if bubble.hovered {
				let speed = bubble.body.speed();
				let amount = (speed * config.stretch_gain).min(config.max_stretch);
				bubble.body.velocity.normalize_or_zero() * amount
			} else {
				DVec3::ZERO
			};
			let wobble = Wobble {
				time: self.time,
				phase: bubble.index as f64 * 0.9,
				amplitude: config.wobble_amplitude,
				stretch,
			};
			deform(self.mesh.vertices(), &mut bubble.surface.working, |v| wobble.target(v), k);
			let surface = &mut bubble.surface;
			compute_normals(self.mesh.triangles(), &surface.working, &mut surface.normals);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn still_config() -> BubbleConfig {
		BubbleConfig {
			center_strength: 0.0,
			jitter_amplitude: 0.0,
			..BubbleConfig::default()
		}
	}

	fn pair(config: BubbleConfig, separation: f64) -> BubbleWorld {
		let explosion = ExplosionConfig::default();
		let mut world = BubbleWorld::new([ItemId(1), ItemId(2)], config, explosion);
		world.bubbles[0].body = PointMass::at(DVec3::new(-separation / 2.0, 0.0, 0.0));
		world.bubbles[1].body = PointMass::at(DVec3::new(separation / 2.0, 0.0, 0.0));
		for bubble in &mut world.bubbles {
			bubble.scale = 1.0;
		}
		world
	}

	fn separation(world: &BubbleWorld) -> f64 {
		world.bubbles[0].body.position.distance(world.bubbles[1].body.position)
	}

	fn straight_down(x: f64, y: f64) -> Ray {
		Ray {
			origin: DVec3::new(x, y, 60.0),
			direction: DVec3::NEG_Z,
		}
	}

	fn run(world: &mut BubbleWorld, input: &WorldInput, frames: usize) {
		for i in 0..frames {
			world.step(input, FrameTime::reference(i as f64 / 60.0));
		}
	}

	#[test]
	fn overlapping_bubbles_separate_after_one_step() {
		let mut world = pair(BubbleConfig::default(), 5.0);
		world.step(&WorldInput::default(), FrameTime::reference(0.0));
		assert!(separation(&world) > 5.0);
	}

	#[test]
	fn separation_grows_monotonically_while_overlapping() {
		let config = still_config();
		let threshold = 2.0 * config.radius * config.packing;
		let mut world = pair(config, 5.0);
		let mut previous = separation(&world);
		for _ in 0..2000 {
			if previous >= threshold {
				break;
			}
			world.step(&WorldInput::default(), FrameTime::reference(0.0));
			let current = separation(&world);
			assert!(current > previous, "{current} <= {previous}");
			previous = current;
		}
		assert!(threshold - previous < 0.1);
	}

	#[test]
	fn coincident_bubbles_still_separate() {
		let mut world = pair(still_config(), 0.0);
		world.step(&WorldInput::default(), FrameTime::reference(0.0));
		assert!(separation(&world) > 0.0);
		assert!(world.bubbles.iter().all(|b| b.body.position.is_finite()));
	}

	#[test]
	fn pointer_captures_and_releases() {
		let mut world = pair(still_config(), 40.0);
		let held = WorldInput {
			pointer_ray: Some(straight_down(-18.0, 0.0)),
		};
		world.step(&held, FrameTime::reference(0.0));
		assert_eq!(world.bubbles[0].state, BubbleState::Captured);
		assert!(world.bubbles[0].hovered);
		assert_eq!(world.bubbles[1].state, BubbleState::Floating);
		assert_eq!(world.hovered(), Some(ItemId(1)));
		assert!(world.bubbles[0].body.velocity.x > 0.0);

		world.step(&WorldInput::default(), FrameTime::reference(0.0));
		let events = world.drain_events();
		assert!(events.contains(&WorldEvent::Hovered(Some(ItemId(1)))));
		assert!(events.contains(&WorldEvent::Released(ItemId(1))));
		assert!(events.contains(&WorldEvent::Hovered(None)));
		assert_eq!(world.bubbles[0].state, BubbleState::Floating);
	}

	#[test]
	fn selection_is_exclusive() {
		let mut world = pair(still_config(), 40.0);
		assert_eq!(world.click(&straight_down(-20.0, 0.0)), Some(ItemId(1)));
		assert_eq!(world.bubbles[0].state, BubbleState::Exploding);
		assert!(world.explosion().is_visible());

		assert_eq!(world.click(&straight_down(20.0, 0.0)), None);
		assert!(!world.open_from_list(ItemId(2)));
		assert_eq!(world.bubbles[1].state, BubbleState::Floating);
		let selected = world
			.bubbles
			.iter()
			.filter(|b| b.selected())
			.count();
		assert_eq!(selected, 1);
	}

	#[test]
	fn click_on_empty_space_selects_nothing() {
		let mut world = pair(still_config(), 40.0);
		assert_eq!(world.click(&straight_down(0.0, 30.0)), None);
		assert!(world.selection().is_none());
		assert!(!world.explosion().is_visible());
	}

	#[test]
	fn burst_hides_bubble_and_close_restores_it() {
		let mut world = pair(still_config(), 40.0);
		world.click(&straight_down(-20.0, 0.0));
		run(&mut world, &WorldInput::default(), 200);
		assert_eq!(world.bubbles[0].state, BubbleState::Hidden);
		assert!(world.bubbles[0].scale < 0.01);

		assert_eq!(world.close(), Some(ItemId(1)));
		assert_eq!(world.bubbles[0].state, BubbleState::Floating);
		run(&mut world, &WorldInput::default(), 200);
		assert!(world.bubbles[0].scale > 0.99);
		assert!(!world.explosion().is_visible());
		assert_eq!(world.close(), None);
	}

	#[test]
	fn list_mode_shrinks_and_freezes_bubbles() {
		let mut world = pair(still_config(), 5.0);
		world.set_mode(ViewMode::List);
		let before = separation(&world);
		run(&mut world, &WorldInput::default(), 120);
		assert_eq!(separation(&world), before);
		assert!(world.bubbles.iter().all(|b| b.scale < 0.01));
		assert_eq!(world.click(&straight_down(-2.5, 0.0)), None);
		assert!(world.drain_events().contains(&WorldEvent::ModeChanged(ViewMode::List)));
	}

	#[test]
	fn list_selection_skips_the_burst() {
		let mut world = pair(still_config(), 40.0);
		world.set_mode(ViewMode::List);
		assert!(world.open_from_list(ItemId(2)));
		assert_eq!(
			world.selection(),
			Some(Selection {
				id: ItemId(2),
				source: SelectionSource::List,
			})
		);
		assert!(!world.explosion().is_visible());
		assert_eq!(world.close(), Some(ItemId(2)));
	}

	#[test]
	fn collision_cues_are_throttled() {
		let config = BubbleConfig {
			collision_threshold: 0.0,
			..still_config()
		};
		let mut world = pair(config, 14.0);
		world.bubbles[0].body.velocity = DVec3::new(0.5, 0.0, 0.0);
		world.bubbles[1].body.velocity = DVec3::new(-0.5, 0.0, 0.0);
		world.step(&WorldInput::default(), FrameTime::reference(0.0));
		world.step(&WorldInput::default(), FrameTime::reference(0.0));
		let cues = world
			.drain_events()
			.into_iter()
			.filter(|e| matches!(e, WorldEvent::Collision { .. }))
			.count();
		assert_eq!(cues, 1);
	}

	#[test]
	fn hovered_surface_deforms_but_stays_finite() {
		let mut world = pair(still_config(), 40.0);
		let held = WorldInput {
			pointer_ray: Some(straight_down(-16.0, 0.0)),
		};
		run(&mut world, &held, 30);
		let surface = &world.bubbles[0].surface;
		let moved = surface
			.working
			.iter()
			.zip(world.mesh().vertices())
			.any(|(w, v)| w.distance(*v) > 1e-4);
		assert!(moved);
		assert!(surface.working.iter().all(|v| v.is_finite()));
		assert!(surface.normals.iter().all(|n| (n.length() - 1.0).abs() < 1e-6));
	}
}
