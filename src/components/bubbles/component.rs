//! Leptos component and command handle for the bubble scene.

use std::cell::RefCell;
use std::rc::Rc;

use glam::DVec2;
use leptos::prelude::*;
use log::{debug, info, warn};
use web_sys::HtmlCanvasElement;

use super::audio::AudioCues;
use super::camera::Camera;
use super::render::render_world;
use super::textures::TextureCache;
use super::world::{BubbleWorld, Selection, ViewMode, WorldEvent, WorldInput};
use crate::content::ItemId;
use crate::error::Result;
use crate::frame::{FrameLoop, FrameTime, LoopControl};
use crate::input::{PointerState, WindowListener, canvas_position, client_position, left_window};
use crate::surface::{self, CanvasSizing};

/// Master volume for interaction cues.
const CUE_VOLUME: f32 = 0.15;

/// UI notifications forwarded from the world.
#[derive(Clone, Default)]
pub struct BubbleCallbacks {
	pub on_hover: Option<Callback<Option<ItemId>>>,
	pub on_select: Option<Callback<Selection>>,
	pub on_close: Option<Callback<ItemId>>,
	pub on_mode_change: Option<Callback<ViewMode>>,
}

struct Shared {
	world: BubbleWorld,
	callbacks: BubbleCallbacks,
	audio: Option<AudioCues>,
}

/// Handle through which the page drives the bubble world.
///
/// Cloning shares the same world. Every command flushes the resulting
/// events to the registered callbacks before returning.
#[derive(Clone)]
pub struct BubbleController {
	shared: Rc<RefCell<Shared>>,
}

impl BubbleController {
	pub fn new(world: BubbleWorld) -> Self {
		Self {
			shared: Rc::new(RefCell::new(Shared {
				world,
				callbacks: BubbleCallbacks::default(),
				audio: None,
			})),
		}
	}

	pub fn mode(&self) -> ViewMode {
		self.shared.borrow().world.mode()
	}

	pub fn selection(&self) -> Option<Selection> {
		self.shared.borrow().world.selection()
	}

	pub fn set_mode(&self, mode: ViewMode) {
		debug!("folio-fx: view mode -> {:?}", mode);
		self.command(|world| world.set_mode(mode));
	}

	/// Open an item from the list view. No-op while another item is open.
	pub fn open(&self, id: ItemId) -> bool {
		self.command(|world| world.open_from_list(id))
	}

	pub fn close(&self) -> Option<ItemId> {
		self.command(|world| world.close())
	}

	fn set_callbacks(&self, callbacks: BubbleCallbacks) {
		self.shared.borrow_mut().callbacks = callbacks;
	}

	fn set_audio(&self, audio: AudioCues) {
		self.shared.borrow_mut().audio = Some(audio);
	}

	fn command<T>(&self, apply: impl FnOnce(&mut BubbleWorld) -> T) -> T {
		let result = apply(&mut self.shared.borrow_mut().world);
		self.flush();
		result
	}

	fn step(&self, input: &WorldInput, time: FrameTime) {
		self.shared.borrow_mut().world.step(input, time);
		self.flush();
	}

	/// Play cues and hand events to the callbacks. Callbacks run after the
	/// world is released so they may issue further commands.
	fn flush(&self) {
		let (events, callbacks) = {
			let mut shared = self.shared.borrow_mut();
			let events = shared.world.drain_events();
			if let Some(audio) = &shared.audio {
				for event in &events {
					match event {
						WorldEvent::Collision { intensity, .. } => audio.play_collision(*intensity),
						WorldEvent::Released(_) => audio.play_release(),
						_ => {}
					}
				}
			}
			(events, shared.callbacks.clone())
		};

		for event in events {
			match event {
				WorldEvent::Hovered(id) => {
					if let Some(cb) = &callbacks.on_hover {
						cb.run(id);
					}
				}
				WorldEvent::Selected(selection) => {
					debug!("folio-fx: selected {} from {:?}", selection.id, selection.source);
					if let Some(cb) = &callbacks.on_select {
						cb.run(selection);
					}
				}
				WorldEvent::Closed(id) => {
					if let Some(cb) = &callbacks.on_close {
						cb.run(id);
					}
				}
				WorldEvent::ModeChanged(mode) => {
					if let Some(cb) = &callbacks.on_mode_change {
						cb.run(mode);
					}
				}
				WorldEvent::Collision { .. } | WorldEvent::Released(_) => {}
			}
		}
	}
}

/// Camera and canvas size, updated on resize.
struct Viewport {
	camera: Camera,
	width: f64,
	height: f64,
}

impl Viewport {
	fn contains(&self, position: DVec2) -> bool {
		(0.0..=self.width).contains(&position.x) && (0.0..=self.height).contains(&position.y)
	}
}

fn mount_bubbles(
	canvas: HtmlCanvasElement,
	sizing: CanvasSizing,
	controller: BubbleController,
	textures: TextureCache,
) -> Result<()> {
	let (ctx, width, height) = surface::prepare(&canvas, &sizing)?;
	let config = controller.shared.borrow().world.config().clone();
	let viewport = Rc::new(RefCell::new(Viewport {
		camera: Camera::new(
			config.camera_distance,
			config.field_of_view.to_radians(),
			width,
			height,
		),
		width,
		height,
	}));
	let pointer = Rc::new(RefCell::new(PointerState::default()));
	controller.set_audio(AudioCues::new(CUE_VOLUME));
	info!(
		"folio-fx: bubble scene mounted with {} bubbles",
		controller.shared.borrow().world.bubbles().len()
	);

	let mut listeners = Vec::with_capacity(6);
	for event in ["mousemove", "touchmove"] {
		let (canvas, viewport, pointer) = (canvas.clone(), viewport.clone(), pointer.clone());
		listeners.push(WindowListener::on_window(event, move |ev| {
			let Some(client) = client_position(&ev) else {
				return;
			};
			let position = canvas_position(&canvas, client);
			let mut pointer = pointer.borrow_mut();
			if viewport.borrow().contains(position) {
				pointer.set(position);
			} else {
				pointer.clear();
			}
		})?);
	}
	for event in ["mouseout", "touchend"] {
		let pointer = pointer.clone();
		listeners.push(WindowListener::on_window(event, move |ev| {
			if left_window(&ev) {
				pointer.borrow_mut().clear();
			}
		})?);
	}
	{
		let (canvas_click, viewport) = (canvas.clone(), viewport.clone());
		let controller = controller.clone();
		listeners.push(WindowListener::on(canvas.clone().into(), "click", move |ev| {
			if let Some(audio) = &controller.shared.borrow().audio {
				audio.resume();
			}
			let Some(client) = client_position(&ev) else {
				return;
			};
			let ray = viewport
				.borrow()
				.camera
				.ray_from_screen(canvas_position(&canvas_click, client));
			controller.command(|world| world.click(&ray));
		})?);
	}
	{
		let viewport = viewport.clone();
		listeners.push(surface::on_resize(&canvas, sizing, move |w, h| {
			let mut viewport = viewport.borrow_mut();
			viewport.camera.resize(w, h);
			viewport.width = w;
			viewport.height = h;
		})?);
	}

	FrameLoop::run(move |time| {
		if !canvas.is_connected() {
			listeners.clear();
			return LoopControl::Stop;
		}
		let viewport = viewport.borrow();
		let input = WorldInput {
			pointer_ray: pointer
				.borrow()
				.snapshot()
				.map(|p| viewport.camera.ray_from_screen(p)),
		};
		controller.step(&input, time);
		render_world(
			&ctx,
			&controller.shared.borrow().world,
			&viewport.camera,
			&textures,
			viewport.width,
			viewport.height,
		);
		LoopControl::Continue
	})?;
	Ok(())
}

/// Interactive 3D bubbles, one per hobby item.
///
/// The scene reads mode and selection from `controller`; pass the same
/// controller to the surrounding UI to switch modes or open items from a
/// list. `textures` maps items to the image drawn on their bubble.
#[component]
pub fn BubbleCanvas(
	controller: BubbleController,
	#[prop(optional)] textures: Vec<(ItemId, String)>,
	#[prop(into, optional)] on_hover: Option<Callback<Option<ItemId>>>,
	#[prop(into, optional)] on_select: Option<Callback<Selection>>,
	#[prop(into, optional)] on_close: Option<Callback<ItemId>>,
	#[prop(into, optional)] on_mode_change: Option<Callback<ViewMode>>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let sizing = CanvasSizing {
		fullscreen,
		width,
		height,
	};
	controller.set_callbacks(BubbleCallbacks {
		on_hover,
		on_select,
		on_close,
		on_mode_change,
	});

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let textures = TextureCache::load(textures.iter().map(|(id, url)| (*id, url.as_str())));
		if let Err(err) = mount_bubbles(canvas.into(), sizing, controller.clone(), textures) {
			warn!("folio-fx: bubble scene not rendered: {}", err);
		}
	});

	view! {
		<canvas
			node_ref=canvas_ref
			class="bubble-canvas"
			style="display: block; width: 100%; height: 100%; cursor: pointer;"
		/>
	}
}
