//! Leptos components mounting the 2D particle effects.
//!
//! Each component creates a canvas, seeds its simulation once the canvas is
//! in the DOM, wires window listeners for pointer/scroll/resize, and drives
//! the simulation through a [`FrameLoop`]. The loop stops and the listeners
//! are removed once the canvas leaves the document.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{info, warn};
use web_sys::HtmlCanvasElement;

use super::field::{FieldConfig, FieldInput, ParticleField, SeedStrategy};
use super::liquid::{LiquidConfig, LiquidLines};
use super::render;
use super::sampler::{self, DEFAULT_GRID_STEP, TextRaster};
use super::scroll::{ScrollConfig, ScrollCoupler};
use super::theme::FieldStyle;
use crate::error::{Result, SurfaceError};
use crate::frame::{FrameLoop, LoopControl};
use crate::input::{
	PointerState, WindowListener, canvas_position, client_position, left_window, scroll_metrics,
};
use crate::surface::{self, CanvasSizing};

const FULLSCREEN_STYLE: &str =
	"position: fixed; inset: 0; display: block; pointer-events: none; z-index: 0;";
const INLINE_STYLE: &str = "display: block; width: 100%; height: 100%;";

/// Where a field's initial positions come from.
#[derive(Clone, Debug)]
enum SeedSource {
	/// Uniform when the config has a count, otherwise a grid.
	Config,
	Text {
		text: String,
		font: String,
		grid_step: u32,
	},
}

/// Simulation context owned by one mounted field.
struct FieldContext {
	field: ParticleField,
	scroll: ScrollCoupler,
	pointer: PointerState,
	style: FieldStyle,
	source: SeedSource,
}

impl FieldContext {
	/// Re-seed for a new canvas size. Previous velocities are discarded.
	fn reseed(&mut self, width: f64, height: f64) {
		let seed = match &self.source {
			SeedSource::Config => {
				let config = self.field.config();
				if config.count > 0 {
					SeedStrategy::Uniform {
						count: config.count,
					}
				} else {
					SeedStrategy::Grid {
						spacing: config.grid_spacing,
					}
				}
			}
			SeedSource::Text {
				text,
				font,
				grid_step,
			} => {
				let raster = TextRaster {
					text: text.clone(),
					font: font.clone(),
					width: width as u32,
					height: height as u32,
					grid_step: *grid_step,
				};
				match sampler::sample(&raster) {
					Ok(points) => SeedStrategy::Mask(points),
					Err(err) => {
						warn!("folio-fx: could not sample '{}': {}", text, err);
						SeedStrategy::Mask(Vec::new())
					}
				}
			}
		};
		self.field.initialize(&seed, width, height);
		info!(
			"folio-fx: particle field seeded with {} particles ({}x{})",
			self.field.particles().len(),
			width,
			height
		);
	}
}

fn field_scroll(context: &mut FieldContext) -> &mut ScrollCoupler {
	&mut context.scroll
}

/// Keep a coupler in sync with the window scroll position.
fn scroll_listener<C: 'static>(
	context: Rc<RefCell<C>>,
	scroll: fn(&mut C) -> &mut ScrollCoupler,
) -> Result<WindowListener> {
	let window = web_sys::window().ok_or(SurfaceError::NoWindow)?;
	let (offset, max_offset) = scroll_metrics(&window);
	scroll(&mut context.borrow_mut()).on_scroll(offset, max_offset);

	WindowListener::on_window("scroll", move |_| {
		if let Some(window) = web_sys::window() {
			let (offset, max_offset) = scroll_metrics(&window);
			scroll(&mut context.borrow_mut()).on_scroll(offset, max_offset);
		}
	})
}

/// Track the pointer in canvas coordinates, clearing it when it leaves.
fn pointer_listeners(
	canvas: &HtmlCanvasElement,
	context: &Rc<RefCell<FieldContext>>,
) -> Result<Vec<WindowListener>> {
	let mut listeners = Vec::with_capacity(4);
	for event in ["mousemove", "touchmove"] {
		let (canvas, context) = (canvas.clone(), context.clone());
		listeners.push(WindowListener::on_window(event, move |ev| {
			if let Some(client) = client_position(&ev) {
				context
					.borrow_mut()
					.pointer
					.set(canvas_position(&canvas, client));
			}
		})?);
	}
	for event in ["mouseout", "touchend"] {
		let context = context.clone();
		listeners.push(WindowListener::on_window(event, move |ev| {
			if left_window(&ev) {
				context.borrow_mut().pointer.clear();
			}
		})?);
	}
	Ok(listeners)
}

fn mount_field(
	canvas: HtmlCanvasElement,
	sizing: CanvasSizing,
	config: FieldConfig,
	style: FieldStyle,
	scroll: ScrollConfig,
	source: SeedSource,
) -> Result<()> {
	let (ctx, width, height) = surface::prepare(&canvas, &sizing)?;
	let mut field_context = FieldContext {
		field: ParticleField::new(config),
		scroll: ScrollCoupler::new(scroll),
		pointer: PointerState::default(),
		style,
		source,
	};
	field_context.reseed(width, height);
	let context = Rc::new(RefCell::new(field_context));

	let mut listeners = vec![scroll_listener(context.clone(), field_scroll)?];
	listeners.extend(pointer_listeners(&canvas, &context)?);
	let context_resize = context.clone();
	listeners.push(surface::on_resize(&canvas, sizing, move |w, h| {
		context_resize.borrow_mut().reseed(w, h);
	})?);

	FrameLoop::run(move |time| {
		if !canvas.is_connected() {
			listeners.clear();
			return LoopControl::Stop;
		}
		let mut guard = context.borrow_mut();
		let c = &mut *guard;
		c.scroll.tick(time.frames);
		let input = FieldInput {
			pointer: c.pointer.snapshot(),
			scroll_intensity: c.scroll.intensity(),
			scroll_progress: c.scroll.progress(),
		};
		c.field.step(&input, time);
		render::render_field(&ctx, &c.field, &c.style, &c.scroll);
		LoopControl::Continue
	})?;
	Ok(())
}

/// A canvas-backed particle field.
///
/// With `text` set, particles are seeded from the rasterized text and spring
/// back onto it after the pointer scatters them; otherwise the field is
/// seeded from `config` (uniform dust by default). `fullscreen` pins the
/// canvas behind the page. Every field re-seeds when its size changes.
#[component]
pub fn ParticleFieldCanvas(
	#[prop(optional)] config: Option<FieldConfig>,
	#[prop(optional)] style: Option<FieldStyle>,
	#[prop(optional)] scroll: Option<ScrollConfig>,
	#[prop(optional, into)] text: Option<String>,
	#[prop(into, default = String::from("bold 120px sans-serif"))] font: String,
	#[prop(default = DEFAULT_GRID_STEP)] grid_step: u32,
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
	let config = config.unwrap_or_else(|| {
		if text.is_some() {
			FieldConfig::text()
		} else {
			FieldConfig::ambient()
		}
	});
	let source = match text {
		Some(text) => SeedSource::Text {
			text,
			font,
			grid_step,
		},
		None => SeedSource::Config,
	};
	let (style, scroll) = (style.unwrap_or_default(), scroll.unwrap_or_default());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if let Err(err) = mount_field(
			canvas.into(),
			sizing,
			config.clone(),
			style.clone(),
			scroll.clone(),
			source.clone(),
		) {
			warn!("folio-fx: particle field not rendered: {}", err);
		}
	});

	view! {
		<canvas
			node_ref=canvas_ref
			class="particle-field-canvas"
			style=if fullscreen { FULLSCREEN_STYLE } else { INLINE_STYLE }
		/>
	}
}

struct LiquidContext {
	lines: LiquidLines,
	scroll: ScrollCoupler,
	width: f64,
	height: f64,
}

fn liquid_scroll(context: &mut LiquidContext) -> &mut ScrollCoupler {
	&mut context.scroll
}

fn mount_liquid(
	canvas: HtmlCanvasElement,
	sizing: CanvasSizing,
	config: LiquidConfig,
	scroll: ScrollConfig,
) -> Result<()> {
	let (ctx, width, height) = surface::prepare(&canvas, &sizing)?;
	let context = Rc::new(RefCell::new(LiquidContext {
		lines: LiquidLines::new(config),
		scroll: ScrollCoupler::new(scroll),
		width,
		height,
	}));

	let mut listeners = vec![scroll_listener(context.clone(), liquid_scroll)?];
	let context_resize = context.clone();
	listeners.push(surface::on_resize(&canvas, sizing, move |w, h| {
		let mut c = context_resize.borrow_mut();
		c.width = w;
		c.height = h;
	})?);

	FrameLoop::run(move |time| {
		if !canvas.is_connected() {
			listeners.clear();
			return LoopControl::Stop;
		}
		let mut guard = context.borrow_mut();
		let c = &mut *guard;
		c.scroll.tick(time.frames);
		render::render_liquid(&ctx, &mut c.lines, &c.scroll, c.width, c.height, time.elapsed);
		LoopControl::Continue
	})?;
	Ok(())
}

/// Wave lines that ripple harder the faster the page scrolls.
#[component]
pub fn LiquidLinesCanvas(
	#[prop(optional)] config: Option<LiquidConfig>,
	#[prop(optional)] scroll: Option<ScrollConfig>,
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
	let (config, scroll) = (config.unwrap_or_default(), scroll.unwrap_or_default());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if let Err(err) = mount_liquid(canvas.into(), sizing, config.clone(), scroll.clone()) {
			warn!("folio-fx: liquid lines not rendered: {}", err);
		}
	});

	view! {
		<canvas
			node_ref=canvas_ref
			class="liquid-lines-canvas"
			style=if fullscreen { FULLSCREEN_STYLE } else { INLINE_STYLE }
		/>
	}
}
