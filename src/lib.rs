//! folio-fx: particle fields, scroll-coupled distortion and bubble physics
//! for a single-page portfolio.
//!
//! This crate provides WASM canvas components that render an ambient particle
//! background, the owner's name as a particle cloud, scroll-reactive liquid
//! lines and an interactive 3D bubble scene for hobby items.

use std::collections::HashMap;
use std::sync::Arc;

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;
pub mod content;
pub mod error;
pub mod frame;
pub mod input;
pub mod physics;
pub mod surface;

pub use components::bubbles::{
	BubbleCanvas, BubbleConfig, BubbleController, BubbleWorld, ExplosionConfig, Selection, ViewMode,
};
pub use components::particle_field::{
	FieldConfig, FieldStyle, LiquidConfig, LiquidLinesCanvas, ParticleFieldCanvas, ScrollConfig,
};
pub use content::{ContentItem, EffectSettings, Gallery, ItemDetails, ItemId, PortfolioData};
pub use error::SurfaceError;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("folio-fx: logging initialized");
}

/// Load page content from a script element with id="portfolio-data".
/// Expected format: JSON with { owner, items: [...], settings: {...} }
fn load_portfolio_data() -> Option<PortfolioData> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id("portfolio-data")?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	let json_text = script.text().ok()?;

	match serde_json::from_str::<PortfolioData>(&json_text) {
		Ok(data) => {
			info!(
				"folio-fx: loaded {} items ({} hobbies)",
				data.items.len(),
				data.hobbies().count()
			);
			Some(data)
		}
		Err(e) => {
			warn!("folio-fx: failed to parse portfolio data: {}", e);
			None
		}
	}
}

fn visible_when(show: bool) -> &'static str {
	if show { "" } else { "display: none;" }
}

/// Main application component.
/// Loads content from the DOM and mounts every effect.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let data = load_portfolio_data().unwrap_or_default();
	let settings = data.settings.clone();
	let headline = if data.owner.is_empty() {
		String::from("Portfolio")
	} else {
		data.owner.clone()
	};

	let hobbies: Vec<ContentItem> = data.hobbies().cloned().collect();
	let details: Arc<HashMap<ItemId, ItemDetails>> = Arc::new(
		data.items
			.iter()
			.map(|item| (item.id(), item.details().clone()))
			.collect(),
	);
	let textures: Vec<(ItemId, String)> = hobbies
		.iter()
		.filter_map(|h| h.image_list().first().map(|url| (h.id(), url.clone())))
		.collect();

	let controller = BubbleController::new(BubbleWorld::new(
		hobbies.iter().map(ContentItem::id),
		settings.bubbles.clone(),
		settings.explosion.clone(),
	));

	let (mode, set_mode) = signal(ViewMode::Bubbles);
	let (open_item, set_open_item) = signal(None::<ItemId>);
	let (hovered, set_hovered) = signal(None::<ItemId>);

	let on_hover = Callback::new(move |id: Option<ItemId>| set_hovered.set(id));
	let on_select = Callback::new(move |selection: Selection| {
		set_open_item.set(Some(selection.id));
	});
	let on_close = Callback::new(move |_: ItemId| set_open_item.set(None));
	let on_mode_change = Callback::new(move |m: ViewMode| set_mode.set(m));

	let hover_label = {
		let details = details.clone();
		move || {
			hovered
				.get()
				.and_then(|id| details.get(&id).map(|d| d.name.clone()))
				.unwrap_or_default()
		}
	};
	let (detail_name, detail_text, detail_images) = {
		let (a, b, c) = (details.clone(), details.clone(), details);
		(
			move || {
				open_item
					.get()
					.and_then(|id| a.get(&id).map(|d| d.name.clone()))
					.unwrap_or_default()
			},
			move || {
				open_item
					.get()
					.and_then(|id| b.get(&id).map(|d| d.description.clone()))
					.unwrap_or_default()
			},
			move || {
				open_item
					.get()
					.and_then(|id| c.get(&id).map(|d| d.images.clone()))
					.unwrap_or_default()
					.into_iter()
					.map(|src| view! { <img src=src loading="lazy" /> })
					.collect_view()
			},
		)
	};

	let list = hobbies
		.iter()
		.map(|hobby| {
			let (controller, id) = (controller.clone(), hobby.id());
			view! {
				<li>
					<button on:click=move |_| {
						controller.open(id);
					}>{hobby.name().to_string()}</button>
				</li>
			}
		})
		.collect_view();

	let (to_bubbles, to_list) = (controller.clone(), controller.clone());
	let closer = controller.clone();

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text=headline.clone() />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<ParticleFieldCanvas
			config=settings.background.clone()
			style=settings.style.clone()
			scroll=settings.scroll.clone()
			fullscreen=true
		/>

		<main class="portfolio">
			<section class="hero">
				<ParticleFieldCanvas
					text=headline
					config=settings.name_text.clone()
					style=settings.style.clone()
					scroll=settings.scroll.clone()
					height=Some(240.0)
				/>
			</section>

			<section class="liquid">
				<LiquidLinesCanvas
					config=settings.liquid.clone()
					scroll=settings.scroll.clone()
					height=Some(200.0)
				/>
			</section>

			<section class="hobbies">
				<div class="mode-toggle">
					<button
						class:active=move || mode.get() == ViewMode::Bubbles
						on:click=move |_| to_bubbles.set_mode(ViewMode::Bubbles)
					>
						"Bubbles"
					</button>
					<button
						class:active=move || mode.get() == ViewMode::List
						on:click=move |_| to_list.set_mode(ViewMode::List)
					>
						"List"
					</button>
				</div>
				<div class="bubble-stage">
					<BubbleCanvas
						controller=controller
						textures=textures
						on_hover=on_hover
						on_select=on_select
						on_close=on_close
						on_mode_change=on_mode_change
						height=Some(520.0)
					/>
					<p class="hover-label">{hover_label}</p>
				</div>
				<ul class="hobby-list" style=move || visible_when(mode.get() == ViewMode::List)>
					{list}
				</ul>
			</section>
		</main>

		<div class="detail-overlay" style=move || visible_when(open_item.get().is_some())>
			<button class="close" on:click=move |_| {
				closer.close();
			}>"Close"</button>
			<h2>{detail_name}</h2>
			<p>{detail_text}</p>
			<div class="gallery">{detail_images}</div>
		</div>
	}
}
