//! 3D bubble scene for hobby items.
//!
//! - [`BubbleWorld`]: adsorption, collision, idle drift, surface wobble
//! - [`Explosion`]: particle burst played on selection
//! - [`BubbleController`]: command handle shared with the surrounding UI
//!
//! # Example
//!
//! ```ignore
//! use folio_fx::{
//! 	BubbleCanvas, BubbleConfig, BubbleController, BubbleWorld, ExplosionConfig, ItemId,
//! };
//!
//! let ids = [ItemId(1), ItemId(2)];
//! let world = BubbleWorld::new(ids, BubbleConfig::default(), ExplosionConfig::default());
//! let controller = BubbleController::new(world);
//!
//! view! { <BubbleCanvas controller=controller on_select=move |s| log::info!("{:?}", s) /> }
//! ```

mod audio;
pub mod camera;
mod component;
pub mod explosion;
pub mod mesh;
mod render;
mod textures;
pub mod world;

pub use camera::{Camera, Ray};
pub use component::{BubbleCallbacks, BubbleCanvas, BubbleController};
pub use explosion::{BurstParticle, Explosion, ExplosionConfig};
pub use world::{
	Bubble, BubbleConfig, BubbleState, BubbleWorld, Selection, SelectionSource, ViewMode,
	WorldEvent, WorldInput,
};
