//! 2D particle effects drawn on a canvas.
//!
//! - [`ParticleField`]: springs, pointer repel/attract, drift and wrap
//! - [`sampler`]: turns rasterized text into particle rest positions
//! - [`ScrollCoupler`]: smoothed scroll velocity feeding stretch and fade
//! - [`LiquidLines`]: scroll-reactive wave lines
//!
//! # Example
//!
//! ```ignore
//! use folio_fx::{FieldConfig, ParticleFieldCanvas};
//!
//! view! {
//!     <ParticleFieldCanvas fullscreen=true />
//!     <ParticleFieldCanvas text="Ada" config=FieldConfig::text() height=240.0 />
//! }
//! ```

mod component;
pub mod field;
pub mod liquid;
mod render;
pub mod sampler;
pub mod scroll;
pub mod theme;

pub use component::{LiquidLinesCanvas, ParticleFieldCanvas};
pub use field::{
	EdgeMode, FieldConfig, FieldInput, Particle, ParticleField, PointerMode, SeedStrategy,
};
pub use liquid::{LiquidConfig, LiquidLines};
pub use scroll::{ScrollConfig, ScrollCoupler};
pub use theme::{Color, FieldStyle, Gradient};
