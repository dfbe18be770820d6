//! Simulation primitives shared by every effect.

pub mod body;
pub mod ease;
pub mod rng;

pub use body::{EPSILON, PointMass, Vector, falloff_force};
pub use ease::{approach, blend, smooth_step};
pub use rng::{FieldRng, pseudo_random};
