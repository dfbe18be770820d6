//! Mountable canvas effects.

pub mod bubbles;
pub mod particle_field;
