//! Core numeric primitives.
//!
//! Small building blocks shared by the simulation and the network layer.

pub mod vec2;
pub mod rng;

// Re-export core types
pub use vec2::{heading, within, Vec2};
pub use rng::ArenaRng;
