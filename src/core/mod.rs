//! Core primitives.

pub mod rng;

// Re-export core types
pub use rng::{derive_world_seed, WorldRng};
