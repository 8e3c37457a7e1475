//! World Module
//!
//! The grid of harvestable and buildable objects.
//!
//! ## Module Structure
//!
//! - `object`: Grid keys, object kinds, durability
//! - `store`: The authoritative object map and its hit/insert transitions
//! - `generator`: One-shot initial world scatter

pub mod generator;
pub mod object;
pub mod store;

pub use generator::{generate_world, WorldGenConfig};
pub use object::{GridKey, ObjectKind, WorldObject};
pub use store::{HitOutcome, WorldStore};
