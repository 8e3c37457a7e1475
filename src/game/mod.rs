//! Game Logic Module
//!
//! Authoritative state mutation. Nothing here touches the network; every
//! operation returns [`GameEvent`]s tagged with their audience.
//!
//! ## Module Structure
//!
//! - `player`: Player state, inventory, and the player registry
//! - `state`: The shared state owner (world + players), join/move/leave
//! - `interact`: Harvest and build rules
//! - `movement`: Pluggable validation of client-reported moves
//! - `events`: Game events and their audiences

pub mod events;
pub mod interact;
pub mod movement;
pub mod player;
pub mod state;

// Re-export key types
pub use events::{Audience, GameEvent, GameEventData};
pub use interact::{interact, InteractAction, InteractIntent, BUILD_COST_WOOD};
pub use movement::{MoveValidator, TrustClient, WithinBounds};
pub use player::{ConnectionId, Facing, Inventory, MoveUpdate, Player, PlayerRegistry, Resource};
pub use state::GameState;
