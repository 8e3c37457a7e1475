//! # Tile World Server
//!
//! Authoritative multiplayer server for a tile world of trees, rocks and
//! player-built walls.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     TILE WORLD SERVER                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/            - Primitives                               │
//! │  └── rng.rs       - Seedable Xorshift128+ PRNG               │
//! │                                                              │
//! │  world/           - The object grid                          │
//! │  ├── object.rs    - Grid keys, kinds, durability             │
//! │  ├── store.rs     - Authoritative object map                 │
//! │  └── generator.rs - One-shot initial scatter                 │
//! │                                                              │
//! │  game/            - State mutation (no I/O)                  │
//! │  ├── player.rs    - Players, inventory, registry             │
//! │  ├── state.rs     - Shared state owner, join/move/leave      │
//! │  ├── interact.rs  - Harvest and build rules                  │
//! │  ├── movement.rs  - Move validation hook                     │
//! │  └── events.rs    - Events and their audiences               │
//! │                                                              │
//! │  network/         - Networking                               │
//! │  ├── protocol.rs  - Wire messages                            │
//! │  ├── session.rs   - Single-worker session coordinator        │
//! │  └── server.rs    - WebSocket server                         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ordering Guarantee
//!
//! Every connection event is funnelled into one command queue and handled
//! by one task. An event's state changes and all of its outbound messages
//! are complete before the next event is looked at, so no two intents are
//! ever applied concurrently, and clients see effects in arrival order.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod network;
pub mod world;

// Re-export commonly used types
pub use crate::core::rng::WorldRng;
pub use game::{ConnectionId, GameState, Player, PlayerRegistry};
pub use network::{GameServer, ServerConfig};
pub use world::{GridKey, ObjectKind, WorldObject, WorldStore};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Side length of one grid cell in pixels.
pub const TILE_SIZE: f64 = 16.0;
