//! Network Layer
//!
//! WebSocket server for real-time multiplayer communication.
//! Connection tasks only parse and forward; all state changes happen in
//! the session coordinator.

pub mod protocol;
pub mod session;
pub mod server;

pub use protocol::{ClientEvent, Interact, PlayerMove, ServerEvent};
pub use session::{ConnectionSet, SessionCommand, SessionCoordinator, SessionHandle};
pub use server::{GameServer, GameServerError, ServerConfig};
