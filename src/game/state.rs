//! Game State
//!
//! The single owner of the world and the player registry. Everything that
//! mutates shared state is a method here (or in [`super::interact`]) and
//! returns the events that must be broadcast as a result.

use tracing::debug;

use crate::world::store::WorldStore;
use super::events::GameEvent;
use super::movement::{MoveValidator, TrustClient};
use super::player::{ConnectionId, MoveUpdate, PlayerRegistry, RegistryError};

/// Shared world and player state.
pub struct GameState {
    /// Objects on the grid.
    pub world: WorldStore,

    /// Connected players.
    pub players: PlayerRegistry,

    /// Check applied to every reported move.
    validator: Box<dyn MoveValidator>,
}

impl GameState {
    /// Create state around a generated world; players spawn at `spawn`.
    pub fn new(world: WorldStore, spawn: (f64, f64)) -> Self {
        Self {
            world,
            players: PlayerRegistry::new(spawn),
            validator: Box::new(TrustClient),
        }
    }

    /// Replace the movement validator.
    pub fn with_validator(mut self, validator: Box<dyn MoveValidator>) -> Self {
        self.validator = validator;
        self
    }

    /// Register a player for a new connection.
    ///
    /// Returns the announcement for everyone else. The joiner's own
    /// snapshot is built by the caller from [`GameState::world`] and
    /// [`GameState::players`].
    pub fn join(&mut self, id: ConnectionId) -> Result<Vec<GameEvent>, RegistryError> {
        let player = self.players.register(id)?.clone();
        Ok(vec![GameEvent::player_joined(player)])
    }

    /// Apply a client-reported move.
    pub fn move_player(&mut self, id: ConnectionId, update: MoveUpdate) -> Vec<GameEvent> {
        let Some(player) = self.players.get(&id) else {
            debug!("Dropping move from unregistered {}", id);
            return Vec::new();
        };

        if !self.validator.validate(player, &update) {
            debug!("Rejected move from {} to ({}, {})", id, update.x, update.y);
            return Vec::new();
        }

        self.players.apply_move(&id, update);
        vec![GameEvent::player_moved(id, update)]
    }

    /// Remove a disconnected player.
    ///
    /// A second call for the same id produces no events.
    pub fn leave(&mut self, id: ConnectionId) -> Vec<GameEvent> {
        match self.players.unregister(&id) {
            Some(_) => vec![GameEvent::player_left(id)],
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::events::{Audience, GameEventData};
    use crate::game::movement::WithinBounds;
    use crate::game::player::Facing;

    fn id(n: u8) -> ConnectionId {
        ConnectionId::from_bytes([n; 16])
    }

    fn state() -> GameState {
        GameState::new(WorldStore::new(), (400.0, 400.0))
    }

    fn walk(x: f64) -> MoveUpdate {
        MoveUpdate { x, y: 10.0, direction: Facing::Left, moving: true }
    }

    #[test]
    fn test_join_announces_to_others() {
        let mut state = state();
        let events = state.join(id(1)).unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].audience, Audience::Others(id(1)));
        assert!(matches!(
            &events[0].data,
            GameEventData::PlayerJoined { id: joined, player } if *joined == id(1) && player.x == 400.0
        ));
    }

    #[test]
    fn test_join_twice_is_error() {
        let mut state = state();
        state.join(id(1)).unwrap();
        assert!(state.join(id(1)).is_err());
    }

    #[test]
    fn test_move_broadcasts_to_others() {
        let mut state = state();
        state.join(id(1)).unwrap();

        let events = state.move_player(id(1), walk(120.0));
        assert_eq!(events, vec![GameEvent::player_moved(id(1), walk(120.0))]);
        assert_eq!(state.players.get(&id(1)).unwrap().x, 120.0);
    }

    #[test]
    fn test_move_from_unknown_is_dropped() {
        let mut state = state();
        assert!(state.move_player(id(7), walk(1.0)).is_empty());
        assert!(state.players.is_empty());
    }

    #[test]
    fn test_validator_can_reject() {
        let bounds = WithinBounds { width: 800.0, height: 800.0 };
        let mut state = state().with_validator(Box::new(bounds));
        state.join(id(1)).unwrap();

        assert!(state.move_player(id(1), walk(900.0)).is_empty());
        assert_eq!(state.players.get(&id(1)).unwrap().x, 400.0);
    }

    #[test]
    fn test_leave_once() {
        let mut state = state();
        state.join(id(1)).unwrap();

        assert_eq!(state.leave(id(1)), vec![GameEvent::player_left(id(1))]);
        assert!(state.leave(id(1)).is_empty());
        assert!(state.move_player(id(1), walk(5.0)).is_empty());
    }
}
