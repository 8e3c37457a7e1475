//! Game Events
//!
//! Outcomes of applying an intent to the game state, each tagged with who
//! must hear about it. The network layer turns these into wire messages.

use crate::world::object::{GridKey, WorldObject};
use super::player::{ConnectionId, Inventory, MoveUpdate, Player};

/// Which connections an event is delivered to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Audience {
    /// Every connection, including the actor.
    All,
    /// Every connection except the given one.
    Others(ConnectionId),
    /// Only the given connection.
    Only(ConnectionId),
}

impl Audience {
    /// Whether `id` receives events sent to this audience.
    pub fn includes(&self, id: &ConnectionId) -> bool {
        match self {
            Audience::All => true,
            Audience::Others(excluded) => excluded != id,
            Audience::Only(target) => target == id,
        }
    }
}

/// Game event data.
#[derive(Clone, Debug, PartialEq)]
pub enum GameEventData {
    /// A player joined.
    PlayerJoined {
        id: ConnectionId,
        player: Player,
    },

    /// A player moved.
    PlayerMoved {
        id: ConnectionId,
        movement: MoveUpdate,
    },

    /// An object took a hit (whether or not it survived).
    ObjectHit {
        key: GridKey,
    },

    /// An object lost its last durability and was removed.
    ObjectDestroyed {
        key: GridKey,
    },

    /// A wall was built.
    ObjectCreated {
        key: GridKey,
        object: WorldObject,
    },

    /// A player's inventory changed.
    InventoryChanged {
        inventory: Inventory,
    },

    /// A player left.
    PlayerLeft {
        id: ConnectionId,
    },
}

/// A game event with its audience.
#[derive(Clone, Debug, PartialEq)]
pub struct GameEvent {
    /// Who receives the event
    pub audience: Audience,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a new event.
    pub fn new(audience: Audience, data: GameEventData) -> Self {
        Self { audience, data }
    }

    /// Create player joined event, for everyone but the joiner.
    pub fn player_joined(player: Player) -> Self {
        Self::new(
            Audience::Others(player.id),
            GameEventData::PlayerJoined { id: player.id, player },
        )
    }

    /// Create player moved event, for everyone but the mover.
    pub fn player_moved(id: ConnectionId, movement: MoveUpdate) -> Self {
        Self::new(Audience::Others(id), GameEventData::PlayerMoved { id, movement })
    }

    /// Create object hit event.
    pub fn object_hit(key: GridKey) -> Self {
        Self::new(Audience::All, GameEventData::ObjectHit { key })
    }

    /// Create object destroyed event.
    pub fn object_destroyed(key: GridKey) -> Self {
        Self::new(Audience::All, GameEventData::ObjectDestroyed { key })
    }

    /// Create object created event.
    pub fn object_created(key: GridKey, object: WorldObject) -> Self {
        Self::new(Audience::All, GameEventData::ObjectCreated { key, object })
    }

    /// Create inventory update, for the owning player only.
    pub fn inventory_changed(id: ConnectionId, inventory: Inventory) -> Self {
        Self::new(Audience::Only(id), GameEventData::InventoryChanged { inventory })
    }

    /// Create player left event.
    pub fn player_left(id: ConnectionId) -> Self {
        Self::new(Audience::All, GameEventData::PlayerLeft { id })
    }
}
