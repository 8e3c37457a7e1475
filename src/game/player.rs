//! Player State and Registry
//!
//! One [`Player`] per live connection. The registry is the only owner of
//! player state; every mutation goes through it and checks that the player
//! still exists, so intents arriving after a disconnect fall through as no-ops.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use tracing::debug;

// =============================================================================
// CONNECTION ID
// =============================================================================

/// Identity of a connection and of the player it owns.
///
/// A fresh v4 UUID per accepted connection; never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(pub uuid::Uuid);

impl ConnectionId {
    /// Allocate a new random identity.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Create from raw bytes (tests and tooling).
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(uuid::Uuid::from_bytes(bytes))
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// =============================================================================
// FACING
// =============================================================================

/// Horizontal facing of a player sprite.
///
/// Travels on the wire as a sign (`-1` left, `1` right). Inbound, any
/// negative number means left, and the names `"left"`/`"right"` are accepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Facing {
    /// Facing left (`-1`).
    Left,
    /// Facing right (`1`).
    #[default]
    Right,
}

impl Facing {
    /// Wire sign for this facing.
    pub const fn sign(self) -> i8 {
        match self {
            Facing::Left => -1,
            Facing::Right => 1,
        }
    }
}

impl Serialize for Facing {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i8(self.sign())
    }
}

impl<'de> Deserialize<'de> for Facing {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Sign(f64),
            Name(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Sign(s) if s < 0.0 => Ok(Facing::Left),
            Repr::Sign(_) => Ok(Facing::Right),
            Repr::Name(name) => match name.to_ascii_lowercase().as_str() {
                "left" => Ok(Facing::Left),
                "right" => Ok(Facing::Right),
                other => Err(serde::de::Error::custom(format!("unknown direction {other:?}"))),
            },
        }
    }
}

// =============================================================================
// INVENTORY
// =============================================================================

/// A harvestable resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Resource {
    /// From trees and salvaged walls; spent on building.
    Wood,
    /// From rocks.
    Stone,
}

/// Resource counters. Unsigned, and only ever decremented by a checked debit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    /// Wood held.
    pub wood: u32,
    /// Stone held.
    pub stone: u32,
}

impl Inventory {
    /// Amount of `resource` held.
    pub fn get(&self, resource: Resource) -> u32 {
        match resource {
            Resource::Wood => self.wood,
            Resource::Stone => self.stone,
        }
    }

    fn slot(&mut self, resource: Resource) -> &mut u32 {
        match resource {
            Resource::Wood => &mut self.wood,
            Resource::Stone => &mut self.stone,
        }
    }
}

// =============================================================================
// PLAYER
// =============================================================================

/// Client-reported movement state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MoveUpdate {
    /// Pixel x.
    pub x: f64,
    /// Pixel y.
    pub y: f64,
    /// Sprite facing.
    pub direction: Facing,
    /// Whether the walk animation is playing.
    pub moving: bool,
}

/// Authoritative state of one connected player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Owning connection.
    pub id: ConnectionId,
    /// Pixel x.
    pub x: f64,
    /// Pixel y.
    pub y: f64,
    /// Sprite facing.
    pub direction: Facing,
    /// Whether the player is walking.
    pub moving: bool,
    /// Harvested resources.
    pub inventory: Inventory,
}

impl Player {
    /// Create a player standing still at `spawn` with an empty inventory.
    pub fn new(id: ConnectionId, spawn: (f64, f64)) -> Self {
        Self {
            id,
            x: spawn.0,
            y: spawn.1,
            direction: Facing::default(),
            moving: false,
            inventory: Inventory::default(),
        }
    }

    /// Current movement state.
    pub fn movement(&self) -> MoveUpdate {
        MoveUpdate {
            x: self.x,
            y: self.y,
            direction: self.direction,
            moving: self.moving,
        }
    }
}

// =============================================================================
// REGISTRY
// =============================================================================

/// Player registry errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The connection already owns a player.
    #[error("Player {0} already registered")]
    AlreadyRegistered(ConnectionId),
}

/// All players, keyed by owning connection.
#[derive(Clone, Debug)]
pub struct PlayerRegistry {
    players: BTreeMap<ConnectionId, Player>,
    spawn: (f64, f64),
}

impl PlayerRegistry {
    /// Create an empty registry whose players spawn at `spawn`.
    pub fn new(spawn: (f64, f64)) -> Self {
        Self {
            players: BTreeMap::new(),
            spawn,
        }
    }

    /// Create a fresh player for `id`.
    pub fn register(&mut self, id: ConnectionId) -> Result<&Player, RegistryError> {
        if self.players.contains_key(&id) {
            return Err(RegistryError::AlreadyRegistered(id));
        }
        let spawn = self.spawn;
        Ok(self.players.entry(id).or_insert_with(|| Player::new(id, spawn)))
    }

    /// Remove the player for `id`. Returns `None` if it was already gone.
    pub fn unregister(&mut self, id: &ConnectionId) -> Option<Player> {
        let removed = self.players.remove(id);
        if removed.is_none() {
            debug!("Unregister for unknown player {}", id);
        }
        removed
    }

    /// Look up a player.
    pub fn get(&self, id: &ConnectionId) -> Option<&Player> {
        self.players.get(id)
    }

    /// Whether `id` owns a live player.
    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.players.contains_key(id)
    }

    /// Overwrite position, facing and movement flag.
    ///
    /// Returns `false` if the player does not exist.
    pub fn apply_move(&mut self, id: &ConnectionId, update: MoveUpdate) -> bool {
        match self.players.get_mut(id) {
            Some(player) => {
                player.x = update.x;
                player.y = update.y;
                player.direction = update.direction;
                player.moving = update.moving;
                true
            }
            None => false,
        }
    }

    /// Add `amount` of `resource`. Returns the new inventory, or `None` if
    /// the player does not exist.
    pub fn credit(&mut self, id: &ConnectionId, resource: Resource, amount: u32) -> Option<Inventory> {
        let player = self.players.get_mut(id)?;
        let slot = player.inventory.slot(resource);
        *slot = slot.saturating_add(amount);
        Some(player.inventory)
    }

    /// Remove `amount` of `resource` if the player holds at least that much.
    ///
    /// Returns whether the debit happened; on `false` nothing changed.
    pub fn debit(&mut self, id: &ConnectionId, resource: Resource, amount: u32) -> bool {
        let Some(player) = self.players.get_mut(id) else {
            return false;
        };
        let slot = player.inventory.slot(resource);
        match slot.checked_sub(amount) {
            Some(rest) => {
                *slot = rest;
                true
            }
            None => false,
        }
    }

    /// Number of live players.
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Whether no players are connected.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Iterate players in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&ConnectionId, &Player)> {
        self.players.iter()
    }

    /// Full copy of all players for an initial-state message.
    pub fn snapshot(&self) -> BTreeMap<ConnectionId, Player> {
        self.players.clone()
    }
}
