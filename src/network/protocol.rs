//! Protocol Messages
//!
//! Wire format for client-server communication over WebSocket.
//! Every frame is a JSON text message of the form
//! `{"event": "<name>", "data": <payload>}`.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::game::events::{GameEvent, GameEventData};
use crate::game::interact::{InteractAction, InteractIntent};
use crate::game::player::{ConnectionId, Facing, Inventory, MoveUpdate, Player};
use crate::world::object::{GridKey, WorldObject};

// =============================================================================
// CLIENT -> SERVER MESSAGES
// =============================================================================

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    /// Client-reported position and animation state.
    PlayerMove(PlayerMove),

    /// Hit or build at a grid cell.
    Interact(Interact),
}

/// Movement report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerMove {
    /// Pixel x.
    pub x: f64,
    /// Pixel y.
    pub y: f64,
    /// Facing sign.
    pub direction: Facing,
    /// Whether the player is walking.
    #[serde(default)]
    pub moving: bool,
}

impl PlayerMove {
    /// Convert to a registry update.
    pub fn to_move_update(&self) -> MoveUpdate {
        MoveUpdate {
            x: self.x,
            y: self.y,
            direction: self.direction,
            moving: self.moving,
        }
    }
}

/// Interact request. `type` is `"build"` to build on an empty cell; any
/// other value, or none, only hits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interact {
    /// Target column.
    pub gx: i32,
    /// Target row.
    pub gy: i32,
    /// Requested action.
    #[serde(
        rename = "type",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_action"
    )]
    pub action: Option<String>,
}

impl Interact {
    /// Convert to an interact intent.
    pub fn to_intent(&self) -> InteractIntent {
        let action = match self.action.as_deref() {
            Some("build") => InteractAction::Build,
            _ => InteractAction::Harvest,
        };
        InteractIntent {
            key: GridKey::new(self.gx, self.gy),
            action,
        }
    }
}

/// Accept `null` and non-string `type` values as "no action".
fn deserialize_action<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => Some(s),
        _ => None,
    })
}

// =============================================================================
// SERVER -> CLIENT MESSAGES
// =============================================================================

/// Messages sent from server to client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    /// Every object in the world. Sent once, to the joining connection.
    CurrentWorld(BTreeMap<GridKey, WorldObject>),

    /// Every connected player, including the joiner. Sent once, to the
    /// joining connection.
    CurrentPlayers(BTreeMap<ConnectionId, Player>),

    /// Someone else joined.
    NewPlayer {
        id: ConnectionId,
        player: Player,
    },

    /// Someone else moved.
    PlayerMoved {
        id: ConnectionId,
        x: f64,
        y: f64,
        direction: Facing,
        moving: bool,
    },

    /// An object took a hit.
    ObjectHit {
        key: GridKey,
    },

    /// An object was removed.
    ObjectDestroyed(GridKey),

    /// The receiving player's inventory after their own action.
    UpdateInventory(Inventory),

    /// A wall was built.
    ObjectCreated {
        key: GridKey,
        obj: WorldObject,
    },

    /// A player left.
    PlayerDisconnected(ConnectionId),
}

impl From<GameEventData> for ServerEvent {
    fn from(data: GameEventData) -> Self {
        match data {
            GameEventData::PlayerJoined { id, player } => ServerEvent::NewPlayer { id, player },
            GameEventData::PlayerMoved { id, movement } => ServerEvent::PlayerMoved {
                id,
                x: movement.x,
                y: movement.y,
                direction: movement.direction,
                moving: movement.moving,
            },
            GameEventData::ObjectHit { key } => ServerEvent::ObjectHit { key },
            GameEventData::ObjectDestroyed { key } => ServerEvent::ObjectDestroyed(key),
            GameEventData::ObjectCreated { key, object } => ServerEvent::ObjectCreated { key, obj: object },
            GameEventData::InventoryChanged { inventory } => ServerEvent::UpdateInventory(inventory),
            GameEventData::PlayerLeft { id } => ServerEvent::PlayerDisconnected(id),
        }
    }
}

impl From<GameEvent> for ServerEvent {
    fn from(event: GameEvent) -> Self {
        event.data.into()
    }
}

// =============================================================================
// SERIALIZATION HELPERS
// =============================================================================

impl ClientEvent {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Deserialize from JSON bytes (binary frames).
    pub fn from_slice(data: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(data)
    }
}

impl ServerEvent {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Wire name of this event.
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::CurrentWorld(_) => "currentWorld",
            ServerEvent::CurrentPlayers(_) => "currentPlayers",
            ServerEvent::NewPlayer { .. } => "newPlayer",
            ServerEvent::PlayerMoved { .. } => "playerMoved",
            ServerEvent::ObjectHit { .. } => "objectHit",
            ServerEvent::ObjectDestroyed(_) => "objectDestroyed",
            ServerEvent::UpdateInventory(_) => "updateInventory",
            ServerEvent::ObjectCreated { .. } => "objectCreated",
            ServerEvent::PlayerDisconnected(_) => "playerDisconnected",
        }
    }
}
