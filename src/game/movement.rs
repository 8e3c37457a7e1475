//! Movement Validation
//!
//! Hook consulted before a client-reported move is applied. The server
//! ships with [`TrustClient`], which accepts every report: positions are
//! client-authoritative and no speed or collision check is performed.

use super::player::{MoveUpdate, Player};

/// Decides whether a reported move may be applied.
pub trait MoveValidator: Send {
    /// Return `true` to apply `proposed` to `current`.
    fn validate(&self, current: &Player, proposed: &MoveUpdate) -> bool;
}

/// Accepts every move as reported.
#[derive(Clone, Copy, Debug, Default)]
pub struct TrustClient;

impl MoveValidator for TrustClient {
    fn validate(&self, _current: &Player, _proposed: &MoveUpdate) -> bool {
        true
    }
}

/// Rejects moves that leave a rectangular pixel area.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WithinBounds {
    /// Width of the playable area in pixels.
    pub width: f64,
    /// Height of the playable area in pixels.
    pub height: f64,
}

impl MoveValidator for WithinBounds {
    fn validate(&self, _current: &Player, proposed: &MoveUpdate) -> bool {
        (0.0..=self.width).contains(&proposed.x) && (0.0..=self.height).contains(&proposed.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::player::{ConnectionId, Facing};

    fn player() -> Player {
        Player::new(ConnectionId::from_bytes([1; 16]), (400.0, 400.0))
    }

    fn update(x: f64, y: f64) -> MoveUpdate {
        MoveUpdate { x, y, direction: Facing::Right, moving: true }
    }

    #[test]
    fn test_trust_client_accepts_anything() {
        assert!(TrustClient.validate(&player(), &update(-1e9, 1e9)));
    }

    #[test]
    fn test_within_bounds() {
        let bounds = WithinBounds { width: 800.0, height: 800.0 };
        assert!(bounds.validate(&player(), &update(0.0, 800.0)));
        assert!(!bounds.validate(&player(), &update(-0.1, 10.0)));
        assert!(!bounds.validate(&player(), &update(10.0, 801.0)));
    }
}
