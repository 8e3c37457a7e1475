//! World Objects and Grid Keys
//!
//! A world object occupies exactly one grid cell. Cells are addressed by
//! [`GridKey`], which travels on the wire as the string `"gx_gy"`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

// =============================================================================
// GRID KEY
// =============================================================================

/// Integer grid coordinate identifying one world cell.
///
/// Ordered row-major (`gy` first) so snapshots list the world top to bottom.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridKey {
    /// Column, in grid units.
    pub gx: i32,
    /// Row, in grid units.
    pub gy: i32,
}

impl GridKey {
    /// Create a key from grid coordinates.
    pub const fn new(gx: i32, gy: i32) -> Self {
        Self { gx, gy }
    }
}

impl Ord for GridKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.gy, self.gx).cmp(&(other.gy, other.gx))
    }
}

impl PartialOrd for GridKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for GridKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.gx, self.gy)
    }
}

/// Error returned when a wire key is not of the form `"gx_gy"`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid grid key {0:?}, expected \"gx_gy\"")]
pub struct ParseKeyError(pub String);

impl FromStr for GridKey {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Split on the separator after the first character so "-3_-4" parses.
        let split = s
            .char_indices()
            .skip(1)
            .find(|&(_, c)| c == '_')
            .map(|(i, _)| i)
            .ok_or_else(|| ParseKeyError(s.to_string()))?;

        let gx = s[..split].parse().map_err(|_| ParseKeyError(s.to_string()))?;
        let gy = s[split + 1..].parse().map_err(|_| ParseKeyError(s.to_string()))?;
        Ok(Self { gx, gy })
    }
}

impl Serialize for GridKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for GridKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// OBJECT KIND
// =============================================================================

/// What stands on a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    /// Harvestable tree, placed by world generation.
    Tree,
    /// Harvestable rock, placed by world generation.
    Rock,
    /// Player-built wall.
    Wall,
}

impl ObjectKind {
    /// Durability a freshly created object of this kind starts with.
    pub const fn initial_hp(self) -> u32 {
        match self {
            ObjectKind::Tree => 3,
            ObjectKind::Rock => 5,
            ObjectKind::Wall => 3,
        }
    }
}

// =============================================================================
// WORLD OBJECT
// =============================================================================

/// A destructible object with remaining durability.
///
/// Objects with zero durability never exist: the store removes an object
/// the moment its last hit point is taken.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldObject {
    /// Object kind. Never changes after creation.
    #[serde(rename = "type")]
    pub kind: ObjectKind,
    /// Remaining durability, always > 0 while stored.
    pub hp: u32,
}

impl WorldObject {
    /// Create an object of `kind` at full durability.
    pub const fn new(kind: ObjectKind) -> Self {
        Self { kind, hp: kind.initial_hp() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_display_and_parse() {
        let key = GridKey::new(5, 5);
        assert_eq!(key.to_string(), "5_5");
        assert_eq!("5_5".parse::<GridKey>().unwrap(), key);
    }

    #[test]
    fn test_key_parse_negative() {
        assert_eq!("-3_-4".parse::<GridKey>().unwrap(), GridKey::new(-3, -4));
        assert_eq!("12_-1".parse::<GridKey>().unwrap(), GridKey::new(12, -1));
    }

    #[test]
    fn test_key_parse_rejects_garbage() {
        for bad in ["", "5", "5_", "_5", "a_b", "1_2_3", "1.5_2"] {
            assert!(bad.parse::<GridKey>().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_key_ordering_is_row_major() {
        let mut keys = vec![GridKey::new(3, 1), GridKey::new(0, 2), GridKey::new(1, 1)];
        keys.sort();
        assert_eq!(keys, vec![GridKey::new(1, 1), GridKey::new(3, 1), GridKey::new(0, 2)]);
    }

    #[test]
    fn test_object_wire_format() {
        let json = serde_json::to_string(&WorldObject::new(ObjectKind::Tree)).unwrap();
        assert_eq!(json, r#"{"type":"tree","hp":3}"#);

        let rock: WorldObject = serde_json::from_str(r#"{"type":"rock","hp":5}"#).unwrap();
        assert_eq!(rock, WorldObject::new(ObjectKind::Rock));
    }

    #[test]
    fn test_initial_hp() {
        assert_eq!(WorldObject::new(ObjectKind::Tree).hp, 3);
        assert_eq!(WorldObject::new(ObjectKind::Rock).hp, 5);
        assert_eq!(WorldObject::new(ObjectKind::Wall).hp, 3);
    }
}
