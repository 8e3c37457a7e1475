//! World Store
//!
//! Owns every object in the world, keyed by grid cell.
//! Uses BTreeMap so snapshots are sent in a stable order.

use std::collections::BTreeMap;

use super::object::{GridKey, ObjectKind, WorldObject};

/// Result of landing one hit on an occupied cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitOutcome {
    /// The object survived with `remaining` durability.
    Damaged {
        /// Kind of the object that was hit.
        kind: ObjectKind,
        /// Durability left after the hit (always > 0).
        remaining: u32,
    },
    /// The hit took the last point of durability; the object is gone.
    Destroyed {
        /// Kind of the object that was removed.
        kind: ObjectKind,
    },
}

/// Grid of destructible and buildable objects.
#[derive(Clone, Debug, Default)]
pub struct WorldStore {
    objects: BTreeMap<GridKey, WorldObject>,
}

impl WorldStore {
    /// Create an empty world.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the object at `key`.
    pub fn get(&self, key: &GridKey) -> Option<&WorldObject> {
        self.objects.get(key)
    }

    /// Whether `key` is occupied.
    pub fn contains(&self, key: &GridKey) -> bool {
        self.objects.contains_key(key)
    }

    /// Place `object` at an empty cell.
    ///
    /// Returns `false` and leaves the store untouched if the cell is
    /// occupied or the object has no durability.
    pub fn insert(&mut self, key: GridKey, object: WorldObject) -> bool {
        if object.hp == 0 || self.objects.contains_key(&key) {
            return false;
        }
        self.objects.insert(key, object);
        true
    }

    /// Take one point of durability from the object at `key`.
    ///
    /// Returns `None` if the cell is empty. An object whose durability
    /// reaches zero is removed before this returns.
    pub fn hit(&mut self, key: &GridKey) -> Option<HitOutcome> {
        let object = self.objects.get_mut(key)?;
        object.hp = object.hp.saturating_sub(1);

        if object.hp == 0 {
            let kind = object.kind;
            self.objects.remove(key);
            Some(HitOutcome::Destroyed { kind })
        } else {
            Some(HitOutcome::Damaged {
                kind: object.kind,
                remaining: object.hp,
            })
        }
    }

    /// Number of objects in the world.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the world has no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Iterate objects in row-major key order.
    pub fn iter(&self) -> impl Iterator<Item = (&GridKey, &WorldObject)> {
        self.objects.iter()
    }

    /// Count objects of one kind.
    pub fn count_kind(&self, kind: ObjectKind) -> usize {
        self.objects.values().filter(|o| o.kind == kind).count()
    }

    /// Full copy of the world for an initial-state message.
    pub fn snapshot(&self) -> BTreeMap<GridKey, WorldObject> {
        self.objects.clone()
    }
}
