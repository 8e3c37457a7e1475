//! World Generation
//!
//! One-shot scatter of trees and rocks over a square grid, run before the
//! server accepts its first connection. The spawn safe zone in the middle of
//! the map is always left empty.

use tracing::info;

use crate::core::rng::WorldRng;
use crate::TILE_SIZE;
use super::object::{GridKey, ObjectKind, WorldObject};
use super::store::WorldStore;

/// Default side length of the world in grid cells.
pub const DEFAULT_WORLD_TILES: i32 = 50;

/// Half-width of the spawn safe zone, in cells, around the map center.
const SAFE_ZONE_HALF_WIDTH: i32 = 4;

/// Parameters for [`generate_world`].
#[derive(Clone, Debug, PartialEq)]
pub struct WorldGenConfig {
    /// Side length of the square world, in cells.
    pub size: i32,
    /// First cell (inclusive, both axes) of the spawn safe zone.
    pub safe_zone_min: i32,
    /// Last cell (inclusive, both axes) of the spawn safe zone.
    pub safe_zone_max: i32,
    /// Samples below this become trees.
    pub tree_threshold: f64,
    /// Samples in `[tree_threshold, rock_threshold)` become rocks.
    pub rock_threshold: f64,
}

impl Default for WorldGenConfig {
    fn default() -> Self {
        Self::with_size(DEFAULT_WORLD_TILES)
    }
}

impl WorldGenConfig {
    /// Config for a world of `size` x `size` cells with the safe zone centered.
    pub fn with_size(size: i32) -> Self {
        let center = size / 2;
        Self {
            size,
            safe_zone_min: center - SAFE_ZONE_HALF_WIDTH,
            safe_zone_max: center + SAFE_ZONE_HALF_WIDTH,
            tree_threshold: 0.10,
            rock_threshold: 0.15,
        }
    }

    /// Whether `key` lies in the spawn safe zone.
    pub fn in_safe_zone(&self, key: GridKey) -> bool {
        let zone = self.safe_zone_min..=self.safe_zone_max;
        zone.contains(&key.gx) && zone.contains(&key.gy)
    }

    /// Pixel position new players spawn at: the center of the world.
    pub fn spawn_point(&self) -> (f64, f64) {
        let half = f64::from(self.size) * TILE_SIZE / 2.0;
        (half, half)
    }

    /// Classify one uniform sample into the object it produces, if any.
    fn classify(&self, sample: f64) -> Option<ObjectKind> {
        if sample < self.tree_threshold {
            Some(ObjectKind::Tree)
        } else if sample < self.rock_threshold {
            Some(ObjectKind::Rock)
        } else {
            None
        }
    }
}

/// Build the initial world.
///
/// Draws exactly one sample per cell outside the safe zone, so the same seed
/// and config always produce the same layout.
pub fn generate_world(config: &WorldGenConfig, rng: &mut WorldRng) -> WorldStore {
    let mut world = WorldStore::new();

    for gy in 0..config.size {
        for gx in 0..config.size {
            let key = GridKey::new(gx, gy);
            if config.in_safe_zone(key) {
                continue;
            }

            if let Some(kind) = config.classify(rng.next_unit()) {
                world.insert(key, WorldObject::new(kind));
            }
        }
    }

    info!(
        "World generated: {} objects ({} trees, {} rocks)",
        world.len(),
        world.count_kind(ObjectKind::Tree),
        world.count_kind(ObjectKind::Rock),
    );

    world
}
