//! Interact Protocol
//!
//! Harvesting and building. A cell moves through
//! `Absent -> Present(kind, hp) -> Absent` when harvested, or
//! `Absent -> Present(Wall, 3)` when built on; an object's kind never changes.
//!
//! Any player may hit any object, and whoever lands the final hit takes the
//! whole salvage yield.

use tracing::debug;

use crate::world::object::{GridKey, ObjectKind, WorldObject};
use crate::world::store::HitOutcome;
use super::events::GameEvent;
use super::player::{ConnectionId, Inventory, Resource};
use super::state::GameState;

/// Wood spent to build one wall.
pub const BUILD_COST_WOOD: u32 = 2;

/// What the client asked to do at a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum InteractAction {
    /// Hit whatever stands there.
    #[default]
    Harvest,
    /// Hit whatever stands there, or build a wall if the cell is empty.
    Build,
}

/// An interact intent for one cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InteractIntent {
    /// Target cell.
    pub key: GridKey,
    /// Requested action.
    pub action: InteractAction,
}

/// Resource and amount credited for destroying an object of `kind`.
///
/// Salvaging a wall returns less wood than it cost to build.
pub const fn salvage_yield(kind: ObjectKind) -> (Resource, u32) {
    match kind {
        ObjectKind::Tree => (Resource::Wood, 2),
        ObjectKind::Rock => (Resource::Stone, 1),
        ObjectKind::Wall => (Resource::Wood, 1),
    }
}

/// Apply one interact intent from `actor`.
///
/// Intents from unregistered actors, builds without enough wood, and
/// harvests of empty cells change nothing and produce no events.
pub fn interact(state: &mut GameState, actor: ConnectionId, intent: InteractIntent) -> Vec<GameEvent> {
    if !state.players.contains(&actor) {
        debug!("Dropping interact from unregistered {}", actor);
        return Vec::new();
    }

    let key = intent.key;
    let mut events = Vec::new();

    match state.world.hit(&key) {
        Some(HitOutcome::Damaged { .. }) => {
            events.push(GameEvent::object_hit(key));
        }
        Some(HitOutcome::Destroyed { kind }) => {
            events.push(GameEvent::object_hit(key));

            let (resource, amount) = salvage_yield(kind);
            events.push(GameEvent::object_destroyed(key));
            if let Some(inventory) = state.players.credit(&actor, resource, amount) {
                events.push(GameEvent::inventory_changed(actor, inventory));
            }
        }
        None if intent.action == InteractAction::Build => {
            if let Some((wall, inventory)) = build_wall(state, actor, key) {
                events.push(GameEvent::object_created(key, wall));
                events.push(GameEvent::inventory_changed(actor, inventory));
            }
        }
        None => {
            debug!("Interact at empty {} by {} ignored", key, actor);
        }
    }

    events
}

/// Spend the wood and place a wall at `key` as one step.
///
/// Returns the new wall and the actor's inventory, or `None` with nothing
/// changed if the actor cannot pay or the cell is taken.
fn build_wall(
    state: &mut GameState,
    actor: ConnectionId,
    key: GridKey,
) -> Option<(WorldObject, Inventory)> {
    if !state.players.debit(&actor, Resource::Wood, BUILD_COST_WOOD) {
        debug!("Build at {} by {} rejected: not enough wood", key, actor);
        return None;
    }

    let wall = WorldObject::new(ObjectKind::Wall);
    if !state.world.insert(key, wall) {
        state.players.credit(&actor, Resource::Wood, BUILD_COST_WOOD);
        debug!("Build at {} by {} rejected: cell occupied", key, actor);
        return None;
    }

    let inventory = state.players.get(&actor)?.inventory;
    Some((wall, inventory))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::events::{Audience, GameEventData};
    use crate::world::store::WorldStore;
    use proptest::prelude::*;

    fn id(n: u8) -> ConnectionId {
        ConnectionId::from_bytes([n; 16])
    }

    fn harvest(gx: i32, gy: i32) -> InteractIntent {
        InteractIntent { key: GridKey::new(gx, gy), action: InteractAction::Harvest }
    }

    fn build(gx: i32, gy: i32) -> InteractIntent {
        InteractIntent { key: GridKey::new(gx, gy), action: InteractAction::Build }
    }

    /// World with a tree at 5_5 and a rock at 7_7, and player 1 joined.
    fn setup() -> GameState {
        let mut world = WorldStore::new();
        world.insert(GridKey::new(5, 5), WorldObject::new(ObjectKind::Tree));
        world.insert(GridKey::new(7, 7), WorldObject::new(ObjectKind::Rock));

        let mut state = GameState::new(world, (400.0, 400.0));
        state.join(id(1)).unwrap();
        state
    }

    fn give_wood(state: &mut GameState, who: ConnectionId, amount: u32) {
        state.players.credit(&who, Resource::Wood, amount);
    }

    #[test]
    fn test_chop_tree_three_times() {
        let mut state = setup();
        let key = GridKey::new(5, 5);

        let first = interact(&mut state, id(1), harvest(5, 5));
        assert_eq!(first, vec![GameEvent::object_hit(key)]);
        assert_eq!(state.world.get(&key).unwrap().hp, 2);

        let second = interact(&mut state, id(1), harvest(5, 5));
        assert_eq!(second, vec![GameEvent::object_hit(key)]);
        assert_eq!(state.world.get(&key).unwrap().hp, 1);

        let third = interact(&mut state, id(1), harvest(5, 5));
        assert_eq!(
            third,
            vec![
                GameEvent::object_hit(key),
                GameEvent::object_destroyed(key),
                GameEvent::inventory_changed(id(1), Inventory { wood: 2, stone: 0 }),
            ]
        );
        assert!(!state.world.contains(&key));
    }

    #[test]
    fn test_rock_yields_stone() {
        let mut state = setup();

        for _ in 0..4 {
            interact(&mut state, id(1), harvest(7, 7));
        }
        let last = interact(&mut state, id(1), harvest(7, 7));

        assert!(last.contains(&GameEvent::inventory_changed(id(1), Inventory { wood: 0, stone: 1 })));
        assert!(!state.world.contains(&GridKey::new(7, 7)));
    }

    #[test]
    fn test_destroyer_takes_all() {
        let mut state = setup();
        state.join(id(2)).unwrap();

        interact(&mut state, id(1), harvest(5, 5));
        interact(&mut state, id(1), harvest(5, 5));
        let events = interact(&mut state, id(2), harvest(5, 5));

        assert!(events.contains(&GameEvent::inventory_changed(id(2), Inventory { wood: 2, stone: 0 })));
        assert_eq!(state.players.get(&id(1)).unwrap().inventory, Inventory::default());
    }

    #[test]
    fn test_build_without_wood_is_silent() {
        let mut state = setup();
        give_wood(&mut state, id(1), 1);

        let events = interact(&mut state, id(1), build(6, 6));

        assert!(events.is_empty());
        assert!(!state.world.contains(&GridKey::new(6, 6)));
        assert_eq!(state.players.get(&id(1)).unwrap().inventory.wood, 1);
    }

    #[test]
    fn test_build_with_wood() {
        let mut state = setup();
        give_wood(&mut state, id(1), 4);
        let key = GridKey::new(6, 6);

        let events = interact(&mut state, id(1), build(6, 6));

        let wall = WorldObject::new(ObjectKind::Wall);
        assert_eq!(
            events,
            vec![
                GameEvent::object_created(key, wall),
                GameEvent::inventory_changed(id(1), Inventory { wood: 2, stone: 0 }),
            ]
        );
        assert_eq!(state.world.get(&key), Some(&wall));
    }

    #[test]
    fn test_build_on_occupied_cell_hits_instead() {
        let mut state = setup();
        give_wood(&mut state, id(1), 10);

        let events = interact(&mut state, id(1), build(5, 5));

        assert_eq!(events, vec![GameEvent::object_hit(GridKey::new(5, 5))]);
        assert_eq!(state.world.get(&GridKey::new(5, 5)).unwrap().kind, ObjectKind::Tree);
        assert_eq!(state.players.get(&id(1)).unwrap().inventory.wood, 10);
    }

    #[test]
    fn test_build_wall_on_taken_cell_refunds() {
        let mut state = setup();
        give_wood(&mut state, id(1), 3);
        let key = GridKey::new(5, 5);

        assert!(build_wall(&mut state, id(1), key).is_none());

        assert_eq!(state.players.get(&id(1)).unwrap().inventory.wood, 3);
        assert_eq!(state.world.get(&key), Some(&WorldObject::new(ObjectKind::Tree)));
    }

    #[test]
    fn test_build_wall_places_and_charges() {
        let mut state = setup();
        give_wood(&mut state, id(1), 3);

        let (wall, inventory) = build_wall(&mut state, id(1), GridKey::new(6, 6)).unwrap();

        assert_eq!(wall, WorldObject::new(ObjectKind::Wall));
        assert_eq!(inventory, Inventory { wood: 1, stone: 0 });
        assert!(build_wall(&mut state, id(1), GridKey::new(8, 8)).is_none());
        assert!(!state.world.contains(&GridKey::new(8, 8)));
    }

    #[test]
    fn test_salvage_wall() {
        let mut state = setup();
        give_wood(&mut state, id(1), 2);
        interact(&mut state, id(1), build(6, 6));

        interact(&mut state, id(1), harvest(6, 6));
        interact(&mut state, id(1), harvest(6, 6));
        let events = interact(&mut state, id(1), harvest(6, 6));

        assert!(events.contains(&GameEvent::inventory_changed(id(1), Inventory { wood: 1, stone: 0 })));
    }

    #[test]
    fn test_harvest_empty_cell_is_noop() {
        let mut state = setup();
        assert!(interact(&mut state, id(1), harvest(0, 0)).is_empty());
    }

    #[test]
    fn test_unregistered_actor_is_dropped() {
        let mut state = setup();
        state.leave(id(1));

        assert!(interact(&mut state, id(1), harvest(5, 5)).is_empty());
        assert_eq!(state.world.get(&GridKey::new(5, 5)).unwrap().hp, 3);
        assert!(interact(&mut state, id(9), build(6, 6)).is_empty());
    }

    #[test]
    fn test_inventory_update_only_to_actor() {
        let mut state = setup();
        give_wood(&mut state, id(1), 2);

        for event in interact(&mut state, id(1), build(1, 1)) {
            if let GameEventData::InventoryChanged { .. } = event.data {
                assert_eq!(event.audience, Audience::Only(id(1)));
            } else {
                assert_eq!(event.audience, Audience::All);
            }
        }
    }

    // =========================================================================
    // PROPERTIES
    // =========================================================================

    fn intent_strategy() -> impl Strategy<Value = (u8, InteractIntent)> {
        (1u8..=2, 0i32..4, 0i32..4, any::<bool>()).prop_map(|(who, gx, gy, build)| {
            let action = if build { InteractAction::Build } else { InteractAction::Harvest };
            (who, InteractIntent { key: GridKey::new(gx, gy), action })
        })
    }

    proptest! {
        /// Hits take exactly one durability, builds only ever create fresh
        /// walls for exactly two wood, and nothing else changes a cell.
        #[test]
        fn prop_interact_transitions(
            intents in proptest::collection::vec(intent_strategy(), 1..200),
            start_wood in 0u32..6,
        ) {
            let mut world = WorldStore::new();
            world.insert(GridKey::new(0, 0), WorldObject::new(ObjectKind::Tree));
            world.insert(GridKey::new(1, 1), WorldObject::new(ObjectKind::Rock));
            let mut state = GameState::new(world, (0.0, 0.0));
            state.join(id(1)).unwrap();
            state.join(id(2)).unwrap();
            give_wood(&mut state, id(1), start_wood);

            for (who, intent) in intents {
                let actor = id(who);
                let before = state.world.get(&intent.key).copied();
                let inv_before = state.players.get(&actor).unwrap().inventory;
                let wood_before = inv_before.wood;

                let events = interact(&mut state, actor, intent);
                let after = state.world.get(&intent.key).copied();
                let inv_after = state.players.get(&actor).unwrap().inventory;
                let wood_after = inv_after.wood;

                match (before, after) {
                    (Some(b), Some(a)) => {
                        prop_assert_eq!(a.kind, b.kind);
                        prop_assert_eq!(a.hp + 1, b.hp);
                    }
                    (Some(b), None) => {
                        prop_assert_eq!(b.hp, 1);
                        let (resource, yielded) = salvage_yield(b.kind);
                        match resource {
                            Resource::Wood => {
                                prop_assert_eq!(inv_after.wood, inv_before.wood + yielded);
                                prop_assert_eq!(inv_after.stone, inv_before.stone);
                            }
                            Resource::Stone => {
                                prop_assert_eq!(inv_after.stone, inv_before.stone + yielded);
                                prop_assert_eq!(inv_after.wood, inv_before.wood);
                            }
                        }
                    }
                    (None, Some(a)) => {
                        prop_assert_eq!(a, WorldObject::new(ObjectKind::Wall));
                        prop_assert_eq!(intent.action, InteractAction::Build);
                        prop_assert_eq!(wood_after + BUILD_COST_WOOD, wood_before);
                    }
                    (None, None) => {
                        prop_assert!(events.is_empty());
                        prop_assert_eq!(wood_after, wood_before);
                    }
                }

                for object in state.world.iter().map(|(_, o)| o) {
                    prop_assert!(object.hp > 0);
                }
            }
        }

        /// Intents from a departed player never touch state or emit events.
        #[test]
        fn prop_departed_player_is_inert(intents in proptest::collection::vec(intent_strategy(), 1..50)) {
            let mut state = setup();
            state.leave(id(1));
            let world_before = state.world.snapshot();

            for (_, intent) in intents {
                prop_assert!(interact(&mut state, id(1), intent).is_empty());
            }
            prop_assert_eq!(state.world.snapshot(), world_before);
        }
    }
}
