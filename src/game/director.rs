//! # Round Director
//!
//! Per-round scheduling: how many items and NPCs a round gets, where they
//! spawn, and the teardown of the previous round's population.
//!
//! Idle NPC objects are pooled across rounds: deactivation returns them to
//! a free list keyed by variant, and the next round reuses a matching idle
//! instance before asking the spawner for a new one.

use crate::game::{
    ItemHandle, ItemVariant, NpcHandle, NpcVariant, RoundState, VariantCatalog, WorldPoint,
};
use crate::hooks::Spawner;
use crate::map::MapGrid;
use crate::{config, ForageResult};
use rand::rngs::StdRng;
use rand::Rng;

/// Number of target items a round schedules before clamping to capacity.
///
/// The exponential term escalates difficulty gently: it contributes
/// nothing until round 6 and roughly doubles every six rounds after that.
///
/// # Examples
///
/// ```
/// use forage::item_count_for_round;
///
/// assert_eq!(item_count_for_round(2, 1, 100), 2);
/// assert_eq!(item_count_for_round(2, 8, 100), 3);
/// assert_eq!(item_count_for_round(2, 8, 2), 2); // clamped to capacity
/// ```
pub fn item_count_for_round(base: u32, round: u32, capacity: usize) -> usize {
    let growth = (config::ITEM_GROWTH_FACTOR.powi(round as i32) - 1.0) as usize;
    (base as usize + growth).min(capacity)
}

/// Number of NPCs a round fields: none before round 4, then one more every
/// four rounds, clamped to the number of known waypoints.
pub fn npc_count_for_round(round: u32, waypoint_count: usize) -> usize {
    ((round / config::NPC_ROUND_DIVISOR) as usize).min(waypoint_count)
}

/// A collectible item the director has placed for the current round.
#[derive(Debug, Clone, Copy)]
pub struct SpawnedItem {
    pub variant: ItemVariant,
    pub handle: ItemHandle,
    collected: bool,
}

impl SpawnedItem {
    /// Whether the player already collected this item.
    pub fn is_collected(&self) -> bool {
        self.collected
    }
}

/// An NPC on patrol this round.
#[derive(Debug, Clone, Copy)]
pub struct ActiveNpc {
    pub variant: NpcVariant,
    pub handle: NpcHandle,
    /// Index into the global waypoint list; unique within a round
    pub waypoint: usize,
}

#[derive(Debug, Clone, Copy)]
struct IdleNpc {
    variant: NpcVariant,
    handle: NpcHandle,
}

/// Free list of instantiated-but-inactive NPCs, keyed by variant.
#[derive(Debug, Default)]
struct NpcPool {
    idle: Vec<IdleNpc>,
}

impl NpcPool {
    /// Reactivates an idle instance of `variant` if one exists, otherwise
    /// requests a fresh one from the spawner.
    fn acquire(
        &mut self,
        variant: NpcVariant,
        spawner: &mut dyn Spawner,
    ) -> ForageResult<NpcHandle> {
        if let Some(pos) = self.idle.iter().position(|npc| npc.variant == variant) {
            let npc = self.idle.swap_remove(pos);
            spawner.set_npc_active(npc.handle, true);
            Ok(npc.handle)
        } else {
            spawner.spawn_npc(variant)
        }
    }

    /// Deactivates an NPC and returns it to the free list.
    fn release(&mut self, variant: NpcVariant, handle: NpcHandle, spawner: &mut dyn Spawner) {
        spawner.set_npc_active(handle, false);
        self.idle.push(IdleNpc { variant, handle });
    }

    fn idle_count(&self) -> usize {
        self.idle.len()
    }
}

/// Computes per-round parameters and orchestrates the spawn/despawn
/// lifecycle of items and NPCs.
#[derive(Debug)]
pub struct RoundDirector {
    base_items_per_round: u32,
    base_points_per_item: f32,
    spawned_items: Vec<SpawnedItem>,
    active_npcs: Vec<ActiveNpc>,
    pool: NpcPool,
    health_pickup: Option<ItemHandle>,
}

impl RoundDirector {
    /// Creates a director with the given per-round baselines.
    pub fn new(base_items_per_round: u32, base_points_per_item: f32) -> Self {
        Self {
            base_items_per_round,
            base_points_per_item,
            spawned_items: Vec::new(),
            active_npcs: Vec::new(),
            pool: NpcPool::default(),
            health_pickup: None,
        }
    }

    /// Items placed for the current round, including collected ones whose
    /// despawn is still pending.
    pub fn spawned_items(&self) -> &[SpawnedItem] {
        &self.spawned_items
    }

    /// NPCs on patrol this round.
    pub fn active_npcs(&self) -> &[ActiveNpc] {
        &self.active_npcs
    }

    /// Idle NPC instances available for reuse.
    pub fn pooled_npc_count(&self) -> usize {
        self.pool.idle_count()
    }

    /// The live health pickup, if one is out.
    pub fn health_pickup(&self) -> Option<ItemHandle> {
        self.health_pickup
    }

    /// Tears down the previous round and schedules the next one.
    ///
    /// Cleanup strictly precedes scheduling. Item targets are spawned on
    /// distinct spawn points; NPCs each get a distinct waypoint. If the
    /// spawner starts failing partway through, the round runs with the
    /// population spawned so far (logged); a round whose very first item
    /// spawn fails is unpreparable and the error propagates.
    pub fn prepare_round(
        &mut self,
        round_number: u32,
        map: &MapGrid,
        catalog: &VariantCatalog,
        spawner: &mut dyn Spawner,
        rng: &mut StdRng,
    ) -> ForageResult<RoundState> {
        self.cleanup(spawner);

        let targets = self.spawn_items(round_number, map, catalog, spawner, rng)?;
        self.spawn_npcs(round_number, map, catalog, spawner, rng);

        log::debug!(
            "round {round_number} prepared: {} targets, {} NPCs",
            targets.len(),
            self.active_npcs.len()
        );
        Ok(RoundState::new(targets, self.base_points_per_item))
    }

    /// Despawns every item still out and pools every active NPC.
    pub fn cleanup(&mut self, spawner: &mut dyn Spawner) {
        for item in self.spawned_items.drain(..) {
            spawner.despawn_item(item.handle);
        }
        if let Some(pickup) = self.health_pickup.take() {
            spawner.despawn_item(pickup);
        }
        self.deactivate_npcs_inner(spawner);
    }

    /// Deactivates all patrolling NPCs, returning them to the pool.
    pub fn deactivate_npcs(&mut self, spawner: &mut dyn Spawner) {
        self.deactivate_npcs_inner(spawner);
    }

    fn deactivate_npcs_inner(&mut self, spawner: &mut dyn Spawner) {
        for npc in self.active_npcs.drain(..) {
            self.pool.release(npc.variant, npc.handle, spawner);
        }
    }

    fn spawn_items(
        &mut self,
        round_number: u32,
        map: &MapGrid,
        catalog: &VariantCatalog,
        spawner: &mut dyn Spawner,
        rng: &mut StdRng,
    ) -> ForageResult<Vec<ItemVariant>> {
        let spawn_points = map.item_spawn_points();
        let count = item_count_for_round(self.base_items_per_round, round_number, spawn_points.len());

        // Distinct spawn points; the clamp above guarantees enough exist.
        let slots = rand::seq::index::sample(rng, spawn_points.len(), count);
        let mut targets = Vec::with_capacity(count);
        for slot in slots.iter() {
            let variant = ItemVariant(rng.gen_range(0..catalog.item_variants));
            match spawner.spawn_item(variant, spawn_points[slot]) {
                Ok(handle) => {
                    self.spawned_items.push(SpawnedItem {
                        variant,
                        handle,
                        collected: false,
                    });
                    targets.push(variant);
                }
                Err(err) if targets.is_empty() => return Err(err),
                Err(err) => {
                    log::warn!(
                        "item spawn failed, round {round_number} reduced to {} targets: {err}",
                        targets.len()
                    );
                    break;
                }
            }
        }
        Ok(targets)
    }

    fn spawn_npcs(
        &mut self,
        round_number: u32,
        map: &MapGrid,
        catalog: &VariantCatalog,
        spawner: &mut dyn Spawner,
        rng: &mut StdRng,
    ) {
        let waypoints = map.npc_waypoints();
        let count = npc_count_for_round(round_number, waypoints.len());

        // Each NPC patrols from its own waypoint: sampled without
        // replacement.
        let picks = rand::seq::index::sample(rng, waypoints.len(), count);
        for waypoint in picks.iter() {
            let variant = NpcVariant(rng.gen_range(0..catalog.npc_variants));
            match self.pool.acquire(variant, spawner) {
                Ok(handle) => {
                    spawner.place_npc(handle, waypoints[waypoint]);
                    self.active_npcs.push(ActiveNpc {
                        variant,
                        handle,
                        waypoint,
                    });
                }
                Err(err) => {
                    log::warn!(
                        "NPC spawn failed, round {round_number} fields {} NPCs: {err}",
                        self.active_npcs.len()
                    );
                    break;
                }
            }
        }
    }

    /// Spawns the scheduled health pickup at the given point. Failure is
    /// tolerated; the pickup is simply skipped this round.
    pub fn spawn_health_pickup(&mut self, at: WorldPoint, spawner: &mut dyn Spawner) {
        match spawner.spawn_health_pickup(at) {
            Ok(handle) => self.health_pickup = Some(handle),
            Err(err) => log::warn!("health pickup spawn failed, skipping: {err}"),
        }
    }

    /// Consumes the live health pickup, if one is out.
    pub fn collect_health_pickup(&mut self) -> Option<ItemHandle> {
        self.health_pickup.take()
    }

    /// The variant of a live, not-yet-collected item.
    pub fn variant_of_live(&self, handle: ItemHandle) -> Option<ItemVariant> {
        self.spawned_items
            .iter()
            .find(|item| item.handle == handle && !item.collected)
            .map(|item| item.variant)
    }

    /// Marks an item collected so it cannot be collected twice while its
    /// despawn is pending. Returns false for unknown or already-collected
    /// handles.
    pub fn mark_collected(&mut self, handle: ItemHandle) -> bool {
        match self
            .spawned_items
            .iter_mut()
            .find(|item| item.handle == handle && !item.collected)
        {
            Some(item) => {
                item.collected = true;
                true
            }
            None => false,
        }
    }

    /// Removes an item from the round's population ahead of its despawn.
    /// Returns false if a teardown already removed it.
    pub fn finish_despawn(&mut self, handle: ItemHandle) -> bool {
        match self
            .spawned_items
            .iter()
            .position(|item| item.handle == handle)
        {
            Some(pos) => {
                self.spawned_items.swap_remove(pos);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::MemorySpawner;
    use rand::SeedableRng;

    fn setup(fragments: usize) -> (RoundDirector, MapGrid, VariantCatalog, MemorySpawner, StdRng) {
        let catalog = VariantCatalog::new(4, 6, 2).unwrap();
        let mut spawner = MemorySpawner::new();
        let mut rng = StdRng::seed_from_u64(99);
        let mut map = MapGrid::new();
        for i in 0..fragments {
            map.expand(i == 0, &catalog, &mut spawner, &mut rng)
                .unwrap();
        }
        let director = RoundDirector::new(
            config::BASE_ITEMS_PER_ROUND,
            config::BASE_POINTS_PER_ITEM,
        );
        (director, map, catalog, spawner, rng)
    }

    #[test]
    fn test_item_count_formula() {
        // Round 1 and round 8 with base 2
        assert_eq!(item_count_for_round(2, 1, 100), 2);
        assert_eq!(item_count_for_round(2, 8, 100), 3);
        // Growth term stays zero through round 5
        assert_eq!(item_count_for_round(2, 5, 100), 2);
        assert_eq!(item_count_for_round(2, 6, 100), 3);
        // Capacity clamp
        assert_eq!(item_count_for_round(2, 30, 4), 4);
    }

    #[test]
    fn test_npc_count_formula() {
        assert_eq!(npc_count_for_round(1, 10), 0);
        assert_eq!(npc_count_for_round(3, 10), 0);
        assert_eq!(npc_count_for_round(4, 10), 1);
        assert_eq!(npc_count_for_round(15, 10), 3);
        assert_eq!(npc_count_for_round(15, 2), 2);
    }

    #[test]
    fn test_prepare_round_spawns_targets_on_distinct_points() {
        let (mut director, map, catalog, mut spawner, mut rng) = setup(1);
        let round = director
            .prepare_round(1, &map, &catalog, &mut spawner, &mut rng)
            .unwrap();

        assert_eq!(round.remaining_targets(), 2);
        assert_eq!(spawner.live_item_count(), 2);
        assert_eq!(director.spawned_items().len(), 2);

        // Both targets sit on known spawn points, and on different ones.
        let positions: Vec<WorldPoint> = director
            .spawned_items()
            .iter()
            .map(|item| spawner.item_position(item.handle).unwrap())
            .collect();
        for at in &positions {
            assert!(map.item_spawn_points().contains(at));
        }
        assert_ne!(positions[0], positions[1]);
    }

    #[test]
    fn test_npcs_get_distinct_waypoints() {
        // 8 fragments -> 16 waypoints; round 15 fields 3 NPCs.
        let (mut director, map, catalog, mut spawner, mut rng) = setup(8);
        director
            .prepare_round(15, &map, &catalog, &mut spawner, &mut rng)
            .unwrap();

        let npcs = director.active_npcs();
        assert_eq!(npcs.len(), 3);
        let mut waypoints: Vec<usize> = npcs.iter().map(|npc| npc.waypoint).collect();
        waypoints.sort_unstable();
        waypoints.dedup();
        assert_eq!(waypoints.len(), 3);
        assert_eq!(spawner.active_npc_count(), 3);
    }

    #[test]
    fn test_cleanup_precedes_scheduling() {
        let (mut director, map, catalog, mut spawner, mut rng) = setup(2);
        director
            .prepare_round(4, &map, &catalog, &mut spawner, &mut rng)
            .unwrap();
        let first_round_items: Vec<ItemHandle> = director
            .spawned_items()
            .iter()
            .map(|item| item.handle)
            .collect();

        director
            .prepare_round(5, &map, &catalog, &mut spawner, &mut rng)
            .unwrap();
        for handle in first_round_items {
            assert!(!spawner.item_is_live(handle));
        }
    }

    #[test]
    fn test_npc_pool_reuses_idle_instances() {
        // Single NPC variant so every pooled instance is reusable.
        let catalog = VariantCatalog::new(4, 6, 1).unwrap();
        let mut spawner = MemorySpawner::new();
        let mut rng = StdRng::seed_from_u64(99);
        let mut map = MapGrid::new();
        for i in 0..8 {
            map.expand(i == 0, &catalog, &mut spawner, &mut rng).unwrap();
        }
        let mut director = RoundDirector::new(2, 100.0);

        director
            .prepare_round(8, &map, &catalog, &mut spawner, &mut rng)
            .unwrap();
        assert_eq!(director.active_npcs().len(), 2);
        assert_eq!(spawner.npc_instance_count(), 2);

        director.deactivate_npcs(&mut spawner);
        assert_eq!(director.pooled_npc_count(), 2);
        assert_eq!(spawner.active_npc_count(), 0);

        // The next round reuses both idle instances instead of asking the
        // spawner for fresh ones.
        director
            .prepare_round(9, &map, &catalog, &mut spawner, &mut rng)
            .unwrap();
        assert_eq!(director.active_npcs().len(), 2);
        assert_eq!(spawner.npc_instance_count(), 2);
        assert_eq!(spawner.active_npc_count(), 2);
    }

    #[test]
    fn test_partial_item_spawn_failure_degrades_round() {
        let (mut director, map, catalog, mut spawner, mut rng) = setup(4);
        // Round 10 wants min(2 + floor(1.125^10 - 1), 12) = 4 targets.
        let full = director
            .prepare_round(10, &map, &catalog, &mut spawner, &mut rng)
            .unwrap();
        assert_eq!(full.remaining_targets(), 4);

        // Only two more item spawns succeed: the round runs reduced
        // instead of failing.
        spawner.limit_item_spawns(2);
        let reduced = director
            .prepare_round(11, &map, &catalog, &mut spawner, &mut rng)
            .unwrap();
        assert_eq!(reduced.remaining_targets(), 2);
        assert_eq!(director.spawned_items().len(), 2);
    }

    #[test]
    fn test_npc_spawn_failure_shrinks_patrol() {
        // Single NPC variant so the pooled instance is always reusable.
        let catalog = VariantCatalog::new(4, 6, 1).unwrap();
        let mut spawner = MemorySpawner::new();
        let mut rng = StdRng::seed_from_u64(21);
        let mut map = MapGrid::new();
        for i in 0..8 {
            map.expand(i == 0, &catalog, &mut spawner, &mut rng).unwrap();
        }
        let mut director = RoundDirector::new(2, 100.0);

        director
            .prepare_round(4, &map, &catalog, &mut spawner, &mut rng)
            .unwrap();
        director.deactivate_npcs(&mut spawner);

        // Round 8 wants two NPCs: one comes from the pool, the fresh
        // spawn fails, and the round still runs with a patrol of one.
        spawner.fail_next_npc_spawns(1);
        let round = director
            .prepare_round(8, &map, &catalog, &mut spawner, &mut rng)
            .unwrap();
        assert_eq!(round.remaining_targets(), 3);
        assert_eq!(director.active_npcs().len(), 1);
        assert_eq!(spawner.active_npc_count(), 1);
        assert_eq!(spawner.npc_instance_count(), 1);
    }

    #[test]
    fn test_total_item_spawn_failure_propagates() {
        let (mut director, map, catalog, mut spawner, mut rng) = setup(1);
        spawner.fail_next_item_spawns(10);
        assert!(director
            .prepare_round(1, &map, &catalog, &mut spawner, &mut rng)
            .is_err());
    }

    #[test]
    fn test_collection_bookkeeping() {
        let (mut director, map, catalog, mut spawner, mut rng) = setup(1);
        director
            .prepare_round(1, &map, &catalog, &mut spawner, &mut rng)
            .unwrap();
        let handle = director.spawned_items()[0].handle;
        let variant = director.spawned_items()[0].variant;

        assert_eq!(director.variant_of_live(handle), Some(variant));
        assert!(director.mark_collected(handle));
        // Collected items are no longer live targets and cannot be
        // collected twice.
        assert_eq!(director.variant_of_live(handle), None);
        assert!(!director.mark_collected(handle));

        assert!(director.finish_despawn(handle));
        assert!(!director.finish_despawn(handle));
    }

    #[test]
    fn test_health_pickup_lifecycle() {
        let (mut director, _map, _catalog, mut spawner, _rng) = setup(1);
        director.spawn_health_pickup(WorldPoint::new(1.0, 1.0), &mut spawner);
        assert_eq!(spawner.live_health_pickup_count(), 1);

        let handle = director.collect_health_pickup().unwrap();
        assert!(director.collect_health_pickup().is_none());
        spawner.despawn_item(handle);
        assert_eq!(spawner.live_health_pickup_count(), 0);
    }

    #[test]
    fn test_stale_health_pickup_cleaned_between_rounds() {
        let (mut director, map, catalog, mut spawner, mut rng) = setup(1);
        director.spawn_health_pickup(WorldPoint::new(1.0, 1.0), &mut spawner);
        director
            .prepare_round(1, &map, &catalog, &mut spawner, &mut rng)
            .unwrap();
        assert_eq!(spawner.live_health_pickup_count(), 0);
        assert!(director.health_pickup().is_none());
    }
}
