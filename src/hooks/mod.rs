//! # Collaborator Hooks
//!
//! Trait seams between the engine core and its host: spawning/despawning
//! of world objects, presentation of values, and high-score persistence.
//!
//! The core is headless; everything visual or durable goes through these
//! traits. Shipped implementations cover the headless demo binary and
//! tests: [`LogPresenter`], [`MemorySpawner`], [`MemoryScoreStore`] and
//! [`FileScoreStore`].

use crate::game::{
    ConnectorHandle, FragmentHandle, FragmentVariant, GridPos, ItemHandle, ItemVariant, NpcHandle,
    NpcVariant, WorldPoint,
};
use crate::map::{Connectors, FragmentSpawn};
use crate::{ForageError, ForageResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Receives the values the core wants shown to the player.
///
/// Calls are fire-and-forget; the presenter renders however it likes.
pub trait Presenter {
    /// Current score and high-score labels.
    fn present_score(&mut self, score: &str, high_score: &str);

    /// Round countdown label.
    fn present_time(&mut self, time: &str);

    /// Number of health pips to light, already capped at the display max.
    fn present_health_pips(&mut self, pips: u8);

    /// The item to find next, or `None` when the sequence is exhausted.
    fn present_target_item(&mut self, item: Option<ItemVariant>);

    /// End-of-day / end-of-week summary label.
    fn present_end_of_day(&mut self, label: &str);

    /// The terminal game-over screen, with final score labels.
    fn present_game_over(&mut self, score: &str, high_score: &str);
}

/// Instantiates and tears down world objects on behalf of the core.
///
/// Despawn calls must be idempotent: the core may request despawn of a
/// handle that a round teardown already destroyed.
pub trait Spawner {
    /// Instantiates a map fragment variant at a grid cell.
    fn spawn_fragment(
        &mut self,
        variant: FragmentVariant,
        cell: GridPos,
    ) -> ForageResult<FragmentSpawn>;

    /// Destroys one boundary wall, opening a passage.
    fn despawn_connector(&mut self, connector: ConnectorHandle);

    /// Instantiates a collectible item at a world position.
    fn spawn_item(&mut self, variant: ItemVariant, at: WorldPoint) -> ForageResult<ItemHandle>;

    /// Instantiates a health pickup at a world position.
    fn spawn_health_pickup(&mut self, at: WorldPoint) -> ForageResult<ItemHandle>;

    /// Removes a collectible item or health pickup.
    fn despawn_item(&mut self, item: ItemHandle);

    /// Instantiates an NPC variant (inactive placement comes separately).
    fn spawn_npc(&mut self, variant: NpcVariant) -> ForageResult<NpcHandle>;

    /// Moves an NPC to a patrol waypoint and starts it patrolling.
    fn place_npc(&mut self, npc: NpcHandle, at: WorldPoint);

    /// Activates or deactivates a (possibly pooled) NPC.
    fn set_npc_active(&mut self, npc: NpcHandle, active: bool);
}

/// Durable storage for high-score watermarks: one scalar per short string
/// prefix.
pub trait ScoreStore {
    /// Loads the stored scalar for `prefix`; missing data loads as 0.
    fn load(&self, prefix: &str) -> ForageResult<f32>;

    /// Overwrites the stored scalar for `prefix`.
    fn save(&mut self, prefix: &str, value: f32) -> ForageResult<()>;
}

/// Presenter that writes every notification to the log. Used by the
/// headless demo binary.
#[derive(Debug, Default)]
pub struct LogPresenter;

impl Presenter for LogPresenter {
    fn present_score(&mut self, score: &str, high_score: &str) {
        log::info!("score: {score} ({high_score})");
    }

    fn present_time(&mut self, time: &str) {
        log::trace!("time left: {time}");
    }

    fn present_health_pips(&mut self, pips: u8) {
        log::info!("health: {pips} pips");
    }

    fn present_target_item(&mut self, item: Option<ItemVariant>) {
        match item {
            Some(item) => log::info!("find next: item variant {}", item.0),
            None => log::info!("all targets found"),
        }
    }

    fn present_end_of_day(&mut self, label: &str) {
        log::info!("--- {label} ---");
    }

    fn present_game_over(&mut self, score: &str, high_score: &str) {
        log::info!("GAME OVER — final score {score} ({high_score})");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ItemKind {
    Collectible(ItemVariant),
    HealthPickup,
}

#[derive(Debug, Clone, Copy)]
struct ItemRecord {
    kind: ItemKind,
    at: WorldPoint,
}

#[derive(Debug, Clone, Copy)]
struct NpcRecord {
    variant: NpcVariant,
    active: bool,
    at: Option<WorldPoint>,
}

/// In-memory spawner that mints handles and tracks what is live.
///
/// Stands in for the presentation layer in tests and in the headless demo:
/// every fragment it "instantiates" is fully walled and contributes a fixed
/// number of item spawn points and NPC waypoints.
#[derive(Debug)]
pub struct MemorySpawner {
    item_points_per_fragment: usize,
    npc_waypoints_per_fragment: usize,
    fragments: Vec<FragmentHandle>,
    items: HashMap<ItemHandle, ItemRecord>,
    npcs: HashMap<NpcHandle, NpcRecord>,
    despawned_connectors: usize,
    despawned_items: usize,
    fail_item_spawns: usize,
    fail_npc_spawns: usize,
    item_spawn_budget: Option<usize>,
}

impl MemorySpawner {
    /// Creates a spawner whose fragments carry 3 item spawn points and 2
    /// NPC waypoints each.
    pub fn new() -> Self {
        Self::with_density(3, 2)
    }

    /// Creates a spawner with a chosen per-fragment spawn-point density.
    pub fn with_density(item_points: usize, npc_waypoints: usize) -> Self {
        Self {
            item_points_per_fragment: item_points,
            npc_waypoints_per_fragment: npc_waypoints,
            fragments: Vec::new(),
            items: HashMap::new(),
            npcs: HashMap::new(),
            despawned_connectors: 0,
            despawned_items: 0,
            fail_item_spawns: 0,
            fail_npc_spawns: 0,
            item_spawn_budget: None,
        }
    }

    /// Item spawn points each fragment contributes.
    pub fn item_points_per_fragment(&self) -> usize {
        self.item_points_per_fragment
    }

    /// NPC waypoints each fragment contributes.
    pub fn npc_waypoints_per_fragment(&self) -> usize {
        self.npc_waypoints_per_fragment
    }

    /// Makes the next `n` item spawn requests fail, to exercise the
    /// degraded-round policy.
    pub fn fail_next_item_spawns(&mut self, n: usize) {
        self.fail_item_spawns = n;
    }

    /// Makes the next `n` NPC spawn requests fail.
    pub fn fail_next_npc_spawns(&mut self, n: usize) {
        self.fail_npc_spawns = n;
    }

    /// Allows only `n` more item spawns to succeed; later requests fail
    /// until the budget is lifted with [`MemorySpawner::clear_item_budget`].
    pub fn limit_item_spawns(&mut self, n: usize) {
        self.item_spawn_budget = Some(n);
    }

    /// Lifts a previously set item spawn budget.
    pub fn clear_item_budget(&mut self) {
        self.item_spawn_budget = None;
    }

    /// Number of fragments instantiated.
    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    /// Number of boundary walls destroyed by stitching.
    pub fn despawned_connectors(&self) -> usize {
        self.despawned_connectors
    }

    /// Number of item despawn requests that removed a live item.
    pub fn despawned_items(&self) -> usize {
        self.despawned_items
    }

    /// Whether an item handle is still live.
    pub fn item_is_live(&self, item: ItemHandle) -> bool {
        self.items.contains_key(&item)
    }

    /// Where a live item was spawned.
    pub fn item_position(&self, item: ItemHandle) -> Option<WorldPoint> {
        self.items.get(&item).map(|record| record.at)
    }

    /// Number of live collectible items (health pickups excluded).
    pub fn live_item_count(&self) -> usize {
        self.items
            .values()
            .filter(|record| matches!(record.kind, ItemKind::Collectible(_)))
            .count()
    }

    /// Number of live health pickups.
    pub fn live_health_pickup_count(&self) -> usize {
        self.items
            .values()
            .filter(|record| record.kind == ItemKind::HealthPickup)
            .count()
    }

    /// Number of NPCs currently active.
    pub fn active_npc_count(&self) -> usize {
        self.npcs.values().filter(|npc| npc.active).count()
    }

    /// Number of NPC objects ever instantiated (active or pooled).
    pub fn npc_instance_count(&self) -> usize {
        self.npcs.len()
    }

    /// The waypoints active NPCs currently stand on.
    pub fn active_npc_positions(&self) -> Vec<WorldPoint> {
        self.npcs
            .values()
            .filter(|npc| npc.active)
            .filter_map(|npc| npc.at)
            .collect()
    }

    /// The variant of a live NPC.
    pub fn npc_variant(&self, npc: NpcHandle) -> Option<NpcVariant> {
        self.npcs.get(&npc).map(|record| record.variant)
    }
}

impl Default for MemorySpawner {
    fn default() -> Self {
        Self::new()
    }
}

impl Spawner for MemorySpawner {
    fn spawn_fragment(
        &mut self,
        _variant: FragmentVariant,
        cell: GridPos,
    ) -> ForageResult<FragmentSpawn> {
        let origin = cell.to_world();
        let handle = FragmentHandle::new();
        self.fragments.push(handle);

        // Spread local points along the fragment diagonal so every point
        // is distinct in world space.
        let item_spawn_points = (0..self.item_points_per_fragment)
            .map(|i| WorldPoint::new(origin.x + 1.0 + i as f32, origin.y + 1.0 + i as f32))
            .collect();
        let npc_waypoints = (0..self.npc_waypoints_per_fragment)
            .map(|i| WorldPoint::new(origin.x + 2.0 + i as f32, origin.y + 6.0 - i as f32))
            .collect();

        Ok(FragmentSpawn {
            handle,
            anchor: WorldPoint::new(origin.x + 4.0, origin.y + 4.0),
            connectors: Connectors::full(),
            item_spawn_points,
            npc_waypoints,
        })
    }

    fn despawn_connector(&mut self, _connector: ConnectorHandle) {
        self.despawned_connectors += 1;
    }

    fn spawn_item(&mut self, variant: ItemVariant, at: WorldPoint) -> ForageResult<ItemHandle> {
        if self.fail_item_spawns > 0 {
            self.fail_item_spawns -= 1;
            return Err(ForageError::Spawn("item pool exhausted".to_string()));
        }
        match self.item_spawn_budget.as_mut() {
            Some(0) => return Err(ForageError::Spawn("item pool exhausted".to_string())),
            Some(budget) => *budget -= 1,
            None => {}
        }
        let handle = ItemHandle::new();
        self.items.insert(
            handle,
            ItemRecord {
                kind: ItemKind::Collectible(variant),
                at,
            },
        );
        Ok(handle)
    }

    fn spawn_health_pickup(&mut self, at: WorldPoint) -> ForageResult<ItemHandle> {
        let handle = ItemHandle::new();
        self.items.insert(
            handle,
            ItemRecord {
                kind: ItemKind::HealthPickup,
                at,
            },
        );
        Ok(handle)
    }

    fn despawn_item(&mut self, item: ItemHandle) {
        if self.items.remove(&item).is_some() {
            self.despawned_items += 1;
        }
    }

    fn spawn_npc(&mut self, variant: NpcVariant) -> ForageResult<NpcHandle> {
        if self.fail_npc_spawns > 0 {
            self.fail_npc_spawns -= 1;
            return Err(ForageError::Spawn("NPC pool exhausted".to_string()));
        }
        let handle = NpcHandle::new();
        self.npcs.insert(
            handle,
            NpcRecord {
                variant,
                active: true,
                at: None,
            },
        );
        Ok(handle)
    }

    fn place_npc(&mut self, npc: NpcHandle, at: WorldPoint) {
        if let Some(record) = self.npcs.get_mut(&npc) {
            record.at = Some(at);
        }
    }

    fn set_npc_active(&mut self, npc: NpcHandle, active: bool) {
        if let Some(record) = self.npcs.get_mut(&npc) {
            record.active = active;
        }
    }
}

/// Volatile score store backed by a map. Used in tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryScoreStore {
    values: HashMap<String, f32>,
}

impl MemoryScoreStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding a value for `prefix`.
    pub fn with_value(prefix: &str, value: f32) -> Self {
        let mut store = Self::new();
        store.values.insert(prefix.to_string(), value);
        store
    }

    /// The stored scalar for `prefix`, if any.
    pub fn stored(&self, prefix: &str) -> Option<f32> {
        self.values.get(prefix).copied()
    }
}

impl ScoreStore for MemoryScoreStore {
    fn load(&self, prefix: &str) -> ForageResult<f32> {
        Ok(self.values.get(prefix).copied().unwrap_or(0.0))
    }

    fn save(&mut self, prefix: &str, value: f32) -> ForageResult<()> {
        self.values.insert(prefix.to_string(), value);
        Ok(())
    }
}

/// On-disk layout of the score file: one scalar per prefix.
#[derive(Debug, Default, Serialize, Deserialize)]
struct ScoreFile {
    scores: HashMap<String, f32>,
}

/// Score store persisted as a small JSON file.
///
/// A missing file loads as zeros; a corrupt file is treated as missing on
/// the next save rather than failing the session.
#[derive(Debug)]
pub struct FileScoreStore {
    path: PathBuf,
}

impl FileScoreStore {
    /// Creates a store backed by the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_file(&self) -> ForageResult<ScoreFile> {
        if !self.path.exists() {
            return Ok(ScoreFile::default());
        }
        let raw = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

impl ScoreStore for FileScoreStore {
    fn load(&self, prefix: &str) -> ForageResult<f32> {
        let file = self.read_file()?;
        Ok(file.scores.get(prefix).copied().unwrap_or(0.0))
    }

    fn save(&mut self, prefix: &str, value: f32) -> ForageResult<()> {
        let mut file = self.read_file().unwrap_or_default();
        file.scores.insert(prefix.to_string(), value);
        std::fs::write(&self.path, serde_json::to_string_pretty(&file)?)?;
        Ok(())
    }
}
