//! # Game Module
//!
//! Core round-loop types and the orchestration around them.
//!
//! This module contains the fundamental building blocks of the forage
//! engine:
//! - Shared value types (world points, grid coordinates, variant indices,
//!   spawn handles)
//! - The generic state machine and the concrete game phases
//! - Round scheduling, score bookkeeping, and the top-level game manager

pub mod director;
pub mod machine;
pub mod manager;
pub mod score;
pub mod states;

pub use director::*;
pub use machine::*;
pub use manager::*;
pub use score::*;
pub use states::*;

use crate::{config, ForageError, ForageResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A 2D point in world units.
///
/// # Examples
///
/// ```
/// use forage::WorldPoint;
///
/// let p = WorldPoint::new(8.0, 16.0);
/// assert_eq!(p.x, 8.0);
/// assert_eq!(p.y, 16.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldPoint {
    pub x: f32,
    pub y: f32,
}

impl WorldPoint {
    /// Creates a new world point.
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the origin point (0, 0).
    pub fn origin() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// A cell coordinate in the fragment grid.
///
/// Grid coordinates are non-negative; the grid only ever grows towards
/// increasing x and y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPos {
    pub x: usize,
    pub y: usize,
}

impl GridPos {
    /// Creates a new grid position.
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// The world-space position of this cell's fragment origin.
    ///
    /// # Examples
    ///
    /// ```
    /// use forage::GridPos;
    ///
    /// let world = GridPos::new(2, 1).to_world();
    /// assert_eq!(world.x, 16.0);
    /// assert_eq!(world.y, 8.0);
    /// ```
    pub fn to_world(self) -> WorldPoint {
        WorldPoint::new(
            self.x as f32 * config::FRAGMENT_SIZE,
            self.y as f32 * config::FRAGMENT_SIZE,
        )
    }
}

/// Index into the set of map fragment prefab variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FragmentVariant(pub usize);

/// Index into the set of collectible item variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemVariant(pub usize);

/// Index into the set of NPC variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NpcVariant(pub usize);

/// Unique identifier minted by spawn collaborators for spawned objects.
pub type HandleId = Uuid;

/// Creates a new unique handle id.
pub fn new_handle_id() -> HandleId {
    Uuid::new_v4()
}

macro_rules! handle_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub HandleId);

        impl $name {
            /// Mints a handle with a fresh unique id.
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(new_handle_id())
            }
        }
    };
}

handle_type!(
    /// Handle to a spawned map fragment.
    FragmentHandle
);
handle_type!(
    /// Handle to one boundary connector (wall) of a fragment.
    ConnectorHandle
);
handle_type!(
    /// Handle to a spawned collectible item.
    ItemHandle
);
handle_type!(
    /// Handle to a spawned NPC.
    NpcHandle
);

/// Counts of the visual variants the presentation layer can instantiate.
///
/// The core never sees prefabs or sprites; it only picks an index uniformly
/// at random below each count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantCatalog {
    /// Number of map fragment variants
    pub fragment_variants: usize,
    /// Number of collectible item variants
    pub item_variants: usize,
    /// Number of NPC variants
    pub npc_variants: usize,
}

impl VariantCatalog {
    /// Creates a catalog, failing fast on empty variant sets.
    ///
    /// # Examples
    ///
    /// ```
    /// use forage::VariantCatalog;
    ///
    /// assert!(VariantCatalog::new(4, 6, 2).is_ok());
    /// assert!(VariantCatalog::new(0, 6, 2).is_err());
    /// ```
    pub fn new(
        fragment_variants: usize,
        item_variants: usize,
        npc_variants: usize,
    ) -> ForageResult<Self> {
        let catalog = Self {
            fragment_variants,
            item_variants,
            npc_variants,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Checks that every variant set has at least one entry.
    pub fn validate(&self) -> ForageResult<()> {
        if self.fragment_variants == 0 {
            return Err(ForageError::Config(
                "no map fragment variants available".to_string(),
            ));
        }
        if self.item_variants == 0 {
            return Err(ForageError::Config(
                "no item variants available".to_string(),
            ));
        }
        if self.npc_variants == 0 {
            return Err(ForageError::Config("no NPC variants available".to_string()));
        }
        Ok(())
    }
}

/// Tunable parameters for a game session.
///
/// Defaults mirror the shipped game; tests shrink the despawn delay so a
/// collected item disappears on the next tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Random seed for reproducible sessions
    pub seed: u64,
    /// Items scheduled per round before the growth term
    pub base_items_per_round: u32,
    /// Score awarded per collected target item
    pub base_points_per_item: f32,
    /// Countdown budget per round, in seconds
    pub round_seconds: f32,
    /// Rounds between map fragment placements
    pub map_growth_interval: u32,
    /// Seconds between collecting an item and hiding it
    pub item_despawn_delay: f32,
    /// Persistence prefix for the high score
    pub score_prefix: String,
}

impl GameConfig {
    /// Creates the default configuration for the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            base_items_per_round: config::BASE_ITEMS_PER_ROUND,
            base_points_per_item: config::BASE_POINTS_PER_ITEM,
            round_seconds: config::ROUND_SECONDS,
            map_growth_interval: config::MAP_GROWTH_INTERVAL,
            item_despawn_delay: config::ITEM_DESPAWN_DELAY,
            score_prefix: config::SCORE_PREFIX.to_string(),
        }
    }

    /// Creates a configuration for tests: identical pacing, but collected
    /// items despawn on the next tick.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            item_despawn_delay: 0.0,
            ..Self::new(seed)
        }
    }
}
