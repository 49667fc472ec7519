//! # Forage Round Engine
//!
//! The round-based progression core of a top-down survival/collection game.
//!
//! ## Architecture Overview
//!
//! The crate is a headless game-loop core. It drives a finite-state loop
//! (pre-round, active round, end-of-day/end-of-week pauses, game over),
//! grows the playable map one fragment at a time as rounds advance, and
//! schedules collectible items and patrolling NPCs onto that map. Key
//! pieces:
//!
//! - **State Machine**: generic container with enter/exit/tick hooks and an
//!   explicit transition table over the game phases
//! - **Map Grid**: sparse, growable 2D grid of map fragments with
//!   edge-stitching between adjoining fragments
//! - **Round Director**: per-round item/NPC scheduling with an NPC pool
//! - **Score Keeper**: score plus a persisted high-score watermark
//! - **Game Manager**: single entry point for ticks and gameplay events
//!
//! Rendering, audio, player physics and NPC pathfinding live behind the
//! collaborator traits in [`hooks`]; the core only issues spawn/despawn and
//! presentation requests through them.

pub mod game;
pub mod hooks;
pub mod map;
pub mod utils;

// Core module re-exports
pub use game::*;
pub use hooks::*;
pub use map::*;

// Explicit re-exports for commonly used types
pub use game::{
    // From director
    director::{item_count_for_round, npc_count_for_round, RoundDirector},
    // From machine
    machine::{State, StateMachine},
    // From manager
    manager::GameManager,
    // From score
    score::ScoreKeeper,
    // From states
    states::{next_phase, GamePhase, PhaseEvent, PhaseKind, RoundState},
};

/// Core error type for the forage engine.
#[derive(thiserror::Error, Debug)]
pub enum ForageError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Startup configuration is unusable
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A phase transition or call is invalid for the current phase
    #[error("Invalid game state: {0}")]
    InvalidState(String),

    /// A spawn collaborator refused or failed a request
    #[error("Spawn request failed: {0}")]
    Spawn(String),
}

/// Result type used throughout the forage codebase.
pub type ForageResult<T> = Result<T, ForageError>;

/// Version information for the engine.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Game configuration constants.
pub mod config {
    /// Countdown budget for every round, in seconds
    pub const ROUND_SECONDS: f32 = 60.0;

    /// Items scheduled in round 1 before the growth term kicks in
    pub const BASE_ITEMS_PER_ROUND: u32 = 2;

    /// Score awarded per collected target item
    pub const BASE_POINTS_PER_ITEM: f32 = 100.0;

    /// Exponential base of the per-round item growth term
    pub const ITEM_GROWTH_FACTOR: f64 = 1.125;

    /// NPCs enter at this round number and scale by integer division
    pub const NPC_ROUND_DIVISOR: u32 = 4;

    /// A new map fragment is placed every this many rounds
    pub const MAP_GROWTH_INTERVAL: u32 = 7;

    /// Side length of one map fragment in world units
    pub const FRAGMENT_SIZE: f32 = 8.0;

    /// Health pips the player starts with; also the display cap
    pub const MAX_HEALTH: i32 = 3;

    /// Seconds between collecting an item and hiding it
    pub const ITEM_DESPAWN_DELAY: f32 = 0.5;

    /// Inclusive lower bound on the gap (in rounds) between health
    /// pickup spawns
    pub const HEALTH_SPAWN_MIN_GAP: u32 = 5;

    /// Exclusive upper bound on the health pickup gap
    pub const HEALTH_SPAWN_MAX_GAP: u32 = 10;

    /// Weekday labels, indexed by `(round_number - 1) % 7`
    pub const DAYS: [&str; 7] = [
        "Monday",
        "Tuesday",
        "Wednesday",
        "Thursday",
        "Friday",
        "Saturday",
        "Sunday",
    ];

    /// Persistence prefix for the game's high score
    pub const SCORE_PREFIX: &str = "GAME";
}
