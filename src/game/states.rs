//! # Game Phases
//!
//! The concrete states of the round loop and the explicit transition table
//! between them.
//!
//! Phases are a sum type rather than trait objects so the transition table
//! in [`next_phase`] can be checked exhaustively. Presentation side effects
//! (GUI panels, audio) are the game manager's responsibility; the phase
//! hooks themselves only keep per-phase bookkeeping.

use crate::game::machine::State;
use crate::game::ItemVariant;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// An active, timed round: the ordered sequence of items the player must
/// collect, and the reward per item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundState {
    targets: VecDeque<ItemVariant>,
    points_per_item: f32,
    /// Seconds spent in this round so far
    elapsed: f32,
}

impl RoundState {
    /// Creates a round over the given target sequence.
    pub fn new(targets: Vec<ItemVariant>, points_per_item: f32) -> Self {
        Self {
            targets: targets.into(),
            points_per_item,
            elapsed: 0.0,
        }
    }

    /// The item the player must collect next, or `None` once the sequence
    /// is exhausted.
    pub fn current_target(&self) -> Option<ItemVariant> {
        self.targets.front().copied()
    }

    /// Pops the head of the target sequence.
    pub fn advance(&mut self) -> Option<ItemVariant> {
        self.targets.pop_front()
    }

    /// Targets still outstanding.
    pub fn remaining_targets(&self) -> usize {
        self.targets.len()
    }

    /// Score awarded per collected target this round.
    pub fn points_per_item(&self) -> f32 {
        self.points_per_item
    }

    /// Seconds this round has been live.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}

/// The exactly-one-active game phase.
#[derive(Debug, Clone)]
pub enum GamePhase {
    /// Pre-game: nothing prepared yet
    Init,
    /// An active, timed round
    Round(RoundState),
    /// Pause screen between ordinary rounds
    EndOfDay { label: String },
    /// Pause screen after every seventh round
    EndOfWeek { label: String },
    /// Terminal: no outgoing transitions
    GameOver,
}

impl GamePhase {
    /// The data-free tag of this phase, for transition lookups.
    pub fn kind(&self) -> PhaseKind {
        match self {
            GamePhase::Init => PhaseKind::Init,
            GamePhase::Round(_) => PhaseKind::Round,
            GamePhase::EndOfDay { .. } => PhaseKind::EndOfDay,
            GamePhase::EndOfWeek { .. } => PhaseKind::EndOfWeek,
            GamePhase::GameOver => PhaseKind::GameOver,
        }
    }
}

impl State for GamePhase {
    fn on_enter(&mut self) {
        log::debug!("entering phase {:?}", self.kind());
    }

    fn on_exit(&mut self) {
        log::debug!("leaving phase {:?}", self.kind());
    }

    fn on_tick(&mut self, dt: f32) {
        if let GamePhase::Round(round) = self {
            round.elapsed += dt;
        }
    }
}

/// Data-free phase tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhaseKind {
    Init,
    Round,
    EndOfDay,
    EndOfWeek,
    GameOver,
}

/// Triggers that may move the loop from one phase to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhaseEvent {
    /// The session begins
    Start,
    /// All targets collected in an ordinary round
    DayComplete,
    /// All targets collected in a round whose number is a multiple of 7
    WeekComplete,
    /// The round countdown expired
    RoundTimeout,
    /// Health reached zero
    HealthDepleted,
    /// The player dismissed a pause screen
    Continue,
}

/// The transition table: which phase follows `current` when `event` fires.
///
/// Returns `None` for pairs the design does not wire, including everything
/// out of the terminal [`PhaseKind::GameOver`]; callers treat that as a
/// programmer error.
///
/// # Examples
///
/// ```
/// use forage::{next_phase, PhaseEvent, PhaseKind};
///
/// assert_eq!(
///     next_phase(PhaseKind::Round, PhaseEvent::RoundTimeout),
///     Some(PhaseKind::GameOver)
/// );
/// assert_eq!(next_phase(PhaseKind::GameOver, PhaseEvent::Continue), None);
/// ```
pub fn next_phase(current: PhaseKind, event: PhaseEvent) -> Option<PhaseKind> {
    use PhaseEvent::*;
    use PhaseKind::*;

    match (current, event) {
        (Init, Start) => Some(Round),
        (Round, DayComplete) => Some(EndOfDay),
        (Round, WeekComplete) => Some(EndOfWeek),
        (Round, RoundTimeout) => Some(GameOver),
        // Health can also bottom out on a pause screen (e.g. a queued
        // damage event landing after the round ended).
        (Round | EndOfDay | EndOfWeek, HealthDepleted) => Some(GameOver),
        (EndOfDay | EndOfWeek, Continue) => Some(Round),
        _ => None,
    }
}
