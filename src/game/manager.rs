//! # Game Manager
//!
//! Top-level orchestration: owns the state machine, map grid, round
//! director and score keeper, and is the single entry point for external
//! ticks and gameplay events.
//!
//! The host drives the manager with one [`GameManager::tick`] per frame
//! and forwards player-adjacent events (item touched, NPC collision,
//! pause-screen button) to the corresponding `on_*` method. All mutation
//! is synchronous within those calls; there is no internal threading.

use crate::game::machine::StateMachine;
use crate::game::states::{next_phase, GamePhase, PhaseEvent, PhaseKind, RoundState};
use crate::game::{
    GameConfig, ItemHandle, ItemVariant, RoundDirector, ScoreKeeper, VariantCatalog,
};
use crate::hooks::{Presenter, ScoreStore, Spawner};
use crate::map::MapGrid;
use crate::{config, utils, ForageError, ForageResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A collected item waiting out its short hide delay.
#[derive(Debug, Clone, Copy)]
struct PendingDespawn {
    handle: ItemHandle,
    remaining: f32,
}

/// The round-loop orchestrator.
///
/// Composes the state machine, map grid, round director and score keeper,
/// and issues every spawn/despawn and presentation request through the
/// collaborators it was constructed with.
pub struct GameManager<P: Presenter, S: Spawner, T: ScoreStore> {
    cfg: GameConfig,
    catalog: VariantCatalog,
    machine: StateMachine<GamePhase>,
    map: MapGrid,
    director: RoundDirector,
    scorer: ScoreKeeper<T>,
    presenter: P,
    spawner: S,
    rng: StdRng,
    round_number: u32,
    health: i32,
    time_left: f32,
    pending_despawns: Vec<PendingDespawn>,
    next_health_spawn_round: u32,
}

impl<P: Presenter, S: Spawner, T: ScoreStore> GameManager<P, S, T> {
    /// Creates a manager in the pre-game phase.
    ///
    /// Fails fast when the variant catalog is unusable. Loads the
    /// persisted high score, pushes the initial score/health presentation,
    /// and draws the round on which the first health pickup appears.
    pub fn new(
        cfg: GameConfig,
        catalog: VariantCatalog,
        presenter: P,
        spawner: S,
        store: T,
    ) -> ForageResult<Self> {
        catalog.validate()?;

        let mut rng = StdRng::seed_from_u64(cfg.seed);
        let next_health_spawn_round =
            rng.gen_range(config::HEALTH_SPAWN_MIN_GAP..config::HEALTH_SPAWN_MAX_GAP);
        let scorer = ScoreKeeper::new(&cfg.score_prefix, store);
        let director = RoundDirector::new(cfg.base_items_per_round, cfg.base_points_per_item);

        let mut machine = StateMachine::new();
        machine.set_state(GamePhase::Init);

        let time_left = cfg.round_seconds;
        let mut manager = Self {
            cfg,
            catalog,
            machine,
            map: MapGrid::new(),
            director,
            scorer,
            presenter,
            spawner,
            rng,
            round_number: 0,
            health: config::MAX_HEALTH,
            time_left,
            pending_despawns: Vec::new(),
            next_health_spawn_round,
        };
        manager.add_score(0.0); // renders the score labels
        manager
            .presenter
            .present_health_pips(manager.health as u8);
        Ok(manager)
    }

    /// Begins the session: places the start fragment, prepares round 1 and
    /// enters the round phase.
    pub fn start(&mut self) -> ForageResult<()> {
        self.expect_transition(PhaseEvent::Start)?;
        let round = self.advance_round(true)?;
        self.presenter.present_target_item(round.current_target());
        self.machine.set_state(GamePhase::Round(round));
        Ok(())
    }

    /// Advances one frame: forwards the tick to the current phase, drains
    /// due item despawns, counts the round timer down and re-renders it,
    /// and forces game over when an active round's timer expires.
    pub fn tick(&mut self, dt: f32) -> ForageResult<()> {
        self.machine.tick(dt);
        self.flush_despawns(dt);

        self.time_left -= dt;
        self.presenter
            .present_time(&utils::format_countdown(self.time_left));

        if self.time_left <= 0.0 && self.phase_kind() == PhaseKind::Round {
            log::info!("round {} timed out", self.round_number);
            self.enter_game_over(PhaseEvent::RoundTimeout)?;
        }
        Ok(())
    }

    /// Notifies the core that the player touched a spawned item.
    ///
    /// Collections are ignored outside an active round, for items that are
    /// not the current target, and for items already collected. A valid
    /// collection scores, advances the target sequence, schedules the
    /// item's deferred despawn, and ends the round when the sequence is
    /// exhausted.
    pub fn on_item_collected(&mut self, item: ItemHandle) -> ForageResult<()> {
        if self.phase_kind() != PhaseKind::Round {
            return Ok(());
        }
        let Some(variant) = self.director.variant_of_live(item) else {
            return Ok(());
        };

        let (points, next_target) = {
            let Some(round) = self.round_state_mut() else {
                return Ok(());
            };
            if round.current_target() != Some(variant) {
                return Ok(());
            }
            round.advance();
            (round.points_per_item(), round.current_target())
        };

        self.director.mark_collected(item);
        self.pending_despawns.push(PendingDespawn {
            handle: item,
            remaining: self.cfg.item_despawn_delay,
        });
        self.add_score(points);
        self.presenter.present_target_item(next_target);

        if next_target.is_none() {
            self.finish_round()?;
        }
        Ok(())
    }

    /// Notifies the core that an NPC caught the player.
    pub fn on_player_damaged(&mut self) -> ForageResult<()> {
        self.set_health(self.health - 1)
    }

    /// Notifies the core that the player grabbed the health pickup.
    pub fn on_health_pickup(&mut self) -> ForageResult<()> {
        if let Some(pickup) = self.director.collect_health_pickup() {
            self.spawner.despawn_item(pickup);
        }
        self.set_health(self.health + 1)
    }

    /// Resumes play from an end-of-day or end-of-week pause.
    pub fn on_continue_pressed(&mut self) -> ForageResult<()> {
        self.expect_transition(PhaseEvent::Continue)?;
        let round = self.advance_round(false)?;
        self.presenter.present_target_item(round.current_target());
        self.machine.set_state(GamePhase::Round(round));
        Ok(())
    }

    /// Sets health, clamped to `[0, 3]`; zero or below forces game over.
    pub fn set_health(&mut self, health: i32) -> ForageResult<()> {
        if self.phase_kind() == PhaseKind::GameOver {
            return Ok(()); // late events against a finished session
        }
        if health <= 0 {
            self.health = 0;
            self.presenter.present_health_pips(0);
            log::info!("health depleted in round {}", self.round_number);
            return self.enter_game_over(PhaseEvent::HealthDepleted);
        }
        self.health = health.min(config::MAX_HEALTH);
        self.presenter.present_health_pips(self.health as u8);
        Ok(())
    }

    /// The tag of the current phase.
    pub fn phase_kind(&self) -> PhaseKind {
        self.machine
            .current()
            .map(GamePhase::kind)
            .unwrap_or(PhaseKind::Init)
    }

    /// The current round number; 0 before the session starts.
    pub fn round_number(&self) -> u32 {
        self.round_number
    }

    /// Current health pips.
    pub fn health(&self) -> i32 {
        self.health
    }

    /// Seconds left on the round countdown.
    pub fn time_left(&self) -> f32 {
        self.time_left
    }

    /// Current session score.
    pub fn score(&self) -> f32 {
        self.scorer.score()
    }

    /// Persisted high-score watermark.
    pub fn high_score(&self) -> f32 {
        self.scorer.high_score()
    }

    /// The item the player must find next, if a round is active.
    pub fn current_target(&self) -> Option<ItemVariant> {
        match self.machine.current() {
            Some(GamePhase::Round(round)) => round.current_target(),
            _ => None,
        }
    }

    /// The fragment grid.
    pub fn map(&self) -> &MapGrid {
        &self.map
    }

    /// The round director (spawned items, active NPCs, pool).
    pub fn director(&self) -> &RoundDirector {
        &self.director
    }

    /// The spawn collaborator.
    pub fn spawner(&self) -> &S {
        &self.spawner
    }

    /// The presentation collaborator.
    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Round on which the next health pickup is scheduled.
    pub fn next_health_spawn_round(&self) -> u32 {
        self.next_health_spawn_round
    }

    /// Tears down the previous round, advances the round counter, grows
    /// the map when due, and prepares the next round's population.
    ///
    /// The caller installs the returned state into the machine.
    fn advance_round(&mut self, is_first: bool) -> ForageResult<RoundState> {
        self.round_number += 1;

        if (self.round_number - 1) % self.cfg.map_growth_interval == 0 {
            self.map
                .expand(is_first, &self.catalog, &mut self.spawner, &mut self.rng)?;
        }

        let round = self.director.prepare_round(
            self.round_number,
            &self.map,
            &self.catalog,
            &mut self.spawner,
            &mut self.rng,
        )?;

        if self.round_number >= self.next_health_spawn_round {
            let points = self.map.item_spawn_points();
            if !points.is_empty() {
                let at = points[self.rng.gen_range(0..points.len())];
                self.director.spawn_health_pickup(at, &mut self.spawner);
            }
            self.next_health_spawn_round = self.round_number
                + self
                    .rng
                    .gen_range(config::HEALTH_SPAWN_MIN_GAP..config::HEALTH_SPAWN_MAX_GAP);
        }

        self.time_left = self.cfg.round_seconds;
        log::info!("round {} begins", self.round_number);
        Ok(round)
    }

    /// Ends a cleared round: every seventh round closes the week,
    /// otherwise the day closes.
    fn finish_round(&mut self) -> ForageResult<()> {
        let week_boundary = self.round_number % 7 == 0;
        let event = if week_boundary {
            PhaseEvent::WeekComplete
        } else {
            PhaseEvent::DayComplete
        };
        self.expect_transition(event)?;
        self.director.deactivate_npcs(&mut self.spawner);

        let label = if week_boundary {
            format!("Week {} Done!", self.round_number / 7)
        } else {
            format!(
                "{}, Week {}!",
                config::DAYS[((self.round_number - 1) % 7) as usize],
                self.round_number / 7 + 1
            )
        };
        self.presenter.present_end_of_day(&label);
        self.machine.set_state(if week_boundary {
            GamePhase::EndOfWeek { label }
        } else {
            GamePhase::EndOfDay { label }
        });
        Ok(())
    }

    fn enter_game_over(&mut self, event: PhaseEvent) -> ForageResult<()> {
        self.expect_transition(event)?;
        self.director.deactivate_npcs(&mut self.spawner);
        self.machine.set_state(GamePhase::GameOver);
        self.presenter.present_game_over(
            &utils::abbreviate(self.scorer.score()),
            &format!("Best: {}", utils::abbreviate(self.scorer.high_score())),
        );
        Ok(())
    }

    fn expect_transition(&self, event: PhaseEvent) -> ForageResult<PhaseKind> {
        let current = self.phase_kind();
        next_phase(current, event).ok_or_else(|| {
            ForageError::InvalidState(format!("no transition from {current:?} on {event:?}"))
        })
    }

    fn round_state_mut(&mut self) -> Option<&mut RoundState> {
        match self.machine.current_mut() {
            Some(GamePhase::Round(round)) => Some(round),
            _ => None,
        }
    }

    fn add_score(&mut self, amount: f32) {
        self.scorer.increment(amount);
        self.presenter.present_score(
            &utils::abbreviate(self.scorer.score()),
            &format!("Best: {}", utils::abbreviate(self.scorer.high_score())),
        );
    }

    /// Counts pending hide timers down; a due timer despawns its item
    /// unless a round teardown already removed it.
    fn flush_despawns(&mut self, dt: f32) {
        let mut index = 0;
        while index < self.pending_despawns.len() {
            self.pending_despawns[index].remaining -= dt;
            if self.pending_despawns[index].remaining <= 0.0 {
                let pending = self.pending_despawns.swap_remove(index);
                if self.director.finish_despawn(pending.handle) {
                    self.spawner.despawn_item(pending.handle);
                }
            } else {
                index += 1;
            }
        }
    }
}
