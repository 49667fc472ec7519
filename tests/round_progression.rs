//! End-to-end tests of the round loop: scheduling formulas over a real
//! session, pause/continue flow, timeout, and high-score persistence.

use forage::{
    FileScoreStore, ForageResult, GameConfig, GameManager, ItemVariant, MemoryScoreStore,
    MemorySpawner, PhaseKind, Presenter, ScoreStore, VariantCatalog,
};

/// Presenter that keeps only what these tests assert on.
#[derive(Debug, Default)]
struct QuietPresenter {
    labels: Vec<String>,
    game_over: bool,
}

impl Presenter for QuietPresenter {
    fn present_score(&mut self, _score: &str, _high_score: &str) {}
    fn present_time(&mut self, _time: &str) {}
    fn present_health_pips(&mut self, _pips: u8) {}
    fn present_target_item(&mut self, _item: Option<ItemVariant>) {}

    fn present_end_of_day(&mut self, label: &str) {
        self.labels.push(label.to_string());
    }

    fn present_game_over(&mut self, _score: &str, _high_score: &str) {
        self.game_over = true;
    }
}

type TestGame<T> = GameManager<QuietPresenter, MemorySpawner, T>;

fn new_game(seed: u64) -> TestGame<MemoryScoreStore> {
    GameManager::new(
        GameConfig::for_testing(seed),
        VariantCatalog::new(4, 6, 2).unwrap(),
        QuietPresenter::default(),
        MemorySpawner::new(),
        MemoryScoreStore::new(),
    )
    .unwrap()
}

/// Collects every remaining target of the active round.
fn clear_round<T: ScoreStore>(game: &mut TestGame<T>) {
    while game.phase_kind() == PhaseKind::Round {
        let target = game.current_target().expect("active round has a target");
        let handle = game
            .director()
            .spawned_items()
            .iter()
            .find(|item| item.variant == target && !item.is_collected())
            .map(|item| item.handle)
            .expect("target item is spawned");
        game.on_item_collected(handle).unwrap();
    }
}

/// Clears rounds and continues until the given round is active.
fn play_until_round<T: ScoreStore>(game: &mut TestGame<T>, round: u32) {
    while game.round_number() < round {
        clear_round(game);
        game.on_continue_pressed().unwrap();
    }
}

#[test]
fn test_fresh_start_scenario() -> ForageResult<()> {
    let mut game = new_game(42);
    game.start()?;

    // Exactly one fragment, no stitching, start point recorded.
    let map = game.map();
    assert_eq!(map.placed_count(), 1);
    assert_eq!(map.extent(), 1);
    assert!(map.start_point().is_some());
    assert_eq!(game.spawner().despawned_connectors(), 0);

    // The global lists equal the first fragment's local lists.
    assert_eq!(
        map.item_spawn_points().len(),
        game.spawner().item_points_per_fragment()
    );
    assert_eq!(
        map.npc_waypoints().len(),
        game.spawner().npc_waypoints_per_fragment()
    );
    Ok(())
}

#[test]
fn test_item_counts_follow_growth_formula() {
    // Capacity is 3 spawn points per fragment: 3 through round 7, then 6.
    let expected = [2usize, 2, 2, 2, 2, 3, 3, 3, 3, 4];

    let mut game = new_game(43);
    game.start().unwrap();
    for (round, want) in expected.iter().enumerate() {
        let round = round as u32 + 1;
        assert_eq!(game.round_number(), round);
        let scheduled = game
            .director()
            .spawned_items()
            .iter()
            .filter(|item| !item.is_collected())
            .count();
        assert_eq!(scheduled, *want, "round {round}");
        clear_round(&mut game);
        game.on_continue_pressed().unwrap();
    }
}

#[test]
fn test_npc_counts_scale_with_rounds() {
    let mut game = new_game(44);
    game.start().unwrap();

    // No NPCs before round 4.
    for _ in 1..4 {
        assert_eq!(game.director().active_npcs().len(), 0);
        clear_round(&mut game);
        game.on_continue_pressed().unwrap();
    }
    assert_eq!(game.round_number(), 4);
    assert_eq!(game.director().active_npcs().len(), 1);
    assert_eq!(game.spawner().active_npc_count(), 1);

    play_until_round(&mut game, 15);
    // Round 15 fields three NPCs on three distinct waypoints.
    let npcs = game.director().active_npcs();
    assert_eq!(npcs.len(), 3);
    let mut waypoints: Vec<usize> = npcs.iter().map(|npc| npc.waypoint).collect();
    waypoints.sort_unstable();
    waypoints.dedup();
    assert_eq!(waypoints.len(), 3);
    assert_eq!(game.spawner().active_npc_count(), 3);
}

#[test]
fn test_pause_screens_deactivate_npcs_and_continue_restores() {
    let mut game = new_game(45);
    game.start().unwrap();
    play_until_round(&mut game, 4);
    assert_eq!(game.spawner().active_npc_count(), 1);

    clear_round(&mut game);
    assert_eq!(game.phase_kind(), PhaseKind::EndOfDay);
    assert_eq!(game.spawner().active_npc_count(), 0);
    assert!(game.director().pooled_npc_count() >= 1);

    game.on_continue_pressed().unwrap();
    assert_eq!(game.phase_kind(), PhaseKind::Round);
    assert_eq!(game.round_number(), 5);
    assert_eq!(game.time_left(), 60.0);
}

#[test]
fn test_week_labels_over_two_weeks() {
    let mut game = new_game(46);
    game.start().unwrap();
    for _ in 0..8 {
        clear_round(&mut game);
        if game.round_number() < 8 {
            game.on_continue_pressed().unwrap();
        }
    }

    let labels = &game.presenter().labels;
    assert_eq!(labels.len(), 8);
    assert_eq!(labels[0], "Monday, Week 1!");
    assert_eq!(labels[5], "Saturday, Week 1!");
    assert_eq!(labels[6], "Week 1 Done!");
    assert_eq!(labels[7], "Monday, Week 2!");
}

#[test]
fn test_timeout_with_fractional_ticks() {
    let mut game = new_game(47);
    game.start().unwrap();

    let dt = 1.0 / 30.0;
    let mut elapsed = 0.0;
    while elapsed <= 61.0 && game.phase_kind() == PhaseKind::Round {
        game.tick(dt).unwrap();
        elapsed += dt;
    }
    assert_eq!(game.phase_kind(), PhaseKind::GameOver);
    assert!(game.presenter().game_over);
    // Round items are left in place; only NPCs stand down.
    assert_eq!(game.spawner().active_npc_count(), 0);
}

#[test]
fn test_score_accumulates_and_survives_sessions() {
    let path = std::env::temp_dir().join(format!(
        "forage-progression-{}.json",
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);

    let mut game = GameManager::new(
        GameConfig::for_testing(48),
        VariantCatalog::new(4, 6, 2).unwrap(),
        QuietPresenter::default(),
        MemorySpawner::new(),
        FileScoreStore::new(&path),
    )
    .unwrap();
    game.start().unwrap();
    clear_round(&mut game); // two targets at 100 points each
    assert_eq!(game.score(), 200.0);
    assert_eq!(game.high_score(), 200.0);

    // A new session loads the watermark back.
    let rematch = GameManager::new(
        GameConfig::for_testing(49),
        VariantCatalog::new(4, 6, 2).unwrap(),
        QuietPresenter::default(),
        MemorySpawner::new(),
        FileScoreStore::new(&path),
    )
    .unwrap();
    assert_eq!(rematch.score(), 0.0);
    assert_eq!(rematch.high_score(), 200.0);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_collected_items_despawn_shortly_after_pickup() {
    let mut game = new_game(50);
    game.start().unwrap();

    let target = game.current_target().unwrap();
    let handle = game
        .director()
        .spawned_items()
        .iter()
        .find(|item| item.variant == target)
        .unwrap()
        .handle;
    game.on_item_collected(handle).unwrap();
    assert!(game.spawner().item_is_live(handle));

    game.tick(0.05).unwrap();
    assert!(!game.spawner().item_is_live(handle));
    // The second target is still collectible afterwards.
    assert_eq!(game.phase_kind(), PhaseKind::Round);
    clear_round(&mut game);
    assert_eq!(game.phase_kind(), PhaseKind::EndOfDay);
}
