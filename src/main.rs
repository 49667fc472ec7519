//! # Forage Headless Demo
//!
//! Runs a scripted session against the in-memory collaborators: ticks
//! frames, auto-collects targets, continues through the pause screens, and
//! prints a summary. Useful for exercising the round loop end to end
//! without a presentation layer.

use clap::Parser;
use forage::{
    FileScoreStore, ForageResult, GameConfig, GameManager, LogPresenter, MemorySpawner, PhaseKind,
    VariantCatalog,
};
use std::path::PathBuf;

/// Command line arguments for the forage demo.
#[derive(Parser, Debug)]
#[command(name = "forage")]
#[command(about = "Round-based progression engine demo")]
#[command(version)]
struct Args {
    /// Random seed for the session
    #[arg(short, long)]
    seed: Option<u64>,

    /// Rounds to auto-play before quitting
    #[arg(short, long, default_value_t = 10)]
    rounds: u32,

    /// Frames per second of simulated time
    #[arg(long, default_value_t = 20)]
    fps: u32,

    /// High score save file
    #[arg(long, default_value = "forage-scores.json")]
    save_file: PathBuf,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> ForageResult<()> {
    let args = Args::parse();

    env_logger::Builder::new()
        .parse_filters(&args.log_level)
        .format_timestamp(None)
        .init();

    let seed = args.seed.unwrap_or_else(rand::random);
    log::info!("forage v{} — seed {seed}", forage::VERSION);

    let catalog = VariantCatalog::new(4, 6, 2)?;
    let mut game = GameManager::new(
        GameConfig::new(seed),
        catalog,
        LogPresenter,
        MemorySpawner::new(),
        FileScoreStore::new(&args.save_file),
    )?;
    game.start()?;

    let dt = 1.0 / args.fps as f32;
    // Touch an item roughly twice a second; fast enough to clear every
    // round well inside the 60-second budget.
    let frames_per_grab = (args.fps / 2).max(1);
    let mut frame: u32 = 0;

    loop {
        match game.phase_kind() {
            PhaseKind::Round => {
                game.tick(dt)?;
                frame += 1;
                if frame % frames_per_grab == 0 {
                    if let Some(handle) = find_target_item(&game) {
                        game.on_item_collected(handle)?;
                    }
                }
            }
            PhaseKind::EndOfDay | PhaseKind::EndOfWeek => {
                if game.round_number() >= args.rounds {
                    break;
                }
                game.on_continue_pressed()?;
            }
            PhaseKind::GameOver => break,
            PhaseKind::Init => unreachable!("session already started"),
        }
    }

    log::info!(
        "session finished after round {}: score {}, best {}, map {}x{} ({} fragments)",
        game.round_number(),
        game.score(),
        game.high_score(),
        game.map().extent(),
        game.map().extent(),
        game.map().placed_count(),
    );
    Ok(())
}

/// The live, uncollected item matching the round's current target.
fn find_target_item(
    game: &GameManager<LogPresenter, MemorySpawner, FileScoreStore>,
) -> Option<forage::ItemHandle> {
    let target = game.current_target()?;
    game.director()
        .spawned_items()
        .iter()
        .find(|item| item.variant == target && !item.is_collected())
        .map(|item| item.handle)
}
