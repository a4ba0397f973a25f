use anyhow::Context;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use vibe_bugs_core::config::GameConfig;
use vibe_bugs_core::game::constants::world::{DT, TICK_RATE};
use vibe_bugs_core::game::game_loop::{Game, GameEvent};
use vibe_bugs_core::game::input::{InputFrame, ToolCycle, TriggerState, WormIntent};
use vibe_bugs_core::game::match_result::{GameStats, MatchResult};

/// Simulated seconds to run when no battle time limit is configured
const DEFAULT_RUN_SECONDS: f32 = 60.0;

#[derive(Serialize)]
struct Report {
    ticks: u64,
    deaths: usize,
    levels_completed: u32,
    stats: GameStats,
    result: MatchResult,
}

fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    info!("Vibe Bugs headless runner v{}", env!("CARGO_PKG_VERSION"));

    let config = GameConfig::from_env();
    let run_seconds = config.battle_time_limit.unwrap_or(DEFAULT_RUN_SECONDS);
    info!(
        characters = config.characters.len(),
        tools_mode = ?config.tools_mode,
        run_seconds,
        "Configuration loaded"
    );

    let mut game = Game::new(config).context("invalid game configuration")?;

    let total_ticks = (run_seconds * TICK_RATE as f32).ceil() as u64;
    let mut frame = InputFrame::new();
    let mut deaths = 0;
    let mut levels_completed = 0;

    for tick in 0..total_ticks {
        frame.clear();
        for worm in game.worms() {
            frame.set(worm.player_slot, scripted_intent(tick, worm.player_slot));
        }

        for event in game.tick(DT, &frame) {
            match event {
                GameEvent::Died { .. } => deaths += 1,
                GameEvent::LevelCompleted { .. } => levels_completed += 1,
                _ => {}
            }
        }

        if game.is_over() {
            break;
        }
    }

    let report = Report {
        ticks: game.state().tick,
        deaths,
        levels_completed,
        stats: game.game_stats(),
        result: game.result(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

/// Deterministic demo input: wander, dig down, and lob dynamite now and then
fn scripted_intent(tick: u64, slot: u8) -> WormIntent {
    let phase = (tick + slot as u64 * 97) % 600;
    let move_axis = if (tick / 180 + slot as u64) % 2 == 0 { 1.0 } else { -1.0 };

    let mut intent = WormIntent {
        move_axis,
        aim_axis: if phase < 60 { 0.5 } else { 0.0 },
        jump: phase % 150 == 0,
        ..WormIntent::idle()
    };

    match phase {
        // Switch to dynamite, charge for a second, throw, then switch back
        200 => intent.tool_cycle = ToolCycle::Next,
        201 => intent.trigger = TriggerState::Pressed,
        202..=260 => intent.trigger = TriggerState::Held,
        261 => intent.trigger = TriggerState::Released,
        262 => intent.tool_cycle = ToolCycle::Previous,
        // Drill every half second otherwise
        p if p % 30 == 0 => intent.trigger = TriggerState::Pressed,
        _ => {}
    }

    intent
}
