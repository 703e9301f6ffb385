/// Entry point and game loop.

mod config;
mod domain;
mod error;
mod sim;
mod ui;

use std::fs::File;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing_subscriber::EnvFilter;

use config::GameConfig;
use domain::entity::Direction;
use sim::event::GameEvent;
use sim::frame::compose;
use sim::level::load_levels;
use sim::step::step;
use sim::world::WorldState;
use ui::input::InputState;
use ui::renderer::Renderer;

const FRAME_SLEEP: Duration = Duration::from_millis(5);
const LOG_FILE_VAR: &str = "SPIKEFALL_LOG_FILE";
const DEFAULT_LOG_FILE: &str = "spikefall.log";

fn main() {
    init_tracing();

    let config = GameConfig::load();
    let levels = match load_levels(config.levels_file.as_deref()) {
        Ok(levels) => levels,
        Err(e) => {
            tracing::error!(error = %e, "level data rejected");
            eprintln!("Level data rejected: {e}");
            std::process::exit(1);
        }
    };

    let mut world = WorldState::from_config(&config, levels);
    world.bind_sprites(config.sprites);
    tracing::info!(levels = world.levels.len(), tick_rate_ms = config.tick_rate_ms, "game ready");

    let mut renderer = Renderer::new();
    let mut input = InputState::new();

    match renderer.init() {
        Ok(enhanced) => input.honor_release = enhanced,
        Err(e) => {
            eprintln!("Terminal init failed: {e}");
            return;
        }
    }

    let result = game_loop(&mut world, &mut renderer, &mut input, &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        tracing::error!(error = %e, "game loop failed");
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Spikefall!");
    println!("Reached level {}.", world.progress.level);
}

/// Logs go to a file: the terminal belongs to the game.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("spikefall=info"));
    let path = std::env::var(LOG_FILE_VAR).unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());

    match File::create(&path) {
        Ok(file) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init(),
        Err(_) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::sink)
            .init(),
    }
}

fn game_loop(
    world: &mut WorldState,
    renderer: &mut Renderer,
    input: &mut InputState,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let started = Instant::now();
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(config.tick_rate_ms);
    let mut was_stalled = false;

    // Edge-triggered presses between ticks are kept until the next step
    let mut pending_click = false;
    let mut pending_restart = false;

    loop {
        input.drain_events();
        if input.quit_pressed() {
            tracing::info!(tick = world.tick, "quit requested");
            break;
        }

        let mut frame_input = input.frame_input();
        pending_click |= frame_input.click;
        pending_restart |= frame_input.direction == Some(Direction::Restart);

        if last_tick.elapsed() >= tick_rate {
            frame_input.click = std::mem::take(&mut pending_click);
            if std::mem::take(&mut pending_restart) {
                frame_input.direction = Some(Direction::Restart);
            }
            for event in step(world, frame_input, started.elapsed()) {
                log_event(&event, world);
            }

            let stalled = world.resources.is_stalled();
            if stalled && !was_stalled {
                tracing::info!(health = world.resources.health, "actor stalled");
            }
            was_stalled = stalled;

            last_tick = Instant::now();
        }

        renderer.render(&compose(world), world.size)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

fn log_event(event: &GameEvent, world: &WorldState) {
    let tick = world.tick;
    match *event {
        GameEvent::Hurt { source, index, amount } => {
            tracing::debug!(tick, %source, index, amount, health = world.resources.health, "hurt");
        }
        GameEvent::Dashed { stamina_left } => tracing::trace!(tick, stamina_left, "dash"),
        GameEvent::DropTriggered { index } => tracing::trace!(tick, index, "drop-spike falling"),
        GameEvent::DropLanded { index } => tracing::trace!(tick, index, "drop-spike down"),
        GameEvent::Climbed { ladder } => tracing::debug!(tick, ladder, "climbed"),
        GameEvent::DialogueAdvanced { step } => tracing::debug!(tick, step, "dialogue"),
        GameEvent::LevelAdvanced { level } => tracing::debug!(tick, level, "entered level"),
        GameEvent::FellOffLadder
        | GameEvent::Landed
        | GameEvent::GoalReached
        | GameEvent::Restarted => tracing::trace!(tick, ?event, "game event"),
    }
}
