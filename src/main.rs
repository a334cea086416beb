//! Chroma Dash headless demo
//!
//! Runs one autopilot session on a fixed-step clock and prints the run
//! summary as JSON.
//!
//! Usage: `chroma-dash [seed] [tuning.json]`

use std::process::ExitCode;

use chroma_dash::Tuning;
use chroma_dash::consts::SIM_DT;
use chroma_dash::sim::{GameEvent, GameSession, autopilot, tick};

/// Ten simulated minutes
const MAX_TICKS: u64 = 36_000;

fn main() -> ExitCode {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed = match args.next() {
        Some(raw) => match raw.parse::<u64>() {
            Ok(seed) => seed,
            Err(err) => {
                log::error!("Invalid seed {:?}: {}", raw, err);
                return ExitCode::FAILURE;
            }
        },
        None => 0x5eed,
    };
    let tuning = match args.next() {
        Some(path) => match Tuning::from_json_file(&path) {
            Ok(tuning) => tuning,
            Err(err) => {
                log::error!("Failed to load tuning from {}: {}", path, err);
                return ExitCode::FAILURE;
            }
        },
        None => Tuning::default(),
    };

    log::info!("Chroma Dash demo starting (seed {})", seed);
    let mut session = GameSession::with_tuning(seed, tuning);
    session.start(0.0);

    for step in 1..=MAX_TICKS {
        let input = autopilot(&session);
        tick(&mut session, &input, step as f64 * SIM_DT);

        for event in session.drain_events() {
            match event {
                GameEvent::ObstacleResolved { .. } | GameEvent::PaletteChanged { .. } => {
                    log::debug!("{:?}", event);
                }
                GameEvent::GameOver { final_score } => {
                    log::info!("Game over after {} ticks, score {}", session.time_ticks, final_score);
                }
                _ => log::trace!("{:?}", event),
            }
        }
        if session.is_over() {
            break;
        }
    }

    match serde_json::to_string_pretty(&session.summary()) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("Failed to serialize run summary: {}", err);
            ExitCode::FAILURE
        }
    }
}
