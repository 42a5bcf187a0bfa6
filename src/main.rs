//! Tilerun headless runner
//!
//! Loads a level (or generates one from a seed), drives every actor with a
//! scripted "run right, jump when blocked" controller and logs the result.
//!
//! Run `tilerun --help` for the options.

#[cfg(not(target_arch = "wasm32"))]
use std::path::PathBuf;

#[cfg(not(target_arch = "wasm32"))]
use clap::Parser;
#[cfg(not(target_arch = "wasm32"))]
use tilerun::{
    Settings, SimError,
    sim::{
        ActorId, CellCode, ControlMode, EpisodeEnd, FitnessInputs, Intent, Level,
        LevelDescription, Observation, StallDetector, TickInput, decide, episode_end, fitness,
        generate_level, min_progress, observe, tick,
    },
};

/// Headless platformer runner
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Parser)]
#[command(name = "tilerun")]
struct Options {
    /// Level description (JSON); generated from `--seed` when absent
    #[arg(long)]
    level: Option<PathBuf>,

    /// Seed for the generated level
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Settings file (JSON); defaults otherwise
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Actors sharing the level; more than one switches to AI mode
    #[arg(long, default_value_t = 1)]
    actors: usize,

    /// Frame cap
    #[arg(long, default_value_t = 60 * 60)]
    frames: u64,

    /// Print the final frame as JSON
    #[arg(long)]
    snapshot: bool,
}

/// Run right; jump over anything solid ahead, over gaps, and when stuck
#[cfg(not(target_arch = "wasm32"))]
fn scripted_outputs(observation: &Observation, stalled: bool) -> [f32; 6] {
    let self_row = (0..observation.rows).find(|&row| {
        observation.get(row, 0) == Some(CellCode::SelfMarker)
    });

    let blocked = self_row.is_some_and(|row| {
        (1..observation.cols.min(3)).any(|col| {
            matches!(
                observation.get(row, col),
                Some(CellCode::Terrain | CellCode::Hazard | CellCode::Obstacle)
            )
        })
    });
    let gap = self_row.is_some_and(|row| observation.get(row + 1, 1) == Some(CellCode::Empty));

    if blocked || gap || stalled {
        [0.0, 0.0, 0.5, 0.0, 1.0, 0.0]
    } else {
        [0.0, 0.0, 1.0, 0.0, 0.5, 0.0]
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn run(options: &Options) -> Result<(), SimError> {
    let settings = match &options.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let description = match &options.level {
        Some(path) => LevelDescription::load(path)?,
        None => {
            log::info!("Generating level from seed {}", options.seed);
            generate_level(options.seed, &settings)
        }
    };
    let mode = if options.actors > 1 {
        ControlMode::Ai {
            actors: options.actors,
        }
    } else {
        ControlMode::Player
    };

    let mut level = Level::new(description, settings.clone(), mode)?;
    let ids: Vec<ActorId> = level.actors.iter().map(|a| a.id).collect();
    let mut detectors: Vec<StallDetector> =
        ids.iter().map(|_| StallDetector::new(&settings)).collect();
    let mut stalled = vec![false; ids.len()];
    let mut ended: Vec<Option<EpisodeEnd>> = vec![None; ids.len()];
    let ms_per_frame = 1000 / settings.clock_rate.max(1) as u64;

    for frame in 0..options.frames {
        let mut intents = Vec::with_capacity(ids.len());
        for (i, id) in ids.iter().enumerate() {
            let Some(actor) = level.actor(*id) else {
                intents.push(Intent::default());
                continue;
            };
            let intent = match observe(&level, *id) {
                Some(observation) if actor.active => {
                    decide(&scripted_outputs(&observation, stalled[i]))
                }
                _ => Intent::default(),
            };
            intents.push(intent);
        }

        let input = TickInput {
            intents,
            pause: false,
            now_ms: frame * ms_per_frame,
        };
        for event in tick(&mut level, &input) {
            log::debug!("Frame {frame}: {event:?}");
        }

        for (i, id) in ids.iter().enumerate() {
            if ended[i].is_some() {
                continue;
            }
            let Some(actor) = level.actor(*id) else {
                continue;
            };
            stalled[i] = detectors[i].push(actor.distance_traveled(), min_progress(actor));
            let inputs = FitnessInputs::for_actor(&level, actor, level.frame);
            let score = fitness(&inputs, &settings);
            if let Some(end) = episode_end(&inputs, stalled[i], score, &settings) {
                log::info!(
                    "Actor {} finished: {:?}, fitness {:.1}, distance {}px, coins {}",
                    id.0,
                    end,
                    score,
                    inputs.distance,
                    inputs.coins
                );
                ended[i] = Some(end);
            }
        }

        if level.phase.is_terminal() || ended.iter().all(Option::is_some) {
            break;
        }
    }

    log::info!("Run over after {} frames: {:?}", level.frame, level.phase);
    if options.snapshot {
        println!("{}", level.snapshot().to_json());
    }
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Tilerun (native) starting...");

    let options = Options::parse();

    if let Err(err) = run(&options) {
        log::error!("{err}");
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The simulation is a library; there is no web runner
}
