//! AI-facing observation and scoring
//!
//! An external controller sees a small grid window in front of its actor,
//! answers with network outputs decoded into an [`Intent`], and is scored by
//! [`fitness`]. None of this feeds back into the simulation.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::actor::{Actor, ActorId, Intent};
use super::state::Level;
use super::tile::Tile;
use crate::settings::Settings;

/// Content of one observed cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellCode {
    #[default]
    Empty,
    Terrain,
    Obstacle,
    Collectible,
    SelfMarker,
    Hazard,
}

impl CellCode {
    /// Numeric code fed to the network
    pub fn value(self) -> i8 {
        match self {
            CellCode::Empty => 0,
            CellCode::Terrain => 1,
            CellCode::Obstacle => 2,
            CellCode::Collectible => 3,
            CellCode::SelfMarker => 4,
            CellCode::Hazard => -1,
        }
    }
}

/// Row-major window of cells anchored on the actor's grid column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub rows: usize,
    pub cols: usize,
    pub cells: Vec<CellCode>,
}

impl Observation {
    pub fn get(&self, row: usize, col: usize) -> Option<CellCode> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.cells.get(row * self.cols + col).copied()
    }

    /// Flattened numeric input for a network
    pub fn to_input_vec(&self) -> Vec<f32> {
        self.cells.iter().map(|c| c.value() as f32).collect()
    }
}

/// Observe the grid around an actor; `None` for unknown ids
pub fn observe(level: &Level, id: ActorId) -> Option<Observation> {
    let actor = level.actor(id)?;
    Some(observe_actor(actor, level, level.settings()))
}

fn observe_actor(actor: &Actor, level: &Level, settings: &Settings) -> Observation {
    let ts = settings.tile_size;
    let rows = settings.fov_rows();
    let cols = settings.fov_columns;
    let rect = actor.rect();

    let column = ((rect.x as f32 + actor.speed.x + 1.0) / ts as f32).floor() as i32
        - settings.fov_left_adjustment as i32;
    let self_row = rect.y.div_euclid(ts) - 1;

    // Later kinds overwrite earlier ones in a shared cell
    let layers: [(&[Tile], CellCode); 4] = [
        (level.tiles.terrain.as_slice(), CellCode::Terrain),
        (level.tiles.hazards.as_slice(), CellCode::Hazard),
        (level.tiles.collectibles.as_slice(), CellCode::Collectible),
        (level.tiles.obstacles.as_slice(), CellCode::Obstacle),
    ];

    let mut cells = vec![CellCode::Empty; rows * cols];
    for col in 0..cols {
        let cell_x = (column + col as i32) * ts;
        for row in 0..rows {
            // The top screen row is never observed
            let cell_y = (row as i32 + 1) * ts;
            for (tiles, code) in &layers {
                let found = tiles.iter().any(|t| {
                    (cell_x..cell_x + ts).contains(&t.rect.x)
                        && (cell_y..cell_y + ts).contains(&t.rect.y)
                });
                if found {
                    cells[row * cols + col] = *code;
                }
            }
        }
    }

    if (0..rows as i32).contains(&self_row) && cols > 0 {
        cells[self_row as usize * cols] = CellCode::SelfMarker;
    }

    Observation { rows, cols, cells }
}

/// Decode network outputs: the strongest of six actions
/// (none, jump, right, left, right+jump, left+jump)
pub fn decide(outputs: &[f32]) -> Intent {
    let decision = outputs
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f32)>, (i, &v)| match best {
            Some((_, b)) if b >= v => best,
            _ => Some((i, v)),
        })
        .map(|(i, _)| i);

    match decision {
        Some(1) => Intent::default().with_jump(),
        Some(2) => Intent::right(),
        Some(3) => Intent::left(),
        Some(4) => Intent::right().with_jump(),
        Some(5) => Intent::left().with_jump(),
        _ => Intent::default(),
    }
}

/// Raw measurements fitness is computed from
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FitnessInputs {
    /// Frames since the episode started
    pub frames: u64,
    /// World-space x in pixels
    pub distance: i32,
    pub coins: u32,
    pub kills: u32,
    pub completed: bool,
    pub defeated: bool,
}

impl FitnessInputs {
    pub fn for_actor(level: &Level, actor: &Actor, frames: u64) -> Self {
        Self {
            frames,
            distance: actor.distance_traveled(),
            coins: actor.coins,
            kills: actor.kills,
            completed: level.is_completed(),
            defeated: !actor.active || actor.is_defeated(level.settings()),
        }
    }
}

/// Score an episode. Distance dominates (squared, in tiles); elapsed seconds
/// cost; coins and kills pay; passing 20 tiles, winning and losing are flat
/// bonuses or penalties.
pub fn fitness(inputs: &FitnessInputs, settings: &Settings) -> f64 {
    let seconds = (inputs.frames / settings.clock_rate.max(1) as u64) as f64;
    let tiles = inputs.distance.div_euclid(settings.tile_size).max(0) as f64;

    tiles.powi(2) - seconds.powf(1.5)
        + (inputs.coins as f64).powf(1.5)
        + inputs.kills as f64 * 20.0
        + (tiles - 20.0).clamp(0.0, 1.0) * 2000.0
        + if inputs.completed { 10000.0 } else { 0.0 }
        - if inputs.defeated { 50.0 } else { 0.0 }
}

/// Rolling window of distances; flags an actor that stopped making progress
#[derive(Debug, Clone)]
pub struct StallDetector {
    window: VecDeque<i32>,
    limit: usize,
}

impl StallDetector {
    pub fn new(settings: &Settings) -> Self {
        Self::with_limit(settings.inactive_limit)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            window: VecDeque::with_capacity(limit),
            limit,
        }
    }

    /// Record this frame's distance. Once the window is full, returns true
    /// when the actor covered less than `min_progress` across it.
    pub fn push(&mut self, distance: i32, min_progress: i32) -> bool {
        if self.limit == 0 {
            return false;
        }
        if self.window.len() == self.limit {
            self.window.pop_front();
        }
        self.window.push_back(distance);

        match (self.window.front(), self.window.back()) {
            (Some(first), Some(last)) if self.window.len() == self.limit => {
                last - first < min_progress
            }
            _ => false,
        }
    }

    pub fn clear(&mut self) {
        self.window.clear();
    }
}

/// Why an AI episode ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EpisodeEnd {
    Completed,
    Defeated,
    Stalled,
    FitnessBelowLimit,
}

/// Progress needed over the stall window: two run steps and a pixel.
/// Uses the preserved run speed, not the live `speed.x` that scrolling zeroes.
pub fn min_progress(actor: &Actor) -> i32 {
    actor.shift_speed.round() as i32 * 2 + 1
}

/// Check the episode stop conditions in priority order
pub fn episode_end(
    inputs: &FitnessInputs,
    stalled: bool,
    score: f64,
    settings: &Settings,
) -> Option<EpisodeEnd> {
    if inputs.completed {
        Some(EpisodeEnd::Completed)
    } else if inputs.defeated {
        Some(EpisodeEnd::Defeated)
    } else if stalled {
        Some(EpisodeEnd::Stalled)
    } else if score < settings.fitness_limit {
        Some(EpisodeEnd::FitnessBelowLimit)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::grid::LevelDescription;
    use crate::sim::state::ControlMode;

    fn level() -> Level {
        let mut terrain = vec![vec![-1; 12]; 11];
        terrain[10] = vec![0; 12];
        terrain[9][5] = 1;
        let mut player = vec![vec![-1; 12]; 11];
        player[8][2] = 0;
        let mut enemies = vec![vec![-1; 12]; 11];
        enemies[9][4] = 0;
        let mut coins = vec![vec![-1; 12]; 11];
        coins[7][3] = 0;
        let mut trees = vec![vec![-1; 12]; 11];
        trees[6][6] = 0;

        let desc = LevelDescription::new()
            .with_layer("terrain", terrain)
            .with_layer("player", player)
            .with_layer("enemies", enemies)
            .with_layer("coins", coins)
            .with_layer("tree obstacle", trees);
        Level::new(desc, Settings::default(), ControlMode::Player).unwrap()
    }

    #[test]
    fn test_observation_window() {
        let level = level();
        let obs = observe(&level, ActorId(0)).unwrap();
        assert_eq!((obs.rows, obs.cols), (10, 5));
        assert_eq!(obs.cells.len(), 50);

        // Actor at x 128, run speed 5: window starts at column 2
        assert_eq!(obs.get(9, 0), Some(CellCode::Terrain));
        assert_eq!(obs.get(8, 3), Some(CellCode::Terrain));
        // Coin sits bottom-aligned inside row 7, column 3
        assert_eq!(obs.get(6, 1), Some(CellCode::Collectible));
        assert_eq!(obs.get(5, 4), Some(CellCode::Obstacle));
        assert_eq!(obs.get(0, 4), Some(CellCode::Empty));
        // Spawn row 8 -> self marker on row 7
        assert_eq!(obs.get(7, 0), Some(CellCode::SelfMarker));
        assert_eq!(obs.get(10, 0), None);
        assert!(observe(&level, ActorId(9)).is_none());
    }

    #[test]
    fn test_hazard_cell_code() {
        let level = level();
        // Bottom-aligned hazard: its top-left lies inside row 9, column 4
        let obs = observe(&level, ActorId(0)).unwrap();
        assert_eq!(obs.get(8, 2), Some(CellCode::Hazard));
        assert_eq!(obs.to_input_vec()[8 * 5 + 2], -1.0);
    }

    #[test]
    fn test_decide() {
        assert_eq!(decide(&[0.1, 0.2, 0.9, 0.0, 0.0, 0.0]), Intent::right());
        assert_eq!(
            decide(&[0.0, 0.0, 0.0, 0.0, 0.0, 1.0]),
            Intent::left().with_jump()
        );
        // Ties go to the first output
        assert_eq!(decide(&[0.5, 0.5]), Intent::default());
        assert_eq!(decide(&[]), Intent::default());
    }

    #[test]
    fn test_fitness_formula() {
        let settings = Settings::default();
        let inputs = FitnessInputs {
            frames: 600,
            distance: 64 * 30 + 10,
            coins: 4,
            kills: 2,
            completed: false,
            defeated: false,
        };
        let expected = 900.0 - 10f64.powf(1.5) + 8.0 + 40.0 + 2000.0;
        assert!((fitness(&inputs, &settings) - expected).abs() < 1e-9);

        let lost = FitnessInputs {
            distance: -200,
            defeated: true,
            ..Default::default()
        };
        assert_eq!(fitness(&lost, &settings), -50.0);

        let won = FitnessInputs {
            completed: true,
            ..Default::default()
        };
        assert_eq!(fitness(&won, &settings), 10000.0);
    }

    #[test]
    fn test_stall_detector() {
        let mut detector = StallDetector::with_limit(3);
        assert!(!detector.push(100, 11));
        assert!(!detector.push(100, 11));
        assert!(detector.push(105, 11));
        assert!(!detector.push(120, 11));
        detector.clear();
        assert!(!detector.push(120, 11));
    }

    #[test]
    fn test_min_progress_ignores_scroll_freeze() {
        let level = level();
        let mut actor = level.actors[0].clone();
        assert_eq!(min_progress(&actor), 11);
        // Scrolling frames zero the live run speed
        actor.speed.x = 0.0;
        assert_eq!(min_progress(&actor), 11);
    }

    #[test]
    fn test_episode_end_priority() {
        let settings = Settings::default();
        let mut inputs = FitnessInputs {
            completed: true,
            defeated: true,
            ..Default::default()
        };
        assert_eq!(
            episode_end(&inputs, true, -100.0, &settings),
            Some(EpisodeEnd::Completed)
        );
        inputs.completed = false;
        assert_eq!(
            episode_end(&inputs, true, 0.0, &settings),
            Some(EpisodeEnd::Defeated)
        );
        inputs.defeated = false;
        assert_eq!(
            episode_end(&inputs, false, -11.0, &settings),
            Some(EpisodeEnd::FitnessBelowLimit)
        );
        assert_eq!(episode_end(&inputs, false, 5.0, &settings), None);
    }

    mod proptests {
        use proptest::prelude::*;

        use super::*;

        proptest! {
            #[test]
            fn fitness_grows_with_distance(
                frames in 0u64..100_000,
                distance in 0i32..50_000,
                step in 0i32..5_000,
                coins in 0u32..500,
                kills in 0u32..50,
            ) {
                let settings = Settings::default();
                let near = FitnessInputs { frames, distance, coins, kills, ..Default::default() };
                let far = FitnessInputs { distance: distance + step, ..near };
                prop_assert!(fitness(&far, &settings) >= fitness(&near, &settings));
            }

            #[test]
            fn stall_never_fires_before_window_fills(
                limit in 1usize..50,
                distances in proptest::collection::vec(-100i32..100, 0..50),
            ) {
                let mut detector = StallDetector::with_limit(limit);
                for (i, d) in distances.iter().enumerate() {
                    let stalled = detector.push(*d, 11);
                    if i + 1 < limit {
                        prop_assert!(!stalled);
                    }
                }
            }
        }
    }
}
