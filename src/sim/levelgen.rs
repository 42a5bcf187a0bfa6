//! Seeded demo-level generator
//!
//! Builds a playable [`LevelDescription`] from a seed. The same seed and
//! settings always give the same level.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::grid::{EMPTY_CELL, LevelDescription};
use crate::settings::Settings;

const MIN_COLUMNS: usize = 40;
const MAX_COLUMNS: usize = 80;
/// Columns kept solid around the spawn and the goal
const SAFE_COLUMNS: usize = 6;
const SPAWN_COLUMN: usize = 2;

fn empty(rows: usize, columns: usize) -> Vec<Vec<i32>> {
    vec![vec![EMPTY_CELL; columns]; rows]
}

/// Solid runs of the floor, as `start..end` column ranges
fn floor_segments(floor: &[bool]) -> Vec<(usize, usize)> {
    let mut segments = Vec::new();
    let mut start = None;
    for (column, &solid) in floor.iter().enumerate() {
        match (solid, start) {
            (true, None) => start = Some(column),
            (false, Some(s)) => {
                segments.push((s, column));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        segments.push((s, floor.len()));
    }
    segments
}

/// Generate a level with a gapped floor, floating platforms, pickups,
/// patrolling hazards and tree obstacles
pub fn generate_level(seed: u64, settings: &Settings) -> LevelDescription {
    let mut rng = Pcg32::seed_from_u64(seed);
    let rows = settings.screen_tiles_y.max(4) as usize;
    let columns = rng.random_range(MIN_COLUMNS..=MAX_COLUMNS);

    // Two floor rows; the walking surface is the row above them
    let floor_row = rows - 2;
    let surface_row = floor_row - 1;
    let platform_row = surface_row.saturating_sub(3);

    let mut floor = vec![true; columns];
    let mut column = SAFE_COLUMNS;
    while column + SAFE_COLUMNS < columns {
        if rng.random_bool(0.15) {
            let width = rng.random_range(1..=2);
            for cell in floor.iter_mut().skip(column).take(width) {
                *cell = false;
            }
            column += width + 3;
        } else {
            column += 1;
        }
    }

    let mut terrain = empty(rows, columns);
    for (column, &solid) in floor.iter().enumerate() {
        if solid {
            terrain[floor_row][column] = 1;
            terrain[floor_row + 1][column] = 4;
        }
    }

    // Floating platforms, three tiles wide
    let mut column = SAFE_COLUMNS;
    while column + 3 + SAFE_COLUMNS < columns {
        if rng.random_bool(0.2) {
            terrain[platform_row][column] = 0;
            terrain[platform_row][column + 1] = 1;
            terrain[platform_row][column + 2] = 2;
            column += 6;
        } else {
            column += 1;
        }
    }

    let mut coins = empty(rows, columns);
    for (column, &solid) in floor.iter().enumerate() {
        if column <= SPAWN_COLUMN || column + 2 >= columns {
            continue;
        }
        if terrain[platform_row][column] != EMPTY_CELL && platform_row > 0 {
            coins[platform_row - 1][column] = 1;
        } else if solid && rng.random_bool(0.25) {
            coins[surface_row][column] = match rng.random_range(0..20) {
                0 => 3,
                1 | 2 => 2,
                _ => 0,
            };
        }
    }

    // A hazard on each long enough floor run away from the spawn, fenced in
    // by constraints on the run's edges
    let mut enemies = empty(rows, columns);
    for (start, end) in floor_segments(&floor) {
        if start < SAFE_COLUMNS || end - start < 6 || !rng.random_bool(0.6) {
            continue;
        }
        enemies[surface_row][start] = 1;
        enemies[surface_row][end - 1] = 1;
        let hazard = rng.random_range(start + 2..end - 2);
        enemies[surface_row][hazard] = 0;
        coins[surface_row][hazard] = EMPTY_CELL;
    }

    let mut trees = empty(rows, columns);
    let mut fg_trees = empty(rows, columns);
    for column in SAFE_COLUMNS..columns.saturating_sub(SAFE_COLUMNS) {
        if floor[column] && enemies[surface_row][column] == EMPTY_CELL && rng.random_bool(0.05) {
            trees[surface_row - 1][column] = 0;
        } else if floor[column] && rng.random_bool(0.1) {
            fg_trees[surface_row][column] = rng.random_range(0..3);
        }
    }

    let mut grass = empty(rows, columns);
    for (column, &solid) in floor.iter().enumerate() {
        if solid && rng.random_bool(0.3) {
            grass[surface_row][column] = rng.random_range(0..4);
        }
    }

    let mut player = empty(rows, columns);
    player[surface_row][SPAWN_COLUMN] = 0;
    player[surface_row][columns - 3] = 1;

    log::debug!("Generated level from seed {seed}: {columns} columns");

    LevelDescription::new()
        .with_layer("terrain", terrain)
        .with_layer("coins", coins)
        .with_layer("enemies", enemies)
        .with_layer("tree obstacle", trees)
        .with_layer("fg trees", fg_trees)
        .with_layer("grass", grass)
        .with_layer("player", player)
}
