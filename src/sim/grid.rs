//! Level descriptions and tile-grid materialization
//!
//! A level arrives as already-parsed layers: layer name -> rows of cell
//! codes, `-1` meaning empty. Materialization either produces the whole
//! world or fails; nothing is half-built.

use std::collections::BTreeMap;
use std::path::Path;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::rect::Rect;
use super::tile::{CollectibleKind, DecorationLayer, TileKind, TileSet};
use crate::error::ConfigurationError;
use crate::settings::Settings;

/// Empty cell sentinel
pub const EMPTY_CELL: i32 = -1;

/// Layer name -> grid of cell codes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelDescription {
    pub layers: BTreeMap<String, Vec<Vec<i32>>>,
}

/// Semantics of a layer, decided by its name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Terrain,
    /// `enemies` and `constrains` share one code table: 0 hazard, 1 constraint
    Enemies,
    /// 0 spawn point, 1 goal zone
    Player,
    Collectibles,
    TreeObstacle,
    Decoration(DecorationLayer),
}

impl LayerKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "terrain" => Some(LayerKind::Terrain),
            "enemies" | "constrains" | "constraints" => Some(LayerKind::Enemies),
            "player" => Some(LayerKind::Player),
            "coins" | "collectibles" => Some(LayerKind::Collectibles),
            "tree obstacle" => Some(LayerKind::TreeObstacle),
            "grass" => Some(LayerKind::Decoration(DecorationLayer::Grass)),
            "trees" => Some(LayerKind::Decoration(DecorationLayer::Trees)),
            "fg trees" => Some(LayerKind::Decoration(DecorationLayer::ForegroundTrees)),
            _ => None,
        }
    }
}

/// Static world produced from a description
#[derive(Debug, Clone)]
pub struct World {
    pub tiles: TileSet,
    /// Top-left of the player spawn cell
    pub spawn: IVec2,
    /// Width of the widest layer in pixels
    pub level_width: i32,
}

impl LevelDescription {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style layer insertion
    pub fn with_layer(mut self, name: impl Into<String>, rows: Vec<Vec<i32>>) -> Self {
        self.layers.insert(name.into(), rows);
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigurationError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Build the tile collections and find the spawn point
    pub fn materialize(&self, settings: &Settings) -> Result<World, ConfigurationError> {
        let ts = settings.tile_size;
        let mut tiles = TileSet::new();
        let mut spawn = None;
        let mut level_width = 0;

        for (name, rows) in &self.layers {
            let kind =
                LayerKind::from_name(name).ok_or_else(|| ConfigurationError::UnknownLayer(name.clone()))?;
            let expected = rows.first().map(|r| r.len()).unwrap_or(0);
            level_width = level_width.max(expected as i32 * ts);

            for (row, line) in rows.iter().enumerate() {
                if line.len() != expected {
                    return Err(ConfigurationError::NonRectangular {
                        layer: name.clone(),
                        row,
                        expected,
                        found: line.len(),
                    });
                }

                for (column, &code) in line.iter().enumerate() {
                    if code == EMPTY_CELL {
                        continue;
                    }
                    let x = ts * column as i32;
                    let y = ts * row as i32;
                    let unknown = || ConfigurationError::UnknownCellCode {
                        layer: name.clone(),
                        code,
                        row,
                        column,
                    };

                    match kind {
                        LayerKind::Terrain => {
                            if code < 0 {
                                return Err(unknown());
                            }
                            tiles.insert(TileKind::Solid { sprite: code }, Rect::new(x, y, ts, ts));
                        }
                        LayerKind::Enemies => match code {
                            0 => {
                                let (w, h) = settings.hazard_size;
                                tiles.insert(
                                    TileKind::Hazard {
                                        patrol_speed: settings.hazard_speed,
                                        facing_left: true,
                                        hitbox_inset: settings.hazard_hitbox_inset,
                                    },
                                    Rect::from_bottom_left(x, y + ts, w, h),
                                );
                            }
                            1 => {
                                tiles.insert(TileKind::Constraint, Rect::new(x, y, ts, ts));
                            }
                            _ => return Err(unknown()),
                        },
                        LayerKind::Player => match code {
                            0 => {
                                if spawn.is_some() {
                                    log::warn!("Layer <{name}> has several spawn points, using ({x}, {y})");
                                }
                                spawn = Some(IVec2::new(x, y));
                            }
                            1 => {
                                tiles.insert(TileKind::GoalZone, Rect::new(x, y, ts, ts));
                            }
                            _ => return Err(unknown()),
                        },
                        LayerKind::Collectibles => {
                            let item = CollectibleKind::from_code(code).ok_or_else(unknown)?;
                            let (w, h) = settings.collectible_size;
                            tiles.insert(
                                TileKind::Collectible(item),
                                Rect::from_bottom_left(x + settings.collectible_offset_x, y + ts, w, h),
                            );
                        }
                        LayerKind::TreeObstacle => {
                            let size = ts + settings.obstacle_extra;
                            tiles.insert(TileKind::OneSidedObstacle, Rect::new(x, y, size, size));
                        }
                        LayerKind::Decoration(layer) => {
                            if code < 0 {
                                return Err(unknown());
                            }
                            tiles.insert(
                                TileKind::Decoration { layer, sprite: code },
                                Rect::from_bottom_left(x, y + ts, ts, ts),
                            );
                        }
                    }
                }
            }
        }

        let spawn = spawn.ok_or(ConfigurationError::MissingSpawn)?;
        log::info!(
            "Materialized level: {} tiles, width {}px, spawn ({}, {})",
            tiles.len(),
            level_width,
            spawn.x,
            spawn.y
        );

        Ok(World {
            tiles,
            spawn,
            level_width,
        })
    }
}

/// Parse one exported CSV layer (comma-separated integer codes, one row per line)
pub fn parse_csv_layer(text: &str) -> Result<Vec<Vec<i32>>, ConfigurationError> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(row, line)| {
            line.split(',')
                .enumerate()
                .map(|(column, cell)| {
                    cell.trim()
                        .parse::<i32>()
                        .map_err(|_| ConfigurationError::UnreadableCell {
                            cell: cell.to_string(),
                            row,
                            column,
                        })
                })
                .collect()
        })
        .collect()
}
