//! Error taxonomy
//!
//! Only malformed *configuration* is fatal. Runtime geometry (degenerate
//! rectangles, actors far outside the level) never produces an error.

/// Malformed level description. Raised at load, before any `Level` exists.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("unknown layer type <{0}>")]
    UnknownLayer(String),

    #[error("layer <{layer}> is not rectangular: row {row} has {found} cells, expected {expected}")]
    NonRectangular {
        layer: String,
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("layer <{layer}> has unknown cell code {code} at row {row}, column {column}")]
    UnknownCellCode {
        layer: String,
        code: i32,
        row: usize,
        column: usize,
    },

    #[error("unreadable cell {cell:?} at row {row}, column {column}")]
    UnreadableCell {
        cell: String,
        row: usize,
        column: usize,
    },

    #[error("level has no player spawn point")]
    MissingSpawn,

    #[error("level needs at least one actor")]
    NoActors,

    #[error("malformed level description: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not read level description: {0}")]
    Io(#[from] std::io::Error),
}

/// Tuning constants that would make the simulation misbehave silently.
#[derive(Debug, thiserror::Error)]
pub enum PhysicsInvariantError {
    #[error("{name} must be a finite number, got {value}")]
    NotFinite { name: &'static str, value: f32 },

    #[error("{name} cannot be negative, got {value}")]
    Negative { name: &'static str, value: f64 },

    #[error("{name} must be positive, got {value}")]
    NotPositive { name: &'static str, value: f64 },

    #[error("jump speed must point upwards (negative), got {0}")]
    JumpSpeedNotUpward(f32),

    #[error("scroll edges are inverted: left {left} >= right {right}")]
    InvertedScrollEdges { left: i32, right: i32 },

    #[error("malformed settings: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not read settings: {0}")]
    Io(#[from] std::io::Error),
}

/// Any error the core can surface to the embedding frame loop.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    PhysicsInvariant(#[from] PhysicsInvariantError),
}
