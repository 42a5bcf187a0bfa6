//! Tiles and the per-kind tile collections of a level

use serde::{Deserialize, Serialize};

use super::rect::Rect;

/// Pickup variants found in the collectibles layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectibleKind {
    Coin,
    Gem,
    /// Restores one life, worth no coins
    Apple,
    Chest,
}

impl CollectibleKind {
    /// Map a collectibles-layer cell code
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(CollectibleKind::Coin),
            1 => Some(CollectibleKind::Gem),
            2 => Some(CollectibleKind::Apple),
            3 => Some(CollectibleKind::Chest),
            _ => None,
        }
    }

    /// Coins credited on pickup
    pub fn value(&self) -> u32 {
        match self {
            CollectibleKind::Coin => 1,
            CollectibleKind::Gem => 5,
            CollectibleKind::Apple => 0,
            CollectibleKind::Chest => 10,
        }
    }

    pub fn heals(&self) -> bool {
        matches!(self, CollectibleKind::Apple)
    }
}

/// What a tile does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileKind {
    /// Terrain; blocks on every side
    Solid { sprite: i32 },
    /// Foliage collider; only blocks an actor landing on its top edge
    OneSidedObstacle,
    /// Patrolling enemy
    Hazard {
        /// Signed px/frame; flipped by constraints
        patrol_speed: i32,
        facing_left: bool,
        hitbox_inset: i32,
    },
    Collectible(CollectibleKind),
    GoalZone,
    /// Invisible patrol boundary for hazards
    Constraint,
    /// Drawn only
    Decoration { layer: DecorationLayer, sprite: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecorationLayer {
    Grass,
    Trees,
    ForegroundTrees,
}

/// A rectangle in the world with a kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub id: u32,
    pub kind: TileKind,
    pub rect: Rect,
}

impl Tile {
    pub fn new(id: u32, kind: TileKind, rect: Rect) -> Self {
        Self { id, kind, rect }
    }

    /// Rectangle used for trigger tests. Hazards are narrower than their sprite.
    pub fn hitbox(&self) -> Rect {
        match self.kind {
            TileKind::Hazard { hitbox_inset, .. } => self.rect.inset_x(hitbox_inset),
            _ => self.rect,
        }
    }

    /// Advance a hazard along its patrol; no-op for other kinds
    pub fn patrol(&mut self) {
        if let TileKind::Hazard { patrol_speed, .. } = self.kind {
            self.rect.x += patrol_speed;
        }
    }

    /// Turn a hazard around
    pub fn reverse_patrol(&mut self) {
        if let TileKind::Hazard {
            ref mut patrol_speed,
            ref mut facing_left,
            ..
        } = self.kind
        {
            *patrol_speed = -*patrol_speed;
            *facing_left = !*facing_left;
        }
    }
}

/// All tiles of a level, grouped by kind for type-specific iteration.
///
/// Each collection keeps insertion order (row-major from the grid), which is
/// the iteration order collision and trigger resolution rely on.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TileSet {
    pub terrain: Vec<Tile>,
    pub obstacles: Vec<Tile>,
    pub hazards: Vec<Tile>,
    pub collectibles: Vec<Tile>,
    pub goals: Vec<Tile>,
    pub constraints: Vec<Tile>,
    pub decorations: Vec<Tile>,
    next_id: u32,
}

impl TileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tile to the collection matching its kind; returns its id
    pub fn insert(&mut self, kind: TileKind, rect: Rect) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        let tile = Tile::new(id, kind, rect);
        match kind {
            TileKind::Solid { .. } => self.terrain.push(tile),
            TileKind::OneSidedObstacle => self.obstacles.push(tile),
            TileKind::Hazard { .. } => self.hazards.push(tile),
            TileKind::Collectible(_) => self.collectibles.push(tile),
            TileKind::GoalZone => self.goals.push(tile),
            TileKind::Constraint => self.constraints.push(tile),
            TileKind::Decoration { .. } => self.decorations.push(tile),
        }
        id
    }

    fn collections(&self) -> [&Vec<Tile>; 7] {
        [
            &self.decorations,
            &self.terrain,
            &self.hazards,
            &self.collectibles,
            &self.obstacles,
            &self.constraints,
            &self.goals,
        ]
    }

    fn collections_mut(&mut self) -> [&mut Vec<Tile>; 7] {
        [
            &mut self.decorations,
            &mut self.terrain,
            &mut self.hazards,
            &mut self.collectibles,
            &mut self.obstacles,
            &mut self.constraints,
            &mut self.goals,
        ]
    }

    /// Every tile, decorations first (draw order)
    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.collections().into_iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.collections().iter().map(|c| c.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Move every tile rigidly by the camera shift
    pub fn shift_x(&mut self, dx: i32) {
        if dx == 0 {
            return;
        }
        for collection in self.collections_mut() {
            for tile in collection.iter_mut() {
                tile.rect.x += dx;
            }
        }
    }

    /// Advance every hazard along its patrol
    pub fn patrol_hazards(&mut self) {
        for hazard in &mut self.hazards {
            hazard.patrol();
        }
    }

    /// Reverse hazards touching a constraint. Returns how many turned.
    pub fn apply_constraints(&mut self) -> usize {
        let mut turned = 0;
        for hazard in &mut self.hazards {
            if self
                .constraints
                .iter()
                .any(|c| c.rect.intersects(&hazard.rect))
            {
                hazard.reverse_patrol();
                turned += 1;
            }
        }
        turned
    }
}
