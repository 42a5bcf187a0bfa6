//! Collision resolution against tiles
//!
//! Axis-separated and tolerance-banded. Each pass moves the actor to its
//! look-ahead coordinate, gathers every tile the moved rectangle overlaps,
//! then checks each one against the actor's *current* rectangle, so an
//! earlier snap in the same pass is visible to later tiles. A pass that
//! matches nothing rolls the coordinate back.
//!
//! The tolerance band decides which side of a tile was hit: an overlap
//! shallower than the band on one side means the actor crossed that side
//! this frame.

use super::actor::Actor;
use super::rect::Rect;
use super::tile::{CollectibleKind, Tile, TileKind};
use crate::settings::Settings;

/// X band: one frame of run speed plus a pixel, zero when not steering
pub fn x_tolerance(actor: &Actor) -> f32 {
    (actor.speed.x + 1.0) * actor.direction.x.abs()
}

/// Y band: a full jump impulse plus a pixel
pub fn y_tolerance(actor: &Actor) -> f32 {
    actor.jump_speed.abs() + 1.0
}

/// Band for landings on obstacles and hazards: this frame's fall plus a pixel
pub fn fall_tolerance(actor: &Actor) -> f32 {
    actor.direction.y.abs() + 1.0
}

fn overlapping<'a>(rect: Rect, tiles: impl IntoIterator<Item = &'a Tile>) -> Vec<Rect> {
    tiles
        .into_iter()
        .filter(|tile| tile.rect.intersects(&rect))
        .map(|tile| tile.rect)
        .collect()
}

/// Horizontal pass against blocking tiles. Returns whether the actor snapped.
///
/// Horizontal intent is left untouched; the actor keeps pushing into a wall.
pub fn resolve_x(actor: &mut Actor, tiles: &[Tile]) -> bool {
    let saved = actor.pos.x;
    actor.set_left(actor.exact.x);
    let tolerance = x_tolerance(actor);

    let mut collided = false;
    for tile in overlapping(actor.rect(), tiles) {
        let current = actor.rect();
        if ((tile.right() - current.left()) as f32) < tolerance {
            actor.set_left(tile.right());
            collided = true;
            log::debug!("Snap x: left -> {} (tile at {}, {})", tile.right(), tile.x, tile.y);
        } else if ((current.right() - tile.left()) as f32) < tolerance {
            actor.set_right(tile.left());
            collided = true;
            log::debug!("Snap x: right -> {} (tile at {}, {})", tile.left(), tile.x, tile.y);
        }
    }

    if !collided {
        actor.pos.x = saved;
    }
    collided
}

/// Vertical pass against blocking tiles. Recomputes `on_ground`.
pub fn resolve_y(actor: &mut Actor, tiles: &[Tile]) -> bool {
    let tolerance = y_tolerance(actor);
    actor.on_ground = false;

    let saved = actor.pos.y;
    actor.set_top(actor.exact.y);

    let mut collided = false;
    for tile in overlapping(actor.rect(), tiles) {
        let current = actor.rect();
        if ((tile.bottom() - current.top()) as f32) < tolerance {
            actor.set_top(tile.bottom());
            actor.direction.y = 0.0;
            collided = true;
            log::debug!("Snap y: top -> {} (tile at {}, {})", tile.bottom(), tile.x, tile.y);
        } else if actor.direction.y > 0.0 {
            actor.set_bottom(tile.top());
            actor.direction.y = 0.0;
            actor.on_ground = true;
            collided = true;
            log::debug!("Snap y: bottom -> {} (tile at {}, {})", tile.top(), tile.x, tile.y);
        }
    }

    if !collided {
        actor.pos.y = saved;
    }
    collided
}

/// Landing pass against one-sided obstacles. Only a downward approach onto
/// the top edge, strictly inside the obstacle's span, counts.
///
/// Two obstacles overlapping at once are treated as one virtual tile, two
/// grid cells wide, anchored on the leftmost obstacle's top-left corner.
pub fn resolve_one_sided(actor: &mut Actor, obstacles: &[Tile], tile_size: i32) -> bool {
    let saved = actor.pos.y;
    actor.set_top(actor.exact.y);
    let tolerance = fall_tolerance(actor);

    let mut hits = overlapping(actor.rect(), obstacles);
    if hits.len() == 2 {
        let left = if hits[1].x < hits[0].x { hits[1] } else { hits[0] };
        hits = vec![Rect::new(left.x, left.y, 2 * tile_size, tile_size)];
    }

    let mut collided = false;
    for obstacle in hits {
        let current = actor.rect();
        if current.right() < obstacle.right()
            && current.left() > obstacle.left()
            && actor.direction.y > 0.0
            && ((current.bottom() - obstacle.top()) as f32) < tolerance
        {
            actor.set_bottom(obstacle.top());
            actor.direction.y = 0.0;
            actor.on_ground = true;
            collided = true;
            log::debug!("Landed on obstacle top {}", obstacle.top());
        }
    }

    if !collided {
        actor.pos.y = saved;
    }
    collided
}

/// Remove every collectible the actor touches and credit it.
/// Returns the kinds picked up, in collection order.
pub fn collect(actor: &mut Actor, collectibles: &mut Vec<Tile>) -> Vec<CollectibleKind> {
    let rect = actor.rect();
    let mut picked = Vec::new();
    collectibles.retain(|tile| {
        if !tile.rect.intersects(&rect) {
            return true;
        }
        if let TileKind::Collectible(kind) = tile.kind {
            actor.coins += kind.value();
            if kind.heals() {
                actor.lives += 1;
            }
            picked.push(kind);
        }
        false
    });
    picked
}

/// What touching hazards did to an actor this frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HazardOutcome {
    /// Hazards destroyed by a stomp, already removed from the level
    pub stomped: Vec<Tile>,
    /// Lives lost
    pub hits: u32,
}

/// Stomp or get hurt by every touching hazard.
///
/// A stomp needs a downward approach whose overlap with the hitbox top is
/// within this frame's fall. Any stomp bounces the actor once, after all
/// hazards are processed. Other contacts cost a life outside the
/// invulnerability window.
pub fn touch_hazards(
    actor: &mut Actor,
    hazards: &mut Vec<Tile>,
    now_ms: u64,
    settings: &Settings,
) -> HazardOutcome {
    let tolerance = fall_tolerance(actor);
    let rect = actor.rect();
    let mut outcome = HazardOutcome::default();

    let mut i = 0;
    while i < hazards.len() {
        let hitbox = hazards[i].hitbox();
        if !rect.intersects(&hitbox) {
            i += 1;
            continue;
        }

        if actor.direction.y > 0.0 && ((rect.bottom() - hitbox.top()) as f32) < tolerance {
            let hazard = hazards.remove(i);
            actor.kills += 1;
            log::debug!("Actor {} stomped hazard {}", actor.id.0, hazard.id);
            outcome.stomped.push(hazard);
            continue;
        }

        if actor.can_be_hit(now_ms, settings) {
            actor.take_hit(now_ms);
            outcome.hits += 1;
            log::debug!("Actor {} hit, {} lives left", actor.id.0, actor.lives);
        }
        i += 1;
    }

    if !outcome.stomped.is_empty() {
        actor.direction.y = actor.jump_speed;
    }
    outcome
}

/// Whether the actor overlaps any goal zone
pub fn touches_goal(actor: &Actor, goals: &[Tile]) -> bool {
    let rect = actor.rect();
    goals.iter().any(|goal| goal.rect.intersects(&rect))
}

#[cfg(test)]
mod tests {
    use glam::{IVec2, Vec2};

    use super::*;
    use crate::sim::actor::ActorId;
    use crate::sim::tile::TileSet;

    fn actor_at(x: i32, y: i32) -> Actor {
        Actor::new(ActorId(0), IVec2::new(x, y), &Settings::default(), false)
    }

    fn solid(x: i32, y: i32) -> Tile {
        Tile::new(0, TileKind::Solid { sprite: 0 }, Rect::new(x, y, 64, 64))
    }

    /// One physics step without the level around it
    fn step(actor: &mut Actor, terrain: &[Tile], direction_x: f32) {
        actor.integrate(0.5);
        actor.direction.x = direction_x;
        actor.advance();
        resolve_x(actor, terrain);
        resolve_y(actor, terrain);
    }

    #[test]
    fn test_landing_on_tile() {
        let terrain = [solid(832, 192)];
        // bottom 190, falling at 10 px/frame
        let mut a = actor_at(830, 130);
        a.direction.y = 9.5;
        step(&mut a, &terrain, 0.0);

        assert_eq!(a.rect().bottom(), 192);
        assert_eq!(a.direction.y, 0.0);
        assert!(a.on_ground);
    }

    #[test]
    fn test_touching_edge_does_not_snap() {
        let terrain = [solid(832, 192)];
        // bottom 178 + 14 = 192: touches without overlapping
        let mut a = actor_at(830, 118);
        a.direction.y = 14.0;
        a.advance();
        assert!(!resolve_y(&mut a, &terrain));
        assert_eq!(a.rect().bottom(), 192);
        assert_eq!(a.direction.y, 14.0);
        assert!(!a.on_ground);

        // One pixel lower overlaps and lands
        let mut a = actor_at(830, 119);
        a.direction.y = 14.0;
        a.advance();
        assert!(resolve_y(&mut a, &terrain));
        assert_eq!(a.rect().bottom(), 192);
        assert!(a.on_ground);
    }

    #[test]
    fn test_y_band_is_strict() {
        let terrain = [solid(832, 192)];
        // Rising into the tile bottom (256) with a 14 px band: 14 deep is not a ceiling hit
        let mut a = actor_at(830, 252);
        a.direction.y = -10.0;
        a.advance();
        assert_eq!(a.rect().top(), 242);
        assert!(!resolve_y(&mut a, &terrain));
        assert_eq!(a.rect().top(), 242);
        assert_eq!(a.direction.y, -10.0);

        // 13 deep snaps to the tile bottom
        let mut a = actor_at(830, 253);
        a.direction.y = -10.0;
        a.advance();
        assert!(resolve_y(&mut a, &terrain));
        assert_eq!(a.rect().top(), 256);
        assert_eq!(a.direction.y, 0.0);
    }

    #[test]
    fn test_ceiling_hit() {
        let terrain = [solid(832, 192)];
        let mut a = actor_at(830, 265);
        a.direction.y = -10.0;
        a.advance();
        assert!(resolve_y(&mut a, &terrain));
        assert_eq!(a.rect().top(), 256);
        assert_eq!(a.direction.y, 0.0);
        assert!(!a.on_ground);
    }

    #[test]
    fn test_diagonal_into_wall_slides() {
        let terrain = [solid(768, 192)];
        // right 765, top 185, moving right and falling
        let mut a = actor_at(711, 185);
        a.direction = Vec2::new(1.0, 10.0);
        a.advance();
        assert!(resolve_x(&mut a, &terrain));
        resolve_y(&mut a, &terrain);

        assert_eq!(a.rect().right(), 768);
        assert_eq!(a.rect().top(), 195);
        assert_eq!(a.direction.x, 1.0);
        assert!(!a.on_ground);
    }

    #[test]
    fn test_x_tolerance_boundary() {
        // Overlap of exactly the band is not treated as a side hit
        let terrain = [solid(100, 0)];
        let mut a = actor_at(52, 0);
        a.direction.x = 1.0;
        a.speed.x = 0.0;
        a.advance();
        // right 106, tile left 100: 6 is not < 6
        assert!(!resolve_x(&mut a, &terrain));
        assert_eq!(a.rect().right(), 106);

        let mut a = actor_at(51, 0);
        a.direction.x = 1.0;
        a.speed.x = 0.0;
        a.advance();
        assert!(resolve_x(&mut a, &terrain));
        assert_eq!(a.rect().right(), 100);
    }

    #[test]
    fn test_standing_still_has_no_x_band() {
        let terrain = [solid(100, 0)];
        let mut a = actor_at(50, 0);
        a.advance();
        assert_eq!(x_tolerance(&a), 0.0);
        assert!(!resolve_x(&mut a, &terrain));
        assert_eq!(a.rect().x, 50);
    }

    #[test]
    fn test_rest_is_idempotent() {
        let terrain = [solid(0, 640), solid(64, 640)];
        let mut a = actor_at(10, 580);
        a.on_ground = true;
        for _ in 0..10 {
            step(&mut a, &terrain, 0.0);
            assert_eq!(a.rect(), Rect::new(10, 580, 54, 60));
            assert!(a.on_ground);
            assert_eq!(a.direction.y, 0.0);
        }
    }

    #[test]
    fn test_one_sided_landing_only_from_above() {
        let obstacles = [Tile::new(0, TileKind::OneSidedObstacle, Rect::new(320, 256, 84, 84))];

        let mut a = actor_at(330, 190);
        a.direction.y = 8.0;
        a.advance();
        assert!(resolve_one_sided(&mut a, &obstacles, 64));
        assert_eq!(a.rect().bottom(), 256);
        assert!(a.on_ground);

        // Rising through the obstacle passes
        let mut a = actor_at(330, 280);
        a.direction.y = -8.0;
        a.advance();
        assert!(!resolve_one_sided(&mut a, &obstacles, 64));
        assert_eq!(a.rect().top(), 272);

        // Feet hanging over the edge do not count
        let mut a = actor_at(300, 190);
        a.direction.y = 8.0;
        a.advance();
        assert!(!resolve_one_sided(&mut a, &obstacles, 64));
    }

    #[test]
    fn test_one_sided_pair_merges() {
        let obstacles = [
            Tile::new(0, TileKind::OneSidedObstacle, Rect::new(320, 256, 84, 84)),
            Tile::new(1, TileKind::OneSidedObstacle, Rect::new(384, 256, 84, 84)),
        ];
        // Straddles both obstacles; neither alone contains the actor
        let mut a = actor_at(370, 190);
        a.direction.y = 8.0;
        a.advance();
        assert!(resolve_one_sided(&mut a, &obstacles, 64));
        assert_eq!(a.rect().bottom(), 256);
    }

    #[test]
    fn test_one_sided_pair_is_two_cells_wide() {
        let obstacles = [
            Tile::new(0, TileKind::OneSidedObstacle, Rect::new(320, 256, 84, 84)),
            Tile::new(1, TileKind::OneSidedObstacle, Rect::new(384, 256, 84, 84)),
        ];
        // Merged span is 320..448, narrower than the two enlarged obstacles
        for left in [395, 400, 403] {
            let mut a = actor_at(left, 190);
            a.direction.y = 8.0;
            a.advance();
            assert!(a.rect().right() > 448);
            assert!(!resolve_one_sided(&mut a, &obstacles, 64));
            assert!(!a.on_ground);
        }

        // Inside the merged span it still lands
        let mut a = actor_at(392, 190);
        a.direction.y = 8.0;
        a.advance();
        assert!(resolve_one_sided(&mut a, &obstacles, 64));
        assert_eq!(a.rect().bottom(), 256);
    }

    #[test]
    fn test_one_sided_fall_band_is_strict() {
        let obstacles = [Tile::new(0, TileKind::OneSidedObstacle, Rect::new(320, 256, 84, 84))];
        // Falling 8 px: band is 9. Bottom 265 is exactly the band deep
        let mut a = actor_at(330, 197);
        a.direction.y = 8.0;
        a.advance();
        assert_eq!(a.rect().bottom(), 265);
        assert!(!resolve_one_sided(&mut a, &obstacles, 64));
        assert_eq!(a.rect().bottom(), 265);

        let mut a = actor_at(330, 196);
        a.direction.y = 8.0;
        a.advance();
        assert!(resolve_one_sided(&mut a, &obstacles, 64));
        assert_eq!(a.rect().bottom(), 256);
    }

    #[test]
    fn test_collect_is_atomic() {
        let mut tiles = TileSet::new();
        tiles.insert(
            TileKind::Collectible(CollectibleKind::Coin),
            Rect::new(271, 360, 24, 24),
        );
        tiles.insert(
            TileKind::Collectible(CollectibleKind::Apple),
            Rect::new(600, 360, 24, 24),
        );
        let mut a = actor_at(250, 330);

        assert_eq!(collect(&mut a, &mut tiles.collectibles), vec![CollectibleKind::Coin]);
        assert_eq!(a.coins, 1);
        assert_eq!(tiles.collectibles.len(), 1);

        assert!(collect(&mut a, &mut tiles.collectibles).is_empty());
        assert_eq!(a.coins, 1);

        a.set_left(590);
        assert_eq!(collect(&mut a, &mut tiles.collectibles), vec![CollectibleKind::Apple]);
        assert_eq!(a.lives, 6);
        assert_eq!(a.coins, 1);
    }

    fn hazard_tiles() -> TileSet {
        let mut tiles = TileSet::new();
        tiles.insert(
            TileKind::Hazard {
                patrol_speed: 1,
                facing_left: true,
                hitbox_inset: 9,
            },
            Rect::new(448, 338, 64, 46),
        );
        tiles
    }

    #[test]
    fn test_hazard_from_below_hurts() {
        let settings = Settings::default();
        let mut tiles = hazard_tiles();
        let mut a = actor_at(440, 370);
        a.direction.y = -10.0;

        let outcome = touch_hazards(&mut a, &mut tiles.hazards, 2000, &settings);
        assert_eq!(outcome.hits, 1);
        assert_eq!(a.lives, 4);
        assert_eq!(a.blinks, 0);
        assert_eq!(a.kills, 0);
        assert_eq!(tiles.hazards.len(), 1);

        // Still inside the invulnerability window
        let outcome = touch_hazards(&mut a, &mut tiles.hazards, 2500, &settings);
        assert_eq!(outcome.hits, 0);
        assert_eq!(a.lives, 4);
    }

    #[test]
    fn test_hazard_stomp() {
        let settings = Settings::default();
        let mut tiles = hazard_tiles();
        // bottom 342, 4px into the hitbox while falling 6 px/frame
        let mut a = actor_at(440, 282);
        a.direction.y = 6.0;

        let outcome = touch_hazards(&mut a, &mut tiles.hazards, 0, &settings);
        assert_eq!(outcome.stomped.len(), 1);
        assert_eq!(outcome.hits, 0);
        assert_eq!(a.kills, 1);
        assert_eq!(a.lives, 5);
        assert_eq!(a.direction.y, -13.0);
        assert!(tiles.hazards.is_empty());
    }

    #[test]
    fn test_hazard_stomp_band_is_strict() {
        let settings = Settings::default();
        // Falling 6 px: band is 7. Bottom 345 is exactly 7 into the hitbox top (338)
        let mut tiles = hazard_tiles();
        let mut a = actor_at(440, 285);
        a.direction.y = 6.0;
        let outcome = touch_hazards(&mut a, &mut tiles.hazards, 0, &settings);
        assert!(outcome.stomped.is_empty());
        assert_eq!(outcome.hits, 1);
        assert_eq!(a.lives, 4);
        assert_eq!(tiles.hazards.len(), 1);

        let mut tiles = hazard_tiles();
        let mut a = actor_at(440, 284);
        a.direction.y = 6.0;
        let outcome = touch_hazards(&mut a, &mut tiles.hazards, 0, &settings);
        assert_eq!(outcome.stomped.len(), 1);
        assert_eq!(a.kills, 1);
        assert_eq!(a.lives, 5);
    }

    #[test]
    fn test_hazard_inset_spares_grazing_contact() {
        let settings = Settings::default();
        let mut tiles = hazard_tiles();
        // Overlaps the sprite by 5 px but not the inset hitbox
        let mut a = actor_at(399, 340);
        let outcome = touch_hazards(&mut a, &mut tiles.hazards, 0, &settings);
        assert_eq!(outcome, HazardOutcome::default());
    }

    #[test]
    fn test_goal_contact() {
        let goals = [Tile::new(0, TileKind::GoalZone, Rect::new(640, 320, 64, 64))];
        assert!(touches_goal(&actor_at(600, 300), &goals));
        assert!(!touches_goal(&actor_at(586, 300), &goals));
    }

    mod proptests {
        use proptest::prelude::*;

        use super::*;

        fn floor() -> Vec<Tile> {
            (-10..30).map(|i| solid(i * 64, 640)).collect()
        }

        proptest! {
            #[test]
            fn actor_never_sinks_into_floor(
                x in 0i32..1000,
                y in 0i32..560,
                moves in proptest::collection::vec((-1i32..=1, any::<bool>()), 1..150),
            ) {
                let terrain = floor();
                let mut a = actor_at(x, y);
                for (dx, jump) in moves {
                    if jump && a.on_ground {
                        a.direction.y = a.jump_speed;
                    }
                    step(&mut a, &terrain, dx as f32);
                    let rect = a.rect();
                    prop_assert!(terrain.iter().all(|t| !t.rect.intersects(&rect)));
                    if a.on_ground {
                        prop_assert_eq!(rect.bottom(), 640);
                    }
                }
            }
        }
    }
}
