//! isometric tile containment & directional blocking
use bevy::prelude::*;

use crate::chunks::{visible_keys, ChunkKey, ChunkMap, GroundTile};
use crate::constants::*;
use crate::player::MoveKey;
use crate::vegetation::Vegetation;

/// an actor's box, anchored at its bottom‑left corner in iso space
pub struct ActorBounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/* ===========================================================
   side classification
   =========================================================== */

/// which side of a tile's centre the actor sits on; the six regions are
/// disjoint, so at most one flag is set for any position off the centre
/// lines
#[derive(Default, Debug, PartialEq, Eq)]
pub struct CollidedSides {
    pub top_left: bool,
    pub bottom_left: bool,
    pub bottom_right: bool,
    pub top_right: bool,
    pub top: bool,
    pub bottom: bool,
}

pub fn iso_collision_sides(tile_x: f32, tile_y: f32, actor: &ActorBounds) -> CollidedSides {
    let cx = tile_x + TILE_WIDTH_HALF;
    let cy = tile_y + TILE_HEIGHT_HALF;

    // containment is already known here; this only classifies the approach
    let left = actor.x + actor.width < cx;
    let right = actor.x > cx;
    let above = actor.y < cy;
    let below = actor.y > cy;

    CollidedSides {
        top_left: left && above,
        bottom_left: left && below,
        bottom_right: right && below,
        top_right: right && above,
        top: !left && !right && above,
        bottom: !left && !right && below,
    }
}

/// corner hits leave the two keys pointing away from the tile; edge hits
/// leave three
pub fn allowed_from_sides(sides: &CollidedSides) -> Option<Vec<MoveKey>> {
    if sides.top_left {
        return Some(vec![MoveKey::Up, MoveKey::Left]);
    }
    if sides.top_right {
        return Some(vec![MoveKey::Up, MoveKey::Right]);
    }
    if sides.bottom_left {
        return Some(vec![MoveKey::Down, MoveKey::Left]);
    }
    if sides.bottom_right {
        return Some(vec![MoveKey::Down, MoveKey::Right]);
    }
    if sides.top {
        return Some(vec![MoveKey::Up, MoveKey::Left, MoveKey::Right]);
    }
    if sides.bottom {
        return Some(vec![MoveKey::Down, MoveKey::Left, MoveKey::Right]);
    }

    None
}

/* ===========================================================
   containment & depth
   =========================================================== */

/// diamond footprint test against the actor's anchor point
#[inline]
pub fn tile_contains(tile: &GroundTile, px: f32, py: f32) -> bool {
    let cx = tile.x + TILE_WIDTH_HALF;
    let cy = tile.y + TILE_HEIGHT_HALF;

    let dx = (px - cx).abs() / TILE_WIDTH_HALF;
    let dy = (py - cy).abs() / TILE_HEIGHT_HALF;

    dx + dy <= 1.0
}

/// depth heuristic: the actor overlaps the item's box while standing above
/// the item's ground tile, so the item would draw over it
pub fn is_actor_behind(item: &Vegetation, ground_tile_y: f32, actor: &ActorBounds) -> bool {
    let size = item.kind.size();
    let item_left = item.x - size.x / 2.0;
    let item_right = item.x + size.x / 2.0;
    let item_top = item.y - size.y;

    let actor_right = actor.x + actor.width;
    let actor_top = actor.y - actor.height;

    let overlaps_right = actor.x < item_right && actor.x > item_left;
    let overlaps_left = actor_right > item_left && actor_right < item_right;
    let overlaps_top = actor.y > item_top && actor.y < item.y;
    let overlaps_bottom = actor_top < item.y && actor_top > item_top;
    let above_ground_tile = actor.y < ground_tile_y + TILE_HEIGHT_HALF;

    above_ground_tile && (overlaps_right || overlaps_left) && (overlaps_top || overlaps_bottom)
}

/* ===========================================================
   resolver
   =========================================================== */

/// restrict the movement keys the actor may use this tick.
///
/// Scans the chunk neighbourhood around `center` because an object rooted in
/// a neighbouring chunk can lean into this one. Tiles iterate in reverse
/// generation order so the tile drawn on top wins ties; the first blocking
/// object found on an occupied tile settles the chunk and scanning moves on.
pub fn resolve_actor_bounds(
    chunks: &ChunkMap,
    center: ChunkKey,
    actor: &ActorBounds,
    veg_q: &mut Query<(&Vegetation, &mut Sprite)>,
) -> Vec<MoveKey> {
    let mut allowed = MoveKey::ALL.to_vec();

    let current_cells: std::collections::HashSet<(i32, i32)> = chunks
        .get_by_key(&center)
        .map(|chunk| {
            chunk
                .tiles
                .iter()
                .filter(|tile| tile_contains(tile, actor.x, actor.y))
                .map(|tile| (tile.row, tile.col))
                .collect()
        })
        .unwrap_or_default();

    for key in visible_keys(center, COLLISION_CHUNK_RADIUS) {
        let Some(chunk) = chunks.get_by_key(&key) else {
            continue;
        };

        for tile in chunk.tiles.iter().rev() {
            // nothing grows in water, so wet tiles can never block
            if tile.kind.is_water() {
                continue;
            }
            let Some(&veg_entity) = chunk.vegetation.get(&(tile.row, tile.col)) else {
                continue;
            };
            let Ok((veg, mut sprite)) = veg_q.get_mut(veg_entity) else {
                continue;
            };

            if !veg.kind.blocking() {
                continue;
            }

            // cosmetic: keep the actor visible behind tall objects
            if is_actor_behind(veg, tile.y, actor) {
                sprite.color.set_alpha(VEG_BEHIND_ALPHA);
            } else {
                sprite.color.set_alpha(1.0);
            }

            if current_cells.contains(&(tile.row, tile.col)) {
                let sides = iso_collision_sides(tile.x, tile.y, actor);
                if let Some(keys) = allowed_from_sides(&sides) {
                    allowed = keys;
                    break;
                }
            }
        }
    }

    allowed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::TerrainKind;
    use crate::vegetation::VegKind;

    fn probe(x: f32, y: f32) -> ActorBounds {
        ActorBounds {
            x,
            y,
            width: PLAYER_WIDTH,
            height: PLAYER_HEIGHT,
        }
    }

    fn side_flags(sides: &CollidedSides) -> [bool; 6] {
        [
            sides.top_left,
            sides.top_right,
            sides.bottom_left,
            sides.bottom_right,
            sides.top,
            sides.bottom,
        ]
    }

    #[test]
    fn test_each_region_sets_exactly_one_side() {
        // tile centred on the origin
        let tile_x = -TILE_WIDTH_HALF;
        let tile_y = -TILE_HEIGHT_HALF;

        let cases = [
            (probe(-80.0, -10.0), 0), // fully left, above
            (probe(48.0, -10.0), 1),  // fully right, above
            (probe(-80.0, 10.0), 2),  // fully left, below
            (probe(48.0, 10.0), 3),   // fully right, below
            (probe(-16.0, -10.0), 4), // straddling centre, above
            (probe(-16.0, 10.0), 5),  // straddling centre, below
        ];

        for (actor, expected) in cases {
            let sides = iso_collision_sides(tile_x, tile_y, &actor);
            let flags = side_flags(&sides);
            assert_eq!(flags.iter().filter(|set| **set).count(), 1, "{sides:?}");
            assert!(flags[expected], "expected flag {expected} in {sides:?}");
        }
    }

    #[test]
    fn test_allowed_keys_point_away_from_the_tile() {
        let tile_x = -TILE_WIDTH_HALF;
        let tile_y = -TILE_HEIGHT_HALF;

        let sides = iso_collision_sides(tile_x, tile_y, &probe(-80.0, -10.0));
        assert_eq!(
            allowed_from_sides(&sides),
            Some(vec![MoveKey::Up, MoveKey::Left])
        );

        let sides = iso_collision_sides(tile_x, tile_y, &probe(-16.0, 10.0));
        assert_eq!(
            allowed_from_sides(&sides),
            Some(vec![MoveKey::Down, MoveKey::Left, MoveKey::Right])
        );

        assert_eq!(allowed_from_sides(&CollidedSides::default()), None);
    }

    #[test]
    fn test_diamond_containment() {
        let tile = GroundTile {
            row: 0,
            col: 0,
            x: -TILE_WIDTH_HALF,
            y: -TILE_HEIGHT_HALF,
            kind: TerrainKind::LowLand,
        };

        assert!(tile_contains(&tile, 0.0, 0.0));
        assert!(tile_contains(&tile, TILE_WIDTH_HALF, 0.0)); // east corner
        assert!(tile_contains(&tile, 0.0, TILE_HEIGHT_HALF)); // south corner
        assert!(!tile_contains(&tile, TILE_WIDTH_HALF, TILE_HEIGHT_HALF));
        assert!(!tile_contains(&tile, TILE_WIDTH_HALF + 1.0, 0.0));
    }

    #[test]
    fn test_actor_behind_tall_object() {
        let tree = Vegetation {
            kind: VegKind::OakTree,
            x: 0.0,
            y: 0.0,
        };

        // overlapping the trunk box from just above its root
        assert!(is_actor_behind(&tree, -TILE_HEIGHT_HALF, &probe(-10.0, -20.0)));
        // far away on the x axis
        assert!(!is_actor_behind(&tree, -TILE_HEIGHT_HALF, &probe(-400.0, -20.0)));
        // below the ground tile line
        assert!(!is_actor_behind(&tree, -TILE_HEIGHT_HALF, &probe(-10.0, 60.0)));
    }
}
