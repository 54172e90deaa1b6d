//! projection between grid, isometric‑pixel and chunk coordinates
use bevy::prelude::*;

use crate::chunks::ChunkKey;
use crate::constants::*;

/// forward isometric projection (2:1 diamond)
#[inline]
pub fn grid_to_iso(row: f32, col: f32, half_w: f32, half_h: f32) -> Vec2 {
    Vec2::new((col - row) * half_w, (col + row) * half_h)
}

/// inverse projection back to the grid cell under an iso pixel.
///
/// The floor truncation is load‑bearing: it decides which cell a pixel on a
/// diamond boundary belongs to, and the chunk math below inherits it.
#[inline]
pub fn iso_to_world(x: f32, y: f32) -> IVec2 {
    let wx = ((x / TILE_WIDTH_HALF + y / TILE_HEIGHT_HALF) / 2.0).floor() as i32;
    let wy = ((y / TILE_HEIGHT_HALF - x / TILE_WIDTH_HALF) / 2.0).floor() as i32;

    IVec2::new(wx, wy)
}

/// chunk under a global position.
///
/// The actor spawns at the iso point under the viewport centre, so its
/// coordinates sit half a screen away from the visual origin; the half
/// viewport added here undoes that offset.
pub fn chunk_by_global_position(x: f32, y: f32, viewport: Vec2) -> ChunkKey {
    let pos = iso_to_world(x + viewport.x / 2.0, y + viewport.y / 2.0);

    ChunkKey::from_cell(pos.y, pos.x)
}

/// iso space runs y‑down; bevy world space runs y‑up
#[inline]
pub fn iso_transform(x: f32, y: f32, z: f32) -> Transform {
    Transform::from_xyz(x, -y, z)
}

/// draw order for object‑layer sprites: larger iso y draws in front
#[inline]
pub fn object_z(iso_y: f32) -> f32 {
    Z_OBJECT_BASE + iso_y * Z_PER_ISO_Y
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_projection() {
        for row in -50..=50 {
            for col in -50..=50 {
                let iso = grid_to_iso(row as f32, col as f32, TILE_WIDTH_HALF, TILE_HEIGHT_HALF);
                let world = iso_to_world(iso.x, iso.y);
                assert_eq!(world, IVec2::new(col, row), "round trip failed for ({row}, {col})");
            }
        }
    }

    #[test]
    fn test_floor_truncation_at_boundaries() {
        // a pixel just inside the next diamond still floors to the lower cell
        let iso = grid_to_iso(3.0, 7.0, TILE_WIDTH_HALF, TILE_HEIGHT_HALF);
        assert_eq!(iso_to_world(iso.x + 1.0, iso.y), IVec2::new(7, 2));
        assert_eq!(iso_to_world(iso.x - 1.0, iso.y), IVec2::new(6, 3));
    }

    #[test]
    fn test_chunk_by_global_position_offsets_viewport() {
        let viewport = Vec2::new(1280.0, 720.0);
        let key = chunk_by_global_position(-viewport.x / 2.0, -viewport.y / 2.0, viewport);
        assert_eq!(key, ChunkKey::new(0, 0));

        // the same screen point shifted by a whole chunk of cells moves the
        // key by exactly one chunk in each direction
        let step = grid_to_iso(
            CHUNK_SIZE as f32,
            CHUNK_SIZE as f32,
            TILE_WIDTH_HALF,
            TILE_HEIGHT_HALF,
        );
        let key = chunk_by_global_position(
            -viewport.x / 2.0 + step.x,
            -viewport.y / 2.0 + step.y,
            viewport,
        );
        assert_eq!(key, ChunkKey::new(1, 1));
    }

    #[test]
    fn test_negative_cells_use_euclidean_division() {
        let viewport = Vec2::ZERO;
        let iso = grid_to_iso(-1.0, -1.0, TILE_WIDTH_HALF, TILE_HEIGHT_HALF);
        assert_eq!(
            chunk_by_global_position(iso.x, iso.y, viewport),
            ChunkKey::new(-1, -1)
        );
    }
}
