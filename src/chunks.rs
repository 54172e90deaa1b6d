//! chunk keys, the bounded chunk store & visibility helpers
use bevy::prelude::*;
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::constants::*;
use crate::terrain::TerrainKind;

/* ===========================================================
   chunk key
   =========================================================== */

/// identifies one `CHUNK_SIZE`² block of grid cells
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ChunkKey {
    pub x: i32,
    pub y: i32,
}

impl ChunkKey {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// the key of the chunk containing an absolute grid cell
    pub fn from_cell(row: i32, col: i32) -> Self {
        Self {
            x: col.div_euclid(CHUNK_SIZE),
            y: row.div_euclid(CHUNK_SIZE),
        }
    }

    /// `(row, col)` of the chunk's first cell
    pub fn origin_cell(self) -> (i32, i32) {
        (self.y * CHUNK_SIZE, self.x * CHUNK_SIZE)
    }

    /// inverse of `to_string`; rejects anything that does not parse back to
    /// two integers so a malformed label never becomes a lookup key
    pub fn parse(label: &str) -> Option<Self> {
        let (x, y) = label.split_once('_')?;

        Some(Self {
            x: x.parse().ok()?,
            y: y.parse().ok()?,
        })
    }
}

impl fmt::Display for ChunkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.x, self.y)
    }
}

/* ===========================================================
   chunk content
   =========================================================== */

/// one generated ground tile, kept in generation (row‑major) order
pub struct GroundTile {
    pub row: i32,
    pub col: i32,
    /// iso position of the sprite's top‑left corner
    pub x: f32,
    pub y: f32,
    pub kind: TerrainKind,
}

/// a resident chunk: two scene containers plus the generated tile data.
/// Tiles are generated exactly once per key; a chunk is never regenerated
/// while it stays resident.
pub struct Chunk {
    pub ground: Entity,
    pub object: Entity,
    pub tiles: Vec<GroundTile>,
    /// object‑layer sprite per occupied cell, the position‑label association
    pub vegetation: HashMap<(i32, i32), Entity>,
    pub attached: bool,
}

/* ===========================================================
   chunk store
   =========================================================== */
#[derive(Resource, Default)]
pub struct ChunkMap {
    chunks: HashMap<ChunkKey, Chunk>,
}

impl ChunkMap {
    /// lookup by chunk coordinates
    pub fn get(&self, row: i32, col: i32) -> Option<&Chunk> {
        self.get_by_key(&ChunkKey::new(col, row))
    }

    pub fn get_by_key(&self, key: &ChunkKey) -> Option<&Chunk> {
        self.chunks.get(key)
    }

    pub fn contains(&self, key: &ChunkKey) -> bool {
        self.chunks.contains_key(key)
    }

    pub fn insert(&mut self, key: ChunkKey, chunk: Chunk) {
        self.chunks.insert(key, chunk);
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&ChunkKey, &mut Chunk)> + '_ {
        self.chunks.iter_mut()
    }

    /// drop every chunk outside the visible set, returning the dropped ones
    /// so the caller can destroy their scene nodes. Dropped chunks lose
    /// their tiles for good; a revisit regenerates them from noise.
    pub fn retain_visible(&mut self, visible: &HashSet<ChunkKey>) -> Vec<(ChunkKey, Chunk)> {
        let dropped_keys: Vec<ChunkKey> = self
            .chunks
            .keys()
            .filter(|key| !visible.contains(*key))
            .copied()
            .collect();

        dropped_keys
            .into_iter()
            .filter_map(|key| self.chunks.remove(&key).map(|chunk| (key, chunk)))
            .collect()
    }
}

/// the `(2r+1)²` keys around a centre chunk, in row‑major order
pub fn visible_keys(center: ChunkKey, radius: i32) -> Vec<ChunkKey> {
    let mut keys = Vec::with_capacity(((2 * radius + 1) * (2 * radius + 1)) as usize);

    for y in center.y - radius..=center.y + radius {
        for x in center.x - radius..=center.x + radius {
            keys.push(ChunkKey::new(x, y));
        }
    }

    keys
}

/* ===========================================================
   render distance
   =========================================================== */
#[derive(Resource)]
pub struct RenderDistance {
    pub radius: i32,
}

impl RenderDistance {
    /// chunks needed to cover the viewport width plus padding; clamped so a
    /// degenerate 0‑size window still streams something
    pub fn from_viewport(width: f32) -> Self {
        let chunk_px = CHUNK_SIZE as f32 * TILE_WIDTH_HALF;
        let radius = (width / chunk_px).ceil() as i32 + CHUNK_PADDING;

        Self {
            radius: radius.max(1),
        }
    }

    /// store bound; sized so eviction stays rare during normal movement
    pub fn capacity(&self) -> usize {
        (self.radius * self.radius) as usize * CHUNK_CAPACITY_FACTOR
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placeholder_chunk() -> Chunk {
        Chunk {
            ground: Entity::from_raw(1),
            object: Entity::from_raw(2),
            tiles: Vec::new(),
            vegetation: HashMap::new(),
            attached: true,
        }
    }

    #[test]
    fn test_key_string_round_trip() {
        for key in [
            ChunkKey::new(0, 0),
            ChunkKey::new(12, -7),
            ChunkKey::new(-3, -4),
            ChunkKey::new(i32::MAX, i32::MIN),
        ] {
            assert_eq!(ChunkKey::parse(&key.to_string()), Some(key));
        }
    }

    #[test]
    fn test_malformed_labels_are_rejected() {
        for label in ["", "_", "abc", "1_", "_2", "1_2_3", "1.5_2", "one_two"] {
            assert_eq!(ChunkKey::parse(label), None, "label {label:?}");
        }
    }

    #[test]
    fn test_from_cell_is_constant_within_a_block() {
        let key = ChunkKey::from_cell(0, 0);
        for row in 0..CHUNK_SIZE {
            for col in 0..CHUNK_SIZE {
                assert_eq!(ChunkKey::from_cell(row, col), key);
            }
        }

        // negative cells fall in the chunk below, not chunk zero
        assert_eq!(ChunkKey::from_cell(-1, -1), ChunkKey::new(-1, -1));
        assert_eq!(
            ChunkKey::from_cell(-CHUNK_SIZE, -CHUNK_SIZE),
            ChunkKey::new(-1, -1)
        );
    }

    #[test]
    fn test_origin_cell_inverts_from_cell() {
        for key in [ChunkKey::new(3, -2), ChunkKey::new(-5, 7), ChunkKey::new(0, 0)] {
            let (row, col) = key.origin_cell();
            assert_eq!(ChunkKey::from_cell(row, col), key);
        }
    }

    #[test]
    fn test_visible_keys_square_in_row_major_order() {
        let keys = visible_keys(ChunkKey::new(0, 0), 1);
        assert_eq!(keys.len(), 9);
        assert_eq!(keys[0], ChunkKey::new(-1, -1));
        assert_eq!(keys[1], ChunkKey::new(0, -1));
        assert_eq!(keys[4], ChunkKey::new(0, 0));
        assert_eq!(keys[8], ChunkKey::new(1, 1));
    }

    #[test]
    fn test_retain_visible_leaves_exactly_the_visible_set() {
        let mut map = ChunkMap::default();
        let resident = visible_keys(ChunkKey::new(0, 0), 2);
        for key in &resident {
            map.insert(*key, placeholder_chunk());
        }

        let visible: HashSet<ChunkKey> = visible_keys(ChunkKey::new(1, 0), 1).into_iter().collect();
        let dropped = map.retain_visible(&visible);

        assert_eq!(map.len(), visible.len());
        for key in &visible {
            assert!(map.get_by_key(key).is_some());
        }
        assert_eq!(dropped.len(), resident.len() - visible.len());
        for (key, _) in &dropped {
            assert!(!visible.contains(key));
        }
    }

    #[test]
    fn test_get_by_chunk_coordinates() {
        let mut map = ChunkMap::default();
        map.insert(ChunkKey::new(5, 2), placeholder_chunk());

        assert!(map.get(2, 5).is_some());
        assert!(map.get(5, 2).is_none());
    }

    #[test]
    fn test_render_distance_clamps_degenerate_viewport() {
        assert!(RenderDistance::from_viewport(0.0).radius >= 1);
        assert_eq!(RenderDistance::from_viewport(1280.0).radius, 4);

        let rd = RenderDistance::from_viewport(1280.0);
        assert_eq!(rd.capacity(), 16 * CHUNK_CAPACITY_FACTOR);
    }
}
