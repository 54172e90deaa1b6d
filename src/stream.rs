//! chunk streaming: scheduling, materialization & eviction
//!
//! Chunks move through `not resident -> queued -> materializing ->
//! attached <-> detached -> evicted`. Materialization is throttled to a
//! bounded number of chunks per frame so terrain generation never stalls
//! input for more than one chunk's worth of work.
use bevy::prelude::*;
use bevy::sprite::Anchor;
use bevy::window::WindowResized;
use std::collections::{HashMap, HashSet, VecDeque};

use crate::chunks::{visible_keys, Chunk, ChunkKey, ChunkMap, GroundTile, RenderDistance};
use crate::components::{IsoPos, Player};
use crate::constants::*;
use crate::noise_field::{cell_hash, WorldNoise};
use crate::player::MovementKeys;
use crate::position::{chunk_by_global_position, grid_to_iso, iso_to_world, iso_transform, object_z};
use crate::terrain::{classify, tile_tint};
use crate::vegetation::{pick_vegetation, Vegetation};

/* ===========================================================
   resources
   =========================================================== */

/// keys awaiting materialization, in first‑request order
#[derive(Resource, Default)]
pub struct ChunkQueue {
    pending: VecDeque<ChunkKey>,
    queued: HashSet<ChunkKey>,
}

impl ChunkQueue {
    /// duplicate requests are no‑ops; the first insertion keeps its slot
    pub fn enqueue(&mut self, key: ChunkKey) -> bool {
        if !self.queued.insert(key) {
            return false;
        }
        self.pending.push_back(key);
        true
    }

    pub fn pop(&mut self) -> Option<ChunkKey> {
        let key = self.pending.pop_front()?;
        self.queued.remove(&key);
        Some(key)
    }

    pub fn contains(&self, key: &ChunkKey) -> bool {
        self.queued.contains(key)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// the two world‑level layers all chunk containers hang off; ground always
/// draws below objects
#[derive(Resource)]
pub struct WorldLayers {
    pub ground: Entity,
    pub object: Entity,
}

/// set when the whole visible set must be rebuilt in one pass (startup,
/// debounced resize) instead of trickling through the queue
#[derive(Resource, Default)]
pub struct StreamControl {
    pub force_pass: bool,
}

/// collapses a burst of resize events into a single re‑render
#[derive(Resource)]
pub struct ResizeDebounce {
    pub timer: Timer,
    pub pending: bool,
}

/* ===========================================================
   startup
   =========================================================== */
pub fn setup_world(mut commands: Commands, window_q: Query<&Window>) {
    let window = window_q.single();

    let ground = commands
        .spawn((Name::new("ground"), Transform::default(), Visibility::Visible))
        .id();
    let object = commands
        .spawn((Name::new("object"), Transform::default(), Visibility::Visible))
        .id();

    commands.insert_resource(WorldLayers { ground, object });
    commands.insert_resource(WorldNoise::new(WORLD_SEED));
    commands.insert_resource(ChunkMap::default());
    commands.insert_resource(ChunkQueue::default());
    commands.insert_resource(RenderDistance::from_viewport(window.width()));
    commands.insert_resource(StreamControl { force_pass: true });
    commands.insert_resource(ResizeDebounce {
        timer: Timer::from_seconds(RESIZE_DEBOUNCE_SECS, TimerMode::Once),
        pending: false,
    });

    info!("world seeded with {WORLD_SEED}");
}

/* ===========================================================
   scheduling
   =========================================================== */
pub fn schedule_chunks_system(
    move_keys: Res<MovementKeys>,
    control: Res<StreamControl>,
    window_q: Query<&Window>,
    player_q: Query<&IsoPos, With<Player>>,
    distance: Res<RenderDistance>,
    chunks: Res<ChunkMap>,
    mut queue: ResMut<ChunkQueue>,
) {
    if move_keys.is_empty() && !control.force_pass {
        return;
    }
    let Ok(pos) = player_q.get_single() else {
        return;
    };
    let window = window_q.single();

    let center = chunk_by_global_position(pos.x, pos.y, Vec2::new(window.width(), window.height()));

    for key in visible_keys(center, distance.radius) {
        if !chunks.contains(&key) && !queue.contains(&key) {
            queue.enqueue(key);
        }
    }
}

/* ===========================================================
   materialization
   =========================================================== */
pub fn stream_chunks_system(
    mut commands: Commands,
    control: Res<StreamControl>,
    mut queue: ResMut<ChunkQueue>,
    mut chunks: ResMut<ChunkMap>,
    mut noise: ResMut<WorldNoise>,
    layers: Res<WorldLayers>,
) {
    if queue.is_empty() {
        return;
    }

    let budget = if control.force_pass {
        usize::MAX
    } else {
        CHUNKS_PER_TICK
    };

    for _ in 0..budget {
        let Some(key) = queue.pop() else {
            break;
        };
        if chunks.contains(&key) {
            continue;
        }
        materialize_chunk(&mut commands, &mut noise, &mut chunks, &layers, key);
    }
}

/// generate one chunk's tiles and vegetation and register it in the store.
/// Runs once per key while the chunk stays resident; a key that fell out of
/// view since it was queued still completes and is detached right after.
fn materialize_chunk(
    commands: &mut Commands,
    noise: &mut WorldNoise,
    chunks: &mut ChunkMap,
    layers: &WorldLayers,
    key: ChunkKey,
) {
    let field = noise.chunk_field(key);
    let (origin_row, origin_col) = key.origin_cell();
    let label = key.to_string();
    let order = (origin_row + origin_col) as f32 * Z_GROUND_STEP;

    let ground = commands
        .spawn((
            Name::new(label.clone()),
            Transform::from_xyz(0.0, 0.0, Z_GROUND_BASE + order),
            Visibility::Visible,
        ))
        .set_parent(layers.ground)
        .id();
    let object = commands
        .spawn((
            Name::new(label),
            Transform::from_xyz(0.0, 0.0, order),
            Visibility::Visible,
        ))
        .set_parent(layers.object)
        .id();

    let mut tiles = Vec::new();
    let mut vegetation = HashMap::new();

    for row in 0..CHUNK_SIZE {
        for col in 0..CHUNK_SIZE {
            let cell_row = origin_row + row;
            let cell_col = origin_col + col;
            let iso = grid_to_iso(
                cell_row as f32,
                cell_col as f32,
                TILE_WIDTH_HALF,
                TILE_HEIGHT_HALF,
            );
            let kind = classify(field[row as usize][col as usize]);

            if kind.has_sprite() {
                let x = iso.x - TILE_WIDTH_HALF;
                let y = iso.y + kind.elevation();

                commands
                    .spawn((
                        Sprite {
                            color: tile_tint(kind, cell_col, cell_row, noise.seed()),
                            // double height leaves room for the wall face
                            custom_size: Some(Vec2::new(TILE_WIDTH, TILE_HEIGHT * 2.0)),
                            anchor: Anchor::TopLeft,
                            ..default()
                        },
                        iso_transform(x, y, (row + col) as f32 * Z_GROUND_STEP),
                    ))
                    .set_parent(ground);

                tiles.push(GroundTile {
                    row: cell_row,
                    col: cell_col,
                    x,
                    y,
                    kind,
                });
            }

            if !kind.is_water() {
                let cell = iso_to_world(iso.x, iso.y);
                let veg_noise = noise.vegetation(cell.x, cell.y);
                let scatter = cell_hash(iso.x as i32, iso.y as i32, noise.seed());

                if let Some(veg_kind) = pick_vegetation(veg_noise, scatter) {
                    let veg_x = iso.x;
                    let veg_y = iso.y + TILE_HEIGHT * 0.75;

                    let entity = commands
                        .spawn((
                            Sprite {
                                color: veg_kind.tint(),
                                custom_size: Some(veg_kind.size()),
                                anchor: Anchor::BottomCenter,
                                ..default()
                            },
                            iso_transform(veg_x, veg_y, object_z(veg_y)),
                            Vegetation {
                                kind: veg_kind,
                                x: veg_x,
                                y: veg_y,
                            },
                        ))
                        .set_parent(object)
                        .id();

                    vegetation.insert((cell_row, cell_col), entity);
                }
            }
        }
    }

    chunks.insert(
        key,
        Chunk {
            ground,
            object,
            tiles,
            vegetation,
            attached: true,
        },
    );
}

/* ===========================================================
   attach / detach & eviction
   =========================================================== */
pub fn update_visible_chunks_system(
    mut commands: Commands,
    move_keys: Res<MovementKeys>,
    mut control: ResMut<StreamControl>,
    window_q: Query<&Window>,
    player_q: Query<&IsoPos, With<Player>>,
    distance: Res<RenderDistance>,
    mut chunks: ResMut<ChunkMap>,
    mut visibility_q: Query<&mut Visibility>,
) {
    if move_keys.is_empty() && !control.force_pass {
        return;
    }
    control.force_pass = false;
    let Ok(pos) = player_q.get_single() else {
        return;
    };
    let window = window_q.single();

    let center = chunk_by_global_position(pos.x, pos.y, Vec2::new(window.width(), window.height()));
    let visible: HashSet<ChunkKey> = visible_keys(center, distance.radius).into_iter().collect();

    // past the capacity bound the store keeps only the visible subset;
    // anything dropped regenerates from noise on revisit
    if chunks.len() >= distance.capacity() {
        let dropped = chunks.retain_visible(&visible);
        info!("chunk store over capacity, evicting {} chunks", dropped.len());
        for (_, chunk) in dropped {
            commands.entity(chunk.ground).despawn_recursive();
            commands.entity(chunk.object).despawn_recursive();
        }
    }

    // detaching is cheap, so it happens eagerly and never queues
    for (key, chunk) in chunks.iter_mut() {
        let should_attach = visible.contains(key);
        if should_attach == chunk.attached {
            continue;
        }
        chunk.attached = should_attach;

        let state = if should_attach {
            Visibility::Visible
        } else {
            Visibility::Hidden
        };
        for node in [chunk.ground, chunk.object] {
            if let Ok(mut visibility) = visibility_q.get_mut(node) {
                *visibility = state;
            }
        }
    }
}

/* ===========================================================
   window resize
   =========================================================== */
pub fn handle_resize_system(
    mut events: EventReader<WindowResized>,
    mut distance: ResMut<RenderDistance>,
    mut debounce: ResMut<ResizeDebounce>,
) {
    for event in events.read() {
        *distance = RenderDistance::from_viewport(event.width);
        debounce.timer.reset();
        debounce.pending = true;
    }
}

/// built‑in culling covers everything already attached; growing the window
/// (or shrinking it a lot) still needs a full pass, one per resize burst
pub fn resize_debounce_system(
    time: Res<Time>,
    mut debounce: ResMut<ResizeDebounce>,
    mut control: ResMut<StreamControl>,
) {
    if !debounce.pending {
        return;
    }
    if debounce.timer.tick(time.delta()).finished() {
        debounce.pending = false;
        control.force_pass = true;
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
    fn test_enqueue_is_idempotent_and_ordered() {
        let mut queue = ChunkQueue::default();

        assert!(queue.enqueue(ChunkKey::new(0, 0)));
        assert!(queue.enqueue(ChunkKey::new(1, 0)));
        assert!(!queue.enqueue(ChunkKey::new(0, 0)));
        assert_eq!(queue.len(), 2);

        assert_eq!(queue.pop(), Some(ChunkKey::new(0, 0)));
        assert_eq!(queue.pop(), Some(ChunkKey::new(1, 0)));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_popped_keys_can_be_requested_again() {
        let mut queue = ChunkQueue::default();
        queue.enqueue(ChunkKey::new(2, 2));
        queue.pop();

        assert!(!queue.contains(&ChunkKey::new(2, 2)));
        assert!(queue.enqueue(ChunkKey::new(2, 2)));
    }

    #[test]
    fn test_moving_one_chunk_east_streams_one_column() {
        let radius = 2;
        let mut map = ChunkMap::default();
        let mut queue = ChunkQueue::default();

        let resident = visible_keys(ChunkKey::new(0, 0), radius);
        for key in &resident {
            map.insert(*key, placeholder_chunk());
        }

        // schedule pass after the centre moved from (0,0) to (1,0)
        let now_visible = visible_keys(ChunkKey::new(1, 0), radius);
        for key in &now_visible {
            if !map.contains(key) {
                queue.enqueue(*key);
            }
        }

        // exactly the incoming x = 3 column is queued
        assert_eq!(queue.len(), 5);
        for y in -2..=2 {
            assert!(queue.contains(&ChunkKey::new(3, y)));
        }

        // exactly the outgoing x = -2 column falls out of view
        let visible_set: HashSet<ChunkKey> = now_visible.into_iter().collect();
        let detached: Vec<ChunkKey> = resident
            .iter()
            .filter(|key| !visible_set.contains(*key))
            .copied()
            .collect();
        assert_eq!(detached.len(), 5);
        assert!(detached.iter().all(|key| key.x == -2));

        // the queue drains one key per tick
        let mut ticks = 0;
        while queue.pop().is_some() {
            ticks += 1;
        }
        assert_eq!(ticks, 5);
    }
}
