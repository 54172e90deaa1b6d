/// -------- tiles & chunks --------
pub const TILE_WIDTH: f32 = 128.0;
pub const TILE_WIDTH_HALF: f32 = TILE_WIDTH / 2.0;
pub const TILE_HEIGHT: f32 = 64.0;
pub const TILE_HEIGHT_HALF: f32 = TILE_HEIGHT / 2.0;

pub const CHUNK_SIZE: i32 = 16;
/// extra chunks past the screen edge so corners never show void
pub const CHUNK_PADDING: i32 = 2;
pub const CHUNK_CAPACITY_FACTOR: usize = 16;
pub const CHUNKS_PER_TICK: usize = 1;
pub const RESIZE_DEBOUNCE_SECS: f32 = 0.2;
pub const COLLISION_CHUNK_RADIUS: i32 = 1;

/// -------- world noise --------
pub const WORLD_SEED: u32 = 1_337;
pub const NOISE_CACHE_LIMIT: usize = 1 << 20;

/// -------- player --------
pub const PLAYER_WIDTH: f32 = 32.0;
pub const PLAYER_HEIGHT: f32 = 64.0;
pub const PLAYER_SPEED: f32 = 60.0;
pub const WATER_SPEED_FACTOR: f32 = 0.6;
/// entering a lake from the north shows the ground wall, from the south it
/// does not, so the sprite sinks by a different step on each shore
pub const WATER_SINK_TOP: f32 = TILE_HEIGHT;
pub const WATER_SINK_BOTTOM: f32 = TILE_HEIGHT_HALF;
pub const FRAME_COUNT: usize = 3;
pub const FRAME_SECS: f32 = 0.1;

/// -------- animals --------
pub const ANIMAL_COUNT: usize = 48;
pub const ANIMAL_WIDTH: f32 = 64.0;
pub const ANIMAL_HEIGHT: f32 = 64.0;
pub const ANIMAL_SPEED: f32 = 30.0;
pub const ANIMAL_IDLE_CHANCE: f64 = 0.3;
pub const ANIMAL_TURN_SECS: f32 = 3.0;
pub const ANIMAL_TURN_JITTER_SECS: f32 = 2.0;
pub const ANIMAL_SPAWN_RANGE: f32 = 200.0;
pub const ANIMAL_FRAME_SECS: f32 = 0.15;

/// -------- vegetation --------
pub const TREE_DENSITY: f64 = 0.03;
pub const PLANT_DENSITY: f64 = 0.1;
pub const VEG_BEHIND_ALPHA: f32 = 0.4;

/// -------- colour variation --------
pub const COLOR_VARIATION_LEVELS: i32 = 4;
pub const COLOR_VARIATION_STRENGTH: f32 = 0.2;

/// -------- draw order --------
pub const Z_GROUND_BASE: f32 = -100.0;
pub const Z_GROUND_STEP: f32 = 0.001;
pub const Z_OBJECT_BASE: f32 = 100.0;
pub const Z_PER_ISO_Y: f32 = 0.001;
pub const Z_CLIP: f32 = 100_000.0;
