use bevy::prelude::*;

use crate::chunks::ChunkKey;
use crate::player::AnimationKey;

/* ===========================================================
   shared components
   =========================================================== */

/// position in iso pixel space (y grows downward); the source of truth the
/// bevy transform is derived from
#[derive(Component, Deref, DerefMut)]
pub struct IsoPos(pub Vec2);

/// current sprite‑sheet animation state
#[derive(Component)]
pub struct AnimState {
    pub frame: usize,
    pub key: AnimationKey,
}

#[derive(Component, Deref, DerefMut)]
pub struct AnimationTimer(pub Timer);

/* ===========================================================
   player
   =========================================================== */
#[derive(Component)]
pub struct Player {
    /// non‑owning back‑reference; lookups always go through the chunk store
    pub chunk_key: Option<ChunkKey>,
    pub in_water: bool,
    pub speed: f32,
}

/* ===========================================================
   animals
   =========================================================== */
#[derive(Component)]
pub struct Animal {
    pub chunk_key: Option<ChunkKey>,
    pub in_water: bool,
    pub speed: f32,
    pub direction: Vec2,
    pub moving: bool,
}

/// re‑rolls an animal's wander direction when it fires
#[derive(Component, Deref, DerefMut)]
pub struct TurnTimer(pub Timer);
