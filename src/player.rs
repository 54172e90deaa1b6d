//! player input, movement, water state & animation
use bevy::prelude::*;
use bevy::sprite::Anchor;
use std::fmt;

use crate::chunks::ChunkMap;
use crate::collision::{resolve_actor_bounds, ActorBounds};
use crate::components::*;
use crate::constants::*;
use crate::noise_field::WorldNoise;
use crate::position::{chunk_by_global_position, grid_to_iso, iso_to_world, iso_transform, object_z};
use crate::terrain::is_water_at;
use crate::vegetation::Vegetation;

/* ===========================================================
   movement keys
   =========================================================== */
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveKey {
    Up,
    Left,
    Down,
    Right,
}

impl MoveKey {
    pub const ALL: [MoveKey; 4] = [MoveKey::Up, MoveKey::Left, MoveKey::Down, MoveKey::Right];

    pub fn opposite(self) -> Self {
        match self {
            MoveKey::Up => MoveKey::Down,
            MoveKey::Down => MoveKey::Up,
            MoveKey::Left => MoveKey::Right,
            MoveKey::Right => MoveKey::Left,
        }
    }
}

const MOVE_BINDINGS: [(KeyCode, MoveKey); 4] = [
    (KeyCode::KeyW, MoveKey::Up),
    (KeyCode::KeyA, MoveKey::Left),
    (KeyCode::KeyS, MoveKey::Down),
    (KeyCode::KeyD, MoveKey::Right),
];

/// the held movement keys, in press order
#[derive(Resource, Default)]
pub struct MovementKeys {
    held: Vec<MoveKey>,
}

impl MovementKeys {
    /// two directions on one axis would fight over the animation key, so a
    /// new press cancels its held opposite
    pub fn press(&mut self, key: MoveKey) {
        if self.held.contains(&key) {
            return;
        }
        self.held.retain(|&held| held != key.opposite());
        self.held.push(key);
    }

    pub fn release(&mut self, key: MoveKey) {
        self.held.retain(|&held| held != key);
    }

    pub fn is_held(&self, key: MoveKey) -> bool {
        self.held.contains(&key)
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }

    pub fn len(&self) -> usize {
        self.held.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = MoveKey> + '_ {
        self.held.iter().copied()
    }
}

/* ===========================================================
   animation keys
   =========================================================== */
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Facing {
    UpCenter,
    DownCenter,
    LeftLeft,
    RightRight,
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
}

impl Facing {
    fn as_str(self) -> &'static str {
        match self {
            Facing::UpCenter => "up-center",
            Facing::DownCenter => "down-center",
            Facing::LeftLeft => "left-left",
            Facing::RightRight => "right-right",
            Facing::UpLeft => "up-left",
            Facing::UpRight => "up-right",
            Facing::DownLeft => "down-left",
            Facing::DownRight => "down-right",
        }
    }

    fn row(self) -> usize {
        match self {
            Facing::UpCenter => 0,
            Facing::DownCenter => 1,
            Facing::LeftLeft => 2,
            Facing::RightRight => 3,
            Facing::UpLeft => 4,
            Facing::UpRight => 5,
            Facing::DownLeft => 6,
            Facing::DownRight => 7,
        }
    }
}

/// names one row of the actor sprite sheet, e.g. `up-center` or
/// `water-left-left`
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct AnimationKey {
    pub facing: Facing,
    pub water: bool,
}

impl Default for AnimationKey {
    fn default() -> Self {
        Self {
            facing: Facing::DownCenter,
            water: false,
        }
    }
}

impl AnimationKey {
    /// the sheet stacks the eight dry rows above their water variants
    pub fn atlas_row(self) -> usize {
        self.facing.row() + if self.water { 8 } else { 0 }
    }

    /// next key for the held set. One key faces along its axis, two combine
    /// into a diagonal with the vertical named first, anything else keeps
    /// the current facing.
    pub fn derive(current: AnimationKey, keys: &MovementKeys, in_water: bool) -> AnimationKey {
        if keys.is_empty() && in_water {
            return AnimationKey {
                water: true,
                ..current
            };
        }
        if keys.is_empty() || keys.len() > 2 {
            return current;
        }

        let mut vertical = None;
        let mut horizontal = None;
        for key in keys.iter() {
            match key {
                MoveKey::Up | MoveKey::Down => vertical = Some(key),
                MoveKey::Left | MoveKey::Right => horizontal = Some(key),
            }
        }

        let facing = match (vertical, horizontal) {
            (Some(MoveKey::Up), Some(MoveKey::Left)) => Facing::UpLeft,
            (Some(MoveKey::Up), Some(MoveKey::Right)) => Facing::UpRight,
            (Some(MoveKey::Down), Some(MoveKey::Left)) => Facing::DownLeft,
            (Some(MoveKey::Down), Some(MoveKey::Right)) => Facing::DownRight,
            (Some(MoveKey::Up), None) => Facing::UpCenter,
            (Some(MoveKey::Down), None) => Facing::DownCenter,
            (None, Some(MoveKey::Left)) => Facing::LeftLeft,
            (None, Some(MoveKey::Right)) => Facing::RightRight,
            _ => current.facing,
        };

        AnimationKey {
            facing,
            water: in_water,
        }
    }
}

impl fmt::Display for AnimationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.water {
            write!(f, "water-{}", self.facing.as_str())
        } else {
            f.write_str(self.facing.as_str())
        }
    }
}

/* ===========================================================
   spawn
   =========================================================== */

/// drop the player on the tile under the viewport centre
pub fn spawn_player(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    mut atlas_layouts: ResMut<Assets<TextureAtlasLayout>>,
    window_q: Query<&Window>,
    mut noise: ResMut<WorldNoise>,
) {
    let window = window_q.single();

    let center = iso_to_world(window.width() / 2.0, window.height() / 2.0);
    let snapped = grid_to_iso(
        center.y as f32,
        center.x as f32,
        TILE_WIDTH_HALF,
        TILE_HEIGHT_HALF,
    );
    let mut pos = Vec2::new(
        snapped.x - PLAYER_WIDTH / 2.0,
        snapped.y + PLAYER_HEIGHT / 2.0,
    );

    let mut player = Player {
        chunk_key: None,
        in_water: false,
        speed: PLAYER_SPEED,
    };
    apply_water_state(&mut noise, &mut player, &mut pos);

    let key = AnimationKey::derive(
        AnimationKey::default(),
        &MovementKeys::default(),
        player.in_water,
    );

    let sheet = asset_server.load("textures/player_sheet.png");
    let layout = TextureAtlasLayout::from_grid(UVec2::new(32, 64), FRAME_COUNT as u32, 16, None, None);
    let layout_handle = atlas_layouts.add(layout);

    let mut sprite = Sprite::from_atlas_image(
        sheet,
        TextureAtlas {
            layout: layout_handle,
            index: key.atlas_row() * FRAME_COUNT,
        },
    );
    sprite.anchor = Anchor::BottomLeft;
    sprite.custom_size = Some(Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT));

    commands.spawn((
        sprite,
        iso_transform(pos.x, pos.y, object_z(pos.y)),
        IsoPos(pos),
        player,
        AnimState { frame: 0, key },
        AnimationTimer(Timer::from_seconds(FRAME_SECS, TimerMode::Repeating)),
    ));
}

/* ===========================================================
   input (WASD)
   =========================================================== */
pub fn player_input_system(
    keys: Res<ButtonInput<KeyCode>>,
    mut move_keys: ResMut<MovementKeys>,
) {
    for (code, key) in MOVE_BINDINGS {
        if keys.just_pressed(code) {
            move_keys.press(key);
        }
        if keys.just_released(code) {
            move_keys.release(key);
        }
    }
}

/* ===========================================================
   movement, bounds & water
   =========================================================== */
pub fn player_movement_system(
    time: Res<Time>,
    move_keys: Res<MovementKeys>,
    window_q: Query<&Window>,
    chunks: Res<ChunkMap>,
    mut noise: ResMut<WorldNoise>,
    mut player_q: Query<(&mut IsoPos, &mut Transform, &mut Player)>,
    mut veg_q: Query<(&Vegetation, &mut Sprite)>,
) {
    if move_keys.is_empty() {
        return;
    }
    let Ok((mut pos, mut tf, mut player)) = player_q.get_single_mut() else {
        return;
    };
    let window = window_q.single();
    let viewport = Vec2::new(window.width(), window.height());

    // keep the chunk back‑reference current before resolving bounds
    let center = chunk_by_global_position(pos.x, pos.y, viewport);
    if chunks.get(center.y, center.x).is_some() && player.chunk_key != Some(center) {
        player.chunk_key = Some(center);
    }

    let bounds = ActorBounds {
        x: pos.x,
        y: pos.y,
        width: PLAYER_WIDTH,
        height: PLAYER_HEIGHT,
    };
    let allowed = resolve_actor_bounds(&chunks, center, &bounds, &mut veg_q);

    // horizontal steps run double to match the 2:1 tile aspect
    let distance = time.delta_secs() * player.speed;
    if move_keys.is_held(MoveKey::Up) && allowed.contains(&MoveKey::Up) {
        pos.y -= distance;
    }
    if move_keys.is_held(MoveKey::Left) && allowed.contains(&MoveKey::Left) {
        pos.x -= distance * 2.0;
    }
    if move_keys.is_held(MoveKey::Down) && allowed.contains(&MoveKey::Down) {
        pos.y += distance;
    }
    if move_keys.is_held(MoveKey::Right) && allowed.contains(&MoveKey::Right) {
        pos.x += distance * 2.0;
    }

    apply_water_state(&mut noise, &mut player, &mut pos.0);

    // larger iso y draws in front of trees rooted further north
    *tf = iso_transform(pos.x, pos.y, object_z(pos.y));
}

/// two probe lines (head and feet, both corners) through the terrain field
fn water_lines(noise: &mut WorldNoise, actor: &ActorBounds, in_water: bool) -> (bool, bool) {
    let top_y = if in_water {
        actor.y - WATER_SINK_TOP
    } else {
        actor.y - WATER_SINK_BOTTOM
    };

    let top = is_water_at(noise, actor.x, top_y) || is_water_at(noise, actor.x + actor.width, top_y);
    let bottom = is_water_at(noise, actor.x, actor.y)
        || is_water_at(noise, actor.x + actor.width, actor.y);

    (top, bottom)
}

/// wading in and out adjusts the sprite by a shore‑dependent step and scales
/// the speed while swimming
fn apply_water_state(noise: &mut WorldNoise, player: &mut Player, pos: &mut Vec2) {
    let bounds = ActorBounds {
        x: pos.x,
        y: pos.y,
        width: PLAYER_WIDTH,
        height: PLAYER_HEIGHT,
    };
    let (top, bottom) = water_lines(noise, &bounds, player.in_water);

    if top && !player.in_water {
        player.in_water = true;
        player.speed = PLAYER_SPEED * WATER_SPEED_FACTOR;
        pos.y -= WATER_SINK_BOTTOM;
    } else if !bottom && player.in_water {
        player.in_water = false;
        player.speed = PLAYER_SPEED;
        pos.y += WATER_SINK_BOTTOM;
    } else if bottom && !player.in_water {
        player.in_water = true;
        player.speed = PLAYER_SPEED * WATER_SPEED_FACTOR;
        pos.y += WATER_SINK_TOP;
    } else if !top && player.in_water {
        player.in_water = false;
        player.speed = PLAYER_SPEED;
        pos.y -= WATER_SINK_TOP;
    }
}

/* ===========================================================
   walk‑cycle animation
   =========================================================== */
pub fn animate_player_system(
    time: Res<Time>,
    move_keys: Res<MovementKeys>,
    mut q: Query<(&mut AnimationTimer, &mut AnimState, &mut Sprite, &Player)>,
) {
    let Ok((mut timer, mut anim, mut sprite, player)) = q.get_single_mut() else {
        return;
    };

    if move_keys.is_empty() {
        // snap back to the resting frame once movement stops
        if anim.frame != 0 {
            anim.frame = 0;
            set_atlas_index(&mut sprite, &anim);
        }
        return;
    }

    if timer.tick(time.delta()).just_finished() {
        anim.frame = (anim.frame + 1) % FRAME_COUNT;
        anim.key = AnimationKey::derive(anim.key, &move_keys, player.in_water);
        set_atlas_index(&mut sprite, &anim);
    }
}

pub(crate) fn set_atlas_index(sprite: &mut Sprite, anim: &AnimState) {
    if let Some(atlas) = sprite.texture_atlas.as_mut() {
        atlas.index = anim.key.atlas_row() * FRAME_COUNT + anim.frame;
    }
}
