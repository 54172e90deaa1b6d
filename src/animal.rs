//! roaming animal spawn, wander AI & animation
use bevy::prelude::*;
use bevy::sprite::Anchor;
use rand::Rng;

use crate::chunks::ChunkMap;
use crate::components::*;
use crate::constants::*;
use crate::noise_field::WorldNoise;
use crate::player::{set_atlas_index, AnimationKey, Facing};
use crate::position::{chunk_by_global_position, grid_to_iso, iso_transform, object_z};
use crate::terrain::is_water_at;

const DIRECTIONS: [Vec2; 9] = [
    Vec2::new(0.0, -1.0),
    Vec2::new(0.0, 1.0),
    Vec2::new(-1.0, 0.0),
    Vec2::new(1.0, 0.0),
    Vec2::new(-1.0, -1.0),
    Vec2::new(1.0, -1.0),
    Vec2::new(-1.0, 1.0),
    Vec2::new(1.0, 1.0),
    Vec2::ZERO,
];

fn random_direction(rng: &mut impl Rng) -> Vec2 {
    DIRECTIONS[rng.gen_range(0..DIRECTIONS.len())]
}

fn facing_from_direction(direction: Vec2) -> Facing {
    if direction.y < 0.0 && direction.x == 0.0 {
        Facing::UpCenter
    } else if direction.y > 0.0 && direction.x == 0.0 {
        Facing::DownCenter
    } else if direction.x < 0.0 && direction.y == 0.0 {
        Facing::LeftLeft
    } else if direction.x > 0.0 && direction.y == 0.0 {
        Facing::RightRight
    } else if direction.y < 0.0 && direction.x < 0.0 {
        Facing::UpLeft
    } else if direction.y < 0.0 && direction.x > 0.0 {
        Facing::UpRight
    } else if direction.y > 0.0 && direction.x < 0.0 {
        Facing::DownLeft
    } else if direction.y > 0.0 && direction.x > 0.0 {
        Facing::DownRight
    } else {
        Facing::DownCenter
    }
}

/* ---------- start‑up: scatter animals on dry land ---------- */
pub fn spawn_animals(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    mut atlas_layouts: ResMut<Assets<TextureAtlasLayout>>,
    mut noise: ResMut<WorldNoise>,
) {
    let sheet = asset_server.load("textures/animal_sheet.png");
    let layout =
        TextureAtlasLayout::from_grid(UVec2::new(64, 64), FRAME_COUNT as u32, 16, None, None);
    let layout_handle = atlas_layouts.add(layout);

    let mut rng = rand::thread_rng();

    for _ in 0..ANIMAL_COUNT {
        let pos = find_dry_spawn(&mut noise, &mut rng);
        let direction = random_direction(&mut rng);
        let key = AnimationKey {
            facing: facing_from_direction(direction),
            water: false,
        };

        let mut sprite = Sprite::from_atlas_image(
            sheet.clone(),
            TextureAtlas {
                layout: layout_handle.clone(),
                index: key.atlas_row() * FRAME_COUNT,
            },
        );
        sprite.anchor = Anchor::BottomLeft;
        sprite.custom_size = Some(Vec2::new(ANIMAL_WIDTH, ANIMAL_HEIGHT));

        commands.spawn((
            sprite,
            iso_transform(pos.x, pos.y, object_z(pos.y)),
            IsoPos(pos),
            Animal {
                chunk_key: None,
                in_water: false,
                speed: ANIMAL_SPEED,
                direction,
                moving: rng.gen_bool(1.0 - ANIMAL_IDLE_CHANCE),
            },
            AnimState { frame: 0, key },
            AnimationTimer(Timer::from_seconds(ANIMAL_FRAME_SECS, TimerMode::Repeating)),
            TurnTimer(Timer::from_seconds(
                ANIMAL_TURN_SECS + rng.gen_range(0.0..ANIMAL_TURN_JITTER_SECS),
                TimerMode::Repeating,
            )),
        ));
    }

    info!("spawned {ANIMAL_COUNT} animals");
}

/// rejection‑sample a dry cell around the origin, fall back to a coarse grid
/// sweep, then to the origin itself
fn find_dry_spawn(noise: &mut WorldNoise, rng: &mut impl Rng) -> Vec2 {
    for _ in 0..100 {
        let row = (rng.gen::<f32>() - 0.5) * ANIMAL_SPAWN_RANGE;
        let col = (rng.gen::<f32>() - 0.5) * ANIMAL_SPAWN_RANGE;
        let iso = grid_to_iso(row, col, TILE_WIDTH_HALF, TILE_HEIGHT_HALF);
        let pos = Vec2::new(iso.x - ANIMAL_WIDTH / 2.0, iso.y + ANIMAL_HEIGHT / 2.0);

        if !is_water_at(noise, pos.x + ANIMAL_WIDTH / 2.0, pos.y) {
            return pos;
        }
    }

    for gx in (-20..=20).step_by(2) {
        for gy in (-20..=20).step_by(2) {
            let iso = grid_to_iso(gy as f32, gx as f32, TILE_WIDTH_HALF, TILE_HEIGHT_HALF);
            let pos = Vec2::new(iso.x - ANIMAL_WIDTH / 2.0, iso.y + ANIMAL_HEIGHT / 2.0);

            if !is_water_at(noise, pos.x + ANIMAL_WIDTH / 2.0, pos.y) {
                return pos;
            }
        }
    }

    Vec2::new(-ANIMAL_WIDTH / 2.0, ANIMAL_HEIGHT / 2.0)
}

/* ---------- AI: idle <-> wander on a jittered timer ---------- */
pub fn animal_ai_system(
    time: Res<Time>,
    mut q: Query<(&mut TurnTimer, &mut Animal, &mut AnimState)>,
) {
    let mut rng = rand::thread_rng();

    for (mut timer, mut animal, mut anim) in &mut q {
        if !timer.tick(time.delta()).just_finished() {
            continue;
        }

        animal.direction = random_direction(&mut rng);
        animal.moving = rng.gen_bool(1.0 - ANIMAL_IDLE_CHANCE);
        anim.key = AnimationKey {
            facing: facing_from_direction(animal.direction),
            water: animal.in_water,
        };
    }
}

/* ---------- movement with water avoidance ---------- */
pub fn animal_move_system(
    time: Res<Time>,
    window_q: Query<&Window>,
    chunks: Res<ChunkMap>,
    mut noise: ResMut<WorldNoise>,
    mut q: Query<(&mut IsoPos, &mut Transform, &mut Animal, &mut AnimState)>,
) {
    let window = window_q.single();
    let viewport = Vec2::new(window.width(), window.height());
    let dt = time.delta_secs();
    let mut rng = rand::thread_rng();

    for (mut pos, mut tf, mut animal, mut anim) in &mut q {
        // animals shy away from water instead of swimming
        animal.in_water = false;
        animal.speed = ANIMAL_SPEED;

        let center = chunk_by_global_position(pos.x, pos.y, viewport);
        if chunks.get(center.y, center.x).is_some() && animal.chunk_key != Some(center) {
            animal.chunk_key = Some(center);
        }

        if animal.moving {
            let distance = dt * animal.speed;
            let new_x = pos.x + animal.direction.x * distance * 2.0;
            let new_y = pos.y + animal.direction.y * distance;

            if steps_into_water(&mut noise, new_x, new_y) {
                animal.direction = random_direction(&mut rng);
                anim.key = AnimationKey {
                    facing: facing_from_direction(animal.direction),
                    water: animal.in_water,
                };
            } else {
                pos.x = new_x;
                pos.y = new_y;
            }
        }

        *tf = iso_transform(pos.x, pos.y, object_z(pos.y));
    }
}

fn steps_into_water(noise: &mut WorldNoise, x: f32, y: f32) -> bool {
    is_water_at(noise, x + ANIMAL_WIDTH / 2.0, y)
        || is_water_at(noise, x, y)
        || is_water_at(noise, x + ANIMAL_WIDTH, y)
}

/* ---------- same walk cycle as the player ---------- */
pub fn animate_animal_system(
    time: Res<Time>,
    mut q: Query<(&mut AnimationTimer, &mut AnimState, &mut Sprite, &Animal)>,
) {
    for (mut timer, mut anim, mut sprite, animal) in &mut q {
        if animal.moving {
            if timer.tick(time.delta()).just_finished() {
                anim.frame = (anim.frame + 1) % FRAME_COUNT;
                set_atlas_index(&mut sprite, &anim);
            }
        } else if anim.frame != 0 {
            anim.frame = 0;
            set_atlas_index(&mut sprite, &anim);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facing_covers_all_compass_directions() {
        assert_eq!(facing_from_direction(Vec2::new(0.0, -1.0)), Facing::UpCenter);
        assert_eq!(facing_from_direction(Vec2::new(0.0, 1.0)), Facing::DownCenter);
        assert_eq!(facing_from_direction(Vec2::new(-1.0, 0.0)), Facing::LeftLeft);
        assert_eq!(facing_from_direction(Vec2::new(1.0, 0.0)), Facing::RightRight);
        assert_eq!(facing_from_direction(Vec2::new(-1.0, -1.0)), Facing::UpLeft);
        assert_eq!(facing_from_direction(Vec2::new(1.0, -1.0)), Facing::UpRight);
        assert_eq!(facing_from_direction(Vec2::new(-1.0, 1.0)), Facing::DownLeft);
        assert_eq!(facing_from_direction(Vec2::new(1.0, 1.0)), Facing::DownRight);
        assert_eq!(facing_from_direction(Vec2::ZERO), Facing::DownCenter);
    }
}
