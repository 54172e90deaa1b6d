//! minimal bootstrap for the infinite isometric exploration demo
//!
//! Procedurally generated island terrain streamed in square chunks around a
//! wandering player. Works with **Bevy 0.15**.

mod animal;
mod camera;
mod chunks;
mod collision;
mod components;
mod constants;
mod noise_field;
mod player;
mod position;
mod stream;
mod terrain;
mod vegetation;

use bevy::diagnostic::{
    EntityCountDiagnosticsPlugin, FrameTimeDiagnosticsPlugin,
    LogDiagnosticsPlugin,
};
use bevy::input::ButtonInput;
use bevy::prelude::*;
use bevy::window::{MonitorSelection, PrimaryWindow, WindowMode};

use animal::{animal_ai_system, animal_move_system, animate_animal_system, spawn_animals};
use camera::camera_follow_system;
use constants::Z_CLIP;
use player::{
    animate_player_system, player_input_system, player_movement_system, spawn_player,
    MovementKeys,
};
use stream::{
    handle_resize_system, resize_debounce_system, schedule_chunks_system, setup_world,
    stream_chunks_system, update_visible_chunks_system,
};
use terrain::TerrainKind;

/* ------------------------------------------------------------------------ */
/* camera                                                                   */
/* ------------------------------------------------------------------------ */
fn setup_camera(mut commands: Commands) {
    // widened clip range so y‑derived depth keeps working far from spawn
    commands.spawn((
        Camera2d,
        OrthographicProjection {
            near: -Z_CLIP,
            far: Z_CLIP,
            ..OrthographicProjection::default_2d()
        },
    ));
}

/* ------------------------------------------------------------------------ */
/* F11 borderless‑fullscreen toggle                                         */
/* ------------------------------------------------------------------------ */
fn toggle_fullscreen(
    keys: Res<ButtonInput<KeyCode>>,
    mut window_q: Query<&mut Window, With<PrimaryWindow>>,
) {
    if keys.just_pressed(KeyCode::F11) {
        let mut window = window_q.single_mut();
        window.mode = match window.mode {
            WindowMode::Windowed => {
                WindowMode::BorderlessFullscreen(MonitorSelection::Primary)
            }
            _ => WindowMode::Windowed,
        };
    }
}

/* ------------------------------------------------------------------------ */
/* main                                                                     */
/* ------------------------------------------------------------------------ */
fn main() {
    let water = TerrainKind::DeepWater.base_rgb();

    App::new()
        /* diagnostics ----------------------------------------------------- */
        .add_plugins((
            LogDiagnosticsPlugin::default(),
            FrameTimeDiagnosticsPlugin::default(),
            EntityCountDiagnosticsPlugin::default(),
        ))

        /* bevy core ------------------------------------------------------- */
        // open water never spawns a tile; the clear colour stands in for it
        .insert_resource(ClearColor(Color::srgb(water.x, water.y, water.z)))
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                resolution: (1280., 720.).into(),
                mode: WindowMode::Windowed,
                ..default()
            }),
            ..default()
        }))
        .init_resource::<MovementKeys>()

        /* startup systems ------------------------------------------------- */
        .add_systems(
            Startup,
            (setup_camera, setup_world, spawn_player, spawn_animals).chain(),
        )

        /* frame‑update systems ------------------------------------------- */
        .add_systems(
            Update,
            (
                /* player -------------------------------------------------- */
                player_input_system,
                player_movement_system.after(player_input_system),
                animate_player_system.after(player_movement_system),

                /* world --------------------------------------------------- */
                (
                    schedule_chunks_system,
                    stream_chunks_system,
                    update_visible_chunks_system,
                )
                    .chain()
                    .after(player_movement_system),

                /* animals ------------------------------------------------- */
                animal_ai_system,
                animal_move_system.after(animal_ai_system),
                animate_animal_system.after(animal_move_system),

                /* misc ---------------------------------------------------- */
                handle_resize_system,
                resize_debounce_system.after(handle_resize_system),
                toggle_fullscreen,
            ),
        )

        /* post‑update (camera) -------------------------------------------- */
        .add_systems(PostUpdate, camera_follow_system)
        .run();
}
