//! terrain bands & tile tinting
use bevy::prelude::*;

use crate::constants::*;
use crate::noise_field::{cell_hash, WorldNoise};
use crate::position::iso_to_world;

/// -------- bands --------
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum TerrainKind {
    DeepWater,
    ShallowWater,
    Beach,
    LowLand,
    MidLand,
    HighLand,
}

/// band thresholds partition the whole line: `<` on the upper edge, `>=`
/// implied on the lower, so a boundary value belongs to exactly one band
pub fn classify(value: f64) -> TerrainKind {
    if value < -0.35 {
        TerrainKind::DeepWater
    } else if value < -0.12 {
        TerrainKind::ShallowWater
    } else if value < -0.02 {
        TerrainKind::Beach
    } else if value < 0.30 {
        TerrainKind::LowLand
    } else if value < 0.60 {
        TerrainKind::MidLand
    } else {
        TerrainKind::HighLand
    }
}

impl TerrainKind {
    pub fn is_water(self) -> bool {
        matches!(self, TerrainKind::DeepWater | TerrainKind::ShallowWater)
    }

    /// open water is the clear colour; a deep‑water cell produces no tile
    pub fn has_sprite(self) -> bool {
        !matches!(self, TerrainKind::DeepWater)
    }

    pub fn base_rgb(self) -> Vec3 {
        match self {
            TerrainKind::DeepWater => Vec3::new(0.15, 0.33, 0.58),
            TerrainKind::ShallowWater => Vec3::new(0.25, 0.47, 0.70),
            TerrainKind::Beach => Vec3::new(0.87, 0.80, 0.56),
            TerrainKind::LowLand => Vec3::new(0.33, 0.63, 0.26),
            TerrainKind::MidLand => Vec3::new(0.28, 0.54, 0.23),
            TerrainKind::HighLand => Vec3::new(0.55, 0.56, 0.52),
        }
    }

    /// iso‑y offset stepping higher land upward on screen
    pub fn elevation(self) -> f32 {
        match self {
            TerrainKind::DeepWater
            | TerrainKind::ShallowWater
            | TerrainKind::Beach
            | TerrainKind::LowLand => 0.0,
            TerrainKind::MidLand => -8.0,
            TerrainKind::HighLand => -16.0,
        }
    }
}

/// terrain band under an iso pixel, via the cell it falls in
pub fn is_water_at(noise: &mut WorldNoise, x: f32, y: f32) -> bool {
    let cell = iso_to_world(x, y);

    classify(noise.sample(cell.x, cell.y)).is_water()
}

/// quantised per‑cell colour variation for a pixel‑arty look
pub fn tile_tint(kind: TerrainKind, col: i32, row: i32, seed: u32) -> Color {
    let raw = cell_hash(col, row, seed) as f32;

    let step = (raw * COLOR_VARIATION_LEVELS as f32)
        .floor()
        .clamp(0.0, (COLOR_VARIATION_LEVELS - 1) as f32);
    let norm = step / (COLOR_VARIATION_LEVELS as f32 - 1.0) * 2.0 - 1.0;
    let factor = 1.0 + norm * COLOR_VARIATION_STRENGTH;

    let rgb = kind.base_rgb() * factor;

    Color::srgb(
        rgb.x.clamp(0.0, 1.0),
        rgb.y.clamp(0.0, 1.0),
        rgb.z.clamp(0.0, 1.0),
    )
}
