//! procedural vegetation scatter & its collision categories
use bevy::prelude::*;

use crate::constants::*;

/// -------- kinds --------
#[derive(Component, Clone, Copy, PartialEq, Eq, Debug)]
pub enum VegKind {
    Daisy,
    OakTree,
    TallGrass,
    ShortGrass,
}

impl VegKind {
    pub const ALL: [VegKind; 4] = [
        VegKind::Daisy,
        VegKind::OakTree,
        VegKind::TallGrass,
        VegKind::ShortGrass,
    ];

    /// trees favour low vegetation noise, plants high; thresholds tuned per
    /// kind
    pub fn noise_threshold(self) -> f64 {
        match self {
            VegKind::Daisy => 0.08,
            VegKind::OakTree => 0.05,
            VegKind::TallGrass => 0.2,
            VegKind::ShortGrass => 0.3,
        }
    }

    /// only trunks block movement; grass and flowers are walk‑through
    pub fn blocking(self) -> bool {
        matches!(self, VegKind::OakTree)
    }

    pub fn size(self) -> Vec2 {
        match self {
            VegKind::Daisy => Vec2::new(24.0, 24.0),
            VegKind::OakTree => Vec2::new(128.0, 192.0),
            VegKind::TallGrass => Vec2::new(40.0, 48.0),
            VegKind::ShortGrass => Vec2::new(40.0, 28.0),
        }
    }

    pub fn tint(self) -> Color {
        match self {
            VegKind::Daisy => Color::srgb(0.95, 0.95, 0.85),
            VegKind::OakTree => Color::srgb(0.16, 0.38, 0.16),
            VegKind::TallGrass => Color::srgb(0.30, 0.55, 0.22),
            VegKind::ShortGrass => Color::srgb(0.36, 0.60, 0.26),
        }
    }
}

/* ===========================================================
   per‑cell sprite component
   =========================================================== */

/// iso position of the sprite's bottom‑centre anchor
#[derive(Component)]
pub struct Vegetation {
    pub kind: VegKind,
    pub x: f32,
    pub y: f32,
}

/* ===========================================================
   selection
   =========================================================== */

/// what grows on a cell, given its vegetation noise and scatter hash.
/// Later kinds override earlier ones when several qualify.
pub fn pick_vegetation(veg_noise: f64, scatter: f64) -> Option<VegKind> {
    let mut selected = None;

    for kind in VegKind::ALL {
        let is_tree = kind == VegKind::OakTree && veg_noise <= kind.noise_threshold();
        let is_plant = kind != VegKind::OakTree && veg_noise >= kind.noise_threshold();

        if (is_tree && scatter < TREE_DENSITY) || (is_plant && scatter < PLANT_DENSITY) {
            selected = Some(kind);
        }
    }

    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_high_scatter_grows_nothing() {
        assert_eq!(pick_vegetation(0.5, 0.5), None);
        assert_eq!(pick_vegetation(-0.5, 0.5), None);
    }

    #[test]
    fn test_low_noise_grows_trees() {
        assert_eq!(pick_vegetation(0.0, 0.01), Some(VegKind::OakTree));
        // above the tree density no trunk spawns even on qualifying cells
        assert_eq!(pick_vegetation(0.0, 0.05), None);
    }

    #[test]
    fn test_plants_pick_the_densest_qualifying_kind() {
        assert_eq!(pick_vegetation(0.25, 0.05), Some(VegKind::TallGrass));
        assert_eq!(pick_vegetation(0.35, 0.05), Some(VegKind::ShortGrass));
        assert_eq!(pick_vegetation(0.1, 0.05), Some(VegKind::Daisy));
    }

    #[test]
    fn test_only_trees_block() {
        assert!(VegKind::OakTree.blocking());
        assert!(!VegKind::Daisy.blocking());
        assert!(!VegKind::TallGrass.blocking());
        assert!(!VegKind::ShortGrass.blocking());
    }
}
