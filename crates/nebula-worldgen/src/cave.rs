//! 3D noise-based cave carving.
//!
//! Samples a density field at `0.05·(x, y, z)` and carves where it exceeds a
//! threshold that rises with depth below the surface, so caves thin out near
//! the surface band and stay open deeper down.

use std::sync::Arc;

use glam::IVec3;

use crate::block::{BlockRef, ChunkBlockMap};
use crate::field::{NoiseConfig, ScalarField, SharedField, SimplexFbm};

/// Scale applied to block coordinates before sampling the cave field.
pub const CAVE_SAMPLE_SCALE: f64 = 0.05;
/// No carving within this many blocks of the world bottom.
pub const CAVE_FLOOR_MARGIN: i32 = 10;
/// Threshold at the surface; deep cells add up to the same again.
const BASE_THRESHOLD: f64 = 0.2;
/// Depth over which the threshold ramps from its base to its maximum.
const DEPTH_RAMP: f64 = 20.0;

/// Carves air pockets into already-assembled columns.
#[derive(Clone)]
pub struct CaveCarver {
    field: SharedField,
    min_y: i32,
}

impl CaveCarver {
    /// Create a carver sampling `field`. `min_y` is the world bottom.
    pub fn new(field: SharedField, min_y: i32) -> Self {
        Self { field, min_y }
    }

    /// Carver backed by a three-octave simplex fBm derived from `seed`.
    pub fn with_seed(seed: u64, min_y: i32) -> Self {
        // Offset decorrelates cave noise from terrain noise.
        let config = NoiseConfig::default()
            .with_seed(seed.wrapping_add(0xCAFE_BABE))
            .with_octaves(3)
            .with_scale(1.0);
        Self::new(Arc::new(SimplexFbm::new(config)), min_y)
    }

    /// Lowest and one-past-highest `y` that may be carved in a column with
    /// the given surface height.
    pub fn carve_range(&self, surface_height: i32) -> std::ops::Range<i32> {
        (self.min_y + CAVE_FLOOR_MARGIN)..(surface_height - 1)
    }

    /// Carving threshold at `y` for a column with the given surface height.
    pub fn threshold(y: i32, surface_height: i32) -> f64 {
        let depth_factor = (f64::from(surface_height - y) / DEPTH_RAMP).clamp(0.0, 1.0);
        BASE_THRESHOLD + BASE_THRESHOLD * depth_factor
    }

    /// Whether the cell at `(x, y, z)` is part of a cave.
    pub fn is_cave(&self, x: i32, y: i32, z: i32, surface_height: i32) -> bool {
        if !self.carve_range(surface_height).contains(&y) {
            return false;
        }
        let density = self.field.sample3(
            f64::from(x) * CAVE_SAMPLE_SCALE,
            f64::from(y) * CAVE_SAMPLE_SCALE,
            f64::from(z) * CAVE_SAMPLE_SCALE,
        );
        density > Self::threshold(y, surface_height)
    }

    /// Replaces cave cells of one column with air. Only existing, non-water
    /// entries are touched. Returns the number of carved cells.
    pub fn carve_column(
        &self,
        x: i32,
        z: i32,
        surface_height: i32,
        map: &mut ChunkBlockMap,
    ) -> usize {
        let mut carved = 0;
        for y in self.carve_range(surface_height) {
            let pos = IVec3::new(x, y, z);
            match map.get(pos) {
                Some(block) if !block.is_water() && !block.is_air() => {}
                _ => continue,
            }
            if self.is_cave(x, y, z, surface_height) {
                map.set(pos, BlockRef::AIR);
                carved += 1;
            }
        }
        carved
    }
}
