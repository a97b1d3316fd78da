//! Shared scalar fields that biome height strategies read.

use std::fmt;
use std::sync::Arc;

use crate::field::{
    CellularNoise, DomainWarp, FractalNoise, NoiseConfig, ScalarField, SharedField,
};

const CONTINENTAL_OFFSET: u64 = 10_000;
const DETAIL_OFFSET: u64 = 11_000;
const RIDGE_OFFSET: u64 = 12_000;
const HILLS_OFFSET: u64 = 13_000;
const HILLS_WARP_OFFSET: u64 = 14_000;

/// Terrain fields built once per world from the seed.
#[derive(Clone)]
pub struct TerrainFields {
    seed: u64,
    continental: SharedField,
    detail: SharedField,
    ridge: SharedField,
    hills: SharedField,
}

impl TerrainFields {
    pub fn new(seed: u64) -> Self {
        let shape = NoiseConfig::default();
        let continental = FractalNoise::new(
            shape
                .with_seed(seed.wrapping_add(CONTINENTAL_OFFSET))
                .with_scale(0.002),
        );
        let detail = FractalNoise::new(
            shape
                .with_seed(seed.wrapping_add(DETAIL_OFFSET))
                .with_scale(0.02),
        );
        let ridge = CellularNoise::new(seed.wrapping_add(RIDGE_OFFSET), 0.01, 2);
        let hills_base: SharedField = Arc::new(FractalNoise::new(
            shape
                .with_seed(seed.wrapping_add(HILLS_OFFSET))
                .with_scale(0.008),
        ));
        let hills = DomainWarp::with_fractal_warp(
            hills_base,
            shape
                .with_seed(seed.wrapping_add(HILLS_WARP_OFFSET))
                .with_scale(0.004),
            24.0,
        );
        Self {
            seed,
            continental: Arc::new(continental),
            detail: Arc::new(detail),
            ridge: Arc::new(ridge),
            hills: Arc::new(hills),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Broad land/sea undulation in `[-1, 1]`.
    pub fn continental(&self, x: f64, z: f64) -> f64 {
        self.continental.sample2(x, z)
    }

    /// Small-scale roughness in `[-1, 1]`.
    pub fn detail(&self, x: f64, z: f64) -> f64 {
        self.detail.sample2(x, z)
    }

    /// Cellular ridges in `[0, 1]`, peaking at cell feature points.
    pub fn ridge(&self, x: f64, z: f64) -> f64 {
        self.ridge.sample2(x, z)
    }

    /// Domain-warped rolling hills in `[-1, 1]`.
    pub fn hills(&self, x: f64, z: f64) -> f64 {
        self.hills.sample2(x, z)
    }
}

impl fmt::Debug for TerrainFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TerrainFields")
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}
