//! Domain warping.

use std::sync::Arc;

use super::{FractalNoise, NoiseConfig, ScalarField, SharedField};

/// Seed offsets decorrelating the three warp axes.
const WARP_SEED_OFFSETS: [u64; 3] = [0x5A17_0001, 0x5A17_0002, 0x5A17_0003];

/// Displaces query coordinates by independent offset fields before sampling
/// a base field.
///
/// 2D queries use the x and z warps; 3D queries additionally use the y warp.
#[derive(Clone)]
pub struct DomainWarp {
    base: SharedField,
    warp_x: SharedField,
    warp_y: SharedField,
    warp_z: SharedField,
    strength: f64,
}

impl DomainWarp {
    pub fn new(
        base: SharedField,
        warp_x: SharedField,
        warp_y: SharedField,
        warp_z: SharedField,
        strength: f64,
    ) -> Self {
        Self {
            base,
            warp_x,
            warp_y,
            warp_z,
            strength,
        }
    }

    /// Warps `base` with three fBm fields derived from `config`, each seeded
    /// `config.seed() + offset`.
    pub fn with_fractal_warp(base: SharedField, config: NoiseConfig, strength: f64) -> Self {
        let [ox, oy, oz] = WARP_SEED_OFFSETS.map(|offset| {
            Arc::new(FractalNoise::new(
                config.with_seed(config.seed().wrapping_add(offset)),
            )) as SharedField
        });
        Self::new(base, ox, oy, oz, strength)
    }

    pub fn strength(&self) -> f64 {
        self.strength
    }
}

impl ScalarField for DomainWarp {
    fn sample2(&self, x: f64, z: f64) -> f64 {
        let wx = x + self.strength * self.warp_x.sample2(x, z);
        let wz = z + self.strength * self.warp_z.sample2(x, z);
        self.base.sample2(wx, wz)
    }

    fn sample3(&self, x: f64, y: f64, z: f64) -> f64 {
        let wx = x + self.strength * self.warp_x.sample3(x, y, z);
        let wy = y + self.strength * self.warp_y.sample3(x, y, z);
        let wz = z + self.strength * self.warp_z.sample3(x, y, z);
        self.base.sample3(wx, wy, wz)
    }
}
