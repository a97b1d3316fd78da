//! Lattice value noise.

use super::{ScalarField, lattice_cell, lerp, smoothstep};
use crate::seed::position_hash;

/// Value noise: a pseudo-random value in `[-1, 1]` at every integer lattice
/// point, smoothstep-interpolated in between.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ValueNoise {
    seed: u64,
}

impl ValueNoise {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[inline]
    fn lattice(&self, x: i32, y: i32, z: i32) -> f64 {
        f64::from(position_hash(x, y, z, self.seed)) / f64::from(u32::MAX) * 2.0 - 1.0
    }
}

impl ScalarField for ValueNoise {
    fn sample2(&self, x: f64, y: f64) -> f64 {
        let (x0, tx) = lattice_cell(x);
        let (y0, ty) = lattice_cell(y);
        let (x1, y1) = (x0.wrapping_add(1), y0.wrapping_add(1));
        let sx = smoothstep(tx);
        let sy = smoothstep(ty);

        let a = lerp(self.lattice(x0, y0, 0), self.lattice(x1, y0, 0), sx);
        let b = lerp(self.lattice(x0, y1, 0), self.lattice(x1, y1, 0), sx);
        lerp(a, b, sy)
    }

    fn sample3(&self, x: f64, y: f64, z: f64) -> f64 {
        let (x0, tx) = lattice_cell(x);
        let (y0, ty) = lattice_cell(y);
        let (z0, tz) = lattice_cell(z);
        let (x1, y1, z1) = (x0.wrapping_add(1), y0.wrapping_add(1), z0.wrapping_add(1));
        let sx = smoothstep(tx);
        let sy = smoothstep(ty);
        let sz = smoothstep(tz);

        let plane = |zi: i32| {
            let a = lerp(self.lattice(x0, y0, zi), self.lattice(x1, y0, zi), sx);
            let b = lerp(self.lattice(x0, y1, zi), self.lattice(x1, y1, zi), sx);
            lerp(a, b, sy)
        };
        lerp(plane(z0), plane(z1), sz)
    }
}
