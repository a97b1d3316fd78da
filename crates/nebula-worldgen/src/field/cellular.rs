//! Cellular (Worley) noise.

use super::{ScalarField, lattice_cell};
use crate::seed::{det_sqrt, position_hash, position_random};

/// Worley noise: `1 − min(1, d)` where `d` is the distance to the nearest
/// feature point among the query cell and its neighbours.
///
/// Each unit cell owns between 1 and `max_points` feature points, derived
/// from a hash of its integer coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellularNoise {
    seed: u64,
    scale: f64,
    max_points: u32,
}

impl CellularNoise {
    /// Creates a cellular field. `scale` converts world units to cell units;
    /// `max_points` is clamped to at least 1.
    pub fn new(seed: u64, scale: f64, max_points: u32) -> Self {
        Self {
            seed,
            scale,
            max_points: max_points.max(1),
        }
    }

    fn point_count(&self, cx: i32, cy: i32, cz: i32) -> u32 {
        1 + position_hash(cx, cy, cz, self.seed) % self.max_points
    }

    /// Feature point `k` of a cell, as an offset inside the unit cell.
    fn feature_point(&self, cx: i32, cy: i32, cz: i32, k: u32) -> [f64; 3] {
        let salt = self.seed ^ (u64::from(k) + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        [
            position_random(cx, cy, cz, salt),
            position_random(cx, cy, cz, salt.rotate_left(17)),
            position_random(cx, cy, cz, salt.rotate_left(34)),
        ]
    }
}

impl ScalarField for CellularNoise {
    fn sample2(&self, x: f64, z: f64) -> f64 {
        let (px, pz) = (x * self.scale, z * self.scale);
        let (cx, _) = lattice_cell(px);
        let (cz, _) = lattice_cell(pz);

        let mut nearest_sq = f64::INFINITY;
        for dx in -1..=1 {
            for dz in -1..=1 {
                let (nx, nz) = (cx.wrapping_add(dx), cz.wrapping_add(dz));
                for k in 0..self.point_count(nx, 0, nz) {
                    let [ox, _, oz] = self.feature_point(nx, 0, nz, k);
                    let fx = f64::from(nx) + ox - px;
                    let fz = f64::from(nz) + oz - pz;
                    nearest_sq = nearest_sq.min(fx * fx + fz * fz);
                }
            }
        }
        1.0 - det_sqrt(nearest_sq).min(1.0)
    }

    fn sample3(&self, x: f64, y: f64, z: f64) -> f64 {
        let (px, py, pz) = (x * self.scale, y * self.scale, z * self.scale);
        let (cx, _) = lattice_cell(px);
        let (cy, _) = lattice_cell(py);
        let (cz, _) = lattice_cell(pz);

        let mut nearest_sq = f64::INFINITY;
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let (nx, ny, nz) =
                        (cx.wrapping_add(dx), cy.wrapping_add(dy), cz.wrapping_add(dz));
                    for k in 0..self.point_count(nx, ny, nz) {
                        let [ox, oy, oz] = self.feature_point(nx, ny, nz, k);
                        let fx = f64::from(nx) + ox - px;
                        let fy = f64::from(ny) + oy - py;
                        let fz = f64::from(nz) + oz - pz;
                        nearest_sq = nearest_sq.min(fx * fx + fy * fy + fz * fz);
                    }
                }
            }
        }
        1.0 - det_sqrt(nearest_sq).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_in_unit_interval() {
        let noise = CellularNoise::new(3, 0.1, 3);
        for i in 0..1_000 {
            let t = f64::from(i) * 0.91;
            let v2 = noise.sample2(t, t * 1.3);
            let v3 = noise.sample3(t, -t, t * 0.2);
            assert!((0.0..=1.0).contains(&v2), "2D value {v2} out of [0, 1]");
            assert!((0.0..=1.0).contains(&v3), "3D value {v3} out of [0, 1]");
        }
    }

    #[test]
    fn test_peak_at_feature_point() {
        let noise = CellularNoise::new(17, 1.0, 1);
        let [ox, _, oz] = noise.feature_point(4, 0, -2, 0);
        let v = noise.sample2(4.0 + ox, -2.0 + oz);
        assert!((v - 1.0).abs() < 1e-9, "Sampling a feature point must give 1, got {v}");
    }

    #[test]
    fn test_point_count_bounds() {
        let noise = CellularNoise::new(8, 1.0, 4);
        for c in -30..30 {
            let n = noise.point_count(c, c / 2, -c);
            assert!((1..=4).contains(&n));
        }
    }

    #[test]
    fn test_deterministic() {
        let a = CellularNoise::new(99, 0.05, 2);
        let b = CellularNoise::new(99, 0.05, 2);
        for i in 0..200 {
            let t = f64::from(i) * 2.1;
            assert_eq!(a.sample3(t, t, -t), b.sample3(t, t, -t));
        }
    }
}
