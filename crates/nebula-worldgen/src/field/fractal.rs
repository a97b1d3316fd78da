//! Fractal Brownian motion over value noise.

use super::{NoiseConfig, ScalarField, ValueNoise};

/// Sum of `octaves` value-noise layers, normalized by the total amplitude so
/// the output stays in `[-1, 1]`.
///
/// Octave `i` samples at frequency `scale * lacunarity^i` with amplitude
/// `persistence^i`; each octave uses its own lattice seed.
#[derive(Clone, Debug)]
pub struct FractalNoise {
    config: NoiseConfig,
    layers: Vec<(ValueNoise, f64, f64)>,
    amplitude_sum: f64,
}

impl FractalNoise {
    pub fn new(config: NoiseConfig) -> Self {
        let mut layers = Vec::with_capacity(config.octaves() as usize);
        let mut frequency = config.scale();
        let mut amplitude = 1.0;
        let mut amplitude_sum = 0.0;
        for i in 0..config.octaves() {
            let layer = ValueNoise::new(config.seed().wrapping_add(u64::from(i)));
            layers.push((layer, frequency, amplitude));
            amplitude_sum += amplitude;
            frequency *= config.lacunarity();
            amplitude *= config.persistence();
        }
        Self {
            config,
            layers,
            amplitude_sum,
        }
    }

    pub fn config(&self) -> &NoiseConfig {
        &self.config
    }

    /// Sum of all octave amplitudes (the normalization divisor).
    pub fn amplitude_sum(&self) -> f64 {
        self.amplitude_sum
    }

    #[inline]
    fn normalize(&self, total: f64) -> f64 {
        (total / self.amplitude_sum).clamp(-1.0, 1.0)
    }
}

impl ScalarField for FractalNoise {
    fn sample2(&self, x: f64, z: f64) -> f64 {
        let total: f64 = self
            .layers
            .iter()
            .map(|(layer, freq, amp)| layer.sample2(x * freq, z * freq) * amp)
            .sum();
        self.normalize(total)
    }

    fn sample3(&self, x: f64, y: f64, z: f64) -> f64 {
        let total: f64 = self
            .layers
            .iter()
            .map(|(layer, freq, amp)| layer.sample3(x * freq, y * freq, z * freq) * amp)
            .sum();
        self.normalize(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fbm_bounded_for_all_octave_counts() {
        for octaves in 1..=16 {
            for persistence in [0.05, 0.25, 0.5, 0.75, 1.0] {
                let cfg = NoiseConfig::new(octaves as u64, octaves, persistence, 2.0, 0.07).unwrap();
                let fbm = FractalNoise::new(cfg);
                for i in 0..300 {
                    let t = f64::from(i) * 1.37;
                    let v = fbm.sample2(t, -t * 0.5);
                    let w = fbm.sample3(t, t * 0.25, -t);
                    assert!(
                        (-1.0..=1.0).contains(&v) && (-1.0..=1.0).contains(&w),
                        "octaves={octaves} persistence={persistence}: {v}, {w} out of [-1, 1]"
                    );
                }
            }
        }
    }

    #[test]
    fn test_amplitude_sum() {
        let cfg = NoiseConfig::new(0, 4, 0.5, 2.0, 0.1).unwrap();
        let fbm = FractalNoise::new(cfg);
        assert!((fbm.amplitude_sum() - 1.875).abs() < 1e-12);
    }

    #[test]
    fn test_single_octave_matches_value_noise() {
        let cfg = NoiseConfig::new(11, 1, 0.5, 2.0, 0.25).unwrap();
        let fbm = FractalNoise::new(cfg);
        let base = ValueNoise::new(11);
        let v = fbm.sample2(13.0, 7.0);
        assert!((v - base.sample2(13.0 * 0.25, 7.0 * 0.25)).abs() < 1e-12);
    }

    #[test]
    fn test_deterministic() {
        let cfg = NoiseConfig::new(42, 6, 0.5, 2.0, 0.01).unwrap();
        let a = FractalNoise::new(cfg);
        let b = FractalNoise::new(cfg);
        for i in 0..100 {
            let t = f64::from(i) * 3.3;
            assert_eq!(a.sample3(t, t, t), b.sample3(t, t, t));
        }
    }

    #[test]
    fn test_more_octaves_adds_detail() {
        let step = 0.5;
        let coarse = FractalNoise::new(NoiseConfig::new(7, 1, 0.9, 2.0, 0.05).unwrap());
        let fine = FractalNoise::new(NoiseConfig::new(7, 8, 0.9, 2.0, 0.05).unwrap());
        let mut diff_coarse = 0.0;
        let mut diff_fine = 0.0;
        for i in 0..1_000 {
            let x = f64::from(i) * step;
            diff_coarse += (coarse.sample2(x + step, 0.3) - coarse.sample2(x, 0.3)).abs();
            diff_fine += (fine.sample2(x + step, 0.3) - fine.sample2(x, 0.3)).abs();
        }
        assert!(
            diff_fine > diff_coarse,
            "8 octaves should vary faster than 1: coarse={diff_coarse}, fine={diff_fine}"
        );
    }
}
