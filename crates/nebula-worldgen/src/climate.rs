//! Climate sampling: five independent scalar axes per `(x, z)` column.
//!
//! Each axis is produced by its own [`ScalarField`]. When no field is
//! configured for an axis a fixed trigonometric stand-in is used instead, so
//! tooling and tests can run without a full noise stack.

use std::fmt;
use std::sync::Arc;

use crate::field::{FractalNoise, NoiseConfig, ScalarField, SharedField};
use crate::seed::{det_cos, det_sin};

/// One climate axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClimateAxis {
    Temperature,
    Precipitation,
    Continentalness,
    Erosion,
    Weirdness,
}

impl ClimateAxis {
    pub const ALL: [ClimateAxis; 5] = [
        ClimateAxis::Temperature,
        ClimateAxis::Precipitation,
        ClimateAxis::Continentalness,
        ClimateAxis::Erosion,
        ClimateAxis::Weirdness,
    ];

    /// Offset added to the world seed for this axis' field.
    pub fn seed_offset(self) -> u64 {
        match self {
            ClimateAxis::Temperature => 0,
            ClimateAxis::Precipitation => 1_000,
            ClimateAxis::Continentalness => 2_000,
            ClimateAxis::Erosion => 3_000,
            ClimateAxis::Weirdness => 4_000,
        }
    }

    /// Whether the axis spans `[-1, 1]` (signed) or `[0, 1]`.
    pub fn is_signed(self) -> bool {
        matches!(self, ClimateAxis::Temperature | ClimateAxis::Weirdness)
    }

    fn index(self) -> usize {
        self as usize
    }

    /// Deterministic stand-in used when no field is configured.
    pub fn fallback(self, x: f64, z: f64) -> f64 {
        match self {
            ClimateAxis::Temperature => det_sin(x * 0.05) * det_cos(z * 0.05),
            ClimateAxis::Precipitation => (det_sin(z * 0.05) + 1.0) * 0.5,
            ClimateAxis::Continentalness => (det_cos(x * 0.02) + 1.0) * 0.5,
            ClimateAxis::Erosion => (det_sin(x * 0.04) + 1.0) * 0.5,
            ClimateAxis::Weirdness => det_sin((x + z) * 0.03),
        }
    }
}

impl fmt::Display for ClimateAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ClimateAxis::Temperature => "temperature",
            ClimateAxis::Precipitation => "precipitation",
            ClimateAxis::Continentalness => "continentalness",
            ClimateAxis::Erosion => "erosion",
            ClimateAxis::Weirdness => "weirdness",
        };
        f.write_str(name)
    }
}

/// Climate at one column.
///
/// `temperature` and `weirdness` lie in `[-1, 1]`; the other three in `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ClimateSample {
    pub temperature: f64,
    pub precipitation: f64,
    pub continentalness: f64,
    pub erosion: f64,
    pub weirdness: f64,
}

impl ClimateSample {
    pub fn axis(&self, axis: ClimateAxis) -> f64 {
        match axis {
            ClimateAxis::Temperature => self.temperature,
            ClimateAxis::Precipitation => self.precipitation,
            ClimateAxis::Continentalness => self.continentalness,
            ClimateAxis::Erosion => self.erosion,
            ClimateAxis::Weirdness => self.weirdness,
        }
    }

    fn set_axis(&mut self, axis: ClimateAxis, value: f64) {
        match axis {
            ClimateAxis::Temperature => self.temperature = value,
            ClimateAxis::Precipitation => self.precipitation = value,
            ClimateAxis::Continentalness => self.continentalness = value,
            ClimateAxis::Erosion => self.erosion = value,
            ClimateAxis::Weirdness => self.weirdness = value,
        }
    }
}

/// Samples [`ClimateSample`]s for one world seed.
#[derive(Clone, Default)]
pub struct ClimateSampler {
    seed: u64,
    fields: [Option<SharedField>; 5],
}

impl ClimateSampler {
    /// A sampler with no fields: every axis uses its fallback.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            fields: Default::default(),
        }
    }

    /// A sampler with an fBm field on every axis, each seeded
    /// `seed + axis offset` with the shape of `shape`.
    pub fn with_fractal_fields(seed: u64, shape: NoiseConfig) -> Self {
        let mut sampler = Self::new(seed);
        for axis in ClimateAxis::ALL {
            let cfg = shape.with_seed(seed.wrapping_add(axis.seed_offset()));
            sampler = sampler.with_field(axis, Arc::new(FractalNoise::new(cfg)));
        }
        sampler
    }

    /// Installs `field` for `axis`. Field output is expected in `[-1, 1]`.
    pub fn with_field(mut self, axis: ClimateAxis, field: SharedField) -> Self {
        self.fields[axis.index()] = Some(field);
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn has_field(&self, axis: ClimateAxis) -> bool {
        self.fields[axis.index()].is_some()
    }

    /// Samples one axis, mapped into that axis' range.
    pub fn sample_axis(&self, axis: ClimateAxis, x: f64, z: f64) -> f64 {
        match &self.fields[axis.index()] {
            None => axis.fallback(x, z),
            Some(field) => {
                let v = field.sample2(x, z).clamp(-1.0, 1.0);
                if axis.is_signed() { v } else { (v + 1.0) * 0.5 }
            }
        }
    }

    /// Samples all five axes at `(x, z)`.
    pub fn sample(&self, x: f64, z: f64) -> ClimateSample {
        let mut sample = ClimateSample::default();
        for axis in ClimateAxis::ALL {
            sample.set_axis(axis, self.sample_axis(axis, x, z));
        }
        sample
    }
}

impl fmt::Debug for ClimateSampler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let configured: Vec<ClimateAxis> = ClimateAxis::ALL
            .into_iter()
            .filter(|axis| self.has_field(*axis))
            .collect();
        f.debug_struct("ClimateSampler")
            .field("seed", &self.seed)
            .field("configured", &configured)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_at_origin() {
        let sample = ClimateSampler::new(0).sample(0.0, 0.0);
        assert_eq!(
            sample,
            ClimateSample {
                temperature: 0.0,
                precipitation: 0.5,
                continentalness: 1.0,
                erosion: 0.5,
                weirdness: 0.0,
            }
        );
    }

    #[test]
    fn test_fallback_ignores_seed() {
        let a = ClimateSampler::new(1).sample(37.0, -12.0);
        let b = ClimateSampler::new(999).sample(37.0, -12.0);
        assert_eq!(a, b, "Fallback formulas depend on coordinates only");
    }

    #[test]
    fn test_fallback_formula_off_origin() {
        let s = ClimateSampler::new(0).sample(10.0, 20.0);
        assert!((s.temperature - libm::sin(0.5) * libm::cos(1.0)).abs() < 1e-15);
        assert!((s.weirdness - libm::sin(0.9)).abs() < 1e-15);
    }

    #[test]
    fn test_fractal_fields_stay_in_axis_ranges() {
        let sampler = ClimateSampler::with_fractal_fields(42, NoiseConfig::default());
        for i in 0..500 {
            let t = f64::from(i) * 17.3;
            let s = sampler.sample(t, -t * 0.6);
            for axis in ClimateAxis::ALL {
                let v = s.axis(axis);
                let range = if axis.is_signed() { -1.0..=1.0 } else { 0.0..=1.0 };
                assert!(range.contains(&v), "{axis} = {v} out of range");
            }
        }
    }

    #[test]
    fn test_axes_are_decorrelated() {
        let sampler = ClimateSampler::with_fractal_fields(7, NoiseConfig::default());
        let s = sampler.sample(123.0, 456.0);
        assert_ne!(s.temperature, s.weirdness, "Axes must use independent seeds");
    }

    #[test]
    fn test_partial_fields_fall_back_per_axis() {
        let field: SharedField = Arc::new(FractalNoise::new(NoiseConfig::default()));
        let sampler = ClimateSampler::new(0).with_field(ClimateAxis::Erosion, field);
        assert!(sampler.has_field(ClimateAxis::Erosion));
        assert!(!sampler.has_field(ClimateAxis::Temperature));
        assert_eq!(sampler.sample(0.0, 0.0).continentalness, 1.0);
    }
}
