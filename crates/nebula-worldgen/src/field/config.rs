//! Fractal noise configuration.

/// Errors raised when constructing a [`NoiseConfig`].
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum NoiseConfigError {
    /// A parameter that must be strictly positive and finite was not.
    #[error("{name} must be finite and > 0, got {value}")]
    NonPositive {
        /// Parameter name.
        name: &'static str,
        /// Rejected value.
        value: f64,
    },
}

/// Immutable parameters for a fractal noise field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoiseConfig {
    seed: u64,
    octaves: u32,
    persistence: f64,
    lacunarity: f64,
    scale: f64,
}

impl NoiseConfig {
    /// Upper bound for the octave count. Requests beyond it are clamped.
    pub const MAX_OCTAVES: u32 = 16;

    /// Creates a configuration, clamping `octaves` into `[1, 16]`.
    ///
    /// # Errors
    ///
    /// Returns [`NoiseConfigError::NonPositive`] if `persistence`,
    /// `lacunarity` or `scale` is not a finite positive number.
    pub fn new(
        seed: u64,
        octaves: u32,
        persistence: f64,
        lacunarity: f64,
        scale: f64,
    ) -> Result<Self, NoiseConfigError> {
        for (name, value) in [
            ("persistence", persistence),
            ("lacunarity", lacunarity),
            ("scale", scale),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(NoiseConfigError::NonPositive { name, value });
            }
        }
        Ok(Self {
            seed,
            octaves: octaves.clamp(1, Self::MAX_OCTAVES),
            persistence,
            lacunarity,
            scale,
        })
    }

    /// Returns a copy seeded with `seed`, everything else unchanged.
    pub fn with_seed(self, seed: u64) -> Self {
        Self { seed, ..self }
    }

    /// Returns a copy with `octaves` clamped into `[1, 16]`.
    pub fn with_octaves(self, octaves: u32) -> Self {
        Self {
            octaves: octaves.clamp(1, Self::MAX_OCTAVES),
            ..self
        }
    }

    /// Returns a copy with a different base frequency.
    ///
    /// Non-positive or non-finite values leave the scale unchanged.
    pub fn with_scale(self, scale: f64) -> Self {
        if scale.is_finite() && scale > 0.0 {
            Self { scale, ..self }
        } else {
            self
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn octaves(&self) -> u32 {
        self.octaves
    }

    pub fn persistence(&self) -> f64 {
        self.persistence
    }

    pub fn lacunarity(&self) -> f64 {
        self.lacunarity
    }

    /// Frequency of the first octave.
    pub fn scale(&self) -> f64 {
        self.scale
    }
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            scale: 0.01,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_octaves_clamped() {
        let low = NoiseConfig::new(1, 0, 0.5, 2.0, 0.1).unwrap();
        let high = NoiseConfig::new(1, 99, 0.5, 2.0, 0.1).unwrap();
        assert_eq!(low.octaves(), 1);
        assert_eq!(high.octaves(), NoiseConfig::MAX_OCTAVES);
    }

    #[test]
    fn test_non_positive_parameters_rejected() {
        assert_eq!(
            NoiseConfig::new(1, 4, 0.0, 2.0, 0.1),
            Err(NoiseConfigError::NonPositive {
                name: "persistence",
                value: 0.0
            })
        );
        assert!(NoiseConfig::new(1, 4, 0.5, -2.0, 0.1).is_err());
        assert!(NoiseConfig::new(1, 4, 0.5, 2.0, f64::NAN).is_err());
    }

    #[test]
    fn test_with_seed_preserves_shape() {
        let cfg = NoiseConfig::new(1, 6, 0.4, 2.5, 0.02).unwrap();
        let reseeded = cfg.with_seed(77);
        assert_eq!(reseeded.seed(), 77);
        assert_eq!(reseeded.octaves(), 6);
        assert_eq!(reseeded.persistence(), 0.4);
    }

    #[test]
    fn test_with_octaves_clamps() {
        assert_eq!(NoiseConfig::default().with_octaves(3).octaves(), 3);
        assert_eq!(NoiseConfig::default().with_octaves(40).octaves(), 16);
    }

    #[test]
    fn test_with_scale_ignores_invalid() {
        let cfg = NoiseConfig::default();
        assert_eq!(cfg.with_scale(0.05).scale(), 0.05);
        assert_eq!(cfg.with_scale(-1.0).scale(), cfg.scale());
    }
}
