//! Runtime settings of a [`WorldGenerator`](crate::WorldGenerator), built
//! from defaults or from the persisted `nebula-config` sections.

use nebula_config::{CachePolicyConfig, WorldgenConfig};

use crate::cache::{CachePolicy, CacheSettings};
use crate::field::{NoiseConfig, NoiseConfigError};

/// Background worker pool settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorkerSettings {
    /// Worker threads. `0` derives the count from the CPU count.
    pub threads: usize,
    pub max_in_flight: usize,
    pub result_capacity: usize,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            threads: 0,
            max_in_flight: 64,
            result_capacity: 128,
        }
    }
}

/// Everything a world generator needs besides its catalog and builder.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratorSettings {
    pub seed: u64,
    pub sea_level: i32,
    pub min_y: i32,
    pub max_y: i32,
    pub chunk_size: i32,
    pub generate_caves: bool,
    pub generate_structures: bool,
    pub generate_decorations: bool,
    pub generate_bedrock: bool,
    /// Blend circle radius in blocks. `0` disables blending.
    pub biome_blend_radius: i32,
    /// Shape of the climate noise. `None` keeps the trigonometric fallback
    /// on every axis.
    pub climate_noise: Option<NoiseConfig>,
    pub biome_cache: CacheSettings,
    pub chunk_cache: CacheSettings,
    pub workers: WorkerSettings,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            seed: 0,
            sea_level: 63,
            min_y: 0,
            max_y: 255,
            chunk_size: 16,
            generate_caves: true,
            generate_structures: true,
            generate_decorations: true,
            generate_bedrock: true,
            biome_blend_radius: 8,
            climate_noise: Some(NoiseConfig::default().with_scale(0.002)),
            biome_cache: CacheSettings::new(CachePolicy::Lru, 65_536, 16),
            chunk_cache: CacheSettings::new(CachePolicy::Lru, 256, 16),
            workers: WorkerSettings::default(),
        }
    }
}

impl GeneratorSettings {
    /// Default settings for `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }
}

impl From<CachePolicyConfig> for CachePolicy {
    fn from(policy: CachePolicyConfig) -> Self {
        match policy {
            CachePolicyConfig::Lru => CachePolicy::Lru,
            CachePolicyConfig::FifoBulk => CachePolicy::FifoBulk,
        }
    }
}

impl TryFrom<&WorldgenConfig> for GeneratorSettings {
    type Error = NoiseConfigError;

    fn try_from(config: &WorldgenConfig) -> Result<Self, Self::Error> {
        let climate = &config.climate;
        let climate_noise = if climate.noise_fields {
            Some(NoiseConfig::new(
                config.world.seed,
                climate.octaves,
                climate.persistence,
                climate.lacunarity,
                climate.scale,
            )?)
        } else {
            None
        };

        let cache = &config.cache;
        let policy = CachePolicy::from(cache.policy);
        Ok(Self {
            seed: config.world.seed,
            sea_level: config.world.sea_level,
            min_y: config.world.min_y,
            max_y: config.world.max_y,
            chunk_size: config.world.chunk_size,
            generate_caves: config.features.generate_caves,
            generate_structures: config.features.generate_structures,
            generate_decorations: config.features.generate_decorations,
            generate_bedrock: config.features.generate_bedrock,
            biome_blend_radius: config.biome_blend_radius,
            climate_noise,
            biome_cache: CacheSettings::new(policy, cache.biome_capacity, cache.shards),
            chunk_cache: CacheSettings::new(policy, cache.chunk_capacity, cache.shards),
            workers: WorkerSettings {
                threads: config.workers.threads,
                max_in_flight: config.workers.max_in_flight,
                result_capacity: config.workers.result_capacity,
            },
        })
    }
}
