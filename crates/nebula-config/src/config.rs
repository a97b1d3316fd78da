//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// World generation settings.
    pub worldgen: WorldgenConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// World generation configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldgenConfig {
    /// Seed and vertical bounds.
    pub world: WorldConfig,
    /// Pipeline stage toggles.
    pub features: FeatureToggles,
    /// Radius in blocks of the biome blend circle (0 disables blending).
    pub biome_blend_radius: i32,
    /// Climate noise shape.
    pub climate: ClimateConfig,
    /// Memoisation caches.
    pub cache: CacheConfig,
    /// Background chunk generation.
    pub workers: WorkerConfig,
}

/// World seed and vertical bounds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    /// World seed.
    pub seed: u64,
    /// Water fills columns whose surface is below this height.
    pub sea_level: i32,
    /// Lowest block height (bedrock layer).
    pub min_y: i32,
    /// Highest block height.
    pub max_y: i32,
    /// Chunk edge length in blocks.
    pub chunk_size: i32,
}

/// Toggles for the optional pipeline stages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FeatureToggles {
    pub generate_caves: bool,
    pub generate_structures: bool,
    pub generate_decorations: bool,
    pub generate_bedrock: bool,
}

/// Shape of the per-axis climate noise.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClimateConfig {
    /// Use fractal noise fields. When `false` every axis uses its fixed
    /// trigonometric stand-in.
    pub noise_fields: bool,
    /// Octave count (clamped to 1..=16).
    pub octaves: u32,
    /// Amplitude multiplier between octaves.
    pub persistence: f64,
    /// Frequency multiplier between octaves.
    pub lacunarity: f64,
    /// Frequency of the first octave.
    pub scale: f64,
}

/// Eviction policy for bounded caches.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum CachePolicyConfig {
    /// Least-recently-used eviction.
    #[default]
    Lru,
    /// Insertion order, oldest tenth dropped in one sweep.
    FifoBulk,
}

/// Capacities and policy of the memoisation caches.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum memoised biome selections.
    pub biome_capacity: usize,
    /// Maximum memoised chunks.
    pub chunk_capacity: usize,
    /// Number of independently locked shards per cache.
    pub shards: usize,
    pub policy: CachePolicyConfig,
}

/// Background chunk generation settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorkerConfig {
    /// Worker threads (0 = derive from CPU count).
    pub threads: usize,
    /// Maximum queued or running chunk tasks.
    pub max_in_flight: usize,
    /// Capacity of the completed-chunk channel.
    pub result_capacity: usize,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for WorldgenConfig {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            features: FeatureToggles::default(),
            biome_blend_radius: 8,
            climate: ClimateConfig::default(),
            cache: CacheConfig::default(),
            workers: WorkerConfig::default(),
        }
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            sea_level: 63,
            min_y: 0,
            max_y: 255,
            chunk_size: 16,
        }
    }
}

impl Default for FeatureToggles {
    fn default() -> Self {
        Self {
            generate_caves: true,
            generate_structures: true,
            generate_decorations: true,
            generate_bedrock: true,
        }
    }
}

impl Default for ClimateConfig {
    fn default() -> Self {
        Self {
            noise_fields: true,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            scale: 0.002,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            biome_capacity: 65_536,
            chunk_capacity: 256,
            shards: 16,
            policy: CachePolicyConfig::Lru,
        }
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            threads: 0,
            max_in_flight: 64,
            result_capacity: 128,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

// --- Load / Save / Reload ---

/// Directory name under the platform config directory.
pub const CONFIG_DIR_NAME: &str = "nebula-worldgen";

impl Config {
    /// Config directory to use: `explicit` if given, otherwise
    /// `<platform config dir>/nebula-worldgen`.
    pub fn resolve_dir(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
        match explicit {
            Some(dir) => Ok(dir.to_path_buf()),
            None => dirs::config_dir()
                .map(|dir| dir.join(CONFIG_DIR_NAME))
                .ok_or(ConfigError::NoConfigDir),
        }
    }

    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(4)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}
