//! Configuration for the Nebula world generator.
//!
//! Provides runtime-configurable settings that persist to disk as RON files.
//! Supports CLI overrides via clap, hot-reload detection, and forward/backward
//! compatible serialization.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    CONFIG_DIR_NAME, CacheConfig, CachePolicyConfig, ClimateConfig, Config, DebugConfig,
    FeatureToggles, WorkerConfig, WorldConfig, WorldgenConfig,
};
pub use error::ConfigError;
