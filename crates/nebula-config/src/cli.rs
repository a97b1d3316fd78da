//! Command-line argument parsing for the world generator.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// World generator command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "nebula-worldgen", about = "Nebula world generator")]
pub struct CliArgs {
    /// World seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Sea level height.
    #[arg(long)]
    pub sea_level: Option<i32>,

    /// Biome blend radius in blocks (0 disables blending).
    #[arg(long)]
    pub blend_radius: Option<i32>,

    /// Carve caves.
    #[arg(long)]
    pub caves: Option<bool>,

    /// Place structures.
    #[arg(long)]
    pub structures: Option<bool>,

    /// Place surface decorations.
    #[arg(long)]
    pub decorations: Option<bool>,

    /// Force a bedrock floor.
    #[arg(long)]
    pub bedrock: Option<bool>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Chunk radius around the origin to generate.
    #[arg(long, default_value_t = 2)]
    pub radius: i32,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        let worldgen = &mut self.worldgen;
        if let Some(seed) = args.seed {
            worldgen.world.seed = seed;
        }
        if let Some(level) = args.sea_level {
            worldgen.world.sea_level = level;
        }
        if let Some(radius) = args.blend_radius {
            worldgen.biome_blend_radius = radius;
        }
        if let Some(caves) = args.caves {
            worldgen.features.generate_caves = caves;
        }
        if let Some(structures) = args.structures {
            worldgen.features.generate_structures = structures;
        }
        if let Some(decorations) = args.decorations {
            worldgen.features.generate_decorations = decorations;
        }
        if let Some(bedrock) = args.bedrock {
            worldgen.features.generate_bedrock = bedrock;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            seed: Some(99),
            caves: Some(false),
            log_level: Some("trace".to_string()),
            ..Default::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.worldgen.world.seed, 99);
        assert!(!config.worldgen.features.generate_caves);
        assert_eq!(config.debug.log_level, "trace");
        // Non-overridden fields retain defaults
        assert_eq!(config.worldgen.world.sea_level, 63);
        assert!(config.worldgen.features.generate_structures);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }

    #[test]
    fn test_cli_parses_flags() {
        let args = CliArgs::parse_from([
            "nebula-worldgen",
            "--seed",
            "42",
            "--blend-radius",
            "0",
            "--bedrock",
            "false",
        ]);
        assert_eq!(args.seed, Some(42));
        assert_eq!(args.blend_radius, Some(0));
        assert_eq!(args.bedrock, Some(false));
        assert_eq!(args.radius, 2);
    }
}
