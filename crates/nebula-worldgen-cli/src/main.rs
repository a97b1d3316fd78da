//! Command-line front end: generates the chunks around the origin and logs a
//! summary of what was produced.
//!
//! Run with: `cargo run -p nebula-worldgen-cli -- --seed 42 --radius 3`

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use nebula_config::{CliArgs, Config};
use nebula_worldgen::{
    AsyncChunkGenerator, ChunkTask, GeneratedChunk, GeneratorSettings, MarkerBuilder,
    WorldGenerator,
};
use tracing::{debug, error, info, warn};

fn main() {
    let args = CliArgs::parse();

    let config_dir = match Config::resolve_dir(args.config.as_deref()) {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    // Load or create config, then apply CLI overrides
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    if let Err(e) =
        nebula_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config))
    {
        eprintln!("Failed to initialize logging: {e}");
    }

    let settings = match GeneratorSettings::try_from(&config.worldgen) {
        Ok(settings) => settings,
        Err(e) => {
            error!("Invalid worldgen config: {e}");
            std::process::exit(1);
        }
    };
    let generator = match WorldGenerator::new(settings) {
        Ok(generator) => Arc::new(generator),
        Err(e) => {
            error!("Failed to create world generator: {e}");
            std::process::exit(1);
        }
    };

    info!(
        "Nebula worldgen: seed={} sea_level={} blend_radius={}",
        config.worldgen.world.seed,
        config.worldgen.world.sea_level,
        config.worldgen.biome_blend_radius
    );
    let climate = generator.climate_at(0, 0);
    info!(
        "Origin: biome={} surface={} climate=(T {:.3}, P {:.3}, C {:.3}, E {:.3}, W {:.3})",
        generator.biome_at(0, 0).name,
        generator.surface_height(0, 0),
        climate.temperature,
        climate.precipitation,
        climate.continentalness,
        climate.erosion,
        climate.weirdness,
    );

    let pool = match AsyncChunkGenerator::from_settings(Arc::clone(&generator)) {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to start chunk workers: {e}");
            std::process::exit(1);
        }
    };

    let chunks = generate_around_origin(&pool, args.radius.max(0));
    report(&generator, &chunks);
}

/// Submits every chunk within `radius` of the origin, nearest first, and
/// collects the results.
fn generate_around_origin(pool: &AsyncChunkGenerator, radius: i32) -> Vec<GeneratedChunk> {
    let mut pending: Vec<ChunkTask> = (-radius..=radius)
        .flat_map(|cx| (-radius..=radius).map(move |cz| ChunkTask::new(cx, cz)))
        .collect();
    pending.sort_by_key(|t| t.chunk_x * t.chunk_x + t.chunk_z * t.chunk_z);
    let expected = pending.len();
    let mut pending = VecDeque::from(pending);

    let mut results = Vec::with_capacity(expected);
    while results.len() < expected {
        while let Some(task) = pending.pop_front() {
            if let Err(task) = pool.submit(task) {
                // Queue full: retry once workers have caught up
                pending.push_front(task);
                break;
            }
        }
        let drained = pool.drain_results();
        if drained.is_empty() {
            std::thread::sleep(Duration::from_millis(2));
        }
        results.extend(drained);
    }
    results
}

fn report(generator: &WorldGenerator, chunks: &[GeneratedChunk]) {
    let mut total_blocks = 0;
    let mut total_us = 0;
    for chunk in chunks {
        debug!(
            "Chunk ({}, {}): {} blocks in {} us",
            chunk.task.chunk_x,
            chunk.task.chunk_z,
            chunk.blocks.len(),
            chunk.generation_time_us
        );
        total_blocks += chunk.blocks.len();
        total_us += chunk.generation_time_us;
    }

    let markers: usize = chunks
        .iter()
        .map(|c| c.blocks.count_named(MarkerBuilder::MARKER_BLOCK))
        .sum();
    info!(
        "Generated {} chunks, {total_blocks} blocks, {} structures ({markers} markers) in {:.1} ms of worker time",
        chunks.len(),
        generator.structure_registry().len(),
        total_us as f64 / 1000.0
    );
    if chunks.is_empty() {
        warn!("No chunks generated");
    }
}
