//! Procedural voxel world generation: climate sampling, biome selection and
//! blending, column assembly, caves, decorations and structures.

mod async_generation;
mod block;
mod cache;
mod cave;
mod climate;
mod column;
mod feature;
mod generator;
mod settings;
mod structure;

pub mod biome;
pub mod field;
pub mod seed;

pub use async_generation::{AsyncChunkGenerator, ChunkTask, GeneratedChunk};
pub use biome::{
    BiomeCatalog, BiomeCatalogError, BiomeDescriptor, BiomeId, BiomeKind, BiomeRegistry,
    BiomeSelector, BlendNeighbor, BlendResult, ClimateRange, ClimateRanges, ColumnBlend,
    StructureCandidate, TerrainFields, default_biomes,
};
pub use block::{BlockMetadata, BlockRef, ChunkBlockMap};
pub use cache::{BoundedCache, CachePolicy, CacheSettings, FifoCache, LruCache, ShardedCache};
pub use cave::{CAVE_FLOOR_MARGIN, CAVE_SAMPLE_SCALE, CaveCarver};
pub use climate::{ClimateAxis, ClimateSample, ClimateSampler};
pub use column::ColumnAssembler;
pub use feature::{DecorationPlacer, Feature, FeatureKind};
pub use field::{NoiseConfig, NoiseConfigError, ScalarField, SharedField};
pub use generator::{GeneratorError, WorldGenerator};
pub use settings::{GeneratorSettings, WorkerSettings};
pub use structure::{
    MarkerBuilder, PlacedStructure, PlacementConflict, Rotation, StructureBuilder,
    StructureMetadata, StructureOptions, StructurePlacementRecord, StructurePlacementRegistry,
    StructurePlanner, is_significant, min_spacing,
};
