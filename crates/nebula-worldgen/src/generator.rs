//! The full chunk pipeline: columns, caves, decorations, structures.

use std::sync::Arc;

use glam::IVec3;
use tracing::{debug, trace};

use crate::biome::{
    BiomeCatalog, BiomeCatalogError, BiomeDescriptor, BiomeId, BiomeSelector, ColumnBlend,
    TerrainFields, default_biomes,
};
use crate::block::{BlockRef, ChunkBlockMap};
use crate::cache::ShardedCache;
use crate::cave::CaveCarver;
use crate::climate::{ClimateSample, ClimateSampler};
use crate::column::ColumnAssembler;
use crate::feature::DecorationPlacer;
use crate::field::{NoiseConfigError, SharedField};
use crate::settings::GeneratorSettings;
use crate::structure::{
    MarkerBuilder, StructureBuilder, StructurePlacementRegistry, StructurePlanner,
};

/// Errors raised while setting up or reconfiguring a [`WorldGenerator`].
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("biome catalog error: {0}")]
    Catalog(#[from] BiomeCatalogError),

    #[error("invalid climate noise: {0}")]
    Noise(#[from] NoiseConfigError),

    #[error("max_y ({max_y}) is below min_y ({min_y})")]
    InvalidBounds { min_y: i32, max_y: i32 },

    #[error("chunk size must be positive, got {0}")]
    InvalidChunkSize(i32),
}

/// Generates chunks of one world.
///
/// Every output is a pure function of the settings, the catalog contents and
/// the coordinates, apart from structure spacing, which depends on which
/// chunks were generated first.
pub struct WorldGenerator {
    settings: GeneratorSettings,
    selector: BiomeSelector,
    assembler: ColumnAssembler,
    carver: CaveCarver,
    decorations: DecorationPlacer,
    structures: StructurePlanner,
    chunks: ShardedCache<(i32, i32), Arc<ChunkBlockMap>>,
}

impl WorldGenerator {
    /// A generator over the built-in biomes that marks structures with a
    /// single block.
    ///
    /// # Errors
    ///
    /// See [`with_parts`](Self::with_parts).
    pub fn new(settings: GeneratorSettings) -> Result<Self, GeneratorError> {
        let catalog = default_biomes()?;
        Self::with_parts(settings, Box::new(catalog), Arc::new(MarkerBuilder))
    }

    /// A generator over a caller-supplied catalog and structure builder.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::InvalidBounds`] if `max_y < min_y` and
    /// [`GeneratorError::InvalidChunkSize`] for a non-positive chunk size.
    pub fn with_parts(
        settings: GeneratorSettings,
        catalog: Box<dyn BiomeCatalog>,
        builder: Arc<dyn StructureBuilder>,
    ) -> Result<Self, GeneratorError> {
        if settings.max_y < settings.min_y {
            return Err(GeneratorError::InvalidBounds {
                min_y: settings.min_y,
                max_y: settings.max_y,
            });
        }
        if settings.chunk_size <= 0 {
            return Err(GeneratorError::InvalidChunkSize(settings.chunk_size));
        }

        let seed = settings.seed;
        let climate = match settings.climate_noise {
            Some(shape) => ClimateSampler::with_fractal_fields(seed, shape),
            None => ClimateSampler::new(seed),
        };
        let biome_count = catalog.all_biomes().len();
        let selector = BiomeSelector::new(
            catalog,
            climate,
            TerrainFields::new(seed),
            settings.biome_blend_radius,
            settings.biome_cache,
        );

        debug!(
            "World generator ready: seed {seed}, {biome_count} biomes, chunk size {}",
            settings.chunk_size
        );
        Ok(Self {
            assembler: ColumnAssembler::new(
                settings.min_y,
                settings.max_y,
                settings.sea_level,
                settings.generate_bedrock,
            ),
            carver: CaveCarver::with_seed(seed, settings.min_y),
            decorations: DecorationPlacer::new(seed, settings.sea_level, settings.max_y),
            structures: StructurePlanner::new(
                seed,
                settings.chunk_size,
                settings.max_y,
                builder,
            ),
            chunks: settings.chunk_cache.build(),
            selector,
            settings,
        })
    }

    /// Replaces the cave density field.
    pub fn with_cave_field(mut self, field: SharedField) -> Self {
        self.carver = CaveCarver::new(field, self.settings.min_y);
        self
    }

    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    pub fn selector(&self) -> &BiomeSelector {
        &self.selector
    }

    pub fn structure_registry(&self) -> &StructurePlacementRegistry {
        self.structures.registry()
    }

    /// Climate at a column.
    pub fn climate_at(&self, x: i32, z: i32) -> ClimateSample {
        self.selector.climate().sample(f64::from(x), f64::from(z))
    }

    /// Unblended biome at a column.
    pub fn biome_at(&self, x: i32, z: i32) -> Arc<BiomeDescriptor> {
        self.selector.select_at(x, z)
    }

    /// Blended surface height at a column, rounded to the block grid.
    pub fn surface_height(&self, x: i32, z: i32) -> i32 {
        self.selector.column(x, z).surface_height()
    }

    /// Terrain, water and bedrock of one column, bottom to top.
    pub fn assemble_column(&self, x: i32, z: i32) -> Vec<(i32, BlockRef)> {
        let column = self.selector.column(x, z);
        self.assembler
            .assemble(&column, self.selector.fields(), self.selector.seed())
    }

    /// Chunk `(chunk_x, chunk_z)`, memoised.
    pub fn generate_chunk(&self, chunk_x: i32, chunk_z: i32) -> Arc<ChunkBlockMap> {
        if let Some(chunk) = self.chunks.get(&(chunk_x, chunk_z)) {
            return chunk;
        }
        let chunk = Arc::new(self.build_chunk(chunk_x, chunk_z));
        self.chunks.insert((chunk_x, chunk_z), Arc::clone(&chunk));
        chunk
    }

    /// Runs every enabled stage for one chunk without touching the chunk
    /// cache. Later stages overwrite earlier ones.
    pub fn build_chunk(&self, chunk_x: i32, chunk_z: i32) -> ChunkBlockMap {
        let size = self.settings.chunk_size;
        let (origin_x, origin_z) = (chunk_x.wrapping_mul(size), chunk_z.wrapping_mul(size));
        let fields = self.selector.fields();
        let seed = self.selector.seed();

        let columns: Vec<ColumnBlend> = (0..size)
            .flat_map(|dx| {
                (0..size).map(move |dz| (origin_x.wrapping_add(dx), origin_z.wrapping_add(dz)))
            })
            .map(|(x, z)| self.selector.column(x, z))
            .collect();

        let mut map = ChunkBlockMap::new();
        for column in &columns {
            let (x, z) = (column.x(), column.z());
            map.extend(
                self.assembler
                    .assemble(column, fields, seed)
                    .into_iter()
                    .map(|(y, block)| (IVec3::new(x, y, z), block)),
            );
        }

        let mut carved = 0;
        if self.settings.generate_caves {
            for column in &columns {
                carved += self.carver.carve_column(
                    column.x(),
                    column.z(),
                    column.surface_height(),
                    &mut map,
                );
            }
        }

        let mut decorated = 0;
        if self.settings.generate_decorations {
            for column in &columns {
                decorated += self.decorations.decorate_column(column, fields, &mut map);
            }
        }

        let mut structures = 0;
        if self.settings.generate_structures {
            structures = self
                .structures
                .place_chunk(chunk_x, chunk_z, &self.selector, &mut map)
                .len();
        }

        trace!(
            "Chunk ({chunk_x}, {chunk_z}): {} blocks, {carved} carved, {decorated} features, {structures} structures",
            map.len()
        );
        map
    }

    /// Number of memoised chunks.
    pub fn cached_chunks(&self) -> usize {
        self.chunks.len()
    }

    /// Registers a biome and drops every cached selection and chunk.
    ///
    /// # Errors
    ///
    /// Forwards [`BiomeCatalogError`] from the catalog.
    pub fn register_biome(&mut self, biome: BiomeDescriptor) -> Result<BiomeId, GeneratorError> {
        let id = self.selector.register(biome)?;
        self.clear_chunks();
        Ok(id)
    }

    /// Unregisters a biome and drops every cached selection and chunk.
    ///
    /// # Errors
    ///
    /// Forwards [`BiomeCatalogError`] from the catalog.
    pub fn unregister_biome(
        &mut self,
        id: BiomeId,
    ) -> Result<Arc<BiomeDescriptor>, GeneratorError> {
        let removed = self.selector.unregister(id)?;
        self.clear_chunks();
        Ok(removed)
    }

    /// Drops every memoised selection and chunk.
    pub fn clear_caches(&self) {
        self.selector.clear_caches();
        self.clear_chunks();
    }

    fn clear_chunks(&self) {
        debug!("Clearing {} cached chunks", self.chunks.len());
        self.chunks.clear();
    }
}
