//! Structure placement with per-type spacing constraints.
//!
//! The planner decides *where* structures go; a [`StructureBuilder`]
//! supplied by the caller decides *what* they look like and writes blocks
//! through a setter. Placements are remembered in a bounded registry used
//! only to enforce spacing.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::SystemTime;

use glam::IVec3;
use rand::Rng;
use tracing::trace;

use crate::biome::BiomeSelector;
use crate::block::{BlockMetadata, BlockRef, ChunkBlockMap};
use crate::seed::{chunk_rng, det_sqrt};

// ---------------------------------------------------------------------------
// Spacing rules
// ---------------------------------------------------------------------------

/// Spacing used for structure types without an explicit rule.
pub const DEFAULT_SPACING: i32 = 24;
/// No structure may be placed this close to a significant structure.
pub const SIGNIFICANT_EXCLUSION_RADIUS: i32 = 24;
/// Registry size that triggers pruning.
pub const MAX_PLACEMENT_RECORDS: usize = 1000;

/// Minimum distance between two structures of this type.
pub fn min_spacing(kind: &str) -> i32 {
    match kind {
        "village" => 80,
        "stronghold" => 128,
        "desert_temple" | "jungle_temple" | "witch_hut" | "igloo" => 64,
        "mineshaft" => 32,
        "ocean_ruin" => 16,
        "trail_ruins" => 20,
        "ruined_portal" => 24,
        _ => DEFAULT_SPACING,
    }
}

/// Whether this type keeps every other structure at a distance.
pub fn is_significant(kind: &str) -> bool {
    matches!(
        kind,
        "village" | "desert_temple" | "jungle_temple" | "witch_hut" | "stronghold"
    )
}

// ---------------------------------------------------------------------------
// Builder contract
// ---------------------------------------------------------------------------

/// Clockwise rotation about the vertical axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Rotation {
    None,
    Clockwise90,
    Clockwise180,
    Clockwise270,
}

impl Rotation {
    pub const ALL: [Rotation; 4] = [
        Rotation::None,
        Rotation::Clockwise90,
        Rotation::Clockwise180,
        Rotation::Clockwise270,
    ];
}

/// Per-placement parameters handed to the builder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StructureOptions {
    /// Name of the biome the structure was chosen from.
    pub biome: String,
    pub rotation: Rotation,
    /// Seed for any randomness inside the builder.
    pub seed: u64,
}

/// Summary a builder returns after stamping a structure.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StructureMetadata {
    pub blocks_placed: usize,
    /// Inclusive `(min, max)` corners of the written blocks.
    pub bounds: Option<(IVec3, IVec3)>,
    pub properties: BlockMetadata,
}

/// Stamps named structures into the world.
pub trait StructureBuilder: Send + Sync {
    /// Writes the blocks of a `kind` structure anchored at `position` through
    /// `set_block`.
    fn build(
        &self,
        kind: &str,
        position: IVec3,
        options: &StructureOptions,
        set_block: &mut dyn FnMut(IVec3, BlockRef),
    ) -> StructureMetadata;
}

/// Builder that marks each placement with one block carrying the structure
/// type in its metadata. Useful for tooling and tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct MarkerBuilder;

impl MarkerBuilder {
    pub const MARKER_BLOCK: &'static str = "structure_marker";
}

impl StructureBuilder for MarkerBuilder {
    fn build(
        &self,
        kind: &str,
        position: IVec3,
        options: &StructureOptions,
        set_block: &mut dyn FnMut(IVec3, BlockRef),
    ) -> StructureMetadata {
        let mut properties = BlockMetadata::new();
        properties.insert("structure".into(), kind.into());
        properties.insert("biome".into(), options.biome.clone());
        set_block(
            position,
            BlockRef::from_static(Self::MARKER_BLOCK).with_metadata(properties.clone()),
        );
        StructureMetadata {
            blocks_placed: 1,
            bounds: Some((position, position)),
            properties,
        }
    }
}

// ---------------------------------------------------------------------------
// Placement registry
// ---------------------------------------------------------------------------

/// One remembered placement.
#[derive(Clone, Debug, PartialEq)]
pub struct StructurePlacementRecord {
    pub position: (i32, i32),
    pub kind: String,
    /// Chunk whose generation made the placement.
    pub chunk: (i32, i32),
    pub created_at: SystemTime,
}

/// Why a placement was refused.
#[derive(Clone, Debug, PartialEq)]
pub enum PlacementConflict {
    /// A structure of the same type is closer than its spacing.
    SameType { position: (i32, i32), distance: f64 },
    /// A significant structure is within the exclusion radius.
    Significant {
        kind: String,
        position: (i32, i32),
        distance: f64,
    },
}

fn distance(a: (i32, i32), b: (i32, i32)) -> f64 {
    let dx = f64::from(a.0) - f64::from(b.0);
    let dz = f64::from(a.1) - f64::from(b.1);
    det_sqrt(dx * dx + dz * dz)
}

/// Bounded, thread-safe memory of recent placements.
///
/// Once it holds more than [`MAX_PLACEMENT_RECORDS`] entries the oldest are
/// dropped so only the newest 90% remain.
#[derive(Debug, Default)]
pub struct StructurePlacementRegistry {
    records: Mutex<VecDeque<StructurePlacementRecord>>,
}

impl StructurePlacementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn check(
        records: &VecDeque<StructurePlacementRecord>,
        kind: &str,
        position: (i32, i32),
    ) -> Result<(), PlacementConflict> {
        let spacing = f64::from(min_spacing(kind));
        let exclusion = f64::from(SIGNIFICANT_EXCLUSION_RADIUS);
        for record in records {
            let d = distance(record.position, position);
            if record.kind == kind && d < spacing {
                return Err(PlacementConflict::SameType {
                    position: record.position,
                    distance: d,
                });
            }
            if is_significant(&record.kind) && d < exclusion {
                return Err(PlacementConflict::Significant {
                    kind: record.kind.clone(),
                    position: record.position,
                    distance: d,
                });
            }
        }
        Ok(())
    }

    /// Checks spacing for a `kind` structure at `position` without recording.
    pub fn can_place(&self, kind: &str, position: (i32, i32)) -> Result<(), PlacementConflict> {
        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        Self::check(&records, kind, position)
    }

    /// Atomically checks spacing and, if clear, records the placement made
    /// by `chunk`.
    ///
    /// A placement already recorded for the same chunk, type and position is
    /// accepted again without a new record, so regenerating a chunk keeps
    /// its structures.
    pub fn try_reserve(
        &self,
        kind: &str,
        position: (i32, i32),
        chunk: (i32, i32),
    ) -> Result<(), PlacementConflict> {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        if records
            .iter()
            .any(|r| r.chunk == chunk && r.position == position && r.kind == kind)
        {
            return Ok(());
        }
        Self::check(&records, kind, position)?;
        records.push_back(StructurePlacementRecord {
            position,
            kind: kind.to_owned(),
            chunk,
            created_at: SystemTime::now(),
        });
        if records.len() > MAX_PLACEMENT_RECORDS {
            let keep = records.len() * 9 / 10;
            let excess = records.len() - keep;
            records.drain(..excess);
            trace!("Pruned {excess} structure placement records");
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of all records, oldest first.
    pub fn records(&self) -> Vec<StructurePlacementRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

// ---------------------------------------------------------------------------
// Planner
// ---------------------------------------------------------------------------

/// A structure placed in a chunk.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedStructure {
    pub kind: String,
    pub position: IVec3,
    pub metadata: StructureMetadata,
}

/// Chooses structure sites per chunk and delegates building.
pub struct StructurePlanner {
    seed: u64,
    chunk_size: i32,
    max_y: i32,
    registry: StructurePlacementRegistry,
    builder: Arc<dyn StructureBuilder>,
}

impl StructurePlanner {
    /// Blocks the builder writes above `max_y` are dropped.
    pub fn new(
        seed: u64,
        chunk_size: i32,
        max_y: i32,
        builder: Arc<dyn StructureBuilder>,
    ) -> Self {
        Self {
            seed,
            chunk_size: chunk_size.max(1),
            max_y,
            registry: StructurePlacementRegistry::new(),
            builder,
        }
    }

    pub fn registry(&self) -> &StructurePlacementRegistry {
        &self.registry
    }

    /// Places the structures of chunk `(chunk_x, chunk_z)` into `map`.
    ///
    /// Candidates come from the blended primary biome at the chunk centre.
    /// Each one rolls its chance, picks an offset inside the chunk and is
    /// skipped on any spacing conflict. Structures are anchored at the top of
    /// the terrain column, which never exceeds `max_y`.
    pub fn place_chunk(
        &self,
        chunk_x: i32,
        chunk_z: i32,
        selector: &BiomeSelector,
        map: &mut ChunkBlockMap,
    ) -> Vec<PlacedStructure> {
        let origin_x = chunk_x.wrapping_mul(self.chunk_size);
        let origin_z = chunk_z.wrapping_mul(self.chunk_size);
        let centre = selector.column(
            origin_x.wrapping_add(self.chunk_size / 2),
            origin_z.wrapping_add(self.chunk_size / 2),
        );
        let biome = Arc::clone(centre.primary());

        let mut rng = chunk_rng(self.seed, chunk_x, chunk_z);
        let mut placed = Vec::new();
        for candidate in &biome.structures {
            if rng.random::<f64>() >= candidate.chance {
                continue;
            }
            let x = origin_x.wrapping_add(rng.random_range(0..self.chunk_size));
            let z = origin_z.wrapping_add(rng.random_range(0..self.chunk_size));
            let options = StructureOptions {
                biome: biome.name.clone(),
                rotation: Rotation::ALL[rng.random_range(0..Rotation::ALL.len())],
                seed: rng.random(),
            };

            if let Err(conflict) =
                self.registry
                    .try_reserve(&candidate.kind, (x, z), (chunk_x, chunk_z))
            {
                trace!(
                    "Rejected {} at ({x}, {z}) in chunk ({chunk_x}, {chunk_z}): {conflict:?}",
                    candidate.kind
                );
                continue;
            }

            let surface = selector.column(x, z).surface_height().min(self.max_y);
            let position = IVec3::new(x, surface, z);
            let max_y = self.max_y;
            let metadata = self.builder.build(
                &candidate.kind,
                position,
                &options,
                &mut |pos, block| {
                    if pos.y <= max_y {
                        map.set(pos, block);
                    }
                },
            );
            trace!("Placed {} at {position}", candidate.kind);
            placed.push(PlacedStructure {
                kind: candidate.kind.clone(),
                position,
                metadata,
            });
        }
        placed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spacing_table() {
        assert_eq!(min_spacing("village"), 80);
        assert_eq!(min_spacing("stronghold"), 128);
        assert_eq!(min_spacing("igloo"), 64);
        assert_eq!(min_spacing("mineshaft"), 32);
        assert_eq!(min_spacing("ocean_ruin"), 16);
        assert_eq!(min_spacing("trail_ruins"), 20);
        assert_eq!(min_spacing("ruined_portal"), 24);
        assert_eq!(min_spacing("something_else"), DEFAULT_SPACING);
        assert!(is_significant("witch_hut"));
        assert!(!is_significant("mineshaft"));
    }

    #[test]
    fn test_same_type_spacing_enforced() {
        let registry = StructurePlacementRegistry::new();
        registry.try_reserve("mineshaft", (0, 0), (0, 0)).unwrap();
        assert!(matches!(
            registry.try_reserve("mineshaft", (20, 20), (0, 0)),
            Err(PlacementConflict::SameType { .. })
        ));
        assert!(registry.try_reserve("mineshaft", (32, 0), (0, 0)).is_ok(), "Exactly the spacing is allowed");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_significant_exclusion_applies_to_every_type() {
        let registry = StructurePlacementRegistry::new();
        registry.try_reserve("village", (100, 100), (0, 0)).unwrap();
        let conflict = registry.try_reserve("ocean_ruin", (110, 100), (0, 0)).unwrap_err();
        assert!(
            matches!(conflict, PlacementConflict::Significant { ref kind, .. } if kind == "village"),
            "Expected a significant-structure conflict, got {conflict:?}"
        );
        assert!(registry.try_reserve("ocean_ruin", (124, 100), (0, 0)).is_ok());
    }

    #[test]
    fn test_non_significant_types_do_not_exclude_others() {
        let registry = StructurePlacementRegistry::new();
        registry.try_reserve("mineshaft", (0, 0), (0, 0)).unwrap();
        assert!(registry.try_reserve("ocean_ruin", (1, 1), (0, 0)).is_ok());
    }

    #[test]
    fn test_registry_prunes_to_newest_ninety_percent() {
        let registry = StructurePlacementRegistry::new();
        for i in 0..=MAX_PLACEMENT_RECORDS as i32 {
            registry.try_reserve("ocean_ruin", (i * 100, 0), (0, 0)).unwrap();
        }
        let records = registry.records();
        assert_eq!(records.len(), (MAX_PLACEMENT_RECORDS + 1) * 9 / 10);
        assert_eq!(
            records.last().unwrap().position,
            (MAX_PLACEMENT_RECORDS as i32 * 100, 0),
            "Newest record must survive pruning"
        );
        assert!(
            records.iter().all(|r| r.position.0 >= 101 * 100),
            "Oldest records must be pruned first"
        );
    }

    #[test]
    fn test_same_chunk_placement_is_accepted_again() {
        let registry = StructurePlacementRegistry::new();
        registry.try_reserve("mineshaft", (5, 5), (0, 0)).unwrap();
        assert!(
            registry.try_reserve("mineshaft", (5, 5), (0, 0)).is_ok(),
            "Regenerating a chunk must keep its own placement"
        );
        assert_eq!(registry.len(), 1, "The repeat must not add a record");
        assert!(
            matches!(
                registry.try_reserve("mineshaft", (5, 5), (1, 0)),
                Err(PlacementConflict::SameType { .. })
            ),
            "Another chunk claiming the same spot still conflicts"
        );
    }

    /// Writes a column of blocks from the anchor upwards.
    struct TowerBuilder;

    impl StructureBuilder for TowerBuilder {
        fn build(
            &self,
            _kind: &str,
            position: IVec3,
            _options: &StructureOptions,
            set_block: &mut dyn FnMut(IVec3, BlockRef),
        ) -> StructureMetadata {
            for dy in 0..10 {
                set_block(position + IVec3::new(0, dy, 0), BlockRef::from_static("tower"));
            }
            StructureMetadata::default()
        }
    }

    #[test]
    fn test_structures_stay_below_max_y() {
        use crate::biome::{
            BiomeDescriptor, BiomeKind, BiomeRegistry, BiomeSelector, TerrainFields,
        };
        use crate::cache::{CachePolicy, CacheSettings};
        use crate::climate::ClimateSampler;

        let selector = BiomeSelector::new(
            Box::new(
                BiomeRegistry::new(
                    BiomeDescriptor::new("hills", BiomeKind::Plains)
                        .with_height(80.0, 0.0)
                        .with_structure("tower", 1.0),
                )
                .unwrap(),
            ),
            ClimateSampler::new(0),
            TerrainFields::new(0),
            0,
            CacheSettings::new(CachePolicy::Lru, 256, 1),
        );
        let max_y = 20;
        let planner = StructurePlanner::new(3, 8, max_y, Arc::new(TowerBuilder));
        let mut map = ChunkBlockMap::new();
        let placed = planner.place_chunk(0, 0, &selector, &mut map);

        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0].position.y, max_y, "Anchor must be clamped to max_y");
        assert!(
            map.iter().all(|(pos, _)| pos.y <= max_y),
            "Structure blocks written above max_y"
        );
    }

    #[test]
    fn test_marker_builder_writes_one_block() {
        let mut map = ChunkBlockMap::new();
        let options = StructureOptions {
            biome: "plains".into(),
            rotation: Rotation::None,
            seed: 1,
        };
        let meta = MarkerBuilder.build("village", IVec3::new(1, 70, 2), &options, &mut |p, b| {
            map.set(p, b)
        });
        assert_eq!(meta.blocks_placed, 1);
        let block = map.get(IVec3::new(1, 70, 2)).unwrap();
        assert_eq!(block.name(), MarkerBuilder::MARKER_BLOCK);
        assert_eq!(
            block.metadata().unwrap().get("structure").map(String::as_str),
            Some("village")
        );
    }
}
