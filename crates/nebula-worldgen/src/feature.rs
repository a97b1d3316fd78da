//! Surface decoration: biome features and their block footprints.

use glam::IVec3;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::biome::{ColumnBlend, TerrainFields};
use crate::block::{BlockRef, ChunkBlockMap};
use crate::seed::column_rng;

/// Broad category of a surface feature.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    Tree,
    Plant,
    Boulder,
}

/// A surface feature and the parameters of its footprint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Feature {
    /// Vertical trunk topped by a layered canopy.
    Tree {
        trunk: BlockRef,
        leaves: BlockRef,
        trunk_height: i32,
        canopy_radius: i32,
    },
    /// A single block.
    Plant { block: BlockRef },
    /// Small cross-shaped cluster.
    Boulder { block: BlockRef },
}

impl Feature {
    /// Oak tree with a trunk of 4 to 6 blocks.
    pub fn oak_tree(rng: &mut ChaCha8Rng) -> Self {
        Feature::Tree {
            trunk: BlockRef::from_static("oak_log"),
            leaves: BlockRef::from_static("oak_leaves"),
            trunk_height: rng.random_range(4..=6),
            canopy_radius: 2,
        }
    }

    /// Spruce tree with a trunk of 6 to 8 blocks.
    pub fn spruce_tree(rng: &mut ChaCha8Rng) -> Self {
        Feature::Tree {
            trunk: BlockRef::from_static("spruce_log"),
            leaves: BlockRef::from_static("spruce_leaves"),
            trunk_height: rng.random_range(6..=8),
            canopy_radius: 2,
        }
    }

    pub fn kind(&self) -> FeatureKind {
        match self {
            Feature::Tree { .. } => FeatureKind::Tree,
            Feature::Plant { .. } => FeatureKind::Plant,
            Feature::Boulder { .. } => FeatureKind::Boulder,
        }
    }

    /// Blocks of this feature relative to its anchor (the cell right above
    /// the surface). Later entries overwrite earlier ones at the same offset.
    pub fn footprint(&self) -> Vec<(IVec3, BlockRef)> {
        match self {
            Feature::Plant { block } => vec![(IVec3::ZERO, block.clone())],
            Feature::Boulder { block } => [
                IVec3::ZERO,
                IVec3::X,
                IVec3::NEG_X,
                IVec3::Z,
                IVec3::NEG_Z,
                IVec3::Y,
            ]
            .into_iter()
            .map(|offset| (offset, block.clone()))
            .collect(),
            Feature::Tree {
                trunk,
                leaves,
                trunk_height,
                canopy_radius,
            } => tree_footprint(trunk, leaves, *trunk_height, *canopy_radius),
        }
    }
}

/// Canopy: two full layers around the trunk top, a narrower layer above the
/// trunk, and a single cap block. The trunk is emitted last so it wins.
fn tree_footprint(
    trunk: &BlockRef,
    leaves: &BlockRef,
    trunk_height: i32,
    radius: i32,
) -> Vec<(IVec3, BlockRef)> {
    let mut blocks = Vec::new();
    let layers = [
        (trunk_height - 2, radius),
        (trunk_height - 1, radius),
        (trunk_height, (radius - 1).max(1)),
        (trunk_height + 1, 0),
    ];
    for (y, r) in layers {
        for dx in -r..=r {
            for dz in -r..=r {
                // Round off the corners.
                if r > 0 && dx.abs() == r && dz.abs() == r {
                    continue;
                }
                blocks.push((IVec3::new(dx, y, dz), leaves.clone()));
            }
        }
    }
    for y in 0..trunk_height {
        blocks.push((IVec3::new(0, y, 0), trunk.clone()));
    }
    blocks
}

/// Places the primary biome's features on each column.
///
/// Every draw comes from [`column_rng`], so decoration is a pure function of
/// the world seed and the column.
#[derive(Clone, Copy, Debug)]
pub struct DecorationPlacer {
    seed: u64,
    sea_level: i32,
    max_y: i32,
}

impl DecorationPlacer {
    pub fn new(seed: u64, sea_level: i32, max_y: i32) -> Self {
        Self {
            seed,
            sea_level,
            max_y,
        }
    }

    /// Features the column's primary biome wants. Empty for columns whose
    /// surface is below sea level.
    pub fn features_for(&self, column: &ColumnBlend, fields: &TerrainFields) -> Vec<Feature> {
        if column.surface_height() < self.sea_level {
            return Vec::new();
        }
        let mut rng = column_rng(self.seed, column.x(), column.z());
        column
            .primary()
            .features_at(column.x(), column.z(), &mut rng, fields)
    }

    /// Stamps the column's features into `map` right above the top of the
    /// terrain, overwriting whatever is there. A feature that would reach
    /// above `max_y` is skipped. Returns the number of features placed.
    pub fn decorate_column(
        &self,
        column: &ColumnBlend,
        fields: &TerrainFields,
        map: &mut ChunkBlockMap,
    ) -> usize {
        let top = column.surface_height().min(self.max_y);
        let anchor = IVec3::new(column.x(), top + 1, column.z());
        let mut placed = 0;
        for feature in self.features_for(column, fields) {
            let footprint = feature.footprint();
            if footprint
                .iter()
                .any(|(offset, _)| anchor.y + offset.y > self.max_y)
            {
                continue;
            }
            map.extend(
                footprint
                    .into_iter()
                    .map(|(offset, block)| (anchor + offset, block)),
            );
            placed += 1;
        }
        placed
    }
}
