//! Biome strategy tag and the pure height, block and feature functions it
//! selects.

use std::fmt;

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use super::{BiomeDescriptor, TerrainFields};
use crate::block::BlockRef;
use crate::feature::Feature;
use crate::seed::position_random;

/// Depth of the subsurface band below the surface block.
const SUBSURFACE_DEPTH: i32 = 3;
/// Mountain surfaces at or above this height are snow-capped.
const SNOW_LINE: i32 = 120;
/// Fraction of swamp surface blocks replaced with mud.
const SWAMP_MUD_CHANCE: f64 = 0.3;

/// Closed set of biome behaviours.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BiomeKind {
    Plains,
    Forest,
    Desert,
    Mountains,
    Ocean,
    Tundra,
    Swamp,
}

/// Surface, subsurface and filler blocks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    pub surface: BlockRef,
    pub subsurface: BlockRef,
    pub filler: BlockRef,
}

impl BiomeKind {
    pub const ALL: [BiomeKind; 7] = [
        BiomeKind::Plains,
        BiomeKind::Forest,
        BiomeKind::Desert,
        BiomeKind::Mountains,
        BiomeKind::Ocean,
        BiomeKind::Tundra,
        BiomeKind::Swamp,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BiomeKind::Plains => "plains",
            BiomeKind::Forest => "forest",
            BiomeKind::Desert => "desert",
            BiomeKind::Mountains => "mountains",
            BiomeKind::Ocean => "ocean",
            BiomeKind::Tundra => "tundra",
            BiomeKind::Swamp => "swamp",
        }
    }

    pub fn default_palette(self) -> Palette {
        let (surface, subsurface) = match self {
            BiomeKind::Plains | BiomeKind::Forest | BiomeKind::Swamp => {
                (BlockRef::GRASS, BlockRef::DIRT)
            }
            BiomeKind::Desert => (BlockRef::SAND, BlockRef::from_static("sandstone")),
            BiomeKind::Mountains => (BlockRef::STONE, BlockRef::STONE),
            BiomeKind::Ocean => (BlockRef::SAND, BlockRef::GRAVEL),
            BiomeKind::Tundra => (BlockRef::from_static("snow_block"), BlockRef::DIRT),
        };
        Palette {
            surface,
            subsurface,
            filler: BlockRef::STONE,
        }
    }

    /// `(base_height, height_variation)` defaults.
    pub fn default_height(self) -> (f64, f64) {
        match self {
            BiomeKind::Plains => (68.0, 4.0),
            BiomeKind::Forest => (70.0, 8.0),
            BiomeKind::Desert => (66.0, 6.0),
            BiomeKind::Mountains => (100.0, 45.0),
            BiomeKind::Ocean => (45.0, 8.0),
            BiomeKind::Tundra => (70.0, 5.0),
            BiomeKind::Swamp => (62.0, 2.0),
        }
    }

    /// Terrain shape in roughly `[-1, 1]` before scaling by the biome's
    /// height variation.
    fn shape(self, x: f64, z: f64, fields: &TerrainFields) -> f64 {
        match self {
            BiomeKind::Plains => 0.5 * fields.detail(x, z) + 0.5 * fields.continental(x, z),
            BiomeKind::Forest => 0.7 * fields.detail(x, z) + 0.3 * fields.hills(x, z),
            BiomeKind::Desert => 0.6 * fields.hills(x, z) + 0.4 * fields.detail(x, z),
            BiomeKind::Mountains => {
                // Ridge output is in [0, 1]; recentre it.
                let ridge = fields.ridge(x, z) * 2.0 - 1.0;
                0.6 * ridge + 0.4 * fields.detail(x, z)
            }
            BiomeKind::Ocean => 0.6 * fields.continental(x, z) + 0.4 * fields.detail(x, z),
            BiomeKind::Tundra => 0.8 * fields.detail(x, z) + 0.2 * fields.hills(x, z),
            BiomeKind::Swamp => fields.detail(x, z),
        }
    }
}

impl fmt::Display for BiomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

pub(super) fn height(biome: &BiomeDescriptor, x: i32, z: i32, fields: &TerrainFields) -> f64 {
    let shape = biome.kind.shape(f64::from(x), f64::from(z), fields);
    biome.base_height + biome.height_variation * shape
}

pub(super) fn block_at(
    biome: &BiomeDescriptor,
    x: i32,
    y: i32,
    z: i32,
    surface_height: i32,
    fields: &TerrainFields,
) -> BlockRef {
    if y > surface_height {
        return BlockRef::AIR;
    }
    if y == surface_height {
        return match biome.kind {
            BiomeKind::Mountains if y >= SNOW_LINE => BlockRef::from_static("snow_block"),
            BiomeKind::Swamp if position_random(x, y, z, fields.seed()) < SWAMP_MUD_CHANCE => {
                BlockRef::from_static("mud")
            }
            _ => biome.surface_block.clone(),
        };
    }
    if y > surface_height - 1 - SUBSURFACE_DEPTH {
        return biome.subsurface_block.clone();
    }
    biome.filler_block.clone()
}

pub(super) fn features_at(
    biome: &BiomeDescriptor,
    _x: i32,
    _z: i32,
    rng: &mut ChaCha8Rng,
    _fields: &TerrainFields,
) -> Vec<Feature> {
    let roll: f64 = rng.random();
    let feature = match biome.kind {
        BiomeKind::Plains => {
            if roll < 0.004 {
                Some(Feature::oak_tree(rng))
            } else if roll < 0.12 {
                // Rare flower variant.
                let block = if rng.random_bool(0.05) {
                    BlockRef::from_static("sunflower")
                } else {
                    BlockRef::from_static("short_grass")
                };
                Some(Feature::Plant { block })
            } else {
                None
            }
        }
        BiomeKind::Forest => {
            if roll < 0.06 {
                Some(Feature::oak_tree(rng))
            } else if roll < 0.16 {
                Some(Feature::Plant {
                    block: BlockRef::from_static("fern"),
                })
            } else {
                None
            }
        }
        BiomeKind::Desert => (roll < 0.01).then(|| Feature::Plant {
            block: if rng.random_bool(0.5) {
                BlockRef::from_static("cactus")
            } else {
                BlockRef::from_static("dead_bush")
            },
        }),
        BiomeKind::Mountains => (roll < 0.015).then(|| Feature::Boulder {
            block: BlockRef::from_static("cobblestone"),
        }),
        BiomeKind::Ocean => None,
        BiomeKind::Tundra => {
            if roll < 0.008 {
                Some(Feature::spruce_tree(rng))
            } else if roll < 0.012 {
                Some(Feature::Boulder {
                    block: BlockRef::from_static("packed_ice"),
                })
            } else {
                None
            }
        }
        BiomeKind::Swamp => {
            if roll < 0.03 {
                Some(Feature::oak_tree(rng))
            } else if roll < 0.1 {
                Some(Feature::Plant {
                    block: BlockRef::from_static("blue_orchid"),
                })
            } else {
                None
            }
        }
    };
    feature.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    fn fields() -> TerrainFields {
        TerrainFields::new(42)
    }

    #[test]
    fn test_block_layers() {
        let fields = fields();
        let forest = BiomeDescriptor::new("forest", BiomeKind::Forest);
        assert_eq!(forest.block_at(0, 71, 0, 70, &fields), BlockRef::AIR);
        assert_eq!(forest.block_at(0, 70, 0, 70, &fields), BlockRef::GRASS);
        assert_eq!(forest.block_at(0, 67, 0, 70, &fields), BlockRef::DIRT);
        assert_eq!(forest.block_at(0, 66, 0, 70, &fields), BlockRef::STONE);
    }

    #[test]
    fn test_snow_capped_mountains() {
        let fields = fields();
        let mountains = BiomeDescriptor::new("mountains", BiomeKind::Mountains);
        assert_eq!(
            mountains.block_at(3, 130, 3, 130, &fields).name(),
            "snow_block"
        );
        assert_eq!(mountains.block_at(3, 90, 3, 90, &fields), BlockRef::STONE);
    }

    #[test]
    fn test_height_within_variation() {
        let fields = fields();
        for kind in BiomeKind::ALL {
            let biome = BiomeDescriptor::new(kind.as_str(), kind);
            for i in -50..50 {
                let h = biome.height(i * 13, -i * 7, &fields);
                assert!(
                    (h - biome.base_height).abs() <= biome.height_variation + 1e-9,
                    "{kind}: height {h} beyond base {} ± {}",
                    biome.base_height,
                    biome.height_variation
                );
            }
        }
    }

    #[test]
    fn test_features_deterministic_for_same_rng_seed() {
        let fields = fields();
        let forest = BiomeDescriptor::new("forest", BiomeKind::Forest);
        for seed in 0..200 {
            let a = forest.features_at(0, 0, &mut ChaCha8Rng::seed_from_u64(seed), &fields);
            let b = forest.features_at(0, 0, &mut ChaCha8Rng::seed_from_u64(seed), &fields);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_ocean_has_no_features() {
        let fields = fields();
        let ocean = BiomeDescriptor::new("ocean", BiomeKind::Ocean);
        for seed in 0..100 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            assert!(ocean.features_at(0, 0, &mut rng, &fields).is_empty());
        }
    }
}
