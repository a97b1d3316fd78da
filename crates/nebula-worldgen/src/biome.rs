//! Biome system: descriptors, catalog, climate-driven selection and blending.
//!
//! Biomes are plain records tagged with a [`BiomeKind`] that selects their
//! height, block and feature strategies. A [`BiomeCatalog`] owns them; the
//! [`BiomeSelector`] picks the best fit for a climate sample and blends
//! neighbouring biomes near borders.

mod def;
mod fields;
mod kind;
mod registry;
mod selector;

pub use def::{BiomeDescriptor, ClimateRange, ClimateRanges, StructureCandidate, axis_weight};
pub use fields::TerrainFields;
pub use kind::{BiomeKind, Palette};
pub use registry::{BiomeCatalog, BiomeCatalogError, BiomeId, BiomeRegistry, default_biomes};
pub use selector::{BiomeSelector, BlendNeighbor, BlendResult, ColumnBlend};
