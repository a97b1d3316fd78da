//! Biome descriptor: climate ranges, block palette and strategy tag.

use rand_chacha::ChaCha8Rng;

use super::{BiomeId, BiomeKind, TerrainFields, kind};
use crate::block::BlockRef;
use crate::climate::{ClimateAxis, ClimateSample};
use crate::feature::Feature;

/// Inclusive `[min, max]` interval on one climate axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClimateRange {
    pub min: f64,
    pub max: f64,
}

impl ClimateRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Range accepting any value on a signed axis.
    pub const SIGNED_ANY: Self = Self::new(-1.0, 1.0);
    /// Range accepting any value on an unsigned axis.
    pub const UNSIGNED_ANY: Self = Self::new(0.0, 1.0);

    pub fn is_valid(&self) -> bool {
        self.min <= self.max
    }

    pub fn contains(&self, v: f64) -> bool {
        self.min <= v && v <= self.max
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) * 0.5
    }

    pub fn half_width(&self) -> f64 {
        (self.max - self.min) * 0.5
    }

    /// `1 − |v − mid| / half_width`, clamped to `[0, 1]`.
    ///
    /// A zero-width range scores 1 on its exact value and 0 elsewhere.
    pub fn closeness(&self, v: f64) -> f64 {
        let half = self.half_width();
        if half <= 0.0 {
            return if v == self.midpoint() { 1.0 } else { 0.0 };
        }
        (1.0 - (v - self.midpoint()).abs() / half).clamp(0.0, 1.0)
    }
}

/// The five climate ranges a biome accepts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClimateRanges {
    pub temperature: ClimateRange,
    pub precipitation: ClimateRange,
    pub continentalness: ClimateRange,
    pub erosion: ClimateRange,
    pub weirdness: ClimateRange,
}

impl ClimateRanges {
    pub fn get(&self, axis: ClimateAxis) -> ClimateRange {
        match axis {
            ClimateAxis::Temperature => self.temperature,
            ClimateAxis::Precipitation => self.precipitation,
            ClimateAxis::Continentalness => self.continentalness,
            ClimateAxis::Erosion => self.erosion,
            ClimateAxis::Weirdness => self.weirdness,
        }
    }

    /// Whether every axis of `climate` lies inside its range.
    pub fn contains(&self, climate: &ClimateSample) -> bool {
        ClimateAxis::ALL
            .into_iter()
            .all(|axis| self.get(axis).contains(climate.axis(axis)))
    }

    /// First axis whose range has `min > max`.
    pub fn first_invalid(&self) -> Option<(ClimateAxis, ClimateRange)> {
        ClimateAxis::ALL
            .into_iter()
            .map(|axis| (axis, self.get(axis)))
            .find(|(_, range)| !range.is_valid())
    }
}

impl Default for ClimateRanges {
    fn default() -> Self {
        Self {
            temperature: ClimateRange::SIGNED_ANY,
            precipitation: ClimateRange::UNSIGNED_ANY,
            continentalness: ClimateRange::UNSIGNED_ANY,
            erosion: ClimateRange::UNSIGNED_ANY,
            weirdness: ClimateRange::SIGNED_ANY,
        }
    }
}

/// Fitness weight of each climate axis. Sums to 1.
pub fn axis_weight(axis: ClimateAxis) -> f64 {
    match axis {
        ClimateAxis::Temperature => 0.35,
        ClimateAxis::Precipitation => 0.25,
        ClimateAxis::Continentalness => 0.20,
        ClimateAxis::Erosion => 0.15,
        ClimateAxis::Weirdness => 0.05,
    }
}

/// A structure type a biome may spawn, with its per-chunk chance.
#[derive(Clone, Debug, PartialEq)]
pub struct StructureCandidate {
    pub kind: String,
    pub chance: f64,
}

impl StructureCandidate {
    pub fn new(kind: impl Into<String>, chance: f64) -> Self {
        Self {
            kind: kind.into(),
            chance,
        }
    }
}

/// Full descriptor for a biome type.
///
/// The `kind` tag selects the height, block and feature strategies; the
/// numeric and palette fields parameterize them.
#[derive(Clone, Debug)]
pub struct BiomeDescriptor {
    pub(crate) id: BiomeId,
    /// Unique, human-readable name (e.g. `"plains"`).
    pub name: String,
    pub kind: BiomeKind,
    pub climate: ClimateRanges,
    /// Mean surface height in blocks.
    pub base_height: f64,
    /// Maximum deviation from `base_height` contributed by terrain fields.
    pub height_variation: f64,
    /// Block at the surface.
    pub surface_block: BlockRef,
    /// Block for the few layers right below the surface.
    pub subsurface_block: BlockRef,
    /// Block for everything deeper.
    pub filler_block: BlockRef,
    pub structures: Vec<StructureCandidate>,
}

impl BiomeDescriptor {
    /// Creates a descriptor with the kind's default palette and heights and
    /// climate ranges accepting everything.
    pub fn new(name: impl Into<String>, kind: BiomeKind) -> Self {
        let palette = kind.default_palette();
        let (base_height, height_variation) = kind.default_height();
        Self {
            id: BiomeId::UNASSIGNED,
            name: name.into(),
            kind,
            climate: ClimateRanges::default(),
            base_height,
            height_variation,
            surface_block: palette.surface,
            subsurface_block: palette.subsurface,
            filler_block: palette.filler,
            structures: Vec::new(),
        }
    }

    pub fn with_climate(mut self, climate: ClimateRanges) -> Self {
        self.climate = climate;
        self
    }

    pub fn with_height(mut self, base_height: f64, height_variation: f64) -> Self {
        self.base_height = base_height;
        self.height_variation = height_variation;
        self
    }

    pub fn with_structure(mut self, kind: impl Into<String>, chance: f64) -> Self {
        self.structures.push(StructureCandidate::new(kind, chance));
        self
    }

    /// Identifier assigned by the catalog on registration.
    pub fn id(&self) -> BiomeId {
        self.id
    }

    /// Climate fitness in `[0, 1]`; exactly 0 if any axis is out of range.
    pub fn fitness(&self, climate: &ClimateSample) -> f64 {
        if !self.climate.contains(climate) {
            return 0.0;
        }
        let score: f64 = ClimateAxis::ALL
            .into_iter()
            .map(|axis| axis_weight(axis) * self.climate.get(axis).closeness(climate.axis(axis)))
            .sum();
        score.clamp(0.0, 1.0)
    }

    /// Surface height of this biome's terrain at `(x, z)`.
    pub fn height(&self, x: i32, z: i32, fields: &TerrainFields) -> f64 {
        kind::height(self, x, z, fields)
    }

    /// Block at `(x, y, z)` for a column whose surface is at `surface_height`.
    pub fn block_at(
        &self,
        x: i32,
        y: i32,
        z: i32,
        surface_height: i32,
        fields: &TerrainFields,
    ) -> BlockRef {
        kind::block_at(self, x, y, z, surface_height, fields)
    }

    /// Features to place on the column at `(x, z)`, drawn from `rng`.
    pub fn features_at(
        &self,
        x: i32,
        z: i32,
        rng: &mut ChaCha8Rng,
        fields: &TerrainFields,
    ) -> Vec<Feature> {
        kind::features_at(self, x, z, rng, fields)
    }
}
