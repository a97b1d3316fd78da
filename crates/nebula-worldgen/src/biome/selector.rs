//! Climate-driven biome selection and border blending.

use std::f64::consts::TAU;
use std::sync::Arc;

use tracing::debug;

use super::{BiomeCatalog, BiomeCatalogError, BiomeDescriptor, BiomeId, TerrainFields};
use crate::block::BlockRef;
use crate::cache::{CacheSettings, ShardedCache};
use crate::climate::{ClimateSample, ClimateSampler};
use crate::seed::{det_cos, det_sin, position_random};

/// Number of points sampled on the blend circle.
const BLEND_SAMPLES: u32 = 8;
/// Band around the blended height, below and above, where blocks may blend.
const BLEND_BAND_BELOW: f64 = 20.0;
const BLEND_BAND_ABOVE: f64 = 10.0;
/// Vertical slack of the per-neighbour substitution window.
const NEIGHBOR_SLACK_BELOW: f64 = 3.0;
const NEIGHBOR_SLACK_ABOVE: f64 = 1.0;

/// A biome differing from the primary near a blend point, with its weight.
#[derive(Clone, Debug)]
pub struct BlendNeighbor {
    pub biome: Arc<BiomeDescriptor>,
    pub weight: f64,
}

/// Outcome of [`BiomeSelector::blend`].
///
/// `blend_factor = 1 − 0.5·Σweight`. This is a heuristic: the primary's
/// factor and the neighbour weights do not sum to 1 in general.
#[derive(Clone, Debug)]
pub struct BlendResult {
    pub primary: Arc<BiomeDescriptor>,
    pub blend_factor: f64,
    pub neighbors: Vec<BlendNeighbor>,
}

impl BlendResult {
    fn unblended(primary: Arc<BiomeDescriptor>) -> Self {
        Self {
            primary,
            blend_factor: 1.0,
            neighbors: Vec::new(),
        }
    }

    /// Sum of all neighbour weights.
    pub fn total_neighbor_weight(&self) -> f64 {
        self.neighbors.iter().map(|n| n.weight).sum()
    }
}

/// Blend and heights of one column, computed once and reused for every `y`.
#[derive(Clone, Debug)]
pub struct ColumnBlend {
    x: i32,
    z: i32,
    blend: BlendResult,
    primary_height: f64,
    neighbor_heights: Vec<f64>,
    height: f64,
}

impl ColumnBlend {
    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn z(&self) -> i32 {
        self.z
    }

    pub fn blend(&self) -> &BlendResult {
        &self.blend
    }

    pub fn primary(&self) -> &Arc<BiomeDescriptor> {
        &self.blend.primary
    }

    /// Blended terrain height.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Blended height rounded to the block grid.
    pub fn surface_height(&self) -> i32 {
        self.height.round() as i32
    }

    /// Block at height `y` in this column.
    ///
    /// Outside `[H − 20, H + 10]` the primary biome decides alone. Inside it,
    /// air and water are kept; otherwise the first neighbour whose own height
    /// range covers `y`, whose block differs and whose weight beats a
    /// positional draw substitutes its block.
    pub fn block_at(&self, y: i32, fields: &TerrainFields, seed: u64) -> BlockRef {
        let surface = self.surface_height();
        let primary = &self.blend.primary;
        let block = primary.block_at(self.x, y, self.z, surface, fields);

        let fy = f64::from(y);
        if fy < self.height - BLEND_BAND_BELOW || fy > self.height + BLEND_BAND_ABOVE {
            return block;
        }
        if block.is_air() || block.is_water() {
            return block;
        }

        let draw = position_random(self.x, y, self.z, seed);
        for (neighbor, &nh) in self.blend.neighbors.iter().zip(&self.neighbor_heights) {
            let low = self.primary_height.min(nh) - NEIGHBOR_SLACK_BELOW;
            let high = self.primary_height.max(nh) + NEIGHBOR_SLACK_ABOVE;
            if fy < low || fy > high {
                continue;
            }
            let candidate = neighbor.biome.block_at(self.x, y, self.z, surface, fields);
            if candidate != block && draw < neighbor.weight {
                return candidate;
            }
        }
        block
    }
}

/// Picks biomes from climate samples and blends them across borders.
///
/// Bound to one world seed; selections are memoised in a sharded bounded
/// cache keyed by `(x, z, seed)`.
pub struct BiomeSelector {
    catalog: Box<dyn BiomeCatalog>,
    climate: ClimateSampler,
    fields: TerrainFields,
    seed: u64,
    blend_radius: i32,
    cache: ShardedCache<(i32, i32, u64), Arc<BiomeDescriptor>>,
}

impl BiomeSelector {
    /// Creates a selector. The world seed is taken from `climate`.
    pub fn new(
        catalog: Box<dyn BiomeCatalog>,
        climate: ClimateSampler,
        fields: TerrainFields,
        blend_radius: i32,
        cache: CacheSettings,
    ) -> Self {
        Self {
            catalog,
            seed: climate.seed(),
            climate,
            fields,
            blend_radius,
            cache: cache.build(),
        }
    }

    pub fn catalog(&self) -> &dyn BiomeCatalog {
        self.catalog.as_ref()
    }

    pub fn climate(&self) -> &ClimateSampler {
        &self.climate
    }

    pub fn fields(&self) -> &TerrainFields {
        &self.fields
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn blend_radius(&self) -> i32 {
        self.blend_radius
    }

    /// Number of memoised selections.
    pub fn cached_selections(&self) -> usize {
        self.cache.len()
    }

    /// Best biome for a climate sample.
    ///
    /// Only biomes whose ranges all contain the sample are eligible; ties go
    /// to the earliest registered. With no eligible biome the catalog
    /// default is returned.
    pub fn select_best(&self, climate: &ClimateSample) -> Arc<BiomeDescriptor> {
        let mut best: Option<(&Arc<BiomeDescriptor>, f64)> = None;
        for biome in self.catalog.all_biomes() {
            if !biome.climate.contains(climate) {
                continue;
            }
            let fitness = biome.fitness(climate);
            if best.is_none_or(|(_, score)| fitness > score) {
                best = Some((biome, fitness));
            }
        }
        match best {
            Some((biome, _)) => Arc::clone(biome),
            None => Arc::clone(self.catalog.default_biome()),
        }
    }

    /// Biome at a column, memoised.
    pub fn select_at(&self, x: i32, z: i32) -> Arc<BiomeDescriptor> {
        self.cache.get_or_insert_with((x, z, self.seed), || {
            let climate = self.climate.sample(f64::from(x), f64::from(z));
            self.select_best(&climate)
        })
    }

    /// Primary biome at `(x, z)` plus the differing biomes found on a circle
    /// of `radius` blocks around it.
    pub fn blend(&self, x: i32, z: i32, radius: i32) -> BlendResult {
        let primary = self.select_at(x, z);
        if radius <= 0 {
            return BlendResult::unblended(primary);
        }

        let step = 1.0 / f64::from(BLEND_SAMPLES);
        let r = f64::from(radius);
        let mut neighbors: Vec<BlendNeighbor> = Vec::new();
        for i in 0..BLEND_SAMPLES {
            let angle = TAU * f64::from(i) / f64::from(BLEND_SAMPLES);
            let sx = x.wrapping_add((r * det_cos(angle)).round() as i32);
            let sz = z.wrapping_add((r * det_sin(angle)).round() as i32);
            let biome = self.select_at(sx, sz);
            if biome.id() == primary.id() {
                continue;
            }
            match neighbors.iter_mut().find(|n| n.biome.id() == biome.id()) {
                Some(existing) => existing.weight += step,
                None => neighbors.push(BlendNeighbor {
                    biome,
                    weight: step,
                }),
            }
        }

        let total: f64 = neighbors.iter().map(|n| n.weight).sum();
        BlendResult {
            primary,
            blend_factor: 1.0 - 0.5 * total,
            neighbors,
        }
    }

    /// Blend, heights and per-neighbour heights for one column at the
    /// configured blend radius.
    pub fn column(&self, x: i32, z: i32) -> ColumnBlend {
        let blend = self.blend(x, z, self.blend_radius);
        let primary_height = blend.primary.height(x, z, &self.fields);
        let neighbor_heights: Vec<f64> = blend
            .neighbors
            .iter()
            .map(|n| n.biome.height(x, z, &self.fields))
            .collect();
        let height = primary_height * blend.blend_factor
            + blend
                .neighbors
                .iter()
                .zip(&neighbor_heights)
                .map(|(n, h)| h * n.weight)
                .sum::<f64>();
        ColumnBlend {
            x,
            z,
            blend,
            primary_height,
            neighbor_heights,
            height,
        }
    }

    /// `primary.height·blend_factor + Σ neighbor.height·weight`.
    pub fn blended_height(&self, x: i32, z: i32) -> f64 {
        self.column(x, z).height()
    }

    /// Block at `(x, y, z)` after border blending.
    ///
    /// Prefer [`column`](Self::column) when querying many `y` in one column.
    pub fn blended_block_at(&self, x: i32, y: i32, z: i32) -> BlockRef {
        self.column(x, z).block_at(y, &self.fields, self.seed)
    }

    /// Registers a biome and clears every cached selection.
    ///
    /// # Errors
    ///
    /// Forwards [`BiomeCatalogError`] from the catalog.
    pub fn register(&mut self, biome: BiomeDescriptor) -> Result<BiomeId, BiomeCatalogError> {
        let id = self.catalog.register(biome)?;
        self.clear_caches();
        Ok(id)
    }

    /// Unregisters a biome and clears every cached selection.
    ///
    /// # Errors
    ///
    /// Forwards [`BiomeCatalogError`] from the catalog.
    pub fn unregister(&mut self, id: BiomeId) -> Result<Arc<BiomeDescriptor>, BiomeCatalogError> {
        let removed = self.catalog.unregister(id)?;
        self.clear_caches();
        Ok(removed)
    }

    /// Drops every memoised selection.
    pub fn clear_caches(&self) {
        debug!("Clearing {} cached biome selections", self.cache.len());
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::{BiomeKind, BiomeRegistry, ClimateRange, ClimateRanges, default_biomes};
    use crate::cache::CachePolicy;

    fn cache() -> CacheSettings {
        CacheSettings::new(CachePolicy::Lru, 4_096, 4)
    }

    fn fallback_selector(blend_radius: i32) -> BiomeSelector {
        BiomeSelector::new(
            Box::new(default_biomes().unwrap()),
            ClimateSampler::new(0),
            TerrainFields::new(0),
            blend_radius,
            cache(),
        )
    }

    fn uniform_selector(biome: BiomeDescriptor) -> BiomeSelector {
        BiomeSelector::new(
            Box::new(BiomeRegistry::new(biome).unwrap()),
            ClimateSampler::new(0),
            TerrainFields::new(0),
            8,
            cache(),
        )
    }

    #[test]
    fn test_origin_scenario_selects_plains() {
        let selector = fallback_selector(8);
        let climate = selector.climate().sample(0.0, 0.0);

        // plains: T .35·(1−.15/.45) + P .25·.5 + C 0 + E .15·(1−.15/.35) + W .05
        let plains = selector.catalog().lookup_by_name("plains").unwrap();
        let plains = selector.catalog().get(plains).unwrap();
        let expected_plains =
            0.35 * (1.0 - 0.15 / 0.45) + 0.25 * 0.5 + 0.15 * (1.0 - 0.15 / 0.35) + 0.05;
        assert!(
            (plains.fitness(&climate) - expected_plains).abs() < 1e-9,
            "plains fitness {} != {expected_plains}",
            plains.fitness(&climate)
        );

        // forest: T .35·(1−.15/.35) + P .25·(1−.225/.275) + C 0 + E .15 + W .05
        let forest = selector.catalog().lookup_by_name("forest").unwrap();
        let forest = selector.catalog().get(forest).unwrap();
        let expected_forest =
            0.35 * (1.0 - 0.15 / 0.35) + 0.25 * (1.0 - 0.225 / 0.275) + 0.15 + 0.05;
        assert!((forest.fitness(&climate) - expected_forest).abs() < 1e-9);

        for name in ["desert", "mountains", "ocean", "tundra", "swamp"] {
            let id = selector.catalog().lookup_by_name(name).unwrap();
            let biome = selector.catalog().get(id).unwrap();
            assert_eq!(biome.fitness(&climate), 0.0, "{name} must be out of range at origin");
        }

        assert_eq!(selector.select_at(0, 0).name, "plains");
    }

    #[test]
    fn test_no_valid_biome_falls_back_to_default() {
        let mut climate = ClimateRanges::default();
        climate.temperature = ClimateRange::new(0.9, 1.0);
        let mut selector = uniform_selector(
            BiomeDescriptor::new("fallback", BiomeKind::Plains).with_climate(climate),
        );
        selector
            .register(BiomeDescriptor::new("picky", BiomeKind::Desert).with_climate(climate))
            .unwrap();
        assert_eq!(selector.select_at(0, 0).name, "fallback");
    }

    #[test]
    fn test_ties_go_to_registration_order() {
        let mut selector = uniform_selector(BiomeDescriptor::new("first", BiomeKind::Plains));
        selector
            .register(BiomeDescriptor::new("second", BiomeKind::Forest))
            .unwrap();
        assert_eq!(selector.select_at(5, 5).name, "first");
    }

    #[test]
    fn test_select_at_deterministic_and_cached() {
        let selector = fallback_selector(8);
        let first: Vec<_> = (-20..20).map(|i| selector.select_at(i * 9, i * 4).id()).collect();
        assert!(selector.cached_selections() > 0);
        let second: Vec<_> = (-20..20).map(|i| selector.select_at(i * 9, i * 4).id()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_blend_radius_zero() {
        let selector = fallback_selector(8);
        for (x, z) in [(0, 0), (31, -7), (-250, 400)] {
            let blend = selector.blend(x, z, 0);
            assert_eq!(blend.blend_factor, 1.0);
            assert!(blend.neighbors.is_empty());
        }
    }

    #[test]
    fn test_blend_factor_formula() {
        let selector = fallback_selector(8);
        let mut saw_neighbors = false;
        for x in (-400..400).step_by(7) {
            let blend = selector.blend(x, 13, 16);
            let total = blend.total_neighbor_weight();
            assert!((blend.blend_factor - (1.0 - 0.5 * total)).abs() < 1e-12);
            assert!((0.0..=1.0).contains(&blend.blend_factor));
            for n in &blend.neighbors {
                assert_ne!(n.biome.id(), blend.primary.id());
                assert!((n.weight * 8.0 - (n.weight * 8.0).round()).abs() < 1e-12);
            }
            let mut ids: Vec<_> = blend.neighbors.iter().map(|n| n.biome.id()).collect();
            ids.dedup();
            assert_eq!(ids.len(), blend.neighbors.len(), "Neighbours must be merged by id");
            saw_neighbors |= !blend.neighbors.is_empty();
        }
        assert!(saw_neighbors, "Expected at least one biome border in the sweep");
    }

    #[test]
    fn test_uniform_world_blended_height_equals_primary() {
        let selector = uniform_selector(BiomeDescriptor::new("only", BiomeKind::Forest));
        for i in -10..10 {
            let (x, z) = (i * 17, i * -5);
            let expected = selector.select_at(x, z).height(x, z, selector.fields());
            assert_eq!(selector.blended_height(x, z), expected);
        }
    }

    #[test]
    fn test_blended_block_outside_band_is_primary() {
        let selector = fallback_selector(8);
        let column = selector.column(3, 3);
        let h = column.surface_height();
        let primary = column.primary();
        let deep = h - 40;
        assert_eq!(
            column.block_at(deep, selector.fields(), selector.seed()),
            primary.block_at(3, deep, 3, h, selector.fields())
        );
        assert_eq!(
            column.block_at(h + 30, selector.fields(), selector.seed()),
            BlockRef::AIR
        );
        assert_eq!(
            selector.blended_block_at(3, deep, 3),
            column.block_at(deep, selector.fields(), selector.seed())
        );
    }

    /// Column at `(4, -9)` whose blended surface sits at 64. Each neighbour
    /// is `(biome, weight, height)`.
    fn hand_built_column(
        primary: BiomeDescriptor,
        primary_height: f64,
        neighbors: Vec<(BiomeDescriptor, f64, f64)>,
    ) -> ColumnBlend {
        let (neighbors, neighbor_heights): (Vec<_>, Vec<_>) = neighbors
            .into_iter()
            .map(|(biome, weight, height)| {
                let neighbor = BlendNeighbor {
                    biome: Arc::new(biome),
                    weight,
                };
                (neighbor, height)
            })
            .unzip();
        ColumnBlend {
            x: 4,
            z: -9,
            blend: BlendResult {
                primary: Arc::new(primary),
                blend_factor: 1.0,
                neighbors,
            },
            primary_height,
            neighbor_heights,
            height: 64.0,
        }
    }

    fn sand(name: &str) -> BiomeDescriptor {
        BiomeDescriptor::new(name, BiomeKind::Desert)
    }

    fn grass(name: &str) -> BiomeDescriptor {
        BiomeDescriptor::new(name, BiomeKind::Plains)
    }

    #[test]
    fn test_full_weight_neighbor_substitutes_in_band() {
        let fields = TerrainFields::new(0);
        let column = hand_built_column(grass("p"), 64.0, vec![(sand("n"), 1.0, 64.0)]);
        for seed in 0..20 {
            assert_eq!(
                column.block_at(64, &fields, seed),
                BlockRef::SAND,
                "Weight 1.0 beats every draw"
            );
            assert_eq!(column.block_at(62, &fields, seed).name(), "sandstone");
        }
    }

    #[test]
    fn test_zero_weight_neighbor_never_substitutes() {
        let fields = TerrainFields::new(0);
        let column = hand_built_column(grass("p"), 64.0, vec![(sand("n"), 0.0, 64.0)]);
        let primary = grass("p");
        for y in 50..=64 {
            for seed in 0..5 {
                assert_eq!(
                    column.block_at(y, &fields, seed),
                    primary.block_at(4, y, -9, 64, &fields),
                    "Zero weight must never substitute at y={y}"
                );
            }
        }
    }

    #[test]
    fn test_air_and_water_pass_through_blending() {
        let fields = TerrainFields::new(0);
        let mut flooded = grass("p");
        flooded.subsurface_block = BlockRef::WATER;
        flooded.filler_block = BlockRef::AIR;
        let column = hand_built_column(flooded, 64.0, vec![(sand("n"), 1.0, 40.0)]);

        // Both cells lie inside the band and the neighbour window [37, 65].
        assert_eq!(column.block_at(62, &fields, 0), BlockRef::WATER);
        assert_eq!(column.block_at(50, &fields, 0), BlockRef::AIR);
        // The surface itself still blends.
        assert_eq!(column.block_at(64, &fields, 0), BlockRef::SAND);
    }

    #[test]
    fn test_neighbor_window_bounds_substitution() {
        let fields = TerrainFields::new(0);
        // Window is [min(66, 66) - 3, max(66, 66) + 1] = [63, 67]; the band
        // around the surface at 64 starts at 44.
        let column = hand_built_column(grass("p"), 66.0, vec![(sand("n"), 1.0, 66.0)]);

        assert_eq!(column.block_at(63, &fields, 0).name(), "sandstone");
        assert_eq!(
            column.block_at(62, &fields, 0),
            BlockRef::DIRT,
            "Below the neighbour window the primary decides"
        );
    }

    #[test]
    fn test_first_qualifying_neighbor_wins() {
        let fields = TerrainFields::new(0);
        let tundra = || BiomeDescriptor::new("cold", BiomeKind::Tundra);

        // Same block as the primary, then a losing weight: both are skipped.
        let column = hand_built_column(
            grass("p"),
            64.0,
            vec![
                (grass("twin"), 1.0, 64.0),
                (sand("unlucky"), 0.0, 64.0),
                (tundra(), 1.0, 64.0),
                (sand("late"), 1.0, 64.0),
            ],
        );
        assert_eq!(column.block_at(64, &fields, 0).name(), "snow_block");

        let column = hand_built_column(
            grass("p"),
            64.0,
            vec![(sand("early"), 1.0, 64.0), (tundra(), 1.0, 64.0)],
        );
        assert_eq!(column.block_at(64, &fields, 0), BlockRef::SAND);
    }

    #[test]
    fn test_register_clears_cache() {
        let mut selector = fallback_selector(8);
        selector.select_at(0, 0);
        assert!(selector.cached_selections() > 0);
        let mut climate = ClimateRanges::default();
        climate.temperature = ClimateRange::new(-0.05, 0.05);
        climate.precipitation = ClimateRange::new(0.45, 0.55);
        climate.erosion = ClimateRange::new(0.45, 0.55);
        let id = selector
            .register(BiomeDescriptor::new("meadow", BiomeKind::Plains).with_climate(climate))
            .unwrap();
        assert_eq!(selector.cached_selections(), 0);
        assert_eq!(selector.select_at(0, 0).id(), id, "New better-fitting biome must win");

        selector.unregister(id).unwrap();
        assert_eq!(selector.select_at(0, 0).name, "plains");
    }
}
