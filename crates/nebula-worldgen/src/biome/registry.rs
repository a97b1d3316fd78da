//! Biome catalog contract and the in-tree [`BiomeRegistry`].

use std::fmt;
use std::sync::Arc;

use hashbrown::HashMap;
use tracing::debug;

use super::{BiomeDescriptor, BiomeKind, ClimateRange, ClimateRanges};
use crate::climate::ClimateAxis;

/// Unique identifier for a registered biome.
///
/// Ids are never reused, even after the biome is unregistered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BiomeId(pub u32);

impl BiomeId {
    /// Placeholder carried by descriptors that have not been registered.
    pub const UNASSIGNED: BiomeId = BiomeId(u32::MAX);
}

impl fmt::Display for BiomeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Errors raised by catalog mutations.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum BiomeCatalogError {
    /// A biome with this name is already registered.
    #[error("duplicate biome name: {0}")]
    DuplicateName(String),
    /// A climate range has `min > max`.
    #[error("biome {biome}: {axis} range [{min}, {max}] has min > max")]
    InvalidRange {
        biome: String,
        axis: ClimateAxis,
        min: f64,
        max: f64,
    },
    /// No biome with this id is registered.
    #[error("unknown biome id {0}")]
    UnknownBiome(BiomeId),
    /// The catalog default cannot be removed.
    #[error("cannot unregister default biome {0}")]
    DefaultBiome(String),
}

/// Source of biome descriptors.
///
/// Iteration order of [`all_biomes`](BiomeCatalog::all_biomes) is
/// registration order; selection breaks fitness ties by it.
pub trait BiomeCatalog: Send + Sync {
    /// Every registered biome, in registration order.
    fn all_biomes(&self) -> &[Arc<BiomeDescriptor>];

    /// Fallback biome used when no biome's ranges contain a climate sample.
    fn default_biome(&self) -> &Arc<BiomeDescriptor>;

    /// Registers a biome and assigns its id.
    ///
    /// # Errors
    ///
    /// Returns [`BiomeCatalogError::DuplicateName`] or
    /// [`BiomeCatalogError::InvalidRange`].
    fn register(&mut self, biome: BiomeDescriptor) -> Result<BiomeId, BiomeCatalogError>;

    /// Removes a biome, returning its descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`BiomeCatalogError::UnknownBiome`] or
    /// [`BiomeCatalogError::DefaultBiome`].
    fn unregister(&mut self, id: BiomeId) -> Result<Arc<BiomeDescriptor>, BiomeCatalogError>;

    fn get(&self, id: BiomeId) -> Option<&Arc<BiomeDescriptor>>;

    fn lookup_by_name(&self, name: &str) -> Option<BiomeId>;
}

/// The default is registered first and can never be removed, so it always
/// sits at the front.
const DEFAULT_INDEX: usize = 0;

/// Stores registered biome descriptors with name-based lookup.
pub struct BiomeRegistry {
    biomes: Vec<Arc<BiomeDescriptor>>,
    name_to_id: HashMap<String, BiomeId>,
    next_id: u32,
}

impl BiomeRegistry {
    /// Creates a registry containing only `default`, which becomes the
    /// catalog default.
    ///
    /// # Errors
    ///
    /// Returns [`BiomeCatalogError::InvalidRange`] if `default` has an
    /// inverted range.
    pub fn new(default: BiomeDescriptor) -> Result<Self, BiomeCatalogError> {
        let mut registry = Self {
            biomes: Vec::new(),
            name_to_id: HashMap::new(),
            next_id: 0,
        };
        registry.register(default)?;
        Ok(registry)
    }

    /// Returns the number of registered biomes.
    pub fn len(&self) -> usize {
        self.biomes.len()
    }

    /// Always `false`: the default biome cannot be removed.
    pub fn is_empty(&self) -> bool {
        self.biomes.is_empty()
    }

    fn index_of(&self, id: BiomeId) -> Option<usize> {
        self.biomes.iter().position(|b| b.id == id)
    }
}

impl BiomeCatalog for BiomeRegistry {
    fn all_biomes(&self) -> &[Arc<BiomeDescriptor>] {
        &self.biomes
    }

    fn default_biome(&self) -> &Arc<BiomeDescriptor> {
        &self.biomes[DEFAULT_INDEX]
    }

    fn register(&mut self, mut biome: BiomeDescriptor) -> Result<BiomeId, BiomeCatalogError> {
        if self.name_to_id.contains_key(&biome.name) {
            return Err(BiomeCatalogError::DuplicateName(biome.name));
        }
        if let Some((axis, range)) = biome.climate.first_invalid() {
            return Err(BiomeCatalogError::InvalidRange {
                biome: biome.name,
                axis,
                min: range.min,
                max: range.max,
            });
        }
        let id = BiomeId(self.next_id);
        self.next_id += 1;
        biome.id = id;
        debug!("Registered biome {} ({}) as {id}", biome.name, biome.kind);
        self.name_to_id.insert(biome.name.clone(), id);
        self.biomes.push(Arc::new(biome));
        Ok(id)
    }

    fn unregister(&mut self, id: BiomeId) -> Result<Arc<BiomeDescriptor>, BiomeCatalogError> {
        let index = self
            .index_of(id)
            .ok_or(BiomeCatalogError::UnknownBiome(id))?;
        if index == DEFAULT_INDEX {
            return Err(BiomeCatalogError::DefaultBiome(
                self.biomes[index].name.clone(),
            ));
        }
        let removed = self.biomes.remove(index);
        self.name_to_id.remove(&removed.name);
        debug!("Unregistered biome {} ({id})", removed.name);
        Ok(removed)
    }

    fn get(&self, id: BiomeId) -> Option<&Arc<BiomeDescriptor>> {
        self.index_of(id).map(|i| &self.biomes[i])
    }

    fn lookup_by_name(&self, name: &str) -> Option<BiomeId> {
        self.name_to_id.get(name).copied()
    }
}

impl fmt::Debug for BiomeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BiomeRegistry")
            .field(
                "biomes",
                &self.biomes.iter().map(|b| b.name.as_str()).collect::<Vec<_>>(),
            )
            .field("default", &self.default_biome().name)
            .finish()
    }
}

fn ranges(t: (f64, f64), p: (f64, f64), c: (f64, f64), e: (f64, f64)) -> ClimateRanges {
    ClimateRanges {
        temperature: ClimateRange::new(t.0, t.1),
        precipitation: ClimateRange::new(p.0, p.1),
        continentalness: ClimateRange::new(c.0, c.1),
        erosion: ClimateRange::new(e.0, e.1),
        weirdness: ClimateRange::SIGNED_ANY,
    }
}

/// The built-in overworld biome set, with `plains` as the default.
///
/// # Errors
///
/// Propagates registration errors; the built-in set registers cleanly.
pub fn default_biomes() -> Result<BiomeRegistry, BiomeCatalogError> {
    let plains = BiomeDescriptor::new("plains", BiomeKind::Plains)
        .with_climate(ranges((-0.3, 0.6), (0.2, 0.6), (0.3, 1.0), (0.3, 1.0)))
        .with_structure("village", 0.02)
        .with_structure("ruined_portal", 0.01)
        .with_structure("mineshaft", 0.01);
    let others = [
        BiomeDescriptor::new("forest", BiomeKind::Forest)
            .with_climate(ranges((-0.2, 0.5), (0.45, 1.0), (0.35, 1.0), (0.2, 0.8)))
            .with_structure("trail_ruins", 0.01)
            .with_structure("mineshaft", 0.01),
        BiomeDescriptor::new("desert", BiomeKind::Desert)
            .with_climate(ranges((0.5, 1.0), (0.0, 0.3), (0.3, 1.0), (0.2, 1.0)))
            .with_structure("desert_temple", 0.015)
            .with_structure("village", 0.01),
        BiomeDescriptor::new("mountains", BiomeKind::Mountains)
            .with_climate(ranges((-0.8, 0.6), (0.0, 1.0), (0.6, 1.0), (0.0, 0.35)))
            .with_structure("stronghold", 0.002)
            .with_structure("mineshaft", 0.02),
        BiomeDescriptor::new("ocean", BiomeKind::Ocean)
            .with_climate(ranges((-1.0, 1.0), (0.0, 1.0), (0.0, 0.3), (0.0, 1.0)))
            .with_structure("ocean_ruin", 0.03),
        BiomeDescriptor::new("tundra", BiomeKind::Tundra)
            .with_climate(ranges((-1.0, -0.3), (0.0, 0.7), (0.3, 1.0), (0.0, 1.0)))
            .with_structure("igloo", 0.01),
        BiomeDescriptor::new("swamp", BiomeKind::Swamp)
            .with_climate(ranges((0.0, 0.7), (0.65, 1.0), (0.3, 0.7), (0.5, 1.0)))
            .with_structure("witch_hut", 0.01),
    ];

    let mut registry = BiomeRegistry::new(plains)?;
    for biome in others {
        registry.register(biome)?;
    }
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> BiomeRegistry {
        BiomeRegistry::new(BiomeDescriptor::new("plains", BiomeKind::Plains)).unwrap()
    }

    #[test]
    fn test_register_and_lookup() {
        let mut reg = registry();
        let id = reg
            .register(BiomeDescriptor::new("forest", BiomeKind::Forest))
            .unwrap();
        assert_eq!(reg.lookup_by_name("forest"), Some(id));
        assert_eq!(reg.get(id).unwrap().name, "forest");
        assert_eq!(reg.get(id).unwrap().id(), id);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut reg = registry();
        let err = reg
            .register(BiomeDescriptor::new("plains", BiomeKind::Forest))
            .unwrap_err();
        assert_eq!(err, BiomeCatalogError::DuplicateName("plains".into()));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let mut reg = registry();
        let mut climate = ClimateRanges::default();
        climate.precipitation = ClimateRange::new(0.9, 0.1);
        let err = reg
            .register(BiomeDescriptor::new("broken", BiomeKind::Swamp).with_climate(climate))
            .unwrap_err();
        assert!(
            matches!(
                err,
                BiomeCatalogError::InvalidRange {
                    axis: ClimateAxis::Precipitation,
                    ..
                }
            ),
            "Expected InvalidRange on precipitation, got {err:?}"
        );
        assert_eq!(reg.lookup_by_name("broken"), None);
    }

    #[test]
    fn test_default_cannot_be_unregistered() {
        let mut reg = registry();
        let default_id = reg.default_biome().id();
        assert_eq!(
            reg.unregister(default_id).unwrap_err(),
            BiomeCatalogError::DefaultBiome("plains".into())
        );
    }

    #[test]
    fn test_unregister_preserves_order_and_default() {
        let mut reg = registry();
        let a = reg.register(BiomeDescriptor::new("a", BiomeKind::Forest)).unwrap();
        let _b = reg.register(BiomeDescriptor::new("b", BiomeKind::Desert)).unwrap();
        let removed = reg.unregister(a).unwrap();
        assert_eq!(removed.name, "a");
        let names: Vec<_> = reg.all_biomes().iter().map(|b| b.name.clone()).collect();
        assert_eq!(names, vec!["plains", "b"]);
        assert_eq!(reg.default_biome().name, "plains");
        assert_eq!(reg.unregister(a).unwrap_err(), BiomeCatalogError::UnknownBiome(a));
    }

    #[test]
    fn test_ids_not_reused() {
        let mut reg = registry();
        let a = reg.register(BiomeDescriptor::new("a", BiomeKind::Forest)).unwrap();
        reg.unregister(a).unwrap();
        let again = reg.register(BiomeDescriptor::new("a", BiomeKind::Forest)).unwrap();
        assert_ne!(a, again);
    }

    #[test]
    fn test_default_biomes_catalog() {
        let reg = default_biomes().unwrap();
        assert_eq!(reg.len(), BiomeKind::ALL.len());
        assert_eq!(reg.default_biome().name, "plains");
        for kind in BiomeKind::ALL {
            assert!(
                reg.lookup_by_name(kind.as_str()).is_some(),
                "Missing built-in biome {kind}"
            );
        }
    }
}
