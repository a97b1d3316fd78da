//! Block references and the sparse per-chunk block map.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use glam::IVec3;
use hashbrown::HashMap;

/// Free-form key/value state attached to a block (orientation, age, variant...).
pub type BlockMetadata = BTreeMap<String, String>;

/// A reference to a block type, optionally carrying metadata.
///
/// Built-in names are `&'static str`, so cloning the common blocks never
/// allocates.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BlockRef {
    name: Cow<'static, str>,
    metadata: Option<Arc<BlockMetadata>>,
}

impl BlockRef {
    pub const AIR: Self = Self::from_static("air");
    pub const WATER: Self = Self::from_static("water");
    pub const BEDROCK: Self = Self::from_static("bedrock");
    pub const STONE: Self = Self::from_static("stone");
    pub const DIRT: Self = Self::from_static("dirt");
    pub const GRASS: Self = Self::from_static("grass_block");
    pub const SAND: Self = Self::from_static("sand");
    pub const GRAVEL: Self = Self::from_static("gravel");

    /// Creates a reference to a block with a static name and no metadata.
    pub const fn from_static(name: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            metadata: None,
        }
    }

    /// Creates a reference to a block with an owned name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            metadata: None,
        }
    }

    /// Returns a copy of this block carrying the given metadata.
    pub fn with_metadata(mut self, metadata: BlockMetadata) -> Self {
        self.metadata = Some(Arc::new(metadata));
        self
    }

    /// Block type name (e.g. `"stone"`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attached metadata, if any.
    pub fn metadata(&self) -> Option<&BlockMetadata> {
        self.metadata.as_deref()
    }

    /// Returns `true` for the air block.
    pub fn is_air(&self) -> bool {
        self.name == "air"
    }

    /// Returns `true` for water. Fluids are never blended or carved.
    pub fn is_water(&self) -> bool {
        self.name == "water"
    }
}

impl fmt::Display for BlockRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Sparse mapping from world block coordinates to blocks.
///
/// Only explicitly set positions are stored; absence means "default" to the
/// consuming layer. Writes overwrite, so later pipeline stages take
/// precedence over earlier ones.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChunkBlockMap {
    blocks: HashMap<IVec3, BlockRef>,
}

impl ChunkBlockMap {
    /// Creates an empty block map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the block at `pos`, replacing any previous block.
    pub fn set(&mut self, pos: IVec3, block: BlockRef) {
        self.blocks.insert(pos, block);
    }

    /// Returns the block at `pos`, if one was set.
    pub fn get(&self, pos: IVec3) -> Option<&BlockRef> {
        self.blocks.get(&pos)
    }

    /// Removes and returns the block at `pos`.
    pub fn remove(&mut self, pos: IVec3) -> Option<BlockRef> {
        self.blocks.remove(&pos)
    }

    /// Returns `true` if a block is set at `pos`.
    pub fn contains(&self, pos: IVec3) -> bool {
        self.blocks.contains_key(&pos)
    }

    /// Number of explicitly set positions.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns `true` if nothing has been set.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Iterates over all set positions in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&IVec3, &BlockRef)> {
        self.blocks.iter()
    }

    /// Counts the positions holding a block with the given name.
    pub fn count_named(&self, name: &str) -> usize {
        self.blocks.values().filter(|b| b.name() == name).count()
    }
}

impl Extend<(IVec3, BlockRef)> for ChunkBlockMap {
    fn extend<T: IntoIterator<Item = (IVec3, BlockRef)>>(&mut self, iter: T) {
        self.blocks.extend(iter);
    }
}
