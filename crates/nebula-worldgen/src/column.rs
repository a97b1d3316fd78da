//! Vertical column assembly: biome blocks up to the surface, water up to sea
//! level, and an optional bedrock floor.

use crate::biome::{ColumnBlend, TerrainFields};
use crate::block::BlockRef;

/// Turns a [`ColumnBlend`] into a bottom-up list of `(y, block)` pairs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColumnAssembler {
    min_y: i32,
    max_y: i32,
    sea_level: i32,
    bedrock: bool,
}

impl ColumnAssembler {
    pub fn new(min_y: i32, max_y: i32, sea_level: i32, bedrock: bool) -> Self {
        Self {
            min_y,
            max_y: max_y.max(min_y),
            sea_level,
            bedrock,
        }
    }

    pub fn min_y(&self) -> i32 {
        self.min_y
    }

    pub fn max_y(&self) -> i32 {
        self.max_y
    }

    pub fn sea_level(&self) -> i32 {
        self.sea_level
    }

    /// Blocks of one column in ascending `y`.
    ///
    /// Heights above `max_y` are cut off. Air returned by the biome is not
    /// emitted, so the list stays sparse.
    pub fn assemble(
        &self,
        column: &ColumnBlend,
        fields: &TerrainFields,
        seed: u64,
    ) -> Vec<(i32, BlockRef)> {
        let surface = column.surface_height().min(self.max_y);
        let water_top = self.sea_level.min(self.max_y);
        let capacity = (surface.max(water_top) - self.min_y + 1).max(0) as usize;
        let mut blocks = Vec::with_capacity(capacity);

        for y in self.min_y..=surface {
            let block = column.block_at(y, fields, seed);
            if !block.is_air() {
                blocks.push((y, block));
            }
        }
        if surface < water_top {
            let first = (surface + 1).max(self.min_y);
            blocks.extend((first..=water_top).map(|y| (y, BlockRef::WATER)));
        }

        if self.bedrock {
            match blocks.first_mut() {
                Some((y, block)) if *y == self.min_y => *block = BlockRef::BEDROCK,
                _ => blocks.insert(0, (self.min_y, BlockRef::BEDROCK)),
            }
        }
        blocks
    }
}
