use std::fmt;

use serde::{Deserialize, Serialize};

use crate::blocks;
use crate::error::GenerationError;

/// Chunk width (X axis) in voxels.
pub const CHUNK_SIZE_X: usize = 16;
/// Chunk depth (Z axis) in voxels.
pub const CHUNK_SIZE_Z: usize = 16;
/// Vertical resolution of the biome-id grid.
pub const BIOME_CELL_HEIGHT: i32 = 4;

/// Opaque block state token.
pub type BlockId = u16;
/// Biome id understood by the host world (not a biome table index).
pub type ExternalBiomeId = u16;

/// Vertical extent of the world. `min_y` is inclusive, `max_y` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldBounds {
    pub min_y: i32,
    pub max_y: i32,
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self {
            min_y: -64,
            max_y: 320,
        }
    }
}

impl WorldBounds {
    pub const fn new(min_y: i32, max_y: i32) -> Self {
        Self { min_y, max_y }
    }

    /// Reject empty ranges and heights the biome grid cannot tile.
    pub fn validate(self) -> Result<Self, GenerationError> {
        if self.min_y >= self.max_y || (self.max_y - self.min_y) % BIOME_CELL_HEIGHT != 0 {
            return Err(GenerationError::InvalidWorldBounds {
                min_y: self.min_y,
                max_y: self.max_y,
            });
        }
        Ok(self)
    }

    #[inline]
    pub fn contains(&self, y: i32) -> bool {
        y >= self.min_y && y < self.max_y
    }

    /// Number of voxel layers between the floor and the ceiling.
    pub fn height(&self) -> usize {
        (self.max_y - self.min_y).max(0) as usize
    }
}

/// Chunk-local position. `y` is an offset from the world floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocalPos {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl LocalPos {
    /// Convert to a linear index within the block array.
    pub fn index(self) -> usize {
        debug_assert!(self.x < CHUNK_SIZE_X);
        debug_assert!(self.z < CHUNK_SIZE_Z);
        (self.y * CHUNK_SIZE_Z + self.z) * CHUNK_SIZE_X + self.x
    }
}

/// Chunk coordinate (X,Z) in chunk space.
/// Implements Ord for deterministic iteration in BTreeMap/BTreeSet (sorts by x, then z).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

impl ChunkPos {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Chunk that owns the given world column.
    pub const fn containing(world_x: i32, world_z: i32) -> Self {
        Self {
            x: world_x >> 4,
            z: world_z >> 4,
        }
    }

    /// World X of the chunk's first column.
    #[inline]
    pub const fn origin_x(self) -> i32 {
        self.x << 4
    }

    /// World Z of the chunk's first column.
    #[inline]
    pub const fn origin_z(self) -> i32 {
        self.z << 4
    }

    /// The 3x3 neighborhood centred on this chunk, row by row along X.
    pub fn neighborhood(self) -> impl Iterator<Item = ChunkPos> {
        (-1..=1).flat_map(move |dx| (-1..=1).map(move |dz| ChunkPos::new(self.x + dx, self.z + dz)))
    }
}

impl fmt::Display for ChunkPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    /// Dirty flags set whenever chunk data changes.
    pub struct DirtyFlags: u8 {
        const BLOCKS = 0b0000_0001;
        const BIOMES = 0b0000_0010;
    }
}

impl Default for DirtyFlags {
    fn default() -> Self {
        DirtyFlags::empty()
    }
}

/// A 16-wide column stack between the world floor and ceiling.
pub struct Chunk {
    position: ChunkPos,
    bounds: WorldBounds,
    blocks: Vec<BlockId>,
    biomes: Vec<ExternalBiomeId>,
    dirty: DirtyFlags,
}

impl Chunk {
    /// Allocate a fresh chunk filled with air.
    pub fn new(position: ChunkPos, bounds: WorldBounds) -> Self {
        let layers = bounds.height();
        let cells = layers.div_ceil(BIOME_CELL_HEIGHT as usize);
        Self {
            position,
            bounds,
            blocks: vec![blocks::AIR; CHUNK_SIZE_X * CHUNK_SIZE_Z * layers],
            biomes: vec![0; CHUNK_SIZE_X * CHUNK_SIZE_Z * cells],
            dirty: DirtyFlags::all(),
        }
    }

    #[inline]
    pub fn position(&self) -> ChunkPos {
        self.position
    }

    #[inline]
    pub fn bounds(&self) -> WorldBounds {
        self.bounds
    }

    fn index(&self, x: usize, y: i32, z: usize) -> Option<usize> {
        if x >= CHUNK_SIZE_X || z >= CHUNK_SIZE_Z || !self.bounds.contains(y) {
            return None;
        }
        let y = (y - self.bounds.min_y) as usize;
        Some(LocalPos { x, y, z }.index())
    }

    fn biome_index(&self, x: usize, y: i32, z: usize) -> Option<usize> {
        if x >= CHUNK_SIZE_X || z >= CHUNK_SIZE_Z || !self.bounds.contains(y) {
            return None;
        }
        let cell = ((y - self.bounds.min_y) / BIOME_CELL_HEIGHT) as usize;
        Some((cell * CHUNK_SIZE_Z + z) * CHUNK_SIZE_X + x)
    }

    /// Block at a chunk-local column and world Y. Outside the chunk reads as air.
    pub fn block(&self, x: usize, y: i32, z: usize) -> BlockId {
        self.index(x, y, z)
            .map(|idx| self.blocks[idx])
            .unwrap_or(blocks::AIR)
    }

    /// Write a block, returning false when the position lies outside the chunk.
    pub fn set_block(&mut self, x: usize, y: i32, z: usize, id: BlockId) -> bool {
        let Some(idx) = self.index(x, y, z) else {
            return false;
        };
        if self.blocks[idx] != id {
            self.blocks[idx] = id;
            self.dirty.insert(DirtyFlags::BLOCKS);
        }
        true
    }

    /// Host biome id of the 4-high cell containing `y`.
    pub fn biome_id(&self, x: usize, y: i32, z: usize) -> Option<ExternalBiomeId> {
        self.biome_index(x, y, z).map(|idx| self.biomes[idx])
    }

    pub fn set_biome_id(&mut self, x: usize, y: i32, z: usize, id: ExternalBiomeId) -> bool {
        let Some(idx) = self.biome_index(x, y, z) else {
            return false;
        };
        if self.biomes[idx] != id {
            self.biomes[idx] = id;
            self.dirty.insert(DirtyFlags::BIOMES);
        }
        true
    }

    /// Iterate one column bottom to top as `(world_y, block)`.
    pub fn column(&self, x: usize, z: usize) -> impl Iterator<Item = (i32, BlockId)> + '_ {
        (self.bounds.min_y..self.bounds.max_y).map(move |y| (y, self.block(x, y, z)))
    }

    /// Highest non-air block in a column.
    pub fn top_block_y(&self, x: usize, z: usize) -> Option<i32> {
        (self.bounds.min_y..self.bounds.max_y)
            .rev()
            .find(|&y| self.block(x, y, z) != blocks::AIR)
    }

    /// Count voxels holding `id`.
    pub fn count(&self, id: BlockId) -> usize {
        self.blocks.iter().filter(|&&b| b == id).count()
    }

    /// Raw block storage, layer-major (y, then z, then x).
    pub fn blocks(&self) -> &[BlockId] {
        &self.blocks
    }

    /// Raw biome-id storage, one entry per 4-high cell per column.
    pub fn biome_ids(&self) -> &[ExternalBiomeId] {
        &self.biomes
    }

    /// Consume and return the current dirty flags.
    pub fn take_dirty_flags(&mut self) -> DirtyFlags {
        let flags = self.dirty;
        self.dirty = DirtyFlags::empty();
        flags
    }
}
