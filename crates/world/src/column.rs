//! Column assembly: bedrock floor, biome layers, deepslate band and sea fill.

use std::sync::Arc;

use tracing::{debug, instrument, trace};

use crate::biome::{external, Biome};
use crate::blocks;
use crate::chunk::{Chunk, ChunkPos, BIOME_CELL_HEIGHT, CHUNK_SIZE_X, CHUNK_SIZE_Z};
use crate::hashing::column_unit;
use crate::height::HeightSmoother;
use crate::storage::ChunkAccess;

/// Highest Y of the deepslate transition band.
pub const DEEPSLATE_BAND_TOP: i32 = 5;

/// Fills every column of a chunk from its smoothed surface height.
#[derive(Debug, Clone)]
pub struct ColumnFiller {
    smoother: Arc<HeightSmoother>,
    sea_level: i32,
}

impl ColumnFiller {
    pub fn new(smoother: Arc<HeightSmoother>, sea_level: i32) -> Self {
        Self { smoother, sea_level }
    }

    pub fn sea_level(&self) -> i32 {
        self.sea_level
    }

    /// Fill chunk `pos`. Returns the number of columns written; a missing
    /// chunk is a no-op.
    #[instrument(skip(self, world), fields(cx = pos.x, cz = pos.z))]
    pub fn fill(&self, world: &mut dyn ChunkAccess, pos: ChunkPos) -> usize {
        let Some(chunk) = world.chunk_mut(pos) else {
            trace!("Chunk not resident, skipping column fill");
            return 0;
        };

        let heights = self.smoother.smoothed_chunk(pos);
        let table = self.smoother.biome_field().table().clone();
        let mut filled = 0;

        for x in 0..CHUNK_SIZE_X {
            for z in 0..CHUNK_SIZE_Z {
                let world_x = pos.origin_x() + x as i32;
                let world_z = pos.origin_z() + z as i32;
                let sample = self.smoother.biome_at(world_x, world_z);
                let Some(biome) = table.get(sample.index) else {
                    trace!(index = sample.index, "Unregistered biome, column skipped");
                    continue;
                };
                let surface_y = self.sea_level + heights[x][z];
                self.fill_column(chunk, x, z, world_x, world_z, surface_y, biome);
                filled += 1;
            }
        }

        debug!(columns = filled, "Column fill complete");
        filled
    }

    #[allow(clippy::too_many_arguments)]
    fn fill_column(
        &self,
        chunk: &mut Chunk,
        x: usize,
        z: usize,
        world_x: i32,
        world_z: i32,
        surface_y: i32,
        biome: &Biome,
    ) {
        let bounds = chunk.bounds();

        let biome_id = biome.external_id().unwrap_or(external::PLAINS);
        for y in (bounds.min_y..bounds.max_y).step_by(BIOME_CELL_HEIGHT as usize) {
            chunk.set_biome_id(x, y, z, biome_id);
        }

        chunk.set_block(x, bounds.min_y, z, blocks::BEDROCK);

        for y in (bounds.min_y + 1)..=surface_y.min(bounds.max_y - 1) {
            let mut block = biome.layer_block_at(y, surface_y);
            if block == blocks::STONE && is_deepslate(world_x, world_z, y) {
                block = blocks::DEEPSLATE;
            }
            chunk.set_block(x, y, z, block);
        }

        if surface_y < self.sea_level {
            let start = (surface_y + 1).max(bounds.min_y);
            for y in start..=self.sea_level.min(bounds.max_y - 1) {
                let mut block = biome.layer_block_at(y, surface_y);
                if block == blocks::STONE {
                    block = blocks::WATER;
                }
                chunk.set_block(x, y, z, block);
            }
        }
    }
}

/// Whether stone at this voxel turns into deepslate.
///
/// Always below y=0; inside `0..=5` with probability `1 - y/5` from a
/// per-voxel hash.
pub fn is_deepslate(world_x: i32, world_z: i32, y: i32) -> bool {
    if y < 0 {
        return true;
    }
    if y > DEEPSLATE_BAND_TOP {
        return false;
    }
    let chance = 1.0 - y as f64 / DEEPSLATE_BAND_TOP as f64;
    column_unit(world_x, world_z, y) < chance
}
