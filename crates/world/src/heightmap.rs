//! Per-chunk surface heightmaps.
//!
//! Turns smoothed height offsets into absolute surface Y values and provides
//! the seam check used by the debug tooling.

use crate::chunk::{ChunkPos, CHUNK_SIZE_X, CHUNK_SIZE_Z};
use crate::height::HeightSmoother;

/// Default sea level.
pub const SEA_LEVEL: i32 = 64;

/// Largest surface step tolerated across a chunk border by [`check_seam_continuity`].
pub const MAX_BOUNDARY_DIFF: i32 = 20;

/// Heightmap for a single chunk (16x16).
///
/// Each value is the surface Y of that column: sea level plus the smoothed
/// height offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heightmap {
    /// Indexed as heights[z][x] for cache-friendly iteration.
    heights: [[i32; CHUNK_SIZE_X]; CHUNK_SIZE_Z],
}

impl Heightmap {
    /// Generate the heightmap of `chunk`.
    pub fn generate(smoother: &HeightSmoother, sea_level: i32, chunk: ChunkPos) -> Self {
        let smoothed = smoother.smoothed_chunk(chunk);
        let mut heights = [[0i32; CHUNK_SIZE_X]; CHUNK_SIZE_Z];
        for (local_z, row) in heights.iter_mut().enumerate() {
            for (local_x, cell) in row.iter_mut().enumerate() {
                *cell = sea_level + smoothed[local_x][local_z];
            }
        }
        Self { heights }
    }

    /// Surface Y at a local column.
    ///
    /// # Panics
    /// Panics if coordinates are out of bounds.
    pub fn get(&self, local_x: usize, local_z: usize) -> i32 {
        assert!(local_x < CHUNK_SIZE_X, "local_x out of bounds");
        assert!(local_z < CHUNK_SIZE_Z, "local_z out of bounds");
        self.heights[local_z][local_x]
    }

    pub fn heights(&self) -> &[[i32; CHUNK_SIZE_X]; CHUNK_SIZE_Z] {
        &self.heights
    }

    pub fn min_height(&self) -> i32 {
        self.heights
            .iter()
            .flat_map(|row| row.iter())
            .copied()
            .min()
            .unwrap_or(SEA_LEVEL)
    }

    pub fn max_height(&self) -> i32 {
        self.heights
            .iter()
            .flat_map(|row| row.iter())
            .copied()
            .max()
            .unwrap_or(SEA_LEVEL)
    }

    pub fn avg_height(&self) -> f32 {
        let sum: i64 = self
            .heights
            .iter()
            .flat_map(|row| row.iter())
            .map(|&h| h as i64)
            .sum();
        sum as f32 / (CHUNK_SIZE_X * CHUNK_SIZE_Z) as f32
    }
}

/// Largest surface difference along the shared border of two chunks.
///
/// Returns `None` when the chunks do not share an edge.
pub fn boundary_difference(
    smoother: &HeightSmoother,
    sea_level: i32,
    a: ChunkPos,
    b: ChunkPos,
) -> Option<i32> {
    let (first, second) = if (b.x - a.x, b.z - a.z) == (1, 0) || (b.x - a.x, b.z - a.z) == (0, 1) {
        (a, b)
    } else if (a.x - b.x, a.z - b.z) == (1, 0) || (a.x - b.x, a.z - b.z) == (0, 1) {
        (b, a)
    } else {
        return None;
    };

    let hm1 = Heightmap::generate(smoother, sea_level, first);
    let hm2 = Heightmap::generate(smoother, sea_level, second);

    if second.x == first.x + 1 {
        (0..CHUNK_SIZE_Z)
            .map(|z| (hm1.get(CHUNK_SIZE_X - 1, z) - hm2.get(0, z)).abs())
            .max()
    } else {
        (0..CHUNK_SIZE_X)
            .map(|x| (hm1.get(x, CHUNK_SIZE_Z - 1) - hm2.get(x, 0)).abs())
            .max()
    }
}

/// True when adjacent chunks meet without a step above [`MAX_BOUNDARY_DIFF`].
///
/// # Panics
/// Panics if the chunks are not adjacent.
pub fn check_seam_continuity(smoother: &HeightSmoother, sea_level: i32, a: ChunkPos, b: ChunkPos) -> bool {
    match boundary_difference(smoother, sea_level, a, b) {
        Some(diff) => diff <= MAX_BOUNDARY_DIFF,
        None => panic!("Chunks are not adjacent"),
    }
}
