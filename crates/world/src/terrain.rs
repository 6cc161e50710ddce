//! Terrain generation pipeline.
//!
//! Wires the biome field, smoothed heights, column filler, ore veins, cave
//! carver and decorators into a single per-chunk entry point.

use std::collections::BTreeSet;
use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, instrument, trace};

use crate::biome::{Biome, BiomeTable};
use crate::caves::{CaveCarver, CaveReport};
use crate::chunk::{ChunkPos, WorldBounds, CHUNK_SIZE_X, CHUNK_SIZE_Z};
use crate::column::ColumnFiller;
use crate::config::WorldgenSettings;
use crate::error::{BiomeTableError, GenerationError};
use crate::hashing::population_seed;
use crate::height::HeightSmoother;
use crate::ore::{OreCatalog, OreReport, OreVeinGenerator};
use crate::storage::ChunkAccess;
use crate::voronoi::BiomeSample;

/// Stride of the biome grid sampled before decoration.
const POPULATION_SAMPLE_STRIDE: usize = 4;

/// What one `generate_chunk` call did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChunkReport {
    pub columns_filled: usize,
    pub ores: OreReport,
    pub caves: CaveReport,
    pub aquifer_blocks: u32,
}

/// Deterministic chunk generator for one seed.
#[derive(Debug, Clone)]
pub struct TerrainGenerator {
    settings: WorldgenSettings,
    table: Arc<BiomeTable>,
    smoother: Arc<HeightSmoother>,
    columns: ColumnFiller,
    ores: OreVeinGenerator,
    caves: CaveCarver,
}

impl TerrainGenerator {
    /// Generator using the built-in biome table and ore catalog.
    pub fn new(settings: WorldgenSettings) -> Result<Self, GenerationError> {
        let ores = OreCatalog::standard()?;
        Self::with_catalogs(settings, Arc::new(BiomeTable::standard()), Arc::new(ores))
    }

    pub fn with_catalogs(
        settings: WorldgenSettings,
        table: Arc<BiomeTable>,
        ores: Arc<OreCatalog>,
    ) -> Result<Self, GenerationError> {
        settings.bounds.validate()?;
        if table.is_empty() {
            return Err(BiomeTableError::Empty.into());
        }

        let smoother = Arc::new(HeightSmoother::from_settings(
            settings.seed,
            settings.voronoi.clone(),
            settings.height.clone(),
            table.clone(),
        ));
        debug!(
            seed = settings.seed,
            biomes = table.len(),
            ores = ores.len(),
            "Terrain generator ready"
        );

        Ok(Self {
            columns: ColumnFiller::new(smoother.clone(), settings.sea_level),
            ores: OreVeinGenerator::new(ores),
            caves: CaveCarver::new(settings.seed, settings.caves.clone()),
            table,
            smoother,
            settings,
        })
    }

    pub fn settings(&self) -> &WorldgenSettings {
        &self.settings
    }

    pub fn seed(&self) -> u64 {
        self.settings.seed
    }

    pub fn bounds(&self) -> WorldBounds {
        self.settings.bounds
    }

    pub fn biome_table(&self) -> &Arc<BiomeTable> {
        &self.table
    }

    pub fn ore_catalog(&self) -> &OreCatalog {
        self.ores.catalog()
    }

    pub fn smoother(&self) -> &HeightSmoother {
        &self.smoother
    }

    /// Surface Y of a column: sea level plus the smoothed height.
    pub fn height_at(&self, world_x: i32, world_z: i32) -> i32 {
        self.settings.sea_level + self.smoother.smoothed_height(world_x, world_z)
    }

    pub fn biome_at(&self, world_x: i32, world_z: i32) -> BiomeSample {
        self.smoother.biome_at(world_x, world_z)
    }

    /// Run fill, ores, carving and aquifers for chunk `pos`.
    ///
    /// Only the target chunk is written; neighbours are never touched. A
    /// chunk that is not resident yields an empty report.
    #[instrument(skip(self, world), fields(cx = pos.x, cz = pos.z, world_seed = self.settings.seed))]
    pub fn generate_chunk(
        &self,
        world: &mut dyn ChunkAccess,
        pos: ChunkPos,
    ) -> Result<ChunkReport, GenerationError> {
        let found = world.bounds();
        if found != self.settings.bounds {
            let expected = self.settings.bounds;
            return Err(GenerationError::BoundsMismatch {
                expected: (expected.min_y, expected.max_y),
                found: (found.min_y, found.max_y),
            });
        }
        if world.chunk(pos).is_none() {
            trace!("Chunk not resident, nothing to generate");
            return Ok(ChunkReport::default());
        }

        let columns_filled = self.columns.fill(world, pos);
        let ores = self.ores.generate(world, pos);
        let caves = self.caves.carve(world, pos);
        let aquifer_blocks = self.caves.apply_aquifers(world, pos);

        let report = ChunkReport {
            columns_filled,
            ores,
            caves,
            aquifer_blocks,
        };
        debug!(
            veins = report.ores.veins,
            ore_blocks = report.ores.blocks_placed,
            carved = report.caves.blocks_carved,
            aquifer = report.aquifer_blocks,
            "Chunk generated"
        );
        Ok(report)
    }

    /// Biome indices found on the coarse population grid, ascending.
    pub fn biomes_in_chunk(&self, pos: ChunkPos) -> BTreeSet<usize> {
        let mut found = BTreeSet::new();
        for lx in (0..CHUNK_SIZE_X).step_by(POPULATION_SAMPLE_STRIDE) {
            for lz in (0..CHUNK_SIZE_Z).step_by(POPULATION_SAMPLE_STRIDE) {
                let sample = self.biome_at(pos.origin_x() + lx as i32, pos.origin_z() + lz as i32);
                found.insert(sample.index);
            }
        }
        found
    }

    /// Decorate chunk `pos`. Returns how many decorators ran.
    ///
    /// Decorators may write into resident neighbours; the stream is seeded
    /// from the chunk coordinates, so results do not depend on call order
    /// as long as the same neighbours are resident.
    #[instrument(skip(self, world), fields(cx = pos.x, cz = pos.z, world_seed = self.settings.seed))]
    pub fn populate(&self, world: &mut dyn ChunkAccess, pos: ChunkPos) -> usize {
        if world.chunk(pos).is_none() {
            trace!("Chunk not resident, skipping population");
            return 0;
        }

        let mut rng = ChaCha8Rng::seed_from_u64(population_seed(self.settings.seed, pos.x, pos.z));
        let height_at = |x: i32, z: i32| self.height_at(x, z);
        let mut ran = 0;

        for index in self.biomes_in_chunk(pos) {
            let Some(decorator) = self.table.get(index).and_then(Biome::decorator) else {
                continue;
            };
            decorator.decorate(world, &mut rng, pos, &height_at);
            ran += 1;
        }

        debug!(decorators = ran, "Chunk populated");
        ran
    }
}
