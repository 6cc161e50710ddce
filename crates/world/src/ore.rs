//! Ore catalog and vein placement.
//!
//! Every draw comes from [`attempt_hash`] keyed by chunk, attempt index and
//! salt, so vein placement never touches the noise or RNG streams.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use crate::blocks;
use crate::chunk::{BlockId, Chunk, ChunkPos, CHUNK_SIZE_X, CHUNK_SIZE_Z};
use crate::error::OreCatalogError;
use crate::hashing::attempt_hash;
use crate::storage::ChunkAccess;

const STANDARD_ORES: &str = include_str!("../data/ores.json");

/// Ore entry as written in catalog files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OreDefinition {
    pub name: String,
    /// Registry name of the placed block.
    pub block: String,
    pub chance: f64,
    pub attempts: u32,
    pub vein_size: u32,
    pub min_height: i32,
    pub max_height: i32,
    pub optimal_min: i32,
    pub optimal_max: i32,
    pub optimal_multiplier: f64,
    /// `(height, multiplier)` pairs, any order.
    #[serde(default)]
    pub height_multipliers: Vec<(i32, f64)>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CatalogFile {
    ores: Vec<OreDefinition>,
}

/// Validated ore settings.
#[derive(Debug, Clone, PartialEq)]
pub struct OreSpec {
    pub name: String,
    pub block: BlockId,
    pub chance: f64,
    pub attempts: u32,
    pub vein_size: u32,
    pub min_height: i32,
    pub max_height: i32,
    pub optimal_min: i32,
    pub optimal_max: i32,
    pub optimal_multiplier: f64,
    /// Sorted by height, no duplicates.
    height_curve: Vec<(i32, f64)>,
}

impl OreSpec {
    pub fn from_definition(def: OreDefinition) -> Result<Self, OreCatalogError> {
        let block = blocks::by_name(&def.block).ok_or_else(|| OreCatalogError::UnknownBlock {
            ore: def.name.clone(),
            block: def.block.clone(),
        })?;
        if !(0.0..=1.0).contains(&def.chance) {
            return Err(OreCatalogError::InvalidChance {
                ore: def.name,
                chance: def.chance,
            });
        }
        if def.min_height > def.max_height {
            return Err(OreCatalogError::InvalidHeightWindow {
                ore: def.name,
                min: def.min_height,
                max: def.max_height,
            });
        }
        if def.optimal_min > def.optimal_max {
            return Err(OreCatalogError::InvalidOptimalWindow {
                ore: def.name,
                min: def.optimal_min,
                max: def.optimal_max,
            });
        }
        if def.vein_size == 0 {
            return Err(OreCatalogError::ZeroVeinSize(def.name));
        }

        let mut height_curve = def.height_multipliers;
        height_curve.sort_by_key(|(height, _)| *height);
        if let Some(pair) = height_curve.windows(2).find(|pair| pair[0].0 == pair[1].0) {
            return Err(OreCatalogError::DuplicateCurveHeight {
                ore: def.name,
                height: pair[0].0,
            });
        }

        Ok(Self {
            name: def.name,
            block,
            chance: def.chance,
            attempts: def.attempts,
            vein_size: def.vein_size,
            min_height: def.min_height,
            max_height: def.max_height,
            optimal_min: def.optimal_min,
            optimal_max: def.optimal_max,
            optimal_multiplier: def.optimal_multiplier,
            height_curve,
        })
    }

    pub fn height_curve(&self) -> &[(i32, f64)] {
        &self.height_curve
    }

    pub fn contains_height(&self, y: i32) -> bool {
        (self.min_height..=self.max_height).contains(&y)
    }

    /// Acceptance probability for a vein seeded at `y`.
    pub fn chance_at(&self, y: i32) -> f64 {
        if (self.optimal_min..=self.optimal_max).contains(&y) {
            self.chance * self.optimal_multiplier
        } else if !self.height_curve.is_empty() {
            self.chance * self.curve_multiplier(y)
        } else {
            self.chance
        }
    }

    /// Linear interpolation over the height curve.
    ///
    /// Heights past either end take the nearest defined value; an empty curve
    /// yields 1.0.
    pub fn curve_multiplier(&self, y: i32) -> f64 {
        let upper_idx = self.height_curve.partition_point(|(h, _)| *h < y);
        if let Some(&(h, m)) = self.height_curve.get(upper_idx) {
            if h == y {
                return m;
            }
        }
        let lower = upper_idx.checked_sub(1).map(|i| self.height_curve[i]);
        let upper = self.height_curve.get(upper_idx).copied();
        match (lower, upper) {
            (Some((lh, lm)), Some((uh, um))) => {
                let ratio = (y - lh) as f64 / (uh - lh) as f64;
                lm + (um - lm) * ratio
            }
            (Some((_, m)), None) | (None, Some((_, m))) => m,
            (None, None) => 1.0,
        }
    }
}

/// Immutable list of ore specs, run in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OreCatalog {
    specs: Vec<OreSpec>,
}

impl OreCatalog {
    pub fn new(definitions: Vec<OreDefinition>) -> Result<Self, OreCatalogError> {
        let specs = definitions
            .into_iter()
            .map(OreSpec::from_definition)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { specs })
    }

    /// Parse and validate a JSON catalog of the form `{"ores": [...]}`.
    pub fn from_json(json: &str) -> Result<Self, OreCatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::new(file.ores)
    }

    /// The bundled catalog: overworld ores plus stone-variant and dirt blobs.
    pub fn standard() -> Result<Self, OreCatalogError> {
        Self::from_json(STANDARD_ORES)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn specs(&self) -> &[OreSpec] {
        &self.specs
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&OreSpec> {
        self.specs.iter().find(|spec| spec.name == name)
    }
}

/// Result of growing one vein.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VeinOutcome {
    /// Offset draws consumed. Never above `vein_size * 3`.
    pub attempts_used: u32,
    pub placed: u32,
}

/// Totals for one chunk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OreReport {
    /// Accepted seeds that placed at least one block.
    pub veins: u32,
    pub blocks_placed: u32,
}

#[derive(Debug, Clone)]
pub struct OreVeinGenerator {
    catalog: Arc<OreCatalog>,
}

impl OreVeinGenerator {
    pub fn new(catalog: Arc<OreCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &OreCatalog {
        &self.catalog
    }

    /// Run every spec's attempts against chunk `pos`. A missing chunk is a no-op.
    #[instrument(skip(self, world), fields(cx = pos.x, cz = pos.z))]
    pub fn generate(&self, world: &mut dyn ChunkAccess, pos: ChunkPos) -> OreReport {
        let Some(chunk) = world.chunk_mut(pos) else {
            trace!("Chunk not resident, skipping ores");
            return OreReport::default();
        };

        let mut report = OreReport::default();
        for spec in self.catalog.specs() {
            for attempt in 0..spec.attempts {
                let Some((x, y, z)) = Self::accepted_seed(spec, pos, attempt) else {
                    continue;
                };
                let outcome = Self::grow_vein(chunk, spec, pos, attempt, (x, y, z));
                if outcome.placed > 0 {
                    report.veins += 1;
                    report.blocks_placed += outcome.placed;
                }
            }
        }

        debug!(veins = report.veins, placed = report.blocks_placed, "Ore pass complete");
        report
    }

    /// Seed position of one attempt, if its acceptance draw passes.
    pub fn accepted_seed(spec: &OreSpec, pos: ChunkPos, attempt: u32) -> Option<(usize, i32, usize)> {
        let draw = |salt: u32| attempt_hash(pos.x, pos.z, attempt, salt);
        let x = (draw(0) % CHUNK_SIZE_X as i64) as usize;
        let z = (draw(1) % CHUNK_SIZE_Z as i64) as usize;
        let span = (spec.max_height as i64 - spec.min_height as i64) + 1;
        let y = spec.min_height + (draw(2) % span) as i32;

        let roll = (draw(3) % 10_000) as f64 / 10_000.0;
        (roll < spec.chance_at(y)).then_some((x, y, z))
    }

    /// Grow a vein from `start`, replacing stone and deepslate only.
    ///
    /// Offsets that leave the chunk, the world or the spec's height window are
    /// skipped but still count as attempts.
    pub fn grow_vein(
        chunk: &mut Chunk,
        spec: &OreSpec,
        pos: ChunkPos,
        attempt: u32,
        start: (usize, i32, usize),
    ) -> VeinOutcome {
        let bounds = chunk.bounds();
        let offset = |salt: u32| (attempt_hash(pos.x, pos.z, attempt, salt) % 7) as i32 - 3;
        let max_attempts = spec.vein_size * 3;
        let mut outcome = VeinOutcome::default();

        while outcome.attempts_used < max_attempts && outcome.placed < spec.vein_size {
            let i = outcome.attempts_used;
            outcome.attempts_used += 1;

            let x = start.0 as i32 + offset(4 + i * 3);
            let y = start.1 + offset(5 + i * 3);
            let z = start.2 as i32 + offset(6 + i * 3);

            if !(0..CHUNK_SIZE_X as i32).contains(&x)
                || !(0..CHUNK_SIZE_Z as i32).contains(&z)
                || !bounds.contains(y)
                || !spec.contains_height(y)
            {
                continue;
            }

            let (x, z) = (x as usize, z as usize);
            if blocks::is_carvable(chunk.block(x, y, z)) {
                chunk.set_block(x, y, z, spec.block);
                outcome.placed += 1;
            }
        }
        outcome
    }
}
