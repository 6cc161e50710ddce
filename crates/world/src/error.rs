//! Error types surfaced by catalog construction and chunk generation.

use thiserror::Error;

use crate::biome::BiomeIndex;

/// Failure raised while assembling a [`crate::BiomeTable`].
///
/// All of these are setup-time errors: a table that fails validation never
/// reaches a generation call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BiomeTableError {
    #[error("biome table is empty")]
    Empty,
    #[error("biome index {0} registered more than once")]
    DuplicateIndex(BiomeIndex),
    #[error("biome indices must be dense: expected {expected}, found {found}")]
    NonDenseIndex { expected: BiomeIndex, found: BiomeIndex },
    #[error("biome at index {0} has an empty name")]
    EmptyName(BiomeIndex),
    #[error("compatibility rule references unknown biome index {index} (table holds {count})")]
    UnknownCompatibilityIndex { index: BiomeIndex, count: usize },
}

/// Failure raised while loading or validating an [`crate::OreCatalog`].
#[derive(Debug, Error)]
pub enum OreCatalogError {
    #[error("failed to parse ore catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("ore `{ore}` references unknown block `{block}`")]
    UnknownBlock { ore: String, block: String },
    #[error("ore `{ore}` has chance {chance} outside [0, 1]")]
    InvalidChance { ore: String, chance: f64 },
    #[error("ore `{ore}` has height window [{min}, {max}]")]
    InvalidHeightWindow { ore: String, min: i32, max: i32 },
    #[error("ore `{ore}` has optimal window [{min}, {max}]")]
    InvalidOptimalWindow { ore: String, min: i32, max: i32 },
    #[error("ore `{0}` has a vein size of zero")]
    ZeroVeinSize(String),
    #[error("ore `{ore}` defines height {height} twice in its multiplier curve")]
    DuplicateCurveHeight { ore: String, height: i32 },
}

/// Failure raised by the generator itself.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("invalid world bounds: min_y {min_y}, max_y {max_y}")]
    InvalidWorldBounds { min_y: i32, max_y: i32 },
    #[error("world bounds {found:?} do not match generator bounds {expected:?}")]
    BoundsMismatch {
        expected: (i32, i32),
        found: (i32, i32),
    },
    #[error(transparent)]
    BiomeTable(#[from] BiomeTableError),
    #[error(transparent)]
    OreCatalog(#[from] OreCatalogError),
}
