//! Biome definitions and the immutable biome table.
//!
//! A biome is plain data: base height, an ordered list of layer rules,
//! climate, Voronoi size factor and an optional decorator handle. The table
//! is built once, validated, and shared read-only between generator stages.

use std::sync::Arc;

use tracing::debug;

use crate::blocks;
use crate::chunk::{BlockId, ExternalBiomeId};
use crate::compat::CompatibilityRules;
use crate::decoration::{Decorator, PatchDecorator, PlantPatch};
use crate::error::BiomeTableError;

/// Dense index of a biome inside its [`BiomeTable`].
pub type BiomeIndex = usize;

/// Host biome ids written into chunk biome grids.
pub mod external {
    use crate::chunk::ExternalBiomeId;

    pub const PLAINS: ExternalBiomeId = 1;
    pub const SWAMPLAND: ExternalBiomeId = 6;
    pub const ROOFED_FOREST: ExternalBiomeId = 29;
    pub const FROZEN_PEAKS: ExternalBiomeId = 183;
}

/// Smallest accepted size multiplier.
pub const MIN_SIZE_MULTIPLIER: f64 = 0.1;
/// Largest accepted size multiplier.
pub const MAX_SIZE_MULTIPLIER: f64 = 5.0;

/// How a layer decides whether it owns a voxel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerRule {
    /// Absolute Y inside `[min, max]` (open ends allowed), at or above the surface.
    Absolute { min: Option<i32>, max: Option<i32> },
    /// The top `thickness` voxels of the column, surface included.
    RelativeTop { thickness: u32 },
    /// Depth below the surface inside `[min, max]`.
    RelativeRange { min: Option<i32>, max: Option<i32> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BiomeLayer {
    pub block: BlockId,
    pub rule: LayerRule,
}

impl BiomeLayer {
    pub fn absolute(block: BlockId, min: Option<i32>, max: Option<i32>) -> Self {
        Self {
            block,
            rule: LayerRule::Absolute { min, max },
        }
    }

    pub fn surface(block: BlockId, thickness: u32) -> Self {
        Self {
            block,
            rule: LayerRule::RelativeTop { thickness },
        }
    }

    pub fn relative_range(block: BlockId, min: Option<i32>, max: Option<i32>) -> Self {
        Self {
            block,
            rule: LayerRule::RelativeRange { min, max },
        }
    }

    pub fn matches(&self, y: i32, surface_y: i32) -> bool {
        let depth = surface_y - y;
        match self.rule {
            LayerRule::Absolute { min, max } => {
                min.map_or(true, |min| y >= min) && max.map_or(true, |max| y <= max) && depth <= 0
            }
            LayerRule::RelativeTop { thickness } => depth >= 0 && depth < thickness as i32,
            LayerRule::RelativeRange { min, max } => {
                min.map_or(true, |min| depth >= min) && max.map_or(true, |max| depth <= max)
            }
        }
    }
}

/// Temperature and humidity of a biome.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiomeClimate {
    pub temperature: f64,
    pub humidity: f64,
    pub rainy: bool,
    pub snowy: bool,
}

impl Default for BiomeClimate {
    fn default() -> Self {
        Self::temperate(0.5, 0.5)
    }
}

impl BiomeClimate {
    pub const fn new(temperature: f64, humidity: f64, rainy: bool, snowy: bool) -> Self {
        Self {
            temperature,
            humidity,
            rainy,
            snowy,
        }
    }

    pub const fn cold(humidity: f64) -> Self {
        Self::new(0.0, humidity, true, true)
    }

    pub const fn temperate(temperature: f64, humidity: f64) -> Self {
        Self::new(temperature, humidity, true, false)
    }

    pub const fn hot(humidity: f64) -> Self {
        Self::new(1.5, humidity, false, false)
    }

    pub const fn desert() -> Self {
        Self::new(2.0, 0.0, false, false)
    }

    pub const fn jungle() -> Self {
        Self::new(0.95, 0.9, true, false)
    }

    pub const fn ocean(temperature: f64) -> Self {
        Self::new(temperature, 1.0, true, false)
    }

    pub fn is_cold(&self) -> bool {
        self.temperature < 0.15
    }

    pub fn is_wet(&self) -> bool {
        self.humidity > 0.85
    }

    /// Temperature at `y`: drops 0.05 per 30 blocks above y=64, never below zero.
    pub fn variated_temperature(&self, y: i32) -> f64 {
        if y > 64 {
            let drop = (y - 64) as f64 * 0.05 / 30.0;
            (self.temperature - drop).max(0.0)
        } else {
            self.temperature
        }
    }

    pub fn should_snow_at(&self, y: i32) -> bool {
        if !self.rainy {
            return false;
        }
        self.snowy || self.variated_temperature(y) < 0.15
    }

    pub fn should_rain_at(&self, y: i32) -> bool {
        self.rainy && !self.should_snow_at(y)
    }
}

/// One biome definition. Immutable once placed in a table.
#[derive(Debug, Clone)]
pub struct Biome {
    name: String,
    height: i32,
    layers: Vec<BiomeLayer>,
    underground_block: BlockId,
    climate: BiomeClimate,
    external_id: Option<ExternalBiomeId>,
    size_multiplier: f64,
    decorator: Option<Arc<dyn Decorator>>,
}

impl Biome {
    pub fn new(name: impl Into<String>, height: i32) -> Self {
        Self {
            name: name.into(),
            height,
            layers: Vec::new(),
            underground_block: blocks::STONE,
            climate: BiomeClimate::default(),
            external_id: None,
            size_multiplier: 1.0,
            decorator: None,
        }
    }

    pub fn with_layers(mut self, layers: Vec<BiomeLayer>) -> Self {
        self.layers = layers;
        self
    }

    pub fn with_underground(mut self, block: BlockId) -> Self {
        self.underground_block = block;
        self
    }

    pub fn with_climate(mut self, climate: BiomeClimate) -> Self {
        self.climate = climate;
        self
    }

    pub fn with_external_id(mut self, id: ExternalBiomeId) -> Self {
        self.external_id = Some(id);
        self
    }

    /// Set the Voronoi size factor, clamped to `[0.1, 5.0]`.
    pub fn with_size_multiplier(mut self, multiplier: f64) -> Self {
        self.size_multiplier = if multiplier.is_nan() {
            1.0
        } else {
            multiplier.clamp(MIN_SIZE_MULTIPLIER, MAX_SIZE_MULTIPLIER)
        };
        self
    }

    pub fn with_decorator(mut self, decorator: Arc<dyn Decorator>) -> Self {
        self.decorator = Some(decorator);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn layers(&self) -> &[BiomeLayer] {
        &self.layers
    }

    pub fn underground_block(&self) -> BlockId {
        self.underground_block
    }

    pub fn climate(&self) -> &BiomeClimate {
        &self.climate
    }

    pub fn external_id(&self) -> Option<ExternalBiomeId> {
        self.external_id
    }

    pub fn size_multiplier(&self) -> f64 {
        self.size_multiplier
    }

    pub fn decorator(&self) -> Option<&Arc<dyn Decorator>> {
        self.decorator.as_ref()
    }

    /// First matching layer wins; otherwise the underground block.
    pub fn layer_block_at(&self, y: i32, surface_y: i32) -> BlockId {
        self.layers
            .iter()
            .find(|layer| layer.matches(y, surface_y))
            .map(|layer| layer.block)
            .unwrap_or(self.underground_block)
    }
}

/// Closed, validated catalog of biomes and their adjacency rules.
#[derive(Debug, Clone)]
pub struct BiomeTable {
    biomes: Vec<Biome>,
    compatibility: CompatibilityRules,
}

impl BiomeTable {
    /// Build a table from explicitly indexed biomes.
    ///
    /// Indices must be unique and cover `0..n` without gaps, names must be
    /// non-empty, and every compatibility rule must name a registered index.
    pub fn new(
        entries: Vec<(BiomeIndex, Biome)>,
        compatibility: CompatibilityRules,
    ) -> Result<Self, BiomeTableError> {
        if entries.is_empty() {
            return Err(BiomeTableError::Empty);
        }

        let mut entries = entries;
        entries.sort_by_key(|(index, _)| *index);
        for pair in entries.windows(2) {
            if pair[0].0 == pair[1].0 {
                return Err(BiomeTableError::DuplicateIndex(pair[0].0));
            }
        }
        for (expected, (found, biome)) in entries.iter().enumerate() {
            if *found != expected {
                return Err(BiomeTableError::NonDenseIndex {
                    expected,
                    found: *found,
                });
            }
            if biome.name.trim().is_empty() {
                return Err(BiomeTableError::EmptyName(expected));
            }
        }

        let count = entries.len();
        if let Some(index) = compatibility.referenced_indices().find(|&i| i >= count) {
            return Err(BiomeTableError::UnknownCompatibilityIndex { index, count });
        }

        let biomes: Vec<Biome> = entries.into_iter().map(|(_, biome)| biome).collect();
        debug!(biomes = biomes.len(), "Biome table registered");
        Ok(Self {
            biomes,
            compatibility,
        })
    }

    /// The five stock biomes with the swamp/peaks incompatibility.
    pub fn standard() -> Self {
        Self {
            biomes: standard_biomes(),
            compatibility: CompatibilityRules::standard(),
        }
    }

    pub fn len(&self) -> usize {
        self.biomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.biomes.is_empty()
    }

    pub fn get(&self, index: BiomeIndex) -> Option<&Biome> {
        self.biomes.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = (BiomeIndex, &Biome)> {
        self.biomes.iter().enumerate()
    }

    pub fn compatibility(&self) -> &CompatibilityRules {
        &self.compatibility
    }

    /// Size factor of `index`, or 1.0 when unregistered.
    pub fn size_multiplier(&self, index: BiomeIndex) -> f64 {
        self.get(index).map_or(1.0, Biome::size_multiplier)
    }

    /// Base height of `index`, or 0 when unregistered.
    pub fn base_height(&self, index: BiomeIndex) -> i32 {
        self.get(index).map_or(0, Biome::height)
    }
}

const FLOWERS: [BlockId; 4] = [
    blocks::DANDELION,
    blocks::POPPY,
    blocks::AZURE_BLUET,
    blocks::OXEYE_DAISY,
];
const MUSHROOMS: [BlockId; 2] = [blocks::BROWN_MUSHROOM, blocks::RED_MUSHROOM];

fn meadow_patches() -> Vec<PlantPatch> {
    vec![
        PlantPatch::new(FLOWERS.to_vec(), 0.15, 8, 3),
        PlantPatch::new(vec![blocks::BUSH], 0.2, 2, 3),
        PlantPatch::new(vec![blocks::FIREFLY_BUSH], 0.4, 4, 3).near_water(),
        PlantPatch::new(vec![blocks::TALL_GRASS], 0.5, 12, 7),
    ]
}

fn standard_biomes() -> Vec<Biome> {
    let mut plains_patches = meadow_patches();
    plains_patches.push(PlantPatch::new(vec![blocks::DOUBLE_TALL_GRASS], 0.2, 6, 4));

    let plains = Biome::new("Plains", 20)
        .with_layers(vec![
            BiomeLayer::absolute(blocks::SNOW, Some(120), None),
            BiomeLayer::surface(blocks::GRASS, 1),
            BiomeLayer::relative_range(blocks::STONE, Some(1), Some(5)),
        ])
        .with_climate(BiomeClimate::temperate(0.6, 0.4))
        .with_external_id(external::PLAINS)
        .with_size_multiplier(1.5)
        .with_decorator(Arc::new(PatchDecorator::new(plains_patches)));

    let oak_forest = Biome::new("Oak Forest", 25)
        .with_layers(vec![
            BiomeLayer::absolute(blocks::SNOW_LAYER, Some(130), None),
            BiomeLayer::absolute(blocks::GRASS, Some(100), Some(129)),
            BiomeLayer::surface(blocks::GRASS, 1),
            BiomeLayer::relative_range(blocks::STONE, Some(1), Some(3)),
        ])
        .with_climate(BiomeClimate::temperate(0.7, 0.6))
        .with_external_id(external::PLAINS)
        .with_size_multiplier(0.9)
        .with_decorator(Arc::new(PatchDecorator::new(meadow_patches())));

    let swamp = Biome::new("Swamp", 2)
        .with_layers(vec![
            BiomeLayer::surface(blocks::GRASS, 2),
            BiomeLayer::relative_range(blocks::STONE, Some(2), Some(4)),
        ])
        .with_climate(BiomeClimate::temperate(0.8, 0.3))
        .with_external_id(external::SWAMPLAND)
        .with_size_multiplier(0.4)
        .with_decorator(Arc::new(PatchDecorator::new(vec![PlantPatch::new(
            MUSHROOMS.to_vec(),
            0.2,
            3,
            3,
        )])));

    let spruce_peaks = Biome::new("Spruce Peaks", 80)
        .with_layers(vec![
            BiomeLayer::absolute(blocks::SNOW, Some(90), None),
            BiomeLayer::surface(blocks::GRASS, 1),
            BiomeLayer::relative_range(blocks::STONE, Some(1), Some(3)),
        ])
        .with_climate(BiomeClimate::cold(0.3))
        .with_external_id(external::FROZEN_PEAKS)
        .with_size_multiplier(1.5)
        .with_decorator(Arc::new(PatchDecorator::new(vec![
            PlantPatch::new(vec![blocks::FERN], 0.2, 4, 3),
            PlantPatch::new(vec![blocks::TALL_GRASS], 0.5, 9, 6),
            PlantPatch::new(vec![blocks::BROWN_MUSHROOM], 0.15, 4, 3),
            PlantPatch::new(vec![blocks::SWEET_BERRY_BUSH], 0.15, 4, 6),
        ])));

    let dark_oak_forest = Biome::new("Dark Oak Forest", 10)
        .with_layers(vec![
            BiomeLayer::absolute(blocks::SNOW, Some(90), None),
            BiomeLayer::surface(blocks::GRASS, 1),
            BiomeLayer::relative_range(blocks::STONE, Some(1), Some(3)),
        ])
        .with_climate(BiomeClimate::temperate(0.7, 0.8))
        .with_external_id(external::ROOFED_FOREST)
        .with_size_multiplier(1.0)
        .with_decorator(Arc::new(PatchDecorator::new(vec![
            PlantPatch::new(vec![blocks::TALL_GRASS], 0.3, 5, 3),
            PlantPatch::new(MUSHROOMS.to_vec(), 0.2, 3, 3),
            PlantPatch::new(FLOWERS.to_vec(), 0.15, 8, 3),
        ])));

    vec![plains, oak_forest, swamp, spruce_peaks, dark_oak_forest]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_table_shape() {
        let table = BiomeTable::standard();
        assert_eq!(table.len(), 5);
        let names: Vec<_> = table.iter().map(|(_, b)| b.name()).collect();
        assert_eq!(
            names,
            vec!["Plains", "Oak Forest", "Swamp", "Spruce Peaks", "Dark Oak Forest"]
        );
        assert_eq!(table.base_height(3), 80);
        assert_eq!(table.size_multiplier(2), 0.4);
        assert!(!table.compatibility().are_compatible(2, 3));
        assert!(table.iter().all(|(_, b)| b.decorator().is_some()));
    }

    #[test]
    fn test_unregistered_index_falls_back() {
        let table = BiomeTable::standard();
        assert!(table.get(9).is_none());
        assert_eq!(table.size_multiplier(9), 1.0);
        assert_eq!(table.base_height(9), 0);
    }

    #[test]
    fn test_size_multiplier_is_clamped() {
        assert_eq!(Biome::new("a", 0).with_size_multiplier(0.01).size_multiplier(), 0.1);
        assert_eq!(Biome::new("a", 0).with_size_multiplier(12.0).size_multiplier(), 5.0);
        assert_eq!(Biome::new("a", 0).with_size_multiplier(2.0).size_multiplier(), 2.0);
    }

    #[test]
    fn test_table_rejects_duplicate_index() {
        let err = BiomeTable::new(
            vec![(0, Biome::new("a", 1)), (0, Biome::new("b", 2))],
            CompatibilityRules::new(),
        )
        .unwrap_err();
        assert_eq!(err, BiomeTableError::DuplicateIndex(0));
    }

    #[test]
    fn test_table_rejects_gaps() {
        let err = BiomeTable::new(
            vec![(0, Biome::new("a", 1)), (2, Biome::new("b", 2))],
            CompatibilityRules::new(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            BiomeTableError::NonDenseIndex {
                expected: 1,
                found: 2
            }
        );
    }

    #[test]
    fn test_table_rejects_unknown_rule_index() {
        let err = BiomeTable::new(
            vec![(0, Biome::new("a", 1)), (1, Biome::new("b", 2))],
            CompatibilityRules::new().with_incompatibility(1, &[5]),
        )
        .unwrap_err();
        assert_eq!(
            err,
            BiomeTableError::UnknownCompatibilityIndex { index: 5, count: 2 }
        );
    }

    #[test]
    fn test_table_rejects_empty_input() {
        assert_eq!(
            BiomeTable::new(Vec::new(), CompatibilityRules::new()).unwrap_err(),
            BiomeTableError::Empty
        );
        assert_eq!(
            BiomeTable::new(vec![(0, Biome::new("  ", 1))], CompatibilityRules::new())
                .unwrap_err(),
            BiomeTableError::EmptyName(0)
        );
    }

    #[test]
    fn test_table_accepts_unordered_dense_entries() {
        let table = BiomeTable::new(
            vec![(1, Biome::new("b", 2)), (0, Biome::new("a", 1))],
            CompatibilityRules::new(),
        )
        .unwrap();
        assert_eq!(table.get(0).unwrap().name(), "a");
        assert_eq!(table.get(1).unwrap().name(), "b");
    }

    #[test]
    fn test_plains_layers() {
        let table = BiomeTable::standard();
        let plains = table.get(0).unwrap();
        let surface = 80;
        assert_eq!(plains.layer_block_at(80, surface), blocks::GRASS);
        assert_eq!(plains.layer_block_at(79, surface), blocks::STONE);
        assert_eq!(plains.layer_block_at(75, surface), blocks::STONE);
        assert_eq!(plains.layer_block_at(10, surface), blocks::STONE);
        // Snow caps high surfaces.
        assert_eq!(plains.layer_block_at(125, 125), blocks::SNOW);
        assert_eq!(plains.layer_block_at(124, 125), blocks::STONE);
    }

    #[test]
    fn test_swamp_surface_is_two_thick() {
        let table = BiomeTable::standard();
        let swamp = table.get(2).unwrap();
        assert_eq!(swamp.layer_block_at(60, 60), blocks::GRASS);
        assert_eq!(swamp.layer_block_at(59, 60), blocks::GRASS);
        assert_eq!(swamp.layer_block_at(58, 60), blocks::STONE);
        // Above the surface nothing matches.
        assert_eq!(swamp.layer_block_at(61, 60), blocks::STONE);
    }

    #[test]
    fn test_absolute_layer_requires_surface() {
        let layer = BiomeLayer::absolute(blocks::SNOW, Some(90), None);
        assert!(layer.matches(95, 95));
        assert!(layer.matches(96, 95));
        assert!(!layer.matches(94, 95));
        assert!(!layer.matches(89, 89));
    }

    #[test]
    fn test_relative_range_open_ends() {
        let layer = BiomeLayer::relative_range(blocks::DIRT, Some(2), None);
        assert!(!layer.matches(99, 100));
        assert!(layer.matches(98, 100));
        assert!(layer.matches(-50, 100));
    }

    #[test]
    fn test_climate_predicates() {
        let cold = BiomeClimate::cold(0.3);
        assert!(cold.is_cold());
        assert!(cold.should_snow_at(0));
        assert!(!cold.should_rain_at(0));

        let temperate = BiomeClimate::temperate(0.6, 0.4);
        assert!(!temperate.is_cold());
        assert!(temperate.should_rain_at(64));
        assert!(!temperate.should_snow_at(64));
        // 0.6 - 0.05 * (y - 64) / 30 drops below 0.15 near y = 335.
        assert!(temperate.should_snow_at(340));

        let desert = BiomeClimate::desert();
        assert!(!desert.should_rain_at(64));
        assert!(!desert.should_snow_at(400));

        assert!(BiomeClimate::jungle().is_wet());
        assert!(BiomeClimate::ocean(0.5).is_wet());
        assert!(!BiomeClimate::hot(0.3).is_wet());
    }

    #[test]
    fn test_variated_temperature() {
        let climate = BiomeClimate::temperate(0.5, 0.5);
        assert_eq!(climate.variated_temperature(64), 0.5);
        assert!((climate.variated_temperature(94) - 0.45).abs() < 1e-9);
        assert_eq!(climate.variated_temperature(10_000), 0.0);
    }
}
