//! Pairwise biome adjacency rules.

use std::collections::BTreeMap;

use crate::biome::BiomeIndex;

/// Symmetric incompatibility relation plus directed preferred-neighbor lists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompatibilityRules {
    incompatible: BTreeMap<BiomeIndex, Vec<BiomeIndex>>,
    preferred: BTreeMap<BiomeIndex, Vec<BiomeIndex>>,
}

impl CompatibilityRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rules for the standard biome table: swamp and spruce peaks never touch.
    pub fn standard() -> Self {
        let mut rules = Self::new();
        rules.add_incompatibility(2, &[3]);
        rules
    }

    /// Mark `biome` incompatible with every entry of `others`, in both directions.
    pub fn add_incompatibility(&mut self, biome: BiomeIndex, others: &[BiomeIndex]) {
        for &other in others {
            Self::insert_unique(self.incompatible.entry(biome).or_default(), other);
            Self::insert_unique(self.incompatible.entry(other).or_default(), biome);
        }
    }

    /// Replace the preferred-neighbor list of `biome`.
    pub fn set_preferred_neighbors(&mut self, biome: BiomeIndex, preferred: Vec<BiomeIndex>) {
        self.preferred.insert(biome, preferred);
    }

    pub fn with_incompatibility(mut self, biome: BiomeIndex, others: &[BiomeIndex]) -> Self {
        self.add_incompatibility(biome, others);
        self
    }

    pub fn with_preferred_neighbors(mut self, biome: BiomeIndex, preferred: Vec<BiomeIndex>) -> Self {
        self.set_preferred_neighbors(biome, preferred);
        self
    }

    fn insert_unique(list: &mut Vec<BiomeIndex>, value: BiomeIndex) {
        if !list.contains(&value) {
            list.push(value);
        }
    }

    pub fn are_compatible(&self, a: BiomeIndex, b: BiomeIndex) -> bool {
        self.incompatible
            .get(&a)
            .map_or(true, |list| !list.contains(&b))
    }

    pub fn incompatibles_of(&self, biome: BiomeIndex) -> &[BiomeIndex] {
        self.incompatible.get(&biome).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn preferred_neighbors_of(&self, biome: BiomeIndex) -> &[BiomeIndex] {
        self.preferred.get(&biome).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 0.0 for incompatible pairs, 1.0 for preferred neighbors, 0.5 otherwise.
    ///
    /// Biome resolution only consults [`Self::are_compatible`].
    pub fn compatibility_score(&self, a: BiomeIndex, b: BiomeIndex) -> f64 {
        if !self.are_compatible(a, b) {
            0.0
        } else if self.preferred_neighbors_of(a).contains(&b) {
            1.0
        } else {
            0.5
        }
    }

    /// Every biome index any rule mentions.
    pub fn referenced_indices(&self) -> impl Iterator<Item = BiomeIndex> + '_ {
        self.incompatible
            .iter()
            .chain(self.preferred.iter())
            .flat_map(|(key, values)| std::iter::once(*key).chain(values.iter().copied()))
    }
}
