//! Weighted Voronoi biome placement.
//!
//! Each grid cell of `16 * scale` blocks hosts one seed point whose offset and
//! biome are hashed from the cell coordinates. A query scans the 3×3 cells
//! around it, rescales distances by each candidate biome's size multiplier and
//! wobbles the query position with edge noise near cell borders. The result is
//! the owning biome plus an edge distance that later drives height blending.

use std::sync::Arc;

use crate::biome::{BiomeIndex, BiomeTable};
use crate::config::VoronoiSettings;
use crate::hashing::cell_hash;
use crate::noise::{NoiseChannel, SimplexGenerator};

const UNSET_DISTANCE: f64 = 999.0;

/// Resolved biome for one coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiomeSample {
    pub index: BiomeIndex,
    /// `|sqrt(d2_second) - sqrt(d2_nearest)|`; zero on a border.
    pub edge_distance: f64,
}

/// One Voronoi seed point, in world block coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub x: f64,
    pub z: f64,
    pub index: BiomeIndex,
}

#[derive(Debug, Clone)]
pub struct VoronoiBiomeField {
    table: Arc<BiomeTable>,
    settings: VoronoiSettings,
    primary_edge: SimplexGenerator,
    secondary_edge: SimplexGenerator,
}

impl VoronoiBiomeField {
    pub fn new(seed: u64, settings: VoronoiSettings, table: Arc<BiomeTable>) -> Self {
        Self {
            table,
            settings,
            primary_edge: SimplexGenerator::for_channel(NoiseChannel::PrimaryEdge, seed),
            secondary_edge: SimplexGenerator::for_channel(NoiseChannel::SecondaryEdge, seed),
        }
    }

    pub fn table(&self) -> &Arc<BiomeTable> {
        &self.table
    }

    pub fn settings(&self) -> &VoronoiSettings {
        &self.settings
    }

    /// Biome owning `(world_x, world_z)` for a table of `biome_count` entries.
    pub fn resolve(&self, world_x: i32, world_z: i32, biome_count: usize) -> BiomeSample {
        if biome_count == 0 {
            return BiomeSample {
                index: 0,
                edge_distance: 0.0,
            };
        }
        let x = world_x as f64;
        let z = world_z as f64;
        let candidates = self.candidates(x, z, biome_count);
        self.resolve_candidates(x, z, self.edge_noise(x, z), &candidates)
    }

    /// Biome owning `(world_x, world_z)` using the full table.
    pub fn sample(&self, world_x: i32, world_z: i32) -> BiomeSample {
        self.resolve(world_x, world_z, self.table.len())
    }

    /// Combined edge wobble at a position, before border scaling.
    pub fn edge_noise(&self, x: f64, z: f64) -> f64 {
        let s = &self.settings;
        let primary = self
            .primary_edge
            .sample_2d(x / s.primary_edge_scale + 100.0, z / s.primary_edge_scale + 100.0);
        let secondary = self
            .secondary_edge
            .sample_2d(x / s.secondary_edge_scale + 100.0, z / s.secondary_edge_scale + 100.0);
        primary * s.primary_edge_amplitude + secondary * s.secondary_edge_amplitude
    }

    fn cell_size(&self) -> f64 {
        16.0 * self.settings.scale.max(1) as f64
    }

    /// The nine seed points around a position, row by row from the north-west.
    pub fn candidates(&self, x: f64, z: f64, biome_count: usize) -> [Candidate; 9] {
        let cell = self.cell_size();
        let base_x = (x / cell).floor();
        let base_z = (z / cell).floor();
        let count = biome_count.max(1);

        let mut out = [Candidate {
            x: 0.0,
            z: 0.0,
            index: 0,
        }; 9];
        for (i, slot) in out.iter_mut().enumerate() {
            let grid_x = base_x + (i % 3) as f64 - 1.0;
            let grid_z = base_z + (i / 3) as f64 - 1.0;
            let (rx, rz) = cell_hash(grid_x, grid_z);
            let index = ((rx * count as f64).floor() as usize).min(count - 1);
            *slot = Candidate {
                x: (grid_x + rx) * cell,
                z: (grid_z + rz) * cell,
                index,
            };
        }
        out
    }

    /// Pick the owning biome among explicit candidates.
    ///
    /// Incompatible candidates have their distance inflated by the configured
    /// penalty while scanning. If the final nearest pair is still incompatible
    /// the nearest biome is swapped for a preferred neighbor, then for any
    /// compatible candidate distinct from the runner-up, and kept otherwise.
    pub fn resolve_candidates(
        &self,
        world_x: f64,
        world_z: f64,
        edge_noise: f64,
        candidates: &[Candidate],
    ) -> BiomeSample {
        let rules = self.table.compatibility();
        let enforce = self.settings.enforce_compatibility;
        let penalty = self.settings.effective_penalty();
        let base = self.cell_size();

        let mut n1 = UNSET_DISTANCE;
        let mut n2 = UNSET_DISTANCE;
        let mut nearest = candidates.first().map_or(0, |c| c.index);
        let mut second = nearest;

        for candidate in candidates {
            let size = self.table.size_multiplier(candidate.index);
            let scale = base * size;
            let px = world_x / scale;
            let pz = world_z / scale;
            let cx = candidate.x / scale;
            let cz = candidate.z / scale;

            let fx = px - px.floor() - 0.5;
            let fz = pz - pz.floor() - 0.5;
            let border = (0.5 - fx.abs()).min(0.5 - fz.abs());
            let offset = edge_noise * border;

            let dx = px + offset - cx;
            let dz = pz + offset - cz;
            let mut d2 = dx * dx + dz * dz;

            if enforce && n1 < UNSET_DISTANCE && !rules.are_compatible(candidate.index, nearest) {
                d2 *= penalty;
            }

            if d2 < n1 {
                n2 = n1;
                second = nearest;
                n1 = d2;
                nearest = candidate.index;
            } else if d2 < n2 {
                n2 = d2;
                second = candidate.index;
            }
        }

        let mut index = nearest;
        if enforce && !rules.are_compatible(nearest, second) {
            let preferred = rules.preferred_neighbors_of(nearest);
            index = candidates
                .iter()
                .map(|c| c.index)
                .find(|i| preferred.contains(i))
                .or_else(|| {
                    candidates
                        .iter()
                        .map(|c| c.index)
                        .find(|&i| i != second && rules.are_compatible(nearest, i))
                })
                .unwrap_or(nearest);
        }

        BiomeSample {
            index,
            edge_distance: (n2.sqrt() - n1.sqrt()).abs(),
        }
    }
}
