//! Raw terrain height and its Gaussian smoothing.

use std::sync::Arc;

use crate::biome::{BiomeIndex, BiomeTable};
use crate::chunk::{ChunkPos, CHUNK_SIZE_X, CHUNK_SIZE_Z};
use crate::config::{HeightSettings, VoronoiSettings};
use crate::noise::{NoiseChannel, SimplexGenerator};
use crate::voronoi::{BiomeSample, VoronoiBiomeField};

/// Cubic Hermite ramp `3t² - 2t³` over `t` clamped to `[0, 1]`.
pub fn smoothstep(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Height offset above sea level for one biome sample.
#[derive(Debug, Clone)]
pub struct HeightField {
    table: Arc<BiomeTable>,
    settings: HeightSettings,
    primary: SimplexGenerator,
    secondary: SimplexGenerator,
}

impl HeightField {
    pub fn new(seed: u64, settings: HeightSettings, table: Arc<BiomeTable>) -> Self {
        Self {
            table,
            settings,
            primary: SimplexGenerator::for_channel(NoiseChannel::PrimaryHeight, seed),
            secondary: SimplexGenerator::for_channel(NoiseChannel::SecondaryHeight, seed),
        }
    }

    pub fn settings(&self) -> &HeightSettings {
        &self.settings
    }

    /// Combined two-octave noise offset at a column.
    pub fn noise_height(&self, world_x: i32, world_z: i32) -> f64 {
        let s = &self.settings;
        let x = world_x as f64;
        let z = world_z as f64;
        let primary = self
            .primary
            .sample_2d(x / s.primary_scale + 200.0, z / s.primary_scale + 200.0);
        let secondary = self.secondary.sample_2d(x / s.secondary_scale, z / s.secondary_scale);
        primary * s.primary_amplitude + secondary * s.secondary_amplitude
    }

    /// Unsmoothed height. Base height fades to zero at biome borders and the
    /// noise is damped there.
    pub fn height(&self, world_x: i32, world_z: i32, biome: BiomeIndex, edge_distance: f64) -> i32 {
        let smooth_edge = smoothstep(edge_distance);
        let base = self.table.base_height(biome) as f64 * smooth_edge;
        let noise = self.noise_height(world_x, world_z);
        (base + noise * (0.5 + 0.5 * smooth_edge.powf(1.5))).round() as i32
    }
}

/// Gaussian-weighted average of raw heights over a square window.
///
/// The result depends only on world coordinates, so neighbouring chunks agree
/// on every shared border.
#[derive(Debug, Clone)]
pub struct HeightSmoother {
    biomes: VoronoiBiomeField,
    heights: HeightField,
    radius: i32,
    kernel: Vec<f64>,
}

impl HeightSmoother {
    pub fn new(biomes: VoronoiBiomeField, heights: HeightField) -> Self {
        let radius = heights.settings().smoothing_radius.min(64) as i32;
        Self {
            kernel: gaussian_kernel(radius),
            biomes,
            heights,
            radius,
        }
    }

    /// Build the field pair from settings sharing one table.
    pub fn from_settings(
        seed: u64,
        voronoi: VoronoiSettings,
        height: HeightSettings,
        table: Arc<BiomeTable>,
    ) -> Self {
        Self::new(
            VoronoiBiomeField::new(seed, voronoi, table.clone()),
            HeightField::new(seed, height, table),
        )
    }

    pub fn biome_field(&self) -> &VoronoiBiomeField {
        &self.biomes
    }

    pub fn height_field(&self) -> &HeightField {
        &self.heights
    }

    pub fn radius(&self) -> i32 {
        self.radius
    }

    /// Upper bound on the height change between adjacent smoothed columns
    /// when every biome has zero base height.
    pub fn noise_budget(&self) -> f64 {
        let h = self.heights.settings();
        let v = self.biomes.settings();
        h.primary_amplitude.abs()
            + h.secondary_amplitude.abs()
            + v.primary_edge_amplitude.abs()
            + v.secondary_edge_amplitude.abs()
    }

    pub fn biome_at(&self, world_x: i32, world_z: i32) -> BiomeSample {
        self.biomes.sample(world_x, world_z)
    }

    /// Full biome-then-height pipeline for one column.
    pub fn raw_height(&self, world_x: i32, world_z: i32) -> i32 {
        let sample = self.biome_at(world_x, world_z);
        self.heights
            .height(world_x, world_z, sample.index, sample.edge_distance)
    }

    /// Smoothed height offset at one column. Costs `(2r + 1)²` raw samples.
    pub fn smoothed_height(&self, world_x: i32, world_z: i32) -> i32 {
        self.smooth(world_x, world_z, |x, z| self.raw_height(x, z))
    }

    /// Smoothed heights for a whole chunk, indexed `[x][z]`.
    ///
    /// Samples each raw column of the padded window once; results equal
    /// [`Self::smoothed_height`] column for column.
    pub fn smoothed_chunk(&self, chunk: ChunkPos) -> [[i32; CHUNK_SIZE_Z]; CHUNK_SIZE_X] {
        let r = self.radius;
        let span = CHUNK_SIZE_X as i32 + 2 * r;
        let min_x = chunk.origin_x() - r;
        let min_z = chunk.origin_z() - r;

        let mut raw = Vec::with_capacity((span * span) as usize);
        for dx in 0..span {
            for dz in 0..span {
                raw.push(self.raw_height(min_x + dx, min_z + dz));
            }
        }
        let lookup = |x: i32, z: i32| raw[((x - min_x) * span + (z - min_z)) as usize];

        let mut out = [[0; CHUNK_SIZE_Z]; CHUNK_SIZE_X];
        for (lx, row) in out.iter_mut().enumerate() {
            for (lz, slot) in row.iter_mut().enumerate() {
                let x = chunk.origin_x() + lx as i32;
                let z = chunk.origin_z() + lz as i32;
                *slot = self.smooth(x, z, lookup);
            }
        }
        out
    }

    fn smooth(&self, world_x: i32, world_z: i32, raw: impl Fn(i32, i32) -> i32) -> i32 {
        let r = self.radius;
        if r == 0 {
            return raw(world_x, world_z);
        }

        let width = (2 * r + 1) as usize;
        let mut total = 0.0;
        let mut weight_sum = 0.0;
        for dx in -r..=r {
            for dz in -r..=r {
                let weight = self.kernel[(dx + r) as usize * width + (dz + r) as usize];
                total += raw(world_x + dx, world_z + dz) as f64 * weight;
                weight_sum += weight;
            }
        }

        if weight_sum <= 0.0 || !weight_sum.is_finite() {
            return raw(world_x, world_z);
        }
        (total / weight_sum).round() as i32
    }
}

fn gaussian_kernel(radius: i32) -> Vec<f64> {
    if radius == 0 {
        return vec![1.0];
    }
    let sigma = radius as f64 / 2.0;
    let denom = 2.0 * sigma * sigma;
    let mut kernel = Vec::with_capacity(((2 * radius + 1) * (2 * radius + 1)) as usize);
    for dx in -radius..=radius {
        for dz in -radius..=radius {
            kernel.push((-((dx * dx + dz * dz) as f64) / denom).exp());
        }
    }
    kernel
}
