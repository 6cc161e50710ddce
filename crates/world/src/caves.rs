//! Worm tunnels, caverns and the aquifer pass.
//!
//! Caves are regional: every chunk in the 3×3 neighborhood of the target
//! reseeds its own stream and replays its tunnels and caverns, but only
//! voxels inside the target chunk are ever written. A chunk therefore carves
//! the same way regardless of which neighbors exist or were generated first.

use std::f64::consts::PI;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, instrument, trace};

use crate::blocks;
use crate::chunk::{Chunk, ChunkPos, CHUNK_SIZE_X, CHUNK_SIZE_Z};
use crate::config::CaveSettings;
use crate::hashing::region_seed;
use crate::noise::{NoiseChannel, NoiseConfig, SimplexGenerator};
use crate::storage::ChunkAccess;

const TUNNEL_ATTEMPTS_MIN: u32 = 6;
const TUNNEL_ATTEMPTS_SPREAD: u32 = 8;

const WORM_YAW_STRENGTH: f64 = 0.35;
const WORM_PITCH_STRENGTH: f64 = 0.22;
const WORM_MAX_PITCH: f64 = 0.46;
const WORM_SPEED: f64 = 0.95;
const WORM_MIN_RADIUS: f64 = 1.1;

const BRANCH_CHANCE: f64 = 0.03;
const BRANCH_MIN_STEP: u32 = 30;
const CHAMBER_CHANCE: f64 = 0.006;
const CHAMBER_MIN_STEP: u32 = 40;

const BRANCH_YAW_STRENGTH: f64 = 0.22;
const BRANCH_PITCH_STRENGTH: f64 = 0.15;
const BRANCH_MAX_PITCH: f64 = 0.35;
const BRANCH_MIN_RADIUS: f64 = 0.9;

/// Offset of the pitch sample in the flow field.
const FLOW_DECORRELATION: f64 = 1000.0;

/// Per-chunk carving totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaveReport {
    pub tunnels: u32,
    pub caverns: u32,
    pub blocks_carved: u32,
}

/// Removes stone and deepslate along noise-steered worms and around caverns.
#[derive(Debug, Clone)]
pub struct CaveCarver {
    seed: u64,
    settings: CaveSettings,
    flow: SimplexGenerator,
}

impl CaveCarver {
    pub fn new(seed: u64, settings: CaveSettings) -> Self {
        let flow = SimplexGenerator::new(NoiseConfig::cave_flow(
            NoiseChannel::CaveFlow.seed(seed),
            settings.flow_scale,
        ));
        Self { seed, settings, flow }
    }

    pub fn settings(&self) -> &CaveSettings {
        &self.settings
    }

    /// Carve every tunnel and cavern that reaches chunk `pos`.
    ///
    /// A missing chunk is a no-op.
    #[instrument(skip(self, world), fields(cx = pos.x, cz = pos.z, world_seed = self.seed))]
    pub fn carve(&self, world: &mut dyn ChunkAccess, pos: ChunkPos) -> CaveReport {
        let Some(chunk) = world.chunk_mut(pos) else {
            trace!("Chunk not resident, skipping caves");
            return CaveReport::default();
        };

        let mut report = CaveReport::default();
        for region in pos.neighborhood() {
            let mut run = CaveRun {
                rng: ChaCha8Rng::seed_from_u64(region_seed(self.seed, region.x, region.z)),
                flow: &self.flow,
                settings: &self.settings,
                chunk: &mut *chunk,
                carved: 0,
            };
            let (tunnels, caverns) = run.region(region);
            report.tunnels += tunnels;
            report.caverns += caverns;
            report.blocks_carved += run.carved;
        }

        debug!(
            tunnels = report.tunnels,
            caverns = report.caverns,
            carved = report.blocks_carved,
            "Cave pass complete"
        );
        report
    }

    /// Flood air between the lava floor and the lava level. Returns the
    /// number of voxels filled; a missing chunk is a no-op.
    #[instrument(skip(self, world), fields(cx = pos.x, cz = pos.z))]
    pub fn apply_aquifers(&self, world: &mut dyn ChunkAccess, pos: ChunkPos) -> u32 {
        let Some(chunk) = world.chunk_mut(pos) else {
            trace!("Chunk not resident, skipping aquifers");
            return 0;
        };

        let mut filled = 0;
        for x in 0..CHUNK_SIZE_X {
            for z in 0..CHUNK_SIZE_Z {
                for y in (self.settings.lava_min_y..=self.settings.lava_level).rev() {
                    if chunk.block(x, y, z) == blocks::AIR && chunk.set_block(x, y, z, blocks::LAVA) {
                        filled += 1;
                    }
                }
            }
        }
        debug!(filled, "Aquifer pass complete");
        filled
    }
}

/// Clear stone and deepslate within `radius` of `center`, clipped to the
/// chunk's columns and to `y_band`. Returns the number of voxels cleared.
pub fn carve_sphere(chunk: &mut Chunk, center: (i32, i32, i32), radius: f64, y_band: (i32, i32)) -> u32 {
    let (cx, cy, cz) = center;
    let base_x = chunk.position().origin_x();
    let base_z = chunk.position().origin_z();
    let reach = radius.ceil() as i32;
    let radius_sq = radius * radius;

    let min_x = (cx - reach - base_x).max(0);
    let max_x = (cx + reach - base_x).min(CHUNK_SIZE_X as i32 - 1);
    let min_y = (cy - reach).max(y_band.0);
    let max_y = (cy + reach).min(y_band.1);
    let min_z = (cz - reach - base_z).max(0);
    let max_z = (cz + reach - base_z).min(CHUNK_SIZE_Z as i32 - 1);

    let mut carved = 0;
    for x in min_x..=max_x {
        for y in min_y..=max_y {
            for z in min_z..=max_z {
                let dx = (base_x + x - cx) as f64;
                let dy = (y - cy) as f64;
                let dz = (base_z + z - cz) as f64;
                if dx * dx + dy * dy + dz * dz > radius_sq {
                    continue;
                }
                let (lx, lz) = (x as usize, z as usize);
                if blocks::is_carvable(chunk.block(lx, y, lz)) && chunk.set_block(lx, y, lz, blocks::AIR) {
                    carved += 1;
                }
            }
        }
    }
    carved
}

/// Uniform draw in `0..bound`, or 0 for an empty range.
fn bounded(rng: &mut ChaCha8Rng, bound: i32) -> i32 {
    if bound <= 0 {
        0
    } else {
        rng.gen_range(0..bound)
    }
}

/// Replay of one region's stream against the target chunk.
struct CaveRun<'a> {
    rng: ChaCha8Rng,
    flow: &'a SimplexGenerator,
    settings: &'a CaveSettings,
    chunk: &'a mut Chunk,
    carved: u32,
}

impl CaveRun<'_> {
    fn region(&mut self, region: ChunkPos) -> (u32, u32) {
        let mut tunnels = 0;
        let mut caverns = 0;

        let attempts = TUNNEL_ATTEMPTS_MIN as i32 + bounded(&mut self.rng, TUNNEL_ATTEMPTS_SPREAD as i32);
        for _ in 0..attempts {
            if self.rng.gen::<f64>() < self.settings.cave_frequency {
                let start = self.start_point(region);
                self.worm(start);
                tunnels += 1;
            }
        }

        if self.rng.gen::<f64>() < self.settings.cavern_frequency {
            let center = self.start_point(region);
            self.cavern(center);
            caverns += 1;
        }
        (tunnels, caverns)
    }

    fn start_point(&mut self, region: ChunkPos) -> (i32, i32, i32) {
        let band = self.settings.max_cave_y - self.settings.min_cave_y;
        let x = region.origin_x() + bounded(&mut self.rng, CHUNK_SIZE_X as i32);
        let y = self.settings.min_cave_y + bounded(&mut self.rng, band);
        let z = region.origin_z() + bounded(&mut self.rng, CHUNK_SIZE_Z as i32);
        (x, y, z)
    }

    fn sphere(&mut self, x: f64, y: f64, z: f64, radius: f64) {
        let center = (x.round() as i32, y.round() as i32, z.round() as i32);
        let band = (self.settings.min_cave_y, self.settings.max_cave_y);
        self.carved += carve_sphere(&mut *self.chunk, center, radius, band);
    }

    fn flow_at(&self, x: f64, y: f64, z: f64) -> (f64, f64) {
        let d = FLOW_DECORRELATION;
        (
            self.flow.sample_3d(x, y, z),
            self.flow.sample_3d(x + d, y + d, z + d),
        )
    }

    fn worm(&mut self, start: (i32, i32, i32)) {
        let s = self.settings;
        let spread = s.tunnel_length_max as i32 - s.tunnel_length_min as i32;
        let length = s.tunnel_length_min + bounded(&mut self.rng, spread) as u32;

        let (mut x, mut y, mut z) = (start.0 as f64, start.1 as f64, start.2 as f64);
        let mut yaw = self.rng.gen::<f64>() * PI * 2.0;
        let mut pitch = (self.rng.gen::<f64>() - 0.5) * 0.25;

        let floor = (s.min_cave_y + 2) as f64;
        let ceiling = (s.max_cave_y - 2) as f64;

        for i in 0..length {
            let progress = i as f64 / length as f64;
            let base_radius = 1.9 + self.rng.gen::<f64>() * 1.9;
            let variation = (progress * PI * 2.4).sin() * 0.35 + (self.rng.gen::<f64>() - 0.5) * 0.4;
            self.sphere(x, y, z, (base_radius + variation).max(WORM_MIN_RADIUS));

            let (noise_yaw, noise_pitch) = self.flow_at(x, y, z);
            yaw += noise_yaw * WORM_YAW_STRENGTH;
            pitch = (pitch + noise_pitch * WORM_PITCH_STRENGTH).clamp(-WORM_MAX_PITCH, WORM_MAX_PITCH);

            x += yaw.cos() * pitch.cos() * WORM_SPEED;
            y += pitch.sin() * WORM_SPEED;
            z += yaw.sin() * pitch.cos() * WORM_SPEED;

            if y < floor {
                y = floor;
                pitch = pitch.abs();
            } else if y > ceiling {
                y = ceiling;
                pitch = -pitch.abs();
            }

            if self.rng.gen::<f64>() < BRANCH_CHANCE && i > BRANCH_MIN_STEP {
                let branch_length = 100 + bounded(&mut self.rng, 140) as u32;
                self.branch(x, y, z, branch_length);
            }
            if self.rng.gen::<f64>() < CHAMBER_CHANCE && i > CHAMBER_MIN_STEP {
                self.chamber(x, y, z);
            }
        }
    }

    fn branch(&mut self, mut x: f64, mut y: f64, mut z: f64, length: u32) {
        let mut yaw = self.rng.gen::<f64>() * PI * 2.0;
        let mut pitch = (self.rng.gen::<f64>() - 0.5) * 0.3;

        for i in 0..length {
            let progress = i as f64 / length as f64;
            let radius = 2.1 - progress * 0.55 + (self.rng.gen::<f64>() - 0.5) * 0.38;
            self.sphere(x, y, z, radius.max(BRANCH_MIN_RADIUS));

            let (noise_yaw, noise_pitch) = self.flow_at(x, y, z);
            yaw += noise_yaw * BRANCH_YAW_STRENGTH;
            pitch = (pitch + noise_pitch * BRANCH_PITCH_STRENGTH).clamp(-BRANCH_MAX_PITCH, BRANCH_MAX_PITCH);

            let speed = 0.7 + self.rng.gen::<f64>() * 0.35;
            x += yaw.cos() * pitch.cos() * speed;
            y += pitch.sin() * speed;
            z += yaw.sin() * pitch.cos() * speed;
        }
    }

    fn chamber(&mut self, x: f64, y: f64, z: f64) {
        let size = (4 + bounded(&mut self.rng, 6)) as f64;
        let spheres = 2 + bounded(&mut self.rng, 3);
        for _ in 0..spheres {
            let ox = x + (self.rng.gen::<f64>() - 0.5) * size * 0.5;
            let oy = y + (self.rng.gen::<f64>() - 0.5) * size * 0.3;
            let oz = z + (self.rng.gen::<f64>() - 0.5) * size * 0.5;
            let radius = 2.5 + self.rng.gen::<f64>() * 2.0;
            self.sphere(ox, oy, oz, radius);
        }
    }

    fn cavern(&mut self, center: (i32, i32, i32)) {
        let s = self.settings;
        let spread = s.cavern_size_max as i32 - s.cavern_size_min as i32;
        let size_x = s.cavern_size_min as i32 + bounded(&mut self.rng, spread);
        let size_y = (size_x as f64 * 0.6) as i32 + bounded(&mut self.rng, (size_x as f64 * 0.3) as i32);
        // Drawn to keep the stream aligned; the cluster is laid out from size_x.
        let _size_z = s.cavern_size_min as i32 + bounded(&mut self.rng, spread);

        let (cx, cy, cz) = (center.0 as f64, center.1 as f64, center.2 as f64);

        let spheres = 4 + bounded(&mut self.rng, 7);
        for i in 0..spheres {
            let angle = i as f64 / spheres as f64 * PI * 2.0 + (self.rng.gen::<f64>() - 0.5);
            let distance = self.rng.gen::<f64>() * size_x as f64 * 0.4;
            let ox = cx + angle.cos() * distance;
            let oy = cy + (self.rng.gen::<f64>() - 0.5) * size_y as f64 * 0.8;
            let oz = cz + angle.sin() * distance;
            let radius = 3.0 + self.rng.gen::<f64>() * 4.0;
            self.sphere(ox, oy, oz, radius);
        }

        let tunnels = 2 + bounded(&mut self.rng, 4);
        for _ in 0..tunnels {
            let length = 60 + bounded(&mut self.rng, 120);
            let mut yaw = self.rng.gen::<f64>() * PI * 2.0;
            let mut pitch = (self.rng.gen::<f64>() - 0.5) * 0.4;
            let (mut x, mut y, mut z) = (cx, cy, cz);

            for j in 0..length {
                let progress = j as f64 / length as f64;
                self.sphere(x, y, z, (2.8 - progress).max(1.0));

                yaw += (self.rng.gen::<f64>() - 0.5) * 0.15;
                pitch += (self.rng.gen::<f64>() - 0.5) * 0.08;

                x += yaw.cos() * pitch.cos() * 0.9;
                y += pitch.sin() * 0.9;
                z += yaw.sin() * pitch.cos() * 0.9;
            }
        }
    }
}
