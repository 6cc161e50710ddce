//! Tunable generation settings.
//!
//! Every struct deserializes with `#[serde(default)]`, so a settings file
//! only needs to name the values it changes.

use serde::{Deserialize, Serialize};

use crate::chunk::WorldBounds;

/// Top-level settings consumed by [`crate::TerrainGenerator`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldgenSettings {
    pub seed: u64,
    /// Host preset label. Carried through untouched.
    pub preset: String,
    pub bounds: WorldBounds,
    pub sea_level: i32,
    pub voronoi: VoronoiSettings,
    pub height: HeightSettings,
    pub caves: CaveSettings,
}

impl Default for WorldgenSettings {
    fn default() -> Self {
        Self {
            seed: 0,
            preset: String::new(),
            bounds: WorldBounds::default(),
            sea_level: 64,
            voronoi: VoronoiSettings::default(),
            height: HeightSettings::default(),
            caves: CaveSettings::default(),
        }
    }
}

impl WorldgenSettings {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoronoiSettings {
    /// Grid cell size in chunks.
    pub scale: u32,
    pub primary_edge_amplitude: f64,
    pub primary_edge_scale: f64,
    pub secondary_edge_amplitude: f64,
    pub secondary_edge_scale: f64,
    pub enforce_compatibility: bool,
    /// Distance multiplier for incompatible candidates. Values below 1.0 are raised to 1.0.
    pub compatibility_penalty: f64,
}

impl Default for VoronoiSettings {
    fn default() -> Self {
        Self {
            scale: 8,
            primary_edge_amplitude: 0.4,
            primary_edge_scale: 64.0,
            secondary_edge_amplitude: 0.2,
            secondary_edge_scale: 8.0,
            enforce_compatibility: true,
            compatibility_penalty: 2.5,
        }
    }
}

impl VoronoiSettings {
    pub fn effective_penalty(&self) -> f64 {
        self.compatibility_penalty.max(1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeightSettings {
    pub primary_amplitude: f64,
    pub primary_scale: f64,
    pub secondary_amplitude: f64,
    pub secondary_scale: f64,
    /// Half-width of the square smoothing window.
    pub smoothing_radius: u32,
}

impl Default for HeightSettings {
    fn default() -> Self {
        Self {
            primary_amplitude: 5.0,
            primary_scale: 64.0,
            secondary_amplitude: 2.0,
            secondary_scale: 16.0,
            smoothing_radius: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaveSettings {
    /// Chance that a tunnel-start attempt becomes a tunnel.
    pub cave_frequency: f64,
    /// Chance that a region hosts a cavern.
    pub cavern_frequency: f64,
    pub tunnel_length_min: u32,
    pub tunnel_length_max: u32,
    pub cavern_size_min: u32,
    pub cavern_size_max: u32,
    pub min_cave_y: i32,
    pub max_cave_y: i32,
    /// Highest Y the aquifer pass floods.
    pub lava_level: i32,
    /// Lowest Y the aquifer pass floods.
    pub lava_min_y: i32,
    pub flow_scale: f64,
}

impl Default for CaveSettings {
    fn default() -> Self {
        Self {
            cave_frequency: 0.08,
            cavern_frequency: 0.03,
            tunnel_length_min: 380,
            tunnel_length_max: 900,
            cavern_size_min: 8,
            cavern_size_max: 15,
            min_cave_y: -59,
            max_cave_y: 50,
            lava_level: -54,
            lava_min_y: -62,
            flow_scale: 1.0 / 96.0,
        }
    }
}
