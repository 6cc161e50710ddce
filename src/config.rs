use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use tracing::warn;
use voxelgen_world::WorldgenSettings;

pub const DEFAULT_CONFIG_PATH: &str = "voxelgen.toml";

/// Everything the `voxelgen` binary reads from its TOML file.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub worldgen: WorldgenSettings,
    pub run: RunConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RunConfig {
    /// Centre chunk of the generated square.
    pub center_x: i32,
    pub center_z: i32,
    /// Chunk radius around the centre; the square is `2r + 1` chunks wide.
    pub radius: i32,
    /// Run the decoration pass after terrain generation.
    pub populate: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            center_x: 0,
            center_z: 0,
            radius: 2,
            populate: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<AppConfig>(&contents) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("Failed to parse {}: {err}. Using defaults", path.display());
                    AppConfig::default()
                }
            },
            Err(err) => {
                if err.kind() != std::io::ErrorKind::NotFound {
                    warn!("Failed to read {}: {err}. Using defaults", path.display());
                } else {
                    warn!("Config not found at {}. Using defaults", path.display());
                }
                AppConfig::default()
            }
        }
    }

    /// Save configuration to an explicit path.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let toml = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        Ok(())
    }
}
