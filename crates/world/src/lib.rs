//! Deterministic procedural terrain for voxel worlds.
//!
//! A [`TerrainGenerator`] turns a seed plus a [`BiomeTable`] and an
//! [`OreCatalog`] into chunk contents: Voronoi biomes, smoothed heights,
//! layered columns, ore veins, caves and aquifers, then plant decoration.

pub mod blocks;
pub mod hashing;
pub mod noise;

mod biome;
mod caves;
mod chunk;
mod column;
mod compat;
mod config;
mod decoration;
mod error;
mod height;
mod heightmap;
mod ore;
mod storage;
mod terrain;
mod voronoi;

pub use biome::*;
pub use caves::*;
pub use chunk::*;
pub use column::*;
pub use compat::*;
pub use config::*;
pub use decoration::*;
pub use error::*;
pub use height::*;
pub use heightmap::*;
pub use ore::*;
pub use storage::*;
pub use terrain::*;
pub use voronoi::*;
