//! Debug World Tool
//!
//! Debugging utility for world generation visualization and validation.
//!
//! Features:
//! - Heightmap visualization (ASCII art)
//! - Biome map display
//! - Seam validation between chunks
//! - Column inspection of a fully generated chunk
//!
//! Usage:
//!   debug-world heightmap --seed 12345 --region=-2,-2,2,2
//!   debug-world biomes --seed 12345 --region=-5,-5,5,5
//!   debug-world validate-seams --seed 12345 --region=-3,-3,3,3
//!   debug-world column --seed 12345 --x 40 --z -17

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::Level;
use voxelgen_testkit::SeamValidation;
use voxelgen_world::{
    blocks, boundary_difference, ChunkPos, ChunkStorage, Heightmap, TerrainGenerator,
    WorldgenSettings, CHUNK_SIZE_X, CHUNK_SIZE_Z, MAX_BOUNDARY_DIFF,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "World generation debugging utility for voxelgen", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// World seed
    #[arg(long, global = true, default_value_t = 12345)]
    seed: u64,

    /// Output file (default: stdout)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate and visualize smoothed surface heights (ASCII art)
    Heightmap {
        /// Chunk region as min_x,min_z,max_x,max_z
        #[arg(long, allow_hyphen_values = true)]
        region: Region,
    },
    /// Display the biome distribution
    Biomes {
        /// Chunk region as min_x,min_z,max_x,max_z
        #[arg(long, allow_hyphen_values = true)]
        region: Region,
    },
    /// Check surface continuity across chunk borders
    ValidateSeams {
        /// Chunk region as min_x,min_z,max_x,max_z
        #[arg(long, allow_hyphen_values = true)]
        region: Region,
    },
    /// Dump one block column after the full generation pipeline
    Column {
        #[arg(long, allow_hyphen_values = true)]
        x: i32,
        #[arg(long, allow_hyphen_values = true)]
        z: i32,
        /// Also run decoration (generates the 3×3 neighbourhood)
        #[arg(long)]
        populate: bool,
    },
}

/// Inclusive chunk rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Region {
    min_x: i32,
    min_z: i32,
    max_x: i32,
    max_z: i32,
}

impl FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err("region format: min_x,min_z,max_x,max_z".to_string());
        }
        let mut values = [0i32; 4];
        for (slot, (part, name)) in values
            .iter_mut()
            .zip(parts.iter().zip(["min_x", "min_z", "max_x", "max_z"]))
        {
            *slot = part
                .parse()
                .map_err(|e| format!("Invalid {}: {}", name, e))?;
        }
        let [min_x, min_z, max_x, max_z] = values;
        if min_x > max_x || min_z > max_z {
            return Err("region minimum exceeds maximum".to_string());
        }
        Ok(Self {
            min_x,
            min_z,
            max_x,
            max_z,
        })
    }
}

impl Region {
    fn width_blocks(&self) -> usize {
        ((self.max_x - self.min_x + 1) * CHUNK_SIZE_X as i32) as usize
    }

    fn depth_blocks(&self) -> usize {
        ((self.max_z - self.min_z + 1) * CHUNK_SIZE_Z as i32) as usize
    }

    fn describe(&self) -> String {
        format!(
            "chunks ({}, {}) to ({}, {})",
            self.min_x, self.min_z, self.max_x, self.max_z
        )
    }
}

fn generator(seed: u64) -> Result<TerrainGenerator> {
    TerrainGenerator::new(WorldgenSettings::with_seed(seed)).context("failed to build terrain generator")
}

fn write_output(output: Option<&Path>, text: &str, what: &str) -> Result<()> {
    if let Some(path) = output {
        let mut file = File::create(path)
            .with_context(|| format!("Failed to create output file {}", path.display()))?;
        file.write_all(text.as_bytes())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("{} saved to: {}", what, path.display());
    } else {
        print!("{}", text);
    }
    Ok(())
}

fn visualize_heightmap(seed: u64, region: Region, output: Option<&Path>) -> Result<()> {
    let gen = generator(seed)?;
    let sea_level = gen.settings().sea_level;

    let mut heightmaps = Vec::new();
    for chunk_z in region.min_z..=region.max_z {
        for chunk_x in region.min_x..=region.max_x {
            let pos = ChunkPos::new(chunk_x, chunk_z);
            heightmaps.push((pos, Heightmap::generate(gen.smoother(), sea_level, pos)));
        }
    }

    let global_min = heightmaps.iter().map(|(_, hm)| hm.min_height()).min().unwrap_or(0);
    let global_max = heightmaps.iter().map(|(_, hm)| hm.max_height()).max().unwrap_or(0);

    let mut visualization = String::new();
    visualization.push_str(&format!("Heightmap Visualization (Seed: {})\n", seed));
    visualization.push_str(&format!("Region: {}\n", region.describe()));
    visualization.push_str(&format!("Height range: {} to {}\n", global_min, global_max));
    visualization.push_str("\nLegend: █ = high, ▓ = med-high, ▒ = med-low, ░ = low, · = very low, ~ = below sea\n\n");

    let columns = region.max_x - region.min_x + 1;
    for z in 0..region.depth_blocks() {
        for x in 0..region.width_blocks() {
            let chunk_x = (x / CHUNK_SIZE_X) as i32;
            let chunk_z = (z / CHUNK_SIZE_Z) as i32;
            let (_, hm) = &heightmaps[(chunk_z * columns + chunk_x) as usize];
            let h = hm.get(x % CHUNK_SIZE_X, z % CHUNK_SIZE_Z);

            let normalized = if global_max > global_min {
                (h - global_min) as f32 / (global_max - global_min) as f32
            } else {
                0.5
            };
            let symbol = if h < sea_level {
                '~'
            } else if normalized > 0.8 {
                '█'
            } else if normalized > 0.6 {
                '▓'
            } else if normalized > 0.4 {
                '▒'
            } else if normalized > 0.2 {
                '░'
            } else {
                '·'
            };
            visualization.push(symbol);
        }
        visualization.push('\n');
    }

    write_output(output, &visualization, "Heightmap")
}

/// Map symbol for a biome table index.
fn biome_symbol(index: usize) -> char {
    const SYMBOLS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    SYMBOLS.get(index).map_or('?', |&b| b as char)
}

fn visualize_biomes(seed: u64, region: Region, output: Option<&Path>) -> Result<()> {
    let gen = generator(seed)?;
    let table = gen.biome_table();

    let mut visualization = String::new();
    visualization.push_str(&format!("Biome Map (Seed: {})\n", seed));
    visualization.push_str(&format!("Region: {}\n\nLegend:\n", region.describe()));
    for (index, biome) in table.iter() {
        visualization.push_str(&format!(
            "  {} = {} (height {}, size ×{:.1})\n",
            biome_symbol(index),
            biome.name(),
            biome.height(),
            biome.size_multiplier()
        ));
    }
    visualization.push('\n');

    let origin_x = region.min_x * CHUNK_SIZE_X as i32;
    let origin_z = region.min_z * CHUNK_SIZE_Z as i32;
    for z in 0..region.depth_blocks() {
        for x in 0..region.width_blocks() {
            let sample = gen.biome_at(origin_x + x as i32, origin_z + z as i32);
            visualization.push(biome_symbol(sample.index));
        }
        visualization.push('\n');
    }

    write_output(output, &visualization, "Biome map")
}

fn validate_seams(seed: u64, region: Region) -> Result<()> {
    let gen = generator(seed)?;
    let sea_level = gen.settings().sea_level;
    let mut seams = SeamValidation::default();

    for chunk_z in region.min_z..=region.max_z {
        for chunk_x in region.min_x..=region.max_x {
            let here = ChunkPos::new(chunk_x, chunk_z);
            let mut neighbours = Vec::with_capacity(2);
            if chunk_x < region.max_x {
                neighbours.push(ChunkPos::new(chunk_x + 1, chunk_z));
            }
            if chunk_z < region.max_z {
                neighbours.push(ChunkPos::new(chunk_x, chunk_z + 1));
            }
            for next in neighbours {
                if let Some(diff) = boundary_difference(gen.smoother(), sea_level, here, next) {
                    seams.record(diff, diff <= MAX_BOUNDARY_DIFF);
                }
            }
        }
    }

    println!("Seam Validation (Seed: {})", seed);
    println!("Region: {}", region.describe());
    println!();
    println!("  Seams checked:     {}", seams.total_seams);
    println!("  Seams over limit:  {}", seams.seams_failed);
    println!("  Max difference:    {} blocks", seams.max_seam_diff);
    println!("  Avg difference:    {:.2} blocks", seams.avg_seam_diff);

    if seams.seams_failed > 0 {
        bail!(
            "{} seams exceed {} blocks",
            seams.seams_failed,
            MAX_BOUNDARY_DIFF
        );
    }
    println!();
    println!("All seams within {} blocks", MAX_BOUNDARY_DIFF);
    Ok(())
}

fn dump_column(seed: u64, x: i32, z: i32, populate: bool, output: Option<&Path>) -> Result<()> {
    let gen = generator(seed)?;
    let pos = ChunkPos::containing(x, z);
    let mut world = ChunkStorage::new(9, gen.bounds());

    let targets: Vec<ChunkPos> = if populate {
        pos.neighborhood().collect()
    } else {
        vec![pos]
    };
    for target in targets {
        world.ensure_chunk(target);
        gen.generate_chunk(&mut world, target)
            .with_context(|| format!("failed to generate chunk {}", target))?;
    }
    if populate {
        gen.populate(&mut world, pos);
    }

    let chunk = world.get(pos).context("chunk was evicted")?;
    let (lx, lz) = ((x & 15) as usize, (z & 15) as usize);
    let sample = gen.biome_at(x, z);
    let biome_name = gen
        .biome_table()
        .get(sample.index)
        .map_or("<unregistered>", |b| b.name());

    let mut text = String::new();
    text.push_str(&format!("Column ({}, {}) in chunk {} (Seed: {})\n", x, z, pos, seed));
    text.push_str(&format!(
        "Biome: {} (index {}, edge distance {:.3})\n",
        biome_name, sample.index, sample.edge_distance
    ));
    text.push_str(&format!("Surface: y={}\n\n", gen.height_at(x, z)));

    // Runs of identical blocks, top down.
    let column: Vec<(i32, u16)> = chunk.column(lx, lz).collect();
    let mut runs: Vec<(i32, i32, u16)> = Vec::new();
    for &(y, block) in column.iter().rev() {
        match runs.last_mut() {
            Some((_, low, id)) if *id == block && *low == y + 1 => *low = y,
            _ => runs.push((y, y, block)),
        }
    }
    for (high, low, block) in runs {
        if block == blocks::AIR && high == gen.bounds().max_y - 1 {
            continue;
        }
        let name = blocks::name_of(block).unwrap_or("unknown");
        if high == low {
            text.push_str(&format!("  y {:>4}         {}\n", high, name));
        } else {
            text.push_str(&format!("  y {:>4}..{:<4}   {}\n", high, low, name));
        }
    }

    write_output(output, &text, "Column dump")
}

fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .try_init();
    let args = Args::parse();
    let output = args.output.as_deref();

    match args.command {
        Command::Heightmap { region } => visualize_heightmap(args.seed, region, output),
        Command::Biomes { region } => visualize_biomes(args.seed, region, output),
        Command::ValidateSeams { region } => validate_seams(args.seed, region),
        Command::Column { x, z, populate } => dump_column(args.seed, x, z, populate, output),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_parses_negative_coordinates() {
        let region: Region = "-2,-3,2,3".parse().unwrap();
        assert_eq!(
            region,
            Region {
                min_x: -2,
                min_z: -3,
                max_x: 2,
                max_z: 3
            }
        );
        assert_eq!(region.width_blocks(), 80);
        assert_eq!(region.depth_blocks(), 112);
    }

    #[test]
    fn region_rejects_bad_input() {
        assert!("1,2,3".parse::<Region>().is_err());
        assert!("a,0,1,1".parse::<Region>().is_err());
        assert!("2,0,1,1".parse::<Region>().is_err());
    }

    #[test]
    fn args_accept_region_flag() {
        let args = Args::try_parse_from(["debug-world", "biomes", "--region=-1,-1,1,1", "--seed", "7"]).unwrap();
        assert_eq!(args.seed, 7);
        assert!(matches!(args.command, Command::Biomes { .. }));
    }

    #[test]
    fn biome_symbols_are_distinct() {
        assert_eq!(biome_symbol(0), '0');
        assert_eq!(biome_symbol(10), 'A');
        assert_eq!(biome_symbol(500), '?');
    }
}
