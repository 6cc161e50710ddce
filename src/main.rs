//! voxelgen - deterministic procedural terrain
//!
//! Generates a square of chunks from a TOML configuration and logs what each
//! stage produced.

mod config;

use anyhow::{Context, Result};
use config::{AppConfig, RunConfig, DEFAULT_CONFIG_PATH};
use std::{env, path::PathBuf, time::Instant};
use tracing::info;
use voxelgen_world::{blocks, ChunkPos, ChunkStorage, TerrainGenerator};

fn main() -> Result<()> {
    // WARN by default (override with RUST_LOG)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    info!("Starting voxelgen v{}", env!("CARGO_PKG_VERSION"));

    let cli = CliOptions::parse(env::args().skip(1));
    let mut config = AppConfig::load_from_path(&cli.config_path);
    if let Some(seed) = cli.seed {
        config.worldgen.seed = seed;
    }
    if let Some(radius) = cli.radius {
        config.run.radius = radius;
    }
    if cli.write_config {
        config
            .save_to_path(&cli.config_path)
            .with_context(|| format!("failed to write {}", cli.config_path.display()))?;
        info!(path = %cli.config_path.display(), "Wrote configuration");
    }

    let summary = run(&config)?;
    println!(
        "seed {}: {} chunks, {} ore blocks, {} voxels carved, {} decorators in {:.2}s",
        config.worldgen.seed,
        summary.chunks,
        summary.ore_blocks,
        summary.carved,
        summary.decorators,
        summary.elapsed_seconds
    );
    Ok(())
}

#[derive(Debug, Default)]
struct RunSummary {
    chunks: usize,
    ore_blocks: u64,
    carved: u64,
    decorators: usize,
    elapsed_seconds: f64,
}

fn area(run: &RunConfig) -> Vec<ChunkPos> {
    let r = run.radius.max(0);
    let mut out = Vec::new();
    for dz in -r..=r {
        for dx in -r..=r {
            out.push(ChunkPos::new(run.center_x + dx, run.center_z + dz));
        }
    }
    out
}

fn run(config: &AppConfig) -> Result<RunSummary> {
    let start = Instant::now();
    let generator = TerrainGenerator::new(config.worldgen.clone())
        .context("failed to build terrain generator")?;

    let positions = area(&config.run);
    let mut world = ChunkStorage::new(positions.len().max(1), generator.bounds());
    let mut summary = RunSummary::default();

    for &pos in &positions {
        world.ensure_chunk(pos);
        let report = generator
            .generate_chunk(&mut world, pos)
            .with_context(|| format!("failed to generate chunk {}", pos))?;
        let solid = world
            .get(pos)
            .map(|chunk| chunk.blocks().len() - chunk.count(blocks::AIR))
            .unwrap_or(0);
        info!(
            chunk = %pos,
            solid,
            veins = report.ores.veins,
            ore_blocks = report.ores.blocks_placed,
            tunnels = report.caves.tunnels,
            caverns = report.caves.caverns,
            carved = report.caves.blocks_carved,
            aquifer = report.aquifer_blocks,
            "Chunk generated"
        );
        summary.chunks += 1;
        summary.ore_blocks += report.ores.blocks_placed as u64;
        summary.carved += report.caves.blocks_carved as u64;
    }

    if config.run.populate {
        for &pos in &positions {
            summary.decorators += generator.populate(&mut world, pos);
        }
        info!(decorators = summary.decorators, "Population complete");
    }

    summary.elapsed_seconds = start.elapsed().as_secs_f64();
    Ok(summary)
}

#[derive(Debug)]
struct CliOptions {
    config_path: PathBuf,
    seed: Option<u64>,
    radius: Option<i32>,
    write_config: bool,
}

impl CliOptions {
    fn parse<I: Iterator<Item = String>>(mut args: I) -> Self {
        let mut opts = CliOptions {
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
            seed: None,
            radius: None,
            write_config: false,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => {
                    if let Some(path) = args.next() {
                        opts.config_path = PathBuf::from(path);
                    } else {
                        tracing::error!("--config requires a path");
                    }
                }
                "--seed" => match args.next().map(|v| v.parse::<u64>()) {
                    Some(Ok(seed)) => opts.seed = Some(seed),
                    _ => tracing::error!("--seed requires an unsigned integer"),
                },
                "--radius" => match args.next().map(|v| v.parse::<i32>()) {
                    Some(Ok(radius)) if radius >= 0 => opts.radius = Some(radius),
                    _ => tracing::error!("--radius requires a non-negative integer"),
                },
                "--write-config" => opts.write_config = true,
                other => tracing::warn!("Ignoring unknown argument {other}"),
            }
        }

        opts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliOptions {
        CliOptions::parse(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn cli_defaults() {
        let opts = parse(&[]);
        assert_eq!(opts.config_path, PathBuf::from("voxelgen.toml"));
        assert!(opts.seed.is_none());
        assert!(!opts.write_config);
    }

    #[test]
    fn cli_overrides() {
        let opts = parse(&["--config", "worlds/a.toml", "--seed", "99", "--radius", "0", "--write-config"]);
        assert_eq!(opts.config_path, PathBuf::from("worlds/a.toml"));
        assert_eq!(opts.seed, Some(99));
        assert_eq!(opts.radius, Some(0));
        assert!(opts.write_config);
    }

    #[test]
    fn cli_rejects_bad_numbers() {
        let opts = parse(&["--seed", "-1", "--radius", "-3"]);
        assert!(opts.seed.is_none());
        assert!(opts.radius.is_none());
    }

    #[test]
    fn area_covers_square() {
        let run = RunConfig {
            center_x: 5,
            center_z: -5,
            radius: 1,
            populate: false,
        };
        let positions = area(&run);
        assert_eq!(positions.len(), 9);
        assert!(positions.contains(&ChunkPos::new(4, -6)));
        assert!(positions.contains(&ChunkPos::new(6, -4)));
    }

    #[test]
    fn single_chunk_run() {
        let mut config = AppConfig::default();
        config.worldgen.seed = 3;
        config.run.radius = 0;
        let summary = run(&config).expect("run succeeds");
        assert_eq!(summary.chunks, 1);
    }
}
