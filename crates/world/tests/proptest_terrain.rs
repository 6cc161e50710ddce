//! Property-based tests for the generation pipeline
//!
//! Critical invariants:
//! - Voronoi resolution is total: index in range, edge distance non-negative
//! - Smoothed heights never jump by more than the configured noise magnitude
//! - Ore voxels stay inside their height windows
//! - Column fill keeps bedrock at the floor and no plain stone below y=0
//! - Cave carving writes only into the requested chunk

use std::sync::Arc;

use proptest::prelude::*;
use voxelgen_world::{
    blocks, Biome, BiomeTable, CaveCarver, CaveSettings, ChunkPos, ChunkStorage,
    CompatibilityRules, HeightSettings, HeightSmoother, OreCatalog, OreVeinGenerator,
    TerrainGenerator, VoronoiBiomeField, VoronoiSettings, WorldBounds, WorldgenSettings,
};

fn flat_table(count: usize) -> Arc<BiomeTable> {
    let entries = (0..count)
        .map(|i| (i, Biome::new(format!("flat{}", i), 0)))
        .collect();
    Arc::new(BiomeTable::new(entries, CompatibilityRules::new()).expect("dense table"))
}

fn stone_world(center: ChunkPos) -> ChunkStorage {
    let mut world = ChunkStorage::new(16, WorldBounds::default());
    for pos in center.neighborhood() {
        let chunk = world.ensure_chunk(pos);
        for x in 0..16 {
            for z in 0..16 {
                for y in -64..80 {
                    let block = if y < 0 { blocks::DEEPSLATE } else { blocks::STONE };
                    chunk.set_block(x, y, z, block);
                }
            }
        }
    }
    world
}

proptest! {
    /// Property: resolve(x, z, n) is total for every n > 0
    #[test]
    fn voronoi_totality(
        seed in any::<u64>(),
        x in -1_000_000i32..1_000_000,
        z in -1_000_000i32..1_000_000,
        n in 1usize..12,
    ) {
        let field = VoronoiBiomeField::new(seed, VoronoiSettings::default(), Arc::new(BiomeTable::standard()));
        let sample = field.resolve(x, z, n);
        prop_assert!(sample.index < n, "index {} out of range for n = {}", sample.index, n);
        prop_assert!(sample.edge_distance >= 0.0);
        prop_assert!(sample.edge_distance.is_finite());
    }

    /// Property: the standard table never yields an unregistered biome
    #[test]
    fn sampled_biomes_are_registered(
        seed in any::<u64>(),
        x in -100_000i32..100_000,
        z in -100_000i32..100_000,
    ) {
        let table = Arc::new(BiomeTable::standard());
        let field = VoronoiBiomeField::new(seed, VoronoiSettings::default(), table.clone());
        prop_assert!(table.get(field.sample(x, z).index).is_some());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Property: adjacent smoothed columns differ by at most the noise budget
    ///
    /// With zero base heights and no compatibility swaps every height comes
    /// from noise alone.
    #[test]
    fn smoothing_continuity(
        seed in any::<u64>(),
        x in -50_000i32..50_000,
        z in -50_000i32..50_000,
    ) {
        let voronoi = VoronoiSettings { enforce_compatibility: false, ..VoronoiSettings::default() };
        let smoother = HeightSmoother::from_settings(seed, voronoi, HeightSettings::default(), flat_table(5));
        let bound = smoother.noise_budget().ceil() as i32;

        let h = smoother.smoothed_height(x, z);
        let east = smoother.smoothed_height(x + 1, z);
        let south = smoother.smoothed_height(x, z + 1);
        prop_assert!((h - east).abs() <= bound, "x step {} -> {} exceeds {}", h, east, bound);
        prop_assert!((h - south).abs() <= bound, "z step {} -> {} exceeds {}", h, south, bound);
    }

    /// Property: ore voxels stay inside their spec's height window
    #[test]
    fn ore_bounds(
        chunk_x in -2_000i32..2_000,
        chunk_z in -2_000i32..2_000,
    ) {
        let catalog = Arc::new(OreCatalog::standard().expect("bundled catalog parses"));
        let generator = OreVeinGenerator::new(catalog.clone());
        let pos = ChunkPos::new(chunk_x, chunk_z);
        let mut world = stone_world(pos);
        generator.generate(&mut world, pos);

        let chunk = world.get(pos).expect("resident");
        for spec in catalog.specs() {
            for x in 0..16 {
                for z in 0..16 {
                    for (y, block) in chunk.column(x, z) {
                        if block == spec.block {
                            prop_assert!(
                                spec.contains_height(y),
                                "{} at y={} outside {}..={}",
                                spec.name, y, spec.min_height, spec.max_height
                            );
                        }
                    }
                }
            }
        }
    }

    /// Property: vein growth never uses more than vein_size * 3 attempts
    #[test]
    fn vein_attempt_budget(
        chunk_x in -2_000i32..2_000,
        chunk_z in -2_000i32..2_000,
        attempt in 0u32..64,
    ) {
        let catalog = OreCatalog::standard().expect("bundled catalog parses");
        let pos = ChunkPos::new(chunk_x, chunk_z);
        let mut world = stone_world(pos);
        let chunk = world.get_mut(pos).expect("resident");
        for spec in catalog.specs() {
            let start = (8, spec.min_height, 8);
            let outcome = OreVeinGenerator::grow_vein(chunk, spec, pos, attempt, start);
            prop_assert!(outcome.attempts_used <= spec.vein_size * 3);
            prop_assert!(outcome.placed <= spec.vein_size);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(6))]

    /// Property: carving never modifies chunks other than the target
    #[test]
    fn carve_writes_only_target_chunk(
        seed in any::<u64>(),
        chunk_x in -500i32..500,
        chunk_z in -500i32..500,
    ) {
        let center = ChunkPos::new(chunk_x, chunk_z);
        let mut world = stone_world(center);
        let before: Vec<_> = center
            .neighborhood()
            .filter(|&p| p != center)
            .map(|p| (p, world.get(p).expect("resident").blocks().to_vec()))
            .collect();

        let carver = CaveCarver::new(seed, CaveSettings::default());
        carver.carve(&mut world, center);
        carver.apply_aquifers(&mut world, center);

        for (pos, blocks) in before {
            prop_assert_eq!(world.get(pos).expect("resident").blocks(), &blocks[..], "chunk {} modified", pos);
        }
    }

    /// Property: column invariants hold after the whole pipeline
    #[test]
    fn column_invariants(
        seed in any::<u64>(),
        chunk_x in -500i32..500,
        chunk_z in -500i32..500,
    ) {
        let generator = TerrainGenerator::new(WorldgenSettings::with_seed(seed)).expect("generator");
        let pos = ChunkPos::new(chunk_x, chunk_z);
        let mut world = ChunkStorage::new(4, generator.bounds());
        world.ensure_chunk(pos);
        generator.generate_chunk(&mut world, pos).expect("bounds match");

        let chunk = world.get(pos).expect("resident");
        let sea_level = generator.settings().sea_level;
        for x in 0..16 {
            for z in 0..16 {
                let surface = generator.height_at(pos.origin_x() + x as i32, pos.origin_z() + z as i32);
                prop_assert_eq!(chunk.block(x, -64, z), blocks::BEDROCK);
                for (y, block) in chunk.column(x, z) {
                    if y < 0 {
                        prop_assert_ne!(block, blocks::STONE, "plain stone at y={}", y);
                    }
                    if y > surface && block != blocks::AIR {
                        prop_assert!(y <= sea_level, "block {} above surface {} at y={}", block, surface, y);
                    }
                }
            }
        }
    }
}
