//! Surface decoration contract and the built-in plant patch decorator.

use std::fmt::Debug;

use rand::{Rng, RngCore};

use crate::blocks;
use crate::chunk::{BlockId, ChunkPos};
use crate::storage::ChunkAccess;

/// Surface height lookup handed to decorators: `(world_x, world_z) -> surface_y`.
///
/// Implementations must be free of side effects; decorators may call it any
/// number of times for the same column.
pub type HeightLookup<'a> = dyn Fn(i32, i32) -> i32 + 'a;

/// Something that decorates one chunk after terrain generation.
pub trait Decorator: Send + Sync + Debug {
    fn decorate(
        &self,
        world: &mut dyn ChunkAccess,
        rng: &mut dyn RngCore,
        chunk: ChunkPos,
        height_at: &HeightLookup<'_>,
    );
}

/// A plant cluster feature: on success scatters `cluster_size` plants around
/// a random surface column.
#[derive(Debug, Clone, PartialEq)]
pub struct PlantPatch {
    pub plants: Vec<BlockId>,
    pub chance: f64,
    pub attempts: u32,
    pub cluster_size: u32,
    pub only_near_water: bool,
}

impl PlantPatch {
    pub fn new(plants: Vec<BlockId>, chance: f64, attempts: u32, cluster_size: u32) -> Self {
        Self {
            plants,
            chance,
            attempts,
            cluster_size,
            only_near_water: false,
        }
    }

    pub fn near_water(mut self) -> Self {
        self.only_near_water = true;
        self
    }

    /// Try to grow one cluster whose ground block sits at `(x, y, z)`.
    ///
    /// Returns true when at least one plant was placed.
    pub fn place(&self, world: &mut dyn ChunkAccess, rng: &mut dyn RngCore, x: i32, y: i32, z: i32) -> bool {
        if self.plants.is_empty() {
            return false;
        }
        if y < world.min_y() || y >= world.max_y() - 1 {
            return false;
        }
        if !self.can_grow_at(world, x, y, z) {
            return false;
        }

        let mut placed = false;
        for _ in 0..self.cluster_size {
            let px = x + rng.gen_range(-2..=2);
            let pz = z + rng.gen_range(-2..=2);
            if self.can_grow_at(world, px, y, pz) {
                let plant = self.plants[rng.gen_range(0..self.plants.len())];
                world.set_block_at(px, y + 1, pz, plant);
                placed = true;
            }
        }
        placed
    }

    fn can_grow_at(&self, world: &dyn ChunkAccess, x: i32, y: i32, z: i32) -> bool {
        blocks::is_plant_soil(world.block_at(x, y, z))
            && world.block_at(x, y + 1, z) == blocks::AIR
            && (!self.only_near_water || is_near_water(world, x, y, z))
    }
}

fn is_near_water(world: &dyn ChunkAccess, x: i32, y: i32, z: i32) -> bool {
    (-1..=1).any(|dx| (-1..=1).any(|dz| world.block_at(x + dx, y, z + dz) == blocks::WATER))
}

/// Runs a fixed list of plant patches, each with its own attempt budget.
#[derive(Debug, Clone, Default)]
pub struct PatchDecorator {
    patches: Vec<PlantPatch>,
}

impl PatchDecorator {
    pub fn new(patches: Vec<PlantPatch>) -> Self {
        Self { patches }
    }

    pub fn patches(&self) -> &[PlantPatch] {
        &self.patches
    }
}

impl Decorator for PatchDecorator {
    fn decorate(
        &self,
        world: &mut dyn ChunkAccess,
        rng: &mut dyn RngCore,
        chunk: ChunkPos,
        height_at: &HeightLookup<'_>,
    ) {
        for patch in &self.patches {
            for _ in 0..patch.attempts {
                if rng.gen::<f64>() > patch.chance {
                    continue;
                }
                let x = chunk.origin_x() + rng.gen_range(0..=15);
                let z = chunk.origin_z() + rng.gen_range(0..=15);
                let y = height_at(x, z);
                patch.place(world, rng, x, y, z);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::WorldBounds;
    use crate::storage::ChunkStorage;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn flat_world(ground: BlockId) -> ChunkStorage {
        let mut storage = ChunkStorage::new(16, WorldBounds::new(-64, 320));
        for pos in ChunkPos::new(0, 0).neighborhood() {
            let chunk = storage.ensure_chunk(pos);
            for x in 0..16 {
                for z in 0..16 {
                    chunk.set_block(x, 64, z, ground);
                }
            }
        }
        storage
    }

    #[test]
    fn test_plants_only_grow_on_soil_with_air_above() {
        let mut world = flat_world(blocks::GRASS);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let patch = PlantPatch::new(vec![blocks::POPPY], 1.0, 1, 12);
        assert!(patch.place(&mut world, &mut rng, 8, 64, 8));
        let chunk = world.get(ChunkPos::new(0, 0)).unwrap();
        assert!(chunk.count(blocks::POPPY) > 0);
        for x in 0..16 {
            for z in 0..16 {
                if chunk.block(x, 65, z) == blocks::POPPY {
                    assert_eq!(chunk.block(x, 64, z), blocks::GRASS);
                }
            }
        }
    }

    #[test]
    fn test_stone_ground_rejects_plants() {
        let mut world = flat_world(blocks::STONE);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let patch = PlantPatch::new(vec![blocks::POPPY], 1.0, 1, 12);
        assert!(!patch.place(&mut world, &mut rng, 8, 64, 8));
    }

    #[test]
    fn test_height_outside_world_is_rejected() {
        let mut world = flat_world(blocks::GRASS);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let patch = PlantPatch::new(vec![blocks::POPPY], 1.0, 1, 4);
        assert!(!patch.place(&mut world, &mut rng, 8, 319, 8));
        assert!(!patch.place(&mut world, &mut rng, 8, -65, 8));
    }

    #[test]
    fn test_near_water_requirement() {
        let mut world = flat_world(blocks::GRASS);
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let patch = PlantPatch::new(vec![blocks::FIREFLY_BUSH], 1.0, 1, 8).near_water();
        assert!(!patch.place(&mut world, &mut rng, 8, 64, 8));

        world.set_block_at(9, 64, 8, blocks::WATER);
        let placed = patch.place(&mut world, &mut rng, 8, 64, 8);
        let chunk = world.get(ChunkPos::new(0, 0)).unwrap();
        assert_eq!(placed, chunk.count(blocks::FIREFLY_BUSH) > 0);
    }

    #[test]
    fn test_decorator_is_deterministic() {
        let decorator = PatchDecorator::new(vec![
            PlantPatch::new(vec![blocks::DANDELION, blocks::POPPY], 0.5, 8, 3),
            PlantPatch::new(vec![blocks::TALL_GRASS], 0.5, 12, 7),
        ]);
        let run = |seed: u64| {
            let mut world = flat_world(blocks::GRASS);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            decorator.decorate(&mut world, &mut rng, ChunkPos::new(0, 0), &|_, _| 64);
            world.get(ChunkPos::new(0, 0)).unwrap().blocks().to_vec()
        };
        assert_eq!(run(77), run(77));
    }
}
