//! Integer and float hashes that feed the generator without an RNG stream.
//!
//! These are pure functions of their coordinates, so any chunk can be
//! regenerated in any order.

const MASK_31: i64 = 0x7FFF_FFFF;

#[inline]
fn fract(v: f64) -> f64 {
    let f = v - v.floor();
    // Tiny negative inputs round up to exactly 1.0.
    if f >= 1.0 {
        0.0
    } else {
        f
    }
}

/// Hash a Voronoi grid cell into a pair of offsets in `[0, 1)`.
///
/// The fractional parts are taken towards negative infinity so cells on the
/// negative side of the origin hash into the same range as positive ones.
pub fn cell_hash(cell_x: f64, cell_z: f64) -> (f64, f64) {
    let mut px = fract(cell_x * 0.1031);
    let mut py = fract(cell_z * 0.1030);
    let mut pz = fract(cell_x * 0.0973);
    let dot = px * (py + 33.33) + py * (pz + 33.33) + pz * (px + 33.33);
    px += dot;
    py += dot;
    pz += dot;
    (fract((px + py) * pz), fract((px + pz) * py))
}

/// Per-voxel draw in `[0, 1)` used by the deepslate transition band.
pub fn column_unit(world_x: i32, world_z: i32, y: i32) -> f64 {
    let hash = (world_x as i64)
        .wrapping_mul(374_761_393)
        .wrapping_add((world_z as i64).wrapping_mul(668_265_263))
        .wrapping_add((y as i64).wrapping_mul(2_147_483_647))
        & MASK_31;
    (hash % 10_000) as f64 / 10_000.0
}

/// Non-negative 31-bit draw for one ore attempt and salt.
///
/// `attempt * 2147483647` is `-attempt` modulo 2^31, so draws for one salt
/// shift by a constant step per attempt: rolls within a chunk are correlated.
pub fn attempt_hash(chunk_x: i32, chunk_z: i32, attempt: u32, salt: u32) -> i64 {
    (chunk_x as i64)
        .wrapping_mul(374_761_393)
        .wrapping_add((chunk_z as i64).wrapping_mul(668_265_263))
        .wrapping_add((attempt as i64).wrapping_mul(2_147_483_647))
        .wrapping_add((salt as i64).wrapping_mul(1_234_567_891))
        & MASK_31
}

/// Seed for the cave stream of one region.
pub fn region_seed(world_seed: u64, region_x: i32, region_z: i32) -> u64 {
    let mixed = (region_x as i64)
        .wrapping_mul(341_873_128_712)
        .wrapping_add((region_z as i64).wrapping_mul(132_897_987_541));
    (mixed ^ world_seed as i64) as u64
}

/// Seed for the decoration stream of one chunk.
pub fn population_seed(world_seed: u64, chunk_x: i32, chunk_z: i32) -> u64 {
    let mixed = ((chunk_x as i64) << 16) ^ chunk_z as i64;
    (world_seed as i64 ^ mixed) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_hash_range() {
        for x in -50..50 {
            for z in -50..50 {
                let (rx, rz) = cell_hash(x as f64, z as f64);
                assert!((0.0..1.0).contains(&rx), "rx {} at ({}, {})", rx, x, z);
                assert!((0.0..1.0).contains(&rz), "rz {} at ({}, {})", rz, x, z);
            }
        }
    }

    #[test]
    fn test_cell_hash_varies() {
        let a = cell_hash(0.0, 0.0);
        let b = cell_hash(1.0, 0.0);
        let c = cell_hash(0.0, 1.0);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_column_unit_range() {
        for x in -20..20 {
            for z in -20..20 {
                for y in 0..=5 {
                    let v = column_unit(x, z, y);
                    assert!((0.0..1.0).contains(&v));
                }
            }
        }
    }

    #[test]
    fn test_attempt_hash_known_values() {
        assert_eq!(attempt_hash(0, 0, 0, 0), 0);
        assert_eq!(attempt_hash(1, 0, 0, 0), 374_761_393);
        assert_eq!(attempt_hash(0, 0, 0, 1), 1_234_567_891);
        assert_eq!(attempt_hash(0, 0, 1, 0), 2_147_483_647);
    }

    #[test]
    fn test_attempt_hash_is_non_negative() {
        for cx in -30..30 {
            for salt in 0..40 {
                assert!(attempt_hash(cx, -cx * 3, 7, salt) >= 0);
            }
        }
    }

    #[test]
    fn test_region_seed_mixes_world_seed() {
        assert_eq!(region_seed(0, 0, 0), 0);
        assert_eq!(region_seed(42, 0, 0), 42);
        assert_ne!(region_seed(42, 1, 0), region_seed(42, 0, 1));
    }

    #[test]
    fn test_population_seed() {
        assert_eq!(population_seed(0, 1, 0), 1 << 16);
        assert_eq!(population_seed(5, 0, 3), 5 ^ 3);
    }
}
