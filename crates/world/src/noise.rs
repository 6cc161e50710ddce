//! Noise generation utilities for terrain generation.
//!
//! Provides deterministic octave noise for the biome edge field, the height
//! field and the cave flow field.

use noise::{NoiseFn, Simplex};

/// Named noise channels. Each one is seeded with a fixed offset from the
/// world seed so the fields stay decorrelated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoiseChannel {
    /// Large-scale wobble of Voronoi borders
    PrimaryEdge,
    /// Fine wobble of Voronoi borders
    SecondaryEdge,
    /// Broad height offsets
    PrimaryHeight,
    /// Local height offsets
    SecondaryHeight,
    /// Heading field for cave worms
    CaveFlow,
}

impl NoiseChannel {
    pub const fn seed_offset(self) -> u32 {
        match self {
            NoiseChannel::PrimaryEdge => 0,
            NoiseChannel::SecondaryEdge => 1,
            NoiseChannel::PrimaryHeight => 2,
            NoiseChannel::SecondaryHeight => 3,
            NoiseChannel::CaveFlow => 11,
        }
    }

    /// Derive the 32-bit noise seed for this channel.
    pub fn seed(self, world_seed: u64) -> u32 {
        (world_seed as u32).wrapping_add(self.seed_offset())
    }
}

/// Configuration for multi-octave noise generation.
#[derive(Debug, Clone)]
pub struct NoiseConfig {
    /// Number of octaves (layers of detail)
    pub octaves: u32,
    /// Frequency multiplier between octaves
    pub lacunarity: f64,
    /// Amplitude multiplier between octaves (persistence)
    pub persistence: f64,
    /// Base frequency (scale)
    pub frequency: f64,
    /// Seed for deterministic generation
    pub seed: u32,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            octaves: 4,
            lacunarity: 2.0,
            persistence: 0.5,
            frequency: 1.0,
            seed: 0,
        }
    }
}

impl NoiseConfig {
    /// Four-octave surface field. Callers pre-divide coordinates by their scale.
    pub fn surface(seed: u32) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Three-octave 3D field steering cave worms.
    pub fn cave_flow(seed: u32, scale: f64) -> Self {
        Self {
            octaves: 3,
            lacunarity: 2.0,
            persistence: 0.5,
            frequency: scale,
            seed,
        }
    }
}

/// Octave simplex noise.
#[derive(Debug, Clone)]
pub struct SimplexGenerator {
    simplex: Simplex,
    config: NoiseConfig,
}

impl SimplexGenerator {
    /// Create a new simplex noise generator with the given configuration.
    pub fn new(config: NoiseConfig) -> Self {
        Self {
            simplex: Simplex::new(config.seed),
            config,
        }
    }

    /// Convenience constructor for a channel's surface field.
    pub fn for_channel(channel: NoiseChannel, world_seed: u64) -> Self {
        Self::new(NoiseConfig::surface(channel.seed(world_seed)))
    }

    pub fn config(&self) -> &NoiseConfig {
        &self.config
    }

    /// Generate noise value at 2D coordinates with multi-octave sampling.
    ///
    /// Returns value in range [-1.0, 1.0].
    pub fn sample_2d(&self, x: f64, y: f64) -> f64 {
        let mut value = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = self.config.frequency;
        let mut max_value = 0.0;

        for _ in 0..self.config.octaves {
            value += self.simplex.get([x * frequency, y * frequency]) * amplitude;
            max_value += amplitude;

            amplitude *= self.config.persistence;
            frequency *= self.config.lacunarity;
        }

        if max_value == 0.0 {
            return 0.0;
        }
        value / max_value
    }

    /// Generate noise value at 3D coordinates with multi-octave sampling.
    ///
    /// Returns value in range [-1.0, 1.0].
    pub fn sample_3d(&self, x: f64, y: f64, z: f64) -> f64 {
        let mut value = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = self.config.frequency;
        let mut max_value = 0.0;

        for _ in 0..self.config.octaves {
            value += self
                .simplex
                .get([x * frequency, y * frequency, z * frequency])
                * amplitude;
            max_value += amplitude;

            amplitude *= self.config.persistence;
            frequency *= self.config.lacunarity;
        }

        if max_value == 0.0 {
            return 0.0;
        }
        value / max_value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simplex_determinism() {
        let config = NoiseConfig {
            seed: 42,
            ..Default::default()
        };

        let gen1 = SimplexGenerator::new(config.clone());
        let gen2 = SimplexGenerator::new(config);

        for x in 0..10 {
            for y in 0..10 {
                let val1 = gen1.sample_2d(x as f64 * 0.37, y as f64 * 0.37);
                let val2 = gen2.sample_2d(x as f64 * 0.37, y as f64 * 0.37);
                assert_eq!(val1, val2, "Noise not deterministic at ({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_channel_seeds_are_distinct() {
        let channels = [
            NoiseChannel::PrimaryEdge,
            NoiseChannel::SecondaryEdge,
            NoiseChannel::PrimaryHeight,
            NoiseChannel::SecondaryHeight,
            NoiseChannel::CaveFlow,
        ];
        let mut seeds: Vec<u32> = channels.iter().map(|c| c.seed(987_654_321)).collect();
        seeds.sort_unstable();
        seeds.dedup();
        assert_eq!(seeds.len(), channels.len());
        assert_eq!(NoiseChannel::CaveFlow.seed(100), 111);
    }

    #[test]
    fn test_channel_seed_wraps() {
        assert_eq!(NoiseChannel::SecondaryHeight.seed(u32::MAX as u64), 2);
    }

    #[test]
    fn test_different_seeds_produce_different_noise() {
        let gen1 = SimplexGenerator::new(NoiseConfig::surface(1));
        let gen2 = SimplexGenerator::new(NoiseConfig::surface(2));

        let any_different = (0..20).any(|x| {
            (0..20).any(|y| {
                let val1 = gen1.sample_2d(x as f64 * 0.5, y as f64 * 0.5);
                let val2 = gen2.sample_2d(x as f64 * 0.5, y as f64 * 0.5);
                (val1 - val2).abs() > 0.001
            })
        });

        assert!(
            any_different,
            "Different seeds should produce different noise"
        );
    }

    #[test]
    fn test_simplex_range() {
        let gen = SimplexGenerator::new(NoiseConfig::surface(7));
        for x in 0..50 {
            for y in 0..50 {
                let val = gen.sample_2d(x as f64 * 0.13, y as f64 * 0.13);
                assert!((-1.0..=1.0).contains(&val), "value {} out of range", val);
            }
        }
    }

    #[test]
    fn test_simplex_3d() {
        let gen = SimplexGenerator::new(NoiseConfig::cave_flow(42, 1.0 / 96.0));

        for x in 0..5 {
            for y in 0..5 {
                for z in 0..5 {
                    let val = gen.sample_3d(x as f64 * 7.5, y as f64 * 7.5, z as f64 * 7.5);
                    assert!((-1.0..=1.0).contains(&val), "3D value {} out of range", val);
                }
            }
        }
    }

    #[test]
    fn test_zero_octaves_is_flat() {
        let gen = SimplexGenerator::new(NoiseConfig {
            octaves: 0,
            ..Default::default()
        });
        assert_eq!(gen.sample_2d(3.0, 4.0), 0.0);
        assert_eq!(gen.sample_3d(3.0, 4.0, 5.0), 0.0);
    }
}
