//! Noise generation utilities for terrain generation.
//!
//! Wraps seeded Perlin noise with multi-octave sampling; instances are the
//! opaque noise source handed to biome generators.

use ::noise::{NoiseFn, Perlin};

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
    /// Create config for 3D terrain density noise.
    pub fn terrain_density(seed: u32) -> Self {
        Self {
            octaves: 4,
            lacunarity: 2.0,
            persistence: 0.5,
            frequency: 0.02,
            seed,
        }
    }

    /// Create config for temperature noise (biome assignment).
    pub fn temperature(seed: u32) -> Self {
        Self {
            octaves: 3,
            lacunarity: 2.0,
            persistence: 0.5,
            frequency: 0.008,
            seed: seed.wrapping_add(3000), // Offset seed
        }
    }

    /// Create config for humidity noise (biome assignment).
    pub fn humidity(seed: u32) -> Self {
        Self {
            octaves: 3,
            lacunarity: 2.0,
            persistence: 0.5,
            frequency: 0.008,
            seed: seed.wrapping_add(4000), // Offset seed
        }
    }
}

/// Noise generator using Perlin noise.
pub struct NoiseGenerator {
    perlin: Perlin,
    config: NoiseConfig,
}

impl NoiseGenerator {
    /// Create a new noise generator with the given configuration.
    pub fn new(config: NoiseConfig) -> Self {
        Self {
            perlin: Perlin::new(config.seed),
            config,
        }
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
            value += self.perlin.get([x * frequency, y * frequency]) * amplitude;
            max_value += amplitude;

            amplitude *= self.config.persistence;
            frequency *= self.config.lacunarity;
        }

        // Normalize to [-1.0, 1.0]
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
                .perlin
                .get([x * frequency, y * frequency, z * frequency])
                * amplitude;
            max_value += amplitude;

            amplitude *= self.config.persistence;
            frequency *= self.config.lacunarity;
        }

        // Normalize to [-1.0, 1.0]
        value / max_value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noise_determinism() {
        let config = NoiseConfig {
            octaves: 4,
            lacunarity: 2.0,
            persistence: 0.5,
            frequency: 1.0,
            seed: 12345,
        };

        let gen1 = NoiseGenerator::new(config.clone());
        let gen2 = NoiseGenerator::new(config);

        // Same seed should produce same values
        for x in 0..10 {
            for y in 0..10 {
                let val1 = gen1.sample_2d(x as f64, y as f64);
                let val2 = gen2.sample_2d(x as f64, y as f64);
                assert_eq!(val1, val2, "Noise not deterministic at ({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_noise_range() {
        let gen = NoiseGenerator::new(NoiseConfig::terrain_density(7));

        for x in 0..50 {
            for z in 0..50 {
                let val = gen.sample_3d(x as f64 * 0.7, 13.0, z as f64 * 0.7);
                assert!(
                    (-1.0..=1.0).contains(&val),
                    "Noise value {} out of range at ({}, {})",
                    val,
                    x,
                    z
                );
            }
        }
    }

    #[test]
    fn test_different_seeds_produce_different_noise() {
        let gen1 = NoiseGenerator::new(NoiseConfig::terrain_density(1));
        let gen2 = NoiseGenerator::new(NoiseConfig::terrain_density(2));

        let mut any_different = false;
        for x in 0..20 {
            for z in 0..20 {
                let val1 = gen1.sample_3d(x as f64 * 0.5, 0.0, z as f64 * 0.5);
                let val2 = gen2.sample_3d(x as f64 * 0.5, 0.0, z as f64 * 0.5);
                if (val1 - val2).abs() > 0.001 {
                    any_different = true;
                    break;
                }
            }
            if any_different {
                break;
            }
        }

        assert!(
            any_different,
            "Different seeds should produce different noise"
        );
    }

    #[test]
    fn test_noise_config_presets() {
        let seed = 123;

        let density = NoiseConfig::terrain_density(seed);
        assert_eq!(density.seed, seed);

        let temperature = NoiseConfig::temperature(seed);
        assert_eq!(temperature.seed, seed + 3000); // Offset seed

        let humidity = NoiseConfig::humidity(seed);
        assert_eq!(humidity.seed, seed + 4000); // Offset seed
    }
}
