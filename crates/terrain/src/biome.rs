//! Biome system for terrain generation.
//!
//! Maps world coordinates to terrain generators via temperature and humidity
//! noise, and defines the generator capability surface consumed by the chunk
//! interpolation engine.

use crate::noise::{NoiseConfig, NoiseGenerator};
use crate::world::WorldContext;
use lru::LruCache;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use tracing::trace;

/// Generation pipeline phase a biome lookup is performed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenerationPhase {
    /// Base density/height shaping.
    Base,
    /// Block palette application.
    Palette,
    /// Decoration and structure population.
    Population,
}

/// Stable identity key of a generator.
///
/// Two generators with equal keys must produce indistinguishable terrain:
/// boundary classification compares keys, never instance identity, so a
/// provider is free to hand out fresh handles per lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeneratorKey(pub u64);

/// Per-biome terrain generator capability.
///
/// `sample` must be a pure function of its arguments and the generator's own
/// immutable parameters; the chunk interpolator calls it from whichever thread
/// builds the chunk.
pub trait Generator: Send + Sync {
    /// Identity key derived from biome-defining parameters.
    fn key(&self) -> GeneratorKey;

    /// When true, lattice corners inside a uniform region of this generator
    /// skip smoothing and use the raw sample, preserving sharp local features.
    fn uses_minimal_interpolation(&self) -> bool {
        false
    }

    /// Evaluate the generator's noise function at absolute world coordinates.
    fn sample(&self, noise: &NoiseGenerator, world: &WorldContext, x: f64, y: f64, z: f64) -> f64;
}

/// Maps world coordinates to generator handles.
///
/// Must be pure over world coordinates for the duration of a generation pass:
/// chunk interpolators sample a one-column halo beyond their own footprint and
/// rely on neighboring chunks seeing identical handles at identical
/// coordinates. Wrap impure providers in [`CachedProvider`].
pub trait BiomeProvider: Send + Sync {
    fn generator_at(
        &self,
        world_x: i32,
        world_z: i32,
        phase: GenerationPhase,
    ) -> Arc<dyn Generator>;
}

/// Biome identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BiomeId {
    Tundra,
    Plains,
    Forest,
    Hills,
    Mountains,
    Desert,
    Swamp,
    Ocean,
}

impl BiomeId {
    /// Get all biome IDs (for iteration).
    pub fn all() -> &'static [BiomeId] {
        &[
            BiomeId::Tundra,
            BiomeId::Plains,
            BiomeId::Forest,
            BiomeId::Hills,
            BiomeId::Mountains,
            BiomeId::Desert,
            BiomeId::Swamp,
            BiomeId::Ocean,
        ]
    }
}

/// Density-noise generator parameterized per biome.
#[derive(Debug, Clone)]
pub struct BiomeGenerator {
    biome: BiomeId,
    /// Scales the raw noise contribution.
    amplitude: f64,
    /// Constant density offset (positive pushes terrain up).
    height_offset: f64,
    minimal_interpolation: bool,
}

impl BiomeGenerator {
    /// Generator parameters for a biome.
    pub fn for_biome(biome: BiomeId) -> Self {
        match biome {
            BiomeId::Tundra => Self {
                biome,
                amplitude: 8.0,
                height_offset: 2.0,
                minimal_interpolation: false,
            },
            BiomeId::Plains => Self {
                biome,
                amplitude: 6.0,
                height_offset: 0.0,
                minimal_interpolation: false,
            },
            BiomeId::Forest => Self {
                biome,
                amplitude: 10.0,
                height_offset: 2.0,
                minimal_interpolation: false,
            },
            BiomeId::Hills => Self {
                biome,
                amplitude: 18.0,
                height_offset: 6.0,
                minimal_interpolation: false,
            },
            // Jagged peaks degrade visibly under cross-averaging, so mountains
            // opt out of smoothing inside uniform regions.
            BiomeId::Mountains => Self {
                biome,
                amplitude: 32.0,
                height_offset: 14.0,
                minimal_interpolation: true,
            },
            BiomeId::Desert => Self {
                biome,
                amplitude: 5.0,
                height_offset: -1.0,
                minimal_interpolation: false,
            },
            BiomeId::Swamp => Self {
                biome,
                amplitude: 4.0,
                height_offset: -3.0,
                minimal_interpolation: false,
            },
            BiomeId::Ocean => Self {
                biome,
                amplitude: 6.0,
                height_offset: -12.0,
                minimal_interpolation: false,
            },
        }
    }

    pub fn biome(&self) -> BiomeId {
        self.biome
    }
}

impl Generator for BiomeGenerator {
    fn key(&self) -> GeneratorKey {
        GeneratorKey(self.biome as u64)
    }

    fn uses_minimal_interpolation(&self) -> bool {
        self.minimal_interpolation
    }

    fn sample(&self, noise: &NoiseGenerator, _world: &WorldContext, x: f64, y: f64, z: f64) -> f64 {
        noise.sample_3d(x, y, z) * self.amplitude + self.height_offset
    }
}

/// Biome lookup table based on temperature and humidity.
///
/// Uses a 2D grid to map (temperature, humidity) to BiomeId.
pub struct BiomeLookup {
    /// Grid resolution for temperature axis
    temp_resolution: usize,
    /// Grid resolution for humidity axis
    humidity_resolution: usize,
    /// Lookup table indexed as [temp_idx][humidity_idx]
    table: Vec<Vec<BiomeId>>,
}

impl BiomeLookup {
    /// Create a new biome lookup table with default resolution.
    pub fn new() -> Self {
        const RESOLUTION: usize = 16;
        let mut table = vec![vec![BiomeId::Plains; RESOLUTION]; RESOLUTION];

        for (temp_idx, row) in table.iter_mut().enumerate() {
            let temp = temp_idx as f32 / (RESOLUTION - 1) as f32;
            for (humidity_idx, cell) in row.iter_mut().enumerate() {
                let humidity = humidity_idx as f32 / (RESOLUTION - 1) as f32;
                *cell = Self::select_biome(temp, humidity);
            }
        }

        Self {
            temp_resolution: RESOLUTION,
            humidity_resolution: RESOLUTION,
            table,
        }
    }

    /// Select biome based on temperature and humidity values [0.0, 1.0].
    fn select_biome(temp: f32, humidity: f32) -> BiomeId {
        if humidity > 0.85 {
            return BiomeId::Ocean;
        }
        // Cold biomes (temp < 0.3)
        if temp < 0.3 {
            if humidity > 0.5 {
                BiomeId::Mountains
            } else {
                BiomeId::Tundra
            }
        }
        // Hot biomes (temp > 0.7)
        else if temp > 0.7 {
            if humidity > 0.6 {
                BiomeId::Swamp
            } else {
                BiomeId::Desert
            }
        }
        // Temperate biomes (0.3 <= temp <= 0.7)
        else if humidity > 0.6 {
            BiomeId::Forest
        } else if humidity > 0.35 {
            BiomeId::Plains
        } else {
            BiomeId::Hills
        }
    }

    /// Look up biome from temperature and humidity values [0.0, 1.0].
    pub fn lookup(&self, temp: f32, humidity: f32) -> BiomeId {
        let temp_clamped = temp.clamp(0.0, 1.0);
        let humidity_clamped = humidity.clamp(0.0, 1.0);

        let temp_idx = (temp_clamped * (self.temp_resolution - 1) as f32) as usize;
        let humidity_idx = (humidity_clamped * (self.humidity_resolution - 1) as f32) as usize;

        self.table[temp_idx][humidity_idx]
    }
}

impl Default for BiomeLookup {
    fn default() -> Self {
        Self::new()
    }
}

/// Provider assigning biome generators from temperature and humidity noise.
pub struct NoiseBiomeProvider {
    temperature_noise: NoiseGenerator,
    humidity_noise: NoiseGenerator,
    lookup: BiomeLookup,
    generators: HashMap<BiomeId, Arc<dyn Generator>>,
}

impl NoiseBiomeProvider {
    /// Create a new provider from world seed.
    pub fn new(world_seed: u64) -> Self {
        let seed = world_seed as u32;
        let generators = BiomeId::all()
            .iter()
            .map(|&biome| {
                (
                    biome,
                    Arc::new(BiomeGenerator::for_biome(biome)) as Arc<dyn Generator>,
                )
            })
            .collect();

        Self {
            temperature_noise: NoiseGenerator::new(NoiseConfig::temperature(seed)),
            humidity_noise: NoiseGenerator::new(NoiseConfig::humidity(seed)),
            lookup: BiomeLookup::new(),
            generators,
        }
    }

    /// Get biome at world coordinates.
    pub fn biome_at(&self, world_x: i32, world_z: i32) -> BiomeId {
        let x = world_x as f64;
        let z = world_z as f64;

        // Sample noise and map from [-1, 1] to [0, 1]
        let temp = (self.temperature_noise.sample_2d(x, z) + 1.0) * 0.5;
        let humidity = (self.humidity_noise.sample_2d(x, z) + 1.0) * 0.5;

        self.lookup.lookup(temp as f32, humidity as f32)
    }
}

impl BiomeProvider for NoiseBiomeProvider {
    fn generator_at(
        &self,
        world_x: i32,
        world_z: i32,
        _phase: GenerationPhase,
    ) -> Arc<dyn Generator> {
        let biome = self.biome_at(world_x, world_z);
        Arc::clone(&self.generators[&biome])
    }
}

/// Memoizing wrapper enforcing provider purity across chunk builds.
///
/// Halo-based blending requires identical handles for identical coordinates
/// regardless of which chunk triggers the lookup; routing every lookup through
/// one cache guarantees that for the cache's lifetime even if the wrapped
/// provider is only approximately pure.
pub struct CachedProvider<P> {
    inner: P,
    cache: Mutex<LruCache<(i32, i32, GenerationPhase), Arc<dyn Generator>>>,
}

impl<P: BiomeProvider> CachedProvider<P> {
    pub fn new(inner: P, capacity: NonZeroUsize) -> Self {
        Self {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }
}

impl<P: BiomeProvider> BiomeProvider for CachedProvider<P> {
    fn generator_at(
        &self,
        world_x: i32,
        world_z: i32,
        phase: GenerationPhase,
    ) -> Arc<dyn Generator> {
        let mut cache = self.cache.lock().expect("biome cache poisoned");
        if let Some(generator) = cache.get(&(world_x, world_z, phase)) {
            return Arc::clone(generator);
        }
        trace!(world_x, world_z, ?phase, "biome cache miss");
        let generator = self.inner.generator_at(world_x, world_z, phase);
        cache.put((world_x, world_z, phase), Arc::clone(&generator));
        generator
    }
}
