//! Seeded Perlin layers behind terrain classification.
//!
//! Every layer is a pure function of the world seed, so a chunk can be
//! regenerated at any time with identical results.

use noise::{NoiseFn, Perlin};

/// Terrain feature a layer drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoiseLayer {
    /// Grass shade selection
    Grass,
    /// Lakes and ponds
    Water,
    /// Forest density
    Forest,
    /// High-frequency scatter used to thin trees and reeds
    Scatter,
}

/// Octave stack parameters for one layer.
#[derive(Debug, Clone)]
pub struct NoiseConfig {
    pub octaves: u32,
    /// Frequency growth per octave.
    pub lacunarity: f64,
    /// Amplitude decay per octave.
    pub persistence: f64,
    /// Frequency of the first octave, in cycles per cell.
    pub frequency: f64,
    pub seed: u32,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            octaves: 2,
            lacunarity: 2.0,
            persistence: 0.5,
            frequency: 1.0,
            seed: 0,
        }
    }
}

impl NoiseConfig {
    /// Two octaves whose normalized contributions are `major` and `minor`.
    ///
    /// `major + minor` should be 1.0; the persistence is chosen so the
    /// normalized sum weights the octaves exactly that way.
    pub fn weighted_pair(major: f64, minor: f64, frequency: f64, lacunarity: f64, seed: u32) -> Self {
        Self {
            octaves: 2,
            lacunarity,
            persistence: minor / major,
            frequency,
            seed,
        }
    }

    /// Broad grass patches with some texture.
    pub fn grass(seed: u32) -> Self {
        Self::weighted_pair(0.7, 0.3, 0.037, 4.1, seed)
    }

    /// Large smooth lakes.
    pub fn water(seed: u32) -> Self {
        Self::weighted_pair(0.85, 0.15, 0.021, 3.3, seed.wrapping_add(1000))
    }

    /// Forest density.
    pub fn forest(seed: u32) -> Self {
        Self::weighted_pair(0.6, 0.4, 0.043, 2.7, seed.wrapping_add(2000))
    }

    /// Near-white per-cell scatter.
    pub fn scatter(seed: u32) -> Self {
        Self {
            octaves: 1,
            lacunarity: 2.0,
            persistence: 0.5,
            frequency: 0.61,
            seed: seed.wrapping_add(3000),
        }
    }

    /// Preset for a named layer.
    pub fn for_layer(layer: NoiseLayer, seed: u32) -> Self {
        match layer {
            NoiseLayer::Grass => Self::grass(seed),
            NoiseLayer::Water => Self::water(seed),
            NoiseLayer::Forest => Self::forest(seed),
            NoiseLayer::Scatter => Self::scatter(seed),
        }
    }
}

/// Fractal Perlin sampler for one layer.
pub struct NoiseGenerator {
    perlin: Perlin,
    config: NoiseConfig,
}

impl NoiseGenerator {
    pub fn new(config: NoiseConfig) -> Self {
        Self {
            perlin: Perlin::new(config.seed),
            config,
        }
    }

    /// Sum the octaves at `(x, y)`, normalized to [-1, 1].
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

        (value / max_value).clamp(-1.0, 1.0)
    }

    /// Sample remapped to [0, 1].
    pub fn sample_unit(&self, x: f64, y: f64) -> f64 {
        (self.sample_2d(x, y) + 1.0) * 0.5
    }
}

/// Raw layer values for one cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellNoise {
    /// Grass shade value in [0, 1].
    pub grass: f64,
    /// Water value in [-1, 1].
    pub water: f64,
    /// Forest density in [0, 1].
    pub forest: f64,
    /// Scatter sample in [0, 1].
    pub scatter: f64,
}

/// Combines the terrain noise layers for one world seed.
pub struct TerrainNoise {
    grass: NoiseGenerator,
    water: NoiseGenerator,
    forest: NoiseGenerator,
    scatter: NoiseGenerator,
}

impl TerrainNoise {
    /// Create the layered noise source from a world seed.
    pub fn new(world_seed: u64) -> Self {
        // Fold the high bits in so seeds differing only above bit 32 still diverge.
        let seed = (world_seed ^ (world_seed >> 32)) as u32;

        Self {
            grass: NoiseGenerator::new(NoiseConfig::grass(seed)),
            water: NoiseGenerator::new(NoiseConfig::water(seed)),
            forest: NoiseGenerator::new(NoiseConfig::forest(seed)),
            scatter: NoiseGenerator::new(NoiseConfig::scatter(seed)),
        }
    }

    /// Sample every layer at the center of world cell `(x, y)`.
    pub fn sample_cell(&self, x: i32, y: i32) -> CellNoise {
        // Sample at cell centers: Perlin is zero on integer lattice points.
        let fx = f64::from(x) + 0.5;
        let fy = f64::from(y) + 0.5;
        CellNoise {
            grass: self.grass.sample_unit(fx, fy),
            water: self.water.sample_2d(fx, fy),
            forest: self.forest.sample_unit(fx, fy),
            scatter: self.scatter.sample_unit(fx, fy),
        }
    }
}
