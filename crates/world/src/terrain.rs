//! Terrain generation from layered noise.
//!
//! Generates chunk cells (grass shade, water) and spawns trees and reeds.
//! Output is a pure function of the world seed and chunk id: generating the
//! same chunk twice yields identical cells and identical entities, including
//! entity ids.

use homestead_core::EntityId;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

use crate::chunk::{Cell, Chunk, ChunkId, Occupant, ResourceTag, Terrain};
use crate::entity::Entity;
use crate::noise::{CellNoise, TerrainNoise};

/// Cells within this distance of the world origin never get water or trees.
pub const CLEAR_RADIUS: f64 = 8.0;

/// Grass shade thresholds on the [0, 1] grass value.
const GRASS_LIGHT_BELOW: f64 = 0.45;
const GRASS_DARK_ABOVE: f64 = 0.57;
/// Water thresholds on the [-1, 1] water value.
const SHALLOW_WATER_ABOVE: f64 = 0.32;
const DEEP_WATER_ABOVE: f64 = 0.45;
/// Forest value is rescaled above this point before scattering.
const FOREST_FLOOR: f64 = 0.5;
/// Product of rescaled forest and scatter needed to spawn a tree.
const TREE_THRESHOLD: f64 = 0.2;
/// Scatter needed to grow reeds on shallow water.
const REEDS_THRESHOLD: f64 = 0.8;

/// Cells and entities produced for one chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedChunk {
    pub chunk: Chunk,
    /// Newly spawned entities keyed by id.
    pub entities: BTreeMap<EntityId, Entity>,
}

/// Terrain generator that fills chunks with cells.
pub struct TerrainGenerator {
    world_seed: u64,
    noise: TerrainNoise,
}

impl TerrainGenerator {
    /// Create a new terrain generator from world seed.
    ///
    /// Output is reproducible across processes only when the same seed is pinned.
    pub fn new(world_seed: u64) -> Self {
        Self {
            world_seed,
            noise: TerrainNoise::new(world_seed),
        }
    }

    pub fn world_seed(&self) -> u64 {
        self.world_seed
    }

    /// Generate terrain for the chunk at `chunk_id`.
    #[instrument(skip(self), fields(chunk = %chunk_id, world_seed = self.world_seed))]
    pub fn generate_chunk(&self, chunk_id: ChunkId) -> GeneratedChunk {
        let mut chunk = Chunk::new(chunk_id);
        let mut entities = BTreeMap::new();
        let (origin_x, origin_y) = chunk_id.origin_cell();

        for local_y in 0..crate::CHUNK_SIZE {
            for local_x in 0..crate::CHUNK_SIZE {
                let world_x = origin_x + local_x as i32;
                let world_y = origin_y + local_y as i32;
                let cell = self.generate_cell(world_x, world_y);

                if let Some(Occupant::Entity(_)) = cell.occupant {
                    let tree = Entity::tree(world_x, world_y);
                    entities.insert(tree.id, tree);
                }
                *chunk.cell_mut(local_x, local_y) = cell;
            }
        }

        debug!(trees = entities.len(), "Terrain generation complete");
        GeneratedChunk { chunk, entities }
    }

    /// Classify a single world cell.
    pub fn generate_cell(&self, x: i32, y: i32) -> Cell {
        let sample = self.noise.sample_cell(x, y);
        let clear = in_clear_radius(x, y);

        let terrain = match water_tier(&sample, clear) {
            Some(water) => water,
            None => grass_tier(&sample),
        };

        let occupant = match terrain {
            Terrain::ShallowWater if sample.scatter > REEDS_THRESHOLD => {
                Some(Occupant::Resource(ResourceTag::Reeds))
            }
            t if t.is_grass() && !clear && spawns_tree(&sample) => {
                Some(Occupant::Entity(EntityId::terrain(x, y)))
            }
            _ => None,
        };

        Cell { terrain, occupant }
    }
}

fn in_clear_radius(x: i32, y: i32) -> bool {
    let cx = f64::from(x) + 0.5;
    let cy = f64::from(y) + 0.5;
    cx.hypot(cy) < CLEAR_RADIUS
}

fn grass_tier(sample: &CellNoise) -> Terrain {
    if sample.grass < GRASS_LIGHT_BELOW {
        Terrain::GrassLight
    } else if sample.grass > GRASS_DARK_ABOVE {
        Terrain::GrassDark
    } else {
        Terrain::Grass
    }
}

fn water_tier(sample: &CellNoise, clear: bool) -> Option<Terrain> {
    if clear {
        None
    } else if sample.water > DEEP_WATER_ABOVE {
        Some(Terrain::DeepWater)
    } else if sample.water > SHALLOW_WATER_ABOVE {
        Some(Terrain::ShallowWater)
    } else {
        None
    }
}

fn spawns_tree(sample: &CellNoise) -> bool {
    let density = ((sample.forest - FOREST_FLOOR) / (1.0 - FOREST_FLOOR)).max(0.0);
    density * sample.scatter > TREE_THRESHOLD
}
