use std::fmt;

use homestead_core::{EntityId, Vec2};
use serde::{Deserialize, Serialize};

/// Chunk edge length in cells.
pub const CHUNK_SIZE: usize = 32;
/// Total cell count per chunk.
pub const CHUNK_AREA: usize = CHUNK_SIZE * CHUNK_SIZE;

/// Chunk-local cell position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocalPos {
    pub x: usize,
    pub y: usize,
}

impl LocalPos {
    /// Convert to a linear (row-major) index into the cell array.
    pub fn index(self) -> usize {
        debug_assert!(self.x < CHUNK_SIZE);
        debug_assert!(self.y < CHUNK_SIZE);
        self.y * CHUNK_SIZE + self.x
    }
}

/// Chunk coordinate in chunk space.
/// Implements Ord for deterministic iteration in BTreeMap/BTreeSet (sorts by x, then y).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct ChunkId {
    pub x: i32,
    pub y: i32,
}

impl ChunkId {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chunk containing world cell `(x, y)`.
    pub fn containing(x: i32, y: i32) -> Self {
        let size = CHUNK_SIZE as i32;
        Self::new(x.div_euclid(size), y.div_euclid(size))
    }

    /// Chunk containing a world-space point.
    pub fn containing_point(pos: Vec2) -> Self {
        let (x, y) = pos.to_cell();
        Self::containing(x, y)
    }

    /// World cell coordinates of this chunk's top-left cell.
    pub fn origin_cell(self) -> (i32, i32) {
        let size = CHUNK_SIZE as i32;
        (self.x * size, self.y * size)
    }

    /// World-space origin.
    pub fn origin(self) -> Vec2 {
        let (x, y) = self.origin_cell();
        Vec2::from_cell(x, y)
    }

    /// Chunk-local position of world cell `(x, y)`. The cell must lie in this chunk.
    pub fn local(self, x: i32, y: i32) -> LocalPos {
        let (ox, oy) = self.origin_cell();
        debug_assert_eq!(Self::containing(x, y), self);
        LocalPos {
            x: (x - ox) as usize,
            y: (y - oy) as usize,
        }
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Ground type of a cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terrain {
    GrassLight,
    #[default]
    Grass,
    GrassDark,
    ShallowWater,
    DeepWater,
}

impl Terrain {
    #[inline]
    pub fn is_water(self) -> bool {
        matches!(self, Terrain::ShallowWater | Terrain::DeepWater)
    }

    #[inline]
    pub fn is_grass(self) -> bool {
        !self.is_water()
    }
}

/// Non-entity marker placed on a cell by terrain generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceTag {
    /// Reeds growing in shallow water.
    Reeds,
}

/// What sits on a cell. A cell holds either an entity link or a resource tag, never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Occupant {
    Entity(EntityId),
    Resource(ResourceTag),
}

/// One grid tile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub terrain: Terrain,
    pub occupant: Option<Occupant>,
}

impl Cell {
    pub fn new(terrain: Terrain) -> Self {
        Self {
            terrain,
            occupant: None,
        }
    }

    /// Linked entity, if any.
    #[inline]
    pub fn entity_id(&self) -> Option<EntityId> {
        match self.occupant {
            Some(Occupant::Entity(id)) => Some(id),
            _ => None,
        }
    }

    /// Resource tag, if any.
    #[inline]
    pub fn resource(&self) -> Option<ResourceTag> {
        match self.occupant {
            Some(Occupant::Resource(tag)) => Some(tag),
            _ => None,
        }
    }

    #[inline]
    pub fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }
}

/// Fixed 32×32 grid of cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    id: ChunkId,
    cells: Vec<Cell>,
}

impl Chunk {
    /// Allocate a chunk filled with plain grass.
    pub fn new(id: ChunkId) -> Self {
        Self {
            id,
            cells: vec![Cell::default(); CHUNK_AREA],
        }
    }

    #[inline]
    pub fn id(&self) -> ChunkId {
        self.id
    }

    /// World-space origin of the chunk.
    pub fn origin(&self) -> Vec2 {
        self.id.origin()
    }

    /// Fetch a cell copy by local coordinates.
    pub fn cell(&self, x: usize, y: usize) -> Cell {
        self.cells[LocalPos { x, y }.index()]
    }

    /// Mutable access to a cell by local coordinates.
    pub fn cell_mut(&mut self, x: usize, y: usize) -> &mut Cell {
        &mut self.cells[LocalPos { x, y }.index()]
    }

    /// Borrow raw cell storage (row-major).
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Iterate `(world_x, world_y, cell)` in row-major order.
    pub fn iter_world(&self) -> impl Iterator<Item = (i32, i32, &Cell)> + '_ {
        let (ox, oy) = self.id.origin_cell();
        self.cells.iter().enumerate().map(move |(idx, cell)| {
            let lx = (idx % CHUNK_SIZE) as i32;
            let ly = (idx / CHUNK_SIZE) as i32;
            (ox + lx, oy + ly, cell)
        })
    }
}
