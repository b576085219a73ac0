//! Placed and generated entities.
//!
//! Every entity occupies an axis-aligned rectangle of whole cells anchored at
//! its integral `position`. Variant data lives in [`EntityKind`].

use homestead_core::{EntityId, Inventory, ItemKind, Materials, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::chunk::ChunkId;
use crate::error::{InvariantViolation, WorldResult};
use crate::farming::FarmPlot;

/// Items a storage-like entity holds per footprint cell.
pub const STORAGE_ITEMS_PER_CELL: u32 = 16;
/// Longest footprint edge, in cells.
pub const MAX_FOOTPRINT_SIDE: usize = 256;

/// Entity discriminant, used by build requests and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityType {
    Tree,
    Farm,
    House,
    Storage,
    Well,
    Stockpile,
}

impl EntityType {
    /// Fixed material requirement for constructing this type.
    pub fn required_materials(self) -> Materials {
        let mut materials = Materials::new();
        match self {
            EntityType::House => {
                materials.insert(ItemKind::Wood, 4);
            }
            EntityType::Storage | EntityType::Well => {
                materials.insert(ItemKind::Wood, 2);
            }
            EntityType::Tree | EntityType::Farm | EntityType::Stockpile => {}
        }
        materials
    }

    /// Whether players may place this type.
    pub fn is_buildable(self) -> bool {
        !matches!(self, EntityType::Tree)
    }
}

/// Lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityState {
    Active,
    UnderConstruction { required: Materials },
}

/// Variant-specific data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntityKind {
    Tree,
    Farm(FarmPlot),
    House,
    Storage(Inventory),
    Well,
    Stockpile(Inventory),
}

impl EntityKind {
    /// Fresh variant data for a footprint of `width × height` cells.
    pub fn for_type(entity_type: EntityType, width: usize, height: usize) -> Self {
        let capacity = (width * height) as u32 * STORAGE_ITEMS_PER_CELL;
        match entity_type {
            EntityType::Tree => EntityKind::Tree,
            EntityType::Farm => EntityKind::Farm(FarmPlot::new(width, height)),
            EntityType::House => EntityKind::House,
            EntityType::Storage => EntityKind::Storage(Inventory::with_capacity(capacity)),
            EntityType::Well => EntityKind::Well,
            EntityType::Stockpile => EntityKind::Stockpile(Inventory::with_capacity(capacity)),
        }
    }

    pub fn entity_type(&self) -> EntityType {
        match self {
            EntityKind::Tree => EntityType::Tree,
            EntityKind::Farm(_) => EntityType::Farm,
            EntityKind::House => EntityType::House,
            EntityKind::Storage(_) => EntityType::Storage,
            EntityKind::Well => EntityType::Well,
            EntityKind::Stockpile(_) => EntityType::Stockpile,
        }
    }
}

/// An object occupying one or more cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub position: Vec2,
    pub size: Vec2,
    /// Chunks intersected by the footprint.
    pub chunk_ids: BTreeSet<ChunkId>,
    pub state: EntityState,
    pub kind: EntityKind,
}

impl Entity {
    /// Build an Active entity of `entity_type` with its footprint's chunk set.
    pub fn new(
        id: EntityId,
        entity_type: EntityType,
        position: Vec2,
        size: Vec2,
    ) -> WorldResult<Self> {
        let (width, height) = footprint_dims(position, size)?;
        Ok(Self {
            id,
            position,
            size,
            chunk_ids: chunk_ids_for(position, size)?,
            state: EntityState::Active,
            kind: EntityKind::for_type(entity_type, width, height),
        })
    }

    /// 1×1 tree at world cell `(x, y)` with its terrain-derived id.
    pub fn tree(x: i32, y: i32) -> Self {
        let position = Vec2::from_cell(x, y);
        let mut chunk_ids = BTreeSet::new();
        chunk_ids.insert(ChunkId::containing(x, y));
        Self {
            id: EntityId::terrain(x, y),
            position,
            size: Vec2::ONE,
            chunk_ids,
            state: EntityState::Active,
            kind: EntityKind::Tree,
        }
    }

    pub fn entity_type(&self) -> EntityType {
        self.kind.entity_type()
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, EntityState::Active)
    }

    /// Required materials while under construction.
    pub fn required_materials(&self) -> Option<&Materials> {
        match &self.state {
            EntityState::UnderConstruction { required } => Some(required),
            EntityState::Active => None,
        }
    }

    /// World cells covered by the footprint, row-major.
    pub fn footprint_cells(&self) -> impl Iterator<Item = (i32, i32)> {
        footprint_cells(self.position, self.size)
    }

    pub fn farm(&self) -> Option<&FarmPlot> {
        match &self.kind {
            EntityKind::Farm(plot) => Some(plot),
            _ => None,
        }
    }

    pub fn farm_mut(&mut self) -> Option<&mut FarmPlot> {
        match &mut self.kind {
            EntityKind::Farm(plot) => Some(plot),
            _ => None,
        }
    }

    /// Bounded inventory of a Storage or Stockpile.
    pub fn inventory(&self) -> Option<&Inventory> {
        match &self.kind {
            EntityKind::Storage(inv) | EntityKind::Stockpile(inv) => Some(inv),
            _ => None,
        }
    }

    pub fn inventory_mut(&mut self) -> Option<&mut Inventory> {
        match &mut self.kind {
            EntityKind::Storage(inv) | EntityKind::Stockpile(inv) => Some(inv),
            _ => None,
        }
    }

    /// Borrow the farm plot or report a kind mismatch.
    pub fn expect_farm_mut(&mut self) -> WorldResult<&mut FarmPlot> {
        let id = self.id;
        let found = self.entity_type();
        self.farm_mut().ok_or(InvariantViolation::WrongEntityKind {
            id,
            expected: EntityType::Farm,
            found,
        })
    }
}

/// Validate a footprint and return its dimensions in cells.
///
/// Position must be integral, size a whole number of cells in
/// `1..=MAX_FOOTPRINT_SIDE` per axis, and every covered cell must fit in
/// `i32` cell coordinates.
pub fn footprint_dims(position: Vec2, size: Vec2) -> WorldResult<(usize, usize)> {
    let integral = |v: f64| v.is_finite() && v.fract() == 0.0;
    let side = |v: f64| integral(v) && (1.0..=MAX_FOOTPRINT_SIDE as f64).contains(&v);
    let fits = |start: f64, len: f64| {
        integral(start) && start >= f64::from(i32::MIN) && start + len - 1.0 <= f64::from(i32::MAX)
    };
    if !side(size.x) || !side(size.y) || !fits(position.x, size.x) || !fits(position.y, size.y) {
        return Err(InvariantViolation::MalformedFootprint { position, size });
    }
    Ok((size.x as usize, size.y as usize))
}

/// World cells covered by a footprint, row-major. Assumes a valid footprint.
pub fn footprint_cells(position: Vec2, size: Vec2) -> impl Iterator<Item = (i32, i32)> {
    let (x0, y0) = position.to_cell();
    let w = size.x as i32;
    let h = size.y as i32;
    (0..h).flat_map(move |dy| (0..w).map(move |dx| (x0 + dx, y0 + dy)))
}

/// Every chunk whose 32×32 square intersects the footprint.
pub fn chunk_ids_for(position: Vec2, size: Vec2) -> WorldResult<BTreeSet<ChunkId>> {
    let (w, h) = footprint_dims(position, size)?;
    let (x0, y0) = position.to_cell();
    let first = ChunkId::containing(x0, y0);
    let last = ChunkId::containing(x0 + w as i32 - 1, y0 + h as i32 - 1);
    let mut ids = BTreeSet::new();
    for cy in first.y..=last.y {
        for cx in first.x..=last.x {
            ids.insert(ChunkId::new(cx, cy));
        }
    }
    Ok(ids)
}
