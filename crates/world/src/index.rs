//! Chunk and entity index with cell backlinks.

use homestead_core::{EntityId, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use tracing::debug;

use crate::chunk::{Cell, Chunk, ChunkId, Occupant};
use crate::entity::{chunk_ids_for, footprint_cells, footprint_dims, Entity, EntityType};
use crate::error::{InvariantViolation, WorldResult};
use crate::terrain::GeneratedChunk;

/// Outcome of a side-effect-free placement check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementCheck {
    pub valid: bool,
    /// Cells that block the placement: occupied, water, or in an ungenerated chunk.
    pub blocked: Vec<(i32, i32)>,
}

/// Spatial index over generated chunks and live entities.
///
/// Uses BTreeMap for deterministic iteration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldIndex {
    chunks: BTreeMap<ChunkId, Chunk>,
    entities: BTreeMap<EntityId, Entity>,
    next_entity_id: u64,
}

impl WorldIndex {
    pub fn new() -> Self {
        Self {
            chunks: BTreeMap::new(),
            entities: BTreeMap::new(),
            next_entity_id: 1,
        }
    }

    /// Reserve the next runtime entity id.
    pub fn allocate_entity_id(&mut self) -> EntityId {
        let id = EntityId(self.next_entity_id.max(1));
        self.next_entity_id = id.0.saturating_add(1);
        id
    }

    /// Build and place an entity under the next runtime id.
    ///
    /// The id is consumed only when `build` and placement both succeed.
    pub fn place_with_next_id<F>(&mut self, build: F) -> WorldResult<EntityId>
    where
        F: FnOnce(EntityId) -> WorldResult<Entity>,
    {
        let id = EntityId(self.next_entity_id.max(1));
        let id = self.place_entity(build(id)?)?;
        self.next_entity_id = id.0.saturating_add(1).max(self.next_entity_id);
        Ok(id)
    }

    pub fn chunk(&self, id: ChunkId) -> Option<&Chunk> {
        self.chunks.get(&id)
    }

    pub fn contains_chunk(&self, id: ChunkId) -> bool {
        self.chunks.contains_key(&id)
    }

    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.values()
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Insert a freshly generated chunk and register its spawned entities.
    ///
    /// The chunk must not already be present. Spawned entities must already be
    /// linked from the chunk's cells and must not collide with existing ids.
    pub fn insert_chunk(&mut self, generated: GeneratedChunk) -> WorldResult<()> {
        let GeneratedChunk { chunk, entities } = generated;
        let chunk_id = chunk.id();
        if let Some(id) = entities.keys().find(|id| self.entities.contains_key(id)) {
            return Err(InvariantViolation::DuplicateEntity(*id));
        }
        for entity in entities.values() {
            for (x, y) in entity.footprint_cells() {
                if ChunkId::containing(x, y) != chunk_id {
                    return Err(InvariantViolation::MissingChunk(ChunkId::containing(x, y)));
                }
                let local = chunk_id.local(x, y);
                if chunk.cell(local.x, local.y).entity_id() != Some(entity.id) {
                    return Err(InvariantViolation::BrokenCellLink {
                        x,
                        y,
                        expected: entity.id,
                    });
                }
            }
        }

        debug!(chunk = %chunk_id, spawned = entities.len(), "Inserting chunk");
        self.chunks.insert(chunk_id, chunk);
        self.entities.extend(entities);
        Ok(())
    }

    /// Cell containing world-space `pos` (floored).
    pub fn get_cell(&self, pos: Vec2) -> WorldResult<&Cell> {
        let (x, y) = pos.to_cell();
        self.cell_at(x, y)
    }

    /// Cell at world cell coordinates.
    pub fn cell_at(&self, x: i32, y: i32) -> WorldResult<&Cell> {
        let chunk_id = ChunkId::containing(x, y);
        let chunk = self
            .chunks
            .get(&chunk_id)
            .ok_or(InvariantViolation::MissingChunk(chunk_id))?;
        let local = chunk_id.local(x, y);
        let index = local.index();
        Ok(&chunk.cells()[index])
    }

    fn cell_at_mut(&mut self, x: i32, y: i32) -> WorldResult<&mut Cell> {
        let chunk_id = ChunkId::containing(x, y);
        let chunk = self
            .chunks
            .get_mut(&chunk_id)
            .ok_or(InvariantViolation::MissingChunk(chunk_id))?;
        let local = chunk_id.local(x, y);
        Ok(chunk.cell_mut(local.x, local.y))
    }

    /// Every chunk whose 32×32 square intersects the footprint.
    pub fn get_chunk_ids(&self, position: Vec2, size: Vec2) -> WorldResult<BTreeSet<ChunkId>> {
        chunk_ids_for(position, size)
    }

    /// Report whether a footprint could be placed right now.
    pub fn check_placement(&self, position: Vec2, size: Vec2) -> PlacementCheck {
        if footprint_dims(position, size).is_err() {
            return PlacementCheck {
                valid: false,
                blocked: Vec::new(),
            };
        }
        let blocked: Vec<(i32, i32)> = footprint_cells(position, size)
            .filter(|&(x, y)| match self.cell_at(x, y) {
                Ok(cell) => cell.is_occupied() || cell.terrain.is_water(),
                Err(_) => true,
            })
            .collect();
        PlacementCheck {
            valid: blocked.is_empty(),
            blocked,
        }
    }

    /// Insert `entity` and link every footprint cell to it.
    ///
    /// All cells are validated before anything is mutated, so a failed
    /// placement leaves the index untouched.
    pub fn place_entity(&mut self, entity: Entity) -> WorldResult<EntityId> {
        let id = entity.id;
        if self.entities.contains_key(&id) {
            return Err(InvariantViolation::DuplicateEntity(id));
        }
        footprint_dims(entity.position, entity.size)?;
        for (x, y) in entity.footprint_cells() {
            if let Some(occupant) = self.cell_at(x, y)?.occupant {
                return Err(InvariantViolation::CellOccupied { x, y, occupant });
            }
        }

        for (x, y) in entity.footprint_cells() {
            self.cell_at_mut(x, y)?.occupant = Some(Occupant::Entity(id));
        }
        debug!(entity = %id, kind = ?entity.entity_type(), position = %entity.position, "Placed entity");
        self.entities.insert(id, entity);
        Ok(id)
    }

    /// Unlink every footprint cell and remove the entity.
    pub fn remove_entity(&mut self, id: EntityId) -> WorldResult<Entity> {
        let entity = self
            .entities
            .get(&id)
            .ok_or(InvariantViolation::MissingEntity(id))?;
        let cells: Vec<(i32, i32)> = entity.footprint_cells().collect();
        for &(x, y) in &cells {
            if self.cell_at(x, y)?.entity_id() != Some(id) {
                return Err(InvariantViolation::BrokenCellLink { x, y, expected: id });
            }
        }

        for (x, y) in cells {
            self.cell_at_mut(x, y)?.occupant = None;
        }
        let removed = self
            .entities
            .remove(&id)
            .ok_or(InvariantViolation::MissingEntity(id))?;
        debug!(entity = %id, kind = ?removed.entity_type(), "Removed entity");
        Ok(removed)
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Like [`Self::entity`], but absence is a violation.
    pub fn require_entity(&self, id: EntityId) -> WorldResult<&Entity> {
        self.entities
            .get(&id)
            .ok_or(InvariantViolation::MissingEntity(id))
    }

    pub fn require_entity_mut(&mut self, id: EntityId) -> WorldResult<&mut Entity> {
        self.entities
            .get_mut(&id)
            .ok_or(InvariantViolation::MissingEntity(id))
    }

    pub fn contains_entity(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Entities of `kind` in ascending id order.
    pub fn entities_of_kind(&self, kind: EntityType) -> impl Iterator<Item = &Entity> {
        self.entities
            .values()
            .filter(move |e| e.entity_type() == kind)
    }

    /// Ids of entities of `kind`, ascending.
    pub fn entity_ids_of_kind(&self, kind: EntityType) -> Vec<EntityId> {
        self.entities_of_kind(kind).map(|e| e.id).collect()
    }

    /// Closest Active entity of `kind` to `from`; ties go to the lowest id.
    pub fn nearest_active(&self, kind: EntityType, from: Vec2) -> Option<&Entity> {
        let mut best: Option<(&Entity, f64)> = None;
        for entity in self.entities_of_kind(kind).filter(|e| e.is_active()) {
            let distance = entity.position.distance(from);
            match best {
                Some((_, d)) if d <= distance => {}
                _ => best = Some((entity, distance)),
            }
        }
        best.map(|(entity, _)| entity)
    }
}
