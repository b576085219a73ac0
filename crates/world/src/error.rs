//! Internal invariant violations.
//!
//! Every variant describes a defect: state that the simulation guarantees can
//! never arise. A violation aborts the current tick and halts the simulation.
//! Recoverable user-facing conditions (such as an occupied build site) are
//! reported through [`crate::PlacementCheck`] instead.

use homestead_core::{AgentId, EntityId, InventoryError, JobId, Vec2};
use thiserror::Error;

use crate::chunk::{ChunkId, Occupant};
use crate::entity::EntityType;

/// Result alias for operations that may detect a broken invariant.
pub type WorldResult<T> = Result<T, InvariantViolation>;

/// A broken structural guarantee.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvariantViolation {
    #[error("chunk {0} referenced before it was generated")]
    MissingChunk(ChunkId),
    #[error("{0} does not exist")]
    MissingEntity(EntityId),
    #[error("{0} does not exist")]
    MissingAgent(AgentId),
    #[error("{0} does not exist")]
    MissingJob(JobId),
    #[error("{0} is already registered")]
    DuplicateEntity(EntityId),
    #[error("cell ({x}, {y}) is already occupied by {occupant:?}")]
    CellOccupied { x: i32, y: i32, occupant: Occupant },
    #[error("cell ({x}, {y}) does not link to {expected}")]
    BrokenCellLink { x: i32, y: i32, expected: EntityId },
    #[error("malformed footprint: position {position}, size {size}")]
    MalformedFootprint { position: Vec2, size: Vec2 },
    #[error("{id} is a {found:?}, expected {expected:?}")]
    WrongEntityKind {
        id: EntityId,
        expected: EntityType,
        found: EntityType,
    },
    #[error("tree {0} is already queued for cutting")]
    TreeAlreadyQueued(EntityId),
    #[error("{0:?} cannot be built")]
    NotBuildable(EntityType),
    #[error("{0} is not under construction")]
    NotUnderConstruction(EntityId),
    #[error("inventory of {owner}: {source}")]
    Inventory {
        owner: String,
        #[source]
        source: InventoryError,
    },
    #[error("farm {farm} has no cell index {index}")]
    FarmCellOutOfRange { farm: EntityId, index: usize },
    #[error("farm {farm} cell {index} expected dry but has water {water}")]
    CellAlreadyWatered {
        farm: EntityId,
        index: usize,
        water: f64,
    },
    #[error("no well exists to fetch or return a water bucket")]
    NoWell,
    #[error("{job} is not a {expected} job")]
    JobKindMismatch { job: JobId, expected: &'static str },
    #[error("{job} is already assigned to {agent}")]
    JobAlreadyAssigned { job: JobId, agent: AgentId },
    #[error("simulation halted after an earlier invariant violation")]
    Halted,
}

impl InvariantViolation {
    /// Wrap an inventory error with the owner that raised it.
    pub fn inventory(owner: impl ToString, source: InventoryError) -> Self {
        Self::Inventory {
            owner: owner.to_string(),
            source,
        }
    }
}
