//! One resumable step function per job variant.
//!
//! A step never blocks: if the agent is still walking it records the movement
//! and returns [`JobStatus::InProgress`] with the persisted job state untouched.

mod build;
mod cut_trees;
mod pick_garden;
mod rest;
mod water_garden;

use homestead_core::{EntityId, JobId, Vec2};
use homestead_world::{EntityType, InvariantViolation, WorldIndex, WorldResult};

use crate::agent::Agent;
use crate::config::TickParams;
use crate::job::JobKind;
use crate::updates::WorldUpdates;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum JobStatus {
    InProgress,
    /// Work is exhausted; the scheduler removes the job and frees the agent.
    Finished,
}

/// Mutable state a step may touch besides its own job.
pub(crate) struct StepContext<'a> {
    pub job: JobId,
    pub index: &'a mut WorldIndex,
    pub agent: &'a mut Agent,
    pub updates: &'a mut WorldUpdates,
    pub params: &'a TickParams,
}

/// Advance `kind` by one tick for the agent in `ctx`.
pub(crate) fn step(kind: &mut JobKind, ctx: &mut StepContext<'_>) -> WorldResult<JobStatus> {
    match kind {
        JobKind::CutTrees { trees } => cut_trees::step(trees, ctx),
        JobKind::Build { target } => build::step(*target, ctx),
        JobKind::PickGarden { farm, cells } => pick_garden::step(*farm, cells, ctx),
        JobKind::WaterGarden { farm, phase, cells } => water_garden::step(*farm, phase, cells, ctx),
        JobKind::AgentRest => rest::step(ctx),
    }
}

/// World position of farm cell `cell`.
fn farm_cell_position(index: &WorldIndex, farm: EntityId, cell: usize) -> WorldResult<Vec2> {
    let entity = index.require_entity(farm)?;
    let plot = entity.farm().ok_or(InvariantViolation::WrongEntityKind {
        id: farm,
        expected: EntityType::Farm,
        found: entity.entity_type(),
    })?;
    if plot.cell(cell).is_none() {
        return Err(InvariantViolation::FarmCellOutOfRange { farm, index: cell });
    }
    Ok(entity.position + plot.offset(cell))
}
