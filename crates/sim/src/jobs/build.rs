use homestead_core::EntityId;
use homestead_world::{EntityState, InvariantViolation, WorldResult};
use tracing::debug;

use super::{JobStatus, StepContext};
use crate::movement::move_towards;

/// Walk to a construction site and spend the carried materials on it.
pub(super) fn step(target: EntityId, ctx: &mut StepContext<'_>) -> WorldResult<JobStatus> {
    let site = ctx.index.require_entity(target)?;
    let required = site
        .required_materials()
        .cloned()
        .ok_or(InvariantViolation::NotUnderConstruction(target))?;
    let position = site.position;
    if !move_towards(ctx.agent, position, ctx.updates) {
        return Ok(JobStatus::InProgress);
    }

    let agent_id = ctx.agent.id;
    ctx.agent
        .inventory
        .consume(&required)
        .map_err(|e| InvariantViolation::inventory(agent_id, e))?;
    ctx.index.require_entity_mut(target)?.state = EntityState::Active;
    ctx.updates.entity(target);
    ctx.updates.agent(agent_id);
    debug!(agent = %agent_id, entity = %target, "Construction complete");
    Ok(JobStatus::Finished)
}
