use homestead_core::{EntityId, ItemKind};
use homestead_world::{InvariantViolation, WorldResult};
use std::collections::BTreeSet;
use tracing::debug;

use super::{farm_cell_position, JobStatus, StepContext};
use crate::movement::move_towards;

/// Harvest the lowest ripe cell of a farm.
pub(super) fn step(
    farm: EntityId,
    cells: &mut BTreeSet<usize>,
    ctx: &mut StepContext<'_>,
) -> WorldResult<JobStatus> {
    let Some(&cell) = cells.first() else {
        let plot = ctx.index.require_entity_mut(farm)?.expect_farm_mut()?;
        if plot.picking_job == Some(ctx.job) {
            plot.picking_job = None;
        }
        return Ok(JobStatus::Finished);
    };
    let target = farm_cell_position(ctx.index, farm, cell)?;
    if !move_towards(ctx.agent, target, ctx.updates) {
        return Ok(JobStatus::InProgress);
    }

    let plot = ctx.index.require_entity_mut(farm)?.expect_farm_mut()?;
    plot.cell_mut(cell)
        .ok_or(InvariantViolation::FarmCellOutOfRange { farm, index: cell })?
        .maturity = 0.0;
    cells.remove(&cell);
    let finished = cells.is_empty();
    if finished && plot.picking_job == Some(ctx.job) {
        plot.picking_job = None;
    }

    let agent_id = ctx.agent.id;
    ctx.agent
        .inventory
        .add(ItemKind::Food, 1)
        .map_err(|e| InvariantViolation::inventory(agent_id, e))?;
    ctx.updates.entity(farm);
    ctx.updates.agent(agent_id);
    ctx.updates.job(ctx.job);
    debug!(agent = %agent_id, farm = %farm, cell, remaining = cells.len(), "Picked crop");

    Ok(if finished {
        JobStatus::Finished
    } else {
        JobStatus::InProgress
    })
}
