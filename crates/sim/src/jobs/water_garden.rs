use homestead_core::{EntityId, ItemKind, Vec2};
use homestead_world::{EntityType, InvariantViolation, WorldIndex, WorldResult};
use std::collections::BTreeSet;
use tracing::debug;

use super::{farm_cell_position, JobStatus, StepContext};
use crate::job::WaterPhase;
use crate::movement::move_towards;

/// Fetch a bucket, irrigate each dry cell, then return the bucket.
pub(super) fn step(
    farm: EntityId,
    phase: &mut WaterPhase,
    cells: &mut BTreeSet<usize>,
    ctx: &mut StepContext<'_>,
) -> WorldResult<JobStatus> {
    let agent_id = ctx.agent.id;
    match *phase {
        WaterPhase::PickUpWaterBucket => {
            let well = nearest_well(ctx.index, ctx.agent.position)?;
            if !move_towards(ctx.agent, well, ctx.updates) {
                return Ok(JobStatus::InProgress);
            }
            ctx.agent
                .inventory
                .add(ItemKind::WaterBucket, 1)
                .map_err(|e| InvariantViolation::inventory(agent_id, e))?;
            *phase = WaterPhase::WaterGarden;
            ctx.updates.agent(agent_id);
            ctx.updates.job(ctx.job);
            debug!(agent = %agent_id, farm = %farm, "Filled water bucket");
            Ok(JobStatus::InProgress)
        }
        WaterPhase::WaterGarden => {
            let Some(&cell) = cells.first() else {
                *phase = WaterPhase::DropOffWaterBucket;
                ctx.updates.job(ctx.job);
                return Ok(JobStatus::InProgress);
            };
            let target = farm_cell_position(ctx.index, farm, cell)?;
            if !move_towards(ctx.agent, target, ctx.updates) {
                return Ok(JobStatus::InProgress);
            }

            let plot = ctx.index.require_entity_mut(farm)?.expect_farm_mut()?;
            let state = plot
                .cell_mut(cell)
                .ok_or(InvariantViolation::FarmCellOutOfRange { farm, index: cell })?;
            if state.water != 0.0 {
                return Err(InvariantViolation::CellAlreadyWatered {
                    farm,
                    index: cell,
                    water: state.water,
                });
            }
            state.water = 1.0;
            cells.remove(&cell);
            if cells.is_empty() {
                *phase = WaterPhase::DropOffWaterBucket;
            }
            ctx.updates.entity(farm);
            ctx.updates.job(ctx.job);
            Ok(JobStatus::InProgress)
        }
        WaterPhase::DropOffWaterBucket => {
            let well = nearest_well(ctx.index, ctx.agent.position)?;
            if !move_towards(ctx.agent, well, ctx.updates) {
                return Ok(JobStatus::InProgress);
            }
            ctx.agent
                .inventory
                .remove(ItemKind::WaterBucket, 1)
                .map_err(|e| InvariantViolation::inventory(agent_id, e))?;
            let plot = ctx.index.require_entity_mut(farm)?.expect_farm_mut()?;
            if plot.watering_job == Some(ctx.job) {
                plot.watering_job = None;
            }
            ctx.updates.agent(agent_id);
            ctx.updates.entity(farm);
            debug!(agent = %agent_id, farm = %farm, "Returned water bucket");
            Ok(JobStatus::Finished)
        }
    }
}

fn nearest_well(index: &WorldIndex, from: Vec2) -> WorldResult<Vec2> {
    index
        .nearest_active(EntityType::Well, from)
        .map(|well| well.position)
        .ok_or(InvariantViolation::NoWell)
}
