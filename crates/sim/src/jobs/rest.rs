use homestead_world::WorldResult;
use tracing::debug;

use super::{JobStatus, StepContext};

/// Regain energy in place until fully rested.
pub(super) fn step(ctx: &mut StepContext<'_>) -> WorldResult<JobStatus> {
    let rested = ctx.agent.recover(ctx.params.energy_regen_per_tick);
    ctx.updates.agent(ctx.agent.id);
    if rested {
        debug!(agent = %ctx.agent.id, "Rested");
        Ok(JobStatus::Finished)
    } else {
        Ok(JobStatus::InProgress)
    }
}
