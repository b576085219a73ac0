//! One discrete world step: farm aging, agent energy, job assignment, dispatch.

use homestead_core::{AgentId, ItemKind, JobId};
use homestead_world::{EntityType, InvariantViolation, WorldIndex, WorldResult};
use tracing::{debug, instrument};

use crate::agent::Agent;
use crate::config::TickParams;
use crate::job::{JobBoard, JobKind, WaterPhase};
use crate::jobs::{self, JobStatus, StepContext};
use crate::updates::WorldUpdates;
use crate::world::World;

/// Advance `world` by one tick and report every id touched.
///
/// On error the world may be partially updated; callers must stop ticking it.
#[instrument(skip_all, fields(tick = world.tick.0))]
pub fn tick(world: &mut World, params: &TickParams) -> WorldResult<WorldUpdates> {
    let mut updates = WorldUpdates::new();

    age_farms(world, params, &mut updates)?;

    let agent_ids: Vec<AgentId> = world.agents.keys().copied().collect();
    for agent_id in agent_ids {
        run_agent(world, agent_id, params, &mut updates)?;
    }

    world.tick = world.tick.advance(1);
    debug!(
        entities = updates.entities.len(),
        agents = updates.agents.len(),
        jobs = updates.jobs.len(),
        "Tick complete"
    );
    Ok(updates)
}

/// Grow every active farm and queue its ripe cells for picking.
fn age_farms(world: &mut World, params: &TickParams, updates: &mut WorldUpdates) -> WorldResult<()> {
    for farm_id in world.index.entity_ids_of_kind(EntityType::Farm) {
        let entity = world.index.require_entity_mut(farm_id)?;
        if !entity.is_active() {
            continue;
        }
        let plot = entity.expect_farm_mut()?;
        let ready = plot.advance(&params.growth);
        updates.entity(farm_id);
        if ready.is_empty() {
            continue;
        }

        match plot.picking_job {
            Some(job_id) => match &mut world.jobs.require_mut(job_id)?.kind {
                JobKind::PickGarden { cells, .. } => {
                    let before = cells.len();
                    cells.extend(ready);
                    if cells.len() != before {
                        updates.job(job_id);
                    }
                }
                _ => {
                    return Err(InvariantViolation::JobKindMismatch {
                        job: job_id,
                        expected: "PickGarden",
                    })
                }
            },
            None => {
                let job_id = world.jobs.create(JobKind::PickGarden {
                    farm: farm_id,
                    cells: ready,
                });
                plot.picking_job = Some(job_id);
                updates.job(job_id);
                debug!(farm = %farm_id, job = %job_id, "Queued harvest");
            }
        }
    }
    Ok(())
}

fn run_agent(
    world: &mut World,
    agent_id: AgentId,
    params: &TickParams,
    updates: &mut WorldUpdates,
) -> WorldResult<()> {
    let World {
        index,
        agents,
        jobs: board,
        ..
    } = world;
    let agent = agents
        .get_mut(&agent_id)
        .ok_or(InvariantViolation::MissingAgent(agent_id))?;

    let resting = match agent.job {
        Some(job_id) => board
            .get(job_id)
            .ok_or(InvariantViolation::MissingJob(job_id))?
            .kind
            .is_rest(),
        None => false,
    };
    if !resting {
        if agent.drain(params.energy_decay_per_tick) {
            updates.agent(agent_id);
        }
        if agent.energy <= 0.0 {
            if let Some(previous) = agent.job.take() {
                release_job(board, agent, previous)?;
                updates.job(previous);
            }
            let rest = board.create(JobKind::AgentRest);
            board.assign(rest, agent_id)?;
            agent.job = Some(rest);
            updates.job(rest);
            updates.agent(agent_id);
            debug!(agent = %agent_id, job = %rest, "Exhausted, resting");
        }
    }

    if agent.job.is_none() {
        if let Some(job_id) = find_job(index, board, agent)? {
            board.assign(job_id, agent_id)?;
            agent.job = Some(job_id);
            updates.job(job_id);
            updates.agent(agent_id);
            debug!(agent = %agent_id, job = %job_id, "Claimed job");
        }
    }

    let Some(job_id) = agent.job else {
        return Ok(());
    };
    let job = board.require_mut(job_id)?;
    let mut ctx = StepContext {
        job: job_id,
        index: &mut *index,
        agent: &mut *agent,
        updates: &mut *updates,
        params,
    };
    let status = jobs::step(&mut job.kind, &mut ctx)?;
    if status == JobStatus::Finished {
        let finished = board.remove(job_id)?;
        agent.job = None;
        updates.job(job_id);
        updates.agent(agent_id);
        debug!(agent = %agent_id, job = %job_id, kind = finished.kind.name(), "Job finished");
    }
    Ok(())
}

/// First pending job, in id order, that `agent` can start right now.
fn find_job(index: &WorldIndex, jobs: &JobBoard, agent: &Agent) -> WorldResult<Option<JobId>> {
    for job in jobs.pending() {
        if can_start(index, agent, &job.kind)? {
            return Ok(Some(job.id));
        }
    }
    Ok(None)
}

fn can_start(index: &WorldIndex, agent: &Agent, kind: &JobKind) -> WorldResult<bool> {
    Ok(match kind {
        JobKind::CutTrees { .. } | JobKind::PickGarden { .. } => true,
        JobKind::Build { target } => {
            let required = index
                .require_entity(*target)?
                .required_materials()
                .ok_or(InvariantViolation::NotUnderConstruction(*target))?;
            agent.inventory.covers(required)
        }
        JobKind::WaterGarden { .. } => {
            !agent.holds_bucket()
                && index
                    .nearest_active(EntityType::Well, agent.position)
                    .is_some()
        }
        JobKind::AgentRest => false,
    })
}

/// Hand `job_id` back to the pool. A half-done watering run drops its bucket
/// and restarts from the well, so the next agent fetches its own.
fn release_job(jobs: &mut JobBoard, agent: &mut Agent, job_id: JobId) -> WorldResult<()> {
    let job = jobs.require_mut(job_id)?;
    if let JobKind::WaterGarden { phase, .. } = &mut job.kind {
        if *phase != WaterPhase::PickUpWaterBucket {
            agent
                .inventory
                .remove(ItemKind::WaterBucket, 1)
                .map_err(|e| InvariantViolation::inventory(agent.id, e))?;
            *phase = WaterPhase::PickUpWaterBucket;
        }
    }
    if job.kind.is_rest() {
        jobs.remove(job_id)?;
    } else {
        jobs.release(job_id)?;
    }
    debug!(agent = %agent.id, job = %job_id, "Released job");
    Ok(())
}
