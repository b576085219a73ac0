//! Application context owning the world between ticks.

use homestead_core::{scoped_rng, AgentId, EntityId, JobId, SimTick, Vec2};
use homestead_world::{
    ChunkId, Entity, EntityState, EntityType, GeneratedChunk, InvariantViolation,
    PlacementCheck, TerrainGenerator, WorldResult,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use tracing::{debug, error, info, instrument};

use crate::agent::Agent;
use crate::config::{SimConfig, TickParams};
use crate::job::{JobKind, WaterPhase};
use crate::scheduler;
use crate::updates::WorldUpdates;
use crate::world::World;

/// RNG stream for initial agent placement.
const AGENT_SPAWN_STREAM: u64 = 0xA6E7;
/// Spawned agents land within this many cells of the origin on each axis.
const AGENT_SPAWN_SPREAD: f64 = 3.0;

/// Result of a build confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOrder {
    pub entity: EntityId,
    /// Build job queued for an UnderConstruction site.
    pub job: Option<JobId>,
}

/// Owns the world, the terrain generator, and the tick parameters.
///
/// `tick` takes `&mut self`, so no reader can observe a half-applied tick.
pub struct Simulation {
    config: SimConfig,
    params: TickParams,
    generator: TerrainGenerator,
    world: World,
    halted: bool,
}

impl Simulation {
    /// Generate the starting area and spawn the configured agents.
    pub fn new(config: SimConfig) -> WorldResult<Self> {
        let mut sim = Self::empty(config);
        let radius = sim.config.initial_chunk_radius.max(0);
        for y in -radius..=radius {
            for x in -radius..=radius {
                sim.request_chunk(ChunkId::new(x, y))?;
            }
        }

        let mut rng = scoped_rng(sim.config.world_seed, AGENT_SPAWN_STREAM, SimTick::ZERO);
        for _ in 0..sim.config.agent_count {
            let position = Vec2::new(
                rng.gen_range(-AGENT_SPAWN_SPREAD..AGENT_SPAWN_SPREAD),
                rng.gen_range(-AGENT_SPAWN_SPREAD..AGENT_SPAWN_SPREAD),
            );
            sim.spawn_agent(position);
        }

        info!(
            world_seed = sim.config.world_seed,
            chunks = sim.world.index.chunk_count(),
            entities = sim.world.index.entity_count(),
            agents = sim.world.agents.len(),
            "World initialized"
        );
        Ok(sim)
    }

    /// A simulation with no chunks and no agents.
    pub fn empty(config: SimConfig) -> Self {
        Self {
            params: config.tick_params(),
            generator: TerrainGenerator::new(config.world_seed),
            world: World::new(),
            halted: false,
            config,
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Read-only snapshot between ticks.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Direct access for scenario setup.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Advance one tick. An invariant violation halts the simulation for good.
    #[instrument(skip(self), fields(tick = self.world.tick.0))]
    pub fn tick(&mut self) -> WorldResult<WorldUpdates> {
        self.ensure_running()?;
        match scheduler::tick(&mut self.world, &self.params) {
            Ok(updates) => Ok(updates),
            Err(violation) => {
                error!(%violation, "Invariant violated, halting simulation");
                self.halted = true;
                Err(violation)
            }
        }
    }

    /// Generate `chunk_id` if needed and return it with any newly spawned entities.
    ///
    /// Requesting an existing chunk returns it unchanged with no new entities.
    pub fn request_chunk(&mut self, chunk_id: ChunkId) -> WorldResult<GeneratedChunk> {
        self.ensure_running()?;
        if let Some(chunk) = self.world.index.chunk(chunk_id) {
            return Ok(GeneratedChunk {
                chunk: chunk.clone(),
                entities: BTreeMap::new(),
            });
        }
        let generated = self.generator.generate_chunk(chunk_id);
        self.world.index.insert_chunk(generated.clone())?;
        Ok(generated)
    }

    pub fn check_placement(&self, position: Vec2, size: Vec2) -> PlacementCheck {
        self.world.index.check_placement(position, size)
    }

    /// Place a new entity of `kind`.
    ///
    /// The entity is Active right away when `force` is set or the kind needs no
    /// materials; otherwise it starts UnderConstruction with a queued Build job.
    pub fn confirm_build(
        &mut self,
        kind: EntityType,
        position: Vec2,
        size: Vec2,
        force: bool,
    ) -> WorldResult<BuildOrder> {
        self.ensure_running()?;
        if !kind.is_buildable() {
            return Err(InvariantViolation::NotBuildable(kind));
        }
        let required = kind.required_materials();
        let needs_work = !force && !required.is_empty();
        let id = self.world.index.place_with_next_id(|id| {
            let mut entity = Entity::new(id, kind, position, size)?;
            if needs_work {
                entity.state = EntityState::UnderConstruction { required };
            }
            Ok(entity)
        })?;

        let job = needs_work.then(|| self.world.jobs.create(JobKind::Build { target: id }));
        debug!(entity = %id, ?kind, %position, ?job, "Build confirmed");
        Ok(BuildOrder { entity: id, job })
    }

    /// Queue a CutTrees job over `trees`, felled in the given order.
    ///
    /// A tree may sit in at most one queue, once. Repeats within `trees` or
    /// trees already queued by another job are rejected before anything changes.
    pub fn queue_cut_trees(&mut self, trees: impl IntoIterator<Item = EntityId>) -> WorldResult<JobId> {
        self.ensure_running()?;
        let trees: VecDeque<EntityId> = trees.into_iter().collect();
        let mut queued: BTreeSet<EntityId> = self
            .world
            .jobs
            .iter()
            .filter_map(|job| match &job.kind {
                JobKind::CutTrees { trees } => Some(trees.iter().copied()),
                _ => None,
            })
            .flatten()
            .collect();
        for &id in &trees {
            let found = self.world.index.require_entity(id)?.entity_type();
            if found != EntityType::Tree {
                return Err(InvariantViolation::WrongEntityKind {
                    id,
                    expected: EntityType::Tree,
                    found,
                });
            }
            if !queued.insert(id) {
                return Err(InvariantViolation::TreeAlreadyQueued(id));
            }
        }
        let job = self.world.jobs.create(JobKind::CutTrees { trees });
        debug!(%job, "Queued tree cutting");
        Ok(job)
    }

    /// Queue irrigation of every dry cell of an Active farm.
    ///
    /// Reuses the farm's watering job when one exists and has not yet started
    /// returning its bucket. Returns `None` when nothing needs water.
    pub fn queue_watering(&mut self, farm: EntityId) -> WorldResult<Option<JobId>> {
        self.ensure_running()?;
        let entity = self.world.index.require_entity_mut(farm)?;
        if !entity.is_active() {
            return Ok(None);
        }
        let plot = entity.expect_farm_mut()?;
        let dry = plot.dry_cells();

        if let Some(job_id) = plot.watering_job {
            let job = self.world.jobs.require_mut(job_id)?;
            let JobKind::WaterGarden { phase, cells, .. } = &mut job.kind else {
                return Err(InvariantViolation::JobKindMismatch {
                    job: job_id,
                    expected: "WaterGarden",
                });
            };
            if *phase != WaterPhase::DropOffWaterBucket {
                cells.extend(dry);
                return Ok(Some(job_id));
            }
            // Too late to extend; the new job takes over the farm reference.
        }

        if dry.is_empty() {
            return Ok(None);
        }
        let job_id = self.world.jobs.create(JobKind::WaterGarden {
            farm,
            phase: WaterPhase::PickUpWaterBucket,
            cells: dry,
        });
        plot.watering_job = Some(job_id);
        debug!(%farm, job = %job_id, "Queued watering");
        Ok(Some(job_id))
    }

    /// Add an idle, fully rested agent at `position`.
    pub fn spawn_agent(&mut self, position: Vec2) -> AgentId {
        let id = self.world.next_agent_id();
        self.world.agents.insert(id, Agent::new(id, position));
        debug!(agent = %id, %position, "Spawned agent");
        id
    }

    /// Ids of every live entity of `kind`.
    pub fn entities_of_kind(&self, kind: EntityType) -> BTreeSet<EntityId> {
        self.world.index.entities_of_kind(kind).map(|e| e.id).collect()
    }

    fn ensure_running(&self) -> WorldResult<()> {
        if self.halted {
            Err(InvariantViolation::Halted)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use homestead_core::ItemKind;

    fn flat_sim() -> Simulation {
        let mut sim = Simulation::empty(SimConfig {
            energy_decay_per_tick: 0.0,
            ..SimConfig::default()
        });
        for y in -1..=1 {
            for x in -1..=1 {
                sim.world_mut()
                    .index
                    .insert_chunk(GeneratedChunk {
                        chunk: homestead_world::Chunk::new(ChunkId::new(x, y)),
                        entities: BTreeMap::new(),
                    })
                    .unwrap();
            }
        }
        sim
    }

    #[test]
    fn new_generates_start_area_and_agents() {
        let sim = Simulation::new(SimConfig {
            agent_count: 4,
            initial_chunk_radius: 1,
            ..SimConfig::default()
        })
        .unwrap();
        assert_eq!(sim.world().index.chunk_count(), 9);
        assert_eq!(sim.world().agents.len(), 4);
        for agent in sim.world().agents.values() {
            assert!(agent.position.x.abs() < AGENT_SPAWN_SPREAD);
            assert!(agent.position.y.abs() < AGENT_SPAWN_SPREAD);
        }
    }

    #[test]
    fn new_is_reproducible() {
        let a = Simulation::new(SimConfig::default()).unwrap();
        let b = Simulation::new(SimConfig::default()).unwrap();
        assert_eq!(a.world(), b.world());
    }

    #[test]
    fn request_chunk_is_idempotent() {
        let mut sim = Simulation::empty(SimConfig::default());
        let first = sim.request_chunk(ChunkId::new(2, -3)).unwrap();
        let entities = sim.world().index.entity_count();
        let second = sim.request_chunk(ChunkId::new(2, -3)).unwrap();
        assert_eq!(first.chunk, second.chunk);
        assert!(second.entities.is_empty());
        assert_eq!(sim.world().index.entity_count(), entities);
        assert_eq!(first.entities.len(), entities);
    }

    #[test]
    fn confirm_build_states() {
        let mut sim = flat_sim();
        let farm = sim
            .confirm_build(EntityType::Farm, Vec2::ZERO, Vec2::new(2.0, 2.0), false)
            .unwrap();
        assert_eq!(farm.job, None);
        assert!(sim.world().index.entity(farm.entity).unwrap().is_active());

        let house = sim
            .confirm_build(EntityType::House, Vec2::new(5.0, 5.0), Vec2::new(2.0, 2.0), false)
            .unwrap();
        let job = house.job.unwrap();
        assert_eq!(
            sim.world().jobs.get(job).unwrap().kind,
            JobKind::Build {
                target: house.entity
            }
        );
        let required = sim
            .world()
            .index
            .entity(house.entity)
            .unwrap()
            .required_materials()
            .unwrap();
        assert_eq!(required.get(&ItemKind::Wood), Some(&4));

        let forced = sim
            .confirm_build(EntityType::Well, Vec2::new(9.0, 0.0), Vec2::ONE, true)
            .unwrap();
        assert_eq!(forced.job, None);
        assert!(sim.world().index.entity(forced.entity).unwrap().is_active());
    }

    #[test]
    fn confirm_build_on_occupied_cells_fails() {
        let mut sim = flat_sim();
        sim.confirm_build(EntityType::Stockpile, Vec2::ZERO, Vec2::new(3.0, 3.0), false)
            .unwrap();
        assert!(!sim.check_placement(Vec2::new(2.0, 2.0), Vec2::ONE).valid);
        assert!(matches!(
            sim.confirm_build(EntityType::Storage, Vec2::new(2.0, 2.0), Vec2::ONE, true),
            Err(InvariantViolation::CellOccupied { x: 2, y: 2, .. })
        ));
        assert_eq!(
            sim.confirm_build(EntityType::Tree, Vec2::new(8.0, 8.0), Vec2::ONE, true)
                .unwrap_err(),
            InvariantViolation::NotBuildable(EntityType::Tree)
        );
    }

    #[test]
    fn queue_watering_targets_dry_cells_and_reuses_job() {
        let mut sim = flat_sim();
        let farm = sim
            .confirm_build(EntityType::Farm, Vec2::ZERO, Vec2::new(2.0, 1.0), false)
            .unwrap()
            .entity;
        sim.world_mut()
            .index
            .entity_mut(farm)
            .unwrap()
            .farm_mut()
            .unwrap()
            .cell_mut(1)
            .unwrap()
            .water = 0.5;

        let job = sim.queue_watering(farm).unwrap().unwrap();
        match &sim.world().jobs.get(job).unwrap().kind {
            JobKind::WaterGarden { cells, phase, .. } => {
                assert_eq!(*phase, WaterPhase::PickUpWaterBucket);
                assert_eq!(cells.iter().copied().collect::<Vec<_>>(), vec![0]);
            }
            other => panic!("unexpected job {other:?}"),
        }
        assert_eq!(sim.queue_watering(farm).unwrap(), Some(job));
        assert_eq!(sim.world().jobs.len(), 1);
    }

    #[test]
    fn queue_cut_trees_rejects_non_trees() {
        let mut sim = flat_sim();
        let well = sim
            .confirm_build(EntityType::Well, Vec2::ZERO, Vec2::ONE, true)
            .unwrap()
            .entity;
        assert!(matches!(
            sim.queue_cut_trees([well]),
            Err(InvariantViolation::WrongEntityKind { .. })
        ));
    }

    #[test]
    fn queue_cut_trees_rejects_repeated_trees() {
        let mut sim = flat_sim();
        let a = sim.world_mut().index.place_entity(Entity::tree(4, 0)).unwrap();
        let b = sim.world_mut().index.place_entity(Entity::tree(6, 0)).unwrap();

        assert_eq!(
            sim.queue_cut_trees([a, b, a]).unwrap_err(),
            InvariantViolation::TreeAlreadyQueued(a)
        );
        assert!(sim.world().jobs.is_empty());

        sim.queue_cut_trees([a]).unwrap();
        assert_eq!(
            sim.queue_cut_trees([b, a]).unwrap_err(),
            InvariantViolation::TreeAlreadyQueued(a)
        );
        assert_eq!(sim.world().jobs.len(), 1);
        sim.queue_cut_trees([b]).unwrap();
        assert_eq!(sim.world().jobs.len(), 2);
    }

    #[test]
    fn two_agents_never_fell_the_same_tree() {
        let mut sim = flat_sim();
        let tree = sim.world_mut().index.place_entity(Entity::tree(5, 0)).unwrap();
        sim.spawn_agent(Vec2::ZERO);
        sim.spawn_agent(Vec2::new(1.0, 0.0));
        let job = sim.queue_cut_trees([tree]).unwrap();
        assert!(sim.queue_cut_trees([tree]).is_err());

        for _ in 0..20 {
            sim.tick().unwrap();
        }
        assert!(!sim.is_halted());
        assert!(!sim.world().jobs.contains(job));
        let wood: u32 = sim
            .world()
            .agents
            .values()
            .map(|a| a.inventory.count(ItemKind::Wood))
            .sum();
        assert_eq!(wood, 1);
    }

    #[test]
    fn rejected_build_does_not_consume_an_id() {
        let mut sim = flat_sim();
        let first = sim
            .confirm_build(EntityType::Well, Vec2::ZERO, Vec2::ONE, true)
            .unwrap();
        assert!(sim
            .confirm_build(EntityType::Well, Vec2::ZERO, Vec2::ONE, true)
            .is_err());
        assert!(sim
            .confirm_build(EntityType::Farm, Vec2::new(2147483647.0, 0.0), Vec2::new(2.0, 1.0), false)
            .is_err());
        let second = sim
            .confirm_build(EntityType::Well, Vec2::new(3.0, 0.0), Vec2::ONE, true)
            .unwrap();
        assert_eq!(first.entity, EntityId(1));
        assert_eq!(second.entity, EntityId(2));
        assert!(!sim.is_halted());
    }

    #[test]
    fn violation_halts_simulation() {
        let mut sim = flat_sim();
        sim.spawn_agent(Vec2::ZERO);
        let house = sim
            .confirm_build(EntityType::House, Vec2::new(3.0, 0.0), Vec2::ONE, false)
            .unwrap();
        // Let the agent claim the job, then steal its wood.
        sim.world_mut()
            .agents
            .get_mut(&AgentId(1))
            .unwrap()
            .inventory
            .add(ItemKind::Wood, 4)
            .unwrap();
        sim.tick().unwrap();
        assert_eq!(sim.world().agent(AgentId(1)).unwrap().job, house.job);
        sim.world_mut()
            .agents
            .get_mut(&AgentId(1))
            .unwrap()
            .inventory
            .clear();

        let mut result = Ok(WorldUpdates::new());
        for _ in 0..10 {
            result = sim.tick();
            if result.is_err() {
                break;
            }
        }
        assert!(matches!(result, Err(InvariantViolation::Inventory { .. })));
        assert!(sim.is_halted());
        let tick = sim.world().tick;
        assert_eq!(sim.tick().unwrap_err(), InvariantViolation::Halted);
        assert_eq!(sim.world().tick, tick);
    }
}
