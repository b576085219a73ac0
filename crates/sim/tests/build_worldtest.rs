//! Build Worldtest
//!
//! A house site waits until its worker has gathered enough wood, then the
//! same agent claims the build job and completes it.

use homestead_core::{AgentId, ItemKind, Vec2};
use homestead_sim::{JobKind, SimConfig, Simulation};
use homestead_testkit::{run_worldtest, WorldtestConfig};
use homestead_world::{Chunk, ChunkId, Entity, EntityType, GeneratedChunk};
use std::collections::BTreeMap;

fn flat_sim() -> Simulation {
    let mut sim = Simulation::empty(SimConfig::default());
    for y in -1..=0 {
        for x in -1..=0 {
            sim.world_mut()
                .index
                .insert_chunk(GeneratedChunk {
                    chunk: Chunk::new(ChunkId::new(x, y)),
                    entities: BTreeMap::new(),
                })
                .unwrap();
        }
    }
    sim
}

#[test]
fn build_worldtest() {
    let mut sim = flat_sim();
    let order = sim
        .confirm_build(EntityType::House, Vec2::new(10.0, 10.0), Vec2::new(3.0, 2.0), false)
        .unwrap();
    let build_job = order.job.expect("house needs materials");
    let trees: Vec<_> = (0..4)
        .map(|i| {
            sim.world_mut()
                .index
                .place_entity(Entity::tree(-4, i * 2))
                .unwrap()
        })
        .collect();
    let cut_job = sim.queue_cut_trees(trees).unwrap();
    sim.spawn_agent(Vec2::ZERO);

    sim.tick().unwrap();
    let world = sim.world();
    assert_eq!(world.agent(AgentId(1)).unwrap().job, Some(cut_job));
    assert_eq!(world.jobs.get(build_job).unwrap().assignee, None);

    let report = run_worldtest(WorldtestConfig::new("build", 500), &mut sim, |world| {
        world.index.entity(order.entity).unwrap().is_active()
    })
    .expect("house completes");
    println!("\n=== Build Worldtest ===");
    println!("  Ticks: {}", report.ticks() + 1);

    let world = sim.world();
    let agent = world.agent(AgentId(1)).unwrap();
    assert_eq!(agent.inventory.count(ItemKind::Wood), 0);
    assert!(agent.is_idle());
    assert!(world.jobs.is_empty());
    assert_eq!(agent.position, Vec2::new(10.0, 10.0));
    let last = &report.frames.last().unwrap().updates;
    assert!(last.entities.contains(&order.entity));
    assert!(last.jobs.contains(&build_job));
}

#[test]
fn forced_and_free_builds_skip_the_queue() {
    let mut sim = flat_sim();
    for (kind, force) in [
        (EntityType::Farm, false),
        (EntityType::Stockpile, false),
        (EntityType::Well, true),
        (EntityType::Storage, true),
    ] {
        let x = sim.world().index.entity_count() as f64 * 3.0;
        let order = sim
            .confirm_build(kind, Vec2::new(x, 0.0), Vec2::new(2.0, 2.0), force)
            .unwrap();
        assert_eq!(order.job, None, "{kind:?}");
        assert!(sim.world().index.entity(order.entity).unwrap().is_active());
    }
    assert!(sim.world().jobs.is_empty());
}

#[test]
fn build_job_waits_for_materials() {
    let mut sim = flat_sim();
    let order = sim
        .confirm_build(EntityType::Well, Vec2::new(5.0, 5.0), Vec2::ONE, false)
        .unwrap();
    sim.spawn_agent(Vec2::ZERO);
    for _ in 0..5 {
        sim.tick().unwrap();
    }
    let world = sim.world();
    assert!(world.agent(AgentId(1)).unwrap().is_idle());
    let job = world.jobs.get(order.job.unwrap()).unwrap();
    assert_eq!(job.assignee, None);
    assert_eq!(
        job.kind,
        JobKind::Build {
            target: order.entity
        }
    );
    assert!(!world.index.entity(order.entity).unwrap().is_active());
}
