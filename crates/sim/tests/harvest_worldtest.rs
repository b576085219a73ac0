//! Harvest Worldtest
//!
//! A fully ripe 4×4 farm at the origin, one agent standing on its first cell,
//! and a storage next door. The agent must drain the picking job cell by cell.

use homestead_core::{AgentId, EntityId, ItemKind, Vec2};
use homestead_sim::{JobKind, SimConfig, Simulation};
use homestead_testkit::{canonical_json, run_worldtest, WorldtestConfig};
use homestead_world::{ChunkId, EntityType};

fn ripe_farm_scenario() -> (Simulation, EntityId) {
    // Growth disabled so harvested cells stay at exactly zero.
    let mut sim = Simulation::empty(SimConfig {
        grow_rate: f64::INFINITY,
        ..SimConfig::default()
    });
    for y in -1..=0 {
        for x in -1..=0 {
            sim.request_chunk(ChunkId::new(x, y)).unwrap();
        }
    }
    let farm = sim
        .confirm_build(EntityType::Farm, Vec2::ZERO, Vec2::new(4.0, 4.0), false)
        .unwrap()
        .entity;
    sim.confirm_build(EntityType::Storage, Vec2::new(5.0, 0.0), Vec2::new(2.0, 2.0), true)
        .unwrap();
    let plot = sim
        .world_mut()
        .index
        .entity_mut(farm)
        .unwrap()
        .farm_mut()
        .unwrap();
    for i in 0..plot.len() {
        plot.cell_mut(i).unwrap().maturity = 1.0;
    }
    sim.spawn_agent(Vec2::ZERO);
    (sim, farm)
}

#[test]
fn harvest_worldtest() {
    let (mut sim, farm) = ripe_farm_scenario();

    let report = run_worldtest(WorldtestConfig::new("harvest", 200), &mut sim, |world| {
        world.jobs.is_empty()
    })
    .expect("harvest completes");

    println!("\n=== Harvest Worldtest ===");
    println!("  Ticks: {}", report.ticks());

    let world = sim.world();
    let agent = world.agent(AgentId(1)).unwrap();
    assert_eq!(agent.inventory.count(ItemKind::Food), 16);
    assert!(agent.job.is_none());

    let plot = world.index.entity(farm).unwrap().farm().unwrap();
    assert!(plot.cells().iter().all(|c| c.maturity == 0.0));
    assert_eq!(plot.picking_job, None);

    // The first tick queues the job and the agent claims it immediately.
    let first = &report.frames[0].updates;
    assert!(first.entities.contains(&farm));
    assert_eq!(first.jobs.len(), 1);
    assert!(first.agents.contains(&AgentId(1)));
    // Row-major picking keeps the walk short.
    assert!(report.ticks() <= 64, "took {} ticks", report.ticks());
}

#[test]
fn harvest_is_deterministic() {
    let run = || {
        let (mut sim, _) = ripe_farm_scenario();
        let report = run_worldtest(WorldtestConfig::new("harvest", 200), &mut sim, |world| {
            world.jobs.is_empty()
        })
        .unwrap();
        let agent = sim.world().agent(AgentId(1)).unwrap().clone();
        canonical_json(&(report, agent)).unwrap()
    };
    assert_eq!(run(), run());
}

#[test]
fn ripe_cells_queue_picking_job() {
    let mut sim = Simulation::empty(SimConfig {
        grow_rate: 2.0,
        ..SimConfig::default()
    });
    sim.request_chunk(ChunkId::new(0, 0)).unwrap();
    let farm = sim
        .confirm_build(EntityType::Farm, Vec2::new(1.0, 1.0), Vec2::new(2.0, 1.0), false)
        .unwrap()
        .entity;

    // Two dry ticks at rate 2 ripen every cell.
    sim.tick().unwrap();
    assert!(sim.world().jobs.is_empty());
    sim.tick().unwrap();
    let job = sim
        .world()
        .index
        .entity(farm)
        .unwrap()
        .farm()
        .unwrap()
        .picking_job
        .expect("ripe cells queue a picking job");
    match &sim.world().jobs.get(job).unwrap().kind {
        JobKind::PickGarden { cells, farm: f } => {
            assert_eq!(*f, farm);
            assert_eq!(cells.len(), 2);
        }
        other => panic!("unexpected job {other:?}"),
    }
}
