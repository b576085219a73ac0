//! Worldtest harness for deterministic, tick-based scenario tests.
//!
//! A worldtest steps a [`Simulation`] until a condition holds, recording each
//! tick's diff. The report can be snapshotted or logged as JSONL.

use crate::TickRecord;
use anyhow::{bail, Context, Result};
use homestead_sim::{Simulation, World};
use serde::Serialize;
use tracing::debug;

/// Configuration for a worldtest.
#[derive(Debug, Clone)]
pub struct WorldtestConfig {
    /// Human-readable name (written into the report).
    pub name: String,
    /// Give up after this many ticks.
    pub max_ticks: u64,
}

impl WorldtestConfig {
    /// Config with the given name and tick budget.
    pub fn new(name: impl Into<String>, max_ticks: u64) -> Self {
        Self {
            name: name.into(),
            max_ticks,
        }
    }
}

/// Every tick's diff from a completed worldtest.
#[derive(Debug, Clone, Serialize)]
pub struct WorldtestReport {
    /// Scenario name.
    pub name: String,
    /// One record per tick, in order.
    pub frames: Vec<TickRecord>,
}

impl WorldtestReport {
    /// Number of ticks stepped.
    pub fn ticks(&self) -> u64 {
        self.frames.len() as u64
    }
}

/// Tick `sim` until `done` holds for the world after a tick.
///
/// Fails when a tick reports an invariant violation or the tick budget runs out.
pub fn run_worldtest<DoneFn>(
    config: WorldtestConfig,
    sim: &mut Simulation,
    mut done: DoneFn,
) -> Result<WorldtestReport>
where
    DoneFn: FnMut(&World) -> bool,
{
    let mut frames = Vec::new();
    for _ in 0..config.max_ticks {
        let tick = sim.world().tick;
        let updates = sim
            .tick()
            .with_context(|| format!("{}: tick {} violated an invariant", config.name, tick.0))?;
        frames.push(TickRecord { tick, updates });
        if done(sim.world()) {
            debug!(name = %config.name, ticks = frames.len(), "Worldtest complete");
            return Ok(WorldtestReport {
                name: config.name,
                frames,
            });
        }
    }
    bail!(
        "{}: condition not reached within {} ticks",
        config.name,
        config.max_ticks
    )
}
