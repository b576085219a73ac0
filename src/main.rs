//! homestead - headless driver for the world tick simulation
//!
//! Runs the fixed-interval tick loop and optionally logs every tick's diff.

mod config;

use anyhow::{Context, Result};
use clap::Parser;
use config::Args;
use homestead_sim::Simulation;
use homestead_testkit::{JsonlSink, TickRecord};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{info, warn};

fn main() -> Result<()> {
    // Initialize tracing with WARN level by default (can be overridden via RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    info!("Starting homestead v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    let config = args.load_config();
    let interval = Duration::from_millis(config.tick_interval_ms.max(1));

    let mut sim = Simulation::new(config).context("Failed to initialize world")?;
    let mut sink = match &args.events {
        Some(path) => Some(JsonlSink::create(path)?),
        None => None,
    };

    let result = run_loop(&mut sim, sink.as_mut(), interval, args.ticks);
    if let Some(sink) = sink.as_mut() {
        sink.flush()?;
    }
    result
}

/// Tick on a fixed schedule until `max_ticks` have run.
///
/// A tick that overruns its slot does not queue catch-up ticks; the missed
/// slots are dropped and the loop waits for the next one.
fn run_loop(
    sim: &mut Simulation,
    mut sink: Option<&mut JsonlSink>,
    interval: Duration,
    max_ticks: Option<u64>,
) -> Result<()> {
    let mut next_slot = Instant::now();
    let mut ticks_run = 0u64;

    while max_ticks.map_or(true, |max| ticks_run < max) {
        let tick = sim.world().tick;
        let updates = sim
            .tick()
            .with_context(|| format!("Simulation halted at tick {}", tick.0))?;
        ticks_run += 1;
        if let Some(sink) = sink.as_deref_mut() {
            sink.write(&TickRecord { tick, updates })?;
        }

        next_slot += interval;
        let now = Instant::now();
        if now > next_slot {
            let behind = now.duration_since(next_slot);
            let missed = (behind.as_nanos() / interval.as_nanos()) as u32 + 1;
            warn!(
                tick = tick.0,
                missed,
                behind_ms = behind.as_millis() as u64,
                "Tick overran its interval, skipping missed slots"
            );
            next_slot += interval * missed;
        }
        thread::sleep(next_slot.saturating_duration_since(Instant::now()));
    }

    info!(ticks = ticks_run, "Simulation finished");
    Ok(())
}
