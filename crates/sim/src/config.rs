use homestead_world::GrowthParams;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use tracing::warn;

/// Default location of the simulation config file.
pub const DEFAULT_CONFIG_PATH: &str = "config/homestead.toml";

/// Tunables for world creation and ticking.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SimConfig {
    /// Seed pinned for terrain noise and spawn jitter.
    pub world_seed: u64,
    pub agent_count: u32,
    /// Chunks within this Chebyshev radius of the origin are generated up front.
    pub initial_chunk_radius: i32,
    /// Wall-clock interval between ticks in the driver loop.
    pub tick_interval_ms: u64,
    /// Ticks for a dry farm cell to mature from 0 to 1.
    pub grow_rate: f64,
    pub harvest_threshold: f64,
    pub water_decay_per_tick: f64,
    pub energy_decay_per_tick: f64,
    pub energy_regen_per_tick: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            world_seed: 0x5EED_F1E1D,
            agent_count: 3,
            initial_chunk_radius: 1,
            tick_interval_ms: 100,
            grow_rate: 600.0,
            harvest_threshold: 1.0,
            water_decay_per_tick: 1.0 / 300.0,
            // Roughly five minutes of work at 10 TPS.
            energy_decay_per_tick: 1.0 / 3000.0,
            energy_regen_per_tick: 1.0 / 3000.0,
        }
    }
}

impl SimConfig {
    /// Load configuration from the default path.
    pub fn load() -> Self {
        Self::load_from_path(Path::new(DEFAULT_CONFIG_PATH))
    }

    /// Load configuration from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<SimConfig>(&contents) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("Failed to parse {}: {err}. Using defaults", path.display());
                    SimConfig::default()
                }
            },
            Err(err) => {
                if path != Path::new(DEFAULT_CONFIG_PATH)
                    || err.kind() != std::io::ErrorKind::NotFound
                {
                    warn!("Failed to read {}: {err}. Using defaults", path.display());
                } else {
                    warn!("Sim config not found at {}. Using defaults", path.display());
                }
                SimConfig::default()
            }
        }
    }

    pub fn growth_params(&self) -> GrowthParams {
        GrowthParams {
            grow_rate: self.grow_rate,
            harvest_threshold: self.harvest_threshold,
            water_decay_per_tick: self.water_decay_per_tick,
        }
    }

    pub fn tick_params(&self) -> TickParams {
        TickParams {
            growth: self.growth_params(),
            energy_decay_per_tick: self.energy_decay_per_tick,
            energy_regen_per_tick: self.energy_regen_per_tick,
        }
    }
}

/// Per-tick rates consumed by the scheduler and job steps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickParams {
    pub growth: GrowthParams,
    pub energy_decay_per_tick: f64,
    pub energy_regen_per_tick: f64,
}

impl Default for TickParams {
    fn default() -> Self {
        SimConfig::default().tick_params()
    }
}
