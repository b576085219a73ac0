use clap::Parser;
use homestead_sim::{SimConfig, DEFAULT_CONFIG_PATH};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless homestead world simulation", long_about = None)]
pub struct Args {
    /// Simulation config file (TOML); missing or malformed files fall back to defaults
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Override the world seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of agents spawned at startup
    #[arg(long)]
    pub agents: Option<u32>,

    /// Milliseconds between ticks
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Stop after this many ticks (runs until interrupted if omitted)
    #[arg(long)]
    pub ticks: Option<u64>,

    /// Write one JSON line per tick with the ids it touched
    #[arg(long)]
    pub events: Option<PathBuf>,
}

impl Args {
    /// Apply command-line overrides on top of file values.
    pub fn apply(&self, mut config: SimConfig) -> SimConfig {
        if let Some(seed) = self.seed {
            config.world_seed = seed;
        }
        if let Some(agents) = self.agents {
            config.agent_count = agents;
        }
        if let Some(interval) = self.interval_ms {
            config.tick_interval_ms = interval.max(1);
        }
        config
    }

    pub fn load_config(&self) -> SimConfig {
        self.apply(SimConfig::load_from_path(&self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("homestead").chain(args.iter().copied()))
            .expect("arguments parse")
    }

    #[test]
    fn defaults_leave_config_untouched() {
        let args = parse(&[]);
        assert_eq!(args.config, PathBuf::from(DEFAULT_CONFIG_PATH));
        assert_eq!(args.ticks, None);
        assert_eq!(args.apply(SimConfig::default()), SimConfig::default());
    }

    #[test]
    fn overrides_replace_file_values() {
        let args = parse(&["--seed", "7", "--agents", "5", "--interval-ms", "0", "--ticks", "20"]);
        let config = args.apply(SimConfig::default());
        assert_eq!(config.world_seed, 7);
        assert_eq!(config.agent_count, 5);
        assert_eq!(config.tick_interval_ms, 1);
        assert_eq!(args.ticks, Some(20));
    }

    #[test]
    fn rejects_unknown_flags() {
        let result =
            Args::try_parse_from(["homestead", "--render-distance", "4"]);
        assert!(result.is_err());
    }

    #[test]
    fn missing_config_file_uses_defaults() {
        let args = parse(&["--config", "/nonexistent/homestead.toml", "--seed", "3"]);
        let config = args.load_config();
        assert_eq!(config.world_seed, 3);
        assert_eq!(config.agent_count, SimConfig::default().agent_count);
    }
}
