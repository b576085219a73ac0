use homestead_core::{AgentId, Inventory, ItemKind, JobId, Vec2};
use serde::{Deserialize, Serialize};

/// Movement speed in cells per tick at zero energy.
pub const BASE_SPEED: f64 = 0.25;
/// Extra speed gained at full energy.
pub const ENERGY_SPEED_BONUS: f64 = 0.75;

/// Autonomous worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub position: Vec2,
    pub inventory: Inventory,
    /// Stamina in [0, 1].
    pub energy: f64,
    /// Job currently claimed by this agent.
    pub job: Option<JobId>,
}

impl Agent {
    /// Fully rested agent with an empty, unbounded inventory.
    pub fn new(id: AgentId, position: Vec2) -> Self {
        Self {
            id,
            position,
            inventory: Inventory::new(),
            energy: 1.0,
            job: None,
        }
    }

    /// Cells covered per tick at the current energy.
    pub fn speed(&self) -> f64 {
        BASE_SPEED + ENERGY_SPEED_BONUS * self.energy
    }

    pub fn is_idle(&self) -> bool {
        self.job.is_none()
    }

    pub fn holds_bucket(&self) -> bool {
        self.inventory.count(ItemKind::WaterBucket) > 0
    }

    /// Lose `amount` energy, saturating at zero. Returns true if energy changed.
    pub fn drain(&mut self, amount: f64) -> bool {
        let before = self.energy;
        self.energy = (self.energy - amount).max(0.0);
        self.energy != before
    }

    /// Gain `amount` energy, saturating at one. Returns true once fully rested.
    pub fn recover(&mut self, amount: f64) -> bool {
        self.energy = (self.energy + amount).min(1.0);
        self.energy >= 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_scales_with_energy() {
        let mut agent = Agent::new(AgentId(1), Vec2::ZERO);
        assert_eq!(agent.speed(), 1.0);
        agent.energy = 0.0;
        assert_eq!(agent.speed(), 0.25);
        agent.energy = 0.5;
        assert!((agent.speed() - 0.625).abs() < 1e-12);
    }

    #[test]
    fn energy_saturates() {
        let mut agent = Agent::new(AgentId(1), Vec2::ZERO);
        assert!(agent.drain(0.3));
        assert!(agent.drain(2.0));
        assert_eq!(agent.energy, 0.0);
        assert!(!agent.drain(0.1));
        assert!(!agent.recover(0.5));
        assert!(agent.recover(0.6));
        assert_eq!(agent.energy, 1.0);
    }
}
