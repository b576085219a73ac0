use homestead_core::Vec2;

use crate::agent::Agent;
use crate::updates::WorldUpdates;

/// Step `agent` toward `target` at its current speed.
///
/// Returns true when the agent stands on the target, including the tick on
/// which it snaps onto it. Any change of position is recorded in `updates`.
pub fn move_towards(agent: &mut Agent, target: Vec2, updates: &mut WorldUpdates) -> bool {
    let offset = target - agent.position;
    let distance = offset.length();
    if distance == 0.0 {
        return true;
    }

    updates.agent(agent.id);
    let step = agent.speed();
    if distance <= step {
        agent.position = target;
        true
    } else {
        agent.position = agent.position + offset.normalize() * step;
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use homestead_core::AgentId;

    #[test]
    fn at_target_is_arrived_without_update() {
        let mut agent = Agent::new(AgentId(1), Vec2::new(3.0, 4.0));
        let mut updates = WorldUpdates::new();
        assert!(move_towards(&mut agent, Vec2::new(3.0, 4.0), &mut updates));
        assert!(updates.is_empty());
    }

    #[test]
    fn steps_at_speed_then_snaps() {
        let mut agent = Agent::new(AgentId(1), Vec2::ZERO);
        agent.energy = 0.0;
        let mut updates = WorldUpdates::new();
        let target = Vec2::new(0.6, 0.0);

        assert!(!move_towards(&mut agent, target, &mut updates));
        assert!((agent.position.x - 0.25).abs() < 1e-12);
        assert!(!move_towards(&mut agent, target, &mut updates));
        assert!((agent.position.x - 0.5).abs() < 1e-12);
        assert!(move_towards(&mut agent, target, &mut updates));
        assert_eq!(agent.position, target);
        assert!(updates.agents.contains(&AgentId(1)));
    }

    #[test]
    fn full_energy_covers_one_cell() {
        let mut agent = Agent::new(AgentId(1), Vec2::ZERO);
        let mut updates = WorldUpdates::new();
        assert!(move_towards(&mut agent, Vec2::new(0.0, 1.0), &mut updates));
    }
}
