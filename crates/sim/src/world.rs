use homestead_core::{AgentId, SimTick};
use homestead_world::{InvariantViolation, WorldIndex, WorldResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::agent::Agent;
use crate::job::JobBoard;

/// Root aggregate mutated by the scheduler.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct World {
    pub index: WorldIndex,
    pub agents: BTreeMap<AgentId, Agent>,
    pub jobs: JobBoard,
    /// Number of completed ticks.
    pub tick: SimTick,
}

impl World {
    pub fn new() -> Self {
        Self {
            index: WorldIndex::new(),
            agents: BTreeMap::new(),
            jobs: JobBoard::new(),
            tick: SimTick::ZERO,
        }
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(&id)
    }

    pub fn require_agent_mut(&mut self, id: AgentId) -> WorldResult<&mut Agent> {
        self.agents
            .get_mut(&id)
            .ok_or(InvariantViolation::MissingAgent(id))
    }

    /// Next agent id; agents are never destroyed so ids stay dense.
    pub fn next_agent_id(&self) -> AgentId {
        AgentId(self.agents.keys().next_back().map_or(1, |id| id.0 + 1))
    }
}
