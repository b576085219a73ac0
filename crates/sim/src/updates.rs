use homestead_core::{AgentId, EntityId, JobId};
use homestead_world::{ChunkId, Entity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Ids touched during one tick.
///
/// An id listed here but missing from the world afterwards was destroyed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldUpdates {
    pub entities: BTreeSet<EntityId>,
    pub agents: BTreeSet<AgentId>,
    pub jobs: BTreeSet<JobId>,
    pub chunks: BTreeSet<ChunkId>,
}

impl WorldUpdates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
            && self.agents.is_empty()
            && self.jobs.is_empty()
            && self.chunks.is_empty()
    }

    pub fn entity(&mut self, id: EntityId) {
        self.entities.insert(id);
    }

    pub fn agent(&mut self, id: AgentId) {
        self.agents.insert(id);
    }

    pub fn job(&mut self, id: JobId) {
        self.jobs.insert(id);
    }

    /// Record a destroyed entity together with the chunks it covered.
    pub fn removed_entity(&mut self, entity: &Entity) {
        self.entities.insert(entity.id);
        self.chunks.extend(entity.chunk_ids.iter().copied());
    }

    /// Fold another diff into this one.
    pub fn merge(&mut self, other: WorldUpdates) {
        self.entities.extend(other.entities);
        self.agents.extend(other.agents);
        self.jobs.extend(other.jobs);
        self.chunks.extend(other.chunks);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removed_entity_marks_chunks() {
        let mut updates = WorldUpdates::new();
        assert!(updates.is_empty());
        updates.removed_entity(&Entity::tree(-1, 5));
        assert!(updates.entities.contains(&EntityId::terrain(-1, 5)));
        assert!(updates.chunks.contains(&ChunkId::new(-1, 0)));
    }

    #[test]
    fn merge_unions_sets() {
        let mut a = WorldUpdates::new();
        a.agent(AgentId(1));
        let mut b = WorldUpdates::new();
        b.agent(AgentId(2));
        b.job(JobId(3));
        a.merge(b);
        assert_eq!(a.agents.len(), 2);
        assert_eq!(a.jobs.len(), 1);
    }
}
