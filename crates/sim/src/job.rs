//! Resumable work items and the board that owns them.

use homestead_core::{AgentId, EntityId, JobId};
use homestead_world::{InvariantViolation, WorldResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Progress through a watering run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaterPhase {
    PickUpWaterBucket,
    WaterGarden,
    DropOffWaterBucket,
}

/// Variant-specific job state. Everything a step needs to resume lives here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobKind {
    CutTrees {
        trees: VecDeque<EntityId>,
    },
    Build {
        target: EntityId,
    },
    PickGarden {
        farm: EntityId,
        cells: BTreeSet<usize>,
    },
    WaterGarden {
        farm: EntityId,
        phase: WaterPhase,
        cells: BTreeSet<usize>,
    },
    AgentRest,
}

impl JobKind {
    pub fn name(&self) -> &'static str {
        match self {
            JobKind::CutTrees { .. } => "CutTrees",
            JobKind::Build { .. } => "Build",
            JobKind::PickGarden { .. } => "PickGarden",
            JobKind::WaterGarden { .. } => "WaterGarden",
            JobKind::AgentRest => "AgentRest",
        }
    }

    pub fn is_rest(&self) -> bool {
        matches!(self, JobKind::AgentRest)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub kind: JobKind,
    /// Agent currently working this job.
    pub assignee: Option<AgentId>,
}

/// Pending and in-progress jobs keyed by id.
///
/// Ids are handed out in creation order, so ascending id order is also
/// creation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobBoard {
    next_job_id: u64,
    jobs: BTreeMap<JobId, Job>,
}

impl Default for JobBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl JobBoard {
    pub fn new() -> Self {
        Self {
            next_job_id: 1,
            jobs: BTreeMap::new(),
        }
    }

    pub fn create(&mut self, kind: JobKind) -> JobId {
        let id = JobId(self.next_job_id);
        self.next_job_id = self.next_job_id.saturating_add(1);
        self.jobs.insert(
            id,
            Job {
                id,
                kind,
                assignee: None,
            },
        );
        id
    }

    pub fn get(&self, id: JobId) -> Option<&Job> {
        self.jobs.get(&id)
    }

    pub fn get_mut(&mut self, id: JobId) -> Option<&mut Job> {
        self.jobs.get_mut(&id)
    }

    pub fn require_mut(&mut self, id: JobId) -> WorldResult<&mut Job> {
        self.jobs
            .get_mut(&id)
            .ok_or(InvariantViolation::MissingJob(id))
    }

    pub fn contains(&self, id: JobId) -> bool {
        self.jobs.contains_key(&id)
    }

    pub fn remove(&mut self, id: JobId) -> WorldResult<Job> {
        self.jobs
            .remove(&id)
            .ok_or(InvariantViolation::MissingJob(id))
    }

    /// Claim `id` for `agent`. Claiming a job held by someone else is a violation.
    pub fn assign(&mut self, id: JobId, agent: AgentId) -> WorldResult<()> {
        let job = self.require_mut(id)?;
        match job.assignee {
            Some(holder) if holder != agent => Err(InvariantViolation::JobAlreadyAssigned {
                job: id,
                agent: holder,
            }),
            _ => {
                job.assignee = Some(agent);
                Ok(())
            }
        }
    }

    /// Return `id` to the pool, unassigned.
    pub fn release(&mut self, id: JobId) -> WorldResult<()> {
        self.require_mut(id)?.assignee = None;
        Ok(())
    }

    /// Unassigned jobs in ascending id order.
    pub fn pending(&self) -> impl Iterator<Item = &Job> {
        self.jobs.values().filter(|job| job.assignee.is_none())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Job> {
        self.jobs.values()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_follow_creation_order() {
        let mut board = JobBoard::new();
        let a = board.create(JobKind::AgentRest);
        let b = board.create(JobKind::Build {
            target: EntityId(4),
        });
        assert_eq!(a, JobId(1));
        assert!(a < b);
        let order: Vec<_> = board.iter().map(|j| j.id).collect();
        assert_eq!(order, vec![a, b]);
    }

    #[test]
    fn assignment_is_exclusive() {
        let mut board = JobBoard::new();
        let id = board.create(JobKind::AgentRest);
        board.assign(id, AgentId(1)).unwrap();
        assert_eq!(board.pending().count(), 0);
        assert_eq!(
            board.assign(id, AgentId(2)).unwrap_err(),
            InvariantViolation::JobAlreadyAssigned {
                job: id,
                agent: AgentId(1)
            }
        );
        board.release(id).unwrap();
        assert_eq!(board.pending().count(), 1);
    }

    #[test]
    fn missing_jobs_are_violations() {
        let mut board = JobBoard::new();
        assert_eq!(
            board.remove(JobId(9)).unwrap_err(),
            InvariantViolation::MissingJob(JobId(9))
        );
    }
}
