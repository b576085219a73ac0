//! Typed identifiers for world objects.
//!
//! All ids are ordered so that `BTreeMap`/`BTreeSet` iteration follows
//! creation order, which keeps every tick deterministic.

use serde::{Deserialize, Serialize};
use std::fmt;

const TERRAIN_FLAG: u64 = 1 << 63;
const COORD_MASK: u64 = 0x7FFF_FFFF;

/// Identifier of a placed or generated entity.
///
/// Runtime placements draw from a counter starting at 1. Terrain spawns use
/// [`EntityId::terrain`], which is a pure function of the spawning cell so
/// that chunk generation never depends on allocation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl EntityId {
    /// Deterministic id for an entity spawned by terrain generation at cell `(x, y)`.
    ///
    /// Unique for coordinates within ±2^30.
    pub const fn terrain(x: i32, y: i32) -> Self {
        let xm = (x as u32 as u64) & COORD_MASK;
        let ym = (y as u32 as u64) & COORD_MASK;
        Self(TERRAIN_FLAG | (xm << 31) | ym)
    }

    /// Whether this id was produced by terrain generation.
    pub const fn is_terrain(self) -> bool {
        self.0 & TERRAIN_FLAG != 0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_terrain() {
            write!(f, "entity:t{:x}", self.0 & !TERRAIN_FLAG)
        } else {
            write!(f, "entity:{}", self.0)
        }
    }
}

/// Identifier of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub u64);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "agent:{}", self.0)
    }
}

/// Identifier of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobId(pub u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job:{}", self.0)
    }
}
