#![warn(missing_docs)]
//! Core primitives shared across the workspace.

pub mod ids;
pub mod item;
pub mod vec2;

use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use ids::{AgentId, EntityId, JobId};
pub use item::{Inventory, InventoryError, ItemKind, Materials};
pub use vec2::Vec2;

/// Fixed tick type (10 TPS => 100 ms per tick by default).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct SimTick(pub u64);

impl SimTick {
    /// First tick in any deterministic timeline.
    pub const ZERO: Self = Self(0);

    /// Advance by `delta` ticks.
    pub fn advance(self, delta: u64) -> Self {
        Self(self.0 + delta)
    }
}

/// Helper to derive a reproducible RNG seeded by world + stream domains.
pub fn scoped_rng(world_seed: u64, stream: u64, tick: SimTick) -> StdRng {
    let seed = world_seed ^ stream.wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ tick.0;
    StdRng::seed_from_u64(seed)
}
