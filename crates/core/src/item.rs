//! Item kinds and the inventory model shared by agents and storage entities.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Item type identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ItemKind {
    /// Logs from a felled tree.
    Wood,
    /// Produce picked from a farm.
    Food,
    /// A filled bucket carried while irrigating.
    WaterBucket,
}

impl ItemKind {
    /// Stable lowercase name.
    pub const fn as_str(self) -> &'static str {
        match self {
            ItemKind::Wood => "wood",
            ItemKind::Food => "food",
            ItemKind::WaterBucket => "water_bucket",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Material requirement keyed by item kind.
pub type Materials = BTreeMap<ItemKind, u32>;

/// Errors raised by inventory mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    /// Adding would exceed the inventory's capacity.
    #[error("adding {requested} {item} exceeds capacity {capacity} (holding {held})")]
    Overflow {
        /// Item being added.
        item: ItemKind,
        /// Amount requested.
        requested: u32,
        /// Total items currently held.
        held: u32,
        /// Capacity limit.
        capacity: u32,
    },
    /// Removing more than is held.
    #[error("need {requested} {item} but only {available} held")]
    Insufficient {
        /// Item being removed.
        item: ItemKind,
        /// Amount requested.
        requested: u32,
        /// Amount available.
        available: u32,
    },
}

/// Mapping of item kind to count, optionally bounded by a total capacity.
///
/// Zero counts are never stored, so two inventories holding the same items
/// always compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    items: BTreeMap<ItemKind, u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    capacity: Option<u32>,
}

impl Inventory {
    /// Create an unbounded, empty inventory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty inventory holding at most `capacity` items in total.
    pub fn with_capacity(capacity: u32) -> Self {
        Self {
            items: BTreeMap::new(),
            capacity: Some(capacity),
        }
    }

    /// Capacity limit, if any.
    pub fn capacity(&self) -> Option<u32> {
        self.capacity
    }

    /// Count held for `item`.
    pub fn count(&self, item: ItemKind) -> u32 {
        self.items.get(&item).copied().unwrap_or(0)
    }

    /// Total items held across all kinds.
    pub fn total(&self) -> u32 {
        self.items.values().sum()
    }

    /// Remaining room before hitting capacity (`u32::MAX` if unbounded).
    pub fn free_space(&self) -> u32 {
        match self.capacity {
            Some(cap) => cap.saturating_sub(self.total()),
            None => u32::MAX,
        }
    }

    /// Whether nothing is held.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate held items in deterministic kind order.
    pub fn iter(&self) -> impl Iterator<Item = (ItemKind, u32)> + '_ {
        self.items.iter().map(|(kind, count)| (*kind, *count))
    }

    /// Add `amount` of `item`.
    pub fn add(&mut self, item: ItemKind, amount: u32) -> Result<(), InventoryError> {
        if amount == 0 {
            return Ok(());
        }
        if amount > self.free_space() {
            return Err(InventoryError::Overflow {
                item,
                requested: amount,
                held: self.total(),
                capacity: self.capacity.unwrap_or(u32::MAX),
            });
        }
        *self.items.entry(item).or_insert(0) += amount;
        Ok(())
    }

    /// Remove `amount` of `item`, dropping the entry when it reaches zero.
    pub fn remove(&mut self, item: ItemKind, amount: u32) -> Result<(), InventoryError> {
        let available = self.count(item);
        if amount > available {
            return Err(InventoryError::Insufficient {
                item,
                requested: amount,
                available,
            });
        }
        if amount == available {
            self.items.remove(&item);
        } else if let Some(count) = self.items.get_mut(&item) {
            *count -= amount;
        }
        Ok(())
    }

    /// Whether every requirement is held in sufficient quantity.
    pub fn covers(&self, required: &Materials) -> bool {
        required
            .iter()
            .all(|(item, amount)| self.count(*item) >= *amount)
    }

    /// Remove every requirement atomically; nothing is removed on failure.
    pub fn consume(&mut self, required: &Materials) -> Result<(), InventoryError> {
        if let Some((item, amount)) = required
            .iter()
            .find(|(item, amount)| self.count(**item) < **amount)
        {
            return Err(InventoryError::Insufficient {
                item: *item,
                requested: *amount,
                available: self.count(*item),
            });
        }
        for (item, amount) in required {
            self.remove(*item, *amount)?;
        }
        Ok(())
    }

    /// Drop every held item.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}
