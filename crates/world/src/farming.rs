//! Farm plot growth and irrigation.
//!
//! A farm tracks one `{maturity, water}` record per footprint cell. Growth is
//! linear per tick and four times faster while a cell holds water.

use homestead_core::{JobId, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Growth multiplier applied while a cell is watered.
pub const WATERED_GROWTH_MULTIPLIER: f64 = 4.0;

/// Per-cell crop state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FarmCell {
    /// Growth progress; ready for harvest at the harvest threshold.
    pub maturity: f64,
    /// Soil moisture in [0, 1]; 1 right after irrigation.
    pub water: f64,
}

impl FarmCell {
    #[inline]
    pub fn is_watered(&self) -> bool {
        self.water > 0.0
    }
}

/// Tunables for passive farm aging.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthParams {
    /// Ticks for a dry cell to grow from 0 to 1.
    pub grow_rate: f64,
    /// Maturity at which a cell is ready for picking.
    pub harvest_threshold: f64,
    /// Water lost per tick.
    pub water_decay_per_tick: f64,
}

impl Default for GrowthParams {
    fn default() -> Self {
        Self {
            grow_rate: 600.0,
            harvest_threshold: 1.0,
            water_decay_per_tick: 1.0 / 300.0,
        }
    }
}

/// Crop cells of a farm plus its active job references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmPlot {
    width: usize,
    cells: Vec<FarmCell>,
    /// PickGarden job currently draining this farm.
    pub picking_job: Option<JobId>,
    /// WaterGarden job currently irrigating this farm.
    pub watering_job: Option<JobId>,
}

impl FarmPlot {
    /// Fresh plot of `width × height` unplanted, dry cells.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            cells: vec![FarmCell::default(); width * height],
            picking_job: None,
            watering_job: None,
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cell(&self, index: usize) -> Option<&FarmCell> {
        self.cells.get(index)
    }

    pub fn cell_mut(&mut self, index: usize) -> Option<&mut FarmCell> {
        self.cells.get_mut(index)
    }

    pub fn cells(&self) -> &[FarmCell] {
        &self.cells
    }

    /// Offset of cell `index` from the farm anchor (row-major).
    pub fn offset(&self, index: usize) -> Vec2 {
        let x = (index % self.width) as f64;
        let y = (index / self.width) as f64;
        Vec2::new(x, y)
    }

    /// Advance every cell by one tick and return the indexes ready for harvest.
    ///
    /// Maturity never decreases here and saturates at the harvest threshold;
    /// values already above it (set externally) are left untouched.
    pub fn advance(&mut self, params: &GrowthParams) -> BTreeSet<usize> {
        let step = 1.0 / params.grow_rate;
        let mut ready = BTreeSet::new();
        for (index, cell) in self.cells.iter_mut().enumerate() {
            if cell.maturity < params.harvest_threshold {
                let multiplier = if cell.is_watered() {
                    WATERED_GROWTH_MULTIPLIER
                } else {
                    1.0
                };
                cell.maturity = (cell.maturity + step * multiplier).min(params.harvest_threshold);
            }
            if cell.maturity >= params.harvest_threshold {
                ready.insert(index);
            }
            cell.water = (cell.water - params.water_decay_per_tick).max(0.0);
        }
        ready
    }

    /// Indexes of cells with no water left.
    pub fn dry_cells(&self) -> BTreeSet<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| !cell.is_watered())
            .map(|(index, _)| index)
            .collect()
    }
}
