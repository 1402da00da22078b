//! Axis-aligned planar regions (goal areas)

use serde::{Deserialize, Serialize};

/// Rectangle in the (x, y) plane, bounds inclusive
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Region {
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    /// Only the planar part of the state is checked; a heading is ignored
    #[inline]
    pub fn contains(&self, state: &[f64]) -> bool {
        let (x, y) = (state[0], state[1]);
        self.x_min <= x && x <= self.x_max && self.y_min <= y && y <= self.y_max
    }

    pub fn is_well_formed(&self) -> bool {
        self.x_min <= self.x_max && self.y_min <= self.y_max
    }
}

/// True if the state lies in any of the regions
pub fn in_any(regions: &[Region], state: &[f64]) -> bool {
    regions.iter().any(|r| r.contains(state))
}
