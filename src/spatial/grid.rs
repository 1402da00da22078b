//! Uniform grids over joint state spaces
//!
//! Value functions are sampled on a uniform grid with one axis per joint-state
//! coordinate. Any continuous state is represented by its nearest grid cell;
//! coordinates outside the grid are clamped to the boundary cell.

use serde::{Deserialize, Serialize};

use crate::core::error::{GameError, Result};

/// One axis of a grid: bounds, cell count and whether it wraps around
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridDimension {
    pub min: f64,
    pub max: f64,
    pub cells: usize,
    /// Periodic axes (headings) wrap: `max` coincides with `min`
    #[serde(default)]
    pub periodic: bool,
}

impl GridDimension {
    pub fn new(min: f64, max: f64, cells: usize) -> Self {
        Self {
            min,
            max,
            cells,
            periodic: false,
        }
    }

    pub fn periodic(min: f64, max: f64, cells: usize) -> Self {
        Self {
            min,
            max,
            cells,
            periodic: true,
        }
    }

    /// Length of one period (periodic axes only meaningful)
    #[inline]
    pub fn period(&self) -> f64 {
        self.max - self.min
    }

    /// Grid points along this axis, ascending and uniformly spaced
    ///
    /// Periodic axes leave out the point at `max`, since it is the same as `min`.
    pub fn points(&self) -> Vec<f64> {
        let last = if self.periodic {
            self.min + self.period() * (1.0 - 1.0 / self.cells as f64)
        } else {
            self.max
        };
        linspace(self.min, last, self.cells)
    }
}

/// `n` evenly spaced samples from `lo` to `hi`, both ends included
pub fn linspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![lo],
        _ => {
            let step = (hi - lo) / (n - 1) as f64;
            let mut points: Vec<f64> = (0..n).map(|i| lo + i as f64 * step).collect();
            points[n - 1] = hi;
            points
        }
    }
}

/// Index of the grid point nearest to `value`
///
/// `grid_points` must be ascending. Values below the first point map to 0,
/// values above the last map to `len - 1`. When `value` is exactly halfway
/// between two neighbours the upper index wins.
pub fn nearest_index(value: f64, grid_points: &[f64]) -> usize {
    let idx = grid_points.partition_point(|&p| p < value);
    if idx == 0 {
        return 0;
    }
    if idx == grid_points.len() {
        return idx - 1;
    }
    let below = (value - grid_points[idx - 1]).abs();
    let above = (value - grid_points[idx]).abs();
    if below < above {
        idx - 1
    } else {
        idx
    }
}

/// Multi-dimensional uniform grid
#[derive(Debug, Clone)]
pub struct Grid {
    dims: Vec<GridDimension>,
    points: Vec<Vec<f64>>,
}

impl Grid {
    pub fn new(dims: Vec<GridDimension>) -> Result<Self> {
        if dims.is_empty() {
            return Err(GameError::Config("grid needs at least one dimension".into()));
        }
        for (i, d) in dims.iter().enumerate() {
            if d.cells == 0 {
                return Err(GameError::Config(format!("grid dimension {} has no cells", i)));
            }
            if !(d.max > d.min) {
                return Err(GameError::Config(format!(
                    "grid dimension {} has inverted bounds [{}, {}]",
                    i, d.min, d.max
                )));
            }
        }
        let points = dims.iter().map(GridDimension::points).collect();
        Ok(Self { dims, points })
    }

    /// Same bounds and cell count on every axis
    pub fn uniform(ndims: usize, min: f64, max: f64, cells: usize) -> Result<Self> {
        Self::new(vec![GridDimension::new(min, max, cells); ndims])
    }

    #[inline]
    pub fn ndims(&self) -> usize {
        self.dims.len()
    }

    pub fn dimensions(&self) -> &[GridDimension] {
        &self.dims
    }

    pub fn points(&self, dim: usize) -> &[f64] {
        &self.points[dim]
    }

    /// Cell count per axis
    pub fn shape(&self) -> Vec<usize> {
        self.dims.iter().map(|d| d.cells).collect()
    }

    /// Spacing between neighbouring points on an axis
    pub fn spacing(&self, dim: usize) -> f64 {
        let pts = &self.points[dim];
        if pts.len() < 2 {
            return 0.0;
        }
        pts[1] - pts[0]
    }

    /// Nearest cell along one axis, wrapping periodic axes first
    pub fn nearest_index(&self, dim: usize, value: f64) -> usize {
        let spec = &self.dims[dim];
        let pts = &self.points[dim];
        if !spec.periodic {
            return nearest_index(value, pts);
        }
        let period = spec.period();
        let wrapped = spec.min + (value - spec.min).rem_euclid(period);
        let idx = nearest_index(wrapped, pts);
        let last = pts.len() - 1;
        // Halfway past the last point the upper neighbour is cell 0
        if idx == last && (spec.min + period - wrapped) <= (wrapped - pts[last]) {
            0
        } else {
            idx
        }
    }

    /// Nearest cell for a full coordinate vector, one index per axis
    pub fn joint_index(&self, coordinates: &[f64]) -> Vec<usize> {
        debug_assert_eq!(coordinates.len(), self.ndims());
        coordinates
            .iter()
            .enumerate()
            .map(|(dim, &c)| self.nearest_index(dim, c))
            .collect()
    }
}
