//! Value-function oracle
//!
//! Looks up precomputed reach-avoid values and their spatial gradients at the
//! grid cell nearest to a joint state, and finds the time slices where the
//! sign of the value flips along the time axis.

use crate::core::error::{GameError, Result};
use crate::spatial::Grid;
use crate::value::derivative::spatial_derivative;
use crate::value::tensor::Tensor;

/// Time indices where a cell's value changes side
///
/// Index `t` in either list means the flip happens between slice `t` and
/// slice `t + 1`; slice `t` is the last one on the old side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HorizonSlice {
    /// inside (value <= 0) -> outside (value > 0)
    pub rising: Vec<usize>,
    /// outside -> inside
    pub falling: Vec<usize>,
}

impl HorizonSlice {
    /// Earliest inside -> outside transition, the slice that governs control
    pub fn governing(&self) -> Option<usize> {
        self.rising.first().copied()
    }
}

/// A value function sampled on a grid, with optional time axis and gradients
#[derive(Debug, Clone)]
pub struct ValueFunction {
    grid: Grid,
    values: Tensor,
    time_steps: Option<usize>,
    gradients: Option<Vec<Tensor>>,
}

impl ValueFunction {
    /// Validates that the tensor has one axis per grid dimension (plus the
    /// time axis if `time_axis` is set) and that the axis lengths agree.
    pub fn new(grid: Grid, values: Tensor, time_axis: bool) -> Result<Self> {
        let mut expected = grid.shape();
        if time_axis {
            let slices = values.shape().last().copied().unwrap_or(0);
            expected.push(slices);
        }
        if values.shape() != expected.as_slice() || expected.last() == Some(&0) {
            return Err(GameError::TensorShape {
                expected,
                found: values.shape().to_vec(),
            });
        }
        let time_steps = time_axis.then(|| values.shape()[values.rank() - 1]);
        Ok(Self {
            grid,
            values,
            time_steps,
            gradients: None,
        })
    }

    /// Attach precomputed gradient tensors, one per spatial dimension
    ///
    /// Each tensor either matches the spatial grid (time independent) or the
    /// full value tensor including its time axis.
    pub fn with_gradients(mut self, gradients: Vec<Tensor>) -> Result<Self> {
        if gradients.len() != self.grid.ndims() {
            return Err(GameError::TensorShape {
                expected: vec![self.grid.ndims()],
                found: vec![gradients.len()],
            });
        }
        let spatial = self.grid.shape();
        for g in &gradients {
            if g.shape() != spatial.as_slice() && g.shape() != self.values.shape() {
                return Err(GameError::TensorShape {
                    expected: spatial,
                    found: g.shape().to_vec(),
                });
            }
        }
        self.gradients = Some(gradients);
        Ok(self)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[inline]
    pub fn ndims(&self) -> usize {
        self.grid.ndims()
    }

    /// Number of time slices, 1 for a tensor without time axis
    pub fn time_steps(&self) -> usize {
        self.time_steps.unwrap_or(1)
    }

    pub fn has_time_axis(&self) -> bool {
        self.time_steps.is_some()
    }

    fn cell(&self, state: &[f64]) -> Result<Vec<usize>> {
        if state.len() != self.grid.ndims() {
            return Err(GameError::StateLength {
                expected: self.grid.ndims(),
                found: state.len(),
            });
        }
        Ok(self.grid.joint_index(state))
    }

    fn check_time(&self, time_index: usize) -> Result<()> {
        let len = self.time_steps();
        if time_index >= len {
            return Err(GameError::TimeIndexOutOfRange {
                index: time_index,
                len,
            });
        }
        Ok(())
    }

    /// Value at the cell nearest to `state`
    ///
    /// For tensors with a time axis, `None` selects the last slice. Without
    /// a time axis the only valid explicit index is 0.
    pub fn value_at(&self, state: &[f64], time_index: Option<usize>) -> Result<f32> {
        let mut index = self.cell(state)?;
        match self.time_steps {
            Some(steps) => {
                let t = time_index.unwrap_or(steps - 1);
                self.check_time(t)?;
                index.push(t);
            }
            None => {
                if let Some(t) = time_index {
                    self.check_time(t)?;
                }
            }
        }
        Ok(self.values.get(&index))
    }

    /// The cell's whole time series (a single entry without time axis)
    pub fn values_over_time(&self, state: &[f64]) -> Result<Vec<f32>> {
        let index = self.cell(state)?;
        Ok(match self.time_steps {
            Some(_) => self.values.lane(&index).to_vec(),
            None => vec![self.values.get(&index)],
        })
    }

    /// Spatial gradient at the cell nearest to `state`, one entry per dimension
    pub fn gradient_at(&self, state: &[f64], time_index: usize) -> Result<Vec<f64>> {
        let cell = self.cell(state)?;
        self.check_time(time_index)?;
        let time = self.time_steps.map(|_| time_index);

        if let Some(gradients) = &self.gradients {
            return Ok(gradients
                .iter()
                .map(|g| {
                    if g.rank() == cell.len() {
                        g.get(&cell) as f64
                    } else {
                        let mut index = cell.clone();
                        index.push(time_index);
                        g.get(&index) as f64
                    }
                })
                .collect());
        }

        Ok((0..self.grid.ndims())
            .map(|dim| spatial_derivative(&self.values, &self.grid, &cell, time, dim))
            .collect())
    }

    /// Sign-change search along the time axis at the state's cell
    pub fn find_horizon_slice(&self, state: &[f64]) -> Result<HorizonSlice> {
        let series = self.values_over_time(state)?;
        Ok(sign_changes(&series))
    }
}

/// Classify each slice as inside (<= 0) or outside (> 0) and list the flips
pub fn sign_changes(series: &[f32]) -> HorizonSlice {
    let mut slice = HorizonSlice::default();
    for (t, pair) in series.windows(2).enumerate() {
        let (was_inside, is_inside) = (pair[0] <= 0.0, pair[1] <= 0.0);
        match (was_inside, is_inside) {
            (true, false) => slice.rising.push(t),
            (false, true) => slice.falling.push(t),
            _ => {}
        }
    }
    slice
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timed_1d(series: &[f32]) -> ValueFunction {
        let grid = Grid::uniform(1, -1.0, 1.0, 3).unwrap();
        let steps = series.len();
        let s = series.to_vec();
        let values = Tensor::from_fn(vec![3, steps], move |i| s[i[1]]);
        ValueFunction::new(grid, values, true).unwrap()
    }

    #[test]
    fn test_sign_changes_lists_both_directions() {
        let hs = sign_changes(&[-1.0, -0.5, 0.5, 0.2, -0.1, 0.3]);
        assert_eq!(hs.rising, vec![1, 4]);
        assert_eq!(hs.falling, vec![3]);
        assert_eq!(hs.governing(), Some(1));
    }

    #[test]
    fn test_zero_counts_as_inside() {
        let hs = sign_changes(&[0.0, 0.1]);
        assert_eq!(hs.rising, vec![0]);
        assert!(hs.falling.is_empty());
    }

    #[test]
    fn test_no_time_axis_has_no_transition() {
        let grid = Grid::uniform(2, -1.0, 1.0, 5).unwrap();
        let vf = ValueFunction::new(grid, Tensor::filled(vec![5, 5], -1.0), false).unwrap();
        let hs = vf.find_horizon_slice(&[0.0, 0.0]).unwrap();
        assert_eq!(hs.governing(), None);
    }

    #[test]
    fn test_value_at_defaults_to_last_slice() {
        let vf = timed_1d(&[-1.0, 2.0, 3.0]);
        assert_eq!(vf.value_at(&[0.0], None).unwrap(), 3.0);
        assert_eq!(vf.value_at(&[0.0], Some(0)).unwrap(), -1.0);
        assert!(vf.value_at(&[0.0], Some(3)).is_err());
    }

    #[test]
    fn test_rank_mismatch_rejected() {
        let grid = Grid::uniform(4, -1.0, 1.0, 3).unwrap();
        let wrong = Tensor::filled(vec![3, 3, 3], 0.0);
        assert!(matches!(
            ValueFunction::new(grid, wrong, false),
            Err(GameError::TensorShape { .. })
        ));
    }

    #[test]
    fn test_state_length_checked() {
        let vf = timed_1d(&[0.0]);
        assert!(matches!(
            vf.value_at(&[0.0, 1.0], None),
            Err(GameError::StateLength { .. })
        ));
    }

    #[test]
    fn test_precomputed_gradients_take_precedence() {
        let grid = Grid::uniform(2, -1.0, 1.0, 3).unwrap();
        let vf = ValueFunction::new(grid, Tensor::filled(vec![3, 3], 1.0), false)
            .unwrap()
            .with_gradients(vec![
                Tensor::filled(vec![3, 3], 0.25),
                Tensor::filled(vec![3, 3], -0.5),
            ])
            .unwrap();
        let g = vf.gradient_at(&[0.0, 0.0], 0).unwrap();
        assert_eq!(g, vec![0.25, -0.5]);
    }
}
