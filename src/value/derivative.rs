//! Finite-difference spatial derivatives of sampled value functions

use crate::spatial::Grid;
use crate::value::tensor::Tensor;

/// Derivative of the value function along `dim` at one grid cell
///
/// Central difference in the interior, one-sided at the edges of bounded
/// axes, wrapped on periodic axes. `time` selects the slice when the tensor
/// carries a trailing time axis.
pub fn spatial_derivative(
    values: &Tensor,
    grid: &Grid,
    cell: &[usize],
    time: Option<usize>,
    dim: usize,
) -> f64 {
    let n = grid.dimensions()[dim].cells;
    let h = grid.spacing(dim);
    if n < 2 || h == 0.0 {
        return 0.0;
    }

    let mut index: Vec<usize> = cell.to_vec();
    if let Some(t) = time {
        index.push(t);
    }
    let mut sample = |i: usize| -> f64 {
        index[dim] = i;
        values.get(&index) as f64
    };

    let i = cell[dim];
    if grid.dimensions()[dim].periodic {
        let next = (i + 1) % n;
        let prev = (i + n - 1) % n;
        return (sample(next) - sample(prev)) / (2.0 * h);
    }

    if i == 0 {
        (sample(1) - sample(0)) / h
    } else if i == n - 1 {
        (sample(n - 1) - sample(n - 2)) / h
    } else {
        (sample(i + 1) - sample(i - 1)) / (2.0 * h)
    }
}

/// Derivative along `dim` at every cell, same shape as `values`
pub fn spatial_derivative_array(values: &Tensor, grid: &Grid, dim: usize) -> Tensor {
    let spatial = grid.ndims();
    let has_time = values.rank() == spatial + 1;
    Tensor::from_fn(values.shape().to_vec(), |index| {
        let time = has_time.then(|| index[spatial]);
        spatial_derivative(values, grid, &index[..spatial], time, dim) as f32
    })
}
