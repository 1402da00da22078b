//! Dense row-major tensors holding sampled value functions

use crate::core::error::{GameError, Result};

/// Dense `f32` array with one axis per grid dimension (plus optional time axis)
///
/// Storage is row-major, so the last axis is contiguous. When a time axis is
/// present it is the last one and a cell's time series is a single slice.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    shape: Vec<usize>,
    strides: Vec<usize>,
    data: Vec<f32>,
}

impl Tensor {
    pub fn new(shape: Vec<usize>, data: Vec<f32>) -> Result<Self> {
        let expected: usize = shape.iter().product();
        if expected != data.len() || shape.is_empty() {
            return Err(GameError::TensorShape {
                expected: shape,
                found: vec![data.len()],
            });
        }
        let strides = row_major_strides(&shape);
        Ok(Self {
            shape,
            strides,
            data,
        })
    }

    /// Build a tensor by evaluating `f` at every multi-index
    pub fn from_fn(shape: Vec<usize>, mut f: impl FnMut(&[usize]) -> f32) -> Self {
        let len: usize = shape.iter().product();
        let strides = row_major_strides(&shape);
        let mut index = vec![0usize; shape.len()];
        let mut data = Vec::with_capacity(len);
        for flat in 0..len {
            let mut rem = flat;
            for (axis, stride) in strides.iter().enumerate() {
                index[axis] = rem / stride;
                rem %= stride;
            }
            data.push(f(&index));
        }
        Self {
            shape,
            strides,
            data,
        }
    }

    pub fn filled(shape: Vec<usize>, value: f32) -> Self {
        let len = shape.iter().product();
        let strides = row_major_strides(&shape);
        Self {
            shape,
            strides,
            data: vec![value; len],
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    #[inline]
    fn offset(&self, index: &[usize]) -> usize {
        debug_assert_eq!(index.len(), self.shape.len());
        index
            .iter()
            .zip(&self.strides)
            .map(|(i, s)| i * s)
            .sum()
    }

    /// Entry at a full multi-index
    #[inline]
    pub fn get(&self, index: &[usize]) -> f32 {
        self.data[self.offset(index)]
    }

    /// Contiguous run along the last axis, for a prefix index covering all other axes
    pub fn lane(&self, prefix: &[usize]) -> &[f32] {
        debug_assert_eq!(prefix.len() + 1, self.shape.len());
        let start: usize = prefix
            .iter()
            .zip(&self.strides)
            .map(|(i, s)| i * s)
            .sum();
        let len = self.shape[self.shape.len() - 1];
        &self.data[start..start + len]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

fn row_major_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![1usize; shape.len()];
    for axis in (0..shape.len().saturating_sub(1)).rev() {
        strides[axis] = strides[axis + 1] * shape[axis + 1];
    }
    strides
}
