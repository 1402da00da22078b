//! Synthetic value functions shared by the integration tests
#![allow(dead_code)]

use reach_avoid::core::types::Configuration;
use reach_avoid::spatial::Grid;
use reach_avoid::value::{Tensor, ValueFunction, ValueFunctionStore};

pub const GOAL_CENTER: [f64; 2] = [0.7, 0.2];

pub fn grid(ndims: usize, cells: usize) -> Grid {
    Grid::uniform(ndims, -1.0, 1.0, cells).unwrap()
}

fn coords(grid: &Grid, index: &[usize]) -> Vec<f64> {
    (0..grid.ndims()).map(|d| grid.points(d)[index[d]]).collect()
}

/// Value function without a time axis
pub fn static_vf(grid: Grid, f: impl Fn(&[f64]) -> f32) -> ValueFunction {
    let values = Tensor::from_fn(grid.shape(), |i| f(coords(&grid, i).as_slice()));
    ValueFunction::new(grid, values, false).unwrap()
}

/// Two time slices: `first` is the governing slice, `last` decides the outcome
pub fn two_slice(
    grid: Grid,
    first: impl Fn(&[f64]) -> f32,
    last: impl Fn(&[f64]) -> f32,
) -> ValueFunction {
    let ndims = grid.ndims();
    let mut shape = grid.shape();
    shape.push(2);
    let values = Tensor::from_fn(shape, |i| {
        let s = coords(&grid, &i[..ndims]);
        if i[ndims] == 0 {
            first(s.as_slice())
        } else {
            last(s.as_slice())
        }
    });
    ValueFunction::new(grid, values, true).unwrap()
}

fn dist(a: &[f64], b: &[f64]) -> f32 {
    ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)).sqrt() as f32
}

/// Attacker descends towards the goal centre
pub fn seeking_1v0() -> ValueFunction {
    two_slice(grid(2, 41), |s| dist(s, &GOAL_CENTER) - 5.0, |_| 1.0)
}

/// No sign change anywhere: attackers hold position
pub fn idle_1v0() -> ValueFunction {
    static_vf(grid(2, 11), |_| 1.0)
}

/// Attacker escapes from every joint state
pub fn escape_1v1() -> ValueFunction {
    static_vf(grid(4, 11), |_| -1.0)
}

/// Defender wins everywhere and closes the distance to its attacker
pub fn chasing_1v1() -> ValueFunction {
    two_slice(grid(4, 21), |s| -dist(&s[..2], &s[2..]) - 1.0, |_| 1.0)
}

pub fn escape_2v1() -> ValueFunction {
    static_vf(grid(6, 5), |_| -1.0)
}

pub fn capture_2v1() -> ValueFunction {
    static_vf(grid(6, 5), |_| 1.0)
}

/// Outcome depends on positions so assignments vary across agents
pub fn mixed_1v1() -> ValueFunction {
    static_vf(grid(4, 11), |s| if s[0] < s[2] - 0.5 { -1.0 } else { 1.0 })
}

pub fn mixed_2v1() -> ValueFunction {
    static_vf(grid(6, 5), |s| if s[0] + s[2] < -0.8 { -1.0 } else { 1.0 })
}

pub fn store(v1v0: ValueFunction, v1v1: ValueFunction, v2v1: ValueFunction) -> ValueFunctionStore {
    ValueFunctionStore::new(2, 2)
        .with(Configuration::OneVsZero, v1v0)
        .unwrap()
        .with(Configuration::OneVsOne, v1v1)
        .unwrap()
        .with(Configuration::TwoVsOne, v2v1)
        .unwrap()
}

/// Defender pair wins and both defenders close in on the attacker
pub fn pincer_1v2() -> ValueFunction {
    two_slice(
        grid(6, 5),
        |s| -dist(&s[..2], &s[2..4]) - dist(&s[..2], &s[4..]) - 1.0,
        |_| 1.0,
    )
}
