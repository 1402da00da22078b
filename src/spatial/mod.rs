//! Spatial indexing: nearest-cell lookup on value-function grids and goal regions

pub mod grid;
pub mod region;

pub use grid::{linspace, nearest_index, Grid, GridDimension};
pub use region::{in_any, Region};
