//! Precomputed value functions: storage, lookup and gradients
//!
//! The tensors are produced elsewhere by backward reachability analysis and
//! are treated as immutable inputs here.

pub mod derivative;
pub mod oracle;
pub mod store;
pub mod tensor;

pub use derivative::{spatial_derivative, spatial_derivative_array};
pub use oracle::{sign_changes, HorizonSlice, ValueFunction};
pub use store::ValueFunctionStore;
pub use tensor::Tensor;
