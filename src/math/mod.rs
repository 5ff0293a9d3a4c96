//! Numerical kernels: finite-difference Jacobians and small dense solves.

pub mod jacobian;
pub mod ols;

pub use jacobian::*;
pub use ols::*;
