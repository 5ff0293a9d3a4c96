//! Values with propagated first-order uncertainty.

pub mod measured;

pub use measured::*;
