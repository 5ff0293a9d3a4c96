//! Curve fitting.
//!
//! Responsibilities:
//!
//! - bind named initial guesses to the model's parameter order
//! - run weighted Levenberg–Marquardt and compute the covariance
//! - package estimates as `Measured` values and compute the residual score

pub mod fitter;
pub mod guesses;
pub mod outcome;
pub mod package;
pub mod score;

pub use fitter::*;
pub use guesses::*;
pub use outcome::*;
pub use package::*;
pub use score::*;
