//! Model functions that can be fitted.
//!
//! Models are small, pure functions paired with an explicit argument list so
//! the fitting code can stay generic.

pub mod model;

pub use model::*;
