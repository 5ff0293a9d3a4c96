//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the measurement set and the fit request (`Samples`, `FitRequest`)
//! - labels, plot styles, and output options
//! - matplotlib-style format string parsing (`style`)

pub mod style;
pub mod types;

pub use style::*;
pub use types::*;
