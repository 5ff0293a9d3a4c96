//! Data acquisition: synthetic measurements or arrays given on the command line.

pub mod sample;

pub use sample::*;
