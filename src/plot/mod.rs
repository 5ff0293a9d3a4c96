//! Figures: a render-independent [`Figure`] plus its ASCII, SVG and plotters renderings.

pub mod ascii;
pub mod chart;
pub mod figure;
pub mod svg;

pub use ascii::*;
pub use chart::*;
pub use figure::*;
pub use svg::*;
