//! Chart output.
//!
//! - dual-axis PNG/SVG time-series chart (`chart`)

pub mod chart;

pub use chart::*;
