//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - run inputs (`Coordinate`, `YearRange`)
//! - the monthly sample index (`SampleDate`) and query selector (`MetricKind`)
//! - collected outputs (`SamplePoint`, `Series`, `SeriesPair`)

pub mod types;

pub use types::*;
