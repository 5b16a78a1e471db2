//! Data acquisition.
//!
//! - monthly sample index (`dates`)
//! - SST point-query API client (`sst`)

pub mod dates;
pub mod sst;

pub use dates::MonthlyDates;
pub use sst::{ApiConfig, FetchError, PointSource, SstClient};
