//! Input/output helpers.
//!
//! - series export (CSV) (`export`)

pub mod export;

pub use export::*;
