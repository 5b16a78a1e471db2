//! `sst-timeseries` library crate.
//!
//! The binary (`sst-graph`) is a thin wrapper around this library so that:
//!
//! - the collection loop is testable against in-memory point sources
//! - the renderer and exports can be driven without the network

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod plot;
pub mod report;
