//! HydroMine: profit-switching optimizer for a hydro-powered mining rig.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod feeds;
pub mod control;
pub mod strategy;
pub mod engine;
