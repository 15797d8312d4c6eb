//! Integration test harness.
//!
//! `mock_rig` provides deterministic in-memory collaborators;
//! `cycle` runs full optimization cycles through them.

mod cycle;
mod mock_rig;
