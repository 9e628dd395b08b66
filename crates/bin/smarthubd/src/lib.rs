//! Library side of the `smarthubd` daemon: configuration, file adapters and
//! the boot sequence, kept out of `main.rs` so integration tests can drive them.

pub mod config;
pub mod files;
pub mod startup;

pub use startup::{RoutineSummary, Summary, run};
