//! # smarthubd — smarthub daemon
//!
//! Composition root that wires the file adapters around the hub.
//!
//! ## Responsibilities
//! - Parse configuration (`smarthub.toml`, env vars)
//! - Install the tracing subscriber
//! - Load routines and devices, attach the event log
//! - Run the configured startup routines
//! - Print the device, consumption and period reports as JSON on stdout
//!
//! ## Dependency rule
//! This is the **only** crate that does IO.
//! It is the wiring layer; no domain logic belongs here.

use anyhow::Context;
use smarthubd::config::Config;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;

    let filter = EnvFilter::try_new(&config.logging.filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let summary = smarthubd::run(&config)?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
