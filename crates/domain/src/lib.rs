//! # smarthub-domain
//!
//! Pure domain model for the smarthub home automation system.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Devices** as closed per-type state machines (lights, doors,
//!   plugs, coffee makers, blinds, sensors) with transition tables, guards
//!   and post-transition effects
//! - Define **Events** (what a device publishes after a transition)
//! - Define **Routines** (on-demand action lists and reactive rules)
//! - Plug energy accounting, both live and reconstructed from event logs
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod consumption;
pub mod device;
pub mod event;
pub mod routine;
