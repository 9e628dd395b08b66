//! # smarthub-app
//!
//! Application layer — the running hub and its **port definitions** (traits).
//!
//! ## Responsibilities
//! - [`event_bus`]: synchronous subject/observer delivery, one bus per device
//!   plus one hub-wide
//! - [`hub`]: the [`AutomationHub`](hub::AutomationHub) registry, command
//!   dispatch and the propagation limit for rule chains
//! - [`routine_engine`]: action-list routines and reactive rules
//! - [`report`]: device, plug consumption and consumption-period rows
//! - [`ports`]: traits the composition root implements:
//!   - `Clock`: the hub's source of "now"
//!   - `DeviceSource` / `RoutineSource`: where records come from
//!   - `EventSink`: where event records go, fed by `EventRecorder`
//!
//! ## Dependency rule
//! Depends on `smarthub-domain` only. No IO happens here; adapters live in the
//! binary and depend on *this* crate, not the reverse.

pub mod event_bus;
pub mod hub;
pub mod ports;
pub mod report;
pub mod routine_engine;
