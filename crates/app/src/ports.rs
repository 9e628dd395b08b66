//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the hub and the outside world: where
//! time comes from, where device and routine definitions are loaded from,
//! and where event records go. They live here so both the hub and the
//! adapters in the binary can depend on them.

pub mod clock;
pub mod device_source;
pub mod event_sink;
pub mod routine_source;

pub use clock::{Clock, ManualClock, SystemClock};
pub use device_source::DeviceSource;
pub use event_sink::{EventRecorder, EventSink};
pub use routine_source::RoutineSource;
