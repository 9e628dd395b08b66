//! What a device publishes after a successful transition.
//!
//! Events are transient: the bus hands them to observers and drops them.
//! Collaborators that want a history persist the [`EventRecord`] form.

use serde::{Deserialize, Serialize};

use crate::device::Details;
use crate::id::{DeviceId, EventId};
use crate::time::Timestamp;

/// Event type published by a plug's simulated consumption.
pub const CONSUMPTION_EVENT: &str = "consumo";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub id: EventId,
    /// The command that caused the event, or [`CONSUMPTION_EVENT`].
    pub event_type: String,
    pub origin: DeviceId,
    /// Snapshot of the device after the transition plus effect fields.
    pub payload: Details,
    pub timestamp: Timestamp,
}

impl Event {
    #[must_use]
    pub fn new(
        event_type: impl Into<String>,
        origin: DeviceId,
        payload: Details,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            id: EventId::new(),
            event_type: event_type.into(),
            origin,
            payload,
            timestamp,
        }
    }

    /// Whether this event has the given type and origin.
    #[must_use]
    pub fn matches(&self, event_type: &str, origin: &DeviceId) -> bool {
        self.event_type == event_type && &self.origin == origin
    }

    /// The structured log form of this event.
    #[must_use]
    pub fn record(&self) -> EventRecord {
        EventRecord {
            device_id: self.origin.clone(),
            event: self.event_type.clone(),
            timestamp: self.timestamp,
        }
    }
}

/// Persisted event log line: `{id_dispositivo, evento, timestamp}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(rename = "id_dispositivo", alias = "device_id")]
    pub device_id: DeviceId,
    #[serde(rename = "evento", alias = "event")]
    pub event: String,
    pub timestamp: Timestamp,
}
