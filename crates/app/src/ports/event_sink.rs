//! Event sink port — where event records are persisted.

use smarthub_domain::event::{Event, EventRecord};

use crate::event_bus::{Observer, ObserverError};
use crate::hub::AutomationHub;

/// Append-only destination for [`EventRecord`]s.
pub trait EventSink {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Persist one record.
    ///
    /// # Errors
    ///
    /// Returns the adapter's error when the record cannot be written.
    fn record(&self, record: &EventRecord) -> Result<(), Self::Error>;
}

/// Hub-wide observer forwarding every event's record to an [`EventSink`].
#[derive(Debug)]
pub struct EventRecorder<S> {
    sink: S,
}

impl<S: EventSink> EventRecorder<S> {
    #[must_use]
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }
}

impl<S: EventSink> Observer<AutomationHub> for EventRecorder<S> {
    fn name(&self) -> String {
        "event-recorder".to_string()
    }

    fn on_event(&self, event: &Event, _hub: &mut AutomationHub) -> Result<(), ObserverError> {
        self.sink
            .record(&event.record())
            .map_err(|error| ObserverError::Other(error.to_string()))
    }
}
