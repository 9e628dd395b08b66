//! Synchronous in-process event bus.
//!
//! Every device entry in the hub owns one [`EventBus`]; the hub owns one more
//! for hub-wide observers. Delivery is synchronous and in attachment order. An
//! observer that fails is logged and skipped; the remaining observers still
//! receive the event.
//!
//! The bus is generic over the context handed to observers, so observers can
//! issue further commands into the hub (`C = AutomationHub`) while the bus
//! itself stays testable without one.

use std::fmt;
use std::rc::Rc;

use smarthub_domain::error::SmartHubError;
use smarthub_domain::event::Event;

/// Failure reported by an observer callback.
#[derive(Debug, thiserror::Error)]
pub enum ObserverError {
    #[error(transparent)]
    Hub(#[from] SmartHubError),

    #[error("{0}")]
    Other(String),
}

/// A listener attached to an [`EventBus`].
pub trait Observer<C> {
    /// Name used in logs.
    fn name(&self) -> String;

    /// Handle one event.
    ///
    /// # Errors
    ///
    /// Any error is logged by the bus and does not stop delivery.
    fn on_event(&self, event: &Event, ctx: &mut C) -> Result<(), ObserverError>;
}

/// Ordered list of observers, deduplicated by identity.
pub struct EventBus<C> {
    observers: Vec<Rc<dyn Observer<C>>>,
}

impl<C> Default for EventBus<C> {
    fn default() -> Self {
        Self {
            observers: Vec::new(),
        }
    }
}

impl<C> Clone for EventBus<C> {
    fn clone(&self) -> Self {
        Self {
            observers: self.observers.clone(),
        }
    }
}

impl<C> fmt::Debug for EventBus<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.observers.iter().map(|observer| observer.name()))
            .finish()
    }
}

fn same_observer<C>(a: &Rc<dyn Observer<C>>, b: &Rc<dyn Observer<C>>) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

impl<C> EventBus<C> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `observer`. Returns `false` if that instance is already attached.
    pub fn attach(&mut self, observer: Rc<dyn Observer<C>>) -> bool {
        if self.contains(&observer) {
            return false;
        }
        self.observers.push(observer);
        true
    }

    /// Remove `observer` by identity. Returns `false` if it was not attached.
    pub fn detach(&mut self, observer: &Rc<dyn Observer<C>>) -> bool {
        let before = self.observers.len();
        self.observers.retain(|existing| !same_observer(existing, observer));
        self.observers.len() != before
    }

    #[must_use]
    pub fn contains(&self, observer: &Rc<dyn Observer<C>>) -> bool {
        self.observers
            .iter()
            .any(|existing| same_observer(existing, observer))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Deliver `event` to every observer in order.
    ///
    /// Returns how many observers failed.
    pub fn notify(&self, event: &Event, ctx: &mut C) -> usize {
        let mut failures = 0;
        for observer in &self.observers {
            if let Err(error) = observer.on_event(event, ctx) {
                failures += 1;
                tracing::warn!(
                    observer = %observer.name(),
                    event = %event.event_type,
                    origin = %event.origin,
                    %error,
                    "observer failed"
                );
            }
        }
        failures
    }
}
