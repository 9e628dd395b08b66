//! Clock port — the hub's only source of "now".

use std::cell::Cell;
use std::rc::Rc;

use chrono::Duration;
use smarthub_domain::time::{self, Timestamp};

pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        time::now()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same instant, so a test can keep one handle and give the
/// other to the hub.
#[derive(Debug, Clone)]
pub struct ManualClock {
    instant: Rc<Cell<Timestamp>>,
}

impl ManualClock {
    #[must_use]
    pub fn new(start: Timestamp) -> Self {
        Self {
            instant: Rc::new(Cell::new(start)),
        }
    }

    pub fn set(&self, instant: Timestamp) {
        self.instant.set(instant);
    }

    pub fn advance(&self, by: Duration) {
        self.instant.set(self.instant.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.instant.get()
    }
}
