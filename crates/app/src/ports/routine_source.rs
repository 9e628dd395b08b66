//! Routine source port — where stored action lists and rules come from.

use smarthub_domain::routine::RoutineBook;

/// Provides the routine book the hub is built with.
pub trait RoutineSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load every stored routine and reactive rule.
    ///
    /// # Errors
    ///
    /// Returns the adapter's error when the store cannot be read or parsed.
    fn load_routines(&self) -> Result<RoutineBook, Self::Error>;
}

impl RoutineSource for RoutineBook {
    type Error = std::convert::Infallible;

    fn load_routines(&self) -> Result<RoutineBook, Self::Error> {
        Ok(self.clone())
    }
}
