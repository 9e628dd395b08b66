//! Device source port — where stored device definitions come from.

use smarthub_domain::device::DeviceRecord;

/// Provides the device records the hub is populated with at startup.
pub trait DeviceSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load every stored device record.
    ///
    /// # Errors
    ///
    /// Returns the adapter's error when the store cannot be read at all.
    /// Individual bad records are returned as-is and rejected by the hub.
    fn load_devices(&self) -> Result<Vec<DeviceRecord>, Self::Error>;
}

impl DeviceSource for Vec<DeviceRecord> {
    type Error = std::convert::Infallible;

    fn load_devices(&self) -> Result<Vec<DeviceRecord>, Self::Error> {
        Ok(self.clone())
    }
}
