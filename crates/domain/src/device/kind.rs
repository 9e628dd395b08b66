//! The closed set of device types.

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::machine::labelled_enum;
use crate::error::ValidationError;

labelled_enum! {
    /// Device type, rendered with its wire name (`LUZ`, `PORTA`, ...).
    pub enum DeviceKind {
        Light => "LUZ",
        Door => "PORTA",
        Plug => "TOMADA",
        CoffeeMaker => "CAFETEIRA",
        Blind => "PERSIANA",
        Sensor => "SENSOR",
    }
}

impl DeviceKind {
    fn english(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Door => "door",
            Self::Plug => "plug",
            Self::CoffeeMaker => "coffeemaker",
            Self::Blind => "blind",
            Self::Sensor => "sensor",
        }
    }
}

impl FromStr for DeviceKind {
    type Err = ValidationError;

    /// Accepts the wire name or the English name, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|kind| {
                kind.as_str().eq_ignore_ascii_case(needle)
                    || kind.english().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| ValidationError::UnknownDeviceType(s.to_string()))
    }
}

impl Serialize for DeviceKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DeviceKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
