//! Typed identifier newtypes.
//!
//! Devices and routines are addressed by the human-chosen slugs found in
//! configuration (`luz_sala`, `boa_noite`), events by random UUIDs.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

macro_rules! define_slug_id {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Wrap a slug, rejecting empty or blank input.
            ///
            /// # Errors
            ///
            /// Returns [`ValidationError::EmptyId`] when `value` is blank.
            pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
                let value = value.into();
                if value.trim().is_empty() {
                    return Err(ValidationError::EmptyId);
                }
                Ok(Self(value))
            }

            /// Borrow the slug.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }
    };
}

define_slug_id!(
    /// Unique identifier for a [`Device`](crate::device::Device).
    DeviceId
);

define_slug_id!(
    /// Unique identifier for an [`ActionList`](crate::routine::ActionList).
    RoutineId
);

/// Unique identifier for an [`Event`](crate::event::Event).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(uuid::Uuid);

impl Default for EventId {
    fn default() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl EventId {
    /// Generate a new random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Access the inner UUID.
    #[must_use]
    pub fn as_uuid(self) -> uuid::Uuid {
        self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn should_reject_blank_device_id() {
        assert_eq!(DeviceId::new("   "), Err(ValidationError::EmptyId));
        assert_eq!(DeviceId::new(""), Err(ValidationError::EmptyId));
    }

    #[test]
    fn should_display_slug_verbatim() {
        let id = DeviceId::new("luz_sala").unwrap();
        assert_eq!(id.to_string(), "luz_sala");
        assert_eq!(id.as_str(), "luz_sala");
    }

    #[test]
    fn should_lookup_map_by_str_through_borrow() {
        let mut map = HashMap::new();
        map.insert(DeviceId::new("porta").unwrap(), 1);
        assert_eq!(map.get("porta"), Some(&1));
    }

    #[test]
    fn should_serialize_as_plain_string() {
        let id = RoutineId::new("boa_noite").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"boa_noite\"");
    }

    #[test]
    fn should_reject_blank_id_when_deserializing() {
        assert!(serde_json::from_str::<DeviceId>("\"  \"").is_err());
    }

    #[test]
    fn should_generate_unique_event_ids() {
        assert_ne!(EventId::new(), EventId::new());
    }
}
