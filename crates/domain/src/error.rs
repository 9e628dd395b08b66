//! Common error types used across the workspace.
//!
//! Each failure family is its own `thiserror` enum and converts into the
//! top-level [`SmartHubError`] via `#[from]`, so callers can match on the
//! exact kind instead of inspecting message text.

use crate::device::DeviceKind;

/// Top-level error for every hub operation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SmartHubError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    #[error("a device with id {0} already exists")]
    DuplicateDeviceId(String),

    #[error("a routine with id {0} already exists")]
    DuplicateRoutineId(String),

    #[error("routine {routine} references unknown devices: {}", .missing.join(", "))]
    RoutineDeviceMissing {
        routine: String,
        missing: Vec<String>,
    },

    #[error("rule propagation exceeded the limit of {limit} nested commands")]
    RoutinePropagationOverflow { limit: usize },

    #[error("{operation} is not supported by {kind} devices")]
    UnsupportedOperation {
        kind: DeviceKind,
        operation: &'static str,
    },
}

/// Why a device refused a command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("{kind} devices do not understand command {command:?}")]
    UnknownCommand { kind: DeviceKind, command: String },

    #[error("command {command} is not valid from state {state}")]
    InvalidTransition { command: String, state: String },

    #[error("command {command} was rejected by its guard in state {state}")]
    GuardRejected { command: String, state: String },
}

/// Invariant violations on input values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("id must not be empty")]
    EmptyId,

    #[error("name must not be empty")]
    EmptyName,

    #[error("routine must contain at least one action")]
    NoActions,

    #[error("invalid value {value:?} for attribute {attribute}")]
    InvalidAttributeValue { attribute: String, value: String },

    #[error("unknown device type {0:?}")]
    UnknownDeviceType(String),

    #[error("{kind} devices have no state {state:?}")]
    UnknownState { kind: DeviceKind, state: String },

    #[error("propagation depth must be at least 1")]
    ZeroPropagationDepth,

    #[error("transition table for {kind} has two entries for {command} from {state}")]
    AmbiguousTransition {
        kind: DeviceKind,
        command: String,
        state: String,
    },
}

/// A lookup by id came back empty.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

impl SmartHubError {
    /// Shorthand for a missing device.
    #[must_use]
    pub fn device_not_found(id: impl Into<String>) -> Self {
        NotFoundError {
            entity: "Device",
            id: id.into(),
        }
        .into()
    }

    /// Shorthand for a missing routine.
    #[must_use]
    pub fn routine_not_found(id: impl Into<String>) -> Self {
        NotFoundError {
            entity: "Routine",
            id: id.into(),
        }
        .into()
    }

    /// Whether this error reports a missing device.
    #[must_use]
    pub fn is_device_not_found(&self) -> bool {
        matches!(self, Self::NotFound(NotFoundError { entity: "Device", .. }))
    }

    /// Whether this error reports a missing routine.
    #[must_use]
    pub fn is_routine_not_found(&self) -> bool {
        matches!(self, Self::NotFound(NotFoundError { entity: "Routine", .. }))
    }
}

impl ValidationError {
    /// Build an [`InvalidAttributeValue`](Self::InvalidAttributeValue) from anything printable.
    #[must_use]
    pub fn invalid_attribute(attribute: impl Into<String>, value: impl std::fmt::Display) -> Self {
        Self::InvalidAttributeValue {
            attribute: attribute.into(),
            value: value.to_string(),
        }
    }
}
