//! Reactive rule: turns one device's event into another device's command.

use serde::{Deserialize, Serialize};

use crate::event::Event;
use crate::id::DeviceId;

/// `when origin publishes <when>, run <action> on target`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReactiveRule {
    #[serde(rename = "quando", alias = "when")]
    pub when: String,
    #[serde(rename = "origem", alias = "origin")]
    pub origin: DeviceId,
    #[serde(rename = "acao", alias = "action")]
    pub action: String,
    #[serde(rename = "alvo", alias = "target")]
    pub target: DeviceId,
}

impl ReactiveRule {
    #[must_use]
    pub fn new(
        when: impl Into<String>,
        origin: DeviceId,
        action: impl Into<String>,
        target: DeviceId,
    ) -> Self {
        Self {
            when: when.into(),
            origin,
            action: action.into(),
            target,
        }
    }

    /// Whether `event` should fire this rule.
    #[must_use]
    pub fn matches(&self, event: &Event) -> bool {
        event.matches(&self.when, &self.origin)
    }
}

impl std::fmt::Display for ReactiveRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{} => {}.{}",
            self.origin, self.when, self.target, self.action
        )
    }
}
