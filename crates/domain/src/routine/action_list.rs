//! Action list — an ordered routine of device commands run on demand.

use serde::{Deserialize, Serialize};

use crate::error::{SmartHubError, ValidationError};
use crate::id::{DeviceId, RoutineId};

/// One step of an action list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutineAction {
    #[serde(rename = "id_dispositivo", alias = "device_id")]
    pub device_id: DeviceId,
    #[serde(rename = "comando", alias = "command")]
    pub command: String,
}

impl RoutineAction {
    #[must_use]
    pub fn new(device_id: DeviceId, command: impl Into<String>) -> Self {
        Self {
            device_id,
            command: command.into(),
        }
    }
}

impl std::fmt::Display for RoutineAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.device_id, self.command)
    }
}

/// Stored body of an action list, as found in routine files.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ActionListBody {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, rename = "nome", alias = "name")]
    pub name: Option<String>,
    #[serde(default, rename = "acoes", alias = "comandos", alias = "actions")]
    pub actions: Vec<RoutineAction>,
}

impl ActionListBody {
    /// Resolve into an [`ActionList`], using `fallback_id` when the body has no id.
    pub(crate) fn into_action_list(
        self,
        fallback_id: Option<&str>,
    ) -> Result<ActionList, SmartHubError> {
        let id = self
            .id
            .as_deref()
            .or(fallback_id)
            .ok_or(ValidationError::EmptyId)?;
        let id = RoutineId::new(id)?;
        let mut builder = ActionList::builder().name(self.name.unwrap_or_else(|| id.to_string()));
        for action in self.actions {
            builder = builder.action(action);
        }
        builder.id(id).build()
    }
}

/// A named, ordered sequence of device commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ActionListBody")]
pub struct ActionList {
    pub id: RoutineId,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "acoes")]
    pub actions: Vec<RoutineAction>,
}

impl TryFrom<ActionListBody> for ActionList {
    type Error = SmartHubError;

    fn try_from(body: ActionListBody) -> Result<Self, Self::Error> {
        body.into_action_list(None)
    }
}

impl ActionList {
    /// Create a builder for constructing an [`ActionList`].
    #[must_use]
    pub fn builder() -> ActionListBuilder {
        ActionListBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`SmartHubError::Validation`] when:
    /// - `name` is empty ([`ValidationError::EmptyName`])
    /// - `actions` is empty ([`ValidationError::NoActions`])
    pub fn validate(&self) -> Result<(), SmartHubError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if self.actions.is_empty() {
            return Err(ValidationError::NoActions.into());
        }
        Ok(())
    }

    /// Device ids referenced by this routine, in order, without repeats.
    #[must_use]
    pub fn device_ids(&self) -> Vec<&DeviceId> {
        let mut ids: Vec<&DeviceId> = Vec::with_capacity(self.actions.len());
        for action in &self.actions {
            if !ids.contains(&&action.device_id) {
                ids.push(&action.device_id);
            }
        }
        ids
    }
}

/// Step-by-step builder for [`ActionList`].
#[derive(Debug, Default)]
pub struct ActionListBuilder {
    id: Option<RoutineId>,
    name: Option<String>,
    actions: Vec<RoutineAction>,
}

impl ActionListBuilder {
    #[must_use]
    pub fn id(mut self, id: RoutineId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn action(mut self, action: RoutineAction) -> Self {
        self.actions.push(action);
        self
    }

    /// Shorthand for pushing a [`RoutineAction`].
    #[must_use]
    pub fn step(self, device_id: DeviceId, command: impl Into<String>) -> Self {
        self.action(RoutineAction::new(device_id, command))
    }

    /// Consume the builder, validate, and return an [`ActionList`].
    ///
    /// The name defaults to the id.
    ///
    /// # Errors
    ///
    /// Returns [`SmartHubError::Validation`] if the id is missing, the name is
    /// blank or there are no actions.
    pub fn build(self) -> Result<ActionList, SmartHubError> {
        let id = self.id.ok_or(ValidationError::EmptyId)?;
        let routine = ActionList {
            name: self.name.unwrap_or_else(|| id.to_string()),
            id,
            actions: self.actions,
        };
        routine.validate()?;
        Ok(routine)
    }
}
