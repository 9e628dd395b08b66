//! Runs action lists and binds reactive rules.
//!
//! An action list runs on demand: every referenced device must exist before
//! the first action fires, then each action is executed in order and its
//! outcome recorded. A failing action does not stop the rest, except a
//! propagation overflow, which aborts the routine.
//!
//! A reactive rule is a [`RuleObserver`] attached to its origin device's bus.

use std::rc::Rc;

use smarthub_domain::error::SmartHubError;
use smarthub_domain::event::Event;
use smarthub_domain::id::RoutineId;
use smarthub_domain::routine::{ActionList, ReactiveRule, RoutineAction};

use crate::event_bus::{Observer, ObserverError};
use crate::hub::AutomationHub;

/// Observer that executes a rule's action on its target.
#[derive(Debug)]
pub struct RuleObserver {
    rule: ReactiveRule,
}

impl RuleObserver {
    #[must_use]
    pub fn new(rule: ReactiveRule) -> Self {
        Self { rule }
    }

    #[must_use]
    pub fn rule(&self) -> &ReactiveRule {
        &self.rule
    }
}

impl Observer<AutomationHub> for RuleObserver {
    fn name(&self) -> String {
        format!("rule {}", self.rule)
    }

    fn on_event(&self, event: &Event, hub: &mut AutomationHub) -> Result<(), ObserverError> {
        if !self.rule.matches(event) {
            return Ok(());
        }
        let rule = &self.rule;
        let Some(target) = hub.lookup(rule.target.as_str()) else {
            tracing::warn!(%rule, "rule target not found, skipping");
            return Ok(());
        };
        if !target.supports(&rule.action) {
            tracing::warn!(%rule, kind = %target.kind(), "rule action not understood by target, skipping");
            return Ok(());
        }

        tracing::debug!(%rule, "rule fired");
        hub.execute(rule.target.as_str(), &rule.action)?;
        Ok(())
    }
}

/// How one action of a routine went.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionOutcome {
    pub action: RoutineAction,
    pub result: Result<Event, SmartHubError>,
}

impl ActionOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Outcome of [`AutomationHub::run_routine`], one entry per action in order.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutineReport {
    pub routine: RoutineId,
    pub outcomes: Vec<ActionOutcome>,
}

impl RoutineReport {
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(ActionOutcome::is_success)
    }
}

impl AutomationHub {
    /// Run the stored action list `id`.
    ///
    /// # Errors
    ///
    /// - [`SmartHubError::NotFound`] when no routine has `id`
    /// - [`SmartHubError::RoutineDeviceMissing`] when an action names an
    ///   unregistered device; nothing runs in that case
    /// - [`SmartHubError::RoutinePropagationOverflow`] when an action's rule
    ///   chain overflows; earlier actions stay applied and later ones are not run
    #[tracing::instrument(skip(self))]
    pub fn run_routine(&mut self, id: &str) -> Result<RoutineReport, SmartHubError> {
        let routine = self
            .routines()
            .routine(id)
            .cloned()
            .ok_or_else(|| SmartHubError::routine_not_found(id))?;

        let missing: Vec<String> = routine
            .device_ids()
            .into_iter()
            .filter(|device| self.lookup(device.as_str()).is_none())
            .map(ToString::to_string)
            .collect();
        if !missing.is_empty() {
            tracing::warn!(?missing, "routine references unknown devices");
            return Err(SmartHubError::RoutineDeviceMissing {
                routine: routine.id.to_string(),
                missing,
            });
        }

        tracing::info!(name = %routine.name, actions = routine.actions.len(), "running routine");
        let mut outcomes = Vec::with_capacity(routine.actions.len());
        for action in routine.actions {
            match self.execute(action.device_id.as_str(), &action.command) {
                Err(error @ SmartHubError::RoutinePropagationOverflow { .. }) => {
                    tracing::warn!(device = %action.device_id, command = %action.command, %error, "routine aborted");
                    return Err(error);
                }
                result => {
                    if let Err(error) = &result {
                        tracing::warn!(device = %action.device_id, command = %action.command, %error, "routine action failed");
                    }
                    outcomes.push(ActionOutcome { action, result });
                }
            }
        }

        let report = RoutineReport {
            routine: routine.id,
            outcomes,
        };
        tracing::info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            "routine finished"
        );
        Ok(report)
    }

    /// Store an action list.
    ///
    /// # Errors
    ///
    /// Returns [`SmartHubError::DuplicateRoutineId`] when the id is taken, or
    /// a validation error for an action list without actions.
    #[tracing::instrument(skip_all, fields(routine_id = %routine.id))]
    pub fn add_routine(&mut self, routine: ActionList) -> Result<(), SmartHubError> {
        routine.validate()?;
        self.routines_mut().insert_routine(routine)?;
        tracing::info!("routine added");
        Ok(())
    }

    /// Store a reactive rule and bind it to its origin device.
    ///
    /// The target is resolved each time the rule fires, so it may be
    /// registered later.
    ///
    /// # Errors
    ///
    /// Returns [`SmartHubError::NotFound`] when the origin device is not registered.
    #[tracing::instrument(skip_all, fields(rule = %rule))]
    pub fn add_rule(&mut self, rule: ReactiveRule) -> Result<(), SmartHubError> {
        self.attach_device_observer(
            rule.origin.as_str(),
            Rc::new(RuleObserver::new(rule.clone())),
        )?;
        self.routines_mut().push_rule(rule);
        tracing::info!("rule added");
        Ok(())
    }
}
