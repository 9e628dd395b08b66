//! Smart plug (`TOMADA`) with energy accounting.
//!
//! Energy accrues as `power_w × hours switched on`. The accumulated figure is
//! only folded into `energy_wh` when the plug turns off (or when consumption is
//! simulated); while the plug is on, [`SmartPlug::consumption_at`] adds the
//! running period on top without mutating anything.

use super::Attributes;
use super::attribute_value::{AttributeValue, Details};
use super::kind::DeviceKind;
use super::machine::{StateMachine, Transition, labelled_enum};
use crate::error::ValidationError;
use crate::time::{Timestamp, elapsed_hours, round2};

pub const POWER: &str = "potencia_W";
pub const CONSUMPTION: &str = "consumo_wh";
pub const ADDED_CONSUMPTION: &str = "consumo_adicionado_wh";

labelled_enum! {
    pub enum PlugState {
        On => "ligada",
        Off => "desligada",
    }
}

labelled_enum! {
    pub enum PlugCommand {
        TurnOn => "ligar",
        TurnOff => "desligar",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SmartPlug {
    state: PlugState,
    power_w: f64,
    energy_wh: f64,
    activated_at: Option<Timestamp>,
}

impl Default for SmartPlug {
    fn default() -> Self {
        Self {
            state: PlugState::Off,
            power_w: 100.0,
            energy_wh: 0.0,
            activated_at: None,
        }
    }
}

impl SmartPlug {
    #[must_use]
    pub fn power_w(&self) -> f64 {
        self.power_w
    }

    /// Instant the current on-period started, if the plug is on.
    #[must_use]
    pub fn activated_at(&self) -> Option<Timestamp> {
        self.activated_at
    }

    /// Set the rated power in watts.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidAttributeValue`] unless `value` is a finite number `>= 0`.
    pub fn set_power(&mut self, value: &AttributeValue) -> Result<(), ValidationError> {
        self.power_w = non_negative(POWER, value)?;
        Ok(())
    }

    /// Seed the accumulated energy, e.g. from a stored record.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidAttributeValue`] unless `value` is a finite number `>= 0`.
    pub fn restore_energy(&mut self, value: &AttributeValue) -> Result<(), ValidationError> {
        self.energy_wh = non_negative(CONSUMPTION, value)?;
        Ok(())
    }

    /// Total energy in Wh up to `now`, including the running on-period.
    #[must_use]
    pub fn consumption_at(&self, now: Timestamp) -> f64 {
        let running = match (self.state, self.activated_at) {
            (PlugState::On, Some(since)) => self.power_w * elapsed_hours(since, now),
            _ => 0.0,
        };
        round2(self.energy_wh + running)
    }

    /// Add `minutes` worth of consumption at the rated power.
    ///
    /// Returns the energy added, which is zero when the plug is off.
    pub fn simulate(&mut self, minutes: u32) -> f64 {
        if self.state != PlugState::On {
            return 0.0;
        }
        let added = self.power_w * f64::from(minutes) / 60.0;
        self.energy_wh += added;
        added
    }

    fn on_turn_on(&mut self, now: Timestamp) -> Details {
        self.activated_at = Some(now);
        Details::new()
    }

    fn on_turn_off(&mut self, now: Timestamp) -> Details {
        let added = self
            .activated_at
            .take()
            .map_or(0.0, |since| self.power_w * elapsed_hours(since, now));
        self.energy_wh += added;

        let mut extra = Details::new();
        extra.insert(ADDED_CONSUMPTION.to_string(), round2(added).into());
        extra
    }
}

fn non_negative(attribute: &str, value: &AttributeValue) -> Result<f64, ValidationError> {
    value
        .as_f64()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .ok_or_else(|| ValidationError::invalid_attribute(attribute, value))
}

impl StateMachine for SmartPlug {
    type State = PlugState;
    type Command = PlugCommand;

    const KIND: DeviceKind = DeviceKind::Plug;
    const STATES: &'static [PlugState] = PlugState::ALL;
    const COMMANDS: &'static [PlugCommand] = PlugCommand::ALL;
    const TRANSITIONS: &'static [Transition<Self>] = &[
        Transition {
            command: PlugCommand::TurnOn,
            sources: &[PlugState::Off],
            dest: PlugState::On,
            guard: None,
            effect: Some(SmartPlug::on_turn_on),
        },
        Transition {
            command: PlugCommand::TurnOff,
            sources: &[PlugState::On],
            dest: PlugState::Off,
            guard: None,
            effect: Some(SmartPlug::on_turn_off),
        },
    ];

    fn state(&self) -> PlugState {
        self.state
    }

    fn set_state(&mut self, state: PlugState) {
        self.state = state;
    }

    /// A plug restored as on starts accruing from `now`.
    fn restore(&mut self, state: PlugState, now: Timestamp) {
        self.state = state;
        self.activated_at = (state == PlugState::On).then_some(now);
    }
}

impl Attributes for SmartPlug {
    const ATTRIBUTES: &'static [&'static str] = &[POWER];

    fn write_details(&self, details: &mut Details, now: Timestamp) {
        details.insert(POWER.to_string(), self.power_w.into());
        details.insert(CONSUMPTION.to_string(), self.consumption_at(now).into());
    }

    fn set_attribute(&mut self, name: &str, value: &AttributeValue) -> Result<(), ValidationError> {
        match name {
            POWER => self.set_power(value),
            _ => Err(ValidationError::invalid_attribute(name, value)),
        }
    }
}
