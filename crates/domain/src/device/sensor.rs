//! Presence / motion sensor (`SENSOR`).

use super::Attributes;
use super::attribute_value::{AttributeValue, Details};
use super::kind::DeviceKind;
use super::machine::{StateMachine, Transition, labelled_enum};
use crate::time::Timestamp;

pub const LAST_ACTIVATED: &str = "ultimo_ativado";

labelled_enum! {
    pub enum SensorState {
        Inactive => "inativo",
        Active => "ativo",
    }
}

labelled_enum! {
    pub enum SensorCommand {
        Activate => "ativar",
        Deactivate => "desativar",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sensor {
    state: SensorState,
    last_activated: Option<Timestamp>,
}

impl Default for Sensor {
    fn default() -> Self {
        Self {
            state: SensorState::Inactive,
            last_activated: None,
        }
    }
}

impl Sensor {
    #[must_use]
    pub fn last_activated(&self) -> Option<Timestamp> {
        self.last_activated
    }

    fn on_activate(&mut self, now: Timestamp) -> Details {
        self.last_activated = Some(now);
        Details::new()
    }
}

impl StateMachine for Sensor {
    type State = SensorState;
    type Command = SensorCommand;

    const KIND: DeviceKind = DeviceKind::Sensor;
    const STATES: &'static [SensorState] = SensorState::ALL;
    const COMMANDS: &'static [SensorCommand] = SensorCommand::ALL;
    const TRANSITIONS: &'static [Transition<Self>] = &[
        Transition {
            command: SensorCommand::Activate,
            sources: &[SensorState::Inactive],
            dest: SensorState::Active,
            guard: None,
            effect: Some(Sensor::on_activate),
        },
        Transition {
            command: SensorCommand::Deactivate,
            sources: &[SensorState::Active],
            dest: SensorState::Inactive,
            guard: None,
            effect: None,
        },
    ];

    fn state(&self) -> SensorState {
        self.state
    }

    fn set_state(&mut self, state: SensorState) {
        self.state = state;
    }
}

impl Attributes for Sensor {
    fn write_details(&self, details: &mut Details, _now: Timestamp) {
        let value = self
            .last_activated
            .map_or(AttributeValue::Null, |at| at.to_rfc3339().into());
        details.insert(LAST_ACTIVATED.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::machine::{check_table, fire};
    use crate::time::now;

    #[test]
    fn should_have_unambiguous_table() {
        assert!(check_table::<Sensor>().is_ok());
    }

    #[test]
    fn should_record_activation_instant() {
        let mut sensor = Sensor::default();
        let at = now();
        fire(&mut sensor, "ativar", at).unwrap();
        assert_eq!(sensor.state(), SensorState::Active);
        assert_eq!(sensor.last_activated(), Some(at));
    }

    #[test]
    fn should_keep_last_activation_after_deactivating() {
        let mut sensor = Sensor::default();
        let at = now();
        fire(&mut sensor, "ativar", at).unwrap();
        fire(&mut sensor, "desativar", now()).unwrap();
        assert_eq!(sensor.last_activated(), Some(at));
    }

    #[test]
    fn should_report_null_when_never_activated() {
        let mut details = Details::new();
        Sensor::default().write_details(&mut details, now());
        assert_eq!(details.get(LAST_ACTIVATED), Some(&AttributeValue::Null));
    }
}
