//! Coffee maker (`CAFETEIRA`).

use super::Attributes;
use super::kind::DeviceKind;
use super::machine::{StateMachine, Transition, labelled_enum};

labelled_enum! {
    pub enum CoffeeMakerState {
        Off => "desligada",
        On => "ligada",
        Brewing => "preparando",
    }
}

labelled_enum! {
    pub enum CoffeeMakerCommand {
        TurnOn => "ligar",
        Brew => "preparar",
        TurnOff => "desligar",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoffeeMaker {
    state: CoffeeMakerState,
}

impl Default for CoffeeMaker {
    fn default() -> Self {
        Self {
            state: CoffeeMakerState::Off,
        }
    }
}

impl StateMachine for CoffeeMaker {
    type State = CoffeeMakerState;
    type Command = CoffeeMakerCommand;

    const KIND: DeviceKind = DeviceKind::CoffeeMaker;
    const STATES: &'static [CoffeeMakerState] = CoffeeMakerState::ALL;
    const COMMANDS: &'static [CoffeeMakerCommand] = CoffeeMakerCommand::ALL;
    const TRANSITIONS: &'static [Transition<Self>] = &[
        Transition {
            command: CoffeeMakerCommand::TurnOn,
            sources: &[CoffeeMakerState::Off],
            dest: CoffeeMakerState::On,
            guard: None,
            effect: None,
        },
        Transition {
            command: CoffeeMakerCommand::Brew,
            sources: &[CoffeeMakerState::On],
            dest: CoffeeMakerState::Brewing,
            guard: None,
            effect: None,
        },
        Transition {
            command: CoffeeMakerCommand::TurnOff,
            sources: &[CoffeeMakerState::On, CoffeeMakerState::Brewing],
            dest: CoffeeMakerState::Off,
            guard: None,
            effect: None,
        },
    ];

    fn state(&self) -> CoffeeMakerState {
        self.state
    }

    fn set_state(&mut self, state: CoffeeMakerState) {
        self.state = state;
    }
}

impl Attributes for CoffeeMaker {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::machine::{check_table, fire};
    use crate::error::CommandError;
    use crate::time::now;

    #[test]
    fn should_have_unambiguous_table() {
        assert!(check_table::<CoffeeMaker>().is_ok());
    }

    #[test]
    fn should_brew_only_after_turning_on() {
        let mut maker = CoffeeMaker::default();
        let err = fire(&mut maker, "preparar", now()).unwrap_err();
        assert!(matches!(err, CommandError::InvalidTransition { .. }));

        fire(&mut maker, "ligar", now()).unwrap();
        fire(&mut maker, "preparar", now()).unwrap();
        assert_eq!(maker.state(), CoffeeMakerState::Brewing);
    }

    #[test]
    fn should_turn_off_while_brewing() {
        let mut maker = CoffeeMaker {
            state: CoffeeMakerState::Brewing,
        };
        fire(&mut maker, "desligar", now()).unwrap();
        assert_eq!(maker.state(), CoffeeMakerState::Off);
    }

    #[test]
    fn should_reject_commands_of_other_types() {
        let mut maker = CoffeeMaker::default();
        let err = fire(&mut maker, "abrir", now()).unwrap_err();
        assert!(matches!(err, CommandError::UnknownCommand { .. }));
    }
}
