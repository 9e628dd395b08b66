//! Window blind (`PERSIANA`).

use super::Attributes;
use super::kind::DeviceKind;
use super::machine::{StateMachine, Transition, labelled_enum};

labelled_enum! {
    pub enum BlindState {
        Closed => "fechada",
        Open => "aberta",
        HalfOpen => "entreaberta",
    }
}

labelled_enum! {
    pub enum BlindCommand {
        Open => "abrir",
        Close => "fechar",
        Stop => "parar",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Blind {
    state: BlindState,
}

impl Default for Blind {
    fn default() -> Self {
        Self {
            state: BlindState::Closed,
        }
    }
}

impl StateMachine for Blind {
    type State = BlindState;
    type Command = BlindCommand;

    const KIND: DeviceKind = DeviceKind::Blind;
    const STATES: &'static [BlindState] = BlindState::ALL;
    const COMMANDS: &'static [BlindCommand] = BlindCommand::ALL;
    const TRANSITIONS: &'static [Transition<Self>] = &[
        Transition {
            command: BlindCommand::Open,
            sources: &[BlindState::Closed],
            dest: BlindState::Open,
            guard: None,
            effect: None,
        },
        Transition {
            command: BlindCommand::Close,
            sources: &[BlindState::Open, BlindState::HalfOpen],
            dest: BlindState::Closed,
            guard: None,
            effect: None,
        },
        Transition {
            command: BlindCommand::Stop,
            sources: &[BlindState::Open],
            dest: BlindState::HalfOpen,
            guard: None,
            effect: None,
        },
    ];

    fn state(&self) -> BlindState {
        self.state
    }

    fn set_state(&mut self, state: BlindState) {
        self.state = state;
    }
}

impl Attributes for Blind {}
