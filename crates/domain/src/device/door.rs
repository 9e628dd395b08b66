//! Lockable door (`PORTA`).

use super::Attributes;
use super::kind::DeviceKind;
use super::machine::{StateMachine, Transition, labelled_enum};

labelled_enum! {
    pub enum DoorState {
        Locked => "trancada",
        Unlocked => "destrancada",
        Open => "aberta",
    }
}

labelled_enum! {
    pub enum DoorCommand {
        Open => "abrir",
        Close => "fechar",
        Unlock => "destrancar",
        Lock => "trancar",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Door {
    state: DoorState,
}

impl Default for Door {
    fn default() -> Self {
        Self {
            state: DoorState::Unlocked,
        }
    }
}

impl Door {
    fn is_not_open(&self) -> bool {
        self.state != DoorState::Open
    }
}

impl StateMachine for Door {
    type State = DoorState;
    type Command = DoorCommand;

    const KIND: DeviceKind = DeviceKind::Door;
    const STATES: &'static [DoorState] = DoorState::ALL;
    const COMMANDS: &'static [DoorCommand] = DoorCommand::ALL;
    const TRANSITIONS: &'static [Transition<Self>] = &[
        Transition {
            command: DoorCommand::Open,
            sources: &[DoorState::Unlocked],
            dest: DoorState::Open,
            guard: None,
            effect: None,
        },
        Transition {
            command: DoorCommand::Close,
            sources: &[DoorState::Open],
            dest: DoorState::Unlocked,
            guard: None,
            effect: None,
        },
        Transition {
            command: DoorCommand::Unlock,
            sources: &[DoorState::Locked],
            dest: DoorState::Unlocked,
            guard: None,
            effect: None,
        },
        // an open door must be closed before it can be locked
        Transition {
            command: DoorCommand::Lock,
            sources: &[DoorState::Unlocked, DoorState::Open],
            dest: DoorState::Locked,
            guard: Some(Door::is_not_open),
            effect: None,
        },
    ];

    fn state(&self) -> DoorState {
        self.state
    }

    fn set_state(&mut self, state: DoorState) {
        self.state = state;
    }
}

impl Attributes for Door {}
