//! Generic transition-table machinery shared by every device type.
//!
//! Each device type declares its states, commands and a static table of
//! [`Transition`]s. [`fire`] resolves a raw command string against that
//! table, checks the guard, moves the state and runs the effect hook.
//! Nothing is mutated unless every check passes.

use super::attribute_value::Details;
use super::kind::DeviceKind;
use crate::error::{CommandError, ValidationError};
use crate::time::Timestamp;

/// Declares a fieldless enum whose variants carry a fixed wire label.
macro_rules! labelled_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The wire label of this variant.
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub(crate) use labelled_enum;

/// Guard evaluated against the device before the state moves.
pub type Guard<M> = fn(&M) -> bool;

/// Effect run after the state moved; returns extra event payload fields.
pub type Effect<M> = fn(&mut M, Timestamp) -> Details;

/// One row of a device type's transition table.
pub struct Transition<M: StateMachine> {
    pub command: M::Command,
    pub sources: &'static [M::State],
    pub dest: M::State,
    pub guard: Option<Guard<M>>,
    pub effect: Option<Effect<M>>,
}

/// A device type modelled as a finite-state machine.
pub trait StateMachine: Sized + 'static {
    type State: Copy + Eq + std::fmt::Display + std::fmt::Debug + 'static;
    type Command: Copy + Eq + std::fmt::Display + std::fmt::Debug + 'static;

    const KIND: DeviceKind;
    const STATES: &'static [Self::State];
    const COMMANDS: &'static [Self::Command];
    const TRANSITIONS: &'static [Transition<Self>];

    fn state(&self) -> Self::State;

    fn set_state(&mut self, state: Self::State);

    /// Put the machine in `state` without running a transition, e.g. when
    /// loading a stored device. Types with derived attributes override this.
    fn restore(&mut self, state: Self::State, _now: Timestamp) {
        self.set_state(state);
    }

    /// Map a raw command string onto this type's command enum.
    fn parse_command(raw: &str) -> Option<Self::Command> {
        Self::COMMANDS
            .iter()
            .copied()
            .find(|command| command.to_string() == raw)
    }

    /// Map a raw state label onto this type's state enum.
    fn parse_state(raw: &str) -> Option<Self::State> {
        Self::STATES
            .iter()
            .copied()
            .find(|state| state.to_string() == raw)
    }
}

/// Apply `raw` to `machine`.
///
/// # Errors
///
/// - [`CommandError::UnknownCommand`] when the type has no such command
/// - [`CommandError::InvalidTransition`] when no entry accepts the current state
/// - [`CommandError::GuardRejected`] when the matching entry's guard fails
pub fn fire<M: StateMachine>(
    machine: &mut M,
    raw: &str,
    now: Timestamp,
) -> Result<Details, CommandError> {
    let unknown = || CommandError::UnknownCommand {
        kind: M::KIND,
        command: raw.to_string(),
    };
    let command = M::parse_command(raw).ok_or_else(unknown)?;
    let mut candidates = M::TRANSITIONS
        .iter()
        .filter(|t| t.command == command)
        .peekable();
    if candidates.peek().is_none() {
        return Err(unknown());
    }

    let current = machine.state();
    let transition = candidates
        .find(|t| t.sources.contains(&current))
        .ok_or_else(|| CommandError::InvalidTransition {
            command: raw.to_string(),
            state: current.to_string(),
        })?;

    if let Some(guard) = transition.guard {
        if !guard(machine) {
            return Err(CommandError::GuardRejected {
                command: raw.to_string(),
                state: current.to_string(),
            });
        }
    }

    machine.set_state(transition.dest);
    Ok(transition
        .effect
        .map_or_else(Details::new, |effect| effect(machine, now)))
}

/// Whether `raw` names a command of this type.
#[must_use]
pub fn supports<M: StateMachine>(raw: &str) -> bool {
    M::parse_command(raw).is_some()
}

/// Reject tables where a `(command, state)` pair has more than one entry.
///
/// # Errors
///
/// Returns [`ValidationError::AmbiguousTransition`] naming the first clash.
pub fn check_table<M: StateMachine>() -> Result<(), ValidationError> {
    for (index, first) in M::TRANSITIONS.iter().enumerate() {
        for second in &M::TRANSITIONS[index + 1..] {
            if first.command != second.command {
                continue;
            }
            if let Some(state) = first.sources.iter().find(|s| second.sources.contains(s)) {
                return Err(ValidationError::AmbiguousTransition {
                    kind: M::KIND,
                    command: first.command.to_string(),
                    state: state.to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Restore `machine` to the state labelled `raw`.
///
/// # Errors
///
/// Returns [`ValidationError::UnknownState`] when the label is not a state of this type.
pub fn restore<M: StateMachine>(
    machine: &mut M,
    raw: &str,
    now: Timestamp,
) -> Result<(), ValidationError> {
    let state = M::parse_state(raw).ok_or_else(|| ValidationError::UnknownState {
        kind: M::KIND,
        state: raw.to_string(),
    })?;
    machine.restore(state, now);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::now;

    labelled_enum! {
        enum ToyState {
            Idle => "idle",
            Busy => "busy",
        }
    }

    labelled_enum! {
        enum ToyCommand {
            Start => "start",
            Stop => "stop",
            Poke => "poke",
        }
    }

    struct Toy {
        state: ToyState,
        allow_start: bool,
        effects: u32,
    }

    impl Toy {
        fn allowed(&self) -> bool {
            self.allow_start
        }

        fn count(&mut self, _now: Timestamp) -> Details {
            self.effects += 1;
            Details::new()
        }
    }

    impl StateMachine for Toy {
        type State = ToyState;
        type Command = ToyCommand;

        const KIND: DeviceKind = DeviceKind::Sensor;
        const STATES: &'static [ToyState] = ToyState::ALL;
        const COMMANDS: &'static [ToyCommand] = ToyCommand::ALL;
        const TRANSITIONS: &'static [Transition<Self>] = &[
            Transition {
                command: ToyCommand::Start,
                sources: &[ToyState::Idle],
                dest: ToyState::Busy,
                guard: Some(Toy::allowed),
                effect: Some(Toy::count),
            },
            Transition {
                command: ToyCommand::Stop,
                sources: &[ToyState::Busy],
                dest: ToyState::Idle,
                guard: None,
                effect: None,
            },
        ];

        fn state(&self) -> ToyState {
            self.state
        }

        fn set_state(&mut self, state: ToyState) {
            self.state = state;
        }
    }

    struct Clashing(ToyState);

    impl StateMachine for Clashing {
        type State = ToyState;
        type Command = ToyCommand;

        const KIND: DeviceKind = DeviceKind::Blind;
        const STATES: &'static [ToyState] = ToyState::ALL;
        const COMMANDS: &'static [ToyCommand] = ToyCommand::ALL;
        const TRANSITIONS: &'static [Transition<Self>] = &[
            Transition {
                command: ToyCommand::Start,
                sources: &[ToyState::Idle],
                dest: ToyState::Busy,
                guard: None,
                effect: None,
            },
            Transition {
                command: ToyCommand::Start,
                sources: &[ToyState::Busy, ToyState::Idle],
                dest: ToyState::Idle,
                guard: None,
                effect: None,
            },
        ];

        fn state(&self) -> ToyState {
            self.0
        }

        fn set_state(&mut self, state: ToyState) {
            self.0 = state;
        }
    }

    fn toy(allow_start: bool) -> Toy {
        Toy {
            state: ToyState::Idle,
            allow_start,
            effects: 0,
        }
    }

    #[test]
    fn should_move_state_and_run_effect_when_transition_applies() {
        let mut machine = toy(true);
        fire(&mut machine, "start", now()).unwrap();
        assert_eq!(machine.state, ToyState::Busy);
        assert_eq!(machine.effects, 1);
    }

    #[test]
    fn should_report_unknown_command_when_string_is_not_a_command() {
        let mut machine = toy(true);
        let err = fire(&mut machine, "explode", now()).unwrap_err();
        assert!(matches!(err, CommandError::UnknownCommand { .. }));
    }

    #[test]
    fn should_report_unknown_command_when_command_has_no_table_entry() {
        let mut machine = toy(true);
        let err = fire(&mut machine, "poke", now()).unwrap_err();
        assert!(matches!(err, CommandError::UnknownCommand { .. }));
    }

    #[test]
    fn should_report_invalid_transition_when_state_is_not_a_source() {
        let mut machine = toy(true);
        let err = fire(&mut machine, "stop", now()).unwrap_err();
        assert_eq!(
            err,
            CommandError::InvalidTransition {
                command: "stop".to_string(),
                state: "idle".to_string(),
            }
        );
    }

    #[test]
    fn should_leave_machine_untouched_when_guard_rejects() {
        let mut machine = toy(false);
        let err = fire(&mut machine, "start", now()).unwrap_err();
        assert!(matches!(err, CommandError::GuardRejected { .. }));
        assert_eq!(machine.state, ToyState::Idle);
        assert_eq!(machine.effects, 0);
    }

    #[test]
    fn should_accept_unambiguous_table() {
        assert!(check_table::<Toy>().is_ok());
    }

    #[test]
    fn should_reject_table_with_overlapping_sources() {
        let err = check_table::<Clashing>().unwrap_err();
        assert_eq!(
            err,
            ValidationError::AmbiguousTransition {
                kind: DeviceKind::Blind,
                command: "start".to_string(),
                state: "idle".to_string(),
            }
        );
    }

    #[test]
    fn should_restore_state_by_label() {
        let mut machine = toy(true);
        restore(&mut machine, "busy", now()).unwrap();
        assert_eq!(machine.state, ToyState::Busy);
    }

    #[test]
    fn should_reject_unknown_state_label() {
        let mut machine = toy(true);
        let err = restore(&mut machine, "asleep", now()).unwrap_err();
        assert!(matches!(err, ValidationError::UnknownState { .. }));
    }
}
