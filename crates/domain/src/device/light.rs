//! Dimmable colour light (`LUZ`).

use std::str::FromStr;

use super::Attributes;
use super::attribute_value::{AttributeValue, Details};
use super::kind::DeviceKind;
use super::machine::{StateMachine, Transition, labelled_enum};
use crate::error::ValidationError;
use crate::time::Timestamp;

pub const BRIGHTNESS: &str = "brilho";
pub const COLOR: &str = "cor";

labelled_enum! {
    pub enum LightState {
        On => "ligada",
        Off => "desligada",
    }
}

labelled_enum! {
    pub enum LightCommand {
        TurnOn => "ligar",
        TurnOff => "desligar",
    }
}

labelled_enum! {
    /// The fixed palette a light can display.
    pub enum Color {
        White => "WHITE",
        Red => "RED",
        Green => "GREEN",
        Blue => "BLUE",
    }
}

impl Color {
    #[must_use]
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            Self::White => (255, 255, 255),
            Self::Red => (255, 0, 0),
            Self::Green => (0, 255, 0),
            Self::Blue => (0, 0, 255),
        }
    }
}

impl FromStr for Color {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|color| color.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::invalid_attribute(COLOR, s))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    state: LightState,
    brightness: u8,
    color: Color,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            state: LightState::Off,
            brightness: 100,
            color: Color::White,
        }
    }
}

impl Light {
    #[must_use]
    pub fn brightness(&self) -> u8 {
        self.brightness
    }

    #[must_use]
    pub fn color(&self) -> Color {
        self.color
    }

    /// Set the brightness percentage.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidAttributeValue`] unless `value` is an integer in `0..=100`.
    pub fn set_brightness(&mut self, value: &AttributeValue) -> Result<(), ValidationError> {
        let brightness = match value {
            AttributeValue::Int(raw) => u8::try_from(*raw).ok().filter(|b| *b <= 100),
            _ => None,
        }
        .ok_or_else(|| ValidationError::invalid_attribute(BRIGHTNESS, value))?;
        self.brightness = brightness;
        Ok(())
    }

    /// Set the colour by name, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidAttributeValue`] for anything outside the palette.
    pub fn set_color(&mut self, value: &AttributeValue) -> Result<(), ValidationError> {
        let color = value
            .as_str()
            .ok_or_else(|| ValidationError::invalid_attribute(COLOR, value))?
            .parse()?;
        self.color = color;
        Ok(())
    }
}

impl StateMachine for Light {
    type State = LightState;
    type Command = LightCommand;

    const KIND: DeviceKind = DeviceKind::Light;
    const STATES: &'static [LightState] = LightState::ALL;
    const COMMANDS: &'static [LightCommand] = LightCommand::ALL;
    const TRANSITIONS: &'static [Transition<Self>] = &[
        Transition {
            command: LightCommand::TurnOn,
            sources: &[LightState::Off],
            dest: LightState::On,
            guard: None,
            effect: None,
        },
        Transition {
            command: LightCommand::TurnOff,
            sources: &[LightState::On],
            dest: LightState::Off,
            guard: None,
            effect: None,
        },
    ];

    fn state(&self) -> LightState {
        self.state
    }

    fn set_state(&mut self, state: LightState) {
        self.state = state;
    }
}

impl Attributes for Light {
    const ATTRIBUTES: &'static [&'static str] = &[BRIGHTNESS, COLOR];

    fn write_details(&self, details: &mut Details, _now: Timestamp) {
        details.insert(BRIGHTNESS.to_string(), self.brightness.into());
        details.insert(COLOR.to_string(), self.color.as_str().into());
    }

    fn set_attribute(&mut self, name: &str, value: &AttributeValue) -> Result<(), ValidationError> {
        match name {
            BRIGHTNESS => self.set_brightness(value),
            COLOR => self.set_color(value),
            _ => Err(ValidationError::invalid_attribute(name, value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::machine::{check_table, fire};
    use crate::error::CommandError;
    use crate::time::now;

    #[test]
    fn should_start_off_white_and_full_brightness() {
        let light = Light::default();
        assert_eq!(light.state(), LightState::Off);
        assert_eq!(light.brightness(), 100);
        assert_eq!(light.color(), Color::White);
    }

    #[test]
    fn should_have_unambiguous_table() {
        assert!(check_table::<Light>().is_ok());
    }

    #[test]
    fn should_turn_on_when_off() {
        let mut light = Light::default();
        fire(&mut light, "ligar", now()).unwrap();
        assert_eq!(light.state(), LightState::On);
    }

    #[test]
    fn should_reject_turn_off_when_already_off() {
        let mut light = Light::default();
        let err = fire(&mut light, "desligar", now()).unwrap_err();
        assert!(matches!(err, CommandError::InvalidTransition { .. }));
        assert_eq!(light.state(), LightState::Off);
    }

    #[test]
    fn should_reject_brightness_above_hundred_and_keep_value() {
        let mut light = Light::default();
        light.set_brightness(&AttributeValue::Int(40)).unwrap();
        let err = light.set_brightness(&AttributeValue::Int(150)).unwrap_err();
        assert_eq!(err, ValidationError::invalid_attribute("brilho", 150));
        assert_eq!(light.brightness(), 40);
    }

    #[test]
    fn should_reject_negative_or_non_integer_brightness() {
        let mut light = Light::default();
        assert!(light.set_brightness(&AttributeValue::Int(-1)).is_err());
        assert!(light.set_brightness(&AttributeValue::Float(50.5)).is_err());
        assert!(light.set_brightness(&"50".into()).is_err());
        assert_eq!(light.brightness(), 100);
    }

    #[test]
    fn should_accept_brightness_bounds() {
        let mut light = Light::default();
        light.set_brightness(&AttributeValue::Int(0)).unwrap();
        assert_eq!(light.brightness(), 0);
        light.set_brightness(&AttributeValue::Int(100)).unwrap();
        assert_eq!(light.brightness(), 100);
    }

    #[test]
    fn should_parse_color_ignoring_case() {
        let mut light = Light::default();
        light.set_color(&"blue".into()).unwrap();
        assert_eq!(light.color(), Color::Blue);
        assert_eq!(light.color().rgb(), (0, 0, 255));
    }

    #[test]
    fn should_reject_unknown_color_without_defaulting() {
        let mut light = Light::default();
        light.set_color(&"RED".into()).unwrap();
        let err = light.set_color(&"PURPLE".into()).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidAttributeValue { .. }));
        assert_eq!(light.color(), Color::Red);
    }

    #[test]
    fn should_write_brightness_and_color_into_details() {
        let light = Light::default();
        let mut details = Details::new();
        light.write_details(&mut details, now());
        assert_eq!(details.get("brilho"), Some(&AttributeValue::Int(100)));
        assert_eq!(details.get("cor"), Some(&AttributeValue::from("WHITE")));
    }

    #[test]
    fn should_reject_unknown_attribute_name() {
        let mut light = Light::default();
        let err = light
            .set_attribute("temperatura", &AttributeValue::Int(3))
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidAttributeValue { .. }));
    }
}
