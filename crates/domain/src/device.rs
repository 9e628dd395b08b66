//! A named instance of one of the device types.
//!
//! A [`Device`] pairs identity (`id`, `name`) with a [`DeviceModel`], the
//! closed set of per-type state machines. Every mutation goes through
//! [`Device::execute_at`] or [`Device::set_attribute`]; both validate before
//! touching anything.

mod attribute_value;
mod blind;
mod coffee_maker;
mod door;
mod kind;
mod light;
pub mod machine;
mod plug;
mod record;
mod sensor;

pub use attribute_value::{AttributeValue, Details};
pub use blind::{Blind, BlindCommand, BlindState};
pub use coffee_maker::{CoffeeMaker, CoffeeMakerCommand, CoffeeMakerState};
pub use door::{Door, DoorCommand, DoorState};
pub use kind::DeviceKind;
pub use light::{Color, Light, LightCommand, LightState};
pub use plug::{PlugCommand, PlugState, SmartPlug};
pub use record::DeviceRecord;
pub use sensor::{Sensor, SensorCommand, SensorState};

use machine::StateMachine;

use crate::error::{CommandError, SmartHubError, ValidationError};
use crate::event::{CONSUMPTION_EVENT, Event};
use crate::id::DeviceId;
use crate::time::{Timestamp, now, round2};

/// Name given to devices whose record has none.
pub const DEFAULT_NAME: &str = "Sem Nome";

/// Settable attributes and extra snapshot fields of a device type.
pub trait Attributes {
    /// Names accepted by [`set_attribute`](Self::set_attribute).
    const ATTRIBUTES: &'static [&'static str] = &[];

    /// Append the type's own fields to a snapshot.
    fn write_details(&self, _details: &mut Details, _now: Timestamp) {}

    /// Validate and set one attribute.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidAttributeValue`] for unknown names or bad values.
    fn set_attribute(&mut self, name: &str, value: &AttributeValue) -> Result<(), ValidationError> {
        Err(ValidationError::invalid_attribute(name, value))
    }
}

/// The per-type state machine behind a device.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceModel {
    Light(Light),
    Door(Door),
    Plug(SmartPlug),
    CoffeeMaker(CoffeeMaker),
    Blind(Blind),
    Sensor(Sensor),
}

macro_rules! dispatch {
    ($model:expr, $inner:ident => $body:expr) => {
        match $model {
            DeviceModel::Light($inner) => $body,
            DeviceModel::Door($inner) => $body,
            DeviceModel::Plug($inner) => $body,
            DeviceModel::CoffeeMaker($inner) => $body,
            DeviceModel::Blind($inner) => $body,
            DeviceModel::Sensor($inner) => $body,
        }
    };
}

fn checked<M: StateMachine + Default>() -> Result<M, ValidationError> {
    machine::check_table::<M>()?;
    Ok(M::default())
}

fn state_label<M: StateMachine>(model: &M) -> String {
    model.state().to_string()
}

fn has_attribute<M: Attributes>(_model: &M, name: &str) -> bool {
    M::ATTRIBUTES.contains(&name)
}

impl DeviceModel {
    /// A fresh machine of `kind` in its initial state with default attributes.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::AmbiguousTransition`] if the type's table is ambiguous.
    pub fn new(kind: DeviceKind) -> Result<Self, ValidationError> {
        Ok(match kind {
            DeviceKind::Light => Self::Light(checked()?),
            DeviceKind::Door => Self::Door(checked()?),
            DeviceKind::Plug => Self::Plug(checked()?),
            DeviceKind::CoffeeMaker => Self::CoffeeMaker(checked()?),
            DeviceKind::Blind => Self::Blind(checked()?),
            DeviceKind::Sensor => Self::Sensor(checked()?),
        })
    }

    #[must_use]
    pub fn kind(&self) -> DeviceKind {
        match self {
            Self::Light(_) => DeviceKind::Light,
            Self::Door(_) => DeviceKind::Door,
            Self::Plug(_) => DeviceKind::Plug,
            Self::CoffeeMaker(_) => DeviceKind::CoffeeMaker,
            Self::Blind(_) => DeviceKind::Blind,
            Self::Sensor(_) => DeviceKind::Sensor,
        }
    }
}

/// A device owned by the hub.
#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    id: DeviceId,
    name: String,
    model: DeviceModel,
}

impl Device {
    /// A device of `kind` in its initial state.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyName`] for a blank name, or
    /// [`ValidationError::AmbiguousTransition`] if the type's table is ambiguous.
    pub fn new(
        id: DeviceId,
        name: impl Into<String>,
        kind: DeviceKind,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(Self {
            id,
            name,
            model: DeviceModel::new(kind)?,
        })
    }

    /// Create a builder for constructing a [`Device`].
    #[must_use]
    pub fn builder() -> DeviceBuilder {
        DeviceBuilder::default()
    }

    #[must_use]
    pub fn id(&self) -> &DeviceId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> DeviceKind {
        self.model.kind()
    }

    #[must_use]
    pub fn model(&self) -> &DeviceModel {
        &self.model
    }

    /// Label of the current state, e.g. `"ligada"`.
    #[must_use]
    pub fn state(&self) -> String {
        dispatch!(&self.model, m => state_label(m))
    }

    /// Whether `command` is a command of this device's type.
    #[must_use]
    pub fn supports(&self, command: &str) -> bool {
        dispatch!(&self.model, m => supports_command(m, command))
    }

    /// Run `command` now. See [`execute_at`](Self::execute_at).
    ///
    /// # Errors
    ///
    /// See [`execute_at`](Self::execute_at).
    pub fn execute(&mut self, command: &str) -> Result<Event, CommandError> {
        self.execute_at(command, now())
    }

    /// Run `command` as if the current instant were `now`.
    ///
    /// On success returns the event to publish: its type is the command, its
    /// payload the device snapshot after the transition merged with whatever
    /// the transition's effect reported.
    ///
    /// # Errors
    ///
    /// Returns the [`CommandError`] of the first failed check; the device is
    /// left untouched in that case.
    pub fn execute_at(&mut self, command: &str, now: Timestamp) -> Result<Event, CommandError> {
        let extra = dispatch!(&mut self.model, m => machine::fire(m, command, now))?;
        let mut payload = self.details_at(now);
        payload.extend(extra);
        Ok(Event::new(command, self.id.clone(), payload, now))
    }

    /// Snapshot at the current instant.
    #[must_use]
    pub fn details(&self) -> Details {
        self.details_at(now())
    }

    /// Flat snapshot: `id`, `nome`, `tipo`, `estado`, then type-specific fields.
    #[must_use]
    pub fn details_at(&self, now: Timestamp) -> Details {
        let mut details = Details::new();
        details.insert("id".to_string(), self.id.as_str().into());
        details.insert("nome".to_string(), self.name.as_str().into());
        details.insert("tipo".to_string(), self.kind().as_str().into());
        details.insert("estado".to_string(), self.state().into());
        dispatch!(&self.model, m => m.write_details(&mut details, now));
        details
    }

    /// Validate and set a type attribute. Never publishes an event.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidAttributeValue`] for unknown names or bad values.
    pub fn set_attribute(
        &mut self,
        name: &str,
        value: &AttributeValue,
    ) -> Result<(), ValidationError> {
        dispatch!(&mut self.model, m => m.set_attribute(name, value))
    }

    /// Accumulated energy of a plug, in Wh rounded to two decimals.
    ///
    /// # Errors
    ///
    /// Returns [`SmartHubError::UnsupportedOperation`] for anything but a plug.
    pub fn consumption_at(&self, now: Timestamp) -> Result<f64, SmartHubError> {
        match &self.model {
            DeviceModel::Plug(plug) => Ok(plug.consumption_at(now)),
            _ => Err(self.unsupported("consumption")),
        }
    }

    /// Add `minutes` of consumption to a plug that is on.
    ///
    /// A plug that is off gains nothing and publishes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`SmartHubError::UnsupportedOperation`] for anything but a plug.
    pub fn simulate_consumption_at(
        &mut self,
        minutes: u32,
        now: Timestamp,
    ) -> Result<Simulation, SmartHubError> {
        let DeviceModel::Plug(socket) = &mut self.model else {
            return Err(self.unsupported("simulate_consumption"));
        };
        let added_wh = socket.simulate(minutes);
        if socket.state() != PlugState::On {
            return Ok(Simulation {
                added_wh,
                event: None,
            });
        }

        let mut payload = self.details_at(now);
        payload.insert(plug::ADDED_CONSUMPTION.to_string(), round2(added_wh).into());
        payload.insert("minutos".to_string(), i64::from(minutes).into());
        Ok(Simulation {
            added_wh,
            event: Some(Event::new(CONSUMPTION_EVENT, self.id.clone(), payload, now)),
        })
    }

    /// Build a device from a stored record.
    ///
    /// Missing names default to [`DEFAULT_NAME`]. Attributes the type does
    /// not know are ignored; known ones are validated. A plug's stored
    /// `consumo_wh` seeds its accumulated energy. The initial state is applied
    /// directly, without firing a transition.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] for a blank id, unknown type, unknown
    /// state or invalid attribute value.
    pub fn from_record(record: &DeviceRecord, now: Timestamp) -> Result<Self, ValidationError> {
        let id = DeviceId::new(record.id.as_str())?;
        let kind: DeviceKind = record.kind.parse()?;
        let name = record
            .name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(DEFAULT_NAME);
        let mut device = Self::new(id, name, kind)?;

        for (attribute, value) in &record.attributes {
            match &mut device.model {
                DeviceModel::Plug(socket) if attribute == plug::CONSUMPTION => {
                    socket.restore_energy(value)?;
                }
                model => {
                    if dispatch!(&*model, m => has_attribute(m, attribute)) {
                        dispatch!(model, m => m.set_attribute(attribute, value))?;
                    }
                }
            }
        }

        if let Some(state) = &record.state {
            dispatch!(&mut device.model, m => machine::restore(m, state, now))?;
        }
        Ok(device)
    }

    /// The record form of this device at `now`.
    #[must_use]
    pub fn to_record(&self, now: Timestamp) -> DeviceRecord {
        let mut attributes = self.details_at(now);
        for key in ["id", "nome", "tipo", "estado", sensor::LAST_ACTIVATED] {
            attributes.shift_remove(key);
        }
        DeviceRecord {
            id: self.id.to_string(),
            kind: self.kind().to_string(),
            name: Some(self.name.clone()),
            state: Some(self.state()),
            attributes,
        }
    }

    fn unsupported(&self, operation: &'static str) -> SmartHubError {
        SmartHubError::UnsupportedOperation {
            kind: self.kind(),
            operation,
        }
    }
}

fn supports_command<M: StateMachine>(_model: &M, command: &str) -> bool {
    machine::supports::<M>(command)
}

/// Outcome of [`Device::simulate_consumption_at`].
#[derive(Debug, Clone, PartialEq)]
pub struct Simulation {
    pub added_wh: f64,
    /// The `consumo` event to publish, absent when the plug was off.
    pub event: Option<Event>,
}

/// Step-by-step builder for [`Device`].
#[derive(Debug, Default)]
pub struct DeviceBuilder {
    id: Option<DeviceId>,
    name: Option<String>,
    kind: Option<DeviceKind>,
    attributes: Details,
}

impl DeviceBuilder {
    #[must_use]
    pub fn id(mut self, id: DeviceId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: DeviceKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Consume the builder, validate, and return a [`Device`].
    ///
    /// # Errors
    ///
    /// Returns [`SmartHubError::Validation`] when the id or type is missing,
    /// the name is blank, or an attribute is rejected.
    pub fn build(self) -> Result<Device, SmartHubError> {
        let id = self.id.ok_or(ValidationError::EmptyId)?;
        let kind = self
            .kind
            .ok_or_else(|| ValidationError::UnknownDeviceType(String::new()))?;
        let name = self.name.unwrap_or_else(|| DEFAULT_NAME.to_string());
        let mut device = Device::new(id, name, kind)?;
        for (name, value) in &self.attributes {
            device.set_attribute(name, value)?;
        }
        Ok(device)
    }
}
