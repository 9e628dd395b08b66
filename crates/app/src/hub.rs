//! The automation hub: device registry and single entry point for commands.
//!
//! The hub owns every [`Device`] together with that device's [`EventBus`].
//! A command resolves the device, runs its state machine, then notifies the
//! device's observers followed by the hub-wide observers. Observers receive
//! `&mut AutomationHub`, so a reactive rule can issue a further command while
//! the outer notification is still in progress; nested commands run to
//! completion depth-first.
//!
//! Nesting is bounded by `max_propagation_depth`. The first nested command
//! beyond the limit is refused, as is every other nested command of the same
//! chain, and the top-level call reports
//! [`SmartHubError::RoutinePropagationOverflow`]. Transitions that already
//! happened stay in place.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use smarthub_domain::device::{
    AttributeValue, Color, Details, Device, DeviceKind, DeviceRecord,
};
use smarthub_domain::error::{SmartHubError, ValidationError};
use smarthub_domain::event::Event;
use smarthub_domain::id::DeviceId;
use smarthub_domain::routine::{ReactiveRule, RoutineBook};
use smarthub_domain::time::Timestamp;

use crate::event_bus::{EventBus, Observer};
use crate::ports::{Clock, SystemClock};
use crate::routine_engine::RuleObserver;

/// Nested commands allowed beneath one top-level command unless configured otherwise.
pub const DEFAULT_MAX_PROPAGATION_DEPTH: usize = 16;

/// Observer attached to the hub or to one of its devices.
pub type HubObserver = Rc<dyn Observer<AutomationHub>>;

#[derive(Debug)]
struct Entry {
    device: Device,
    bus: EventBus<AutomationHub>,
}

pub struct AutomationHub {
    devices: IndexMap<DeviceId, Entry>,
    observers: EventBus<AutomationHub>,
    routines: RoutineBook,
    clock: Box<dyn Clock>,
    max_depth: usize,
    depth: usize,
    overflow: bool,
}

impl fmt::Debug for AutomationHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutomationHub")
            .field("devices", &self.devices)
            .field("observers", &self.observers)
            .field("routines", &self.routines)
            .field("max_depth", &self.max_depth)
            .finish_non_exhaustive()
    }
}

/// Result of [`AutomationHub::load_devices`].
#[derive(Debug, Default)]
pub struct LoadReport {
    pub loaded: Vec<DeviceId>,
    pub skipped: Vec<SkippedRecord>,
}

/// A device record the hub refused, with the reason.
#[derive(Debug)]
pub struct SkippedRecord {
    pub id: String,
    pub error: SmartHubError,
}

impl AutomationHub {
    /// Create a builder for constructing an [`AutomationHub`].
    #[must_use]
    pub fn builder() -> AutomationHubBuilder {
        AutomationHubBuilder::default()
    }

    /// Current instant according to the hub's clock.
    #[must_use]
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    #[must_use]
    pub fn max_propagation_depth(&self) -> usize {
        self.max_depth
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    #[must_use]
    pub fn lookup(&self, id: &str) -> Option<&Device> {
        self.devices.get(id).map(|entry| &entry.device)
    }

    /// Devices in insertion order.
    pub fn devices(&self) -> impl Iterator<Item = &Device> {
        self.devices.values().map(|entry| &entry.device)
    }

    /// Snapshot of every device, in insertion order.
    #[must_use]
    pub fn list(&self) -> Vec<Details> {
        let now = self.now();
        self.devices().map(|device| device.details_at(now)).collect()
    }

    #[must_use]
    pub fn routines(&self) -> &RoutineBook {
        &self.routines
    }

    pub(crate) fn routines_mut(&mut self) -> &mut RoutineBook {
        &mut self.routines
    }

    /// Reactive rules whose origin device is not registered.
    #[must_use]
    pub fn unbound_rules(&self) -> Vec<&ReactiveRule> {
        self.routines
            .rules()
            .iter()
            .filter(|rule| !self.devices.contains_key(&rule.origin))
            .collect()
    }

    /// Register `device`, binding every stored rule that originates from it.
    ///
    /// # Errors
    ///
    /// Returns [`SmartHubError::DuplicateDeviceId`] when the id is taken; the
    /// registry is left unchanged.
    #[tracing::instrument(skip(self, device), fields(device_id = %device.id()))]
    pub fn add(&mut self, device: Device) -> Result<(), SmartHubError> {
        if self.devices.contains_key(device.id()) {
            return Err(SmartHubError::DuplicateDeviceId(device.id().to_string()));
        }

        let mut bus = EventBus::new();
        for rule in self.routines.rules() {
            if &rule.origin == device.id() {
                bus.attach(Rc::new(RuleObserver::new(rule.clone())));
            }
        }
        tracing::info!(
            name = device.name(),
            kind = %device.kind(),
            rules = bus.len(),
            "device added"
        );
        self.devices
            .insert(device.id().clone(), Entry { device, bus });
        Ok(())
    }

    /// Unregister a device; its bus and bound rules are dropped with it.
    ///
    /// # Errors
    ///
    /// Returns [`SmartHubError::NotFound`] when no device has `id`.
    #[tracing::instrument(skip(self))]
    pub fn remove(&mut self, id: &str) -> Result<Device, SmartHubError> {
        let entry = self
            .devices
            .shift_remove(id)
            .ok_or_else(|| SmartHubError::device_not_found(id))?;
        tracing::info!(name = entry.device.name(), "device removed");
        Ok(entry.device)
    }

    /// Run `command` on device `id` and publish the resulting event.
    ///
    /// # Errors
    ///
    /// - [`SmartHubError::NotFound`] when no device has `id`
    /// - [`SmartHubError::Command`] when the device refuses the command
    /// - [`SmartHubError::RoutinePropagationOverflow`] when observers nested
    ///   commands beyond the limit; the command itself did run
    #[tracing::instrument(skip(self))]
    pub fn execute(&mut self, id: &str, command: &str) -> Result<Event, SmartHubError> {
        self.chain(|hub| hub.dispatch(id, command))
    }

    /// Validate and set one attribute of device `id`. Publishes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`SmartHubError::NotFound`] for an unknown device or
    /// [`SmartHubError::Validation`] for a rejected value.
    #[tracing::instrument(skip(self, value))]
    pub fn set_attribute(
        &mut self,
        id: &str,
        name: &str,
        value: impl Into<AttributeValue>,
    ) -> Result<(), SmartHubError> {
        let value = value.into();
        let entry = self.entry_mut(id)?;
        entry.device.set_attribute(name, &value)?;
        tracing::info!(%value, "attribute set");
        Ok(())
    }

    /// Accumulated energy of plug `id`, in Wh.
    ///
    /// # Errors
    ///
    /// Returns [`SmartHubError::NotFound`] for an unknown device or
    /// [`SmartHubError::UnsupportedOperation`] when it is not a plug.
    pub fn consumption(&self, id: &str) -> Result<f64, SmartHubError> {
        let now = self.now();
        self.lookup(id)
            .ok_or_else(|| SmartHubError::device_not_found(id))?
            .consumption_at(now)
    }

    /// Add `minutes` of consumption to plug `id` and publish a `consumo`
    /// event when the plug is on. Returns the energy added.
    ///
    /// # Errors
    ///
    /// Returns [`SmartHubError::NotFound`] for an unknown device,
    /// [`SmartHubError::UnsupportedOperation`] when it is not a plug, or
    /// [`SmartHubError::RoutinePropagationOverflow`] when observers of the
    /// event nested commands beyond the limit.
    #[tracing::instrument(skip(self))]
    pub fn simulate_consumption(&mut self, id: &str, minutes: u32) -> Result<f64, SmartHubError> {
        self.chain(|hub| {
            let now = hub.now();
            let entry = hub.entry_mut(id)?;
            let simulation = entry.device.simulate_consumption_at(minutes, now)?;
            if let Some(event) = simulation.event {
                let bus = entry.bus.clone();
                hub.publish(&bus, &event);
            }
            Ok(simulation.added_wh)
        })
    }

    /// Attach a hub-wide observer, notified after the device's own observers
    /// for every event. Returns `false` if it was already attached.
    pub fn attach_observer(&mut self, observer: HubObserver) -> bool {
        self.observers.attach(observer)
    }

    /// Returns `false` if `observer` was not attached.
    pub fn detach_observer(&mut self, observer: &HubObserver) -> bool {
        self.observers.detach(observer)
    }

    /// Attach `observer` to the bus of device `id`.
    ///
    /// # Errors
    ///
    /// Returns [`SmartHubError::NotFound`] when no device has `id`.
    pub fn attach_device_observer(
        &mut self,
        id: &str,
        observer: HubObserver,
    ) -> Result<bool, SmartHubError> {
        Ok(self.entry_mut(id)?.bus.attach(observer))
    }

    /// Detach `observer` from the bus of device `id`.
    ///
    /// # Errors
    ///
    /// Returns [`SmartHubError::NotFound`] when no device has `id`.
    pub fn detach_device_observer(
        &mut self,
        id: &str,
        observer: &HubObserver,
    ) -> Result<bool, SmartHubError> {
        Ok(self.entry_mut(id)?.bus.detach(observer))
    }

    /// Number of observers on the bus of device `id`.
    #[must_use]
    pub fn device_observer_count(&self, id: &str) -> Option<usize> {
        self.devices.get(id).map(|entry| entry.bus.len())
    }

    /// Build and register a device for every record.
    ///
    /// A record that fails (unknown type, invalid attribute, unknown state,
    /// duplicate id) is logged and skipped; the others still load. An
    /// unrecognised light colour falls back to `WHITE` with a warning.
    #[tracing::instrument(skip_all)]
    pub fn load_devices(&mut self, records: impl IntoIterator<Item = DeviceRecord>) -> LoadReport {
        let now = self.now();
        let mut report = LoadReport::default();
        for mut record in records {
            fallback_color(&mut record);
            let result = Device::from_record(&record, now)
                .map_err(SmartHubError::from)
                .and_then(|device| {
                    let id = device.id().clone();
                    self.add(device).map(|()| id)
                });
            match result {
                Ok(id) => report.loaded.push(id),
                Err(error) => {
                    tracing::warn!(id = %record.id, %error, "skipping device record");
                    report.skipped.push(SkippedRecord {
                        id: record.id,
                        error,
                    });
                }
            }
        }
        tracing::info!(
            loaded = report.loaded.len(),
            skipped = report.skipped.len(),
            "devices loaded"
        );
        report
    }

    /// Run `op` as one propagation chain.
    ///
    /// Top-level calls reset the overflow flag before and turn a raised flag
    /// into an error after; nested calls just run.
    pub(crate) fn chain<T>(
        &mut self,
        op: impl FnOnce(&mut Self) -> Result<T, SmartHubError>,
    ) -> Result<T, SmartHubError> {
        if self.depth > 0 {
            return op(self);
        }
        self.overflow = false;
        let result = op(self);
        if std::mem::take(&mut self.overflow) {
            return Err(SmartHubError::RoutinePropagationOverflow {
                limit: self.max_depth,
            });
        }
        result
    }

    fn dispatch(&mut self, id: &str, command: &str) -> Result<Event, SmartHubError> {
        if self.depth > 0 && (self.overflow || self.depth > self.max_depth) {
            if !self.overflow {
                tracing::warn!(
                    device = id,
                    command,
                    limit = self.max_depth,
                    "propagation limit reached, refusing nested command"
                );
            }
            self.overflow = true;
            return Err(SmartHubError::RoutinePropagationOverflow {
                limit: self.max_depth,
            });
        }

        let now = self.clock.now();
        let entry = self.entry_mut(id)?;
        let event = entry.device.execute_at(command, now)?;
        tracing::info!(
            device = id,
            command,
            state = %entry.device.state(),
            "command executed"
        );
        let bus = entry.bus.clone();
        self.publish(&bus, &event);
        Ok(event)
    }

    fn publish(&mut self, bus: &EventBus<Self>, event: &Event) {
        let hub_wide = self.observers.clone();
        self.depth += 1;
        bus.notify(event, self);
        hub_wide.notify(event, self);
        self.depth -= 1;
    }

    fn entry_mut(&mut self, id: &str) -> Result<&mut Entry, SmartHubError> {
        self.devices
            .get_mut(id)
            .ok_or_else(|| SmartHubError::device_not_found(id))
    }
}

fn fallback_color(record: &mut DeviceRecord) {
    if !matches!(record.kind.parse::<DeviceKind>(), Ok(DeviceKind::Light)) {
        return;
    }
    let Some(value) = record.attributes.get_mut("cor") else {
        return;
    };
    let known = value
        .as_str()
        .is_some_and(|raw| raw.parse::<Color>().is_ok());
    if !known {
        tracing::warn!(device = %record.id, %value, "unknown light colour, using WHITE");
        *value = Color::White.as_str().into();
    }
}

/// Step-by-step builder for [`AutomationHub`].
pub struct AutomationHubBuilder {
    devices: Vec<Device>,
    routines: RoutineBook,
    observers: Vec<HubObserver>,
    clock: Box<dyn Clock>,
    max_depth: usize,
}

impl Default for AutomationHubBuilder {
    fn default() -> Self {
        Self {
            devices: Vec::new(),
            routines: RoutineBook::default(),
            observers: Vec::new(),
            clock: Box::new(SystemClock),
            max_depth: DEFAULT_MAX_PROPAGATION_DEPTH,
        }
    }
}

impl AutomationHubBuilder {
    #[must_use]
    pub fn device(mut self, device: Device) -> Self {
        self.devices.push(device);
        self
    }

    #[must_use]
    pub fn devices(mut self, devices: impl IntoIterator<Item = Device>) -> Self {
        self.devices.extend(devices);
        self
    }

    #[must_use]
    pub fn routines(mut self, routines: RoutineBook) -> Self {
        self.routines = routines;
        self
    }

    #[must_use]
    pub fn observer(mut self, observer: HubObserver) -> Self {
        self.observers.push(observer);
        self
    }

    #[must_use]
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    #[must_use]
    pub fn max_propagation_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Consume the builder and return an [`AutomationHub`].
    ///
    /// Rules whose origin device is absent stay in the routine book, unbound
    /// until that device is added; see [`AutomationHub::unbound_rules`].
    ///
    /// # Errors
    ///
    /// Returns [`SmartHubError::DuplicateDeviceId`] when two devices share an
    /// id, or [`ValidationError::ZeroPropagationDepth`] for a zero limit.
    pub fn build(self) -> Result<AutomationHub, SmartHubError> {
        if self.max_depth == 0 {
            return Err(ValidationError::ZeroPropagationDepth.into());
        }
        let mut hub = AutomationHub {
            devices: IndexMap::new(),
            observers: EventBus::new(),
            routines: self.routines,
            clock: self.clock,
            max_depth: self.max_depth,
            depth: 0,
            overflow: false,
        };
        for observer in self.observers {
            hub.attach_observer(observer);
        }
        for device in self.devices {
            hub.add(device)?;
        }
        for rule in hub.unbound_rules() {
            tracing::debug!(%rule, "rule origin not registered yet");
        }
        Ok(hub)
    }
}
