//! Report rows built from the hub's current devices.
//!
//! Rows are plain serializable structs; writing them out is up to the caller.

use std::collections::HashMap;

use serde::Serialize;
use smarthub_domain::consumption::{ConsumptionPeriod, consumption_periods};
use smarthub_domain::device::DeviceModel;
use smarthub_domain::event::EventRecord;
use smarthub_domain::id::DeviceId;

use crate::hub::AutomationHub;

/// One row of the device report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceRow {
    pub id: DeviceId,
    pub nome: String,
    pub tipo: String,
    pub estado: String,
    pub extra_info: String,
}

/// One row of the plug consumption report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlugConsumptionRow {
    pub id: DeviceId,
    pub nome: String,
    pub consumo_wh: f64,
}

/// Every device in registry order, with a type-specific summary.
#[must_use]
pub fn device_report(hub: &AutomationHub) -> Vec<DeviceRow> {
    let now = hub.now();
    hub.devices()
        .map(|device| {
            let extra_info = match device.model() {
                DeviceModel::Plug(plug) => format!("Consumo: {} Wh", plug.consumption_at(now)),
                DeviceModel::Light(light) => {
                    format!("Brilho: {} | Cor: {}", light.brightness(), light.color())
                }
                _ => String::new(),
            };
            DeviceRow {
                id: device.id().clone(),
                nome: device.name().to_string(),
                tipo: device.kind().to_string(),
                estado: device.state(),
                extra_info,
            }
        })
        .collect()
}

/// Accumulated consumption of every plug.
#[must_use]
pub fn plug_consumption_report(hub: &AutomationHub) -> Vec<PlugConsumptionRow> {
    let now = hub.now();
    hub.devices()
        .filter_map(|device| match device.model() {
            DeviceModel::Plug(plug) => Some(PlugConsumptionRow {
                id: device.id().clone(),
                nome: device.name().to_string(),
                consumo_wh: plug.consumption_at(now),
            }),
            _ => None,
        })
        .collect()
}

/// On/off periods of the hub's plugs found in `log`, charged at each plug's
/// current rated power.
#[must_use]
pub fn plug_periods<'a>(
    hub: &AutomationHub,
    log: impl IntoIterator<Item = &'a EventRecord>,
) -> Vec<ConsumptionPeriod> {
    let power_by_plug: HashMap<DeviceId, f64> = hub
        .devices()
        .filter_map(|device| match device.model() {
            DeviceModel::Plug(plug) => Some((device.id().clone(), plug.power_w())),
            _ => None,
        })
        .collect();
    consumption_periods(log, &power_by_plug)
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use smarthub_domain::device::{Device, DeviceKind};
    use smarthub_domain::time;

    use super::*;
    use crate::ports::ManualClock;

    fn device(raw: &str, kind: DeviceKind) -> Device {
        Device::new(DeviceId::new(raw).unwrap(), raw.to_uppercase(), kind).unwrap()
    }

    fn hub(clock: &ManualClock) -> AutomationHub {
        AutomationHub::builder()
            .device(device("luz", DeviceKind::Light))
            .device(device("tomada", DeviceKind::Plug))
            .device(device("porta", DeviceKind::Door))
            .clock(clock.clone())
            .build()
            .unwrap()
    }

    #[test]
    fn should_summarise_lights_and_plugs_in_device_report() {
        let clock = ManualClock::new(time::now());
        let mut hub = hub(&clock);
        hub.set_attribute("luz", "brilho", 40_i64).unwrap();
        hub.set_attribute("luz", "cor", "red").unwrap();
        hub.execute("tomada", "ligar").unwrap();
        clock.advance(Duration::minutes(90));

        let rows = device_report(&hub);
        let extras: Vec<_> = rows.iter().map(|r| r.extra_info.as_str()).collect();
        assert_eq!(extras, ["Brilho: 40 | Cor: RED", "Consumo: 150 Wh", ""]);
        assert_eq!(rows[1].estado, "ligada");
        assert_eq!(rows[2].tipo, "PORTA");
    }

    #[test]
    fn should_list_only_plugs_in_consumption_report() {
        let clock = ManualClock::new(time::now());
        let mut hub = hub(&clock);
        hub.execute("tomada", "ligar").unwrap();
        clock.advance(Duration::minutes(30));
        hub.execute("tomada", "desligar").unwrap();

        let rows = plug_consumption_report(&hub);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].nome, "TOMADA");
        assert!((rows[0].consumo_wh - 50.0).abs() < 1e-9);
    }

    #[test]
    fn should_rebuild_periods_from_recorded_events() {
        let clock = ManualClock::new(time::now());
        let mut hub = hub(&clock);
        let mut log = Vec::new();
        log.push(hub.execute("tomada", "ligar").unwrap().record());
        log.push(hub.execute("luz", "ligar").unwrap().record());
        clock.advance(Duration::hours(2));
        log.push(hub.execute("tomada", "desligar").unwrap().record());

        let periods = plug_periods(&hub, &log);
        assert_eq!(periods.len(), 1);
        assert_eq!(periods[0].device_id.as_str(), "tomada");
        assert!((periods[0].total_wh - 200.0).abs() < 1e-9);
    }

    #[test]
    fn should_serialize_device_rows_with_report_columns() {
        let clock = ManualClock::new(time::now());
        let hub = hub(&clock);
        let json = serde_json::to_value(&device_report(&hub)[2]).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "porta",
                "nome": "PORTA",
                "tipo": "PORTA",
                "estado": "destrancada",
                "extra_info": ""
            })
        );
    }
}
