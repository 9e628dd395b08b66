//! Consumption periods reconstructed from an event log.
//!
//! Each plug's `ligar` record is paired with its next `desligar` record; the
//! period in between is charged at the plug's current rated power.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::event::EventRecord;
use crate::id::DeviceId;
use crate::time::{Timestamp, elapsed_hours, round2};

const TURN_ON: &str = "ligar";
const TURN_OFF: &str = "desligar";

/// One closed on/off period of a plug.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionPeriod {
    #[serde(rename = "id_dispositivo")]
    pub device_id: DeviceId,
    pub total_wh: f64,
    #[serde(rename = "periodo_inicio")]
    pub started_at: Timestamp,
    #[serde(rename = "periodo_fim")]
    pub ended_at: Timestamp,
}

/// Pair `ligar`/`desligar` records of the plugs in `power_by_plug`.
///
/// Records of other devices are ignored, as are a `desligar` with no open
/// period and a `ligar` that is never closed. A second `ligar` before the
/// `desligar` restarts the period.
#[must_use]
pub fn consumption_periods<'a>(
    log: impl IntoIterator<Item = &'a EventRecord>,
    power_by_plug: &HashMap<DeviceId, f64>,
) -> Vec<ConsumptionPeriod> {
    let mut open: HashMap<&DeviceId, Timestamp> = HashMap::new();
    let mut periods = Vec::new();

    for record in log {
        let Some(power_w) = power_by_plug.get(&record.device_id) else {
            continue;
        };
        match record.event.as_str() {
            TURN_ON => {
                open.insert(&record.device_id, record.timestamp);
            }
            TURN_OFF => {
                if let Some(started_at) = open.remove(&record.device_id) {
                    periods.push(ConsumptionPeriod {
                        device_id: record.device_id.clone(),
                        total_wh: round2(power_w * elapsed_hours(started_at, record.timestamp)),
                        started_at,
                        ended_at: record.timestamp,
                    });
                }
            }
            _ => {}
        }
    }
    periods
}
