//! Boot sequence: build the hub from files, run startup routines, report.

use std::rc::Rc;

use anyhow::Context;
use serde::Serialize;
use smarthub_app::hub::AutomationHub;
use smarthub_app::ports::{DeviceSource, EventRecorder, RoutineSource};
use smarthub_app::report::{
    DeviceRow, PlugConsumptionRow, device_report, plug_consumption_report, plug_periods,
};
use smarthub_domain::consumption::ConsumptionPeriod;
use smarthub_domain::device::DeviceRecord;

use crate::config::Config;
use crate::files::{JsonDeviceFile, JsonLinesEventLog, JsonRoutineFile};

/// How one startup routine went.
#[derive(Debug, Serialize)]
pub struct RoutineSummary {
    pub id: String,
    pub succeeded: usize,
    pub failed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Everything the daemon prints once the boot sequence is done.
#[derive(Debug, Serialize)]
pub struct Summary {
    /// Ids of device records that could not be loaded.
    pub skipped: Vec<String>,
    pub routines: Vec<RoutineSummary>,
    pub devices: Vec<DeviceRow>,
    pub plug_consumption: Vec<PlugConsumptionRow>,
    /// Plug on/off periods found in the whole event log.
    pub periods: Vec<ConsumptionPeriod>,
}

/// Build the hub described by `config`, run its startup routines and
/// summarise the result.
///
/// Every event published along the way is appended to the event log.
///
/// # Errors
///
/// Returns an error when a file cannot be read or parsed, when the hub cannot
/// be built, or when the devices cannot be saved.
pub fn run(config: &Config) -> anyhow::Result<Summary> {
    let routines = JsonRoutineFile::new(&config.files.routines)
        .load_routines()
        .context("failed to load routines")?;
    let records = JsonDeviceFile::new(&config.files.devices)
        .load_devices()
        .context("failed to load devices")?;
    let event_log = JsonLinesEventLog::new(&config.files.event_log);

    let mut hub = AutomationHub::builder()
        .routines(routines)
        .max_propagation_depth(config.hub.max_propagation_depth)
        .observer(Rc::new(EventRecorder::new(event_log.clone())))
        .build()
        .context("failed to build hub")?;

    let load = hub.load_devices(records);
    for rule in hub.unbound_rules() {
        tracing::warn!(%rule, "rule origin not found, rule left unbound");
    }

    let routines = config
        .startup
        .routines
        .iter()
        .map(|id| run_startup_routine(&mut hub, id))
        .collect();

    if config.files.persist_devices {
        let now = hub.now();
        let records: Vec<DeviceRecord> = hub.devices().map(|d| d.to_record(now)).collect();
        JsonDeviceFile::new(&config.files.devices)
            .save(&records)
            .context("failed to save devices")?;
    }

    let log = event_log
        .read_all()
        .context("failed to read event log")?;
    Ok(Summary {
        skipped: load.skipped.into_iter().map(|s| s.id).collect(),
        routines,
        devices: device_report(&hub),
        plug_consumption: plug_consumption_report(&hub),
        periods: plug_periods(&hub, &log),
    })
}

fn run_startup_routine(hub: &mut AutomationHub, id: &str) -> RoutineSummary {
    match hub.run_routine(id) {
        Ok(report) => RoutineSummary {
            id: id.to_string(),
            succeeded: report.succeeded(),
            failed: report.failed(),
            error: None,
        },
        Err(error) => {
            tracing::warn!(routine = id, %error, "startup routine failed");
            RoutineSummary {
                id: id.to_string(),
                succeeded: 0,
                failed: 0,
                error: Some(error.to_string()),
            }
        }
    }
}
