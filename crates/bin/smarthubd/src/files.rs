//! JSON file adapters for the hub's ports.
//!
//! - [`JsonDeviceFile`]: `{"dispositivos": [...]}` (or a bare list) of device records
//! - [`JsonRoutineFile`]: routines and rules, in either accepted layout
//! - [`JsonLinesEventLog`]: one event record per line, append-only
//!
//! A missing or empty device or routine file is not an error: it loads as
//! empty, with a warning.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use smarthub_app::ports::{DeviceSource, EventSink, RoutineSource};
use smarthub_domain::device::DeviceRecord;
use smarthub_domain::event::EventRecord;
use smarthub_domain::routine::RoutineBook;

/// Failures of the file adapters.
#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("failed to read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed JSON in {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// File content, or `None` when it is absent or blank.
fn read_optional(path: &Path) -> Result<Option<String>, FileError> {
    match fs::read_to_string(path) {
        Ok(content) if content.trim().is_empty() => Ok(None),
        Ok(content) => Ok(Some(content)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(FileError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn write_file(path: &Path, content: &str) -> Result<(), FileError> {
    let write = || -> io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)
    };
    write().map_err(|source| FileError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DeviceDocument {
    Wrapped {
        #[serde(alias = "devices")]
        dispositivos: Vec<serde_json::Value>,
    },
    List(Vec<serde_json::Value>),
}

/// Device records stored as one JSON document.
#[derive(Debug, Clone)]
pub struct JsonDeviceFile {
    path: PathBuf,
}

impl JsonDeviceFile {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrite the file with `records` as `{"dispositivos": [...]}`.
    ///
    /// # Errors
    ///
    /// Returns [`FileError::Write`] when the file or its directory cannot be written.
    pub fn save(&self, records: &[DeviceRecord]) -> Result<(), FileError> {
        let document = serde_json::json!({ "dispositivos": records });
        let content = serde_json::to_string_pretty(&document).map_err(|source| FileError::Parse {
            path: self.path.clone(),
            source,
        })?;
        write_file(&self.path, &content)?;
        tracing::info!(path = %self.path.display(), devices = records.len(), "devices saved");
        Ok(())
    }
}

impl DeviceSource for JsonDeviceFile {
    type Error = FileError;

    /// Records that are not even shaped like a device record are logged and
    /// dropped here; everything else is left to the hub.
    fn load_devices(&self) -> Result<Vec<DeviceRecord>, Self::Error> {
        let Some(content) = read_optional(&self.path)? else {
            tracing::warn!(path = %self.path.display(), "device file missing or empty, no devices loaded");
            return Ok(Vec::new());
        };
        let document: DeviceDocument =
            serde_json::from_str(&content).map_err(|source| FileError::Parse {
                path: self.path.clone(),
                source,
            })?;
        let values = match document {
            DeviceDocument::Wrapped { dispositivos } => dispositivos,
            DeviceDocument::List(values) => values,
        };

        let mut records = Vec::with_capacity(values.len());
        for (index, value) in values.into_iter().enumerate() {
            match serde_json::from_value::<DeviceRecord>(value) {
                Ok(record) => records.push(record),
                Err(error) => tracing::warn!(index, %error, "skipping malformed device record"),
            }
        }
        Ok(records)
    }
}

/// Routines and rules stored as one JSON document.
#[derive(Debug, Clone)]
pub struct JsonRoutineFile {
    path: PathBuf,
}

impl JsonRoutineFile {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RoutineSource for JsonRoutineFile {
    type Error = FileError;

    fn load_routines(&self) -> Result<RoutineBook, Self::Error> {
        let Some(content) = read_optional(&self.path)? else {
            tracing::warn!(path = %self.path.display(), "routine file missing or empty, no routines loaded");
            return Ok(RoutineBook::new());
        };
        let book: RoutineBook = serde_json::from_str(&content).map_err(|source| FileError::Parse {
            path: self.path.clone(),
            source,
        })?;
        tracing::info!(
            routines = book.routines().count(),
            rules = book.rules().len(),
            "routines loaded"
        );
        Ok(book)
    }
}

/// Append-only JSON-lines log of [`EventRecord`]s.
#[derive(Debug, Clone)]
pub struct JsonLinesEventLog {
    path: PathBuf,
}

impl JsonLinesEventLog {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Every record in the log, oldest first. Unreadable lines are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`FileError::Read`] when the log exists but cannot be read.
    pub fn read_all(&self) -> Result<Vec<EventRecord>, FileError> {
        let Some(content) = read_optional(&self.path)? else {
            return Ok(Vec::new());
        };
        let mut records = Vec::new();
        for (index, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(line) {
                Ok(record) => records.push(record),
                Err(error) => tracing::warn!(line = index + 1, %error, "skipping malformed event record"),
            }
        }
        Ok(records)
    }
}

impl EventSink for JsonLinesEventLog {
    type Error = FileError;

    fn record(&self, record: &EventRecord) -> Result<(), Self::Error> {
        let write_error = |source| FileError::Write {
            path: self.path.clone(),
            source,
        };
        let mut line = serde_json::to_string(record).map_err(|source| FileError::Parse {
            path: self.path.clone(),
            source,
        })?;
        line.push('\n');

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_error)?;
        }
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| file.write_all(line.as_bytes()))
            .map_err(write_error)
    }
}

#[cfg(test)]
mod tests {
    use smarthub_domain::id::DeviceId;
    use smarthub_domain::time::now;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn should_load_wrapped_device_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("devices.json");
        fs::write(
            &path,
            r#"{"dispositivos": [
                {"id": "luz", "tipo": "LUZ", "nome": "Luz", "atributos": {"brilho": 50}},
                {"id": "porta", "type": "PORTA", "initial_state": "trancada"}
            ]}"#,
        )
        .unwrap();

        let records = JsonDeviceFile::new(&path).load_devices().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name.as_deref(), Some("Luz"));
        assert_eq!(records[1].state.as_deref(), Some("trancada"));
    }

    #[test]
    fn should_load_bare_list_of_devices() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("devices.json");
        fs::write(&path, r#"[{"id": "sensor", "tipo": "SENSOR"}]"#).unwrap();
        let records = JsonDeviceFile::new(&path).load_devices().unwrap();
        assert_eq!(records[0].kind, "SENSOR");
    }

    #[test]
    fn should_drop_records_without_a_type() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("devices.json");
        fs::write(
            &path,
            r#"{"dispositivos": [{"id": "x"}, {"id": "luz", "tipo": "LUZ"}]}"#,
        )
        .unwrap();
        let records = JsonDeviceFile::new(&path).load_devices().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "luz");
    }

    #[test]
    fn should_treat_missing_or_empty_files_as_empty() {
        let dir = TempDir::new().unwrap();
        let empty = dir.path().join("empty.json");
        fs::write(&empty, "  \n").unwrap();

        assert!(JsonDeviceFile::new(dir.path().join("absent.json")).load_devices().unwrap().is_empty());
        assert!(JsonDeviceFile::new(&empty).load_devices().unwrap().is_empty());
        assert!(JsonRoutineFile::new(&empty).load_routines().unwrap().is_empty());
    }

    #[test]
    fn should_report_malformed_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("routines.json");
        fs::write(&path, "{not json").unwrap();
        let err = JsonRoutineFile::new(&path).load_routines().unwrap_err();
        assert!(matches!(err, FileError::Parse { .. }));
    }

    #[test]
    fn should_save_devices_in_wrapped_layout() {
        let dir = TempDir::new().unwrap();
        let file = JsonDeviceFile::new(dir.path().join("nested/devices.json"));
        file.save(&[DeviceRecord::new("luz", "LUZ")]).unwrap();

        let saved: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(file.path()).unwrap()).unwrap();
        assert_eq!(saved["dispositivos"][0]["tipo"], "LUZ");
        assert_eq!(file.load_devices().unwrap(), [DeviceRecord::new("luz", "LUZ")]);
    }

    #[test]
    fn should_append_and_read_back_event_records() {
        let dir = TempDir::new().unwrap();
        let log = JsonLinesEventLog::new(dir.path().join("logs/events.jsonl"));
        let record = EventRecord {
            device_id: DeviceId::new("tomada").unwrap(),
            event: "ligar".to_string(),
            timestamp: now(),
        };
        log.record(&record).unwrap();
        log.record(&record).unwrap();

        let content = fs::read_to_string(dir.path().join("logs/events.jsonl")).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.contains("\"id_dispositivo\":\"tomada\""));
        assert_eq!(log.read_all().unwrap(), [record.clone(), record]);
    }

    #[test]
    fn should_skip_malformed_event_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("events.jsonl");
        fs::write(
            &path,
            "garbage\n\n{\"id_dispositivo\":\"luz\",\"evento\":\"ligar\",\"timestamp\":\"2024-01-01T00:00:00Z\"}\n",
        )
        .unwrap();
        let records = JsonLinesEventLog::new(&path).read_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].event, "ligar");
    }
}
