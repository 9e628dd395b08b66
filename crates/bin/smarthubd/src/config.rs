//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `smarthub.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use smarthub_app::hub::DEFAULT_MAX_PROPAGATION_DEPTH;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where devices, routines and events are stored.
    pub files: FilesConfig,
    /// Hub behaviour.
    pub hub: HubConfig,
    /// What runs once at boot.
    pub startup: StartupConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// File locations.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    /// JSON device file.
    pub devices: PathBuf,
    /// JSON routine file.
    pub routines: PathBuf,
    /// JSON-lines event log, appended to on every event.
    pub event_log: PathBuf,
    /// Write the devices back to `devices` before exiting.
    pub persist_devices: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// Nested commands allowed beneath one top-level command.
    pub max_propagation_depth: usize,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StartupConfig {
    /// Action-list ids run once, in order, after the devices are loaded.
    pub routines: Vec<String>,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `smarthub.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("smarthub.toml")?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Read `path`, falling back to the defaults when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("SMARTHUB_DEVICES") {
            self.files.devices = val.into();
        }
        if let Some(val) = lookup("SMARTHUB_ROUTINES") {
            self.files.routines = val.into();
        }
        if let Some(val) = lookup("SMARTHUB_EVENT_LOG") {
            self.files.event_log = val.into();
        }
        if let Some(depth) = lookup("SMARTHUB_MAX_DEPTH").and_then(|val| val.parse().ok()) {
            self.hub.max_propagation_depth = depth;
        }
        if let Some(val) = lookup("SMARTHUB_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for a zero propagation depth.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hub.max_propagation_depth == 0 {
            return Err(ConfigError::Validation(
                "max_propagation_depth must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            devices: PathBuf::from("data/devices.json"),
            routines: PathBuf::from("data/routines.json"),
            event_log: PathBuf::from("data/events.jsonl"),
            persist_devices: false,
        }
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            max_propagation_depth: DEFAULT_MAX_PROPAGATION_DEPTH,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "smarthubd=info,smarthub=info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.files.devices, Path::new("data/devices.json"));
        assert_eq!(config.files.event_log, Path::new("data/events.jsonl"));
        assert!(!config.files.persist_devices);
        assert_eq!(config.hub.max_propagation_depth, 16);
        assert!(config.startup.routines.is_empty());
        assert_eq!(config.logging.filter, "smarthubd=info,smarthub=info");
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.hub.max_propagation_depth, 16);
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = "
            [files]
            devices = 'casa/dispositivos.json'
            routines = 'casa/rotinas.json'
            event_log = 'casa/eventos.jsonl'
            persist_devices = true

            [hub]
            max_propagation_depth = 4

            [startup]
            routines = ['bom_dia', 'saida']

            [logging]
            filter = 'debug'
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.files.devices, Path::new("casa/dispositivos.json"));
        assert_eq!(config.files.routines, Path::new("casa/rotinas.json"));
        assert_eq!(config.files.event_log, Path::new("casa/eventos.jsonl"));
        assert!(config.files.persist_devices);
        assert_eq!(config.hub.max_propagation_depth, 4);
        assert_eq!(config.startup.routines, ["bom_dia", "saida"]);
        assert_eq!(config.logging.filter, "debug");
    }

    #[test]
    fn should_parse_partial_toml_with_defaults() {
        let toml = "
            [hub]
            max_propagation_depth = 8
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.hub.max_propagation_depth, 8);
        assert_eq!(config.files.routines, Path::new("data/routines.json"));
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.hub.max_propagation_depth, 16);
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }

    #[test]
    fn should_override_file_values_from_environment() {
        let mut config = Config::default();
        config.apply_overrides(env(&[
            ("SMARTHUB_DEVICES", "/tmp/d.json"),
            ("SMARTHUB_ROUTINES", "/tmp/r.json"),
            ("SMARTHUB_EVENT_LOG", "/tmp/e.jsonl"),
            ("SMARTHUB_MAX_DEPTH", "3"),
            ("SMARTHUB_LOG", "smarthubd=debug"),
        ]));
        assert_eq!(config.files.devices, Path::new("/tmp/d.json"));
        assert_eq!(config.files.routines, Path::new("/tmp/r.json"));
        assert_eq!(config.files.event_log, Path::new("/tmp/e.jsonl"));
        assert_eq!(config.hub.max_propagation_depth, 3);
        assert_eq!(config.logging.filter, "smarthubd=debug");
    }

    #[test]
    fn should_prefer_rust_log_over_smarthub_log() {
        let mut config = Config::default();
        config.apply_overrides(env(&[("SMARTHUB_LOG", "info"), ("RUST_LOG", "trace")]));
        assert_eq!(config.logging.filter, "trace");
    }

    #[test]
    fn should_ignore_unparsable_depth_override() {
        let mut config = Config::default();
        config.apply_overrides(env(&[("SMARTHUB_MAX_DEPTH", "deep")]));
        assert_eq!(config.hub.max_propagation_depth, 16);
    }

    #[test]
    fn should_reject_zero_propagation_depth() {
        let mut config = Config::default();
        config.hub.max_propagation_depth = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn should_accept_default_config() {
        assert!(Config::default().validate().is_ok());
    }
}
