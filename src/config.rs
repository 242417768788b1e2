//! Configuration management using Figment
//!
//! Settings are layered:
//! 1. Built-in defaults (the application runs without any file)
//! 2. `config/mini_scope.toml` or a file given on the command line
//! 3. Environment variables prefixed with `MINISCOPE_`, using `__` between sections
//!
//! # Example
//! ```no_run
//! use mini_scope::config::Settings;
//!
//! let settings = Settings::load_from(mini_scope::config::DEFAULT_CONFIG_PATH)?;
//! println!("Backend: {}", settings.directory.backend);
//! # Ok::<(), mini_scope::error::AppError>(())
//! ```

use crate::error::{AppError, AppResult};
use crate::instrument::InstrumentType;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Default location of the optional configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "config/mini_scope.toml";

/// Prefix for environment overrides, e.g. `MINISCOPE_DIRECTORY__BACKEND=visa`.
pub const ENV_PREFIX: &str = "MINISCOPE_";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Application settings
    #[serde(default)]
    pub application: ApplicationSettings,
    /// Instrument directory backend settings
    #[serde(default)]
    pub directory: DirectorySettings,
    /// Instrument table presentation
    #[serde(default)]
    pub table: TableSettings,
    /// Main window geometry
    #[serde(default)]
    pub window: WindowSettings,
}

/// Application-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationSettings {
    /// Window title
    pub name: String,
    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Log output format (pretty, compact, json)
    pub log_format: String,
}

impl Default for ApplicationSettings {
    fn default() -> Self {
        Self {
            name: "Mini Scope GUI".to_string(),
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}

/// One simulated instrument on the mock bench.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MockInstrumentSettings {
    pub address: String,
    pub make: String,
    pub model: String,
    #[serde(default = "default_mock_type")]
    pub instrument_type: String,
}

/// Instrument directory configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectorySettings {
    /// Directory backend (mock or visa)
    pub backend: String,
    /// VISA resource expression used during discovery
    #[serde(default = "default_resource_filter")]
    pub resource_filter: String,
    /// Open/read timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Simulated bench used by the mock backend
    #[serde(default = "default_mock_instruments")]
    pub mock_instruments: Vec<MockInstrumentSettings>,
    /// Mock addresses that are listed but refuse connections
    #[serde(default)]
    pub mock_offline: Vec<String>,
    /// When set, every mock scan fails with this message
    #[serde(default)]
    pub mock_discovery_error: Option<String>,
}

impl Default for DirectorySettings {
    fn default() -> Self {
        Self {
            backend: "mock".to_string(),
            resource_filter: default_resource_filter(),
            timeout_ms: default_timeout_ms(),
            mock_instruments: default_mock_instruments(),
            mock_offline: Vec::new(),
            mock_discovery_error: None,
        }
    }
}

/// Instrument table configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableSettings {
    /// Use "Address"/"Make"/"Model"/"Type" instead of "Instrument" for every column
    #[serde(default)]
    pub per_column_headers: bool,
}

/// Main window geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowSettings {
    pub width: f32,
    pub height: f32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: 720.0,
            height: 360.0,
        }
    }
}

// Default value functions
fn default_resource_filter() -> String {
    "?*::INSTR".to_string()
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_mock_type() -> String {
    "SCOPE".to_string()
}

fn default_mock_instruments() -> Vec<MockInstrumentSettings> {
    vec![
        MockInstrumentSettings {
            address: "USB0::0x1AB1::0x04CE::DS1ZA000000001::INSTR".to_string(),
            make: "RIGOL TECHNOLOGIES".to_string(),
            model: "DS1104Z".to_string(),
            instrument_type: "SCOPE".to_string(),
        },
        MockInstrumentSettings {
            address: "TCPIP0::192.168.1.50::inst0::INSTR".to_string(),
            make: "KEYSIGHT TECHNOLOGIES".to_string(),
            model: "DSO-X 3024T".to_string(),
            instrument_type: "SCOPE".to_string(),
        },
        MockInstrumentSettings {
            address: "GPIB0::22::INSTR".to_string(),
            make: "Keithley".to_string(),
            model: "2000".to_string(),
            instrument_type: "DMM".to_string(),
        },
    ]
}

impl Settings {
    /// Load and validate configuration from a specific file path. A missing file leaves
    /// the defaults.
    pub fn load_from<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let settings = Self::extract_from(path)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Layer defaults, the file at `path` and the environment without validating, so
    /// callers can apply further overrides first.
    pub fn extract_from<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        Ok(Self::figment(path.as_ref()).extract()?)
    }

    /// Applies command-line overrides, then validates the result.
    pub fn with_overrides(
        mut self,
        backend: Option<String>,
        log_level: Option<String>,
    ) -> AppResult<Self> {
        if let Some(backend) = backend {
            self.directory.backend = backend;
        }
        if let Some(level) = log_level {
            self.application.log_level = level;
        }
        self.validate()?;
        Ok(self)
    }

    fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> AppResult<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        let level = self.application.log_level.to_lowercase();
        if !valid_levels.contains(&level.as_str()) {
            return Err(AppError::Configuration(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.application.log_level,
                valid_levels.join(", ")
            )));
        }

        let valid_formats = ["pretty", "compact", "json"];
        let format = self.application.log_format.to_lowercase();
        if !valid_formats.contains(&format.as_str()) {
            return Err(AppError::Configuration(format!(
                "Invalid log_format '{}'. Must be one of: {}",
                self.application.log_format,
                valid_formats.join(", ")
            )));
        }

        let valid_backends = ["mock", "visa"];
        if !valid_backends.contains(&self.directory.backend.as_str()) {
            return Err(AppError::Configuration(format!(
                "Invalid directory backend '{}'. Must be one of: {}",
                self.directory.backend,
                valid_backends.join(", ")
            )));
        }

        if self.directory.timeout_ms == 0 {
            return Err(AppError::Configuration(
                "directory.timeout_ms must be greater than zero".to_string(),
            ));
        }

        if !(self.window.width > 0.0 && self.window.height > 0.0) {
            return Err(AppError::Configuration(format!(
                "Invalid window size {}x{}",
                self.window.width, self.window.height
            )));
        }

        let mut addresses = HashSet::new();
        for instrument in &self.directory.mock_instruments {
            if !addresses.insert(instrument.address.as_str()) {
                return Err(AppError::Configuration(format!(
                    "Duplicate mock instrument address: {}",
                    instrument.address
                )));
            }
            if instrument.instrument_type.parse::<InstrumentType>().is_err() {
                return Err(AppError::Configuration(format!(
                    "Unknown instrument_type '{}' for {}",
                    instrument.instrument_type, instrument.address
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.directory.backend, "mock");
        assert!(!settings.table.per_column_headers);
        assert_eq!(settings.directory.mock_instruments.len(), 3);
    }

    #[test]
    fn test_invalid_log_level() {
        let mut settings = Settings::default();
        settings.application.log_level = "chatty".to_string();
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("Invalid log_level"));
    }

    #[test]
    fn test_invalid_backend() {
        let mut settings = Settings::default();
        settings.directory.backend = "gpib".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut settings = Settings::default();
        settings.directory.timeout_ms = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_duplicate_mock_addresses() {
        let mut settings = Settings::default();
        let first = settings.directory.mock_instruments[0].clone();
        settings.directory.mock_instruments.push(first);
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("Duplicate mock instrument address"));
    }

    #[test]
    fn test_log_format_is_case_insensitive() {
        let mut settings = Settings::default();
        settings.application.log_format = "JSON".to_string();
        assert!(settings.validate().is_ok());
        settings.application.log_format = "xml".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_unknown_mock_type() {
        let mut settings = Settings::default();
        settings.directory.mock_instruments[0].instrument_type = "toaster".to_string();
        assert!(settings.validate().is_err());
    }
}
