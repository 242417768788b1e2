//! Custom error types for the application.
//!
//! This module defines the primary error type, `AppError`, for the whole crate.
//! Using the `thiserror` crate, it provides a centralized way to describe the
//! failures that can occur, from configuration issues at startup to instrument
//! problems raised while the GUI is running.
//!
//! ## Error Hierarchy
//!
//! - **`Config`**: Wraps errors from `figment`, typically a malformed TOML file or an
//!   environment override with the wrong type.
//! - **`Configuration`**: Semantic errors that pass parsing but are logically invalid
//!   (unknown backend, zero timeout). Caught by `Settings::validate`.
//! - **`Discovery`**: The instrument scan failed or found nothing.
//! - **`NoSelection`**: An instrument window was requested without a selected row.
//! - **`Acquisition`**: Opening an instrument, selecting a channel or fetching its
//!   waveform failed.
//! - **`Instrument`**: Low-level communication or parse failure inside a backend. The
//!   UI layer wraps these into `Acquisition` or `Discovery` with context
//!   (see [`AppError::acquisition`] and [`AppError::discovery`]).
//!
//! `Discovery`, `NoSelection` and `Acquisition` are recoverable: the windows catch them
//! at the callback boundary and show a notification instead of terminating.

use thiserror::Error;

/// Convenience alias for results using the application error type.
pub type AppResult<T> = std::result::Result<T, AppError>;

/// Every failure the application reports.
#[derive(Error, Debug)]
pub enum AppError {
    /// The configuration could not be extracted (malformed TOML, wrong value type).
    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    /// The configuration parsed but holds an invalid value.
    #[error("Configuration validation error: {0}")]
    Configuration(String),

    /// The instrument scan failed or found nothing.
    #[error("Instrument discovery failed: {0}")]
    Discovery(String),

    /// An instrument window was requested without a valid selected row.
    #[error("No instrument selected")]
    NoSelection,

    /// Connecting to `address`, selecting a channel or fetching its waveform failed.
    #[error("Waveform acquisition from '{address}' failed: {reason}")]
    Acquisition { address: String, reason: String },

    /// A channel outside the offered options.
    #[error("Invalid channel '{0}'")]
    InvalidChannel(String),

    /// Backend communication or parse failure, before UI context is attached.
    #[error("Instrument error: {0}")]
    Instrument(String),

    /// The configured backend was compiled out.
    #[error("Feature '{0}' is not enabled. Please build with --features {0}")]
    FeatureNotEnabled(String),

    /// The event loop or a window could not be created.
    #[error("GUI error: {0}")]
    Gui(String),
}

impl From<figment::Error> for AppError {
    fn from(value: figment::Error) -> Self {
        AppError::Config(Box::new(value))
    }
}

impl AppError {
    /// Wraps any error raised while talking to `address` into an acquisition failure.
    pub fn acquisition(address: impl Into<String>, source: AppError) -> Self {
        match source {
            already @ AppError::Acquisition { .. } => already,
            AppError::Instrument(reason) => AppError::Acquisition {
                address: address.into(),
                reason,
            },
            other => AppError::Acquisition {
                address: address.into(),
                reason: other.to_string(),
            },
        }
    }

    /// Wraps any error raised while scanning the bus into a discovery failure.
    pub fn discovery(source: AppError) -> Self {
        match source {
            already @ AppError::Discovery(_) => already,
            AppError::Instrument(reason) => AppError::Discovery(reason),
            other => AppError::Discovery(other.to_string()),
        }
    }

    /// Whether a window can report this error and keep running.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AppError::Discovery(_)
                | AppError::NoSelection
                | AppError::Acquisition { .. }
                | AppError::InvalidChannel(_)
                | AppError::Instrument(_)
        )
    }

    /// Short heading used for notifications.
    pub fn title(&self) -> &'static str {
        match self {
            AppError::Discovery(_) => "Discovery failed",
            AppError::NoSelection => "No instrument selected",
            AppError::Acquisition { .. } => "Acquisition failed",
            AppError::InvalidChannel(_) => "Invalid channel",
            AppError::Instrument(_) => "Instrument error",
            AppError::Config(_) | AppError::Configuration(_) => "Configuration error",
            AppError::FeatureNotEnabled(_) => "Feature not enabled",
            AppError::Gui(_) => "GUI error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instrument_error_becomes_acquisition_with_address() {
        let err = AppError::acquisition("USB0::1", AppError::Instrument("timeout".into()));
        match err {
            AppError::Acquisition { address, reason } => {
                assert_eq!(address, "USB0::1");
                assert_eq!(reason, "timeout");
            }
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn acquisition_is_not_wrapped_twice() {
        let inner = AppError::Acquisition {
            address: "GPIB0::5::INSTR".into(),
            reason: "offline".into(),
        };
        let err = AppError::acquisition("other", inner);
        assert!(err.to_string().contains("GPIB0::5::INSTR"));
        assert!(!err.to_string().contains("other"));
    }

    #[test]
    fn instrument_error_becomes_discovery_without_double_prefix() {
        let err = AppError::discovery(AppError::Instrument("VISA library not found".into()));
        assert_eq!(
            err.to_string(),
            "Instrument discovery failed: VISA library not found"
        );
        let kept = AppError::discovery(AppError::Discovery("bus fault".into()));
        assert_eq!(kept.to_string(), "Instrument discovery failed: bus fault");
    }

    #[test]
    fn recoverable_kinds() {
        assert!(AppError::NoSelection.is_recoverable());
        assert!(AppError::Discovery("bus".into()).is_recoverable());
        assert!(!AppError::Configuration("bad".into()).is_recoverable());
        assert!(!AppError::FeatureNotEnabled("instrument_visa".into()).is_recoverable());
    }
}
