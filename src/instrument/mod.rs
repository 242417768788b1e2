//! Instrument directory abstraction and its backends.
//!
//! The GUI never talks to hardware directly. It asks an [`InstrumentDirectory`] for the
//! instruments currently reachable on the bus and for live [`Oscilloscope`] handles.
//! Two backends exist:
//!
//! - [`mock::MockDirectory`]: a simulated bench described in the configuration.
//! - `visa::VisaDirectory` (feature `instrument_visa`, off by default): a thin shim that
//!   enumerates VISA resources through `visa-rs` and drives oscilloscopes with a generic
//!   SCPI waveform subset from `scpi`.

use crate::config::DirectorySettings;
use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod mock;
#[cfg(feature = "instrument_visa")]
pub mod scpi;
#[cfg(feature = "instrument_visa")]
pub mod visa;
pub mod waveform;

pub use waveform::Waveform;

/// Highest channel number a scope window offers.
pub const MAX_CHANNELS: u8 = 8;

/// Category of a discovered instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstrumentType {
    Oscilloscope,
    Multimeter,
    FunctionGenerator,
    PowerSupply,
    SpectrumAnalyzer,
    Unknown,
}

impl InstrumentType {
    /// Textual value shown in the instrument table.
    pub fn as_str(&self) -> &'static str {
        match self {
            InstrumentType::Oscilloscope => "SCOPE",
            InstrumentType::Multimeter => "DMM",
            InstrumentType::FunctionGenerator => "AWG",
            InstrumentType::PowerSupply => "PSU",
            InstrumentType::SpectrumAnalyzer => "SA",
            InstrumentType::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for InstrumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InstrumentType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "scope" | "oscilloscope" => Ok(InstrumentType::Oscilloscope),
            "dmm" | "multimeter" => Ok(InstrumentType::Multimeter),
            "awg" | "function_generator" | "functiongenerator" => {
                Ok(InstrumentType::FunctionGenerator)
            }
            "psu" | "power_supply" | "powersupply" => Ok(InstrumentType::PowerSupply),
            "sa" | "spectrum_analyzer" | "spectrumanalyzer" => Ok(InstrumentType::SpectrumAnalyzer),
            "unknown" => Ok(InstrumentType::Unknown),
            other => Err(AppError::Configuration(format!(
                "Unknown instrument type '{}'",
                other
            ))),
        }
    }
}

/// Description of one instrument found during discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentSpec {
    /// Connection identifier, e.g. a VISA resource string
    pub address: String,
    /// Manufacturer
    pub make: String,
    /// Model designation
    pub model: String,
    /// Instrument category
    pub instrument_type: InstrumentType,
}

impl InstrumentSpec {
    /// Describes the instrument at `address`.
    pub fn new(
        address: impl Into<String>,
        make: impl Into<String>,
        model: impl Into<String>,
        instrument_type: InstrumentType,
    ) -> Self {
        Self {
            address: address.into(),
            make: make.into(),
            model: model.into(),
            instrument_type,
        }
    }
}

/// Source of instrument listings and live oscilloscope handles.
///
/// All calls are synchronous and may block for as long as the bus takes to answer.
pub trait InstrumentDirectory {
    /// Human readable backend name, used in logs.
    fn name(&self) -> &str;

    /// Scans the bus and returns every instrument found, in bus order.
    fn list_instruments(&self) -> AppResult<Vec<InstrumentSpec>>;

    /// Opens a live connection to the oscilloscope at `address`.
    fn oscilloscope(&self, address: &str) -> AppResult<Box<dyn Oscilloscope>>;
}

/// A connected oscilloscope.
pub trait Oscilloscope {
    /// Address this handle was opened with.
    fn address(&self) -> &str;

    /// Number of analog channels.
    fn channel_count(&self) -> u8 {
        MAX_CHANNELS
    }

    /// Downloads the current waveform of `channel` (1-based).
    fn fetch_waveform(&mut self, channel: u8) -> AppResult<Waveform>;
}

impl dyn Oscilloscope {
    /// Selects one analog channel of this scope.
    pub fn channel(&mut self, number: u8) -> AppResult<ScopeChannel<'_>> {
        if number == 0 || number > self.channel_count() {
            return Err(AppError::InvalidChannel(number.to_string()));
        }
        Ok(ScopeChannel { scope: self, number })
    }
}

/// One channel of a connected oscilloscope.
pub struct ScopeChannel<'a> {
    scope: &'a mut (dyn Oscilloscope + 'static),
    number: u8,
}

impl ScopeChannel<'_> {
    pub fn number(&self) -> u8 {
        self.number
    }

    /// Downloads this channel's waveform.
    pub fn get_waveform(&mut self) -> AppResult<Waveform> {
        self.scope.fetch_waveform(self.number)
    }
}

/// Builds the directory backend named in the configuration.
pub fn open_directory(settings: &DirectorySettings) -> AppResult<Box<dyn InstrumentDirectory>> {
    match settings.backend.as_str() {
        "mock" => Ok(Box::new(mock::MockDirectory::from_settings(settings)?)),
        #[cfg(feature = "instrument_visa")]
        "visa" => Ok(Box::new(visa::VisaDirectory::new(settings)?)),
        #[cfg(not(feature = "instrument_visa"))]
        "visa" => Err(AppError::FeatureNotEnabled("instrument_visa".to_string())),
        other => Err(AppError::Configuration(format!(
            "Unknown directory backend '{}'",
            other
        ))),
    }
}
