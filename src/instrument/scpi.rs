//! Generic SCPI oscilloscope support.
//!
//! Provides the pieces shared by SCPI-speaking backends, independent of how bytes
//! reach the instrument:
//!
//! - [`ScpiTransport`]: write/query abstraction implemented by each backend.
//! - `*IDN?` parsing and [`classify`] to fill in an [`InstrumentSpec`].
//! - [`ScpiOscilloscope`]: waveform download using the `:WAVeform` subsystem common to
//!   Keysight, Rigol and compatible scopes, in ASCII format.

use crate::error::{AppError, AppResult};
use crate::instrument::{InstrumentSpec, InstrumentType, Oscilloscope, Waveform};
use std::str::FromStr;
use tracing::debug;

/// Trait for SCPI communication transports.
///
/// Abstracts the underlying communication mechanism (VISA, raw socket) so the
/// command sequences below can be exercised against a scripted transport.
pub trait ScpiTransport {
    /// Send a command without expecting a response.
    fn write(&mut self, command: &str) -> AppResult<()>;

    /// Send a query command and return the response, without its terminator.
    fn query(&mut self, command: &str) -> AppResult<String>;
}

/// Fields of an `*IDN?` response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub make: String,
    pub model: String,
    pub serial: String,
    pub firmware: String,
}

impl Identity {
    /// Builds the discovery entry for an instrument at `address`.
    pub fn into_spec(self, address: impl Into<String>) -> InstrumentSpec {
        let instrument_type = classify(&self.make, &self.model);
        InstrumentSpec::new(address, self.make, self.model, instrument_type)
    }
}

/// Parses `make,model,serial,firmware`. Serial and firmware may be missing.
pub fn parse_idn(response: &str) -> AppResult<Identity> {
    let mut fields = response.trim().splitn(4, ',').map(str::trim);
    let make = fields.next().unwrap_or_default();
    let model = fields.next().unwrap_or_default();
    if make.is_empty() || model.is_empty() {
        return Err(AppError::Instrument(format!(
            "Malformed *IDN? response: '{}'",
            response.trim()
        )));
    }
    Ok(Identity {
        make: make.to_string(),
        model: model.to_string(),
        serial: fields.next().unwrap_or_default().to_string(),
        firmware: fields.next().unwrap_or_default().to_string(),
    })
}

const SPECTRUM_ANALYZER_PREFIXES: &[&str] = &["DSA", "RSA", "SSA", "N90", "FSV", "FSW"];
const OSCILLOSCOPE_PREFIXES: &[&str] = &[
    "DS", "MSO", "TDS", "TBS", "MDO", "DPO", "RTB", "RTM", "RTO", "SDS", "DHO", "HDO", "WAVE",
];
const MULTIMETER_PREFIXES: &[&str] = &[
    "DM3", "DMM", "SDM", "344", "346", "2000", "2001", "2002", "2010", "2100", "6500", "7510",
];
const FUNCTION_GENERATOR_PREFIXES: &[&str] = &["DG", "SDG", "AFG", "335", "336", "33"];
const POWER_SUPPLY_PREFIXES: &[&str] = &["DP", "SPD", "E36", "PSU", "2230", "2231", "HMC", "HMP", "NGE"];

/// Guesses the instrument category from its model designation.
///
/// Prefix tables are checked in order; spectrum analyzers come first so that `DSA`
/// is not taken for an oscilloscope.
pub fn classify(_make: &str, model: &str) -> InstrumentType {
    let model = model.trim().to_uppercase();
    let table: [(&[&str], InstrumentType); 5] = [
        (SPECTRUM_ANALYZER_PREFIXES, InstrumentType::SpectrumAnalyzer),
        (OSCILLOSCOPE_PREFIXES, InstrumentType::Oscilloscope),
        (MULTIMETER_PREFIXES, InstrumentType::Multimeter),
        (FUNCTION_GENERATOR_PREFIXES, InstrumentType::FunctionGenerator),
        (POWER_SUPPLY_PREFIXES, InstrumentType::PowerSupply),
    ];
    table
        .iter()
        .find(|(prefixes, _)| prefixes.iter().any(|p| model.starts_with(p)))
        .map(|(_, ty)| *ty)
        .unwrap_or(InstrumentType::Unknown)
}

/// Queries `*IDN?` and builds the discovery entry for `address`.
pub fn identify<T: ScpiTransport + ?Sized>(
    transport: &mut T,
    address: &str,
) -> AppResult<InstrumentSpec> {
    let response = transport.query("*IDN?")?;
    Ok(parse_idn(&response)?.into_spec(address))
}

/// Subset of `:WAVeform:PREamble?` needed to place samples in time.
///
/// Layout: `format,type,points,count,xincrement,xorigin,xreference,yincrement,yorigin,yreference`.
#[derive(Debug, Clone, PartialEq)]
pub struct Preamble {
    pub points: usize,
    pub x_increment: f64,
    pub x_origin: f64,
    pub x_reference: f64,
}

impl FromStr for Preamble {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.trim().split(',').map(str::trim).collect();
        if fields.len() < 10 {
            return Err(AppError::Instrument(format!(
                "Waveform preamble has {} fields, expected 10",
                fields.len()
            )));
        }
        let number = |index: usize| -> AppResult<f64> {
            fields[index].parse::<f64>().map_err(|_| {
                AppError::Instrument(format!(
                    "Invalid preamble field {}: '{}'",
                    index, fields[index]
                ))
            })
        };
        let x_increment = number(4)?;
        if !(x_increment.is_finite() && x_increment > 0.0) {
            return Err(AppError::Instrument(format!(
                "Invalid x increment in preamble: {}",
                x_increment
            )));
        }
        Ok(Self {
            points: number(2)? as usize,
            x_increment,
            x_origin: number(5)?,
            x_reference: number(6)?,
        })
    }
}

/// Strips an IEEE 488.2 definite-length block header (`#<n><len>`) if present.
fn strip_block_header(data: &str) -> AppResult<&str> {
    let Some(rest) = data.strip_prefix('#') else {
        return Ok(data);
    };
    let digits = rest
        .chars()
        .next()
        .and_then(|c| c.to_digit(10))
        .ok_or_else(|| AppError::Instrument("Malformed block header".to_string()))?
        as usize;
    if digits == 0 {
        return Ok(&rest[1..]);
    }
    let length_field = rest
        .get(1..1 + digits)
        .ok_or_else(|| AppError::Instrument("Truncated block header".to_string()))?;
    let length: usize = length_field
        .parse()
        .map_err(|_| AppError::Instrument(format!("Invalid block length '{}'", length_field)))?;
    let body = &rest[1 + digits..];
    Ok(body.get(..length).unwrap_or(body))
}

/// Parses an ASCII `:WAVeform:DATA?` response into volts.
pub fn parse_ascii_data(response: &str) -> AppResult<Vec<f64>> {
    strip_block_header(response.trim())?
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| {
            v.parse::<f64>()
                .map_err(|_| AppError::Instrument(format!("Invalid waveform sample '{}'", v)))
        })
        .collect()
}

/// Oscilloscope driven over any [`ScpiTransport`].
pub struct ScpiOscilloscope<T> {
    address: String,
    transport: T,
}

impl<T: ScpiTransport> ScpiOscilloscope<T> {
    pub fn new(address: impl Into<String>, transport: T) -> Self {
        Self {
            address: address.into(),
            transport,
        }
    }
}

impl<T: ScpiTransport> Oscilloscope for ScpiOscilloscope<T> {
    fn address(&self) -> &str {
        &self.address
    }

    fn fetch_waveform(&mut self, channel: u8) -> AppResult<Waveform> {
        self.transport
            .write(&format!(":WAVeform:SOURce CHANnel{}", channel))?;
        self.transport.write(":WAVeform:FORMat ASCii")?;
        let preamble: Preamble = self.transport.query(":WAVeform:PREamble?")?.parse()?;
        let samples = parse_ascii_data(&self.transport.query(":WAVeform:DATA?")?)?;

        if samples.len() != preamble.points {
            debug!(
                expected = preamble.points,
                received = samples.len(),
                "Waveform length differs from preamble"
            );
        }

        Ok(
            Waveform::new(self.address.clone(), channel, preamble.x_increment, samples)
                .with_origin(preamble.x_origin, preamble.x_reference),
        )
    }
}
