//! VISA-backed instrument directory for GPIB/USB/Ethernet instruments
//!
//! Discovery enumerates every VISA resource matching the configured expression and
//! identifies each with `*IDN?`. Resources that do not answer are skipped with a
//! warning so one unpowered device does not hide the rest of the bench.
//!
//! Supports resource strings like:
//! - "GPIB0::1::INSTR" (GPIB interface)
//! - "USB0::0x1234::0x5678::SERIAL::INSTR" (USB)
//! - "TCPIP0::192.168.1.100::INSTR" (Ethernet/LXI)

use crate::config::DirectorySettings;
use crate::error::{AppError, AppResult};
use crate::instrument::scpi::{self, ScpiOscilloscope, ScpiTransport};
use crate::instrument::{InstrumentDirectory, InstrumentSpec, InstrumentType, Oscilloscope};
use std::ffi::CString;
use std::io::{BufRead, BufReader, Write};
use std::time::Duration;
use tracing::{debug, info, warn};
use visa_rs::prelude::*;

fn visa_error(context: &str, err: impl std::fmt::Display) -> AppError {
    AppError::Instrument(format!("{}: {}", context, err))
}

fn resource_name(address: &str) -> AppResult<VisaString> {
    CString::new(address)
        .map(VisaString::from)
        .map_err(|e| visa_error("Invalid resource string", e))
}

/// Instrument directory backed by the system VISA library.
pub struct VisaDirectory {
    rm: DefaultRM,
    filter: String,
    timeout: Duration,
    /// Line terminator for commands (typically "\n" for SCPI)
    line_terminator: String,
}

impl VisaDirectory {
    /// Opens the default VISA resource manager.
    pub fn new(settings: &DirectorySettings) -> AppResult<Self> {
        let rm = DefaultRM::new().map_err(|e| visa_error("Failed to create VISA resource manager", e))?;
        Ok(Self {
            rm,
            filter: settings.resource_filter.clone(),
            timeout: Duration::from_millis(settings.timeout_ms),
            line_terminator: "\n".to_string(),
        })
    }

    fn open(&self, address: &str) -> AppResult<VisaTransport> {
        let name = resource_name(address)?;
        let instrument = self
            .rm
            .open(&name, AccessMode::NO_LOCK, self.timeout)
            .map_err(|e| visa_error(&format!("Failed to open '{}'", address), e))?;
        Ok(VisaTransport {
            instrument,
            line_terminator: self.line_terminator.clone(),
        })
    }
}

impl InstrumentDirectory for VisaDirectory {
    fn name(&self) -> &str {
        "visa"
    }

    fn list_instruments(&self) -> AppResult<Vec<InstrumentSpec>> {
        let expr = resource_name(&self.filter)?;
        let mut list = self
            .rm
            .find_res_list(&expr)
            .map_err(|e| AppError::Discovery(format!("VISA resource search failed: {}", e)))?;

        let mut instruments = Vec::new();
        while let Some(resource) = list
            .find_next()
            .map_err(|e| AppError::Discovery(format!("VISA resource search failed: {}", e)))?
        {
            let address = resource.to_string();
            match self.open(&address).and_then(|mut t| scpi::identify(&mut t, &address)) {
                Ok(spec) => {
                    debug!(address = %spec.address, model = %spec.model, "Identified instrument");
                    instruments.push(spec);
                }
                Err(e) => warn!(address = %address, error = %e, "Skipping unresponsive resource"),
            }
        }
        info!(count = instruments.len(), "VISA scan complete");
        Ok(instruments)
    }

    fn oscilloscope(&self, address: &str) -> AppResult<Box<dyn Oscilloscope>> {
        let mut transport = self.open(address)?;
        let spec = scpi::identify(&mut transport, address)?;
        if spec.instrument_type != InstrumentType::Oscilloscope {
            return Err(AppError::Instrument(format!(
                "'{}' is a {} ({}), not an oscilloscope",
                address, spec.model, spec.instrument_type
            )));
        }
        Ok(Box::new(ScpiOscilloscope::new(address, transport)))
    }
}

/// SCPI transport over an open VISA session.
pub struct VisaTransport {
    instrument: Instrument,
    line_terminator: String,
}

impl ScpiTransport for VisaTransport {
    fn write(&mut self, command: &str) -> AppResult<()> {
        let line = format!("{}{}", command, self.line_terminator);
        self.instrument
            .write_all(line.as_bytes())
            .map_err(|e| visa_error(&format!("VISA write failed for: {}", command), e))?;
        debug!("VISA command sent: {}", command);
        Ok(())
    }

    fn query(&mut self, command: &str) -> AppResult<String> {
        self.write(command)?;
        let mut response = String::new();
        BufReader::new(&self.instrument)
            .read_line(&mut response)
            .map_err(|e| visa_error(&format!("VISA query failed for: {}", command), e))?;
        let response = response.trim().to_string();
        debug!("VISA query '{}' -> {} bytes", command, response.len());
        Ok(response)
    }
}
