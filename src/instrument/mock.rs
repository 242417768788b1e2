//! A simulated instrument bench that generates synthetic waveforms.
//!
//! The mock directory answers discovery with a fixed list of instruments and hands
//! out oscilloscopes that produce a noisy sine per channel. Every request it serves is
//! recorded in a [`RequestLog`], which lets the UI wiring be checked without hardware.
use crate::config::DirectorySettings;
use crate::error::{AppError, AppResult};
use crate::instrument::{InstrumentDirectory, InstrumentSpec, InstrumentType, Oscilloscope, Waveform};
use rand::Rng;
use std::cell::RefCell;
use std::collections::HashSet;
use std::f64::consts::PI;
use std::rc::Rc;
use tracing::{debug, info};

/// Samples per simulated trace.
pub const DEFAULT_SAMPLES: usize = 1200;

/// Time span of one simulated trace, in seconds.
const TRACE_SPAN_S: f64 = 2e-3;

/// Requests served by a [`MockDirectory`] and the scopes it opened.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestLog {
    /// Number of `list_instruments` calls
    pub scans: usize,
    /// Addresses passed to `oscilloscope`, in order
    pub opened: Vec<String>,
    /// `(address, channel)` of every waveform download
    pub waveforms: Vec<(String, u8)>,
}

pub struct MockDirectory {
    bench: Vec<InstrumentSpec>,
    offline: HashSet<String>,
    discovery_error: Option<String>,
    samples: usize,
    log: Rc<RefCell<RequestLog>>,
}

impl MockDirectory {
    pub fn new(bench: Vec<InstrumentSpec>) -> Self {
        Self {
            bench,
            offline: HashSet::new(),
            discovery_error: None,
            samples: DEFAULT_SAMPLES,
            log: Rc::new(RefCell::new(RequestLog::default())),
        }
    }

    /// Builds the bench described by the `directory` configuration section.
    pub fn from_settings(settings: &DirectorySettings) -> AppResult<Self> {
        let bench = settings
            .mock_instruments
            .iter()
            .map(|inst| {
                Ok(InstrumentSpec::new(
                    inst.address.clone(),
                    inst.make.clone(),
                    inst.model.clone(),
                    inst.instrument_type.parse::<InstrumentType>()?,
                ))
            })
            .collect::<AppResult<Vec<_>>>()?;

        let mut directory = Self::new(bench);
        for address in &settings.mock_offline {
            directory = directory.with_offline(address.clone());
        }
        if let Some(message) = &settings.mock_discovery_error {
            directory = directory.with_discovery_error(message.clone());
        }
        Ok(directory)
    }

    /// Lists `address` during discovery but refuses connections to it.
    pub fn with_offline(mut self, address: impl Into<String>) -> Self {
        self.offline.insert(address.into());
        self
    }

    /// Makes every scan fail with `message`.
    pub fn with_discovery_error(mut self, message: impl Into<String>) -> Self {
        self.discovery_error = Some(message.into());
        self
    }

    pub fn with_samples(mut self, samples: usize) -> Self {
        self.samples = samples;
        self
    }

    /// Snapshot of the requests served so far.
    pub fn requests(&self) -> RequestLog {
        self.log.borrow().clone()
    }

    /// Shared handle to the live request log.
    pub fn request_log(&self) -> Rc<RefCell<RequestLog>> {
        self.log.clone()
    }
}

impl InstrumentDirectory for MockDirectory {
    fn name(&self) -> &str {
        "mock"
    }

    fn list_instruments(&self) -> AppResult<Vec<InstrumentSpec>> {
        self.log.borrow_mut().scans += 1;
        if let Some(message) = &self.discovery_error {
            return Err(AppError::Discovery(message.clone()));
        }
        debug!(count = self.bench.len(), "Mock bench scanned");
        Ok(self.bench.clone())
    }

    fn oscilloscope(&self, address: &str) -> AppResult<Box<dyn Oscilloscope>> {
        self.log.borrow_mut().opened.push(address.to_string());

        let spec = self
            .bench
            .iter()
            .find(|spec| spec.address == address)
            .ok_or_else(|| AppError::Instrument(format!("No instrument at '{}'", address)))?;

        if self.offline.contains(address) {
            return Err(AppError::Instrument(format!(
                "'{}' is not responding",
                address
            )));
        }

        if spec.instrument_type != InstrumentType::Oscilloscope {
            return Err(AppError::Instrument(format!(
                "'{}' is a {} ({}), not an oscilloscope",
                address, spec.model, spec.instrument_type
            )));
        }

        info!(address, "Connected to mock oscilloscope");
        Ok(Box::new(MockOscilloscope {
            address: address.to_string(),
            samples: self.samples,
            log: self.log.clone(),
        }))
    }
}

/// Oscilloscope handle produced by [`MockDirectory`].
pub struct MockOscilloscope {
    address: String,
    samples: usize,
    log: Rc<RefCell<RequestLog>>,
}

impl Oscilloscope for MockOscilloscope {
    fn address(&self) -> &str {
        &self.address
    }

    fn fetch_waveform(&mut self, channel: u8) -> AppResult<Waveform> {
        self.log
            .borrow_mut()
            .waveforms
            .push((self.address.clone(), channel));

        let x_increment = TRACE_SPAN_S / self.samples.max(1) as f64;
        let frequency = 1_000.0 * f64::from(channel);
        let amplitude = 0.5 + 0.25 * f64::from(channel.saturating_sub(1));
        let x_reference = (self.samples / 2) as f64;

        let mut rng = rand::thread_rng();
        let samples = (0..self.samples)
            .map(|i| {
                let t = (i as f64 - x_reference) * x_increment;
                let noise: f64 = rng.gen_range(-0.02..0.02);
                amplitude * (2.0 * PI * frequency * t).sin() + noise
            })
            .collect();

        Ok(Waveform::new(self.address.clone(), channel, x_increment, samples)
            .with_origin(0.0, x_reference))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bench() -> Vec<InstrumentSpec> {
        vec![
            InstrumentSpec::new("USB0::1", "Acme", "X1", InstrumentType::Oscilloscope),
            InstrumentSpec::new("GPIB0::22::INSTR", "Keithley", "2000", InstrumentType::Multimeter),
        ]
    }

    #[test]
    fn scans_are_counted() {
        let directory = MockDirectory::new(bench());
        assert_eq!(directory.list_instruments().unwrap().len(), 2);
        assert_eq!(directory.list_instruments().unwrap().len(), 2);
        assert_eq!(directory.requests().scans, 2);
    }

    #[test]
    fn discovery_error_is_reported() {
        let directory = MockDirectory::new(bench()).with_discovery_error("bus fault");
        assert!(matches!(
            directory.list_instruments(),
            Err(AppError::Discovery(msg)) if msg == "bus fault"
        ));
    }

    #[test]
    fn waveform_has_requested_length_and_channel() {
        let directory = MockDirectory::new(bench()).with_samples(100);
        let mut scope = directory.oscilloscope("USB0::1").unwrap();
        let waveform = scope.channel(2).unwrap().get_waveform().unwrap();
        assert_eq!(waveform.len(), 100);
        assert_eq!(waveform.channel, 2);
        let (lo, hi) = waveform.min_max().unwrap();
        assert!(lo >= -1.0 && hi <= 1.0);
        assert_eq!(
            directory.requests().waveforms,
            vec![("USB0::1".to_string(), 2)]
        );
    }

    #[test]
    fn non_scope_and_unknown_addresses_are_refused() {
        let directory = MockDirectory::new(bench()).with_offline("USB0::1");
        assert!(directory.oscilloscope("GPIB0::22::INSTR").is_err());
        assert!(directory.oscilloscope("USB0::404").is_err());
        assert!(directory.oscilloscope("USB0::1").is_err());
        assert_eq!(directory.requests().opened.len(), 3);
    }

    #[test]
    fn from_settings_uses_configured_bench() {
        let settings = DirectorySettings::default();
        let directory = MockDirectory::from_settings(&settings).unwrap();
        let instruments = directory.list_instruments().unwrap();
        assert_eq!(instruments.len(), settings.mock_instruments.len());
        assert_eq!(instruments[0].instrument_type, InstrumentType::Oscilloscope);
    }
}
