//! Waveform records downloaded from an oscilloscope channel.

use chrono::{DateTime, Local};

/// One acquired trace. Samples are in volts, evenly spaced in time.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    pub address: String,
    pub channel: u8,
    /// Seconds between consecutive samples
    pub x_increment: f64,
    /// Time of the reference sample, in seconds
    pub x_origin: f64,
    /// Index of the reference sample
    pub x_reference: f64,
    pub samples: Vec<f64>,
    pub acquired_at: DateTime<Local>,
}

impl Waveform {
    pub fn new(address: impl Into<String>, channel: u8, x_increment: f64, samples: Vec<f64>) -> Self {
        Self {
            address: address.into(),
            channel,
            x_increment,
            x_origin: 0.0,
            x_reference: 0.0,
            samples,
            acquired_at: Local::now(),
        }
    }

    pub fn with_origin(mut self, x_origin: f64, x_reference: f64) -> Self {
        self.x_origin = x_origin;
        self.x_reference = x_reference;
        self
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Time of sample `index`, in seconds.
    pub fn time_at(&self, index: usize) -> f64 {
        (index as f64 - self.x_reference) * self.x_increment + self.x_origin
    }

    /// `[time, volts]` pairs ready for plotting.
    pub fn points(&self) -> Vec<[f64; 2]> {
        self.samples
            .iter()
            .enumerate()
            .map(|(i, &v)| [self.time_at(i), v])
            .collect()
    }

    /// Minimum and maximum sample, or `None` for an empty trace.
    pub fn min_max(&self) -> Option<(f64, f64)> {
        self.samples.iter().fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }

    /// Short label used for window titles and plot legends.
    pub fn label(&self) -> String {
        format!("{} CH{}", self.address, self.channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_use_origin_and_reference() {
        let wf = Waveform::new("USB0::1", 2, 0.5, vec![1.0, 2.0, 3.0]).with_origin(-1.0, 1.0);
        assert_eq!(wf.points(), vec![[-1.5, 1.0], [-1.0, 2.0], [-0.5, 3.0]]);
    }

    #[test]
    fn min_max_of_empty_trace() {
        let wf = Waveform::new("USB0::1", 1, 1e-6, Vec::new());
        assert!(wf.is_empty());
        assert_eq!(wf.min_max(), None);
    }

    #[test]
    fn min_max_and_label() {
        let wf = Waveform::new("USB0::1", 4, 1e-6, vec![0.2, -0.7, 0.9]);
        assert_eq!(wf.min_max(), Some((-0.7, 0.9)));
        assert_eq!(wf.label(), "USB0::1 CH4");
    }
}
