//! The core application state.
use crate::instrument::InstrumentSpec;

/// Instruments found by the most recent scan.
///
/// Owned by one main window. The list is only ever cleared or replaced as a whole so
/// it always mirrors exactly one scan result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct App {
    instruments: Vec<InstrumentSpec>,
}

impl App {
    /// Creates an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// The instrument shown in `row`, if the row exists.
    pub fn instrument(&self, row: usize) -> Option<&InstrumentSpec> {
        self.instruments.get(row)
    }

    /// Number of rows in the current scan.
    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }

    /// Forgets the previous scan.
    pub fn clear(&mut self) {
        self.instruments.clear();
    }

    /// Replaces the whole list with a new scan result.
    pub fn replace(&mut self, instruments: Vec<InstrumentSpec>) {
        self.instruments = instruments;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instrument::InstrumentType;

    #[test]
    fn replace_discards_previous_scan() {
        let mut app = App::new();
        app.replace(vec![
            InstrumentSpec::new("A", "m", "x", InstrumentType::Oscilloscope),
            InstrumentSpec::new("B", "m", "y", InstrumentType::Multimeter),
        ]);
        app.replace(vec![InstrumentSpec::new("C", "m", "z", InstrumentType::Unknown)]);
        assert_eq!(app.len(), 1);
        assert_eq!(app.instrument(0).unwrap().address, "C");
        assert!(app.instrument(1).is_none());
    }
}
