//! # Mini Scope
//!
//! A small desktop front end for laboratory oscilloscopes. It scans the instrument bus,
//! lists what it finds in a table and opens a control window per oscilloscope from which
//! a single channel's waveform can be downloaded and plotted.
//!
//! ## Crate Structure
//!
//! - **`app`**: The `App` state, the instrument list of the most recent scan.
//! - **`config`**: Layered `figment` configuration. See `config::Settings`.
//! - **`error`**: The crate-wide `AppError` enum and `AppResult` alias.
//! - **`gui`**: The `eframe`/`egui` windows: main window with the instrument table, scope
//!   control windows, waveform plots and toast notifications.
//! - **`instrument`**: The `InstrumentDirectory` and `Oscilloscope` traits with a mock bench
//!   and, behind the `instrument_visa` feature, a VISA/SCPI backend.
//! - **`logging`**: `tracing-subscriber` initialisation.

pub mod app;
pub mod config;
pub mod error;
pub mod gui;
pub mod instrument;
pub mod logging;
