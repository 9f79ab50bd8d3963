//! Core library for the `weathercard` CLI.
//!
//! This crate defines:
//! - Configuration & API key handling for the CWB open-data platform
//! - The CWB client with the observation and forecast fetch pipelines
//! - The coordinator that joins both fetches into one display record
//!
//! It is used by `weathercard-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod coordinator;
pub mod model;
pub mod provider;

pub use config::{API_KEY_ENV, Config};
pub use coordinator::{RefreshError, RefreshOutcome, WeatherCoordinator};
pub use model::{DisplayRecord, ForecastRecord, ObservationRecord};
pub use provider::{FetchError, WeatherSource, cwb::CwbProvider};
