//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - Configuration: forecast settings, output directories, the city lookup table
//! - The Open-Meteo forecast fetcher and its normalization into [`WeatherRecord`]
//! - Persistence of records as JSON documents and XLSX spreadsheets
//!
//! It is used by `weather-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod model;
pub mod persist;
pub mod provider;

pub use config::{City, Config, ForecastConfig, OutputConfig};
pub use model::{
    ForecastDetail, ForecastMode, HourlyEntry, SelectedHour, WeatherCondition, WeatherRecord,
};
pub use persist::{DocumentStore, PersistError, TableStore};
pub use provider::{FetchError, WeatherProvider, fetch_city, provider_from_config};
