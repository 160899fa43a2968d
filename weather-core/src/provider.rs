use crate::{
    WeatherRecord,
    config::{City, ForecastConfig},
    provider::openmeteo::OpenMeteoProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;
use tracing::info;

pub mod openmeteo;

/// Failure of a single forecast fetch. Never retried.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Failed to reach forecast endpoint: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Forecast endpoint returned HTTP {status}: {body}")]
    HttpStatus {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Failed to parse forecast response: {0}")]
    Parse(String),
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Fetch and normalize the forecast for one coordinate pair.
    ///
    /// The returned record has an empty `city`; see [`fetch_city`].
    async fn fetch(&self, latitude: f64, longitude: f64) -> Result<WeatherRecord, FetchError>;
}

/// Construct the forecast provider from its config section.
pub fn provider_from_config(config: &ForecastConfig) -> Result<Box<dyn WeatherProvider>, FetchError> {
    Ok(Box::new(OpenMeteoProvider::new(config.clone())?))
}

/// Fetch the forecast for a city from the lookup table and stamp its name on the record.
pub async fn fetch_city(
    provider: &dyn WeatherProvider,
    city: &City,
) -> Result<WeatherRecord, FetchError> {
    info!(city = %city.name, "Fetching weather data");
    let record = provider.fetch(city.latitude, city.longitude).await?;
    info!(city = %city.name, "Weather data fetched");

    Ok(record.with_city(&city.name))
}
