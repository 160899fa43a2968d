use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Local, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::{
    config::ForecastConfig,
    model::{ForecastDetail, ForecastMode, HourlyEntry, SelectedHour, WeatherRecord},
};

use super::{FetchError, WeatherProvider};

/// Provider label stored in every record.
pub const SOURCE: &str = "NASA GMAO Model via Open-Meteo";

const CURRENT_FIELDS: &str =
    "temperature_2m,relative_humidity_2m,precipitation,wind_speed_10m,weather_code";
const HOURLY_FIELDS: &str = "temperature_2m,precipitation,wind_speed_10m";
const DAILY_FIELDS: &str = "temperature_2m_max,temperature_2m_min,precipitation_sum";

/// Matches the provider's hourly `time` strings, e.g. `2025-06-01T14:00`.
const HOUR_FORMAT: &str = "%Y-%m-%dT%H:00";
const UPDATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    config: ForecastConfig,
    http: Client,
}

impl OpenMeteoProvider {
    /// Build the provider and its reusable HTTP session.
    pub fn new(config: ForecastConfig) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self { config, http })
    }

    fn forecast_url(&self) -> String {
        format!("{}/forecast", self.config.base_url.trim_end_matches('/'))
    }

    fn query(latitude: f64, longitude: f64) -> Vec<(&'static str, String)> {
        vec![
            ("latitude", latitude.to_string()),
            ("longitude", longitude.to_string()),
            ("current", CURRENT_FIELDS.to_string()),
            ("hourly", HOURLY_FIELDS.to_string()),
            ("daily", DAILY_FIELDS.to_string()),
            ("wind_speed_unit", "ms".to_string()),
            ("timezone", "auto".to_string()),
            ("forecast_days", "1".to_string()),
        ]
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoProvider {
    #[instrument(skip(self), fields(mode = %self.config.mode))]
    async fn fetch(&self, latitude: f64, longitude: f64) -> Result<WeatherRecord, FetchError> {
        let url = self.forecast_url();
        debug!(url = %url, "Sending forecast request");

        let res = self
            .http
            .get(&url)
            .query(&Self::query(latitude, longitude))
            .send()
            .await
            .map_err(FetchError::Network)?;

        let status = res.status();
        debug!(%status, "Received forecast response");

        if status != StatusCode::OK {
            // The body only decorates the message; a failed read must not hide the status.
            let body = res.text().await.unwrap_or_default();
            return Err(FetchError::HttpStatus { status, body: truncate_body(&body) });
        }

        let body = res.text().await.map_err(FetchError::Network)?;

        debug!(bytes = body.len(), "Parsing forecast body");
        parse_forecast(&body, latitude, longitude, self.config.mode, Utc::now())
    }
}

#[derive(Debug, Deserialize)]
struct OmCurrent {
    time: String,
    temperature_2m: f64,
    relative_humidity_2m: u8,
    precipitation: f64,
    wind_speed_10m: f64,
    weather_code: u8,
}

/// Values are `null` for hours the model can't fill.
#[derive(Debug, Deserialize)]
struct OmHourly {
    time: Vec<String>,
    temperature_2m: Vec<Option<f64>>,
    precipitation: Vec<Option<f64>>,
    wind_speed_10m: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct OmDaily {
    temperature_2m_max: Vec<f64>,
    temperature_2m_min: Vec<f64>,
    precipitation_sum: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct OmResponse {
    /// Offset of the location's local time, present with `timezone=auto`.
    #[serde(default)]
    utc_offset_seconds: Option<i32>,
    current: OmCurrent,
    hourly: OmHourly,
    daily: OmDaily,
}

/// Turn a forecast response body into a record.
///
/// `now` drives both `updated_at` and the single-hour lookup. Coordinates are
/// echoed from the caller, never taken from the response.
pub fn parse_forecast(
    body: &str,
    latitude: f64,
    longitude: f64,
    mode: ForecastMode,
    now: DateTime<Utc>,
) -> Result<WeatherRecord, FetchError> {
    let parsed: OmResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Parse(e.to_string()))?;

    let hourly = &parsed.hourly;
    check_series_len("temperature_2m", hourly.temperature_2m.len(), hourly.time.len())?;
    check_series_len("precipitation", hourly.precipitation.len(), hourly.time.len())?;
    check_series_len("wind_speed_10m", hourly.wind_speed_10m.len(), hourly.time.len())?;

    let daily_max = first_daily("temperature_2m_max", &parsed.daily.temperature_2m_max)?;
    let daily_min = first_daily("temperature_2m_min", &parsed.daily.temperature_2m_min)?;
    let daily_precipitation = first_daily("precipitation_sum", &parsed.daily.precipitation_sum)?;

    let forecast = match mode {
        ForecastMode::FullDay => ForecastDetail::FullDay { hourly_series: hourly_series(hourly) },
        ForecastMode::SingleHour => {
            let wanted = reference_hour(parsed.utc_offset_seconds, now);
            ForecastDetail::SingleHour(select_hour(hourly, &parsed.current, &wanted))
        }
    };

    let current = parsed.current;

    Ok(WeatherRecord {
        city: String::new(),
        source: SOURCE.to_string(),
        observed_at: current.time,
        latitude,
        longitude,
        current_temperature_c: current.temperature_2m,
        humidity_percent: current.relative_humidity_2m,
        current_precipitation_mm: current.precipitation,
        wind_speed_ms: current.wind_speed_10m,
        weather_code: current.weather_code,
        daily_max_temperature_c: daily_max,
        daily_min_temperature_c: daily_min,
        daily_total_precipitation_mm: daily_precipitation,
        forecast,
        is_forecast: true,
        updated_at: now.with_timezone(&Local).format(UPDATED_AT_FORMAT).to_string(),
    })
}

fn check_series_len(field: &str, len: usize, expected: usize) -> Result<(), FetchError> {
    if len != expected {
        return Err(FetchError::Parse(format!(
            "hourly `{field}` has {len} entries, expected {expected}"
        )));
    }
    Ok(())
}

fn first_daily(field: &str, values: &[f64]) -> Result<f64, FetchError> {
    values
        .first()
        .copied()
        .ok_or_else(|| FetchError::Parse(format!("daily `{field}` is empty")))
}

fn hourly_series(hourly: &OmHourly) -> Vec<HourlyEntry> {
    hourly
        .time
        .iter()
        .enumerate()
        .map(|(i, time)| HourlyEntry {
            time: time.clone(),
            temperature_c: hourly.temperature_2m[i],
            precipitation_mm: hourly.precipitation[i],
            wind_speed_ms: hourly.wind_speed_10m[i],
        })
        .collect()
}

/// The hour string to look up, in the forecast location's local time when the
/// provider reports its offset, otherwise in this machine's local time.
fn reference_hour(utc_offset_seconds: Option<i32>, now: DateTime<Utc>) -> String {
    match utc_offset_seconds.and_then(FixedOffset::east_opt) {
        Some(offset) => now.with_timezone(&offset).format(HOUR_FORMAT).to_string(),
        None => now.with_timezone(&Local).format(HOUR_FORMAT).to_string(),
    }
}

fn select_hour(hourly: &OmHourly, current: &OmCurrent, wanted: &str) -> SelectedHour {
    match hourly.time.iter().position(|t| t == wanted) {
        Some(i) => SelectedHour {
            hour_time: Some(hourly.time[i].clone()),
            hour_temperature_c: hourly.temperature_2m[i],
            hour_precipitation_mm: hourly.precipitation[i],
            hour_wind_speed_ms: hourly.wind_speed_10m[i],
        },
        None => {
            warn!(hour = wanted, "Hour not in hourly series, using current conditions");
            SelectedHour {
                hour_time: None,
                hour_temperature_c: Some(current.temperature_2m),
                hour_precipitation_mm: Some(current.precipitation),
                hour_wind_speed_ms: Some(current.wind_speed_10m),
            }
        }
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}
