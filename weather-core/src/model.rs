use serde::{Deserialize, Serialize};

/// Which shape of forecast a fetch produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ForecastMode {
    /// Keep every hourly entry of the requested day.
    #[default]
    FullDay,
    /// Keep only the hour matching "now" at the forecast location.
    SingleHour,
}

impl ForecastMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ForecastMode::FullDay => "full-day",
            ForecastMode::SingleHour => "single-hour",
        }
    }
}

impl std::fmt::Display for ForecastMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One hour of the forecast series. `None` where the provider sent `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyEntry {
    pub time: String,
    pub temperature_c: Option<f64>,
    pub precipitation_mm: Option<f64>,
    pub wind_speed_ms: Option<f64>,
}

/// Values picked for a single hour.
///
/// `hour_time` is the provider timestamp of the matched hour, or `None` when
/// no hourly entry matched and the current conditions were used instead.
/// Values of a matched hour may be `None` like any [`HourlyEntry`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedHour {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hour_time: Option<String>,
    pub hour_temperature_c: Option<f64>,
    pub hour_precipitation_mm: Option<f64>,
    pub hour_wind_speed_ms: Option<f64>,
}

impl SelectedHour {
    pub fn is_fallback(&self) -> bool {
        self.hour_time.is_none()
    }
}

/// Mode-dependent part of a [`WeatherRecord`], flattened into the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ForecastDetail {
    FullDay { hourly_series: Vec<HourlyEntry> },
    SingleHour(SelectedHour),
}

impl ForecastDetail {
    pub fn mode(&self) -> ForecastMode {
        match self {
            ForecastDetail::FullDay { .. } => ForecastMode::FullDay,
            ForecastDetail::SingleHour(_) => ForecastMode::SingleHour,
        }
    }
}

/// Normalized result of one successful forecast fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    /// Assigned by the caller after the fetch; empty until then.
    pub city: String,
    pub source: String,
    /// Provider timestamp of the current conditions, as returned.
    pub observed_at: String,
    pub latitude: f64,
    pub longitude: f64,
    pub current_temperature_c: f64,
    pub humidity_percent: u8,
    pub current_precipitation_mm: f64,
    pub wind_speed_ms: f64,
    pub weather_code: u8,
    pub daily_max_temperature_c: f64,
    pub daily_min_temperature_c: f64,
    pub daily_total_precipitation_mm: f64,
    #[serde(flatten)]
    pub forecast: ForecastDetail,
    pub is_forecast: bool,
    /// Local wall clock at construction, `%Y-%m-%d %H:%M:%S`.
    pub updated_at: String,
}

impl WeatherRecord {
    /// Stamp the city label. The only mutation a record ever sees.
    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = city.into();
        self
    }

    pub fn mode(&self) -> ForecastMode {
        self.forecast.mode()
    }

    pub fn condition(&self) -> WeatherCondition {
        WeatherCondition::from_wmo_code(self.weather_code)
    }
}

/// Weather condition derived from WMO weather codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherCondition {
    ClearSky,
    MainlyClear,
    PartlyCloudy,
    Overcast,
    Fog,
    Drizzle,
    FreezingDrizzle,
    Rain,
    FreezingRain,
    Snow,
    SnowGrains,
    RainShowers,
    SnowShowers,
    Thunderstorm,
    ThunderstormWithHail,
    Unknown,
}

impl WeatherCondition {
    /// See <https://open-meteo.com/en/docs> for the code table.
    pub const fn from_wmo_code(code: u8) -> Self {
        match code {
            0 => Self::ClearSky,
            1 => Self::MainlyClear,
            2 => Self::PartlyCloudy,
            3 => Self::Overcast,
            45 | 48 => Self::Fog,
            51 | 53 | 55 => Self::Drizzle,
            56 | 57 => Self::FreezingDrizzle,
            61 | 63 | 65 => Self::Rain,
            66 | 67 => Self::FreezingRain,
            71 | 73 | 75 => Self::Snow,
            77 => Self::SnowGrains,
            80..=82 => Self::RainShowers,
            85 | 86 => Self::SnowShowers,
            95 => Self::Thunderstorm,
            96 | 99 => Self::ThunderstormWithHail,
            _ => Self::Unknown,
        }
    }

    pub const fn description(&self) -> &'static str {
        match self {
            Self::ClearSky => "Clear sky",
            Self::MainlyClear => "Mainly clear",
            Self::PartlyCloudy => "Partly cloudy",
            Self::Overcast => "Overcast",
            Self::Fog => "Fog",
            Self::Drizzle => "Drizzle",
            Self::FreezingDrizzle => "Freezing drizzle",
            Self::Rain => "Rain",
            Self::FreezingRain => "Freezing rain",
            Self::Snow => "Snow",
            Self::SnowGrains => "Snow grains",
            Self::RainShowers => "Rain showers",
            Self::SnowShowers => "Snow showers",
            Self::Thunderstorm => "Thunderstorm",
            Self::ThunderstormWithHail => "Thunderstorm with hail",
            Self::Unknown => "Unknown",
        }
    }

    pub const fn emoji(&self) -> &'static str {
        match self {
            Self::ClearSky => "☀️",
            Self::MainlyClear => "🌤️",
            Self::PartlyCloudy => "⛅",
            Self::Overcast => "☁️",
            Self::Fog => "🌫️",
            Self::Drizzle | Self::Rain | Self::RainShowers => "🌧️",
            Self::FreezingDrizzle | Self::FreezingRain => "🌨️",
            Self::Snow | Self::SnowGrains | Self::SnowShowers => "❄️",
            Self::Thunderstorm | Self::ThunderstormWithHail => "⛈️",
            Self::Unknown => "❓",
        }
    }
}

impl std::fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}
