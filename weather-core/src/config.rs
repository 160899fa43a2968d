use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::model::ForecastMode;

/// Settings handed to the forecast provider at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// API base, without the trailing `/forecast`.
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub mode: ForecastMode,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.open-meteo.com/v1".to_string(),
            timeout_secs: 30,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string(),
            mode: ForecastMode::default(),
        }
    }
}

/// Where the document and tabular stores live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub document_dir: PathBuf,
    pub table_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            document_dir: PathBuf::from("datatypejs"),
            table_dir: PathBuf::from("datatypexlsx"),
        }
    }
}

/// An entry of the city lookup table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl City {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self { name: name.into(), latitude, longitude }
    }
}

fn default_cities() -> Vec<City> {
    vec![
        City::new("Ninh Bình", 20.2506, 105.9745),
        City::new("Hồ Chí Minh", 10.8231, 106.6297),
        City::new("Hà Nội", 21.0278, 105.8342),
    ]
}

/// Top-level configuration stored on disk.
///
/// Every section is optional in the file; missing ones take their defaults.
///
/// Example TOML:
/// [forecast]
/// mode = "single-hour"
///
/// [[cities]]
/// name = "Hà Nội"
/// latitude = 21.0278
/// longitude = 105.8342
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub forecast: ForecastConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default = "default_cities")]
    pub cities: Vec<City>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            forecast: ForecastConfig::default(),
            output: OutputConfig::default(),
            cities: default_cities(),
        }
    }
}

impl Config {
    /// Load config from the platform config directory, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load config from an explicit file. Unlike [`Config::load`], a missing file is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        if cfg.cities.is_empty() {
            return Err(anyhow!(
                "Config file {} defines no cities.\n\
                 Hint: remove the `cities` entries to fall back to the built-in table.",
                path.display()
            ));
        }

        Ok(cfg)
    }

    /// Save config to the platform config directory, returning the path written.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-task", "weather-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Zero-based lookup into the city table.
    pub fn city(&self, index: usize) -> Option<&City> {
        self.cities.get(index)
    }

    /// Case-insensitive lookup by city name.
    pub fn city_by_name(&self, name: &str) -> Option<&City> {
        let wanted = name.trim().to_lowercase();
        self.cities.iter().find(|c| c.name.to_lowercase() == wanted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_builtin_table() {
        let cfg = Config::default();

        assert_eq!(cfg.cities.len(), 3);
        assert_eq!(cfg.cities[0].name, "Ninh Bình");
        assert_eq!(cfg.forecast.timeout_secs, 30);
        assert_eq!(cfg.forecast.mode, ForecastMode::FullDay);
        assert_eq!(cfg.output.document_dir, PathBuf::from("datatypejs"));
        assert_eq!(cfg.output.table_dir, PathBuf::from("datatypexlsx"));
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            [forecast]
            mode = "single-hour"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.forecast.mode, ForecastMode::SingleHour);
        assert_eq!(cfg.forecast.base_url, "https://api.open-meteo.com/v1");
        assert_eq!(cfg.cities, default_cities());
        assert_eq!(cfg.output, OutputConfig::default());
    }

    #[test]
    fn city_lookup_by_index_and_name() {
        let cfg = Config::default();

        assert_eq!(cfg.city(2).map(|c| c.name.as_str()), Some("Hà Nội"));
        assert!(cfg.city(3).is_none());
        assert_eq!(cfg.city_by_name("  hồ chí minh ").map(|c| c.latitude), Some(10.8231));
        assert!(cfg.city_by_name("Đà Nẵng").is_none());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.forecast.mode = ForecastMode::SingleHour;
        cfg.cities.push(City::new("Huế", 16.4637, 107.5909));

        cfg.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();

        assert_eq!(loaded, cfg);
    }

    #[test]
    fn load_from_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load_from(&dir.path().join("absent.toml")).unwrap_err();

        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn empty_city_table_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "cities = []\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("defines no cities"));
    }
}
