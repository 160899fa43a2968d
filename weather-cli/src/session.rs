use tracing::{error, warn};
use weather_core::{
    City, Config, DocumentStore, TableStore, WeatherProvider, fetch_city, provider_from_config,
};

use crate::display;

/// Provider and stores reused for every city of a run.
#[derive(Debug)]
pub struct Session {
    provider: Box<dyn WeatherProvider>,
    documents: DocumentStore,
    tables: TableStore,
}

impl Session {
    pub fn new(
        provider: Box<dyn WeatherProvider>,
        documents: DocumentStore,
        tables: TableStore,
    ) -> Self {
        Self { provider, documents, tables }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let provider = provider_from_config(&config.forecast)?;

        Ok(Self::new(
            provider,
            DocumentStore::new(&config.output.document_dir),
            TableStore::new(&config.output.table_dir),
        ))
    }

    /// Fetch, show and save one city. Returns whether the fetch succeeded;
    /// save failures are reported but do not change the outcome.
    pub async fn process_city(&self, city: &City) -> bool {
        let record = match fetch_city(self.provider.as_ref(), city).await {
            Ok(record) => record,
            Err(e) => {
                error!(city = %city.name, error = %e, "Fetch failed");
                println!("❌ Could not fetch data for {}: {e}\n", city.name);
                return false;
            }
        };

        println!("{}", display::render(&record));

        match self.documents.save(&record, &city.name) {
            Ok(path) => println!("💾 Saved {}", path.display()),
            Err(e) => {
                warn!(city = %city.name, error = %e, "JSON save failed");
                println!("❌ Failed to save JSON file: {e}");
            }
        }

        match self.tables.save(&record, &city.name) {
            Ok(path) => println!("💾 Saved {}", path.display()),
            Err(e) => {
                warn!(city = %city.name, error = %e, "Spreadsheet save failed");
                println!("❌ Failed to save Excel file: {e}");
            }
        }

        println!("✅ Finished {}\n", city.name);
        true
    }

    /// Process cities one after another. Returns how many were fetched.
    pub async fn process(&self, cities: &[City]) -> usize {
        let mut done = 0;
        for city in cities {
            if self.process_city(city).await {
                done += 1;
            }
        }
        done
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use weather_core::{FetchError, ForecastDetail, HourlyEntry, WeatherRecord};

    /// Fails for any latitude below zero.
    #[derive(Debug)]
    struct StubProvider;

    #[async_trait]
    impl WeatherProvider for StubProvider {
        async fn fetch(&self, latitude: f64, longitude: f64) -> Result<WeatherRecord, FetchError> {
            if latitude < 0.0 {
                return Err(FetchError::Parse("missing field `daily`".into()));
            }
            Ok(WeatherRecord {
                city: String::new(),
                source: "stub".into(),
                observed_at: "2025-06-01T09:00".into(),
                latitude,
                longitude,
                current_temperature_c: 29.0,
                humidity_percent: 70,
                current_precipitation_mm: 0.0,
                wind_speed_ms: 1.8,
                weather_code: 1,
                daily_max_temperature_c: 32.0,
                daily_min_temperature_c: 25.0,
                daily_total_precipitation_mm: 0.0,
                forecast: ForecastDetail::FullDay {
                    hourly_series: vec![HourlyEntry {
                        time: "2025-06-01T09:00".into(),
                        temperature_c: Some(29.0),
                        precipitation_mm: Some(0.0),
                        wind_speed_ms: Some(1.8),
                    }],
                },
                is_forecast: true,
                updated_at: "2025-06-01 09:12:00".into(),
            })
        }
    }

    fn session(dir: &std::path::Path) -> Session {
        Session::new(
            Box::new(StubProvider),
            DocumentStore::new(dir.join("datatypejs")),
            TableStore::new(dir.join("datatypexlsx")),
        )
    }

    #[tokio::test]
    async fn failed_city_does_not_stop_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let cities = [
            City::new("Nowhere", -1.0, 0.0),
            City::new("Hà Nội", 21.0278, 105.8342),
        ];

        let done = session(dir.path()).process(&cities).await;

        assert_eq!(done, 1);
        assert!(dir.path().join("datatypejs").join("Hà Nội.json").exists());
        assert!(dir.path().join("datatypexlsx").join("Hà Nội_24h.xlsx").exists());
        assert!(!dir.path().join("datatypejs").join("Nowhere.json").exists());
    }

    #[tokio::test]
    async fn save_failure_still_counts_as_fetched() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocked");
        std::fs::write(&blocker, "file, not a directory").unwrap();

        let session = Session::new(
            Box::new(StubProvider),
            DocumentStore::new(&blocker),
            TableStore::new(dir.path().join("datatypexlsx")),
        );

        assert!(session.process_city(&City::new("Huế", 16.4637, 107.5909)).await);
        assert!(dir.path().join("datatypexlsx").join("Huế_24h.xlsx").exists());
    }

    #[test]
    fn builds_from_default_config() {
        assert!(Session::from_config(&Config::default()).is_ok());
    }
}
