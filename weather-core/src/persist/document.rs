use std::{fs, path::PathBuf};

use tracing::info;

use crate::model::WeatherRecord;

use super::{PersistError, ensure_dir};

/// One pretty-printed JSON file per city.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    dir: PathBuf,
}

impl DocumentStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, city: &str) -> PathBuf {
        self.dir.join(format!("{city}.json"))
    }

    /// Serialize the whole record to `{dir}/{city}.json`, replacing any previous file.
    pub fn save(&self, record: &WeatherRecord, city: &str) -> Result<PathBuf, PersistError> {
        ensure_dir(&self.dir)?;

        let path = self.path_for(city);
        let json = serde_json::to_string_pretty(record)?;

        fs::write(&path, json).map_err(|source| PersistError::Io { path: path.clone(), source })?;

        info!(path = %path.display(), "Saved JSON document");
        Ok(path)
    }
}
