//! Writes finished records to the document store (JSON) and the tabular store (XLSX).
//!
//! Both stores overwrite any previous file for the same city and create their
//! directory on first use. Failures come back as [`PersistError`]; nothing here panics.

use std::{fs, path::{Path, PathBuf}};

pub mod document;
pub mod table;

pub use document::DocumentStore;
pub use table::{TableRow, TableStore, table_rows};

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize record to JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to write spreadsheet: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),
}

fn ensure_dir(dir: &Path) -> Result<(), PersistError> {
    fs::create_dir_all(dir).map_err(|source| PersistError::Io { path: dir.to_path_buf(), source })
}
