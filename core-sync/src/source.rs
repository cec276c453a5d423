//! Creator input sources

use crate::error::{Result, SyncError};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Ordered creator usernames; `None` marks a row without a usable cell
pub trait CreatorSource {
    fn usernames(&self) -> Result<Vec<Option<String>>>;
}

/// Reads one named column from a CSV export of the creator spreadsheet
#[derive(Debug, Clone)]
pub struct CsvCreatorSource {
    path: PathBuf,
    column: String,
}

impl CsvCreatorSource {
    pub fn new(path: impl Into<PathBuf>, column: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            column: column.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_from<R: Read>(&self, reader: R) -> Result<Vec<Option<String>>> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| SyncError::Input(format!("Cannot read CSV header: {}", e)))?
            .clone();

        // Spreadsheet exports often carry a BOM on the first header
        let index = headers
            .iter()
            .position(|header| header.trim_start_matches('\u{feff}').trim() == self.column)
            .ok_or_else(|| {
                SyncError::Input(format!(
                    "Column '{}' not found; available columns: {}",
                    self.column,
                    headers.iter().collect::<Vec<_>>().join(", ")
                ))
            })?;

        let mut usernames = Vec::new();
        for (line, record) in csv_reader.records().enumerate() {
            let record = record.map_err(|e| {
                SyncError::Input(format!("Malformed CSV row {}: {}", line + 2, e))
            })?;
            let cell = record
                .get(index)
                .map(str::trim)
                .filter(|cell| !cell.is_empty())
                .map(str::to_string);
            usernames.push(cell);
        }

        debug!(rows = usernames.len(), column = %self.column, "Creator input read");
        Ok(usernames)
    }
}

impl CreatorSource for CsvCreatorSource {
    fn usernames(&self) -> Result<Vec<Option<String>>> {
        let file = std::fs::File::open(&self.path).map_err(|e| {
            SyncError::Input(format!("Cannot open {}: {}", self.path.display(), e))
        })?;
        self.read_from(file)
    }
}
