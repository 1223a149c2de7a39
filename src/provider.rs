//! Sources of raw zip code reference data.

use std::env;
use std::path::{Path, PathBuf};

use crate::error::LoadError;
use crate::types::RawRecord;

/// Reference file used when `REFERENCE_CSV` is not set
pub const DEFAULT_REFERENCE_PATH: &str = "data/zip_county.csv";

/// Narrow interface to wherever the reference records come from.
///
/// Implementations return every known record, unfiltered.
pub trait ReferenceProvider: Send + Sync {
    fn fetch_all_records(&self) -> Result<Vec<RawRecord>, LoadError>;
}

/// Provider reading a zip/county crosswalk from a CSV file.
///
/// The file needs `zipcode`, `county` and `state` columns (`zip` and
/// `zip_code` are accepted for the first). Extra columns are ignored and
/// zip codes are read as text, so leading zeros survive.
#[derive(Debug, Clone)]
pub struct CsvFileProvider {
    path: PathBuf,
}

impl CsvFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path from `REFERENCE_CSV`, falling back to [`DEFAULT_REFERENCE_PATH`]
    pub fn from_env() -> Self {
        Self::new(env::var("REFERENCE_CSV").unwrap_or_else(|_| DEFAULT_REFERENCE_PATH.into()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReferenceProvider for CsvFileProvider {
    fn fetch_all_records(&self) -> Result<Vec<RawRecord>, LoadError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(|e| {
                LoadError::Provider(format!("cannot open {}: {}", self.path.display(), e))
            })?;

        let records = reader
            .deserialize::<RawRecord>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| LoadError::Provider(format!("{}: {}", self.path.display(), e)))?;

        tracing::debug!(
            "Read {} reference rows from {}",
            records.len(),
            self.path.display()
        );
        Ok(records)
    }
}

/// Fixed in-memory provider, used for fixtures and offline runs
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    records: Vec<RawRecord>,
}

impl StaticProvider {
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self { records }
    }
}

impl ReferenceProvider for StaticProvider {
    fn fetch_all_records(&self) -> Result<Vec<RawRecord>, LoadError> {
        Ok(self.records.clone())
    }
}
