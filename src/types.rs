use serde::{Deserialize, Serialize};
use std::fmt;

/// MIME type of the exported archive
pub const ARCHIVE_MIME: &str = "application/zip";

/// Suggested download name for the exported archive
pub const DEFAULT_ARCHIVE_NAME: &str = "county_zip_codes.zip";

/// Record as handed over by a reference provider, before derivation
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawRecord {
    #[serde(alias = "zip", alias = "zip_code")]
    pub zipcode: String,
    pub county: String,
    pub state: String,
}

impl RawRecord {
    pub fn new(
        zipcode: impl Into<String>,
        county: impl Into<String>,
        state: impl Into<String>,
    ) -> Self {
        Self {
            zipcode: zipcode.into(),
            county: county.into(),
            state: state.into(),
        }
    }
}

/// A single zip code with its county, as held in the reference table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZipRecord {
    pub zipcode: String,
    pub county: String,
    pub state: String,
    /// "<county>, <state>"
    pub county_state: String,
}

impl ZipRecord {
    pub fn new(
        zipcode: impl Into<String>,
        county: impl Into<String>,
        state: impl Into<String>,
    ) -> Self {
        let county = county.into();
        let state = state.into();
        Self {
            zipcode: zipcode.into(),
            county_state: county_state(&county, &state),
            county,
            state,
        }
    }
}

impl From<RawRecord> for ZipRecord {
    fn from(raw: RawRecord) -> Self {
        Self::new(raw.zipcode, raw.county, raw.state)
    }
}

impl fmt::Display for ZipRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.zipcode, self.county_state)
    }
}

/// Composite county identifier, e.g. "Los Angeles, California"
pub fn county_state(county: &str, state: &str) -> String {
    format!("{}, {}", county, state)
}

/// One named CSV file inside an exported archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub filename: String,
    pub content: String,
}

/// Display row for a selection: which county a zip code belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountyZip {
    pub county: String,
    pub zip_code: String,
}

impl From<&ZipRecord> for CountyZip {
    fn from(record: &ZipRecord) -> Self {
        Self {
            county: record.county_state.clone(),
            zip_code: record.zipcode.clone(),
        }
    }
}
