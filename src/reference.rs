//! The reference table: every known zip code with its county.

use std::collections::{BTreeSet, HashSet};

use crate::error::LoadError;
use crate::provider::ReferenceProvider;
use crate::types::{CountyZip, RawRecord, ZipRecord};

/// Read-only table of zip code records, in provider order
#[derive(Debug, Clone, Default)]
pub struct ReferenceTable {
    records: Vec<ZipRecord>,
}

impl ReferenceTable {
    pub fn new(records: Vec<ZipRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[ZipRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sorted, de-duplicated county identifiers available for selection
    pub fn counties(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|r| r.county_state.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Records whose county identifier is in `selection`, in table order
    pub fn filter<S: AsRef<str>>(&self, selection: &[S]) -> Vec<ZipRecord> {
        let wanted: HashSet<&str> = selection.iter().map(AsRef::as_ref).collect();
        self.records
            .iter()
            .filter(|r| wanted.contains(r.county_state.as_str()))
            .cloned()
            .collect()
    }

    /// Display rows ("County", "Zip Code") for a selection
    pub fn lookup<S: AsRef<str>>(&self, selection: &[S]) -> Vec<CountyZip> {
        self.filter(selection).iter().map(CountyZip::from).collect()
    }
}

/// Fetch all records from `provider` and build the reference table.
///
/// Rows without a county or state are skipped with a warning; they have no
/// county to be selected under. An empty result is an error: callers must
/// report the service as unavailable instead of showing zero counties.
pub fn load_reference(provider: &dyn ReferenceProvider) -> Result<ReferenceTable, LoadError> {
    let raw = provider.fetch_all_records()?;

    let mut records = Vec::with_capacity(raw.len());
    let mut skipped = 0;
    for (index, r) in raw.into_iter().enumerate() {
        match normalize(index, r)? {
            Some(record) => records.push(record),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        tracing::warn!("Skipped {} reference rows without county or state", skipped);
    }
    if records.is_empty() {
        return Err(LoadError::Empty);
    }

    tracing::info!("Loaded {} reference zip codes", records.len());
    Ok(ReferenceTable::new(records))
}

fn normalize(index: usize, raw: RawRecord) -> Result<Option<ZipRecord>, LoadError> {
    if raw.zipcode.trim().is_empty() {
        return Err(LoadError::InvalidRecord {
            index,
            reason: "missing zipcode".to_string(),
        });
    }
    if raw.county.trim().is_empty() || raw.state.trim().is_empty() {
        tracing::debug!("Row {} ({}) has no county or state", index, raw.zipcode);
        return Ok(None);
    }
    Ok(Some(ZipRecord::from(raw)))
}
