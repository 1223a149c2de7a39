//! Per-county CSV export packaged as an in-memory zip archive.

use std::collections::{BTreeMap, HashMap};
use std::io::{Cursor, Write};

use chrono::{Local, NaiveDateTime};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::ArchiveError;
use crate::types::{ArchiveEntry, ZipRecord};

/// Format of the timestamp appended to every entry name
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Header of the single CSV column
pub const CSV_HEADER: &str = "zipcode";

/// Build an archive with one CSV per county, stamped with the current local time.
pub fn build_archive(records: &[ZipRecord]) -> Result<Vec<u8>, ArchiveError> {
    build_archive_at(records, Local::now().naive_local())
}

/// Build an archive with one CSV per county, stamped with `timestamp`.
///
/// Returns the finished zip bytes. Empty input yields a valid archive with no
/// entries. On error nothing is returned, never a truncated archive.
pub fn build_archive_at(
    records: &[ZipRecord],
    timestamp: NaiveDateTime,
) -> Result<Vec<u8>, ArchiveError> {
    let entries = archive_entries(records, timestamp)?;

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in &entries {
        zip.start_file(entry.filename.as_str(), options)?;
        zip.write_all(entry.content.as_bytes())?;
    }

    let bytes = zip.finish()?.into_inner();
    tracing::info!(
        "Built archive with {} entries ({} bytes)",
        entries.len(),
        bytes.len()
    );
    Ok(bytes)
}

/// Entries that `build_archive_at` writes, in archive order.
///
/// When two counties sanitize to the same filename the later group replaces
/// the earlier one in place.
pub fn archive_entries(
    records: &[ZipRecord],
    timestamp: NaiveDateTime,
) -> Result<Vec<ArchiveEntry>, ArchiveError> {
    let stamp = timestamp.format(TIMESTAMP_FORMAT).to_string();

    let mut entries: Vec<ArchiveEntry> = Vec::new();
    let mut by_name: HashMap<String, usize> = HashMap::new();

    for (county_state, group) in group_by_county(records) {
        let filename = entry_filename(county_state, &stamp);
        let content = render_csv(&group)?;

        match by_name.get(&filename) {
            Some(&i) => {
                tracing::warn!(
                    "County '{}' maps to existing entry {}, overwriting",
                    county_state,
                    filename
                );
                entries[i].content = content;
            }
            None => {
                by_name.insert(filename.clone(), entries.len());
                entries.push(ArchiveEntry { filename, content });
            }
        }
    }

    Ok(entries)
}

/// Group records by county identifier.
///
/// Groups come out sorted by county identifier; records keep input order
/// within a group.
pub fn group_by_county(records: &[ZipRecord]) -> BTreeMap<&str, Vec<&ZipRecord>> {
    let mut groups: BTreeMap<&str, Vec<&ZipRecord>> = BTreeMap::new();
    for record in records {
        groups
            .entry(record.county_state.as_str())
            .or_default()
            .push(record);
    }
    groups
}

/// Render a group as a single-column CSV, header first
pub fn render_csv(group: &[&ZipRecord]) -> Result<String, ArchiveError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([CSV_HEADER])?;
    for record in group {
        writer.write_record([record.zipcode.as_str()])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ArchiveError::Io(e.into_error()))?;
    String::from_utf8(bytes)
        .map_err(|e| ArchiveError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

/// "Los Angeles, California" -> "Los_Angeles_California"
pub fn sanitize_county_state(county_state: &str) -> String {
    county_state.replace(", ", "_").replace(' ', "_")
}

/// Entry name for a county: sanitized identifier, timestamp, `.csv`
pub fn entry_filename(county_state: &str, stamp: &str) -> String {
    format!("{}_{}.csv", sanitize_county_state(county_state), stamp)
}
