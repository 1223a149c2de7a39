pub mod archive;
pub mod error;
pub mod http;
pub mod provider;
pub mod reference;
pub mod reference_cache;
pub mod types;

pub use archive::{build_archive, build_archive_at};
pub use error::{ArchiveError, LoadError};
pub use provider::{CsvFileProvider, ReferenceProvider, StaticProvider};
pub use reference::{ReferenceTable, load_reference};
pub use reference_cache::ReferenceCache;
pub use types::{
    ARCHIVE_MIME, ArchiveEntry, CountyZip, DEFAULT_ARCHIVE_NAME, RawRecord, ZipRecord,
};
