use thiserror::Error;

/// Failure to produce the reference table.
///
/// Callers treat any of these as "service unavailable", never as
/// "no counties exist".
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("reference provider failed: {0}")]
    Provider(String),

    #[error("reference provider returned no records")]
    Empty,

    #[error("invalid reference record at index {index}: {reason}")]
    InvalidRecord { index: usize, reason: String },
}

/// Failure while rendering or packaging an archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("ZIP write error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
