//! Error types for conflict detection.
//!
//! Most failures inside a scan are recovered per mod and only show up in the
//! diagnostic log. The variants here are what escapes to callers: cancellation,
//! configuration problems, and IO outside the per-mod loop (reports, config files).

use camino::Utf8PathBuf;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Filesystem I/O failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse or serialize JSON (config file, conflict report).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A container could not be read.
    #[error("Container error: {0}")]
    Container(#[from] ue_container::ContainerError),

    /// A configured value is present but unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A mod root directory is missing or not a directory.
    #[error("Invalid mod directory: {0}")]
    InvalidModDir(Utf8PathBuf),

    /// The scan was cancelled; no partial result is produced.
    #[error("Conflict scan was cancelled")]
    Cancelled,

    /// Catch-all for errors from other sources.
    #[error("{0}")]
    Other(String),
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}
