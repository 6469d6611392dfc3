//! Error types for container reading.

use crate::version::EngineVersion;
use camino::Utf8PathBuf;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ContainerError>;

/// Errors that can occur while opening or listing a container.
#[derive(Error, Debug)]
pub enum ContainerError {
    /// Filesystem I/O failed, including reads past the end of a truncated file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A fixed-layout structure failed to parse (bad magic, short read).
    #[error("Binary read error: {0}")]
    BinRead(#[from] binrw::Error),

    /// repak could not read a `.pak` footer or index.
    #[error("Pak error: {0}")]
    Pak(#[from] repak::Error),

    /// The TOC header carries a version this reader does not know.
    #[error("Unsupported IoStore TOC version {0}")]
    UnsupportedTocVersion(u8),

    /// The TOC is newer than anything the configured engine version writes.
    #[error("IoStore TOC version {found} is newer than {engine} produces")]
    TocVersionTooNew { found: u8, engine: EngineVersion },

    /// The file is shorter than the smallest structure it must contain.
    #[error("Container is too small ({0} bytes)")]
    TooSmall(u64),

    /// An FString length prefix is out of range or the string is unterminated.
    #[error("Invalid FString (length {0})")]
    InvalidString(i32),

    /// Structural inconsistency inside an index or header.
    #[error("Malformed {what}: {detail}")]
    Malformed { what: &'static str, detail: String },

    /// The index is encrypted and no key has been submitted yet.
    #[error("Container index is encrypted and no key has been submitted")]
    KeyRequired,

    /// A submitted key does not decrypt the index into anything readable.
    #[error("Submitted AES key does not decrypt the container index")]
    KeyRejected,

    /// The key text is not 32 bytes of hex.
    #[error("Invalid AES key: {0}")]
    InvalidKey(String),

    /// The `.ucas` payload a paired IoStore open requires is not there.
    #[error("IoStore payload not found: {0}")]
    MissingPayload(Utf8PathBuf),
}

impl ContainerError {
    pub(crate) fn malformed(what: &'static str, detail: impl Into<String>) -> Self {
        ContainerError::Malformed {
            what,
            detail: detail.into(),
        }
    }
}
