use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
/// Errors from a single backing-source call (before retry).
pub enum ProviderError {
    /// Network-level failure (connect, timeout).
    #[error("transport failure: {message}")]
    Transport {
        /// Error message.
        message: String,
    },

    /// The backing source answered with a non-success status.
    #[error("backing source returned status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// The response body did not decode into a page.
    #[error("failed to decode backing response: {message}")]
    Decode {
        /// Error message.
        message: String,
    },
}

#[derive(Debug, Clone, Error)]
/// The only retrieval error callers ever see.
///
/// Transport failures are retried and then degraded to the snapshot; this
/// surfaces solely when there is nothing left to degrade to. `Clone` so
/// de-duplicated callers can all receive the same outcome.
pub enum RetrievalError {
    /// Backing source exhausted and no snapshot was ever loaded.
    #[error(
        "backing source unavailable after {attempts} attempts and no fallback snapshot is loaded: {message}"
    )]
    Unavailable {
        /// Total backing calls made.
        attempts: u32,
        /// Last transport error.
        message: String,
    },
}

#[derive(Debug, Error)]
/// Errors while loading the fallback snapshot.
pub enum SnapshotError {
    /// Snapshot file could not be read.
    #[error("failed to read snapshot at '{path}': {message}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Snapshot file was not a valid entity export.
    #[error("failed to parse snapshot at '{path}': {message}")]
    Parse {
        /// File path.
        path: PathBuf,
        /// Error message.
        message: String,
    },
}
