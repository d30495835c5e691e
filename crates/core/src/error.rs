//! Error types for the core domain.

use thiserror::Error;

/// Core domain error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid chunk size: {0} (must be positive)")]
    InvalidChunkSize(u64),

    #[error("invalid part count: {0} (must be at least 1)")]
    InvalidPartCount(u32),

    #[error("part count mismatch: server advertised {advertised}, byte range requires {derived}")]
    PartCountMismatch { advertised: u32, derived: u32 },

    #[error("invalid session: {0}")]
    InvalidSession(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
