//! Client error taxonomy.

use reqwest::StatusCode;
use thiserror::Error;

/// Terminal errors surfaced by one upload orchestration.
///
/// Transfer-level transient failures are retried inside the engine and only
/// escalate to [`UploadError::Transfer`] after exhausting retries; callers
/// see exactly one terminal error (or success) per invocation.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The credential exchange was rejected or unreachable.
    #[error("credential exchange failed: {reason}")]
    Auth { reason: String },

    /// The backend rejected session creation or a presigned-URL request.
    #[error("capture negotiation rejected ({status}): {body}")]
    Negotiation { status: StatusCode, body: String },

    /// The backend response violated the protocol contract (missing or
    /// malformed required fields). Never retried.
    #[error("malformed backend response: {0}")]
    Protocol(String),

    /// A part transfer failed after exhausting retries.
    #[error("part {part_number} transfer failed after {attempts} attempts: {reason}")]
    Transfer {
        part_number: u32,
        attempts: u32,
        reason: String,
    },

    /// The completion handshake was rejected.
    #[error("completion rejected ({status}): {body}")]
    Finalization { status: StatusCode, body: String },

    /// The caller aborted the orchestration.
    #[error("upload cancelled")]
    Cancelled,

    /// Invalid client-side configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Transport-level request failure outside the credential exchange.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Engine invariant violation (worker panic or lost result).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, UploadError>;
