//! Upload session types.

use crate::part::PartTask;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Backend-assigned identifier for a capture session.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CaptureId(String);

impl CaptureId {
    /// Wrap a backend-provided identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CaptureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CaptureId({})", self.0)
    }
}

impl fmt::Display for CaptureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Negotiated metadata for one multi-part upload session.
///
/// Created once when the capture session is opened and immutable for the
/// session's lifetime. Part byte ranges derive deterministically from the
/// chunk size and total byte count.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadSession {
    /// Backend session identifier.
    pub capture_id: CaptureId,
    /// Number of parts the backend expects.
    pub total_parts: u32,
    /// Fixed chunk size for every part except possibly the last.
    pub chunk_size_bytes: u64,
    /// Total size of the source payload.
    pub total_bytes: u64,
}

impl UploadSession {
    /// Build a session from negotiated values, enforcing the response
    /// postconditions: at least one part, a positive chunk size, and a part
    /// count consistent with the byte range.
    pub fn new(
        capture_id: CaptureId,
        total_parts: u32,
        chunk_size_bytes: u64,
        total_bytes: u64,
    ) -> crate::Result<Self> {
        if chunk_size_bytes == 0 {
            return Err(crate::Error::InvalidChunkSize(chunk_size_bytes));
        }
        if total_parts == 0 {
            return Err(crate::Error::InvalidPartCount(total_parts));
        }
        if capture_id.as_str().is_empty() {
            return Err(crate::Error::InvalidSession(
                "empty session identifier".to_string(),
            ));
        }
        let derived = total_bytes.div_ceil(chunk_size_bytes);
        if u64::from(total_parts) != derived {
            return Err(crate::Error::PartCountMismatch {
                advertised: total_parts,
                derived: u32::try_from(derived).unwrap_or(u32::MAX),
            });
        }
        Ok(Self {
            capture_id,
            total_parts,
            chunk_size_bytes,
            total_bytes,
        })
    }

    /// The byte-range task for one part number (1-based).
    pub fn part(&self, part_number: u32) -> PartTask {
        let start = u64::from(part_number - 1) * self.chunk_size_bytes;
        let end = (start + self.chunk_size_bytes).min(self.total_bytes);
        PartTask {
            part_number,
            start,
            end,
        }
    }

    /// All part tasks for the session, in part-number order.
    pub fn parts(&self) -> Vec<PartTask> {
        (1..=self.total_parts).map(|n| self.part(n)).collect()
    }
}
