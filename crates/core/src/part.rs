//! Part tasks and per-part results.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// One contiguous byte-range slice of the source, uploaded independently.
///
/// `start` is inclusive, `end` exclusive. Part numbers are 1-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PartTask {
    /// 1-based part number.
    pub part_number: u32,
    /// Start offset into the source.
    pub start: u64,
    /// End offset (exclusive).
    pub end: u64,
}

impl PartTask {
    /// Length of the byte range.
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    /// Whether the range is empty.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Zero-copy slice of the source covering this part's range.
    pub fn slice(&self, source: &Bytes) -> Bytes {
        source.slice(self.start as usize..self.end as usize)
    }
}

/// Integrity token echoed by the transfer destination for one part.
///
/// Serializes in the shape the completion endpoint expects.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartResult {
    /// 1-based part number.
    #[serde(rename = "number")]
    pub part_number: u32,
    /// Opaque token captured verbatim from the transfer response.
    #[serde(rename = "etag")]
    pub integrity_token: String,
}
