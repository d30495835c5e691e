//! Input data format detection.

use serde::{Deserialize, Serialize};

/// Format of the source payload, as declared at session creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputFormat {
    /// A zip archive of still images.
    #[serde(rename = "bulk-images")]
    BulkImages,
    /// A single video file.
    #[serde(rename = "video")]
    Video,
}

impl InputFormat {
    /// Determine the format from the source file name: a `.zip` extension
    /// (case-insensitive) means bulk images, anything else is video.
    pub fn from_file_name(name: &str) -> Self {
        if name.to_ascii_lowercase().ends_with(".zip") {
            Self::BulkImages
        } else {
            Self::Video
        }
    }

    /// Wire value for this format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BulkImages => "bulk-images",
            Self::Video => "video",
        }
    }
}
