//! Upload orchestration phases.

use serde::{Deserialize, Serialize};

/// Phase of one upload orchestration.
///
/// Transitions are monotonic (`Idle → Creating → Uploading → Completing →
/// Done`) except `Failed`, which is reachable from any non-terminal phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadPhase {
    /// No orchestration started yet.
    Idle,
    /// Negotiating the capture session.
    Creating,
    /// Transferring parts.
    Uploading,
    /// Submitting the completion handshake.
    Completing,
    /// Session closed successfully.
    Done,
    /// Orchestration aborted with an error or cancellation.
    Failed,
}

impl UploadPhase {
    /// Check if the phase is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_phases() {
        assert!(UploadPhase::Done.is_terminal());
        assert!(UploadPhase::Failed.is_terminal());
        for phase in [
            UploadPhase::Idle,
            UploadPhase::Creating,
            UploadPhase::Uploading,
            UploadPhase::Completing,
        ] {
            assert!(!phase.is_terminal());
        }
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&UploadPhase::Uploading).unwrap(),
            r#""uploading""#
        );
    }
}
