//! Async upload orchestration engine for the capture API.
//!
//! Drives one source payload through the multi-part upload protocol:
//! negotiate a capture session, fan parts out over a bounded pool of
//! transfer workers (each fetching a one-time presigned URL and retrying
//! the transfer with exponential backoff), then finalize the session with
//! the ordered part integrity tokens.
//!
//! Bearer credentials come from [`CredentialCache`], a process-wide
//! single-slot cache with single-flight token exchange. Cancellation is a
//! [`tokio_util::sync::CancellationToken`] supplied at orchestration start;
//! it aborts outstanding network calls and pending retry delays.

pub mod api;
pub mod credentials;
pub mod error;
pub mod orchestrator;
pub mod progress;
mod scheduler;
pub mod transfer;

pub use api::{ApiClient, CreateCaptureRequest};
pub use credentials::{Credential, CredentialCache};
pub use error::{Result, UploadError};
pub use orchestrator::{CaptureOptions, SourceFile, Uploader};
pub use progress::{NoopObserver, UploadObserver};
pub use transfer::TransferRetrier;
