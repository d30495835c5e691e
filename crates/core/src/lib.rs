//! Core domain types and shared logic for the porter upload client.
//!
//! This crate defines the data model used by the orchestration engine:
//! - Upload session metadata and its postconditions
//! - Deterministic part planning over the source byte range
//! - Input format detection
//! - Upload phase lifecycle
//! - Configuration types and retry backoff math
//!
//! Everything here is pure: no I/O, no async.

pub mod config;
pub mod error;
pub mod format;
pub mod part;
pub mod phase;
pub mod retry;
pub mod session;

pub use config::{ApiConfig, AuthConfig, UploadConfig};
pub use error::{Error, Result};
pub use format::InputFormat;
pub use part::{PartResult, PartTask};
pub use phase::UploadPhase;
pub use retry::backoff_delay;
pub use session::{CaptureId, UploadSession};

/// Default number of simultaneous in-flight part transfers.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Default number of additional transfer attempts after the first.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default base delay for exponential transfer retry backoff.
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 500;

/// Default safety margin subtracted from the advertised credential expiry.
pub const DEFAULT_CREDENTIAL_MARGIN_MS: i64 = 60_000;
