//! Configuration types shared across crates.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Upload engine tuning.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Maximum simultaneous in-flight part transfers.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Additional transfer attempts after the first, per part.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Base delay for exponential retry backoff, in milliseconds.
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
}

fn default_concurrency() -> usize {
    crate::DEFAULT_CONCURRENCY
}

fn default_max_retries() -> u32 {
    crate::DEFAULT_MAX_RETRIES
}

fn default_retry_base_delay_ms() -> u64 {
    crate::DEFAULT_RETRY_BASE_DELAY_MS
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            max_retries: default_max_retries(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
        }
    }
}

impl UploadConfig {
    /// Get the retry base delay as a Duration.
    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    /// Validate upload configuration invariants.
    pub fn validate(&self) -> Result<(), String> {
        if self.concurrency == 0 {
            return Err("upload.concurrency must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Credential exchange configuration (client-credentials grant).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Token endpoint URL.
    pub auth_endpoint: String,
    /// OAuth client id.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
    /// Requested scope.
    #[serde(default = "default_scope")]
    pub scope: String,
    /// Safety margin subtracted from the advertised expiry, in milliseconds.
    /// Keeps in-flight requests from racing a credential that is about to
    /// lapse.
    #[serde(default = "default_credential_margin_ms")]
    pub credential_margin_ms: i64,
}

fn default_scope() -> String {
    "openid profile email".to_string()
}

fn default_credential_margin_ms() -> i64 {
    crate::DEFAULT_CREDENTIAL_MARGIN_MS
}

impl AuthConfig {
    /// Validate auth configuration invariants.
    pub fn validate(&self) -> Result<(), String> {
        if self.auth_endpoint.is_empty() {
            return Err("auth.auth_endpoint must be set".to_string());
        }
        if self.credential_margin_ms < 0 {
            return Err("auth.credential_margin_ms must be non-negative".to_string());
        }
        Ok(())
    }
}

/// Capture API endpoint configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the capture API.
    pub base_url: String,
}
