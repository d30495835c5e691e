//! Bearer credential acquisition with a single-slot cache.

use crate::error::{Result, UploadError};
use porter_core::AuthConfig;
use serde::Deserialize;
use tokio::sync::Mutex;

/// A bearer credential with a margin-adjusted expiry.
#[derive(Clone, Debug)]
pub struct Credential {
    /// The bearer token.
    pub token: String,
    /// Epoch milliseconds after which the credential must not be used.
    /// Already discounted by the configured safety margin.
    pub expires_at_ms: i64,
}

impl Credential {
    /// Check if the credential is still usable at the given instant.
    pub fn is_fresh_at(&self, now_ms: i64) -> bool {
        now_ms < self.expires_at_ms
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

/// Process-wide credential cache over the client-credentials grant.
///
/// Holds at most one live credential. The slot lock is held across the
/// token exchange, so concurrent callers that find the slot empty or stale
/// coalesce onto a single outstanding exchange and all receive its result.
/// A failed exchange is surfaced immediately, not retried.
pub struct CredentialCache {
    http: reqwest::Client,
    config: AuthConfig,
    slot: Mutex<Option<Credential>>,
}

impl CredentialCache {
    /// Create a cache with an empty slot.
    pub fn new(http: reqwest::Client, config: AuthConfig) -> Self {
        Self {
            http,
            config,
            slot: Mutex::new(None),
        }
    }

    /// Return the cached credential, exchanging for a new one only when the
    /// slot is empty or past its margin-adjusted expiry.
    pub async fn acquire(&self) -> Result<Credential> {
        let mut slot = self.slot.lock().await;
        if let Some(credential) = slot.as_ref() {
            if credential.is_fresh_at(now_ms()) {
                return Ok(credential.clone());
            }
        }
        let credential = self.exchange().await?;
        tracing::debug!(
            expires_at_ms = credential.expires_at_ms,
            "cached new bearer credential"
        );
        *slot = Some(credential.clone());
        Ok(credential)
    }

    async fn exchange(&self) -> Result<Credential> {
        let response = self
            .http
            .post(&self.config.auth_endpoint)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("scope", self.config.scope.as_str()),
            ])
            .send()
            .await
            .map_err(|e| UploadError::Auth {
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UploadError::Auth {
                reason: format!("token endpoint returned {status}: {body}"),
            });
        }

        let token: TokenResponse = response.json().await.map_err(|e| UploadError::Auth {
            reason: format!("malformed token response: {e}"),
        })?;

        let expires_at_ms = now_ms() + token.expires_in * 1000 - self.config.credential_margin_ms;
        Ok(Credential {
            token: token.access_token,
            expires_at_ms,
        })
    }
}

/// Current time in epoch milliseconds.
pub(crate) fn now_ms() -> i64 {
    (time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}
