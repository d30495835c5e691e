//! Part transfer with bounded exponential-backoff retry.

use crate::error::{Result, UploadError};
use bytes::Bytes;
use porter_core::{backoff_delay, UploadConfig};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Response header carrying the per-part integrity token.
const INTEGRITY_TOKEN_HEADER: &str = "etag";

/// Transfers one part to its presigned URL, retrying failed attempts.
///
/// Any attempt failure (non-success status, network error, or a success
/// response missing the integrity-token header) triggers a retry after an
/// exponential backoff, up to `max_retries` extra attempts. Retries reuse
/// the presigned URL; the scheduler fetches it once per part. Cancellation
/// aborts a pending backoff or in-flight attempt immediately.
pub struct TransferRetrier {
    http: reqwest::Client,
    max_retries: u32,
    base_delay: Duration,
}

impl TransferRetrier {
    /// Build a retrier from the upload configuration.
    pub fn new(http: reqwest::Client, config: &UploadConfig) -> Self {
        Self {
            http,
            max_retries: config.max_retries,
            base_delay: config.retry_base_delay(),
        }
    }

    /// PUT the part body to the presigned URL and return its integrity
    /// token, with surrounding quotes stripped.
    pub async fn transfer(
        &self,
        part_number: u32,
        upload_url: &str,
        body: Bytes,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let attempts = self.max_retries + 1;
        let mut last_failure = String::new();

        for attempt in 0..attempts {
            if attempt > 0 {
                let delay = backoff_delay(self.base_delay, attempt - 1);
                tracing::warn!(
                    part_number,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    reason = %last_failure,
                    "retrying part transfer"
                );
                tokio::select! {
                    _ = cancel.cancelled() => return Err(UploadError::Cancelled),
                    _ = tokio::time::sleep(delay) => {}
                }
            }

            let put = self.http.put(upload_url).body(body.clone()).send();
            let outcome = tokio::select! {
                _ = cancel.cancelled() => return Err(UploadError::Cancelled),
                outcome = put => outcome,
            };

            match outcome {
                Ok(response) => {
                    let status = response.status();
                    if !status.is_success() {
                        last_failure = format!("transfer endpoint returned {status}");
                        continue;
                    }
                    match integrity_token(&response) {
                        Some(token) => {
                            tracing::debug!(part_number, attempt, "part transferred");
                            return Ok(token);
                        }
                        None => {
                            last_failure =
                                "success response missing integrity token header".to_string();
                        }
                    }
                }
                Err(e) => {
                    last_failure = e.to_string();
                }
            }
        }

        Err(UploadError::Transfer {
            part_number,
            attempts,
            reason: last_failure,
        })
    }
}

/// Extract the integrity token from the transfer response, if present.
fn integrity_token(response: &reqwest::Response) -> Option<String> {
    let raw = response.headers().get(INTEGRITY_TOKEN_HEADER)?.to_str().ok()?;
    Some(strip_token_quotes(raw).to_string())
}

/// Strip the surrounding quote characters destinations wrap tokens in.
fn strip_token_quotes(raw: &str) -> &str {
    raw.trim_matches('"')
}
