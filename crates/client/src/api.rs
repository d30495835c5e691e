//! HTTP client for the capture API: session negotiation, presigned-URL
//! requests, and the completion handshake.

use crate::credentials::CredentialCache;
use crate::error::{Result, UploadError};
use porter_core::{CaptureId, InputFormat, PartResult, UploadSession};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Request body for capture session creation.
#[derive(Clone, Debug, Serialize)]
pub struct CreateCaptureRequest {
    /// Display name of the source file.
    pub name: String,
    /// Total source size in bytes.
    pub bytesize: u64,
    /// Declared payload format.
    pub input_data_format: InputFormat,
    /// Frame count, when the caller knows it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_frames: Option<u32>,
    /// Guided-capture flag, when set by the caller.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guided_mode: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct CreateCaptureResponse {
    eid: String,
    num_parts: u32,
    chunk_size: u64,
}

#[derive(Debug, Serialize)]
struct CreateUploadUrlRequest<'a> {
    eid: &'a str,
    bytesize: u64,
}

#[derive(Debug, Deserialize)]
struct CreateUploadUrlResponse {
    upload_url: String,
}

#[derive(Debug, Serialize)]
struct CompleteUploadRequest<'a> {
    eid: &'a str,
    parts: &'a [PartResult],
}

/// Bearer-authenticated client for the capture API.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    credentials: Arc<CredentialCache>,
}

impl ApiClient {
    /// Create a client for the given API base URL.
    pub fn new(
        base_url: &str,
        http: reqwest::Client,
        credentials: Arc<CredentialCache>,
    ) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| UploadError::Config(format!("invalid API base URL: {e}")))?;
        Ok(Self {
            http,
            base_url,
            credentials,
        })
    }

    /// The underlying HTTP client, shared with the transfer path.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| UploadError::Config(format!("failed to build API URL: {e}")))
    }

    /// Open a capture session.
    ///
    /// The response must carry a session id, at least one part, and a chunk
    /// size consistent with the declared byte count; a violation is a
    /// protocol error, distinct from a request-level rejection.
    pub async fn create_capture(&self, req: &CreateCaptureRequest) -> Result<UploadSession> {
        let credential = self.credentials.acquire().await?;
        let url = self.url("/api/v1/captures")?;
        let response = self
            .http
            .post(url)
            .bearer_auth(&credential.token)
            .json(req)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UploadError::Negotiation { status, body });
        }

        let body: CreateCaptureResponse = response
            .json()
            .await
            .map_err(|e| UploadError::Protocol(format!("capture response: {e}")))?;

        UploadSession::new(
            CaptureId::new(body.eid),
            body.num_parts,
            body.chunk_size,
            req.bytesize,
        )
        .map_err(|e| UploadError::Protocol(e.to_string()))
    }

    /// Fetch the one-time presigned upload URL for a part.
    pub async fn create_upload_url(
        &self,
        capture_id: &CaptureId,
        part_number: u32,
        bytesize: u64,
    ) -> Result<String> {
        let credential = self.credentials.acquire().await?;
        let url = self.url(&format!(
            "/api/v1/captures/{capture_id}/create-upload-url/{part_number}"
        ))?;
        let response = self
            .http
            .post(url)
            .bearer_auth(&credential.token)
            .json(&CreateUploadUrlRequest {
                eid: capture_id.as_str(),
                bytesize,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UploadError::Negotiation { status, body });
        }

        let body: CreateUploadUrlResponse = response
            .json()
            .await
            .map_err(|e| UploadError::Protocol(format!("upload-url response: {e}")))?;

        if body.upload_url.is_empty() {
            return Err(UploadError::Protocol(
                "upload-url response carried an empty URL".to_string(),
            ));
        }
        Ok(body.upload_url)
    }

    /// Close the session with the ordered part integrity tokens.
    ///
    /// `parts` must already be sorted ascending by part number; the backend
    /// assembles the object in submission order.
    pub async fn complete_upload(
        &self,
        capture_id: &CaptureId,
        parts: &[PartResult],
    ) -> Result<()> {
        let credential = self.credentials.acquire().await?;
        let url = self.url(&format!("/api/v1/captures/{capture_id}/uploaded"))?;
        let response = self
            .http
            .post(url)
            .bearer_auth(&credential.token)
            .json(&CompleteUploadRequest {
                eid: capture_id.as_str(),
                parts,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UploadError::Finalization { status, body });
        }
        Ok(())
    }
}
