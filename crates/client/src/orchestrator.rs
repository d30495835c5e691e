//! Upload orchestration: negotiate, upload, complete.

use crate::api::{ApiClient, CreateCaptureRequest};
use crate::credentials::CredentialCache;
use crate::error::{Result, UploadError};
use crate::progress::{ProgressNotifier, UploadObserver};
use crate::scheduler::PartScheduler;
use crate::transfer::TransferRetrier;
use bytes::Bytes;
use porter_core::{ApiConfig, AuthConfig, CaptureId, InputFormat, UploadConfig, UploadPhase};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// A source payload: the full byte buffer plus its display name.
#[derive(Clone, Debug)]
pub struct SourceFile {
    /// File name; decides the declared input format.
    pub name: String,
    /// The payload.
    pub bytes: Bytes,
}

impl SourceFile {
    /// Total size in bytes.
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Input format derived from the file name.
    pub fn format(&self) -> InputFormat {
        InputFormat::from_file_name(&self.name)
    }
}

/// Optional capture metadata forwarded at session creation.
#[derive(Clone, Copy, Debug, Default)]
pub struct CaptureOptions {
    /// Frame count, when known.
    pub num_frames: Option<u32>,
    /// Guided-capture flag.
    pub guided_mode: Option<bool>,
}

/// Drives one upload end to end: `Creating → Uploading → Completing → Done`,
/// or `Failed` on the first unrecoverable error or cancellation.
///
/// On failure the partially uploaded session is abandoned; the backend owns
/// garbage-collecting incomplete sessions.
pub struct Uploader {
    api: Arc<ApiClient>,
    config: UploadConfig,
}

impl Uploader {
    /// Build an uploader over an existing API client.
    pub fn new(api: Arc<ApiClient>, config: UploadConfig) -> Self {
        Self { api, config }
    }

    /// Build an uploader from configuration, wiring up the HTTP client and
    /// credential cache.
    pub fn from_config(api: ApiConfig, auth: AuthConfig, config: UploadConfig) -> Result<Self> {
        config.validate().map_err(UploadError::Config)?;
        auth.validate().map_err(UploadError::Config)?;
        let http = reqwest::Client::new();
        let credentials = Arc::new(CredentialCache::new(http.clone(), auth));
        let api = Arc::new(ApiClient::new(&api.base_url, http, credentials)?);
        Ok(Self::new(api, config))
    }

    /// Upload one source payload, returning the capture id on success.
    ///
    /// Phase transitions and part completions are reported through the
    /// observer off the critical path. The cancellation token aborts
    /// outstanding network calls and pending retry delays; a cancelled
    /// upload surfaces [`UploadError::Cancelled`].
    #[tracing::instrument(
        skip(self, source, options, observer, cancel),
        fields(name = %source.name, bytes = source.size())
    )]
    pub async fn upload(
        &self,
        source: SourceFile,
        options: CaptureOptions,
        observer: Arc<dyn UploadObserver>,
        cancel: CancellationToken,
    ) -> Result<CaptureId> {
        let (notifier, dispatch) = ProgressNotifier::channel(observer);
        let outcome = self.run(source, options, &notifier, &cancel).await;
        if let Err(err) = &outcome {
            tracing::warn!(error = %err, "upload failed");
            notifier.phase(UploadPhase::Failed);
        }
        drop(notifier);
        dispatch.close().await;
        outcome
    }

    async fn run(
        &self,
        source: SourceFile,
        options: CaptureOptions,
        notifier: &ProgressNotifier,
        cancel: &CancellationToken,
    ) -> Result<CaptureId> {
        if cancel.is_cancelled() {
            return Err(UploadError::Cancelled);
        }

        notifier.phase(UploadPhase::Creating);
        let request = CreateCaptureRequest {
            name: source.name.clone(),
            bytesize: source.size(),
            input_data_format: source.format(),
            num_frames: options.num_frames,
            guided_mode: options.guided_mode,
        };
        let session = tokio::select! {
            _ = cancel.cancelled() => return Err(UploadError::Cancelled),
            session = self.api.create_capture(&request) => session?,
        };
        tracing::info!(
            capture_id = %session.capture_id,
            total_parts = session.total_parts,
            chunk_size = session.chunk_size_bytes,
            "capture session created"
        );
        notifier.part_progress(0, session.total_parts);

        notifier.phase(UploadPhase::Uploading);
        let retrier = Arc::new(TransferRetrier::new(self.api.http().clone(), &self.config));
        let scheduler = PartScheduler::new(self.api.clone(), retrier, self.config.concurrency);
        let results = scheduler
            .run_all(&session, source.bytes, cancel, notifier)
            .await?;

        notifier.phase(UploadPhase::Completing);
        tokio::select! {
            _ = cancel.cancelled() => return Err(UploadError::Cancelled),
            done = self.api.complete_upload(&session.capture_id, &results) => done?,
        }

        notifier.phase(UploadPhase::Done);
        tracing::info!(capture_id = %session.capture_id, "upload complete");
        Ok(session.capture_id)
    }
}
