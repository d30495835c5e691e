//! Bounded-concurrency part upload scheduling.

use crate::api::ApiClient;
use crate::error::{Result, UploadError};
use crate::progress::ProgressNotifier;
use crate::transfer::TransferRetrier;
use bytes::Bytes;
use porter_core::{PartResult, UploadSession};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Runs every part of a session through a fixed pool of transfer workers.
///
/// Workers pull part numbers from a shared cursor, so at most `concurrency`
/// transfers are in flight and the pool drains as work runs out. The first
/// terminal part failure cancels the pool; queued parts never start and no
/// further presigned-URL requests are issued for the session. A capture is
/// all-parts-or-nothing.
pub(crate) struct PartScheduler {
    api: Arc<ApiClient>,
    retrier: Arc<TransferRetrier>,
    concurrency: usize,
}

impl PartScheduler {
    pub fn new(api: Arc<ApiClient>, retrier: Arc<TransferRetrier>, concurrency: usize) -> Self {
        Self {
            api,
            retrier,
            concurrency,
        }
    }

    /// Upload every part and return the results sorted by part number.
    pub async fn run_all(
        &self,
        session: &UploadSession,
        source: Bytes,
        cancel: &CancellationToken,
        notifier: &ProgressNotifier,
    ) -> Result<Vec<PartResult>> {
        let total = session.total_parts;
        // Caller cancellation propagates into the teardown token; an internal
        // failure cancels teardown without touching the caller's token.
        let teardown = cancel.child_token();
        let next_part = Arc::new(AtomicU32::new(1));
        let parts_done = Arc::new(AtomicU32::new(0));
        let results = Arc::new(Mutex::new(Vec::with_capacity(total as usize)));
        let first_error: Arc<Mutex<Option<UploadError>>> = Arc::new(Mutex::new(None));

        let workers = self.concurrency.min(total as usize).max(1);
        let mut pool = JoinSet::new();
        for _ in 0..workers {
            let api = self.api.clone();
            let retrier = self.retrier.clone();
            let session = session.clone();
            let source = source.clone();
            let teardown = teardown.clone();
            let next_part = next_part.clone();
            let parts_done = parts_done.clone();
            let results = results.clone();
            let first_error = first_error.clone();
            let notifier = notifier.clone();

            pool.spawn(async move {
                loop {
                    if teardown.is_cancelled() {
                        break;
                    }
                    let part_number = next_part.fetch_add(1, Ordering::Relaxed);
                    if part_number > total {
                        break;
                    }
                    let task = session.part(part_number);
                    let body = task.slice(&source);
                    match upload_part(&api, &retrier, &session, part_number, body, &teardown).await
                    {
                        Ok(result) => {
                            results.lock().await.push(result);
                            let done = parts_done.fetch_add(1, Ordering::Relaxed) + 1;
                            notifier.part_progress(done, total);
                        }
                        Err(UploadError::Cancelled) => break,
                        Err(err) => {
                            let mut slot = first_error.lock().await;
                            if slot.is_none() {
                                *slot = Some(err);
                            }
                            drop(slot);
                            teardown.cancel();
                            break;
                        }
                    }
                }
            });
        }

        while let Some(joined) = pool.join_next().await {
            if let Err(join_err) = joined {
                let mut slot = first_error.lock().await;
                if slot.is_none() {
                    *slot = Some(UploadError::Internal(format!(
                        "transfer worker failed: {join_err}"
                    )));
                }
                drop(slot);
                teardown.cancel();
            }
        }

        if cancel.is_cancelled() {
            return Err(UploadError::Cancelled);
        }
        if let Some(err) = first_error.lock().await.take() {
            return Err(err);
        }

        let mut results = Arc::try_unwrap(results)
            .map_err(|_| UploadError::Internal("part results still shared".to_string()))?
            .into_inner();
        if results.len() as u32 != total {
            return Err(UploadError::Internal(format!(
                "scheduler drained with {} of {total} part results",
                results.len()
            )));
        }
        results.sort_by_key(|r| r.part_number);
        Ok(results)
    }
}

/// Fetch the part's one-time upload URL, then run the retried transfer.
/// The URL is fetched once per part; retries reuse it.
async fn upload_part(
    api: &ApiClient,
    retrier: &TransferRetrier,
    session: &UploadSession,
    part_number: u32,
    body: Bytes,
    teardown: &CancellationToken,
) -> Result<PartResult> {
    let fetch = api.create_upload_url(&session.capture_id, part_number, session.total_bytes);
    let upload_url = tokio::select! {
        _ = teardown.cancelled() => return Err(UploadError::Cancelled),
        url = fetch => url?,
    };

    let integrity_token = retrier
        .transfer(part_number, &upload_url, body, teardown)
        .await?;

    Ok(PartResult {
        part_number,
        integrity_token,
    })
}
