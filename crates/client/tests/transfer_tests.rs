mod common;

use bytes::Bytes;
use common::can_bind_localhost;
use httpmock::Method::PUT;
use httpmock::MockServer;
use porter_client::{TransferRetrier, UploadError};
use porter_core::UploadConfig;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn retrier(max_retries: u32, base_delay_ms: u64) -> TransferRetrier {
    let config = UploadConfig {
        concurrency: 4,
        max_retries,
        retry_base_delay_ms: base_delay_ms,
    };
    TransferRetrier::new(reqwest::Client::new(), &config)
}

#[tokio::test]
async fn transfer_returns_unquoted_token() {
    if !can_bind_localhost() {
        eprintln!("Skipping httpmock tests: cannot bind to localhost");
        return;
    }

    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(PUT).path("/blob/1").body("hello");
        then.status(200).header("etag", "\"abc123\"");
    });

    let token = retrier(3, 1)
        .transfer(
            1,
            &format!("{}/blob/1", server.base_url()),
            Bytes::from_static(b"hello"),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(token, "abc123");
    mock.assert();
}

#[tokio::test]
async fn failing_status_exhausts_retries() {
    if !can_bind_localhost() {
        eprintln!("Skipping httpmock tests: cannot bind to localhost");
        return;
    }

    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(PUT).path("/blob/7");
        then.status(500);
    });

    let err = retrier(3, 1)
        .transfer(
            7,
            &format!("{}/blob/7", server.base_url()),
            Bytes::from_static(b"data"),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    match err {
        UploadError::Transfer {
            part_number,
            attempts,
            reason,
        } => {
            assert_eq!(part_number, 7);
            assert_eq!(attempts, 4);
            assert!(reason.contains("500"));
        }
        other => panic!("unexpected error: {other}"),
    }
    mock.assert_hits(4);
}

#[tokio::test]
async fn missing_token_header_is_retried_then_fails() {
    if !can_bind_localhost() {
        eprintln!("Skipping httpmock tests: cannot bind to localhost");
        return;
    }

    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(PUT).path("/blob/1");
        then.status(200);
    });

    let err = retrier(3, 1)
        .transfer(
            1,
            &format!("{}/blob/1", server.base_url()),
            Bytes::from_static(b"data"),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    match err {
        UploadError::Transfer {
            attempts, reason, ..
        } => {
            assert_eq!(attempts, 4);
            assert!(reason.contains("integrity token"));
        }
        other => panic!("unexpected error: {other}"),
    }
    mock.assert_hits(4);
}

#[tokio::test]
async fn zero_extra_retries_means_single_attempt() {
    if !can_bind_localhost() {
        eprintln!("Skipping httpmock tests: cannot bind to localhost");
        return;
    }

    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(PUT).path("/blob/1");
        then.status(503);
    });

    let err = retrier(0, 1)
        .transfer(
            1,
            &format!("{}/blob/1", server.base_url()),
            Bytes::from_static(b"data"),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, UploadError::Transfer { attempts: 1, .. }));
    mock.assert_hits(1);
}

#[tokio::test]
async fn cancellation_aborts_pending_backoff() {
    if !can_bind_localhost() {
        eprintln!("Skipping httpmock tests: cannot bind to localhost");
        return;
    }

    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(PUT).path("/blob/1");
        then.status(500);
    });

    // First attempt fails, then the worker sits in a 60s backoff.
    let retrier = retrier(3, 60_000);
    let url = format!("{}/blob/1", server.base_url());
    let cancel = CancellationToken::new();
    let task_cancel = cancel.clone();
    let handle = tokio::spawn(async move {
        retrier
            .transfer(1, &url, Bytes::from_static(b"data"), &task_cancel)
            .await
    });

    tokio::time::sleep(Duration::from_millis(200)).await;
    cancel.cancel();

    let err = tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("cancellation should interrupt the backoff promptly")
        .unwrap()
        .unwrap_err();
    assert!(matches!(err, UploadError::Cancelled));
    mock.assert_hits(1);
}
