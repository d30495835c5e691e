mod common;

use common::{auth_config, can_bind_localhost, mount_auth};
use httpmock::Method::POST;
use httpmock::MockServer;
use porter_client::{CredentialCache, UploadError};
use serde_json::json;
use std::sync::Arc;

fn cache(server: &MockServer) -> CredentialCache {
    CredentialCache::new(reqwest::Client::new(), auth_config(server))
}

#[tokio::test]
async fn concurrent_acquires_share_one_exchange() {
    if !can_bind_localhost() {
        eprintln!("Skipping httpmock tests: cannot bind to localhost");
        return;
    }

    let server = MockServer::start();
    let mock = mount_auth(&server);
    let cache = Arc::new(cache(&server));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let cache = cache.clone();
        handles.push(tokio::spawn(async move { cache.acquire().await }));
    }
    for handle in handles {
        let credential = handle.await.unwrap().unwrap();
        assert_eq!(credential.token, "test-token");
    }

    mock.assert_hits(1);
}

#[tokio::test]
async fn fresh_slot_skips_network() {
    if !can_bind_localhost() {
        eprintln!("Skipping httpmock tests: cannot bind to localhost");
        return;
    }

    let server = MockServer::start();
    let mock = mount_auth(&server);
    let cache = cache(&server);

    cache.acquire().await.unwrap();
    cache.acquire().await.unwrap();

    mock.assert_hits(1);
}

#[tokio::test]
async fn stale_slot_triggers_new_exchange() {
    if !can_bind_localhost() {
        eprintln!("Skipping httpmock tests: cannot bind to localhost");
        return;
    }

    let server = MockServer::start();
    let mock = mount_auth(&server);

    // Margin larger than the advertised lifetime: the stored credential is
    // stale the moment it lands in the slot.
    let mut config = auth_config(&server);
    config.credential_margin_ms = 7_200_000;
    let cache = CredentialCache::new(reqwest::Client::new(), config);

    cache.acquire().await.unwrap();
    cache.acquire().await.unwrap();

    mock.assert_hits(2);
}

#[tokio::test]
async fn rejected_exchange_surfaces_auth_error() {
    if !can_bind_localhost() {
        eprintln!("Skipping httpmock tests: cannot bind to localhost");
        return;
    }

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/oauth2/token");
        then.status(401).body("denied");
    });

    let err = cache(&server).acquire().await.unwrap_err();
    assert!(matches!(err, UploadError::Auth { .. }));
    assert!(err.to_string().contains("401"));
    assert!(err.to_string().contains("denied"));
}

#[tokio::test]
async fn exchange_is_form_encoded_grant() {
    if !can_bind_localhost() {
        eprintln!("Skipping httpmock tests: cannot bind to localhost");
        return;
    }

    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/oauth2/token")
            .header("content-type", "application/x-www-form-urlencoded")
            .body_contains("grant_type=client_credentials")
            .body_contains("client_id=client-id")
            .body_contains("client_secret=client-secret")
            .body_contains("scope=openid+profile+email");
        then.status(200).json_body(json!({
            "access_token": "test-token",
            "expires_in": 3600
        }));
    });

    cache(&server).acquire().await.unwrap();
    mock.assert();
}

#[tokio::test]
async fn malformed_token_response_is_auth_error() {
    if !can_bind_localhost() {
        eprintln!("Skipping httpmock tests: cannot bind to localhost");
        return;
    }

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/oauth2/token");
        then.status(200).json_body(json!({ "access_token": "test-token" }));
    });

    let err = cache(&server).acquire().await.unwrap_err();
    assert!(matches!(err, UploadError::Auth { .. }));
}
