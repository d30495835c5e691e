#![allow(dead_code)] // Not every test file uses every helper

use httpmock::Method::POST;
use httpmock::{Mock, MockServer};
use porter_client::{ApiClient, CredentialCache};
use porter_core::AuthConfig;
use serde_json::json;
use std::net::TcpListener;
use std::sync::Arc;

pub fn can_bind_localhost() -> bool {
    TcpListener::bind("127.0.0.1:0").is_ok()
}

/// Auth configuration pointing at the mock server's token endpoint.
pub fn auth_config(server: &MockServer) -> AuthConfig {
    AuthConfig {
        auth_endpoint: format!("{}/oauth2/token", server.base_url()),
        client_id: "client-id".to_string(),
        client_secret: "client-secret".to_string(),
        scope: "openid profile email".to_string(),
        credential_margin_ms: 60_000,
    }
}

/// Mount a token endpoint that grants `test-token` for an hour.
pub fn mount_auth(server: &MockServer) -> Mock<'_> {
    server.mock(|when, then| {
        when.method(POST).path("/oauth2/token");
        then.status(200).json_body(json!({
            "access_token": "test-token",
            "expires_in": 3600
        }));
    })
}

/// Fully wired API client against the mock server.
pub fn api_client(server: &MockServer) -> Arc<ApiClient> {
    let http = reqwest::Client::new();
    let credentials = Arc::new(CredentialCache::new(http.clone(), auth_config(server)));
    Arc::new(ApiClient::new(&server.base_url(), http, credentials).unwrap())
}
