// tests/common/mod.rs
pub use axum::Router;
pub use serde_json::json;
pub use tokio::task::JoinHandle;

use std::io::Write;
use std::net::SocketAddr;
use std::time::Duration;

use tempfile::NamedTempFile;

use crate::fetcher::TokenFetcher;

pub const TEST_PRIVATE_KEY: &str = include_str!("../fixtures/test_key.pem");
pub const TEST_PUBLIC_KEY: &str = include_str!("../fixtures/test_key.pub.pem");
pub const TEST_KEY_ID: &str = "0123456789abcdef";
pub const TEST_ISSUER: &str = "test@svc.iam";
pub const TEST_SCOPE: &str = "https://api.example.com/auth/scope1";

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

/// A service-account key as the cloud console would hand it out.
pub fn key_file_json(issuer: &str, token_uri: &str) -> String {
    json!({
        "type": "service_account",
        "project_id": "test-project",
        "private_key_id": TEST_KEY_ID,
        "private_key": TEST_PRIVATE_KEY,
        "client_email": issuer,
        "client_id": "1234567890",
        "auth_uri": "https://accounts.google.com/o/oauth2/auth",
        "token_uri": token_uri,
    })
    .to_string()
}

pub fn write_key_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp key file");
    file.write_all(content.as_bytes()).expect("write key file");
    file.flush().expect("flush key file");
    file
}

pub fn scopes(scopes: &[&str]) -> Vec<String> {
    scopes.iter().map(|s| s.to_string()).collect()
}

pub fn build_fetcher() -> TokenFetcher {
    TokenFetcher::new(Duration::from_secs(5)).expect("token fetcher")
}

/// An address nothing listens on.
pub fn closed_port_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind failed");
    listener.local_addr().unwrap()
}
