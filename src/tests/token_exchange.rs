use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use axum::routing::post;
use axum::{Form, Json};
use httpmock::Method::POST;
use httpmock::MockServer;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use crate::credentials::assertion::AssertionClaims;
use crate::error::{AuthError, CredentialError, FetchError};
use crate::fetcher::TokenFetcher;
use crate::helpers::time::now_u64;
use crate::tests::common::{
    build_fetcher, closed_port_addr, json, key_file_json, scopes, spawn_axum, write_key_file, Router,
    TEST_ISSUER, TEST_PUBLIC_KEY, TEST_SCOPE,
};
use crate::utils::constants::JWT_BEARER_GRANT_TYPE;

const TOKEN_PATH: &str = "/token";

async fn token_endpoint(server: &MockServer, status: u16, body: serde_json::Value) -> httpmock::Mock<'_> {
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path(TOKEN_PATH)
                .header("content-type", "application/x-www-form-urlencoded")
                .form_urlencoded_tuple("grant_type", JWT_BEARER_GRANT_TYPE);
            then.status(status)
                .header("Content-Type", "application/json")
                .json_body(body);
        })
        .await
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn well_formed_credential_yields_token() -> Result<()> {
    let server = MockServer::start_async().await;
    let mock = token_endpoint(
        &server,
        200,
        json!({"access_token": "ya29.test-token", "expires_in": 3599, "token_type": "Bearer"}),
    )
    .await;
    let key_file = write_key_file(&key_file_json(TEST_ISSUER, &server.url(TOKEN_PATH)));

    let token = build_fetcher().fetch_token(key_file.path(), &scopes(&[TEST_SCOPE])).await?;

    assert_eq!(token.value, "ya29.test-token");
    assert_eq!(token.token_type, "Bearer");
    assert!(token.exp_unix_ts > now_u64());
    assert!(token.exp_unix_ts <= now_u64() + 3599);
    assert_eq!(mock.hits_async().await, 1);
    Ok(())
}

#[tokio::test]
async fn missing_key_file_makes_no_request() {
    let server = MockServer::start_async().await;
    let mock = token_endpoint(&server, 200, json!({"access_token": "abc123", "expires_in": 3600})).await;
    let dir = tempfile::tempdir().unwrap();

    let err = build_fetcher()
        .fetch_token(dir.path().join("absent.json"), &scopes(&[TEST_SCOPE]))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Credential(CredentialError::Read { .. })));
    assert_eq!(mock.hits_async().await, 0);
}

#[tokio::test]
async fn truncated_key_file_makes_no_request() {
    let server = MockServer::start_async().await;
    let mock = token_endpoint(&server, 200, json!({"access_token": "abc123", "expires_in": 3600})).await;
    let content = key_file_json(TEST_ISSUER, &server.url(TOKEN_PATH));
    let key_file = write_key_file(&content[..content.len() - 20]);

    let err = build_fetcher()
        .fetch_token(key_file.path(), &scopes(&[TEST_SCOPE]))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Credential(CredentialError::Parse(_))));
    assert_eq!(mock.hits_async().await, 0);
}

#[tokio::test]
async fn empty_scopes_make_no_request() {
    let server = MockServer::start_async().await;
    let mock = token_endpoint(&server, 200, json!({"access_token": "abc123", "expires_in": 3600})).await;
    let key_file = write_key_file(&key_file_json(TEST_ISSUER, &server.url(TOKEN_PATH)));

    let err = build_fetcher().fetch_token(key_file.path(), &[]).await.unwrap_err();

    assert!(matches!(err, FetchError::Credential(CredentialError::EmptyScopes)));
    assert_eq!(mock.hits_async().await, 0);
}

#[tokio::test]
async fn invalid_private_key_makes_no_request() {
    let server = MockServer::start_async().await;
    let mock = token_endpoint(&server, 200, json!({"access_token": "abc123", "expires_in": 3600})).await;
    let content = json!({
        "type": "service_account",
        "private_key": "definitely not pem",
        "client_email": TEST_ISSUER,
        "token_uri": server.url(TOKEN_PATH),
    })
    .to_string();
    let key_file = write_key_file(&content);

    let err = build_fetcher()
        .fetch_token(key_file.path(), &scopes(&[TEST_SCOPE]))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Credential(CredentialError::InvalidKey(_))));
    assert_eq!(mock.hits_async().await, 0);
}

#[tokio::test]
async fn rejected_assertion_is_an_auth_error() {
    let server = MockServer::start_async().await;
    let mock = token_endpoint(
        &server,
        401,
        json!({"error": "unauthorized_client", "error_description": "Client is unauthorized to retrieve access tokens."}),
    )
    .await;
    let key_file = write_key_file(&key_file_json(TEST_ISSUER, &server.url(TOKEN_PATH)));

    let err = build_fetcher()
        .fetch_token(key_file.path(), &scopes(&[TEST_SCOPE]))
        .await
        .unwrap_err();

    assert!(err.is_auth());
    match err {
        FetchError::Auth(AuthError::Rejected { status, error, .. }) => {
            assert_eq!(status.as_u16(), 401);
            assert_eq!(error.as_deref(), Some("unauthorized_client"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(mock.hits_async().await, 1);
}

#[tokio::test]
async fn success_without_token_is_an_auth_error() {
    let server = MockServer::start_async().await;
    token_endpoint(&server, 200, json!({"expires_in": 3600, "token_type": "Bearer"})).await;
    let key_file = write_key_file(&key_file_json(TEST_ISSUER, &server.url(TOKEN_PATH)));

    let err = build_fetcher()
        .fetch_token(key_file.path(), &scopes(&[TEST_SCOPE]))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Auth(AuthError::InvalidResponse(_))));
}

#[tokio::test]
async fn unresponsive_endpoint_times_out() -> Result<()> {
    // accepts connections and never answers
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let silent = tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    let key_file = write_key_file(&key_file_json(TEST_ISSUER, &format!("http://{addr}{TOKEN_PATH}")));
    let fetcher = TokenFetcher::new(Duration::from_millis(200))?;

    let err = fetcher
        .fetch_token(key_file.path(), &scopes(&[TEST_SCOPE]))
        .await
        .unwrap_err();

    assert!(err.is_network());
    assert!(err.is_timeout());
    silent.abort();
    Ok(())
}

#[tokio::test]
async fn refused_connection_is_a_network_error() {
    let addr = closed_port_addr();
    let key_file = write_key_file(&key_file_json(TEST_ISSUER, &format!("http://{addr}{TOKEN_PATH}")));

    let err = build_fetcher()
        .fetch_token(key_file.path(), &scopes(&[TEST_SCOPE]))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Network(_)));
    assert!(!err.is_timeout());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn assertion_reaches_overridden_endpoint() -> Result<()> {
    let captured: Arc<Mutex<Option<HashMap<String, String>>>> = Arc::new(Mutex::new(None));
    let captured_clone = captured.clone();
    let router = Router::new().route(
        TOKEN_PATH,
        post(move |Form(form): Form<HashMap<String, String>>| {
            let captured = captured_clone.clone();
            async move {
                *captured.lock().unwrap() = Some(form);
                Json(json!({"access_token": "override-token", "expires_in": 60}))
            }
        }),
    );
    let (handle, addr) = spawn_axum(router).await;
    let endpoint = format!("http://{addr}{TOKEN_PATH}");

    // the key file points at a port nobody listens on
    let stale = format!("http://{}{TOKEN_PATH}", closed_port_addr());
    let key_file = write_key_file(&key_file_json(TEST_ISSUER, &stale));
    let fetcher = build_fetcher()
        .with_token_uri(&endpoint)?
        .with_subject("admin@example.com");

    let token = fetcher
        .fetch_token(key_file.path(), &scopes(&[TEST_SCOPE, "openid"]))
        .await?;
    assert_eq!(token.value, "override-token");

    let form = captured.lock().unwrap().take().expect("token endpoint was not called");
    assert_eq!(form.get("grant_type").map(String::as_str), Some(JWT_BEARER_GRANT_TYPE));

    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_audience(&[endpoint.as_str()]);
    let key = DecodingKey::from_rsa_pem(TEST_PUBLIC_KEY.as_bytes())?;
    let claims = decode::<AssertionClaims>(&form["assertion"], &key, &validation)?.claims;

    assert_eq!(claims.iss, TEST_ISSUER);
    assert_eq!(claims.scope, format!("{TEST_SCOPE} openid"));
    assert_eq!(claims.sub.as_deref(), Some("admin@example.com"));

    handle.abort();
    Ok(())
}
