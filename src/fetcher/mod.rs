//! The token fetcher: credential in, bearer token out.
//!
//! A fetch is a single linear request: load the key, sign an assertion,
//! POST it to the token endpoint and decode the answer. The only suspension
//! points are the key file read and the one network round trip.

use std::path::Path;
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info, warn};
use url::Url;

use crate::credentials::assertion::Assertion;
use crate::credentials::service_account::{parse_token_uri, ServiceAccountCredential};
use crate::error::{CredentialError, FetchError};
use crate::helpers::time::{get_instant, now_u64};
use crate::token::access_token::AccessToken;
use crate::token::response::{parse_error_response, parse_token_response};
use crate::utils::constants::JWT_BEARER_GRANT_TYPE;

#[derive(Debug, Clone)]
pub struct TokenFetcher {
    client: Client,
    token_uri: Option<Url>,
    subject: Option<String>,
}

impl TokenFetcher {
    /// Build a fetcher whose single request is bounded by `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FetchError::Network)?;

        Ok(Self::with_client(client))
    }

    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            token_uri: None,
            subject: None,
        }
    }

    /// Exchange against `token_uri` instead of the key file's endpoint.
    pub fn with_token_uri(mut self, token_uri: &str) -> Result<Self, CredentialError> {
        self.token_uri = Some(parse_token_uri(token_uri)?);
        Ok(self)
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Load the key file at `credential_path` and exchange it for a token
    /// carrying `scopes`. Credential problems are reported before any
    /// request is made.
    pub async fn fetch_token(
        &self,
        credential_path: impl AsRef<Path>,
        scopes: &[String],
    ) -> Result<AccessToken, FetchError> {
        let credential = ServiceAccountCredential::from_file(credential_path).await?;
        self.fetch_token_with(credential, scopes).await
    }

    pub async fn fetch_token_with(
        &self,
        credential: ServiceAccountCredential,
        scopes: &[String],
    ) -> Result<AccessToken, FetchError> {
        let credential = match &self.token_uri {
            Some(token_uri) => credential.with_token_uri(token_uri.clone()),
            None => credential,
        };

        let issued_at = now_u64();
        let assertion = Assertion::new(&credential, scopes, self.subject.as_deref(), issued_at)?;
        let signed = assertion.sign()?;
        let claims = assertion.claims();

        info!(
            endpoint = %credential.token_uri,
            issuer = %claims.iss,
            scopes = %claims.scope,
            "exchanging assertion for access token"
        );

        let start = get_instant();
        let response = self
            .client
            .post(credential.token_uri.clone())
            .form(&[
                ("grant_type", JWT_BEARER_GRANT_TYPE),
                ("assertion", signed.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                warn!(endpoint = %credential.token_uri, error = %e, "token request failed");
                FetchError::Network(e)
            })?;

        let status = response.status();
        let body = response.text().await.map_err(FetchError::Network)?;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        if !status.is_success() {
            let err = parse_error_response(status, &body);
            warn!(%status, elapsed_ms, error = %err, "token endpoint rejected assertion");
            return Err(err.into());
        }

        let token = parse_token_response(&body, issued_at, claims.exp)?;
        debug!(%status, elapsed_ms, token_type = %token.token_type, "token endpoint answered");
        info!(
            expires_at = ?token.expires_at(),
            "access token issued for '{}'",
            claims.iss
        );
        Ok(token)
    }
}
