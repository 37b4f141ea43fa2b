//! Error kinds surfaced by a token fetch.
//!
//! Every failure lands in exactly one of three buckets: the credential could
//! not be turned into a signed assertion ([`CredentialError`]), the transport
//! failed ([`FetchError::Network`]), or the identity provider refused to
//! issue a token ([`AuthError`]). Nothing is retried.

use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("credential error")]
    Credential(#[from] CredentialError),
    #[error("network error")]
    Network(#[source] reqwest::Error),
    #[error("authorization error")]
    Auth(#[from] AuthError),
}

impl FetchError {
    pub fn is_credential(&self) -> bool {
        matches!(self, FetchError::Credential(_))
    }

    pub fn is_network(&self) -> bool {
        matches!(self, FetchError::Network(_))
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, FetchError::Auth(_))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Network(e) if e.is_timeout())
    }
}

/// Raised before any request leaves the process.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("failed to read key file '{}'", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("key file is not valid service-account JSON")]
    Parse(#[source] serde_json::Error),
    #[error("key file field '{0}' is missing or empty")]
    MissingField(&'static str),
    #[error("unsupported credential type '{0}', expected 'service_account'")]
    UnsupportedType(String),
    #[error("token_uri '{0}' is not an absolute http(s) URL")]
    InvalidTokenUri(String),
    #[error("private key is not a PEM encoded RSA key")]
    InvalidKey(#[source] jsonwebtoken::errors::Error),
    #[error("failed to sign assertion")]
    Signing(#[source] jsonwebtoken::errors::Error),
    #[error("scopes must be a non-empty list of non-blank strings")]
    EmptyScopes,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token endpoint answered {status}: {}", describe(.error, .description))]
    Rejected {
        status: StatusCode,
        error: Option<String>,
        description: Option<String>,
    },
    #[error("token endpoint returned an unusable response: {0}")]
    InvalidResponse(String),
}

impl AuthError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            AuthError::Rejected { status, .. } => Some(*status),
            AuthError::InvalidResponse(_) => None,
        }
    }
}

fn describe(error: &Option<String>, description: &Option<String>) -> String {
    match (error, description) {
        (Some(error), Some(description)) => format!("{error} ({description})"),
        (Some(error), None) => error.to_owned(),
        (None, Some(description)) => description.to_owned(),
        (None, None) => "no error details".to_owned(),
    }
}
