use std::fmt;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::CredentialError;
use crate::utils::constants::SERVICE_ACCOUNT_TYPE;

/// Subset of the JSON key file downloaded from the cloud console.
/// Everything is optional here so that a missing field reports its name.
#[derive(Deserialize)]
struct KeyFile {
    #[serde(rename = "type")]
    key_type: Option<String>,
    project_id: Option<String>,
    private_key_id: Option<String>,
    private_key: Option<String>,
    client_email: Option<String>,
    token_uri: Option<String>,
}

/// A parsed service-account key. Immutable once loaded.
#[derive(Clone)]
pub struct ServiceAccountCredential {
    /// Issuer of the assertion (`client_email`).
    pub client_email: String,
    /// PEM encoded RSA private key.
    pub private_key: String,
    /// Sent as the `kid` JWT header when present.
    pub private_key_id: Option<String>,
    pub token_uri: Url,
    pub project_id: Option<String>,
}

impl fmt::Debug for ServiceAccountCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountCredential")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri.as_str())
            .field("project_id", &self.project_id)
            .finish()
    }
}

impl ServiceAccountCredential {
    /// Read and parse a key file.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, CredentialError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| CredentialError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let credential = Self::from_json(&content)?;
        debug!(
            path = %path.display(),
            issuer = %credential.client_email,
            key_id = ?credential.private_key_id,
            project = ?credential.project_id,
            "service account credential loaded"
        );
        Ok(credential)
    }

    pub fn from_json(content: &str) -> Result<Self, CredentialError> {
        let key_file: KeyFile = serde_json::from_str(content).map_err(CredentialError::Parse)?;

        if let Some(key_type) = key_file.key_type.as_deref() {
            if key_type != SERVICE_ACCOUNT_TYPE {
                return Err(CredentialError::UnsupportedType(key_type.to_owned()));
            }
        }

        let client_email = required("client_email", key_file.client_email)?;
        let private_key = required("private_key", key_file.private_key)?;
        let token_uri = parse_token_uri(&required("token_uri", key_file.token_uri)?)?;

        Ok(Self {
            client_email,
            private_key,
            private_key_id: key_file.private_key_id.filter(|id| !id.is_empty()),
            token_uri,
            project_id: key_file.project_id,
        })
    }

    /// Point the exchange (and the assertion audience) at another endpoint.
    pub fn with_token_uri(mut self, token_uri: Url) -> Self {
        self.token_uri = token_uri;
        self
    }
}

pub fn parse_token_uri(uri: &str) -> Result<Url, CredentialError> {
    Url::parse(uri)
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
        .ok_or_else(|| CredentialError::InvalidTokenUri(uri.to_owned()))
}

fn required(field: &'static str, value: Option<String>) -> Result<String, CredentialError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(CredentialError::MissingField(field))
}
