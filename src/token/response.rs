//! Decoding of token endpoint responses.

use reqwest::StatusCode;
use serde::Deserialize;
use tracing::warn;

use crate::error::AuthError;
use crate::token::access_token::AccessToken;
use crate::utils::constants::{DEFAULT_TOKEN_TYPE, ERROR_BODY_PREVIEW_CHARS};

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub expires_in: Option<ExpiresIn>,
    pub token_type: Option<String>,
}

/// Some providers quote the lifetime. Anything that is not a non-negative
/// integer lands in `Other` and is ignored.
#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum ExpiresIn {
    Seconds(u64),
    Text(String),
    Other(serde_json::Value),
}

impl ExpiresIn {
    fn seconds(&self) -> Option<u64> {
        match self {
            ExpiresIn::Seconds(secs) => Some(*secs),
            ExpiresIn::Text(text) => text.trim().parse().ok(),
            ExpiresIn::Other(_) => None,
        }
    }
}

/// RFC 6749 section 5.2 error body.
#[derive(Debug, Deserialize, Default)]
pub struct ErrorResponse {
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Decode a 2xx body. Without `expires_in` the token is assumed to live as
/// long as the assertion that bought it.
pub fn parse_token_response(
    body: &str,
    now_unix_ts: u64,
    fallback_exp_unix_ts: u64,
) -> Result<AccessToken, AuthError> {
    let response: TokenResponse = serde_json::from_str(body)
        .map_err(|e| AuthError::InvalidResponse(format!("body is not a token response: {e}")))?;

    let value = response
        .access_token
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AuthError::InvalidResponse("access_token is missing or empty".to_owned()))?;

    let exp_unix_ts = match response.expires_in.as_ref() {
        Some(expires_in) => match expires_in
            .seconds()
            .and_then(|secs| now_unix_ts.checked_add(secs))
        {
            Some(exp_unix_ts) => exp_unix_ts,
            None => {
                warn!(expires_in = ?expires_in, "unusable expires_in, using assertion expiry");
                fallback_exp_unix_ts
            }
        },
        None => fallback_exp_unix_ts,
    };

    let token_type = response
        .token_type
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_TOKEN_TYPE.to_owned());

    Ok(AccessToken::new(value, token_type, exp_unix_ts))
}

/// Turn a non-2xx answer into an [`AuthError`], keeping whatever the provider said.
pub fn parse_error_response(status: StatusCode, body: &str) -> AuthError {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(response) if response.error.is_some() || response.error_description.is_some() => {
            AuthError::Rejected {
                status,
                error: response.error,
                description: response.error_description,
            }
        }
        _ => AuthError::Rejected {
            status,
            error: None,
            description: preview(body),
        },
    }
}

fn preview(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    Some(body.chars().take(ERROR_BODY_PREVIEW_CHARS).collect())
}
