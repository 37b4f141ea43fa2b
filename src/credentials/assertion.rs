use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::credentials::service_account::ServiceAccountCredential;
use crate::error::CredentialError;
use crate::utils::constants::ASSERTION_LIFETIME_SECS;

/// Claims of the JWT presented to the token endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssertionClaims {
    pub iss: String,
    /// Space separated, in the order given.
    pub scope: String,
    pub aud: String,
    pub iat: u64,
    pub exp: u64,
    /// User impersonated through domain-wide delegation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
}

/// An unsigned assertion bound to the credential that will sign it.
#[derive(Debug)]
pub struct Assertion<'a> {
    credential: &'a ServiceAccountCredential,
    claims: AssertionClaims,
}

impl<'a> Assertion<'a> {
    pub fn new(
        credential: &'a ServiceAccountCredential,
        scopes: &[String],
        subject: Option<&str>,
        issued_at: u64,
    ) -> Result<Self, CredentialError> {
        if scopes.is_empty() || scopes.iter().any(|scope| scope.trim().is_empty()) {
            return Err(CredentialError::EmptyScopes);
        }

        let claims = AssertionClaims {
            iss: credential.client_email.to_owned(),
            scope: scopes.join(" "),
            aud: credential.token_uri.to_string(),
            iat: issued_at,
            exp: issued_at + ASSERTION_LIFETIME_SECS,
            sub: subject.map(str::to_owned),
        };

        Ok(Self { credential, claims })
    }

    pub fn claims(&self) -> &AssertionClaims {
        &self.claims
    }

    /// Sign with RS256, producing the compact JWS sent as `assertion`.
    pub fn sign(&self) -> Result<String, CredentialError> {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.credential.private_key_id.to_owned();

        let key = EncodingKey::from_rsa_pem(self.credential.private_key.as_bytes())
            .map_err(CredentialError::InvalidKey)?;

        encode(&header, &self.claims, &key).map_err(CredentialError::Signing)
    }
}
