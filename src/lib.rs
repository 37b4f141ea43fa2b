//! # FCM Token Library
//!
//! Exchanges a service-account key for an OAuth2 access token through the
//! JWT bearer grant, the way Firebase Cloud Messaging clients authenticate.
//!
//! Modules:
//! - `credentials`: key file parsing and assertion signing
//! - `fetcher`: the single token exchange
//! - `token`: access token and endpoint response decoding
//! - `config`: optional YAML settings merged with the command line
//! - `app`: command-line surface used by the `fcm-token` binary

pub mod app;
pub mod config;
pub mod credentials;
pub mod error;
pub mod fetcher;
pub mod helpers;
pub mod output;
pub mod token;
pub mod utils;

#[cfg(test)]
mod tests;


pub use crate::credentials::ServiceAccountCredential;
pub use crate::error::{AuthError, CredentialError, FetchError};
pub use crate::fetcher::TokenFetcher;
pub use crate::token::AccessToken;
