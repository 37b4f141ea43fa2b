//! Command-line surface shared by the binary and the tests.

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::debug;

use crate::config::settings::{FetcherConfig, LogFormat, LoggingConfig, Settings};
use crate::error::FetchError;
use crate::fetcher::TokenFetcher;
use crate::output::{self, OutputFormat};
use crate::token::access_token::AccessToken;
use crate::utils::config_loader;
use crate::utils::logging::{self, LogLevel};

#[derive(Parser, Debug)]
#[command(name = "fcm-token", author, version, about, long_about = None)]
pub struct Cli {
    /// Optional YAML file with the same settings as the flags below
    #[arg(short, long, env = "CONFIG")]
    pub config: Option<PathBuf>,
    /// Service-account JSON key file
    #[arg(short, long, env = "KEY_FILE")]
    pub key_file: Option<PathBuf>,
    /// Scope to request, repeatable
    #[arg(short, long = "scope")]
    pub scopes: Vec<String>,
    #[arg(long)]
    pub subject: Option<String>,
    #[arg(long)]
    pub token_uri: Option<String>,
    #[arg(long)]
    pub timeout_ms: Option<u64>,
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    pub log_level: Option<LogLevel>,
    #[arg(long, env = "LOG_FORMAT", value_enum)]
    pub log_format: Option<LogFormat>,
}

impl Cli {
    /// Flags as a config layer that takes precedence over the file.
    pub fn overrides(&self) -> FetcherConfig {
        let logging = (self.log_level.is_some() || self.log_format.is_some()).then(|| {
            LoggingConfig::new(
                self.log_level.map(|level| level.as_str().to_owned()),
                self.log_format,
            )
        });

        FetcherConfig {
            key_file: self.key_file.to_owned(),
            scopes: (!self.scopes.is_empty()).then(|| self.scopes.to_owned()),
            subject: self.subject.to_owned(),
            token_uri: self.token_uri.to_owned(),
            timeout_ms: self.timeout_ms,
            output: self.output,
            logging,
        }
    }
}

/// Resolve settings, fetch one token and write it to `out`.
pub async fn run<W: Write>(cli: Cli, out: &mut W) -> Result<AccessToken> {
    let file_config = match &cli.config {
        Some(path) => config_loader::run(path).await?,
        None => FetcherConfig::default(),
    };
    let settings = Settings::resolve(cli.overrides(), file_config)?;
    logging::init_logging(&settings.log_level, settings.log_format);
    debug!(?settings, "settings resolved");

    let token = fetch(&settings).await?;
    output::write_token(out, &token, settings.output)?;
    Ok(token)
}

pub async fn fetch(settings: &Settings) -> Result<AccessToken, FetchError> {
    let mut fetcher = TokenFetcher::new(Duration::from_millis(settings.timeout_ms))?;
    if let Some(token_uri) = &settings.token_uri {
        fetcher = fetcher.with_token_uri(token_uri)?;
    }
    if let Some(subject) = &settings.subject {
        fetcher = fetcher.with_subject(subject.to_owned());
    }

    fetcher.fetch_token(&settings.key_file, &settings.scopes).await
}
