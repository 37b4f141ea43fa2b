use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::ValueEnum;
use serde::Deserialize;

use crate::output::OutputFormat;
use crate::utils::constants::{
    DEFAULT_HTTP_TIMEOUT_MS, DEFAULT_KEY_FILE, DEFAULT_LOG_LEVEL, FIREBASE_MESSAGING_SCOPE,
};

/// ================================
/// Fetcher configuration
/// ================================
/// Shape of the optional YAML file. The command line produces the same
/// structure, so both layers merge field by field.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FetcherConfig {
    pub key_file: Option<PathBuf>,
    pub scopes: Option<Vec<String>>,
    /// user to impersonate (domain-wide delegation)
    pub subject: Option<String>,
    /// overrides the key file's token_uri
    pub token_uri: Option<String>,
    pub timeout_ms: Option<u64>,
    pub output: Option<OutputFormat>,
    pub logging: Option<LoggingConfig>,
}

impl FetcherConfig {
    /// Fields set on `self` win, the rest come from `fallback`.
    pub fn or(self, fallback: FetcherConfig) -> FetcherConfig {
        let logging = match (self.logging, fallback.logging) {
            (Some(primary), Some(secondary)) => Some(primary.or(secondary)),
            (primary, secondary) => primary.or(secondary),
        };

        FetcherConfig {
            key_file: self.key_file.or(fallback.key_file),
            scopes: self.scopes.or(fallback.scopes),
            subject: self.subject.or(fallback.subject),
            token_uri: self.token_uri.or(fallback.token_uri),
            timeout_ms: self.timeout_ms.or(fallback.timeout_ms),
            output: self.output.or(fallback.output),
            logging,
        }
    }
}

/// ================================
/// Logging
/// ================================
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: Option<String>, // allowed: trace, debug, info, warn, error
    pub format: Option<LogFormat>,
}

impl LoggingConfig {
    pub fn new(level: Option<String>, format: Option<LogFormat>) -> Self {
        Self { level, format }
    }

    fn or(self, fallback: LoggingConfig) -> LoggingConfig {
        LoggingConfig {
            level: self.level.or(fallback.level),
            format: self.format.or(fallback.format),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Compact,
}

/// ================================
/// Resolved settings
/// ================================
/// Everything a run needs, defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub key_file: PathBuf,
    pub scopes: Vec<String>,
    pub subject: Option<String>,
    pub token_uri: Option<String>,
    pub timeout_ms: u64,
    pub output: OutputFormat,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Settings {
    pub fn resolve(overrides: FetcherConfig, file: FetcherConfig) -> Result<Settings> {
        let merged = overrides.or(file);
        let logging = merged.logging.unwrap_or_default();

        let timeout_ms = merged.timeout_ms.unwrap_or(DEFAULT_HTTP_TIMEOUT_MS);
        if timeout_ms == 0 {
            return Err(anyhow!("timeout_ms must be greater than 0"));
        }

        Ok(Settings {
            key_file: merged
                .key_file
                .unwrap_or_else(|| PathBuf::from(DEFAULT_KEY_FILE)),
            scopes: merged
                .scopes
                .unwrap_or_else(|| vec![FIREBASE_MESSAGING_SCOPE.to_owned()]),
            subject: merged.subject,
            token_uri: merged.token_uri,
            timeout_ms,
            output: merged.output.unwrap_or_default(),
            log_level: logging
                .level
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_owned()),
            log_format: logging.format.unwrap_or_default(),
        })
    }
}
