use chrono::{DateTime, Utc};

use crate::helpers::time::to_datetime;

/// Bearer token issued by the identity provider. Never cached or persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub value: String,
    pub token_type: String,
    pub exp_unix_ts: u64, // UNIX TIMESTAMP
}

impl AccessToken {
    pub fn new(value: String, token_type: String, exp_unix_ts: u64) -> Self {
        Self {
            value,
            token_type,
            exp_unix_ts,
        }
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        to_datetime(self.exp_unix_ts)
    }
}
