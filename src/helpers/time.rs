use chrono::{DateTime, Utc};
use tokio::time::Instant;

pub fn now_u64() -> u64 {
    now_i64() as u64
}

pub fn now_i64() -> i64 {
    Utc::now().timestamp()
}

pub fn to_datetime(unix_ts: u64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(unix_ts as i64, 0)
}

pub fn get_instant() -> Instant {
    Instant::now()
}
