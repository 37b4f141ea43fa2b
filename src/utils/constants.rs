//! Shared constants and invariants

pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_KEY_FILE: &str = "./service-account.json";
pub const DEFAULT_LOG_LEVEL: &str = "warn";

pub const FIREBASE_MESSAGING_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";

// RFC 7523 JWT bearer grant
pub const JWT_BEARER_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
/// Google refuses assertions living longer than one hour.
pub const ASSERTION_LIFETIME_SECS: u64 = 3600;

pub const SERVICE_ACCOUNT_TYPE: &str = "service_account";
pub const DEFAULT_TOKEN_TYPE: &str = "Bearer";
pub const ERROR_BODY_PREVIEW_CHARS: usize = 512;
