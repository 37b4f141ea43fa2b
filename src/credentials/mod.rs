//! Service-account credentials and the signed assertion built from them.

pub mod assertion;
pub mod service_account;

pub use assertion::{Assertion, AssertionClaims};
pub use service_account::ServiceAccountCredential;
