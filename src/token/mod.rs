pub mod access_token;
pub mod response;

pub use access_token::AccessToken;
