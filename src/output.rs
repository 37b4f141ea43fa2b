use std::io::{self, Write};

use clap::ValueEnum;
use serde::Deserialize;
use serde_json::json;

use crate::token::access_token::AccessToken;

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// the token alone on one line
    #[default]
    Text,
    /// access_token, token_type and expires_at as a JSON object
    Json,
}

pub fn write_token<W: Write>(out: &mut W, token: &AccessToken, format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Text => writeln!(out, "{}", token.value)?,
        OutputFormat::Json => {
            let document = json!({
                "access_token": token.value,
                "token_type": token.token_type,
                "expires_at": token.expires_at().map(|at| at.to_rfc3339()),
            });
            serde_json::to_writer(&mut *out, &document)?;
            writeln!(out)?;
        }
    }
    out.flush()
}
