use anyhow::Result;
use clap::Parser;
use fcm_token::app::{self, Cli};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Cli::parse();
    app::run(args, &mut std::io::stdout()).await?;
    Ok(())
}
