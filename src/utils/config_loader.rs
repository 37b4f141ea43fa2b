use std::path::Path;
use anyhow::{anyhow, Result};

use crate::config::loader::file_to_config;
use crate::config::settings::FetcherConfig;

pub async fn run(config_path: &Path) -> Result<FetcherConfig> {
    file_to_config(config_path)
        .await
        .map_err(|e| anyhow!("Invalid config format: {:#}", e))
}
