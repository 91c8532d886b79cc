mod types;

pub use types::*;

use crate::{Error, Result};
use std::{env, path::Path};
use tracing::debug;

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

pub async fn load() -> Result<Config> {
    let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());
    load_from(&config_path, env::var(API_KEY_ENV).ok()).await
}

/// Reads the YAML file at `config_path` (defaults when it does not exist) and
/// applies the API key override.
pub async fn load_from(config_path: &str, api_key: Option<String>) -> Result<Config> {
    let mut config = if Path::new(config_path).exists() {
        debug!("Loading configuration from: {}", config_path);
        let config_str = tokio::fs::read_to_string(config_path).await?;
        serde_yaml::from_str::<Config>(&config_str)?
    } else {
        debug!("No configuration file at {}, using defaults", config_path);
        Config::default()
    };

    if let Some(key) = api_key.filter(|k| !k.is_empty()) {
        config.gemini.api_key = key;
    }

    if config.gemini.api_key.is_empty() {
        return Err(Error::config(format!(
            "{} is not set and no gemini.api_key is configured",
            API_KEY_ENV
        )));
    }

    Ok(config)
}
