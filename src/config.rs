use crate::error::{DirectoryError, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default = "default_csv_path")]
    pub csv_path: String,
    #[serde(default = "default_db_path")]
    pub db_path: String,
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

fn default_csv_path() -> String {
    "data/sample.csv".to_string()
}

fn default_db_path() -> String {
    "bizhours.db".to_string()
}

fn default_bind_addr() -> String {
    "127.0.0.1:8000".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            csv_path: default_csv_path(),
            db_path: default_db_path(),
            bind_addr: default_bind_addr(),
        }
    }
}

impl Config {
    /// Load `config.toml` from the working directory, falling back to
    /// defaults when the file is absent. A file that exists but fails to
    /// parse is a configuration error, not a silent fallback.
    pub fn load() -> Result<Self> {
        let config_path = "config.toml";
        if !Path::new(config_path).exists() {
            return Ok(Self::default());
        }

        let config_content = fs::read_to_string(config_path).map_err(|e| {
            DirectoryError::Config(format!(
                "Failed to read config file '{}': {}",
                config_path, e
            ))
        })?;

        let config: Config = toml::from_str(&config_content)?;
        Ok(config)
    }
}
