use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::AppConfig;

/// Optional configuration file in the collection directory
pub const CONFIG_FILE: &str = "wrc.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Read `wrc.toml` from the collection directory. A missing file yields
/// the default configuration.
pub fn read_config(root: &Path) -> Result<AppConfig, ConfigError> {
    let path = root.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let text = fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        source: e,
    })?;
    toml::from_str(&text).map_err(|e| ConfigError::ParseError { path, source: e })
}
