use crate::lastfm::DEFAULT_API_URL;
use serde::Deserialize;
use std::{
    env,
    path::{Path, PathBuf},
};
use tokio::fs;

pub const ENV_PREFIX: &str = "ELABORATE_CHARTS_";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("setting '{0}' is not configured")]
    Missing(&'static str),
    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: String, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: String,
    /// Only signed upstream methods need this; none are called yet.
    pub api_secret: Option<String>,
    pub api_url: String,
    pub cors: bool,
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    api_key: Option<String>,
    api_secret: Option<String>,
    api_url: Option<String>,
    cors: Option<bool>,
}

pub fn resolve_config_path() -> PathBuf {
    if let Ok(path) = env::var(format!("{ENV_PREFIX}CONFIG")) {
        return PathBuf::from(path);
    }

    PathBuf::from("config.json")
}

pub async fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    load_config_with(path, |name| env::var(name).ok()).await
}

/// Reads the optional config file, then applies prefixed overrides from `lookup`.
pub async fn load_config_with<F>(path: &Path, lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let file = match fs::read(path).await {
        Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => FileConfig::default(),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let var = |key: &str| lookup(&format!("{ENV_PREFIX}{key}")).filter(|value| !value.is_empty());

    let api_key = var("API_KEY")
        .or(file.api_key)
        .ok_or(ConfigError::Missing("api_key"))?;
    let api_secret = var("API_SECRET").or(file.api_secret);
    let api_url = var("API_URL")
        .or(file.api_url)
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());
    let cors = match var("CORS") {
        Some(value) => parse_flag(&format!("{ENV_PREFIX}CORS"), &value)?,
        None => file.cors.unwrap_or(cfg!(debug_assertions)),
    };

    Ok(AppConfig {
        api_key,
        api_secret,
        api_url,
        cors,
    })
}

fn parse_flag(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name: name.to_string(),
            value: value.to_string(),
        }),
    }
}
