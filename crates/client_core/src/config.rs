use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_API_URL: &str = "http://localhost:3000";
pub const CONFIG_FILE_NAME: &str = "pdfmaster.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_url: String,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub download_dir: PathBuf,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            request_timeout_secs: 120,
            connect_timeout_secs: 10,
            download_dir: PathBuf::from("."),
        }
    }
}

impl ClientSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Base URL without a trailing slash, ready for endpoint paths to be appended.
    pub fn base_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    api_url: Option<String>,
    request_timeout_secs: Option<u64>,
    connect_timeout_secs: Option<u64>,
    download_dir: Option<PathBuf>,
}

/// Defaults, then `pdfmaster.toml` in the working directory, then environment.
pub fn load_settings() -> Result<ClientSettings, ConfigError> {
    load_settings_from(Path::new(CONFIG_FILE_NAME), |key| std::env::var(key).ok())
}

pub fn load_settings_from(
    config_path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ClientSettings, ConfigError> {
    let mut settings = ClientSettings::default();

    if config_path.exists() {
        let raw = fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
            path: config_path.to_path_buf(),
            source,
        })?;
        let file_cfg: FileSettings = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: config_path.to_path_buf(),
            source,
        })?;
        apply_file_settings(&mut settings, file_cfg)?;
    }

    apply_env_overrides(&mut settings, env)?;
    validate_api_url(&settings.api_url)?;
    Ok(settings)
}

fn apply_file_settings(
    settings: &mut ClientSettings,
    file_cfg: FileSettings,
) -> Result<(), ConfigError> {
    if let Some(v) = file_cfg.api_url {
        settings.api_url = v;
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        settings.request_timeout_secs = validate_secs("request_timeout_secs", v)?;
    }
    if let Some(v) = file_cfg.connect_timeout_secs {
        settings.connect_timeout_secs = validate_secs("connect_timeout_secs", v)?;
    }
    if let Some(v) = file_cfg.download_dir {
        settings.download_dir = v;
    }
    Ok(())
}

fn apply_env_overrides(
    settings: &mut ClientSettings,
    env: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    if let Some(v) = env("PDF_MASTER_API_URL") {
        settings.api_url = v;
    }
    if let Some(v) = env("APP__API_URL") {
        settings.api_url = v;
    }

    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        settings.request_timeout_secs = parse_secs("APP__REQUEST_TIMEOUT_SECS", v)?;
    }
    if let Some(v) = env("APP__CONNECT_TIMEOUT_SECS") {
        settings.connect_timeout_secs = parse_secs("APP__CONNECT_TIMEOUT_SECS", v)?;
    }

    if let Some(v) = env("APP__DOWNLOAD_DIR") {
        settings.download_dir = PathBuf::from(v);
    }

    Ok(())
}

fn parse_secs(key: &'static str, value: String) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(secs) => validate_secs(key, secs),
        Err(_) => Err(ConfigError::InvalidNumber { key, value }),
    }
}

/// A zero timeout would fail every request before it is sent.
fn validate_secs(key: &'static str, secs: u64) -> Result<u64, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::InvalidNumber {
            key,
            value: secs.to_string(),
        });
    }
    Ok(secs)
}

pub fn validate_api_url(raw: &str) -> Result<(), ConfigError> {
    let parsed = Url::parse(raw).map_err(|source| ConfigError::ApiUrl {
        value: raw.to_string(),
        source,
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::ApiUrlScheme(other.to_string())),
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
