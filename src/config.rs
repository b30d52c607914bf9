use std::fs;
use std::path::PathBuf;

use serde::Deserialize;
use xdg::BaseDirectories;

use crate::error::{GiftError, Result};
use crate::timestamp::DEFAULT_VALIDITY_DAYS;

pub const XDG_PREFIX: &str = "mystery-gift";
pub const DEFAULT_URL: &str = "ws://127.0.0.1:8080/mysterygift";
pub const DEFAULT_GIFTS_PATH: &str = "gifts.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub probe: ProbeCfg,
    pub refresh: RefreshCfg,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProbeCfg {
    pub url: String,
}

impl Default for ProbeCfg {
    fn default() -> Self {
        Self { url: DEFAULT_URL.to_string() }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RefreshCfg {
    pub path: PathBuf,
    /// Top-level key holding the gift records.
    pub collection: String,
    pub start_field: String,
    pub end_field: String,
    pub validity_days: i64,
    /// Write to a sibling temp file and rename over the original. Off by
    /// default: the gift server only reloads on in-place writes.
    pub atomic_write: bool,
}

impl Default for RefreshCfg {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_GIFTS_PATH),
            collection: "mysterygift".to_string(),
            start_field: "beginningDate".to_string(),
            end_field: "endDate".to_string(),
            validity_days: DEFAULT_VALIDITY_DAYS,
            atomic_write: false,
        }
    }
}

impl Config {
    /// Parses without checking values; see [`Config::validate`].
    pub fn from_toml_str(s: &str) -> std::result::Result<Self, String> {
        toml::from_str(s).map_err(|e| e.to_string())
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| Err(GiftError::InvalidConfig { message });
        if !self.probe.url.starts_with("ws://") {
            return invalid(format!("probe.url must be a ws:// url, got '{}'", self.probe.url));
        }
        if !(1..=36_500).contains(&self.refresh.validity_days) {
            return invalid(format!(
                "refresh.validity_days must be between 1 and 36500, got {}",
                self.refresh.validity_days
            ));
        }
        if self.refresh.start_field == self.refresh.end_field {
            return invalid("refresh.start_field and refresh.end_field must differ".into());
        }
        Ok(())
    }
}

/// Where the config came from, for the startup log line.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub config: Config,
    pub config_path: Option<PathBuf>,
    pub env_path: Option<PathBuf>,
}

/// Loads `.env` and `config.toml` from `$XDG_CONFIG_HOME/mystery-gift/`.
pub fn load() -> Result<Loaded> {
    let xdg = BaseDirectories::with_prefix(XDG_PREFIX)
        .map_err(|e| GiftError::XdgError { message: e.to_string() })?;
    load_from(xdg.find_config_file(".env"), xdg.find_config_file("config.toml"))
}

/// Both files are optional; without them every setting keeps its built-in
/// default. A file that exists but does not parse is an error.
pub fn load_from(env_path: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<Loaded> {
    if let Some(path) = &env_path {
        dotenvy::from_path(path)
            .map_err(|e| GiftError::EnvLoadError { path: path.clone(), source: e })?;
    }

    let config = match &config_path {
        Some(path) => {
            let cfg_str = fs::read_to_string(path)
                .map_err(|e| GiftError::ReadError { path: path.clone(), source: e })?;
            Config::from_toml_str(&cfg_str).map_err(|msg| GiftError::ParseError {
                path: path.clone(),
                kind: "toml",
                message: msg,
            })?
        }
        None => Config::default(),
    };
    config.validate()?;

    Ok(Loaded { config, config_path, env_path })
}
