use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub const APP_NAME: &str = "perfolio";

/// Fluid VaultResolver on Ethereum mainnet
pub const DEFAULT_RESOLVER: &str = "0x394Ce45678e0019c0045194a561E2bEd0FCc6Cf0";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub app: AppConfig,
    pub rpc: RpcConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Sent as the `X-Client` header
    pub client_name: String,
    pub timeout_secs: u64,
    /// Skip TLS certificate verification (for hosts with missing CA certs)
    pub insecure: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.perfolio.ai/v1/".to_string(),
            client_name: "perfolio-cli".to_string(),
            timeout_secs: 30,
            insecure: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub splash_ms: u64,
    pub store_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            splash_ms: 2000,
            store_path: PathBuf::from(".perfolio/session.toml"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcConfig {
    pub url: Option<String>,
    pub resolver: String,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: None,
            resolver: DEFAULT_RESOLVER.to_string(),
        }
    }
}

impl Config {
    /// Apply `PERFOLIO_*` overrides. `lookup` is normally `std::env::var`.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup("PERFOLIO_API_BASE_URL") {
            self.api.base_url = base_url;
        }
        if let Some(url) = lookup("PERFOLIO_RPC_URL") {
            self.rpc.url = Some(url);
        }
        if let Some(path) = lookup("PERFOLIO_STORE_PATH") {
            self.app.store_path = PathBuf::from(path);
        }
        if let Some(flag) = lookup("PERFOLIO_INSECURE") {
            self.api.insecure = matches!(flag.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
    }
}

/// Load from an explicit file, or from the per-user config file when none is
/// given, then apply environment overrides.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let mut config = match path {
        Some(path) => load_config_file(path)?,
        None => confy::load::<Config>(APP_NAME, None).map_err(|e| Error::Config(e.to_string()))?,
    };
    config.apply_overrides(|key| std::env::var(key).ok());
    Ok(config)
}

pub fn load_config_file(path: &Path) -> Result<Config> {
    let config_str = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("failed to read {}: {}", path.display(), e)))?;
    toml::from_str(&config_str).map_err(|e| Error::Config(e.to_string()))
}

pub fn save_config(config: &Config, path: &Path) -> Result<()> {
    let config_str = toml::to_string_pretty(config).map_err(|e| Error::Config(e.to_string()))?;
    fs::write(path, config_str)
        .map_err(|e| Error::Config(format!("failed to write {}: {}", path.display(), e)))?;
    Ok(())
}
