use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dns::types::DnsProvider;
use crate::dns::validation::validate_address;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Config directory not found")]
    ConfigDirNotFound,
    #[error("invalid address for provider {name}: {address}")]
    InvalidProvider { name: String, address: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Built-in provider table; insertion order is presentation order.
fn default_providers() -> Vec<DnsProvider> {
    vec![
        DnsProvider::new("Google", "8.8.8.8"),
        DnsProvider::new("Cloudflare", "1.1.1.1"),
        DnsProvider::new("OpenDNS", "208.67.222.222"),
        DnsProvider::new("Quad9", "9.9.9.9"),
    ]
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct AppConfig {
    pub providers: Vec<DnsProvider>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            providers: default_providers(),
        }
    }
}

impl AppConfig {
    pub fn find_provider(&self, name: &str) -> Option<&DnsProvider> {
        self.providers
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    fn validate(&self) -> Result<()> {
        for provider in &self.providers {
            if !validate_address(&provider.address) {
                return Err(ConfigError::InvalidProvider {
                    name: provider.name.clone(),
                    address: provider.address.clone(),
                });
            }
        }
        Ok(())
    }
}

pub fn get_config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .or_else(dirs::data_local_dir)
        .ok_or(ConfigError::ConfigDirNotFound)?;

    let app_config_dir = config_dir.join("dns-switcher");
    Ok(app_config_dir.join("config.jsonc"))
}

pub fn ensure_config_dir() -> Result<PathBuf> {
    let config_path = get_config_path()?;
    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(config_path)
}

/// Loads the provider table. A config file replaces the built-in table
/// wholesale; no file means the built-in defaults.
pub fn load_config() -> Result<AppConfig> {
    let config_path = get_config_path()?;

    if !config_path.exists() {
        return Ok(AppConfig::default());
    }

    let content = fs::read_to_string(&config_path)?;
    let stripped = json_comments::StripComments::new(content.as_bytes());
    let config: AppConfig = serde_json::from_reader(stripped)?;
    config.validate()?;

    Ok(config)
}

/// Saves the provider table to the config file.
/// Note: Comments in the original file will not be preserved.
pub fn save_config(config: &AppConfig) -> Result<()> {
    let config_path = ensure_config_dir()?;
    let json = serde_json::to_string_pretty(config)?;
    fs::write(&config_path, json)?;
    Ok(())
}
