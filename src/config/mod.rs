use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub providers: ProviderConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_addr")]
    pub addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// "json" or "pretty"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: default_log_format(),
        }
    }
}

/// The extraction APIs. Backup order is failover priority.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_primary")]
    pub primary: String,
    #[serde(default = "default_backups")]
    pub backups: Vec<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            primary: default_primary(),
            backups: default_backups(),
        }
    }
}

fn default_addr() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_primary() -> String {
    "https://api-faa.my.id/faa/aio".to_string()
}

fn default_backups() -> Vec<String> {
    vec![
        "https://api.tiklydown.eu.org/api/download".to_string(),
        "https://www.tikwm.com/api/".to_string(),
    ]
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {path}"))?;
        toml::from_str(&contents).with_context(|| format!("failed to parse config file {path}"))
    }
}
