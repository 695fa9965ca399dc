use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Address of the RSS feed to ingest
    pub feed_url: String,
    /// Prefix the feed URL is appended to; the relay re-issues the request server-side
    #[serde(default = "default_relay_url")]
    pub relay_url: String,
    /// Delay in milliseconds between mount and the single fetch
    #[serde(default = "default_fetch_delay_ms")]
    pub fetch_delay_ms: u64,
    /// HTTP timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Author shown when an item has no creator
    #[serde(default = "default_author")]
    pub default_author: String,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

fn default_relay_url() -> String {
    "https://corsproxy.io/?".to_string()
}

fn default_fetch_delay_ms() -> u64 {
    2000
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_author() -> String {
    "Pranav Reveendran".to_string()
}

fn default_bind_address() -> String {
    "0.0.0.0:3000".to_string()
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Parse config from a TOML string (useful for testing)
    pub fn from_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    pub fn fetch_delay(&self) -> Duration {
        Duration::from_millis(self.fetch_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
