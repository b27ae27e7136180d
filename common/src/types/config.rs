use serde::Deserialize;
use std::time::Duration;
use url::Url;

pub const DEFAULT_USER_AGENT: &str = "wegweiser/0.1 (mobility journey finder; +https://lifehacksgermany.com)";

#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1")]
    Version1 {
        #[serde(default)]
        server: ServerConfig,
        transit: UpstreamConfig,
        weather: UpstreamConfig,
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { listen: default_listen() }
    }
}

/// Connection settings for one of the public APIs we aggregate
#[derive(Debug, Deserialize, Clone)]
pub struct UpstreamConfig {
    pub base_url: Url,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    // Applies to each single request, including connecting and reading the body
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".to_owned()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_owned()
}

fn default_timeout_secs() -> u64 {
    12
}
