use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Default, Validate, Serialize, Deserialize)]
pub struct Config {
    #[validate]
    #[serde(default)]
    pub server: Server,

    #[validate]
    #[serde(flatten)]
    pub client: judgekit_client::Config,
}

#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
pub struct Server {
    #[validate(length(min = 1))]
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Upper bound for one execution request, in milliseconds.
    #[validate(range(min = 100, max = 600000))]
    #[serde(default)]
    pub request_deadline: Option<u64>,
}

fn default_host() -> String {
    "127.0.0.1".into()
}

fn default_port() -> u16 {
    8080
}

impl Default for Server {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_deadline: None,
        }
    }
}

impl Server {
    pub fn request_deadline(&self) -> Option<Duration> {
        self.request_deadline.map(Duration::from_millis)
    }
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Config> {
        let content = fs::read_to_string(&path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Config> {
        let mut config: Config = toml::from_str(content)?;
        config.client.judge.apply_env(|name| env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_env() -> Result<Config> {
        let config = Config {
            server: Server::default(),
            client: judgekit_client::Config::from_env()?,
        };
        config.validate()?;
        Ok(config)
    }
}
