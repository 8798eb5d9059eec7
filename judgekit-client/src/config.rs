use std::env;
use std::fmt;
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
    pub judge: Judge,

    #[validate]
    #[serde(default)]
    pub fallback: Fallback,
}

#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
pub struct Judge {
    #[validate(length(min = 1))]
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[validate(length(min = 1))]
    #[serde(default = "default_api_host")]
    pub api_host: String,

    #[serde(default)]
    pub api_key: Option<Credential>,

    #[validate(length(min = 1))]
    #[serde(default = "default_auth_header")]
    pub auth_header: String,

    #[validate(length(min = 1))]
    #[serde(default = "default_host_header")]
    pub host_header: String,

    #[validate(range(min = 0.1, max = 60.0))]
    #[serde(default = "default_cpu_time_limit")]
    pub cpu_time_limit: f64, // seconds

    #[validate(range(min = 2048, max = 2097152))]
    #[serde(default = "default_memory_limit")]
    pub memory_limit: u64, // kilobytes

    #[serde(default = "default_wall_time_limit")]
    pub wall_time_limit: Option<f64>, // seconds

    #[validate(range(min = 1, max = 60000))]
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64, // milliseconds

    #[validate(range(min = 1, max = 600))]
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,

    #[validate(range(min = 100, max = 120000))]
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64, // milliseconds

    #[validate(range(min = 1, max = 16))]
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
pub struct Fallback {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Fixed seed for the heuristic evaluator; random when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

/// A secret that never shows up in `Debug` output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

fn default_base_url() -> String {
    "https://judge0-ce.p.rapidapi.com".into()
}

fn default_api_host() -> String {
    "judge0-ce.p.rapidapi.com".into()
}

fn default_auth_header() -> String {
    "X-RapidAPI-Key".into()
}

fn default_host_header() -> String {
    "X-RapidAPI-Host".into()
}

fn default_cpu_time_limit() -> f64 {
    2.0
}

fn default_memory_limit() -> u64 {
    128_000
}

fn default_wall_time_limit() -> Option<f64> {
    Some(10.0)
}

fn default_poll_interval() -> u64 {
    1000
}

fn default_max_poll_attempts() -> u32 {
    30
}

fn default_request_timeout() -> u64 {
    10_000
}

fn default_concurrency() -> usize {
    1
}

fn default_true() -> bool {
    true
}

impl Default for Judge {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_host: default_api_host(),
            api_key: None,
            auth_header: default_auth_header(),
            host_header: default_host_header(),
            cpu_time_limit: default_cpu_time_limit(),
            memory_limit: default_memory_limit(),
            wall_time_limit: default_wall_time_limit(),
            poll_interval: default_poll_interval(),
            max_poll_attempts: default_max_poll_attempts(),
            request_timeout: default_request_timeout(),
            concurrency: default_concurrency(),
        }
    }
}

impl Default for Fallback {
    fn default() -> Self {
        Self {
            enabled: true,
            seed: None,
        }
    }
}

impl Judge {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout)
    }

    /// The configured credential, if it is non-blank.
    pub fn credential(&self) -> Option<&Credential> {
        self.api_key.as_ref().filter(|key| !key.is_blank())
    }
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Config> {
        let content = fs::read_to_string(&path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Config> {
        let mut config: Config = toml::from_str(content)?;
        config.judge.apply_env(|name| env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus environment overrides, for deployments without a config file.
    pub fn from_env() -> Result<Config> {
        let mut config = Config::default();
        config.judge.apply_env(|name| env::var(name).ok());
        config.validate()?;
        Ok(config)
    }
}

impl Judge {
    /// `JUDGE0_API_KEY`, `JUDGE0_API_HOST` and `JUDGE0_BASE_URL` take precedence over the file.
    /// A host override without a base url override also moves the base url to that host.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        let non_empty = |name: &str| var(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("JUDGE0_API_KEY") {
            self.api_key = Some(Credential::new(key));
        }
        let base_url = non_empty("JUDGE0_BASE_URL");
        if let Some(host) = non_empty("JUDGE0_API_HOST") {
            if base_url.is_none() {
                self.base_url = format!("https://{}", host);
            }
            self.api_host = host;
        }
        if let Some(url) = base_url {
            self.base_url = url;
        }
    }
}
