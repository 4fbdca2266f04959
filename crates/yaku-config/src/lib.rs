use std::env;

use serde::{Deserialize, Serialize};

use self::credentials::CredentialsConfig;
use self::endpoints::EndpointsConfig;
use self::monitor::MonitorConfig;
use self::translator::TranslatorConfig;

pub mod credentials;
pub mod endpoints;
pub mod monitor;
pub mod translator;

pub use translator::{CapabilitySwitch, ChunkFailurePolicy};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub translator: TranslatorConfig,
    pub monitor: MonitorConfig,
    pub credentials: CredentialsConfig,
    pub endpoints: EndpointsConfig,
}

impl Config {
    /// Build from environment variables, falling back to defaults
    pub fn new() -> Self {
        Config {
            translator: TranslatorConfig::new(),
            monitor: MonitorConfig::new(),
            credentials: CredentialsConfig::new(),
            endpoints: EndpointsConfig::new(),
        }
    }

    /// Parse a JSON profile. Missing sections and fields take their defaults.
    pub fn from_json(data: &str) -> serde_json::Result<Self> {
        serde_json::from_str(data)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

pub(crate) fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

pub(crate) fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
