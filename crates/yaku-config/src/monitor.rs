use serde::{Deserialize, Serialize};

use crate::env_or;

fn default_enabled() -> bool {
    false
}

fn default_interval_secs() -> u64 {
    300
}

fn default_auto_switch() -> bool {
    true
}

fn default_probe_timeout_secs() -> u64 {
    5
}

fn default_scan_spacing_ms() -> u64 {
    1000
}

/// Background endpoint health monitoring
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Switch to the fastest healthy endpoint when the current one fails
    #[serde(default = "default_auto_switch")]
    pub auto_switch: bool,
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,
    /// Pause between probes while scanning every endpoint
    #[serde(default = "default_scan_spacing_ms")]
    pub scan_spacing_ms: u64,
}

impl MonitorConfig {
    pub fn new() -> Self {
        Self {
            enabled: env_or("YAKU_MONITOR", default_enabled()),
            interval_secs: env_or("YAKU_MONITOR_INTERVAL_SECS", default_interval_secs()),
            auto_switch: env_or("YAKU_MONITOR_AUTO_SWITCH", default_auto_switch()),
            probe_timeout_secs: env_or("YAKU_PROBE_TIMEOUT_SECS", default_probe_timeout_secs()),
            scan_spacing_ms: default_scan_spacing_ms(),
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            interval_secs: default_interval_secs(),
            auto_switch: default_auto_switch(),
            probe_timeout_secs: default_probe_timeout_secs(),
            scan_spacing_ms: default_scan_spacing_ms(),
        }
    }
}
