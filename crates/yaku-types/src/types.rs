use serde::{Deserialize, Serialize};

/// Liveness of a single endpoint as last observed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointHealth {
    #[default]
    Unknown,
    Healthy,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchReason {
    /// Explicit selection by a caller (config UI, CLI flag)
    Manual,
    /// Active provider could not serve the requested language pair
    UnsupportedPair,
}

/// Status changes published to external observers (endpoint dialog, logs, tests)
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StatusEvent {
    ActiveProviderChanged {
        previous: Option<String>,
        current: String,
        reason: SwitchReason,
    },
    RequestRerouted {
        primary: String,
        rerouted_to: String,
        from_lang: String,
        to_lang: String,
    },
    EndpointHealthChanged {
        provider: String,
        url: String,
        health: EndpointHealth,
        latency_ms: Option<u64>,
        message: Option<String>,
    },
    EndpointSwitched {
        provider: String,
        previous: String,
        current: String,
    },
    CustomEndpointInUse {
        provider: String,
        url: String,
    },
    MonitorStopped {
        provider: Option<String>,
    },
}
