use serde::{Deserialize, Serialize};

use crate::env_or;

fn default_active_provider() -> String {
    "google".to_string()
}

fn default_fallback_order() -> Vec<String> {
    ["google", "libretranslate", "mymemory", "deepl", "baidu", "microsoft"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_from_lang() -> String {
    "auto".to_string()
}

fn default_to_lang() -> String {
    "zh".to_string()
}

fn default_chunk_delay_ms() -> u64 {
    200
}

fn default_request_timeout_secs() -> u64 {
    10
}

/// What a capability-driven provider switch affects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilitySwitch {
    /// Reroute the current request only; registry selection stays put
    #[default]
    Request,
    /// Change the registry's active provider
    Persistent,
}

/// What the pipeline does when every provider fails for one chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkFailurePolicy {
    /// Keep the untranslated chunk text in the output
    #[default]
    Degrade,
    /// Fail the whole request
    Abort,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    #[serde(default = "default_active_provider")]
    pub active_provider: String,
    /// Providers tried, in order, after the active one fails.
    /// Empty means registry insertion order.
    #[serde(default = "default_fallback_order")]
    pub fallback_order: Vec<String>,
    #[serde(default = "default_from_lang")]
    pub from_lang: String,
    #[serde(default = "default_to_lang")]
    pub to_lang: String,
    /// Pause between consecutive chunks of one request
    #[serde(default = "default_chunk_delay_ms")]
    pub chunk_delay_ms: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    pub capability_switch: CapabilitySwitch,
    pub chunk_failure: ChunkFailurePolicy,
}

impl TranslatorConfig {
    pub fn new() -> Self {
        let active_provider =
            env_or("YAKU_PROVIDER", default_active_provider()).to_lowercase();

        let fallback_order = std::env::var("YAKU_FALLBACK_ORDER")
            .ok()
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_lowercase())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_else(default_fallback_order);

        Self {
            active_provider,
            fallback_order,
            from_lang: env_or("YAKU_FROM_LANG", default_from_lang()),
            to_lang: env_or("YAKU_TO_LANG", default_to_lang()),
            chunk_delay_ms: env_or("YAKU_CHUNK_DELAY_MS", default_chunk_delay_ms()),
            request_timeout_secs: env_or(
                "YAKU_REQUEST_TIMEOUT_SECS",
                default_request_timeout_secs(),
            ),
            capability_switch: CapabilitySwitch::default(),
            chunk_failure: ChunkFailurePolicy::default(),
        }
    }
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            active_provider: default_active_provider(),
            fallback_order: default_fallback_order(),
            from_lang: default_from_lang(),
            to_lang: default_to_lang(),
            chunk_delay_ms: default_chunk_delay_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            capability_switch: CapabilitySwitch::default(),
            chunk_failure: ChunkFailurePolicy::default(),
        }
    }
}
