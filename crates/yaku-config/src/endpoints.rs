use serde::{Deserialize, Serialize};

use crate::env_opt;

fn default_google_mirrors() -> Vec<String> {
    [
        "https://translate.googleapis.com/translate_a/single",
        "https://translate.google.com/translate_a/single",
        "https://translate.google.cn/translate_a/single",
        "https://clients5.google.com/translate_a/single",
        "https://translate-pa.googleapis.com/translate_a/single",
        "https://translate.google.com.hk/translate_a/single",
        "https://translate.google.com.tw/translate_a/single",
        "https://translate.google.com.sg/translate_a/single",
        "https://translate.mentality.rip/translate_a/single",
        "https://translate.fortunes.tech/translate_a/single",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_libretranslate() -> Vec<String> {
    [
        "https://libretranslate.de",
        "https://translate.argosopentech.com",
        "https://translate.terraprint.co",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Mirror lists for the multi-endpoint providers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointsConfig {
    #[serde(default = "default_google_mirrors")]
    pub google_mirrors: Vec<String>,
    /// LibreTranslate instance base URLs
    #[serde(default = "default_libretranslate")]
    pub libretranslate: Vec<String>,
    /// User supplied Google-style endpoint, preferred over the mirror list
    pub custom_google: Option<String>,
}

impl EndpointsConfig {
    pub fn new() -> Self {
        Self {
            custom_google: env_opt("YAKU_GOOGLE_ENDPOINT"),
            ..Self::default()
        }
    }
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            google_mirrors: default_google_mirrors(),
            libretranslate: default_libretranslate(),
            custom_google: None,
        }
    }
}
