use serde::{Deserialize, Serialize};

use crate::{env_opt, env_or};

fn default_microsoft_region() -> String {
    "global".to_string()
}

/// Opaque credentials for the paid providers. Unset means "not configured".
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    pub google_api_key: Option<String>,
    pub deepl_api_key: Option<String>,
    pub baidu_app_id: Option<String>,
    pub baidu_secret_key: Option<String>,
    pub microsoft_api_key: Option<String>,
    #[serde(default = "default_microsoft_region")]
    pub microsoft_region: String,
}

impl CredentialsConfig {
    pub fn new() -> Self {
        Self {
            google_api_key: env_opt("YAKU_GOOGLE_API_KEY"),
            deepl_api_key: env_opt("YAKU_DEEPL_API_KEY"),
            baidu_app_id: env_opt("YAKU_BAIDU_APP_ID"),
            baidu_secret_key: env_opt("YAKU_BAIDU_SECRET_KEY"),
            microsoft_api_key: env_opt("YAKU_MICROSOFT_API_KEY"),
            microsoft_region: env_or("YAKU_MICROSOFT_REGION", default_microsoft_region()),
        }
    }
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            google_api_key: None,
            deepl_api_key: None,
            baidu_app_id: None,
            baidu_secret_key: None,
            microsoft_api_key: None,
            microsoft_region: default_microsoft_region(),
        }
    }
}

// Keep secrets out of debug logs
impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let set = |v: &Option<String>| if v.is_some() { "<set>" } else { "<unset>" };
        f.debug_struct("CredentialsConfig")
            .field("google_api_key", &set(&self.google_api_key))
            .field("deepl_api_key", &set(&self.deepl_api_key))
            .field("baidu_app_id", &set(&self.baidu_app_id))
            .field("baidu_secret_key", &set(&self.baidu_secret_key))
            .field("microsoft_api_key", &set(&self.microsoft_api_key))
            .field("microsoft_region", &self.microsoft_region)
            .finish()
    }
}
