use std::time::Duration;

use async_trait::async_trait;
use md5::{Digest, Md5};
use parking_lot::RwLock;
use rand::Rng;
use reqwest::Client;
use serde_json::Value;
use yaku_translator::{
    Credentials, Provider, ProviderCapability, TranslateError, Translation, Vocabulary, map,
};

use crate::http;

const NAME: &str = "baidu";
const URL: &str = "https://fanyi-api.baidu.com/api/trans/vip/translate";
const MAX_CHARS: usize = 2000;

#[derive(Clone)]
struct BaiduKeys {
    app_id: String,
    secret: String,
}

/// Baidu Fanyi, signed with an app id and secret key
pub struct Baidu {
    client: Client,
    capability: ProviderCapability,
    keys: RwLock<Option<BaiduKeys>>,
}

impl Baidu {
    pub fn new(timeout: Duration) -> Result<Self, TranslateError> {
        Ok(Self {
            client: http::client(timeout)?,
            capability: ProviderCapability::any(MAX_CHARS).with_credentials(),
            keys: RwLock::new(None),
        })
    }
}

/// md5(appid + q + salt + secret), lowercase hex
pub(crate) fn sign(app_id: &str, text: &str, salt: &str, secret: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(app_id.as_bytes());
    hasher.update(text.as_bytes());
    hasher.update(salt.as_bytes());
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[async_trait]
impl Provider for Baidu {
    fn name(&self) -> &str {
        NAME
    }

    fn capability(&self) -> &ProviderCapability {
        &self.capability
    }

    async fn translate(
        &self,
        text: &str,
        from: &str,
        to: &str,
    ) -> Result<Translation, TranslateError> {
        let Some(keys) = self.keys.read().clone() else {
            return Err(http::missing_credential(NAME));
        };

        let salt = rand::rng().random_range(32768..=65536).to_string();
        let signature = sign(&keys.app_id, text, &salt, &keys.secret);
        let source = map(from, Vocabulary::Baidu);
        let target = map(to, Vocabulary::Baidu);

        let params = [
            ("q", text),
            ("from", source.as_str()),
            ("to", target.as_str()),
            ("appid", keys.app_id.as_str()),
            ("salt", salt.as_str()),
            ("sign", signature.as_str()),
        ];

        // form body keeps long texts out of the URL
        let response = self.client.post(URL).form(&params).send().await?;
        let (status, body) = http::read(response).await?;
        if !status.is_success() {
            return Err(http::status_error(NAME, status, &body));
        }

        Ok(Translation {
            text: parse_response(&http::parse_json(&body)?, from, to)?,
            from: from.to_string(),
            to: to.to_string(),
            provider: NAME.to_string(),
        })
    }

    /// `key` is the app id, `secret` the secret key
    fn set_credentials(&self, credentials: Credentials) -> Result<(), TranslateError> {
        let app_id = credentials.key.trim().to_string();
        let secret = credentials.secret.unwrap_or_default().trim().to_string();
        if app_id.is_empty() || secret.is_empty() {
            return Err(TranslateError::Configuration(
                "baidu needs both an app id and a secret key".to_string(),
            ));
        }
        *self.keys.write() = Some(BaiduKeys { app_id, secret });
        Ok(())
    }
}

/// `error_code` arrives as a string or a number
fn error_code(json: &Value) -> Option<String> {
    match &json["error_code"] {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub(crate) fn parse_response(json: &Value, from: &str, to: &str) -> Result<String, TranslateError> {
    if let Some(code) = error_code(json).filter(|c| c != "52000") {
        let message = format!(
            "{} {}",
            code,
            json["error_msg"].as_str().unwrap_or_default()
        );
        return Err(match code.as_str() {
            "54003" | "54004" | "54005" => TranslateError::QuotaExceeded(message),
            "52003" | "54001" => TranslateError::Configuration(message),
            "58001" => TranslateError::unsupported(from, to),
            _ => TranslateError::Transient(message),
        });
    }

    let lines: Vec<&str> = json["trans_result"]
        .as_array()
        .ok_or_else(|| TranslateError::Malformed("missing trans_result".to_string()))?
        .iter()
        .filter_map(|r| r["dst"].as_str())
        .collect();

    if lines.is_empty() {
        return Err(TranslateError::Malformed("empty trans_result".to_string()));
    }
    Ok(lines.join("\n"))
}
