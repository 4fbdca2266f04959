use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use yaku_translator::{Provider, ProviderCapability, TranslateError, Translation, Vocabulary, map};

use crate::http;

const NAME: &str = "mymemory";
const URL: &str = "https://api.mymemory.translated.net/get";
const MAX_CHARS: usize = 500;

/// MyMemory public API. Free, quota-metered, single endpoint.
pub struct MyMemory {
    client: Client,
    capability: ProviderCapability,
}

impl MyMemory {
    pub fn new(timeout: Duration) -> Result<Self, TranslateError> {
        Ok(Self {
            client: http::client(timeout)?,
            capability: ProviderCapability::any(MAX_CHARS),
        })
    }
}

#[async_trait]
impl Provider for MyMemory {
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
        let langpair = format!(
            "{}|{}",
            map(from, Vocabulary::MyMemory),
            map(to, Vocabulary::MyMemory)
        );

        let response = self
            .client
            .get(URL)
            .query(&[("q", text), ("langpair", langpair.as_str())])
            .send()
            .await?;
        let (status, body) = http::read(response).await?;
        if !status.is_success() {
            return Err(status_error(status, &body));
        }

        Ok(Translation {
            text: parse_response(&http::parse_json(&body)?, from, to)?,
            from: from.to_string(),
            to: to.to_string(),
            provider: NAME.to_string(),
        })
    }
}

/// MyMemory takes no credentials, so a 403 means the free quota is spent
pub(crate) fn status_error(status: StatusCode, body: &str) -> TranslateError {
    match status {
        StatusCode::FORBIDDEN => TranslateError::QuotaExceeded(format!(
            "{} returned HTTP 403: {}",
            NAME,
            http::snippet(body)
        )),
        _ => http::status_error(NAME, status, body),
    }
}

/// `responseStatus` arrives as a number or a numeric string
fn response_status(json: &Value) -> Option<u64> {
    match &json["responseStatus"] {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub(crate) fn parse_response(json: &Value, from: &str, to: &str) -> Result<String, TranslateError> {
    let details = json["responseDetails"].as_str().unwrap_or_default().to_string();
    let upper = details.to_uppercase();
    let invalid_language = upper.contains("INVALID") && upper.contains("LANGUAGE");

    match response_status(json) {
        Some(200) => json["responseData"]["translatedText"]
            .as_str()
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .ok_or_else(|| TranslateError::Malformed("missing translatedText".to_string())),
        Some(403) | Some(429) => Err(TranslateError::QuotaExceeded(details)),
        Some(_) if invalid_language => Err(TranslateError::unsupported(from, to)),
        Some(code) => Err(TranslateError::Transient(format!("{}: {}", code, details))),
        None => Err(TranslateError::Malformed("missing responseStatus".to_string())),
    }
}
