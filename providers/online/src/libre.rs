use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use yaku_translator::{
    Credentials, EndpointHealthTracker, Provider, ProviderCapability, TranslateError, Translation,
    Vocabulary, map,
};
use yaku_types::StatusEvents;

use crate::http;

const NAME: &str = "libretranslate";
const MAX_CHARS: usize = 2000;

#[derive(Serialize)]
struct TranslateBody<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

/// LibreTranslate community instances, rotated through the health tracker
pub struct LibreTranslate {
    client: Client,
    capability: ProviderCapability,
    tracker: EndpointHealthTracker,
    api_key: RwLock<Option<String>>,
}

impl LibreTranslate {
    pub fn new(
        instances: Vec<String>,
        events: StatusEvents,
        timeout: Duration,
        probe_timeout: Duration,
    ) -> Result<Self, TranslateError> {
        let instances = instances
            .into_iter()
            .map(|url| url.trim_end_matches('/').to_string());

        Ok(Self {
            client: http::client(timeout)?,
            capability: ProviderCapability::any(MAX_CHARS),
            tracker: EndpointHealthTracker::new(NAME, instances, events)
                .with_probe_timeout(probe_timeout),
            api_key: RwLock::new(None),
        })
    }

    async fn translate_on(
        &self,
        base: &str,
        text: &str,
        from: &str,
        to: &str,
    ) -> Result<String, TranslateError> {
        let api_key = self.api_key.read().clone();
        let body = TranslateBody {
            q: text,
            source: from,
            target: to,
            format: "text",
            api_key: api_key.as_deref(),
        };

        let response = self
            .client
            .post(format!("{}/translate", base))
            .json(&body)
            .send()
            .await?;
        let (status, body) = http::read(response).await?;
        parse_response(status, &body, from, to)
    }
}

#[async_trait]
impl Provider for LibreTranslate {
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
        let source = map(from, Vocabulary::LibreTranslate);
        let target = map(to, Vocabulary::LibreTranslate);
        let (source, target) = (&source, &target);

        let translated = self
            .tracker
            .run(|base| async move { self.translate_on(&base, text, source, target).await })
            .await?;

        Ok(Translation {
            text: translated,
            from: from.to_string(),
            to: to.to_string(),
            provider: NAME.to_string(),
        })
    }

    fn endpoints(&self) -> Option<&EndpointHealthTracker> {
        Some(&self.tracker)
    }

    async fn probe(&self, url: &str) -> Result<(), TranslateError> {
        let response = self.client.get(format!("{}/languages", url)).send().await?;
        let (status, body) = http::read(response).await?;
        if !status.is_success() {
            return Err(TranslateError::Transient(format!(
                "instance returned HTTP {}",
                status.as_u16()
            )));
        }
        match http::parse_json(&body)? {
            Value::Array(langs) if !langs.is_empty() => Ok(()),
            _ => Err(TranslateError::Malformed("empty language list".to_string())),
        }
    }

    /// Some instances require an API key; public ones ignore it
    fn set_credentials(&self, credentials: Credentials) -> Result<(), TranslateError> {
        let key = credentials.key.trim().to_string();
        *self.api_key.write() = (!key.is_empty()).then_some(key);
        Ok(())
    }

    fn set_custom_endpoint(&self, url: &str) -> Result<(), TranslateError> {
        http::validate_url(url)?;
        let url = url.trim_end_matches('/');
        self.tracker.add_endpoint(url);
        self.tracker.switch_to(url);
        Ok(())
    }
}

pub(crate) fn parse_response(
    status: StatusCode,
    body: &str,
    from: &str,
    to: &str,
) -> Result<String, TranslateError> {
    let json = http::parse_json(body).ok();
    let error = json
        .as_ref()
        .and_then(|j| j["error"].as_str())
        .map(str::to_string);

    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(TranslateError::QuotaExceeded(
            error.unwrap_or_else(|| "rate limited".to_string()),
        ));
    }

    if let Some(error) = error {
        let lower = error.to_lowercase();
        if lower.contains("not supported") || lower.contains("invalid language") {
            return Err(TranslateError::unsupported(from, to));
        }
        return Err(TranslateError::Transient(error));
    }

    if !status.is_success() {
        return Err(http::status_error(NAME, status, body));
    }

    json.as_ref()
        .and_then(|j| j["translatedText"].as_str())
        .map(str::to_string)
        .ok_or_else(|| TranslateError::Malformed("missing translatedText".to_string()))
}
