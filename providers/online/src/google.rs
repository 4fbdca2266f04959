use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::Client;
use serde_json::Value;
use yaku_translator::{
    Credentials, EndpointHealthTracker, Provider, ProviderCapability, TranslateError, Translation,
    Vocabulary, map,
};
use yaku_types::{StatusEvent, StatusEvents};

use crate::http;

const NAME: &str = "google";
const OFFICIAL_URL: &str = "https://translation.googleapis.com/language/translate/v2";
const MAX_CHARS: usize = 5000;

/// Google Translate, either through the official Cloud v2 API or through
/// `client=gtx` mirrors with health-tracked rotation.
pub struct GoogleTranslate {
    client: Client,
    capability: ProviderCapability,
    tracker: EndpointHealthTracker,
    api_key: RwLock<Option<String>>,
    /// User picked an explicit endpoint; the official API is bypassed
    custom_selected: AtomicBool,
    warning_shown: AtomicBool,
    events: StatusEvents,
}

impl GoogleTranslate {
    pub fn new(
        mirrors: Vec<String>,
        events: StatusEvents,
        timeout: Duration,
        probe_timeout: Duration,
    ) -> Result<Self, TranslateError> {
        Ok(Self {
            client: http::client(timeout)?,
            capability: ProviderCapability::any(MAX_CHARS),
            tracker: EndpointHealthTracker::new(NAME, mirrors, events.clone())
                .with_probe_timeout(probe_timeout),
            api_key: RwLock::new(None),
            custom_selected: AtomicBool::new(false),
            warning_shown: AtomicBool::new(false),
            events,
        })
    }

    /// Show the unofficial-endpoint warning again on next mirror use
    pub fn rearm_custom_endpoint_warning(&self) {
        self.warning_shown.store(false, Ordering::SeqCst);
    }

    fn uses_official_api(&self) -> Option<String> {
        if self.custom_selected.load(Ordering::SeqCst) {
            return None;
        }
        self.api_key.read().clone()
    }

    fn warn_unofficial_once(&self) {
        if self.warning_shown.swap(true, Ordering::SeqCst) {
            return;
        }
        let url = self.tracker.current().map(|e| e.url).unwrap_or_default();
        tracing::warn!(
            url = %url,
            "Using an unofficial Google endpoint; it may violate the service terms and can stop working at any time"
        );
        self.events.emit(StatusEvent::CustomEndpointInUse {
            provider: NAME.to_string(),
            url,
        });
    }

    async fn translate_official(
        &self,
        key: &str,
        text: &str,
        from: &str,
        to: &str,
    ) -> Result<String, TranslateError> {
        let mut params = vec![("key", key), ("q", text), ("target", to), ("format", "text")];
        if !http::is_auto(from) {
            params.push(("source", from));
        }

        let response = self.client.post(OFFICIAL_URL).query(&params).send().await?;
        let (status, body) = http::read(response).await?;
        if !status.is_success() {
            return Err(http::status_error(NAME, status, &body));
        }
        parse_official(&http::parse_json(&body)?)
    }

    async fn translate_mirror(
        &self,
        url: &str,
        text: &str,
        from: &str,
        to: &str,
    ) -> Result<String, TranslateError> {
        let params = [
            ("client", "gtx"),
            ("sl", from),
            ("tl", to),
            ("dt", "t"),
            ("q", text),
        ];

        let response = self.client.get(url).query(&params).send().await?;
        let (status, body) = http::read(response).await?;
        // a mirror answering non-200 is an endpoint failure, never a provider verdict
        if !status.is_success() {
            return Err(TranslateError::Transient(format!(
                "mirror returned HTTP {}",
                status.as_u16()
            )));
        }
        parse_gtx(&http::parse_json(&body)?)
    }
}

#[async_trait]
impl Provider for GoogleTranslate {
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
        let sl = map(from, Vocabulary::Google);
        let tl = map(to, Vocabulary::Google);

        let translated = match self.uses_official_api() {
            Some(key) => self.translate_official(&key, text, &sl, &tl).await?,
            None => {
                self.warn_unofficial_once();
                let (sl, tl) = (&sl, &tl);
                self.tracker
                    .run(|url| async move { self.translate_mirror(&url, text, sl, tl).await })
                    .await?
            }
        };

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
        let text = self.translate_mirror(url, "hello", "en", "zh").await?;
        if text.contains("你好") {
            Ok(())
        } else {
            Err(TranslateError::Malformed(format!(
                "unexpected probe result: {}",
                text
            )))
        }
    }

    fn set_credentials(&self, credentials: Credentials) -> Result<(), TranslateError> {
        let key = credentials.key.trim().to_string();
        *self.api_key.write() = (!key.is_empty()).then_some(key);
        self.custom_selected.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn set_custom_endpoint(&self, url: &str) -> Result<(), TranslateError> {
        http::validate_url(url)?;
        self.tracker.add_endpoint(url);
        self.tracker.switch_to(url);
        self.custom_selected.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Join the first element of every segment in `json[0]`
pub(crate) fn parse_gtx(json: &Value) -> Result<String, TranslateError> {
    let segments = json
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| TranslateError::Malformed("missing segment array".to_string()))?;

    let text: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    let text = text.trim();
    if text.is_empty() {
        return Err(TranslateError::Malformed("empty translation".to_string()));
    }
    Ok(text.to_string())
}

pub(crate) fn parse_official(json: &Value) -> Result<String, TranslateError> {
    if let Some(message) = json["error"]["message"].as_str() {
        return Err(TranslateError::Transient(message.to_string()));
    }
    json["data"]["translations"]
        .get(0)
        .and_then(|t| t["translatedText"].as_str())
        .map(str::to_string)
        .ok_or_else(|| TranslateError::Malformed("no translation in response".to_string()))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_gtx_joins_segments() {
        let body = json!([
            [["你好。", "Hello.", null, null, 10], ["世界", "World", null, null, 10]],
            null,
            "en"
        ]);
        assert_eq!(parse_gtx(&body).unwrap(), "你好。世界");
    }

    #[test]
    fn test_parse_gtx_rejects_empty() {
        assert!(matches!(
            parse_gtx(&json!([[], null, "en"])),
            Err(TranslateError::Malformed(_))
        ));
        assert!(parse_gtx(&json!({"error": "x"})).is_err());
    }

    #[test]
    fn test_parse_official() {
        let body = json!({"data": {"translations": [{"translatedText": "Bonjour"}]}});
        assert_eq!(parse_official(&body).unwrap(), "Bonjour");
    }

    fn google(events: StatusEvents) -> GoogleTranslate {
        GoogleTranslate::new(
            vec!["https://a.test/translate_a/single".to_string()],
            events,
            Duration::from_secs(1),
            Duration::from_secs(1),
        )
        .unwrap()
    }

    fn drain_warnings(rx: &kanal::AsyncReceiver<StatusEvent>) -> usize {
        let mut count = 0;
        while let Ok(Some(event)) = rx.try_recv() {
            if matches!(event, StatusEvent::CustomEndpointInUse { .. }) {
                count += 1;
            }
        }
        count
    }

    #[test]
    fn test_unofficial_warning_is_one_shot_until_rearmed() {
        let (events, rx) = StatusEvents::channel(8);
        let provider = google(events);

        provider.warn_unofficial_once();
        provider.warn_unofficial_once();
        assert_eq!(drain_warnings(&rx), 1);

        // selecting an endpoint does not re-arm the warning
        provider
            .set_custom_endpoint("https://mirror.test/translate_a/single")
            .unwrap();
        provider.warn_unofficial_once();
        assert_eq!(drain_warnings(&rx), 0);

        provider.rearm_custom_endpoint_warning();
        provider.warn_unofficial_once();
        assert_eq!(drain_warnings(&rx), 1);
    }

    #[test]
    fn test_custom_endpoint_bypasses_official_api() {
        let provider = google(StatusEvents::disabled());
        provider.set_credentials(Credentials::key("k")).unwrap();
        assert_eq!(provider.uses_official_api().as_deref(), Some("k"));

        provider
            .set_custom_endpoint("https://mirror.test/translate_a/single")
            .unwrap();
        assert!(provider.uses_official_api().is_none());
        assert_eq!(
            provider.tracker.current().unwrap().url,
            "https://mirror.test/translate_a/single"
        );
        assert!(provider.set_custom_endpoint("not a url").is_err());
    }
}
