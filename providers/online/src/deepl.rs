use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use yaku_translator::{
    Credentials, Provider, ProviderCapability, TranslateError, Translation, Vocabulary, map,
};

use crate::http;

const NAME: &str = "deepl";
const FREE_URL: &str = "https://api-free.deepl.com/v2/translate";
const PRO_URL: &str = "https://api.deepl.com/v2/translate";
const MAX_CHARS: usize = 5000;

const LANGUAGES: &[&str] = &[
    "bg", "cs", "da", "de", "el", "en", "es", "et", "fi", "fr", "hu", "id", "it", "ja", "ko",
    "lt", "lv", "nb", "nl", "pl", "pt", "ro", "ru", "sk", "sl", "sv", "tr", "uk", "zh",
];

#[derive(Serialize)]
struct TranslateBody<'a> {
    text: [&'a str; 1],
    target_lang: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_lang: Option<&'a str>,
}

pub struct DeepL {
    client: Client,
    capability: ProviderCapability,
    api_key: RwLock<Option<String>>,
}

impl DeepL {
    pub fn new(timeout: Duration) -> Result<Self, TranslateError> {
        Ok(Self {
            client: http::client(timeout)?,
            capability: ProviderCapability::listed(LANGUAGES.iter().copied(), MAX_CHARS).with_credentials(),
            api_key: RwLock::new(None),
        })
    }
}

/// Free-tier keys end in `:fx` and live on a separate host
fn endpoint_for(key: &str) -> &'static str {
    if key.ends_with(":fx") {
        FREE_URL
    } else {
        PRO_URL
    }
}

#[async_trait]
impl Provider for DeepL {
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
        let Some(key) = self.api_key.read().clone() else {
            return Err(http::missing_credential(NAME));
        };

        let source = map(from, Vocabulary::Deepl);
        let target = map(to, Vocabulary::Deepl);
        let body = TranslateBody {
            text: [text],
            target_lang: &target,
            source_lang: (!http::is_auto(from)).then_some(source.as_str()),
        };

        let response = self
            .client
            .post(endpoint_for(&key))
            .header("Authorization", format!("DeepL-Auth-Key {}", key))
            .json(&body)
            .send()
            .await?;
        let (status, body) = http::read(response).await?;

        Ok(Translation {
            text: parse_response(status, &body, from, to)?,
            from: from.to_string(),
            to: to.to_string(),
            provider: NAME.to_string(),
        })
    }

    fn set_credentials(&self, credentials: Credentials) -> Result<(), TranslateError> {
        let key = credentials.key.trim().to_string();
        *self.api_key.write() = (!key.is_empty()).then_some(key);
        Ok(())
    }
}

pub(crate) fn parse_response(
    status: StatusCode,
    body: &str,
    from: &str,
    to: &str,
) -> Result<String, TranslateError> {
    match status.as_u16() {
        200 => {}
        // 456: character quota for the billing period is used up
        429 | 456 => {
            return Err(TranslateError::QuotaExceeded(format!(
                "HTTP {}",
                status.as_u16()
            )));
        }
        401 | 403 => {
            return Err(TranslateError::Configuration(
                "DeepL rejected the authentication key".to_string(),
            ));
        }
        400 if body.contains("lang") => return Err(TranslateError::unsupported(from, to)),
        _ => return Err(http::status_error(NAME, status, body)),
    }

    let json: Value = http::parse_json(body)?;
    json["translations"]
        .get(0)
        .and_then(|t| t["text"].as_str())
        .map(str::to_string)
        .ok_or_else(|| TranslateError::Malformed("no translation in response".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_key_uses_free_host() {
        assert_eq!(endpoint_for("0000-1111:fx"), FREE_URL);
        assert_eq!(endpoint_for("0000-1111"), PRO_URL);
    }

    #[test]
    fn test_parse_response() {
        let body = r#"{"translations":[{"detected_source_language":"EN","text":"Hallo"}]}"#;
        assert_eq!(parse_response(StatusCode::OK, body, "en", "de").unwrap(), "Hallo");

        let quota = StatusCode::from_u16(456).unwrap();
        assert!(matches!(
            parse_response(quota, "", "en", "de"),
            Err(TranslateError::QuotaExceeded(_))
        ));
        assert!(matches!(
            parse_response(StatusCode::FORBIDDEN, "", "en", "de"),
            Err(TranslateError::Configuration(_))
        ));
    }

    #[test]
    fn test_capability_excludes_malay() {
        let deepl = DeepL::new(Duration::from_secs(1)).unwrap();
        assert!(deepl.capability().requires_credentials);
        assert!(!deepl.capability().supports_pair("en", "ms"));
        assert!(deepl.capability().supports_pair("auto", "ja"));
    }

    #[tokio::test]
    async fn test_missing_key_is_configuration_error() {
        let deepl = DeepL::new(Duration::from_secs(1)).unwrap();
        let err = deepl.translate("hi", "en", "de").await.unwrap_err();
        assert!(matches!(err, TranslateError::Configuration(_)));
    }
}
