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

const NAME: &str = "microsoft";
const URL: &str = "https://api.cognitive.microsofttranslator.com/translate";
const MAX_CHARS: usize = 10000;
const DEFAULT_REGION: &str = "global";

#[derive(Serialize)]
struct Item<'a> {
    #[serde(rename = "Text")]
    text: &'a str,
}

#[derive(Clone)]
struct AzureKey {
    key: String,
    region: String,
}

/// Microsoft Translator (Azure Cognitive Services) v3
pub struct Microsoft {
    client: Client,
    capability: ProviderCapability,
    key: RwLock<Option<AzureKey>>,
}

impl Microsoft {
    pub fn new(timeout: Duration) -> Result<Self, TranslateError> {
        Ok(Self {
            client: http::client(timeout)?,
            capability: ProviderCapability::any(MAX_CHARS).with_credentials(),
            key: RwLock::new(None),
        })
    }
}

#[async_trait]
impl Provider for Microsoft {
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
        let Some(azure) = self.key.read().clone() else {
            return Err(http::missing_credential(NAME));
        };

        let source = map(from, Vocabulary::Microsoft);
        let target = map(to, Vocabulary::Microsoft);
        let mut query = vec![("api-version", "3.0"), ("to", target.as_str())];
        if !http::is_auto(from) {
            query.push(("from", source.as_str()));
        }

        let response = self
            .client
            .post(URL)
            .query(&query)
            .header("Ocp-Apim-Subscription-Key", &azure.key)
            .header("Ocp-Apim-Subscription-Region", &azure.region)
            .json(&[Item { text }])
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
        if key.is_empty() {
            *self.key.write() = None;
            return Ok(());
        }
        let region = credentials
            .region
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_REGION.to_string());
        *self.key.write() = Some(AzureKey { key, region });
        Ok(())
    }
}

pub(crate) fn parse_response(
    status: StatusCode,
    body: &str,
    from: &str,
    to: &str,
) -> Result<String, TranslateError> {
    let json: Value = http::parse_json(body)?;

    if let Some(error) = json.get("error") {
        let code = error["code"].as_u64().unwrap_or_default();
        let message = error["message"].as_str().unwrap_or_default().to_string();
        // 400035 / 400036: invalid source / target language
        return Err(match code {
            400035 | 400036 => TranslateError::unsupported(from, to),
            _ if status == StatusCode::TOO_MANY_REQUESTS || code / 1000 == 429 => {
                TranslateError::QuotaExceeded(message)
            }
            _ if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN => {
                TranslateError::Configuration(message)
            }
            _ => TranslateError::Transient(format!("{} {}", code, message)),
        });
    }

    if !status.is_success() {
        return Err(http::status_error(NAME, status, body));
    }

    json.get(0)
        .and_then(|item| item["translations"].get(0))
        .and_then(|t| t["text"].as_str())
        .map(str::to_string)
        .ok_or_else(|| TranslateError::Malformed("no translation in response".to_string()))
}
