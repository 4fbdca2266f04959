use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use yaku_translator::TranslateError;

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko)";

pub(crate) fn client(timeout: Duration) -> Result<Client, TranslateError> {
    Ok(Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()?)
}

/// Status and body of a finished response
pub(crate) async fn read(response: Response) -> Result<(StatusCode, String), TranslateError> {
    let status = response.status();
    let body = response.text().await?;
    Ok((status, body))
}

pub(crate) fn parse_json(body: &str) -> Result<Value, TranslateError> {
    serde_json::from_str(body)
        .map_err(|e| TranslateError::Malformed(format!("invalid JSON: {}", e)))
}

/// Default mapping for a non-success status
pub(crate) fn status_error(provider: &str, status: StatusCode, body: &str) -> TranslateError {
    let detail = format!("{} returned HTTP {}: {}", provider, status.as_u16(), snippet(body));
    match status.as_u16() {
        429 => TranslateError::QuotaExceeded(detail),
        401 | 403 => TranslateError::Configuration(detail),
        _ => TranslateError::Transient(detail),
    }
}

pub(crate) fn missing_credential(provider: &str) -> TranslateError {
    TranslateError::Configuration(format!("{} requires credentials", provider))
}

pub(crate) fn is_auto(tag: &str) -> bool {
    tag.eq_ignore_ascii_case("auto")
}

pub(crate) fn validate_url(url: &str) -> Result<(), TranslateError> {
    if url.starts_with("https://") || url.starts_with("http://") {
        Ok(())
    } else {
        Err(TranslateError::Configuration(format!(
            "endpoint must be an http(s) URL: {}",
            url
        )))
    }
}

pub(crate) fn snippet(body: &str) -> &str {
    match body.char_indices().nth(200) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
