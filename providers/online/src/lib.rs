//! Built-in HTTP translation providers.

use std::sync::Arc;
use std::time::Duration;

use yaku_config::Config;
use yaku_translator::{Credentials, Provider, TranslateError};
use yaku_types::StatusEvents;

pub mod baidu;
pub mod deepl;
pub mod google;
mod http;
pub mod libre;
pub mod microsoft;
pub mod mymemory;

pub use baidu::Baidu;
pub use deepl::DeepL;
pub use google::GoogleTranslate;
pub use libre::LibreTranslate;
pub use microsoft::Microsoft;
pub use mymemory::MyMemory;

/// Construct every built-in provider with configured credentials and
/// endpoints applied. Order matches registration order.
pub fn default_providers(
    config: &Config,
    events: &StatusEvents,
) -> Result<Vec<Arc<dyn Provider>>, TranslateError> {
    let timeout = Duration::from_secs(config.translator.request_timeout_secs);
    let probe_timeout = Duration::from_secs(config.monitor.probe_timeout_secs);
    let creds = &config.credentials;

    let google = GoogleTranslate::new(
        config.endpoints.google_mirrors.clone(),
        events.clone(),
        timeout,
        probe_timeout,
    )?;
    if let Some(key) = &creds.google_api_key {
        google.set_credentials(Credentials::key(key))?;
    }
    if let Some(url) = &config.endpoints.custom_google {
        google.set_custom_endpoint(url)?;
    }

    let libre = LibreTranslate::new(
        config.endpoints.libretranslate.clone(),
        events.clone(),
        timeout,
        probe_timeout,
    )?;

    let deepl = DeepL::new(timeout)?;
    if let Some(key) = &creds.deepl_api_key {
        deepl.set_credentials(Credentials::key(key))?;
    }

    let baidu = Baidu::new(timeout)?;
    if let (Some(app_id), Some(secret)) = (&creds.baidu_app_id, &creds.baidu_secret_key) {
        baidu.set_credentials(Credentials::key(app_id).with_secret(secret))?;
    }

    let microsoft = Microsoft::new(timeout)?;
    if let Some(key) = &creds.microsoft_api_key {
        microsoft.set_credentials(Credentials::key(key).with_region(&creds.microsoft_region))?;
    }

    let providers: Vec<Arc<dyn Provider>> = vec![
        Arc::new(google),
        Arc::new(libre),
        Arc::new(MyMemory::new(timeout)?),
        Arc::new(deepl),
        Arc::new(baidu),
        Arc::new(microsoft),
    ];

    tracing::debug!(
        providers = ?providers.iter().map(|p| p.name()).collect::<Vec<_>>(),
        "Built default providers"
    );
    Ok(providers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_providers_cover_every_family() {
        let providers = default_providers(&Config::default(), &StatusEvents::disabled()).unwrap();
        let names: Vec<&str> = providers.iter().map(|p| p.name()).collect();

        assert_eq!(
            names,
            ["google", "libretranslate", "mymemory", "deepl", "baidu", "microsoft"]
        );
        assert_eq!(providers[0].endpoints().map(|t| t.len()), Some(10));
        assert!(providers[2].endpoints().is_none());
    }

    #[test]
    fn test_custom_google_endpoint_becomes_current() {
        let mut config = Config::default();
        config.endpoints.custom_google = Some("https://gt.example.org/translate_a/single".into());

        let providers = default_providers(&config, &StatusEvents::disabled()).unwrap();
        let tracker = providers[0].endpoints().unwrap();
        assert_eq!(tracker.len(), 11);
        assert_eq!(
            tracker.current().unwrap().url,
            "https://gt.example.org/translate_a/single"
        );
    }
}
