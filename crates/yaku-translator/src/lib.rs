pub mod capability;
pub mod endpoint;
pub mod error;
pub mod language;

pub use capability::{ProviderCapability, SupportedLanguages};
pub use endpoint::{Endpoint, EndpointHealthTracker, ProbeOutcome};
pub use error::{ErrorClass, TranslateError};
pub use language::{Vocabulary, map};

pub type LanguageCode = String;

/// Translation provider interface
#[async_trait::async_trait]
pub trait Provider: Send + Sync {
    /// Unique name within a registry
    fn name(&self) -> &str;

    fn capability(&self) -> &ProviderCapability;

    /// Translate text from source to target language.
    /// Tags are generic; each provider maps them to its own vocabulary.
    async fn translate(
        &self,
        text: &str,
        from: &str,
        to: &str,
    ) -> Result<Translation, TranslateError>;

    /// Health tracker for providers backed by several mirrors
    fn endpoints(&self) -> Option<&EndpointHealthTracker> {
        None
    }

    /// Lightweight liveness check against one endpoint.
    /// Only used by background monitoring.
    async fn probe(&self, _url: &str) -> Result<(), TranslateError> {
        Ok(())
    }

    fn set_credentials(&self, _credentials: Credentials) -> Result<(), TranslateError> {
        Err(TranslateError::Configuration(format!(
            "{} does not take credentials",
            self.name()
        )))
    }

    fn set_custom_endpoint(&self, _url: &str) -> Result<(), TranslateError> {
        Err(TranslateError::Configuration(format!(
            "{} does not accept custom endpoints",
            self.name()
        )))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub text: String,
    pub from: LanguageCode,
    pub to: LanguageCode,
    pub provider: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    pub text: String,
    pub from: LanguageCode,
    pub to: LanguageCode,
}

impl TranslationRequest {
    pub fn new(text: impl Into<String>, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Opaque provider credentials
#[derive(Clone, Default)]
pub struct Credentials {
    pub key: String,
    /// Second secret for signed APIs (Baidu secret key)
    pub secret: Option<String>,
    pub region: Option<String>,
}

impl Credentials {
    pub fn key(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("key", &"<redacted>")
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("region", &self.region)
            .finish()
    }
}
