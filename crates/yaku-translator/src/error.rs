/// How a failure propagates through rotation and fallback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Language pair outside the provider's capability
    Unsupported,
    /// Provider-reported rate or quota limit
    Quota,
    /// Network, timeout, 5xx or malformed response
    Transient,
    /// Missing or rejected credential
    Configuration,
}

#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error("Unsupported language pair: {from} -> {to}")]
    UnsupportedLanguagePair { from: String, to: String },

    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Transient failure: {0}")]
    Transient(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("All {attempts} endpoints failed, last error: {last}")]
    EndpointsExhausted {
        attempts: usize,
        last: Box<TranslateError>,
    },
}

impl TranslateError {
    pub fn class(&self) -> ErrorClass {
        match self {
            TranslateError::UnsupportedLanguagePair { .. } => ErrorClass::Unsupported,
            TranslateError::QuotaExceeded(_) => ErrorClass::Quota,
            TranslateError::Configuration(_) => ErrorClass::Configuration,
            TranslateError::Transient(_)
            | TranslateError::NetworkError(_)
            | TranslateError::Malformed(_)
            | TranslateError::EndpointsExhausted { .. } => ErrorClass::Transient,
        }
    }

    pub fn is_transient(&self) -> bool {
        self.class() == ErrorClass::Transient
    }

    pub fn unsupported(from: &str, to: &str) -> Self {
        TranslateError::UnsupportedLanguagePair {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}
