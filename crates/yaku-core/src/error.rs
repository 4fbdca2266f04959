use yaku_translator::TranslateError;

#[derive(Debug, thiserror::Error)]
pub enum RoutingError {
    #[error("No providers registered")]
    NoProviders,

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("All providers failed after {attempts} attempts, last error: {last}")]
    AllProvidersFailed {
        attempts: usize,
        last: Box<TranslateError>,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Provider already registered: {0}")]
    Duplicate(String),

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error(transparent)]
    Provider(#[from] TranslateError),
}
