use std::sync::Arc;

use yaku_config::CapabilitySwitch;
use yaku_config::translator::TranslatorConfig;
use yaku_translator::{ErrorClass, Provider, TranslateError, Translation};
use yaku_types::{StatusEvent, StatusEvents, SwitchReason};

use crate::chunker::{self, Chunk};
use crate::error::RoutingError;
use crate::registry::ProviderRegistry;

/// Provider chosen for one request after the capability check
pub struct RequestRoute {
    primary: Arc<dyn Provider>,
}

impl RequestRoute {
    pub fn provider_name(&self) -> &str {
        self.primary.name()
    }

    /// Chunk size limit of the routed provider
    pub fn max_chars(&self) -> usize {
        self.primary.capability().max_chars
    }
}

/// Drives provider selection and the ordered fallback sweep
pub struct FallbackOrchestrator {
    registry: Arc<ProviderRegistry>,
    /// Empty means registry insertion order
    fallback_order: Vec<String>,
    switch_mode: CapabilitySwitch,
    events: StatusEvents,
}

impl FallbackOrchestrator {
    pub fn new(
        registry: Arc<ProviderRegistry>,
        fallback_order: Vec<String>,
        switch_mode: CapabilitySwitch,
        events: StatusEvents,
    ) -> Self {
        Self {
            registry,
            fallback_order,
            switch_mode,
            events,
        }
    }

    pub fn from_config(
        registry: Arc<ProviderRegistry>,
        config: &TranslatorConfig,
        events: StatusEvents,
    ) -> Self {
        Self::new(
            registry,
            config.fallback_order.clone(),
            config.capability_switch,
            events,
        )
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    pub fn fallback_order(&self) -> Vec<String> {
        if self.fallback_order.is_empty() {
            self.registry.names()
        } else {
            self.fallback_order.clone()
        }
    }

    /// Resolve the provider for a request. When the active provider cannot
    /// serve the pair, the first capable provider takes over; with no
    /// capable provider the active one is used anyway.
    pub fn begin(&self, from: &str, to: &str) -> Result<RequestRoute, RoutingError> {
        self.resolve(from, to, None)
    }

    /// Re-resolve the route for the next chunk of a request. Reroute
    /// notices fire only when the target differs from `previous`.
    pub fn reroute(
        &self,
        from: &str,
        to: &str,
        previous: &RequestRoute,
    ) -> Result<RequestRoute, RoutingError> {
        self.resolve(from, to, Some(previous.provider_name()))
    }

    fn resolve(
        &self,
        from: &str,
        to: &str,
        previous: Option<&str>,
    ) -> Result<RequestRoute, RoutingError> {
        let active = self.registry.active().ok_or(RoutingError::NoProviders)?;
        if active.capability().supports_pair(from, to) {
            return Ok(RequestRoute { primary: active });
        }

        let capable = self.registry.find_capable(from, to);
        let Some(replacement) = capable.first().and_then(|name| self.registry.get(name)) else {
            if previous != Some(active.name()) {
                tracing::warn!(
                    provider = active.name(),
                    from,
                    to,
                    "No provider declares support for this pair, trying the active one anyway"
                );
            }
            return Ok(RequestRoute { primary: active });
        };

        match self.switch_mode {
            CapabilitySwitch::Request if previous == Some(replacement.name()) => {}
            CapabilitySwitch::Request => {
                tracing::info!(
                    primary = active.name(),
                    rerouted_to = replacement.name(),
                    from,
                    to,
                    "Rerouting request to a capable provider"
                );
                self.events.emit(StatusEvent::RequestRerouted {
                    primary: active.name().to_string(),
                    rerouted_to: replacement.name().to_string(),
                    from_lang: from.to_string(),
                    to_lang: to.to_string(),
                });
            }
            CapabilitySwitch::Persistent => {
                self.registry
                    .switch_active(replacement.name(), SwitchReason::UnsupportedPair);
            }
        }

        Ok(RequestRoute {
            primary: replacement,
        })
    }

    /// Translate through the routed provider, then sweep the fallback order.
    /// A fallback success never changes the registry's selection.
    pub async fn translate_with(
        &self,
        route: &RequestRoute,
        text: &str,
        from: &str,
        to: &str,
    ) -> Result<Translation, RoutingError> {
        let mut tried: Vec<String> = Vec::new();
        let mut attempts = 0;
        let mut last: Option<TranslateError> = None;

        let mut candidates = vec![route.primary.clone()];
        for name in self.fallback_order() {
            if name == route.primary.name() {
                continue;
            }
            match self.registry.get(&name) {
                Some(provider) => candidates.push(provider),
                None => tracing::debug!(provider = %name, "Fallback provider not registered"),
            }
        }

        for (position, provider) in candidates.into_iter().enumerate() {
            let name = provider.name().to_string();
            if tried.contains(&name) {
                continue;
            }
            tried.push(name.clone());

            // the routed provider gets a best-effort try even for unlisted pairs
            let result = if position > 0 && !provider.capability().supports_pair(from, to) {
                Err(TranslateError::unsupported(from, to))
            } else {
                attempt(&provider, text, from, to).await
            };

            let err = match result {
                Ok(translation) => {
                    if position > 0 {
                        tracing::info!(provider = %name, attempts, "Fallback provider succeeded");
                    }
                    return Ok(translation);
                }
                Err(err) => err,
            };

            match err.class() {
                ErrorClass::Configuration => {
                    tracing::debug!(provider = %name, error = %err, "Skipping unconfigured provider");
                    if last.is_none() {
                        last = Some(err);
                    }
                }
                class => {
                    attempts += 1;
                    tracing::warn!(provider = %name, ?class, error = %err, "Provider failed");
                    last = Some(err);
                }
            }
        }

        tracing::error!(attempts, "Every provider in the fallback order failed");
        Err(RoutingError::AllProvidersFailed {
            attempts,
            last: Box::new(last.unwrap_or_else(|| {
                TranslateError::Configuration("no provider could be attempted".to_string())
            })),
        })
    }

    /// One-shot request: capability check plus fallback
    pub async fn translate(
        &self,
        text: &str,
        from: &str,
        to: &str,
    ) -> Result<Translation, RoutingError> {
        let route = self.begin(from, to)?;
        self.translate_with(&route, text, from, to).await
    }
}

/// Translate `text` with one provider, re-splitting it first when it is
/// longer than that provider accepts. Any failed piece fails the attempt.
async fn attempt(
    provider: &Arc<dyn Provider>,
    text: &str,
    from: &str,
    to: &str,
) -> Result<Translation, TranslateError> {
    let max_chars = provider.capability().max_chars;
    if text.chars().count() <= max_chars {
        return provider.translate(text, from, to).await;
    }

    let pieces = chunker::split(text, max_chars);
    tracing::debug!(
        provider = provider.name(),
        max_chars,
        pieces = pieces.len(),
        "Re-splitting chunk for a smaller provider limit"
    );

    let mut translated = Vec::with_capacity(pieces.len());
    for piece in pieces.into_chunks() {
        let translation = provider.translate(&piece.text, from, to).await?;
        translated.push(Chunk {
            index: piece.index,
            text: translation.text,
        });
    }

    Ok(Translation {
        text: chunker::join(&translated),
        from: from.to_string(),
        to: to.to_string(),
        provider: provider.name().to_string(),
    })
}
