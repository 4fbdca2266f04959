use std::sync::Arc;
use std::time::Duration;

use tracing::Instrument;
use uuid::Uuid;
use yaku_config::{ChunkFailurePolicy, Config};
use yaku_translator::TranslationRequest;
use yaku_types::StatusEvents;

use crate::chunker::{self, Chunk};
use crate::error::RoutingError;
use crate::orchestrator::FallbackOrchestrator;
use crate::registry::ProviderRegistry;

/// Top-level entry point: chunking, orchestration and reassembly
pub struct TranslationPipeline {
    orchestrator: FallbackOrchestrator,
    chunk_delay: Duration,
    chunk_failure: ChunkFailurePolicy,
}

impl TranslationPipeline {
    pub fn new(orchestrator: FallbackOrchestrator) -> Self {
        Self {
            orchestrator,
            chunk_delay: Duration::ZERO,
            chunk_failure: ChunkFailurePolicy::default(),
        }
    }

    pub fn from_config(
        registry: Arc<ProviderRegistry>,
        config: &Config,
        events: StatusEvents,
    ) -> Self {
        Self::new(FallbackOrchestrator::from_config(
            registry,
            &config.translator,
            events,
        ))
        .with_chunk_delay(Duration::from_millis(config.translator.chunk_delay_ms))
        .with_chunk_failure(config.translator.chunk_failure)
    }

    pub fn with_chunk_delay(mut self, delay: Duration) -> Self {
        self.chunk_delay = delay;
        self
    }

    pub fn with_chunk_failure(mut self, policy: ChunkFailurePolicy) -> Self {
        self.chunk_failure = policy;
        self
    }

    pub fn orchestrator(&self) -> &FallbackOrchestrator {
        &self.orchestrator
    }

    pub async fn translate_request(
        &self,
        request: &TranslationRequest,
    ) -> Result<String, RoutingError> {
        self.translate(&request.text, &request.from, &request.to)
            .await
    }

    /// Translate `text`, chunked to the routed provider's size limit.
    ///
    /// Blank input returns an empty string without touching any provider.
    /// Under the degrade policy a chunk that every provider fails on is kept
    /// untranslated, so once chunking starts the call does not fail.
    pub async fn translate(&self, text: &str, from: &str, to: &str) -> Result<String, RoutingError> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }
        if from.trim().is_empty() || to.trim().is_empty() {
            return Err(RoutingError::InvalidRequest(
                "language tags must not be empty".to_string(),
            ));
        }

        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("translate", %request_id, from, to);
        self.run(text, from, to).instrument(span).await
    }

    async fn run(&self, text: &str, from: &str, to: &str) -> Result<String, RoutingError> {
        let mut route = self.orchestrator.begin(from, to)?;
        tracing::debug!(
            provider = route.provider_name(),
            chars = text.chars().count(),
            "Routing request"
        );

        let mut translated: Vec<Chunk> = Vec::new();
        let mut rest = text;

        // route and size limit are re-resolved per chunk, so a provider
        // switch mid-request applies to the remaining chunks
        while let Some((chunk, remainder)) = chunker::next_chunk(rest, route.max_chars()) {
            let index = translated.len();
            let text = match self.orchestrator.translate_with(&route, chunk, from, to).await {
                Ok(translation) => translation.text,
                Err(err) => match self.chunk_failure {
                    ChunkFailurePolicy::Degrade => {
                        tracing::warn!(chunk = index, error = %err, "Chunk failed, keeping original text");
                        chunk.to_string()
                    }
                    ChunkFailurePolicy::Abort => return Err(err),
                },
            };

            translated.push(Chunk { index, text });
            rest = remainder;
            if rest.trim().is_empty() {
                break;
            }

            if !self.chunk_delay.is_zero() {
                tokio::time::sleep(self.chunk_delay).await;
            }
            let next = self.orchestrator.reroute(from, to, &route)?;
            if next.provider_name() != route.provider_name() {
                tracing::debug!(
                    from_provider = route.provider_name(),
                    to_provider = next.provider_name(),
                    "Route changed between chunks"
                );
            }
            route = next;
        }

        tracing::info!(chunks = translated.len(), "Translation finished");
        Ok(chunker::join(&translated))
    }
}
