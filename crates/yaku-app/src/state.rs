use std::sync::Arc;

use kanal::AsyncReceiver;
use yaku_config::Config;
use yaku_core::{ProviderRegistry, TranslationPipeline};
use yaku_types::{StatusEvent, StatusEvents};

/// Status events buffered before the consumer falls behind and drops them
const STATUS_CAPACITY: usize = 256;

pub struct AppState {
    pub config: Config,
    pub registry: Arc<ProviderRegistry>,
    pub pipeline: TranslationPipeline,
    pub events: StatusEvents,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<(Self, AsyncReceiver<StatusEvent>)> {
        let (events, status_rx) = StatusEvents::channel(STATUS_CAPACITY);

        let registry = Arc::new(ProviderRegistry::new(events.clone()));
        registry.register_all(yaku_provider_online::default_providers(&config, &events)?)?;

        let state = Self::with_registry(config, registry, events);
        Ok((state, status_rx))
    }

    /// Wire a pipeline around an already populated registry
    pub fn with_registry(
        config: Config,
        registry: Arc<ProviderRegistry>,
        events: StatusEvents,
    ) -> Self {
        let wanted = &config.translator.active_provider;
        if !registry.select(wanted) {
            tracing::warn!(
                provider = %wanted,
                available = ?registry.names(),
                "Configured provider not found, keeping {:?}",
                registry.active_name()
            );
        }

        let pipeline = TranslationPipeline::from_config(registry.clone(), &config, events.clone());
        Self {
            config,
            registry,
            pipeline,
            events,
        }
    }
}
