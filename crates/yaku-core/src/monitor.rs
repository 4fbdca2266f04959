use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use yaku_config::monitor::MonitorConfig;
use yaku_translator::Provider;
use yaku_types::{StatusEvent, StatusEvents};

use crate::registry::ProviderRegistry;

/// Result of one health check of the active provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Active provider has a single endpoint
    NotTracked,
    NoProvider,
    Healthy { url: String, latency: Duration },
    Switched { from: String, to: String },
    /// Current endpoint failed and no better one was found or switching is off
    Unhealthy { url: String },
    Cancelled,
}

/// Background prober for the active provider's endpoints
pub struct EndpointMonitor {
    registry: Arc<ProviderRegistry>,
    interval: Duration,
    auto_switch: bool,
    scan_spacing: Duration,
    events: StatusEvents,
}

impl EndpointMonitor {
    pub fn new(registry: Arc<ProviderRegistry>, config: &MonitorConfig, events: StatusEvents) -> Self {
        Self {
            registry,
            interval: Duration::from_secs(config.interval_secs),
            auto_switch: config.auto_switch,
            scan_spacing: Duration::from_millis(config.scan_spacing_ms),
            events,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_scan_spacing(mut self, spacing: Duration) -> Self {
        self.scan_spacing = spacing;
        self
    }

    /// Probe the current endpoint of the active provider. On failure, and
    /// with auto switch on, scan all endpoints and move to the fastest
    /// healthy one.
    pub async fn check_once(&self, cancel: &CancellationToken) -> CheckOutcome {
        let Some(provider) = self.registry.active() else {
            return CheckOutcome::NoProvider;
        };
        let Some(tracker) = provider.endpoints() else {
            return CheckOutcome::NotTracked;
        };
        let Some(current) = tracker.current() else {
            return CheckOutcome::NotTracked;
        };

        let outcome = tracker
            .probe(&current.url, provider.probe(&current.url))
            .await;
        if outcome.healthy {
            tracing::debug!(
                provider = provider.name(),
                url = %current.url,
                latency = ?outcome.latency,
                "Endpoint healthy"
            );
            return CheckOutcome::Healthy {
                url: current.url,
                latency: outcome.latency,
            };
        }

        if !self.auto_switch {
            return CheckOutcome::Unhealthy { url: current.url };
        }

        match self.find_best(&provider, cancel).await {
            Some(best) if best != current.url => {
                tracker.switch_to(&best);
                CheckOutcome::Switched {
                    from: current.url,
                    to: best,
                }
            }
            _ if cancel.is_cancelled() => CheckOutcome::Cancelled,
            _ => {
                tracing::warn!(provider = provider.name(), "No healthy endpoint found");
                CheckOutcome::Unhealthy { url: current.url }
            }
        }
    }

    /// Probe every endpoint, spaced by the scan interval, and return the
    /// fastest healthy one. Cancellation is honoured between probes.
    pub async fn find_best(
        &self,
        provider: &Arc<dyn Provider>,
        cancel: &CancellationToken,
    ) -> Option<String> {
        let tracker = provider.endpoints()?;
        let mut best: Option<(String, Duration)> = None;

        for (i, endpoint) in tracker.endpoints().into_iter().enumerate() {
            if i > 0 {
                tokio::select! {
                    _ = cancel.cancelled() => return None,
                    _ = tokio::time::sleep(self.scan_spacing) => {}
                }
            } else if cancel.is_cancelled() {
                return None;
            }

            let outcome = tracker
                .probe(&endpoint.url, provider.probe(&endpoint.url))
                .await;
            let faster = best
                .as_ref()
                .is_none_or(|(_, fastest)| outcome.latency < *fastest);
            if outcome.healthy && faster {
                best = Some((endpoint.url, outcome.latency));
            }
        }

        best.map(|(url, _)| url)
    }

    /// Check, then wait one interval, until cancelled
    pub async fn run(self, cancel: CancellationToken) {
        tracing::info!(
            interval = ?self.interval,
            auto_switch = self.auto_switch,
            "Endpoint monitor started"
        );

        while !cancel.is_cancelled() {
            match self.check_once(&cancel).await {
                CheckOutcome::Switched { from, to } => {
                    tracing::info!(%from, %to, "Monitor switched endpoint")
                }
                CheckOutcome::Unhealthy { url } => {
                    tracing::warn!(%url, "Current endpoint unhealthy")
                }
                _ => {}
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        tracing::info!("Endpoint monitor stopped");
        self.events.emit(StatusEvent::MonitorStopped {
            provider: self.registry.active_name(),
        });
    }
}
