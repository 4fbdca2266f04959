use std::collections::HashSet;
use std::future::Future;
use std::time::{Duration, Instant, SystemTime};

use parking_lot::Mutex;
use yaku_types::{EndpointHealth, StatusEvent, StatusEvents};

use crate::error::TranslateError;

const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// One concrete mirror URL of a multi-endpoint provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub url: String,
    pub health: EndpointHealth,
    pub last_checked: Option<SystemTime>,
    pub latency: Option<Duration>,
}

impl Endpoint {
    fn new(url: String) -> Self {
        Self {
            url,
            health: EndpointHealth::Unknown,
            last_checked: None,
            latency: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub healthy: bool,
    pub latency: Duration,
}

struct TrackerState {
    endpoints: Vec<Endpoint>,
    cursor: usize,
    failed: HashSet<String>,
}

impl TrackerState {
    fn index_of(&self, url: &str) -> Option<usize> {
        self.endpoints.iter().position(|e| e.url == url)
    }

    /// Move the cursor onto a non-failed endpoint if it sits on a failed one
    fn settle(&mut self) {
        let n = self.endpoints.len();
        if n == 0 || !self.failed.contains(&self.endpoints[self.cursor].url) {
            return;
        }
        if let Some(idx) = (1..n)
            .map(|offset| (self.cursor + offset) % n)
            .find(|&idx| !self.failed.contains(&self.endpoints[idx].url))
        {
            self.cursor = idx;
        }
    }
}

/// Liveness and rotation state for one provider's mirrors.
///
/// All mutation of endpoint health, the cursor and the failed set happens
/// under a single lock, so the monitor and the request path can share it.
pub struct EndpointHealthTracker {
    provider: String,
    events: StatusEvents,
    probe_timeout: Duration,
    state: Mutex<TrackerState>,
}

impl EndpointHealthTracker {
    pub fn new<I, S>(provider: impl Into<String>, urls: I, events: StatusEvents) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut endpoints: Vec<Endpoint> = Vec::new();
        for url in urls {
            let url = url.into();
            if !endpoints.iter().any(|e| e.url == url) {
                endpoints.push(Endpoint::new(url));
            }
        }

        Self {
            provider: provider.into(),
            events,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            state: Mutex::new(TrackerState {
                endpoints,
                cursor: 0,
                failed: HashSet::new(),
            }),
        }
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn probe_timeout(&self) -> Duration {
        self.probe_timeout
    }

    pub fn len(&self) -> usize {
        self.state.lock().endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of every endpoint, in rotation order
    pub fn endpoints(&self) -> Vec<Endpoint> {
        self.state.lock().endpoints.clone()
    }

    /// Endpoint at the rotation cursor. If the cursor rests on a failed
    /// endpoint and a live one exists, the cursor moves to it first.
    pub fn current(&self) -> Option<Endpoint> {
        let mut state = self.state.lock();
        state.settle();
        let cursor = state.cursor;
        state.endpoints.get(cursor).cloned()
    }

    pub fn is_failed(&self, url: &str) -> bool {
        self.state.lock().failed.contains(url)
    }

    pub fn all_failed(&self) -> bool {
        let state = self.state.lock();
        !state.endpoints.is_empty() && state.failed.len() >= state.endpoints.len()
    }

    /// Move to the next endpoint not in the failed set, wrapping.
    /// Returns false when every endpoint is failed.
    pub fn advance(&self) -> bool {
        let mut state = self.state.lock();
        let n = state.endpoints.len();
        let next = (1..=n)
            .map(|offset| (state.cursor + offset) % n)
            .find(|&idx| !state.failed.contains(&state.endpoints[idx].url));

        match next {
            Some(idx) => {
                state.cursor = idx;
                true
            }
            None => false,
        }
    }

    pub fn mark_failed(&self, url: &str, reason: &str) {
        let changed = {
            let mut state = self.state.lock();
            let Some(idx) = state.index_of(url) else {
                return;
            };
            state.failed.insert(url.to_string());
            let endpoint = &mut state.endpoints[idx];
            endpoint.last_checked = Some(SystemTime::now());
            std::mem::replace(&mut endpoint.health, EndpointHealth::Failed) != EndpointHealth::Failed
        };

        if changed {
            tracing::warn!(provider = %self.provider, url, reason, "Endpoint marked failed");
            self.emit_health(url, EndpointHealth::Failed, None, Some(reason.to_string()));
        }
    }

    pub fn mark_healthy(&self, url: &str, latency: Option<Duration>) {
        let changed = {
            let mut state = self.state.lock();
            let Some(idx) = state.index_of(url) else {
                return;
            };
            state.failed.remove(url);
            let endpoint = &mut state.endpoints[idx];
            endpoint.last_checked = Some(SystemTime::now());
            if latency.is_some() {
                endpoint.latency = latency;
            }
            std::mem::replace(&mut endpoint.health, EndpointHealth::Healthy)
                != EndpointHealth::Healthy
        };

        if changed {
            tracing::info!(provider = %self.provider, url, "Endpoint healthy");
            self.emit_health(url, EndpointHealth::Healthy, latency, None);
        }
    }

    /// Clear the failed set. Failed endpoints return to `Unknown`.
    pub fn reset_all(&self) {
        let reset: Vec<String> = {
            let mut state = self.state.lock();
            state.failed.clear();
            state
                .endpoints
                .iter_mut()
                .filter(|e| e.health == EndpointHealth::Failed)
                .map(|e| {
                    e.health = EndpointHealth::Unknown;
                    e.url.clone()
                })
                .collect()
        };

        tracing::info!(provider = %self.provider, count = reset.len(), "Reset failed endpoints");
        for url in reset {
            self.emit_health(&url, EndpointHealth::Unknown, None, None);
        }
    }

    /// Append a new endpoint. Returns false if the URL is already tracked.
    pub fn add_endpoint(&self, url: &str) -> bool {
        let mut state = self.state.lock();
        if state.index_of(url).is_some() {
            return false;
        }
        state.endpoints.push(Endpoint::new(url.to_string()));
        tracing::info!(provider = %self.provider, url, "Endpoint added");
        true
    }

    /// Make `url` current. A failed endpoint chosen explicitly leaves the
    /// failed set and goes back to `Unknown`.
    pub fn switch_to(&self, url: &str) -> bool {
        let previous = {
            let mut state = self.state.lock();
            let Some(idx) = state.index_of(url) else {
                return false;
            };
            let previous = state.endpoints[state.cursor].url.clone();
            state.cursor = idx;
            if state.failed.remove(url) {
                state.endpoints[idx].health = EndpointHealth::Unknown;
            }
            previous
        };

        if previous != url {
            tracing::info!(provider = %self.provider, from = %previous, to = url, "Switched endpoint");
            self.events.emit(StatusEvent::EndpointSwitched {
                provider: self.provider.clone(),
                previous,
                current: url.to_string(),
            });
        }
        true
    }

    /// Run a probe future against `url` under the probe timeout and record
    /// the outcome. The lock is not held while the probe is in flight.
    pub async fn probe<Fut>(&self, url: &str, check: Fut) -> ProbeOutcome
    where
        Fut: Future<Output = Result<(), TranslateError>>,
    {
        let started = Instant::now();
        let result = tokio::time::timeout(self.probe_timeout, check).await;
        let latency = started.elapsed();

        match result {
            Ok(Ok(())) => {
                self.record_latency(url, latency);
                self.mark_healthy(url, Some(latency));
                ProbeOutcome {
                    healthy: true,
                    latency,
                }
            }
            Ok(Err(err)) => {
                self.mark_failed(url, &err.to_string());
                ProbeOutcome {
                    healthy: false,
                    latency,
                }
            }
            Err(_) => {
                self.mark_failed(url, "probe timed out");
                ProbeOutcome {
                    healthy: false,
                    latency,
                }
            }
        }
    }

    /// Run `op` against the current endpoint, rotating on transient failure.
    ///
    /// At most one attempt per endpoint. When rotation finds every endpoint
    /// failed, the failed set is cleared once; a second exhaustion is terminal.
    /// Quota, unsupported and configuration errors return immediately.
    pub async fn run<F, Fut, T>(&self, mut op: F) -> Result<T, TranslateError>
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = Result<T, TranslateError>>,
    {
        let budget = self.len();
        if budget == 0 {
            return Err(TranslateError::Configuration(format!(
                "{} has no endpoints configured",
                self.provider
            )));
        }

        let mut reset_used = false;
        if self.all_failed() {
            self.reset_all();
            reset_used = true;
        }

        let mut attempts = 0;
        let mut last = None;
        while attempts < budget {
            let Some(endpoint) = self.current() else {
                break;
            };
            attempts += 1;

            let started = Instant::now();
            match op(endpoint.url.clone()).await {
                Ok(value) => {
                    self.mark_healthy(&endpoint.url, Some(started.elapsed()));
                    return Ok(value);
                }
                Err(err) if err.is_transient() => {
                    tracing::debug!(
                        provider = %self.provider,
                        url = %endpoint.url,
                        attempt = attempts,
                        error = %err,
                        "Endpoint attempt failed"
                    );
                    self.mark_failed(&endpoint.url, &err.to_string());
                    last = Some(err);

                    if !self.advance() {
                        if reset_used {
                            break;
                        }
                        self.reset_all();
                        reset_used = true;
                        if !self.advance() {
                            break;
                        }
                    }
                }
                Err(err) => return Err(err),
            }
        }

        Err(TranslateError::EndpointsExhausted {
            attempts,
            last: Box::new(
                last.unwrap_or_else(|| TranslateError::Transient("no endpoint available".into())),
            ),
        })
    }

    fn record_latency(&self, url: &str, latency: Duration) {
        let mut state = self.state.lock();
        if let Some(idx) = state.index_of(url) {
            state.endpoints[idx].latency = Some(latency);
        }
    }

    fn emit_health(
        &self,
        url: &str,
        health: EndpointHealth,
        latency: Option<Duration>,
        message: Option<String>,
    ) {
        self.events.emit(StatusEvent::EndpointHealthChanged {
            provider: self.provider.clone(),
            url: url.to_string(),
            health,
            latency_ms: latency.map(|l| l.as_millis() as u64),
            message,
        });
    }
}
