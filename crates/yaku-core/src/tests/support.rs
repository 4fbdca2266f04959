//! Scripted in-memory provider shared by the engine tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use yaku_translator::{
    Credentials, EndpointHealthTracker, Provider, ProviderCapability, TranslateError, Translation,
};
use yaku_types::StatusEvents;

use crate::registry::ProviderRegistry;

#[derive(Debug, Clone)]
pub enum Behavior {
    /// Returns `<name>:<text>`
    Translate,
    Quota,
    Transient,
    Unsupported,
    MissingCredentials,
    /// Transient failure when the text contains the needle
    FailOn(String),
}

/// Probe result for one endpoint of a mock provider
#[derive(Debug, Clone, Copy)]
pub enum ProbeScript {
    Healthy(Duration),
    Down,
}

pub struct MockProvider {
    name: String,
    capability: ProviderCapability,
    behavior: Mutex<Behavior>,
    calls: AtomicUsize,
    seen: Mutex<Vec<String>>,
    tracker: Option<EndpointHealthTracker>,
    probes: Mutex<HashMap<String, ProbeScript>>,
    credentials: Mutex<Option<Credentials>>,
}

impl MockProvider {
    pub fn new(name: &str, behavior: Behavior) -> Self {
        Self {
            name: name.to_string(),
            capability: ProviderCapability::any(5000),
            behavior: Mutex::new(behavior),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
            tracker: None,
            probes: Mutex::new(HashMap::new()),
            credentials: Mutex::new(None),
        }
    }

    pub fn with_capability(mut self, capability: ProviderCapability) -> Self {
        self.capability = capability;
        self
    }

    pub fn with_endpoints(mut self, probes: &[(&str, ProbeScript)], events: StatusEvents) -> Self {
        let urls: Vec<String> = probes.iter().map(|(u, _)| u.to_string()).collect();
        self.tracker = Some(EndpointHealthTracker::new(self.name.clone(), urls, events));
        self.probes = Mutex::new(probes.iter().map(|(u, p)| (u.to_string(), *p)).collect());
        self
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().clone()
    }

    pub fn set_behavior(&self, behavior: Behavior) {
        *self.behavior.lock() = behavior;
    }

    pub fn set_probe(&self, url: &str, script: ProbeScript) {
        self.probes.lock().insert(url.to_string(), script);
    }

    pub fn credentials(&self) -> Option<Credentials> {
        self.credentials.lock().clone()
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn capability(&self) -> &ProviderCapability {
        &self.capability
    }

    async fn translate(
        &self,
        text: &str,
        from: &str,
        to: &str,
    ) -> Result<Translation, TranslateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().push(text.to_string());

        let behavior = self.behavior.lock().clone();
        match behavior {
            Behavior::Translate => {}
            Behavior::Quota => return Err(TranslateError::QuotaExceeded("daily limit".into())),
            Behavior::Transient => return Err(TranslateError::Transient("503".into())),
            Behavior::Unsupported => return Err(TranslateError::unsupported(from, to)),
            Behavior::MissingCredentials => {
                return Err(TranslateError::Configuration("no key".into()));
            }
            Behavior::FailOn(needle) if text.contains(&needle) => {
                return Err(TranslateError::Transient("scripted failure".into()));
            }
            Behavior::FailOn(_) => {}
        }

        Ok(Translation {
            text: format!("{}:{}", self.name, text),
            from: from.to_string(),
            to: to.to_string(),
            provider: self.name.clone(),
        })
    }

    fn endpoints(&self) -> Option<&EndpointHealthTracker> {
        self.tracker.as_ref()
    }

    async fn probe(&self, url: &str) -> Result<(), TranslateError> {
        let script = self.probes.lock().get(url).copied();
        match script {
            Some(ProbeScript::Healthy(delay)) => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
            _ => Err(TranslateError::Transient("connection refused".into())),
        }
    }

    fn set_credentials(&self, credentials: Credentials) -> Result<(), TranslateError> {
        *self.credentials.lock() = Some(credentials);
        Ok(())
    }
}

/// Registry holding the given providers, in order
pub fn registry_of(providers: &[Arc<MockProvider>], events: StatusEvents) -> Arc<ProviderRegistry> {
    let registry = ProviderRegistry::new(events);
    for provider in providers {
        registry
            .register(provider.clone() as Arc<dyn Provider>)
            .unwrap();
    }
    Arc::new(registry)
}

pub fn names(providers: &[Arc<MockProvider>]) -> Vec<String> {
    providers.iter().map(|p| p.name().to_string()).collect()
}
