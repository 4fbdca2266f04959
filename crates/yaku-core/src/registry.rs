use std::sync::Arc;

use parking_lot::RwLock;
use yaku_translator::{Credentials, Provider};
use yaku_types::{StatusEvent, StatusEvents, SwitchReason};

use crate::error::RegistryError;

/// Owns every configured provider and the active selection.
/// Providers keep their insertion order.
pub struct ProviderRegistry {
    providers: RwLock<Vec<Arc<dyn Provider>>>,
    active: RwLock<Option<String>>,
    events: StatusEvents,
}

impl ProviderRegistry {
    pub fn new(events: StatusEvents) -> Self {
        Self {
            providers: RwLock::new(Vec::new()),
            active: RwLock::new(None),
            events,
        }
    }

    /// Add a provider. The first one registered becomes active.
    pub fn register(&self, provider: Arc<dyn Provider>) -> Result<(), RegistryError> {
        let name = provider.name().to_string();
        {
            let mut providers = self.providers.write();
            if providers.iter().any(|p| p.name() == name) {
                return Err(RegistryError::Duplicate(name));
            }
            providers.push(provider);
        }

        let mut active = self.active.write();
        if active.is_none() {
            *active = Some(name.clone());
        }
        tracing::debug!(provider = %name, "Registered provider");
        Ok(())
    }

    pub fn register_all<I>(&self, providers: I) -> Result<(), RegistryError>
    where
        I: IntoIterator<Item = Arc<dyn Provider>>,
    {
        providers.into_iter().try_for_each(|p| self.register(p))
    }

    /// Make `name` the active provider. Unknown names leave the
    /// selection unchanged and return false.
    pub fn select(&self, name: &str) -> bool {
        self.switch_active(name, SwitchReason::Manual)
    }

    pub(crate) fn switch_active(&self, name: &str, reason: SwitchReason) -> bool {
        if self.get(name).is_none() {
            tracing::warn!(provider = name, "Cannot select unknown provider");
            return false;
        }

        let previous = {
            let mut active = self.active.write();
            if active.as_deref() == Some(name) {
                return true;
            }
            active.replace(name.to_string())
        };

        tracing::info!(from = ?previous, to = name, ?reason, "Active provider changed");
        self.events.emit(StatusEvent::ActiveProviderChanged {
            previous,
            current: name.to_string(),
            reason,
        });
        true
    }

    pub fn active(&self) -> Option<Arc<dyn Provider>> {
        let name = self.active.read().clone()?;
        self.get(&name)
    }

    pub fn active_name(&self) -> Option<String> {
        self.active.read().clone()
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Provider>> {
        self.providers
            .read()
            .iter()
            .find(|p| p.name() == name)
            .cloned()
    }

    /// Provider names in insertion order
    pub fn names(&self) -> Vec<String> {
        self.providers
            .read()
            .iter()
            .map(|p| p.name().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.providers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.read().is_empty()
    }

    /// Providers whose capability accepts both tags, in insertion order
    pub fn find_capable(&self, from: &str, to: &str) -> Vec<String> {
        self.providers
            .read()
            .iter()
            .filter(|p| p.capability().supports_pair(from, to))
            .map(|p| p.name().to_string())
            .collect()
    }

    pub fn set_credentials(&self, name: &str, credentials: Credentials) -> Result<(), RegistryError> {
        let provider = self
            .get(name)
            .ok_or_else(|| RegistryError::UnknownProvider(name.to_string()))?;
        provider.set_credentials(credentials)?;
        tracing::info!(provider = name, "Credentials updated");
        Ok(())
    }

    pub fn set_custom_endpoint(&self, name: &str, url: &str) -> Result<(), RegistryError> {
        let provider = self
            .get(name)
            .ok_or_else(|| RegistryError::UnknownProvider(name.to_string()))?;
        provider.set_custom_endpoint(url)?;
        tracing::info!(provider = name, url, "Custom endpoint set");
        Ok(())
    }
}
