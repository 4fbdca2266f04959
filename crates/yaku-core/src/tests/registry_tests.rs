use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use yaku_translator::{Credentials, Provider, ProviderCapability};
use yaku_types::{StatusEvent, StatusEvents, SwitchReason};

use super::support::{Behavior, MockProvider, registry_of};
use crate::error::RegistryError;
use crate::registry::ProviderRegistry;

#[test]
fn test_first_registered_becomes_active() {
    let a = MockProvider::new("alpha", Behavior::Translate).arc();
    let b = MockProvider::new("beta", Behavior::Translate).arc();
    let registry = registry_of(&[a, b], StatusEvents::disabled());

    assert_eq!(registry.active_name().as_deref(), Some("alpha"));
    assert_eq!(registry.names(), ["alpha", "beta"]);
    assert_eq!(registry.len(), 2);
}

#[test]
fn test_duplicate_name_is_rejected() {
    let registry = ProviderRegistry::new(StatusEvents::disabled());
    registry
        .register(MockProvider::new("alpha", Behavior::Translate).arc())
        .unwrap();

    let err = registry
        .register(MockProvider::new("alpha", Behavior::Quota).arc())
        .unwrap_err();
    assert!(matches!(err, RegistryError::Duplicate(name) if name == "alpha"));
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_select_unknown_keeps_selection() {
    let registry = registry_of(
        &[
            MockProvider::new("alpha", Behavior::Translate).arc(),
            MockProvider::new("beta", Behavior::Translate).arc(),
        ],
        StatusEvents::disabled(),
    );

    assert!(!registry.select("gamma"));
    assert_eq!(registry.active_name().as_deref(), Some("alpha"));
    assert!(registry.select("beta"));
    assert_eq!(registry.active().unwrap().name(), "beta");
}

#[tokio::test]
async fn test_select_emits_active_provider_changed() {
    let (events, rx) = StatusEvents::channel(8);
    let registry = registry_of(
        &[
            MockProvider::new("alpha", Behavior::Translate).arc(),
            MockProvider::new("beta", Behavior::Translate).arc(),
        ],
        events,
    );

    assert!(registry.select("beta"));

    let event = timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("timed out")
        .expect("channel closed");
    match event {
        StatusEvent::ActiveProviderChanged {
            previous,
            current,
            reason,
        } => {
            assert_eq!(previous.as_deref(), Some("alpha"));
            assert_eq!(current, "beta");
            assert_eq!(reason, SwitchReason::Manual);
        }
        other => panic!("unexpected event: {:?}", other),
    }

    // reselecting the active provider is a no-op
    assert!(registry.select("beta"));
    assert!(rx.is_empty());
}

#[test]
fn test_find_capable_keeps_insertion_order() {
    let narrow = MockProvider::new("narrow", Behavior::Translate)
        .with_capability(ProviderCapability::listed(["en", "de"], 100))
        .arc();
    let open = MockProvider::new("open", Behavior::Translate).arc();
    let asian = MockProvider::new("asian", Behavior::Translate)
        .with_capability(ProviderCapability::listed(["en", "ja", "ms"], 100))
        .arc();
    let registry = registry_of(&[narrow, open, asian], StatusEvents::disabled());

    assert_eq!(registry.find_capable("en", "ms"), ["open", "asian"]);
    assert_eq!(registry.find_capable("auto", "de"), ["narrow", "open"]);
}

#[test]
fn test_set_credentials_reaches_provider() {
    let alpha = MockProvider::new("alpha", Behavior::Translate).arc();
    let registry = registry_of(&[alpha.clone()], StatusEvents::disabled());

    registry
        .set_credentials("alpha", Credentials::key("secret-key").with_region("eu"))
        .unwrap();
    let stored = alpha.credentials().unwrap();
    assert_eq!(stored.key, "secret-key");
    assert_eq!(stored.region.as_deref(), Some("eu"));

    assert!(matches!(
        registry.set_credentials("missing", Credentials::key("k")),
        Err(RegistryError::UnknownProvider(_))
    ));
}

#[test]
fn test_custom_endpoint_unsupported_by_provider() {
    let registry = registry_of(
        &[MockProvider::new("alpha", Behavior::Translate).arc()],
        StatusEvents::disabled(),
    );

    let err = registry
        .set_custom_endpoint("alpha", "https://mirror.test")
        .unwrap_err();
    assert!(matches!(err, RegistryError::Provider(_)));
}

#[test]
fn test_register_all_accepts_loader_output() {
    let registry = ProviderRegistry::new(StatusEvents::disabled());
    let loaded: Vec<Arc<dyn Provider>> = vec![
        MockProvider::new("one", Behavior::Translate).arc(),
        MockProvider::new("two", Behavior::Translate).arc(),
    ];
    registry.register_all(loaded).unwrap();
    assert_eq!(registry.names(), ["one", "two"]);
}
