use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use yaku_config::monitor::MonitorConfig;
use yaku_translator::{Provider, TranslateError};
use yaku_types::{EndpointHealth, StatusEvent, StatusEvents};

use super::support::{Behavior, MockProvider, ProbeScript, registry_of};
use crate::monitor::{CheckOutcome, EndpointMonitor};

const A: &str = "https://a.test";
const B: &str = "https://b.test";
const C: &str = "https://c.test";

fn mirrored(probes: &[(&str, ProbeScript)], events: StatusEvents) -> Arc<MockProvider> {
    MockProvider::new("mirrors", Behavior::Translate)
        .with_endpoints(probes, events)
        .arc()
}

fn monitor(provider: &Arc<MockProvider>, auto_switch: bool, events: StatusEvents) -> EndpointMonitor {
    let registry = registry_of(&[provider.clone()], events.clone());
    let config = MonitorConfig {
        auto_switch,
        ..MonitorConfig::default()
    };
    EndpointMonitor::new(registry, &config, events).with_scan_spacing(Duration::from_millis(1))
}

#[tokio::test]
async fn test_healthy_current_endpoint_stays() {
    let provider = mirrored(
        &[(A, ProbeScript::Healthy(Duration::ZERO)), (B, ProbeScript::Down)],
        StatusEvents::disabled(),
    );
    let m = monitor(&provider, true, StatusEvents::disabled());

    let outcome = m.check_once(&CancellationToken::new()).await;
    assert!(matches!(outcome, CheckOutcome::Healthy { ref url, .. } if url == A));

    let tracker = provider.endpoints().unwrap();
    assert_eq!(tracker.endpoints()[0].health, EndpointHealth::Healthy);
    assert_eq!(tracker.endpoints()[1].health, EndpointHealth::Unknown);
}

#[tokio::test]
async fn test_failed_current_switches_to_fastest_healthy() {
    let (events, rx) = StatusEvents::channel(64);
    let provider = mirrored(
        &[
            (A, ProbeScript::Down),
            (B, ProbeScript::Healthy(Duration::from_millis(80))),
            (C, ProbeScript::Healthy(Duration::ZERO)),
        ],
        events.clone(),
    );
    let m = monitor(&provider, true, events);

    let outcome = m.check_once(&CancellationToken::new()).await;
    assert_eq!(
        outcome,
        CheckOutcome::Switched {
            from: A.to_string(),
            to: C.to_string()
        }
    );
    assert_eq!(provider.endpoints().unwrap().current().unwrap().url, C);

    let mut switched = false;
    while let Ok(Some(event)) = rx.try_recv() {
        if let StatusEvent::EndpointSwitched { previous, current, .. } = event {
            assert_eq!((previous.as_str(), current.as_str()), (A, C));
            switched = true;
        }
    }
    assert!(switched);
}

#[tokio::test]
async fn test_auto_switch_off_only_reports() {
    let provider = mirrored(
        &[(A, ProbeScript::Down), (B, ProbeScript::Healthy(Duration::ZERO))],
        StatusEvents::disabled(),
    );
    let m = monitor(&provider, false, StatusEvents::disabled());

    let outcome = m.check_once(&CancellationToken::new()).await;
    assert_eq!(outcome, CheckOutcome::Unhealthy { url: A.to_string() });
    let tracker = provider.endpoints().unwrap();
    assert!(tracker.is_failed(A));
    assert!(!tracker.is_failed(B));
}

#[tokio::test]
async fn test_single_endpoint_provider_is_not_tracked() {
    let provider = MockProvider::new("plain", Behavior::Translate).arc();
    let m = monitor(&provider, true, StatusEvents::disabled());

    assert_eq!(
        m.check_once(&CancellationToken::new()).await,
        CheckOutcome::NotTracked
    );
}

#[tokio::test]
async fn test_recovered_endpoint_is_seen_on_next_check() {
    let provider = mirrored(
        &[(A, ProbeScript::Down), (B, ProbeScript::Down)],
        StatusEvents::disabled(),
    );
    let m = monitor(&provider, true, StatusEvents::disabled());

    let outcome = m.check_once(&CancellationToken::new()).await;
    assert!(matches!(outcome, CheckOutcome::Unhealthy { .. }));

    provider.set_probe(B, ProbeScript::Healthy(Duration::ZERO));
    let outcome = m.check_once(&CancellationToken::new()).await;
    assert!(matches!(outcome, CheckOutcome::Switched { ref to, .. } if to == B));
}

#[tokio::test]
async fn test_run_stops_on_cancel() {
    let (events, rx) = StatusEvents::channel(64);
    let provider = mirrored(&[(A, ProbeScript::Healthy(Duration::ZERO))], events.clone());
    let m = monitor(&provider, true, events).with_interval(Duration::from_secs(300));

    let cancel = CancellationToken::new();
    let handle = tokio::spawn(m.run(cancel.clone()));

    tokio::time::sleep(Duration::from_millis(20)).await;
    cancel.cancel();
    timeout(Duration::from_secs(2), handle)
        .await
        .expect("monitor did not stop")
        .unwrap();

    let mut stopped = false;
    while let Ok(Some(event)) = rx.try_recv() {
        if let StatusEvent::MonitorStopped { provider } = event {
            assert_eq!(provider.as_deref(), Some("mirrors"));
            stopped = true;
        }
    }
    assert!(stopped);
}

#[tokio::test]
async fn test_scan_aborts_when_cancelled() {
    let provider = mirrored(
        &[
            (A, ProbeScript::Down),
            (B, ProbeScript::Healthy(Duration::ZERO)),
        ],
        StatusEvents::disabled(),
    );
    let m = monitor(&provider, true, StatusEvents::disabled())
        .with_scan_spacing(Duration::from_secs(60));

    let cancel = CancellationToken::new();
    let canceller = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            cancel.cancel();
        })
    };

    let outcome = timeout(Duration::from_secs(2), m.check_once(&cancel))
        .await
        .expect("scan ignored cancellation");
    assert_eq!(outcome, CheckOutcome::Cancelled);
    canceller.await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_checks_and_request_failures_share_tracker() {
    let provider = mirrored(
        &[
            (A, ProbeScript::Down),
            (B, ProbeScript::Healthy(Duration::from_millis(1))),
            (C, ProbeScript::Healthy(Duration::from_millis(2))),
        ],
        StatusEvents::disabled(),
    );
    let m = Arc::new(monitor(&provider, true, StatusEvents::disabled()));
    let done = Arc::new(AtomicBool::new(false));

    let checks = {
        let m = m.clone();
        tokio::spawn(async move {
            let cancel = CancellationToken::new();
            for _ in 0..20 {
                m.check_once(&cancel).await;
            }
        })
    };

    // requests only ever succeed on C
    let requests = {
        let provider = provider.clone();
        tokio::spawn(async move {
            let tracker = provider.endpoints().unwrap();
            for _ in 0..50 {
                let _ = tracker
                    .run(|url| async move {
                        if url == C {
                            Ok(url)
                        } else {
                            Err(TranslateError::Transient("connection reset".into()))
                        }
                    })
                    .await;
                tokio::task::yield_now().await;
            }
        })
    };

    let watcher = {
        let provider = provider.clone();
        let done = done.clone();
        tokio::spawn(async move {
            let tracker = provider.endpoints().unwrap();
            while !done.load(Ordering::SeqCst) {
                let current = tracker.current().unwrap();
                assert_ne!(current.health, EndpointHealth::Failed, "cursor on {}", current.url);
                tokio::task::yield_now().await;
            }
        })
    };

    timeout(Duration::from_secs(10), async {
        checks.await.unwrap();
        requests.await.unwrap();
    })
    .await
    .expect("checks and requests did not finish");
    done.store(true, Ordering::SeqCst);
    watcher.await.unwrap();

    let tracker = provider.endpoints().unwrap();
    assert!(!tracker.is_failed(C));
    assert_ne!(tracker.current().unwrap().health, EndpointHealth::Failed);
}
