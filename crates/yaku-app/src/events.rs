use kanal::AsyncReceiver;
use tokio_util::sync::CancellationToken;
use yaku_types::{EndpointHealth, StatusEvent};

/// Consume status events until cancelled, then drain what is buffered
pub async fn status_loop(
    rx: AsyncReceiver<StatusEvent>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            event = rx.recv() => match event {
                Ok(event) => handle_event(&event),
                Err(_) => return Ok(()),
            },
        }
    }

    while let Ok(Some(event)) = rx.try_recv() {
        handle_event(&event);
    }
    Ok(())
}

pub fn handle_event(event: &StatusEvent) {
    let payload = serde_json::to_string(event).unwrap_or_default();

    match event {
        StatusEvent::EndpointHealthChanged {
            health: EndpointHealth::Failed,
            ..
        }
        | StatusEvent::CustomEndpointInUse { .. } => {
            tracing::warn!(target: "yaku::status", event = %payload, "Status");
        }
        StatusEvent::EndpointHealthChanged { .. } => {
            tracing::debug!(target: "yaku::status", event = %payload, "Status");
        }
        _ => {
            tracing::info!(target: "yaku::status", event = %payload, "Status");
        }
    }
}
