use kanal::{AsyncReceiver, AsyncSender};

use crate::types::StatusEvent;

/// Non-blocking sink for [`StatusEvent`]s.
///
/// Cloned into every component that publishes state changes. Emitting never
/// waits: when the channel is full or closed the event is dropped.
#[derive(Clone, Default)]
pub struct StatusEvents {
    tx: Option<AsyncSender<StatusEvent>>,
}

impl StatusEvents {
    pub fn channel(capacity: usize) -> (Self, AsyncReceiver<StatusEvent>) {
        let (tx, rx) = kanal::bounded_async(capacity);
        (Self { tx: Some(tx) }, rx)
    }

    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn emit(&self, event: StatusEvent) {
        let Some(tx) = &self.tx else {
            return;
        };

        match tx.try_send(event) {
            Ok(true) => {}
            Ok(false) => tracing::debug!("status channel full, event dropped"),
            Err(e) => tracing::debug!("status channel closed: {}", e),
        }
    }
}
