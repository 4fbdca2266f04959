use std::sync::Arc;

use kanal::AsyncReceiver;
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use yaku_core::EndpointMonitor;
use yaku_types::StatusEvent;

use crate::events::status_loop;
use crate::io::{InputSource, input_loop};
use crate::state::AppState;

/// Application controller for task spawning and lifecycle
pub struct AppController {
    state: Arc<AppState>,
    status_rx: AsyncReceiver<StatusEvent>,
    cancel_token: CancellationToken,
}

impl AppController {
    pub fn new(state: Arc<AppState>, status_rx: AsyncReceiver<StatusEvent>) -> Self {
        Self {
            state,
            status_rx,
            cancel_token: CancellationToken::new(),
        }
    }

    /// Background tasks: status consumer and, when enabled, the endpoint monitor
    pub fn spawn_tasks(&self) -> JoinSet<anyhow::Result<()>> {
        let mut tasks = JoinSet::new();

        tasks.spawn(status_loop(
            self.status_rx.clone(),
            self.cancel_token.child_token(),
        ));

        if self.state.config.monitor.enabled {
            let monitor = EndpointMonitor::new(
                self.state.registry.clone(),
                &self.state.config.monitor,
                self.state.events.clone(),
            );
            let cancel = self.cancel_token.child_token();
            tasks.spawn(async move {
                monitor.run(cancel).await;
                Ok(())
            });
        } else {
            tracing::debug!("Endpoint monitor disabled");
        }

        tasks
    }

    pub fn spawn_input(&self, source: InputSource) -> JoinHandle<anyhow::Result<()>> {
        tokio::spawn(input_loop(
            self.state.clone(),
            source,
            self.cancel_token.child_token(),
        ))
    }

    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}
