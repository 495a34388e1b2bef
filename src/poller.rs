//! Periodic connection-state polling for every registered instance.

use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{FuturesUnordered, StreamExt};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::dashboard::FleetEvent;
use crate::gateway::GatewayApi;
use crate::model::ConnectionState;

/// Query the connection state of each name concurrently. A failed query is
/// reported as `ConnectionState::Error` for that name only.
pub async fn sweep_connection_states(
    gateway: &dyn GatewayApi,
    tx: &mpsc::UnboundedSender<FleetEvent>,
    names: Vec<String>,
) {
    let mut pending: FuturesUnordered<_> = names
        .into_iter()
        .map(|name| async move {
            let result = gateway.connection_state(&name).await;
            (name, result)
        })
        .collect();

    while let Some((name, result)) = pending.next().await {
        let state = match result {
            Ok(state) => state,
            Err(e) => {
                warn!(instance = %name, error = %e, "connection state query failed");
                ConnectionState::Error
            }
        };
        if tx.send(FleetEvent::ConnectionState { name, state }).is_err() {
            return; // dashboard gone
        }
    }
}

/// Owns the single background polling task.
///
/// The task reads the current name set from a watch channel on every tick, so
/// membership changes take effect without a restart.
#[derive(Default)]
pub struct Poller {
    handle: Option<JoinHandle<()>>,
}

impl Poller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Start the polling task unless one is already running.
    pub fn ensure_running(
        &mut self,
        rt: &Handle,
        gateway: Arc<dyn GatewayApi>,
        names: watch::Receiver<Vec<String>>,
        tx: mpsc::UnboundedSender<FleetEvent>,
        period: Duration,
    ) {
        if self.is_running() {
            return;
        }
        debug!(?period, "starting poller");
        self.handle = Some(rt.spawn(poll_loop(gateway, names, tx, period)));
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            debug!("stopping poller");
            handle.abort();
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn poll_loop(
    gateway: Arc<dyn GatewayApi>,
    names: watch::Receiver<Vec<String>>,
    tx: mpsc::UnboundedSender<FleetEvent>,
    period: Duration,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick completes immediately; loads already run their own sweep.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        if tx.is_closed() {
            break;
        }
        let targets = names.borrow().clone();
        if targets.is_empty() {
            continue;
        }
        debug!(count = targets.len(), "polling connection states");
        sweep_connection_states(gateway.as_ref(), &tx, targets).await;
    }
}
