use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{FuturesUnordered, StreamExt};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{info, warn};

use crate::config::Settings;
use crate::create::CreateInstanceRequest;
use crate::dashboard::{Dashboard, FleetEvent, Followup};
use crate::error::ValidationError;
use crate::gateway::{GatewayApi, WebhookConfig, WebhookSettings};
use crate::poller::{sweep_connection_states, Poller};

/// Upper bound on events folded in per `poll_events` call.
const MAX_EVENTS_PER_POLL: usize = 256;

/// Restart one instance, reporting start and outcome. Returns true on success.
async fn reset_one(gateway: &dyn GatewayApi, tx: &mpsc::UnboundedSender<FleetEvent>, name: String) -> bool {
    let _ = tx.send(FleetEvent::ResetStarted { name: name.clone() });
    let result = gateway.restart_instance(&name).await;
    let ok = result.is_ok();
    if let Err(ref e) = result {
        warn!(instance = %name, error = %e, "reset failed");
    }
    let _ = tx.send(FleetEvent::ResetFinished { name, result });
    ok
}

/// Drives the dashboard: issues gateway calls on the runtime and folds their
/// results back in from the UI thread.
pub struct FleetMonitor {
    gateway: Arc<dyn GatewayApi>,
    rt: Handle,
    pub dashboard: Dashboard,
    events_tx: mpsc::UnboundedSender<FleetEvent>,
    events_rx: mpsc::UnboundedReceiver<FleetEvent>,
    poller: Poller,
    names_tx: watch::Sender<Vec<String>>,
    poll_interval: Duration,
    scheduled_refresh: Option<Instant>,
}

impl FleetMonitor {
    pub fn new(gateway: Arc<dyn GatewayApi>, rt: Handle, settings: &Settings) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (names_tx, _) = watch::channel(Vec::new());
        Self {
            gateway,
            rt,
            dashboard: Dashboard::new(settings),
            events_tx,
            events_rx,
            poller: Poller::new(),
            names_tx,
            poll_interval: settings.poll_interval,
            scheduled_refresh: None,
        }
    }

    pub fn is_polling(&self) -> bool {
        self.poller.is_running()
    }

    /// Reload the instance list. A refresh issued later supersedes this one.
    pub fn refresh(&mut self) {
        self.scheduled_refresh = None;
        let generation = self.dashboard.begin_refresh();
        info!(generation, "refreshing instance list");
        let gateway = Arc::clone(&self.gateway);
        let tx = self.events_tx.clone();
        self.rt.spawn(async move {
            let result = gateway.list_instances().await;
            let _ = tx.send(FleetEvent::InstancesLoaded { generation, result });
        });
    }

    /// Drain pending results into the dashboard. Returns true if any arrived.
    pub fn poll_events(&mut self) -> bool {
        let mut changed = false;
        for _ in 0..MAX_EVENTS_PER_POLL {
            match self.events_rx.try_recv() {
                Ok(event) => {
                    self.handle_event(event, Instant::now());
                    changed = true;
                }
                Err(_) => break,
            }
        }
        changed
    }

    /// Wait for the next result and apply it. For callers running inside the
    /// runtime; the UI thread uses `poll_events`.
    pub async fn next_event(&mut self) -> bool {
        match self.events_rx.recv().await {
            Some(event) => {
                self.handle_event(event, Instant::now());
                true
            }
            None => false,
        }
    }

    /// Expire timed state and fire a due delayed refresh.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut changed = self.dashboard.tick(now);
        if self.scheduled_refresh.is_some_and(|at| now >= at) {
            self.refresh();
            changed = true;
        }
        changed
    }

    fn handle_event(&mut self, event: FleetEvent, now: Instant) {
        let followups = self.dashboard.apply(event, now);
        for followup in followups {
            self.run_followup(followup, now);
        }
    }

    fn run_followup(&mut self, followup: Followup, now: Instant) {
        match followup {
            Followup::Refresh => self.refresh(),
            Followup::RefreshAfter(delay) => {
                let at = now + delay;
                self.scheduled_refresh = Some(match self.scheduled_refresh {
                    Some(existing) => existing.min(at),
                    None => at,
                });
            }
            Followup::SweepConnectionStates => self.sweep_connection_states(),
            Followup::FetchWebhooks => self.fetch_webhooks(),
            Followup::SyncPoller => self.sync_poller(),
        }
    }

    fn sync_poller(&mut self) {
        let names = self.dashboard.registry.names();
        let empty = names.is_empty();
        self.names_tx.send_replace(names);
        if empty {
            self.poller.stop();
        } else {
            self.poller.ensure_running(
                &self.rt,
                Arc::clone(&self.gateway),
                self.names_tx.subscribe(),
                self.events_tx.clone(),
                self.poll_interval,
            );
        }
    }

    /// One-shot connection-state query for every registered instance.
    pub fn sweep_connection_states(&self) {
        let names = self.dashboard.registry.names();
        if names.is_empty() {
            return;
        }
        let gateway = Arc::clone(&self.gateway);
        let tx = self.events_tx.clone();
        self.rt.spawn(async move {
            sweep_connection_states(gateway.as_ref(), &tx, names).await;
        });
    }

    fn fetch_webhooks(&self) {
        let names = self.dashboard.registry.names();
        let gateway = Arc::clone(&self.gateway);
        let tx = self.events_tx.clone();
        self.rt.spawn(async move {
            let gateway = gateway.as_ref();
            let mut pending: FuturesUnordered<_> = names
                .into_iter()
                .map(|name| async move {
                    let result = gateway.find_webhook(&name).await;
                    (name, result)
                })
                .collect();
            while let Some((name, result)) = pending.next().await {
                let config = result.unwrap_or_else(|e| {
                    warn!(instance = %name, error = %e, "webhook lookup failed");
                    WebhookConfig::default()
                });
                if tx.send(FleetEvent::WebhookLoaded { name, config }).is_err() {
                    return;
                }
            }
        });
    }

    pub fn reset_instance(&mut self, name: &str) {
        if !self.dashboard.registry.contains(name) {
            return;
        }
        info!(instance = %name, "resetting instance");
        let gateway = Arc::clone(&self.gateway);
        let tx = self.events_tx.clone();
        let name = name.to_string();
        self.rt.spawn(async move {
            reset_one(gateway.as_ref(), &tx, name).await;
        });
    }

    /// Restart every selected instance one after another, then report a tally.
    pub fn bulk_reset(&mut self) {
        let Some(targets) = self.dashboard.begin_bulk() else { return };
        info!(count = targets.len(), "bulk reset");
        self.dashboard
            .announce(format!("Resetting {} instance(s)...", targets.len()), Instant::now());

        let gateway = Arc::clone(&self.gateway);
        let tx = self.events_tx.clone();
        self.rt.spawn(async move {
            let (mut succeeded, mut failed) = (0, 0);
            for name in targets {
                if reset_one(gateway.as_ref(), &tx, name).await {
                    succeeded += 1;
                } else {
                    failed += 1;
                }
            }
            let _ = tx.send(FleetEvent::BulkResetFinished { succeeded, failed });
        });
    }

    pub fn open_bulk_delete(&mut self) -> bool {
        self.dashboard.open_delete_confirmation()
    }

    pub fn cancel_bulk_delete(&mut self) {
        self.dashboard.delete_confirmation.close();
    }

    /// Delete the selection if the typed phrase matches. A mismatch issues no calls.
    pub fn confirm_bulk_delete(&mut self) -> Result<(), ValidationError> {
        let targets = self.dashboard.confirm_bulk_deletion()?;
        info!(count = targets.len(), "bulk delete");
        self.dashboard
            .announce(format!("Deleting {} instance(s)...", targets.len()), Instant::now());

        let gateway = Arc::clone(&self.gateway);
        let tx = self.events_tx.clone();
        self.rt.spawn(async move {
            let mut deleted = Vec::new();
            let mut failed = Vec::new();
            for name in targets {
                match gateway.delete_instance(&name).await {
                    Ok(()) => deleted.push(name),
                    Err(e) => {
                        warn!(instance = %name, error = %e, "delete failed");
                        failed.push((name, e));
                    }
                }
            }
            let _ = tx.send(FleetEvent::BulkDeleteFinished { deleted, failed });
        });
        Ok(())
    }

    pub fn delete_instance(&mut self, name: &str) {
        if !self.dashboard.registry.contains(name) {
            return;
        }
        info!(instance = %name, "deleting instance");
        let gateway = Arc::clone(&self.gateway);
        let tx = self.events_tx.clone();
        let name = name.to_string();
        self.rt.spawn(async move {
            let result = gateway.delete_instance(&name).await;
            let _ = tx.send(FleetEvent::InstanceDeleted { name, result });
        });
    }

    pub fn begin_webhook_edit(&mut self, name: &str) {
        self.dashboard.begin_webhook_edit(name);
    }

    pub fn cancel_webhook_edit(&mut self) {
        self.dashboard.webhook_editor.cancel();
    }

    /// Validate and send the draft. `None` when no edit is open.
    pub fn save_webhook(&mut self) -> Option<Result<(), ValidationError>> {
        let save = match self.dashboard.webhook_editor.prepare_save()? {
            Ok(save) => save,
            Err(e) => return Some(Err(e)),
        };
        info!(instance = %save.instance, "saving webhook");
        let gateway = Arc::clone(&self.gateway);
        let tx = self.events_tx.clone();
        self.rt.spawn(async move {
            let settings = WebhookSettings::new(save.url.clone(), true);
            let result = gateway.set_webhook(&save.instance, &settings).await;
            let _ = tx.send(FleetEvent::WebhookSaved {
                name: save.instance,
                url: save.url,
                result,
            });
        });
        Some(Ok(()))
    }

    /// Flip the enabled flag, keeping the configured URL.
    pub fn toggle_webhook(&mut self, name: &str) {
        let Some(settings) = self.dashboard.toggle_request(name) else { return };
        let gateway = Arc::clone(&self.gateway);
        let tx = self.events_tx.clone();
        let name = name.to_string();
        self.rt.spawn(async move {
            let result = gateway.set_webhook(&name, &settings).await;
            let _ = tx.send(FleetEvent::WebhookToggled { name, enabled: settings.enabled, result });
        });
    }

    pub fn remove_webhook(&mut self, name: &str) {
        if !self.dashboard.registry.contains(name) {
            return;
        }
        let gateway = Arc::clone(&self.gateway);
        let tx = self.events_tx.clone();
        let name = name.to_string();
        self.rt.spawn(async move {
            let result = gateway.set_webhook(&name, &WebhookSettings::new("", false)).await;
            let _ = tx.send(FleetEvent::WebhookRemoved { name, result });
        });
    }

    pub fn open_qr(&mut self, name: &str) {
        if !self.dashboard.registry.contains(name) {
            return;
        }
        self.dashboard.qr_view.open(name);
        let gateway = Arc::clone(&self.gateway);
        let tx = self.events_tx.clone();
        let name = name.to_string();
        self.rt.spawn(async move {
            let result = gateway.fetch_qr(&name).await;
            let _ = tx.send(FleetEvent::QrLoaded { name, result });
        });
    }

    pub fn close_qr(&mut self) {
        self.dashboard.qr_view.close();
    }

    /// Create every instance in the request, one call per name, then refresh.
    pub fn create_instances(&mut self, request: &CreateInstanceRequest) -> Result<(), ValidationError> {
        request.validate()?;
        let payloads = request.payloads();
        info!(count = payloads.len(), "creating instances");
        let gateway = Arc::clone(&self.gateway);
        let tx = self.events_tx.clone();
        self.rt.spawn(async move {
            let mut created = Vec::new();
            let mut failed = Vec::new();
            for payload in payloads {
                match gateway.create_instance(&payload).await {
                    Ok(()) => created.push(payload.instance_name),
                    Err(e) => {
                        warn!(instance = %payload.instance_name, error = %e, "create failed");
                        failed.push((payload.instance_name, e));
                    }
                }
            }
            let _ = tx.send(FleetEvent::InstancesCreated { created, failed });
        });
        Ok(())
    }

    pub fn shutdown(&mut self) {
        self.poller.stop();
    }
}
