//! The dashboard aggregate: registry, selection, notifications and editor state,
//! mutated only through the transforms below.
//!
//! Async work never touches this struct directly. Each remote call reports back a
//! [`FleetEvent`], and [`Dashboard::apply`] folds it in and returns the follow-up
//! work (refreshes, sweeps) for the controller to schedule.

use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::error::{GatewayError, ValidationError};
use crate::gateway::{QrCode, WebhookConfig, WebhookSettings};
use crate::model::{ConnectionState, Instance, ResetState, Severity, StateFilter, TimedMessage};
use crate::modals::{DeleteConfirmation, QrView};
use crate::notifications::NotificationQueue;
use crate::registry::{DerivedPatch, Registry};
use crate::selection::Selection;
use crate::webhook_editor::WebhookEditor;

/// Result of one remote call, delivered to the event loop.
#[derive(Clone, Debug)]
pub enum FleetEvent {
    InstancesLoaded {
        generation: u64,
        result: Result<Vec<Instance>, GatewayError>,
    },
    ConnectionState {
        name: String,
        state: ConnectionState,
    },
    WebhookLoaded {
        name: String,
        config: WebhookConfig,
    },
    QrLoaded {
        name: String,
        result: Result<QrCode, GatewayError>,
    },
    ResetStarted {
        name: String,
    },
    ResetFinished {
        name: String,
        result: Result<(), GatewayError>,
    },
    BulkResetFinished {
        succeeded: usize,
        failed: usize,
    },
    InstanceDeleted {
        name: String,
        result: Result<(), GatewayError>,
    },
    BulkDeleteFinished {
        deleted: Vec<String>,
        failed: Vec<(String, GatewayError)>,
    },
    WebhookSaved {
        name: String,
        url: String,
        result: Result<(), GatewayError>,
    },
    WebhookToggled {
        name: String,
        enabled: bool,
        result: Result<(), GatewayError>,
    },
    WebhookRemoved {
        name: String,
        result: Result<(), GatewayError>,
    },
    InstancesCreated {
        created: Vec<String>,
        failed: Vec<(String, GatewayError)>,
    },
}

/// Work the controller must start after an event has been applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Followup {
    Refresh,
    RefreshAfter(Duration),
    SweepConnectionStates,
    FetchWebhooks,
    SyncPoller,
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

pub struct Dashboard {
    pub registry: Registry,
    pub search_query: String,
    pub selection: Selection,
    pub notifications: NotificationQueue,
    pub webhook_editor: WebhookEditor,
    pub qr_view: QrView,
    pub delete_confirmation: DeleteConfirmation,
    pub status_message: Option<TimedMessage>,
    pub is_loading: bool,
    pub load_error: Option<String>,
    pub last_refreshed: Option<DateTime<Local>>,
    pub bulk_action_in_progress: bool,
    refresh_generation: u64,
    reset_revert: Duration,
    message_ttl: Duration,
    reconcile_delay: Duration,
}

impl Dashboard {
    pub fn new(settings: &Settings) -> Self {
        Self {
            registry: Registry::new(),
            search_query: String::new(),
            selection: Selection::new(),
            notifications: NotificationQueue::new(settings.notification_ttl),
            webhook_editor: WebhookEditor::default(),
            qr_view: QrView::default(),
            delete_confirmation: DeleteConfirmation::default(),
            status_message: None,
            is_loading: false,
            load_error: None,
            last_refreshed: None,
            bulk_action_in_progress: false,
            refresh_generation: 0,
            reset_revert: settings.reset_revert,
            message_ttl: settings.message_ttl,
            reconcile_delay: settings.reconcile_delay,
        }
    }

    /// Instances matching the current search query, in registry order.
    pub fn filtered(&self) -> Vec<&Instance> {
        self.registry.filtered(&self.search_query)
    }

    pub fn set_search_query(&mut self, query: &str) {
        self.search_query = query.to_string();
    }

    pub fn refresh_generation(&self) -> u64 {
        self.refresh_generation
    }

    /// Mark a list refresh as issued. Only the result tagged with the returned
    /// generation will be applied; earlier in-flight results are superseded.
    pub fn begin_refresh(&mut self) -> u64 {
        self.refresh_generation += 1;
        self.is_loading = true;
        self.refresh_generation
    }

    pub fn click(&mut self, name: &str, modifier: bool) {
        if self.registry.contains(name) {
            self.selection.click(name, modifier);
        }
    }

    pub fn select_by_state(&mut self, filter: StateFilter) {
        let filtered = self.registry.filtered(&self.search_query);
        self.selection.select_by_state(&filtered, &self.registry, filter);
    }

    /// Claim the bulk slot and snapshot the selection. `None` (with a status
    /// message) when nothing is selected or another bulk action is running.
    pub fn begin_bulk(&mut self) -> Option<Vec<String>> {
        if self.selection.is_empty() {
            self.status_message = Some(TimedMessage::sticky(ValidationError::EmptySelection.to_string()));
            return None;
        }
        if self.bulk_action_in_progress {
            self.status_message = Some(TimedMessage::sticky(ValidationError::BulkActionInProgress.to_string()));
            return None;
        }
        self.bulk_action_in_progress = true;
        self.status_message = None;
        Some(self.selection.names().to_vec())
    }

    pub fn open_delete_confirmation(&mut self) -> bool {
        if self.selection.is_empty() || self.bulk_action_in_progress {
            return false;
        }
        self.delete_confirmation.open();
        true
    }

    /// Check the typed phrase. On a match the confirmation closes and the bulk
    /// slot is claimed; on a mismatch nothing else changes.
    pub fn confirm_bulk_deletion(&mut self) -> Result<Vec<String>, ValidationError> {
        if self.selection.is_empty() {
            return Err(ValidationError::EmptySelection);
        }
        if self.bulk_action_in_progress {
            return Err(ValidationError::BulkActionInProgress);
        }
        self.delete_confirmation.check(self.selection.len())?;
        self.delete_confirmation.close();
        self.begin_bulk().ok_or(ValidationError::BulkActionInProgress)
    }

    /// Settings that flip the enabled flag of `name`, keeping its URL.
    pub fn toggle_request(&self, name: &str) -> Option<WebhookSettings> {
        if !self.registry.contains(name) {
            return None;
        }
        Some(WebhookSettings::new(
            self.registry.webhook_url(name),
            !self.registry.webhook_enabled(name),
        ))
    }

    pub fn begin_webhook_edit(&mut self, name: &str) {
        if self.registry.contains(name) {
            let current = self.registry.webhook_url(name).to_string();
            self.webhook_editor.begin(name, &current);
        }
    }

    /// Progress of a long-running action: status line plus an info notification.
    pub fn announce(&mut self, message: impl Into<String>, now: Instant) {
        let message = message.into();
        self.status_message = Some(TimedMessage::sticky(message.clone()));
        self.notify(message, Severity::Info, now);
    }

    fn notify(&mut self, message: impl Into<String>, severity: Severity, now: Instant) {
        self.notifications.push(message, severity, now);
    }

    /// Fold one event into the aggregate.
    pub fn apply(&mut self, event: FleetEvent, now: Instant) -> Vec<Followup> {
        match event {
            FleetEvent::InstancesLoaded { generation, result } => {
                if generation != self.refresh_generation {
                    debug!(generation, current = self.refresh_generation, "stale refresh superseded");
                    return Vec::new();
                }
                self.is_loading = false;
                match result {
                    Ok(instances) => {
                        info!(count = instances.len(), "instances loaded");
                        self.registry.replace(instances);
                        self.load_error = None;
                        self.last_refreshed = Some(Local::now());
                    }
                    Err(e) => {
                        warn!(error = %e, "instance list failed");
                        self.registry.replace(Vec::new());
                        self.load_error = Some(e.message());
                    }
                }
                self.drop_unregistered_targets();
                let mut followups = vec![Followup::SyncPoller];
                if !self.registry.is_empty() {
                    followups.push(Followup::FetchWebhooks);
                    followups.push(Followup::SweepConnectionStates);
                }
                followups
            }

            FleetEvent::ConnectionState { name, state } => {
                self.registry.update_derived(&name, DerivedPatch::connection(state));
                Vec::new()
            }

            FleetEvent::WebhookLoaded { name, config } => {
                self.registry
                    .update_derived(&name, DerivedPatch::webhook(config.url, config.enabled));
                Vec::new()
            }

            FleetEvent::QrLoaded { name, result } => {
                self.qr_view.resolve(&name, result.map_err(|e| e.message()));
                Vec::new()
            }

            FleetEvent::ResetStarted { name } => {
                self.registry
                    .update_derived(&name, DerivedPatch::reset(ResetState::Loading, None));
                Vec::new()
            }

            FleetEvent::ResetFinished { name, result } => {
                let revert_at = Some(now + self.reset_revert);
                match result {
                    Ok(()) => {
                        self.registry
                            .update_derived(&name, DerivedPatch::reset(ResetState::Success, revert_at));
                        self.notify(format!("Instance {} reset successfully.", name), Severity::Success, now);
                        vec![Followup::SweepConnectionStates]
                    }
                    Err(e) => {
                        self.registry
                            .update_derived(&name, DerivedPatch::reset(ResetState::Error, revert_at));
                        self.status_message = Some(TimedMessage::until(
                            format!("Error resetting {}: {}", name, e),
                            now + self.message_ttl,
                        ));
                        Vec::new()
                    }
                }
            }

            FleetEvent::BulkResetFinished { succeeded, failed } => {
                info!(succeeded, failed, "bulk reset finished");
                self.bulk_action_in_progress = false;
                self.status_message = Some(TimedMessage::sticky(format!(
                    "Reset complete: {} successful, {} failed",
                    succeeded, failed
                )));
                self.selection.clear();
                vec![Followup::Refresh]
            }

            FleetEvent::InstanceDeleted { name, result } => match result {
                Ok(()) => {
                    self.registry.remove(std::slice::from_ref(&name));
                    self.drop_unregistered_targets();
                    self.notify(format!("Instance {} deleted successfully.", name), Severity::Success, now);
                    vec![Followup::SyncPoller, Followup::RefreshAfter(self.reconcile_delay)]
                }
                Err(e) => {
                    self.notify(
                        format!("Failed to delete instance {}: {}", name, e),
                        Severity::Error,
                        now,
                    );
                    Vec::new()
                }
            },

            FleetEvent::BulkDeleteFinished { deleted, failed } => {
                info!(deleted = deleted.len(), failed = failed.len(), "bulk delete finished");
                self.bulk_action_in_progress = false;
                self.registry.remove(&deleted);
                self.selection.clear();
                self.drop_unregistered_targets();
                self.status_message = Some(TimedMessage::sticky(format!(
                    "Delete complete: {} successful, {} failed",
                    deleted.len(),
                    failed.len()
                )));
                if !deleted.is_empty() {
                    self.notify(
                        format!("{} instance{} deleted successfully.", deleted.len(), plural(deleted.len())),
                        Severity::Success,
                        now,
                    );
                }
                if !failed.is_empty() {
                    self.notify(
                        format!("Failed to delete {} instance{}.", failed.len(), plural(failed.len())),
                        Severity::Error,
                        now,
                    );
                }
                vec![Followup::SyncPoller, Followup::RefreshAfter(self.reconcile_delay)]
            }

            FleetEvent::WebhookSaved { name, url, result } => {
                match result {
                    Ok(()) => {
                        self.registry.update_derived(&name, DerivedPatch::webhook(url, true));
                        self.webhook_editor.save_confirmed(
                            &name,
                            TimedMessage::until(
                                format!("Webhook for {} updated successfully!", name),
                                now + self.message_ttl,
                            ),
                        );
                    }
                    Err(e) => {
                        self.webhook_editor
                            .save_failed(&name, format!("Failed to update webhook: {}", e));
                    }
                }
                Vec::new()
            }

            FleetEvent::WebhookToggled { name, enabled, result } => {
                let verb = if enabled { "enabled" } else { "disabled" };
                match result {
                    Ok(()) => {
                        self.registry.update_derived(&name, DerivedPatch::webhook_enabled(enabled));
                        self.notify(
                            format!("Webhook for {} {} successfully!", name, verb),
                            Severity::Success,
                            now,
                        );
                    }
                    Err(e) => {
                        let action = if enabled { "enabling" } else { "disabling" };
                        self.status_message = Some(TimedMessage::until(
                            format!("Error {} webhook: {}", action, e),
                            now + self.message_ttl,
                        ));
                    }
                }
                Vec::new()
            }

            FleetEvent::WebhookRemoved { name, result } => {
                match result {
                    Ok(()) => {
                        self.registry.update_derived(&name, DerivedPatch::webhook("", false));
                        self.webhook_editor.success = Some(TimedMessage::until(
                            format!("Webhook for {} removed successfully!", name),
                            now + self.message_ttl,
                        ));
                    }
                    Err(e) => {
                        self.webhook_editor.error = Some(format!("Failed to remove webhook: {}", e));
                    }
                }
                Vec::new()
            }

            FleetEvent::InstancesCreated { created, failed } => {
                if !created.is_empty() {
                    self.notify(
                        format!("Created {} instance{}: {}", created.len(), plural(created.len()), created.join(", ")),
                        Severity::Success,
                        now,
                    );
                }
                for (name, e) in &failed {
                    self.notify(format!("Failed to create {}: {}", name, e), Severity::Error, now);
                }
                vec![Followup::Refresh]
            }
        }
    }

    /// Close overlays and selections that point at instances no longer registered.
    fn drop_unregistered_targets(&mut self) {
        self.selection.retain_registered(&self.registry);
        let registry = &self.registry;
        if self.webhook_editor.editing_instance().is_some_and(|n| !registry.contains(n)) {
            self.webhook_editor.cancel();
        }
        if self.qr_view.instance().is_some_and(|n| !registry.contains(n)) {
            self.qr_view.close();
        }
    }

    /// Expire every timed piece of state. Returns true if anything changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut changed = self.notifications.expire(now);
        changed |= self.registry.expire_resets(now);
        changed |= self.webhook_editor.expire(now);
        if self.status_message.as_ref().is_some_and(|m| m.is_expired(now)) {
            self.status_message = None;
            changed = true;
        }
        changed
    }
}
