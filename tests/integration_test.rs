//! End-to-end tests of the fleet controller against an in-memory gateway.
//! Each test drives the same operations the key bindings call and checks the
//! dashboard after the async results have been applied.

mod common;

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::time::Instant;

use common::{settle, MockGateway};
use fleetdash::config::Settings;
use fleetdash::create::CreateInstanceRequest;
use fleetdash::error::ValidationError;
use fleetdash::fleet_controller::FleetMonitor;
use fleetdash::model::{ConnectionState, ResetState, Severity, StateFilter};
use fleetdash::modals::QrView;
use fleetdash::webhook_editor::EditorMode;

async fn loaded(gw: &Arc<MockGateway>) -> FleetMonitor {
    let mut monitor = FleetMonitor::new(gw.clone(), Handle::current(), &Settings::default());
    monitor.refresh();
    settle(&mut monitor).await;
    monitor
}

fn select_all(monitor: &mut FleetMonitor) {
    for name in monitor.dashboard.registry.names() {
        monitor.dashboard.click(&name, true);
    }
}

fn status(monitor: &FleetMonitor) -> Option<&str> {
    monitor.dashboard.status_message.as_ref().map(|m| m.text.as_str())
}

fn notification_texts(monitor: &FleetMonitor) -> Vec<String> {
    monitor.dashboard.notifications.iter().map(|n| n.message.clone()).collect()
}

#[tokio::test]
async fn refresh_loads_instances_states_and_webhooks() {
    let gw = Arc::new(MockGateway::with_instances(&["alpha", "beta"]));
    gw.set_state("alpha", ConnectionState::Connected);
    gw.fail("state", "beta");
    gw.set_webhook_config("alpha", "https://hooks.test/a", true);

    let monitor = loaded(&gw).await;
    let registry = &monitor.dashboard.registry;

    assert_eq!(registry.names(), vec!["alpha", "beta"]);
    assert_eq!(registry.connection_state("alpha"), Some(ConnectionState::Connected));
    assert_eq!(registry.connection_state("beta"), Some(ConnectionState::Error));
    assert_eq!(registry.webhook_url("alpha"), "https://hooks.test/a");
    assert!(registry.webhook_enabled("alpha"));
    assert_eq!(registry.webhook_url("beta"), "");
    assert!(registry.derived_keys_consistent());
    assert!(monitor.is_polling());
    assert!(!monitor.dashboard.is_loading);
}

#[tokio::test]
async fn bulk_delete_with_partial_failure() {
    let gw = Arc::new(MockGateway::with_instances(&["a", "b", "c"]));
    gw.fail("delete", "b");
    let mut monitor = loaded(&gw).await;
    select_all(&mut monitor);

    assert!(monitor.open_bulk_delete());
    monitor.dashboard.delete_confirmation.text = "I want to delete 3 instances".into();
    monitor.confirm_bulk_delete().expect("phrase matches");
    let progress = monitor.dashboard.notifications.latest().expect("progress notification");
    assert_eq!(progress.message, "Deleting 3 instance(s)...");
    assert_eq!(progress.severity, Severity::Info);
    settle(&mut monitor).await;

    assert_eq!(gw.calls_for("delete"), vec!["a", "b", "c"]);
    assert_eq!(monitor.dashboard.registry.names(), vec!["b"]);
    assert!(monitor.dashboard.selection.is_empty());
    assert!(!monitor.dashboard.bulk_action_in_progress);
    assert_eq!(status(&monitor), Some("Delete complete: 2 successful, 1 failed"));

    let texts = notification_texts(&monitor);
    assert!(texts.contains(&"2 instances deleted successfully.".to_string()));
    assert!(texts.contains(&"Failed to delete 1 instance.".to_string()));

    // The reconciling refresh fires after its delay and agrees with the local view.
    let lists_before = gw.calls("list");
    monitor.tick(Instant::now() + Duration::from_millis(600));
    settle(&mut monitor).await;
    assert_eq!(gw.calls("list"), lists_before + 1);
    assert_eq!(monitor.dashboard.registry.names(), vec!["b"]);
}

#[tokio::test]
async fn wrong_phrase_issues_no_delete_calls() {
    let gw = Arc::new(MockGateway::with_instances(&["a", "b"]));
    let mut monitor = loaded(&gw).await;
    select_all(&mut monitor);

    assert!(monitor.open_bulk_delete());
    monitor.dashboard.delete_confirmation.text = "i want to delete 3 instances".into();
    let err = monitor.confirm_bulk_delete().unwrap_err();
    assert_eq!(
        err,
        ValidationError::ConfirmationMismatch { expected: "i want to delete 2 instances".into() }
    );
    settle(&mut monitor).await;

    assert_eq!(gw.calls("delete"), 0);
    assert_eq!(monitor.dashboard.registry.len(), 2);
    assert_eq!(monitor.dashboard.selection.len(), 2);
    assert!(monitor.dashboard.delete_confirmation.open);
}

#[tokio::test]
async fn webhook_save_validates_before_sending() {
    let gw = Arc::new(MockGateway::with_instances(&["a"]));
    let mut monitor = loaded(&gw).await;

    monitor.begin_webhook_edit("a");
    monitor.dashboard.webhook_editor.set_draft("not-a-url");
    assert_eq!(monitor.save_webhook(), Some(Err(ValidationError::InvalidWebhookUrl)));
    settle(&mut monitor).await;
    assert_eq!(gw.calls("set_webhook"), 0);
    assert!(monitor.dashboard.webhook_editor.is_editing());

    monitor.dashboard.webhook_editor.set_draft("https://x.test/hook");
    assert_eq!(monitor.save_webhook(), Some(Ok(())));
    settle(&mut monitor).await;

    let writes = gw.webhook_writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].0, "a");
    assert_eq!(writes[0].1.url, "https://x.test/hook");
    assert!(writes[0].1.enabled);
    assert_eq!(writes[0].1.events, vec!["MESSAGES_UPSERT"]);

    assert_eq!(monitor.dashboard.registry.webhook_url("a"), "https://x.test/hook");
    assert!(monitor.dashboard.registry.webhook_enabled("a"));
    assert_eq!(monitor.dashboard.webhook_editor.mode, EditorMode::Viewing);
    assert!(monitor.dashboard.webhook_editor.success.is_some());
}

#[tokio::test]
async fn failed_webhook_save_stays_in_editing() {
    let gw = Arc::new(MockGateway::with_instances(&["a"]));
    gw.fail("set_webhook", "a");
    let mut monitor = loaded(&gw).await;

    monitor.begin_webhook_edit("a");
    monitor.dashboard.webhook_editor.set_draft("https://x.test/hook");
    monitor.save_webhook();
    settle(&mut monitor).await;

    let editor = &monitor.dashboard.webhook_editor;
    assert_eq!(editor.editing_instance(), Some("a"));
    assert!(!editor.is_saving());
    assert!(editor.error.as_deref().is_some_and(|e| e.starts_with("Failed to update webhook")));
    assert_eq!(monitor.dashboard.registry.webhook_url("a"), "");
}

#[tokio::test]
async fn toggle_and_remove_webhook() {
    let gw = Arc::new(MockGateway::with_instances(&["a"]));
    gw.set_webhook_config("a", "https://x.test/hook", true);
    let mut monitor = loaded(&gw).await;

    monitor.toggle_webhook("a");
    settle(&mut monitor).await;
    assert_eq!(monitor.dashboard.registry.webhook_url("a"), "https://x.test/hook");
    assert!(!monitor.dashboard.registry.webhook_enabled("a"));
    assert_eq!(gw.webhook_writes()[0].1.url, "https://x.test/hook");

    monitor.remove_webhook("a");
    settle(&mut monitor).await;
    assert_eq!(monitor.dashboard.registry.webhook_url("a"), "");
    assert!(!monitor.dashboard.registry.webhook_enabled("a"));
}

#[tokio::test]
async fn bulk_reset_reports_tally_and_indicators() {
    let gw = Arc::new(MockGateway::with_instances(&["a", "b"]));
    gw.fail("restart", "b");
    let mut monitor = loaded(&gw).await;
    select_all(&mut monitor);

    monitor.bulk_reset();
    assert_eq!(status(&monitor), Some("Resetting 2 instance(s)..."));
    assert_eq!(notification_texts(&monitor), vec!["Resetting 2 instance(s)..."]);
    assert!(!monitor.open_bulk_delete(), "second bulk action must wait");
    settle(&mut monitor).await;

    assert_eq!(gw.calls_for("restart"), vec!["a", "b"]);
    assert_eq!(status(&monitor), Some("Reset complete: 1 successful, 1 failed"));
    assert!(monitor.dashboard.selection.is_empty());
    assert!(!monitor.dashboard.bulk_action_in_progress);
    assert_eq!(monitor.dashboard.registry.reset_state("a"), ResetState::Success);
    assert_eq!(monitor.dashboard.registry.reset_state("b"), ResetState::Error);

    // Indicators fall back to idle after the revert delay.
    monitor.tick(Instant::now() + Duration::from_secs(4));
    assert_eq!(monitor.dashboard.registry.reset_state("a"), ResetState::Idle);
    assert!(monitor.dashboard.registry.reset_states().is_empty());
}

#[tokio::test]
async fn single_reset_triggers_state_sweep_and_notification() {
    let gw = Arc::new(MockGateway::with_instances(&["a"]));
    let mut monitor = loaded(&gw).await;
    let sweeps_before = gw.calls("state");

    monitor.reset_instance("a");
    settle(&mut monitor).await;

    assert_eq!(gw.calls("restart"), 1);
    assert_eq!(gw.calls("state"), sweeps_before + 1);
    assert_eq!(notification_texts(&monitor), vec!["Instance a reset successfully."]);

    monitor.tick(Instant::now() + Duration::from_secs(3));
    assert!(monitor.dashboard.notifications.is_empty());
}

#[tokio::test]
async fn deleting_last_instance_stops_polling() {
    let gw = Arc::new(MockGateway::with_instances(&["only"]));
    let mut monitor = loaded(&gw).await;
    assert!(monitor.is_polling());

    monitor.delete_instance("only");
    settle(&mut monitor).await;

    assert!(monitor.dashboard.registry.is_empty());
    assert!(!monitor.is_polling());
    assert!(monitor.dashboard.registry.derived_keys_consistent());
}

#[tokio::test]
async fn select_by_state_uses_fetched_states() {
    let gw = Arc::new(MockGateway::with_instances(&["a", "b", "c"]));
    gw.set_state("a", ConnectionState::Connected);
    gw.set_state("b", ConnectionState::Disconnected);
    let mut monitor = loaded(&gw).await;

    monitor.dashboard.select_by_state(StateFilter::Connected);
    assert_eq!(monitor.dashboard.selection.names(), ["a"]);

    monitor.dashboard.select_by_state(StateFilter::UnknownOrDisconnected);
    assert_eq!(monitor.dashboard.selection.names(), ["b", "c"]);
}

#[tokio::test]
async fn qr_view_shows_code_or_error() {
    let gw = Arc::new(MockGateway::with_instances(&["a", "b"]));
    gw.fail("qr", "b");
    let mut monitor = loaded(&gw).await;

    monitor.open_qr("a");
    assert_eq!(monitor.dashboard.qr_view, QrView::Loading("a".into()));
    settle(&mut monitor).await;
    assert!(matches!(
        &monitor.dashboard.qr_view,
        QrView::Ready(name, qr) if name == "a" && qr.payload == "2@a"
    ));

    monitor.open_qr("b");
    settle(&mut monitor).await;
    assert!(matches!(&monitor.dashboard.qr_view, QrView::Failed(name, _) if name == "b"));
}

#[tokio::test]
async fn create_instances_then_refresh() {
    let gw = Arc::new(MockGateway::with_instances(&["a"]));
    let mut monitor = loaded(&gw).await;

    let bad = CreateInstanceRequest::from_names("x, x");
    assert_eq!(
        monitor.create_instances(&bad),
        Err(ValidationError::DuplicateInstanceName("x".into()))
    );

    monitor
        .create_instances(&CreateInstanceRequest::from_names("x, y"))
        .expect("valid request");
    settle(&mut monitor).await;

    assert_eq!(gw.calls_for("create"), vec!["x", "y"]);
    assert_eq!(monitor.dashboard.registry.names(), vec!["a", "x", "y"]);
}

#[tokio::test(start_paused = true)]
async fn poller_isolates_failures_per_instance() {
    let gw = Arc::new(MockGateway::with_instances(&["a", "b"]));
    let mut monitor = loaded(&gw).await;
    assert_eq!(gw.calls("state"), 2);

    gw.set_state("a", ConnectionState::Connecting);
    gw.fail("state", "b");
    tokio::time::sleep(Duration::from_secs(30)).await;
    settle(&mut monitor).await;

    assert_eq!(gw.calls("state"), 4);
    assert_eq!(monitor.dashboard.registry.connection_state("a"), Some(ConnectionState::Connecting));
    assert_eq!(monitor.dashboard.registry.connection_state("b"), Some(ConnectionState::Error));
}
