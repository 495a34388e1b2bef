//! In-memory `GatewayApi` for integration tests.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use fleetdash::create::CreateInstancePayload;
use fleetdash::error::GatewayError;
use fleetdash::fleet_controller::FleetMonitor;
use fleetdash::gateway::{GatewayApi, QrCode, WebhookConfig, WebhookSettings};
use fleetdash::model::{ConnectionState, Instance};

#[derive(Default)]
pub struct MockGateway {
    instances: Mutex<Vec<Instance>>,
    states: Mutex<HashMap<String, ConnectionState>>,
    webhooks: Mutex<HashMap<String, WebhookConfig>>,
    failing: Mutex<HashSet<(String, String)>>, // (operation, instance)
    calls: Mutex<Vec<(String, String)>>,
    webhook_writes: Mutex<Vec<(String, WebhookSettings)>>,
}

impl MockGateway {
    pub fn with_instances(names: &[&str]) -> Self {
        let gw = Self::default();
        *gw.instances.lock().unwrap() = names.iter().map(|n| Instance::new(*n)).collect();
        gw
    }

    pub fn set_state(&self, name: &str, state: ConnectionState) {
        self.states.lock().unwrap().insert(name.to_string(), state);
    }

    pub fn set_webhook_config(&self, name: &str, url: &str, enabled: bool) {
        self.webhooks
            .lock()
            .unwrap()
            .insert(name.to_string(), WebhookConfig { url: url.to_string(), enabled });
    }

    /// Make `operation` (e.g. "delete", "restart", "state") fail for `name`.
    pub fn fail(&self, operation: &str, name: &str) {
        self.failing
            .lock()
            .unwrap()
            .insert((operation.to_string(), name.to_string()));
    }

    pub fn calls(&self, operation: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|(op, _)| op == operation).count()
    }

    pub fn calls_for(&self, operation: &str) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(op, _)| op == operation)
            .map(|(_, name)| name.clone())
            .collect()
    }

    pub fn webhook_writes(&self) -> Vec<(String, WebhookSettings)> {
        self.webhook_writes.lock().unwrap().clone()
    }

    fn record(&self, operation: &str, name: &str) -> Result<(), GatewayError> {
        self.calls
            .lock()
            .unwrap()
            .push((operation.to_string(), name.to_string()));
        if self
            .failing
            .lock()
            .unwrap()
            .contains(&(operation.to_string(), name.to_string()))
        {
            return Err(GatewayError::Http { status: 500, message: format!("{} failed for {}", operation, name) });
        }
        Ok(())
    }
}

#[async_trait]
impl GatewayApi for MockGateway {
    async fn list_instances(&self) -> Result<Vec<Instance>, GatewayError> {
        self.record("list", "")?;
        Ok(self.instances.lock().unwrap().clone())
    }

    async fn create_instance(&self, payload: &CreateInstancePayload) -> Result<(), GatewayError> {
        self.record("create", &payload.instance_name)?;
        self.instances.lock().unwrap().push(Instance::new(payload.instance_name.clone()));
        Ok(())
    }

    async fn fetch_qr(&self, name: &str) -> Result<QrCode, GatewayError> {
        self.record("qr", name)?;
        Ok(QrCode { payload: format!("2@{}", name), pairing_code: Some("WXYZ-1234".into()) })
    }

    async fn restart_instance(&self, name: &str) -> Result<(), GatewayError> {
        self.record("restart", name)
    }

    async fn delete_instance(&self, name: &str) -> Result<(), GatewayError> {
        self.record("delete", name)?;
        self.instances.lock().unwrap().retain(|i| i.name != name);
        Ok(())
    }

    async fn find_webhook(&self, name: &str) -> Result<WebhookConfig, GatewayError> {
        self.record("find_webhook", name)?;
        Ok(self.webhooks.lock().unwrap().get(name).cloned().unwrap_or_default())
    }

    async fn set_webhook(&self, name: &str, settings: &WebhookSettings) -> Result<(), GatewayError> {
        self.record("set_webhook", name)?;
        self.webhook_writes
            .lock()
            .unwrap()
            .push((name.to_string(), settings.clone()));
        Ok(())
    }

    async fn connection_state(&self, name: &str) -> Result<ConnectionState, GatewayError> {
        self.record("state", name)?;
        Ok(self
            .states
            .lock()
            .unwrap()
            .get(name)
            .copied()
            .unwrap_or(ConnectionState::Unknown))
    }
}

/// Apply results until nothing arrives for a short while.
pub async fn settle(monitor: &mut FleetMonitor) {
    while let Ok(true) = tokio::time::timeout(Duration::from_millis(50), monitor.next_event()).await {}
}
