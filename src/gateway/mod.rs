//! Remote gateway client: typed access to the instance-management API.

mod http;
pub mod normalize;

use async_trait::async_trait;
use serde::Serialize;

use crate::create::CreateInstancePayload;
use crate::error::GatewayError;
use crate::model::{ConnectionState, Instance};

pub use http::HttpGateway;

/// Event subscription sent with every webhook update from the dashboard.
pub const DEFAULT_WEBHOOK_EVENTS: &[&str] = &["MESSAGES_UPSERT"];

/// Normalized webhook configuration of one instance. Empty `url` = not configured.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WebhookConfig {
    pub url: String,
    pub enabled: bool,
}

/// Body of the set-webhook call (sent wrapped as `{"webhook": ...}`). The
/// upstream API expects snake_case keys here, unlike instance creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WebhookSettings {
    pub url: String,
    pub events: Vec<String>,
    pub webhook_base64: bool,
    pub webhook_by_events: bool,
    pub enabled: bool,
}

impl WebhookSettings {
    /// Settings with the dashboard's fixed event subscription.
    pub fn new(url: impl Into<String>, enabled: bool) -> Self {
        Self {
            url: url.into(),
            events: DEFAULT_WEBHOOK_EVENTS.iter().map(|e| e.to_string()).collect(),
            webhook_base64: false,
            webhook_by_events: false,
            enabled,
        }
    }
}

/// Pairing payload for an unpaired instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QrCode {
    pub payload: String,              // base64 image or raw QR code text
    pub pairing_code: Option<String>, // phone pairing code, when offered
}

/// The instance-management API as seen by the dashboard. No retries happen at
/// this layer; callers decide whether to re-trigger.
#[async_trait]
pub trait GatewayApi: Send + Sync {
    async fn list_instances(&self) -> Result<Vec<Instance>, GatewayError>;

    async fn create_instance(&self, payload: &CreateInstancePayload) -> Result<(), GatewayError>;

    async fn fetch_qr(&self, name: &str) -> Result<QrCode, GatewayError>;

    async fn restart_instance(&self, name: &str) -> Result<(), GatewayError>;

    async fn delete_instance(&self, name: &str) -> Result<(), GatewayError>;

    async fn find_webhook(&self, name: &str) -> Result<WebhookConfig, GatewayError>;

    async fn set_webhook(&self, name: &str, settings: &WebhookSettings) -> Result<(), GatewayError>;

    async fn connection_state(&self, name: &str) -> Result<ConnectionState, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn webhook_settings_serialize_with_snake_case_flags() {
        let body = json!({ "webhook": WebhookSettings::new("https://x.test/hook", true) });
        let inner = &body["webhook"];
        assert_eq!(inner["url"], "https://x.test/hook");
        assert_eq!(inner["webhook_base64"], false);
        assert_eq!(inner["webhook_by_events"], false);
        assert_eq!(inner["enabled"], true);
        assert!(inner.get("webhookBase64").is_none());
        assert!(inner.get("webhookByEvents").is_none());
        assert_eq!(inner["events"], json!(DEFAULT_WEBHOOK_EVENTS));
    }
}
