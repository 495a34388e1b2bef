use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::create::CreateInstancePayload;
use crate::error::GatewayError;
use crate::model::{ConnectionState, Instance};

use super::{normalize, GatewayApi, QrCode, WebhookConfig, WebhookSettings};

/// `GatewayApi` over HTTP with reqwest.
pub struct HttpGateway {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpGateway {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue one request and decode the body. Non-2xx becomes `GatewayError::Http`.
    async fn send(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value, GatewayError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "gateway request");

        let mut req = self.client.request(method.clone(), &url);
        if let Some(ref key) = self.api_key {
            req = req.header("apikey", key);
        }
        if let Some(ref body) = body {
            req = req.json(body);
        }

        let resp = req.send().await.map_err(|e| {
            warn!(%method, %url, error = %e, "gateway request failed");
            GatewayError::from(e)
        })?;
        let status = resp.status();
        let bytes = resp.bytes().await?;
        let value = decode_body(&bytes);

        if !status.is_success() {
            let message = normalize::error_message(&value)
                .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()));
            warn!(%method, %url, status = status.as_u16(), %message, "gateway returned error");
            return Err(GatewayError::Http { status: status.as_u16(), message });
        }
        Ok(value)
    }
}

/// Path for a per-instance endpoint, with the name percent-encoded.
pub(crate) fn instance_path(prefix: &str, name: &str) -> String {
    format!("{}/{}", prefix, urlencoding::encode(name))
}

/// Empty body decodes to `null`; a non-JSON body is kept as a string.
fn decode_body(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

#[async_trait]
impl GatewayApi for HttpGateway {
    async fn list_instances(&self) -> Result<Vec<Instance>, GatewayError> {
        let value = self.send(Method::GET, "/instance/fetchInstances", None).await?;
        Ok(normalize::instances(&value))
    }

    async fn create_instance(&self, payload: &CreateInstancePayload) -> Result<(), GatewayError> {
        let body = serde_json::to_value(payload).map_err(|e| GatewayError::Decode(e.to_string()))?;
        self.send(Method::POST, "/instance/create", Some(body)).await?;
        Ok(())
    }

    async fn fetch_qr(&self, name: &str) -> Result<QrCode, GatewayError> {
        let value = self.send(Method::GET, &instance_path("/instance/connect", name), None).await?;
        normalize::qr_code(&value).ok_or_else(|| {
            GatewayError::Decode(
                "QR code not found in response. The instance might be already connected.".to_string(),
            )
        })
    }

    async fn restart_instance(&self, name: &str) -> Result<(), GatewayError> {
        self.send(Method::PUT, &instance_path("/instance/restart", name), None).await?;
        Ok(())
    }

    async fn delete_instance(&self, name: &str) -> Result<(), GatewayError> {
        self.send(Method::DELETE, &instance_path("/instance/delete", name), None).await?;
        Ok(())
    }

    async fn find_webhook(&self, name: &str) -> Result<WebhookConfig, GatewayError> {
        let value = self.send(Method::GET, &instance_path("/webhook/find", name), None).await?;
        Ok(normalize::webhook(&value))
    }

    async fn set_webhook(&self, name: &str, settings: &WebhookSettings) -> Result<(), GatewayError> {
        let body = json!({ "webhook": settings });
        self.send(Method::POST, &instance_path("/webhook/set", name), Some(body)).await?;
        Ok(())
    }

    async fn connection_state(&self, name: &str) -> Result<ConnectionState, GatewayError> {
        let value = self
            .send(Method::GET, &instance_path("/instance/connectionState", name), None)
            .await?;
        Ok(normalize::connection_state(&value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_path_percent_encodes_names() {
        assert_eq!(instance_path("/instance/connect", "sales"), "/instance/connect/sales");
        assert_eq!(instance_path("/instance/delete", "a b/c"), "/instance/delete/a%20b%2Fc");
        assert_eq!(instance_path("/webhook/find", "café"), "/webhook/find/caf%C3%A9");
    }

    #[test]
    fn decode_body_handles_empty_and_text() {
        assert_eq!(decode_body(b""), Value::Null);
        assert_eq!(decode_body(b"{\"ok\":true}"), json!({ "ok": true }));
        assert_eq!(decode_body(b"OK"), Value::String("OK".into()));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let gw = HttpGateway::new("http://localhost:8080/", None, Duration::from_secs(1))
            .expect("client");
        assert_eq!(gw.base_url(), "http://localhost:8080");
    }
}
