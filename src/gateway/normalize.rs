//! Normalization of the loosely-shaped JSON the gateway API returns.
//!
//! The upstream response shapes differ between API versions and endpoints, so each
//! extractor walks an explicit, ordered list of candidate fields and falls back to a
//! defined default. The precedence orders here are part of the contract.

use serde_json::Value;

use crate::model::{ConnectionState, Instance};

use super::{QrCode, WebhookConfig};

/// Candidate locations of the raw connection state, highest priority first.
pub const CONNECTION_STATE_FIELDS: &[&[&str]] = &[
    &["instance", "state"],
    &["state"],
    &["status"],
    &["connection"],
    &["connectionState"],
    &["response", "state"],
];

/// Candidate locations of the QR payload, highest priority first.
pub const QR_PAYLOAD_FIELDS: &[&[&str]] = &[
    &["qrcode", "base64"],
    &["qrcode", "image"],
    &["qrcode", "code"],
    &["base64"],
    &["image"],
    &["code"],
];

fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut cur = value;
    for key in path {
        cur = cur.get(key)?;
    }
    Some(cur)
}

/// Non-empty string at `path`, if any.
fn string_at<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
    lookup(value, path)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

fn bool_at(value: &Value, path: &[&str]) -> Option<bool> {
    lookup(value, path).and_then(Value::as_bool)
}

/// First non-empty string found at any of `fields`, in order.
fn first_string<'a>(value: &'a Value, fields: &[&[&str]]) -> Option<&'a str> {
    fields.iter().find_map(|path| string_at(value, path))
}

/// Raw connection state string per [`CONNECTION_STATE_FIELDS`], or `"unknown"`.
pub fn raw_connection_state(value: &Value) -> &str {
    first_string(value, CONNECTION_STATE_FIELDS).unwrap_or("unknown")
}

pub fn connection_state(value: &Value) -> ConnectionState {
    ConnectionState::from_raw(raw_connection_state(value))
}

/// Instance list. A non-array body yields an empty list; entries without a
/// name are skipped and repeated names keep their first occurrence.
pub fn instances(value: &Value) -> Vec<Instance> {
    let Some(items) = value.as_array() else { return Vec::new() };

    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        let Some(name) = string_at(item, &["name"])
            .or_else(|| string_at(item, &["instance", "instanceName"]))
            .or_else(|| string_at(item, &["instanceName"]))
        else {
            continue;
        };
        if !seen.insert(name.to_string()) {
            continue;
        }
        out.push(Instance {
            name: name.to_string(),
            profile_name: string_at(item, &["profileName"])
                .or_else(|| string_at(item, &["instance", "profileName"]))
                .map(str::to_string),
            owner: string_at(item, &["ownerJid"])
                .or_else(|| string_at(item, &["owner"]))
                .or_else(|| string_at(item, &["instance", "owner"]))
                .map(str::to_string),
        });
    }
    out
}

/// Webhook config. URL: `webhook` (string or `{url}` object), then
/// `settings.webhook`, then `url`. Enabled: `enabled`, then `settings.enabled`,
/// then whether a URL is configured.
pub fn webhook(value: &Value) -> WebhookConfig {
    if value.is_null() {
        return WebhookConfig::default();
    }

    let nested = lookup(value, &["webhook"]).filter(|v| v.is_object());

    let url = string_at(value, &["webhook"])
        .or_else(|| nested.and_then(|n| string_at(n, &["url"])))
        .or_else(|| string_at(value, &["settings", "webhook"]))
        .or_else(|| string_at(value, &["url"]))
        .unwrap_or_default()
        .to_string();

    let enabled = bool_at(value, &["enabled"])
        .or_else(|| nested.and_then(|n| bool_at(n, &["enabled"])))
        .or_else(|| bool_at(value, &["settings", "enabled"]))
        .unwrap_or(!url.is_empty());

    WebhookConfig { url, enabled }
}

/// QR payload per [`QR_PAYLOAD_FIELDS`]; `None` when the body carries none,
/// which usually means the instance is already paired.
pub fn qr_code(value: &Value) -> Option<QrCode> {
    let payload = first_string(value, QR_PAYLOAD_FIELDS)?;
    let pairing_code = string_at(value, &["pairingCode"])
        .or_else(|| string_at(value, &["qrcode", "pairingCode"]))
        .map(str::to_string);
    Some(QrCode {
        payload: payload.to_string(),
        pairing_code,
    })
}

fn message_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(message_text).collect();
            if parts.is_empty() { None } else { Some(parts.join("; ")) }
        }
        _ => None,
    }
}

/// Upstream error message: `message`, then `response.message`, then `error`.
pub fn error_message(value: &Value) -> Option<String> {
    lookup(value, &["message"])
        .and_then(message_text)
        .or_else(|| lookup(value, &["response", "message"]).and_then(message_text))
        .or_else(|| string_at(value, &["error"]).map(str::to_string))
}
