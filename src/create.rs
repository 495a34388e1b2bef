//! Instance-creation requests.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::ValidationError;

pub const DEFAULT_INTEGRATION: &str = "WHATSAPP-BAILEYS";

/// What the creation form produces: one or more names plus shared options.
#[derive(Clone, Debug)]
pub struct CreateInstanceRequest {
    pub instance_names: Vec<String>,
    pub token: Option<String>,
    pub integration: String,
    pub qrcode: bool,
    pub number: Option<String>,
    pub webhook: Option<String>,
    pub webhook_by_events: bool,
    pub events: Vec<String>,
    pub reject_call: bool,
    pub msg_call: Option<String>,
    pub groups_ignore: bool,
    pub always_online: bool,
    pub read_messages: bool,
    pub read_status: bool,
}

impl Default for CreateInstanceRequest {
    fn default() -> Self {
        Self {
            instance_names: Vec::new(),
            token: None,
            integration: DEFAULT_INTEGRATION.to_string(),
            qrcode: true,
            number: None,
            webhook: None,
            webhook_by_events: false,
            events: vec!["MESSAGES_UPSERT".to_string()],
            reject_call: true,
            msg_call: None,
            groups_ignore: true,
            always_online: true,
            read_messages: true,
            read_status: false,
        }
    }
}

/// JSON body of one create call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInstancePayload {
    pub instance_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub integration: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook: Option<String>,
    pub webhook_by_events: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<String>>,
    pub qrcode: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    pub reject_call: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg_call: Option<String>,
    pub groups_ignore: bool,
    pub always_online: bool,
    pub read_messages: bool,
    pub read_status: bool,
}

fn non_empty(s: &Option<String>) -> Option<String> {
    s.as_ref().filter(|v| !v.trim().is_empty()).cloned()
}

impl CreateInstanceRequest {
    /// Build a request from a comma-separated list of names, default options.
    pub fn from_names(input: &str) -> Self {
        Self {
            instance_names: input.split(',').map(|s| s.trim().to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.instance_names.is_empty() || self.instance_names.iter().any(|n| n.trim().is_empty()) {
            return Err(ValidationError::BlankInstanceName);
        }
        let mut seen = HashSet::new();
        for name in &self.instance_names {
            if !seen.insert(name.as_str()) {
                return Err(ValidationError::DuplicateInstanceName(name.clone()));
            }
        }
        Ok(())
    }

    /// One payload per requested name, in input order. Webhook options only
    /// apply to single-instance creation.
    pub fn payloads(&self) -> Vec<CreateInstancePayload> {
        let single = self.instance_names.len() == 1;
        self.instance_names
            .iter()
            .map(|name| CreateInstancePayload {
                instance_name: name.clone(),
                token: non_empty(&self.token),
                integration: self.integration.clone(),
                webhook: if single { non_empty(&self.webhook) } else { None },
                webhook_by_events: single && self.webhook_by_events,
                events: if single && self.webhook_by_events {
                    Some(self.events.clone())
                } else {
                    None
                },
                qrcode: self.qrcode,
                number: non_empty(&self.number),
                reject_call: self.reject_call,
                msg_call: non_empty(&self.msg_call),
                groups_ignore: self.groups_ignore,
                always_online: self.always_online,
                read_messages: self.read_messages,
                read_status: self.read_status,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn blank_and_duplicate_names_are_rejected() {
        let req = CreateInstanceRequest::from_names("a, ,b");
        assert_eq!(req.validate(), Err(ValidationError::BlankInstanceName));

        let req = CreateInstanceRequest::from_names("a,b,a");
        assert_eq!(req.validate(), Err(ValidationError::DuplicateInstanceName("a".into())));

        let req = CreateInstanceRequest::from_names("a, b");
        assert_eq!(req.validate(), Ok(()));
        assert_eq!(req.instance_names, vec!["a", "b"]);
    }

    #[test]
    fn single_payload_carries_webhook_options() {
        let req = CreateInstanceRequest {
            instance_names: vec!["solo".into()],
            webhook: Some("https://hook.test".into()),
            webhook_by_events: true,
            ..Default::default()
        };
        let body = serde_json::to_value(&req.payloads()[0]).expect("serialize");
        assert_eq!(
            body,
            json!({
                "instanceName": "solo",
                "integration": "WHATSAPP-BAILEYS",
                "webhook": "https://hook.test",
                "webhookByEvents": true,
                "events": ["MESSAGES_UPSERT"],
                "qrcode": true,
                "rejectCall": true,
                "groupsIgnore": true,
                "alwaysOnline": true,
                "readMessages": true,
                "readStatus": false,
            })
        );
    }

    #[test]
    fn batch_payloads_drop_webhook_options() {
        let req = CreateInstanceRequest {
            instance_names: vec!["a".into(), "b".into()],
            webhook: Some("https://hook.test".into()),
            webhook_by_events: true,
            token: Some(String::new()),
            ..Default::default()
        };
        let payloads = req.payloads();
        assert_eq!(payloads.len(), 2);
        for p in &payloads {
            assert_eq!(p.webhook, None);
            assert!(!p.webhook_by_events);
            assert_eq!(p.events, None);
            assert_eq!(p.token, None);
        }
        assert_eq!(payloads[1].instance_name, "b");
    }
}
