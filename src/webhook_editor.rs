//! Per-instance webhook edit/save/cancel state machine.

use tokio::time::Instant;

use crate::error::ValidationError;
use crate::model::TimedMessage;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditorMode {
    Viewing,
    Editing {
        instance: String,
        draft: String,
        saving: bool,
    },
}

/// A validated save ready to be sent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WebhookSave {
    pub instance: String,
    pub url: String,
}

/// An empty URL clears the webhook; anything else must be http(s).
pub fn validate_webhook_url(url: &str) -> Result<(), ValidationError> {
    let lower = url.trim().to_lowercase();
    if lower.is_empty() || lower.starts_with("http://") || lower.starts_with("https://") {
        Ok(())
    } else {
        Err(ValidationError::InvalidWebhookUrl)
    }
}

/// At most one instance is edited at a time.
#[derive(Clone, Debug)]
pub struct WebhookEditor {
    pub mode: EditorMode,
    pub error: Option<String>,
    pub success: Option<TimedMessage>,
}

impl Default for WebhookEditor {
    fn default() -> Self {
        Self {
            mode: EditorMode::Viewing,
            error: None,
            success: None,
        }
    }
}

impl WebhookEditor {
    /// Start editing `instance`, seeding the draft with its last known URL.
    /// Any edit in progress for another instance is dropped.
    pub fn begin(&mut self, instance: &str, current_url: &str) {
        self.mode = EditorMode::Editing {
            instance: instance.to_string(),
            draft: current_url.to_string(),
            saving: false,
        };
        self.error = None;
    }

    pub fn cancel(&mut self) {
        self.mode = EditorMode::Viewing;
        self.error = None;
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, EditorMode::Editing { .. })
    }

    pub fn editing_instance(&self) -> Option<&str> {
        match &self.mode {
            EditorMode::Editing { instance, .. } => Some(instance.as_str()),
            EditorMode::Viewing => None,
        }
    }

    pub fn draft(&self) -> Option<&str> {
        match &self.mode {
            EditorMode::Editing { draft, .. } => Some(draft.as_str()),
            EditorMode::Viewing => None,
        }
    }

    pub fn is_saving(&self) -> bool {
        matches!(self.mode, EditorMode::Editing { saving: true, .. })
    }

    pub fn push_char(&mut self, c: char) {
        if let EditorMode::Editing { draft, .. } = &mut self.mode {
            draft.push(c);
        }
    }

    pub fn pop_char(&mut self) {
        if let EditorMode::Editing { draft, .. } = &mut self.mode {
            draft.pop();
        }
    }

    pub fn set_draft(&mut self, text: &str) {
        if let EditorMode::Editing { draft, .. } = &mut self.mode {
            *draft = text.to_string();
        }
    }

    /// Validate the draft. On failure the error is recorded and the editor stays
    /// in editing; on success it is marked as saving. `None` when not editing.
    pub fn prepare_save(&mut self) -> Option<Result<WebhookSave, ValidationError>> {
        let EditorMode::Editing { instance, draft, saving } = &mut self.mode else {
            return None;
        };
        self.success = None;
        if let Err(e) = validate_webhook_url(draft) {
            self.error = Some(e.to_string());
            return Some(Err(e));
        }
        self.error = None;
        *saving = true;
        Some(Ok(WebhookSave {
            instance: instance.clone(),
            url: draft.trim().to_string(),
        }))
    }

    /// The server confirmed a save. Returns to viewing if `instance` is still the
    /// one being edited.
    pub fn save_confirmed(&mut self, instance: &str, success: TimedMessage) {
        if self.editing_instance() == Some(instance) {
            self.mode = EditorMode::Viewing;
            self.error = None;
        }
        self.success = Some(success);
    }

    /// The server rejected a save; stay in editing with the error shown.
    pub fn save_failed(&mut self, instance: &str, message: String) {
        if let EditorMode::Editing { instance: current, saving, .. } = &mut self.mode {
            if current.as_str() == instance {
                *saving = false;
                self.error = Some(message);
            }
        }
    }

    pub fn expire(&mut self, now: Instant) -> bool {
        if self.success.as_ref().is_some_and(|m| m.is_expired(now)) {
            self.success = None;
            return true;
        }
        false
    }
}
