use tokio::time::Instant;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
    Info,
}

/// A transient outcome message. Owned by the notification queue.
#[derive(Clone, Debug)]
pub struct Notification {
    pub id: u64,
    pub message: String,
    pub severity: Severity,
    pub expires: Instant,
}

/// Inline status text with an optional expiry (e.g. bulk summaries).
#[derive(Clone, Debug)]
pub struct TimedMessage {
    pub text: String,
    pub expires: Option<Instant>,
}

impl TimedMessage {
    pub fn sticky(text: impl Into<String>) -> Self {
        Self { text: text.into(), expires: None }
    }

    pub fn until(text: impl Into<String>, expires: Instant) -> Self {
        Self { text: text.into(), expires: Some(expires) }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        self.expires.is_some_and(|e| now >= e)
    }
}
