//! Short-lived single-instance overlays: QR view and bulk-delete confirmation.

use crate::error::ValidationError;
use crate::gateway::QrCode;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum QrView {
    #[default]
    Closed,
    Loading(String),
    Ready(String, QrCode),
    Failed(String, String),
}

impl QrView {
    pub fn open(&mut self, instance: &str) {
        *self = QrView::Loading(instance.to_string());
    }

    pub fn close(&mut self) {
        *self = QrView::Closed;
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, QrView::Closed)
    }

    pub fn instance(&self) -> Option<&str> {
        match self {
            QrView::Closed => None,
            QrView::Loading(name) | QrView::Ready(name, _) | QrView::Failed(name, _) => {
                Some(name.as_str())
            }
        }
    }

    /// Apply a fetch result. Discarded unless the view is still loading `instance`.
    pub fn resolve(&mut self, instance: &str, result: Result<QrCode, String>) -> bool {
        if !matches!(self, QrView::Loading(name) if name.as_str() == instance) {
            return false;
        }
        *self = match result {
            Ok(qr) => QrView::Ready(instance.to_string(), qr),
            Err(message) => QrView::Failed(instance.to_string(), message),
        };
        true
    }
}

/// Phrase the user must type to confirm deleting `count` instances.
pub fn expected_phrase(count: usize) -> String {
    format!("i want to delete {} instances", count)
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeleteConfirmation {
    pub open: bool,
    pub text: String,
    pub error: Option<String>,
}

impl DeleteConfirmation {
    pub fn open(&mut self) {
        *self = DeleteConfirmation {
            open: true,
            ..Default::default()
        };
    }

    pub fn close(&mut self) {
        *self = DeleteConfirmation::default();
    }

    pub fn push_char(&mut self, c: char) {
        self.text.push(c);
    }

    pub fn pop_char(&mut self) {
        self.text.pop();
    }

    /// Case-insensitive exact match against the phrase for `count` instances.
    /// A mismatch is recorded inline and the confirmation stays open.
    pub fn check(&mut self, count: usize) -> Result<(), ValidationError> {
        let expected = expected_phrase(count);
        if self.text.to_lowercase() == expected.to_lowercase() {
            self.error = None;
            Ok(())
        } else {
            let err = ValidationError::ConfirmationMismatch { expected };
            self.error = Some(err.to_string());
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qr(payload: &str) -> QrCode {
        QrCode { payload: payload.into(), pairing_code: None }
    }

    #[test]
    fn confirmation_phrase_is_case_insensitive_and_size_dependent() {
        let mut c = DeleteConfirmation::default();
        c.open();
        c.text = "I Want To Delete 3 Instances".into();
        assert!(c.check(3).is_ok());
        assert!(c.check(2).is_err());
        assert!(c.error.as_deref().is_some_and(|e| e.contains("i want to delete 2 instances")));
    }

    #[test]
    fn confirmation_close_resets_state() {
        let mut c = DeleteConfirmation::default();
        c.open();
        c.push_char('x');
        let _ = c.check(1);
        c.close();
        assert_eq!(c, DeleteConfirmation::default());
    }

    #[test]
    fn qr_result_for_other_instance_is_discarded() {
        let mut v = QrView::default();
        v.open("a");
        v.open("b");
        assert!(!v.resolve("a", Ok(qr("late"))));
        assert_eq!(v, QrView::Loading("b".into()));
        assert!(v.resolve("b", Err("not found".into())));
        assert_eq!(v, QrView::Failed("b".into(), "not found".into()));
    }

    #[test]
    fn qr_result_after_close_is_discarded() {
        let mut v = QrView::default();
        v.open("a");
        v.close();
        assert!(!v.resolve("a", Ok(qr("x"))));
        assert!(!v.is_open());
    }
}
