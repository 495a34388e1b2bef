use std::time::Instant;

use crate::model::StateFilter;

/// Pending destructive action awaiting confirmation.
pub struct PendingAction {
    pub description: String,
    pub kind: PendingActionKind,
    pub expires: Instant,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PendingActionKind {
    ResetInstance(String),
    BulkReset,
    DeleteInstance(String),
    RemoveWebhook(String),
}

/// Select-by-state shortcut bound to a digit key.
pub fn state_filter_for_key(c: char) -> Option<StateFilter> {
    match c {
        '1' => Some(StateFilter::Connected),
        '2' => Some(StateFilter::Connecting),
        '3' => Some(StateFilter::UnknownOrDisconnected),
        _ => None,
    }
}

/// Keep a cursor inside a list of `len` rows.
pub fn clamp_cursor(cursor: usize, len: usize) -> usize {
    if len == 0 { 0 } else { cursor.min(len - 1) }
}
