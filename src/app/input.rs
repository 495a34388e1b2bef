use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::debug;

use crate::create::CreateInstanceRequest;
use crate::error::ValidationError;
use crate::model::{InputMode, TimedMessage};

use super::state::{state_filter_for_key, PendingAction, PendingActionKind};
use super::App;

/// How long a y/n prompt waits before it is dropped.
const CONFIRM_TIMEOUT: Duration = Duration::from_secs(5);

/// Result of handling a key: Quit the app, or key was consumed (needs render).
/// None means the key was not handled.
pub enum InputResult {
    Quit,
    Consumed,
}

/// Handle a key event. Overlays take the keyboard first: the y/n prompt, then
/// the delete confirmation, the webhook editor, the QR view, and finally the
/// current input mode.
pub fn handle_key(app: &mut App, key_event: KeyEvent) -> Option<InputResult> {
    let KeyEvent { code, modifiers, .. } = key_event;

    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
        return Some(InputResult::Quit);
    }

    if let Some(pa) = app.pending_action.take() {
        if code == KeyCode::Char('y') || code == KeyCode::Char('Y') {
            run_pending(app, pa.kind);
        }
        return Some(InputResult::Consumed);
    }

    if app.fleet.dashboard.delete_confirmation.open {
        return handle_delete_prompt(app, code);
    }
    if app.fleet.dashboard.webhook_editor.is_editing() {
        return handle_webhook_editor(app, code);
    }
    if app.fleet.dashboard.qr_view.is_open() {
        return handle_qr(app, code);
    }

    match app.input_mode.clone() {
        InputMode::Search => handle_search(app, code),
        InputMode::CreateNames(text) => handle_create(app, code, text),
        InputMode::Normal => handle_normal(app, code, modifiers),
    }
}

fn run_pending(app: &mut App, kind: PendingActionKind) {
    match kind {
        PendingActionKind::ResetInstance(name) => app.fleet.reset_instance(&name),
        PendingActionKind::BulkReset => app.fleet.bulk_reset(),
        PendingActionKind::DeleteInstance(name) => app.fleet.delete_instance(&name),
        PendingActionKind::RemoveWebhook(name) => app.fleet.remove_webhook(&name),
    }
}

fn confirm(app: &mut App, description: String, kind: PendingActionKind) -> Option<InputResult> {
    app.pending_action = Some(PendingAction {
        description,
        kind,
        expires: Instant::now() + CONFIRM_TIMEOUT,
    });
    Some(InputResult::Consumed)
}

fn handle_delete_prompt(app: &mut App, code: KeyCode) -> Option<InputResult> {
    match code {
        KeyCode::Esc => app.fleet.cancel_bulk_delete(),
        KeyCode::Enter => match app.fleet.confirm_bulk_delete() {
            Ok(()) => {}
            Err(ValidationError::EmptySelection) => app.fleet.cancel_bulk_delete(),
            Err(e @ ValidationError::BulkActionInProgress) => {
                app.fleet.cancel_bulk_delete();
                app.fleet.dashboard.status_message = Some(TimedMessage::sticky(e.to_string()));
            }
            Err(e) => debug!(error = %e, "bulk delete not confirmed"),
        },
        KeyCode::Backspace => app.fleet.dashboard.delete_confirmation.pop_char(),
        KeyCode::Char(c) => app.fleet.dashboard.delete_confirmation.push_char(c),
        _ => return None,
    }
    Some(InputResult::Consumed)
}

fn handle_webhook_editor(app: &mut App, code: KeyCode) -> Option<InputResult> {
    if app.fleet.dashboard.webhook_editor.is_saving() && code != KeyCode::Esc {
        return None;
    }
    match code {
        KeyCode::Esc => app.fleet.cancel_webhook_edit(),
        KeyCode::Enter => {
            if let Some(Err(e)) = app.fleet.save_webhook() {
                debug!(error = %e, "webhook draft rejected");
            }
        }
        KeyCode::Backspace => app.fleet.dashboard.webhook_editor.pop_char(),
        KeyCode::Char(c) => app.fleet.dashboard.webhook_editor.push_char(c),
        _ => return None,
    }
    Some(InputResult::Consumed)
}

fn handle_qr(app: &mut App, code: KeyCode) -> Option<InputResult> {
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => {
            app.fleet.close_qr();
            Some(InputResult::Consumed)
        }
        _ => None,
    }
}

fn handle_search(app: &mut App, code: KeyCode) -> Option<InputResult> {
    let dashboard = &mut app.fleet.dashboard;
    match code {
        KeyCode::Esc => {
            dashboard.set_search_query("");
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => app.input_mode = InputMode::Normal,
        KeyCode::Backspace => {
            dashboard.search_query.pop();
        }
        KeyCode::Char(c) => dashboard.search_query.push(c),
        _ => return None,
    }
    app.clamp_cursor();
    Some(InputResult::Consumed)
}

fn handle_create(app: &mut App, code: KeyCode, mut text: String) -> Option<InputResult> {
    match code {
        KeyCode::Esc => app.input_mode = InputMode::Normal,
        KeyCode::Enter => {
            let request = CreateInstanceRequest::from_names(&text);
            match app.fleet.create_instances(&request) {
                Ok(()) => app.input_mode = InputMode::Normal,
                Err(e) => app.fleet.dashboard.status_message = Some(TimedMessage::sticky(e.to_string())),
            }
        }
        KeyCode::Backspace => {
            text.pop();
            app.input_mode = InputMode::CreateNames(text);
        }
        KeyCode::Char(c) => {
            text.push(c);
            app.input_mode = InputMode::CreateNames(text);
        }
        _ => return None,
    }
    Some(InputResult::Consumed)
}

fn handle_normal(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Option<InputResult> {
    match code {
        KeyCode::Char('q') => return Some(InputResult::Quit),
        KeyCode::Esc => {
            let dashboard = &mut app.fleet.dashboard;
            if let Some(id) = dashboard.notifications.latest().map(|n| n.id) {
                dashboard.notifications.dismiss(id);
            } else {
                dashboard.selection.clear();
            }
            return Some(InputResult::Consumed);
        }
        KeyCode::Up => {
            if app.cursor > 0 {
                app.cursor -= 1;
                return Some(InputResult::Consumed);
            }
        }
        KeyCode::Down => {
            if app.cursor + 1 < app.fleet.dashboard.filtered().len() {
                app.cursor += 1;
                return Some(InputResult::Consumed);
            }
        }
        KeyCode::Char(' ') => {
            if let Some(name) = app.cursor_instance() {
                let modifier = modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);
                app.fleet.dashboard.click(&name, modifier);
                return Some(InputResult::Consumed);
            }
        }
        KeyCode::Char('t') => {
            if let Some(name) = app.cursor_instance() {
                app.fleet.dashboard.click(&name, true);
                return Some(InputResult::Consumed);
            }
        }
        KeyCode::Char(c @ ('1' | '2' | '3')) => {
            if let Some(filter) = state_filter_for_key(c) {
                app.fleet.dashboard.select_by_state(filter);
                return Some(InputResult::Consumed);
            }
        }
        KeyCode::Char('/') => {
            app.input_mode = InputMode::Search;
            return Some(InputResult::Consumed);
        }
        KeyCode::Char('n') => {
            app.input_mode = InputMode::CreateNames(String::new());
            return Some(InputResult::Consumed);
        }
        KeyCode::Char('g') => {
            app.fleet.refresh();
            return Some(InputResult::Consumed);
        }
        KeyCode::Char('r') => {
            if let Some(name) = app.cursor_instance() {
                app.fleet.reset_instance(&name);
                return Some(InputResult::Consumed);
            }
        }
        KeyCode::Char('R') => {
            let count = app.fleet.dashboard.selection.len();
            if count == 0 {
                app.fleet.dashboard.status_message =
                    Some(TimedMessage::sticky(ValidationError::EmptySelection.to_string()));
                return Some(InputResult::Consumed);
            }
            return confirm(
                app,
                format!("Reset {} selected instance(s)?", count),
                PendingActionKind::BulkReset,
            );
        }
        KeyCode::Char('D') => {
            if !app.fleet.open_bulk_delete() {
                let msg = if app.fleet.dashboard.bulk_action_in_progress {
                    ValidationError::BulkActionInProgress.to_string()
                } else {
                    ValidationError::EmptySelection.to_string()
                };
                app.fleet.dashboard.status_message = Some(TimedMessage::sticky(msg));
            }
            return Some(InputResult::Consumed);
        }
        KeyCode::Char('x') => {
            if let Some(name) = app.cursor_instance() {
                return confirm(
                    app,
                    format!("Delete instance '{}'?", name),
                    PendingActionKind::DeleteInstance(name),
                );
            }
        }
        KeyCode::Char('w') => {
            if let Some(name) = app.cursor_instance() {
                app.fleet.begin_webhook_edit(&name);
                return Some(InputResult::Consumed);
            }
        }
        KeyCode::Char('e') => {
            if let Some(name) = app.cursor_instance() {
                app.fleet.toggle_webhook(&name);
                return Some(InputResult::Consumed);
            }
        }
        KeyCode::Char('X') => {
            if let Some(name) = app.cursor_instance() {
                return confirm(
                    app,
                    format!("Remove webhook of '{}'?", name),
                    PendingActionKind::RemoveWebhook(name),
                );
            }
        }
        KeyCode::Char('Q') => {
            if let Some(name) = app.cursor_instance() {
                app.fleet.open_qr(&name);
                return Some(InputResult::Consumed);
            }
        }
        _ => {}
    }
    None
}
