mod shared;
mod header;
mod instances;
mod confirmation;
mod qr;
mod webhook;
mod notifications;

use std::io::{self, Write};
use crossterm::{execute, cursor, queue, style::{Color, SetForegroundColor, ResetColor}, terminal};

use crate::dashboard::Dashboard;
use crate::model::InputMode;
use crate::modals::{DeleteConfirmation, QrView};
use crate::notifications::NotificationQueue;
use crate::webhook_editor::WebhookEditor;

pub use shared::truncate_str;

pub struct Presenter;

/// Minimum terminal dimensions for usable rendering.
pub const MIN_COLS: u16 = 80;
pub const MIN_ROWS: u16 = 12;

impl Presenter {
    /// Check if the terminal is large enough. If not, render a "too small"
    /// message and return `true` (meaning "skip normal rendering").
    pub fn render_size_guard() -> io::Result<bool> {
        let (cols, rows) = terminal::size()?;
        if cols < MIN_COLS || rows < MIN_ROWS {
            let mut out = std::io::stdout();
            execute!(out, terminal::Clear(terminal::ClearType::All), cursor::MoveTo(0, 0))?;
            let msg = format!(
                "Terminal too small ({}x{}). Resize to at least {}x{}.",
                cols, rows, MIN_COLS, MIN_ROWS
            );
            let y = rows / 2;
            let x = cols.saturating_sub(msg.len() as u16) / 2;
            queue!(out, cursor::MoveTo(x, y), SetForegroundColor(Color::Yellow))?;
            write!(out, "{}", msg)?;
            queue!(out, ResetColor)?;
            out.flush()?;
            return Ok(true);
        }
        Ok(false)
    }

    pub fn render_header(
        out: &mut impl std::io::Write,
        dashboard: &Dashboard,
        api_url: &str,
        polling: bool,
        input_mode: &InputMode,
    ) -> io::Result<()> {
        header::render_header(out, dashboard, api_url, polling, input_mode)
    }

    pub fn render_instances(dashboard: &Dashboard, cursor_index: usize) -> io::Result<()> {
        instances::render_instances(dashboard, cursor_index)
    }

    pub fn render_notifications(notifications: &NotificationQueue) -> io::Result<()> {
        notifications::render_notifications(notifications)
    }

    pub fn render_webhook_editor(editor: &WebhookEditor) -> io::Result<()> {
        webhook::render_webhook_editor(editor)
    }

    pub fn render_qr(view: &QrView) -> io::Result<()> {
        qr::render_qr(view)
    }

    pub fn render_delete_prompt(confirmation: &DeleteConfirmation, count: usize) -> io::Result<()> {
        confirmation::render_delete_prompt(confirmation, count)
    }

    pub fn render_confirmation(prompt: &str) -> io::Result<()> {
        confirmation::render_confirmation(prompt)
    }

    /// Single-line prompt for free-text input (instance names).
    pub fn render_input_prompt(label: &str, text: &str) -> io::Result<()> {
        let mut out = std::io::stdout();
        let size = terminal::size()?;
        let y = size.1.saturating_sub(3);
        queue!(out, cursor::MoveTo(0, y), SetForegroundColor(Color::White))?;
        let line = format!("  {}: {}_   (Enter: Submit | Esc: Cancel)", label, text);
        write!(out, "{:<width$}", line, width = size.0 as usize)?;
        queue!(out, ResetColor)?;
        out.flush()?;
        Ok(())
    }
}
