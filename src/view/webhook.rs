use std::io::{self, Write, stdout};
use crossterm::{cursor::MoveTo, queue, style::{Color, SetBackgroundColor, SetForegroundColor, ResetColor}, terminal};

use crate::webhook_editor::WebhookEditor;

/// Inline editor line plus any error or success message.
pub fn render_webhook_editor(editor: &WebhookEditor) -> io::Result<()> {
    let mut out = stdout();
    let size = terminal::size()?;
    let width = size.0 as usize;
    let y = size.1.saturating_sub(5);

    if let (Some(instance), Some(draft)) = (editor.editing_instance(), editor.draft()) {
        queue!(out, MoveTo(0, y), SetBackgroundColor(Color::DarkBlue), SetForegroundColor(Color::White))?;
        let label = if editor.is_saving() { "saving..." } else { "Enter: Save | Esc: Cancel" };
        let line = format!("  Webhook for {}: {}_   ({})", instance, draft, label);
        write!(out, "{:<width$}", line, width = width)?;
        queue!(out, ResetColor)?;
    }
    if let Some(ref err) = editor.error {
        queue!(out, MoveTo(0, y + 1), SetForegroundColor(Color::Red))?;
        write!(out, "  {}", err)?;
        queue!(out, ResetColor)?;
    }
    if let Some(ref msg) = editor.success {
        queue!(out, MoveTo(0, y + 1), SetForegroundColor(Color::Green))?;
        write!(out, "  {}", msg.text)?;
        queue!(out, ResetColor)?;
    }
    out.flush()?;
    Ok(())
}
