use std::io::{self, Write, stdout};
use crossterm::{cursor::MoveTo, queue, style::{Color, SetForegroundColor, ResetColor}, terminal};

use crate::model::Severity;
use crate::notifications::NotificationQueue;
use super::shared::truncate_str;

const MAX_SHOWN: usize = 5;
const BOX_WIDTH: usize = 48;

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Success => Color::Green,
        Severity::Error => Color::Red,
        Severity::Info => Color::Cyan,
    }
}

/// Newest notifications stacked in the top-right corner, oldest first.
pub fn render_notifications(notifications: &NotificationQueue) -> io::Result<()> {
    if notifications.is_empty() {
        return Ok(());
    }
    let mut out = stdout();
    let size = terminal::size()?;
    let col = (size.0 as usize).saturating_sub(BOX_WIDTH + 1) as u16;

    let skip = notifications.len().saturating_sub(MAX_SHOWN);
    for (i, n) in notifications.iter().skip(skip).enumerate() {
        queue!(out, MoveTo(col, 3 + i as u16), SetForegroundColor(severity_color(n.severity)))?;
        write!(out, "{:<width$}", truncate_str(&format!("● {}", n.message), BOX_WIDTH), width = BOX_WIDTH)?;
        queue!(out, ResetColor)?;
    }
    out.flush()?;
    Ok(())
}
