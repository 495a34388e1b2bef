use std::io::{self, Write, stdout};
use crossterm::{cursor::MoveTo, queue, style::{Color, SetBackgroundColor, SetForegroundColor, SetAttribute, Attribute, ResetColor}, terminal};

use crate::modals::{expected_phrase, DeleteConfirmation};

pub fn render_confirmation(prompt: &str) -> io::Result<()> {
    let mut out = stdout();
    let size = terminal::size()?;
    let y = size.1.saturating_sub(3);
    let width = size.0 as usize;

    queue!(out, MoveTo(0, y))?;
    queue!(out, SetBackgroundColor(Color::DarkRed), SetForegroundColor(Color::White), SetAttribute(Attribute::Bold))?;
    let line = format!("  {} (y to confirm, any other key to cancel)  ", prompt);
    write!(out, "{:<width$}", line, width = width)?;
    queue!(out, ResetColor, SetAttribute(Attribute::Reset))?;
    out.flush()?;
    Ok(())
}

/// Typed-phrase prompt for deleting `count` selected instances.
pub fn render_delete_prompt(confirmation: &DeleteConfirmation, count: usize) -> io::Result<()> {
    let mut out = stdout();
    let size = terminal::size()?;
    let width = size.0 as usize;
    let y = size.1.saturating_sub(6);

    queue!(out, MoveTo(0, y))?;
    queue!(out, SetBackgroundColor(Color::DarkRed), SetForegroundColor(Color::White), SetAttribute(Attribute::Bold))?;
    let title = format!("  Delete {} instance(s)? This cannot be undone.", count);
    write!(out, "{:<width$}", title, width = width)?;
    queue!(out, SetAttribute(Attribute::Reset))?;

    queue!(out, MoveTo(0, y + 1))?;
    let hint = format!("  Type \"{}\" and press Enter (Esc to cancel)", expected_phrase(count));
    write!(out, "{:<width$}", hint, width = width)?;

    queue!(out, MoveTo(0, y + 2))?;
    let input = format!("  > {}_", confirmation.text);
    write!(out, "{:<width$}", input, width = width)?;
    queue!(out, ResetColor)?;

    if let Some(ref err) = confirmation.error {
        queue!(out, MoveTo(0, y + 3), SetForegroundColor(Color::Red))?;
        write!(out, "  {:<width$}", err, width = width.saturating_sub(2))?;
        queue!(out, ResetColor)?;
    }
    out.flush()?;
    Ok(())
}
