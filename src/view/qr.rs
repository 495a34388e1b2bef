use std::io::{self, Write, stdout};
use crossterm::{cursor::MoveTo, queue, style::{Color, SetForegroundColor, ResetColor, SetAttribute, Attribute}, terminal};

use crate::modals::QrView;
use super::shared::truncate_str;

/// Lines describing the QR view. Image payloads are summarized since they cannot
/// be drawn in a terminal; raw codes are shown as-is.
pub fn qr_lines(view: &QrView) -> Vec<String> {
    match view {
        QrView::Closed => Vec::new(),
        QrView::Loading(name) => vec![
            format!("QR code for {}", name),
            "Loading...".to_string(),
        ],
        QrView::Failed(name, message) => vec![
            format!("QR code for {}", name),
            format!("Error: {}", message),
        ],
        QrView::Ready(name, qr) => {
            let mut lines = vec![format!("QR code for {}", name)];
            if qr.payload.starts_with("data:image") {
                lines.push(format!("Image payload received ({} bytes)", qr.payload.len()));
            } else {
                lines.push(format!("Code: {}", qr.payload));
            }
            if let Some(ref code) = qr.pairing_code {
                lines.push(format!("Pairing code: {}", code));
            }
            lines
        }
    }
}

pub fn render_qr(view: &QrView) -> io::Result<()> {
    let lines = qr_lines(view);
    if lines.is_empty() {
        return Ok(());
    }
    let mut out = stdout();
    let size = terminal::size()?;
    let width = (size.0 as usize).saturating_sub(4);
    let y = size.1.saturating_sub(lines.len() as u16 + 4);

    for (i, line) in lines.iter().enumerate() {
        queue!(out, MoveTo(2, y + i as u16))?;
        if i == 0 {
            queue!(out, SetAttribute(Attribute::Bold))?;
        }
        queue!(out, SetForegroundColor(Color::Cyan))?;
        write!(out, "{:<width$}", truncate_str(line, width), width = width)?;
        queue!(out, ResetColor, SetAttribute(Attribute::Reset))?;
    }
    queue!(out, MoveTo(2, y + lines.len() as u16), SetForegroundColor(Color::DarkGrey))?;
    write!(out, "Esc: Close")?;
    queue!(out, ResetColor)?;
    out.flush()?;
    Ok(())
}
