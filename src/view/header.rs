use std::io::{self, Write};
use crossterm::{
    cursor, queue,
    style::{Color, SetForegroundColor, SetBackgroundColor, ResetColor},
    terminal,
};

use crate::dashboard::Dashboard;
use crate::model::InputMode;

pub fn render_header(
    out: &mut impl Write,
    dashboard: &Dashboard,
    api_url: &str,
    polling: bool,
    input_mode: &InputMode,
) -> io::Result<()> {
    write!(out, "  ")?;
    queue!(io::stdout(), SetBackgroundColor(Color::DarkBlue), SetForegroundColor(Color::White))?;
    write!(out, " Instances ({}) ", dashboard.registry.len())?;
    queue!(io::stdout(), ResetColor)?;

    if !dashboard.selection.is_empty() {
        write!(out, "  ")?;
        queue!(io::stdout(), SetForegroundColor(Color::Cyan))?;
        write!(out, "{} selected", dashboard.selection.len())?;
        queue!(io::stdout(), ResetColor)?;
    }
    if dashboard.is_loading {
        queue!(io::stdout(), SetForegroundColor(Color::Yellow))?;
        write!(out, "  loading...")?;
        queue!(io::stdout(), ResetColor)?;
    }

    // Right-align endpoint and refresh time
    let size = terminal::size()?;
    let refreshed = dashboard
        .last_refreshed
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "...".to_string());
    let poll = if polling { "polling" } else { "idle" };
    let right = format!("{} [{}] - {} ", api_url, poll, refreshed);
    let col = (size.0 as usize).saturating_sub(right.chars().count());
    queue!(io::stdout(), cursor::MoveTo(col as u16, 0))?;
    queue!(io::stdout(), SetForegroundColor(Color::DarkGrey))?;
    write!(out, "{}", right)?;
    queue!(io::stdout(), ResetColor)?;
    write!(out, "\r\n")?;

    // Search line
    let searching = *input_mode == InputMode::Search;
    if searching || !dashboard.search_query.is_empty() {
        queue!(io::stdout(), SetForegroundColor(if searching { Color::White } else { Color::DarkGrey }))?;
        write!(out, "  Search: {}{}", dashboard.search_query, if searching { "_" } else { "" })?;
        queue!(io::stdout(), ResetColor)?;
    }
    write!(out, "\r\n")?;

    let sep: String = "─".repeat(size.0 as usize);
    queue!(io::stdout(), SetForegroundColor(Color::DarkGrey))?;
    write!(out, "{}\r\n", sep)?;
    queue!(io::stdout(), ResetColor)?;

    Ok(())
}
