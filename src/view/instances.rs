use std::io::{self, Write, stdout};
use crossterm::{cursor, queue, style::{Color, SetForegroundColor, ResetColor, SetAttribute, Attribute}};

use crate::dashboard::Dashboard;
use crate::model::{ConnectionState, Instance, ResetState};
use super::shared::{fit, truncate_str, writeln, write_colored, write_selectable};

/// First screen row of the table (below the header block).
const TABLE_TOP: u16 = 3;

fn reset_label(state: ResetState) -> &'static str {
    match state {
        ResetState::Idle => "",
        ResetState::Loading => "resetting",
        ResetState::Success => "reset ok",
        ResetState::Error => "reset err",
    }
}

fn state_color(state: Option<ConnectionState>) -> Color {
    match state {
        Some(ConnectionState::Connected) => Color::Green,
        Some(ConnectionState::Connecting) => Color::Yellow,
        Some(ConnectionState::Error) => Color::Red,
        _ => Color::DarkGrey,
    }
}

/// One table line for `instance` from the dashboard's derived maps.
pub fn format_row(instance: &Instance, dashboard: &Dashboard) -> String {
    let registry = &dashboard.registry;
    let marker = if dashboard.selection.contains(&instance.name) { "[x]" } else { "[ ]" };
    let state = registry
        .connection_state(&instance.name)
        .map(|s| s.label())
        .unwrap_or("…");
    let url = registry.webhook_url(&instance.name);
    let hook = match (url.is_empty(), registry.webhook_enabled(&instance.name)) {
        (true, _) => "-",
        (false, true) => "on",
        (false, false) => "off",
    };
    format!(
        "  {} {} {} {} {:<4} {:<10} {}",
        marker,
        fit(&instance.name, 24),
        fit(state, 13),
        fit(if url.is_empty() { "-" } else { url }, 32),
        hook,
        reset_label(registry.reset_state(&instance.name)),
        truncate_str(instance.profile_name.as_deref().unwrap_or(""), 20),
    )
}

pub fn render_instances(dashboard: &Dashboard, cursor_index: usize) -> io::Result<()> {
    let mut out = stdout();
    queue!(out, cursor::MoveTo(0, TABLE_TOP))?;

    let size = crossterm::terminal::size()?;
    let rows = dashboard.filtered();

    if let Some(ref err) = dashboard.load_error {
        write_colored(&mut out, &format!("  Error loading instances: {}", err), Color::Red)?;
    }

    if rows.is_empty() {
        writeln(&mut out, "")?;
        if dashboard.is_loading {
            writeln(&mut out, "  Loading instances...")?;
        } else if dashboard.registry.is_empty() {
            writeln(&mut out, "  No instances found. Press n to create one.")?;
        } else {
            writeln(&mut out, "  No instances match the search.")?;
        }
    } else {
        queue!(io::stdout(), SetAttribute(Attribute::Bold))?;
        write!(out, "      {:<24} {:<13} {:<32} {:<4} {:<10} {}",
            "NAME", "STATE", "WEBHOOK", "HOOK", "RESET", "PROFILE")?;
        queue!(io::stdout(), SetAttribute(Attribute::Reset))?;
        write!(out, "\r\n")?;

        // Keep the cursor row visible
        let visible = (size.1 as usize).saturating_sub(TABLE_TOP as usize + 6).max(1);
        let start = cursor_index.saturating_sub(visible - 1);

        for (idx, instance) in rows.iter().enumerate().skip(start).take(visible) {
            let line = format_row(instance, dashboard);
            if idx == cursor_index {
                write_selectable(&mut out, &line, true)?;
            } else {
                let state = dashboard.registry.connection_state(&instance.name);
                write_colored(&mut out, &line, state_color(state))?;
            }
        }
    }

    if let Some(ref msg) = dashboard.status_message {
        writeln(&mut out, "")?;
        write_colored(&mut out, &format!("  {}", msg.text), Color::Yellow)?;
    }

    let help = "q: Quit | ↑/↓: Move | Space: Select | t: Toggle | 1/2/3: By state | /: Search | g: Refresh | r/R: Reset | x/D: Delete | w/e/X: Webhook | Q: QR | n: New";
    let help_y = size.1.saturating_sub(1);
    let width = (size.0 as usize).saturating_sub(1);
    queue!(
        out,
        cursor::MoveTo(1, help_y),
        SetForegroundColor(Color::DarkGrey),
        crossterm::style::Print(format!("{:<width$}", truncate_str(help, width), width = width)),
        ResetColor
    )?;

    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::dashboard::FleetEvent;
    use crate::gateway::WebhookConfig;
    use tokio::time::Instant;

    fn dashboard_with(names: &[&str]) -> Dashboard {
        let mut d = Dashboard::new(&Settings::default());
        let generation = d.begin_refresh();
        d.apply(
            FleetEvent::InstancesLoaded {
                generation,
                result: Ok(names.iter().map(|n| Instance::new(*n)).collect()),
            },
            Instant::now(),
        );
        d
    }

    #[test]
    fn row_shows_selection_state_and_webhook() {
        let mut d = dashboard_with(&["alpha"]);
        let now = Instant::now();
        d.apply(FleetEvent::ConnectionState { name: "alpha".into(), state: ConnectionState::Connected }, now);
        d.apply(
            FleetEvent::WebhookLoaded {
                name: "alpha".into(),
                config: WebhookConfig { url: "https://x.test/hook".into(), enabled: false },
            },
            now,
        );
        d.click("alpha", false);

        let row = format_row(&d.registry.instances()[0], &d);
        assert!(row.starts_with("  [x] alpha"));
        assert!(row.contains("Connected"));
        assert!(row.contains("https://x.test/hook"));
        assert!(row.contains(" off "));
    }

    #[test]
    fn row_without_derived_data_uses_placeholders() {
        let d = dashboard_with(&["beta"]);
        let row = format_row(&d.registry.instances()[0], &d);
        assert!(row.starts_with("  [ ] beta"));
        assert!(row.contains(" - "));
    }
}
