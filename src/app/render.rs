use std::io;

use crossterm::{execute, cursor::MoveTo, terminal::Clear, terminal::ClearType};

use crate::model::InputMode;
use crate::view::Presenter;

use super::App;

pub fn render(app: &App) -> io::Result<()> {
    let mut out = io::stdout();
    let dashboard = &app.fleet.dashboard;

    execute!(out, Clear(ClearType::All), MoveTo(0, 0))?;
    Presenter::render_header(
        &mut out,
        dashboard,
        &app.api_url,
        app.fleet.is_polling(),
        &app.input_mode,
    )?;
    Presenter::render_instances(dashboard, app.cursor)?;
    Presenter::render_notifications(&dashboard.notifications)?;

    if dashboard.delete_confirmation.open {
        Presenter::render_delete_prompt(&dashboard.delete_confirmation, dashboard.selection.len())?;
    } else if dashboard.qr_view.is_open() {
        Presenter::render_qr(&dashboard.qr_view)?;
    } else if dashboard.webhook_editor.is_editing()
        || dashboard.webhook_editor.error.is_some()
        || dashboard.webhook_editor.success.is_some()
    {
        Presenter::render_webhook_editor(&dashboard.webhook_editor)?;
    }

    if let InputMode::CreateNames(ref text) = app.input_mode {
        Presenter::render_input_prompt("New instance names (comma-separated)", text)?;
    }

    if let Some(ref pa) = app.pending_action {
        Presenter::render_confirmation(&pa.description)?;
    }

    Ok(())
}
