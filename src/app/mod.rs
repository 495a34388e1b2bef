mod state;
mod event_loop;
mod render;
mod input;

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, Clear, ClearType},
};
use tracing::info;

use crate::config::Settings;
use crate::fleet_controller::FleetMonitor;
use crate::gateway::GatewayApi;
use crate::model::InputMode;
use crate::view::Presenter;

pub use state::{PendingAction, PendingActionKind, clamp_cursor, state_filter_for_key};

/// Restore the terminal to normal mode. Safe to call multiple times.
pub fn restore_terminal() {
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
    let _ = disable_raw_mode();
}

/// Main application state and event loop.
pub struct App {
    pub fleet: FleetMonitor,
    pub api_url: String,
    pub cursor: usize,
    pub input_mode: InputMode,
    pub pending_action: Option<PendingAction>,
    pub last_tick: Instant,
    pub tick_rate: Duration,
}

impl App {
    pub fn new(fleet: FleetMonitor, api_url: &str) -> Self {
        let tick_rate = Duration::from_millis(250);
        Self {
            fleet,
            api_url: api_url.to_string(),
            cursor: 0,
            input_mode: InputMode::Normal,
            pending_action: None,
            last_tick: Instant::now() - tick_rate,
            tick_rate,
        }
    }

    /// Name of the instance under the cursor in the filtered list.
    pub fn cursor_instance(&self) -> Option<String> {
        self.fleet
            .dashboard
            .filtered()
            .get(self.cursor)
            .map(|i| i.name.clone())
    }

    pub fn clamp_cursor(&mut self) {
        let len = self.fleet.dashboard.filtered().len();
        self.cursor = clamp_cursor(self.cursor, len);
    }
}

/// Run the application. Sets up terminal, runs the main loop, restores terminal on exit.
pub fn run(
    should_quit: Arc<AtomicBool>,
    rt: Arc<tokio::runtime::Runtime>,
    gateway: Arc<dyn GatewayApi>,
    settings: &Settings,
) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, Clear(ClearType::All))?;

    let fleet = FleetMonitor::new(gateway, rt.handle().clone(), settings);
    let mut app = App::new(fleet, &settings.api_url);
    app.fleet.refresh();
    let mut needs_render = true;

    loop {
        if should_quit.load(Ordering::Relaxed) {
            info!("quit signal received");
            break;
        }

        let now = Instant::now();

        if app.expire_pending_action() {
            needs_render = true;
        }
        if app.poll_events() {
            needs_render = true;
        }
        if app.process_tick() {
            needs_render = true;
        }

        if needs_render {
            if Presenter::render_size_guard()? {
                needs_render = false;
                let timeout = app.tick_rate.saturating_sub(now.elapsed());
                if crossterm::event::poll(timeout.min(Duration::from_millis(100)))? {
                    let _ = crossterm::event::read()?;
                }
                continue;
            }

            render::render(&app)?;
            needs_render = false;
        }

        let timeout = app.tick_rate.saturating_sub(now.elapsed());
        if crossterm::event::poll(timeout.min(Duration::from_millis(100)))? {
            if let crossterm::event::Event::Key(key_event) = crossterm::event::read()? {
                match input::handle_key(&mut app, key_event) {
                    Some(input::InputResult::Quit) => break,
                    Some(input::InputResult::Consumed) => needs_render = true,
                    None => {}
                }
            }
        }
    }

    app.fleet.shutdown();
    restore_terminal();
    Ok(())
}
