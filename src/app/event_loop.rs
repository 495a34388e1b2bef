use std::time::Instant;

use super::App;

impl App {
    /// Expire timed dashboard state and fire delayed refreshes.
    pub fn process_tick(&mut self) -> bool {
        let now = Instant::now();
        if now.duration_since(self.last_tick) < self.tick_rate {
            return false;
        }
        self.last_tick = now;
        self.fleet.tick(tokio::time::Instant::now())
    }

    /// Fold finished gateway calls into the dashboard.
    pub fn poll_events(&mut self) -> bool {
        if self.fleet.poll_events() {
            self.clamp_cursor();
            return true;
        }
        false
    }

    /// Expire pending confirmation if timed out.
    pub fn expire_pending_action(&mut self) -> bool {
        let now = Instant::now();
        if let Some(ref pa) = self.pending_action {
            if now > pa.expires {
                self.pending_action = None;
                return true;
            }
        }
        false
    }
}
