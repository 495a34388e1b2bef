// Re-export all model types from submodules.

pub use app::InputMode;
pub use instance::{ConnectionState, Instance, ResetState, StateFilter};
pub use notification::{Notification, Severity, TimedMessage};

mod app;
mod instance;
mod notification;
