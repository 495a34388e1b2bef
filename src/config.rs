//! Command-line / environment configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "fleetdash",
    version,
    about = "Terminal dashboard for a fleet of messaging-gateway instances"
)]
pub struct Args {
    /// Base URL of the instance-management API.
    #[arg(long, env = "EVOLUTION_API_URL", default_value = "http://localhost:8080")]
    pub api_url: String,

    /// API key sent as the `apikey` header.
    #[arg(long, env = "EVOLUTION_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Seconds between connection-state polls.
    #[arg(long, default_value_t = 30)]
    pub poll_interval: u64,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = 15)]
    pub request_timeout: u64,

    /// Log file path (defaults to a daily file in the temp directory).
    #[arg(long, env = "FLEETDASH_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Log level when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Args {
    pub fn validate(&self) -> Result<(), String> {
        let url = self.api_url.trim().to_lowercase();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(format!("--api-url must be an http(s) URL, got '{}'", self.api_url));
        }
        if self.poll_interval == 0 {
            return Err("--poll-interval must be at least 1 second".to_string());
        }
        if self.request_timeout == 0 {
            return Err("--request-timeout must be at least 1 second".to_string());
        }
        Ok(())
    }
}

/// Resolved timings for the engine.
#[derive(Clone, Debug)]
pub struct Settings {
    pub api_url: String,
    pub api_key: Option<String>,
    pub request_timeout: Duration,
    pub poll_interval: Duration,
    pub reset_revert: Duration,
    pub notification_ttl: Duration,
    pub message_ttl: Duration,
    pub reconcile_delay: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8080".to_string(),
            api_key: None,
            request_timeout: Duration::from_secs(15),
            poll_interval: Duration::from_secs(30),
            reset_revert: Duration::from_secs(3),
            notification_ttl: Duration::from_secs(3),
            message_ttl: Duration::from_secs(3),
            reconcile_delay: Duration::from_millis(500),
        }
    }
}

impl Settings {
    pub fn from_args(args: &Args) -> Self {
        Self {
            api_url: args.api_url.trim().to_string(),
            api_key: args.api_key.clone().filter(|k| !k.is_empty()),
            request_timeout: Duration::from_secs(args.request_timeout),
            poll_interval: Duration::from_secs(args.poll_interval),
            ..Default::default()
        }
    }
}
