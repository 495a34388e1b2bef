use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use anyhow::{bail, Context};
use clap::Parser;
use signal_hook::consts::{SIGINT, SIGTERM};
use tracing::info;

use fleetdash::app;
use fleetdash::config::{Args, Settings};
use fleetdash::gateway::{GatewayApi, HttpGateway};
use fleetdash::logging;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if let Err(msg) = args.validate() {
        bail!(msg);
    }
    let _log_guard = logging::init(&args).context("failed to initialize logging")?;
    let settings = Settings::from_args(&args);
    info!(api_url = %settings.api_url, poll_interval = ?settings.poll_interval, "starting fleetdash");

    let should_quit = Arc::new(AtomicBool::new(false));
    for signal in [SIGINT, SIGTERM] {
        signal_hook::flag::register(signal, Arc::clone(&should_quit))
            .context("failed to register signal handler")?;
    }

    let rt = Arc::new(
        tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .worker_threads(2)
            .build()
            .context("failed to create tokio runtime")?,
    );
    let gateway: Arc<dyn GatewayApi> = Arc::new(HttpGateway::new(
        &settings.api_url,
        settings.api_key.clone(),
        settings.request_timeout,
    )?);

    // Leave the terminal usable if the UI panics
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        app::restore_terminal();
        default_hook(panic_info);
    }));

    app::run(should_quit, rt, gateway, &settings).context("terminal UI failed")?;
    info!("fleetdash exited");
    Ok(())
}
