//! Board event monitor entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Parse configuration** — load `config.toml` (or `--config`), apply
//!    `FOCALBOARD_MONITOR_*` overrides and validate the result.
//! 2. **Wire observability** — install the JSON `tracing-subscriber` layer.
//!    All `tracing` events emitted by every crate in the workspace flow
//!    through it.
//! 3. **Construct the core** — create the one [`events::EventStore`] for the
//!    process and hand it to the webhook listener.
//! 4. **Serve until signalled** — run the listener until SIGINT/SIGTERM, then
//!    drain in-flight requests within [`SHUTDOWN_GRACE`].

mod config;
mod telemetry;

use std::{path::PathBuf, process::ExitCode, sync::Arc, time::Duration};

use anyhow::{bail, Context, Result};
use clap::Parser;
use events::EventStore;
use listener::ListenerState;
use tokio::{signal, sync::oneshot};
use tracing::{error, info, warn};

use config::Config;

/// How long in-flight requests may take to finish after a shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Command line interface entry point.
#[derive(Parser)]
#[command(
    name = "board-monitor",
    version,
    about = "Deduplicating counter for board webhook events"
)]
struct Cli {
    /// Path to the TOML configuration file. A missing file means defaults.
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logging is not up yet, so these two failures go to stderr.
    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Failed to load configuration: {err}");
            return ExitCode::FAILURE;
        }
    };
    let _telemetry = match telemetry::init(&config.log) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("Failed to initialize logger: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    match run(config).await {
        Ok(()) => {
            info!("Server exiting");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %format!("{err:#}"), "Server terminated with an error");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> Result<()> {
    info!(log_level = %config.log.level, "Configuration loaded successfully");
    if config.uses_default_token() {
        warn!(
            "Security warning: You are using the default authentication token. \
             Please change it in config.toml or via FOCALBOARD_MONITOR_AUTH_TOKEN."
        );
    }

    let address = config.socket_addr()?;
    let store = Arc::new(EventStore::new());
    let state = ListenerState::new(store, config.auth.token.as_str());

    let tcp = listener::bind(address).await?;
    info!(address = %address, "Starting server");

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let mut server = tokio::spawn(listener::serve(tcp, state, async move {
        let _ = stop_rx.await;
    }));

    tokio::select! {
        joined = &mut server => {
            joined.context("server task panicked")??;
            bail!("server stopped without a shutdown signal");
        }
        () = shutdown_signal() => {}
    }

    info!("Shutting down server");
    let _ = stop_tx.send(());
    match tokio::time::timeout(SHUTDOWN_GRACE, server).await {
        Ok(joined) => joined
            .context("server task panicked")?
            .context("server failed while draining")?,
        Err(_) => bail!("Server forced to shutdown after {SHUTDOWN_GRACE:?}"),
    }
    Ok(())
}

/// Resolves on the first SIGINT (Ctrl-C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(error = %err, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!(error = %err, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
