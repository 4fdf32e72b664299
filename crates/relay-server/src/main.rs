//! alert-relay - Grafana alert relay for Telegram and Discord.

use clap::Parser;
use relay_server::{RelayConfig, RelayServer};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = RelayConfig::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (json, text) = if config.log_json {
        (Some(fmt::layer().json()), None)
    } else {
        (None, Some(fmt::layer()))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(text)
        .init();

    config
        .validate()
        .inspect_err(|e| error!(error = %e, "invalid configuration"))?;

    let server = RelayServer::from_config(&config)?;

    info!(
        addr = %config.listen_addr,
        ack_window_hours = config.ack_window_hours,
        persistent = config.store_path.is_some(),
        "starting alert relay"
    );

    server.serve_with_shutdown(config.listen_addr, shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = wait_for_signal("ctrl-c", tokio::signal::ctrl_c());

    #[cfg(unix)]
    let terminate = wait_for_signal("SIGTERM", async {
        let mut signal =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
        signal.recv().await;
        Ok::<(), std::io::Error>(())
    });

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutdown signal received");
}

/// Completes when `signal` fires. A signal that cannot be listened for
/// never completes, so it cannot trigger a shutdown.
async fn wait_for_signal<F>(name: &str, signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        error!(signal = name, error = %e, "failed to listen for signal");
        std::future::pending::<()>().await;
    }
}
