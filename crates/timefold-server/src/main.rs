//! timefold-server — the Timefold service binary.
//!
//! Startup sequence:
//!   1. Open (or initialise) the state database
//!   2. Start the background unlock worker
//!   3. Serve the HTTP API
//!   4. On SIGINT: stop accepting requests, wait for the in-flight sweep,
//!      flush the store

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use timefold_api::AppState;
use timefold_core::clock::{Clock, SystemClock};
use timefold_service::Settings;
use timefold_store::Store;
use timefold_unlock::{LogNotifier, UnlockService, UnlockWorker};

#[derive(Parser, Debug)]
#[command(
    name = "timefold-server",
    version,
    about = "Timefold — time-locked letters that open on schedule"
)]
struct Args {
    /// Directory for the persistent state database.
    #[arg(long, default_value = "~/.timefold/data")]
    data_dir: PathBuf,

    /// HTTP listen address.
    #[arg(long, default_value = "127.0.0.1:8080")]
    http_addr: SocketAddr,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,timefold=debug".parse().unwrap()),
        )
        .init();

    let args = Args::parse();
    let settings = Settings::from_env();
    info!("Timefold server starting");

    // ── State database ────────────────────────────────────────────────────────
    let data_dir = expand_tilde(&args.data_dir);
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("creating data dir {}", data_dir.display()))?;
    let store = Arc::new(Store::open(&data_dir).context("opening state database")?);

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // ── Unlock worker ─────────────────────────────────────────────────────────
    let unlock = Arc::new(UnlockService::new(
        Arc::clone(&store),
        Arc::clone(&clock),
        Arc::new(LogNotifier),
        settings.unlock_windows(),
    ));
    let mut worker = UnlockWorker::new(unlock, settings.worker_check_interval_seconds);
    worker.start();

    // ── HTTP API ──────────────────────────────────────────────────────────────
    let app_state = AppState::new(Arc::clone(&store), clock, settings);
    let listener = tokio::net::TcpListener::bind(args.http_addr)
        .await
        .with_context(|| format!("binding {}", args.http_addr))?;

    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
        info!("shutdown signal received");
    };
    timefold_api::server::serve(listener, app_state, shutdown)
        .await
        .context("serving HTTP API")?;

    // ── Graceful teardown ─────────────────────────────────────────────────────
    worker.stop().await;
    store.flush().context("flushing state database")?;
    info!("Timefold server stopped");
    Ok(())
}

/// Expand a leading `~` to the user's home directory (`HOME` or `USERPROFILE`).
fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Ok(home) = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE")) {
            return PathBuf::from(home).join(stripped);
        }
    }
    path.to_path_buf()
}
