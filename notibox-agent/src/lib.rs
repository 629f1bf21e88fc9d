use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub mod cli;
pub mod config;
pub mod identity;
pub mod launcher;
pub mod notify;
pub mod platform;
pub mod poll;
pub mod storage;

pub use cli::{Cli, Command};
pub use config::{AgentConfig, load_config, resolve_config_path};

/// Database file inside the data directory.
pub const DB_FILE: &str = "links.db";
const LOG_FILE_PREFIX: &str = "notibox.log";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),
    #[error("http error: {0}")]
    Http(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage error: {0}")]
    Storage(#[from] storage::StorageError),
    #[error("toast error: {0}")]
    Toast(String),
    #[error("browser error: {0}")]
    Browser(String),
}

/// Console plus daily-rotated file output. The returned guard flushes the
/// file writer and must live as long as the process.
fn init_tracing(data_dir: &std::path::Path) -> tracing_appender::non_blocking::WorkerGuard {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let file_appender = tracing_appender::rolling::daily(data_dir, LOG_FILE_PREFIX);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .compact(),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false),
        )
        .init();
    guard
}

pub async fn run(cli: Cli) -> Result<(), AppError> {
    if let Some(cmd) = &cli.command {
        match cmd {
            Command::Open => {
                // Relaunched by toast activation; the resident agent reacts
                // to the action itself, so this process has nothing to do.
                return Ok(());
            }
            Command::Ident => {
                let plat = platform::detect_default().await?;
                let id = identity::RequestIdentity::derive(plat.as_ref());
                println!("user-hash: {}", id.user_hash);
                println!("device-id: {}", id.device_id);
                return Ok(());
            }
        }
    }

    let (cfg_path, cfg) = AgentConfig::find_and_load(cli.config)?;
    let data_dir = cfg.data_dir()?;
    std::fs::create_dir_all(&data_dir)?;
    let _log_guard = init_tracing(&data_dir);
    info!(path=?cfg_path, "loaded config");

    let plat = platform::detect(&cfg).await?;
    plat.initialize_process();

    let identity = identity::RequestIdentity::derive(plat.as_ref());
    info!(device_id=%identity.device_id, "derived request identity");

    let db_path = data_dir.join(DB_FILE);
    let store = storage::Store::connect_sqlite(&db_path.to_string_lossy()).await?;
    info!(path=?db_path, "database opened");

    let (notifier, notifier_rx) = notify::channel();
    let (launcher_handle, launcher_rx) = launcher::channel();
    notify::spawn(notifier_rx, store.clone(), plat.clone(), launcher_handle);
    launcher::spawn(launcher_rx, store.clone(), plat.clone(), notifier.clone());

    // Surface whatever a previous run left behind before the first tick.
    notifier.refresh().await;

    let endpoint = config::normalize_server_url(&cfg.server_url);
    let interval = cfg.poll_interval();
    info!(%endpoint, interval_secs = interval.as_secs(), "starting poll loop");

    let cancel = CancellationToken::new();
    let mut handle = tokio::spawn(poll::poll_loop(
        cancel.child_token(),
        endpoint,
        identity,
        store,
        notifier,
        interval,
    ));

    tokio::select! {
        _ = shutdown_signal() => {
            info!("shutdown signal received; requesting poll loop to stop");
            cancel.cancel();
        }
        _ = &mut handle => {
            info!("poll loop finished");
        }
    }

    // Give the loop some time to finish gracefully before the process exits.
    if !handle.is_finished() {
        let _ = tokio::time::timeout(Duration::from_secs(3), handle).await;
    }
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        let mut sigint = signal(SignalKind::interrupt()).expect("listen SIGINT");
        let mut sigterm = signal(SignalKind::terminate()).expect("listen SIGTERM");
        tokio::select! {
            _ = sigint.recv() => {
                info!("shutdown: received SIGINT");
            }
            _ = sigterm.recv() => {
                info!("shutdown: received SIGTERM");
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        info!("shutdown: received Ctrl+C");
    }
}
