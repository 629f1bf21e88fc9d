use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::AppError;
use crate::launcher::LauncherHandle;
use crate::platform::{Platform, ToastOutcome};
use crate::storage::Store;

#[derive(Debug)]
pub enum ToastCmd {
    /// Recompute the aggregate count and re-render the toast.
    Refresh,
}

#[derive(Clone)]
pub struct NotifierHandle {
    tx: mpsc::Sender<ToastCmd>,
}

impl NotifierHandle {
    pub async fn refresh(&self) {
        if self.tx.send(ToastCmd::Refresh).await.is_err() {
            warn!("notifier task gone; refresh dropped");
        }
    }
}

pub fn channel() -> (NotifierHandle, mpsc::Receiver<ToastCmd>) {
    let (tx, rx) = mpsc::channel(16);
    (NotifierHandle { tx }, rx)
}

/// Spawn the single-owner notifier task; all toast state lives inside it.
pub fn spawn(
    rx: mpsc::Receiver<ToastCmd>,
    store: Store,
    platform: Arc<dyn Platform>,
    launcher: LauncherHandle,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(notifier_loop(rx, store, platform, launcher))
}

async fn notifier_loop(
    mut rx: mpsc::Receiver<ToastCmd>,
    store: Store,
    platform: Arc<dyn Platform>,
    launcher: LauncherHandle,
) {
    // Outcomes come back tagged with the generation of the toast that
    // produced them; anything older than the current generation belongs to a
    // toast we already replaced and is dropped.
    let (out_tx, mut out_rx) = mpsc::channel::<(u64, Result<ToastOutcome, AppError>)>(4);
    let mut generation: u64 = 0;
    let mut current: Option<tokio::task::JoinHandle<()>> = None;

    loop {
        tokio::select! {
            cmd = rx.recv() => match cmd {
                Some(ToastCmd::Refresh) => {
                    generation += 1;
                    show_current(&store, &platform, &out_tx, generation, &mut current).await;
                }
                None => break,
            },
            Some((seen, outcome)) = out_rx.recv() => {
                if seen != generation {
                    debug!(seen, generation, "stale toast outcome dropped");
                    continue;
                }
                match outcome {
                    Ok(ToastOutcome::Activated) => {
                        if !launcher.request_open() {
                            debug!("browser view already open; re-showing toast");
                            generation += 1;
                            show_current(&store, &platform, &out_tx, generation, &mut current).await;
                        }
                    }
                    Ok(ToastOutcome::Dismissed) => {
                        debug!("toast dismissed by user; re-showing");
                        generation += 1;
                        show_current(&store, &platform, &out_tx, generation, &mut current).await;
                    }
                    Err(e) => warn!(error=%e, "failed to show toast"),
                }
            }
        }
    }
    if let Some(h) = current.take() {
        h.abort();
    }
    info!("notifier task stopped");
}

/// Read the aggregate count and render the toast for it, replacing whatever
/// toast is currently pending. An empty store means idle: no toast at all.
async fn show_current(
    store: &Store,
    platform: &Arc<dyn Platform>,
    out_tx: &mpsc::Sender<(u64, Result<ToastOutcome, AppError>)>,
    generation: u64,
    current: &mut Option<tokio::task::JoinHandle<()>>,
) {
    if let Some(h) = current.take() {
        // Withdraw interest in the previous toast before replacing it, so
        // its dismissal can never fire a second re-show.
        h.abort();
    }

    let count = match store.count().await {
        Ok(n) => n,
        Err(e) => {
            error!(error=%e, "failed to read store count");
            return;
        }
    };
    if count == 0 {
        info!("no pending notifications");
        return;
    }

    info!(count, "showing aggregate toast");
    let platform = platform.clone();
    let out_tx = out_tx.clone();
    *current = Some(tokio::spawn(async move {
        let outcome = platform.show_toast(count as usize).await;
        let _ = out_tx.send((generation, outcome)).await;
    }));
}
