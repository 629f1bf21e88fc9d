use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::AppError;
use crate::notify::NotifierHandle;
use crate::platform::Platform;
use crate::storage::Store;

#[derive(Debug)]
pub enum LaunchCmd {
    OpenOldest,
}

/// Sender half plus the in-flight flag. All clones share the flag, so
/// "a browser view is already open" is visible to every caller.
#[derive(Clone)]
pub struct LauncherHandle {
    tx: mpsc::Sender<LaunchCmd>,
    busy: Arc<AtomicBool>,
}

impl LauncherHandle {
    /// Request opening the oldest record. Returns false when a view is
    /// already open or the launcher task is gone.
    pub fn request_open(&self) -> bool {
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return false;
        }
        if self.tx.try_send(LaunchCmd::OpenOldest).is_err() {
            self.busy.store(false, Ordering::SeqCst);
            return false;
        }
        true
    }
}

pub struct LauncherRx {
    pub(crate) rx: mpsc::Receiver<LaunchCmd>,
    busy: Arc<AtomicBool>,
}

pub fn channel() -> (LauncherHandle, LauncherRx) {
    let (tx, rx) = mpsc::channel(1);
    let busy = Arc::new(AtomicBool::new(false));
    (
        LauncherHandle {
            tx,
            busy: busy.clone(),
        },
        LauncherRx { rx, busy },
    )
}

/// Spawn the single-owner launcher task.
pub fn spawn(
    chan: LauncherRx,
    store: Store,
    platform: Arc<dyn Platform>,
    notifier: NotifierHandle,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(launcher_loop(chan, store, platform, notifier))
}

async fn launcher_loop(
    mut chan: LauncherRx,
    store: Store,
    platform: Arc<dyn Platform>,
    notifier: NotifierHandle,
) {
    while let Some(LaunchCmd::OpenOldest) = chan.rx.recv().await {
        match open_oldest(&store, platform.as_ref(), &notifier).await {
            Ok(Some(uri)) => debug!(%uri, "browser view closed"),
            Ok(None) => {
                debug!("activation with no pending records");
                notifier.refresh().await;
            }
            Err(e) => {
                error!(error=%e, "failed to open browser view");
                notifier.refresh().await;
            }
        }
        chan.busy.store(false, Ordering::SeqCst);
    }
    info!("launcher task stopped");
}

/// Open the oldest record: delete it, clear the displayed toast, refresh,
/// then hold until the browser view returns. Returns the opened uri, or
/// None when the store was empty.
async fn open_oldest(
    store: &Store,
    platform: &dyn Platform,
    notifier: &NotifierHandle,
) -> Result<Option<String>, AppError> {
    let records = store.all().await?;
    let Some(oldest) = records.into_iter().next() else {
        return Ok(None);
    };

    store.delete(oldest.key).await?;
    platform.clear_toast().await;
    notifier.refresh().await;

    info!(key = oldest.key, uri = %oldest.uri, "opening browser view");
    platform.open_url(&oldest.uri).await?;
    Ok(Some(oldest.uri))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify;
    use crate::platform::testing::{MockPlatform, eventually};
    use notibox_shared::api::NotificationDto;
    use std::time::Duration;

    async fn store_with(uris: &[&str]) -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        let store = Store::connect_sqlite(&path.to_string_lossy()).await.unwrap();
        let records: Vec<NotificationDto> = uris
            .iter()
            .enumerate()
            .map(|(i, uri)| NotificationDto {
                uri: uri.to_string(),
                id: i.to_string(),
            })
            .collect();
        store.insert_all(&records).await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn opens_oldest_and_refreshes() {
        let (_dir, store) = store_with(&["http://a", "http://b"]).await;
        let plat = MockPlatform::new();
        let (notifier, mut notifier_rx) = notify::channel();
        let (handle, chan) = channel();
        spawn(
            chan,
            store.clone(),
            plat.clone() as Arc<dyn Platform>,
            notifier,
        );

        assert!(handle.request_open());
        assert!(eventually(|| plat.opened.lock().unwrap().as_slice() == ["http://a"]).await);

        assert_eq!(store.count().await.unwrap(), 1);
        assert_eq!(store.all().await.unwrap()[0].uri, "http://b");
        assert!(plat.cleared.load(std::sync::atomic::Ordering::SeqCst) >= 1);
        let cmd = tokio::time::timeout(Duration::from_secs(2), notifier_rx.recv())
            .await
            .expect("no refresh sent");
        assert!(matches!(cmd, Some(notify::ToastCmd::Refresh)));

        // The view has closed, so a new activation is accepted again
        assert!(eventually(|| handle.request_open()).await);
    }

    #[tokio::test]
    async fn empty_store_just_refreshes() {
        let (_dir, store) = store_with(&[]).await;
        let plat = MockPlatform::new();
        let (notifier, mut notifier_rx) = notify::channel();
        let (handle, chan) = channel();
        spawn(
            chan,
            store.clone(),
            plat.clone() as Arc<dyn Platform>,
            notifier,
        );

        assert!(handle.request_open());
        let cmd = tokio::time::timeout(Duration::from_secs(2), notifier_rx.recv())
            .await
            .expect("no refresh sent");
        assert!(matches!(cmd, Some(notify::ToastCmd::Refresh)));
        assert!(plat.opened.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn second_activation_refused_while_view_open() {
        let (_dir, store) = store_with(&["http://a", "http://b"]).await;
        let plat = MockPlatform::new();
        plat.block_open.store(true, std::sync::atomic::Ordering::SeqCst);
        let (notifier, _notifier_rx) = notify::channel();
        let (handle, chan) = channel();
        spawn(
            chan,
            store.clone(),
            plat.clone() as Arc<dyn Platform>,
            notifier,
        );

        assert!(handle.request_open());
        assert!(eventually(|| plat.opened.lock().unwrap().len() == 1).await);
        // View still open: a second activation is refused
        assert!(!handle.request_open());

        plat.open_release.notify_one();
        assert!(eventually(|| handle.request_open()).await);
    }
}
