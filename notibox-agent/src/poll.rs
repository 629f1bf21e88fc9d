use std::time::Duration;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use notibox_shared::api::{NotificationDto, rest};

use crate::AppError;
use crate::identity::RequestIdentity;
use crate::notify::NotifierHandle;
use crate::storage::Store;

/// Fetch-and-store loop; one tick per interval until cancelled.
pub async fn poll_loop(
    cancel: CancellationToken,
    endpoint: String,
    identity: RequestIdentity,
    store: Store,
    notifier: NotifierHandle,
    interval: Duration,
) {
    loop {
        if cancel.is_cancelled() {
            break;
        }
        let start = std::time::Instant::now();

        match poll_tick(&endpoint, &identity, &store).await {
            Ok(true) => notifier.refresh().await,
            Ok(false) => {}
            Err(e) => error!(error=%e, "poll tick failed"),
        }

        let elapsed = start.elapsed();
        if elapsed < interval {
            tokio::select! {
                _ = cancel.cancelled() => { break; }
                _ = sleep(interval - elapsed) => {}
            }
        }
    }
    info!("poll loop stopped");
}

/// One fetch-and-store cycle. Returns whether the notifier should refresh:
/// the response carried records and the kept ones were stored.
async fn poll_tick(
    endpoint: &str,
    identity: &RequestIdentity,
    store: &Store,
) -> Result<bool, AppError> {
    let items = rest::fetch_notifications(endpoint, &identity.user_hash, &identity.device_id)
        .await
        .map_err(|e| AppError::Http(e.to_string()))?;

    let total = items.len();
    let pending: Vec<NotificationDto> = items.into_iter().filter(|i| i.has_destination()).collect();
    info!(
        total,
        empty = total - pending.len(),
        "received items from service"
    );

    if !pending.is_empty() {
        store.insert_all(&pending).await?;
    }
    Ok(total > 0)
}
