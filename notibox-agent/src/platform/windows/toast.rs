use tauri_winrt_notification::{Duration as ToastDuration, Toast};
use tracing::debug;

use crate::AppError;
use crate::platform::ToastOutcome;

pub struct Toaster;

impl Default for Toaster {
    fn default() -> Self {
        Self::new()
    }
}

impl Toaster {
    pub fn new() -> Self {
        Self
    }

    pub async fn show(&self, count: usize) -> Result<ToastOutcome, AppError> {
        let summary = format!("You have {count} notifications");
        debug!(count, "show: building toast");
        tokio::task::spawn_blocking(move || {
            Toast::new(Toast::POWERSHELL_APP_ID)
                .title(&summary)
                .text1("Open to read the oldest one.")
                .duration(ToastDuration::Long)
                .show()
                .map_err(|e| AppError::Toast(e.to_string()))
        })
        .await
        .map_err(|e| AppError::Toast(e.to_string()))??;
        // Activation round-trips are not wired on this backend; the toast is
        // display-only and the wait ends when the next refresh supersedes it.
        std::future::pending().await
    }

    pub async fn clear(&self) {
        debug!("clear: toast history removal not available on this backend");
    }
}
