use notify_rust::{Notification, Timeout, Urgency};
use tracing::debug;

use crate::AppError;
use crate::platform::ToastOutcome;

const APP_NAME: &str = "notibox";

// Stable id so each show replaces the previous toast instead of stacking.
const REPLACE_ID: u32 = 2101;

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

    /// Display the aggregate toast and wait for the user's reaction.
    pub async fn show(&self, count: usize) -> Result<ToastOutcome, AppError> {
        debug!(count, replace_id = REPLACE_ID, "show: building notification");
        tokio::task::spawn_blocking(move || -> Result<ToastOutcome, AppError> {
            let mut n = Notification::new();
            let handle = n
                .appname(APP_NAME)
                .summary(&format!("You have {count} notifications"))
                .body("Open to read the oldest one.")
                .id(REPLACE_ID)
                .action("default", "Open")
                .action("open", "Open")
                .urgency(Urgency::Normal)
                .timeout(Timeout::Never)
                .show()
                .map_err(|e| AppError::Toast(e.to_string()))?;

            let mut outcome = ToastOutcome::Dismissed;
            // Parks this blocking thread until the session bus reports an
            // action invocation or the toast going away ("__closed").
            handle.wait_for_action(|action| {
                debug!(action, "toast resolved");
                if matches!(action, "open" | "default") {
                    outcome = ToastOutcome::Activated;
                }
            });
            Ok(outcome)
        })
        .await
        .map_err(|e| AppError::Toast(e.to_string()))?
    }

    /// Drop the visible toast by replacing it with one that expires at once;
    /// the daemon offers no direct close for a toast we no longer hold.
    pub async fn clear(&self) {
        let joined = tokio::task::spawn_blocking(|| {
            let mut n = Notification::new();
            n.appname(APP_NAME)
                .summary("Notifications")
                .id(REPLACE_ID)
                .urgency(Urgency::Low)
                .timeout(Timeout::Milliseconds(1))
                .show()
                .map(|_| ())
        })
        .await;
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!(error=%e, "clear: notification daemon refused replacement"),
            Err(e) => debug!(error=%e, "clear: blocking task failed"),
        }
    }
}
