#[cfg(not(target_os = "windows"))]
pub mod linux;
#[cfg(test)]
pub mod testing;
#[cfg(target_os = "windows")]
pub mod windows;

use crate::{AppError, config::AgentConfig};

use async_trait::async_trait;
use std::sync::Arc;

/// What happened to a displayed toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastOutcome {
    /// The user pressed the open action (or the toast body).
    Activated,
    /// Closed by the user or timed out without being actioned.
    Dismissed,
}

/// Cross-platform interface for the OS services the agent needs.
#[async_trait]
pub trait Platform: Send + Sync {
    /// One-time process setup hook (session bus discovery etc.).
    fn initialize_process(&self) {}

    fn machine_name(&self) -> String;
    fn user_name(&self) -> String;
    /// OS-level principal identifier: SID on Windows, numeric uid elsewhere.
    fn os_user_id(&self) -> String;
    /// Directory GUID of the current user when the machine is domain joined.
    fn domain_user_guid(&self) -> Option<String>;

    /// Show the aggregate toast and wait for the user's reaction.
    async fn show_toast(&self, count: usize) -> Result<ToastOutcome, AppError>;
    /// Remove the currently displayed toast from the notification surface.
    async fn clear_toast(&self);
    /// Open `url` in the external browser view and wait until it closes.
    async fn open_url(&self, url: &str) -> Result<(), AppError>;
}

/// Detect the current platform and return an implementation.
pub async fn detect(cfg: &AgentConfig) -> Result<Arc<dyn Platform>, AppError> {
    #[cfg(target_os = "windows")]
    {
        Ok(Arc::new(windows::WindowsPlatform::new(
            cfg.browser_cmd.clone(),
        )))
    }
    #[cfg(not(target_os = "windows"))]
    {
        Ok(Arc::new(linux::LinuxPlatform::new(cfg.browser_cmd.clone())))
    }
}

/// Platform with default settings, for commands that run without a config.
pub async fn detect_default() -> Result<Arc<dyn Platform>, AppError> {
    #[cfg(target_os = "windows")]
    {
        Ok(Arc::new(windows::WindowsPlatform::new(None)))
    }
    #[cfg(not(target_os = "windows"))]
    {
        Ok(Arc::new(linux::LinuxPlatform::new(None)))
    }
}
