pub mod browser;
pub mod toast;

use std::path::{Path, PathBuf};

use super::{Platform, ToastOutcome};
use crate::AppError;

/// Linux implementation of the cross-platform interface.
pub struct LinuxPlatform {
    toaster: toast::Toaster,
    browser_cmd: Option<Vec<String>>,
}

impl LinuxPlatform {
    pub fn new(browser_cmd: Option<Vec<String>>) -> Self {
        Self {
            toaster: toast::Toaster::new(),
            browser_cmd,
        }
    }
}

/// Make sure DBUS_SESSION_BUS_ADDRESS is set when launched outside a desktop
/// session (systemd user unit, console), so toasts can reach the daemon.
pub fn ensure_console_dbus_env() {
    if std::env::var_os("DBUS_SESSION_BUS_ADDRESS").is_some() {
        return;
    }

    let Some(runtime_dir) = find_runtime_dir_with_bus() else {
        return;
    };

    export_runtime_dir(&runtime_dir);
    if let Some(addr) = build_bus_address(&runtime_dir) {
        // SAFETY: we provide owned UTF-8 data, so setting the process env var is fine.
        unsafe {
            std::env::set_var("DBUS_SESSION_BUS_ADDRESS", addr);
        }
    }
}

fn find_runtime_dir_with_bus() -> Option<PathBuf> {
    runtime_dir_from_env()
        .and_then(runtime_dir_if_bus_exists)
        .or_else(|| runtime_dir_if_bus_exists(default_runtime_dir()))
}

fn runtime_dir_if_bus_exists(dir: PathBuf) -> Option<PathBuf> {
    dir.join("bus").exists().then_some(dir)
}

fn runtime_dir_from_env() -> Option<PathBuf> {
    std::env::var_os("XDG_RUNTIME_DIR").map(PathBuf::from)
}

fn default_runtime_dir() -> PathBuf {
    let uid = nix::unistd::geteuid().as_raw();
    PathBuf::from(format!("/run/user/{uid}"))
}

fn export_runtime_dir(runtime: &Path) {
    if std::env::var_os("XDG_RUNTIME_DIR").is_none() {
        // SAFETY: runtime originates from a valid PathBuf and remains owned for the program lifetime.
        unsafe {
            std::env::set_var("XDG_RUNTIME_DIR", runtime.as_os_str());
        }
    }
}

fn build_bus_address(runtime: &Path) -> Option<String> {
    let bus = runtime.join("bus");
    bus.exists().then(|| format!("unix:path={}", bus.display()))
}

#[async_trait::async_trait]
impl Platform for LinuxPlatform {
    fn initialize_process(&self) {
        ensure_console_dbus_env();
    }

    fn machine_name(&self) -> String {
        nix::unistd::gethostname()
            .ok()
            .and_then(|h| h.into_string().ok())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "localhost".to_string())
    }

    fn user_name(&self) -> String {
        nix::unistd::User::from_uid(nix::unistd::getuid())
            .ok()
            .flatten()
            .map(|u| u.name)
            .or_else(|| std::env::var("USER").ok())
            .unwrap_or_else(|| "unknown".to_string())
    }

    fn os_user_id(&self) -> String {
        nix::unistd::getuid().to_string()
    }

    fn domain_user_guid(&self) -> Option<String> {
        // No directory service to consult on this platform.
        None
    }

    async fn show_toast(&self, count: usize) -> Result<ToastOutcome, AppError> {
        self.toaster.show(count).await
    }

    async fn clear_toast(&self) {
        self.toaster.clear().await;
    }

    async fn open_url(&self, url: &str) -> Result<(), AppError> {
        browser::open_and_wait(self.browser_cmd.as_deref(), url).await
    }
}
