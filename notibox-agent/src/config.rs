use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::AppError;

pub const ENV_CONFIG: &str = "NOTIBOX_CONFIG";

/// Poll intervals below this floor are raised to it.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Full URL of the notification poll endpoint.
    pub server_url: String,
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
    /// Optional override for the data directory (database + log file).
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// Optional override for the browser command. Example: ["firefox", "--new-window", "{url}"]
    #[serde(default)]
    pub browser_cmd: Option<Vec<String>>,
}

fn default_interval() -> u64 {
    10
}

impl AgentConfig {
    pub fn find_and_load(cli_value: Option<PathBuf>) -> Result<(PathBuf, Self), AppError> {
        let path = resolve_config_path(cli_value)?;
        let cfg = load_config(&path)?;
        Ok((path, cfg))
    }

    /// Effective poll interval: configured value clamped to the floor.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs).max(MIN_POLL_INTERVAL)
    }

    /// Directory holding the database and the rotated log file.
    pub fn data_dir(&self) -> Result<PathBuf, AppError> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        default_data_dir().ok_or_else(|| AppError::Config("could not determine data dir".into()))
    }
}

pub fn resolve_config_path(cli_value: Option<PathBuf>) -> Result<PathBuf, AppError> {
    if let Some(p) = cli_value {
        return Ok(p);
    }
    if let Ok(p) = std::env::var(ENV_CONFIG) {
        return Ok(PathBuf::from(p));
    }
    default_config_path().ok_or_else(|| AppError::Config("could not determine config dir".into()))
}

pub fn default_config_path() -> Option<PathBuf> {
    let pd = ProjectDirs::from("dev", "notibox", "notibox")?;
    Some(pd.config_dir().join("agent.yaml"))
}

pub fn default_data_dir() -> Option<PathBuf> {
    let pd = ProjectDirs::from("dev", "notibox", "notibox")?;
    Some(pd.data_dir().to_path_buf())
}

pub fn load_config(path: &PathBuf) -> Result<AgentConfig, AppError> {
    let data = std::fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("read {} failed: {e}", path.display())))?;
    let cfg: AgentConfig = serde_yaml::from_str(&data)
        .map_err(|e| AppError::Config(format!("parse {} failed: {e}", path.display())))?;
    Ok(cfg)
}

pub fn normalize_server_url(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.trim_end_matches('/').to_string()
    } else {
        format!("http://{}", trimmed.trim_end_matches('/'))
    }
}
