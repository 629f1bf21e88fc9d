use std::process::Stdio;

use tokio::process::Command;
use tracing::info;

use crate::AppError;

const URL_PLACEHOLDER: &str = "{url}";

/// Open `url` with the configured viewer command and wait for it to exit.
///
/// Default is `xdg-open`, which hands off to the desktop and returns quickly;
/// a viewer that blocks until its window closes can be set via `browser_cmd`.
pub async fn open_and_wait(custom: Option<&[String]>, url: &str) -> Result<(), AppError> {
    let argv = build_argv(custom, url)?;
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| AppError::Config("browser_cmd empty".into()))?;
    info!(program=%program, %url, "running browser command");
    let status = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await?;
    if !status.success() {
        return Err(AppError::Browser(format!(
            "viewer exited with status {status}"
        )));
    }
    Ok(())
}

fn build_argv(custom: Option<&[String]>, url: &str) -> Result<Vec<String>, AppError> {
    match custom {
        Some(cmd) if !cmd.is_empty() => {
            let mut argv: Vec<String> = cmd
                .iter()
                .map(|a| a.replace(URL_PLACEHOLDER, url))
                .collect();
            // Append the url when the template never mentions it
            if !cmd.iter().any(|a| a.contains(URL_PLACEHOLDER)) {
                argv.push(url.to_string());
            }
            Ok(argv)
        }
        Some(_) => Err(AppError::Config("browser_cmd empty".into())),
        None => Ok(vec!["xdg-open".to_string(), url.to_string()]),
    }
}
