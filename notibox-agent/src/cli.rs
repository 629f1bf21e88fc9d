use std::path::PathBuf;

use clap::{Parser, Subcommand};

const HELP_EPILOG: &str = r#"Config resolution order:
  1) --config/-c PATH
  2) $NOTIBOX_CONFIG
  3) XDG default: ~/.config/notibox/agent.yaml
"#;

#[derive(Debug, Parser)]
#[command(
    name = "notibox-agent",
    version,
    about = "Desktop agent that polls for pending notifications",
    long_about = None,
    after_long_help = HELP_EPILOG,
)]
pub struct Cli {
    /// Path to YAML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Optional subcommand. Without one, runs the agent.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the derived user hash and device id, then exit
    Ident,
    /// Toast-activation re-entry point; exits immediately
    ///
    /// The notification surface re-launches the executable with this literal
    /// argument when a toast button is pressed. The resident agent reacts to
    /// the activation itself, so this invocation has nothing to do.
    #[command(hide = true)]
    Open,
}
