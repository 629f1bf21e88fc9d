use clap::Parser;
use notibox_agent::{Cli, run};

#[tokio::main]
async fn main() -> Result<(), notibox_agent::AppError> {
    run(Cli::parse()).await
}
