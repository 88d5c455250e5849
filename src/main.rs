mod cli;

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{confirm_disclaimer, Cli};
use repo_map::pipeline;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "repo_map=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();

    if let Err(e) = pipeline::validate_root(&cli.repository_path) {
        tracing::error!("Error: {}", e);
        return Ok(ExitCode::from(1));
    }

    if !cli.yes {
        let stdin = io::stdin();
        if !confirm_disclaimer(&mut stdin.lock(), &mut io::stdout())? {
            tracing::warn!("Operation cancelled by the user.");
            return Ok(ExitCode::SUCCESS);
        }
    }

    let config = cli.to_config();
    let run = pipeline::run(&cli.repository_path, &config).await?;

    let map_name = run
        .map_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    tracing::info!("Your repo-map has been saved to '{}'.", map_name);

    Ok(ExitCode::SUCCESS)
}
