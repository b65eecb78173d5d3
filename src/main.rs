//! folio - Portfolio site client
//!
//! Prints the resume download link, lists projects and sends contact messages
//! using the portfolio API.

use std::process::ExitCode;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use folio::app::{App, AppError};
use folio::cli::{load_config, log_filter, Cli, Command};

/// Sets up logging on stderr; `RUST_LOG` takes precedence over `-v`
fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_filter(verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

async fn run(cli: Cli) -> Result<String, Box<dyn std::error::Error>> {
    let config = load_config(&cli)?;
    debug!("Using API at {}", config.api_base_url);
    let app = App::new(config)?;

    let output = match cli.command {
        Command::Resume { json } => {
            tokio::select! {
                result = app.resume(json) => result?,
                _ = tokio::signal::ctrl_c() => {
                    app.resolver().cancel();
                    return Err(AppError::ResumeUnavailable("Interrupted".to_string()).into());
                }
            }
        }
        Command::Projects { json, refresh } => app.projects(json, refresh).await?,
        Command::Contact(args) => app.contact(&args.into()).await?,
        Command::Cache { action } => app.cache(action)?,
    };
    Ok(output)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
