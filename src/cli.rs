//! Command-line interface parsing for folio
//!
//! This module handles parsing of CLI arguments using clap and turns them
//! into the settings the application starts with.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use thiserror::Error;

use crate::config::{ConfigError, SiteConfig};
use crate::data::ContactMessage;

/// Error types for CLI argument handling
#[derive(Debug, Error)]
pub enum CliError {
    /// Loading or validating the configuration failed
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// folio - Resume links, projects and contact for the portfolio site
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(about = "Portfolio site client: resume link, projects and contact form")]
#[command(version)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to a config file (defaults to ~/.config/folio/config.toml)
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Override the API base URL
    #[arg(long, value_name = "URL", env = "FOLIO_API_BASE_URL", global = true)]
    pub api_base: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the resume download link
    Resume {
        /// Print the full state as JSON
        #[arg(long)]
        json: bool,
    },
    /// List portfolio projects
    Projects {
        /// Print projects as JSON
        #[arg(long)]
        json: bool,
        /// Ignore a fresh cached list and ask the API
        #[arg(long)]
        refresh: bool,
    },
    /// Send a message through the contact form
    Contact(ContactArgs),
    /// Inspect or clear cached data
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ContactArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub subject: String,
    #[arg(long)]
    pub message: String,
}

impl From<ContactArgs> for ContactMessage {
    fn from(args: ContactArgs) -> Self {
        ContactMessage {
            name: args.name,
            email: args.email,
            subject: args.subject,
            message: args.message,
        }
    }
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheAction {
    /// Show the cached resume link and its expiry
    Show,
    /// Remove the cached resume link and project list
    Clear,
}

/// Log filter for the given `-v` count: warn, info, then debug
pub fn log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "folio=warn",
        1 => "folio=info",
        _ => "folio=debug",
    }
}

/// Loads the configuration the CLI arguments point to, applying overrides.
///
/// # Returns
/// * `Ok(SiteConfig)` - validated configuration
/// * `Err(CliError)` - the config file is missing, malformed, or invalid
pub fn load_config(cli: &Cli) -> Result<SiteConfig, CliError> {
    let mut config = SiteConfig::load_unvalidated(cli.config.as_deref())?;
    if let Some(ref base) = cli.api_base {
        config.api_base_url = base.clone();
    }
    config.validate()?;
    Ok(config)
}
