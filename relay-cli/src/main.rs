use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use relay_models::auth::{CredentialVault, KeyringBackend, MemoryBackend};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use config::{ConfigLoader, RelayConfig};

#[derive(Parser)]
#[command(name = "relay", about = "Provider credentials and completion requests")]
#[command(version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Keep credentials in memory for this run instead of the system keyring
    #[arg(long, global = true)]
    ephemeral: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage configuration
    Config(commands::config::ConfigArgs),
    /// Manage provider credentials
    Credentials(commands::credentials::CredentialsArgs),
    /// Render a provider request as JSON
    Request(commands::request::RequestArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    // stdout carries command output; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Config(args) => commands::config::run(args),
        Commands::Credentials(args) => {
            let config = ConfigLoader::load()?;
            commands::credentials::run(args, open_vault(&config, cli.ephemeral)).await
        }
        Commands::Request(args) => {
            let config = ConfigLoader::load()?;
            let vault = open_vault(&config, cli.ephemeral);
            commands::request::run(args, &config, vault).await
        }
    }
}

/// Create the session's credential vault.
fn open_vault(config: &RelayConfig, ephemeral: bool) -> Arc<CredentialVault> {
    let app_id = config.credentials.service.clone();
    let vault = if ephemeral {
        CredentialVault::new(app_id, MemoryBackend::new())
    } else {
        CredentialVault::new(app_id, KeyringBackend::new())
    };

    let vault = if config.credentials.env_fallback {
        vault.with_env_fallback()
    } else {
        vault
    };
    Arc::new(vault)
}
