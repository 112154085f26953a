//! Credential management commands.
//!
//! Reads and writes go through the shared [`CredentialVault`] on the
//! blocking pool, so keychain prompts never stall the runtime.

use std::sync::Arc;

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use dialoguer::{Password, theme::ColorfulTheme};
use relay_models::auth::{CredentialKey, CredentialVault};
use tracing::debug;

/// Credentials arguments.
#[derive(Args, Debug)]
pub struct CredentialsArgs {
    #[command(subcommand)]
    pub command: CredentialsCommands,
}

/// Credentials subcommands.
#[derive(Subcommand, Debug)]
pub enum CredentialsCommands {
    /// Show which credentials are set
    Status,
    /// Store a credential (prompts when --value is omitted)
    Set {
        /// Credential name (e.g., ANTHROPIC_API_KEY)
        key: CredentialKey,

        /// Secret value; avoid on shared machines since it lands in shell history
        #[arg(long)]
        value: Option<String>,
    },
    /// Delete a stored credential
    Delete {
        /// Credential name (e.g., ANTHROPIC_API_KEY)
        key: CredentialKey,
    },
}

/// Run credentials command.
pub async fn run(args: CredentialsArgs, vault: Arc<CredentialVault>) -> Result<()> {
    match args.command {
        CredentialsCommands::Status => show_status(vault).await,
        CredentialsCommands::Set { key, value } => set_credential(&vault, key, value).await,
        CredentialsCommands::Delete { key } => delete_credential(&vault, key).await,
    }
}

async fn show_status(vault: Arc<CredentialVault>) -> Result<()> {
    let status = tokio::task::spawn_blocking(move || vault.credential_status()).await??;
    println!("{}", status_table(&status));
    Ok(())
}

fn status_table(status: &[(CredentialKey, bool)]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Credential").fg(Color::Cyan),
        Cell::new("Status").fg(Color::Cyan),
    ]);

    for (key, set) in status {
        let state = if *set {
            Cell::new("set").fg(Color::Green)
        } else {
            Cell::new("not set").fg(Color::DarkGrey)
        };
        table.add_row(vec![Cell::new(key.name()), state]);
    }

    table
}

async fn set_credential(
    vault: &Arc<CredentialVault>,
    key: CredentialKey,
    value: Option<String>,
) -> Result<()> {
    let secret = match value {
        Some(value) => value,
        None => Password::with_theme(&ColorfulTheme::default())
            .with_prompt(key.name())
            .interact()?,
    };

    let secret = secret.trim().to_string();
    if secret.is_empty() {
        bail!("Empty value for {key}; use `relay credentials delete {key}` to remove it");
    }

    vault.set_in_background(key, Some(secret)).await?;
    debug!(key = %key, "credential stored");
    println!("Stored {key}");
    Ok(())
}

async fn delete_credential(vault: &Arc<CredentialVault>, key: CredentialKey) -> Result<()> {
    if vault.get_in_background(key).await?.is_none() {
        println!("{key} is not set");
        return Ok(());
    }

    vault.delete_in_background(key).await?;
    println!("Deleted {key}");
    Ok(())
}
