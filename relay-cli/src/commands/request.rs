//! Render provider wire requests.
//!
//! Builds the JSON body a transport would send, without sending it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand};
use relay_models::auth::CredentialVault;
use relay_models::completions::{ServiceType, factory_for};
use relay_models::{ChatTurnParameters, ConversationMessage, ReferencedFile};
use tracing::{debug, warn};

use crate::config::RelayConfig;

/// Request arguments.
#[derive(Args, Debug)]
pub struct RequestArgs {
    /// Provider service (e.g., anthropic, openai)
    #[arg(long, default_value = "anthropic")]
    pub service: ServiceType,

    #[command(subcommand)]
    pub command: RequestCommands,
}

/// Request subcommands.
#[derive(Subcommand, Debug)]
pub enum RequestCommands {
    /// Build a chat request for a turn with optional history, image and files
    Chat(ChatArgs),
    /// Build a single-message completion request
    Basic(BasicArgs),
}

#[derive(Args, Debug)]
pub struct ChatArgs {
    /// Prompt for this turn
    #[arg(long)]
    pub prompt: String,

    /// JSON file with earlier turns: [{"prompt": "...", "response": "..."}]
    #[arg(long)]
    pub history: Option<PathBuf>,

    /// Image to attach
    #[arg(long)]
    pub image: Option<PathBuf>,

    /// Image media type (guessed from the extension when omitted)
    #[arg(long, requires = "image")]
    pub media_type: Option<String>,

    /// File to reference in the prompt (repeatable)
    #[arg(long = "file")]
    pub files: Vec<PathBuf>,

    /// Output limit for this turn
    #[arg(long)]
    pub max_tokens: Option<u32>,
}

#[derive(Args, Debug)]
pub struct BasicArgs {
    /// System prompt (defaults to the configured persona)
    #[arg(long)]
    pub system: Option<String>,

    /// User prompt
    #[arg(long)]
    pub prompt: String,

    /// Output limit (defaults to completion.max_tokens)
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Request a non-streaming response
    #[arg(long)]
    pub no_stream: bool,
}

/// Run request command.
pub async fn run(
    args: RequestArgs,
    config: &RelayConfig,
    vault: Arc<CredentialVault>,
) -> Result<()> {
    let factory = factory_for(
        args.service,
        &config.provider_settings(),
        Arc::new(config.persona.system_prompt.clone()),
    )?;

    let key = args.service.credential_key();
    match vault.get_in_background(key).await {
        Ok(Some(_)) => debug!(key = %key, "credential available"),
        Ok(None) => warn!(key = %key, "credential not set, the provider will reject this request"),
        Err(e) => warn!(key = %key, error = %e, "could not check credential"),
    }

    let request = match args.command {
        RequestCommands::Chat(chat) => factory.create_chat_request(&chat_params(chat)?)?,
        RequestCommands::Basic(basic) => factory.create_basic_completion_request(
            basic
                .system
                .as_deref()
                .unwrap_or(&config.persona.system_prompt),
            &basic.prompt,
            basic.max_tokens.unwrap_or(config.completion.max_tokens),
            !basic.no_stream,
        )?,
    };

    println!("{}", request.to_json_pretty()?);
    Ok(())
}

/// Assemble turn parameters from command-line arguments.
fn chat_params(args: ChatArgs) -> Result<ChatTurnParameters> {
    let mut params = ChatTurnParameters::new(args.prompt);

    if let Some(path) = &args.history {
        params = params.history(load_history(path)?);
    }

    if let Some(path) = &args.image {
        let media_type = match args.media_type {
            Some(media_type) => media_type,
            None => match media_type_for(path) {
                Some(guessed) => guessed.to_string(),
                None => bail!(
                    "Cannot tell the media type of {}; pass --media-type",
                    path.display()
                ),
            },
        };
        let data = std::fs::read(path)
            .with_context(|| format!("Failed to read image {}", path.display()))?;
        params = params.image(media_type, data);
    }

    let files = args
        .files
        .iter()
        .map(|path| {
            ReferencedFile::from_path(path)
                .with_context(|| format!("Failed to read {}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;
    params = params.referenced_files(files);

    if let Some(max_tokens) = args.max_tokens {
        params = params.max_tokens(max_tokens);
    }

    Ok(params)
}

fn load_history(path: &Path) -> Result<Vec<ConversationMessage>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read history {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Invalid history in {}", path.display()))
}

/// Media type for common image extensions.
fn media_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}
