//! Anthropic Messages API request factory.

use std::sync::Arc;

use tracing::debug;

use super::{
    ContentBlock, FileContextProvider, ReferencedFilesContext, RequestFactory, SystemPromptSource,
    WireMessage, WireRequest, flatten_history,
};
use crate::{ChatTurnParameters, Error, Result};

/// Default Claude model.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Default output limit for chat requests.
pub const DEFAULT_MAX_TOKENS: u32 = 8192;

/// Anthropic provider settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaudeSettings {
    /// Model ID sent with every request.
    pub model: String,
    /// Output limit used when a chat turn doesn't request one.
    pub max_tokens: u32,
}

impl Default for ClaudeSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

/// Builds requests for Anthropic's Messages API.
pub struct ClaudeRequestFactory {
    settings: ClaudeSettings,
    persona: Arc<dyn SystemPromptSource>,
    file_context: Arc<dyn FileContextProvider>,
}

impl ClaudeRequestFactory {
    /// Create a factory with the default file-context provider.
    pub fn new(settings: ClaudeSettings, persona: Arc<dyn SystemPromptSource>) -> Self {
        Self {
            settings,
            persona,
            file_context: Arc::new(ReferencedFilesContext),
        }
    }

    /// Replace the file-context provider.
    pub fn with_file_context(mut self, provider: Arc<dyn FileContextProvider>) -> Self {
        self.file_context = provider;
        self
    }

    /// Settings this factory was built with.
    pub fn settings(&self) -> &ClaudeSettings {
        &self.settings
    }

    fn model(&self) -> Result<&str> {
        let model = self.settings.model.trim();
        if model.is_empty() {
            return Err(Error::request("anthropic model id is empty"));
        }
        Ok(model)
    }

    fn terminal_message(&self, params: &ChatTurnParameters) -> WireMessage {
        match params.attached_image() {
            Some((media_type, data)) => WireMessage::user_blocks(vec![
                ContentBlock::image(media_type, data),
                ContentBlock::text(params.prompt.as_str()),
            ]),
            None => WireMessage::user(self.file_context.prompt_with_files_context(params)),
        }
    }
}

fn check_max_tokens(max_tokens: u32) -> Result<u32> {
    if max_tokens == 0 {
        return Err(Error::request("max_tokens must be greater than zero"));
    }
    Ok(max_tokens)
}

impl RequestFactory for ClaudeRequestFactory {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn create_chat_request(&self, params: &ChatTurnParameters) -> Result<WireRequest> {
        let model = self.model()?;
        let max_tokens = check_max_tokens(
            params
                .max_tokens
                .filter(|&requested| requested > 0)
                .unwrap_or(self.settings.max_tokens),
        )?;

        let mut messages = flatten_history(&params.conversation_history);
        messages.push(self.terminal_message(params));

        debug!(
            model,
            max_tokens,
            messages = messages.len(),
            image = params.attached_image().is_some(),
            "built claude chat request"
        );

        Ok(WireRequest {
            model: model.to_string(),
            max_tokens,
            system_prompt: self.persona.system_prompt(),
            stream: true,
            messages,
        })
    }

    fn create_basic_completion_request(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
        stream: bool,
    ) -> Result<WireRequest> {
        let model = self.model()?;
        let max_tokens = check_max_tokens(max_tokens)?;

        debug!(model, max_tokens, stream, "built claude basic completion request");

        Ok(WireRequest {
            model: model.to_string(),
            max_tokens,
            system_prompt: system_prompt.to_string(),
            stream,
            messages: vec![WireMessage::user(user_prompt)],
        })
    }
}
