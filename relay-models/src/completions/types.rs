//! Wire-format request types shared by request factories.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64_ENGINE;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User message.
    User,
    /// Assistant response.
    Assistant,
}

/// Source of an image content block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ImageSource {
    /// Inline base64 payload.
    Base64 { media_type: String, data: String },
}

/// A typed block inside a detailed message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Image content.
    Image { source: ImageSource },
    /// Text content.
    Text { text: String },
}

impl ContentBlock {
    /// Create an image block, base64-encoding `data`.
    pub fn image(media_type: impl Into<String>, data: &[u8]) -> Self {
        Self::Image {
            source: ImageSource::Base64 {
                media_type: media_type.into(),
                data: B64_ENGINE.encode(data),
            },
        }
    }

    /// Create a text block.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }
}

/// A message as sent to the provider.
///
/// `Standard` content serializes as a plain string, `Detailed` as an
/// ordered array of typed blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireMessage {
    /// Plain text message.
    Standard { role: Role, content: String },
    /// Message made of typed content blocks.
    Detailed {
        role: Role,
        content: Vec<ContentBlock>,
    },
}

impl WireMessage {
    /// Create a standard user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::Standard {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create a standard assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Standard {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    /// Create a detailed user message.
    pub fn user_blocks(blocks: Vec<ContentBlock>) -> Self {
        Self::Detailed {
            role: Role::User,
            content: blocks,
        }
    }

    /// Role of the sender.
    pub fn role(&self) -> Role {
        match self {
            WireMessage::Standard { role, .. } | WireMessage::Detailed { role, .. } => *role,
        }
    }

    /// Text of a standard message; `None` for detailed messages.
    pub fn text(&self) -> Option<&str> {
        match self {
            WireMessage::Standard { content, .. } => Some(content),
            WireMessage::Detailed { .. } => None,
        }
    }

    /// Content blocks of a detailed message; `None` for standard messages.
    pub fn blocks(&self) -> Option<&[ContentBlock]> {
        match self {
            WireMessage::Standard { .. } => None,
            WireMessage::Detailed { content, .. } => Some(content),
        }
    }
}

/// A provider-specific completion request, ready for the transport layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireRequest {
    /// Provider model ID.
    pub model: String,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// System prompt; always sent, even when empty.
    #[serde(rename = "system", default)]
    pub system_prompt: String,
    /// Whether to stream the response.
    pub stream: bool,
    /// Conversation messages, oldest first.
    pub messages: Vec<WireMessage>,
}

impl WireRequest {
    /// Serialize to the JSON request body.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serialize to indented JSON, for display.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
