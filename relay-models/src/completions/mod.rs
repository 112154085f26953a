//! Provider request factories.
//!
//! A [`RequestFactory`] turns the conversation model into a provider-specific
//! [`WireRequest`]. Factories perform no I/O: model and token limits come
//! from provider settings, the system prompt from a [`SystemPromptSource`],
//! and prompt augmentation from a [`FileContextProvider`].
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use relay_models::ChatTurnParameters;
//! use relay_models::completions::{factory_for, ProviderSettings, ServiceType};
//!
//! let factory = factory_for(
//!     ServiceType::Anthropic,
//!     &ProviderSettings::default(),
//!     Arc::new("You are a helpful assistant."),
//! )?;
//!
//! let request = factory.create_chat_request(&ChatTurnParameters::new("Hello!"))?;
//! println!("{}", request.to_json()?);
//! ```

mod claude;
mod context;
mod types;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub use claude::{ClaudeRequestFactory, ClaudeSettings, DEFAULT_MAX_TOKENS, DEFAULT_MODEL};
pub use context::ReferencedFilesContext;
pub use types::*;

use crate::auth::CredentialKey;
use crate::{ChatTurnParameters, ConversationMessage, Error, Result};

/// Builds provider-specific wire requests.
///
/// Implementations must be deterministic given the same parameters and
/// collaborator state, and must never block.
///
/// # Required Methods
///
/// - [`name`](RequestFactory::name) - Provider identifier (e.g., "anthropic")
/// - [`create_chat_request`](RequestFactory::create_chat_request) - Chat turn with history
/// - [`create_basic_completion_request`](RequestFactory::create_basic_completion_request) -
///   Single-shot completion without history
pub trait RequestFactory: Send + Sync {
    /// Returns the provider name.
    fn name(&self) -> &str;

    /// Build a streaming chat request for the in-flight turn.
    ///
    /// Answered history turns become alternating user/assistant messages,
    /// followed by exactly one terminal user message for `params.prompt`.
    fn create_chat_request(&self, params: &ChatTurnParameters) -> Result<WireRequest>;

    /// Build a request with a single user message, ignoring any history.
    fn create_basic_completion_request(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
        stream: bool,
    ) -> Result<WireRequest>;
}

/// Supplies the current persona system prompt.
pub trait SystemPromptSource: Send + Sync {
    fn system_prompt(&self) -> String;
}

impl SystemPromptSource for String {
    fn system_prompt(&self) -> String {
        self.clone()
    }
}

impl SystemPromptSource for &'static str {
    fn system_prompt(&self) -> String {
        (*self).to_string()
    }
}

/// Augments a turn's prompt with context from files the user referenced.
pub trait FileContextProvider: Send + Sync {
    fn prompt_with_files_context(&self, params: &ChatTurnParameters) -> String;
}

/// Flatten history into alternating user/assistant messages.
///
/// Turns without a non-empty response are skipped; order is preserved.
pub fn flatten_history(history: &[ConversationMessage]) -> Vec<WireMessage> {
    history
        .iter()
        .filter_map(|message| message.answer().map(|answer| (&message.prompt, answer)))
        .flat_map(|(prompt, answer)| {
            [
                WireMessage::user(prompt.as_str()),
                WireMessage::assistant(answer),
            ]
        })
        .collect()
}

/// Identifier of an LLM provider service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceType {
    CodeGpt,
    OpenAi,
    CustomOpenAi,
    Anthropic,
    Azure,
    LlamaCpp,
    Google,
    Ollama,
}

impl ServiceType {
    /// Every service, in selection order.
    pub const ALL: [ServiceType; 8] = [
        ServiceType::CodeGpt,
        ServiceType::OpenAi,
        ServiceType::CustomOpenAi,
        ServiceType::Anthropic,
        ServiceType::Azure,
        ServiceType::LlamaCpp,
        ServiceType::Google,
        ServiceType::Ollama,
    ];

    /// Runtime identifier used in configuration and on the command line.
    pub const fn id(self) -> &'static str {
        match self {
            ServiceType::CodeGpt => "codegpt",
            ServiceType::OpenAi => "openai",
            ServiceType::CustomOpenAi => "custom_openai",
            ServiceType::Anthropic => "anthropic",
            ServiceType::Azure => "azure",
            ServiceType::LlamaCpp => "llama_cpp",
            ServiceType::Google => "google",
            ServiceType::Ollama => "ollama",
        }
    }

    /// The credential that authenticates requests to this service.
    pub const fn credential_key(self) -> CredentialKey {
        match self {
            ServiceType::CodeGpt => CredentialKey::CodeGpt,
            ServiceType::OpenAi => CredentialKey::OpenAi,
            ServiceType::CustomOpenAi => CredentialKey::CustomService,
            ServiceType::Anthropic => CredentialKey::Anthropic,
            ServiceType::Azure => CredentialKey::AzureOpenAi,
            ServiceType::LlamaCpp => CredentialKey::Llama,
            ServiceType::Google => CredentialKey::Google,
            ServiceType::Ollama => CredentialKey::Ollama,
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ServiceType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let id = s.trim();
        ServiceType::ALL
            .into_iter()
            .find(|service| service.id().eq_ignore_ascii_case(id))
            .ok_or_else(|| Error::request(format!("unknown service '{id}'")))
    }
}

/// Settings for every provider that has a request factory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderSettings {
    pub anthropic: ClaudeSettings,
}

/// Select the request factory for `service`.
///
/// Fails with [`Error::RequestConstruction`] when no factory exists for the
/// service.
pub fn factory_for(
    service: ServiceType,
    settings: &ProviderSettings,
    persona: Arc<dyn SystemPromptSource>,
) -> Result<Box<dyn RequestFactory>> {
    match service {
        ServiceType::Anthropic => Ok(Box::new(ClaudeRequestFactory::new(
            settings.anthropic.clone(),
            persona,
        ))),
        other => Err(Error::request(format!(
            "no request factory for service '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flatten_skips_unanswered_turns_in_order() {
        let history = vec![
            ConversationMessage::answered("p1", "r1"),
            ConversationMessage::new("p2"),
            ConversationMessage::answered("p3", ""),
            ConversationMessage::answered("p4", "r4"),
        ];

        let messages = flatten_history(&history);

        assert_eq!(
            messages,
            vec![
                WireMessage::user("p1"),
                WireMessage::assistant("r1"),
                WireMessage::user("p4"),
                WireMessage::assistant("r4"),
            ]
        );
    }

    #[test]
    fn flatten_empty_history_is_empty() {
        assert!(flatten_history(&[]).is_empty());
    }

    #[test]
    fn service_ids_round_trip_through_parse() {
        for service in ServiceType::ALL {
            assert_eq!(service.id().parse::<ServiceType>().unwrap(), service);
        }
        assert_eq!(
            " Anthropic ".parse::<ServiceType>().unwrap(),
            ServiceType::Anthropic
        );
    }

    #[test]
    fn unknown_service_fails_to_parse() {
        let err = "groq".parse::<ServiceType>().unwrap_err();
        assert!(matches!(err, Error::RequestConstruction(_)));
    }

    #[test]
    fn services_map_to_credentials() {
        assert_eq!(
            ServiceType::Anthropic.credential_key(),
            CredentialKey::Anthropic
        );
        assert_eq!(
            ServiceType::CustomOpenAi.credential_key(),
            CredentialKey::CustomService
        );
        assert_eq!(ServiceType::Azure.credential_key(), CredentialKey::AzureOpenAi);
        assert_eq!(ServiceType::LlamaCpp.credential_key(), CredentialKey::Llama);
    }

    #[test]
    fn factory_for_anthropic_is_claude() {
        let factory = factory_for(
            ServiceType::Anthropic,
            &ProviderSettings::default(),
            Arc::new("persona"),
        )
        .unwrap();
        assert_eq!(factory.name(), "anthropic");
    }

    #[test]
    fn factory_for_other_services_fails() {
        for service in ServiceType::ALL
            .into_iter()
            .filter(|s| *s != ServiceType::Anthropic)
        {
            let err = factory_for(service, &ProviderSettings::default(), Arc::new("p"))
                .err()
                .unwrap();
            assert!(matches!(err, Error::RequestConstruction(ref m) if m.contains(service.id())));
        }
    }

    #[test]
    fn string_persona_returns_itself() {
        let persona = String::from("Be terse.");
        assert_eq!(persona.system_prompt(), "Be terse.");
        assert_eq!("Be kind.".system_prompt(), "Be kind.");
    }
}
