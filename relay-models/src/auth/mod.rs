//! Credential management for provider API keys.
//!
//! Secrets live in an OS-level secure store behind the [`SecretBackend`]
//! trait. [`CredentialVault`] fronts the backend with a per-key cache so
//! each key costs at most one backend read per session, and unchanged
//! writes never reach the backend (keychain writes can prompt the user).
//!
//! # Example
//!
//! ```ignore
//! use relay_models::auth::{CredentialKey, CredentialVault, KeyringBackend};
//!
//! let vault = CredentialVault::new("relay", KeyringBackend::new());
//!
//! vault.set_credential(CredentialKey::Anthropic, Some("sk-ant-..."))?;
//! let key = vault.get_credential(CredentialKey::Anthropic)?;
//! ```

mod backend;
mod vault;

use std::fmt;
use std::str::FromStr;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::Error;

pub use backend::{KeyringBackend, MemoryBackend, SecretBackend};
pub use vault::CredentialVault;

/// A secure API key that prevents accidental logging.
///
/// The key is wrapped in `SecretString` which:
/// - Implements `Debug` as `"[REDACTED]"`
/// - Zeroizes memory on drop
/// - Requires explicit `.expose_secret()` to access the value
#[derive(Clone)]
pub struct ApiKey(SecretString);

impl ApiKey {
    /// Create a new API key from a string.
    pub fn new(key: impl Into<String>) -> Self {
        Self(SecretString::from(key.into()))
    }

    /// Expose the secret key value.
    ///
    /// Use sparingly - only when actually sending to an API.
    pub fn expose_secret(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey([REDACTED])")
    }
}

impl From<String> for ApiKey {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for ApiKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Identity of a stored credential.
///
/// The set is closed. Each variant's [`name`](CredentialKey::name) is the
/// lookup identity in the secure store and must never change, otherwise
/// previously stored secrets become unreachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CredentialKey {
    #[serde(rename = "CODEGPT_API_KEY")]
    CodeGpt,
    #[serde(rename = "OPENAI_API_KEY")]
    OpenAi,
    #[serde(rename = "CUSTOM_SERVICE_API_KEY")]
    CustomService,
    #[serde(rename = "ANTHROPIC_API_KEY")]
    Anthropic,
    #[serde(rename = "AZURE_OPENAI_API_KEY")]
    AzureOpenAi,
    #[serde(rename = "AZURE_ACTIVE_DIRECTORY_TOKEN")]
    AzureActiveDirectoryToken,
    #[serde(rename = "LLAMA_API_KEY")]
    Llama,
    #[serde(rename = "GOOGLE_API_KEY")]
    Google,
    #[serde(rename = "OLLAMA_API_KEY")]
    Ollama,
}

impl CredentialKey {
    /// Number of known keys.
    pub const COUNT: usize = 9;

    /// Every key, in declaration order.
    pub const ALL: [CredentialKey; Self::COUNT] = [
        CredentialKey::CodeGpt,
        CredentialKey::OpenAi,
        CredentialKey::CustomService,
        CredentialKey::Anthropic,
        CredentialKey::AzureOpenAi,
        CredentialKey::AzureActiveDirectoryToken,
        CredentialKey::Llama,
        CredentialKey::Google,
        CredentialKey::Ollama,
    ];

    /// The stable symbolic name used as the backend lookup identity.
    pub const fn name(self) -> &'static str {
        match self {
            CredentialKey::CodeGpt => "CODEGPT_API_KEY",
            CredentialKey::OpenAi => "OPENAI_API_KEY",
            CredentialKey::CustomService => "CUSTOM_SERVICE_API_KEY",
            CredentialKey::Anthropic => "ANTHROPIC_API_KEY",
            CredentialKey::AzureOpenAi => "AZURE_OPENAI_API_KEY",
            CredentialKey::AzureActiveDirectoryToken => "AZURE_ACTIVE_DIRECTORY_TOKEN",
            CredentialKey::Llama => "LLAMA_API_KEY",
            CredentialKey::Google => "GOOGLE_API_KEY",
            CredentialKey::Ollama => "OLLAMA_API_KEY",
        }
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for CredentialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CredentialKey {
    type Err = Error;

    /// Parse a key from its symbolic name, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CredentialKey::ALL
            .into_iter()
            .find(|key| key.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnknownCredentialKey(s.to_string()))
    }
}

/// Derive the secure-store service name for a key.
///
/// `app_id` is the fixed application identifier; the result is stable for a
/// given pair so stored secrets survive restarts and upgrades.
pub fn service_name(app_id: &str, key: CredentialKey) -> String {
    format!("{app_id}/{}", key.name())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_debug_is_redacted() {
        let key = ApiKey::new("sk-secret-key-12345");
        let debug = format!("{:?}", key);
        assert_eq!(debug, "ApiKey([REDACTED])");
        assert!(!debug.contains("sk-secret"));
    }

    #[test]
    fn api_key_expose_secret_returns_value() {
        let key = ApiKey::new("sk-secret-key-12345");
        assert_eq!(key.expose_secret(), "sk-secret-key-12345");
    }

    #[test]
    fn api_key_from_string() {
        let key: ApiKey = "my-key".into();
        assert_eq!(key.expose_secret(), "my-key");

        let key: ApiKey = String::from("my-key").into();
        assert_eq!(key.expose_secret(), "my-key");
    }

    #[test]
    fn codegpt_key_name_is_stable() {
        assert_eq!(CredentialKey::CodeGpt.name(), "CODEGPT_API_KEY");
    }

    #[test]
    fn openai_key_name_is_stable() {
        assert_eq!(CredentialKey::OpenAi.name(), "OPENAI_API_KEY");
    }

    #[test]
    fn custom_service_key_name_is_stable() {
        assert_eq!(CredentialKey::CustomService.name(), "CUSTOM_SERVICE_API_KEY");
    }

    #[test]
    fn anthropic_key_name_is_stable() {
        assert_eq!(CredentialKey::Anthropic.name(), "ANTHROPIC_API_KEY");
    }

    #[test]
    fn azure_openai_key_name_is_stable() {
        assert_eq!(CredentialKey::AzureOpenAi.name(), "AZURE_OPENAI_API_KEY");
    }

    #[test]
    fn azure_active_directory_token_name_is_stable() {
        assert_eq!(
            CredentialKey::AzureActiveDirectoryToken.name(),
            "AZURE_ACTIVE_DIRECTORY_TOKEN"
        );
    }

    #[test]
    fn llama_key_name_is_stable() {
        assert_eq!(CredentialKey::Llama.name(), "LLAMA_API_KEY");
    }

    #[test]
    fn google_key_name_is_stable() {
        assert_eq!(CredentialKey::Google.name(), "GOOGLE_API_KEY");
    }

    #[test]
    fn ollama_key_name_is_stable() {
        assert_eq!(CredentialKey::Ollama.name(), "OLLAMA_API_KEY");
    }

    #[test]
    fn all_lists_every_key_at_its_index() {
        for (i, key) in CredentialKey::ALL.iter().enumerate() {
            assert_eq!(key.index(), i);
        }
    }

    #[test]
    fn serde_uses_symbolic_name() {
        let json = serde_json::to_string(&CredentialKey::AzureActiveDirectoryToken).unwrap();
        assert_eq!(json, "\"AZURE_ACTIVE_DIRECTORY_TOKEN\"");

        let key: CredentialKey = serde_json::from_str("\"LLAMA_API_KEY\"").unwrap();
        assert_eq!(key, CredentialKey::Llama);
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(
            "anthropic_api_key".parse::<CredentialKey>().unwrap(),
            CredentialKey::Anthropic
        );
        assert_eq!(
            "OLLAMA_API_KEY".parse::<CredentialKey>().unwrap(),
            CredentialKey::Ollama
        );
    }

    #[test]
    fn parse_unknown_key_fails() {
        let err = "GROQ_API_KEY".parse::<CredentialKey>().unwrap_err();
        assert!(matches!(err, Error::UnknownCredentialKey(_)));
    }

    #[test]
    fn service_name_combines_app_id_and_key_name() {
        assert_eq!(
            service_name("relay", CredentialKey::Anthropic),
            "relay/ANTHROPIC_API_KEY"
        );
        assert_eq!(
            service_name("relay", CredentialKey::CodeGpt),
            "relay/CODEGPT_API_KEY"
        );
    }
}
