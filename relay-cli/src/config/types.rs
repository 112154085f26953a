use relay_models::completions::{
    ClaudeSettings, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, ProviderSettings,
};
use serde::{Deserialize, Serialize};

/// Default application identifier for credential service names
pub const DEFAULT_SERVICE: &str = "relay";

/// Default persona
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an AI programming assistant. \
Follow the user's requirements carefully and answer concisely. \
Use Markdown code blocks with a language tag for any code.";

/// Configuration as stored in TOML files (with optional fields for merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawRelayConfig {
    #[serde(default)]
    pub anthropic: RawAnthropicConfig,

    #[serde(default)]
    pub completion: RawCompletionConfig,

    #[serde(default)]
    pub persona: RawPersonaConfig,

    #[serde(default)]
    pub credentials: RawCredentialsConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawAnthropicConfig {
    pub model: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawCompletionConfig {
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawPersonaConfig {
    pub system_prompt: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawCredentialsConfig {
    pub service: Option<String>,
    pub env_fallback: Option<bool>,
}

/// Final configuration with defaults applied
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct RelayConfig {
    #[serde(default)]
    pub anthropic: AnthropicConfig,

    #[serde(default)]
    pub completion: CompletionConfig,

    #[serde(default)]
    pub persona: PersonaConfig,

    #[serde(default)]
    pub credentials: CredentialsConfig,
}

impl RelayConfig {
    /// Provider settings handed to request factories
    pub fn provider_settings(&self) -> ProviderSettings {
        ProviderSettings {
            anthropic: ClaudeSettings {
                model: self.anthropic.model.clone(),
                max_tokens: self.completion.max_tokens,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnthropicConfig {
    /// Model ID sent with every Anthropic request
    pub model: String,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompletionConfig {
    /// Output limit when a turn doesn't request one
    pub max_tokens: u32,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PersonaConfig {
    /// System prompt attached to every chat request
    pub system_prompt: String,
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CredentialsConfig {
    /// Application identifier credential service names derive from
    pub service: String,

    /// Fall back to environment variables named after each key
    pub env_fallback: bool,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            service: DEFAULT_SERVICE.to_string(),
            env_fallback: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = RelayConfig::default();
        assert_eq!(config.anthropic.model, DEFAULT_MODEL);
        assert_eq!(config.completion.max_tokens, 8192);
        assert_eq!(config.persona.system_prompt, DEFAULT_SYSTEM_PROMPT);
        assert_eq!(config.credentials.service, "relay");
        assert!(!config.credentials.env_fallback);
    }

    #[test]
    fn test_default_model_matches_factory_default() {
        assert_eq!(
            RelayConfig::default().provider_settings().anthropic,
            ClaudeSettings::default()
        );
    }

    #[test]
    fn test_toml_round_trip() {
        let config = RelayConfig {
            anthropic: AnthropicConfig {
                model: "claude-3-5-haiku-latest".to_string(),
            },
            completion: CompletionConfig { max_tokens: 1024 },
            persona: PersonaConfig {
                system_prompt: "Be terse.".to_string(),
            },
            credentials: CredentialsConfig {
                service: "relay-dev".to_string(),
                env_fallback: true,
            },
        };

        let toml_str = toml::to_string(&config).unwrap();
        let parsed: RelayConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(parsed, config);
    }

    #[test]
    fn test_raw_config_partial_parsing() {
        let toml_str = r#"
[completion]
max_tokens = 2048
"#;
        let raw: RawRelayConfig = toml::from_str(toml_str).unwrap();

        // Only max_tokens was set
        assert_eq!(raw.completion.max_tokens, Some(2048));
        assert!(raw.anthropic.model.is_none());
        assert!(raw.credentials.env_fallback.is_none());
    }

    #[test]
    fn test_raw_config_empty_uses_none() {
        let raw: RawRelayConfig = toml::from_str("").unwrap();

        assert!(raw.anthropic.model.is_none());
        assert!(raw.completion.max_tokens.is_none());
        assert!(raw.persona.system_prompt.is_none());
        assert!(raw.credentials.service.is_none());
    }

    #[test]
    fn test_provider_settings_from_config() {
        let mut config = RelayConfig::default();
        config.anthropic.model = "claude-opus-4-1".to_string();
        config.completion.max_tokens = 300;

        let settings = config.provider_settings();

        assert_eq!(settings.anthropic.model, "claude-opus-4-1");
        assert_eq!(settings.anthropic.max_tokens, 300);
    }
}
