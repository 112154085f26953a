use super::types::{
    AnthropicConfig, CompletionConfig, CredentialsConfig, DEFAULT_SERVICE, DEFAULT_SYSTEM_PROMPT,
    PersonaConfig, RawAnthropicConfig, RawCompletionConfig, RawCredentialsConfig,
    RawPersonaConfig, RawRelayConfig, RelayConfig,
};
use anyhow::{Context, Result};
use relay_models::completions::{DEFAULT_MAX_TOKENS, DEFAULT_MODEL};
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load merged configuration (user + project)
    pub fn load() -> Result<RelayConfig> {
        Self::load_layers(&[Self::user_config_path(), Self::project_config_path()])
    }

    /// Load and merge config files in order; later files win, missing files are skipped
    pub fn load_layers(paths: &[PathBuf]) -> Result<RelayConfig> {
        let mut raw = RawRelayConfig::default();

        for path in paths {
            if !path.exists() {
                continue;
            }
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let layer: RawRelayConfig = toml::from_str(&contents)
                .with_context(|| format!("Invalid config in {}", path.display()))?;
            debug!(path = %path.display(), "loaded config layer");
            raw = Self::merge_raw(raw, layer);
        }

        // Convert to final config with defaults applied
        Ok(Self::finalize(raw))
    }

    /// Get user config path (`$XDG_CONFIG_HOME/relay/config.toml`)
    pub fn user_config_path() -> PathBuf {
        relay_paths::user_config_file()
    }

    /// Get project config path
    /// Can be overridden with RELAY_PROJECT_CONFIG_DIR env var (useful for isolated tests)
    pub fn project_config_path() -> PathBuf {
        relay_paths::project_config_file(Path::new(""))
    }

    /// Merge two raw configs (overlay values override base only if explicitly set)
    fn merge_raw(base: RawRelayConfig, overlay: RawRelayConfig) -> RawRelayConfig {
        RawRelayConfig {
            anthropic: RawAnthropicConfig {
                model: overlay.anthropic.model.or(base.anthropic.model),
            },
            completion: RawCompletionConfig {
                max_tokens: overlay.completion.max_tokens.or(base.completion.max_tokens),
            },
            persona: RawPersonaConfig {
                system_prompt: overlay.persona.system_prompt.or(base.persona.system_prompt),
            },
            credentials: RawCredentialsConfig {
                service: overlay.credentials.service.or(base.credentials.service),
                env_fallback: overlay
                    .credentials
                    .env_fallback
                    .or(base.credentials.env_fallback),
            },
        }
    }

    /// Convert raw config to final config with defaults applied
    fn finalize(raw: RawRelayConfig) -> RelayConfig {
        RelayConfig {
            anthropic: AnthropicConfig {
                model: raw
                    .anthropic
                    .model
                    .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            },
            completion: CompletionConfig {
                max_tokens: raw.completion.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            },
            persona: PersonaConfig {
                system_prompt: raw
                    .persona
                    .system_prompt
                    .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            },
            credentials: CredentialsConfig {
                service: raw
                    .credentials
                    .service
                    .unwrap_or_else(|| DEFAULT_SERVICE.to_string()),
                env_fallback: raw.credentials.env_fallback.unwrap_or(false),
            },
        }
    }

    /// Load config from a specific path (for testing)
    #[cfg(test)]
    pub fn load_from_path(path: &Path) -> Result<RelayConfig> {
        Self::load_layers(&[path.to_path_buf()])
    }
}
