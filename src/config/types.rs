//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (~/.config/taleweave/) and project (.taleweave/) level
//! configuration. Provider credentials are injected once at process start
//! and never re-read per request.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::constants::{backoff, generation, moderation, network};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Remote provider settings and credentials
    pub providers: ProvidersConfig,

    /// Generation pipeline settings
    pub pipeline: PipelineConfig,

    /// Backoff executor settings
    pub backoff: BackoffConfig,

    /// Ticket balances seeded into the in-memory store (CLI surface only;
    /// a deployment wires a real account store instead)
    pub tickets: TicketsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            providers: ProvidersConfig::default(),
            pipeline: PipelineConfig::default(),
            backoff: BackoffConfig::default(),
            tickets: TicketsConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `TaleError::Config` on validation failure.
    pub fn validate(&self) -> crate::types::Result<()> {
        if !(0.0..=1.0).contains(&self.pipeline.toxicity_threshold) {
            return Err(crate::types::TaleError::Config(format!(
                "toxicity_threshold must be between 0.0 and 1.0, got {}",
                self.pipeline.toxicity_threshold
            )));
        }

        if !(0.0..=2.0).contains(&self.pipeline.story_temperature) {
            return Err(crate::types::TaleError::Config(format!(
                "story_temperature must be between 0.0 and 2.0, got {}",
                self.pipeline.story_temperature
            )));
        }

        if self.backoff.exponential_base < 1.0 {
            return Err(crate::types::TaleError::Config(format!(
                "backoff exponential_base must be at least 1.0, got {}",
                self.backoff.exponential_base
            )));
        }

        for (name, base, timeout) in [
            (
                "openai",
                &self.providers.openai.api_base,
                self.providers.openai.timeout_secs,
            ),
            (
                "deepl",
                &self.providers.deepl.api_base,
                self.providers.deepl.timeout_secs,
            ),
            (
                "perspective",
                &self.providers.perspective.api_base,
                self.providers.perspective.timeout_secs,
            ),
        ] {
            if timeout == 0 {
                return Err(crate::types::TaleError::Config(format!(
                    "{} timeout_secs must be greater than 0",
                    name
                )));
            }
            Url::parse(base).map_err(|e| {
                crate::types::TaleError::Config(format!("{} api_base is not a URL: {}", name, e))
            })?;
        }

        Ok(())
    }
}

// =============================================================================
// Provider Configuration
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub openai: OpenAiConfig,
    pub deepl: DeepLConfig,
    pub perspective: PerspectiveConfig,
}

/// Chat-completion, image-generation and embedding provider settings
///
/// Note: API keys are never serialized to output and are redacted in debug
/// output. The provider converts the key to SecretString internally.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    /// API key; falls back to the OPENAI_API_KEY env var
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// API base URL (for custom endpoints)
    pub api_base: String,
    /// Chat-completion model
    pub chat_model: String,
    /// Embedding model used by the prompt-repair keyword ranking
    pub embedding_model: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: "https://api.openai.com/v1".to_string(),
            chat_model: generation::DEFAULT_CHAT_MODEL.to_string(),
            embedding_model: generation::DEFAULT_EMBEDDING_MODEL.to_string(),
            timeout_secs: network::DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .field("chat_model", &self.chat_model)
            .field("embedding_model", &self.embedding_model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Translation provider settings
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeepLConfig {
    /// Auth key; falls back to the DEEPL_AUTH_KEY env var
    #[serde(skip_serializing)]
    pub auth_key: Option<String>,
    pub api_base: String,
    pub timeout_secs: u64,
}

impl Default for DeepLConfig {
    fn default() -> Self {
        Self {
            auth_key: None,
            api_base: "https://api-free.deepl.com".to_string(),
            timeout_secs: network::DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl std::fmt::Debug for DeepLConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeepLConfig")
            .field("auth_key", &self.auth_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Comment-analysis (toxicity) provider settings
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerspectiveConfig {
    /// API key; falls back to the PERSPECTIVE_API_KEY env var
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub api_base: String,
    pub timeout_secs: u64,
}

impl Default for PerspectiveConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: "https://commentanalyzer.googleapis.com".to_string(),
            timeout_secs: network::DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl std::fmt::Debug for PerspectiveConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PerspectiveConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

// =============================================================================
// Pipeline Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Moderation gate threshold; scores above this abort the pipeline
    pub toxicity_threshold: f64,
    /// Chat-completion temperature for story generation
    pub story_temperature: f32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            toxicity_threshold: moderation::TOXICITY_THRESHOLD,
            story_temperature: generation::STORY_TEMPERATURE,
        }
    }
}

// =============================================================================
// Backoff Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffConfig {
    /// Delay before the first retry (milliseconds)
    pub initial_delay_ms: u64,
    /// Multiplier applied after each rate-limited attempt
    pub exponential_base: f64,
    /// Randomize delay growth to spread synchronized clients
    pub jitter: bool,
    /// Maximum rate-limit retries per invocation
    pub max_retries: u32,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: backoff::INITIAL_DELAY_MS,
            exponential_base: backoff::EXPONENTIAL_BASE,
            jitter: true,
            max_retries: backoff::DEFAULT_MAX_RETRIES,
        }
    }
}

// =============================================================================
// Ticket Seed Configuration
// =============================================================================

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TicketsConfig {
    pub golden: u32,
    pub silver: u32,
    pub pink: u32,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.pipeline.toxicity_threshold, 0.3);
        assert_eq!(config.pipeline.story_temperature, 1.3);
        assert_eq!(config.backoff.max_retries, 3);
        assert!(config.backoff.jitter);
    }

    #[test]
    fn test_validate_threshold_range() {
        let mut config = Config::default();
        config.pipeline.toxicity_threshold = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_exponential_base() {
        let mut config = Config::default();
        config.backoff.exponential_base = 0.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_api_base() {
        let mut config = Config::default();
        config.providers.deepl.api_base = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_timeout() {
        let mut config = Config::default();
        config.providers.openai.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_api_key_redacted_in_debug() {
        let config = OpenAiConfig {
            api_key: Some("sk-secret".to_string()),
            ..Default::default()
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_api_key_not_serialized() {
        let config = OpenAiConfig {
            api_key: Some("sk-secret".to_string()),
            ..Default::default()
        };
        let toml = toml::to_string(&config).unwrap();
        assert!(!toml.contains("sk-secret"));
    }
}
