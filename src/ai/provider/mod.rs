//! Remote Provider Abstraction
//!
//! One trait per external concern: chat completion, image generation,
//! embeddings, translation, and toxicity scoring. Clients are constructed
//! once at process start and passed by shared handle into the pipeline
//! components; every method returns a structured [`ProviderError`] so
//! callers route on kind instead of provider-specific failures.
//!
//! ## Modules
//!
//! - `openai`: chat completions, image generation, embeddings
//! - `deepl`: text translation
//! - `perspective`: comment-analysis toxicity scoring

mod deepl;
mod openai;
mod perspective;

pub use deepl::DeepLTranslator;
pub use openai::OpenAiClient;
pub use perspective::PerspectiveScorer;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::types::{LanguageCode, ProviderError};

type ProviderResult<T> = std::result::Result<T, ProviderError>;

// =============================================================================
// Chat Completion
// =============================================================================

/// One message in a chat-completion conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Chat-completion provider for story generation
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Run one completion and return the assistant message content
    async fn complete(&self, messages: &[ChatMessage], temperature: f32) -> ProviderResult<String>;

    /// Provider name for logging
    fn name(&self) -> &str;
}

// =============================================================================
// Image Generation
// =============================================================================

/// Model/quality/size selection for one image request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSpec {
    pub model: String,
    pub quality: String,
    pub size: String,
}

/// Image-generation provider for story illustration
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Generate one image and return its URL
    async fn generate_image(&self, prompt: &str, spec: &ImageSpec) -> ProviderResult<String>;

    fn name(&self) -> &str;
}

// =============================================================================
// Embeddings
// =============================================================================

/// Semantic encoder used by the prompt-repair keyword ranking
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed each input text; output vectors are index-aligned with inputs
    async fn embed(&self, texts: &[String]) -> ProviderResult<Vec<Vec<f32>>>;

    fn name(&self) -> &str;
}

// =============================================================================
// Translation
// =============================================================================

/// Text-translation provider
///
/// Returns plain text: the provider's rich result object never crosses this
/// boundary. Always performs exactly one remote call; the canonical-English
/// pass-through is the orchestrator's concern.
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    async fn translate(&self, text: &str, target: &LanguageCode) -> ProviderResult<String>;

    fn name(&self) -> &str;
}

// =============================================================================
// Toxicity Scoring
// =============================================================================

/// Comment-analysis provider returning a harmful-content likelihood in [0, 1]
#[async_trait]
pub trait ToxicityProvider: Send + Sync {
    async fn score(&self, text: &str) -> ProviderResult<f64>;

    fn name(&self) -> &str;
}

// =============================================================================
// Shared Handles
// =============================================================================

/// Shared chat provider handle for the pipeline
pub type SharedChat = Arc<dyn ChatProvider>;
/// Shared image provider handle
pub type SharedImage = Arc<dyn ImageProvider>;
/// Shared embedding provider handle
pub type SharedEmbedding = Arc<dyn EmbeddingProvider>;
/// Shared translation provider handle
pub type SharedTranslation = Arc<dyn TranslationProvider>;
/// Shared toxicity provider handle
pub type SharedToxicity = Arc<dyn ToxicityProvider>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_message_constructors() {
        let system = ChatMessage::system("persona");
        assert_eq!(system.role, "system");
        assert_eq!(system.content, "persona");

        let user = ChatMessage::user("topic");
        assert_eq!(user.role, "user");
    }
}
