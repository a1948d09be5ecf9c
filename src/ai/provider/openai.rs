//! OpenAI API Provider
//!
//! Chat completions for story generation, image generation for
//! illustrations, and embeddings for prompt-repair keyword ranking, all
//! through one client constructed at process start.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{ChatMessage, ChatProvider, EmbeddingProvider, ImageProvider, ImageSpec};
use crate::config::OpenAiConfig;
use crate::constants::illustration;
use crate::types::{ErrorClassifier, ErrorKind, ProviderError, Result, TaleError};

const PROVIDER_NAME: &str = "openai";

/// OpenAI API client with secure API key handling
pub struct OpenAiClient {
    /// API key stored securely - never exposed in logs or debug output
    api_key: SecretString,
    api_base: String,
    chat_model: String,
    embedding_model: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("chat_model", &self.chat_model)
            .field("embedding_model", &self.embedding_model)
            .finish()
    }
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let api_key_str = config
            .api_key
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .ok_or_else(|| {
                TaleError::Config(
                    "OpenAI API key not found. Set OPENAI_API_KEY env var or provide in config"
                        .to_string(),
                )
            })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TaleError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key: SecretString::from(api_key_str),
            api_base: config.api_base,
            chat_model: config.chat_model,
            embedding_model: config.embedding_model,
            client,
        })
    }

    async fn post<B: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> std::result::Result<R, ProviderError> {
        let url = format!("{}{}", self.api_base, path);

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| ErrorClassifier::transport(PROVIDER_NAME, &e))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ErrorClassifier::openai_status(status, &body));
        }

        response.json::<R>().await.map_err(|e| {
            ProviderError::new(
                ErrorKind::Unexpected,
                PROVIDER_NAME,
                format!("Failed to parse response: {}", e),
            )
        })
    }
}

#[async_trait]
impl ChatProvider for OpenAiClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> std::result::Result<String, ProviderError> {
        debug!(model = %self.chat_model, temperature, "Sending chat completion request");

        let request = ChatCompletionRequest {
            model: self.chat_model.clone(),
            messages: messages.to_vec(),
            temperature,
        };

        let response: ChatCompletionResponse = self.post("/chat/completions", &request).await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                ProviderError::new(
                    ErrorKind::Unexpected,
                    PROVIDER_NAME,
                    "No content in chat completion response",
                )
            })
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }
}

#[async_trait]
impl ImageProvider for OpenAiClient {
    async fn generate_image(
        &self,
        prompt: &str,
        spec: &ImageSpec,
    ) -> std::result::Result<String, ProviderError> {
        debug!(model = %spec.model, quality = %spec.quality, "Sending image generation request");

        let request = ImagesRequest {
            model: spec.model.clone(),
            prompt: prompt.to_string(),
            size: spec.size.clone(),
            quality: spec.quality.clone(),
            n: illustration::IMAGE_COUNT,
        };

        let response: ImagesResponse = self.post("/images/generations", &request).await?;

        response
            .data
            .into_iter()
            .next()
            .and_then(|d| d.url)
            .ok_or_else(|| {
                ProviderError::new(
                    ErrorKind::Unexpected,
                    PROVIDER_NAME,
                    "No image URL in generation response",
                )
            })
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiClient {
    async fn embed(&self, texts: &[String]) -> std::result::Result<Vec<Vec<f32>>, ProviderError> {
        debug!(model = %self.embedding_model, inputs = texts.len(), "Sending embeddings request");

        let request = EmbeddingsRequest {
            model: self.embedding_model.clone(),
            input: texts.to_vec(),
        };

        let response: EmbeddingsResponse = self.post("/embeddings", &request).await?;

        // The API may reorder entries; restore input alignment by index.
        let mut data = response.data;
        data.sort_by_key(|d| d.index);

        if data.len() != texts.len() {
            return Err(ProviderError::new(
                ErrorKind::Unexpected,
                PROVIDER_NAME,
                format!(
                    "Embedding count mismatch: sent {}, received {}",
                    texts.len(),
                    data.len()
                ),
            ));
        }

        Ok(data.into_iter().map(|d| d.embedding).collect())
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct ImagesRequest {
    model: String,
    prompt: String,
    size: String,
    quality: String,
    n: u8,
}

#[derive(Debug, Deserialize)]
struct ImagesResponse {
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    url: Option<String>,
}

#[derive(Debug, Serialize)]
struct EmbeddingsRequest {
    model: String,
    input: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}
