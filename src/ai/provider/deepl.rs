//! DeepL Translation Provider
//!
//! Wraps the `/v2/translate` endpoint. The provider's rich result object
//! (detected source language, billed characters, ...) is reduced to plain
//! text here; nothing provider-specific crosses the adapter boundary.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::TranslationProvider;
use crate::config::DeepLConfig;
use crate::types::{ErrorClassifier, ErrorKind, LanguageCode, ProviderError, Result, TaleError};

const PROVIDER_NAME: &str = "deepl";

/// DeepL API client with secure auth key handling
pub struct DeepLTranslator {
    auth_key: SecretString,
    api_base: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for DeepLTranslator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeepLTranslator")
            .field("auth_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl DeepLTranslator {
    pub fn new(config: DeepLConfig) -> Result<Self> {
        let auth_key_str = config
            .auth_key
            .or_else(|| std::env::var("DEEPL_AUTH_KEY").ok())
            .ok_or_else(|| {
                TaleError::Config(
                    "DeepL auth key not found. Set DEEPL_AUTH_KEY env var or provide in config"
                        .to_string(),
                )
            })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TaleError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            auth_key: SecretString::from(auth_key_str),
            api_base: config.api_base,
            client,
        })
    }
}

#[async_trait]
impl TranslationProvider for DeepLTranslator {
    async fn translate(
        &self,
        text: &str,
        target: &LanguageCode,
    ) -> std::result::Result<String, ProviderError> {
        debug!(target = %target, chars = text.len(), "Sending translation request");

        let url = format!("{}/v2/translate", self.api_base);
        let request = TranslateRequest {
            text: vec![text.to_string()],
            target_lang: target.as_str().to_string(),
        };

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("DeepL-Auth-Key {}", self.auth_key.expose_secret()),
            )
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| ErrorClassifier::transport(PROVIDER_NAME, &e))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ErrorClassifier::deepl_status(status, &body));
        }

        let body: TranslateResponse = response.json().await.map_err(|e| {
            ProviderError::new(
                ErrorKind::Unexpected,
                PROVIDER_NAME,
                format!("Failed to parse response: {}", e),
            )
        })?;

        body.translations
            .into_iter()
            .next()
            .map(|t| t.text)
            .ok_or_else(|| {
                ProviderError::new(
                    ErrorKind::Unexpected,
                    PROVIDER_NAME,
                    "No translations in response",
                )
            })
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct TranslateRequest {
    text: Vec<String>,
    target_lang: String,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    translations: Vec<Translation>,
}

/// Rich provider result; only `text` survives past the adapter
#[derive(Debug, Deserialize)]
struct Translation {
    text: String,
    #[serde(default)]
    #[allow(dead_code)]
    detected_source_language: Option<String>,
}
