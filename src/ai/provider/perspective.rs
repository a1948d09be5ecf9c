//! Perspective Toxicity Provider
//!
//! Wraps the comment-analysis `comments:analyze` endpoint and reduces its
//! attribute-score tree to the single TOXICITY summary scalar.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use super::ToxicityProvider;
use crate::config::PerspectiveConfig;
use crate::constants::moderation::REQUESTED_ATTRIBUTE;
use crate::types::{ErrorClassifier, ErrorKind, ProviderError, Result, TaleError};

const PROVIDER_NAME: &str = "perspective";

/// Perspective API client with secure API key handling
pub struct PerspectiveScorer {
    api_key: SecretString,
    api_base: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for PerspectiveScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PerspectiveScorer")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl PerspectiveScorer {
    pub fn new(config: PerspectiveConfig) -> Result<Self> {
        let api_key_str = config
            .api_key
            .or_else(|| std::env::var("PERSPECTIVE_API_KEY").ok())
            .ok_or_else(|| {
                TaleError::Config(
                    "Perspective API key not found. Set PERSPECTIVE_API_KEY env var or provide in config"
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
            client,
        })
    }
}

#[async_trait]
impl ToxicityProvider for PerspectiveScorer {
    async fn score(&self, text: &str) -> std::result::Result<f64, ProviderError> {
        debug!(chars = text.len(), "Sending comment-analysis request");

        let url = format!(
            "{}/v1alpha1/comments:analyze?key={}",
            self.api_base,
            self.api_key.expose_secret()
        );
        let request = json!({
            "comment": { "text": text },
            "requestedAttributes": { REQUESTED_ATTRIBUTE: {} },
        });

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| ErrorClassifier::transport(PROVIDER_NAME, &e))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ErrorClassifier::perspective_status(status, &body));
        }

        let body: AnalyzeResponse = response.json().await.map_err(|e| {
            ProviderError::new(
                ErrorKind::Unexpected,
                PROVIDER_NAME,
                format!("Failed to parse response: {}", e),
            )
        })?;

        let score = body
            .attribute_scores
            .get(REQUESTED_ATTRIBUTE)
            .map(|a| a.summary_score.value)
            .ok_or_else(|| {
                ProviderError::new(
                    ErrorKind::Unexpected,
                    PROVIDER_NAME,
                    format!("Response is missing the {} attribute", REQUESTED_ATTRIBUTE),
                )
            })?;

        Ok(score.clamp(0.0, 1.0))
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }
}

// Response types

#[derive(Debug, Deserialize)]
struct AnalyzeResponse {
    #[serde(rename = "attributeScores")]
    attribute_scores: HashMap<String, AttributeScore>,
}

#[derive(Debug, Deserialize)]
struct AttributeScore {
    #[serde(rename = "summaryScore")]
    summary_score: SummaryScore,
}

#[derive(Debug, Deserialize)]
struct SummaryScore {
    value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_response_parse() {
        let raw = r#"{
            "attributeScores": {
                "TOXICITY": {
                    "spanScores": [],
                    "summaryScore": { "value": 0.0421, "type": "PROBABILITY" }
                }
            },
            "languages": ["en"]
        }"#;
        let parsed: AnalyzeResponse = serde_json::from_str(raw).unwrap();
        let score = parsed
            .attribute_scores
            .get(REQUESTED_ATTRIBUTE)
            .unwrap()
            .summary_score
            .value;
        assert!((score - 0.0421).abs() < 1e-9);
    }
}
