//! Illustration Generator
//!
//! Runs the image model through the backoff executor with the ticket tier
//! deciding model and quality. Content-policy rejections go through the
//! keyword prompt repair once before becoming fatal.

use tracing::{debug, info};

use crate::ai::backoff::BackoffExecutor;
use crate::ai::keyword::KeywordRepairer;
use crate::ai::provider::{ImageSpec, SharedImage};
use crate::constants::illustration;
use crate::types::{Result, TaleError, TicketTier};

/// Style constraints fixed for every illustration so output stays
/// consistent across requests
const STYLE_SUFFIX: &str =
    "in an adorable and detailed fairy tale drawing style, with no text or lettering in the image";

/// Generates one illustration URL for a story paragraph
pub struct Illustrator {
    image: SharedImage,
    repairer: KeywordRepairer,
    executor: BackoffExecutor,
}

impl Illustrator {
    pub fn new(image: SharedImage, repairer: KeywordRepairer, executor: BackoffExecutor) -> Self {
        Self {
            image,
            repairer,
            executor,
        }
    }

    /// Model and quality for a ticket tier
    pub fn spec_for(tier: TicketTier) -> ImageSpec {
        let (model, quality) = match tier {
            TicketTier::Golden => (illustration::PREMIUM_MODEL, illustration::QUALITY_HIGH),
            TicketTier::Silver => (illustration::PREMIUM_MODEL, illustration::QUALITY_STANDARD),
            TicketTier::Pink => (illustration::BUDGET_MODEL, illustration::QUALITY_STANDARD),
        };
        ImageSpec {
            model: model.to_string(),
            quality: quality.to_string(),
            size: illustration::IMAGE_SIZE.to_string(),
        }
    }

    /// Generate an illustration for an English paragraph
    pub async fn illustrate(&self, script: &str, tier: TicketTier) -> Result<String> {
        if script.trim().is_empty() {
            return Err(TaleError::EmptyInput { field: "script" });
        }

        let spec = Self::spec_for(tier);
        let prompt = format!("{} {}", script, STYLE_SUFFIX);
        debug!(provider = self.image.name(), model = %spec.model, quality = %spec.quality, "illustrating paragraph");

        let image = &self.image;
        let spec = &spec;
        let url = self
            .executor
            .run_with_repair(
                prompt,
                |p| async move { image.generate_image(&p, spec).await },
                Some(&self.repairer),
            )
            .await?;

        info!(tier = %tier, "illustration generated");
        Ok(url)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::backoff::BackoffPolicy;
    use crate::ai::provider::{EmbeddingProvider, ImageProvider};
    use crate::types::{ErrorKind, ProviderError};
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::Mutex;
    use std::time::Duration;

    struct MockImage {
        reject_first: bool,
        prompts: Mutex<Vec<(String, ImageSpec)>>,
    }

    impl MockImage {
        fn accepting() -> Self {
            Self {
                reject_first: false,
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn rejecting_first() -> Self {
            Self {
                reject_first: true,
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ImageProvider for MockImage {
        async fn generate_image(
            &self,
            prompt: &str,
            spec: &ImageSpec,
        ) -> std::result::Result<String, ProviderError> {
            let mut prompts = self.prompts.lock().unwrap();
            prompts.push((prompt.to_string(), spec.clone()));
            if self.reject_first && prompts.len() == 1 {
                return Err(ProviderError::new(
                    ErrorKind::PolicyRejected,
                    "mock",
                    "content policy violation",
                ));
            }
            Ok(format!("https://images.example/{}", prompts.len()))
        }

        fn name(&self) -> &str {
            "mock"
        }
    }

    struct FlatEmbedder;

    #[async_trait]
    impl EmbeddingProvider for FlatEmbedder {
        async fn embed(
            &self,
            texts: &[String],
        ) -> std::result::Result<Vec<Vec<f32>>, ProviderError> {
            Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
        }

        fn name(&self) -> &str {
            "flat"
        }
    }

    fn illustrator(image: Arc<MockImage>) -> Illustrator {
        Illustrator::new(
            image,
            KeywordRepairer::new(Arc::new(FlatEmbedder)),
            BackoffExecutor::new(BackoffPolicy {
                initial_delay: Duration::from_millis(1),
                exponential_base: 2.0,
                jitter: false,
                max_retries: 3,
            }),
        )
    }

    #[test]
    fn test_tier_selects_model_and_quality() {
        let golden = Illustrator::spec_for(TicketTier::Golden);
        assert_eq!(golden.model, "dall-e-3");
        assert_eq!(golden.quality, "hd");

        let silver = Illustrator::spec_for(TicketTier::Silver);
        assert_eq!(silver.model, "dall-e-3");
        assert_eq!(silver.quality, "standard");

        let pink = Illustrator::spec_for(TicketTier::Pink);
        assert_eq!(pink.model, "dall-e-2");
        assert_eq!(pink.quality, "standard");

        for spec in [golden, silver, pink] {
            assert_eq!(spec.size, "1024x1024");
        }
    }

    #[tokio::test]
    async fn test_illustrate_fixes_style_constraints() {
        let image = Arc::new(MockImage::accepting());
        let url = illustrator(image.clone())
            .illustrate("The rabbit hopped over the hill.", TicketTier::Golden)
            .await
            .unwrap();
        assert!(url.starts_with("https://images.example/"));

        let prompts = image.prompts.lock().unwrap();
        let (prompt, spec) = &prompts[0];
        assert!(prompt.starts_with("The rabbit hopped over the hill."));
        assert!(prompt.contains("fairy tale drawing style"));
        assert!(prompt.contains("no text or lettering"));
        assert_eq!(spec.quality, "hd");
    }

    #[tokio::test]
    async fn test_policy_rejection_retries_with_keyword_prompt() {
        let image = Arc::new(MockImage::rejecting_first());
        let url = illustrator(image.clone())
            .illustrate("The brave rabbit crossed the dark woods.", TicketTier::Pink)
            .await
            .unwrap();
        assert!(url.ends_with("/2"));

        let prompts = image.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 2);
        let (repaired, _) = &prompts[1];
        assert!(repaired.starts_with('"'));
        assert!(repaired.ends_with("in a drawing style of fairy tale"));
    }

    #[tokio::test]
    async fn test_illustrate_rejects_empty_script() {
        let image = Arc::new(MockImage::accepting());
        let result = illustrator(image.clone())
            .illustrate("  ", TicketTier::Pink)
            .await;
        assert!(matches!(result, Err(TaleError::EmptyInput { .. })));
        assert!(image.prompts.lock().unwrap().is_empty());
    }
}
