//! Command Utilities
//!
//! Builds the pipeline from loaded configuration: provider clients are
//! constructed once here and passed into the components by shared handle.

use std::sync::Arc;

use crate::ai::provider::{
    DeepLTranslator, OpenAiClient, PerspectiveScorer, SharedChat, SharedEmbedding, SharedImage,
    SharedToxicity, SharedTranslation,
};
use crate::ai::{BackoffExecutor, BackoffPolicy, KeywordRepairer};
use crate::config::Config;
use crate::pipeline::{Illustrator, InMemoryTicketStore, StoryGenerator, StoryPipeline};
use crate::types::{Result, TaleError, UserId};

/// User the CLI surface runs as; a deployment passes real account ids
pub const LOCAL_USER: &str = "local";

/// Construct the pipeline with all provider clients and the seeded
/// in-memory ticket store
pub fn build_pipeline(config: &Config) -> Result<StoryPipeline> {
    let openai = Arc::new(OpenAiClient::new(config.providers.openai.clone())?);
    let translator: SharedTranslation =
        Arc::new(DeepLTranslator::new(config.providers.deepl.clone())?);
    let toxicity: SharedToxicity =
        Arc::new(PerspectiveScorer::new(config.providers.perspective.clone())?);

    let executor = BackoffExecutor::new(BackoffPolicy::from(&config.backoff));
    let generator = StoryGenerator::new(
        openai.clone() as SharedChat,
        executor.clone(),
        config.pipeline.story_temperature,
    );
    let repairer = KeywordRepairer::new(openai.clone() as SharedEmbedding);
    let illustrator = Illustrator::new(openai as SharedImage, repairer, executor);

    let tickets = Arc::new(InMemoryTicketStore::seeded(
        UserId::from(LOCAL_USER),
        config.tickets,
    ));

    Ok(StoryPipeline::new(
        translator,
        toxicity,
        generator,
        illustrator,
        tickets,
        &config.pipeline,
    ))
}

/// Print the machine-readable response envelope for a failed request
pub fn print_error_response(err: &TaleError) {
    let body = serde_json::json!({
        "status": err.http_status().to_string(),
        "error": err.user_message(),
    });
    println!("{}", body);
}
