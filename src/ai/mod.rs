//! AI Integration Layer
//!
//! Remote-provider clients, the backoff executor wrapped around every
//! remote call, prompt repair for rejected image prompts, and pipeline
//! metrics collection.

pub mod backoff;
pub mod keyword;
pub mod metrics;
pub mod provider;

pub use backoff::{
    AttemptOutcome, BackoffExecutor, BackoffPolicy, GenerationAttempt, PromptRepairer,
};
pub use keyword::KeywordRepairer;
pub use metrics::{
    MetricsSummary, PipelineMetrics, SharedMetrics, StageOutcome, StageRecord,
    create_shared_metrics,
};
pub use provider::{
    ChatMessage, ChatProvider, DeepLTranslator, EmbeddingProvider, ImageProvider, ImageSpec,
    OpenAiClient, PerspectiveScorer, SharedChat, SharedEmbedding, SharedImage, SharedToxicity,
    SharedTranslation, ToxicityProvider, TranslationProvider,
};
