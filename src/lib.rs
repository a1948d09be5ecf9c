//! taleweave - Story-Generation Pipeline Backend
//!
//! Core of a collaborative story-generation platform: a user topic is
//! translated to English, gated for toxicity, expanded into a children's
//! story by a chat-completion model, gated again, translated to the
//! requested language, and optionally illustrated by an image model under
//! a prepaid ticket scheme.
//!
//! ## Core Features
//!
//! - **Backoff Executor**: exponential delay with jitter on rate limits,
//!   one keyword prompt-repair retry on image content-policy rejections
//! - **Toxicity Gates**: mandatory synchronous moderation before and after
//!   generation; nothing unchecked ever reaches the caller
//! - **Ticket-Tiered Illustration**: golden/silver/pink tiers select image
//!   model and quality, debited atomically per successful illustration
//! - **Closed Error Taxonomy**: adapters return structured errors; the
//!   orchestrator matches on kind, never on provider exception types
//!
//! ## Quick Start
//!
//! ```ignore
//! use taleweave::cli::build_pipeline;
//! use taleweave::config::ConfigLoader;
//! use taleweave::types::{GenerationRequest, LanguageCode};
//!
//! let config = ConfigLoader::load()?;
//! let pipeline = build_pipeline(&config)?;
//! let request = GenerationRequest::new("a brave rabbit", LanguageCode::new("KO")?);
//! let run = pipeline.generate_fairytale(&request).await?;
//! ```
//!
//! ## Modules
//!
//! - [`ai`]: provider clients, backoff executor, prompt repair, metrics
//! - [`pipeline`]: orchestrator state machine, generator, illustrator, tickets
//! - [`config`]: figment-layered configuration with injected credentials
//! - [`types`]: request-scoped domain types and the error taxonomy

pub mod ai;
pub mod cli;
pub mod config;
pub mod constants;
pub mod pipeline;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader};

// Error Types
pub use types::{ErrorKind, ProviderError, Result, TaleError};

// Domain Types
pub use types::{
    GenerationRequest, IllustrationRequest, LanguageCode, ModerationResult, TicketBalance,
    TicketTier, UserId,
};

// =============================================================================
// Pipeline Re-exports
// =============================================================================

pub use pipeline::{
    AbortReason, InMemoryTicketStore, PipelineOutcome, PipelineRun, PipelineState, StoryPipeline,
    TicketStore, TranslatedStory,
};

// =============================================================================
// AI Re-exports
// =============================================================================

pub use ai::{
    BackoffExecutor, BackoffPolicy, KeywordRepairer, MetricsSummary, PipelineMetrics,
    PromptRepairer, SharedMetrics,
};
