//! Pipeline Orchestrator
//!
//! Sequences translation, moderation, generation and illustration into the
//! end-to-end use cases. The fairy-tale flow is an explicit state machine:
//!
//! ```text
//! Received → TranslatingInput → ModeratingInput → Generating
//!          → ModeratingOutput → TranslatingOutput → Done
//! ```
//!
//! Either moderation state aborts when the toxicity score exceeds the
//! threshold; any propagated error terminates in `Failed`. Aborts are
//! normal outcomes, not errors. Every stage logs its latency and outcome.

use std::future::Future;
use std::time::Instant;
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

use crate::ai::metrics::{SharedMetrics, StageOutcome, create_shared_metrics};
use crate::ai::provider::{SharedToxicity, SharedTranslation};
use crate::config::PipelineConfig;
use crate::pipeline::generator::StoryGenerator;
use crate::pipeline::illustrator::Illustrator;
use crate::pipeline::tickets::{DebitOutcome, SharedTicketStore};
use crate::types::{
    GenerationRequest, IllustrationRequest, LanguageCode, ModerationResult, Result, TaleError,
};

// =============================================================================
// States and Outcomes
// =============================================================================

/// One state of the fairy-tale generation machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Received,
    TranslatingInput,
    ModeratingInput,
    Generating,
    ModeratingOutput,
    TranslatingOutput,
    Done,
    Aborted(AbortReason),
    Failed,
}

impl PipelineState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::TranslatingInput => "translating_input",
            Self::ModeratingInput => "moderating_input",
            Self::Generating => "generating",
            Self::ModeratingOutput => "moderating_output",
            Self::TranslatingOutput => "translating_output",
            Self::Done => "done",
            Self::Aborted(_) => "aborted",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Why a moderation gate stopped the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    /// The translated user topic exceeded the toxicity threshold
    InputToxic,
    /// The generated story exceeded the toxicity threshold
    OutputToxic,
}

impl AbortReason {
    /// Stable machine-readable reason code
    pub fn code(&self) -> &'static str {
        match self {
            Self::InputToxic => "input_toxic",
            Self::OutputToxic => "output_toxic",
        }
    }

    /// Human-readable message shown to the end user
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InputToxic => {
                "주제에서 폭력성이 검출되어 동화 생성이 불가능합니다. 주제를 수정해주세요."
            }
            Self::OutputToxic => {
                "생성된 동화 내용에 폭력성이 검출되어 동화 생성이 불가능합니다. 주제를 수정해주세요."
            }
        }
    }
}

/// Terminal result of the fairy-tale flow, reported as a single response
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    /// Story generated, gated, and translated to the requested language
    Done { script: String },
    /// A toxicity gate stopped the pipeline
    Aborted { reason: AbortReason },
}

/// Outcome plus the visited-state log of the run
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub outcome: PipelineOutcome,
    pub visited: Vec<PipelineState>,
}

/// A story detail page translated for display
#[derive(Debug, Clone, PartialEq)]
pub struct TranslatedStory {
    pub title: String,
    pub paragraphs: Vec<String>,
}

// =============================================================================
// Orchestrator
// =============================================================================

/// End-to-end story pipeline over injected provider handles
pub struct StoryPipeline {
    translator: SharedTranslation,
    toxicity: SharedToxicity,
    generator: StoryGenerator,
    illustrator: Illustrator,
    tickets: SharedTicketStore,
    threshold: f64,
    metrics: SharedMetrics,
}

impl StoryPipeline {
    pub fn new(
        translator: SharedTranslation,
        toxicity: SharedToxicity,
        generator: StoryGenerator,
        illustrator: Illustrator,
        tickets: SharedTicketStore,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            translator,
            toxicity,
            generator,
            illustrator,
            tickets,
            threshold: config.toxicity_threshold,
            metrics: create_shared_metrics(),
        }
    }

    pub fn metrics(&self) -> &SharedMetrics {
        &self.metrics
    }

    /// Run one stage: push the state, time the call, log and record the
    /// outcome. An error pushes the `Failed` terminal before propagating.
    async fn run_stage<T, Fut>(
        &self,
        visited: &mut Vec<PipelineState>,
        state: PipelineState,
        fut: Fut,
    ) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
    {
        visited.push(state);
        let started = Instant::now();
        match fut.await {
            Ok(value) => {
                let latency = started.elapsed();
                info!(
                    stage = state.name(),
                    latency_seconds = latency.as_secs_f64(),
                    outcome = "ok",
                    "pipeline stage complete"
                );
                self.metrics
                    .record_stage(state.name(), latency, StageOutcome::Ok);
                Ok(value)
            }
            Err(err) => {
                let latency = started.elapsed();
                error!(
                    stage = state.name(),
                    latency_seconds = latency.as_secs_f64(),
                    outcome = "failed",
                    error = %err,
                    "pipeline stage failed"
                );
                self.metrics
                    .record_stage(state.name(), latency, StageOutcome::Failed);
                visited.push(PipelineState::Failed);
                Err(err)
            }
        }
    }

    /// The moderation gate: scores at or below the threshold pass
    fn gate(
        &self,
        visited: &mut Vec<PipelineState>,
        moderation: &ModerationResult,
        reason: AbortReason,
    ) -> Option<PipelineOutcome> {
        if moderation.passes(self.threshold) {
            return None;
        }
        warn!(
            score = moderation.score,
            threshold = self.threshold,
            reason = reason.code(),
            "toxicity gate aborted pipeline"
        );
        visited.push(PipelineState::Aborted(reason));
        Some(PipelineOutcome::Aborted { reason })
    }

    /// Generate a fairy tale for a topic, gated at both checkpoints
    pub async fn generate_fairytale(&self, request: &GenerationRequest) -> Result<PipelineRun> {
        if request.topic.trim().is_empty() {
            return Err(TaleError::EmptyInput { field: "subject" });
        }

        let request_id = Uuid::new_v4();
        let span = info_span!("fairytale", request_id = %request_id);
        self.fairytale_inner(request).instrument(span).await
    }

    async fn fairytale_inner(&self, request: &GenerationRequest) -> Result<PipelineRun> {
        let started = Instant::now();
        let mut visited = vec![PipelineState::Received];
        let english = LanguageCode::canonical_english();

        // Normalize the topic to English for moderation and generation
        let topic = self
            .run_stage(&mut visited, PipelineState::TranslatingInput, async {
                Ok(self.translator.translate(&request.topic, &english).await?)
            })
            .await?;

        // Gate 1: user input must pass before any generation
        let moderation = self
            .run_stage(&mut visited, PipelineState::ModeratingInput, async {
                let score = self.toxicity.score(&topic).await?;
                Ok(ModerationResult::new(score, &topic))
            })
            .await?;
        if let Some(outcome) = self.gate(&mut visited, &moderation, AbortReason::InputToxic) {
            return Ok(PipelineRun { outcome, visited });
        }

        let story = self
            .run_stage(&mut visited, PipelineState::Generating, async {
                self.generator.generate(&topic).await
            })
            .await?;

        // Gate 2: generated output must pass before it reaches the user
        let moderation = self
            .run_stage(&mut visited, PipelineState::ModeratingOutput, async {
                let score = self.toxicity.score(&story).await?;
                Ok(ModerationResult::new(score, &story))
            })
            .await?;
        if let Some(outcome) = self.gate(&mut visited, &moderation, AbortReason::OutputToxic) {
            return Ok(PipelineRun { outcome, visited });
        }

        // Output translation is skipped entirely for the canonical target
        let script = if request.target_language.is_canonical_english() {
            info!(stage = "translating_output", outcome = "skipped", "target is canonical English");
            story
        } else {
            self.run_stage(&mut visited, PipelineState::TranslatingOutput, async {
                Ok(self
                    .translator
                    .translate(&story, &request.target_language)
                    .await?)
            })
            .await?
        };

        visited.push(PipelineState::Done);
        info!(
            total_latency_seconds = started.elapsed().as_secs_f64(),
            outcome = "done",
            "fairytale pipeline complete"
        );
        Ok(PipelineRun {
            outcome: PipelineOutcome::Done { script },
            visited,
        })
    }

    /// Generate an illustration for a story paragraph, debiting one ticket
    ///
    /// The balance is checked before any provider call; the debit itself is
    /// a second atomic check after success, so a lost race surfaces the
    /// same precondition error and never leaves a partial debit.
    pub async fn generate_illustration(&self, request: &IllustrationRequest) -> Result<String> {
        if request.script.trim().is_empty() {
            return Err(TaleError::EmptyInput { field: "script" });
        }

        let request_id = Uuid::new_v4();
        let span = info_span!("illustration", request_id = %request_id, tier = %request.tier);
        self.illustration_inner(request).instrument(span).await
    }

    async fn illustration_inner(&self, request: &IllustrationRequest) -> Result<String> {
        let mut visited = Vec::new();

        let balance = self.tickets.balance(&request.user).await?;
        if balance.of(request.tier) == 0 {
            warn!(tier = %request.tier, "insufficient tickets, no provider call made");
            return Err(TaleError::InsufficientTickets { tier: request.tier });
        }

        let script = self
            .run_stage(&mut visited, PipelineState::TranslatingInput, async {
                Ok(self
                    .translator
                    .translate(&request.script, &LanguageCode::canonical_english())
                    .await?)
            })
            .await?;

        let url = self
            .run_stage(&mut visited, PipelineState::Generating, async {
                self.illustrator.illustrate(&script, request.tier).await
            })
            .await?;

        match self.tickets.debit(&request.user, request.tier).await? {
            DebitOutcome::Debited(remaining) => {
                info!(
                    tier = %request.tier,
                    remaining = remaining.of(request.tier),
                    "ticket debited"
                );
                Ok(url)
            }
            DebitOutcome::Insufficient => {
                warn!(tier = %request.tier, "ticket debit lost a balance race");
                Err(TaleError::InsufficientTickets { tier: request.tier })
            }
        }
    }

    /// Translate a story detail page (title and paragraphs), one provider
    /// call per segment
    pub async fn translate_story(
        &self,
        title: &str,
        paragraphs: &[String],
        target: &LanguageCode,
    ) -> Result<TranslatedStory> {
        if title.trim().is_empty() {
            return Err(TaleError::EmptyInput { field: "story_title" });
        }

        let started = Instant::now();
        let translated_title = self.translator.translate(title, target).await?;
        let mut translated = Vec::with_capacity(paragraphs.len());
        for paragraph in paragraphs {
            translated.push(self.translator.translate(paragraph, target).await?);
        }

        info!(
            target = %target,
            segments = paragraphs.len() + 1,
            latency_seconds = started.elapsed().as_secs_f64(),
            "story translated"
        );
        Ok(TranslatedStory {
            title: translated_title,
            paragraphs: translated,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
