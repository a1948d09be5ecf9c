//! Backoff Executor
//!
//! Generic retry wrapper around a remote call. Two recoveries are attempted
//! locally, everything else propagates immediately:
//!
//! - **Rate limits**: sleep, then grow the delay by
//!   `exponential_base * (1 + jitter * uniform(0,1))`, up to `max_retries`
//!   attempts. Pre-jitter, the i-th sleep equals
//!   `initial_delay * exponential_base^i`.
//! - **Image content-policy rejections**: rewrite the prompt through the
//!   configured [`PromptRepairer`] and retry exactly once per invocation.
//!   The repair retry does not count against `max_retries`.

use async_trait::async_trait;
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, trace, warn};

use crate::config::BackoffConfig;
use crate::types::{ProviderError, Result, TaleError};

// =============================================================================
// Policy
// =============================================================================

/// Retry-curve parameters for one executor
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Multiplier applied after each rate-limited attempt
    pub exponential_base: f64,
    /// Randomize growth to spread synchronized clients
    pub jitter: bool,
    /// Maximum rate-limit retries per invocation
    pub max_retries: u32,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(crate::constants::backoff::INITIAL_DELAY_MS),
            exponential_base: crate::constants::backoff::EXPONENTIAL_BASE,
            jitter: true,
            max_retries: crate::constants::backoff::DEFAULT_MAX_RETRIES,
        }
    }
}

impl From<&BackoffConfig> for BackoffPolicy {
    fn from(config: &BackoffConfig) -> Self {
        Self {
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            exponential_base: config.exponential_base,
            jitter: config.jitter,
            max_retries: config.max_retries,
        }
    }
}

impl BackoffPolicy {
    /// Deterministic delay for the i-th retry with jitter disabled:
    /// `initial_delay * exponential_base^i`
    pub fn pre_jitter_delay(&self, retry: u32) -> Duration {
        self.initial_delay
            .mul_f64(self.exponential_base.powi(retry as i32))
    }

    /// Grow the current delay, with jitter when enabled
    fn next_delay(&self, current: Duration) -> Duration {
        let jitter = if self.jitter {
            rand::rng().random::<f64>()
        } else {
            0.0
        };
        current.mul_f64(self.exponential_base * (1.0 + jitter))
    }
}

// =============================================================================
// Prompt Repair Hook
// =============================================================================

/// Rewrites a content-policy-rejected prompt before the single repair retry
#[async_trait]
pub trait PromptRepairer: Send + Sync {
    async fn repair(&self, prompt: &str) -> Result<String>;
}

// =============================================================================
// Attempt Log
// =============================================================================

/// Outcome of a single attempt inside the retry loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    RateLimited,
    PolicyRejected,
    Fatal,
}

/// One attempt in the retry loop; exists only for the loop's lifetime
#[derive(Debug, Clone)]
pub struct GenerationAttempt {
    pub attempt_number: u32,
    pub delay_before: Duration,
    pub outcome: AttemptOutcome,
}

// =============================================================================
// Executor
// =============================================================================

/// Explicitly composed retry strategy wrapped around each remote call
#[derive(Debug, Clone, Default)]
pub struct BackoffExecutor {
    policy: BackoffPolicy,
}

impl BackoffExecutor {
    pub fn new(policy: BackoffPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &BackoffPolicy {
        &self.policy
    }

    /// Run a call with rate-limit backoff only (chat completion, embeddings)
    pub async fn run<T, F, Fut>(&self, op: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = std::result::Result<T, ProviderError>>,
    {
        self.run_with_repair(String::new(), move |_| op(), None)
            .await
    }

    /// Run a prompt-driven call with rate-limit backoff and, when a repairer
    /// is supplied, a single prompt-repair retry on content-policy rejection
    pub async fn run_with_repair<T, F, Fut>(
        &self,
        prompt: String,
        op: F,
        repairer: Option<&dyn PromptRepairer>,
    ) -> Result<T>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = std::result::Result<T, ProviderError>>,
    {
        let mut attempts: Vec<GenerationAttempt> = Vec::new();
        let mut rate_limit_attempts = 0u32;
        let mut attempt_number = 0u32;
        let mut delay = self.policy.initial_delay;
        let mut delay_before = Duration::ZERO;
        let mut repaired = false;
        let mut prompt = prompt;

        loop {
            attempt_number += 1;

            match op(prompt.clone()).await {
                Ok(value) => {
                    attempts.push(GenerationAttempt {
                        attempt_number,
                        delay_before,
                        outcome: AttemptOutcome::Success,
                    });
                    trace!(?attempts, "attempt history");
                    debug!(attempts = attempt_number, "remote call succeeded");
                    return Ok(value);
                }
                Err(err) if err.is_retryable() => {
                    attempts.push(GenerationAttempt {
                        attempt_number,
                        delay_before,
                        outcome: AttemptOutcome::RateLimited,
                    });
                    rate_limit_attempts += 1;

                    if rate_limit_attempts > self.policy.max_retries {
                        trace!(?attempts, "attempt history");
                        warn!(
                            attempts = attempt_number,
                            max_retries = self.policy.max_retries,
                            error = %err,
                            "retry budget exhausted"
                        );
                        return Err(TaleError::RetriesExhausted {
                            attempts: attempt_number,
                            last: err,
                        });
                    }

                    warn!(
                        attempt = rate_limit_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "rate limited, backing off"
                    );
                    sleep(delay).await;
                    delay_before = delay;
                    delay = self.policy.next_delay(delay);
                }
                Err(err) if err.is_repairable() && !repaired => {
                    let Some(repairer) = repairer else {
                        attempts.push(GenerationAttempt {
                            attempt_number,
                            delay_before,
                            outcome: AttemptOutcome::Fatal,
                        });
                        trace!(?attempts, "attempt history");
                        error!(
                            provider = %err.provider,
                            error_kind = %err.kind,
                            message = %err.message,
                            "remote call failed"
                        );
                        return Err(TaleError::Provider(err));
                    };

                    attempts.push(GenerationAttempt {
                        attempt_number,
                        delay_before,
                        outcome: AttemptOutcome::PolicyRejected,
                    });
                    repaired = true;

                    warn!(error = %err, "prompt rejected by content policy, attempting repair");
                    prompt = repairer.repair(&prompt).await?;
                    debug!(prompt = %prompt, "retrying with repaired prompt");
                    delay_before = Duration::ZERO;
                }
                Err(err) => {
                    attempts.push(GenerationAttempt {
                        attempt_number,
                        delay_before,
                        outcome: AttemptOutcome::Fatal,
                    });
                    trace!(?attempts, "attempt history");
                    error!(
                        provider = %err.provider,
                        error_kind = %err.kind,
                        message = %err.message,
                        "remote call failed"
                    );
                    return Err(TaleError::Provider(err));
                }
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
