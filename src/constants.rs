//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Backoff executor constants
pub mod backoff {
    /// Initial delay before the first retry (milliseconds)
    pub const INITIAL_DELAY_MS: u64 = 1_000;

    /// Multiplier applied to the delay after each rate-limited attempt
    pub const EXPONENTIAL_BASE: f64 = 2.0;

    /// Default maximum rate-limit retries per invocation
    pub const DEFAULT_MAX_RETRIES: u32 = 3;
}

/// Moderation gate constants
pub mod moderation {
    /// Scores at or below this value pass the gate; above it the pipeline
    /// aborts. Inclusive pass is a pinned policy decision.
    pub const TOXICITY_THRESHOLD: f64 = 0.3;

    /// Attribute requested from the comment-analysis provider
    pub const REQUESTED_ATTRIBUTE: &str = "TOXICITY";
}

/// Story generation constants
pub mod generation {
    /// Default chat-completion model
    pub const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo";

    /// High-variance temperature favoring creative diversity over determinism
    pub const STORY_TEMPERATURE: f32 = 1.3;

    /// Default embedding model for prompt-repair keyword ranking
    pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
}

/// Illustration constants
pub mod illustration {
    /// Fixed output resolution
    pub const IMAGE_SIZE: &str = "1024x1024";

    /// Images generated per request
    pub const IMAGE_COUNT: u8 = 1;

    /// Highest-fidelity image model (golden and silver tickets)
    pub const PREMIUM_MODEL: &str = "dall-e-3";

    /// Lower-cost image model (pink tickets)
    pub const BUDGET_MODEL: &str = "dall-e-2";

    /// High-quality rendering (golden tickets only)
    pub const QUALITY_HIGH: &str = "hd";

    /// Standard-quality rendering
    pub const QUALITY_STANDARD: &str = "standard";
}

/// Translation constants
pub mod translation {
    /// Canonical pipeline language; moderation and generation always run on
    /// text translated to this code, and output translation is skipped when
    /// the caller requests it.
    pub const CANONICAL_TARGET: &str = "EN-US";
}

/// HTTP/Network constants
pub mod network {
    /// Default per-provider request timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
}
