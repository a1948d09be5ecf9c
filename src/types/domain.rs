//! Request-Scoped Domain Types
//!
//! Entities in the generation pipeline are transient and in-memory; they are
//! created per invocation and destroyed with the response. Nothing here is
//! persisted by the core.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::translation::CANONICAL_TARGET;
use crate::types::error::{Result, TaleError};

// =============================================================================
// Ticket Tiers
// =============================================================================

/// Prepaid entitlement determining which image model/quality a request may use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketTier {
    Golden,
    Silver,
    Pink,
}

impl TicketTier {
    pub const ALL: [Self; 3] = [Self::Golden, Self::Silver, Self::Pink];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Golden => "golden",
            Self::Silver => "silver",
            Self::Pink => "pink",
        }
    }

    /// Tier name as shown in user-facing Korean messages
    pub fn korean_name(&self) -> &'static str {
        match self {
            Self::Golden => "골드",
            Self::Silver => "실버",
            Self::Pink => "핑크",
        }
    }
}

impl fmt::Display for TicketTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TicketTier {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "golden" => Ok(Self::Golden),
            "silver" => Ok(Self::Silver),
            "pink" => Ok(Self::Pink),
            _ => Err(format!(
                "Invalid ticket tier '{}'. Valid values: golden, silver, pink",
                s
            )),
        }
    }
}

/// Per-user ticket balance, owned by the account collaborator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketBalance {
    pub golden: u32,
    pub silver: u32,
    pub pink: u32,
}

impl TicketBalance {
    pub fn new(golden: u32, silver: u32, pink: u32) -> Self {
        Self {
            golden,
            silver,
            pink,
        }
    }

    /// Balance for a single tier
    pub fn of(&self, tier: TicketTier) -> u32 {
        match tier {
            TicketTier::Golden => self.golden,
            TicketTier::Silver => self.silver,
            TicketTier::Pink => self.pink,
        }
    }

    pub(crate) fn slot_mut(&mut self, tier: TicketTier) -> &mut u32 {
        match tier {
            TicketTier::Golden => &mut self.golden,
            TicketTier::Silver => &mut self.silver,
            TicketTier::Pink => &mut self.pink,
        }
    }
}

// =============================================================================
// Language Codes
// =============================================================================

/// Type-safe wrapper for translation target codes (e.g. "KO", "EN-US")
///
/// Prevents accidental mixing of language codes with other string types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageCode(String);

impl LanguageCode {
    /// Parse and normalize a language code (uppercased, `XX` or `XX-YY`)
    pub fn new(code: impl Into<String>) -> Result<Self> {
        let normalized = code.into().trim().to_uppercase();
        if normalized.is_empty() {
            return Err(TaleError::EmptyInput {
                field: "target_language",
            });
        }
        let valid = normalized.len() <= 5
            && normalized
                .chars()
                .all(|c| c.is_ascii_uppercase() || c == '-');
        if !valid {
            return Err(TaleError::Config(format!(
                "Invalid language code: {}",
                normalized
            )));
        }
        Ok(Self(normalized))
    }

    /// Canonical pipeline language (moderation and generation run on this)
    pub fn canonical_english() -> Self {
        Self(CANONICAL_TARGET.to_string())
    }

    /// Check whether output translation can be skipped entirely
    pub fn is_canonical_english(&self) -> bool {
        self.0 == CANONICAL_TARGET
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for LanguageCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// User Ids
// =============================================================================

/// Type-safe wrapper for user identifiers from the account collaborator
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// =============================================================================
// Pipeline Requests
// =============================================================================

/// One fairy-tale generation call, created per request and then dropped
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// User-submitted story topic, any language
    pub topic: String,
    /// Language the finished story should be returned in
    pub target_language: LanguageCode,
}

impl GenerationRequest {
    pub fn new(topic: impl Into<String>, target_language: LanguageCode) -> Self {
        Self {
            topic: topic.into(),
            target_language,
        }
    }
}

/// One illustration call for a single story paragraph
#[derive(Debug, Clone)]
pub struct IllustrationRequest {
    /// Requesting user, for the ticket check and debit
    pub user: UserId,
    /// Paragraph text to illustrate, any language
    pub script: String,
    /// Ticket tier the user chose to spend
    pub tier: TicketTier,
}

// =============================================================================
// Moderation
// =============================================================================

/// Scored moderation verdict; produced by the toxicity scorer and consumed
/// once by the orchestrator's gate
#[derive(Debug, Clone)]
pub struct ModerationResult {
    /// Harmful-content likelihood in [0, 1]
    pub score: f64,
    /// Text the score was computed on
    pub source_text: String,
}

impl ModerationResult {
    pub fn new(score: f64, source_text: impl Into<String>) -> Self {
        Self {
            score,
            source_text: source_text.into(),
        }
    }

    /// Gate check: scores at or below the threshold pass
    pub fn passes(&self, threshold: f64) -> bool {
        self.score <= threshold
    }
}

// =============================================================================
// Tests
// =============================================================================
