//! Unified Error Type System
//!
//! Centralized error types for the entire application.
//! Remote-provider failures are carried as a structured [`ProviderError`]
//! with a closed [`ErrorKind`] so callers match on kind instead of catching
//! heterogeneous provider exceptions.
//!
//! ## Error Kinds
//!
//! - **QuotaExceeded**: provider usage cap reached (fatal, 400-class)
//! - **RateLimited**: transient throttling (retried by the backoff executor)
//! - **PolicyRejected**: content-policy rejection (repairable for images)
//! - **Auth**: credential misconfiguration (fatal, 500-class)
//! - **Unprocessable**: provider rejected a well-formed request (500-class)
//! - **Upstream**: other provider-side failures (500-class)
//! - **Unexpected**: catch-all (500-class)

use std::time::Duration;
use thiserror::Error;

use crate::types::domain::TicketTier;

// =============================================================================
// Error Kinds
// =============================================================================

/// Closed error-kind enumeration for routing and recovery decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Provider-level usage cap reached - fatal, surface to caller
    QuotaExceeded,
    /// Rate limited - retry with exponential backoff
    RateLimited,
    /// Content policy rejection - prompt repair for image generation
    PolicyRejected,
    /// Authentication failed - fail fast, credential misconfiguration
    Auth,
    /// Provider rejected a well-formed request
    Unprocessable,
    /// Other provider-side failure (5xx and friends)
    Upstream,
    /// Unknown error - no recovery
    Unexpected,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::QuotaExceeded => write!(f, "QUOTA_EXCEEDED"),
            Self::RateLimited => write!(f, "RATE_LIMITED"),
            Self::PolicyRejected => write!(f, "POLICY_REJECTED"),
            Self::Auth => write!(f, "AUTH"),
            Self::Unprocessable => write!(f, "UNPROCESSABLE"),
            Self::Upstream => write!(f, "UPSTREAM"),
            Self::Unexpected => write!(f, "UNEXPECTED"),
        }
    }
}

impl ErrorKind {
    /// Check if the backoff executor may retry this kind on the same provider
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited)
    }

    /// Check if a prompt-repair fallback may be attempted (image generation)
    pub fn is_repairable(&self) -> bool {
        matches!(self, Self::PolicyRejected)
    }
}

// =============================================================================
// Provider Error
// =============================================================================

/// Structured remote-provider error with kind, context, and retry hints
#[derive(Debug, Clone)]
pub struct ProviderError {
    /// Error kind for routing decisions
    pub kind: ErrorKind,
    /// Detailed error message
    pub message: String,
    /// Provider that produced the error
    pub provider: String,
    /// Suggested wait time before retry (if the provider sent one)
    pub retry_after: Option<Duration>,
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}:{}] {}", self.provider, self.kind, self.message)
    }
}

impl std::error::Error for ProviderError {}

impl ProviderError {
    /// Create a new provider error
    pub fn new(kind: ErrorKind, provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            provider: provider.into(),
            retry_after: None,
        }
    }

    /// Add a suggested retry delay
    pub fn retry_after(mut self, duration: Duration) -> Self {
        self.retry_after = Some(duration);
        self
    }

    /// Check if the backoff executor may retry this error
    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    /// Check if a prompt-repair fallback applies
    pub fn is_repairable(&self) -> bool {
        self.kind.is_repairable()
    }
}

// =============================================================================
// Error Classifier
// =============================================================================

/// Maps provider HTTP responses onto the closed kind enumeration
pub struct ErrorClassifier;

impl ErrorClassifier {
    /// Classify a chat/image/embedding API response status
    ///
    /// A 400 from these endpoints is a content-policy rejection of the
    /// prompt itself, which is what the repair fallback keys on.
    pub fn openai_status(status: u16, message: &str) -> ProviderError {
        let kind = match status {
            429 => ErrorKind::RateLimited,
            400 => ErrorKind::PolicyRejected,
            401 | 403 => ErrorKind::Auth,
            422 => ErrorKind::Unprocessable,
            500..=599 => ErrorKind::Upstream,
            _ => ErrorKind::Unexpected,
        };
        let err = ProviderError::new(kind, "openai", message);
        if kind == ErrorKind::RateLimited {
            err.retry_after(Duration::from_secs(1))
        } else {
            err
        }
    }

    /// Classify a translation API response status
    ///
    /// DeepL signals a consumed usage cap with the non-standard 456.
    pub fn deepl_status(status: u16, message: &str) -> ProviderError {
        let kind = match status {
            456 => ErrorKind::QuotaExceeded,
            429 => ErrorKind::RateLimited,
            401 | 403 => ErrorKind::Auth,
            400 => ErrorKind::Unprocessable,
            500..=599 => ErrorKind::Upstream,
            _ => ErrorKind::Unexpected,
        };
        ProviderError::new(kind, "deepl", message)
    }

    /// Classify a comment-analysis API response status
    pub fn perspective_status(status: u16, message: &str) -> ProviderError {
        let kind = match status {
            429 => ErrorKind::RateLimited,
            401 | 403 => ErrorKind::Auth,
            400 => ErrorKind::Unprocessable,
            500..=599 => ErrorKind::Upstream,
            _ => ErrorKind::Unexpected,
        };
        ProviderError::new(kind, "perspective", message)
    }

    /// Classify a transport-level failure (connection refused, timeout, ...)
    pub fn transport(provider: &str, err: &reqwest::Error) -> ProviderError {
        ProviderError::new(ErrorKind::Upstream, provider, err.to_string())
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum TaleError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // Provider Errors
    // -------------------------------------------------------------------------
    /// Structured provider error with kind and retry hints
    #[error("provider error: {0}")]
    Provider(ProviderError),

    /// Backoff executor exhausted its retry budget on rate limits
    #[error("retries exhausted after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: ProviderError },

    // -------------------------------------------------------------------------
    // Domain Errors
    // -------------------------------------------------------------------------
    /// Ticket precondition failure - no provider call was made
    #[error("insufficient {tier} tickets")]
    InsufficientTickets { tier: TicketTier },

    #[error("{field} must not be empty")]
    EmptyInput { field: &'static str },

    #[error("config error: {0}")]
    Config(String),
}

impl From<ProviderError> for TaleError {
    fn from(err: ProviderError) -> Self {
        TaleError::Provider(err)
    }
}

pub type Result<T> = std::result::Result<T, TaleError>;

impl TaleError {
    /// Stable machine-readable status class for the caller
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Provider(e) => match e.kind {
                ErrorKind::QuotaExceeded | ErrorKind::PolicyRejected => 400,
                ErrorKind::RateLimited => 429,
                ErrorKind::Auth
                | ErrorKind::Unprocessable
                | ErrorKind::Upstream
                | ErrorKind::Unexpected => 500,
            },
            Self::RetriesExhausted { .. } => 429,
            Self::InsufficientTickets { .. } => 402,
            Self::EmptyInput { .. } => 400,
            Self::Io(_) | Self::Json(_) | Self::Config(_) => 500,
        }
    }

    /// Human-readable message shown to the end user
    pub fn user_message(&self) -> String {
        match self {
            Self::Provider(e) => match e.kind {
                ErrorKind::QuotaExceeded => {
                    "번역 사용량이 초과되었습니다. 고객센터에 문의해주세요.".to_string()
                }
                ErrorKind::RateLimited => {
                    "요청이 많아 처리할 수 없습니다. 잠시 후 다시 시도해주세요.".to_string()
                }
                ErrorKind::PolicyRejected => {
                    "주제가 콘텐츠 정책에 위배됩니다. 주제를 수정해주세요.".to_string()
                }
                ErrorKind::Auth => {
                    "서비스 설정에 문제가 있습니다. 관리자에게 문의해주세요.".to_string()
                }
                ErrorKind::Unprocessable | ErrorKind::Upstream | ErrorKind::Unexpected => {
                    "죄송합니다. 예기치 않은 문제가 발생했습니다. 잠시 후 다시 시도해주세요."
                        .to_string()
                }
            },
            Self::RetriesExhausted { .. } => {
                "요청이 많아 처리할 수 없습니다. 잠시 후 다시 시도해주세요.".to_string()
            }
            Self::InsufficientTickets { tier } => {
                format!("{} 티켓이 부족합니다.", tier.korean_name())
            }
            Self::EmptyInput { field } => format!("{} 값을 입력해주세요.", field),
            Self::Io(_) | Self::Json(_) | Self::Config(_) => {
                "죄송합니다. 예기치 않은 문제가 발생했습니다. 잠시 후 다시 시도해주세요."
                    .to_string()
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_display() {
        assert_eq!(ErrorKind::QuotaExceeded.to_string(), "QUOTA_EXCEEDED");
        assert_eq!(ErrorKind::RateLimited.to_string(), "RATE_LIMITED");
        assert_eq!(ErrorKind::PolicyRejected.to_string(), "POLICY_REJECTED");
    }

    #[test]
    fn test_error_kind_routing() {
        assert!(ErrorKind::RateLimited.is_retryable());
        assert!(!ErrorKind::QuotaExceeded.is_retryable());
        assert!(!ErrorKind::Auth.is_retryable());

        assert!(ErrorKind::PolicyRejected.is_repairable());
        assert!(!ErrorKind::RateLimited.is_repairable());
    }

    #[test]
    fn test_classify_openai_status() {
        assert_eq!(
            ErrorClassifier::openai_status(429, "slow down").kind,
            ErrorKind::RateLimited
        );
        assert_eq!(
            ErrorClassifier::openai_status(400, "content policy").kind,
            ErrorKind::PolicyRejected
        );
        assert_eq!(
            ErrorClassifier::openai_status(401, "bad key").kind,
            ErrorKind::Auth
        );
        assert_eq!(
            ErrorClassifier::openai_status(422, "unprocessable").kind,
            ErrorKind::Unprocessable
        );
        assert_eq!(
            ErrorClassifier::openai_status(503, "overloaded").kind,
            ErrorKind::Upstream
        );
    }

    #[test]
    fn test_classify_deepl_quota() {
        let err = ErrorClassifier::deepl_status(456, "quota exceeded");
        assert_eq!(err.kind, ErrorKind::QuotaExceeded);
        assert_eq!(err.provider, "deepl");
        assert!(!err.is_retryable());

        let err = ErrorClassifier::deepl_status(429, "too many requests");
        assert_eq!(err.kind, ErrorKind::RateLimited);
    }

    #[test]
    fn test_classify_perspective_status() {
        assert_eq!(
            ErrorClassifier::perspective_status(403, "forbidden").kind,
            ErrorKind::Auth
        );
        assert_eq!(
            ErrorClassifier::perspective_status(500, "internal").kind,
            ErrorKind::Upstream
        );
    }

    #[test]
    fn test_http_status_mapping() {
        let quota = TaleError::Provider(ProviderError::new(
            ErrorKind::QuotaExceeded,
            "deepl",
            "cap reached",
        ));
        assert_eq!(quota.http_status(), 400);

        let exhausted = TaleError::RetriesExhausted {
            attempts: 4,
            last: ProviderError::new(ErrorKind::RateLimited, "openai", "429"),
        };
        assert_eq!(exhausted.http_status(), 429);

        let tickets = TaleError::InsufficientTickets {
            tier: TicketTier::Golden,
        };
        assert_eq!(tickets.http_status(), 402);

        let auth = TaleError::Provider(ProviderError::new(ErrorKind::Auth, "openai", "401"));
        assert_eq!(auth.http_status(), 500);
    }

    #[test]
    fn test_user_messages() {
        let tickets = TaleError::InsufficientTickets {
            tier: TicketTier::Golden,
        };
        assert!(tickets.user_message().contains("골드"));

        let policy = TaleError::Provider(ProviderError::new(
            ErrorKind::PolicyRejected,
            "openai",
            "rejected",
        ));
        assert!(policy.user_message().contains("주제"));
    }

    #[test]
    fn test_provider_error_display() {
        let err = ProviderError::new(ErrorKind::RateLimited, "openai", "too many requests");
        assert_eq!(err.to_string(), "[openai:RATE_LIMITED] too many requests");
    }
}
