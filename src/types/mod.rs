pub mod domain;
pub mod error;

pub use domain::{
    GenerationRequest, IllustrationRequest, LanguageCode, ModerationResult, TicketBalance,
    TicketTier, UserId,
};
pub use error::{ErrorClassifier, ErrorKind, ProviderError, Result, TaleError};
