//! Generation Pipeline
//!
//! The end-to-end story use cases: fairy-tale generation with two toxicity
//! gates, ticket-gated illustration, and story re-translation. Provider
//! clients are injected once at construction; each invocation is one
//! sequential request-scoped unit.

pub mod generator;
pub mod illustrator;
pub mod orchestrator;
pub mod tickets;

pub use generator::StoryGenerator;
pub use illustrator::Illustrator;
pub use orchestrator::{
    AbortReason, PipelineOutcome, PipelineRun, PipelineState, StoryPipeline, TranslatedStory,
};
pub use tickets::{DebitOutcome, InMemoryTicketStore, SharedTicketStore, TicketStore};
