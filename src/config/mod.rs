//! Configuration Management
//!
//! Figment-layered configuration with provider credentials injected at
//! process start. See [`loader::ConfigLoader`] for the resolution chain.

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    BackoffConfig, Config, DeepLConfig, OpenAiConfig, PerspectiveConfig, PipelineConfig,
    ProvidersConfig, TicketsConfig,
};
