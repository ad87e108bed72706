//! Shared generative-model access for the tutoring backend.
//!
//! - [`config`]: provider enum, per-model config, env-driven profile builders.
//! - [`services`]: thin REST clients for OpenAI-compatible APIs and Ollama.
//! - [`service_profiles`]: the `chat` + `embedding` facade used by the rest of the workspace.
//! - [`error_handler`]: the unified [`AiLlmError`] and env helpers.

pub mod config;
pub mod error_handler;
pub mod service_profiles;
pub mod services;

pub use config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider};
pub use error_handler::{AiLlmError, Result};
pub use service_profiles::LlmServiceProfiles;
