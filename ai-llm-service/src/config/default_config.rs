//! Default LLM configs loaded strictly from environment variables.
//!
//! Two roles are wired for the tutoring backend:
//!
//! - **Chat**      → the generative model answering tutoring prompts
//! - **Embedding** → the embedding model used by retrieval and anchoring checks
//!
//! # Environment variables
//!
//! Chat:
//! - `LLM_KIND`          = `openai` (default) or `ollama`
//! - `LLM_MAX_TOKENS`    = optional max tokens (u32)
//! - `LLM_TEMPERATURE`   = optional temperature (default `0.7`, range `0.0..=2.0`)
//! - `LLM_TIMEOUT_SECS`  = optional request timeout (default `60`)
//! - `OPENAI_URL`        = base URL (default `https://api.openai.com`)
//! - `OPENAI_API_KEY`    = required for `openai`
//! - `OPENAI_MODEL`      = model (default `gpt-4o-mini`)
//! - `OLLAMA_URL` or `OLLAMA_PORT` = endpoint (required for `ollama`)
//! - `OLLAMA_MODEL`      = model (required for `ollama`)
//!
//! Embedding:
//! - `EMBEDDING_KIND`    = `ollama` (default) or `openai`
//! - `EMBEDDING_MODEL`   = embedding model (required)

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{
        AiLlmError, ConfigError, env_opt, env_opt_f32, env_opt_u32, env_opt_u64, must_env,
        validate_http_endpoint, validate_range_f32,
    },
};

const DEFAULT_OPENAI_URL: &str = "https://api.openai.com";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Resolves the Ollama endpoint strictly from environment.
///
/// Precedence:
/// 1. `OLLAMA_URL` if present and non-empty
/// 2. `OLLAMA_PORT` → `http://localhost:{port}`
///
/// # Errors
///
/// - [`ConfigError::MissingVar`] if both are missing
/// - [`ConfigError::InvalidNumber`] if `OLLAMA_PORT` is invalid
fn ollama_endpoint() -> Result<String, AiLlmError> {
    if let Some(url) = env_opt("OLLAMA_URL") {
        validate_http_endpoint("OLLAMA_URL", &url)?;
        return Ok(url);
    }
    if let Some(port) = env_opt("OLLAMA_PORT") {
        port.trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidNumber {
                var: "OLLAMA_PORT",
                reason: "expected u16 (1..=65535)",
            })?;
        return Ok(format!("http://localhost:{}", port.trim()));
    }
    Err(AiLlmError::Config(ConfigError::MissingVar(
        "OLLAMA_URL or OLLAMA_PORT",
    )))
}

fn openai_endpoint() -> Result<String, AiLlmError> {
    let url = env_opt("OPENAI_URL").unwrap_or_else(|| DEFAULT_OPENAI_URL.to_string());
    validate_http_endpoint("OPENAI_URL", &url)?;
    Ok(url)
}

fn provider_from_env(var: &'static str, default: LlmProvider) -> Result<LlmProvider, AiLlmError> {
    match env_opt(var) {
        Some(v) => Ok(v.parse::<LlmProvider>()?),
        None => Ok(default),
    }
}

/// Constructs the config for the **chat** model answering tutoring prompts.
///
/// # Defaults
/// - provider `openai`, model `gpt-4o-mini`
/// - `temperature = Some(0.7)`
/// - `timeout_secs = Some(60)`
pub fn config_chat_from_env() -> Result<LlmModelConfig, AiLlmError> {
    let provider = provider_from_env("LLM_KIND", LlmProvider::OpenAI)?;
    let max_tokens = env_opt_u32("LLM_MAX_TOKENS")?;
    let temperature = env_opt_f32("LLM_TEMPERATURE")?.unwrap_or(DEFAULT_TEMPERATURE);
    validate_range_f32("LLM_TEMPERATURE", temperature, 0.0, 2.0)?;
    let timeout_secs = env_opt_u64("LLM_TIMEOUT_SECS")?.unwrap_or(DEFAULT_TIMEOUT_SECS);

    let (endpoint, model, api_key) = match provider {
        LlmProvider::OpenAI => (
            openai_endpoint()?,
            env_opt("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            Some(must_env("OPENAI_API_KEY")?),
        ),
        LlmProvider::Ollama => (ollama_endpoint()?, must_env("OLLAMA_MODEL")?, None),
    };

    Ok(LlmModelConfig {
        provider,
        model,
        endpoint,
        api_key,
        max_tokens,
        temperature: Some(temperature),
        top_p: None,
        timeout_secs: Some(timeout_secs),
    })
}

/// Constructs the config for the **embedding** model.
///
/// Used for corpus ingestion, query embedding, and hint-anchoring checks, so the
/// same model must serve all three.
///
/// # Defaults
/// - provider `ollama`
/// - `temperature = Some(0.0)` (deterministic)
/// - `timeout_secs = Some(30)`
pub fn config_embedding_from_env() -> Result<LlmModelConfig, AiLlmError> {
    let provider = provider_from_env("EMBEDDING_KIND", LlmProvider::Ollama)?;
    let model = must_env("EMBEDDING_MODEL")?;

    let (endpoint, api_key) = match provider {
        LlmProvider::OpenAI => (openai_endpoint()?, Some(must_env("OPENAI_API_KEY")?)),
        LlmProvider::Ollama => (ollama_endpoint()?, None),
    };

    Ok(LlmModelConfig {
        provider,
        model,
        endpoint,
        api_key,
        max_tokens: None,
        temperature: Some(0.0),
        top_p: None,
        timeout_secs: Some(30),
    })
}
