use std::sync::Arc;

use ai_llm_service::{
    LlmServiceProfiles,
    config::default_config::{config_chat_from_env, config_embedding_from_env},
};
use anyhow::Context;
use api::AppState;
use rag_store::{LlmEmbedder, RagConfig, RagStore};
use tracing::{info, warn};
use tutor_core::{TutorConfig, TutorEngine};

mod telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from an optional .env file.
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e).context("failed to read .env");
        }
    }

    telemetry::init().context("failed to install tracing subscriber")?;

    let tutor_cfg = TutorConfig::from_env()?;
    let rag_cfg = RagConfig::from_env()?;
    let llm = Arc::new(LlmServiceProfiles::new(
        config_chat_from_env()?,
        config_embedding_from_env()?,
    ));

    let embedder = Arc::new(LlmEmbedder::new(llm.clone(), rag_cfg.embedding_dim));
    let store = Arc::new(RagStore::new(rag_cfg)?);

    if corpus_build_enabled() {
        let ingested = store
            .ensure_corpus(embedder.as_ref())
            .await
            .context("corpus ingestion failed")?;
        info!(collection = %store.config().collection, ingested, "corpus ready");
    } else {
        info!(collection = %store.config().collection, "CORPUS_BUILD=false, ingestion skipped");
    }

    let sessions = Arc::new(tutor_cfg.session_store());
    let engine = TutorEngine::new(
        tutor_cfg,
        embedder.clone(),
        store.clone(),
        llm.clone(),
        sessions,
    );

    let state = AppState::new(Arc::new(engine), llm, embedder, store.clone(), store);
    if !state.cookie.secure {
        warn!("session cookie is sent without Secure; set SESSION_COOKIE_SECURE=true behind https");
    }

    api::start(state).await?;
    Ok(())
}

/// `CORPUS_BUILD` (default `true`) controls the startup ingestion step.
fn corpus_build_enabled() -> bool {
    std::env::var("CORPUS_BUILD")
        .map(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no"))
        .unwrap_or(true)
}
