//! POST /llm/chat: direct call to the text generator, no tutoring protocol.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use tracing::info;
use tutor_core::{TutorError, prompt::CHAT_SYSTEM};

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::AppResult,
    routes::llm_chat::llm_chat_request::{LlmChatRequest, LlmChatResponse},
};

pub async fn llm_chat_route(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LlmChatRequest>, JsonRejection>,
) -> AppResult<ApiResponse<LlmChatResponse>> {
    let Json(body) = payload?;
    let started = Instant::now();

    let response = state
        .generator
        .complete(CHAT_SYSTEM, &body.prompt, body.max_new_tokens)
        .await
        .map_err(TutorError::from)?;

    info!(
        max_new_tokens = body.max_new_tokens,
        latency_ms = started.elapsed().as_millis() as u64,
        "llm_chat_route: completed"
    );
    Ok(ApiResponse::success(LlmChatResponse { response }))
}
