//! POST /rag/k-query: nearest corpus lines for a prompt, with their scores.

use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use tracing::debug;
use tutor_core::TutorError;

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::AppResult,
    routes::rag_query::rag_query_request::{RagQueryRequest, RagQueryResponse},
};

pub async fn rag_query_route(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RagQueryRequest>, JsonRejection>,
) -> AppResult<ApiResponse<RagQueryResponse>> {
    let Json(body) = payload?;

    let vector = state
        .embedder
        .embed(&body.prompt)
        .await
        .map_err(TutorError::from)?;
    let results = state
        .index
        .query(vector, body.k)
        .await
        .map_err(TutorError::from)?;

    debug!(k = body.k, hits = results.texts.len(), "rag_query_route: success");
    Ok(ApiResponse::success(RagQueryResponse {
        prompt: body.prompt,
        k: body.k,
        results,
    }))
}
