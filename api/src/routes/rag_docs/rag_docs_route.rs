//! GET /rag/docs: every indexed corpus line, for inspecting what the gate retrieves from.

use std::sync::Arc;

use axum::extract::State;
use tracing::debug;
use tutor_core::TutorError;

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::{AppError, AppResult},
    routes::rag_docs::rag_docs_response::RagDocsResponse,
};

pub async fn rag_docs_route(
    State(state): State<Arc<AppState>>,
) -> AppResult<ApiResponse<RagDocsResponse>> {
    let documents = state
        .catalog
        .list_documents()
        .await
        .map_err(TutorError::from)?
        .ok_or_else(|| AppError::NotFound("corpus collection does not exist".into()))?;

    debug!(documents = documents.len(), "rag_docs_route: listed");
    Ok(ApiResponse::success(RagDocsResponse {
        collection_size: documents.len(),
        documents,
    }))
}
