//! POST /question: one tutoring turn.

use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, header},
    response::{IntoResponse, Response},
};
use tracing::debug;
use tutor_core::TokenAction;

use crate::{
    core::{app_state::AppState, http::session_cookie},
    error_handler::AppResult,
    routes::question::question_request::QuestionRequest,
};

/// Handler: POST /question
///
/// The body is the reply itself (`{"type": "service" | "summary", "text": ...}`).
/// The session token travels in the `session_id` cookie: set when a session
/// opens, untouched while it runs, expired when it closes.
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8080/question -c jar -b jar \
///   -H 'content-type: application/json' \
///   -d '{"question":"이자겸의 난은 언제 발생했어?"}'
/// ```
pub async fn question_route(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<QuestionRequest>, JsonRejection>,
) -> AppResult<Response> {
    let Json(body) = payload?;
    let session_id = session_cookie::session_id(&headers);

    let outcome = state
        .engine
        .handle(session_id.as_deref(), &body.question)
        .await?;

    let set_cookie = match &outcome.token {
        TokenAction::Issue(id) => state.cookie.issue(id),
        TokenAction::Keep => None,
        TokenAction::Clear => state.cookie.clear(),
    };
    debug!(token = ?outcome.token, "question_route: turn handled");

    let mut response = Json(outcome.reply).into_response();
    if let Some(value) = set_cookie {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    Ok(response)
}
