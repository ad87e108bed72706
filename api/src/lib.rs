use std::{env, sync::Arc};

pub mod core;
pub mod error_handler;
mod routes;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use tokio::signal;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{error, info};

pub use crate::core::app_state::AppState;
pub use crate::core::http::session_cookie::CookiePolicy;
pub use crate::error_handler::{AppError, AppResult};

use crate::routes::{
    llm_chat::llm_chat_route::llm_chat_route, question::question_route::question_route,
    rag_docs::rag_docs_route::rag_docs_route, rag_query::rag_query_route::rag_query_route,
};

const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173";

/// All routes, without the CORS layer.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/question", post(question_route))
        .route("/llm/chat", post(llm_chat_route))
        .route("/rag/k-query", post(rag_query_route))
        .route("/rag/docs", get(rag_docs_route))
        .with_state(Arc::new(state))
}

/// Credentialed CORS for a comma-separated origin list.
pub fn cors_layer(origins: &str) -> AppResult<CorsLayer> {
    let origins = origins
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(|o| {
            HeaderValue::from_str(o).map_err(|_| AppError::Config(format!("invalid CORS origin: {o}")))
        })
        .collect::<AppResult<Vec<_>>>()?;
    if origins.is_empty() {
        return Err(AppError::Config("CORS_ALLOW_ORIGINS is empty".into()));
    }

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]))
}

pub async fn start(state: AppState) -> AppResult<()> {
    let host_url = env::var("API_ADDRESS").map_err(|_| AppError::MissingEnv("API_ADDRESS"))?;
    let origins =
        env::var("CORS_ALLOW_ORIGINS").unwrap_or_else(|_| DEFAULT_CORS_ORIGINS.to_string());

    let app = router(state).layer(cors_layer(&origins)?);

    // Bind to address
    let listener = tokio::net::TcpListener::bind(&host_url)
        .await
        .map_err(AppError::Bind)?;
    info!(address = %host_url, cors = %origins, "api listening");

    // Start server with graceful shutdown on Ctrl+C
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("api stopped");
    Ok(())
}

/// Returns a future that resolves when Ctrl+C is pressed
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cors_origins_are_validated() {
        assert!(cors_layer("http://localhost:5173, https://tutor.example.com").is_ok());
        assert!(matches!(cors_layer(" , "), Err(AppError::Config(_))));
        assert!(matches!(cors_layer("http://bad\norigin"), Err(AppError::Config(_))));
    }
}
