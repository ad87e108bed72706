use std::sync::Arc;

use tutor_core::TutorEngine;
use tutor_core::ports::{DocumentCatalog, Embedder, RetrievalIndex, TextGenerator};

use crate::core::http::session_cookie::CookiePolicy;

/// Shared state for all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Tutoring protocol; owns the session store.
    pub engine: Arc<TutorEngine>,
    /// Raw text generator behind `/llm/chat`.
    pub generator: Arc<dyn TextGenerator>,
    /// Embedder and index behind `/rag/k-query`.
    pub embedder: Arc<dyn Embedder>,
    pub index: Arc<dyn RetrievalIndex>,
    /// Corpus listing behind `/rag/docs`.
    pub catalog: Arc<dyn DocumentCatalog>,
    pub cookie: CookiePolicy,
}

impl AppState {
    pub fn new(
        engine: Arc<TutorEngine>,
        generator: Arc<dyn TextGenerator>,
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn RetrievalIndex>,
        catalog: Arc<dyn DocumentCatalog>,
    ) -> Self {
        Self {
            engine,
            generator,
            embedder,
            index,
            catalog,
            cookie: CookiePolicy::from_env(),
        }
    }

    pub fn with_cookie_policy(mut self, cookie: CookiePolicy) -> Self {
        self.cookie = cookie;
        self
    }
}
