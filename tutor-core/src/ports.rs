//! Seams to the external collaborators: embedding model, vector index and
//! text generator. Injected as `Arc<dyn _>`.

use futures::future::BoxFuture;
pub use rag_store::{RetrievedDocs, StoredDocument};

use crate::error::UpstreamError;

/// Maps text to a fixed-dimension vector. Deterministic within a process.
pub trait Embedder: Send + Sync {
    fn embed<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Vec<f32>, UpstreamError>>;
}

/// k-nearest-neighbor search over the corpus.
pub trait RetrievalIndex: Send + Sync {
    fn query<'a>(
        &'a self,
        vector: Vec<f32>,
        k: u64,
    ) -> BoxFuture<'a, Result<RetrievedDocs, UpstreamError>>;
}

/// Opaque text completion: system instruction + user message → text.
pub trait TextGenerator: Send + Sync {
    fn complete<'a>(
        &'a self,
        system: &'a str,
        user: &'a str,
        max_output_tokens: u32,
    ) -> BoxFuture<'a, Result<String, UpstreamError>>;
}

/// Read-only listing of the indexed corpus.
pub trait DocumentCatalog: Send + Sync {
    /// `None` when the index holds no collection yet.
    fn list_documents(&self) -> BoxFuture<'_, Result<Option<Vec<StoredDocument>>, UpstreamError>>;
}
