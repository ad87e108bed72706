//! Port implementations for the workspace's concrete clients.

use ai_llm_service::LlmServiceProfiles;
use futures::future::BoxFuture;
use rag_store::{EmbeddingsProvider, LlmEmbedder, RagStore};

use crate::error::UpstreamError;
use crate::ports::{
    DocumentCatalog, Embedder, RetrievalIndex, RetrievedDocs, StoredDocument, TextGenerator,
};

impl Embedder for LlmEmbedder {
    fn embed<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Vec<f32>, UpstreamError>> {
        Box::pin(async move {
            EmbeddingsProvider::embed(self, text)
                .await
                .map_err(|e| UpstreamError::Embedding(e.to_string()))
        })
    }
}

impl RetrievalIndex for RagStore {
    fn query<'a>(
        &'a self,
        vector: Vec<f32>,
        k: u64,
    ) -> BoxFuture<'a, Result<RetrievedDocs, UpstreamError>> {
        Box::pin(async move {
            RagStore::query(self, vector, k)
                .await
                .map_err(|e| UpstreamError::Retrieval(e.to_string()))
        })
    }
}

impl DocumentCatalog for RagStore {
    fn list_documents(&self) -> BoxFuture<'_, Result<Option<Vec<StoredDocument>>, UpstreamError>> {
        Box::pin(async move {
            RagStore::list_documents(self)
                .await
                .map_err(|e| UpstreamError::Retrieval(e.to_string()))
        })
    }
}

impl TextGenerator for LlmServiceProfiles {
    fn complete<'a>(
        &'a self,
        system: &'a str,
        user: &'a str,
        max_output_tokens: u32,
    ) -> BoxFuture<'a, Result<String, UpstreamError>> {
        Box::pin(async move {
            LlmServiceProfiles::complete(self, system, user, Some(max_output_tokens))
                .await
                .map_err(|e| UpstreamError::Generation(e.to_string()))
        })
    }
}
