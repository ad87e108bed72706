//! Retrieval helpers: vector search shaped into aligned texts and scores.

use tracing::trace;

use crate::config::RagConfig;
use crate::errors::RagError;
use crate::qdrant_facade::QdrantFacade;
use crate::record::RetrievedDocs;

/// Searches the top-`k` documents for a ready query vector.
///
/// Hits whose payload carries no `text` are dropped together with their score,
/// so `texts` and `distances` stay aligned.
pub async fn query(
    cfg: &RagConfig,
    client: &QdrantFacade,
    vector: Vec<f32>,
    k: u64,
) -> Result<RetrievedDocs, RagError> {
    if vector.len() != cfg.embedding_dim {
        return Err(RagError::VectorSizeMismatch {
            got: vector.len(),
            want: cfg.embedding_dim,
        });
    }

    let hits = client.search(vector, k, cfg.exact_search).await?;
    let docs = to_docs(hits);
    trace!(k, hits = docs.texts.len(), "retrieve::query");
    Ok(docs)
}

fn to_docs(hits: Vec<(f32, serde_json::Value)>) -> RetrievedDocs {
    let mut docs = RetrievedDocs::default();
    for (score, payload) in hits {
        if let Some(text) = payload.get("text").and_then(|v| v.as_str()) {
            docs.texts.push(text.to_string());
            docs.distances.push(score);
        }
    }
    docs
}
