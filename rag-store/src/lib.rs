//! Retrieval index over Qdrant: corpus ingestion + top-k search.
//!
//! The design is flat and splits responsibilities into focused modules.

mod config;
mod embed;
mod embed_pool;
mod errors;
mod ingest;
mod qdrant_facade;
mod record;
mod retrieve;

pub use config::{DistanceKind, RagConfig, VectorSpace};
pub use embed::{EmbeddingsProvider, llm_embedder::LlmEmbedder};
pub use errors::RagError;
pub use ingest::read_corpus;
pub use ingest::CollectionWriter;
pub use record::{RagRecord, RetrievedDocs, StoredDocument};

use tracing::{debug, trace};

/// High-level facade that wires configuration and the Qdrant client.
///
/// This is the single entry point for application code.
pub struct RagStore {
    cfg: RagConfig,
    client: qdrant_facade::QdrantFacade,
}

impl RagStore {
    /// Constructs a new store from the given configuration.
    ///
    /// # Errors
    /// Returns `RagError::Config` or `RagError::Qdrant` if client initialization fails.
    pub fn new(cfg: RagConfig) -> Result<Self, RagError> {
        trace!(collection = %cfg.collection, "RagStore::new");
        let client = qdrant_facade::QdrantFacade::new(&cfg)?;
        Ok(Self { cfg, client })
    }

    pub fn config(&self) -> &RagConfig {
        &self.cfg
    }

    /// Builds the collection from `cfg.corpus_dir` unless a complete one exists.
    ///
    /// # Errors
    /// Returns errors on an empty corpus, I/O, embedding, vector size mismatch,
    /// or Qdrant failures.
    pub async fn ensure_corpus(&self, provider: &dyn EmbeddingsProvider) -> Result<u64, RagError> {
        debug!(dir = ?self.cfg.corpus_dir, "RagStore::ensure_corpus");
        ingest::ensure_corpus(&self.cfg, &self.client, provider).await
    }

    /// All stored documents, `None` when the collection does not exist.
    ///
    /// # Errors
    /// Returns `RagError::Qdrant`.
    pub async fn list_documents(&self) -> Result<Option<Vec<StoredDocument>>, RagError> {
        if !self.client.collection_exists().await? {
            return Ok(None);
        }
        self.client.scroll_documents().await.map(Some)
    }

    /// Returns the `k` nearest documents with their scores, best first.
    ///
    /// # Errors
    /// Returns `RagError::VectorSizeMismatch` or `RagError::Qdrant`.
    pub async fn query(&self, vector: Vec<f32>, k: u64) -> Result<RetrievedDocs, RagError> {
        retrieve::query(&self.cfg, &self.client, vector, k).await
    }
}
